use crate::error::ApiError;
use async_trait::async_trait;
use gloo_net::http::{Request, Response};
use rocket_assess_shared::protocol::{
    ApiRequest, ErrorBody, HttpMethod, LoginCredentials, LogoutRequest, VerifyAuthRequest,
};
use rocket_assess_shared::{AuthData, UserProfile};

// =========================================================
// 认证 API 接口
// =========================================================

/// 认证相关的 REST 调用
///
/// 使用 `?Send` 因为浏览器中的 future 不是 Send 的。
#[async_trait(?Send)]
pub trait AuthApi {
    /// 按角色登录，成功时返回写入共享存储的用户资料
    async fn login(&self, credentials: &LoginCredentials) -> Result<UserProfile, ApiError>;
    /// 服务端会话验证，只返回状态码
    async fn verify(&self, data: &AuthData) -> Result<u16, ApiError>;
    /// 尽力而为的服务端登出
    async fn logout(&self, request: &LogoutRequest) -> Result<(), ApiError>;
}

// =========================================================
// 生产环境实现 (gloo-net)
// =========================================================

#[derive(Clone, Debug, PartialEq)]
pub struct RocketAssessApi {
    pub base_url: String,
}

impl RocketAssessApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 发送请求，返回原始响应（不检查状态码）
    async fn send<T: ApiRequest>(&self, body: &T) -> Result<Response, ApiError> {
        let url = self.url(T::PATH);
        let builder = match T::METHOD {
            HttpMethod::Get => Request::get(&url),
            HttpMethod::Post => Request::post(&url),
        };
        let res = builder
            .header("Content-Type", "application/json")
            .header("Cache-Control", "no-cache, no-store, must-revalidate")
            .header("Pragma", "no-cache")
            .json(body)?
            .send()
            .await?;
        Ok(res)
    }

    /// 登录请求：200 时解析角色载荷，否则尽量取出服务端的错误信息
    async fn login_as<T>(&self, body: &T) -> Result<UserProfile, ApiError>
    where
        T: ApiRequest,
        UserProfile: From<T::Response>,
    {
        let res = self.send(body).await?;

        if res.status() == 200 {
            let payload = res.json::<T::Response>().await?;
            return Ok(UserProfile::from(payload));
        }

        match res.json::<ErrorBody>().await {
            Ok(body) => Err(ApiError::Server(body.error)),
            Err(_) => Err(ApiError::Status(res.status())),
        }
    }
}

#[async_trait(?Send)]
impl AuthApi for RocketAssessApi {
    async fn login(&self, credentials: &LoginCredentials) -> Result<UserProfile, ApiError> {
        match credentials {
            LoginCredentials::Organization(req) => self.login_as(req).await,
            LoginCredentials::Teacher(req) => self.login_as(req).await,
            LoginCredentials::Student(req) => self.login_as(req).await,
        }
    }

    async fn verify(&self, data: &AuthData) -> Result<u16, ApiError> {
        let res = self.send(&VerifyAuthRequest::from(data)).await?;
        Ok(res.status())
    }

    async fn logout(&self, request: &LogoutRequest) -> Result<(), ApiError> {
        let res = self.send(request).await?;
        if !res.ok() {
            return Err(ApiError::Status(res.status()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_path() {
        let api = RocketAssessApi::new("http://localhost:8000/");
        assert_eq!(
            api.url(VerifyAuthRequest::PATH),
            "http://localhost:8000/api/verify-auth/"
        );
        assert_eq!(api.url("api/logout/"), "http://localhost:8000/api/logout/");

        let same_origin = RocketAssessApi::new("");
        assert_eq!(same_origin.url("/api/logout/"), "/api/logout/");
    }
}
