//! 认证模块
//!
//! - `AuthServices`: 会话管理器、API、时钟与事件总线的组合，应用启动时构造一次。
//! - `AuthContext`: 通过 Leptos Context 共享给页头、路由守卫与各页面。

pub mod events;
pub mod guard;
pub mod verifier;

use crate::api::{AuthApi, RocketAssessApi};
use crate::clock::{BrowserClock, Clock, with_timeout};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::session::{SessionManager, StorageBackends};
use crate::web::{BrowserLocalStorage, BrowserSessionStorage, CookieJar};
use events::{AuthEvent, AuthEvents};
use guard::RouteGuard;
use leptos::prelude::*;
use rocket_assess_shared::UserRole;
use rocket_assess_shared::protocol::{LoginCredentials, LogoutRequest};
use std::rc::Rc;
use std::time::Duration;
use verifier::{AuthVerifier, VerifyOutcome};

// =========================================================
// 服务组合
// =========================================================

#[derive(Clone)]
pub struct AuthServices {
    session: Rc<SessionManager>,
    api: Rc<dyn AuthApi>,
    clock: Rc<dyn Clock>,
    events: AuthEvents,
    verify_timeout: Duration,
}

impl AuthServices {
    pub fn new(
        config: &AppConfig,
        backends: StorageBackends,
        api: Rc<dyn AuthApi>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let session =
            SessionManager::new(backends, clock.clone()).with_timeout(config.session_timeout);
        Self {
            session: Rc::new(session),
            api,
            clock,
            events: AuthEvents::new(),
            verify_timeout: config.verify_timeout,
        }
    }

    /// 浏览器环境：Cookie + LocalStorage + SessionStorage + fetch
    pub fn browser(config: &AppConfig) -> Self {
        let backends = StorageBackends {
            cookies: Rc::new(CookieJar::new()),
            local: Rc::new(BrowserLocalStorage),
            tab: Rc::new(BrowserSessionStorage),
        };
        let api = RocketAssessApi::new(config.api_base_url.clone());
        Self::new(config, backends, Rc::new(api), Rc::new(BrowserClock))
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn events(&self) -> &AuthEvents {
        &self.events
    }

    /// 新建一个拥有独立进行中标记的验证器
    pub fn verifier(&self) -> AuthVerifier {
        AuthVerifier::new(
            self.session.clone(),
            self.api.clone(),
            self.clock.clone(),
            self.events.clone(),
        )
        .with_timeout(self.verify_timeout)
    }

    pub fn route_guard(&self) -> RouteGuard {
        RouteGuard::new(self.verifier())
    }

    /// 本地视角的认证状态（不访问服务端）
    pub fn local_status(&self) -> AuthStatus {
        match (self.session.user_type(), self.session.display_name()) {
            (Some(role), Some(name)) => AuthStatus::SignedIn { role, name },
            _ => AuthStatus::SignedOut,
        }
    }

    /// 登录：调用对应角色的登录接口，成功后写入会话并发布 `LoggedIn`
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<UserRole, ApiError> {
        let role = credentials.role();
        let profile = self.api.login(credentials).await?;

        if !self.session.set_logged_in(role, &profile) {
            return Err(ApiError::Session(format!(
                "failed to store {} session",
                role
            )));
        }

        self.events.publish(AuthEvent::LoggedIn(role));
        Ok(role)
    }

    /// 登出：尽力通知服务端，无论结果如何都清除全部本地认证数据
    pub async fn logout(&self) {
        if let Some(auth) = self.session.auth_data() {
            let teacher_pk = match auth.user_type {
                UserRole::Teacher => self.session.teacher_pk(),
                UserRole::Organization | UserRole::Student => None,
            };
            let request = LogoutRequest {
                email: auth.email,
                user_type: auth.user_type,
                teacher_pk,
            };
            let result = with_timeout(
                self.clock.as_ref(),
                self.verify_timeout,
                self.api.logout(&request),
            )
            .await;
            if let Err(e) = result {
                log_warn!("[Auth] server logout failed, continuing locally: {}", e);
            }
        }

        self.session.clear_all_auth_data();
        self.events.publish(AuthEvent::LoggedOut);
        log_info!("[Auth] logged out");
    }
}

// =========================================================
// Leptos 上下文
// =========================================================

/// 页面可见的认证状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthStatus {
    /// 尚未完成首次验证
    #[default]
    Unknown,
    SignedIn {
        role: UserRole,
        name: String,
    },
    SignedOut,
}

impl AuthStatus {
    pub fn role(&self) -> Option<UserRole> {
        match self {
            AuthStatus::SignedIn { role, .. } => Some(*role),
            _ => None,
        }
    }
}

/// 认证上下文
///
/// 服务本身不是 Send 的，放在本地 arena 中；上下文只持有句柄，可以自由复制。
#[derive(Clone, Copy)]
pub struct AuthContext {
    services: StoredValue<AuthServices, LocalStorage>,
    /// 认证状态（只读）
    pub state: ReadSignal<AuthStatus>,
    /// 设置认证状态（写入）
    pub set_state: WriteSignal<AuthStatus>,
    config: StoredValue<AppConfig>,
}

impl AuthContext {
    pub fn new(services: AuthServices, config: AppConfig) -> Self {
        let (state, set_state) = signal(AuthStatus::Unknown);
        Self {
            services: StoredValue::new_local(services),
            state,
            set_state,
            config: StoredValue::new(config),
        }
    }

    pub fn services(&self) -> AuthServices {
        self.services.get_value()
    }

    pub fn config(&self) -> AppConfig {
        self.config.get_value()
    }

    /// 获取"已登出"信号（用于路由服务注入）
    pub fn is_signed_out_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.get() == AuthStatus::SignedOut)
    }

    /// 把一次验证结果写入状态；`Suppressed` 不改变状态
    pub fn apply(&self, outcome: &VerifyOutcome) {
        match outcome {
            VerifyOutcome::Authenticated(_) => {
                self.set_state.set(self.services().local_status());
            }
            VerifyOutcome::NotAuthenticated(_) => self.set_state.set(AuthStatus::SignedOut),
            VerifyOutcome::Suppressed => {}
        }
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 登录并更新状态
pub async fn login(ctx: &AuthContext, credentials: LoginCredentials) -> Result<UserRole, ApiError> {
    let services = ctx.services();
    let role = services.login(&credentials).await?;
    ctx.set_state.set(services.local_status());
    Ok(role)
}

/// 注销并清除状态
///
/// 导航由路由服务监听认证状态变化后自动处理。
pub async fn logout(ctx: &AuthContext) {
    ctx.services().logout().await;
    ctx.set_state.set(AuthStatus::SignedOut);
}

#[cfg(test)]
mod tests;
