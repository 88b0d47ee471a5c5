//! 认证验证器
//!
//! 页头与路由守卫共用同一套流程，把本地的乐观会话状态与服务端的判断对齐：
//! 1. 本标签页未登录 -> 未认证（不发请求）
//! 2. 会话已过期 -> 清除标签页会话，未认证
//! 3. 身份记录无法解析 -> 清除标签页会话，未认证
//! 4. 要求的角色与当前角色不符 -> 未认证（不清除，这是导航决策）
//! 5. 请求服务端验证（带超时）：成功则刷新会话；失败、超时或网络错误则清除全部认证数据

use super::events::{AuthEvent, AuthEvents};
use crate::api::AuthApi;
use crate::clock::{Clock, with_timeout};
use crate::error::ApiError;
use crate::session::SessionManager;
use rocket_assess_shared::{AuthData, UserRole};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// 默认验证超时
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// 未认证的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    NoSession,
    Expired,
    MissingIdentity,
    RoleMismatch {
        required: UserRole,
        actual: UserRole,
    },
    /// 服务端返回非 2xx
    Rejected(u16),
    /// 网络错误或超时
    Transport(ApiError),
}

impl DenyReason {
    /// 是否属于凭据失效（区别于角色不符这种导航问题）
    pub fn is_credential_failure(&self) -> bool {
        !matches!(self, DenyReason::RoleMismatch { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Authenticated(UserRole),
    NotAuthenticated(DenyReason),
    /// 已有一次验证在进行中，本次被合并掉；调用方应保持原状态
    Suppressed,
}

impl VerifyOutcome {
    pub fn role(&self) -> Option<UserRole> {
        match self {
            VerifyOutcome::Authenticated(role) => Some(*role),
            _ => None,
        }
    }
}

/// 进行中标记，drop 时释放
struct InFlight(Rc<Cell<bool>>);

impl InFlight {
    fn acquire(flag: &Rc<Cell<bool>>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self(flag.clone()))
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// 认证验证器
///
/// 克隆共享同一个进行中标记；需要独立去重的调用方（页头、每个守卫）各自 `new` 一个。
#[derive(Clone)]
pub struct AuthVerifier {
    session: Rc<SessionManager>,
    api: Rc<dyn AuthApi>,
    clock: Rc<dyn Clock>,
    events: AuthEvents,
    timeout: Duration,
    in_flight: Rc<Cell<bool>>,
}

impl AuthVerifier {
    pub fn new(
        session: Rc<SessionManager>,
        api: Rc<dyn AuthApi>,
        clock: Rc<dyn Clock>,
        events: AuthEvents,
    ) -> Self {
        Self {
            session,
            api,
            clock,
            events,
            timeout: DEFAULT_VERIFY_TIMEOUT,
            in_flight: Rc::new(Cell::new(false)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.get()
    }

    /// 执行一次验证
    pub async fn check(&self, required: Option<UserRole>) -> VerifyOutcome {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            log_info!("[Auth] verification already in flight, skipping");
            return VerifyOutcome::Suppressed;
        };

        // --- Step 1: 本地会话 ---
        if !self.session.is_logged_in() {
            return VerifyOutcome::NotAuthenticated(DenyReason::NoSession);
        }

        // --- Step 2: 过期 ---
        if self.session.is_session_expired() {
            log_info!("[Auth] session expired");
            self.session.clear_session();
            self.events.publish(AuthEvent::SessionCleared);
            return VerifyOutcome::NotAuthenticated(DenyReason::Expired);
        }

        // --- Step 3: 身份记录 ---
        let Some(auth_data) = self.session.auth_data() else {
            log_warn!("[Auth] identity record incomplete, clearing tab session");
            self.session.clear_session();
            self.events.publish(AuthEvent::SessionCleared);
            return VerifyOutcome::NotAuthenticated(DenyReason::MissingIdentity);
        };

        // --- Step 4: 角色 ---
        if let Some(required) = required {
            if required != auth_data.user_type {
                return VerifyOutcome::NotAuthenticated(DenyReason::RoleMismatch {
                    required,
                    actual: auth_data.user_type,
                });
            }
        }

        // --- Step 5: 服务端验证 ---
        match self.verify_remote(&auth_data).await {
            Ok(status) if (200..300).contains(&status) => {
                self.session.refresh_session();
                self.events.publish(AuthEvent::Verified(auth_data.user_type));
                VerifyOutcome::Authenticated(auth_data.user_type)
            }
            Ok(status) => {
                log_warn!("[Auth] server rejected session with status {}", status);
                self.fail_closed();
                VerifyOutcome::NotAuthenticated(DenyReason::Rejected(status))
            }
            Err(e) => {
                log_warn!("[Auth] verification failed: {}", e);
                self.fail_closed();
                VerifyOutcome::NotAuthenticated(DenyReason::Transport(e))
            }
        }
    }

    async fn verify_remote(&self, auth_data: &AuthData) -> Result<u16, ApiError> {
        with_timeout(
            self.clock.as_ref(),
            self.timeout,
            self.api.verify(auth_data),
        )
        .await
    }

    fn fail_closed(&self) {
        self.session.clear_all_auth_data();
        self.events.publish(AuthEvent::SessionCleared);
    }
}
