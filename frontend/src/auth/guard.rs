//! 路由守卫状态机
//!
//! `Loading -> {Authenticated, Unauthenticated}`，`Authenticated -> {Rendered, RoleRedirect}`。
//! 每个分支都是终态，没有重试循环；验证失败一定落到登录页。

use super::verifier::{AuthVerifier, VerifyOutcome};
use rocket_assess_shared::UserRole;

/// 登录页路径
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Loading,
    Authenticated(UserRole),
    Unauthenticated,
    /// 已认证，但目标路径属于其他角色的区域
    RoleRedirect(UserRole),
}

/// 守卫对当前路径的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// 仍在验证中，显示加载状态
    Wait,
    Render,
    /// 跳转登录页，并携带原目标路径以便登录后返回
    RedirectToLogin { from: String },
    /// 延迟提示后跳转到角色主页
    RedirectToHome {
        target: &'static str,
        notice: String,
    },
}

impl GuardState {
    /// 由验证结果推导守卫状态；`Suppressed` 返回 `None`，保持原状态等待进行中的验证
    pub fn from_outcome(
        outcome: &VerifyOutcome,
        required: Option<UserRole>,
        path: &str,
    ) -> Option<Self> {
        match outcome {
            VerifyOutcome::Suppressed => None,
            VerifyOutcome::NotAuthenticated(_) => Some(GuardState::Unauthenticated),
            VerifyOutcome::Authenticated(role) => {
                if required.is_none() && role.is_forbidden_path(path) {
                    Some(GuardState::RoleRedirect(*role))
                } else {
                    Some(GuardState::Authenticated(*role))
                }
            }
        }
    }

    pub fn decision(&self, path: &str) -> GuardDecision {
        match self {
            GuardState::Loading => GuardDecision::Wait,
            GuardState::Authenticated(_) => GuardDecision::Render,
            GuardState::Unauthenticated => GuardDecision::RedirectToLogin {
                from: path.to_string(),
            },
            GuardState::RoleRedirect(role) => GuardDecision::RedirectToHome {
                target: role.home_path(),
                notice: role.access_denied_notice(),
            },
        }
    }
}

/// 路由守卫
///
/// 克隆共享同一个验证器（同一进行中标记）。
#[derive(Clone)]
pub struct RouteGuard {
    verifier: AuthVerifier,
}

impl RouteGuard {
    pub fn new(verifier: AuthVerifier) -> Self {
        Self { verifier }
    }

    /// 对目标路径执行一次守卫检查
    pub async fn evaluate(&self, required: Option<UserRole>, path: &str) -> Option<GuardState> {
        let outcome = self.verifier.check(required).await;
        let state = GuardState::from_outcome(&outcome, required, path);
        if let Some(state) = state {
            log_info!("[Router] guard for {} resolved to {:?}", path, state);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verifier::DenyReason;

    #[test]
    fn not_authenticated_redirects_to_login_with_origin() {
        let outcome = VerifyOutcome::NotAuthenticated(DenyReason::NoSession);
        let state = GuardState::from_outcome(&outcome, None, "/profile").unwrap();
        assert_eq!(state, GuardState::Unauthenticated);
        assert_eq!(
            state.decision("/profile"),
            GuardDecision::RedirectToLogin {
                from: "/profile".into()
            }
        );
    }

    #[test]
    fn role_table_redirects_to_home() {
        let cases = [
            (UserRole::Student, "/create-test", "/student-dashboard"),
            (UserRole::Student, "/invited-students/3", "/student-dashboard"),
            (UserRole::Teacher, "/student-dashboard", "/teacher-dashboard"),
            (UserRole::Organization, "/question-pool", "/org-profile"),
            (UserRole::Organization, "/teacher-dashboard", "/org-profile"),
        ];
        for (role, path, home) in cases {
            let state =
                GuardState::from_outcome(&VerifyOutcome::Authenticated(role), None, path).unwrap();
            assert_eq!(state, GuardState::RoleRedirect(role));
            match state.decision(path) {
                GuardDecision::RedirectToHome { target, notice } => {
                    assert_eq!(target, home);
                    assert!(notice.starts_with("Access denied."));
                }
                other => panic!("expected home redirect for {path}, got {other:?}"),
            }
        }
    }

    #[test]
    fn explicit_role_requirement_skips_prefix_table() {
        let state = GuardState::from_outcome(
            &VerifyOutcome::Authenticated(UserRole::Teacher),
            Some(UserRole::Teacher),
            "/student-dashboard",
        );
        assert_eq!(state, Some(GuardState::Authenticated(UserRole::Teacher)));
    }

    #[test]
    fn allowed_path_renders() {
        let state = GuardState::from_outcome(
            &VerifyOutcome::Authenticated(UserRole::Student),
            None,
            "/test/12",
        )
        .unwrap();
        assert_eq!(state.decision("/test/12"), GuardDecision::Render);
        assert_eq!(GuardState::Loading.decision("/test/12"), GuardDecision::Wait);
    }

    #[test]
    fn suppressed_keeps_current_state() {
        assert_eq!(
            GuardState::from_outcome(&VerifyOutcome::Suppressed, None, "/profile"),
            None
        );
    }
}
