use crate::auth::guard::{GuardDecision, GuardState};
use crate::auth::use_auth;
use crate::web::router::use_router;
use leptos::prelude::*;
use leptos::task::spawn_local;
use rocket_assess_shared::UserRole;

fn show_notice(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

/// 受保护路由
///
/// 挂载时执行一次守卫检查；验证完成前显示加载状态，
/// 通过后渲染子组件，否则重定向到登录页或角色主页。
#[component]
pub fn ProtectedRoute(
    /// 需要的角色；为空时任意已登录角色均可（仍受角色禁区约束）
    #[prop(optional)]
    required_role: Option<UserRole>,
    /// 当前路径
    #[prop(into)]
    path: String,
    children: ChildrenFn,
) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let guard = auth.services().route_guard();

    let (state, set_state) = signal(GuardState::Loading);
    let notice_delay = auth.config().notice_delay;

    {
        let path = path.clone();
        spawn_local(async move {
            if let Some(next) = guard.evaluate(required_role, &path).await {
                set_state.set(next);
            }
        });
    }

    Effect::new(move |_| match state.get().decision(&path) {
        GuardDecision::Wait | GuardDecision::Render => {}
        GuardDecision::RedirectToLogin { from } => router.redirect_to_login(&from),
        GuardDecision::RedirectToHome { target, notice: message } => {
            router.redirect(target);
            // 本组件随跳转卸载，提示放到独立任务里，导航完成后再弹出
            spawn_local(async move {
                gloo_timers::future::sleep(notice_delay).await;
                show_notice(&message);
            });
        }
    });

    move || match state.get() {
        GuardState::Authenticated(_) => children().into_any(),
        GuardState::Loading => view! {
            <div class="flex flex-col items-center justify-center min-h-[50vh] gap-4">
                <span class="loading loading-spinner loading-lg text-primary"></span>
                <p class="text-base-content/70">"Verifying authentication..."</p>
            </div>
        }
        .into_any(),
        GuardState::Unauthenticated | GuardState::RoleRedirect(_) => ().into_any(),
    }
}
