//! RocketAssess 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `session`: 标签页会话与共享身份（Cookie / LocalStorage / SessionStorage）
//! - `auth`: 认证验证、事件与路由守卫
//! - `web::route`: 路由定义（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `components`: UI 组件层

// =========================================================
// 日志宏 (wasm32 走浏览器控制台，其余目标走 log 门面)
// =========================================================

#[cfg(target_arch = "wasm32")]
macro_rules! log_info { ($($t:tt)*) => (web_sys::console::log_1(&format!($($t)*).into())) }
#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_info { ($($t:tt)*) => (log::info!($($t)*)) }

#[cfg(target_arch = "wasm32")]
macro_rules! log_warn { ($($t:tt)*) => (web_sys::console::warn_1(&format!($($t)*).into())) }
#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_warn { ($($t:tt)*) => (log::warn!($($t)*)) }

#[cfg(target_arch = "wasm32")]
#[allow(unused_macros)]
macro_rules! log_error { ($($t:tt)*) => (web_sys::console::error_1(&format!($($t)*).into())) }
#[cfg(not(target_arch = "wasm32"))]
#[allow(unused_macros)]
macro_rules! log_error { ($($t:tt)*) => (log::error!($($t)*)) }

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod session;

mod components {
    pub mod header;
    pub mod login;
    pub mod pages;
    pub mod protected_route;
}

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装。
pub mod web {
    mod events;
    pub mod route;
    pub mod router;
    mod storage;
    mod timer;

    pub use events::WindowListener;
    pub use storage::{BrowserLocalStorage, BrowserSessionStorage, CookieJar};
    pub use timer::Interval;
}

use crate::auth::{AuthContext, AuthServices};
use crate::components::header::Header;
use crate::components::login::LoginPage;
use crate::components::pages::{HomePage, NotFoundPage, PageShell};
use crate::components::protected_route::ProtectedRoute;
use crate::config::AppConfig;

use leptos::prelude::*;

use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件；受保护的路由包裹在 `ProtectedRoute` 中。
fn route_matcher(route: AppRoute) -> AnyView {
    let page = match &route {
        AppRoute::Home => return view! { <HomePage /> }.into_any(),
        AppRoute::Login => return view! { <LoginPage /> }.into_any(),
        AppRoute::NotFound => return view! { <NotFoundPage /> }.into_any(),
        other => other.clone(),
    };

    if !route.is_protected() {
        return view! { <PageShell route=page /> }.into_any();
    }

    let path = route.to_path();
    match route.required_role() {
        Some(role) => view! {
            <ProtectedRoute required_role=role path=path>
                <PageShell route=page.clone() />
            </ProtectedRoute>
        }
        .into_any(),
        None => view! {
            <ProtectedRoute path=path>
                <PageShell route=page.clone() />
            </ProtectedRoute>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 配置与认证服务
    let config = AppConfig::default();
    let services = AuthServices::browser(&config);

    // 2. 认证上下文
    let auth_ctx = AuthContext::new(services, config);
    provide_context(auth_ctx);

    // 3. "已登出"信号注入路由服务（解耦）
    let is_signed_out = auth_ctx.is_signed_out_signal();

    view! {
        <Router is_signed_out=is_signed_out>
            <Header />
            <main>
                <RouterOutlet matcher=route_matcher />
            </main>
        </Router>
    }
}
