//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 访问控制交给 `ProtectedRoute`；这里只负责导航、记录登录后的返回路径，
//! 以及登出时把受保护页面带回登录页。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::events::WindowListener;
use super::route::AppRoute;
use crate::auth::guard::LOGIN_PATH;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 被拦截到登录页之前的目标路径
///
/// 取出即清空，避免下一次登录被带到过期的页面。
#[derive(Clone, Copy)]
struct ReturnTo(RwSignal<Option<String>>);

impl ReturnTo {
    fn new() -> Self {
        Self(RwSignal::new(None))
    }

    fn remember(&self, from: &str) {
        self.0.set(Some(from.to_string()));
    }

    fn take(&self) -> Option<String> {
        let from = self.0.get_untracked();
        if from.is_some() {
            self.0.set(None);
        }
        from
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 通过注入"已登出"信号实现与认证系统的解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 当前路由（只读信号）
    current_route: ReadSignal<AppRoute>,
    /// 设置当前路由（写入信号）
    set_route: WriteSignal<AppRoute>,
    /// 被拦截到登录页之前的目标路径
    return_to: ReturnTo,
    /// 认证状态（注入的信号，实现解耦）
    is_signed_out: Signal<bool>,
}

impl RouterService {
    fn new(is_signed_out: Signal<bool>) -> Self {
        let initial_route = AppRoute::from_path(&current_path());
        let (current_route, set_route) = signal(initial_route);

        Self {
            current_route,
            set_route,
            return_to: ReturnTo::new(),
            is_signed_out,
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// 登录后应返回的路径（只读信号）
    pub fn return_to(&self) -> Signal<Option<String>> {
        self.return_to.0.into()
    }

    /// 导航到新页面（pushState）
    pub fn navigate(&self, path: &str) {
        let target = AppRoute::from_path(path);
        push_history_state(&target.to_path());
        self.set_route.set(target);
    }

    /// 重定向（replaceState），被替换的页面不会留在历史记录中
    pub fn redirect(&self, path: &str) {
        let target = AppRoute::from_path(path);
        replace_history_state(&target.to_path());
        self.set_route.set(target);
    }

    /// 带返回路径的登录页重定向
    pub fn redirect_to_login(&self, from: &str) {
        log_info!("[Router] Access denied for {}. Redirecting to login.", from);
        self.return_to.remember(from);
        self.redirect(LOGIN_PATH);
    }

    /// 已登录用户离开登录页：丢弃返回路径，重定向到 `home`
    pub fn redirect_signed_in(&self, home: &str) {
        self.return_to.take();
        self.redirect(home);
    }

    /// 取出并清空返回路径
    pub fn take_return_to(&self) -> Option<String> {
        self.return_to.take()
    }

    /// 初始化浏览器后退/前进按钮监听
    ///
    /// 访问控制由 `ProtectedRoute` 在路由变化后重新执行。
    fn init_popstate_listener(&self) {
        let set_route = self.set_route;

        let listener = WindowListener::new("popstate", move |_| {
            set_route.set(AppRoute::from_path(&current_path()));
        });
        if listener.is_none() {
            log_warn!("[Router] failed to register popstate listener");
        }

        // 随 Router 的 owner 一起释放
        let _ = StoredValue::new_local(listener);
    }

    /// 登出时，若停留在受保护页面则重定向到登录页
    fn setup_auth_redirect(&self) {
        let router = *self;

        Effect::new(move |_| {
            if !router.is_signed_out.get() {
                return;
            }
            let route = router.current_route.get_untracked();
            if route.is_protected() {
                log_info!("[Router] Auth state changed: signed out, redirecting to login.");
                router.redirect_to_login(&route.to_path());
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(is_signed_out: Signal<bool>) -> RouterService {
    let router = RouterService::new(is_signed_out);

    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 已登出信号
    is_signed_out: Signal<bool>,
    /// 子组件
    children: Children,
) -> impl IntoView {
    provide_router(is_signed_out);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

/// 站内链接：拦截点击，走 pushState 导航
#[component]
pub fn Link(
    /// 目标路径
    #[prop(into)]
    to: String,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let target = to.clone();
    let on_click = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        router.navigate(&target);
    };

    view! {
        <a href=to class=class on:click=on_click>
            {children()}
        </a>
    }
}
