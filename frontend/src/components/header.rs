use crate::auth::events::AuthEvent;
use crate::auth::guard::LOGIN_PATH;
use crate::auth::{AuthStatus, logout, use_auth};
use crate::web::router::{Link, use_router};
use crate::web::{Interval, WindowListener};
use leptos::prelude::*;
use leptos::task::spawn_local;
use rocket_assess_shared::local_keys;
use wasm_bindgen::JsCast;

/// 其他标签页改写了共享身份；`key` 为空表示 LocalStorage 被整体清空
fn is_identity_change(key: Option<&str>) -> bool {
    match key {
        Some(key) => local_keys::ALL.contains(&key),
        None => true,
    }
}

/// 页头
///
/// 挂载时、收到登录事件时、其他标签页改写身份时、窗口获得焦点时
/// 以及每隔一段时间重新验证会话。
/// 所有监听句柄都放在组件的 `StoredValue` 里，卸载时一并释放。
#[component]
pub fn Header() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let services = auth.services();
    let verifier = StoredValue::new_local(services.verifier());

    let (confirm_logout, set_confirm_logout) = signal(false);
    let (menu_open, set_menu_open) = signal(false);

    let reverify = move || {
        let verifier = verifier.get_value();
        spawn_local(async move {
            let outcome = verifier.check(None).await;
            auth.apply(&outcome);
        });
    };

    // 1. 挂载
    reverify();

    // 2. 认证事件
    let subscription = services.events().subscribe(move |event| match event {
        AuthEvent::LoggedIn(_) => reverify(),
        AuthEvent::LoggedOut | AuthEvent::SessionCleared => {
            auth.set_state.set(AuthStatus::SignedOut)
        }
        AuthEvent::Verified(_) => {}
    });

    // 3. 其他标签页的登录/登出（storage 事件只在其他标签页触发）
    let storage = WindowListener::new("storage", move |event| {
        let key = event
            .dyn_ref::<web_sys::StorageEvent>()
            .and_then(|e| e.key());
        if is_identity_change(key.as_deref()) {
            reverify();
        }
    });

    // 4. 窗口焦点（切换标签页回来）
    let focus = WindowListener::new("focus", move |_| reverify());

    // 5. 周期性验证
    let interval = Interval::new(auth.config().reverify_interval_millis(), reverify);
    if storage.is_none() || focus.is_none() || interval.is_none() {
        log_warn!("[Header] periodic re-verification unavailable");
    }

    let _ = StoredValue::new_local((subscription, storage, focus, interval));

    let on_logout = move |_| {
        set_confirm_logout.set(false);
        set_menu_open.set(false);
        spawn_local(async move {
            logout(&auth).await;
            router.navigate(LOGIN_PATH);
        });
    };

    let user_menu = move || match auth.state.get() {
        AuthStatus::SignedIn { role, name } => view! {
            <span class="hidden md:inline font-medium">{format!("Welcome, {}!", name)}</span>
            <span class="badge badge-primary badge-outline">{role.display_name()}</span>
            <Link to=role.dashboard_path() class="btn btn-ghost btn-sm">"Dashboard"</Link>
            <Link to=role.profile_path() class="btn btn-ghost btn-sm">"Profile"</Link>
            <button class="btn btn-outline btn-error btn-sm" on:click=move |_| set_confirm_logout.set(true)>
                "Logout"
            </button>
        }
        .into_any(),
        AuthStatus::SignedOut => view! {
            <Link to="/login" class="btn btn-ghost btn-sm">"Login"</Link>
            <Link to="/register" class="btn btn-primary btn-sm">"Register"</Link>
        }
        .into_any(),
        AuthStatus::Unknown => view! {
            <span class="loading loading-spinner loading-sm"></span>
        }
        .into_any(),
    };

    view! {
        <header class="navbar bg-base-100 shadow-sm px-4">
            <div class="flex-1">
                <Link to="/" class="btn btn-ghost text-xl">"RocketAssess"</Link>
            </div>
            <button
                class="btn btn-ghost btn-square md:hidden"
                aria-label="Toggle menu"
                on:click=move |_| set_menu_open.update(|open| *open = !*open)
            >
                {move || if menu_open.get() { "✕" } else { "☰" }}
            </button>
            <nav class=move || {
                if menu_open.get() {
                    "flex flex-col md:flex-row items-center gap-2"
                } else {
                    "hidden md:flex items-center gap-2"
                }
            }>
                {user_menu}
            </nav>
        </header>

        <Show when=move || confirm_logout.get()>
            <div class="modal modal-open">
                <div class="modal-box">
                    <h3 class="font-bold text-lg">"Confirm Logout"</h3>
                    <p class="py-4">"Are you sure you want to log out?"</p>
                    <div class="modal-action">
                        <button class="btn" on:click=move |_| set_confirm_logout.set(false)>
                            "Cancel"
                        </button>
                        <button class="btn btn-error" on:click=on_logout>
                            "Logout"
                        </button>
                    </div>
                </div>
            </div>
        </Show>
    }
}
