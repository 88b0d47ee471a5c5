use crate::auth::{AuthStatus, login, use_auth};
use crate::web::router::{Link, use_router};
use leptos::prelude::*;
use leptos::task::spawn_local;
use rocket_assess_shared::UserRole;
use rocket_assess_shared::protocol::{
    LoginCredentials, OrganizationLoginRequest, StudentLoginRequest, TeacherLoginRequest,
};
use rocket_assess_shared::validation::{FieldErrors, LoginForm, validate_login_form};

/// 由表单构造对应角色的登录请求
fn credentials_from(form: &LoginForm) -> LoginCredentials {
    let email = form.email.trim().to_string();
    let password = form.password.clone();
    match form.role {
        UserRole::Organization => LoginCredentials::Organization(OrganizationLoginRequest {
            org_code: form.org_code.trim().to_uppercase(),
            email,
            password,
        }),
        UserRole::Teacher => LoginCredentials::Teacher(TeacherLoginRequest { email, password }),
        UserRole::Student => LoginCredentials::Student(StudentLoginRequest { email, password }),
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    let (role, set_role) = signal(UserRole::Organization);
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (org_code, set_org_code) = signal(String::new());
    let (errors, set_errors) = signal(FieldErrors::default());
    let (is_submitting, set_is_submitting) = signal(false);
    let (server_error, set_server_error) = signal(Option::<String>::None);

    let from_protected = move || router.return_to().get().is_some();

    // 已登录则直接进入角色面板，之前记录的返回路径作废
    Effect::new(move |_| {
        if let AuthStatus::SignedIn { role, .. } = auth.state.get() {
            if !is_submitting.get_untracked() {
                router.redirect_signed_in(role.dashboard_path());
            }
        }
    });

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        let form = LoginForm {
            role: role.get_untracked(),
            email: email.get_untracked(),
            password: password.get_untracked(),
            org_code: org_code.get_untracked(),
        };
        let field_errors = validate_login_form(&form);
        if !field_errors.is_empty() {
            set_errors.set(field_errors);
            return;
        }

        set_is_submitting.set(true);
        set_server_error.set(None);

        spawn_local(async move {
            match login(&auth, credentials_from(&form)).await {
                Ok(role) => {
                    let target = router
                        .take_return_to()
                        .unwrap_or_else(|| role.dashboard_path().to_string());
                    set_is_submitting.set(false);
                    router.navigate(&target);
                }
                Err(e) => {
                    log_warn!("[Login] {} login failed: {}", form.role, e);
                    set_server_error.set(Some(e.user_message()));
                    set_is_submitting.set(false);
                }
            }
        });
    };

    let clear_error = move |field: &'static str| set_errors.update(|errs| errs.clear(field));
    let field_error = move |field: &'static str| {
        move || {
            errors
                .get()
                .get(field)
                .map(|msg| view! { <span class="label-text-alt text-error">{msg.to_string()}</span> })
        }
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit autocomplete="off">
                        <div class="flex justify-between">
                            <Link to="/" class="btn btn-outline btn-sm">"← Back to Home"</Link>
                            <Link to="/register" class="link link-primary text-sm">"Register"</Link>
                        </div>
                        <h1 class="text-3xl font-bold text-center text-primary">"Login"</h1>

                        <Show when=from_protected>
                            <div role="alert" class="alert alert-info text-sm py-2">
                                "Please log in to access the requested page."
                            </div>
                        </Show>

                        {move || server_error.get().map(|msg| view! {
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{msg}</span>
                            </div>
                        })}

                        <div class="form-control">
                            <label class="label" for="role">
                                <span class="label-text">"Role"</span>
                            </label>
                            <select
                                id="role"
                                class="select select-bordered"
                                disabled=move || is_submitting.get()
                                on:change=move |ev| {
                                    if let Some(r) = UserRole::parse(&event_target_value(&ev)) {
                                        set_role.set(r);
                                        set_errors.set(FieldErrors::default());
                                    }
                                }
                                prop:value=move || role.get().as_str()
                            >
                                {UserRole::ALL
                                    .iter()
                                    .map(|r| view! { <option value=r.as_str()>{r.display_name()}</option> })
                                    .collect_view()}
                            </select>
                        </div>

                        <Show when=move || role.get() == UserRole::Organization>
                            <div class="form-control">
                                <label class="label" for="org_code">
                                    <span class="label-text">"Organization Code"</span>
                                </label>
                                <input
                                    id="org_code"
                                    type="text"
                                    class="input input-bordered"
                                    disabled=move || is_submitting.get()
                                    on:input=move |ev| {
                                        set_org_code.set(event_target_value(&ev));
                                        clear_error("org_code");
                                    }
                                    prop:value=org_code
                                />
                                <label class="label">{field_error("org_code")}</label>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label class="label" for="email">
                                <span class="label-text">"Email"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                class="input input-bordered"
                                disabled=move || is_submitting.get()
                                on:input=move |ev| {
                                    set_email.set(event_target_value(&ev));
                                    clear_error("email");
                                }
                                prop:value=email
                            />
                            <label class="label">{field_error("email")}</label>
                        </div>

                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Password"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                class="input input-bordered"
                                disabled=move || is_submitting.get()
                                on:input=move |ev| {
                                    set_password.set(event_target_value(&ev));
                                    clear_error("password");
                                }
                                prop:value=password
                            />
                            <label class="label">{field_error("password")}</label>
                        </div>

                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Logging in..." }.into_any()
                                } else {
                                    "Login".into_any()
                                }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(role: UserRole) -> LoginForm {
        LoginForm {
            role,
            email: "  ann@school.com ".into(),
            password: "secret1".into(),
            org_code: " acme1 ".into(),
        }
    }

    #[test]
    fn organization_credentials_carry_normalized_code() {
        match credentials_from(&form(UserRole::Organization)) {
            LoginCredentials::Organization(req) => {
                assert_eq!(req.org_code, "ACME1");
                assert_eq!(req.email, "ann@school.com");
                assert_eq!(req.password, "secret1");
            }
            other => panic!("unexpected credentials {other:?}"),
        }
    }

    #[test]
    fn credentials_follow_selected_role() {
        for role in UserRole::ALL {
            assert_eq!(credentials_from(&form(role)).role(), role);
        }
    }
}
