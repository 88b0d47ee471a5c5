use crate::auth::{AuthStatus, use_auth};
use crate::web::route::AppRoute;
use crate::web::router::Link;
use leptos::prelude::*;

#[component]
pub fn HomePage() -> impl IntoView {
    let auth = use_auth();

    view! {
        <div class="hero min-h-[70vh] bg-base-200">
            <div class="hero-content text-center">
                <div class="max-w-md">
                    <h1 class="text-5xl font-bold">"RocketAssess"</h1>
                    <p class="py-6">"Online assessments for organizations, teachers and students."</p>
                    {move || match auth.state.get() {
                        AuthStatus::SignedIn { role, .. } => view! {
                            <Link to=role.dashboard_path() class="btn btn-primary">"Go to Dashboard"</Link>
                        }
                        .into_any(),
                        _ => view! {
                            <div class="flex gap-2 justify-center">
                                <Link to="/login" class="btn btn-primary">"Login"</Link>
                                <Link to="/register" class="btn btn-outline">"Register"</Link>
                            </div>
                        }
                        .into_any(),
                    }}
                </div>
            </div>
        </div>
    }
}

/// 页面骨架：标题 + 内容区
#[component]
pub fn PageShell(route: AppRoute) -> impl IntoView {
    let title = route.title();
    let subtitle = match &route {
        AppRoute::TestRoom(id)
        | AppRoute::TestResults(id)
        | AppRoute::Results(id)
        | AppRoute::InviteStudents(id)
        | AppRoute::InvitedStudents(id) => Some(format!("Test #{}", id)),
        AppRoute::Review(id) => Some(format!("Submission #{}", id)),
        AppRoute::TestRedirect(code) => Some(format!("Invite code {}", code)),
        _ => None,
    };

    view! {
        <div class="container mx-auto p-6">
            <h1 class="text-3xl font-bold">{title}</h1>
            {subtitle.map(|s| view! { <p class="text-base-content/70 mt-1">{s}</p> })}
            <div class="divider"></div>
        </div>
    }
}

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-[70vh] bg-base-200">
            <div class="text-center">
                <h1 class="text-6xl font-bold text-error">"404"</h1>
                <p class="text-xl mt-4">"Page not found"</p>
                <Link to="/" class="btn btn-link mt-2">"Back to Home"</Link>
            </div>
        </div>
    }
}
