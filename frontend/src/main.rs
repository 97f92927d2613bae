use yew::prelude::*;
use yew_router::prelude::*;

mod api;
mod clock;
mod config;
mod error_alert;
mod poll_card;
mod poll_create;
mod poll_edit;
mod poll_option_manager;
mod session;
mod styles;
mod voting;

use crate::{
    poll_create::PollCreate,
    poll_edit::PollEdit,
    session::Session,
    voting::Voting,
};

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")] Votes,
    #[at("/votes/new")] CreatePoll,
    #[at("/votes/:id/edit")] EditPoll { id: String },
}

fn nav_classes(active: bool) -> Classes {
    classes!(
        "text-base", "md:text-lg", "font-medium", "px-4", "py-2", "rounded-md",
        "transition-colors", "duration-200", "ease-in-out",
        "text-gray-200", "border", "border-transparent", "hover:border-blue-400", "hover:text-blue-400",
        if active {
            "text-blue-400 border-blue-400 ring-2 ring-blue-500 ring-offset-1 ring-offset-gray-900"
        } else {
            ""
        }
    )
}

#[function_component(Navigation)]
fn navigation() -> Html {
    let current_route = use_route::<Route>();
    let session = use_context::<Session>().unwrap_or_default();

    html! {
        <nav class="bg-gray-900 shadow-lg fixed top-0 w-full z-50">
            <div class="container mx-auto px-6 py-4 flex justify-center items-center space-x-8">
                <Link<Route> to={Route::Votes} classes={nav_classes(current_route == Some(Route::Votes))}>
                    {"Votes"}
                </Link<Route>>
                {if session.is_admin() {
                    html! {
                        <Link<Route> to={Route::CreatePoll} classes={nav_classes(current_route == Some(Route::CreatePoll))}>
                            {"New Poll"}
                        </Link<Route>>
                    }
                } else { html! {} }}
                {match &session.user {
                    Some(user) => html! {
                        <span class="text-sm text-gray-400">
                            {&user.id}{if user.is_admin() { " (admin)" } else { "" }}
                        </span>
                    },
                    None => html! {},
                }}
            </div>
        </nav>
    }
}

#[function_component(App)]
fn app() -> Html {
    let session = use_state(Session::default);

    {
        let session = session.clone();
        use_effect_with_deps(move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                match api::fetch_me().await {
                    Ok(user) => session.set(Session::signed_in(user)),
                    Err(e) => session.set(Session::failed(e)),
                }
            });
            || ()
        }, ());
    }

    html! {
        <ContextProvider<Session> context={(*session).clone()}>
            <BrowserRouter>
                <div class="min-h-screen bg-gray-900">
                    <Navigation />
                    <div class="pt-16">
                        <Switch<Route> render={switch} />
                    </div>
                </div>
            </BrowserRouter>
        </ContextProvider<Session>>
    }
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Votes => html! { <Voting /> },
        Route::CreatePoll => html! { <PollCreate /> },
        Route::EditPoll { id } => html! { <PollEdit {id} /> },
    }
}

fn main() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}
