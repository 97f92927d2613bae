use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::context::ContextHandle;
use yew::prelude::*;
use yew_router::prelude::*;
use shared::{deadline::parse_local_deadline, validate_poll_form, ErrorCode, ErrorResponse, Poll, PollForm};
use crate::{
    api, clock, error_alert::ErrorAlert, poll_option_manager::PollOptionManager, session::Session,
    styles::*, Route,
};

#[derive(Clone, Copy)]
pub enum Field {
    Title,
    Description,
    Deadline,
}

#[derive(Clone, Default)]
pub struct FormState {
    title: String,
    description: String,
    options: Vec<String>,
    /// Raw `datetime-local` value, interpreted in the browser's time zone on submit.
    deadline: String,
    error: Option<ErrorResponse>,
    submitting: bool,
}

pub struct PollCreate {
    state: FormState,
    session: Session,
    _session_handle: Option<ContextHandle<Session>>,
}

pub enum Msg {
    UpdateField(Field, String),
    UpdateOptions(Vec<String>),
    SessionChanged(Session),
    Submit,
    SubmitResult(Result<Poll, ErrorResponse>),
    DismissError,
}

impl Component for PollCreate {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let (session, handle) = ctx
            .link()
            .context::<Session>(ctx.link().callback(Msg::SessionChanged))
            .unzip();

        Self {
            state: FormState::default(),
            session: session.unwrap_or_default(),
            _session_handle: handle,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::UpdateField(field, value) => {
                match field {
                    Field::Title => self.state.title = value,
                    Field::Description => self.state.description = value,
                    Field::Deadline => self.state.deadline = value,
                }
                true
            }
            Msg::UpdateOptions(options) => {
                self.state.options = options;
                true
            }
            Msg::SessionChanged(session) => {
                self.session = session;
                true
            }
            Msg::Submit => {
                let form = self.form();
                // Nothing is sent until the form is complete.
                if let Err(e) = validate_poll_form(&form) {
                    self.state.error = Some(ErrorResponse::new(ErrorCode::ValidationFailed, e.to_string()));
                    return true;
                }

                self.state.submitting = true;
                self.state.error = None;
                ctx.link().send_future(async move {
                    Msg::SubmitResult(api::create_poll(&form).await)
                });
                true
            }
            Msg::SubmitResult(Ok(_)) => {
                if let Some(navigator) = ctx.link().navigator() {
                    navigator.push(&Route::Votes);
                }
                false
            }
            Msg::SubmitResult(Err(error)) => {
                self.state.error = Some(error);
                self.state.submitting = false;
                true
            }
            Msg::DismissError => {
                self.state.error = None;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        if !self.session.is_admin() {
            return html! {
                <div class={BG_PAGE}>
                    <div class={CARD}>
                        <h1 class={HEADING_LG}>{"New Poll"}</h1>
                        <p class={TEXT_MUTED}>{"Only building admins can create polls."}</p>
                    </div>
                </div>
            };
        }

        html! {
            <div class={BG_PAGE}>
                <div class={CARD}>
                    <h1 class={HEADING_LG}>{"New Poll"}</h1>
                    {if let Some(error) = &self.state.error {
                        let retry = error.is_retryable().then(|| ctx.link().callback(|_: MouseEvent| Msg::Submit));
                        html! {
                            <ErrorAlert
                                error={error.clone()}
                                on_retry={retry}
                                on_dismiss={ctx.link().callback(|_: MouseEvent| Msg::DismissError)}
                            />
                        }
                    } else { html! {} }}
                    {self.render_form(ctx)}
                </div>
            </div>
        }
    }
}

impl PollCreate {
    fn form(&self) -> PollForm {
        PollForm {
            title: self.state.title.clone(),
            description: self.state.description.clone(),
            options: self.state.options.clone(),
            deadline: parse_local_deadline(&self.state.deadline, clock::offset_for_local),
        }
    }

    fn render_form(&self, ctx: &Context<Self>) -> Html {
        let onsubmit = ctx.link().callback(|e: SubmitEvent| {
            e.prevent_default();
            Msg::Submit
        });

        let on_title = ctx.link().callback(|e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            Msg::UpdateField(Field::Title, input.value())
        });
        let on_description = ctx.link().callback(|e: InputEvent| {
            let input: HtmlTextAreaElement = e.target_unchecked_into();
            Msg::UpdateField(Field::Description, input.value())
        });
        let on_deadline = ctx.link().callback(|e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            Msg::UpdateField(Field::Deadline, input.value())
        });

        let submit_disabled = self.state.submitting
            || self.state.title.trim().is_empty()
            || self.state.description.trim().is_empty()
            || self.state.deadline.trim().is_empty();

        html! {
            <form {onsubmit} class={SPACE_Y_LG}>
                <div class={SPACE_Y_BASE}>
                    <label class={TEXT_LABEL}>{"Title"}</label>
                    <input id="title" type="text" class={INPUT_BASE}
                        value={self.state.title.clone()} oninput={on_title}
                        placeholder="What are we voting on?" />
                </div>

                <div class={SPACE_Y_BASE}>
                    <label class={TEXT_LABEL}>{"Description"}</label>
                    <textarea id="description" class={INPUT_BASE} rows="3"
                        value={self.state.description.clone()} oninput={on_description}
                        placeholder="Give residents the details" />
                </div>

                <div class={SPACE_Y_BASE}>
                    <div class={FLEX_BETWEEN}>
                        <label class={TEXT_LABEL}>{"Options"}</label>
                        <span class={TEXT_MUTED}>{format!("{} added, at least 2", self.state.options.len())}</span>
                    </div>
                    <PollOptionManager
                        options={self.state.options.clone()}
                        on_change={ctx.link().callback(Msg::UpdateOptions)}
                    />
                </div>

                <div class={SPACE_Y_BASE}>
                    <label class={TEXT_LABEL}>{"Voting closes"}</label>
                    <input id="deadline" type="datetime-local" class={INPUT_BASE}
                        value={self.state.deadline.clone()} onchange={on_deadline} />
                </div>

                <div class="flex gap-3">
                    <Link<Route> to={Route::Votes}
                        classes={classes!(BUTTON_BASE, BUTTON_GHOST, "flex-1", "text-center", "mt-8", "py-3")}>
                        {"Cancel"}
                    </Link<Route>>
                    <button type="submit" class={combine_classes(&button_primary(true), "flex-1")} disabled={submit_disabled}>
                        {if self.state.submitting { "Creating..." } else { "Create Poll" }}
                    </button>
                </div>
            </form>
        }
    }
}
