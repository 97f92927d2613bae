use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;
use yew_router::prelude::*;
use shared::{
    deadline::{format_deadline_input, parse_local_deadline},
    validate_poll_patch, ErrorCode, ErrorResponse, Poll, PollPatch,
};
use crate::{api, clock, error_alert::ErrorAlert, session::Session, styles::*, Route};

#[derive(Properties, PartialEq)]
pub struct PollEditProps {
    pub id: String,
}

#[derive(Clone, Default, PartialEq)]
struct EditFields {
    title: String,
    description: String,
    deadline: String,
}

impl EditFields {
    fn from_poll(poll: &Poll) -> Self {
        Self {
            title: poll.title.clone(),
            description: poll.description.clone(),
            deadline: format_deadline_input(poll.deadline, clock::offset_at(poll.deadline)),
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Step {
    Load,
    Save,
}

/// Only the fields the admin actually changed.
fn build_patch(original: &Poll, fields: &EditFields) -> Result<PollPatch, ErrorResponse> {
    let unchanged = format_deadline_input(original.deadline, clock::offset_at(original.deadline));
    let deadline = if fields.deadline == unchanged {
        None
    } else {
        let parsed = parse_local_deadline(&fields.deadline, clock::offset_for_local).ok_or_else(|| {
            ErrorResponse::new(ErrorCode::ValidationFailed, "Enter a valid closing date and time.")
        })?;
        Some(parsed)
    };

    let title = fields.title.trim();
    let description = fields.description.trim();
    Ok(PollPatch {
        title: (title != original.title).then(|| title.to_string()),
        description: (description != original.description).then(|| description.to_string()),
        deadline,
    })
}

#[function_component(PollEdit)]
pub fn poll_edit(props: &PollEditProps) -> Html {
    let session = use_context::<Session>().unwrap_or_default();
    let navigator = use_navigator();
    let original = use_state(|| None::<Poll>);
    let fields = use_state(EditFields::default);
    let failure = use_state(|| None::<(ErrorResponse, Step)>);
    let saving = use_state(|| false);
    let reload = use_state(|| 0u32);

    {
        let original = original.clone();
        let fields = fields.clone();
        let failure = failure.clone();
        use_effect_with_deps(move |(id, _)| {
            let id = id.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match api::fetch_poll(&id).await {
                    Ok(view) => {
                        fields.set(EditFields::from_poll(&view.poll));
                        original.set(Some(view.poll));
                        failure.set(None);
                    }
                    Err(e) => failure.set(Some((e, Step::Load))),
                }
            });
            || ()
        }, (props.id.clone(), *reload));
    }

    let save = {
        let original = original.clone();
        let fields = fields.clone();
        let failure = failure.clone();
        let saving = saving.clone();
        let navigator = navigator.clone();
        Callback::from(move |_: ()| {
            let Some(poll) = (*original).clone() else { return };
            let patch = match build_patch(&poll, &fields) {
                Ok(patch) => patch,
                Err(e) => return failure.set(Some((e, Step::Save))),
            };
            if patch.is_empty() {
                if let Some(navigator) = &navigator {
                    navigator.push(&Route::Votes);
                }
                return;
            }
            if let Err(e) = validate_poll_patch(&patch) {
                failure.set(Some((ErrorResponse::new(ErrorCode::ValidationFailed, e.to_string()), Step::Save)));
                return;
            }

            saving.set(true);
            failure.set(None);
            let failure = failure.clone();
            let saving = saving.clone();
            let navigator = navigator.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match api::edit_poll(poll.id, &patch).await {
                    Ok(_) => {
                        if let Some(navigator) = navigator {
                            navigator.push(&Route::Votes);
                        }
                    }
                    Err(e) => {
                        failure.set(Some((e, Step::Save)));
                        saving.set(false);
                    }
                }
            });
        })
    };

    if !session.is_admin() {
        return html! {
            <div class={BG_PAGE}>
                <div class={CARD}>
                    <h1 class={HEADING_LG}>{"Edit Poll"}</h1>
                    <p class={TEXT_MUTED}>{"Only building admins can edit polls."}</p>
                </div>
            </div>
        };
    }

    let on_retry = {
        let failure = failure.clone();
        let reload = reload.clone();
        let save = save.clone();
        Callback::from(move |_: MouseEvent| match (*failure).as_ref().map(|(_, step)| *step) {
            Some(Step::Load) => reload.set(*reload + 1),
            _ => save.emit(()),
        })
    };

    let onsubmit = save.reform(|e: SubmitEvent| e.prevent_default());

    let on_title = {
        let fields = fields.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            fields.set(EditFields { title: input.value(), ..(*fields).clone() });
        })
    };
    let on_description = {
        let fields = fields.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlTextAreaElement = e.target_unchecked_into();
            fields.set(EditFields { description: input.value(), ..(*fields).clone() });
        })
    };
    let on_deadline = {
        let fields = fields.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            fields.set(EditFields { deadline: input.value(), ..(*fields).clone() });
        })
    };

    html! {
        <div class={BG_PAGE}>
            <div class={CARD}>
                <h1 class={HEADING_LG}>{"Edit Poll"}</h1>
                <p class={combine_classes(TEXT_MUTED, "mb-6 text-center")}>
                    {"Move the closing time into the future to reopen a closed poll, or into the past to close it now."}
                </p>

                {if let Some((error, step)) = &*failure {
                    let retryable = *step == Step::Load || error.is_retryable();
                    html! {
                        <ErrorAlert
                            error={error.clone()}
                            on_retry={retryable.then(|| on_retry.clone())}
                        />
                    }
                } else { html! {} }}

                {if original.is_some() {
                    html! {
                        <form {onsubmit} class={SPACE_Y_LG}>
                            <div class={SPACE_Y_BASE}>
                                <label class={TEXT_LABEL}>{"Title"}</label>
                                <input type="text" class={INPUT_BASE}
                                    value={fields.title.clone()} oninput={on_title} />
                            </div>
                            <div class={SPACE_Y_BASE}>
                                <label class={TEXT_LABEL}>{"Description"}</label>
                                <textarea class={INPUT_BASE} rows="3"
                                    value={fields.description.clone()} oninput={on_description} />
                            </div>
                            <div class={SPACE_Y_BASE}>
                                <label class={TEXT_LABEL}>{"Voting closes"}</label>
                                <input type="datetime-local" class={INPUT_BASE}
                                    value={fields.deadline.clone()} onchange={on_deadline} />
                            </div>
                            <div class="flex gap-3">
                                <Link<Route> to={Route::Votes}
                                    classes={classes!(BUTTON_BASE, BUTTON_GHOST, "flex-1", "text-center", "mt-8", "py-3")}>
                                    {"Cancel"}
                                </Link<Route>>
                                <button type="submit" class={combine_classes(&button_primary(true), "flex-1")} disabled={*saving}>
                                    {if *saving { "Saving..." } else { "Save changes" }}
                                </button>
                            </div>
                        </form>
                    }
                } else if failure.is_none() {
                    html! {
                        <div class="flex justify-center p-8">
                            <div class={combine_classes("animate-pulse", TEXT_MUTED)}>{"Loading poll..."}</div>
                        </div>
                    }
                } else { html! {} }}
            </div>
        </div>
    }
}
