use std::rc::Rc;
use gloo_timers::callback::Interval;
use time::OffsetDateTime;
use uuid::Uuid;
use yew::prelude::*;
use yew_router::prelude::*;
use shared::{evaluator, ActivitySummary, ErrorResponse, Poll, PollView, SortSpec};
use crate::{
    api, config::CONFIG, error_alert::ErrorAlert, poll_card::PollCard, session::Session, styles::*,
    Route,
};

/// What the Retry button repeats.
#[derive(Clone, Debug, PartialEq)]
pub enum Pending {
    Reload,
    Ballot { poll_id: Uuid, option: String },
}

#[derive(Clone)]
pub struct VotingState {
    polls: Vec<PollView>,
    summary: Option<ActivitySummary>,
    loaded: bool,
    casting: Option<Uuid>,
    failure: Option<(ErrorResponse, Pending)>,
    now: OffsetDateTime,
}

impl Default for VotingState {
    fn default() -> Self {
        Self {
            polls: Vec::new(),
            summary: None,
            loaded: false,
            casting: None,
            failure: None,
            now: OffsetDateTime::now_utc(),
        }
    }
}

pub enum Action {
    Loaded(Vec<PollView>, ActivitySummary),
    Casting(Uuid),
    BallotRecorded { view: PollView, user_id: String },
    Failed(ErrorResponse, Pending),
    Dismiss,
    Tick,
}

impl Reducible for VotingState {
    type Action = Action;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        next.now = OffsetDateTime::now_utc();
        match action {
            Action::Loaded(polls, summary) => {
                next.polls = polls;
                next.summary = Some(summary);
                next.loaded = true;
                next.casting = None;
                next.failure = None;
            }
            Action::Casting(poll_id) => {
                next.casting = Some(poll_id);
                next.failure = None;
            }
            Action::BallotRecorded { view, user_id } => {
                if let Some(slot) = next.polls.iter_mut().find(|v| v.poll.id == view.poll.id) {
                    *slot = view;
                }
                let polls: Vec<Poll> = next.polls.iter().map(|v| v.poll.clone()).collect();
                next.summary = Some(evaluator::summarize(&polls, &user_id, next.now));
                next.casting = None;
            }
            Action::Failed(error, pending) => {
                next.failure = Some((error, pending));
                next.casting = None;
                next.loaded = true;
            }
            Action::Dismiss => next.failure = None,
            Action::Tick => {}
        }
        Rc::new(next)
    }
}

fn load(state: UseReducerHandle<VotingState>) {
    wasm_bindgen_futures::spawn_local(async move {
        let (polls, summary) = futures::join!(
            api::fetch_polls(SortSpec::default()),
            api::fetch_summary()
        );
        match (polls, summary) {
            (Ok(polls), Ok(summary)) => state.dispatch(Action::Loaded(polls, summary)),
            (Err(e), _) | (_, Err(e)) => state.dispatch(Action::Failed(e, Pending::Reload)),
        }
    });
}

fn cast(state: UseReducerHandle<VotingState>, user_id: String, poll_id: Uuid, option: String) {
    state.dispatch(Action::Casting(poll_id));
    wasm_bindgen_futures::spawn_local(async move {
        match api::cast_ballot(poll_id, &option).await {
            Ok(view) => state.dispatch(Action::BallotRecorded { view, user_id }),
            Err(e) => {
                // A closed poll or a removed option means the list is stale.
                let pending = if e.is_retryable() {
                    Pending::Ballot { poll_id, option }
                } else {
                    Pending::Reload
                };
                state.dispatch(Action::Failed(e, pending));
            }
        }
    });
}

#[function_component(Voting)]
pub fn voting() -> Html {
    let state = use_reducer(VotingState::default);
    let session = use_context::<Session>().unwrap_or_default();

    use_effect_with_deps({
        let state = state.clone();
        move |_| {
            let timer_state = state.clone();
            let interval = Interval::new(CONFIG.clock_tick_ms, move || {
                timer_state.dispatch(Action::Tick);
            });
            load(state);
            move || drop(interval)
        }
    }, ());

    let on_vote = {
        let state = state.clone();
        let user_id = session.user_id().map(str::to_string);
        Callback::from(move |(poll_id, option): (Uuid, String)| {
            match &user_id {
                Some(user_id) => cast(state.clone(), user_id.clone(), poll_id, option),
                None => state.dispatch(Action::Failed(
                    ErrorResponse::new(shared::ErrorCode::Unauthenticated, "Sign in to vote."),
                    Pending::Reload,
                )),
            }
        })
    };

    let on_retry = {
        let state = state.clone();
        let user_id = session.user_id().map(str::to_string);
        Callback::from(move |_: MouseEvent| {
            match (state.failure.as_ref().map(|(_, pending)| pending.clone()), &user_id) {
                (Some(Pending::Ballot { poll_id, option }), Some(user_id)) => {
                    cast(state.clone(), user_id.clone(), poll_id, option)
                }
                _ => {
                    state.dispatch(Action::Dismiss);
                    load(state.clone());
                }
            }
        })
    };

    let on_dismiss = {
        let state = state.clone();
        Callback::from(move |_: MouseEvent| state.dispatch(Action::Dismiss))
    };

    html! {
        <div class={CONTAINER}>
            <div class={combine_classes(FLEX_BETWEEN, "mb-6")}>
                <div>
                    <h1 class={combine_classes(HEADING_LG, "text-left mb-1")}>{"Community Votes"}</h1>
                    <p class={TEXT_MUTED}>
                        {if session.is_admin() {
                            "Create polls and follow the building's decisions."
                        } else {
                            "Take part in building decisions and see the results."
                        }}
                    </p>
                </div>
                {if session.is_admin() {
                    html! {
                        <Link<Route> to={Route::CreatePoll} classes={classes!(button_primary(false))}>
                            {"New Poll"}
                        </Link<Route>>
                    }
                } else { html! {} }}
            </div>

            {if let Some(error) = &session.error {
                html! { <ErrorAlert error={error.clone()} /> }
            } else { html! {} }}

            {if let Some((error, pending)) = &state.failure {
                html! {
                    <ErrorAlert
                        error={error.clone()}
                        on_retry={on_retry.clone()}
                        retry_label={if *pending == Pending::Reload { "Refresh" } else { "Retry" }}
                        on_dismiss={on_dismiss.clone()}
                    />
                }
            } else { html! {} }}

            {if let Some(summary) = &state.summary {
                html! {
                    <div class={combine_classes(GRID_COLS_2, "mb-6")}>
                        <div class={combine_classes(STATS_CARD, STATS_CARD_INFO)}>
                            <p class="text-sm">{"Active polls"}</p>
                            <p class="text-2xl font-bold">{summary.active_polls}</p>
                        </div>
                        <div class={combine_classes(STATS_CARD, STATS_CARD_SUCCESS)}>
                            <p class="text-sm">{"Your ballots"}</p>
                            <p class="text-2xl font-bold">{summary.my_ballots}</p>
                        </div>
                    </div>
                }
            } else { html! {} }}

            <div class={SPACE_Y_LG}>
                {for state.polls.iter().map(|view| html! {
                    <PollCard
                        key={view.poll.id.to_string()}
                        view={view.clone()}
                        now={state.now}
                        is_admin={session.is_admin()}
                        busy={state.casting == Some(view.poll.id)}
                        on_vote={on_vote.clone()}
                    />
                })}
            </div>

            {if !state.loaded {
                html! {
                    <div class="flex justify-center p-8">
                        <div class={combine_classes("animate-pulse", TEXT_MUTED)}>{"Loading polls..."}</div>
                    </div>
                }
            } else if state.polls.is_empty() && state.failure.is_none() {
                html! {
                    <div class={combine_classes(POLL_CARD, "text-center py-12")}>
                        <p class={combine_classes(TEXT_MUTED, "mb-4")}>{"No polls have been created yet."}</p>
                        {if session.is_admin() {
                            html! {
                                <Link<Route> to={Route::CreatePoll} classes={classes!(button_primary(false))}>
                                    {"Create the first poll"}
                                </Link<Route>>
                            }
                        } else { html! {} }}
                    </div>
                }
            } else { html! {} }}
        </div>
    }
}
