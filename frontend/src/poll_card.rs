use time::OffsetDateTime;
use uuid::Uuid;
use yew::prelude::*;
use yew_router::prelude::*;
use shared::{deadline::format_deadline_display, evaluator, OptionTally, PollView};
use crate::{clock, styles::*, Route};

#[derive(Properties, PartialEq)]
pub struct PollCardProps {
    pub view: PollView,
    pub now: OffsetDateTime,
    pub is_admin: bool,
    /// A ballot for this poll is in flight.
    pub busy: bool,
    pub on_vote: Callback<(Uuid, String)>,
}

#[function_component(PollCard)]
pub fn poll_card(props: &PollCardProps) -> Html {
    let view = &props.view;
    let poll = &view.poll;
    // Re-evaluated against the local clock so a card closes without a refetch.
    let active = evaluator::is_active(Some(poll), props.now);
    let voted = view.my_choice.is_some();
    let show_bars = !active || voted || props.is_admin;

    html! {
        <div class={POLL_CARD}>
            <div class="flex flex-col lg:flex-row lg:items-start lg:justify-between gap-4 mb-4">
                <div class="flex-1">
                    <h2 class={HEADING_SM}>{&poll.title}</h2>
                    <p class={combine_classes(TEXT_MUTED, "mb-4 whitespace-pre-line")}>{&poll.description}</p>
                    <div class="flex flex-wrap items-center gap-4 text-sm text-gray-300">
                        <span>{"Closes: "}{format_deadline_display(poll.deadline, clock::offset_at(poll.deadline))}</span>
                        <span>{format!("{} votes", view.total_votes)}</span>
                        <span class={if active { BADGE_ACTIVE } else { BADGE_CLOSED }}>
                            {if active { "Open" } else { "Closed" }}
                        </span>
                        {match clock::time_left(poll.deadline, props.now).filter(|_| active) {
                            Some(left) => html! { <span class={TEXT_MUTED}>{left}{" left"}</span> },
                            None => html! {},
                        }}
                    </div>
                </div>
                <div class="flex items-center gap-3">
                    {match &view.my_choice {
                        Some(choice) => html! {
                            <span class="text-sm text-green-300">{"You voted: "}<strong>{choice}</strong></span>
                        },
                        None => html! {},
                    }}
                    {if props.is_admin {
                        html! {
                            <Link<Route> to={Route::EditPoll { id: poll.id.to_string() }}
                                classes={classes!(combine_classes(BUTTON_SMALL, BUTTON_GHOST))}>
                                {"Edit"}
                            </Link<Route>>
                        }
                    } else { html! {} }}
                </div>
            </div>

            <div class={SPACE_Y_BASE}>
                {for view.results.iter().map(|row| render_option(props, row, active && !voted, show_bars))}
            </div>

            {if view.uncounted_ballots > 0 {
                html! {
                    <p class={combine_classes(TEXT_MUTED, "mt-3 italic")}>
                        {format!("{} ballot(s) name options this poll no longer offers and are not counted.", view.uncounted_ballots)}
                    </p>
                }
            } else { html! {} }}

            {if active && !voted {
                html! { <div class={HINT_CARD}>{"Pick the option you prefer to cast your vote."}</div> }
            } else { html! {} }}
        </div>
    }
}

fn render_option(props: &PollCardProps, row: &OptionTally, can_vote: bool, show_bar: bool) -> Html {
    let chosen = props.view.my_choice.as_deref() == Some(row.option.as_str());
    let onclick = {
        let on_vote = props.on_vote.clone();
        let poll_id = props.view.poll.id;
        let option = row.option.clone();
        Callback::from(move |_: MouseEvent| on_vote.emit((poll_id, option.clone())))
    };

    html! {
        <div class="space-y-2">
            <div class={FLEX_BETWEEN}>
                <div class="flex items-center gap-2">
                    {if can_vote {
                        html! {
                            <button type="button" {onclick} disabled={props.busy}
                                class={combine_classes(BUTTON_SMALL, BUTTON_PRIMARY)}>
                                {"Vote"}
                            </button>
                        }
                    } else if chosen {
                        html! { <span class="w-12 text-center text-green-400">{"✓"}</span> }
                    } else {
                        html! { <span class="w-12" /> }
                    }}
                    <span class={if chosen { "text-white font-semibold" } else { "text-gray-200" }}>{&row.option}</span>
                </div>
                <span class={TEXT_MUTED}>
                    {format!("{} votes ({})", row.count, evaluator::format_percentage(row.percentage))}
                </span>
            </div>
            {if show_bar {
                html! {
                    <div class={PROGRESS_TRACK}>
                        <div class={if chosen { PROGRESS_FILL_CHOSEN } else { PROGRESS_FILL }}
                            style={progress_width(row.percentage)} />
                    </div>
                }
            } else { html! {} }}
        </div>
    }
}
