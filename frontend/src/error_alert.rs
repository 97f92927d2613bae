use yew::prelude::*;
use shared::ErrorResponse;
use crate::styles::*;

#[derive(Properties, PartialEq)]
pub struct ErrorAlertProps {
    pub error: ErrorResponse,
    #[prop_or_default]
    pub on_retry: Option<Callback<MouseEvent>>,
    #[prop_or("Retry")]
    pub retry_label: &'static str,
    #[prop_or_default]
    pub on_dismiss: Option<Callback<MouseEvent>>,
}

/// Failed requests are always shown; nothing is dropped silently.
#[function_component(ErrorAlert)]
pub fn error_alert(props: &ErrorAlertProps) -> Html {
    html! {
        <div class={alert_style("error")} role="alert">
            <div class={FLEX_BETWEEN}>
                <span class="font-medium">{&props.error.error}</span>
                <div class="flex gap-2">
                    {if let Some(on_retry) = &props.on_retry {
                        html! {
                            <button type="button" onclick={on_retry.clone()}
                                class={combine_classes(BUTTON_SMALL, BUTTON_GHOST)}>
                                {props.retry_label}
                            </button>
                        }
                    } else { html! {} }}
                    {if let Some(on_dismiss) = &props.on_dismiss {
                        html! {
                            <button type="button" onclick={on_dismiss.clone()}
                                class={combine_classes(BUTTON_SMALL, "bg-transparent")}>
                                {"×"}
                            </button>
                        }
                    } else { html! {} }}
                </div>
            </div>
        </div>
    }
}
