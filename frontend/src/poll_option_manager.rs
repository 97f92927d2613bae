use yew::prelude::*;
use web_sys::HtmlInputElement;
use crate::styles::*;

#[derive(Properties, PartialEq)]
pub struct PollOptionManagerProps {
    pub options: Vec<String>,
    pub on_change: Callback<Vec<String>>,
}

#[derive(Clone)]
pub enum Msg {
    AddOption,
    UpdateInput(String),
    StartEdit(usize),
    UpdateEdit(String),
    SaveEdit,
    DeleteOption(usize),
}

/// Editable list of answer choices for the create form. Choices are compared
/// exactly, the same way ballots are counted.
pub struct PollOptionManager {
    options: Vec<String>,
    input_value: String,
    editing_index: Option<usize>,
    edit_value: String,
    duplicate_error: Option<String>,
}

impl PollOptionManager {
    fn is_duplicate(&self, value: &str, skip: Option<usize>) -> bool {
        self.options
            .iter()
            .enumerate()
            .any(|(i, opt)| Some(i) != skip && opt == value)
    }

    fn publish(&self, ctx: &Context<Self>) {
        ctx.props().on_change.emit(self.options.clone());
    }
}

impl Component for PollOptionManager {
    type Message = Msg;
    type Properties = PollOptionManagerProps;

    fn create(ctx: &Context<Self>) -> Self {
        Self {
            options: ctx.props().options.clone(),
            input_value: String::new(),
            editing_index: None,
            edit_value: String::new(),
            duplicate_error: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::AddOption => {
                let value = self.input_value.trim().to_string();
                if value.is_empty() {
                    return false;
                }
                if self.is_duplicate(&value, None) {
                    self.duplicate_error = Some(format!("\"{value}\" is already an option"));
                } else {
                    self.options.push(value);
                    self.input_value.clear();
                    self.duplicate_error = None;
                    self.publish(ctx);
                }
                true
            }
            Msg::UpdateInput(value) => {
                self.input_value = value;
                self.duplicate_error = None;
                true
            }
            Msg::StartEdit(index) => {
                if let Some(option) = self.options.get(index) {
                    self.editing_index = Some(index);
                    self.edit_value = option.clone();
                    self.duplicate_error = None;
                }
                true
            }
            Msg::UpdateEdit(value) => {
                self.edit_value = value;
                self.duplicate_error = None;
                true
            }
            Msg::SaveEdit => {
                let Some(index) = self.editing_index else { return false };
                let value = self.edit_value.trim().to_string();
                if value.is_empty() {
                    return false;
                }
                if self.is_duplicate(&value, Some(index)) {
                    self.duplicate_error = Some(format!("\"{value}\" is already an option"));
                } else if let Some(slot) = self.options.get_mut(index) {
                    *slot = value;
                    self.editing_index = None;
                    self.edit_value.clear();
                    self.duplicate_error = None;
                    self.publish(ctx);
                }
                true
            }
            Msg::DeleteOption(index) => {
                if index < self.options.len() {
                    self.options.remove(index);
                    self.editing_index = None;
                    self.duplicate_error = None;
                    self.publish(ctx);
                }
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let on_enter = |msg: Msg| {
            ctx.link().batch_callback(move |e: KeyboardEvent| {
                if e.key() == "Enter" {
                    e.prevent_default();
                    vec![msg.clone()]
                } else {
                    vec![]
                }
            })
        };

        html! {
            <div class={SPACE_Y_LG}>
                <div class="flex gap-2">
                    <div class={INPUT_GROUP}>
                        <input
                            type="text"
                            value={self.input_value.clone()}
                            placeholder={format!("Option {}", self.options.len() + 1)}
                            class={INPUT_BASE}
                            oninput={ctx.link().callback(|e: InputEvent| {
                                let target = e.target_unchecked_into::<HtmlInputElement>();
                                Msg::UpdateInput(target.value())
                            })}
                            onkeypress={on_enter(Msg::AddOption)}
                        />
                    </div>
                    <button
                        type="button"
                        onclick={ctx.link().callback(|_| Msg::AddOption)}
                        disabled={self.input_value.trim().is_empty()}
                        class={button_primary(false)}
                    >
                        {"Add option"}
                    </button>
                </div>

                {if let Some(error) = &self.duplicate_error {
                    html! { <div class={TEXT_ERROR}>{error}</div> }
                } else { html! {} }}

                <ul class={SPACE_Y_BASE}>
                    {for self.options.iter().enumerate().map(|(index, option)| {
                        let is_editing = self.editing_index == Some(index);
                        html! {
                            <li class={CARD_SECTION}>
                                if is_editing {
                                    <div class="flex gap-2">
                                        <input
                                            type="text"
                                            value={self.edit_value.clone()}
                                            class={INPUT_BASE}
                                            oninput={ctx.link().callback(|e: InputEvent| {
                                                let target = e.target_unchecked_into::<HtmlInputElement>();
                                                Msg::UpdateEdit(target.value())
                                            })}
                                            onkeypress={on_enter(Msg::SaveEdit)}
                                        />
                                        <button
                                            type="button"
                                            onclick={ctx.link().callback(|_| Msg::SaveEdit)}
                                            disabled={self.edit_value.trim().is_empty()}
                                            class={combine_classes(BUTTON_BASE, BUTTON_SUCCESS)}
                                        >
                                            {"Save"}
                                        </button>
                                    </div>
                                } else {
                                    <div class="flex gap-2 flex-wrap items-start">
                                        <span class="text-white break-words flex-grow">{option}</span>
                                        <div class="flex gap-2">
                                            <button
                                                type="button"
                                                onclick={ctx.link().callback(move |_| Msg::StartEdit(index))}
                                                class={combine_classes(BUTTON_BASE, BUTTON_WARNING)}
                                            >
                                                {"Edit"}
                                            </button>
                                            <button
                                                type="button"
                                                onclick={ctx.link().callback(move |_| Msg::DeleteOption(index))}
                                                class={combine_classes(BUTTON_BASE, BUTTON_DANGER)}
                                            >
                                                {"Remove"}
                                            </button>
                                        </div>
                                    </div>
                                }
                            </li>
                        }
                    })}
                </ul>
            </div>
        }
    }
}
