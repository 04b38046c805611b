use leptos::prelude::*;
use crate::player::Player;
use crate::state::AppState;

#[component]
pub fn CreditsPanel() -> impl IntoView {
    let state = expect_context::<AppState>();
    let player = expect_context::<Player>();

    let content = move || {
        let controller = player.controller();
        let Some(work) = controller.catalog().work(state.work_index.get()) else {
            return view! { <p class="no-credits">"No credits available"</p> }.into_any();
        };
        let lines: Vec<(&'static str, String)> = work
            .credits
            .lines()
            .into_iter()
            .map(|(label, value)| (label, value.to_string()))
            .collect();
        let title = work.title.clone();
        let author = work.author.clone();

        view! {
            <div class="credit-line">
                <span class="credit-title">{title}</span>
            </div>
            {(!author.is_empty()).then(|| view! {
                <div class="credit-line">
                    <span class="credit-author">{author}</span>
                </div>
            })}
            {if lines.is_empty() {
                view! { <p class="no-credits">"No credits available"</p> }.into_any()
            } else {
                lines
                    .into_iter()
                    .map(|(label, value)| view! {
                        <div class="credit-line">
                            <span class="credit-label">{format!("{label} :")}</span>
                            <span class="credit-value">{value}</span>
                        </div>
                    })
                    .collect_view()
                    .into_any()
            }}
        }
        .into_any()
    };

    view! {
        // Scrolling the credits must not change works.
        <div class="credits-panel" on:wheel=|ev: web_sys::WheelEvent| ev.stop_propagation()>
            <div class="credits-content">{content}</div>
        </div>
    }
}
