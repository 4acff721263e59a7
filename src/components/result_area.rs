use yew::prelude::*;

use crate::model::FlipOutcome;

#[derive(Properties, PartialEq, Clone)]
pub struct ResultAreaProps {
    pub outcome: Option<FlipOutcome>,
    pub flipping: bool,
    pub on_flip: Callback<()>,
}

#[function_component(ResultArea)]
pub fn result_area(props: &ResultAreaProps) -> Html {
    let flip = {
        let cb = props.on_flip.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let line = match (props.flipping, props.outcome) {
        (true, _) => html! { <span style="opacity:0.7;">{"Flipping…"}</span> },
        (false, Some(outcome)) => html! {
            <>
                <span>{ outcome.side.label() }</span>
                if let Some(verdict) = outcome.verdict() {
                    <span style={format!("margin-left:10px; color:{}; font-weight:600;", verdict.color())}>
                        { verdict.text() }
                    </span>
                }
            </>
        },
        (false, None) => html! { <span style="opacity:0.6;">{"Tap to turn, double-tap to flip"}</span> },
    };
    html! {
        <div style="position:absolute; left:0; right:0; bottom:0; padding:14px 16px 22px; display:flex; align-items:center; justify-content:space-between; background:linear-gradient(transparent, rgba(13,17,23,0.95)); z-index:10;">
            <div style="font-size:16px;">{ line }</div>
            <button onclick={flip} disabled={props.flipping}>{"Flip"}</button>
        </div>
    }
}
