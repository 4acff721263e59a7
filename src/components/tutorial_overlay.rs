use yew::prelude::*;

use crate::state::tutorial::TutorialStep;

#[derive(Properties, PartialEq, Clone)]
pub struct TutorialOverlayProps {
    pub step: Option<TutorialStep>,
    pub on_skip: Callback<()>,
    pub on_skip_all: Callback<()>,
}

#[function_component(TutorialOverlay)]
pub fn tutorial_overlay(props: &TutorialOverlayProps) -> Html {
    let Some(step) = props.step else {
        return html! {};
    };
    let number = TutorialStep::ORDER
        .iter()
        .position(|s| *s == step)
        .map_or(0, |i| i + 1);
    let skip = {
        let cb = props.on_skip.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let skip_all = {
        let cb = props.on_skip_all.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {
        <div style="position:absolute; top:12px; left:50%; transform:translateX(-50%); width:min(92%, 440px); background:rgba(0,0,0,0.82); border:1px solid #30363d; border-radius:10px; padding:12px 16px; font-size:14px; line-height:1.4; z-index:20;">
            <div style="font-size:11px; opacity:0.6; margin-bottom:4px;">
                { format!("Tutorial {number} / {}", TutorialStep::ORDER.len()) }
            </div>
            { for step.instruction().lines().map(|line| html! { <div>{ line }</div> }) }
            <div style="display:flex; gap:8px; justify-content:flex-end; margin-top:8px;">
                <button onclick={skip}>{"Skip step"}</button>
                <button onclick={skip_all}>{"Skip tutorial"}</button>
            </div>
        </div>
    }
}
