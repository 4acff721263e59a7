use yew::prelude::*;

use crate::model::CoinSide;
use crate::state::prediction::DialogChoice;

#[derive(Properties, PartialEq, Clone)]
pub struct PredictionDialogProps {
    pub visible: bool,
    pub on_choice: Callback<DialogChoice>,
}

#[function_component(PredictionDialogView)]
pub fn prediction_dialog(props: &PredictionDialogProps) -> Html {
    if !props.visible {
        return html! {};
    }
    let choose = |choice: DialogChoice| {
        let cb = props.on_choice.clone();
        Callback::from(move |_: MouseEvent| cb.emit(choice))
    };
    html! {
        <div onclick={choose(DialogChoice::Dismiss)} style="position:absolute; inset:0; background:rgba(0,0,0,0.55); display:flex; align-items:center; justify-content:center; z-index:30;">
            <div onclick={Callback::from(|e: MouseEvent| e.stop_propagation())} style="background:#161b22; border:1px solid #30363d; border-radius:12px; padding:20px 24px; width:min(86%, 340px); text-align:center;">
                <h3 style="margin:0 0 12px 0; color:#58a6ff;">{"How will it land?"}</h3>
                <div style="display:flex; gap:10px; justify-content:center; margin-bottom:12px;">
                    <button onclick={choose(DialogChoice::Predict(CoinSide::Heads))}>{ CoinSide::Heads.label() }</button>
                    <button onclick={choose(DialogChoice::Predict(CoinSide::Tails))}>{ CoinSide::Tails.label() }</button>
                </div>
                <button onclick={choose(DialogChoice::FlipWithoutPrediction)}>{"Just flip"}</button>
                <div style="margin-top:10px;">
                    <button onclick={choose(DialogChoice::Dismiss)} style="background:none; border:none; opacity:0.7;">{"Cancel"}</button>
                </div>
            </div>
        </div>
    }
}
