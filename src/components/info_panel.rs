use yew::prelude::*;

use crate::model::{Coin, CoinSide, MISSING};

#[derive(Properties, PartialEq, Clone)]
pub struct InfoPanelProps {
    pub coin: Coin,
    pub side: CoinSide,
    pub open: bool,
    pub on_close: Callback<()>,
}

#[function_component(InfoPanel)]
pub fn info_panel(props: &InfoPanelProps) -> Html {
    if !props.open {
        return html! {};
    }
    let coin = &props.coin;
    let close = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };

    let panel_style = "position:absolute; left:0; right:0; bottom:0; max-height:70%; overflow-y:auto; \
        background:rgba(22,27,34,0.97); border-top:1px solid #30363d; border-radius:14px 14px 0 0; \
        padding:16px 20px 24px; font-size:14px; z-index:25;";
    let row_style = "display:flex; justify-content:space-between; margin:4px 0; font-size:13px;";
    let label_style = "color:#8b949e;";
    let section_style = "margin-top:12px; padding-top:8px; border-top:1px solid #30363d;";

    let side_text = coin.side_description(props.side).unwrap_or(MISSING).to_string();

    html! {
        <div style={panel_style}>
            <div style="display:flex; justify-content:space-between; align-items:center; margin-bottom:8px;">
                <span style="font-weight:600; font-size:17px;">{ coin.display_title() }</span>
                <button onclick={close}>{"Close"}</button>
            </div>
            { for coin.metadata_rows().into_iter().map(|(label, value)| html! {
                <div style={row_style}>
                    <span style={label_style}>{ label }</span>
                    <span>{ value }</span>
                </div>
            }) }
            <div style={section_style}>
                <div style={label_style}>{ props.side.label() }</div>
                <div>{ side_text }</div>
            </div>
            <div style={section_style}>
                { coin.description.as_deref().unwrap_or(MISSING).to_string() }
            </div>
        </div>
    }
}
