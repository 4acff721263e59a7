use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct ZoomControlsProps {
    pub on_zoom_in: Callback<()>,
    pub on_zoom_out: Callback<()>,
    pub on_back: Callback<()>,
    pub on_wallet: Callback<()>,
}

#[function_component(ZoomControls)]
pub fn zoom_controls(props: &ZoomControlsProps) -> Html {
    let zi = {
        let cb = props.on_zoom_in.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let zo = {
        let cb = props.on_zoom_out.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let back = {
        let cb = props.on_back.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let wallet = {
        let cb = props.on_wallet.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {<div style="position:absolute; right:12px; top:50%; transform:translateY(-50%); background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; display:flex; flex-direction:column; gap:6px; z-index:15;">
        <button onclick={zi}> {"+"} </button>
        <button onclick={zo}> {"-"} </button>
        <span style="height:6px;"></span>
        <button onclick={wallet}> {"Wallet"} </button>
        <button onclick={back}> {"Home"} </button>
    </div>}
}
