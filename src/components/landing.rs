use yew::prelude::*;

use super::app::{FlipperRoute, Route, use_app_context};

#[function_component(LandingScreen)]
pub fn landing_screen() -> Html {
    let ctx = use_app_context();
    let owned = ctx.wallet.borrow().list().len();
    let to_flipper = {
        let ctx = ctx.clone();
        Callback::from(move |_| ctx.navigate(Route::Flipper(FlipperRoute::default())))
    };
    let to_wallet = {
        let ctx = ctx.clone();
        Callback::from(move |_| ctx.navigate(Route::Wallet { teach: false }))
    };
    html! {
        <div style="min-height:100vh; display:flex; flex-direction:column; align-items:center; justify-content:center; gap:16px; padding:24px; box-sizing:border-box; text-align:center;">
            <h1 style="margin:0; font-size:28px; color:#58a6ff;">{"Coin Discoverer"}</h1>
            <p style="margin:0; max-width:420px; opacity:0.85; line-height:1.4;">
                {"Flip coins from the museum collection, guess how they land and keep the ones you find in your wallet."}
            </p>
            <div style="display:flex; gap:12px;">
                <button onclick={to_flipper}>{"Flip a coin"}</button>
                <button onclick={to_wallet}>{ format!("Wallet ({owned})") }</button>
            </div>
        </div>
    }
}
