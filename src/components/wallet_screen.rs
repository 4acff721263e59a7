use web_sys::{Element, PointerEvent};
use yew::prelude::*;

use super::app::{FlipperRoute, Route, use_app_context};
use super::tutorial_overlay::TutorialOverlay;
use crate::state::tutorial::{TutorialScreen, TutorialSignal};

const TOKEN_PX: f64 = 96.0;

#[derive(Properties, PartialEq, Clone)]
pub struct WalletScreenProps {
    /// Arrived by the swipe the tutorial asked for.
    #[prop_or_default]
    pub teach: bool,
}

#[derive(Clone, Debug, PartialEq)]
struct Drag {
    id: String,
    /// Pointer position at press.
    origin: (f64, f64),
    /// Token position at press.
    start: (f64, f64),
    pos: (f64, f64),
    moved: bool,
}

#[function_component(WalletScreen)]
pub fn wallet_screen(props: &WalletScreenProps) -> Html {
    let ctx = use_app_context();
    let drag = use_mut_ref(|| None::<Drag>);
    let redraw = use_force_update();
    let slop = ctx.config.gesture.tap_slop_px;

    {
        let ctx = ctx.clone();
        let teach = props.teach;
        use_effect_with((), move |_| {
            if teach {
                ctx.signal(TutorialSignal::SwipedToWallet);
            }
        });
    }

    let entries = ctx.wallet.borrow().list().to_vec();
    let tokens = entries.iter().map(|entry| {
        let start = (entry.x, entry.y);
        let (x, y) = match &*drag.borrow() {
            Some(d) if d.id == entry.id => d.pos,
            _ => start,
        };
        let onpointerdown = {
            let drag = drag.clone();
            let id = entry.id.clone();
            Callback::from(move |e: PointerEvent| {
                if let Some(target) = e.target_dyn_into::<Element>() {
                    let _ = target.set_pointer_capture(e.pointer_id());
                }
                *drag.borrow_mut() = Some(Drag {
                    id: id.clone(),
                    origin: (e.client_x() as f64, e.client_y() as f64),
                    start,
                    pos: start,
                    moved: false,
                });
            })
        };
        let onpointermove = {
            let drag = drag.clone();
            let redraw = redraw.clone();
            Callback::from(move |e: PointerEvent| {
                let mut current = drag.borrow_mut();
                let Some(d) = current.as_mut() else {
                    return;
                };
                let dx = e.client_x() as f64 - d.origin.0;
                let dy = e.client_y() as f64 - d.origin.1;
                if !d.moved && dx.hypot(dy) <= slop {
                    return;
                }
                d.moved = true;
                d.pos = ((d.start.0 + dx).max(0.0), (d.start.1 + dy).max(0.0));
                drop(current);
                redraw.force_update();
            })
        };
        let onpointerup = {
            let drag = drag.clone();
            let ctx = ctx.clone();
            let redraw = redraw.clone();
            Callback::from(move |_: PointerEvent| {
                let Some(d) = drag.borrow_mut().take() else {
                    return;
                };
                if !d.moved {
                    ctx.navigate(Route::Flipper(FlipperRoute {
                        coin_id: Some(d.id),
                        open_info: true,
                        from_wallet: true,
                    }));
                    return;
                }
                if ctx.move_coin(&d.id, d.pos.0, d.pos.1) {
                    ctx.signal(TutorialSignal::DraggedCoin);
                }
                redraw.force_update();
            })
        };
        let onpointercancel = {
            let drag = drag.clone();
            let redraw = redraw.clone();
            Callback::from(move |_: PointerEvent| {
                drag.borrow_mut().take();
                redraw.force_update();
            })
        };

        let face = match ctx.catalog.find(&entry.id) {
            Some(coin) => html! {
                <img src={coin.image(entry.side)} alt={coin.display_title()} draggable="false"
                    style="width:100%; height:100%; border-radius:50%; pointer-events:none;" />
            },
            None => html! { <span style="font-size:12px;">{ entry.id.clone() }</span> },
        };
        html! {
            <div
                key={entry.id.clone()}
                {onpointerdown} {onpointermove} {onpointerup} {onpointercancel}
                style={format!("position:absolute; left:{x:.0}px; top:{y:.0}px; width:{TOKEN_PX}px; height:{TOKEN_PX}px; display:flex; align-items:center; justify-content:center; border-radius:50%; background:#161b22; touch-action:none; cursor:grab;")}
            >
                { face }
            </div>
        }
    });

    let to_flipper = {
        let ctx = ctx.clone();
        Callback::from(move |_| ctx.navigate(Route::Flipper(FlipperRoute::default())))
    };
    let to_landing = {
        let ctx = ctx.clone();
        Callback::from(move |_| ctx.navigate(Route::Landing))
    };
    let on_skip = {
        let ctx = ctx.clone();
        Callback::from(move |_| ctx.skip_step())
    };
    let on_skip_all = {
        let ctx = ctx.clone();
        Callback::from(move |_| ctx.skip_tutorial())
    };
    // Wallet steps stay visible on every visit until done or skipped.
    let tutorial_step = ctx.tutorial.borrow().step_for(TutorialScreen::Wallet);

    html! {
        <div style="position:relative; width:100vw; height:100vh; overflow:hidden; user-select:none;">
            <div style="display:flex; justify-content:space-between; align-items:center; padding:12px 16px; border-bottom:1px solid #30363d;">
                <button onclick={to_landing}>{"Home"}</button>
                <span style="font-weight:600;">{ format!("Wallet · {}", entries.len()) }</span>
                <button onclick={to_flipper}>{"Flip"}</button>
            </div>
            <div style="position:relative; height:calc(100% - 58px);">
                if entries.is_empty() {
                    <p style="text-align:center; opacity:0.6; margin-top:40px;">{"No coins yet. Flip one to collect it."}</p>
                }
                { for tokens }
            </div>
            <TutorialOverlay step={tutorial_step} {on_skip} {on_skip_all} />
        </div>
    }
}
