use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use log::warn;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, MouseEvent, TouchEvent, TouchList, WheelEvent};
use yew::prelude::*;

use super::app::{AppContext, FlipperRoute, Route, use_app_context};
use super::{
    coin_view::CoinView, info_panel::InfoPanel, prediction_dialog::PredictionDialogView,
    result_area::ResultArea, tutorial_overlay::TutorialOverlay, zoom_controls::ZoomControls,
};
use crate::model::Coin;
use crate::state::flip::{FlipEvent, FlipPlan, FlipToken};
use crate::state::flipper::push_report;
use crate::state::prediction::DialogChoice;
use crate::state::touch::{Recognized, TouchPoint};
use crate::state::tutorial::{TutorialScreen, TutorialSignal, TutorialStep};
use crate::state::{FlipperController, TouchArbiter};
use crate::util::{EventListeners, JsRandom, now_ms};

/// Touch id given to the mouse pointer so it can share the arbiter.
const MOUSE_ID: i32 = -1;
/// Wheel delta that counts as one zoom step.
const WHEEL_NOTCH: f64 = 100.0;

#[derive(Clone, Copy)]
enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

#[derive(Properties, PartialEq, Clone)]
pub struct FlipperScreenProps {
    pub route: FlipperRoute,
}

/// Everything the DOM listeners and timers need, cheap to clone.
#[derive(Clone)]
struct Driver {
    controller: Rc<RefCell<FlipperController>>,
    arbiter: Rc<RefCell<TouchArbiter>>,
    flip_timers: Rc<RefCell<Vec<Timeout>>>,
    tap_timer: Rc<RefCell<Option<Timeout>>>,
    mouse_down: Rc<RefCell<bool>>,
    ctx: AppContext,
    coin: Rc<Coin>,
    redraw: UseForceUpdateHandle,
}

impl Driver {
    fn on_gestures(&self, gestures: Vec<Recognized>) {
        if gestures.is_empty() {
            return;
        }
        for gesture in gestures {
            self.on_gesture(gesture);
        }
        self.redraw.force_update();
    }

    fn on_gesture(&self, gesture: Recognized) {
        let teach = self.ctx.tutorial.borrow().current_step() == Some(TutorialStep::SwipedToWallet);
        let effect = self.controller.borrow_mut().handle(gesture);
        if matches!(gesture, Recognized::SingleTap) {
            self.flip_timers.borrow_mut().clear();
        }
        self.ctx.signal_all(&effect.signals);
        if effect.go_to_wallet {
            // Leave the DOM listener before this screen and its listeners go away.
            let ctx = self.ctx.clone();
            Timeout::new(0, move || ctx.navigate(Route::Wallet { teach })).forget();
        }
    }

    /// Runs arbiter output, then waits out the double-tap window if a
    /// single tap is being held.
    fn after_touch(&self, gestures: Vec<Recognized>) {
        self.on_gestures(gestures);
        let Some(deadline) = self.arbiter.borrow().pending_deadline() else {
            return;
        };
        let wait = (deadline - now_ms()).max(0.0).ceil() as u32 + 1;
        let driver = self.clone();
        *self.tap_timer.borrow_mut() = Some(Timeout::new(wait, move || {
            let tap = driver.arbiter.borrow_mut().poll(now_ms());
            driver.on_gestures(tap.into_iter().collect());
        }));
    }

    fn schedule(&self, started: Option<(FlipToken, FlipPlan)>) {
        let Some((token, plan)) = started else {
            return;
        };
        let mut timers = self.flip_timers.borrow_mut();
        timers.clear();
        for event in plan.events() {
            let driver = self.clone();
            let token = token.clone();
            let at = event.at_ms().round() as u32;
            timers.push(Timeout::new(at, move || driver.on_flip_event(&token, event)));
        }
    }

    fn on_flip_event(&self, token: &FlipToken, event: FlipEvent) {
        if !token.is_live() || !self.controller.borrow().is_mounted() {
            return;
        }
        let outcome = self.controller.borrow_mut().apply(token, event);
        if let Some(outcome) = outcome {
            self.ctx.collect(&self.coin, outcome.side);
        }
        self.redraw.force_update();
    }

    fn choose(&self, choice: DialogChoice) {
        let started = self
            .controller
            .borrow_mut()
            .resolve_dialog(choice, &mut JsRandom);
        self.schedule(started);
        self.redraw.force_update();
    }

    fn zoom(&self, factor: f64) {
        let report = self.controller.borrow_mut().zoom_by(factor);
        let mut signals = Vec::new();
        push_report(&mut signals, report);
        self.ctx.signal_all(&signals);
        self.redraw.force_update();
    }

    fn touch_input(&self, phase: TouchPhase, touches: &[TouchPoint]) {
        let pose = self.controller.borrow().arbiter_context();
        let now = now_ms();
        let out = {
            let mut arbiter = self.arbiter.borrow_mut();
            match phase {
                TouchPhase::Start => arbiter.touch_start(touches, now, pose),
                TouchPhase::Move => arbiter.touch_move(touches, now, pose),
                TouchPhase::End => arbiter.touch_end(touches, now, pose),
                TouchPhase::Cancel => arbiter.touch_cancel(),
            }
        };
        self.after_touch(out);
    }

    /// Wires touch, mouse and wheel input. Dropping the result detaches it.
    fn attach(&self, stage: HtmlElement, window: web_sys::Window) -> Vec<EventListeners> {
        let mut on_stage = EventListeners::new(stage);
        for (event, phase) in [
            ("touchstart", TouchPhase::Start),
            ("touchmove", TouchPhase::Move),
            ("touchend", TouchPhase::End),
            ("touchcancel", TouchPhase::Cancel),
        ] {
            let d = self.clone();
            on_stage.listen(event, move |e| {
                let e: TouchEvent = e.unchecked_into();
                e.prevent_default();
                d.touch_input(phase, &points(&e.touches()));
            });
        }
        {
            let d = self.clone();
            on_stage.listen("mousedown", move |e| {
                let e: MouseEvent = e.unchecked_into();
                if e.button() != 0 {
                    return;
                }
                *d.mouse_down.borrow_mut() = true;
                d.touch_input(TouchPhase::Start, &[mouse_point(&e)]);
            });
        }
        {
            let d = self.clone();
            on_stage.listen("mousemove", move |e| {
                let e: MouseEvent = e.unchecked_into();
                if *d.mouse_down.borrow() {
                    d.touch_input(TouchPhase::Move, &[mouse_point(&e)]);
                }
            });
        }
        {
            let d = self.clone();
            let step = self.ctx.config.gesture.wheel_zoom_step;
            on_stage.listen("wheel", move |e| {
                let e: WheelEvent = e.unchecked_into();
                e.prevent_default();
                d.zoom(step.powf(-e.delta_y() / WHEEL_NOTCH));
            });
        }
        // Released outside the stage still ends the press.
        let mut on_window = EventListeners::new(window);
        {
            let d = self.clone();
            on_window.listen("mouseup", move |_| {
                let was_down = std::mem::replace(&mut *d.mouse_down.borrow_mut(), false);
                if was_down {
                    d.touch_input(TouchPhase::End, &[]);
                }
            });
        }
        vec![on_stage, on_window]
    }
}

fn points(list: &TouchList) -> Vec<TouchPoint> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .map(|t| TouchPoint::new(t.identifier(), t.client_x() as f64, t.client_y() as f64))
        .collect()
}

fn mouse_point(e: &MouseEvent) -> TouchPoint {
    TouchPoint::new(MOUSE_ID, e.client_x() as f64, e.client_y() as f64)
}

#[function_component(FlipperScreen)]
pub fn flipper_screen(props: &FlipperScreenProps) -> Html {
    let ctx = use_app_context();
    let stage_ref = use_node_ref();
    let redraw = use_force_update();

    let coin = {
        let catalog = ctx.catalog.clone();
        use_memo(props.route.coin_id.clone(), move |id| {
            catalog.resolve(id.as_deref()).clone()
        })
    };
    let controller = {
        let config = ctx.config.clone();
        let open_info = props.route.open_info;
        use_mut_ref(move || {
            let mut c = FlipperController::new(&config, &mut JsRandom);
            if open_info {
                c.open_info();
            }
            c
        })
    };
    let arbiter = {
        let gesture = ctx.config.gesture.clone();
        use_mut_ref(move || TouchArbiter::new(&gesture))
    };
    let flip_timers = use_mut_ref(Vec::<Timeout>::new);
    let tap_timer = use_mut_ref(|| None::<Timeout>);
    let mouse_down = use_mut_ref(|| false);

    let driver = Driver {
        controller: controller.clone(),
        arbiter,
        flip_timers,
        tap_timer,
        mouse_down,
        ctx: ctx.clone(),
        coin: coin.clone(),
        redraw,
    };

    {
        let driver = driver.clone();
        let stage_ref = stage_ref.clone();
        let viewed_from_wallet = props.route.from_wallet && props.route.open_info;
        use_effect_with((), move |_| {
            if viewed_from_wallet {
                driver.ctx.signal(TutorialSignal::ViewedWalletInfo);
            }
            let listeners = match (stage_ref.cast::<HtmlElement>(), web_sys::window()) {
                (Some(stage), Some(window)) => driver.attach(stage, window),
                _ => {
                    warn!("flipper stage not mounted, input disabled");
                    Vec::new()
                }
            };
            move || {
                drop(listeners);
                driver.controller.borrow_mut().unmount();
                driver.flip_timers.borrow_mut().clear();
                driver.tap_timer.borrow_mut().take();
            }
        });
    }

    let on_choice = {
        let d = driver.clone();
        Callback::from(move |choice: DialogChoice| d.choose(choice))
    };
    let on_flip = {
        let d = driver.clone();
        Callback::from(move |_| {
            d.controller.borrow_mut().double_tap();
            d.redraw.force_update();
        })
    };
    let on_close_info = {
        let d = driver.clone();
        Callback::from(move |_| {
            d.controller.borrow_mut().close_info();
            d.redraw.force_update();
        })
    };
    let step = ctx.config.gesture.wheel_zoom_step;
    let on_zoom_in = {
        let d = driver.clone();
        Callback::from(move |_| d.zoom(step))
    };
    let on_zoom_out = {
        let d = driver.clone();
        Callback::from(move |_| d.zoom(1.0 / step))
    };
    let on_back = {
        let ctx = ctx.clone();
        Callback::from(move |_| ctx.navigate(Route::Landing))
    };
    let on_wallet = {
        let ctx = ctx.clone();
        Callback::from(move |_| ctx.navigate(Route::Wallet { teach: false }))
    };
    let on_skip = {
        let ctx = ctx.clone();
        Callback::from(move |_| ctx.skip_step())
    };
    let on_skip_all = {
        let ctx = ctx.clone();
        Callback::from(move |_| ctx.skip_tutorial())
    };

    let tutorial_step = ctx.tutorial.borrow().step_for(TutorialScreen::Flipper);
    let c = controller.borrow();
    let subtitle = coin.date.clone().unwrap_or_default();

    html! {
        <div style="position:relative; width:100vw; height:100vh; overflow:hidden; touch-action:none; user-select:none;">
            <div ref={stage_ref} style="position:absolute; inset:0; display:flex; align-items:center; justify-content:center;">
                <CoinView
                    image={coin.image(c.side())}
                    alt={coin.display_title()}
                    upright={c.upright()}
                    spin={c.spin()}
                    transform={c.pose().css_transform()}
                />
            </div>
            <div style="position:absolute; left:16px; bottom:84px; pointer-events:none; z-index:5;">
                <div style="font-size:20px; font-weight:600;">{ coin.display_title() }</div>
                <div style="font-size:12px; opacity:0.6;">{ subtitle }</div>
            </div>
            <ZoomControls {on_zoom_in} {on_zoom_out} {on_back} {on_wallet} />
            <ResultArea outcome={c.outcome()} flipping={c.is_flipping()} {on_flip} />
            <InfoPanel coin={(*coin).clone()} side={c.side()} open={c.info_open()} on_close={on_close_info} />
            <PredictionDialogView visible={c.dialog().is_visible()} {on_choice} />
            <TutorialOverlay step={tutorial_step} {on_skip} {on_skip_all} />
        </div>
    }
}
