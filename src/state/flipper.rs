//! Per-screen coordinator of the coin flip view.
//!
//! Owns the displayed face, the running spin, the last outcome and the
//! pending prediction together with the dialog and the inspection session.
//! Timers and DOM events call in here; nothing in this module touches the
//! page. Once [`FlipperController::unmount`] ran every entry point is a
//! no-op, so late timer callbacks and listeners are harmless.

use log::{debug, info};

use crate::config::{AppConfig, FlipConfig};
use crate::model::{CoinSide, FlipOutcome};
use crate::state::flip::{FlipEngine, FlipEvent, FlipPlan, FlipToken};
use crate::state::gesture::{GestureReport, GestureSession, GestureSessionState, TransformDelta};
use crate::state::prediction::{DialogChoice, PredictionDialog};
use crate::state::touch::{ArbiterContext, Recognized, SwipeDirection};
use crate::state::tutorial::TutorialSignal;
use crate::util::RandomSource;

/// The continuous rotation drawn while a flip runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spin {
    pub flip_id: u64,
    pub half_turns: u32,
    pub duration_ms: u32,
}

/// What a recognized gesture caused, for the screen to act on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GestureEffect {
    pub signals: Vec<TutorialSignal>,
    pub go_to_wallet: bool,
}

pub struct FlipperController {
    engine: FlipEngine,
    flip_cfg: FlipConfig,
    side: CoinSide,
    upright: bool,
    spin: Option<Spin>,
    outcome: Option<FlipOutcome>,
    prediction: Option<CoinSide>,
    dialog: PredictionDialog,
    gesture: GestureSession,
    info_open: bool,
    mounted: bool,
}

impl FlipperController {
    /// Starts on a random face.
    pub fn new(cfg: &AppConfig, rng: &mut dyn RandomSource) -> Self {
        let side = if rng.next_f64() < 0.5 {
            CoinSide::Heads
        } else {
            CoinSide::Tails
        };
        Self {
            engine: FlipEngine::new(),
            flip_cfg: cfg.flip.normalized(),
            side,
            upright: true,
            spin: None,
            outcome: None,
            prediction: None,
            dialog: PredictionDialog::default(),
            gesture: GestureSession::new(&cfg.gesture),
            info_open: false,
            mounted: true,
        }
    }

    pub fn side(&self) -> CoinSide {
        self.side
    }

    pub fn upright(&self) -> bool {
        self.upright
    }

    pub fn spin(&self) -> Option<Spin> {
        self.spin
    }

    pub fn is_flipping(&self) -> bool {
        self.spin.is_some()
    }

    pub fn outcome(&self) -> Option<FlipOutcome> {
        self.outcome
    }

    #[cfg(test)]
    pub fn pending_prediction(&self) -> Option<CoinSide> {
        self.prediction
    }

    pub fn dialog(&self) -> PredictionDialog {
        self.dialog
    }

    pub fn pose(&self) -> &GestureSessionState {
        self.gesture.state()
    }

    pub fn info_open(&self) -> bool {
        self.info_open
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Pose the touch arbiter needs to pick its recognizers.
    pub fn arbiter_context(&self) -> ArbiterContext {
        ArbiterContext {
            zoomed: self.gesture.is_zoomed(),
            neutral: self.gesture.is_neutral(),
        }
    }

    /// Cancels any running flip and plans a new one from the shown face.
    /// The caller schedules `plan.events()` and hands each back to
    /// [`apply`](Self::apply) with the token.
    pub fn start_flip(
        &mut self,
        prediction: Option<CoinSide>,
        rng: &mut dyn RandomSource,
    ) -> Option<(FlipToken, FlipPlan)> {
        if !self.mounted {
            return None;
        }
        let (token, plan) = self.engine.start(self.side, &self.flip_cfg, rng);
        self.outcome = None;
        self.prediction = prediction;
        self.upright = true;
        self.spin = Some(Spin {
            flip_id: token.id(),
            half_turns: plan.half_turns(),
            duration_ms: plan.duration_ms(),
        });
        Some((token, plan))
    }

    /// Applies one scheduled event. Returns the outcome when `event` is the
    /// final toggle of the live flip.
    pub fn apply(&mut self, token: &FlipToken, event: FlipEvent) -> Option<FlipOutcome> {
        if !self.mounted || !token.is_live() {
            return None;
        }
        match event {
            FlipEvent::Toggle {
                side,
                upright,
                is_final,
                ..
            } => {
                self.side = side;
                self.upright = upright;
                if !is_final {
                    return None;
                }
                let outcome = FlipOutcome::flipped(side, self.prediction.take());
                info!("flip {} landed on {}", token.id(), side.label());
                self.outcome = Some(outcome);
                Some(outcome)
            }
            FlipEvent::Settle { .. } => {
                self.spin = None;
                self.upright = true;
                None
            }
        }
    }

    /// Turns the coin over by hand, voiding any running flip.
    pub fn manual_toggle(&mut self) -> Option<FlipOutcome> {
        if !self.mounted {
            return None;
        }
        self.engine.cancel();
        self.spin = None;
        self.upright = true;
        self.prediction = None;
        self.side = self.side.flipped();
        let outcome = FlipOutcome::manual(self.side);
        self.outcome = Some(outcome);
        Some(outcome)
    }

    /// Opens the prediction dialog; refused while the coin is zoomed.
    pub fn double_tap(&mut self) -> bool {
        if !self.mounted || !self.gesture.at_rest_scale() {
            debug!("double tap ignored");
            return false;
        }
        self.prediction = None;
        self.dialog.open();
        true
    }

    pub fn resolve_dialog(
        &mut self,
        choice: DialogChoice,
        rng: &mut dyn RandomSource,
    ) -> Option<(FlipToken, FlipPlan)> {
        if !self.mounted {
            return None;
        }
        let request = self.dialog.resolve(choice)?;
        self.start_flip(request.prediction, rng)
    }

    pub fn transform(&mut self, delta: TransformDelta) -> GestureReport {
        if !self.mounted {
            return GestureReport::default();
        }
        self.gesture.apply(delta)
    }

    pub fn end_transform(&mut self) -> GestureReport {
        if !self.mounted {
            return GestureReport::default();
        }
        self.gesture.commit()
    }

    /// Wheel and button zoom by `factor`.
    pub fn zoom_by(&mut self, factor: f64) -> GestureReport {
        if !self.mounted {
            return GestureReport::default();
        }
        self.gesture.nudge(factor)
    }

    /// Returns `true` when the panel was closed before.
    pub fn open_info(&mut self) -> bool {
        if !self.mounted || self.info_open {
            return false;
        }
        self.info_open = true;
        true
    }

    pub fn close_info(&mut self) {
        if self.mounted {
            self.info_open = false;
        }
    }

    /// Voids the running flip and turns every later call into a no-op.
    pub fn unmount(&mut self) {
        if self.mounted {
            self.engine.cancel();
            self.spin = None;
            self.mounted = false;
        }
    }

    /// Routes one arbiter result to the matching action.
    pub fn handle(&mut self, gesture: Recognized) -> GestureEffect {
        let mut effect = GestureEffect::default();
        if !self.mounted {
            return effect;
        }
        match gesture {
            Recognized::SingleTap => {
                if self.manual_toggle().is_some() {
                    effect.signals.push(TutorialSignal::ManualTap);
                }
            }
            Recognized::DoubleTap => {
                if self.double_tap() {
                    effect.signals.push(TutorialSignal::DoubleTapped);
                }
            }
            Recognized::Transform(delta) => {
                let report = self.transform(delta);
                push_report(&mut effect.signals, report);
            }
            Recognized::TransformEnd => {
                let report = self.end_transform();
                push_report(&mut effect.signals, report);
            }
            Recognized::Swipe(SwipeDirection::Up) => {
                if self.open_info() {
                    effect.signals.push(TutorialSignal::OpenedInfo);
                }
            }
            Recognized::Swipe(SwipeDirection::Down) => self.close_info(),
            Recognized::Swipe(SwipeDirection::Left) => {
                effect.go_to_wallet = true;
            }
            Recognized::Swipe(SwipeDirection::Right) => {}
        }
        effect
    }
}

pub fn push_report(signals: &mut Vec<TutorialSignal>, report: GestureReport) {
    if report.zoomed_in {
        signals.push(TutorialSignal::ZoomedIn);
    }
    if report.rotated {
        signals.push(TutorialSignal::Rotated);
    }
    if report.zoomed_out {
        signals.push(TutorialSignal::ZoomedOut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Verdict;
    use crate::state::storage::MemoryStore;
    use crate::state::tutorial::{TutorialStep, TutorialTracker};
    use crate::util::testing::SequenceRandom;

    /// Starts on heads and flips with exactly `toggles` toggles over 1000 ms.
    fn controller(toggles: u32) -> FlipperController {
        let mut cfg = AppConfig::default();
        cfg.flip = FlipConfig {
            min_toggles: toggles,
            max_toggles: toggles,
            min_duration_ms: 1000,
            max_duration_ms: 1000,
        };
        FlipperController::new(&cfg, &mut SequenceRandom::new(&[0.0]))
    }

    fn rng() -> SequenceRandom {
        SequenceRandom::new(&[0.5])
    }

    fn run(c: &mut FlipperController, token: &FlipToken, plan: &FlipPlan) -> Vec<FlipOutcome> {
        plan.events().filter_map(|e| c.apply(token, e)).collect()
    }

    #[test]
    fn starting_face_comes_from_the_random_source() {
        let cfg = AppConfig::default();
        let heads = FlipperController::new(&cfg, &mut SequenceRandom::new(&[0.2]));
        let tails = FlipperController::new(&cfg, &mut SequenceRandom::new(&[0.7]));
        assert_eq!(heads.side(), CoinSide::Heads);
        assert_eq!(tails.side(), CoinSide::Tails);
        assert_eq!(tails.outcome(), None);
    }

    #[test]
    fn two_taps_advance_the_tutorial_to_zoom() {
        let mut c = controller(3);
        let mut tutorial = TutorialTracker::load(Box::new(MemoryStore::new()));
        for _ in 0..2 {
            for s in c.handle(Recognized::SingleTap).signals {
                tutorial.signal(s);
            }
        }
        assert_eq!(c.side(), CoinSide::Heads);
        assert_eq!(tutorial.current_step(), Some(TutorialStep::ZoomedIn));
    }

    #[test]
    fn double_tap_while_zoomed_opens_nothing() {
        let mut c = controller(3);
        c.transform(TransformDelta::zoom(1.3));
        c.end_transform();
        let effect = c.handle(Recognized::DoubleTap);
        assert!(effect.signals.is_empty());
        assert!(!c.dialog().is_visible());
    }

    #[test]
    fn double_tap_at_rest_opens_the_dialog() {
        let mut c = controller(3);
        assert_eq!(
            c.handle(Recognized::DoubleTap).signals,
            vec![TutorialSignal::DoubleTapped]
        );
        assert!(c.dialog().is_visible());
    }

    #[test]
    fn wrong_prediction_reads_incorrect() {
        let mut c = controller(2);
        assert!(c.double_tap());
        let (token, plan) = c
            .resolve_dialog(DialogChoice::Predict(CoinSide::Tails), &mut rng())
            .unwrap();
        assert_eq!(c.pending_prediction(), Some(CoinSide::Tails));
        let outcomes = run(&mut c, &token, &plan);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].side, CoinSide::Heads);
        assert_eq!(outcomes[0].verdict(), Some(Verdict::Incorrect));
        assert_eq!(c.pending_prediction(), None);
        assert!(!c.is_flipping());
        assert!(c.upright());
    }

    #[test]
    fn flip_without_prediction_has_no_verdict() {
        let mut c = controller(3);
        c.double_tap();
        let (token, plan) = c
            .resolve_dialog(DialogChoice::FlipWithoutPrediction, &mut rng())
            .unwrap();
        let outcome = run(&mut c, &token, &plan)[0];
        assert_eq!(outcome.side, CoinSide::Tails);
        assert_eq!(outcome.verdict(), None);
    }

    #[test]
    fn dismissing_the_dialog_does_not_flip() {
        let mut c = controller(3);
        c.double_tap();
        assert!(c.resolve_dialog(DialogChoice::Dismiss, &mut rng()).is_none());
        assert!(!c.is_flipping());
        assert!(!c.dialog().is_visible());
    }

    #[test]
    fn new_flip_voids_the_old_one() {
        let mut c = controller(3);
        let (old, old_plan) = c.start_flip(None, &mut rng()).unwrap();
        let mut old_events = old_plan.events();
        c.apply(&old, old_events.next().unwrap());
        assert_eq!(c.side(), CoinSide::Tails);

        let (new, new_plan) = c.start_flip(Some(CoinSide::Heads), &mut rng()).unwrap();
        for e in old_events {
            assert_eq!(c.apply(&old, e), None);
        }
        assert_eq!(c.side(), CoinSide::Tails);
        assert_eq!(c.spin().map(|s| s.flip_id), Some(new.id()));

        let outcomes = run(&mut c, &new, &new_plan);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].side, CoinSide::Heads);
        assert_eq!(outcomes[0].verdict(), Some(Verdict::Correct));
    }

    #[test]
    fn manual_toggle_cancels_and_clears_the_prediction() {
        let mut c = controller(5);
        let (token, plan) = c.start_flip(Some(CoinSide::Heads), &mut rng()).unwrap();
        let mut events = plan.events();
        c.apply(&token, events.next().unwrap());
        assert!(!c.upright());

        let outcome = c.manual_toggle().unwrap();
        assert_eq!(outcome.side, CoinSide::Heads);
        assert_eq!(outcome.verdict(), None);
        assert!(c.upright());
        assert!(!c.is_flipping());
        assert_eq!(c.pending_prediction(), None);

        assert!(events.all(|e| c.apply(&token, e).is_none()));
        assert_eq!(c.side(), CoinSide::Heads);
        assert_eq!(c.outcome(), Some(outcome));
    }

    #[test]
    fn nothing_happens_after_unmount() {
        let mut c = controller(3);
        let (token, plan) = c.start_flip(None, &mut rng()).unwrap();
        c.unmount();
        assert!(run(&mut c, &token, &plan).is_empty());
        assert_eq!(c.side(), CoinSide::Heads);
        assert!(c.manual_toggle().is_none());
        assert!(!c.double_tap());
        assert!(c.start_flip(None, &mut rng()).is_none());
        assert!(!c.open_info());
        assert_eq!(c.handle(Recognized::SingleTap), GestureEffect::default());
        assert_eq!(c.side(), CoinSide::Heads);
    }

    #[test]
    fn swipes_open_info_and_leave_for_the_wallet() {
        let mut c = controller(3);
        let up = c.handle(Recognized::Swipe(SwipeDirection::Up));
        assert_eq!(up.signals, vec![TutorialSignal::OpenedInfo]);
        assert!(c.info_open());
        assert!(c.handle(Recognized::Swipe(SwipeDirection::Up)).signals.is_empty());
        c.handle(Recognized::Swipe(SwipeDirection::Down));
        assert!(!c.info_open());
        let left = c.handle(Recognized::Swipe(SwipeDirection::Left));
        assert!(left.go_to_wallet);
        // The wallet counts the arrival itself.
        assert!(left.signals.is_empty());
    }

    #[test]
    fn pinch_in_and_out_reports_each_step() {
        let mut c = controller(3);
        let mut signals = c
            .handle(Recognized::Transform(TransformDelta {
                scale: 2.0,
                translation: (0.0, 0.0),
                rotation: 0.5,
            }))
            .signals;
        signals.extend(c.handle(Recognized::TransformEnd).signals);
        assert!(!c.arbiter_context().neutral);
        signals.extend(c.handle(Recognized::Transform(TransformDelta::zoom(0.1))).signals);
        signals.extend(c.handle(Recognized::TransformEnd).signals);
        assert_eq!(
            signals,
            vec![
                TutorialSignal::ZoomedIn,
                TutorialSignal::Rotated,
                TutorialSignal::ZoomedOut
            ]
        );
        assert_eq!(*c.pose(), GestureSessionState::default());
        assert!(c.arbiter_context().neutral);
    }
}
