//! Touch arbitration over the coin.
//!
//! Raw touch lists go in, at most one high-level gesture (or the transform
//! group) comes out. Precedence is fixed:
//!
//! * a single tap waits for the double tap to fail: the first tap is held as
//!   pending until the double-tap window passes or something else claims the
//!   input;
//! * taps fail as soon as the press moves past the slop, lasts too long or a
//!   second finger lands, so a pinch never also reads as a tap;
//! * pinch, rotate and pan are one simultaneous group driven by two fingers;
//!   a single finger pans only on a zoomed coin;
//! * a single-finger full-screen swipe is only considered in the neutral
//!   pose.

use std::f64::consts::PI;

use crate::config::GestureConfig;
use crate::state::gesture::TransformDelta;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    pub id: i32,
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    pub fn new(id: i32, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Recognized {
    SingleTap,
    DoubleTap,
    Transform(TransformDelta),
    TransformEnd,
    Swipe(SwipeDirection),
}

/// Pose of the coin when the event arrives; enables or disables recognizers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArbiterContext {
    pub zoomed: bool,
    pub neutral: bool,
}

impl Default for ArbiterContext {
    fn default() -> Self {
        Self {
            zoomed: false,
            neutral: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Baseline {
    ids: Vec<i32>,
    centroid: (f64, f64),
    distance: f64,
    angle: f64,
}

impl Baseline {
    fn from_touches(touches: &[TouchPoint]) -> Option<Self> {
        let tracked: Vec<TouchPoint> = touches.iter().take(2).copied().collect();
        let (centroid, distance, angle) = measure(&tracked)?;
        Some(Self {
            ids: tracked.iter().map(|t| t.id).collect(),
            centroid,
            distance,
            angle,
        })
    }

    fn tracked(&self, touches: &[TouchPoint]) -> Option<Vec<TouchPoint>> {
        self.ids
            .iter()
            .map(|id| touches.iter().find(|t| t.id == *id).copied())
            .collect()
    }

    fn delta(&self, touches: &[TouchPoint]) -> Option<TransformDelta> {
        let (centroid, distance, angle) = measure(&self.tracked(touches)?)?;
        let scale = if self.ids.len() >= 2 && self.distance > f64::EPSILON {
            distance / self.distance
        } else {
            1.0
        };
        let rotation = if self.ids.len() >= 2 {
            normalize_angle(angle - self.angle)
        } else {
            0.0
        };
        Some(TransformDelta {
            scale,
            translation: (centroid.0 - self.centroid.0, centroid.1 - self.centroid.1),
            rotation,
        })
    }
}

/// Centroid, spread and angle of one or two touches.
fn measure(touches: &[TouchPoint]) -> Option<((f64, f64), f64, f64)> {
    match touches {
        [] => None,
        [a] => Some(((a.x, a.y), 0.0, 0.0)),
        [a, b, ..] => {
            let dx = b.x - a.x;
            let dy = b.y - a.y;
            Some((
                ((a.x + b.x) * 0.5, (a.y + b.y) * 0.5),
                dx.hypot(dy),
                dy.atan2(dx),
            ))
        }
    }
}

fn normalize_angle(mut a: f64) -> f64 {
    while a > PI {
        a -= 2.0 * PI;
    }
    while a <= -PI {
        a += 2.0 * PI;
    }
    a
}

#[derive(Clone, Debug, PartialEq)]
enum Phase {
    Idle,
    Pressed { origin: (f64, f64), at: f64 },
    Swiping { origin: (f64, f64), last: (f64, f64) },
    Transforming { baseline: Baseline },
    /// Claimed by nothing; wait for every finger to lift.
    Ignored,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PendingTap {
    deadline: f64,
    second_down: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TouchArbiter {
    double_tap_window_ms: f64,
    tap_max_ms: f64,
    tap_slop_px: f64,
    swipe_threshold_px: f64,
    phase: Phase,
    pending: Option<PendingTap>,
}

impl TouchArbiter {
    pub fn new(cfg: &GestureConfig) -> Self {
        Self {
            double_tap_window_ms: cfg.double_tap_window_ms,
            tap_max_ms: cfg.tap_max_ms,
            tap_slop_px: cfg.tap_slop_px,
            swipe_threshold_px: cfg.swipe_threshold_px,
            phase: Phase::Idle,
            pending: None,
        }
    }

    /// When the pending single tap should be polled, if one is waiting.
    pub fn pending_deadline(&self) -> Option<f64> {
        self.pending
            .filter(|p| !p.second_down)
            .map(|p| p.deadline)
    }

    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    /// Fires the held single tap once the double-tap window has passed.
    pub fn poll(&mut self, now: f64) -> Option<Recognized> {
        match self.pending {
            Some(p) if !p.second_down && now >= p.deadline => {
                self.pending = None;
                Some(Recognized::SingleTap)
            }
            _ => None,
        }
    }

    /// `touches` is every finger currently down, including the new one.
    pub fn touch_start(
        &mut self,
        touches: &[TouchPoint],
        now: f64,
        _ctx: ArbiterContext,
    ) -> Vec<Recognized> {
        let mut out = Vec::new();
        match self.phase.clone() {
            Phase::Idle => {
                if touches.len() >= 2 {
                    self.fail_double_tap(&mut out);
                    self.begin_transform(touches);
                } else if let Some(t) = touches.first() {
                    match self.pending {
                        Some(p) if now <= p.deadline => {
                            self.pending = Some(PendingTap {
                                second_down: true,
                                ..p
                            });
                        }
                        Some(_) => self.fail_double_tap(&mut out),
                        None => {}
                    }
                    self.phase = Phase::Pressed {
                        origin: (t.x, t.y),
                        at: now,
                    };
                }
            }
            Phase::Pressed { .. } | Phase::Swiping { .. } => {
                if touches.len() >= 2 {
                    self.fail_double_tap(&mut out);
                    self.begin_transform(touches);
                }
            }
            Phase::Transforming { baseline } => {
                if baseline.ids.len() < 2 && touches.len() >= 2 {
                    out.push(Recognized::TransformEnd);
                    self.begin_transform(touches);
                }
            }
            Phase::Ignored => {
                if touches.len() >= 2 {
                    self.begin_transform(touches);
                }
            }
        }
        out
    }

    pub fn touch_move(
        &mut self,
        touches: &[TouchPoint],
        _now: f64,
        ctx: ArbiterContext,
    ) -> Vec<Recognized> {
        let mut out = Vec::new();
        match self.phase.clone() {
            Phase::Pressed { origin, .. } => {
                let Some(t) = touches.first() else {
                    return out;
                };
                let travel = (t.x - origin.0).hypot(t.y - origin.1);
                if travel <= self.tap_slop_px {
                    return out;
                }
                self.fail_double_tap(&mut out);
                if ctx.neutral {
                    self.phase = Phase::Swiping {
                        origin,
                        last: (t.x, t.y),
                    };
                } else if ctx.zoomed {
                    let start = [TouchPoint::new(t.id, origin.0, origin.1)];
                    self.begin_transform(&start);
                    self.emit_delta(touches, &mut out);
                } else {
                    self.phase = Phase::Ignored;
                }
            }
            Phase::Swiping { origin, .. } => {
                if let Some(t) = touches.first() {
                    self.phase = Phase::Swiping {
                        origin,
                        last: (t.x, t.y),
                    };
                }
            }
            Phase::Transforming { .. } => self.emit_delta(touches, &mut out),
            Phase::Idle | Phase::Ignored => {}
        }
        out
    }

    /// `remaining` is every finger still down after the lift.
    pub fn touch_end(
        &mut self,
        remaining: &[TouchPoint],
        now: f64,
        ctx: ArbiterContext,
    ) -> Vec<Recognized> {
        let mut out = Vec::new();
        match self.phase.clone() {
            Phase::Pressed { at, .. } => {
                if !remaining.is_empty() {
                    return out;
                }
                self.phase = Phase::Idle;
                if now - at > self.tap_max_ms {
                    self.fail_double_tap(&mut out);
                    return out;
                }
                match self.pending.take() {
                    Some(p) if p.second_down => out.push(Recognized::DoubleTap),
                    Some(_) => {
                        out.push(Recognized::SingleTap);
                        self.hold_tap(now);
                    }
                    None => self.hold_tap(now),
                }
            }
            Phase::Swiping { origin, last } => {
                if !remaining.is_empty() {
                    return out;
                }
                self.phase = Phase::Idle;
                if let Some(dir) = self.swipe_direction(origin, last) {
                    out.push(Recognized::Swipe(dir));
                }
            }
            Phase::Transforming { baseline } => {
                if remaining.is_empty() {
                    out.push(Recognized::TransformEnd);
                    self.phase = Phase::Idle;
                } else if baseline.tracked(remaining).is_none() {
                    out.push(Recognized::TransformEnd);
                    if ctx.zoomed {
                        self.begin_transform(remaining);
                    } else {
                        self.phase = Phase::Ignored;
                    }
                }
            }
            Phase::Ignored => {
                if remaining.is_empty() {
                    self.phase = Phase::Idle;
                }
            }
            Phase::Idle => {}
        }
        out
    }

    /// The platform took the touches away; nothing but a transform commit
    /// survives.
    pub fn touch_cancel(&mut self) -> Vec<Recognized> {
        let mut out = Vec::new();
        if let Phase::Transforming { .. } = self.phase {
            out.push(Recognized::TransformEnd);
        }
        self.phase = Phase::Idle;
        self.pending = None;
        out
    }

    fn hold_tap(&mut self, now: f64) {
        self.pending = Some(PendingTap {
            deadline: now + self.double_tap_window_ms,
            second_down: false,
        });
    }

    /// The double tap can no longer happen: release the held single tap.
    fn fail_double_tap(&mut self, out: &mut Vec<Recognized>) {
        if self.pending.take().is_some() {
            out.push(Recognized::SingleTap);
        }
    }

    fn begin_transform(&mut self, touches: &[TouchPoint]) {
        self.phase = match Baseline::from_touches(touches) {
            Some(baseline) => Phase::Transforming { baseline },
            None => Phase::Idle,
        };
    }

    fn emit_delta(&mut self, touches: &[TouchPoint], out: &mut Vec<Recognized>) {
        if let Phase::Transforming { baseline } = &self.phase {
            if let Some(delta) = baseline.delta(touches) {
                out.push(Recognized::Transform(delta));
            }
        }
    }

    fn swipe_direction(&self, origin: (f64, f64), last: (f64, f64)) -> Option<SwipeDirection> {
        let dx = last.0 - origin.0;
        let dy = last.1 - origin.1;
        if dx.abs().max(dy.abs()) < self.swipe_threshold_px {
            return None;
        }
        Some(if dx.abs() > dy.abs() {
            if dx < 0.0 {
                SwipeDirection::Left
            } else {
                SwipeDirection::Right
            }
        } else if dy < 0.0 {
            SwipeDirection::Up
        } else {
            SwipeDirection::Down
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEUTRAL: ArbiterContext = ArbiterContext {
        zoomed: false,
        neutral: true,
    };
    const ZOOMED: ArbiterContext = ArbiterContext {
        zoomed: true,
        neutral: false,
    };

    fn arbiter() -> TouchArbiter {
        TouchArbiter::new(&GestureConfig::default())
    }

    fn tap(a: &mut TouchArbiter, at: f64) -> Vec<Recognized> {
        let p = [TouchPoint::new(0, 100.0, 100.0)];
        let mut out = a.touch_start(&p, at, NEUTRAL);
        out.extend(a.touch_end(&[], at + 50.0, NEUTRAL));
        out
    }

    #[test]
    fn single_tap_waits_for_double_tap_window() {
        let mut a = arbiter();
        assert!(tap(&mut a, 0.0).is_empty());
        assert_eq!(a.pending_deadline(), Some(300.0));
        assert_eq!(a.poll(200.0), None);
        assert_eq!(a.poll(300.0), Some(Recognized::SingleTap));
        assert_eq!(a.poll(400.0), None);
    }

    #[test]
    fn double_tap_suppresses_single_tap() {
        let mut a = arbiter();
        tap(&mut a, 0.0);
        let out = tap(&mut a, 150.0);
        assert_eq!(out, vec![Recognized::DoubleTap]);
        assert_eq!(a.poll(10_000.0), None);
    }

    #[test]
    fn second_press_holds_off_the_timer() {
        let mut a = arbiter();
        tap(&mut a, 0.0);
        a.touch_start(&[TouchPoint::new(0, 100.0, 100.0)], 290.0, NEUTRAL);
        assert_eq!(a.pending_deadline(), None);
        assert_eq!(a.poll(320.0), None);
        let out = a.touch_end(&[], 340.0, NEUTRAL);
        assert_eq!(out, vec![Recognized::DoubleTap]);
    }

    #[test]
    fn late_second_tap_is_two_single_taps() {
        let mut a = arbiter();
        tap(&mut a, 0.0);
        let out = tap(&mut a, 1000.0);
        assert_eq!(out, vec![Recognized::SingleTap]);
        assert_eq!(a.poll(1400.0), Some(Recognized::SingleTap));
    }

    #[test]
    fn pinch_never_reads_as_tap() {
        let mut a = arbiter();
        let one = [TouchPoint::new(0, 100.0, 100.0)];
        let two = [TouchPoint::new(0, 100.0, 100.0), TouchPoint::new(1, 200.0, 100.0)];
        assert!(a.touch_start(&one, 0.0, NEUTRAL).is_empty());
        assert!(a.touch_start(&two, 20.0, NEUTRAL).is_empty());
        let spread = [TouchPoint::new(0, 50.0, 100.0), TouchPoint::new(1, 250.0, 100.0)];
        let out = a.touch_move(&spread, 40.0, NEUTRAL);
        match out.as_slice() {
            [Recognized::Transform(d)] => {
                assert!((d.scale - 2.0).abs() < 1e-9);
                assert_eq!(d.translation, (0.0, 0.0));
                assert!(d.rotation.abs() < 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(a.touch_end(&[], 60.0, NEUTRAL), vec![Recognized::TransformEnd]);
        assert_eq!(a.poll(10_000.0), None);
    }

    #[test]
    fn pinch_after_tap_releases_the_held_tap() {
        let mut a = arbiter();
        tap(&mut a, 0.0);
        let two = [TouchPoint::new(0, 0.0, 0.0), TouchPoint::new(1, 10.0, 0.0)];
        assert_eq!(a.touch_start(&two, 100.0, NEUTRAL), vec![Recognized::SingleTap]);
    }

    #[test]
    fn two_finger_twist_reports_rotation() {
        let mut a = arbiter();
        let two = [TouchPoint::new(0, 0.0, 0.0), TouchPoint::new(1, 100.0, 0.0)];
        a.touch_start(&two, 0.0, ZOOMED);
        let twisted = [TouchPoint::new(0, 0.0, 0.0), TouchPoint::new(1, 0.0, 100.0)];
        let out = a.touch_move(&twisted, 10.0, ZOOMED);
        let Some(Recognized::Transform(d)) = out.first() else {
            panic!("no transform");
        };
        assert!((d.rotation - PI / 2.0).abs() < 1e-9);
        assert!((d.scale - 1.0).abs() < 1e-9);
    }

    #[test]
    fn swipe_left_in_neutral_pose() {
        let mut a = arbiter();
        a.touch_start(&[TouchPoint::new(0, 300.0, 200.0)], 0.0, NEUTRAL);
        a.touch_move(&[TouchPoint::new(0, 250.0, 205.0)], 30.0, NEUTRAL);
        a.touch_move(&[TouchPoint::new(0, 150.0, 210.0)], 60.0, NEUTRAL);
        let out = a.touch_end(&[], 80.0, NEUTRAL);
        assert_eq!(out, vec![Recognized::Swipe(SwipeDirection::Left)]);
    }

    #[test]
    fn short_drag_is_not_a_swipe() {
        let mut a = arbiter();
        a.touch_start(&[TouchPoint::new(0, 300.0, 200.0)], 0.0, NEUTRAL);
        a.touch_move(&[TouchPoint::new(0, 300.0, 160.0)], 30.0, NEUTRAL);
        assert!(a.touch_end(&[], 80.0, NEUTRAL).is_empty());
        assert_eq!(a.poll(10_000.0), None);
    }

    #[test]
    fn single_finger_pans_when_zoomed() {
        let mut a = arbiter();
        a.touch_start(&[TouchPoint::new(0, 100.0, 100.0)], 0.0, ZOOMED);
        let out = a.touch_move(&[TouchPoint::new(0, 130.0, 80.0)], 20.0, ZOOMED);
        let Some(Recognized::Transform(d)) = out.first() else {
            panic!("no pan");
        };
        assert_eq!(d.translation, (30.0, -20.0));
        assert_eq!(d.scale, 1.0);
        assert_eq!(a.touch_end(&[], 40.0, ZOOMED), vec![Recognized::TransformEnd]);
    }

    #[test]
    fn long_press_is_not_a_tap() {
        let mut a = arbiter();
        a.touch_start(&[TouchPoint::new(0, 100.0, 100.0)], 0.0, NEUTRAL);
        assert!(a.touch_end(&[], 900.0, NEUTRAL).is_empty());
        assert_eq!(a.poll(10_000.0), None);
    }

    #[test]
    fn cancel_commits_running_transform() {
        let mut a = arbiter();
        let two = [TouchPoint::new(0, 0.0, 0.0), TouchPoint::new(1, 10.0, 0.0)];
        a.touch_start(&two, 0.0, NEUTRAL);
        assert_eq!(a.touch_cancel(), vec![Recognized::TransformEnd]);
        assert!(a.is_idle());
    }

    #[test]
    fn lifting_one_finger_of_a_pinch_ends_the_segment() {
        let mut a = arbiter();
        let two = [TouchPoint::new(0, 0.0, 0.0), TouchPoint::new(1, 10.0, 0.0)];
        a.touch_start(&two, 0.0, NEUTRAL);
        let out = a.touch_end(&[TouchPoint::new(0, 0.0, 0.0)], 30.0, NEUTRAL);
        assert_eq!(out, vec![Recognized::TransformEnd]);
        assert!(a.touch_end(&[], 50.0, NEUTRAL).is_empty());
        assert!(a.is_idle());
    }
}
