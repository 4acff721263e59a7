//! Flip engine.
//!
//! A flip is a [`FlipPlan`]: a toggle count and a duration split into
//! `count + 1` equal steps. Each step boundary but the first toggles the face
//! and the mirror sign; the face after the last toggle *is* the result. A
//! final [`FlipEvent::Settle`] at the full duration ends the continuous spin.
//!
//! Plans are executed by timers outside this module. Every scheduled callback
//! must hold a [`FlipToken`] and check [`FlipToken::is_live`] before touching
//! state: starting another flip or cancelling bumps the engine generation and
//! voids all older tokens, even for timers that still fire.

use std::cell::Cell;
use std::rc::Rc;

use log::debug;

use crate::config::FlipConfig;
use crate::model::CoinSide;
use crate::util::RandomSource;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FlipEvent {
    Toggle {
        at_ms: f64,
        side: CoinSide,
        /// `false` while the image is drawn mirrored.
        upright: bool,
        is_final: bool,
    },
    Settle {
        at_ms: f64,
    },
}

impl FlipEvent {
    pub fn at_ms(&self) -> f64 {
        match *self {
            FlipEvent::Toggle { at_ms, .. } | FlipEvent::Settle { at_ms } => at_ms,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlipPlan {
    start: CoinSide,
    toggles: u32,
    duration_ms: u32,
}

impl FlipPlan {
    pub fn new(start: CoinSide, toggles: u32, duration_ms: u32) -> Self {
        Self {
            start,
            toggles: toggles.max(1),
            duration_ms: duration_ms.max(1),
        }
    }

    pub fn generate(start: CoinSide, cfg: &FlipConfig, rng: &mut dyn RandomSource) -> Self {
        let cfg = cfg.normalized();
        let toggles = rng.range_u32(cfg.min_toggles, cfg.max_toggles);
        let duration_ms = rng.range_u32(cfg.min_duration_ms, cfg.max_duration_ms);
        Self::new(start, toggles, duration_ms)
    }

    pub fn toggles(&self) -> u32 {
        self.toggles
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn step_ms(&self) -> f64 {
        self.duration_ms as f64 / (self.toggles + 1) as f64
    }

    /// Half turns of the continuous spin; one per toggle.
    pub fn half_turns(&self) -> u32 {
        self.toggles
    }

    #[cfg(test)]
    pub fn final_side(&self) -> CoinSide {
        if self.toggles % 2 == 1 {
            self.start.flipped()
        } else {
            self.start
        }
    }

    pub fn events(&self) -> FlipEvents {
        FlipEvents {
            plan: *self,
            next: 1,
        }
    }
}

/// Lazy, time-ordered events of one plan.
#[derive(Clone, Debug)]
pub struct FlipEvents {
    plan: FlipPlan,
    next: u32,
}

impl Iterator for FlipEvents {
    type Item = FlipEvent;

    fn next(&mut self) -> Option<FlipEvent> {
        let k = self.next;
        let count = self.plan.toggles;
        if k > count + 1 {
            return None;
        }
        self.next += 1;
        if k == count + 1 {
            return Some(FlipEvent::Settle {
                at_ms: self.plan.duration_ms as f64,
            });
        }
        let side = if k % 2 == 1 {
            self.plan.start.flipped()
        } else {
            self.plan.start
        };
        Some(FlipEvent::Toggle {
            at_ms: k as f64 * self.plan.step_ms(),
            side,
            upright: k % 2 == 0,
            is_final: k == count,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.plan.toggles + 2).saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

/// Proof that a scheduled callback still belongs to the current flip.
#[derive(Clone, Debug)]
pub struct FlipToken {
    id: u64,
    generation: Rc<Cell<u64>>,
}

impl FlipToken {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_live(&self) -> bool {
        self.generation.get() == self.id
    }
}

impl PartialEq for FlipToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Rc::ptr_eq(&self.generation, &other.generation)
    }
}

/// Hands out flip tokens; at most one is live at a time.
#[derive(Clone, Debug, Default)]
pub struct FlipEngine {
    generation: Rc<Cell<u64>>,
}

impl FlipEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Voids every earlier token and plans a new flip from `start`.
    pub fn start(
        &self,
        start: CoinSide,
        cfg: &FlipConfig,
        rng: &mut dyn RandomSource,
    ) -> (FlipToken, FlipPlan) {
        let plan = FlipPlan::generate(start, cfg, rng);
        let token = self.issue();
        debug!(
            "flip {} planned: {} toggles over {} ms",
            token.id,
            plan.toggles(),
            plan.duration_ms()
        );
        (token, plan)
    }

    pub fn issue(&self) -> FlipToken {
        let id = self.generation.get().wrapping_add(1);
        self.generation.set(id);
        FlipToken {
            id,
            generation: self.generation.clone(),
        }
    }

    /// Voids every outstanding token.
    pub fn cancel(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::SequenceRandom;
    use proptest::prelude::*;

    fn toggles(plan: &FlipPlan) -> Vec<(f64, CoinSide, bool, bool)> {
        plan.events()
            .filter_map(|e| match e {
                FlipEvent::Toggle {
                    at_ms,
                    side,
                    upright,
                    is_final,
                } => Some((at_ms, side, upright, is_final)),
                FlipEvent::Settle { .. } => None,
            })
            .collect()
    }

    #[test]
    fn steps_are_evenly_spaced_and_settle_last() {
        let plan = FlipPlan::new(CoinSide::Heads, 4, 1500);
        let events: Vec<_> = plan.events().collect();
        assert_eq!(events.len(), 5);
        let times: Vec<f64> = events.iter().map(FlipEvent::at_ms).collect();
        assert_eq!(times, vec![300.0, 600.0, 900.0, 1200.0, 1500.0]);
        assert_eq!(events[4], FlipEvent::Settle { at_ms: 1500.0 });
    }

    #[test]
    fn last_toggle_is_the_result() {
        let plan = FlipPlan::new(CoinSide::Heads, 3, 1000);
        let t = toggles(&plan);
        let (_, side, _, is_final) = t[t.len() - 1];
        assert!(is_final);
        assert_eq!(side, CoinSide::Tails);
        assert_eq!(plan.final_side(), CoinSide::Tails);
        assert_eq!(t.iter().filter(|x| x.3).count(), 1);
    }

    #[test]
    fn mirror_sign_alternates_from_upright() {
        let plan = FlipPlan::new(CoinSide::Tails, 4, 1000);
        let signs: Vec<bool> = toggles(&plan).iter().map(|t| t.2).collect();
        assert_eq!(signs, vec![false, true, false, true]);
    }

    #[test]
    fn generated_plan_respects_config() {
        let cfg = FlipConfig {
            min_toggles: 15,
            max_toggles: 30,
            min_duration_ms: 1000,
            max_duration_ms: 1500,
        };
        let mut rng = SequenceRandom::new(&[0.0, 0.999_999]);
        let plan = FlipPlan::generate(CoinSide::Heads, &cfg, &mut rng);
        assert_eq!(plan.toggles(), 15);
        assert_eq!(plan.duration_ms(), 1500);
    }

    #[test]
    fn oversized_config_yields_bounded_plan() {
        let cfg = FlipConfig {
            min_toggles: 0,
            max_toggles: u32::MAX,
            min_duration_ms: u32::MAX,
            max_duration_ms: u32::MAX,
        };
        let mut rng = SequenceRandom::new(&[0.999_999, 0.5]);
        let plan = FlipPlan::generate(CoinSide::Heads, &cfg, &mut rng);
        assert_eq!(plan.toggles(), crate::config::MAX_TOGGLES);
        assert_eq!(plan.duration_ms(), crate::config::MAX_DURATION_MS);
        assert_eq!(plan.events().count() as u32, crate::config::MAX_TOGGLES + 1);
    }

    #[test]
    fn starting_voids_older_tokens() {
        let engine = FlipEngine::new();
        let mut rng = SequenceRandom::new(&[0.5]);
        let (first, _) = engine.start(CoinSide::Heads, &FlipConfig::default(), &mut rng);
        assert!(first.is_live());
        let (second, _) = engine.start(CoinSide::Heads, &FlipConfig::default(), &mut rng);
        assert!(!first.is_live());
        assert!(second.is_live());
        assert_ne!(first, second);
        engine.cancel();
        assert!(!second.is_live());
    }

    #[test]
    fn clones_share_the_generation() {
        let engine = FlipEngine::new();
        let token = engine.issue();
        engine.clone().cancel();
        assert!(!token.is_live());
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
        #[test]
        fn faces_strictly_alternate(count in 1u32..64, duration in 1u32..5000, heads in any::<bool>()) {
            let start = if heads { CoinSide::Heads } else { CoinSide::Tails };
            let plan = FlipPlan::new(start, count, duration);
            let t = toggles(&plan);
            prop_assert_eq!(t.len() as u32, count);
            let mut prev = start;
            let mut prev_at = 0.0;
            for (at, side, _, _) in &t {
                prop_assert_ne!(*side, prev);
                prop_assert!(*at > prev_at);
                prev = *side;
                prev_at = *at;
            }
            prop_assert_eq!(prev, plan.final_side());
            prop_assert!(prev_at < duration as f64);
        }
    }
}
