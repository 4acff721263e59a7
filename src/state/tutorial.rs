//! First-run tutorial.
//!
//! One state per [`TutorialStep`] in canonical order plus a terminal `Done`.
//! The visible step is always the first one neither completed nor skipped;
//! see [`next_step`]. `Done` is persisted and never left again.

use std::collections::{BTreeMap, BTreeSet};

use log::info;
use serde::{Deserialize, Serialize};

use crate::state::storage::{KeyValueStore, read_json, write_json, write_raw};

pub const DONE_KEY: &str = "tutorial.done";
pub const SKIPS_KEY: &str = "tutorial.skips";
pub const PROGRESS_KEY: &str = "tutorial.progress";

/// Manual taps needed for [`TutorialStep::TapTwice`].
const TAPS_TO_LEARN: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TutorialStep {
    TapTwice,
    ZoomedIn,
    Rotated,
    ZoomedOut,
    DoubleTapped,
    OpenedInfo,
    SwipedToWallet,
    DraggedCoin,
    ViewedWalletInfo,
}

/// Which screen teaches a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TutorialScreen {
    Flipper,
    Wallet,
}

impl TutorialStep {
    pub const ORDER: [TutorialStep; 9] = [
        TutorialStep::TapTwice,
        TutorialStep::ZoomedIn,
        TutorialStep::Rotated,
        TutorialStep::ZoomedOut,
        TutorialStep::DoubleTapped,
        TutorialStep::OpenedInfo,
        TutorialStep::SwipedToWallet,
        TutorialStep::DraggedCoin,
        TutorialStep::ViewedWalletInfo,
    ];

    pub fn instruction(self) -> &'static str {
        match self {
            TutorialStep::TapTwice => {
                "Tap the coin to turn it over.\nTurn it twice to see the next hint."
            }
            TutorialStep::ZoomedIn => "Pinch the coin with two fingers to take a closer look.",
            TutorialStep::Rotated => {
                "Twist with two fingers to look at the coin from different angles."
            }
            TutorialStep::ZoomedOut => "Pinch the coin back to its normal size to continue.",
            TutorialStep::DoubleTapped => "Double-tap the coin to make a prediction and flip it.",
            TutorialStep::OpenedInfo => "Swipe up on the screen to see the coin's details.",
            TutorialStep::SwipedToWallet => "Swipe left to open your wallet.",
            TutorialStep::DraggedCoin => "Drag a coin to arrange your wallet.",
            TutorialStep::ViewedWalletInfo => "Tap a coin in your wallet to see its details.",
        }
    }

    pub fn screen(self) -> TutorialScreen {
        match self {
            TutorialStep::DraggedCoin | TutorialStep::ViewedWalletInfo => TutorialScreen::Wallet,
            _ => TutorialScreen::Flipper,
        }
    }
}

/// "This qualifying action happened" signals from the screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TutorialSignal {
    ManualTap,
    ZoomedIn,
    Rotated,
    ZoomedOut,
    DoubleTapped,
    OpenedInfo,
    SwipedToWallet,
    DraggedCoin,
    ViewedWalletInfo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TutorialState {
    Step(TutorialStep),
    Done,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TutorialProgress {
    pub completed: BTreeSet<TutorialStep>,
    pub skipped: BTreeSet<TutorialStep>,
    pub done: bool,
}

impl TutorialProgress {
    pub fn is_satisfied(&self, step: TutorialStep) -> bool {
        self.completed.contains(&step) || self.skipped.contains(&step)
    }

    pub fn all_satisfied(&self) -> bool {
        TutorialStep::ORDER.iter().all(|s| self.is_satisfied(*s))
    }
}

pub fn next_step(progress: &TutorialProgress) -> TutorialState {
    if progress.done {
        return TutorialState::Done;
    }
    TutorialStep::ORDER
        .iter()
        .copied()
        .find(|s| !progress.is_satisfied(*s))
        .map_or(TutorialState::Done, TutorialState::Step)
}

pub struct TutorialTracker {
    store: Box<dyn KeyValueStore>,
    progress: TutorialProgress,
    manual_taps: u32,
}

impl TutorialTracker {
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let flags = |key: &str| -> BTreeSet<TutorialStep> {
            read_json::<BTreeMap<TutorialStep, bool>>(store.as_ref(), key)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|(step, set)| set.then_some(step))
                .collect()
        };
        let done = matches!(store.get(DONE_KEY), Ok(Some(v)) if v == "1");
        let progress = TutorialProgress {
            completed: flags(PROGRESS_KEY),
            skipped: flags(SKIPS_KEY),
            done,
        };
        let mut tracker = Self {
            store,
            progress,
            manual_taps: 0,
        };
        tracker.finish_if_satisfied();
        tracker
    }

    #[cfg(test)]
    pub fn progress(&self) -> &TutorialProgress {
        &self.progress
    }

    pub fn state(&self) -> TutorialState {
        next_step(&self.progress)
    }

    pub fn current_step(&self) -> Option<TutorialStep> {
        match self.state() {
            TutorialState::Step(step) => Some(step),
            TutorialState::Done => None,
        }
    }

    /// The step to show on `screen`, if that screen teaches it.
    pub fn step_for(&self, screen: TutorialScreen) -> Option<TutorialStep> {
        self.current_step().filter(|s| s.screen() == screen)
    }

    #[cfg(test)]
    pub fn is_done(&self) -> bool {
        self.progress.done
    }

    /// Returns `true` when the signal changed the progress.
    pub fn signal(&mut self, signal: TutorialSignal) -> bool {
        if self.progress.done {
            return false;
        }
        let step = match signal {
            TutorialSignal::ManualTap => {
                self.manual_taps = self.manual_taps.saturating_add(1);
                if self.manual_taps < TAPS_TO_LEARN {
                    return false;
                }
                TutorialStep::TapTwice
            }
            TutorialSignal::ZoomedIn => TutorialStep::ZoomedIn,
            TutorialSignal::Rotated => TutorialStep::Rotated,
            TutorialSignal::ZoomedOut => TutorialStep::ZoomedOut,
            TutorialSignal::DoubleTapped => TutorialStep::DoubleTapped,
            TutorialSignal::OpenedInfo => TutorialStep::OpenedInfo,
            TutorialSignal::SwipedToWallet => TutorialStep::SwipedToWallet,
            TutorialSignal::DraggedCoin => TutorialStep::DraggedCoin,
            TutorialSignal::ViewedWalletInfo => TutorialStep::ViewedWalletInfo,
        };
        if !self.progress.completed.insert(step) {
            return false;
        }
        info!("tutorial step {step:?} completed");
        write_json(self.store.as_ref(), PROGRESS_KEY, &as_flags(&self.progress.completed));
        self.finish_if_satisfied();
        true
    }

    /// Skips the visible step only.
    pub fn skip_step(&mut self) -> Option<TutorialStep> {
        let step = self.current_step()?;
        self.progress.skipped.insert(step);
        write_json(self.store.as_ref(), SKIPS_KEY, &as_flags(&self.progress.skipped));
        self.finish_if_satisfied();
        Some(step)
    }

    pub fn skip_all(&mut self) {
        if !self.progress.done {
            info!("tutorial skipped");
            self.mark_done();
        }
    }

    fn finish_if_satisfied(&mut self) {
        if !self.progress.done && self.progress.all_satisfied() {
            info!("tutorial complete");
            self.mark_done();
        }
    }

    fn mark_done(&mut self) {
        self.progress.done = true;
        write_raw(self.store.as_ref(), DONE_KEY, "1");
    }
}

fn as_flags(steps: &BTreeSet<TutorialStep>) -> BTreeMap<TutorialStep, bool> {
    steps.iter().map(|s| (*s, true)).collect()
}
