// Zoom / pan / rotate inspection state of the coin.
//
// Values are committed when a gesture segment ends; while a segment runs the
// live transform is `committed ∘ delta`. Pan and rotate only apply while the
// live scale is above 1.

use crate::config::GestureConfig;

const SCALE_EPSILON: f64 = 1e-3;
const OFFSET_EPSILON: f64 = 0.5;

/// Cumulative change since the current gesture segment began.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformDelta {
    pub scale: f64,
    pub translation: (f64, f64),
    /// Radians.
    pub rotation: f64,
}

impl TransformDelta {
    pub const IDENTITY: TransformDelta = TransformDelta {
        scale: 1.0,
        translation: (0.0, 0.0),
        rotation: 0.0,
    };

    pub fn zoom(scale: f64) -> Self {
        Self {
            scale,
            ..Self::IDENTITY
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureSessionState {
    pub scale: f64,
    pub offset: (f64, f64),
    pub angle: f64,
    pub zoomed: bool,
}

impl Default for GestureSessionState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: (0.0, 0.0),
            angle: 0.0,
            zoomed: false,
        }
    }
}

impl GestureSessionState {
    /// CSS transform for the coin wrapper.
    pub fn css_transform(&self) -> String {
        format!(
            "translate({:.1}px, {:.1}px) rotate({:.4}rad) scale({:.4})",
            self.offset.0, self.offset.1, self.angle, self.scale
        )
    }
}

/// What a transform step did, for the tutorial.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GestureReport {
    pub zoomed_in: bool,
    pub rotated: bool,
    /// Scale came back to exactly 1 after having been above it.
    pub zoomed_out: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GestureSession {
    max_scale: f64,
    rotation_snap: f64,
    rotate_signal: f64,
    committed: GestureSessionState,
    live: GestureSessionState,
    zoomed_since_identity: bool,
}

impl GestureSession {
    pub fn new(cfg: &GestureConfig) -> Self {
        Self {
            max_scale: cfg.max_scale.max(1.0),
            rotation_snap: cfg.rotation_snap_rad,
            rotate_signal: cfg.rotate_signal_rad,
            committed: GestureSessionState::default(),
            live: GestureSessionState::default(),
            zoomed_since_identity: false,
        }
    }

    /// The transform to draw.
    pub fn state(&self) -> &GestureSessionState {
        &self.live
    }

    #[cfg(test)]
    pub fn committed(&self) -> &GestureSessionState {
        &self.committed
    }

    pub fn is_zoomed(&self) -> bool {
        self.live.zoomed
    }

    /// Scale ≈ 1; double taps are only honoured here.
    pub fn at_rest_scale(&self) -> bool {
        (self.live.scale - 1.0).abs() < SCALE_EPSILON
    }

    /// Identity pose; only then may a full-screen swipe claim the input.
    pub fn is_neutral(&self) -> bool {
        self.at_rest_scale()
            && self.live.angle.abs() < self.rotation_snap.max(SCALE_EPSILON)
            && self.live.offset.0.hypot(self.live.offset.1) < OFFSET_EPSILON
    }

    pub fn apply(&mut self, delta: TransformDelta) -> GestureReport {
        let scale = (self.committed.scale * delta.scale).clamp(1.0, self.max_scale);
        let zoomed = scale > 1.0;
        self.live.scale = scale;
        self.live.zoomed = zoomed;
        if zoomed {
            self.live.offset = (
                self.committed.offset.0 + delta.translation.0,
                self.committed.offset.1 + delta.translation.1,
            );
            self.live.angle = self.committed.angle + delta.rotation;
            self.zoomed_since_identity = true;
        } else {
            self.live.offset = self.committed.offset;
            self.live.angle = self.committed.angle;
        }
        GestureReport {
            zoomed_in: zoomed,
            rotated: zoomed && self.live.angle.abs() >= self.rotate_signal,
            zoomed_out: false,
        }
    }

    /// Ends the running segment (end, cancel and fail alike).
    pub fn commit(&mut self) -> GestureReport {
        let scale = self.live.scale.clamp(1.0, self.max_scale);
        let mut next = GestureSessionState {
            scale,
            offset: self.live.offset,
            angle: self.live.angle,
            zoomed: scale > 1.0,
        };
        if next.angle.abs() < self.rotation_snap {
            next.angle = 0.0;
        }
        let mut report = GestureReport::default();
        if scale == 1.0 {
            next.offset = (0.0, 0.0);
            next.angle = 0.0;
            if self.zoomed_since_identity {
                report.zoomed_out = true;
                self.zoomed_since_identity = false;
            }
        }
        self.committed = next;
        self.live = next;
        report
    }

    /// One-shot pinch, used for wheel and button zoom.
    pub fn nudge(&mut self, factor: f64) -> GestureReport {
        let during = self.apply(TransformDelta::zoom(factor));
        let after = self.commit();
        GestureReport {
            zoomed_in: during.zoomed_in,
            rotated: false,
            zoomed_out: after.zoomed_out,
        }
    }
}
