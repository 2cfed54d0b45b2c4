//! Per-field change detection.
//!
//! Each tracked field pairs the value currently visible on the panel with a
//! [`ChangePolicy`] deciding when a new reading is different enough to be
//! worth redrawing. Detectors know nothing about drawing, so the redraw
//! rules can be tested without a display.

use crate::color_scale::{ColorScale, SignalLevel};
use crate::format::{finite_or_zero, round_to_i32};

/// Decides whether `candidate` would look different from `cached` on screen.
pub trait ChangePolicy<T: ?Sized> {
    fn differs(&self, cached: &T, candidate: &T) -> bool;
}

/// Redraw on any difference. Used for the clock digit groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl<T: PartialEq + ?Sized> ChangePolicy<T> for ExactMatch {
    fn differs(&self, cached: &T, candidate: &T) -> bool {
        cached != candidate
    }
}

/// Redraw once the reading moved strictly more than the threshold.
#[derive(Debug, Clone, Copy)]
pub struct AbsoluteTolerance(pub f32);

impl ChangePolicy<f32> for AbsoluteTolerance {
    fn differs(&self, cached: &f32, candidate: &f32) -> bool {
        libm::fabsf(finite_or_zero(*candidate) - finite_or_zero(*cached)) > self.0
    }
}

/// Redraw when the rounded whole number changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundedInteger;

impl ChangePolicy<f32> for RoundedInteger {
    fn differs(&self, cached: &f32, candidate: &f32) -> bool {
        round_to_i32(*cached) != round_to_i32(*candidate)
    }
}

/// Redraw when a dBm reading lands in a different signal level.
#[derive(Debug, Clone, Copy, Default)]
pub struct BucketedLevel;

impl ChangePolicy<i32> for BucketedLevel {
    fn differs(&self, cached: &i32, candidate: &i32) -> bool {
        SignalLevel::from_dbm(*cached) != SignalLevel::from_dbm(*candidate)
    }
}

/// Redraw when the reading moves to another color band.
#[derive(Debug, Clone, Copy)]
pub struct ColorBand<const N: usize>(pub &'static ColorScale<N>);

impl<const N: usize> ChangePolicy<f32> for ColorBand<N> {
    fn differs(&self, cached: &f32, candidate: &f32) -> bool {
        self.0.band(*cached) != self.0.band(*candidate)
    }
}

/// Redraw when either policy asks for it.
#[derive(Debug, Clone, Copy)]
pub struct AnyOf<A, B>(pub A, pub B);

impl<T: ?Sized, A: ChangePolicy<T>, B: ChangePolicy<T>> ChangePolicy<T> for AnyOf<A, B> {
    fn differs(&self, cached: &T, candidate: &T) -> bool {
        self.0.differs(cached, candidate) || self.1.differs(cached, candidate)
    }
}

/// What to draw for one element this tick.
///
/// `value` is the new reading when `changed`, otherwise the value already on
/// screen, so a full repaint reproduces exactly what is visible.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot<T> {
    pub value: T,
    pub changed: bool,
}

/// Last drawn value of one field plus its redraw policy.
#[derive(Debug, Clone)]
pub struct ChangeDetector<T, P> {
    policy: P,
    last: Option<T>,
}

impl<T: Clone, P: ChangePolicy<T>> ChangeDetector<T, P> {
    pub const fn new(policy: P) -> Self {
        Self { policy, last: None }
    }

    /// The value currently on screen, if the field was ever drawn.
    pub fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }

    /// A field that was never drawn always needs drawing.
    pub fn needs_redraw(&self, candidate: &T, force: bool) -> bool {
        match &self.last {
            Some(cached) => force || self.policy.differs(cached, candidate),
            None => true,
        }
    }

    pub fn slot(&self, candidate: &T, force: bool) -> Slot<T> {
        match &self.last {
            Some(cached) if !self.needs_redraw(candidate, force) => Slot {
                value: cached.clone(),
                changed: false,
            },
            _ => Slot {
                value: candidate.clone(),
                changed: true,
            },
        }
    }

    /// Record `value` as what the panel now shows.
    pub fn commit(&mut self, value: T) {
        self.last = Some(value);
    }

    /// Forget the cached value so the next update redraws the field.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}
