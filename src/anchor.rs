//! Overlay anchor state and its shared handle.
//!
//! `AnchorState` is the one piece of state that outlives a single detector
//! callback: the smoothed transform the overlay model is rendered with. The
//! pose solver is its only writer; the render loop reads snapshots. Updates
//! replace the whole state in one write so a reader never observes a
//! half-updated transform.

use std::sync::Arc;

use nalgebra::{UnitQuaternion, Vector3};
use parking_lot::RwLock;

use crate::config::CalibrationConfig;

/// Rigid transform target derived from one landmark set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
    pub scale: f64,
}

/// The current, smoothed transform of the overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorState {
    pub position: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
    pub scale: f64,
    pub visible: bool,
}

impl AnchorState {
    /// Identity-like starting state; the overlay stays hidden until the
    /// first face is detected.
    pub fn hidden() -> Self {
        Self {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            scale: 1.0,
            visible: false,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            orientation: self.orientation,
            scale: self.scale,
        }
    }

    /// Layer the user's static calibration on top of the solved transform.
    /// Applied at presentation time; the solver never sees these offsets.
    pub fn apply_calibration(&self, calibration: &CalibrationConfig) -> AnchorState {
        let mut out = *self;
        out.position.y += calibration.vertical_offset;
        out.scale *= calibration.scale_factor;
        out
    }
}

impl Default for AnchorState {
    fn default() -> Self {
        Self::hidden()
    }
}

/// Shared handle to the anchor state.
///
/// Cloning is cheap; all clones view the same state. Writes go through
/// crate-private methods so the pose solver stays the single writer, while
/// any number of readers take `snapshot`s.
#[derive(Clone, Default)]
pub struct AnchorHandle {
    inner: Arc<RwLock<AnchorState>>,
}

impl AnchorHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(AnchorState::hidden())),
        }
    }

    /// Read the current state. This is the render loop's entry point.
    pub fn snapshot(&self) -> AnchorState {
        *self.inner.read()
    }

    /// Replace the whole state in one write.
    pub(crate) fn store(&self, next: AnchorState) {
        *self.inner.write() = next;
    }

    /// Toggle visibility, leaving the transform untouched so the overlay can
    /// reappear without re-snapping.
    pub(crate) fn set_visible(&self, visible: bool) {
        self.inner.write().visible = visible;
    }
}
