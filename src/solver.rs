//! The pose solver: one landmark set in, one anchor update out.
//!
//! Runs once per detector callback. Derives a target rigid transform for the
//! overlay anchor from the aggregated reference points, then blends the
//! anchor toward it with per-channel exponential smoothing. All numeric
//! derivations are defensive: degenerate landmark geometry skips the frame,
//! it never panics and never surfaces as an error.

use log::{debug, warn};
use nalgebra::{Matrix3, Rotation3, UnitQuaternion, Vector3};

use crate::anchor::{AnchorHandle, AnchorState, Pose};
use crate::config::Config;
use crate::landmarks::{LandmarkSet, ReferencePoints};
use crate::projection::Projection;
use crate::smoothing::TransformSmoother;
use crate::Result;

/// Floor for the derived scale, keeping it strictly positive.
pub const MIN_TARGET_SCALE: f64 = 1e-4;

/// Below this length a basis vector counts as degenerate.
const DEGENERACY_EPS: f64 = 1e-9;

/// Derives and smooths the overlay anchor transform.
pub struct PoseSolver {
    projection: Projection,
    smoother: TransformSmoother,
    scale_gain: f64,
    crown_offset: f64,
}

impl PoseSolver {
    pub fn new(
        projection: Projection,
        smoother: TransformSmoother,
        scale_gain: f64,
        crown_offset: f64,
    ) -> Self {
        Self {
            projection,
            smoother,
            scale_gain,
            crown_offset,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Projection::from_config(&config.projection),
            TransformSmoother::new(
                config.smoothing.position_alpha,
                config.smoothing.rotation_alpha,
                config.smoothing.scale_alpha,
            ),
            config.anchor.scale_gain,
            config.anchor.crown_offset,
        )
    }

    /// Consume one detector callback.
    ///
    /// With no face, the overlay is hidden and its transform kept so it can
    /// reappear without re-snapping. With a face, the anchor is blended
    /// toward the derived target and made visible, all fields replaced in a
    /// single store. A malformed or degenerate set leaves the anchor exactly
    /// as it was, visibility included.
    pub fn process(&mut self, face: Option<&LandmarkSet>, anchor: &AnchorHandle) {
        let Some(set) = face.filter(|s| !s.is_empty()) else {
            anchor.set_visible(false);
            return;
        };

        let target = match self.derive_target(set) {
            Ok(Some(target)) => target,
            Ok(None) => {
                debug!("degenerate landmark geometry, skipping frame");
                return;
            }
            Err(e) => {
                warn!("dropping malformed landmark set: {e}");
                return;
            }
        };

        let current = anchor.snapshot();
        let blended = self.smoother.blend(&current.pose(), &target);
        anchor.store(AnchorState {
            position: blended.position,
            orientation: blended.orientation,
            scale: blended.scale,
            visible: true,
        });
    }

    /// Derive the raw (unsmoothed) target pose for one landmark set.
    ///
    /// Returns `Ok(None)` when the geometry is degenerate (coincident eye
    /// centers, coincident nose and chin, eye line parallel to the face
    /// axis); the caller skips that frame.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the set is shorter than a full
    /// landmark set.
    pub fn derive_target(&self, set: &LandmarkSet) -> Result<Option<Pose>> {
        let refs = ReferencePoints::from_set(set)?;

        let Some((orientation, up)) = face_basis(&refs) else {
            return Ok(None);
        };

        let eye_dist = (refs.right_eye - refs.left_eye).norm();
        let target_scale =
            (self.projection.width_to_world(eye_dist) * self.scale_gain).max(MIN_TARGET_SCALE);

        // Forehead center on the depth plane, nudged along the face's up axis
        // from forehead toward the crown.
        let position =
            self.projection.to_world(&refs.forehead) + up * (self.crown_offset * target_scale);

        Ok(Some(Pose {
            position,
            orientation,
            scale: target_scale,
        }))
    }

    /// Forget smoothing history; the next valid detection seeds directly.
    pub fn reset(&mut self) {
        self.smoother.reset();
    }
}

/// Build the face's orthonormal frame from the eye line and the chin→nose
/// axis. Returns the orientation and the re-usable up axis, or `None` when
/// the input directions are degenerate.
///
/// `right` spans left eye → right eye, `up` spans chin → nose, and
/// `forward = right × up` points out of the face toward the camera, so a
/// face-on view yields the identity orientation. `right` is recomputed as
/// `up × forward` to guarantee an orthonormal right-handed frame even when
/// the raw eye line is not exactly perpendicular to the face axis.
fn face_basis(refs: &ReferencePoints) -> Option<(UnitQuaternion<f64>, Vector3<f64>)> {
    let right_raw = refs.right_eye - refs.left_eye;
    if right_raw.norm() <= DEGENERACY_EPS {
        return None;
    }
    let up_raw = refs.nose - refs.chin;
    if up_raw.norm() <= DEGENERACY_EPS {
        return None;
    }

    let right_raw = right_raw.normalize();
    let up = up_raw.normalize();

    let forward = right_raw.cross(&up);
    if forward.norm() <= DEGENERACY_EPS {
        return None;
    }
    let forward = forward.normalize();
    let right = up.cross(&forward);

    let rotation =
        Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[right, up, forward]));
    Some((UnitQuaternion::from_rotation_matrix(&rotation), up))
}
