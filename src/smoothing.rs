//! Exponential smoothing of the anchor transform.
//!
//! Each channel blends independently toward its target:
//! `lerp` for position, `slerp` for orientation, a scalar blend for scale.
//! Settling time on a step input is roughly `ln(0.05) / ln(1 - alpha)`
//! callbacks to reach 95% convergence.

use crate::anchor::Pose;

/// Per-channel exponential smoother for a rigid transform.
pub struct TransformSmoother {
    position_alpha: f64,
    rotation_alpha: f64,
    scale_alpha: f64,
    seeded: bool,
}

impl TransformSmoother {
    /// Create a smoother with per-channel blend factors.
    ///
    /// # Panics
    ///
    /// Panics if any alpha is outside `(0, 1]`.
    pub fn new(position_alpha: f64, rotation_alpha: f64, scale_alpha: f64) -> Self {
        assert!(
            position_alpha > 0.0 && position_alpha <= 1.0,
            "Position alpha must be in (0, 1]"
        );
        assert!(
            rotation_alpha > 0.0 && rotation_alpha <= 1.0,
            "Rotation alpha must be in (0, 1]"
        );
        assert!(
            scale_alpha > 0.0 && scale_alpha <= 1.0,
            "Scale alpha must be in (0, 1]"
        );
        Self {
            position_alpha,
            rotation_alpha,
            scale_alpha,
            seeded: false,
        }
    }

    /// Blend the current transform toward the target.
    ///
    /// The very first call passes the target through unchanged, seeding the
    /// smoother instead of blending from the uninitialized default.
    pub fn blend(&mut self, current: &Pose, target: &Pose) -> Pose {
        if !self.seeded {
            self.seeded = true;
            return *target;
        }

        Pose {
            position: current.position.lerp(&target.position, self.position_alpha),
            orientation: current
                .orientation
                .slerp(&target.orientation, self.rotation_alpha),
            scale: current.scale + (target.scale - current.scale) * self.scale_alpha,
        }
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Forget the seed; the next blend passes its target through again.
    pub fn reset(&mut self) {
        self.seeded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{UnitQuaternion, Vector3};

    fn pose(x: f64, scale: f64) -> Pose {
        Pose {
            position: Vector3::new(x, 0.0, 0.0),
            orientation: UnitQuaternion::identity(),
            scale,
        }
    }

    #[test]
    fn test_first_blend_passes_through() {
        let mut smoother = TransformSmoother::new(0.25, 0.25, 0.25);
        let current = pose(0.0, 1.0);
        let target = pose(10.0, 2.0);

        let out = smoother.blend(&current, &target);
        assert_relative_eq!(out.position.x, 10.0);
        assert_relative_eq!(out.scale, 2.0);
        assert!(smoother.is_seeded());
    }

    #[test]
    fn test_second_blend_is_smoothed() {
        let mut smoother = TransformSmoother::new(0.5, 0.5, 0.5);
        let seed = pose(10.0, 2.0);
        smoother.blend(&pose(0.0, 1.0), &seed);

        let out = smoother.blend(&seed, &pose(20.0, 4.0));
        assert_relative_eq!(out.position.x, 15.0); // 10 + (20 - 10) * 0.5
        assert_relative_eq!(out.scale, 3.0); // 2 + (4 - 2) * 0.5
    }

    #[test]
    fn test_rotation_slerp_half_angle() {
        let mut smoother = TransformSmoother::new(0.5, 0.5, 0.5);
        let start = Pose {
            position: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
            scale: 1.0,
        };
        smoother.blend(&start, &start); // seed

        let quarter_turn = UnitQuaternion::from_euler_angles(0.0, std::f64::consts::FRAC_PI_2, 0.0);
        let target = Pose {
            orientation: quarter_turn,
            ..start
        };
        let out = smoother.blend(&start, &target);
        assert_relative_eq!(
            out.orientation.angle_to(&UnitQuaternion::identity()),
            std::f64::consts::FRAC_PI_4,
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_reset_reseeds() {
        let mut smoother = TransformSmoother::new(0.25, 0.25, 0.25);
        smoother.blend(&pose(0.0, 1.0), &pose(10.0, 2.0));
        smoother.reset();

        let out = smoother.blend(&pose(10.0, 2.0), &pose(50.0, 8.0));
        assert_relative_eq!(out.position.x, 50.0);
        assert_relative_eq!(out.scale, 8.0);
    }

    #[test]
    #[should_panic(expected = "Position alpha must be in (0, 1]")]
    fn test_zero_alpha_rejected() {
        let _ = TransformSmoother::new(0.0, 0.25, 0.25);
    }

    #[test]
    #[should_panic(expected = "Scale alpha must be in (0, 1]")]
    fn test_too_large_alpha_rejected() {
        let _ = TransformSmoother::new(0.25, 0.25, 1.5);
    }
}
