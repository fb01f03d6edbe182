//! Projection of normalized image coordinates into world units.
//!
//! The face is approximated as lying on a plane at a fixed distance from the
//! camera: `half_height = depth * tan(fov / 2)` and `half_width =
//! half_height * aspect` give the visible extents of that plane, and centered
//! normalized coordinates scale linearly onto it. This is a calibration
//! approximation, not a metric depth reconstruction; in particular the
//! detector's landmark `z` is never treated as trustworthy metric depth.

use nalgebra::Vector3;

use crate::config::ProjectionConfig;

/// Camera projection parameters for the fixed depth-plane scheme.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    vertical_fov_deg: f64,
    aspect: f64,
    depth: f64,
}

impl Projection {
    pub fn new(vertical_fov_deg: f64, aspect: f64, depth: f64) -> Self {
        Self {
            vertical_fov_deg,
            aspect,
            depth,
        }
    }

    pub fn from_config(config: &ProjectionConfig) -> Self {
        Self::new(config.vertical_fov_deg, config.aspect, config.depth)
    }

    /// Half the height of the depth plane, in world units.
    pub fn half_height(&self) -> f64 {
        self.depth * (self.vertical_fov_deg.to_radians() / 2.0).tan()
    }

    /// Half the width of the depth plane, in world units.
    pub fn half_width(&self) -> f64 {
        self.half_height() * self.aspect
    }

    /// Project a centered normalized point onto the depth plane.
    ///
    /// The landmark's relative depth is dropped; the result lies in the
    /// plane `z = 0`.
    pub fn to_world(&self, centered: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(
            centered.x * 2.0 * self.half_width(),
            centered.y * 2.0 * self.half_height(),
            0.0,
        )
    }

    /// Convert a normalized horizontal distance into world units.
    pub fn width_to_world(&self, normalized: f64) -> f64 {
        normalized * 2.0 * self.half_width()
    }
}
