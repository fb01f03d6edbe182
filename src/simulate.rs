//! Simulated collaborators for headless runs and tests.
//!
//! Stands in for the real camera, detector, loader, and renderer so the full
//! session pipeline can run without hardware, an ML model, or a GPU. The
//! scripted source sweeps a synthetic head through a slow yaw/pitch orbit
//! and periodically drops the face to exercise the no-face path.

use image::RgbImage;
use log::debug;
use nalgebra::{Rotation3, Vector3};

use crate::landmarks::{
    LandmarkPoint, LandmarkSet, CHIN_INDEX, FACE_MESH_LANDMARK_COUNT, FOREHEAD_INDICES,
    LEFT_EYE_INDICES, NOSE_TIP_INDEX, RIGHT_EYE_INDICES,
};
use crate::session::{
    CameraDevice, CameraProvider, CameraStream, Detection, DetectionSink, LandmarkSource,
    ModelHandle, ModelLoader, RenderSurface,
};
use crate::{Error, Result};

/// Build a full-size landmark set from the five reference points, given in
/// centered coordinates. Every member of an averaged group is set to the
/// group's value, so aggregation reproduces the inputs exactly; all other
/// indices sit at the nose.
pub fn landmark_set_from_centered(
    left_eye: Vector3<f64>,
    right_eye: Vector3<f64>,
    nose: Vector3<f64>,
    chin: Vector3<f64>,
    forehead: Vector3<f64>,
) -> LandmarkSet {
    let to_point = |v: &Vector3<f64>| LandmarkPoint::new(v.x + 0.5, 0.5 - v.y, v.z);

    let mut points = vec![to_point(&nose); FACE_MESH_LANDMARK_COUNT];
    for i in LEFT_EYE_INDICES {
        points[i] = to_point(&left_eye);
    }
    for i in RIGHT_EYE_INDICES {
        points[i] = to_point(&right_eye);
    }
    points[NOSE_TIP_INDEX] = to_point(&nose);
    points[CHIN_INDEX] = to_point(&chin);
    for i in FOREHEAD_INDICES {
        points[i] = to_point(&forehead);
    }
    LandmarkSet::new(points)
}

/// Scripted landmark source: ignores frame content and synthesizes a face
/// orbiting slowly in yaw and pitch. Every `dropout_period`-th frame reports
/// no face.
pub struct ScriptedSource {
    sink: Option<DetectionSink>,
    frame_count: u64,
    dropout_period: u64,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            sink: None,
            frame_count: 0,
            dropout_period: 90,
        }
    }

    /// Base face geometry in centered coordinates, face-on.
    fn base_face() -> [Vector3<f64>; 5] {
        [
            Vector3::new(-0.06, 0.04, 0.0),  // left eye
            Vector3::new(0.06, 0.04, 0.0),   // right eye
            Vector3::new(0.0, 0.0, 0.03),    // nose
            Vector3::new(0.0, -0.12, 0.0),   // chin
            Vector3::new(0.0, 0.10, 0.0),    // forehead
        ]
    }
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LandmarkSource for ScriptedSource {
    fn start(&mut self, sink: DetectionSink) -> Result<()> {
        self.sink = Some(sink);
        Ok(())
    }

    fn send(&mut self, _frame: &RgbImage) -> Result<()> {
        let Some(sink) = &self.sink else {
            return Err(Error::Detector("source not started".to_string()));
        };

        self.frame_count += 1;

        if self.frame_count % self.dropout_period == 0 {
            sink.publish(Detection::default());
            return Ok(());
        }

        // Slow orbit: yaw up to ~20 degrees, pitch up to ~12.
        let t = self.frame_count as f64 * 0.05;
        let yaw = t.cos() * 20.0_f64.to_radians();
        let pitch = t.sin() * 12.0_f64.to_radians();
        let drift = Vector3::new(t.sin() * 0.03, t.cos() * 0.02, 0.0);

        let rotation = Rotation3::from_euler_angles(pitch, yaw, 0.0);
        let [left_eye, right_eye, nose, chin, forehead] =
            Self::base_face().map(|p| rotation * p + drift);

        sink.publish(Detection {
            faces: vec![landmark_set_from_centered(
                left_eye, right_eye, nose, chin, forehead,
            )],
        });
        Ok(())
    }

    fn stop(&mut self) {
        self.sink = None;
    }
}

/// Camera provider with a single synthetic device emitting blank frames.
pub struct BlankCamera {
    width: u32,
    height: u32,
}

impl BlankCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl CameraProvider for BlankCamera {
    fn list_devices(&self) -> Result<Vec<CameraDevice>> {
        Ok(vec![CameraDevice {
            id: "sim0".to_string(),
            label: "Simulated camera".to_string(),
        }])
    }

    fn open(&mut self, device_id: Option<&str>) -> Result<Box<dyn CameraStream>> {
        if let Some(id) = device_id {
            if id != "sim0" {
                return Err(Error::Acquisition(format!("no such device: {id}")));
            }
        }
        Ok(Box::new(BlankStream {
            frame: RgbImage::new(self.width, self.height),
            released: false,
        }))
    }
}

struct BlankStream {
    frame: RgbImage,
    released: bool,
}

impl CameraStream for BlankStream {
    fn grab(&mut self) -> Result<RgbImage> {
        if self.released {
            return Err(Error::Acquisition("stream released".to_string()));
        }
        Ok(self.frame.clone())
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// Loader that mints a fresh handle per request without touching disk.
#[derive(Default)]
pub struct StubLoader {
    next_id: u64,
}

impl ModelLoader for StubLoader {
    fn load(&mut self, path: &str) -> Result<ModelHandle> {
        if path.is_empty() {
            return Err(Error::Asset("empty model path".to_string()));
        }
        self.next_id += 1;
        Ok(ModelHandle(self.next_id))
    }
}

/// Render surface that only logs; there is nothing to draw headless.
#[derive(Default)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn attach(&mut self, model: ModelHandle) {
        debug!("attach {model:?}");
    }

    fn dispose(&mut self, model: ModelHandle) {
        debug!("dispose {model:?}");
    }

    fn stop(&mut self) {}

    fn release(&mut self) {}
}
