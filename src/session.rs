//! Session lifecycle: owns every per-run resource and wires the per-frame
//! pipeline together.
//!
//! A `Session` is constructed over pluggable collaborators (camera, landmark
//! detector, model loader, render surface) acquired as a unit on start and
//! torn down as a unit, in an order that avoids use-after-release: render
//! surface first, then the detector, then the camera stream, then rendering
//! resources. Detections flow through a single-slot latest-wins mailbox, so
//! the solver always consumes the newest landmark set regardless of how the
//! detector's callback rate compares to the caller's.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use image::RgbImage;
use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::anchor::{AnchorHandle, AnchorState};
use crate::config::{CalibrationConfig, Config};
use crate::landmarks::LandmarkSet;
use crate::solver::PoseSolver;
use crate::Result;

/// One available video input device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub id: String,
    pub label: String,
}

/// Opaque handle to a loaded overlay model, minted by a [`ModelLoader`] and
/// meaningful only to the paired [`RenderSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelHandle(pub u64);

/// One detector callback's worth of output: zero or one faces for this
/// system.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    pub faces: Vec<LandmarkSet>,
}

/// Camera enumeration and stream acquisition.
pub trait CameraProvider {
    /// List the available video input devices.
    ///
    /// # Errors
    ///
    /// Returns `Error::Acquisition` when enumeration itself fails.
    fn list_devices(&self) -> Result<Vec<CameraDevice>>;

    /// Open a stream on the given device, or the default device when `None`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Acquisition` on permission denial or missing device.
    fn open(&mut self, device_id: Option<&str>) -> Result<Box<dyn CameraStream>>;
}

/// An open camera stream.
pub trait CameraStream {
    /// Grab the next frame.
    ///
    /// # Errors
    ///
    /// Returns `Error::Acquisition` when the stream cannot deliver a frame.
    fn grab(&mut self) -> Result<RgbImage>;

    /// Release the stream's tracks. Must be idempotent.
    fn release(&mut self);
}

/// The face-landmark detector boundary.
///
/// Implementations receive frames via [`send`](LandmarkSource::send) and
/// surface detections on the [`DetectionSink`] handed to
/// [`start`](LandmarkSource::start), at whatever rate they process frames.
/// After [`stop`](LandmarkSource::stop) the sink is dead: late publishes are
/// dropped by the liveness check, so a detector finishing a frame mid-teardown
/// is harmless.
pub trait LandmarkSource {
    /// Start the detector, giving it the sink to publish detections on.
    ///
    /// # Errors
    ///
    /// Returns `Error::Detector` when the detector cannot be constructed.
    fn start(&mut self, sink: DetectionSink) -> Result<()>;

    /// Feed one video frame.
    ///
    /// # Errors
    ///
    /// Returns `Error::Detector` on per-frame processing failure; the
    /// session logs and absorbs these.
    fn send(&mut self, frame: &RgbImage) -> Result<()>;

    /// Stop the detector. Must be idempotent.
    fn stop(&mut self);
}

/// Overlay model loading.
pub trait ModelLoader {
    /// Resolve a model path into a renderable handle.
    ///
    /// # Errors
    ///
    /// Returns `Error::Asset` when the model cannot be loaded.
    fn load(&mut self, path: &str) -> Result<ModelHandle>;
}

/// The rendering boundary. The render loop itself lives behind this trait
/// and reads the anchor through [`AnchorHandle::snapshot`]; the session only
/// drives attach/dispose and teardown.
pub trait RenderSurface {
    /// Attach a model to the overlay anchor.
    fn attach(&mut self, model: ModelHandle);

    /// Free a model's rendering resources.
    fn dispose(&mut self, model: ModelHandle);

    /// Stop the redraw loop. Must be idempotent.
    fn stop(&mut self);

    /// Release remaining rendering resources. Called last during teardown.
    fn release(&mut self);
}

/// Single-slot latest-wins mailbox between the detector and the solver.
///
/// The solver only ever wants the newest detection; queuing older ones would
/// add latency whenever the detector outpaces the pump.
#[derive(Default)]
pub struct DetectionSlot {
    latest: Mutex<Option<Detection>>,
}

impl DetectionSlot {
    /// Overwrite the slot with the newest detection.
    pub fn publish(&self, detection: Detection) {
        *self.latest.lock() = Some(detection);
    }

    /// Drain the slot.
    pub fn take(&self) -> Option<Detection> {
        self.latest.lock().take()
    }
}

/// Publishing end of the detection mailbox, handed to the landmark source.
///
/// Checks the session's liveness flag on every publish, so detections
/// completing after teardown are no-ops.
#[derive(Clone)]
pub struct DetectionSink {
    slot: Arc<DetectionSlot>,
    live: Arc<AtomicBool>,
}

impl DetectionSink {
    pub fn publish(&self, detection: Detection) {
        if !self.live.load(Ordering::SeqCst) {
            debug!("detection arrived after teardown, dropped");
            return;
        }
        self.slot.publish(detection);
    }
}

/// The pluggable collaborators a session is built over.
pub struct SessionBackends {
    pub camera: Box<dyn CameraProvider>,
    pub source: Box<dyn LandmarkSource>,
    pub loader: Box<dyn ModelLoader>,
    pub surface: Box<dyn RenderSurface>,
}

/// Token identifying one model-swap request. Completions carrying an
/// outdated token are discarded instead of attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    token: u64,
    path: String,
}

impl ModelRequest {
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// One run of the try-on pipeline, owning all per-run resources.
pub struct Session {
    stream: Box<dyn CameraStream>,
    source: Box<dyn LandmarkSource>,
    loader: Box<dyn ModelLoader>,
    surface: Box<dyn RenderSurface>,
    solver: PoseSolver,
    anchor: AnchorHandle,
    calibration: CalibrationConfig,
    slot: Arc<DetectionSlot>,
    live: Arc<AtomicBool>,
    model_token: u64,
    current_model: Option<ModelHandle>,
}

impl Session {
    /// Acquire all resources and start the pipeline.
    ///
    /// Acquisition order: camera stream, then detector, then the initial
    /// model (if configured). A camera or detector failure tears down
    /// whatever was already acquired and is returned to the caller: fatal,
    /// no retry. A failed initial model load is logged and absorbed; the
    /// session starts with no model attached.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` for an invalid configuration,
    /// `Error::Acquisition` or `Error::Detector` for acquisition failures.
    pub fn start(config: &Config, backends: SessionBackends) -> Result<Self> {
        config.validate()?;

        let SessionBackends {
            mut camera,
            mut source,
            loader,
            surface,
        } = backends;

        info!("starting try-on session");
        let mut stream = camera.open(config.session.device_id.as_deref())?;

        let live = Arc::new(AtomicBool::new(true));
        let slot = Arc::new(DetectionSlot::default());
        let sink = DetectionSink {
            slot: Arc::clone(&slot),
            live: Arc::clone(&live),
        };
        if let Err(e) = source.start(sink) {
            stream.release();
            return Err(e);
        }

        let mut session = Self {
            stream,
            source,
            loader,
            surface,
            solver: PoseSolver::from_config(config),
            anchor: AnchorHandle::new(),
            calibration: config.calibration.clone(),
            slot,
            live,
            model_token: 0,
            current_model: None,
        };

        if let Some(path) = &config.session.model_path {
            session.swap_model(path);
        }

        Ok(session)
    }

    /// Drive one step of the pipeline: grab a frame, feed the detector, and
    /// run the solver on the newest detection, if any.
    ///
    /// Per-frame camera and detector failures are logged and absorbed; the
    /// overlay freezes at its last state rather than crashing the loop.
    /// After teardown this is a no-op.
    pub fn pump(&mut self) {
        if !self.live.load(Ordering::SeqCst) {
            return;
        }

        match self.stream.grab() {
            Ok(frame) => {
                if let Err(e) = self.source.send(&frame) {
                    warn!("detector failed on frame, overlay frozen: {e}");
                }
            }
            Err(e) => warn!("camera frame read failed, retrying: {e}"),
        }

        if let Some(detection) = self.slot.take() {
            self.solver.process(detection.faces.first(), &self.anchor);
        }
    }

    /// Handle for the render loop (and anyone else reading the anchor).
    pub fn anchor(&self) -> AnchorHandle {
        self.anchor.clone()
    }

    /// The anchor state with the user's calibration layered on top; this is
    /// what the overlay is actually drawn with.
    pub fn presented(&self) -> AnchorState {
        self.anchor.snapshot().apply_calibration(&self.calibration)
    }

    /// Replace the live calibration (slider input); no restart needed.
    pub fn set_calibration(&mut self, calibration: CalibrationConfig) {
        self.calibration = calibration;
    }

    pub fn current_model(&self) -> Option<ModelHandle> {
        self.current_model
    }

    /// Begin a model swap, superseding any in-flight request.
    pub fn request_model(&mut self, path: &str) -> ModelRequest {
        self.model_token += 1;
        debug!("model swap requested: {path} (token {})", self.model_token);
        ModelRequest {
            token: self.model_token,
            path: path.to_string(),
        }
    }

    /// Complete a model swap with the loader's outcome.
    ///
    /// A completion whose token has been superseded, or that lands after
    /// teardown, is disposed, never attached. A failed load keeps the
    /// previously attached model. On success the previous model's resources
    /// are freed before the new one is attached.
    pub fn finish_model(&mut self, request: &ModelRequest, loaded: Result<ModelHandle>) {
        if !self.live.load(Ordering::SeqCst) {
            if let Ok(model) = loaded {
                self.surface.dispose(model);
            }
            return;
        }

        if request.token != self.model_token {
            if let Ok(model) = loaded {
                debug!("stale model load discarded: {}", request.path);
                self.surface.dispose(model);
            }
            return;
        }

        match loaded {
            Ok(model) => {
                if let Some(previous) = self.current_model.take() {
                    self.surface.dispose(previous);
                }
                self.surface.attach(model);
                self.current_model = Some(model);
                info!("model attached: {}", request.path);
            }
            Err(e) => warn!("model load failed, keeping previous model: {e}"),
        }
    }

    /// Request, load, and complete a model swap in one step.
    pub fn swap_model(&mut self, path: &str) {
        let request = self.request_model(path);
        let loaded = self.loader.load(path);
        self.finish_model(&request, loaded);
    }

    /// Tear down the session. Safe to call at any time, idempotent, and
    /// ordered to avoid use-after-release: stop the render surface, stop the
    /// landmark source, release the camera tracks, then free rendering
    /// resources.
    pub fn shutdown(&mut self) {
        if !self.live.swap(false, Ordering::SeqCst) {
            return;
        }
        info!("tearing down try-on session");

        self.surface.stop();
        self.source.stop();
        self.stream.release();
        if let Some(model) = self.current_model.take() {
            self.surface.dispose(model);
        }
        self.surface.release();
        self.slot.take();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}
