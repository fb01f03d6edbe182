//! Face-anchored AR overlay tracking.
//!
//! This library drives a browser-style "hat try-on" pipeline: a face-landmark
//! detector reports normalized keypoints per video frame, and the pose solver
//! converts each report into a stable 3-D transform (position, orientation,
//! uniform scale) for an overlay anchor, blending out landmark jitter with
//! per-channel exponential smoothing.
//!
//! The detector, camera, model loader, and renderer are external
//! collaborators behind traits in [`session`]; the solver and the anchor
//! state are the library's own. Exactly one face is tracked and exactly one
//! overlay is attached.
//!
//! # Examples
//!
//! ## Solving one detector callback
//!
//! ```
//! use hat_tryon::anchor::AnchorHandle;
//! use hat_tryon::config::Config;
//! use hat_tryon::simulate::landmark_set_from_centered;
//! use hat_tryon::solver::PoseSolver;
//! use nalgebra::Vector3;
//!
//! let config = Config::default();
//! let mut solver = PoseSolver::from_config(&config);
//! let anchor = AnchorHandle::new();
//!
//! let face = landmark_set_from_centered(
//!     Vector3::new(-0.1, 0.0, 0.0), // left eye
//!     Vector3::new(0.1, 0.0, 0.0),  // right eye
//!     Vector3::new(0.0, 0.0, 0.0),  // nose
//!     Vector3::new(0.0, -0.2, 0.0), // chin
//!     Vector3::new(0.0, 0.25, 0.0), // forehead
//! );
//! solver.process(Some(&face), &anchor);
//!
//! let state = anchor.snapshot();
//! assert!(state.visible);
//! assert!(state.scale > 0.0);
//!
//! // Face lost: the overlay hides but keeps its transform.
//! solver.process(None, &anchor);
//! assert!(!anchor.snapshot().visible);
//! ```
//!
//! ## Running a full session headless
//!
//! ```
//! use hat_tryon::config::Config;
//! use hat_tryon::session::{Session, SessionBackends};
//! use hat_tryon::simulate::{BlankCamera, NullSurface, ScriptedSource, StubLoader};
//!
//! # fn main() -> hat_tryon::Result<()> {
//! let backends = SessionBackends {
//!     camera: Box::new(BlankCamera::new(1280, 720)),
//!     source: Box::new(ScriptedSource::new()),
//!     loader: Box::new(StubLoader::default()),
//!     surface: Box::new(NullSurface),
//! };
//! let mut session = Session::start(&Config::default(), backends)?;
//! for _ in 0..10 {
//!     session.pump();
//! }
//! assert!(session.presented().visible);
//! session.shutdown();
//! # Ok(())
//! # }
//! ```

/// Overlay anchor state and its shared single-writer handle
pub mod anchor;

/// Configuration management
pub mod config;

/// Error types and result handling
pub mod error;

/// Landmark types and reference-point aggregation
pub mod landmarks;

/// Normalized-to-world projection through the fixed depth plane
pub mod projection;

/// Session lifecycle and external collaborator contracts
pub mod session;

/// Simulated collaborators for headless runs and tests
pub mod simulate;

/// Per-channel exponential smoothing of the anchor transform
pub mod smoothing;

/// The landmark-to-transform pose solver
pub mod solver;

pub use error::{Error, Result};
