//! Vigil Detect - external collaborator contracts
//!
//! The fusion core treats neural inference, persistence and evidence storage
//! as black boxes behind narrow traits:
//! - **WeaponDetector**: frame-level object detection (stream 1)
//! - **BehaviorClassifier**: sequence-level temporal classification (stream 2)
//! - **IncidentLog**: fire-and-forget incident persistence
//! - **EvidenceStore**: frame storage for admitted alerts
//!
//! Simulated and scripted implementations stand in for real models in demos
//! and tests.

pub mod evidence;
pub mod persistence;
pub mod scripted;
pub mod simulated;
pub mod traits;

pub use evidence::*;
pub use persistence::*;
pub use scripted::*;
pub use simulated::*;
pub use traits::*;
