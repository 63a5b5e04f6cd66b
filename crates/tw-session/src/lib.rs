//! tubewalk session: one flythrough page as a value.

pub mod clock;
pub mod config;
pub mod session;
pub mod travel;

pub use clock::Clock;
pub use config::{CameraMode, CurveConfig, ModelPlacement, SessionConfig};
pub use session::{CameraPose, DisposeReport, LoadReport, SceneSession, CAMERA_NODE, TUBE_NODE};
pub use travel::{LoopTravel, StepState, StepTravel};
