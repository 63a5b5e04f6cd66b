//! tubewalk geometry: curves, tubes, and frames along them.

pub mod arc_length;
pub mod curve;
pub mod mesh;
pub mod sampler;
pub mod tube;

pub use arc_length::ArcLength;
pub use curve::Curve;
pub use mesh::TriangleMesh;
pub use sampler::{place_on_curve, sample_frame, step_between, travel_param, Frame, Placement};
pub use tube::Tube;
