pub mod error;
pub mod tolerance;
pub mod traits;

pub use error::{Result, TwError};
pub use tolerance::Tolerance;
pub use traits::Validate;
