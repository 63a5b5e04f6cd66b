use crate::error::Result;

/// Validate structural integrity of a geometric entity or a configuration.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}
