pub mod safety;
pub mod sanitize;

pub use safety::{CommandPolicy, PolicyError};
pub use sanitize::sanitize_proposal;
