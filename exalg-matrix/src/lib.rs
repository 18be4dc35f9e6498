mod base;
pub use base::MatTrait;

mod error;
pub use error::MatError;

pub mod dense;
