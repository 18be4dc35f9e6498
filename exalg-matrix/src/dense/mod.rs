pub use crate::MatTrait;

mod _mat;
pub use _mat::*;

pub mod reduce;
pub mod cofactor;
