mod int_ext;

pub mod arith;

pub use int_ext::*;
