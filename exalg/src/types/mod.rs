mod ratio;

pub use ratio::*;
