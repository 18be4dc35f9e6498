//! N-ary gcd / lcm over iterators of integers.
//!
//! Conventions: `gcd` of no arguments is 1, `lcm` of no arguments is 0,
//! and the degenerate pair (0, 0) has lcm 0. Results are non-negative.

use num_traits::Signed;
use crate::{Integer, IntOps};

pub fn gcd<T, I>(xs: I) -> T
where T: Integer, for<'x> &'x T: IntOps<T>, I: IntoIterator<Item = T> {
    xs.into_iter()
        .reduce(|a, b| T::gcd(&a, &b))
        .map(|d| d.abs())
        .unwrap_or_else(T::one)
}

pub fn lcm<T, I>(xs: I) -> T
where T: Integer, for<'x> &'x T: IntOps<T>, I: IntoIterator<Item = T> {
    xs.into_iter()
        .reduce(|a, b| lcm2(&a, &b))
        .map(|l| l.abs())
        .unwrap_or_else(T::zero)
}

fn lcm2<T>(x: &T, y: &T) -> T
where T: Integer, for<'x> &'x T: IntOps<T> {
    if x.is_zero() && y.is_zero() {
        T::zero()
    } else {
        T::lcm(x, y)
    }
}
