use std::ops::Neg;
use nalgebra::{Scalar, ClosedAdd, ClosedMul};
use num_traits::{Zero, One, Float};
use log::debug;
use exalg::{Field, FieldOps, Ring};
use crate::MatError;
use super::*;

pub fn det<R>(a: &Mat<R>) -> Result<R, MatError>
where R: Scalar + Zero + One + ClosedAdd + ClosedMul + Neg<Output = R> {
    let (m, n) = a.shape();
    if m != n {
        return Err(MatError::NotSquare(m, n))
    }

    debug!("det: {:?}.", a.shape());

    Ok(det_rec(a))
}

// Laplace expansion along the first column, skipping zero entries.
fn det_rec<R>(a: &Mat<R>) -> R
where R: Scalar + Zero + One + ClosedAdd + ClosedMul + Neg<Output = R> {
    let n = a.nrows();

    if n == 0 {
        return R::one()
    }
    if n == 1 {
        return a[(0, 0)].clone()
    }

    let mut res = R::zero();
    let mut e = R::one();

    for i in 0..n {
        let x = &a[(i, 0)];
        if !x.is_zero() {
            let m = a.removing(i, 0);
            res += e.clone() * x.clone() * det_rec(&m);
        }
        e = -e;
    }

    res
}

pub fn cofactor<R>(a: &Mat<R>, i: usize, j: usize) -> Result<R, MatError>
where R: Scalar + Zero + One + ClosedAdd + ClosedMul + Neg<Output = R> {
    let (m, n) = a.shape();
    if m != n {
        return Err(MatError::NotSquare(m, n))
    }
    if i >= m {
        return Err(MatError::IndexOutOfRange(i, m))
    }
    if j >= n {
        return Err(MatError::IndexOutOfRange(j, n))
    }

    let d = det_rec(&a.removing(i, j));
    Ok(if (i + j) % 2 == 0 { d } else { -d })
}

pub fn cofactor_mat<R>(a: &Mat<R>) -> Result<Mat<R>, MatError>
where R: Scalar + Zero + One + ClosedAdd + ClosedMul + Neg<Output = R> {
    let (m, n) = a.shape();
    if m != n {
        return Err(MatError::NotSquare(m, n))
    }

    debug!("cofactor-mat: {:?}.", a.shape());

    Ok(Mat::from_fn((n, n), |i, j| {
        let d = det_rec(&a.removing(i, j));
        if (i + j) % 2 == 0 { d } else { -d }
    }))
}

pub fn adjugate<R>(a: &Mat<R>) -> Result<Mat<R>, MatError>
where R: Scalar + Zero + One + ClosedAdd + ClosedMul + Neg<Output = R> {
    Ok(cofactor_mat(a)?.transpose())
}

/// `a⁻¹ = adj(a) / det(a)`, `None` when `a` is singular or not square.
pub fn inverse<R>(a: &Mat<R>) -> Option<Mat<R>>
where R: Field + ClosedAdd + ClosedMul, for<'x> &'x R: FieldOps<R> {
    if !a.is_square() {
        return None
    }

    let d = det_rec(a);
    let dinv = d.inv()?;
    let adj = adjugate(a).ok()?;

    Some(adj.mul_scalar(&dinv))
}

pub fn inverse_float<R>(a: &Mat<R>) -> Option<Mat<R>>
where R: Scalar + Float + ClosedAdd + ClosedMul {
    if !a.is_square() {
        return None
    }

    let d = det_rec(a);
    if d.is_zero() {
        return None
    }

    let adj = adjugate(a).ok()?;
    Some(adj.mul_scalar(&(R::one() / d)))
}
