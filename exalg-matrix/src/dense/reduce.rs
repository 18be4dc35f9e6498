use std::cmp::{min, Ordering};
use std::fmt::Display;
use log::{debug, trace, warn};
use nalgebra::{Scalar, ClosedAdd, ClosedMul};
use num_traits::{Float, One, Signed, Zero};
use exalg::{Integer, IntOps};
use exalg::arith;
use crate::MatError;
use super::*;

/// Outcome of a row reduction, together with the rank-deficiency flag.
#[derive(Debug)]
pub struct Reduced<R> {
    result: Mat<R>,
    singular: bool
}

impl<R> Reduced<R> {
    pub fn result(&self) -> &Mat<R> {
        &self.result
    }

    pub fn into_result(self) -> Mat<R> {
        self.result
    }

    pub fn is_singular(&self) -> bool {
        self.singular
    }
}

pub fn row_echelon<R>(a: &Mat<R>) -> Reduced<R>
where R: Scalar + Float + Display + ClosedAdd + ClosedMul {
    row_echelon_in_place(a.clone())
}

pub fn row_echelon_in_place<R>(mut a: Mat<R>) -> Reduced<R>
where R: Scalar + Float + Display + ClosedAdd + ClosedMul {
    debug!("start float row-echelon: {:?}.", a.shape());
    trace!("{a}");

    let (m, n) = a.shape();
    let mut singular = false;

    for k in 0..min(m, n) {
        // partial pivoting
        let i_p = (k..m).max_by(|&i, &j|
            a[(i, k)].abs().partial_cmp(&a[(j, k)].abs()).unwrap_or(Ordering::Equal)
        ).unwrap_or(k);

        if i_p != k {
            a.swap_rows(k, i_p);
            trace!("swap-rows: ({k}, {i_p})\n{a}");
        }

        let p = a[(k, k)];
        if p.is_zero() {
            warn!("no pivot in column {k}.");
            singular = true;
            continue
        }

        for i in (k + 1)..m {
            let f = a[(i, k)] / p;
            if f.is_zero() { continue }

            a.add_row_to(k, i, &-f);
            a[(i, k)] = R::zero();
        }

        trace!("eliminate col {k}:\n{a}");
    }

    debug!("row-echelon done.");
    trace!("{a}");

    Reduced { result: a, singular }
}

pub fn reduced_row_echelon<R>(a: &Mat<R>) -> Result<Mat<R>, MatError>
where R: Scalar + Float + Display + ClosedAdd + ClosedMul {
    reduced_row_echelon_in_place(a.clone())
}

/// Gauss-Jordan on an augmented `m x (m + 1)` system, result is `[I | x]`.
pub fn reduced_row_echelon_in_place<R>(a: Mat<R>) -> Result<Mat<R>, MatError>
where R: Scalar + Float + Display + ClosedAdd + ClosedMul {
    let (m, n) = a.shape();
    if n != m + 1 {
        return Err(MatError::NotSquare(m, n))
    }

    let red = row_echelon_in_place(a);
    if red.is_singular() {
        return Err(MatError::Singular)
    }

    let mut a = red.into_result();

    for i in (0..m).rev() {
        let p = a[(i, i)];
        let b = a[(i, m)] / p;

        a[(i, i)] = R::one();
        a[(i, m)] = b;

        for k in 0..i {
            let f = a[(k, i)];
            if f.is_zero() { continue }

            a[(k, m)] = a[(k, m)] - f * b;
            a[(k, i)] = R::zero();
        }
    }

    debug!("back-substitution done.");
    trace!("{a}");

    Ok(a)
}

pub fn row_echelon_exact<R>(a: &Mat<R>) -> Reduced<R>
where R: Integer + ClosedAdd + ClosedMul, for<'x> &'x R: IntOps<R> {
    row_echelon_exact_in_place(a.clone())
}

pub fn row_echelon_exact_in_place<R>(a: Mat<R>) -> Reduced<R>
where R: Integer + ClosedAdd + ClosedMul, for<'x> &'x R: IntOps<R> {
    debug!("start exact row-echelon: {:?}.", a.shape());
    trace!("{a}");

    let mut calc = EchelonCalc::new(a);
    calc.process_echelon();

    debug!("row-echelon done.");

    calc.result()
}

pub fn reduced_row_echelon_exact<R>(a: &Mat<R>) -> Reduced<R>
where R: Integer + ClosedAdd + ClosedMul, for<'x> &'x R: IntOps<R> {
    reduced_row_echelon_exact_in_place(a.clone())
}

pub fn reduced_row_echelon_exact_in_place<R>(a: Mat<R>) -> Reduced<R>
where R: Integer + ClosedAdd + ClosedMul, for<'x> &'x R: IntOps<R> {
    debug!("start exact reduced row-echelon: {:?}.", a.shape());
    trace!("{a}");

    let mut calc = EchelonCalc::new(a);
    calc.process_rref();

    debug!("reduced row-echelon done.");

    calc.result()
}

pub fn hermite_normal_form<R>(a: &Mat<R>) -> Reduced<R>
where R: Integer + ClosedAdd + ClosedMul, for<'x> &'x R: IntOps<R> {
    hermite_normal_form_in_place(a.clone())
}

pub fn hermite_normal_form_in_place<R>(a: Mat<R>) -> Reduced<R>
where R: Integer + ClosedAdd + ClosedMul, for<'x> &'x R: IntOps<R> {
    debug!("start hnf: {:?}.", a.shape());
    trace!("{a}");

    let mut calc = EchelonCalc::new(a);
    calc.process_hnf();

    debug!("hnf done.");

    calc.result()
}

// Fraction-free elimination over an integral domain: each pivot column is
// cleared by scaling the involved rows to their lcm, then every touched row
// is divided back by its gcd with a positive leading entry.
#[derive(Debug)]
struct EchelonCalc<R>
where R: Integer + ClosedAdd + ClosedMul, for<'x> &'x R: IntOps<R> {
    target: Mat<R>,
    singular: bool
}

impl<R> EchelonCalc<R>
where R: Integer + ClosedAdd + ClosedMul, for<'x> &'x R: IntOps<R> {
    fn new(target: Mat<R>) -> Self {
        Self { target, singular: false }
    }

    fn result(self) -> Reduced<R> {
        trace!("{}", self.target);
        Reduced { result: self.target, singular: self.singular }
    }

    fn process_echelon(&mut self) {
        let (m, n) = self.target.shape();
        let (mut r, mut c) = (0, 0);

        while r < m && c < n {
            self.sort_rows_from(r, c);

            if self.target[(r, c)].is_zero() {
                warn!("no pivot in column {c}.");
                self.singular = true;
                c += 1;
                continue
            }

            self.pivot_step(r, c);

            r += 1;
            c += 1;
        }
    }

    fn process_rref(&mut self) {
        self.process_echelon();

        let m = self.target.nrows();

        for i in (0..m).rev() {
            let Some(c) = self.pivot_col(i) else {
                continue
            };

            let rows: Vec<usize> = (0..=i).filter(|&k|
                !self.target[(k, c)].is_zero()
            ).collect();

            if rows.len() > 1 {
                let l = arith::lcm(rows.iter().map(|&k| self.target[(k, c)].clone()));
                trace!("clear col {c} above row {i}, lcm: {l}");

                for &k in &rows {
                    let f = &l / &self.target[(k, c)];
                    if !f.is_one() {
                        self.target.mul_row(k, &f);
                    }
                }
                for &k in &rows {
                    if k == i { continue }
                    self.target.add_row_to(i, k, &-R::one());
                }
            }

            for &k in &rows {
                self.reduce_row(k);
            }
        }
    }

    fn process_hnf(&mut self) {
        self.hnf_step(0, 0);
    }

    fn hnf_step(&mut self, r: usize, c: usize) {
        let (m, n) = self.target.shape();
        if r >= m || c >= n {
            return
        }

        if self.block_is_zero(r, c) {
            warn!("remaining block at ({r}, {c}) is zero.");
            self.singular = true;
            return
        }

        self.push_zero_rows_down(r, c);

        if self.target[(r, c)].is_zero() {
            warn!("no pivot in column {c}.");
            self.singular = true;
            self.hnf_step(r, c + 1);
        } else {
            self.pivot_step(r, c);
            self.hnf_step(r + 1, c + 1);
        }
    }

    // Scales rows `r..` with a nonzero entry in col `c` to their common lcm,
    // subtracts the pivot row from the lower ones, then re-reduces each row.
    fn pivot_step(&mut self, r: usize, c: usize) {
        let m = self.target.nrows();
        let l = self.col_lcm(r, c);

        trace!("pivot at ({r}, {c}), lcm: {l}");

        for i in r..m {
            let a = self.target[(i, c)].clone();
            if a.is_zero() { continue }

            let f = &l / &a;
            if !f.is_one() {
                self.target.mul_row(i, &f);
            }
        }

        for i in (r + 1)..m {
            if self.target[(i, c)].is_zero() { continue }
            self.target.add_row_to(r, i, &-R::one());
        }

        for i in r..m {
            self.reduce_row(i);
        }

        trace!("{}", self.target);
    }

    // Divides row `i` by the gcd of its entries, leading entry positive.
    fn reduce_row(&mut self, i: usize) {
        let n = self.target.ncols();
        let g = arith::gcd((0..n).map(|j| self.target[(i, j)].clone()));
        if g.is_zero() {
            return
        }

        let lead = (0..n).find(|&j| !self.target[(i, j)].is_zero()).unwrap_or(0);
        let d = if self.target[(i, lead)].is_negative() { -g } else { g };
        if d.is_one() {
            return
        }

        for j in 0..n {
            self.target[(i, j)] = &self.target[(i, j)] / &d;
        }
    }

    fn col_lcm(&self, r: usize, c: usize) -> R {
        let m = self.target.nrows();
        arith::lcm((r..m).map(|i|
            self.target[(i, c)].clone()
        ).filter(|a| !a.is_zero()))
    }

    fn pivot_col(&self, i: usize) -> Option<usize> {
        (0..self.target.ncols()).find(|&j| !self.target[(i, j)].is_zero())
    }

    // Rows with a zero in col `c` sink below rows without, the rest compare
    // lexicographically from col `c` on.
    fn cmp_rows(&self, i: usize, j: usize, c: usize) -> Ordering {
        let n = self.target.ncols();
        match (self.target[(i, c)].is_zero(), self.target[(j, c)].is_zero()) {
            (true,  false) => Ordering::Greater,
            (false, true)  => Ordering::Less,
            _ => (c..n).map(|k|
                self.target[(i, k)].cmp(&self.target[(j, k)])
            ).find(|o| o.is_ne()).unwrap_or(Ordering::Equal)
        }
    }

    fn sort_rows_from(&mut self, r: usize, c: usize) {
        let m = self.target.nrows();
        let mut rows: Vec<usize> = (r..m).collect();
        rows.sort_by(|&i, &j| self.cmp_rows(i, j, c));

        self.permute_rows_from(r, rows);
    }

    // Stable partition of rows `r..` by zeroness at col `c`.
    fn push_zero_rows_down(&mut self, r: usize, c: usize) {
        let m = self.target.nrows();
        let (nz, z): (Vec<usize>, Vec<usize>) = (r..m).partition(|&i|
            !self.target[(i, c)].is_zero()
        );

        self.permute_rows_from(r, nz.into_iter().chain(z).collect());
    }

    fn permute_rows_from(&mut self, r: usize, rows: Vec<usize>) {
        if rows.iter().enumerate().all(|(k, &i)| i == r + k) {
            return
        }

        let data: Vec<Vec<R>> = rows.iter().map(|&i| self.target.row_vec(i)).collect();
        for (k, row) in data.into_iter().enumerate() {
            self.set_row(r + k, row);
        }
    }

    fn set_row(&mut self, i: usize, row: Vec<R>) {
        for (j, a) in row.into_iter().enumerate() {
            self.target[(i, j)] = a;
        }
    }

    fn block_is_zero(&self, r: usize, c: usize) -> bool {
        self.target.iter().all(|(i, j, a)|
            i < r || j < c || a.is_zero()
        )
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use super::*;

    #[test]
    fn float_echelon() {
        let a = Mat::from_data((2, 2), [2.0, 1.0, 4.0, 1.0]);
        let red = row_echelon(&a);

        assert!(!red.is_singular());
        assert_eq!(red.result(), &Mat::from_data((2, 2), [4.0, 1.0, 0.0, 0.5]));
    }

    #[test]
    fn float_echelon_singular() {
        let a = Mat::from_data((2, 2), [1.0, 2.0, 2.0, 4.0]);
        let red = row_echelon(&a);

        assert!(red.is_singular());
        assert_eq!(red.result(), &Mat::from_data((2, 2), [2.0, 4.0, 0.0, 0.0]));
    }

    #[test]
    fn float_rref_diag() {
        let a = Mat::from_data((3, 4), [
            2.0, 0.0, 0.0,  4.0,
            0.0, 4.0, 0.0,  8.0,
            0.0, 0.0, 8.0, 16.0
        ]);
        let res = reduced_row_echelon(&a).unwrap();

        assert_eq!(res, Mat::from_data((3, 4), [
            1.0, 0.0, 0.0, 2.0,
            0.0, 1.0, 0.0, 2.0,
            0.0, 0.0, 1.0, 2.0
        ]));
    }

    #[test]
    fn float_rref_solve() {
        let a = Mat::from_data((3, 4), [
             2.0,  1.0, -1.0,   8.0,
            -3.0, -1.0,  2.0, -11.0,
            -2.0,  1.0,  2.0,  -3.0
        ]);
        let mut res = reduced_row_echelon(&a).unwrap();
        res.round_nearby(1e-9);

        assert_eq!(res, Mat::from_data((3, 4), [
            1.0, 0.0, 0.0,  2.0,
            0.0, 1.0, 0.0,  3.0,
            0.0, 0.0, 1.0, -1.0
        ]));
    }

    #[test]
    fn float_rref_bad_shape() {
        let a = Mat::from_data((2, 2), [1.0, 2.0, 3.0, 4.0]);
        let e = reduced_row_echelon(&a);
        assert_eq!(e, Err(MatError::NotSquare(2, 2)));
    }

    #[test]
    fn float_rref_singular() {
        let a = Mat::from_data((2, 3), [
            1.0, 2.0, 3.0,
            2.0, 4.0, 6.0
        ]);
        let e = reduced_row_echelon(&a);
        assert_eq!(e, Err(MatError::Singular));
    }

    #[test]
    fn exact_echelon() {
        let a = Mat::from_data((2, 3), [
            2, 4, 6,
            1, 1, 1
        ]);
        let red = row_echelon_exact(&a);

        assert!(!red.is_singular());
        assert_eq!(red.result(), &Mat::from_data((2, 3), [
            1, 1, 1,
            0, 1, 2
        ]));
    }

    #[test]
    fn exact_echelon_idempotent() {
        let a = Mat::from_data((2, 3), [2, 4, 6, 1, 1, 1]);
        let e1 = row_echelon_exact(&a).into_result();
        let e2 = row_echelon_exact(&e1).into_result();
        assert_eq!(e1, e2);
    }

    #[test]
    fn exact_echelon_singular() {
        let a = Mat::from_data((2, 2), [
            1, 2,
            2, 4
        ]);
        let red = row_echelon_exact(&a);

        assert!(red.is_singular());
        assert_eq!(red.result(), &Mat::from_data((2, 2), [
            1, 2,
            0, 0
        ]));
    }

    #[test]
    fn exact_rref() {
        let a = Mat::from_data((2, 3), [
            2, 4, 6,
            1, 1, 1
        ]);
        let red = reduced_row_echelon_exact(&a);

        assert!(!red.is_singular());
        assert_eq!(red.result(), &Mat::from_data((2, 3), [
            1, 0, -1,
            0, 1,  2
        ]));
    }

    #[test]
    fn exact_rref_idempotent() {
        let a = Mat::from_data((2, 3), [2, 4, 6, 1, 1, 1]);
        let r1 = reduced_row_echelon_exact(&a).into_result();
        let r2 = reduced_row_echelon_exact(&r1).into_result();
        assert_eq!(r1, r2);
    }

    #[test]
    fn exact_rref_solve() {
        let a = Mat::from_data((3, 4), [
             2,  1, -1,   8,
            -3, -1,  2, -11,
            -2,  1,  2,  -3
        ]);
        let red = reduced_row_echelon_exact(&a);

        assert!(!red.is_singular());
        assert_eq!(red.result(), &Mat::from_data((3, 4), [
            1, 0, 0,  2,
            0, 1, 0,  3,
            0, 0, 1, -1
        ]));
    }

    #[test]
    fn exact_rref_singular() {
        let a = Mat::from_data((2, 2), [1, 2, 2, 4]);
        let red = reduced_row_echelon_exact(&a);

        assert!(red.is_singular());
        assert_eq!(red.result(), &Mat::from_data((2, 2), [1, 2, 0, 0]));
    }

    #[test]
    fn hnf() {
        let a = Mat::from_data((2, 2), [
            2, 4,
            1, 3
        ]);
        let red = hermite_normal_form(&a);

        assert!(!red.is_singular());
        assert_eq!(red.result(), &Mat::from_data((2, 2), [
            1, 2,
            0, 1
        ]));
    }

    #[test]
    fn hnf_idempotent() {
        let a = Mat::from_data((2, 2), [2, 4, 1, 3]);
        let h1 = hermite_normal_form(&a).into_result();
        let h2 = hermite_normal_form(&h1).into_result();
        assert_eq!(h1, h2);
    }

    #[test]
    fn hnf_zero_col() {
        let a = Mat::from_data((2, 2), [
            0, 1,
            0, 2
        ]);
        let red = hermite_normal_form(&a);

        assert!(red.is_singular());
        assert_eq!(red.result(), &Mat::from_data((2, 2), [
            0, 1,
            0, 0
        ]));
    }

    #[test]
    fn hnf_zero() {
        let a: Mat<i64> = Mat::zero((3, 3));
        let red = hermite_normal_form(&a);

        assert!(red.is_singular());
        assert!(red.result().is_zero());
    }

    #[test]
    fn hnf_bigint() {
        let a: Mat<BigInt> = Mat::from_data((2, 2), [2, 4, 1, 3].map(BigInt::from));
        let red = hermite_normal_form(&a);

        assert!(!red.is_singular());
        assert_eq!(red.result(), &Mat::from_data((2, 2), [1, 2, 0, 1].map(BigInt::from)));
    }

    #[test]
    fn exact_echelon_bigint() {
        let a: Mat<BigInt> = Mat::from_data((2, 3), [2, 4, 6, 1, 1, 1].map(BigInt::from));
        let red = row_echelon_exact(&a);

        assert!(!red.is_singular());
        assert_eq!(red.result(), &Mat::from_data((2, 3), [1, 1, 1, 0, 1, 2].map(BigInt::from)));
    }
}
