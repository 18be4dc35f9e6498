use std::fmt::Display;
use std::ops::{Add, Neg, Sub, Mul, Index, IndexMut, AddAssign, SubAssign, MulAssign};
use nalgebra::{DMatrix, Scalar, ClosedAdd, ClosedSub, ClosedMul};
use delegate::delegate;
use auto_impl_ops::auto_ops;
use itertools::Itertools;
use num_traits::{Zero, One, Float};
use crate::{MatTrait, MatError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mat<R> {
    inner: DMatrix<R>
}

impl<R> MatTrait for Mat<R> {
    fn shape(&self) -> (usize, usize) {
        (self.inner.nrows(), self.inner.ncols())
    }
}

impl<R> Mat<R> {
    pub fn inner(&self) -> &DMatrix<R> {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut DMatrix<R> {
        &mut self.inner
    }

    pub fn into_inner(self) -> DMatrix<R> {
        self.inner
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &R)> {
        let m = self.nrows();
        self.inner.iter().enumerate().map(move |(i, a)|
            (i % m, i / m, a)
        )
    }
}

impl<R> Mat<R>
where R: Scalar {
    pub fn from_data<I>(shape: (usize, usize), data: I) -> Self
    where I: IntoIterator<Item = R> {
        DMatrix::from_row_iterator(shape.0, shape.1, data).into()
    }

    pub fn from_fn<F>(shape: (usize, usize), f: F) -> Self
    where F: FnMut(usize, usize) -> R {
        DMatrix::from_fn(shape.0, shape.1, f).into()
    }

    /// Builds a matrix from row data, rejecting empty or ragged input.
    pub fn from_rows(rows: Vec<Vec<R>>) -> Result<Self, MatError> {
        let m = rows.len();
        let n = rows.first().map_or(0, |r| r.len());

        if m == 0 || n == 0 {
            return Err(MatError::InvalidShape("empty row data".into()))
        }
        if let Some(r) = rows.iter().find(|r| r.len() != n) {
            return Err(MatError::InvalidShape(
                format!("ragged rows: expected {n} entries, found {}", r.len())
            ))
        }

        Ok(Self::from_data((m, n), rows.into_iter().flatten()))
    }

    pub fn zero(shape: (usize, usize)) -> Self
    where R: Zero {
        let inner = DMatrix::zeros(shape.0, shape.1);
        Self::from(inner)
    }

    pub fn is_zero(&self) -> bool
    where R: Zero {
        self.iter().all(|e| e.2.is_zero())
    }

    pub fn id(size: usize) -> Self
    where R: Zero + One {
        let inner = DMatrix::identity(size, size);
        Self::from(inner)
    }

    pub fn is_id(&self) -> bool
    where R: Zero + One {
        self.is_square() && self.iter().all(|(i, j, a)|
            i == j && a.is_one() ||
            i != j && a.is_zero()
        )
    }

    pub fn diag<I>(shape: (usize, usize), entries: I) -> Self
    where R: Zero, I: IntoIterator<Item = R> {
        let mut mat = Self::zero(shape);
        for (i, a) in entries.into_iter().enumerate() {
            mat[(i, i)] = a;
        }
        mat
    }

    pub fn row_vec(&self, i: usize) -> Vec<R> {
        (0..self.ncols()).map(|j| self[(i, j)].clone()).collect()
    }

    pub fn transpose(&self) -> Mat<R> {
        Self::from(self.inner.transpose())
    }

    pub fn map<S, F>(&self, f: F) -> Mat<S>
    where S: Scalar, F: FnMut(R) -> S {
        Mat::from(self.inner.map(f))
    }

    pub fn mul_scalar(&self, r: &R) -> Mat<R>
    where R: ClosedMul {
        self.map(|a| a * r.clone())
    }

    pub fn checked_add(&self, rhs: &Self) -> Result<Self, MatError>
    where R: ClosedAdd {
        let (m, n) = self.shape();
        let (p, q) = rhs.shape();
        if (m, n) != (p, q) {
            return Err(MatError::DimensionMismatch(m, n, p, q))
        }
        Ok(Self::from(&self.inner + &rhs.inner))
    }

    pub fn checked_mul(&self, rhs: &Self) -> Result<Self, MatError>
    where R: Zero + One + ClosedAdd + ClosedMul {
        let (m, n) = self.shape();
        let (p, q) = rhs.shape();
        if n != p {
            return Err(MatError::DimensionMismatch(m, n, p, q))
        }
        Ok(Self::from(&self.inner * &rhs.inner))
    }

    /// Dot product of two equal-length row or column vectors.
    pub fn dot(&self, other: &Self) -> Result<R, MatError>
    where R: Zero + ClosedAdd + ClosedMul {
        let (m, n) = self.shape();
        let (p, q) = other.shape();

        if m == 1 && p == 1 && n == q {
            let mut acc = R::zero();
            for i in 0..n {
                acc += self[(0, i)].clone() * other[(0, i)].clone();
            }
            Ok(acc)
        } else if n == 1 && q == 1 && m == p {
            Ok(self.transpose().dot(&other.transpose())?)
        } else if (n == 1 && p == 1) || (m == 1 && q == 1) {
            self.transpose().dot(other)
        } else {
            Err(MatError::DimensionMismatch(m, n, p, q))
        }
    }

    /// Deletes row `i` and column `j`, as used by cofactor expansion.
    pub fn submat_removing(&self, i: usize, j: usize) -> Result<Mat<R>, MatError> {
        let (m, n) = self.shape();
        if i >= m {
            return Err(MatError::IndexOutOfRange(i, m))
        }
        if j >= n {
            return Err(MatError::IndexOutOfRange(j, n))
        }
        Ok(self.removing(i, j))
    }

    pub(crate) fn removing(&self, i: usize, j: usize) -> Mat<R> {
        Self::from(self.inner.clone().remove_row(i).remove_column(j))
    }
}

impl<R> From<DMatrix<R>> for Mat<R> {
    fn from(inner: DMatrix<R>) -> Self {
        Self { inner }
    }
}

impl<R> Index<(usize, usize)> for Mat<R> {
    type Output = R;
    delegate! {
        to self.inner {
            fn index(&self, index: (usize, usize)) -> &R;
        }
    }
}

impl<R> IndexMut<(usize, usize)> for Mat<R> {
    delegate! {
        to self.inner {
            fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output;
        }
    }
}

impl<R> Default for Mat<R>
where R: Scalar + Zero {
    fn default() -> Self {
        Self::zero((0, 0))
    }
}

impl<R> Display for Mat<R>
where R: Scalar + Display {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (m, n) = self.shape();
        let strs: Vec<Vec<String>> = (0..m).map(|i|
            (0..n).map(|j| self[(i, j)].to_string()).collect()
        ).collect();

        let w = strs.iter().flatten().map(|s| s.len()).max().unwrap_or(0);
        let out = strs.iter().map(|row|
            row.iter().map(|s| format!("{s:>w$}")).join("  ")
        ).join("\n");

        write!(f, "{out}")
    }
}

impl<R> Neg for Mat<R>
where R: Scalar + Neg<Output = R> {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Mat::from(-self.inner)
    }
}

impl<R> Neg for &Mat<R>
where R: Scalar + Neg<Output = R> {
    type Output = Mat<R>;
    fn neg(self) -> Self::Output {
        Mat::from(-&self.inner)
    }
}

#[auto_ops]
impl<R> AddAssign<&Mat<R>> for Mat<R>
where R: Scalar + ClosedAdd {
    fn add_assign(&mut self, rhs: &Self) {
        self.inner += &rhs.inner;
    }
}

#[auto_ops]
impl<R> SubAssign<&Mat<R>> for Mat<R>
where R: Scalar + ClosedSub {
    fn sub_assign(&mut self, rhs: &Self) {
        self.inner -= &rhs.inner
    }
}

#[auto_ops]
impl<'a, 'b, R> Mul<&'b Mat<R>> for &'a Mat<R>
where R: Scalar + Zero + One + ClosedAdd + ClosedMul {
    type Output = Mat<R>;
    fn mul(self, rhs: &'b Mat<R>) -> Self::Output {
        let prod = &self.inner * &rhs.inner;
        Mat::from(prod)
    }
}

impl<R> Mat<R>
where R: Scalar {
    pub fn swap_rows(&mut self, i: usize, j: usize) {
        self.inner.swap_rows(i, j);
    }

    pub fn mul_row(&mut self, i: usize, r: &R)
    where R: ClosedMul {
        self.inner.row_mut(i).mul_assign(r.clone())
    }

    pub fn add_row_to(&mut self, i: usize, j: usize, r: &R)
    where R: ClosedAdd + ClosedMul {
        let row = self.inner.row(i).mul(r.clone());
        self.inner.row_mut(j).add_assign(row)
    }

    /// Checked form of [`Self::mul_row`].
    pub fn scale_row(&mut self, i: usize, r: &R) -> Result<(), MatError>
    where R: ClosedMul {
        let m = self.nrows();
        if i >= m {
            return Err(MatError::IndexOutOfRange(i, m))
        }
        self.mul_row(i, r);
        Ok(())
    }

    /// `row_i += r * row_k`, checked.
    pub fn add_row_multiple(&mut self, i: usize, k: usize, r: &R) -> Result<(), MatError>
    where R: ClosedAdd + ClosedMul {
        let m = self.nrows();
        if i >= m {
            return Err(MatError::IndexOutOfRange(i, m))
        }
        if k >= m {
            return Err(MatError::IndexOutOfRange(k, m))
        }
        self.add_row_to(k, i, r);
        Ok(())
    }
}

impl<R> Mat<R>
where R: Scalar + Float {
    /// Snaps entries lying within `threshold` of an integer.
    pub fn round_nearby(&mut self, threshold: R) {
        self.inner.apply(|a| {
            let r = a.round();
            if (r - *a).abs() < threshold {
                *a = r;
            }
        })
    }
}

#[cfg(test)]
impl Mat<i64> {
    pub fn rand(shape: (usize, usize), range: std::ops::Range<i64>) -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        Self::from_fn(shape, |_, _| rng.gen_range(range.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init() {
        let a = Mat::from_data((2, 3), [1,2,3,4,5,6]);

        assert_eq!(a.nrows(), 2);
        assert_eq!(a.ncols(), 3);
        assert_eq!(a.into_inner(), DMatrix::from_row_slice(2, 3, &[1,2,3,4,5,6]));
    }

    #[test]
    fn from_rows() {
        let a = Mat::from_rows(vec![vec![1,2,3], vec![4,5,6]]).unwrap();
        assert_eq!(a, Mat::from_data((2, 3), [1,2,3,4,5,6]));
    }

    #[test]
    fn from_rows_empty() {
        let e = Mat::<i64>::from_rows(vec![]);
        assert!(matches!(e, Err(MatError::InvalidShape(_))));

        let e = Mat::<i64>::from_rows(vec![vec![], vec![]]);
        assert!(matches!(e, Err(MatError::InvalidShape(_))));
    }

    #[test]
    fn from_rows_ragged() {
        let e = Mat::from_rows(vec![vec![1,2,3], vec![4,5]]);
        assert!(matches!(e, Err(MatError::InvalidShape(_))));
    }

    #[test]
    fn eq() {
        let a = Mat::from_data((2, 3), [1,2,3,4,5,6]);
        let b = Mat::from_data((2, 3), [1,2,0,4,5,6]);
        let c = Mat::from_data((3, 2), [1,2,3,4,5,6]);

        assert_eq!(a, a);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn square() {
        let a: Mat<i64> = Mat::zero((3, 3));
        assert!(a.is_square());

        let a: Mat<i64> = Mat::zero((3, 2));
        assert!(!a.is_square());
    }

    #[test]
    fn zero() {
        let a: Mat<i64> = Mat::zero((3, 2));
        assert!(a.is_zero());

        let a = Mat::from_data((2, 3), [1,2,3,4,5,6]);
        assert!(!a.is_zero());
    }

    #[test]
    fn id() {
        let a: Mat<i64> = Mat::id(3);
        assert!(a.is_id());

        let a = Mat::from_data((2, 2), [1,2,3,4]);
        assert!(!a.is_id());

        // non-square is not the identity, but no error either
        let a = Mat::from_data((2, 3), [1,0,0,0,1,0]);
        assert!(!a.is_id());
    }

    #[test]
    fn swap_rows() {
        let mut a = Mat::from_data((3, 4), 1..=12);
        a.swap_rows(0, 1);
        assert_eq!(a, Mat::from_data((3, 4), [5,6,7,8,1,2,3,4,9,10,11,12]));
    }

    #[test]
    fn mul_row() {
        let mut a = Mat::from_data((3, 3), 1..=9);
        a.mul_row(1, &10);
        assert_eq!(a, Mat::from_data((3, 3), [1,2,3,40,50,60,7,8,9]));
    }

    #[test]
    fn add_row_to() {
        let mut a = Mat::from_data((3, 3), 1..=9);
        a.add_row_to(0, 1, &10);
        assert_eq!(a, Mat::from_data((3, 3), [1,2,3,14,25,36,7,8,9]));
    }

    #[test]
    fn scale_row() {
        let mut a = Mat::from_data((2, 2), [1,2,3,4]);
        assert!(a.scale_row(0, &3).is_ok());
        assert_eq!(a, Mat::from_data((2, 2), [3,6,3,4]));

        assert_eq!(a.scale_row(5, &3), Err(MatError::IndexOutOfRange(5, 2)));
    }

    #[test]
    fn add_row_multiple() {
        let mut a = Mat::from_data((2, 2), [1,2,3,4]);
        assert!(a.add_row_multiple(1, 0, &2).is_ok());
        assert_eq!(a, Mat::from_data((2, 2), [1,2,5,8]));

        assert_eq!(a.add_row_multiple(1, 9, &2), Err(MatError::IndexOutOfRange(9, 2)));
    }

    #[test]
    fn add() {
        let a = Mat::from_data((3, 2), [1,2,3,4,5,6]);
        let b = Mat::from_data((3, 2), [8,2,4,0,2,1]);
        let c = a + b;
        assert_eq!(c, Mat::from_data((3, 2), [9,4,7,4,7,7]));
    }

    #[test]
    fn checked_add() {
        let a = Mat::from_data((3, 2), [1,2,3,4,5,6]);
        let b = Mat::from_data((3, 2), [8,2,4,0,2,1]);
        assert_eq!(a.checked_add(&b).unwrap(), Mat::from_data((3, 2), [9,4,7,4,7,7]));

        let c = Mat::from_data((2, 2), [1,2,3,4]);
        assert_eq!(a.checked_add(&c), Err(MatError::DimensionMismatch(3, 2, 2, 2)));
    }

    #[test]
    fn add_assoc() {
        let a = Mat::from_data((2, 2), [1,2,3,4]);
        let b = Mat::from_data((2, 2), [5,-6,7,8]);
        let c = Mat::from_data((2, 2), [0,2,-9,1]);
        assert_eq!((&a + &b) + &c, &a + (&b + &c));
    }

    #[test]
    fn sub() {
        let a = Mat::from_data((3, 2), [1,2,3,4,5,6]);
        let b = Mat::from_data((3, 2), [8,2,4,0,2,1]);
        let c = a - b;
        assert_eq!(c, Mat::from_data((3, 2), [-7,0,-1,4,3,5]));
    }

    #[test]
    fn neg() {
        let a = Mat::from_data((3, 2), [1,2,3,4,5,6]);
        assert_eq!(-a, Mat::from_data((3, 2), [-1,-2,-3,-4,-5,-6]));
    }

    #[test]
    fn mul() {
        let a = Mat::from_data((2, 3), [1,2,3,4,5,6]);
        let b = Mat::from_data((3, 2), [1,2,1,-1,0,2]);
        let c = a * b;
        assert_eq!(c, Mat::from_data((2, 2), [3,6,9,15]));
    }

    #[test]
    fn checked_mul() {
        let a = Mat::from_data((2, 3), [1,2,3,4,5,6]);
        let b = Mat::from_data((3, 2), [1,2,1,-1,0,2]);
        assert_eq!(a.checked_mul(&b).unwrap(), Mat::from_data((2, 2), [3,6,9,15]));

        let c = Mat::from_data((2, 2), [1,2,3,4]);
        assert_eq!(a.checked_mul(&c), Err(MatError::DimensionMismatch(2, 3, 2, 2)));
    }

    #[test]
    fn mul_scalar() {
        let a = Mat::from_data((2, 2), [1,2,3,4]);
        assert_eq!(a.mul_scalar(&3), Mat::from_data((2, 2), [3,6,9,12]));
    }

    #[test]
    fn dot() {
        let a = Mat::from_data((1, 3), [1,2,3]);
        let b = Mat::from_data((1, 3), [4,5,6]);
        assert_eq!(a.dot(&b), Ok(32));

        let c = Mat::from_data((3, 1), [4,5,6]);
        assert_eq!(a.dot(&c), Ok(32));
        assert_eq!(c.dot(&a), Ok(32));

        let d = Mat::from_data((2, 2), [1,2,3,4]);
        assert!(matches!(a.dot(&d), Err(MatError::DimensionMismatch(..))));
    }

    #[test]
    fn transpose() {
        let a = Mat::from_data((2, 3), [1,2,3,4,5,6]);
        assert_eq!(a.transpose(), Mat::from_data((3, 2), [1,4,2,5,3,6]));
        assert_eq!(a.transpose().transpose(), a);
    }

    #[test]
    fn submat_removing() {
        let a = Mat::from_data((3, 3), [
            1, 2, 3,
            4, 5, 6,
            7, 8, 9
        ]);
        let b = a.submat_removing(1, 0).unwrap();
        assert_eq!(b, Mat::from_data((2, 2), [
            2, 3,
            8, 9
        ]));

        assert_eq!(a.submat_removing(3, 0), Err(MatError::IndexOutOfRange(3, 3)));
        assert_eq!(a.submat_removing(0, 5), Err(MatError::IndexOutOfRange(5, 3)));
    }

    #[test]
    fn map() {
        let a = Mat::from_data((2, 2), [1, 2, 3, 4]);
        let b: Mat<i64> = a.map(|x: i32| i64::from(x) * 10);
        assert_eq!(b, Mat::from_data((2, 2), [10, 20, 30, 40]));
    }

    #[test]
    fn display() {
        let a = Mat::from_data((2, 3), [1, -20, 3, 400, 5, 6]);
        let s = format!("{a}");
        assert_eq!(s, "  1  -20    3\n400    5    6");
    }

    #[test]
    fn round_nearby() {
        let mut a = Mat::from_data((1, 3), [0.9999999999, 2.5, -3.0000000001]);
        a.round_nearby(1e-6);
        assert_eq!(a, Mat::from_data((1, 3), [1.0, 2.5, -3.0]));
    }
}
