//! Linear system solvers used by the spline builders.
//!
//! Dense systems go through `nalgebra`'s LU decomposition; the classic
//! natural cubic spline keeps its O(n) Thomas solve.

use crate::error::{MathError, MathResult};
use nalgebra::{DMatrix, DVector};

/// Pivots smaller than this are treated as zero.
const PIVOT_TOLERANCE: f64 = 1e-15;

/// Solves a tridiagonal system of equations.
///
/// The system has the form:
/// ```text
/// | b[0]  c[0]   0    ...    0     | | x[0]   |   | d[0]   |
/// | a[0]  b[1]  c[1]  ...    0     | | x[1]   |   | d[1]   |
/// |  0    a[1]  b[2]  ...    0     | | x[2]   | = | d[2]   |
/// | ...   ...   ...   ...   ...    | | ...    |   | ...    |
/// |  0     0     0   a[n-2] b[n-1] | | x[n-1] |   | d[n-1] |
/// ```
///
/// # Arguments
///
/// * `a` - Lower diagonal (length n-1)
/// * `b` - Main diagonal (length n)
/// * `c` - Upper diagonal (length n-1)
/// * `d` - Right-hand side (length n)
pub fn solve_tridiagonal(a: &[f64], b: &[f64], c: &[f64], d: &[f64]) -> MathResult<Vec<f64>> {
    let n = b.len();
    if n == 0 {
        return Ok(vec![]);
    }
    if a.len() + 1 != n || c.len() + 1 != n || d.len() != n {
        return Err(MathError::invalid_input(
            "Tridiagonal system has inconsistent dimensions",
        ));
    }
    if b[0].abs() < PIVOT_TOLERANCE {
        return Err(MathError::SingularMatrix);
    }

    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];
    if n > 1 {
        c_prime[0] = c[0] / b[0];
    }
    d_prime[0] = d[0] / b[0];

    for i in 1..n {
        let denom = b[i] - a[i - 1] * c_prime[i - 1];
        if denom.abs() < PIVOT_TOLERANCE {
            return Err(MathError::SingularMatrix);
        }
        if i < n - 1 {
            c_prime[i] = c[i] / denom;
        }
        d_prime[i] = (d[i] - a[i - 1] * d_prime[i - 1]) / denom;
    }

    let mut x = vec![0.0; n];
    x[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }

    Ok(x)
}

/// Solves a dense linear system `A x = b` using LU decomposition.
///
/// # Errors
///
/// Returns [`MathError::DimensionMismatch`] for non-conforming inputs and
/// [`MathError::SingularMatrix`] when the LU factorisation has a zero pivot.
pub fn solve_linear_system(a: &DMatrix<f64>, b: &DVector<f64>) -> MathResult<DVector<f64>> {
    check_square(a, b.len(), 1)?;
    a.clone().lu().solve(b).ok_or(MathError::SingularMatrix)
}

/// Solves `A X = B` for a matrix right-hand side, sharing one LU factorisation.
///
/// Used to push the Jacobian of a right-hand side through a spline system.
pub fn solve_linear_system_multi(a: &DMatrix<f64>, b: &DMatrix<f64>) -> MathResult<DMatrix<f64>> {
    check_square(a, b.nrows(), b.ncols())?;
    a.clone().lu().solve(b).ok_or(MathError::SingularMatrix)
}

fn check_square(a: &DMatrix<f64>, rhs_rows: usize, rhs_cols: usize) -> MathResult<()> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(MathError::invalid_input("Matrix must be square"));
    }
    if n != rhs_rows {
        return Err(MathError::DimensionMismatch {
            rows1: n,
            cols1: n,
            rows2: rhs_rows,
            cols2: rhs_cols,
        });
    }
    Ok(())
}
