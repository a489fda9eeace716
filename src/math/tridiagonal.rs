// ─────────────────────────────────────────────
// Thomas algorithm
// ─────────────────────────────────────────────
//
// Direct O(n) solver for a tridiagonal system
//
//   lower[i-1]*x[i-1] + diag[i]*x[i] + upper[i]*x[i+1] = rhs[i]
//
// with lower and upper of length n-1. No pivoting: the spline moment
// systems fed to this solver are diagonally dominant, so elimination in
// natural order is stable. A near-zero pivot is still guarded and
// reported as `None` rather than propagating NaN into the coefficients.

const PIVOT_TOLERANCE: f64 = 1e-14;

pub fn solve(lower: &[f64], diag: &[f64], upper: &[f64], rhs: &[f64]) -> Option<Vec<f64>> {
    let n = diag.len();
    if n == 0 || lower.len() != n - 1 || upper.len() != n - 1 || rhs.len() != n {
        return None;
    }

    let mut scratch = vec![0.0; n];
    let mut x = vec![0.0; n];

    if diag[0].abs() < PIVOT_TOLERANCE {
        return None;
    }
    scratch[0] = if n > 1 { upper[0] / diag[0] } else { 0.0 };
    x[0] = rhs[0] / diag[0];

    // forward sweep
    for i in 1..n {
        let pivot = diag[i] - lower[i - 1] * scratch[i - 1];
        if pivot.abs() < PIVOT_TOLERANCE {
            return None;
        }
        if i < n - 1 {
            scratch[i] = upper[i] / pivot;
        }
        x[i] = (rhs[i] - lower[i - 1] * x[i - 1]) / pivot;
    }

    // back substitution
    for i in (0..n - 1).rev() {
        x[i] = x[i] - scratch[i] * x[i + 1];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::solve;

    #[test]
    fn solves_known_three_by_three_system() {
        // | 2 1 0 | x = | 4 |
        // | 1 3 1 |     | 9 |
        // | 0 1 2 |     | 8 |  -> x = (1, 2, 3)
        let x = solve(&[1.0, 1.0], &[2.0, 3.0, 2.0], &[1.0, 1.0], &[4.0, 9.0, 8.0]).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(x[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn solves_single_equation() {
        let x = solve(&[], &[4.0], &[], &[8.0]).unwrap();
        assert_relative_eq!(x[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_zero_pivot() {
        assert!(solve(&[1.0], &[0.0, 1.0], &[1.0], &[1.0, 1.0]).is_none());
    }

    #[test]
    fn rejects_mismatched_band_lengths() {
        assert!(solve(&[1.0], &[1.0, 1.0, 1.0], &[1.0, 1.0], &[1.0, 1.0, 1.0]).is_none());
    }
}
