use crate::math::tridiagonal;
use crate::transform::calibration::{CalibrationSet, MINIMUM_CALIBRATION_POINTS};
use crate::transform::coordinatetransform::{
    CoordinateTransform, INVALID_VALUE, STATUS_BAD_REQUEST, STATUS_INVALID_TRANSFORM, STATUS_OK,
};
use crate::transform::supplementarydata::SupplementaryData;
use crate::transform::transformerror::TransformError;

// ─────────────────────────────────────────────
// Natural cubic spline coefficients
// ─────────────────────────────────────────────
//
// One cubic per interval between adjacent knots, in Horner-ready form
//
//   S_j(x) = a[j] + b[j]*dx + c[j]*dx^2 + d[j]*dx^3,  dx = x - knots[j]
//
// The knot moments m[0..=n] (second derivatives) come from the C²
// continuity equations
//
//   h[i-1]*m[i-1] + 2*(h[i-1]+h[i])*m[i] + h[i]*m[i+1]
//     = 6*( (y[i+1]-y[i])/h[i] - (y[i]-y[i-1])/h[i-1] )
//
// with the natural condition m[0] = m[n] = 0. Strictly increasing knots
// make the system diagonally dominant, so the O(n) Thomas solve needs no
// pivoting; a singular solve is still surfaced as a build failure.

struct SplineCoefficients {
    knots: Vec<f64>,
    a: Vec<f64>,
    b: Vec<f64>,
    c: Vec<f64>,
    d: Vec<f64>,

    // tangent lines used beyond the calibrated range
    m_left: f64,
    b_left: f64,
    m_right: f64,
    b_right: f64,

    max_second_derivative: f64,
    max_delta_third_derivative: f64,
}

impl SplineCoefficients {
    fn build(abscissas: &[f64], ordinates: &[f64]) -> Result<SplineCoefficients, TransformError> {
        if abscissas.len() != ordinates.len() {
            return Err(TransformError::LengthMismatch {
                abscissas: abscissas.len(),
                ordinates: ordinates.len(),
            });
        }
        let n = abscissas.len();
        if n < MINIMUM_CALIBRATION_POINTS {
            return Err(TransformError::InsufficientPoints {
                required: MINIMUM_CALIBRATION_POINTS,
                actual: n,
            });
        }
        for i in 1..n {
            if !(abscissas[i] > abscissas[i - 1]) {
                return Err(TransformError::NonIncreasingAbscissas { index: i });
            }
        }

        let intervals = n - 1;
        let h: Vec<f64> = (0..intervals)
            .map(|i| abscissas[i + 1] - abscissas[i])
            .collect();

        let mut lower = vec![0.0; n - 1];
        let mut diag = vec![0.0; n];
        let mut upper = vec![0.0; n - 1];
        let mut rhs = vec![0.0; n];
        for i in 1..intervals {
            lower[i - 1] = h[i - 1];
            diag[i] = 2.0 * (h[i - 1] + h[i]);
            upper[i] = h[i];
            rhs[i] = 6.0
                * ((ordinates[i + 1] - ordinates[i]) / h[i]
                    - (ordinates[i] - ordinates[i - 1]) / h[i - 1]);
        }
        diag[0] = 1.0; // m[0] = 0
        diag[n - 1] = 1.0; // m[n] = 0

        let moments = tridiagonal::solve(&lower, &diag, &upper, &rhs)
            .ok_or(TransformError::SingularSystem)?;

        let mut a = Vec::with_capacity(intervals);
        let mut b = Vec::with_capacity(intervals);
        let mut c = Vec::with_capacity(intervals);
        let mut d = Vec::with_capacity(intervals);
        for i in 0..intervals {
            a.push(ordinates[i]);
            b.push(
                (ordinates[i + 1] - ordinates[i]) / h[i]
                    - h[i] * (2.0 * moments[i] + moments[i + 1]) / 6.0,
            );
            c.push(moments[i] / 2.0);
            d.push((moments[i + 1] - moments[i]) / (6.0 * h[i]));
        }

        // boundary tangents, evaluated once
        let m_left = b[0];
        let b_left = ordinates[0] - m_left * abscissas[0];
        let last = intervals - 1;
        let h_last = h[last];
        let m_right = b[last] + h_last * (2.0 * c[last] + 3.0 * d[last] * h_last);
        let b_right = ordinates[n - 1] - m_right * abscissas[n - 1];

        // S''(knot[i]) is exactly the moment m[i]
        let max_second_derivative = moments.iter().fold(0.0_f64, |acc, m| acc.max(m.abs()));
        // third derivative is 6*d[j], constant per interval
        let max_delta_third_derivative = (1..intervals)
            .map(|j| 6.0 * (d[j] - d[j - 1]).abs())
            .fold(0.0_f64, f64::max);

        Ok(SplineCoefficients {
            knots: abscissas.to_vec(),
            a,
            b,
            c,
            d,
            m_left,
            b_left,
            m_right,
            b_right,
            max_second_derivative,
            max_delta_third_derivative,
        })
    }

    fn left(&self) -> f64 {
        self.knots[0]
    }

    fn right(&self) -> f64 {
        self.knots[self.knots.len() - 1]
    }

    fn calculate_cubic(&self, abscissa: f64, interval: usize) -> f64 {
        let dx = abscissa - self.knots[interval];
        self.a[interval] + dx * (self.b[interval] + dx * (self.c[interval] + dx * self.d[interval]))
    }

    /// Cold lookup: binary search over the knot abscissas, clamped to the
    /// boundary intervals.
    fn search_for_interval(&self, abscissa: f64) -> usize {
        if abscissa <= self.left() {
            0
        } else if abscissa >= self.right() {
            self.a.len() - 1
        } else {
            self.knots.partition_point(|&knot| knot <= abscissa) - 1
        }
    }

    /// Warm lookup: scans outward from a hint interval. Sequential and
    /// ordered-batch callers move the hint monotonically, which makes
    /// each step amortized O(1) instead of a fresh O(log n) search.
    fn search_for_interval_from(&self, abscissa: f64, hint: usize) -> usize {
        let last = self.a.len() - 1;
        let mut interval = hint.min(last);
        while interval < last && abscissa >= self.knots[interval + 1] {
            interval += 1;
        }
        while interval > 0 && abscissa < self.knots[interval] {
            interval -= 1;
        }
        interval
    }

    /// Extrapolating evaluation that carries the interval hint forward.
    fn evaluate_hinted(&self, abscissa: f64, hint: usize) -> (f64, usize) {
        if abscissa < self.left() {
            (self.m_left * abscissa + self.b_left, 0)
        } else if abscissa > self.right() {
            (self.m_right * abscissa + self.b_right, self.a.len() - 1)
        } else {
            let interval = self.search_for_interval_from(abscissa, hint);
            (self.calculate_cubic(abscissa, interval), interval)
        }
    }
}

struct SequenceCursor {
    abscissa: f64,
    spacing: f64,
    interval: usize,
}

// ─────────────────────────────────────────────
// CubicSplineTransform
// ─────────────────────────────────────────────

/// Natural cubic spline transform with linear tangent extrapolation
/// beyond the calibrated range.
///
/// Construction never panics: a bad calibration set or a singular solve
/// leaves the instance inert (`is_valid` false, evaluations return the
/// sentinel, batch calls return a negative status). `try_new` is the
/// fallible entry for callers who prefer an error over the flag.
pub struct CubicSplineTransform {
    spline: Option<SplineCoefficients>,
    cursor: Option<SequenceCursor>,
}

impl CubicSplineTransform {
    pub fn new(calibration: &CalibrationSet) -> CubicSplineTransform {
        Self::from_arrays(calibration.abscissas(), calibration.ordinates())
    }

    pub fn try_new(calibration: &CalibrationSet) -> Result<CubicSplineTransform, TransformError> {
        let spline = SplineCoefficients::build(calibration.abscissas(), calibration.ordinates())?;
        Ok(CubicSplineTransform { spline: Some(spline), cursor: None })
    }

    pub fn from_arrays(abscissas: &[f64], ordinates: &[f64]) -> CubicSplineTransform {
        CubicSplineTransform {
            spline: SplineCoefficients::build(abscissas, ordinates).ok(),
            cursor: None,
        }
    }

    /// Builds from the calibration set refined by a denser reference
    /// dataset; near-duplicate extra points are rejected per the
    /// supplementary proximity rule.
    pub fn with_supplementary_data(
        calibration: &CalibrationSet,
        extra_data: &SupplementaryData,
    ) -> CubicSplineTransform {
        let (abscissas, ordinates) =
            extra_data.merge_into(calibration.abscissas(), calibration.ordinates());
        Self::from_arrays(&abscissas, &ordinates)
    }

    /// Number of knots the spline was built over, including any merged
    /// supplementary points. Zero when invalid.
    pub fn knot_count(&self) -> usize {
        self.spline.as_ref().map_or(0, |spline| spline.knots.len())
    }
}

impl CoordinateTransform for CubicSplineTransform {
    fn evaluate(&self, abscissa: f64) -> f64 {
        let Some(spline) = &self.spline else {
            return INVALID_VALUE;
        };
        let interval = spline.search_for_interval(abscissa);
        spline.calculate_cubic(abscissa, interval)
    }

    fn evaluate_with_extrapolation(&self, abscissa: f64) -> f64 {
        let Some(spline) = &self.spline else {
            return INVALID_VALUE;
        };
        spline.evaluate_hinted(abscissa, 0).0
    }

    fn evaluate_sequence_start(&mut self, start_abscissa: f64, spacing: f64) -> f64 {
        self.cursor = None;
        let Some(spline) = &self.spline else {
            return INVALID_VALUE;
        };
        let hint = spline.search_for_interval(start_abscissa);
        let (value, interval) = spline.evaluate_hinted(start_abscissa, hint);
        self.cursor = Some(SequenceCursor { abscissa: start_abscissa, spacing, interval });
        value
    }

    fn evaluate_sequence_next(&mut self) -> f64 {
        let Some(spline) = &self.spline else {
            return INVALID_VALUE;
        };
        let Some(cursor) = &mut self.cursor else {
            return INVALID_VALUE;
        };
        let abscissa = cursor.abscissa + cursor.spacing;
        let (value, interval) = spline.evaluate_hinted(abscissa, cursor.interval);
        cursor.abscissa = abscissa;
        cursor.interval = interval;
        value
    }

    fn evaluate_sequence_skip(&mut self, abscissa_start: f64, count: usize) -> f64 {
        let Some(spline) = &self.spline else {
            return INVALID_VALUE;
        };
        let Some(cursor) = &mut self.cursor else {
            return INVALID_VALUE;
        };
        let abscissa = abscissa_start + count as f64 * cursor.spacing;
        let (value, interval) = spline.evaluate_hinted(abscissa, cursor.interval);
        cursor.abscissa = abscissa;
        cursor.interval = interval;
        value
    }

    fn evaluate_full_sequence(&self, result: &mut [f64], start_abscissa: f64, spacing: f64) -> i32 {
        let Some(spline) = &self.spline else {
            return STATUS_INVALID_TRANSFORM;
        };
        if result.is_empty() {
            return STATUS_BAD_REQUEST;
        }
        let mut hint = spline.search_for_interval(start_abscissa);
        for (i, slot) in result.iter_mut().enumerate() {
            let abscissa = start_abscissa + i as f64 * spacing;
            let (value, next_hint) = spline.evaluate_hinted(abscissa, hint);
            hint = next_hint;
            *slot = value;
        }
        STATUS_OK
    }

    fn evaluate_ordered_sequence(&self, abscissas: &[f64], result: &mut [f64]) -> i32 {
        let Some(spline) = &self.spline else {
            return STATUS_INVALID_TRANSFORM;
        };
        if abscissas.is_empty() || abscissas.len() != result.len() {
            return STATUS_BAD_REQUEST;
        }
        debug_assert!(
            abscissas.windows(2).all(|pair| pair[0] <= pair[1]),
            "evaluate_ordered_sequence requires ascending abscissas"
        );
        let mut hint = spline.search_for_interval(abscissas[0]);
        for (abscissa, slot) in abscissas.iter().zip(result.iter_mut()) {
            let (value, next_hint) = spline.evaluate_hinted(*abscissa, hint);
            hint = next_hint;
            *slot = value;
        }
        STATUS_OK
    }

    fn max_second_derivative(&self) -> f64 {
        self.spline
            .as_ref()
            .map_or(INVALID_VALUE, |spline| spline.max_second_derivative)
    }

    fn max_delta_third_derivative(&self) -> f64 {
        self.spline
            .as_ref()
            .map_or(INVALID_VALUE, |spline| spline.max_delta_third_derivative)
    }

    fn left_abscissa(&self) -> f64 {
        self.spline.as_ref().map_or(INVALID_VALUE, |spline| spline.left())
    }

    fn right_abscissa(&self) -> f64 {
        self.spline.as_ref().map_or(INVALID_VALUE, |spline| spline.right())
    }

    fn is_valid(&self) -> bool {
        self.spline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;

    fn wave() -> CubicSplineTransform {
        CubicSplineTransform::from_arrays(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 0.0, 1.0])
    }

    #[test]
    fn passes_through_every_knot() {
        let transform = wave();
        assert!(transform.is_valid());
        assert_abs_diff_eq!(transform.evaluate(0.0), 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(transform.evaluate(1.0), 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(transform.evaluate(2.0), 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(transform.evaluate(3.0), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn midpoint_stays_between_neighboring_extrema() {
        let transform = wave();
        let mid = transform.evaluate(1.5);
        assert!(mid > 0.0 && mid < 1.0, "evaluate(1.5) = {mid}");
    }

    #[test]
    fn reproduces_a_straight_line() {
        let transform =
            CubicSplineTransform::from_arrays(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 5.0, 7.0]);
        assert_relative_eq!(transform.evaluate(0.5), 2.0, epsilon = 1e-10);
        assert_relative_eq!(transform.evaluate(2.25), 5.5, epsilon = 1e-10);
        assert_abs_diff_eq!(transform.max_second_derivative(), 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(transform.max_delta_third_derivative(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn two_points_degenerate_to_linear() {
        let transform = CubicSplineTransform::from_arrays(&[0.0, 2.0], &[0.0, 4.0]);
        assert!(transform.is_valid());
        assert_relative_eq!(transform.evaluate(1.0), 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(transform.max_delta_third_derivative(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn first_derivative_is_continuous_at_interior_knots() {
        let transform = wave();
        let step = 1e-6;
        for knot in [1.0, 2.0] {
            let slope_below = (transform.evaluate(knot) - transform.evaluate(knot - step)) / step;
            let slope_above = (transform.evaluate(knot + step) - transform.evaluate(knot)) / step;
            assert_abs_diff_eq!(slope_below, slope_above, epsilon = 1e-4);
        }
    }

    #[test]
    fn extrapolation_is_continuous_at_the_boundaries() {
        let transform = wave();
        assert_abs_diff_eq!(
            transform.evaluate_with_extrapolation(0.0),
            transform.evaluate(0.0),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            transform.evaluate_with_extrapolation(3.0),
            transform.evaluate(3.0),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            transform.evaluate_with_extrapolation(-1e-9),
            transform.evaluate(0.0),
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(
            transform.evaluate_with_extrapolation(3.0 + 1e-9),
            transform.evaluate(3.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn extrapolation_is_linear_far_from_the_range() {
        let transform = wave();
        let step_one = transform.evaluate_with_extrapolation(5.0)
            - transform.evaluate_with_extrapolation(4.0);
        let step_two = transform.evaluate_with_extrapolation(6.0)
            - transform.evaluate_with_extrapolation(5.0);
        assert_relative_eq!(step_one, step_two, epsilon = 1e-9);

        let left_one = transform.evaluate_with_extrapolation(-1.0)
            - transform.evaluate_with_extrapolation(-2.0);
        let left_two = transform.evaluate_with_extrapolation(-2.0)
            - transform.evaluate_with_extrapolation(-3.0);
        assert_relative_eq!(left_one, left_two, epsilon = 1e-9);
    }

    #[test]
    fn single_point_construction_is_invalid() {
        let transform = CubicSplineTransform::from_arrays(&[1.0], &[2.0]);
        assert!(!transform.is_valid());
        assert_eq!(transform.evaluate(1.0), INVALID_VALUE);
        assert_eq!(transform.knot_count(), 0);
    }

    #[test]
    fn unordered_abscissas_are_invalid() {
        let transform = CubicSplineTransform::from_arrays(&[0.0, 2.0, 1.0], &[0.0, 1.0, 2.0]);
        assert!(!transform.is_valid());
    }

    #[test]
    fn mismatched_arrays_are_invalid() {
        let transform = CubicSplineTransform::from_arrays(&[0.0, 1.0, 2.0], &[0.0, 1.0]);
        assert!(!transform.is_valid());
    }

    #[test]
    fn invalid_instance_is_inert() {
        let mut transform = CubicSplineTransform::from_arrays(&[], &[]);
        assert!(!transform.is_valid());
        assert_eq!(transform.evaluate_with_extrapolation(1.0), INVALID_VALUE);
        assert_eq!(transform.evaluate_sequence_start(0.0, 1.0), INVALID_VALUE);
        assert_eq!(transform.evaluate_sequence_next(), INVALID_VALUE);
        let mut result = [0.0; 4];
        assert_eq!(
            transform.evaluate_full_sequence(&mut result, 0.0, 1.0),
            STATUS_INVALID_TRANSFORM
        );
    }

    #[test]
    fn try_new_accepts_a_valid_calibration_set() {
        let set = CalibrationSet::from_pairs(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]).unwrap();
        let transform = CubicSplineTransform::try_new(&set).unwrap();
        assert!(transform.is_valid());
        assert_eq!(transform.left_abscissa(), 0.0);
        assert_eq!(transform.right_abscissa(), 2.0);
    }

    #[test]
    fn supplementary_points_become_knots() {
        let set = CalibrationSet::from_pairs(&[(0.0, 0.0), (2.0, 4.0), (4.0, 16.0)]).unwrap();
        let extra = SupplementaryData::new(vec![1.0, 3.0], vec![1.0, 9.0], 10.0);
        let transform = CubicSplineTransform::with_supplementary_data(&set, &extra);
        assert!(transform.is_valid());
        assert_eq!(transform.knot_count(), 5);
        assert_abs_diff_eq!(transform.evaluate(1.0), 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(transform.evaluate(3.0), 9.0, epsilon = 1e-10);
    }

    #[test]
    fn near_duplicate_supplementary_points_are_ignored() {
        let set = CalibrationSet::from_pairs(&[(0.0, 0.0), (2.0, 4.0), (4.0, 16.0)]).unwrap();
        let extra = SupplementaryData::new(vec![2.01], vec![4.1], 10.0);
        let transform = CubicSplineTransform::with_supplementary_data(&set, &extra);
        assert_eq!(transform.knot_count(), 3);
    }

    #[test]
    fn smoothness_bounds_are_positive_for_curved_data() {
        let transform = wave();
        assert!(transform.max_second_derivative() > 0.0);
        assert!(transform.max_delta_third_derivative() > 0.0);
    }
}
