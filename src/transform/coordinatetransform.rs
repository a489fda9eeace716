/// Status returned by the batch evaluation calls.
pub const STATUS_OK: i32 = 0;
/// The transform failed construction and is inert.
pub const STATUS_INVALID_TRANSFORM: i32 = -1;
/// Empty or mismatched request buffers.
pub const STATUS_BAD_REQUEST: i32 = -2;

/// Sentinel returned by evaluation calls on an inert transform or when a
/// sequence call is made without a preceding sequence start. Defined but
/// meaningless; `is_valid` is the only reliable gate.
pub const INVALID_VALUE: f64 = -1.0;

/// Evaluation contract for a coordinate transform built from calibration
/// pairs, independent of the interpolation algorithm.
///
/// Stateless calls take `&self` and may be shared across threads; the
/// sequence calls take `&mut self` because they advance an internal
/// cursor, so the borrow checker rules out interleaving them with
/// concurrent evaluation on the same instance.
pub trait CoordinateTransform {
    /// Single evaluation at `abscissa`, not part of a sequence. Defined
    /// for abscissas within `[left_abscissa, right_abscissa]`; outside
    /// that range the result is meaningless (no panic).
    fn evaluate(&self, abscissa: f64) -> f64;

    /// Like `evaluate`, but defined outside the calibrated range via
    /// linear extrapolation of the boundary tangents.
    fn evaluate_with_extrapolation(&self, abscissa: f64) -> f64;

    /// Begins an equally spaced sequence at `start_abscissa`, records the
    /// spacing, and returns the value at `start_abscissa`.
    fn evaluate_sequence_start(&mut self, start_abscissa: f64, spacing: f64) -> f64;

    /// Advances the sequence by one spacing and evaluates. Returns
    /// `INVALID_VALUE` when no sequence was started.
    fn evaluate_sequence_next(&mut self) -> f64;

    /// Jumps the sequence to `abscissa_start + count * spacing`, still
    /// reusing the cursor's interval hint. Returns `INVALID_VALUE` when
    /// no sequence was started.
    fn evaluate_sequence_skip(&mut self, abscissa_start: f64, count: usize) -> f64;

    /// Fills `result` with evaluations at `start_abscissa + i * spacing`,
    /// extrapolating outside the calibrated range. Returns `STATUS_OK`
    /// or a negative status; on failure `result` is untouched.
    fn evaluate_full_sequence(&self, result: &mut [f64], start_abscissa: f64, spacing: f64) -> i32;

    /// Evaluates at arbitrary ascending `abscissas`, filling `result` in
    /// the same order. Ascending order is a caller precondition (checked
    /// only in debug builds); violating it yields wrong values, not a
    /// crash.
    fn evaluate_ordered_sequence(&self, abscissas: &[f64], result: &mut [f64]) -> i32;

    /// Largest absolute second derivative over the calibrated range,
    /// computed once at build time.
    fn max_second_derivative(&self) -> f64;

    /// Largest jump of the (piecewise constant) third derivative across
    /// interior knots, computed once at build time.
    fn max_delta_third_derivative(&self) -> f64;

    fn left_abscissa(&self) -> f64;

    fn right_abscissa(&self) -> f64;

    fn is_valid(&self) -> bool;
}

/// Caller-owned cache of the most recent evaluation results.
///
/// The surrounding display layer often needs only "the value I just
/// computed"; owning the cache on that side keeps the transform free of
/// hidden mutable state.
#[derive(Clone, Copy, Debug, Default)]
pub struct LastValueCache {
    last_value: f64,
    last_in_sequence_value: f64,
}

impl LastValueCache {
    pub fn new() -> LastValueCache {
        LastValueCache::default()
    }

    /// Records a single-evaluation result; returns it for chaining.
    pub fn record(&mut self, value: f64) -> f64 {
        self.last_value = value;
        value
    }

    /// Records a sequence result; sequence values also count as the most
    /// recent overall value.
    pub fn record_in_sequence(&mut self, value: f64) -> f64 {
        self.last_in_sequence_value = value;
        self.last_value = value;
        value
    }

    pub fn last_value(&self) -> f64 {
        self.last_value
    }

    pub fn last_in_sequence_value(&self) -> f64 {
        self.last_in_sequence_value
    }
}
