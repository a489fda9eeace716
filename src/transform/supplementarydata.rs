/// Extra reference pairs used to refine a fit against a denser dataset,
/// e.g. internal-lane-standard peaks measured alongside a ladder.
///
/// `proximity_multiple` controls near-duplicate rejection: an extra point
/// is discarded when its distance to a neighboring knot is smaller than
/// the neighboring interval width divided by `proximity_multiple`. A
/// non-positive multiple disables merging entirely.
#[derive(Clone, Debug)]
pub struct SupplementaryData {
    pub abscissas: Vec<f64>,
    pub ordinates: Vec<f64>,
    pub proximity_multiple: f64,
}

impl SupplementaryData {
    pub fn new(abscissas: Vec<f64>, ordinates: Vec<f64>, proximity_multiple: f64) -> SupplementaryData {
        SupplementaryData { abscissas, ordinates, proximity_multiple }
    }

    /// Merges the extra pairs into an already ordered knot list, keeping
    /// the strictly-increasing invariant. Points outside the primary span
    /// are dropped; extrapolation lines govern that region.
    pub fn merge_into(&self, abscissas: &[f64], ordinates: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let mut merged_x = abscissas.to_vec();
        let mut merged_y = ordinates.to_vec();

        if self.proximity_multiple <= 0.0 || self.abscissas.len() != self.ordinates.len() {
            return (merged_x, merged_y);
        }

        let left = abscissas[0];
        let right = abscissas[abscissas.len() - 1];

        for (&x, &y) in self.abscissas.iter().zip(self.ordinates.iter()) {
            if x <= left || x >= right {
                continue;
            }
            let pos = merged_x.partition_point(|&knot| knot < x);
            let lower = merged_x[pos - 1];
            let upper = merged_x[pos];
            let threshold = (upper - lower) / self.proximity_multiple;
            if x - lower < threshold || upper - x < threshold {
                continue;
            }
            merged_x.insert(pos, x);
            merged_y.insert(pos, y);
        }

        (merged_x, merged_y)
    }
}
