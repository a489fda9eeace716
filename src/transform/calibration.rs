use std::fs::File;
use std::io::{BufReader, Read};

use serde::{Deserialize, Serialize};

use crate::transform::transformerror::TransformError;

/// Minimum number of calibration points a transform can be built from.
pub const MINIMUM_CALIBRATION_POINTS: usize = 2;

#[derive(Deserialize)]
struct CalibrationJsonProp {
    abscissas: Vec<f64>,
    ordinates: Vec<f64>,
}

/// An ordered set of (abscissa, ordinate) calibration pairs.
///
/// Abscissas are strictly increasing and there are at least two pairs;
/// both are checked at construction so a `CalibrationSet` is valid by
/// the time a transform sees it. Input slices are copied, the set does
/// not borrow caller storage.
#[derive(Clone, Debug, Serialize)]
pub struct CalibrationSet {
    abscissas: Vec<f64>,
    ordinates: Vec<f64>,
}

impl CalibrationSet {
    pub fn new(abscissas: Vec<f64>, ordinates: Vec<f64>) -> Result<CalibrationSet, TransformError> {
        if abscissas.len() != ordinates.len() {
            return Err(TransformError::LengthMismatch {
                abscissas: abscissas.len(),
                ordinates: ordinates.len(),
            });
        }
        if abscissas.len() < MINIMUM_CALIBRATION_POINTS {
            return Err(TransformError::InsufficientPoints {
                required: MINIMUM_CALIBRATION_POINTS,
                actual: abscissas.len(),
            });
        }
        for i in 1..abscissas.len() {
            if !(abscissas[i] > abscissas[i - 1]) {
                return Err(TransformError::NonIncreasingAbscissas { index: i });
            }
        }
        Ok(CalibrationSet { abscissas, ordinates })
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<CalibrationSet, TransformError> {
        let abscissas = pairs.iter().map(|pair| pair.0).collect();
        let ordinates = pairs.iter().map(|pair| pair.1).collect();
        Self::new(abscissas, ordinates)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<CalibrationSet, TransformError> {
        let json_prop: CalibrationJsonProp = serde_json::from_reader(reader)?;
        Self::new(json_prop.abscissas, json_prop.ordinates)
    }

    pub fn from_json_file(file_path: &str) -> Result<CalibrationSet, TransformError> {
        let file = File::open(file_path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.abscissas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abscissas.is_empty()
    }

    pub fn abscissas(&self) -> &[f64] {
        &self.abscissas
    }

    pub fn ordinates(&self) -> &[f64] {
        &self.ordinates
    }
}
