use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::domain::{ModelInput, RiskClass};
use super::engine::InvalidInput;

/// Classifier output exactly as reported: class labels and their probabilities
/// in the same positional order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    pub classes: Vec<i64>,
    pub probabilities: Vec<f64>,
}

/// Probabilities keyed by ordinal class, validated once on receipt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassProbabilities {
    low: f64,
    medium: f64,
    high: f64,
}

impl ClassProbabilities {
    pub fn new(low: f64, medium: f64, high: f64) -> Result<Self, InvalidInput> {
        Ok(Self {
            low: InvalidInput::check_unit_interval("probabilities.LOW", low)?,
            medium: InvalidInput::check_unit_interval("probabilities.MEDIUM", medium)?,
            high: InvalidInput::check_unit_interval("probabilities.HIGH", high)?,
        })
    }

    /// Maps positional classifier output onto the three ordinal classes.
    ///
    /// The label set must be exactly `{0, 1, 2}`; order does not matter.
    pub fn from_prediction(prediction: &RawPrediction) -> Result<Self, InvalidInput> {
        if prediction.classes.len() != prediction.probabilities.len() {
            return Err(InvalidInput::new(
                "classes",
                format!(
                    "{} labels reported for {} probabilities",
                    prediction.classes.len(),
                    prediction.probabilities.len()
                ),
            ));
        }

        let mut slots: [Option<f64>; 3] = [None; 3];
        for (label, probability) in prediction
            .classes
            .iter()
            .zip(prediction.probabilities.iter())
        {
            let class = RiskClass::from_ordinal(*label).ok_or_else(|| {
                InvalidInput::new("classes", format!("unexpected class label {label}"))
            })?;
            let slot = &mut slots[usize::from(class.ordinal())];
            if slot.is_some() {
                return Err(InvalidInput::new(
                    "classes",
                    format!("class label {label} reported twice"),
                ));
            }
            *slot = Some(*probability);
        }

        let mut values = [0.0; 3];
        for class in RiskClass::ALL {
            let index = usize::from(class.ordinal());
            values[index] = slots[index].ok_or_else(|| {
                InvalidInput::new(
                    "classes",
                    format!("missing class label {}", class.ordinal()),
                )
            })?;
        }

        Self::new(values[0], values[1], values[2])
    }

    pub fn get(&self, class: RiskClass) -> f64 {
        match class {
            RiskClass::Low => self.low,
            RiskClass::Medium => self.medium,
            RiskClass::High => self.high,
        }
    }

    pub fn high(&self) -> f64 {
        self.high
    }
}

/// Statistical model mapping a feature vector to ordinal class probabilities.
///
/// Implementations are loaded once and shared read-only across requests.
pub trait RiskModel: Send + Sync {
    fn predict(&self, input: &ModelInput) -> Result<RawPrediction, ModelError>;
}

/// Failures from loading or invoking the model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("unable to read model weights from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model weights are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model weights rejected: {0}")]
    InvalidWeights(String),
    #[error("model inference failed: {0}")]
    Inference(String),
}

/// Linear logit and intercept for one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassWeights {
    pub intercept: f64,
    /// latitude, longitude, hour, crime_density, poi_count, is_night, is_isolated
    pub coefficients: [f64; 7],
}

impl ClassWeights {
    fn logit(&self, vector: &[f64; 7]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(vector.iter())
                .map(|(weight, value)| weight * value)
                .sum::<f64>()
    }

    fn is_finite(&self) -> bool {
        self.intercept.is_finite() && self.coefficients.iter().all(|value| value.is_finite())
    }
}

/// Weights for all three classes, serialized as JSON on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelWeights {
    pub low: ClassWeights,
    pub medium: ClassWeights,
    pub high: ClassWeights,
}

impl Default for ModelWeights {
    fn default() -> Self {
        Self {
            low: ClassWeights {
                intercept: 2.0,
                coefficients: [0.0, 0.0, 0.0, -4.0, 0.02, -1.0, -1.0],
            },
            medium: ClassWeights {
                intercept: 0.5,
                coefficients: [0.0, 0.0, 0.0, 1.0, 0.0, 0.3, 0.3],
            },
            high: ClassWeights {
                intercept: -2.0,
                coefficients: [0.0, 0.0, 0.0, 5.0, -0.02, 1.2, 1.5],
            },
        }
    }
}

/// Multinomial logistic classifier over the seven-column feature vector.
#[derive(Debug, Clone, Default)]
pub struct OrdinalLogisticModel {
    weights: ModelWeights,
}

impl OrdinalLogisticModel {
    pub fn new(weights: ModelWeights) -> Result<Self, ModelError> {
        for (name, class) in [
            ("LOW", &weights.low),
            ("MEDIUM", &weights.medium),
            ("HIGH", &weights.high),
        ] {
            if !class.is_finite() {
                return Err(ModelError::InvalidWeights(format!(
                    "{name} weights contain non-finite values"
                )));
            }
        }
        Ok(Self { weights })
    }

    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let raw = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let weights: ModelWeights = serde_json::from_str(&raw)?;
        Self::new(weights)
    }

    pub fn weights(&self) -> &ModelWeights {
        &self.weights
    }
}

impl RiskModel for OrdinalLogisticModel {
    fn predict(&self, input: &ModelInput) -> Result<RawPrediction, ModelError> {
        let vector = input.as_vector();
        if vector.iter().any(|value| !value.is_finite()) {
            return Err(ModelError::Inference(
                "feature vector contains non-finite values".to_string(),
            ));
        }

        let logits = [
            self.weights.low.logit(&vector),
            self.weights.medium.logit(&vector),
            self.weights.high.logit(&vector),
        ];
        if logits.iter().any(|logit| !logit.is_finite()) {
            return Err(ModelError::Inference("non-finite logits".to_string()));
        }
        let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|logit| (logit - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(ModelError::Inference("non-finite softmax total".to_string()));
        }

        Ok(RawPrediction {
            classes: RiskClass::ALL
                .iter()
                .map(|class| i64::from(class.ordinal()))
                .collect(),
            probabilities: exps.iter().map(|value| value / total).collect(),
        })
    }
}
