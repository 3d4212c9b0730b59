//! Regression model contract and the persisted model blob format

use crate::error::ModelError;
use serde::Deserialize;
use std::sync::Arc;

/// Fixed-width numeric vector in, scalar out
pub trait RegressionModel: Send + Sync {
    /// Number of features the model was fitted on
    fn input_width(&self) -> usize;

    /// Predict a single sample
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError>;

    /// Short model family name for logs
    fn kind(&self) -> &'static str;
}

/// Ordinary least squares model: `intercept + coef . x`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearRegression {
    pub n_features_in: usize,
    pub coef: Vec<f64>,
    pub intercept: f64,
}

impl LinearRegression {
    fn validate(&self) -> Result<(), String> {
        if self.n_features_in == 0 {
            return Err("n_features_in must be positive".to_string());
        }
        if self.coef.len() != self.n_features_in {
            return Err(format!(
                "coef has {} entries but n_features_in is {}",
                self.coef.len(),
                self.n_features_in
            ));
        }
        if !self.intercept.is_finite() || self.coef.iter().any(|c| !c.is_finite()) {
            return Err("weights must be finite".to_string());
        }
        Ok(())
    }
}

impl RegressionModel for LinearRegression {
    fn input_width(&self) -> usize {
        self.n_features_in
    }

    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.coef.len() {
            return Err(ModelError::InputWidth {
                expected: self.coef.len(),
                actual: features.len(),
            });
        }

        let value = self.intercept
            + self
                .coef
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>();

        if !value.is_finite() {
            return Err(ModelError::NonFinite(value));
        }
        Ok(value)
    }

    fn kind(&self) -> &'static str {
        "linear_regression"
    }
}

#[derive(Deserialize)]
#[serde(tag = "model_type", rename_all = "snake_case")]
enum ModelBlob {
    LinearRegression(LinearRegression),
}

/// Deserialize a model blob into a shareable model handle
pub fn decode_model(bytes: &[u8]) -> Result<Arc<dyn RegressionModel>, String> {
    let blob: ModelBlob =
        serde_json::from_slice(bytes).map_err(|e| format!("cannot decode model blob: {}", e))?;

    match blob {
        ModelBlob::LinearRegression(model) => {
            model.validate()?;
            Ok(Arc::new(model))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_linear_model() {
        let model = decode_model(
            br#"{"model_type": "linear_regression", "n_features_in": 3, "coef": [1.0, 2.0, 3.0], "intercept": 0.5}"#,
        )
        .unwrap();

        assert_eq!(model.input_width(), 3);
        assert_eq!(model.kind(), "linear_regression");
        assert_eq!(model.predict(&[1.0, 1.0, 1.0]).unwrap(), 6.5);
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let err = decode_model(br#"{"model_type": "random_forest", "trees": []}"#).err().unwrap();
        assert!(err.contains("cannot decode"));
    }

    #[test]
    fn test_decode_rejects_inconsistent_width() {
        let err = decode_model(
            br#"{"model_type": "linear_regression", "n_features_in": 4, "coef": [1.0, 2.0], "intercept": 0.0}"#,
        )
        .err().unwrap();
        assert!(err.contains("n_features_in"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_model(b"\x80\x04\x95pickle").is_err());
    }

    #[test]
    fn test_predict_wrong_width() {
        let model = LinearRegression {
            n_features_in: 2,
            coef: vec![1.0, 1.0],
            intercept: 0.0,
        };
        assert_eq!(
            model.predict(&[1.0]),
            Err(ModelError::InputWidth { expected: 2, actual: 1 })
        );
    }

    #[test]
    fn test_predict_non_finite() {
        let model = LinearRegression {
            n_features_in: 1,
            coef: vec![f64::MAX],
            intercept: 0.0,
        };
        assert!(matches!(model.predict(&[10.0]), Err(ModelError::NonFinite(_))));
    }
}
