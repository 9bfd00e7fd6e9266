//! Balanced Logistic Regression

use crate::solver::cholesky_solve;
use crate::{PredictionError, TrainingError};
use feature_engine::Label;
use ndarray::{s, Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Floor on per-sample curvature so the Hessian stays well conditioned
const CURVATURE_MIN: f64 = 1e-10;
/// Smallest line-search step before accepting the candidate anyway
const MIN_STEP: f64 = 1e-8;

/// How training examples are weighted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeighting {
    /// Each example weighted by `n / (2 * n_class)`
    Balanced,
    /// Every example weighs 1
    Uniform,
}

impl ClassWeighting {
    fn sample_weights(&self, labels: &[Label], delayed: usize) -> Array1<f64> {
        let n = labels.len() as f64;
        let on_time = labels.len() - delayed;
        match self {
            ClassWeighting::Uniform => Array1::ones(labels.len()),
            ClassWeighting::Balanced => {
                let w_delayed = n / (2.0 * delayed as f64);
                let w_on_time = n / (2.0 * on_time as f64);
                labels
                    .iter()
                    .map(|l| match l {
                        Label::Delayed => w_delayed,
                        Label::OnTime => w_on_time,
                    })
                    .collect()
            }
        }
    }
}

/// Classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// L2 penalty on coefficients (the intercept is not penalised)
    pub l2_penalty: f64,
    /// Maximum Newton iterations
    pub max_iter: usize,
    /// Stop once the largest parameter update falls below this
    pub tolerance: f64,
    /// Class-imbalance correction
    pub class_weighting: ClassWeighting,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            l2_penalty: 1.0,
            max_iter: 100,
            tolerance: 1e-8,
            class_weighting: ClassWeighting::Balanced,
        }
    }
}

/// Linear binary classifier with a logistic link
#[derive(Debug, Clone, PartialEq)]
pub struct DelayClassifier {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl DelayClassifier {
    /// Build a classifier from known parameters
    pub fn from_parameters(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }

    /// Fit by maximising the (class-weighted, L2-penalised) log-likelihood
    pub fn fit(
        x: ArrayView2<'_, f64>,
        labels: &[Label],
        config: &ClassifierConfig,
    ) -> Result<Self, TrainingError> {
        let (n, d) = x.dim();
        if labels.len() != n {
            return Err(TrainingError::ShapeMismatch {
                rows: n,
                labels: labels.len(),
            });
        }
        if n == 0 {
            return Err(TrainingError::EmptyDataset);
        }

        let delayed = labels.iter().filter(|l| **l == Label::Delayed).count();
        if delayed == 0 {
            return Err(TrainingError::SingleClass(Label::OnTime));
        }
        if delayed == n {
            return Err(TrainingError::SingleClass(Label::Delayed));
        }

        info!(
            "Fitting classifier: rows={}, features={}, delayed={}, weighting={:?}",
            n, d, delayed, config.class_weighting
        );

        let y: Array1<f64> = labels.iter().map(Label::as_f64).collect();
        let sample_weights = config.class_weighting.sample_weights(labels, delayed);
        let l2 = config.l2_penalty;

        let mut w = Array1::<f64>::zeros(d);
        let mut b = 0.0;
        let mut loss = objective(x, &y, &sample_weights, &w, b, l2);
        let mut converged = false;

        for iteration in 0..config.max_iter {
            let p = (x.dot(&w) + b).mapv(sigmoid);
            let residual = &sample_weights * &(&p - &y);
            let curvature = &sample_weights * &p.mapv(|v| (v * (1.0 - v)).max(CURVATURE_MIN));

            let mut gradient = Array1::<f64>::zeros(d + 1);
            gradient
                .slice_mut(s![..d])
                .assign(&(x.t().dot(&residual) + &w * l2));
            gradient[d] = residual.sum();

            let weighted = &x * &curvature.view().insert_axis(Axis(1));
            let cross = weighted.sum_axis(Axis(0));
            let mut hessian = Array2::<f64>::zeros((d + 1, d + 1));
            hessian.slice_mut(s![..d, ..d]).assign(&weighted.t().dot(&x));
            hessian.slice_mut(s![..d, d]).assign(&cross);
            hessian.slice_mut(s![d, ..d]).assign(&cross);
            hessian[[d, d]] = curvature.sum();
            for j in 0..d {
                hessian[[j, j]] += l2;
            }

            let step = cholesky_solve(&hessian, &gradient).ok_or(TrainingError::Singular { iteration })?;

            // Backtrack until the penalised loss does not increase
            let mut t = 1.0;
            let (next_w, next_b, next_loss) = loop {
                let candidate_w = &w - &step.slice(s![..d]).mapv(|v| v * t);
                let candidate_b = b - t * step[d];
                let candidate_loss = objective(x, &y, &sample_weights, &candidate_w, candidate_b, l2);
                if candidate_loss <= loss || t < MIN_STEP {
                    break (candidate_w, candidate_b, candidate_loss);
                }
                t *= 0.5;
            };

            if !next_loss.is_finite() || !next_b.is_finite() || next_w.iter().any(|v| !v.is_finite()) {
                return Err(TrainingError::Diverged { iteration });
            }

            let change = step.iter().fold(0.0_f64, |m, v| m.max((v * t).abs()));
            debug!(
                "Newton iteration {}: loss={:.6}, step={:.3e}, max_update={:.3e}",
                iteration, next_loss, t, change
            );

            w = next_w;
            b = next_b;
            loss = next_loss;

            if change < config.tolerance {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                "Classifier did not converge within {} iterations (loss={:.6})",
                config.max_iter, loss
            );
        }

        Ok(Self {
            coefficients: w.to_vec(),
            intercept: b,
        })
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn dimension(&self) -> usize {
        self.coefficients.len()
    }

    /// Weighted sum of features plus intercept (log-odds of delay)
    pub fn decision_function(&self, features: &[f64]) -> Result<f64, PredictionError> {
        if features.len() != self.coefficients.len() {
            return Err(PredictionError::DimensionMismatch {
                expected: self.coefficients.len(),
                actual: features.len(),
            });
        }

        let z = self
            .coefficients
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (w, x)| acc + w * x);
        if z.is_finite() {
            Ok(z)
        } else {
            Err(PredictionError::NonFinite(z))
        }
    }

    /// Probability of delay
    pub fn predict_proba(&self, features: &[f64]) -> Result<f64, PredictionError> {
        self.decision_function(features).map(sigmoid)
    }

    /// Delayed when the probability of delay exceeds one half
    pub fn predict(&self, features: &[f64]) -> Result<Label, PredictionError> {
        let z = self.decision_function(features)?;
        Ok(if z > 0.0 { Label::Delayed } else { Label::OnTime })
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// log(1 + e^z) without overflow
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

fn objective(
    x: ArrayView2<'_, f64>,
    y: &Array1<f64>,
    sample_weights: &Array1<f64>,
    w: &Array1<f64>,
    b: f64,
    l2: f64,
) -> f64 {
    let z = x.dot(w) + b;
    let data_loss: f64 = z
        .iter()
        .zip(y.iter())
        .zip(sample_weights.iter())
        .map(|((z, y), s)| s * (softplus(*z) - y * z))
        .sum();
    data_loss + 0.5 * l2 * w.dot(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn labels(raw: &[u8]) -> Vec<Label> {
        raw.iter().map(|v| Label::from_u8(*v).unwrap()).collect()
    }

    #[test]
    fn test_sigmoid_is_stable() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(softplus(800.0).is_finite());
        assert!((softplus(0.0) - 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_fit_separates_indicator() {
        let x = array![[1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 1.0], [0.0, 1.0]];
        let y = labels(&[1, 1, 0, 0, 0, 0]);
        let model = DelayClassifier::fit(x.view(), &y, &ClassifierConfig::default()).unwrap();

        assert!(model.coefficients()[0] > model.coefficients()[1]);
        assert_eq!(model.predict(&[1.0, 0.0]).unwrap(), Label::Delayed);
        assert_eq!(model.predict(&[0.0, 1.0]).unwrap(), Label::OnTime);
    }

    #[test]
    fn test_balanced_weighting_shifts_boundary() {
        // 1 delayed flight among 10 with identical features
        let x = Array2::<f64>::ones((10, 1));
        let mut raw = vec![0u8; 10];
        raw[0] = 1;
        let y = labels(&raw);

        let uniform = DelayClassifier::fit(
            x.view(),
            &y,
            &ClassifierConfig {
                class_weighting: ClassWeighting::Uniform,
                ..Default::default()
            },
        )
        .unwrap();
        let balanced = DelayClassifier::fit(x.view(), &y, &ClassifierConfig::default()).unwrap();

        let p_uniform = uniform.predict_proba(&[1.0]).unwrap();
        let p_balanced = balanced.predict_proba(&[1.0]).unwrap();
        assert!(p_uniform < 0.2);
        assert!((p_balanced - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_sample_weights_balance_classes() {
        let y = labels(&[1, 0, 0, 0]);
        let weights = ClassWeighting::Balanced.sample_weights(&y, 1);
        assert!((weights[0] - 2.0).abs() < 1e-12);
        assert!((weights[1] - 4.0 / 6.0).abs() < 1e-12);
        let delayed_mass: f64 = weights[0];
        let on_time_mass: f64 = weights.iter().skip(1).sum();
        assert!((delayed_mass - on_time_mass).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_training_data() {
        let x = array![[1.0], [0.0]];
        let config = ClassifierConfig::default();
        assert_eq!(
            DelayClassifier::fit(x.view(), &labels(&[0, 0]), &config),
            Err(TrainingError::SingleClass(Label::OnTime))
        );
        assert_eq!(
            DelayClassifier::fit(x.view(), &labels(&[1, 1]), &config),
            Err(TrainingError::SingleClass(Label::Delayed))
        );

        let empty = Array2::<f64>::zeros((0, 3));
        assert_eq!(
            DelayClassifier::fit(empty.view(), &[], &config),
            Err(TrainingError::EmptyDataset)
        );
        assert_eq!(
            DelayClassifier::fit(x.view(), &labels(&[1]), &config),
            Err(TrainingError::ShapeMismatch { rows: 2, labels: 1 })
        );
    }

    #[test]
    fn test_unseen_column_keeps_zero_weight() {
        let x = array![[1.0, 0.0], [0.0, 0.0], [1.0, 0.0], [0.0, 0.0]];
        let y = labels(&[1, 0, 1, 0]);
        let model = DelayClassifier::fit(x.view(), &y, &ClassifierConfig::default()).unwrap();
        assert_eq!(model.coefficients()[1], 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let model = DelayClassifier::from_parameters(vec![0.5, -0.5], 0.1);
        assert_eq!(
            model.predict(&[1.0]),
            Err(PredictionError::DimensionMismatch { expected: 2, actual: 1 })
        );
    }

    #[test]
    fn test_non_finite_decision() {
        let model = DelayClassifier::from_parameters(vec![f64::INFINITY], 0.0);
        assert!(matches!(model.predict(&[1.0]), Err(PredictionError::NonFinite(_))));
    }

    #[test]
    fn test_threshold_at_half() {
        let model = DelayClassifier::from_parameters(vec![1.0], -1.0);
        // probability exactly 0.5 stays on time
        assert_eq!(model.predict(&[1.0]).unwrap(), Label::OnTime);
        assert_eq!(model.predict(&[1.5]).unwrap(), Label::Delayed);
    }
}
