//! Training Reports

use feature_engine::Label;
use serde::Serialize;

/// Precision / recall / F1 for one class
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class metrics and overall accuracy
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ClassificationReport {
    pub on_time: ClassMetrics,
    pub delayed: ClassMetrics,
    pub accuracy: f64,
}

impl ClassificationReport {
    /// Compare predictions against ground truth, position by position
    pub fn compute(actual: &[Label], predicted: &[Label]) -> Self {
        let total = actual.len().min(predicted.len());
        let correct = actual.iter().zip(predicted).filter(|(a, p)| a == p).count();

        Self {
            on_time: class_metrics(actual, predicted, Label::OnTime),
            delayed: class_metrics(actual, predicted, Label::Delayed),
            accuracy: ratio(correct, total),
        }
    }
}

fn class_metrics(actual: &[Label], predicted: &[Label], class: Label) -> ClassMetrics {
    let mut tp = 0;
    let mut fp = 0;
    let mut fn_ = 0;
    for (a, p) in actual.iter().zip(predicted) {
        match (*a == class, *p == class) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
    }

    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    ClassMetrics {
        precision,
        recall,
        f1,
        support: tp + fn_,
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Delay rate within one segment of the training data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentRate {
    pub segment: String,
    pub flights: usize,
    pub delayed: usize,
}

impl SegmentRate {
    pub fn rate(&self) -> f64 {
        ratio(self.delayed, self.flights)
    }
}

/// A canonical feature and its fitted weight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureWeight {
    pub feature: String,
    pub coefficient: f64,
}

/// Summary of one training run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub rows_read: usize,
    pub rows_used: usize,
    pub rows_skipped: usize,
    pub delayed: usize,
    pub on_time: usize,
    pub delay_rate_by_period: Vec<SegmentRate>,
    pub delay_rate_by_season: Vec<SegmentRate>,
    /// Canonical features in vector order
    pub features: Vec<FeatureWeight>,
    pub intercept: f64,
    /// Final model on the training set
    pub metrics: ClassificationReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::Label::{Delayed as D, OnTime as O};

    #[test]
    fn test_classification_report() {
        let actual = [D, D, O, O, O, O];
        let predicted = [D, O, D, O, O, O];
        let report = ClassificationReport::compute(&actual, &predicted);

        assert!((report.accuracy - 4.0 / 6.0).abs() < 1e-12);
        assert!((report.delayed.precision - 0.5).abs() < 1e-12);
        assert!((report.delayed.recall - 0.5).abs() < 1e-12);
        assert_eq!(report.delayed.support, 2);
        assert!((report.on_time.recall - 0.75).abs() < 1e-12);
        assert_eq!(report.on_time.support, 4);
    }

    #[test]
    fn test_no_positive_predictions() {
        let report = ClassificationReport::compute(&[D, O], &[O, O]);
        assert_eq!(report.delayed.precision, 0.0);
        assert_eq!(report.delayed.f1, 0.0);
    }

    #[test]
    fn test_segment_rate() {
        let segment = SegmentRate {
            segment: "night".to_string(),
            flights: 4,
            delayed: 1,
        };
        assert!((segment.rate() - 0.25).abs() < 1e-12);
        let empty = SegmentRate {
            segment: "morning".to_string(),
            flights: 0,
            delayed: 0,
        };
        assert_eq!(empty.rate(), 0.0);
    }
}
