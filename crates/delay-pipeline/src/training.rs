//! Offline Training Flow
//!
//! historical rows -> validation -> feature engineering -> full categorical expansion
//! -> importance ranking -> canonical top-N selection -> final fit -> trained model

use crate::dataset::FlightDataset;
use crate::report::{ClassificationReport, FeatureWeight, SegmentRate, TrainingReport};
use crate::PipelineError;
use delay_classifier::{ClassifierConfig, DelayClassifier, TrainedModel};
use feature_engine::{
    EngineerConfig, EngineeredRecord, FeatureEncoder, FeatureEngineer, FeatureVector, Label,
    PeriodOfDay, ScheduledFlight, FEATURE_DIMENSION, UNIVERSE_SIZE,
};
use flight_validator::{ValidationConfig, Validator};
use model_store::ModelStore;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Training configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub engineer: EngineerConfig,
    pub classifier: ClassifierConfig,
    /// Drop rows whose categorical fields fail validation instead of failing the run
    pub skip_invalid_rows: bool,
}

impl TrainingConfig {
    /// Skip rows with unknown airlines, flight types or months
    pub fn lenient() -> Self {
        Self {
            skip_invalid_rows: true,
            ..Default::default()
        }
    }
}

/// Trained model and the report describing how it was obtained
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub model: TrainedModel,
    pub report: TrainingReport,
}

/// Runs the training flow
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainingConfig,
    validator: Validator,
    engineer: FeatureEngineer,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            validator: Validator::new(ValidationConfig::default()),
            engineer: FeatureEngineer::new(config.engineer.clone()),
            config,
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train a model from historical flights
    pub fn train(&self, dataset: &FlightDataset) -> Result<TrainingOutcome, PipelineError> {
        info!("Training on {} historical flights", dataset.len());

        let (records, skipped) = self.engineer_rows(dataset)?;
        let labels: Vec<Label> = records.iter().map(|r| self.engineer.label(r)).collect();
        let delayed = labels.iter().filter(|l| **l == Label::Delayed).count();
        info!(
            "Engineered {} flights ({} skipped): delayed={}, on_time={}",
            records.len(),
            skipped,
            delayed,
            labels.len() - delayed
        );

        // Rank every level of the full expansion
        let mut expanded = Array2::<f64>::zeros((records.len(), UNIVERSE_SIZE));
        for (mut row, record) in expanded.rows_mut().into_iter().zip(&records) {
            let full = FeatureEncoder::expand(&record.flight);
            row.assign(&ArrayView1::from(&full[..]));
        }
        let ranking = DelayClassifier::fit(expanded.view(), &labels, &self.config.classifier)?;
        let importances: [f64; UNIVERSE_SIZE] = std::array::from_fn(|i| ranking.coefficients()[i]);
        let order = FeatureEncoder::fit_order(&importances);

        // Refit on the canonical columns only
        let encoder = FeatureEncoder::new(order.clone());
        let vectors: Vec<FeatureVector> = records.iter().map(|r| encoder.encode(&r.flight)).collect();
        let mut selected = Array2::<f64>::zeros((vectors.len(), FEATURE_DIMENSION));
        for (mut row, features) in selected.rows_mut().into_iter().zip(&vectors) {
            row.assign(&ArrayView1::from(features.as_slice()));
        }
        let classifier = DelayClassifier::fit(selected.view(), &labels, &self.config.classifier)?;
        let coefficients: [f64; FEATURE_DIMENSION] = std::array::from_fn(|i| classifier.coefficients()[i]);
        let model = TrainedModel::new(coefficients, classifier.intercept(), order);

        let predicted = model.predict_batch(&vectors)?;
        let metrics = ClassificationReport::compute(&labels, &predicted);
        info!(
            "Training-set metrics: accuracy={:.3}, delayed recall={:.3}, delayed f1={:.3}, on_time recall={:.3}",
            metrics.accuracy, metrics.delayed.recall, metrics.delayed.f1, metrics.on_time.recall
        );

        let report = TrainingReport {
            rows_read: dataset.len(),
            rows_used: records.len(),
            rows_skipped: skipped,
            delayed,
            on_time: labels.len() - delayed,
            delay_rate_by_period: rates_by_period(&records, &labels),
            delay_rate_by_season: rates_by_season(&records, &labels),
            features: model
                .order()
                .levels()
                .iter()
                .zip(model.coefficients())
                .map(|(level, coefficient)| FeatureWeight {
                    feature: level.to_string(),
                    coefficient: *coefficient,
                })
                .collect(),
            intercept: model.intercept(),
            metrics,
        };

        Ok(TrainingOutcome { model, report })
    }

    /// Train and persist; nothing is written when training fails
    pub fn train_and_save(
        &self,
        dataset: &FlightDataset,
        store: &ModelStore,
    ) -> Result<TrainingOutcome, PipelineError> {
        let outcome = self.train(dataset)?;
        store.save(&outcome.model)?;
        Ok(outcome)
    }

    fn engineer_rows(&self, dataset: &FlightDataset) -> Result<(Vec<EngineeredRecord>, usize), PipelineError> {
        let mut records = Vec::with_capacity(dataset.len());
        let mut skipped = 0;

        for (row, historical) in dataset.rows().iter().enumerate() {
            let flight = match historical.validate(&self.validator) {
                Ok(flight) => flight,
                Err(error) if self.config.skip_invalid_rows => {
                    debug!("Skipping row {}: {}", row, error);
                    skipped += 1;
                    continue;
                }
                Err(source) => return Err(PipelineError::InvalidRow { row, source }),
            };

            let scheduled = ScheduledFlight {
                flight,
                scheduled: historical.scheduled.clone(),
                actual: historical.actual.clone(),
            };
            let record = self
                .engineer
                .engineer(&scheduled)
                .map_err(|source| PipelineError::FeatureEngineering { row, source })?;
            records.push(record);
        }

        if skipped > 0 {
            warn!("Skipped {} rows that failed validation", skipped);
        }
        Ok((records, skipped))
    }
}

fn rates_by_period(records: &[EngineeredRecord], labels: &[Label]) -> Vec<SegmentRate> {
    PeriodOfDay::ALL
        .iter()
        .map(|period| segment(period.as_str(), records, labels, |r| r.period_of_day == *period))
        .collect()
}

fn rates_by_season(records: &[EngineeredRecord], labels: &[Label]) -> Vec<SegmentRate> {
    vec![
        segment("high_season", records, labels, |r| r.high_season),
        segment("regular_season", records, labels, |r| !r.high_season),
    ]
}

fn segment(
    name: &str,
    records: &[EngineeredRecord],
    labels: &[Label],
    member: impl Fn(&EngineeredRecord) -> bool,
) -> SegmentRate {
    let (flights, delayed) = records
        .iter()
        .zip(labels)
        .filter(|(r, _)| member(r))
        .fold((0, 0), |(n, d), (_, l)| (n + 1, d + usize::from(*l == Label::Delayed)));

    let rate = SegmentRate {
        segment: name.to_string(),
        flights,
        delayed,
    };
    debug!("Delay rate {}: {:.3} over {} flights", name, rate.rate(), flights);
    rate
}
