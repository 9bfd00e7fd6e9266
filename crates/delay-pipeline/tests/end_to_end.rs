//! End-to-end training and serving scenarios

use delay_classifier::TrainingError;
use delay_pipeline::{DelayPredictor, FlightDataset, PipelineError, ServeError, Trainer};
use feature_engine::{Label, FEATURE_DIMENSION};
use flight_validator::{Airline, Field, RawFlight};
use model_store::{CorruptArtifactError, ModelStore};
use std::fmt::Write as _;
use std::io::Write as _;

const AIRLINES: [&str; 8] = [
    "Latin American Wings",
    "Grupo LATAM",
    "Sky Airline",
    "Aerolineas Argentinas",
    "Copa Air",
    "Avianca",
    "Iberia",
    "JetSmart SPA",
];

/// Percentage of delayed departures for a flight profile
fn delay_percent(operator: &str, flight_type: &str, month: u32) -> u32 {
    let mut percent = match operator {
        "Latin American Wings" => 45,
        "Grupo LATAM" => 25,
        "Sky Airline" => 22,
        "Aerolineas Argentinas" => 2,
        _ => 10,
    };
    percent += match month {
        7 | 12 => 15,
        10 => 10,
        3 | 4 | 5 => 0,
        _ => 5,
    };
    if flight_type == "I" {
        percent += 5;
    }
    percent
}

/// Historical CSV in the airport's export layout, with a deterministic delay pattern
fn reference_csv() -> String {
    let mut csv = String::from("Fecha-I,Vlo-I,Fecha-O,DIA,MES,AÑO,TIPOVUELO,OPERA,SIGLADES\n");
    for (a, operator) in AIRLINES.iter().enumerate() {
        for (t, flight_type) in ["I", "N"].iter().enumerate() {
            for month in 1..=12u32 {
                let percent = delay_percent(operator, flight_type, month);
                for k in 0..20u32 {
                    let draw = (k * 37 + month * 11 + t as u32 * 7 + a as u32 * 3) % 100;
                    let day = 1 + k % 28;
                    let hour = (k * 5) % 24;
                    let actual_minute = if draw < percent { 30 } else { 5 };
                    writeln!(
                        csv,
                        "2017-{m:02}-{d:02} {h:02}:00:00,{k},2017-{m:02}-{d:02} {h:02}:{am:02}:00,{d},{m},2017,{t},{o},Somewhere",
                        m = month,
                        d = day,
                        h = hour,
                        am = actual_minute,
                        k = k,
                        t = flight_type,
                        o = operator,
                    )
                    .unwrap();
                }
            }
        }
    }
    csv
}

fn reference_dataset() -> FlightDataset {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(reference_csv().as_bytes()).unwrap();
    file.flush().unwrap();
    FlightDataset::from_csv(file.path()).unwrap()
}

#[test]
fn aerolineas_argentinas_domestic_march_is_on_time() {
    let outcome = Trainer::default().train(&reference_dataset()).unwrap();
    let predictor = DelayPredictor::new(outcome.model);

    let labels = predictor
        .predict(&[RawFlight::new("Aerolineas Argentinas", "N", 3)])
        .unwrap();
    assert_eq!(labels, vec![Label::OnTime]);
}

#[test]
fn delay_prone_profile_is_delayed() {
    let outcome = Trainer::default().train(&reference_dataset()).unwrap();
    let predictor = DelayPredictor::new(outcome.model);

    let labels = predictor
        .predict(&[RawFlight::new("Latin American Wings", "I", 7)])
        .unwrap();
    assert_eq!(labels, vec![Label::Delayed]);
}

#[test]
fn batch_with_unknown_airline_is_rejected_whole() {
    let outcome = Trainer::default().train(&reference_dataset()).unwrap();
    let predictor = DelayPredictor::new(outcome.model);

    let result = predictor.predict(&[
        RawFlight::new("Grupo LATAM", "I", 7),
        RawFlight::new("Not A Real Airline", "N", 3),
        RawFlight::new("Sky Airline", "N", 12),
    ]);

    match result {
        Err(ServeError::Rejected(rejected)) => {
            assert_eq!(rejected.len(), 1);
            assert_eq!(rejected[0].error.field(), Field::Operator);
            assert_eq!(rejected[0].error.value(), "Not A Real Airline");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn single_class_training_fails_without_artifact() {
    let csv = reference_csv()
        .lines()
        .enumerate()
        .map(|(i, line)| if i == 0 { line.to_string() } else { line.replace(":30:00,", ":05:00,") })
        .collect::<Vec<_>>()
        .join("\n");
    let dataset = FlightDataset::from_reader(csv.as_bytes()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let store = ModelStore::new(dir.path().join("model.json"));
    let err = Trainer::default().train_and_save(&dataset, &store).unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Training(TrainingError::SingleClass(Label::OnTime))
    ));
    assert!(!store.path().exists());
}

#[test]
fn artifact_with_short_coefficients_is_corrupt() {
    let outcome = Trainer::default().train(&reference_dataset()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");

    let mut artifact = serde_json::json!({
        "coefficients": &outcome.model.coefficients()[..8],
        "intercept": outcome.model.intercept(),
        "feature_order": outcome.model.order().identifiers(),
        "positive_class": 1
    });
    std::fs::write(&path, serde_json::to_vec(&artifact).unwrap()).unwrap();

    let err = DelayPredictor::load(&ModelStore::new(&path)).unwrap_err();
    assert!(matches!(
        err,
        CorruptArtifactError::LengthMismatch { coefficients: 8, order: 10 }
    ));

    artifact["coefficients"] = serde_json::json!(outcome.model.coefficients());
    std::fs::write(&path, serde_json::to_vec(&artifact).unwrap()).unwrap();
    assert!(DelayPredictor::load(&ModelStore::new(&path)).is_ok());
}

#[test]
fn saved_model_serves_identical_predictions() {
    let dataset = reference_dataset();
    let dir = tempfile::tempdir().unwrap();
    let store = ModelStore::new(dir.path().join("artifacts").join("delay_model.json"));

    let outcome = Trainer::default().train_and_save(&dataset, &store).unwrap();
    let original = DelayPredictor::new(outcome.model);
    let loaded = DelayPredictor::load(&store).unwrap();

    let mut flights = Vec::new();
    for airline in Airline::ALL {
        for flight_type in ["I", "N"] {
            for month in 1..=12 {
                flights.push(RawFlight::new(airline.as_str(), flight_type, month));
            }
        }
    }

    assert_eq!(loaded.predict(&flights).unwrap(), original.predict(&flights).unwrap());
    assert_eq!(loaded.model().order(), original.model().order());
    assert_eq!(loaded.model().coefficients().len(), FEATURE_DIMENSION);
}

#[test]
fn training_report_describes_run() {
    let outcome = Trainer::default().train(&reference_dataset()).unwrap();
    let report = &outcome.report;

    assert_eq!(report.rows_read, AIRLINES.len() * 2 * 12 * 20);
    assert_eq!(report.rows_used, report.rows_read);
    assert_eq!(report.delayed + report.on_time, report.rows_used);
    assert!(report.delayed > 0 && report.on_time > report.delayed);
    assert_eq!(report.delay_rate_by_period.len(), 3);
    assert!(report.metrics.delayed.recall > 0.5);

    let features: Vec<_> = report.features.iter().map(|f| f.feature.as_str()).collect();
    assert!(features.contains(&"operator=Latin American Wings"));
    assert_eq!(features.len(), FEATURE_DIMENSION);
}
