use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use vitalguard_analysis::{importance, thresholds::ThresholdTable};
use vitalguard_data::{Dataset, FeatureMap, VitalFeature};
use vitalguard_training::{TrainingConfig, TrainingOutcome, risk::RiskThresholds};

use crate::{schema::rule_config::RuleConfig, util};

const DEFAULT_DATASET: &str = "ML/hospital_deterioration_ml_ready.csv";
const DEFAULT_OUTPUT_DIR: &str = "server/models/deterioration_model";
const DEFAULT_SEED: u64 = 42;

const RULE_CONFIG_FILE: &str = "rule_config.json";
const METADATA_FILE: &str = "metadata.json";

const BANNER_WIDTH: usize = 60;
const SECTION_WIDTH: usize = 50;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Training dataset (CSV with the six vitals and the deterioration label)
    #[arg(long, default_value = DEFAULT_DATASET)]
    pub(crate) dataset: PathBuf,
    /// Directory to write rule_config.json and metadata.json into
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub(crate) output_dir: PathBuf,
    /// Seed for the train/test split and the random forest
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub(crate) seed: u64,
}

impl Default for TrainArg {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from(DEFAULT_DATASET),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            seed: DEFAULT_SEED,
        }
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        dataset: dataset_path,
        output_dir,
        seed,
    } = arg;

    println!("{}", "=".repeat(BANNER_WIDTH));
    println!("VitalGuard AI - Deterioration Prediction Model Training");
    println!("{}", "=".repeat(BANNER_WIDTH));

    let dataset = load_dataset(dataset_path)?;

    println!();
    println!("Calculating thresholds from data...");
    let thresholds = ThresholdTable::from_dataset(&dataset);

    println!();
    println!("Calculating feature importance...");
    let correlation_weights = importance::correlation_weights(&dataset);
    println!();
    println!("Feature weights (correlation-based):");
    print_weights(&correlation_weights);

    println!();
    println!("Training models...");
    let config = TrainingConfig {
        seed: *seed,
        ..TrainingConfig::default()
    };
    log::debug!("training configuration: {config:?}");
    let outcome = vitalguard_training::train(&dataset, &config)
        .with_context(|| format!("Failed to train on {}", dataset_path.display()))?;
    print_training_report(&outcome);

    let risk_thresholds =
        RiskThresholds::from_predictions(&outcome.test_labels, outcome.test_proba());
    println!();
    println!("Optimal risk thresholds:");
    for line in risk_thresholds.to_string().lines() {
        println!("  {line}");
    }

    let rule_config = RuleConfig::new(
        outcome.best.kind(),
        outcome.best.roc_auc,
        &thresholds,
        importance::combine_weights(&correlation_weights, &outcome.model_weights),
        risk_thresholds,
        &outcome.scaler,
    );
    save_rule_config(&rule_config, output_dir)?;

    println!();
    println!("{}", "=".repeat(BANNER_WIDTH));
    println!("Training complete!");
    println!("{}", "=".repeat(BANNER_WIDTH));

    Ok(())
}

fn load_dataset(path: &Path) -> anyhow::Result<Dataset> {
    println!("Loading dataset...");
    let dataset = Dataset::load(path)
        .with_context(|| format!("Failed to load dataset: {}", path.display()))?;
    println!("Loaded {} records", dataset.len());

    let total = dataset.len();
    let positives = dataset.positive_count();
    let positive_rate = dataset.positive_rate();
    println!();
    println!("Features used: {:?}", VitalFeature::dataset_columns());
    println!("Total samples: {total}");
    println!(
        "Positive class (deterioration): {positives} ({:.2}%)",
        100.0 * positive_rate
    );
    println!(
        "Negative class (no deterioration): {} ({:.2}%)",
        total - positives,
        100.0 * (1.0 - positive_rate)
    );
    Ok(dataset)
}

fn print_weights(weights: &FeatureMap<f64>) {
    for (feature, weight) in ranked_weights(weights) {
        println!("  {feature}: {weight:.4}");
    }
}

/// Weights by descending value; equal weights keep canonical order.
fn ranked_weights(weights: &FeatureMap<f64>) -> Vec<(VitalFeature, f64)> {
    let mut ranked: Vec<_> = weights.iter().map(|(feature, &w)| (feature, w)).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

fn print_training_report(outcome: &TrainingOutcome) {
    println!("Training set: {} samples", outcome.split.train);
    println!("Test set: {} samples", outcome.split.test);
    println!(
        "Class weight for positive class: {:.2}",
        outcome.positive_class_ratio
    );

    for (kind, roc_auc) in &outcome.scores {
        println!();
        println!("Training {kind}...");
        println!("  ROC-AUC: {roc_auc:.4}");
    }

    let best = outcome.best.kind();
    println!();
    println!("Best model: {best} (AUC: {:.4})", outcome.best.roc_auc);

    println!();
    println!("{}", "=".repeat(SECTION_WIDTH));
    println!("BEST MODEL EVALUATION: {best}");
    println!("{}", "=".repeat(SECTION_WIDTH));
    println!();
    println!("Classification Report:");
    println!("{}", outcome.report);
    println!();
    println!("Confusion Matrix:");
    println!("{}", outcome.confusion);

    println!();
    println!("Model-based feature importance:");
    print_weights(&outcome.model_weights);
}

fn save_rule_config(rule_config: &RuleConfig, output_dir: &Path) -> anyhow::Result<()> {
    util::create_output_dir(output_dir)?;
    util::save_json(rule_config, output_dir.join(RULE_CONFIG_FILE))?;
    util::save_json(&rule_config.metadata(), output_dir.join(METADATA_FILE))?;

    println!();
    println!("Model configuration saved to {}/", output_dir.display());
    println!("  - {RULE_CONFIG_FILE}: Full configuration");
    println!("  - {METADATA_FILE}: Model metadata");
    println!("  Model version: {}", rule_config.model_version);
    println!("  Trained at: {}", Utc::now());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fmt::Write as _, fs};

    use vitalguard_stats::percentiles;

    use super::*;
    use crate::util::read_json_file;

    const HEADER: &str = "patient_id,heart_rate,spo2_pct,respiratory_rate,systolic_bp,diastolic_bp,temperature_c,deterioration_next_12h";

    /// 1000 rows, 150 of them deteriorating, with overlapping class distributions.
    fn synthetic_rows() -> Vec<(f64, [f64; 6], u8)> {
        (0..1000_u32)
            .map(|i| {
                let label = u8::from(i % 20 < 3);
                let a = f64::from((i * 37) % 101) / 100.0;
                let b = f64::from((i * 53) % 89) / 88.0;
                let shift = f64::from(label);
                let vitals = [
                    70.0 + 30.0 * a + 15.0 * shift,
                    99.0 - 5.0 * b - 4.0 * shift,
                    12.0 + 8.0 * b + 5.0 * shift,
                    135.0 - 30.0 * a - 10.0 * shift,
                    85.0 - 15.0 * b - 5.0 * shift,
                    36.4 + 1.2 * a + 0.8 * shift,
                ];
                (f64::from(i), vitals, label)
            })
            .collect()
    }

    fn write_csv(
        path: &Path,
        header: &str,
        rows: &[(f64, [f64; 6], u8)],
        drop_column: Option<usize>,
    ) {
        let mut text = String::new();
        writeln!(text, "{header}").unwrap();
        for (id, vitals, label) in rows {
            let mut fields = vec![id.to_string()];
            for (i, v) in vitals.iter().enumerate() {
                if Some(i) != drop_column {
                    fields.push(format!("{v:.2}"));
                }
            }
            fields.push(label.to_string());
            writeln!(text, "{}", fields.join(",")).unwrap();
        }
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_weights_are_printed_heaviest_first() {
        let weights = FeatureMap::from_array([0.1, 0.3, 0.05, 0.3, 0.2, 0.05]);
        let ranked: Vec<VitalFeature> = ranked_weights(&weights)
            .into_iter()
            .map(|(feature, _)| feature)
            .collect();
        assert_eq!(
            ranked,
            [
                VitalFeature::Spo2,
                VitalFeature::SystolicBp,
                VitalFeature::DiastolicBp,
                VitalFeature::HeartRate,
                VitalFeature::RespRate,
                VitalFeature::Temperature,
            ]
        );
    }

    #[test]
    fn test_pipeline_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("vitals.csv");
        let rows = synthetic_rows();
        write_csv(&dataset, HEADER, &rows, None);

        let output_dir = dir.path().join("models/deterioration_model");
        let arg = TrainArg {
            dataset: dataset.clone(),
            output_dir: output_dir.clone(),
            seed: 42,
        };
        run(&arg).unwrap();

        let config: serde_json::Value =
            read_json_file("rule config", output_dir.join(RULE_CONFIG_FILE)).unwrap();
        let metadata: serde_json::Value =
            read_json_file("metadata", output_dir.join(METADATA_FILE)).unwrap();

        // spo2.normal_min is P5 of the SpO2 readings as stored in the CSV
        let loaded = Dataset::load(&dataset).unwrap();
        let (mut normal_spo2, _) = loaded.column_by_label(VitalFeature::Spo2);
        normal_spo2.sort_by(f64::total_cmp);
        let expected = percentiles::compute_percentile(&normal_spo2, 5.0);
        let actual = config["thresholds"]["spo2"]["normal_min"].as_f64().unwrap();
        assert!((actual - expected).abs() < 1e-9, "{actual} vs {expected}");

        let weights = config["feature_weights"].as_object().unwrap();
        assert_eq!(weights.len(), 6);
        let sum: f64 = weights.values().map(|w| w.as_f64().unwrap()).sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(weights.values().all(|w| w.as_f64().unwrap() >= 0.0));

        let risk = &config["risk_thresholds"];
        assert!(risk["low_risk"].as_f64().unwrap() <= risk["moderate_risk"].as_f64().unwrap());
        assert_eq!(config["scaler"]["scale"].as_array().unwrap().len(), 6);
        assert_eq!(config["model_version"], metadata["model_version"]);
        assert_eq!(metadata["thresholds"], config["risk_thresholds"]);
        assert_eq!(metadata["feature_names"][1], "spo2");
    }

    #[test]
    fn test_same_seed_same_output() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("vitals.csv");
        write_csv(&dataset, HEADER, &synthetic_rows(), None);

        let read = |name: &str| {
            let arg = TrainArg {
                dataset: dataset.clone(),
                output_dir: dir.path().join(name),
                seed: 42,
            };
            run(&arg).unwrap();
            let config: serde_json::Value =
                read_json_file("rule config", dir.path().join(name).join(RULE_CONFIG_FILE))
                    .unwrap();
            config
        };
        let a = read("a");
        let b = read("b");
        assert_eq!(a["roc_auc"], b["roc_auc"]);
        assert_eq!(a["risk_thresholds"], b["risk_thresholds"]);
    }

    #[test]
    fn test_missing_column_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("vitals.csv");
        let header = HEADER.replace(",temperature_c", "");
        write_csv(&dataset, &header, &synthetic_rows(), Some(5));

        let output_dir = dir.path().join("out");
        let arg = TrainArg {
            dataset,
            output_dir: output_dir.clone(),
            seed: 42,
        };
        let err = run(&arg).unwrap_err();
        assert!(format!("{err:#}").contains("temperature_c"));
        assert!(!output_dir.join(RULE_CONFIG_FILE).exists());
        assert!(!output_dir.exists());
    }
}
