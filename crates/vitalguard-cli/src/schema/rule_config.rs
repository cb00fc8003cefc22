//! JSON documents consumed by the serving application.

use serde::Serialize;
use vitalguard_analysis::thresholds::ThresholdTable;
use vitalguard_data::{FeatureMap, FeatureMapping, VitalFeature};
use vitalguard_training::{
    classifier::ClassifierKind, risk::RiskThresholds, scaler::StandardScaler,
};

pub const MODEL_TYPE: &str = "rule_based_ml";
const MODEL_VERSION_PREFIX: &str = "v2.0";

/// Contents of `rule_config.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RuleConfig {
    pub model_type: &'static str,
    pub model_version: String,
    pub trained_model: &'static str,
    pub roc_auc: f64,
    pub thresholds: ThresholdTable,
    pub feature_weights: FeatureMap<f64>,
    pub risk_thresholds: RiskThresholds,
    pub feature_mapping: FeatureMapping,
    pub scaler: ScalerConfig,
}

impl RuleConfig {
    pub fn new(
        model: ClassifierKind,
        roc_auc: f64,
        thresholds: &ThresholdTable,
        feature_weights: FeatureMap<f64>,
        risk_thresholds: RiskThresholds,
        scaler: &StandardScaler,
    ) -> Self {
        Self {
            model_type: MODEL_TYPE,
            model_version: model_version(model),
            trained_model: model.name(),
            roc_auc,
            thresholds: *thresholds,
            feature_weights,
            risk_thresholds,
            feature_mapping: FeatureMapping,
            scaler: ScalerConfig::from(scaler),
        }
    }

    /// The companion `metadata.json` document.
    pub fn metadata(&self) -> Metadata {
        Metadata {
            model_version: self.model_version.clone(),
            roc_auc: self.roc_auc,
            thresholds: self.risk_thresholds,
            feature_names: VitalFeature::app_names(),
        }
    }
}

/// `"v2.0-random-forest"` for [`ClassifierKind::RandomForest`].
pub fn model_version(model: ClassifierKind) -> String {
    format!("{MODEL_VERSION_PREFIX}-{}", model.slug())
}

/// Scaler parameters, with features named by dataset column.
#[derive(Debug, Clone, Serialize)]
pub struct ScalerConfig {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    pub feature_names: Vec<&'static str>,
}

impl From<&StandardScaler> for ScalerConfig {
    fn from(scaler: &StandardScaler) -> Self {
        Self {
            mean: scaler.mean().to_vec(),
            scale: scaler.scale().to_vec(),
            feature_names: VitalFeature::dataset_columns(),
        }
    }
}

/// Contents of `metadata.json`.
#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    pub model_version: String,
    pub roc_auc: f64,
    pub thresholds: RiskThresholds,
    pub feature_names: Vec<&'static str>,
}
