//! Vital-sign features and per-feature containers.
//!
//! Every feature has two names: the column name in the training dataset and the
//! name the serving application uses. [`VitalFeature::ALL`] fixes the canonical
//! order; every per-feature vector in the exported configuration follows it.

use std::{
    fmt,
    ops::{Index, IndexMut},
};

use serde::{Serialize, Serializer, ser::SerializeMap as _};

/// One of the six vital signs the model is trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum VitalFeature {
    /// Heart rate in beats per minute.
    HeartRate = 0,
    /// Peripheral oxygen saturation in percent.
    Spo2 = 1,
    /// Respiratory rate in breaths per minute.
    RespRate = 2,
    /// Systolic blood pressure in mmHg.
    SystolicBp = 3,
    /// Diastolic blood pressure in mmHg.
    DiastolicBp = 4,
    /// Body temperature in degrees Celsius.
    Temperature = 5,
}

/// How the threshold calculator bounds a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum ThresholdSemantics {
    /// Only low values indicate deterioration; only minimum bounds are derived.
    LowerIsWorse,
    /// Values outside a band on either side indicate deterioration.
    TwoSided,
}

impl VitalFeature {
    /// Number of features (6).
    pub const LEN: usize = 6;

    /// All features in canonical order.
    pub const ALL: [Self; Self::LEN] = [
        Self::HeartRate,
        Self::Spo2,
        Self::RespRate,
        Self::SystolicBp,
        Self::DiastolicBp,
        Self::Temperature,
    ];

    /// Position of this feature in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Column name in the training dataset.
    #[must_use]
    pub const fn dataset_column(self) -> &'static str {
        match self {
            Self::HeartRate => "heart_rate",
            Self::Spo2 => "spo2_pct",
            Self::RespRate => "respiratory_rate",
            Self::SystolicBp => "systolic_bp",
            Self::DiastolicBp => "diastolic_bp",
            Self::Temperature => "temperature_c",
        }
    }

    /// Name used by the serving application.
    #[must_use]
    pub const fn app_name(self) -> &'static str {
        match self {
            Self::HeartRate => "heart_rate",
            Self::Spo2 => "spo2",
            Self::RespRate => "resp_rate",
            Self::SystolicBp => "systolic_bp",
            Self::DiastolicBp => "diastolic_bp",
            Self::Temperature => "temperature",
        }
    }

    /// Threshold semantics for this feature.
    ///
    /// `SpO2` is the only feature where a high reading is never a warning sign.
    #[must_use]
    pub const fn threshold_semantics(self) -> ThresholdSemantics {
        match self {
            Self::Spo2 => ThresholdSemantics::LowerIsWorse,
            Self::HeartRate
            | Self::RespRate
            | Self::SystolicBp
            | Self::DiastolicBp
            | Self::Temperature => ThresholdSemantics::TwoSided,
        }
    }

    /// Dataset column names in canonical order.
    #[must_use]
    pub fn dataset_columns() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.dataset_column()).collect()
    }

    /// Application names in canonical order.
    #[must_use]
    pub fn app_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.app_name()).collect()
    }
}

impl fmt::Display for VitalFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.app_name())
    }
}

/// Exactly one value per [`VitalFeature`], stored in canonical order.
///
/// Serializes as a JSON object keyed by application feature name, in canonical order.
///
/// # Examples
///
/// ```
/// use vitalguard_data::{FeatureMap, VitalFeature};
///
/// let weights = FeatureMap::from_fn(|f| f.index() as f64);
/// assert_eq!(weights[VitalFeature::Spo2], 1.0);
/// assert_eq!(weights.values().len(), VitalFeature::LEN);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureMap<T>([T; VitalFeature::LEN]);

impl<T> FeatureMap<T> {
    /// Builds a map by evaluating `f` for each feature in canonical order.
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(VitalFeature) -> T,
    {
        Self(VitalFeature::ALL.map(&mut f))
    }

    /// Wraps values already laid out in canonical order.
    #[must_use]
    pub const fn from_array(values: [T; VitalFeature::LEN]) -> Self {
        Self(values)
    }

    /// Values in canonical order.
    #[must_use]
    pub fn values(&self) -> &[T; VitalFeature::LEN] {
        &self.0
    }

    /// Mutable values in canonical order.
    pub fn values_mut(&mut self) -> &mut [T; VitalFeature::LEN] {
        &mut self.0
    }

    /// Iterates `(feature, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (VitalFeature, &T)> + '_ {
        VitalFeature::ALL.into_iter().zip(&self.0)
    }
}

impl<T> Index<VitalFeature> for FeatureMap<T> {
    type Output = T;

    fn index(&self, feature: VitalFeature) -> &T {
        &self.0[feature.index()]
    }
}

impl<T> IndexMut<VitalFeature> for FeatureMap<T> {
    fn index_mut(&mut self, feature: VitalFeature) -> &mut T {
        &mut self.0[feature.index()]
    }
}

impl<T> Serialize for FeatureMap<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(VitalFeature::LEN))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature.app_name(), value)?;
        }
        map.end()
    }
}

/// The fixed dataset-column to application-name correspondence.
///
/// Serializes as `{"heart_rate": "heart_rate", "spo2_pct": "spo2", ...}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureMapping;

impl Serialize for FeatureMapping {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(VitalFeature::LEN))?;
        for feature in VitalFeature::ALL {
            map.serialize_entry(feature.dataset_column(), feature.app_name())?;
        }
        map.end()
    }
}
