//! Training both candidate classifiers and keeping the better one.

use vitalguard_data::{Dataset, FeatureMap, split};

use crate::{
    TrainError,
    classifier::{self, BoxedClassifier, ClassifierKind, Row},
    config::TrainingConfig,
    forest::RandomForest,
    logistic::LogisticRegression,
    metrics::{self, ClassificationReport, ConfusionMatrix},
    scaler::StandardScaler,
};

/// A fitted classifier and its held-out ROC-AUC.
#[derive(Debug)]
pub struct Evaluated {
    pub model: BoxedClassifier,
    pub roc_auc: f64,
    /// Held-out probabilities, in test-split order.
    pub test_proba: Vec<f64>,
}

impl Evaluated {
    #[must_use]
    pub fn kind(&self) -> ClassifierKind {
        self.model.kind()
    }
}

/// Picks the candidate with the highest ROC-AUC.
///
/// A later candidate replaces the current best only if its AUC is strictly higher,
/// so on an exact tie the earlier candidate is kept.
pub fn select_best<I>(candidates: I) -> Option<Evaluated>
where
    I: IntoIterator<Item = Evaluated>,
{
    let mut best: Option<Evaluated> = None;
    for candidate in candidates {
        if best
            .as_ref()
            .is_none_or(|current| candidate.roc_auc > current.roc_auc)
        {
            best = Some(candidate);
        }
    }
    best
}

/// Sizes of the train/test split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSummary {
    pub train: usize,
    pub test: usize,
    pub train_positives: usize,
    pub test_positives: usize,
}

/// Everything a training run produces.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub split: SplitSummary,
    /// Negative-to-positive ratio of the training labels.
    pub positive_class_ratio: f64,
    pub scaler: StandardScaler,
    /// ROC-AUC of every candidate, in evaluation order.
    pub scores: Vec<(ClassifierKind, f64)>,
    pub best: Evaluated,
    /// Normalized importance of each feature according to the winning model.
    pub model_weights: FeatureMap<f64>,
    pub confusion: ConfusionMatrix,
    pub report: ClassificationReport,
    pub test_labels: Vec<u8>,
}

impl TrainingOutcome {
    /// Held-out probabilities of the winning model.
    #[must_use]
    pub fn test_proba(&self) -> &[f64] {
        &self.best.test_proba
    }
}

/// Splits, standardizes, trains both classifiers and evaluates the winner.
pub fn train(dataset: &Dataset, config: &TrainingConfig) -> Result<TrainingOutcome, TrainError> {
    let indices = split::stratified_split(dataset.labels(), config.test_ratio, config.seed)?;
    let train_set = dataset.subset(&indices.train);
    let test_set = dataset.subset(&indices.test);
    let split = SplitSummary {
        train: train_set.len(),
        test: test_set.len(),
        train_positives: train_set.positive_count(),
        test_positives: test_set.positive_count(),
    };
    log::info!(
        "split {} rows into {} train / {} test",
        dataset.len(),
        split.train,
        split.test
    );

    let scaler = StandardScaler::fit(train_set.rows());
    let train_rows = scaler.transform(train_set.rows());
    let test_rows = scaler.transform(test_set.rows());
    let train_labels = train_set.labels();
    let test_labels = test_set.labels().to_vec();

    #[expect(clippy::cast_precision_loss)]
    let positive_class_ratio = (split.train - split.train_positives) as f64
        / split.train_positives as f64;
    let sample_weights = classifier::balanced_sample_weights(train_labels);

    let mut candidates = Vec::with_capacity(ClassifierKind::ALL.len());
    for kind in ClassifierKind::ALL {
        log::info!("training {kind}");
        let model = fit(kind, &train_rows, train_labels, &sample_weights, config)?;
        let test_proba = model.predict_proba(&test_rows);
        let roc_auc = metrics::roc_auc(&test_labels, &test_proba)
            .ok_or(TrainError::UndefinedAuc { model: kind.name() })?;
        log::info!("{kind}: ROC-AUC {roc_auc:.4}");
        candidates.push(Evaluated {
            model,
            roc_auc,
            test_proba,
        });
    }

    let scores = candidates
        .iter()
        .map(|c| (c.kind(), c.roc_auc))
        .collect();
    let best = select_best(candidates).ok_or(TrainError::NoCandidate)?;
    log::info!("selected {} (ROC-AUC {:.4})", best.kind(), best.roc_auc);

    let predictions: Vec<u8> = best
        .test_proba
        .iter()
        .map(|&p| u8::from(p > config.decision_threshold))
        .collect();
    let confusion = ConfusionMatrix::new(&test_labels, &predictions);
    let report = ClassificationReport::from_confusion(&confusion);
    let model_weights = best.model.feature_weights();

    Ok(TrainingOutcome {
        split,
        positive_class_ratio,
        scaler,
        scores,
        best,
        model_weights,
        confusion,
        report,
        test_labels,
    })
}

fn fit(
    kind: ClassifierKind,
    rows: &[Row],
    labels: &[u8],
    sample_weights: &[f64],
    config: &TrainingConfig,
) -> Result<BoxedClassifier, TrainError> {
    let model: BoxedClassifier = match kind {
        ClassifierKind::LogisticRegression => Box::new(LogisticRegression::fit(
            rows,
            labels,
            sample_weights,
            &config.logistic,
        )?),
        ClassifierKind::RandomForest => Box::new(RandomForest::fit(
            rows,
            labels,
            &config.forest,
            config.seed,
        )),
    };
    Ok(model)
}

#[cfg(test)]
mod tests {
    use vitalguard_data::VitalFeature;

    use super::*;
    use crate::classifier::Classifier;

    #[derive(Debug)]
    struct Fixed(ClassifierKind);

    impl Classifier for Fixed {
        fn kind(&self) -> ClassifierKind {
            self.0
        }

        fn predict_proba_row(&self, _row: &Row) -> f64 {
            0.5
        }

        fn raw_importances(&self) -> Option<Row> {
            None
        }
    }

    fn evaluated(kind: ClassifierKind, roc_auc: f64) -> Evaluated {
        Evaluated {
            model: Box::new(Fixed(kind)),
            roc_auc,
            test_proba: vec![],
        }
    }

    fn synthetic(n: u32, positive_every: u32) -> Dataset {
        let mut rows = vec![];
        let mut labels = vec![];
        for i in 0..n {
            let positive = i % positive_every == 0;
            let jitter = f64::from((i * 13) % 17) / 17.0;
            let shift = if positive { 1.0 } else { 0.0 };
            rows.push([
                80.0 + 25.0 * shift + 10.0 * jitter,
                97.0 - 6.0 * shift - 2.0 * jitter,
                16.0 + 6.0 * shift + 3.0 * jitter,
                120.0 - 15.0 * shift + 10.0 * jitter,
                80.0 - 8.0 * shift + 6.0 * jitter,
                36.8 + 1.0 * shift + 0.4 * jitter,
            ]);
            labels.push(u8::from(positive));
        }
        Dataset::from_parts(rows, labels)
    }

    #[test]
    fn test_strictly_higher_auc_wins() {
        let best = select_best([
            evaluated(ClassifierKind::LogisticRegression, 0.81),
            evaluated(ClassifierKind::RandomForest, 0.84),
        ])
        .unwrap();
        assert_eq!(best.kind(), ClassifierKind::RandomForest);
    }

    #[test]
    fn test_tie_keeps_first_candidate() {
        let best = select_best([
            evaluated(ClassifierKind::LogisticRegression, 0.9),
            evaluated(ClassifierKind::RandomForest, 0.9),
        ])
        .unwrap();
        assert_eq!(best.kind(), ClassifierKind::LogisticRegression);
        assert!(select_best(Vec::<Evaluated>::new()).is_none());
    }

    #[test]
    fn test_train_end_to_end() {
        let dataset = synthetic(400, 5);
        let outcome = train(&dataset, &TrainingConfig::default()).unwrap();

        assert_eq!(outcome.split.test, 80);
        assert_eq!(outcome.split.test_positives, 16);
        assert!((outcome.positive_class_ratio - 4.0).abs() < 1e-12);
        assert_eq!(outcome.scores.len(), 2);
        assert_eq!(outcome.scores[0].0, ClassifierKind::LogisticRegression);
        let best_auc = outcome.scores.iter().map(|s| s.1).fold(f64::MIN, f64::max);
        assert!((outcome.best.roc_auc - best_auc).abs() < 1e-15);
        assert!(outcome.best.roc_auc > 0.9);
        assert_eq!(outcome.test_proba().len(), 80);
        assert_eq!(outcome.test_labels.len(), 80);
        assert_eq!(outcome.confusion.total(), 80);

        let sum: f64 = outcome.model_weights.values().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(outcome.model_weights.values().iter().all(|&w| w >= 0.0));
        assert_eq!(outcome.scaler.mean().len(), VitalFeature::LEN);
    }

    #[test]
    fn test_train_is_deterministic() {
        let dataset = synthetic(300, 4);
        let a = train(&dataset, &TrainingConfig::default()).unwrap();
        let b = train(&dataset, &TrainingConfig::default()).unwrap();
        assert_eq!(a.scores, b.scores);
        assert_eq!(a.test_proba(), b.test_proba());
    }

    #[test]
    fn test_single_class_dataset_fails_to_split() {
        let dataset = Dataset::from_parts(vec![[1.0; 6]; 20], vec![0; 20]);
        let err = train(&dataset, &TrainingConfig::default()).unwrap_err();
        assert!(matches!(err, TrainError::Split(_)));
    }
}
