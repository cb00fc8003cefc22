//! Seeded, label-stratified train/test partitioning.
//!
//! The test set size is `ceil(test_ratio * n)`. Test slots are shared between the
//! two classes in proportion to their sizes; slots left over after flooring go to
//! the class with the larger fractional share (the negative class on a tie). Each
//! class is shuffled independently with a [`Pcg64`] seeded from the caller's seed,
//! so the same labels and seed always yield the same partition.

use rand::{SeedableRng as _, seq::SliceRandom as _};
use rand_pcg::Pcg64;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SplitError {
    #[display("stratified split needs both classes, but only label {present} is present")]
    SingleClass { present: u8 },
    #[display(
        "the least populated class (label {label}) has only {count} member(s); at least 2 are required"
    )]
    TooFewMembers { label: u8, count: usize },
    #[display(
        "split of {total} rows into {train} train / {test} test rows leaves a side smaller than the number of classes"
    )]
    TooSmall {
        total: usize,
        train: usize,
        test: usize,
    },
}

/// Row indices of the two sides of a split, each in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

const NUM_CLASSES: usize = 2;

/// Partitions rows into train and test sets, preserving the label proportions.
///
/// # Examples
///
/// ```
/// use vitalguard_data::split::stratified_split;
///
/// let mut labels = vec![0; 40];
/// labels.extend([1; 10]);
/// let split = stratified_split(&labels, 0.2, 42).unwrap();
/// assert_eq!(split.test.len(), 10);
/// assert_eq!(split.test.iter().filter(|&&i| labels[i] == 1).count(), 2);
/// ```
///
/// # Panics
///
/// Panics if `test_ratio` is outside `(0, 1)` or a label is neither 0 nor 1.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn stratified_split(
    labels: &[u8],
    test_ratio: f64,
    seed: u64,
) -> Result<TrainTestSplit, SplitError> {
    assert!(
        test_ratio > 0.0 && test_ratio < 1.0,
        "test_ratio must be in (0, 1)"
    );

    let mut by_class: [Vec<usize>; NUM_CLASSES] = [vec![], vec![]];
    for (i, &label) in labels.iter().enumerate() {
        by_class[usize::from(label)].push(i);
    }

    match (by_class[0].is_empty(), by_class[1].is_empty()) {
        (true, true) => {
            return Err(SplitError::TooSmall {
                total: 0,
                train: 0,
                test: 0,
            });
        }
        (false, true) => return Err(SplitError::SingleClass { present: 0 }),
        (true, false) => return Err(SplitError::SingleClass { present: 1 }),
        (false, false) => {}
    }
    for (label, members) in (0u8..).zip(&by_class) {
        if members.len() < 2 {
            return Err(SplitError::TooFewMembers {
                label,
                count: members.len(),
            });
        }
    }

    let total = labels.len();
    let n_test = (test_ratio * total as f64).ceil() as usize;
    let n_train = total - n_test;
    if n_test < NUM_CLASSES || n_train < NUM_CLASSES {
        return Err(SplitError::TooSmall {
            total,
            train: n_train,
            test: n_test,
        });
    }

    let test_counts = allocate(n_test, &[by_class[0].len(), by_class[1].len()]);
    log::debug!(
        "stratified split: {total} rows -> {n_train} train / {n_test} test (test per class: {test_counts:?})"
    );

    let mut rng = Pcg64::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n_train);
    let mut test = Vec::with_capacity(n_test);
    for (members, &n_class_test) in by_class.iter_mut().zip(&test_counts) {
        members.shuffle(&mut rng);
        let (class_test, class_train) = members.split_at(n_class_test);
        test.extend_from_slice(class_test);
        train.extend_from_slice(class_train);
    }
    train.sort_unstable();
    test.sort_unstable();

    Ok(TrainTestSplit { train, test })
}

/// Shares `n` slots between classes proportionally to `class_sizes`.
///
/// Each class keeps at least one member on the training side.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn allocate(n: usize, class_sizes: &[usize; NUM_CLASSES]) -> [usize; NUM_CLASSES] {
    let total = class_sizes.iter().sum::<usize>() as f64;
    let exact = class_sizes.map(|size| n as f64 * size as f64 / total);
    let mut counts = exact.map(|e| e.floor() as usize);

    let mut remaining = n - counts.iter().sum::<usize>();
    let mut order = [0, 1];
    order.sort_by(|&a, &b| {
        let frac_a = exact[a] - exact[a].floor();
        let frac_b = exact[b] - exact[b].floor();
        frac_b.total_cmp(&frac_a).then(a.cmp(&b))
    });
    for &class in order.iter().cycle() {
        if remaining == 0 {
            break;
        }
        if counts[class] + 1 < class_sizes[class] {
            counts[class] += 1;
            remaining -= 1;
        } else if counts.iter().zip(class_sizes).all(|(c, s)| c + 1 >= *s) {
            break;
        }
    }

    for (count, size) in counts.iter_mut().zip(class_sizes) {
        *count = (*count).min(size - 1);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(negatives: usize, positives: usize) -> Vec<u8> {
        let mut labels = vec![0; negatives];
        labels.extend(vec![1; positives]);
        labels
    }

    #[test]
    fn test_preserves_class_proportions() {
        let labels = labels(850, 150);
        let split = stratified_split(&labels, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 200);
        assert_eq!(split.train.len(), 800);
        let test_pos = split.test.iter().filter(|&&i| labels[i] == 1).count();
        assert_eq!(test_pos, 30);
    }

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        let labels = labels(37, 11);
        let split = stratified_split(&labels, 0.2, 7).unwrap();
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..labels.len()).collect::<Vec<_>>());
        assert_eq!(split.test.len(), 10);
    }

    #[test]
    fn test_same_seed_same_split() {
        let labels = labels(500, 80);
        let a = stratified_split(&labels, 0.2, 42).unwrap();
        let b = stratified_split(&labels, 0.2, 42).unwrap();
        assert_eq!(a, b);

        let c = stratified_split(&labels, 0.2, 43).unwrap();
        assert_ne!(a.test, c.test);
    }

    #[test]
    fn test_single_class_is_rejected() {
        let err = stratified_split(&labels(10, 0), 0.2, 42).unwrap_err();
        assert_eq!(err, SplitError::SingleClass { present: 0 });
    }

    #[test]
    fn test_singleton_class_is_rejected() {
        let err = stratified_split(&labels(10, 1), 0.2, 42).unwrap_err();
        assert_eq!(err, SplitError::TooFewMembers { label: 1, count: 1 });
    }

    #[test]
    fn test_tiny_dataset_is_rejected() {
        let err = stratified_split(&labels(2, 2), 0.2, 42).unwrap_err();
        assert!(matches!(err, SplitError::TooSmall { test: 1, .. }));
    }

    #[test]
    fn test_allocation_keeps_train_members() {
        assert_eq!(allocate(2, &[2, 2]), [1, 1]);
        assert_eq!(allocate(200, &[850, 150]), [170, 30]);
        let counts = allocate(3, &[5, 2]);
        assert_eq!(counts.iter().sum::<usize>(), 3);
        assert!(counts[1] < 2);
    }
}
