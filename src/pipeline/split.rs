//! Seeded train/test split.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::domain::PipelineError;

/// Shuffle `samples` with a seeded RNG and split off a test set.
///
/// The test set takes the first `ceil(n * test_fraction)` entries of the
/// shuffled order, the rest is the training set. The same seed and input
/// always produce the same partition.
///
/// # Errors
/// Returns `InvalidParameter` if `test_fraction` is not in (0, 1) and
/// `EmptyInput` if either side of the split would be empty.
pub fn train_test_split<T>(
    mut samples: Vec<T>,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<T>, Vec<T>), PipelineError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::InvalidParameter(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let total = samples.len();
    let n_test = ((total as f64) * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= total {
        return Err(PipelineError::EmptyInput(
            "not enough samples for a train/test split",
        ));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let train = samples.split_off(n_test);
    let test = samples;

    tracing::debug!(
        "Dataset split (seed {}): {} training, {} test",
        seed,
        train.len(),
        test.len()
    );

    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let (train, test) = train_test_split((0..10).collect::<Vec<u32>>(), 0.3, 42).expect("Should split");
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 7);

        // ceil: 0.3 * 11 = 3.3 -> 4
        let (train, test) = train_test_split((0..11).collect::<Vec<_>>(), 0.3, 42).expect("Should split");
        assert_eq!(test.len(), 4);
        assert_eq!(train.len(), 7);
    }

    #[test]
    fn test_split_is_a_partition() {
        let (train, test) = train_test_split((0..50).collect::<Vec<u32>>(), 0.3, 7).expect("Should split");
        let mut all: Vec<u32> = train.into_iter().chain(test).collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = train_test_split((0..40).collect::<Vec<u32>>(), 0.3, 42).expect("split");
        let b = train_test_split((0..40).collect::<Vec<u32>>(), 0.3, 42).expect("split");
        assert_eq!(a, b);

        let c = train_test_split((0..40).collect::<Vec<u32>>(), 0.3, 43).expect("split");
        assert_ne!(a.1, c.1);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            train_test_split((0..10).collect::<Vec<u32>>(), 0.0, 1),
            Err(PipelineError::InvalidParameter(_))
        ));
        assert!(matches!(
            train_test_split((0..10).collect::<Vec<u32>>(), 1.0, 1),
            Err(PipelineError::InvalidParameter(_))
        ));
        assert!(matches!(
            train_test_split(vec![1u32], 0.3, 1),
            Err(PipelineError::EmptyInput(_))
        ));
    }
}
