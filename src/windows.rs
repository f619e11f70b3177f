use crate::error::{Error, Result};

/// Splits a sequence of `sequence_length` base pairs into windows of
/// `window_size`, returning the window boundaries.
///
/// Boundaries start at `0` and end exactly at `sequence_length`. When
/// `window_size` does not divide the sequence length the last window is
/// shorter than the others.
///
/// ```
/// use tsview::make_windows;
///
/// assert_eq!(
///     make_windows(10_000, 25_000.0).unwrap(),
///     vec![0.0, 10_000.0, 20_000.0, 25_000.0]
/// );
/// ```
pub fn make_windows(window_size: u64, sequence_length: f64) -> Result<Vec<f64>> {
    if window_size == 0 {
        return Err(Error::InvalidParameter(
            "window size must be a positive integer".into(),
        ));
    }
    if !sequence_length.is_finite() || sequence_length <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "sequence length must be positive, got {}",
            sequence_length
        )));
    }

    let step = window_size as f64;
    let mut boundaries: Vec<f64> = (0u64..)
        .map(|k| k as f64 * step)
        .take_while(|x| *x < sequence_length)
        .collect();
    boundaries.push(sequence_length);
    Ok(boundaries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_last_window() -> Result<()> {
        assert_eq!(
            make_windows(10000, 25000.0)?,
            vec![0.0, 10000.0, 20000.0, 25000.0]
        );
        Ok(())
    }

    #[test]
    fn test_exact_multiple_has_no_duplicate_boundary() -> Result<()> {
        assert_eq!(
            make_windows(10000, 30000.0)?,
            vec![0.0, 10000.0, 20000.0, 30000.0]
        );
        Ok(())
    }

    #[test]
    fn test_window_larger_than_sequence() -> Result<()> {
        assert_eq!(make_windows(500, 120.0)?, vec![0.0, 120.0]);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            make_windows(0, 100.0),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            make_windows(10, 0.0),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            make_windows(10, f64::NAN),
            Err(Error::InvalidParameter(_))
        ));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn windows_cover_sequence(window_size in 1u64..5_000, length in 1u64..200_000) {
            let length = length as f64;
            let windows = make_windows(window_size, length).unwrap();

            prop_assert_eq!(windows[0], 0.0);
            prop_assert_eq!(*windows.last().unwrap(), length);
            prop_assert!(windows.windows(2).all(|w| w[0] < w[1]));

            let gaps: Vec<f64> = windows.windows(2).map(|w| w[1] - w[0]).collect();
            let (last, interior) = gaps.split_last().unwrap();
            prop_assert!(interior.iter().all(|g| *g == window_size as f64));
            prop_assert!(*last <= window_size as f64);
        }
    }
}
