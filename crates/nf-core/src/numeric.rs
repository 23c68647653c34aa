use crate::NfError;

/// Floating point type used for edge weights and path lengths.
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, NfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(NfError::NonFinite { what, value: v })
    }
}

/// Shortest-path weights must be finite and non-negative.
pub fn ensure_weight(v: Real, what: &'static str) -> Result<Real, NfError> {
    let v = ensure_finite(v, what)?;
    if v < 0.0 {
        return Err(NfError::Negative { what, value: v });
    }
    Ok(v)
}

/// Fraction of samples in which an entity was not functional.
///
/// `functional` is clamped to `samples` so the result always lies in `[0, 1]`.
pub fn failure_fraction(functional: usize, samples: usize) -> Result<Real, NfError> {
    if samples == 0 {
        return Err(NfError::InvalidArg {
            what: "sample count must be positive",
        });
    }
    let failed = samples - functional.min(samples);
    Ok(failed as Real / samples as Real)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn failure_fraction_in_unit_interval(samples in 1_usize..10_000, functional in 0_usize..10_000) {
            let p = failure_fraction(functional, samples).unwrap();
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }
}
