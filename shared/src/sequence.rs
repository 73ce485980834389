//! Count/sequence lockstep helpers
//!
//! Variable-length records store `Option<Vec<T>>` where `None` is the only
//! representation of zero elements. The count exposed on the wire is always
//! derived from the stored sequence.

use serde::{Deserialize, Deserializer};

use crate::error::ModelError;

/// Normalize an owned sequence: empty becomes absent.
pub(crate) fn from_vec<T>(items: Vec<T>) -> Option<Vec<T>> {
    debug_assert!(
        items.len() <= i32::MAX as usize,
        "sequence length exceeds the i32 wire count"
    );
    if items.is_empty() { None } else { Some(items) }
}

/// Validate a raw (count, sequence) pair.
pub(crate) fn from_raw_parts<T>(
    field: &'static str,
    count: i32,
    items: Option<Vec<T>>,
) -> Result<Option<Vec<T>>, ModelError> {
    match items {
        None if count == 0 => Ok(None),
        None => Err(ModelError::CountMismatch {
            field,
            count,
            len: 0,
        }),
        Some(items) if items.is_empty() => Err(ModelError::EmptyAllocation { field }),
        Some(items) if usize::try_from(count).ok() == Some(items.len()) => Ok(Some(items)),
        Some(items) => Err(ModelError::CountMismatch {
            field,
            count,
            len: items.len(),
        }),
    }
}

/// Serde hook for sequence fields: an empty or missing sequence is absent.
pub(crate) fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.and_then(from_vec))
}

/// Whether a stored sequence uses the only allowed zero representation.
pub(crate) fn is_canonical<T>(items: &Option<Vec<T>>) -> bool {
    !matches!(items, Some(items) if items.is_empty())
}

/// Wire count for a stored sequence.
pub(crate) fn count<T>(items: &Option<Vec<T>>) -> i32 {
    items.as_ref().map_or(0, |items| items.len() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Canonical form
    // ========================================================================

    #[test]
    fn test_present_empty_is_not_canonical() {
        assert!(is_canonical::<u8>(&None));
        assert!(is_canonical(&Some(vec![1u8])));
        assert!(!is_canonical::<u8>(&Some(Vec::new())));
    }

    #[test]
    fn test_empty_vec_is_absent() {
        assert_eq!(from_vec::<u8>(Vec::new()), None);
        assert_eq!(from_vec(vec![1u8]), Some(vec![1u8]));
    }

    #[test]
    fn test_raw_parts_accepts_matching_pairs() {
        assert_eq!(from_raw_parts::<u8>("keys", 0, None), Ok(None));
        assert_eq!(
            from_raw_parts("keys", 2, Some(vec![1u8, 2])),
            Ok(Some(vec![1u8, 2]))
        );
    }

    #[test]
    fn test_raw_parts_rejects_drift() {
        assert_eq!(
            from_raw_parts::<u8>("keys", 3, None),
            Err(ModelError::CountMismatch {
                field: "keys",
                count: 3,
                len: 0
            })
        );
        assert_eq!(
            from_raw_parts("keys", 1, Some(vec![1u8, 2])),
            Err(ModelError::CountMismatch {
                field: "keys",
                count: 1,
                len: 2
            })
        );
        assert_eq!(
            from_raw_parts("keys", -2, Some(vec![1u8, 2])),
            Err(ModelError::CountMismatch {
                field: "keys",
                count: -2,
                len: 2
            })
        );
    }

    #[test]
    fn test_raw_parts_rejects_zero_length_allocation() {
        assert_eq!(
            from_raw_parts::<u8>("keys", 0, Some(Vec::new())),
            Err(ModelError::EmptyAllocation { field: "keys" })
        );
    }
}
