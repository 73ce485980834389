//! Curve and gradient extraction
//!
//! Both extractors are pure functions of an [`AuthoringSource`] and a base
//! path. The first missing or mistyped property aborts extraction.

use crate::authoring::AuthoringSource;
use crate::error::ExtractError;
use crate::schema::PropertyPath;

mod curve;
mod gradient;

pub use curve::extract_curve;
pub use gradient::extract_gradient;

/// Read a sequence length and check it against `0..=max`.
fn read_count<S: AuthoringSource + ?Sized>(
    source: &S,
    path: &PropertyPath,
    max: i32,
) -> Result<usize, ExtractError> {
    let count = source.read_i32(path)?;
    if !(0..=max).contains(&count) {
        return Err(ExtractError::CountMismatch {
            path: path.to_string(),
            count,
            max,
        });
    }
    // 0..=max with max <= i32::MAX always fits
    Ok(count as usize)
}
