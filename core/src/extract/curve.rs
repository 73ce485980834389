//! Min/max curve extraction

use fxbridge_shared::{Curve, KeyFrame, MAX_CURVE_KEYS, MinMaxCurveState, SubCurve, WrapMode};
use tracing::warn;

use super::read_count;
use crate::authoring::AuthoringSource;
use crate::error::ExtractError;
use crate::schema::{Bound, CurvePath, KeyFrameField};

/// Read the curve rooted at `path`.
///
/// Unknown mode codes are kept as-is (the native side owns their meaning)
/// and logged.
pub fn extract_curve<S: AuthoringSource + ?Sized>(
    source: &S,
    path: &CurvePath,
) -> Result<Curve, ExtractError> {
    let scalar = source.read_f32(&path.scalar())?;
    let min_max_state = source.read_i32(&path.min_max_state())?;
    if MinMaxCurveState::from_code(min_max_state).is_none() {
        warn!(curve = path.base(), code = min_max_state, "unknown curve mode");
    }

    let max_curve = extract_sub_curve(source, path, Bound::Max)?;
    let min_curve = extract_sub_curve(source, path, Bound::Min)?;

    Ok(Curve {
        min_max_state,
        scalar,
        min_curve,
        max_curve,
    })
}

fn extract_sub_curve<S: AuthoringSource + ?Sized>(
    source: &S,
    path: &CurvePath,
    bound: Bound,
) -> Result<SubCurve, ExtractError> {
    let count = read_count(source, &path.key_count(bound), MAX_CURVE_KEYS)?;

    let key_frames = (0..count)
        .map(|i| {
            let field = |f| source.read_f32(&path.key_field(bound, i, f));
            Ok(KeyFrame::new(
                field(KeyFrameField::Time)?,
                field(KeyFrameField::Value)?,
                field(KeyFrameField::InSlope)?,
                field(KeyFrameField::OutSlope)?,
            ))
        })
        .collect::<Result<Vec<_>, ExtractError>>()?;

    let pre_infinity = source.read_i32(&path.pre_infinity(bound))?;
    let post_infinity = source.read_i32(&path.post_infinity(bound))?;
    for code in [pre_infinity, post_infinity] {
        if WrapMode::from_code(code).is_none() {
            warn!(curve = path.base(), ?bound, code, "unknown wrap mode");
        }
    }

    Ok(SubCurve::new(key_frames, pre_infinity, post_infinity))
}
