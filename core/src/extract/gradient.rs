//! Min/max gradient extraction

use fxbridge_shared::{
    AlphaKey, ColorKey, Gradient, MAX_GRADIENT_KEYS, MinMaxGradientState, SubGradient,
};
use tracing::warn;

use super::read_count;
use crate::authoring::AuthoringSource;
use crate::error::ExtractError;
use crate::schema::{Bound, GradientPath};

/// Read the gradient rooted at `path`.
///
/// Color and alpha key counts are independent; each is capped at
/// [`MAX_GRADIENT_KEYS`].
pub fn extract_gradient<S: AuthoringSource + ?Sized>(
    source: &S,
    path: &GradientPath,
) -> Result<Gradient, ExtractError> {
    let min_color = source.read_i32(&path.min_color())?;
    let max_color = source.read_i32(&path.max_color())?;
    let min_max_state = source.read_i32(&path.min_max_state())?;
    if MinMaxGradientState::from_code(min_max_state).is_none() {
        warn!(gradient = path.base(), code = min_max_state, "unknown gradient mode");
    }

    let max_gradient = extract_sub_gradient(source, path, Bound::Max)?;
    let min_gradient = extract_sub_gradient(source, path, Bound::Min)?;

    Ok(Gradient {
        max_gradient,
        min_gradient,
        min_color,
        max_color,
        min_max_state,
    })
}

fn extract_sub_gradient<S: AuthoringSource + ?Sized>(
    source: &S,
    path: &GradientPath,
    bound: Bound,
) -> Result<SubGradient, ExtractError> {
    let color_count = read_count(source, &path.color_key_count(bound), MAX_GRADIENT_KEYS)?;
    let alpha_count = read_count(source, &path.alpha_key_count(bound), MAX_GRADIENT_KEYS)?;

    let color_keys = (0..color_count)
        .map(|i| {
            Ok(ColorKey {
                color: source.read_i32(&path.color(bound, i))?,
                time: source.read_i32(&path.color_time(bound, i))?,
            })
        })
        .collect::<Result<Vec<_>, ExtractError>>()?;

    let alpha_keys = (0..alpha_count)
        .map(|i| {
            Ok(AlphaKey {
                alpha: source.read_i32(&path.alpha(bound, i))?,
                time: source.read_i32(&path.alpha_time(bound, i))?,
            })
        })
        .collect::<Result<Vec<_>, ExtractError>>()?;

    Ok(SubGradient::new(color_keys, alpha_keys))
}
