//! Flat property map loaded from an authoring export

use std::path::Path;

use anyhow::{Context, Result, bail};
use hashbrown::HashMap;
use serde_json::Value;

use fxbridge_shared::{Curve, Gradient, SubCurve, SubGradient};

use super::{AuthoringSource, PropertyValue};
use crate::error::ExtractError;
use crate::schema::{Bound, CurvePath, GradientPath, KeyFrameField, PropertyPath};

/// Top-level key carrying the export's schema version.
const SCHEMA_VERSION_KEY: &str = "schemaVersion";

/// In-memory authoring source keyed by full property path.
///
/// JSON exports are flattened on load: nested objects join their keys with
/// `.` and arrays become `name[i]`, so
/// `{"maxCurve": {"m_Curve": {"Array": {"data": [{"time": 0}]}}}}` yields
/// `maxCurve.m_Curve.Array.data[0].time`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyTree {
    values: HashMap<String, PropertyValue>,
    schema_version: Option<u32>,
}

impl PropertyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and flatten a JSON export from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read authoring export {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Failed to parse authoring export {}", path.display()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text).context("Invalid JSON")?;
        Self::from_json(&root)
    }

    pub fn from_json(root: &Value) -> Result<Self> {
        let Value::Object(map) = root else {
            bail!("authoring export must be a JSON object");
        };

        let mut tree = Self::new();
        for (key, value) in map {
            if key == SCHEMA_VERSION_KEY {
                let version = value
                    .as_u64()
                    .and_then(|v| u32::try_from(v).ok())
                    .with_context(|| format!("{SCHEMA_VERSION_KEY} must be a non-negative integer"))?;
                tree.schema_version = Some(version);
                continue;
            }
            tree.flatten(key.clone(), value)?;
        }
        Ok(tree)
    }

    fn flatten(&mut self, prefix: String, value: &Value) -> Result<()> {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    self.flatten(format!("{prefix}.{key}"), child)?;
                }
            }
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    self.flatten(format!("{prefix}[{i}]"), child)?;
                }
            }
            Value::Bool(b) => {
                self.values.insert(prefix, PropertyValue::Bool(*b));
            }
            Value::Number(n) => {
                let stored = if let Some(i) = n.as_i64() {
                    PropertyValue::Int(int_code(&prefix, i.into())?)
                } else if let Some(u) = n.as_u64() {
                    PropertyValue::Int(int_code(&prefix, u.into())?)
                } else {
                    match n.as_f64() {
                        Some(f) => PropertyValue::Float(f as f32),
                        None => bail!("{prefix}: number out of range"),
                    }
                };
                self.values.insert(prefix, stored);
            }
            Value::Null | Value::String(_) => {
                bail!("{prefix}: unsupported property value {value}");
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn set_schema_version(&mut self, version: Option<u32>) {
        self.schema_version = version;
    }

    pub fn get(&self, path: &str) -> Option<PropertyValue> {
        self.values.get(path).copied()
    }

    pub fn set(&mut self, path: &PropertyPath, value: impl Into<PropertyValue>) -> &mut Self {
        self.values.insert(path.as_str().to_owned(), value.into());
        self
    }

    pub fn remove(&mut self, path: &PropertyPath) -> Option<PropertyValue> {
        self.values.remove(path.as_str())
    }

    /// Write every property of `curve` under `path`.
    pub fn set_curve(&mut self, path: &CurvePath, curve: &Curve) -> &mut Self {
        self.set(&path.scalar(), curve.scalar);
        self.set(&path.min_max_state(), curve.min_max_state);
        for bound in Bound::ALL {
            let sub = match bound {
                Bound::Max => &curve.max_curve,
                Bound::Min => &curve.min_curve,
            };
            self.set_sub_curve(path, bound, sub);
        }
        self
    }

    fn set_sub_curve(&mut self, path: &CurvePath, bound: Bound, sub: &SubCurve) {
        self.set(&path.key_count(bound), sub.key_frame_count());
        for (i, key) in sub.key_frames().unwrap_or_default().iter().enumerate() {
            self.set(&path.key_field(bound, i, KeyFrameField::Time), key.time);
            self.set(&path.key_field(bound, i, KeyFrameField::Value), key.value);
            self.set(&path.key_field(bound, i, KeyFrameField::InSlope), key.in_slope);
            self.set(&path.key_field(bound, i, KeyFrameField::OutSlope), key.out_slope);
        }
        self.set(&path.pre_infinity(bound), sub.pre_infinity);
        self.set(&path.post_infinity(bound), sub.post_infinity);
    }

    /// Write every property of `gradient` under `path`.
    pub fn set_gradient(&mut self, path: &GradientPath, gradient: &Gradient) -> &mut Self {
        self.set(&path.min_color(), gradient.min_color);
        self.set(&path.max_color(), gradient.max_color);
        self.set(&path.min_max_state(), gradient.min_max_state);
        for bound in Bound::ALL {
            let sub = match bound {
                Bound::Max => &gradient.max_gradient,
                Bound::Min => &gradient.min_gradient,
            };
            self.set_sub_gradient(path, bound, sub);
        }
        self
    }

    fn set_sub_gradient(&mut self, path: &GradientPath, bound: Bound, sub: &SubGradient) {
        self.set(&path.color_key_count(bound), sub.color_key_count());
        self.set(&path.alpha_key_count(bound), sub.alpha_key_count());
        for (i, key) in sub.color_keys().unwrap_or_default().iter().enumerate() {
            self.set(&path.color(bound, i), key.color);
            self.set(&path.color_time(bound, i), key.time);
        }
        for (i, key) in sub.alpha_keys().unwrap_or_default().iter().enumerate() {
            self.set(&path.alpha(bound, i), key.alpha);
            self.set(&path.alpha_time(bound, i), key.time);
        }
    }
}

/// Integers become 32-bit wire codes. Values above `i32::MAX` up to
/// `u32::MAX` (unsigned packed colors, seeds) keep their bit pattern.
fn int_code(path: &str, value: i128) -> Result<i32> {
    if let Ok(i) = i32::try_from(value) {
        return Ok(i);
    }
    match u32::try_from(value) {
        Ok(u) => Ok(u as i32),
        Err(_) => bail!("{path}: integer {value} does not fit in 32 bits"),
    }
}

impl AuthoringSource for PropertyTree {
    fn read(&self, path: &PropertyPath) -> Result<PropertyValue, ExtractError> {
        self.get(path.as_str())
            .ok_or_else(|| ExtractError::PropertyNotFound {
                path: path.to_string(),
            })
    }

    fn schema_version(&self) -> Option<u32> {
        self.schema_version
    }
}
