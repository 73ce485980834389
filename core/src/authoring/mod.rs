//! Authoring-side property access
//!
//! The extractors never see the authoring tool's object model. They read
//! typed values by [`PropertyPath`] through [`AuthoringSource`], which an
//! editor integration or an exported property dump implements.

use std::fmt;

use crate::error::ExtractError;
use crate::schema::PropertyPath;

mod tree;


pub use tree::PropertyTree;

/// Value type of a stored property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Bool,
    Int,
    Float,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PropertyKind::Bool => "bool",
            PropertyKind::Int => "int",
            PropertyKind::Float => "float",
        })
    }
}

/// A single authoring property value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i32),
    Float(f32),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::Int(_) => PropertyKind::Int,
            PropertyValue::Float(_) => PropertyKind::Float,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<f32> for PropertyValue {
    fn from(v: f32) -> Self {
        PropertyValue::Float(v)
    }
}

/// Read-only, typed view of one emitter's authoring properties.
///
/// Implementors provide [`AuthoringSource::read`]; the typed accessors
/// perform the kind checks. Integer properties may be read as floats
/// (serialized exports do not distinguish `1` from `1.0`), never the
/// reverse.
pub trait AuthoringSource {
    /// Raw lookup. Missing paths are [`ExtractError::PropertyNotFound`].
    fn read(&self, path: &PropertyPath) -> Result<PropertyValue, ExtractError>;

    /// Schema version the source was exported with, if it declares one.
    fn schema_version(&self) -> Option<u32> {
        None
    }

    fn read_i32(&self, path: &PropertyPath) -> Result<i32, ExtractError> {
        match self.read(path)? {
            PropertyValue::Int(v) => Ok(v),
            other => Err(mismatch(path, PropertyKind::Int, other)),
        }
    }

    fn read_f32(&self, path: &PropertyPath) -> Result<f32, ExtractError> {
        match self.read(path)? {
            PropertyValue::Float(v) => Ok(v),
            PropertyValue::Int(v) => Ok(v as f32),
            other => Err(mismatch(path, PropertyKind::Float, other)),
        }
    }

    fn read_bool(&self, path: &PropertyPath) -> Result<bool, ExtractError> {
        match self.read(path)? {
            PropertyValue::Bool(v) => Ok(v),
            other => Err(mismatch(path, PropertyKind::Bool, other)),
        }
    }
}

fn mismatch(path: &PropertyPath, expected: PropertyKind, found: PropertyValue) -> ExtractError {
    ExtractError::TypeMismatch {
        path: path.to_string(),
        expected,
        found: found.kind(),
    }
}

impl<S: AuthoringSource + ?Sized> AuthoringSource for &S {
    fn read(&self, path: &PropertyPath) -> Result<PropertyValue, ExtractError> {
        (**self).read(path)
    }

    fn schema_version(&self) -> Option<u32> {
        (**self).schema_version()
    }
}
