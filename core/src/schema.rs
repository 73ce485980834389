//! Authoring property schema
//!
//! Every property path the extractors read is produced here. The mapping
//! from logical field to path string is versioned as a unit by
//! [`SCHEMA_VERSION`]; a source that declares a different version is
//! rejected before any field is read.
//!
//! Paths follow the authoring serializer's naming: nested records are
//! joined with `.`, array elements use `Array.data[i]`.

use std::fmt;

use crate::authoring::PropertyKind;

/// Version of the path mapping below.
pub const SCHEMA_VERSION: u32 = 1;

/// A fully qualified authoring property path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyPath(String);

impl PropertyPath {
    fn new(path: String) -> Self {
        Self(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PropertyPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Which half of a min/max pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bound {
    Max,
    Min,
}

impl Bound {
    /// Extraction order: max first, then min.
    pub const ALL: [Bound; 2] = [Bound::Max, Bound::Min];

    fn curve_prefix(self) -> &'static str {
        match self {
            Bound::Max => "maxCurve",
            Bound::Min => "minCurve",
        }
    }

    fn gradient_prefix(self) -> &'static str {
        match self {
            Bound::Max => "maxGradient",
            Bound::Min => "minGradient",
        }
    }
}

/// One field of a serialized keyframe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyFrameField {
    Time,
    Value,
    InSlope,
    OutSlope,
}

impl KeyFrameField {
    fn name(self) -> &'static str {
        match self {
            KeyFrameField::Time => "time",
            KeyFrameField::Value => "value",
            KeyFrameField::InSlope => "inSlope",
            KeyFrameField::OutSlope => "outSlope",
        }
    }
}

// ============================================================================
// Curves
// ============================================================================

/// Paths under one min/max curve property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurvePath {
    base: String,
}

impl CurvePath {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn join(&self, suffix: fmt::Arguments<'_>) -> PropertyPath {
        PropertyPath::new(format!("{}.{}", self.base, suffix))
    }

    pub fn scalar(&self) -> PropertyPath {
        self.join(format_args!("scalar"))
    }

    pub fn min_max_state(&self) -> PropertyPath {
        self.join(format_args!("minMaxState"))
    }

    pub fn key_count(&self, bound: Bound) -> PropertyPath {
        self.join(format_args!("{}.m_Curve.Array.size", bound.curve_prefix()))
    }

    pub fn key_field(&self, bound: Bound, index: usize, field: KeyFrameField) -> PropertyPath {
        self.join(format_args!(
            "{}.m_Curve.Array.data[{}].{}",
            bound.curve_prefix(),
            index,
            field.name()
        ))
    }

    pub fn pre_infinity(&self, bound: Bound) -> PropertyPath {
        self.join(format_args!("{}.m_PreInfinity", bound.curve_prefix()))
    }

    pub fn post_infinity(&self, bound: Bound) -> PropertyPath {
        self.join(format_args!("{}.m_PostInfinity", bound.curve_prefix()))
    }
}

// ============================================================================
// Gradients
// ============================================================================

/// Paths under one min/max gradient property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GradientPath {
    base: String,
}

impl GradientPath {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn join(&self, suffix: fmt::Arguments<'_>) -> PropertyPath {
        PropertyPath::new(format!("{}.{}", self.base, suffix))
    }

    pub fn min_color(&self) -> PropertyPath {
        self.join(format_args!("minColor.rgba"))
    }

    pub fn max_color(&self) -> PropertyPath {
        self.join(format_args!("maxColor.rgba"))
    }

    pub fn min_max_state(&self) -> PropertyPath {
        self.join(format_args!("minMaxState"))
    }

    pub fn color_key_count(&self, bound: Bound) -> PropertyPath {
        self.join(format_args!("{}.m_NumColorKeys", bound.gradient_prefix()))
    }

    pub fn alpha_key_count(&self, bound: Bound) -> PropertyPath {
        self.join(format_args!("{}.m_NumAlphaKeys", bound.gradient_prefix()))
    }

    /// Packed RGBA of color key `index`.
    pub fn color(&self, bound: Bound, index: usize) -> PropertyPath {
        self.join(format_args!("{}.key{}.rgba", bound.gradient_prefix(), index))
    }

    pub fn color_time(&self, bound: Bound, index: usize) -> PropertyPath {
        self.join(format_args!("{}.ctime{}", bound.gradient_prefix(), index))
    }

    /// Alpha byte of key `index`, read from its own field.
    pub fn alpha(&self, bound: Bound, index: usize) -> PropertyPath {
        self.join(format_args!("{}.key{}.a", bound.gradient_prefix(), index))
    }

    pub fn alpha_time(&self, bound: Bound, index: usize) -> PropertyPath {
        self.join(format_args!("{}.atime{}", bound.gradient_prefix(), index))
    }
}

// ============================================================================
// Emitter fields
// ============================================================================

/// Top-level emitter scalars, in wire order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmitterField {
    Looping,
    Prewarm,
    RandomSeed,
    PlayOnAwake,
    StartDelay,
    Speed,
    LengthInSec,
    /// Authoring "move with transform"; becomes `use_local_space`.
    MoveWithTransform,
    MaxNumParticles,
    EmissionRate,
}

impl EmitterField {
    pub const ALL: [EmitterField; 10] = [
        EmitterField::Looping,
        EmitterField::Prewarm,
        EmitterField::RandomSeed,
        EmitterField::PlayOnAwake,
        EmitterField::StartDelay,
        EmitterField::Speed,
        EmitterField::LengthInSec,
        EmitterField::MoveWithTransform,
        EmitterField::MaxNumParticles,
        EmitterField::EmissionRate,
    ];

    pub fn path(self) -> PropertyPath {
        let path = match self {
            EmitterField::Looping => "looping",
            EmitterField::Prewarm => "prewarm",
            EmitterField::RandomSeed => "randomSeed",
            EmitterField::PlayOnAwake => "playOnAwake",
            EmitterField::StartDelay => "startDelay",
            EmitterField::Speed => "speed",
            EmitterField::LengthInSec => "lengthInSec",
            EmitterField::MoveWithTransform => "moveWithTransform",
            EmitterField::MaxNumParticles => "InitialModule.maxNumParticles",
            EmitterField::EmissionRate => "EmissionModule.rate.scalar",
        };
        PropertyPath::new(path.to_owned())
    }

    pub fn field_type(self) -> PropertyKind {
        match self {
            EmitterField::Looping
            | EmitterField::Prewarm
            | EmitterField::PlayOnAwake
            | EmitterField::MoveWithTransform => PropertyKind::Bool,
            EmitterField::RandomSeed | EmitterField::MaxNumParticles => PropertyKind::Int,
            EmitterField::StartDelay
            | EmitterField::Speed
            | EmitterField::LengthInSec
            | EmitterField::EmissionRate => PropertyKind::Float,
        }
    }
}

/// Curve-valued emitter properties.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurveProperty {
    StartLifetime,
    StartSpeed,
    StartSize,
    StartRotation,
    RotationOverLifetime,
    SizeOverLifetime,
}

impl CurveProperty {
    pub fn path(self) -> CurvePath {
        CurvePath::new(match self {
            CurveProperty::StartLifetime => "InitialModule.startLifetime",
            CurveProperty::StartSpeed => "InitialModule.startSpeed",
            CurveProperty::StartSize => "InitialModule.startSize",
            CurveProperty::StartRotation => "InitialModule.startRotation",
            CurveProperty::RotationOverLifetime => "RotationModule.curve",
            CurveProperty::SizeOverLifetime => "SizeModule.curve",
        })
    }
}

/// Module enable flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModuleFlag {
    Rotation,
    Size,
    Shape,
    Color,
}

impl ModuleFlag {
    pub fn path(self) -> PropertyPath {
        let module = match self {
            ModuleFlag::Rotation => "RotationModule",
            ModuleFlag::Size => "SizeModule",
            ModuleFlag::Shape => "ShapeModule",
            ModuleFlag::Color => "ColorModule",
        };
        PropertyPath::new(format!("{module}.enabled"))
    }
}

/// Shape module fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeField {
    Type,
    Radius,
    Length,
    Angle,
    BoxX,
    BoxY,
    BoxZ,
    RandomDirection,
}

impl ShapeField {
    pub fn path(self) -> PropertyPath {
        let field = match self {
            ShapeField::Type => "type",
            ShapeField::Radius => "radius",
            ShapeField::Length => "length",
            ShapeField::Angle => "angle",
            ShapeField::BoxX => "boxX",
            ShapeField::BoxY => "boxY",
            ShapeField::BoxZ => "boxZ",
            ShapeField::RandomDirection => "randomDirection",
        };
        PropertyPath::new(format!("ShapeModule.{field}"))
    }

    pub fn field_type(self) -> PropertyKind {
        match self {
            ShapeField::Type => PropertyKind::Int,
            ShapeField::RandomDirection => PropertyKind::Bool,
            _ => PropertyKind::Float,
        }
    }
}

/// The color-over-lifetime gradient.
pub fn color_gradient() -> GradientPath {
    GradientPath::new("ColorModule.gradient")
}
