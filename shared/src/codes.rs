//! Typed views over the integer codes understood by the native engine
//!
//! The flattened records always store the raw `i32` so that codes unknown to
//! this crate still reach the engine untouched. These enums exist for logging,
//! tools and tests.

macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl $name {
            /// Map a raw code to its variant, `None` for codes this crate does not know.
            pub fn from_code(code: i32) -> Option<Self> {
                match code {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Raw code as stored in the flattened record.
            pub const fn code(self) -> i32 {
                self as i32
            }
        }
    };
}

code_enum! {
    /// How `scalar`, `min_curve` and `max_curve` of a curve combine.
    pub enum MinMaxCurveState {
        Scalar = 0,
        Curve = 1,
        TwoCurves = 2,
        TwoConstants = 3,
    }
}

impl MinMaxCurveState {
    /// Whether the engine samples between the min and max sub-curves.
    pub fn uses_min_max(self) -> bool {
        matches!(self, Self::TwoCurves | Self::TwoConstants)
    }
}

code_enum! {
    /// How the colors and sub-gradients of a gradient combine.
    pub enum MinMaxGradientState {
        Color = 0,
        Gradient = 1,
        RandomBetweenTwoColors = 2,
        RandomBetweenTwoGradients = 3,
    }
}

code_enum! {
    /// Extrapolation applied before the first / after the last keyframe.
    pub enum WrapMode {
        PingPong = 0,
        Repeat = 1,
        Clamp = 2,
    }
}

code_enum! {
    /// Emitter volume used by the shape module.
    pub enum ShapeType {
        Sphere = 0,
        SphereShell = 1,
        HemiSphere = 2,
        HemiSphereShell = 3,
        Cone = 4,
        Box = 5,
        Mesh = 6,
        ConeShell = 7,
        ConeVolume = 8,
        ConeVolumeShell = 9,
        Circle = 10,
        CircleEdge = 11,
        SingleSidedEdge = 12,
        MeshRenderer = 13,
        SkinnedMeshRenderer = 14,
    }
}

impl ShapeType {
    /// Shapes that sample an external mesh (not supported by the native engine yet).
    pub fn is_mesh_based(self) -> bool {
        matches!(
            self,
            Self::Mesh | Self::MeshRenderer | Self::SkinnedMeshRenderer
        )
    }
}
