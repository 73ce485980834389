//! Shape module parameters

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::codes::ShapeType;

/// Emitter volume parameters.
///
/// Lengths are in native units; the assembler converts `radius` from
/// authoring units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct ShapeModuleData {
    /// Raw [`ShapeType`] code.
    pub shape_type: i32,
    pub radius: f32,
    pub length: f32,
    pub angle: f32,
    pub box_x: f32,
    pub box_y: f32,
    pub box_z: f32,
    pub random_direction: bool,
}

impl ShapeModuleData {
    pub fn shape(&self) -> Option<ShapeType> {
        ShapeType::from_code(self.shape_type)
    }
}
