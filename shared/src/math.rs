//! Math types for fxbridge
//!
//! Provides a POD 4x4 matrix that can cross the native boundary and be shared
//! across crates without requiring glam as a dependency.

use bitcode::{Decode, Encode};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 4x4 transform matrix (column-major storage, POD type)
///
/// Memory layout (64 bytes): four columns of four floats, translation in the
/// fourth column. This is the layout the native engine reads directly.
///
/// Console-side code converts from its own math types (e.g. `glam::Mat4`)
/// with [`Matrix4x4::from_cols_array`].
#[derive(
    Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize, Encode, Decode,
)]
#[repr(C)]
pub struct Matrix4x4 {
    pub cols: [[f32; 4]; 4],
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4x4 {
    /// Identity matrix (no transformation)
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Create from a flat column-major array
    pub const fn from_cols_array(arr: [f32; 16]) -> Self {
        Self {
            cols: [
                [arr[0], arr[1], arr[2], arr[3]],
                [arr[4], arr[5], arr[6], arr[7]],
                [arr[8], arr[9], arr[10], arr[11]],
                [arr[12], arr[13], arr[14], arr[15]],
            ],
        }
    }

    /// Flatten to a column-major array
    pub fn to_cols_array(&self) -> [f32; 16] {
        bytemuck::cast(self.cols)
    }

    /// Pure translation
    pub const fn from_translation(x: f32, y: f32, z: f32) -> Self {
        let mut m = Self::IDENTITY;
        m.cols[3] = [x, y, z, 1.0];
        m
    }

    /// Translation component (fourth column)
    pub fn translation(&self) -> [f32; 3] {
        let [x, y, z, _] = self.cols[3];
        [x, y, z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let m = Matrix4x4::IDENTITY;
        assert_eq!(m.cols[0], [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(m.cols[3], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(Matrix4x4::default(), m);
    }

    #[test]
    fn test_cols_array() {
        let arr: [f32; 16] = std::array::from_fn(|i| i as f32);
        let m = Matrix4x4::from_cols_array(arr);
        assert_eq!(m.cols[1], [4.0, 5.0, 6.0, 7.0]);
        assert_eq!(m.to_cols_array(), arr);
    }

    #[test]
    fn test_translation() {
        let m = Matrix4x4::from_translation(1.0, -2.0, 3.5);
        assert_eq!(m.translation(), [1.0, -2.0, 3.5]);
        assert_eq!(m.cols[0], Matrix4x4::IDENTITY.cols[0]);
    }

    #[test]
    fn test_size() {
        assert_eq!(std::mem::size_of::<Matrix4x4>(), 64);
    }
}
