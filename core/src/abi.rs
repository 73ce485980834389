//! `#[repr(C)]` views passed to the native engine
//!
//! The owned model in `fxbridge-shared` stores sequences as
//! `Option<Vec<T>>`. The engine expects each sequence as an `(i32 count,
//! *const T)` pair with a null pointer exactly when the count is zero. The
//! views here borrow an owned [`ParticleInitState`] and present it in that
//! shape; the borrow keeps every pointer valid for the life of the view.
//!
//! Field order mirrors the native declarations and must not change.

use std::marker::PhantomData;
use std::ptr;

use fxbridge_shared::{
    AlphaKey, ColorKey, Curve, Gradient, KeyFrame, ModelError, ParticleInitState, ShapeModuleData,
    SubCurve, SubGradient,
};

fn seq_ptr<T>(items: Option<&[T]>) -> *const T {
    items.map_or(ptr::null(), <[T]>::as_ptr)
}

/// Copy a `(count, pointer)` pair back into an owned sequence.
///
/// # Safety
///
/// When `ptr` is non-null it must point to `count` initialized values that
/// stay valid for the duration of the call.
unsafe fn read_seq<T: Copy>(
    field: &'static str,
    count: i32,
    ptr: *const T,
) -> Result<Option<Vec<T>>, ModelError> {
    match (count, ptr.is_null()) {
        (0, true) => Ok(None),
        (0, false) => Err(ModelError::EmptyAllocation { field }),
        (n, false) if n > 0 => {
            // SAFETY: caller guarantees `count` readable elements at `ptr`
            let items = unsafe { std::slice::from_raw_parts(ptr, n as usize) };
            Ok(Some(items.to_vec()))
        }
        (n, _) => Err(ModelError::CountMismatch { field, count: n, len: 0 }),
    }
}

#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct SubCurveAbi<'a> {
    pub key_frame_count: i32,
    pub key_frames: *const KeyFrame,
    pub pre_infinity: i32,
    pub post_infinity: i32,
    _borrow: PhantomData<&'a SubCurve>,
}

impl<'a> SubCurveAbi<'a> {
    pub fn new(sub: &'a SubCurve) -> Self {
        Self {
            key_frame_count: sub.key_frame_count(),
            key_frames: seq_ptr(sub.key_frames()),
            pre_infinity: sub.pre_infinity,
            post_infinity: sub.post_infinity,
            _borrow: PhantomData,
        }
    }

    /// # Safety
    ///
    /// `key_frames` must satisfy the contract of the native declaration.
    pub unsafe fn copy_out(&self) -> Result<SubCurve, ModelError> {
        // SAFETY: forwarded to the caller
        let keys = unsafe { read_seq("key_frames", self.key_frame_count, self.key_frames)? };
        SubCurve::from_raw_parts(
            self.key_frame_count,
            keys,
            self.pre_infinity,
            self.post_infinity,
        )
    }
}

#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct CurveAbi<'a> {
    pub min_max_state: i32,
    pub scalar: f32,
    pub min_curve: SubCurveAbi<'a>,
    pub max_curve: SubCurveAbi<'a>,
}

impl<'a> CurveAbi<'a> {
    pub fn new(curve: &'a Curve) -> Self {
        Self {
            min_max_state: curve.min_max_state,
            scalar: curve.scalar,
            min_curve: SubCurveAbi::new(&curve.min_curve),
            max_curve: SubCurveAbi::new(&curve.max_curve),
        }
    }

    /// # Safety
    ///
    /// Both sub-curves must satisfy the contract of the native declaration.
    pub unsafe fn copy_out(&self) -> Result<Curve, ModelError> {
        // SAFETY: forwarded to the caller
        unsafe {
            Ok(Curve {
                min_max_state: self.min_max_state,
                scalar: self.scalar,
                min_curve: self.min_curve.copy_out()?,
                max_curve: self.max_curve.copy_out()?,
            })
        }
    }
}

#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct SubGradientAbi<'a> {
    pub color_key_count: i32,
    pub color_keys: *const ColorKey,
    pub alpha_key_count: i32,
    pub alpha_keys: *const AlphaKey,
    _borrow: PhantomData<&'a SubGradient>,
}

impl<'a> SubGradientAbi<'a> {
    pub fn new(sub: &'a SubGradient) -> Self {
        Self {
            color_key_count: sub.color_key_count(),
            color_keys: seq_ptr(sub.color_keys()),
            alpha_key_count: sub.alpha_key_count(),
            alpha_keys: seq_ptr(sub.alpha_keys()),
            _borrow: PhantomData,
        }
    }

    /// # Safety
    ///
    /// Both key pointers must satisfy the contract of the native declaration.
    pub unsafe fn copy_out(&self) -> Result<SubGradient, ModelError> {
        // SAFETY: forwarded to the caller
        let (color_keys, alpha_keys) = unsafe {
            (
                read_seq("color_keys", self.color_key_count, self.color_keys)?,
                read_seq("alpha_keys", self.alpha_key_count, self.alpha_keys)?,
            )
        };
        SubGradient::from_raw_parts(
            self.color_key_count,
            color_keys,
            self.alpha_key_count,
            alpha_keys,
        )
    }
}

#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct GradientAbi<'a> {
    pub max_gradient: SubGradientAbi<'a>,
    pub min_gradient: SubGradientAbi<'a>,
    pub min_color: i32,
    pub max_color: i32,
    pub min_max_state: i32,
}

impl<'a> GradientAbi<'a> {
    pub fn new(gradient: &'a Gradient) -> Self {
        Self {
            max_gradient: SubGradientAbi::new(&gradient.max_gradient),
            min_gradient: SubGradientAbi::new(&gradient.min_gradient),
            min_color: gradient.min_color,
            max_color: gradient.max_color,
            min_max_state: gradient.min_max_state,
        }
    }

    /// # Safety
    ///
    /// Both sub-gradients must satisfy the contract of the native declaration.
    pub unsafe fn copy_out(&self) -> Result<Gradient, ModelError> {
        // SAFETY: forwarded to the caller
        unsafe {
            Ok(Gradient {
                max_gradient: self.max_gradient.copy_out()?,
                min_gradient: self.min_gradient.copy_out()?,
                min_color: self.min_color,
                max_color: self.max_color,
                min_max_state: self.min_max_state,
            })
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct ShapeModuleAbi {
    pub shape_type: i32,
    pub radius: f32,
    pub length: f32,
    pub angle: f32,
    pub box_x: f32,
    pub box_y: f32,
    pub box_z: f32,
    pub random_direction: bool,
}

impl From<&ShapeModuleData> for ShapeModuleAbi {
    fn from(shape: &ShapeModuleData) -> Self {
        Self {
            shape_type: shape.shape_type,
            radius: shape.radius,
            length: shape.length,
            angle: shape.angle,
            box_x: shape.box_x,
            box_y: shape.box_y,
            box_z: shape.box_z,
            random_direction: shape.random_direction,
        }
    }
}

impl From<&ShapeModuleAbi> for ShapeModuleData {
    fn from(shape: &ShapeModuleAbi) -> Self {
        Self {
            shape_type: shape.shape_type,
            radius: shape.radius,
            length: shape.length,
            angle: shape.angle,
            box_x: shape.box_x,
            box_y: shape.box_y,
            box_z: shape.box_z,
            random_direction: shape.random_direction,
        }
    }
}

/// Borrowed native view of one [`ParticleInitState`].
#[derive(Clone, Copy, Debug)]
#[repr(C)]
pub struct ParticleInitStateAbi<'a> {
    pub looping: bool,
    pub prewarm: bool,
    pub random_seed: i32,
    pub play_on_awake: bool,
    pub start_delay: f32,
    pub speed: f32,
    pub length_in_sec: f32,
    pub use_local_space: bool,
    pub max_num_particles: i32,
    pub emission_rate: f32,

    pub init_module_lifetime: CurveAbi<'a>,
    pub init_module_speed: CurveAbi<'a>,
    pub init_module_size: CurveAbi<'a>,
    pub init_module_rotation: CurveAbi<'a>,

    pub rotation_module_enable: bool,
    pub rotation_module_curve: CurveAbi<'a>,

    pub size_module_enable: bool,
    pub size_module_curve: CurveAbi<'a>,

    pub shape_module_enable: bool,
    pub shape_module_data: ShapeModuleAbi,

    pub color_module_enable: bool,
    pub color_module_gradient: GradientAbi<'a>,
}

impl<'a> ParticleInitStateAbi<'a> {
    pub fn new(state: &'a ParticleInitState) -> Self {
        Self {
            looping: state.looping,
            prewarm: state.prewarm,
            random_seed: state.random_seed,
            play_on_awake: state.play_on_awake,
            start_delay: state.start_delay,
            speed: state.speed,
            length_in_sec: state.length_in_sec,
            use_local_space: state.use_local_space,
            max_num_particles: state.max_num_particles,
            emission_rate: state.emission_rate,
            init_module_lifetime: CurveAbi::new(&state.init_module_lifetime),
            init_module_speed: CurveAbi::new(&state.init_module_speed),
            init_module_size: CurveAbi::new(&state.init_module_size),
            init_module_rotation: CurveAbi::new(&state.init_module_rotation),
            rotation_module_enable: state.rotation_module_enable,
            rotation_module_curve: CurveAbi::new(&state.rotation_module_curve),
            size_module_enable: state.size_module_enable,
            size_module_curve: CurveAbi::new(&state.size_module_curve),
            shape_module_enable: state.shape_module_enable,
            shape_module_data: ShapeModuleAbi::from(&state.shape_module_data),
            color_module_enable: state.color_module_enable,
            color_module_gradient: GradientAbi::new(&state.color_module_gradient),
        }
    }

    /// Deep-copy the view into an owned state, validating every
    /// `(count, pointer)` pair on the way.
    ///
    /// # Safety
    ///
    /// Every non-null sequence pointer must reference `count` readable
    /// elements. Views built with [`ParticleInitStateAbi::new`] always do.
    pub unsafe fn copy_out(&self) -> Result<ParticleInitState, ModelError> {
        // SAFETY: forwarded to the caller
        unsafe {
            Ok(ParticleInitState {
                looping: self.looping,
                prewarm: self.prewarm,
                random_seed: self.random_seed,
                play_on_awake: self.play_on_awake,
                start_delay: self.start_delay,
                speed: self.speed,
                length_in_sec: self.length_in_sec,
                use_local_space: self.use_local_space,
                max_num_particles: self.max_num_particles,
                emission_rate: self.emission_rate,
                init_module_lifetime: self.init_module_lifetime.copy_out()?,
                init_module_speed: self.init_module_speed.copy_out()?,
                init_module_size: self.init_module_size.copy_out()?,
                init_module_rotation: self.init_module_rotation.copy_out()?,
                rotation_module_enable: self.rotation_module_enable,
                rotation_module_curve: self.rotation_module_curve.copy_out()?,
                size_module_enable: self.size_module_enable,
                size_module_curve: self.size_module_curve.copy_out()?,
                shape_module_enable: self.shape_module_enable,
                shape_module_data: ShapeModuleData::from(&self.shape_module_data),
                color_module_enable: self.color_module_enable,
                color_module_gradient: self.color_module_gradient.copy_out()?,
            })
        }
    }
}

// Pin the record layouts the engine is compiled against.
#[cfg(target_pointer_width = "64")]
const _: () = {
    use std::mem::{offset_of, size_of};

    assert!(size_of::<KeyFrame>() == 16);
    assert!(size_of::<ColorKey>() == 8);
    assert!(size_of::<AlphaKey>() == 8);

    assert!(size_of::<SubCurveAbi<'static>>() == 24);
    assert!(offset_of!(SubCurveAbi<'static>, key_frames) == 8);
    assert!(size_of::<CurveAbi<'static>>() == 56);

    assert!(size_of::<SubGradientAbi<'static>>() == 32);
    assert!(offset_of!(SubGradientAbi<'static>, alpha_keys) == 24);
    assert!(size_of::<GradientAbi<'static>>() == 80);

    assert!(size_of::<ShapeModuleAbi>() == 32);
};

#[cfg(test)]
mod tests {
    use std::mem::offset_of;

    use super::*;
    use crate::test_utils::sample_state;

    #[test]
    fn test_zero_count_is_null() {
        let state = ParticleInitState::default();
        let view = ParticleInitStateAbi::new(&state);
        let size = view.init_module_size;
        assert_eq!(size.max_curve.key_frame_count, 0);
        assert!(size.max_curve.key_frames.is_null());
        assert!(view.color_module_gradient.max_gradient.alpha_keys.is_null());
    }

    #[test]
    fn test_pointers_reference_owned_storage() {
        let state = sample_state();
        let view = ParticleInitStateAbi::new(&state);
        let owned = state.init_module_size.max_curve.key_frames().unwrap();
        assert_eq!(view.init_module_size.max_curve.key_frames, owned.as_ptr());
        assert_eq!(
            view.init_module_size.max_curve.key_frame_count as usize,
            owned.len()
        );
    }

    #[test]
    fn test_view_copies_back_exactly() {
        let state = sample_state();
        let view = ParticleInitStateAbi::new(&state);
        let copy = unsafe { view.copy_out() }.unwrap();
        assert_eq!(copy, state);
        assert_eq!(copy.checksum(), state.checksum());
    }

    #[test]
    fn test_drifted_count_rejected() {
        let state = ParticleInitState::default();
        let mut view = ParticleInitStateAbi::new(&state);
        view.init_module_speed.min_curve.key_frame_count = 2;
        assert_eq!(
            unsafe { view.copy_out() },
            Err(ModelError::CountMismatch {
                field: "key_frames",
                count: 2,
                len: 0
            })
        );

        let mut view = ParticleInitStateAbi::new(&state);
        view.color_module_gradient.min_gradient.color_key_count = -1;
        assert!(unsafe { view.copy_out() }.is_err());
    }

    #[test]
    fn test_empty_allocation_rejected() {
        let keys = [KeyFrame::flat(0.0, 1.0)];
        let state = ParticleInitState::default();
        let mut view = ParticleInitStateAbi::new(&state);
        view.size_module_curve.max_curve.key_frames = keys.as_ptr();
        assert_eq!(
            unsafe { view.copy_out() },
            Err(ModelError::EmptyAllocation {
                field: "key_frames"
            })
        );
    }

    #[test]
    fn test_field_order_follows_wire_order() {
        type S = ParticleInitStateAbi<'static>;
        let offsets = [
            offset_of!(S, looping),
            offset_of!(S, prewarm),
            offset_of!(S, random_seed),
            offset_of!(S, play_on_awake),
            offset_of!(S, start_delay),
            offset_of!(S, speed),
            offset_of!(S, length_in_sec),
            offset_of!(S, use_local_space),
            offset_of!(S, max_num_particles),
            offset_of!(S, emission_rate),
            offset_of!(S, init_module_lifetime),
            offset_of!(S, init_module_speed),
            offset_of!(S, init_module_size),
            offset_of!(S, init_module_rotation),
            offset_of!(S, rotation_module_enable),
            offset_of!(S, rotation_module_curve),
            offset_of!(S, size_module_enable),
            offset_of!(S, size_module_curve),
            offset_of!(S, shape_module_enable),
            offset_of!(S, shape_module_data),
            offset_of!(S, color_module_enable),
            offset_of!(S, color_module_gradient),
        ];
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(offsets[0], 0);
    }
}
