use crate::{Vec2, Vec3};
use std::fmt::Debug;

/// Per-cell value stored in a [`crate::Field2`].
///
/// Arithmetic is component-wise. Components are addressed `0..COMPONENTS`
/// so kernels such as the MacCormack clamp can work on each channel on its own.
pub trait FieldValue: Copy + Debug + PartialEq + Send + Sync + 'static {
    const COMPONENTS: usize;

    fn zero() -> Self;
    fn add(self, other: Self) -> Self;
    fn sub(self, other: Self) -> Self;
    fn scale(self, s: f32) -> Self;
    fn component(&self, k: usize) -> f32;
    fn set_component(&mut self, k: usize, value: f32);

    fn lerp(self, other: Self, t: f32) -> Self {
        self.add(other.sub(self).scale(t))
    }

    fn component_min(self, other: Self) -> Self {
        let mut out = self;
        for k in 0..Self::COMPONENTS {
            out.set_component(k, self.component(k).min(other.component(k)));
        }
        out
    }

    fn component_max(self, other: Self) -> Self {
        let mut out = self;
        for k in 0..Self::COMPONENTS {
            out.set_component(k, self.component(k).max(other.component(k)));
        }
        out
    }

    fn max_abs_component(&self) -> f32 {
        (0..Self::COMPONENTS)
            .map(|k| self.component(k).abs())
            .fold(0.0_f32, f32::max)
    }

    fn all_finite(&self) -> bool {
        (0..Self::COMPONENTS).all(|k| self.component(k).is_finite())
    }
}

impl FieldValue for f32 {
    const COMPONENTS: usize = 1;

    fn zero() -> Self {
        0.0
    }

    fn add(self, other: Self) -> Self {
        self + other
    }

    fn sub(self, other: Self) -> Self {
        self - other
    }

    fn scale(self, s: f32) -> Self {
        self * s
    }

    fn component(&self, k: usize) -> f32 {
        debug_assert_eq!(k, 0);
        *self
    }

    fn set_component(&mut self, k: usize, value: f32) {
        debug_assert_eq!(k, 0);
        *self = value;
    }
}

impl FieldValue for Vec2 {
    const COMPONENTS: usize = 2;

    fn zero() -> Self {
        Vec2::zero()
    }

    fn add(self, other: Self) -> Self {
        Vec2::add(self, other)
    }

    fn sub(self, other: Self) -> Self {
        Vec2::sub(self, other)
    }

    fn scale(self, s: f32) -> Self {
        Vec2::scale(self, s)
    }

    fn component(&self, k: usize) -> f32 {
        match k {
            0 => self.x,
            1 => self.y,
            _ => panic!("Vec2 component {k} out of range"),
        }
    }

    fn set_component(&mut self, k: usize, value: f32) {
        match k {
            0 => self.x = value,
            1 => self.y = value,
            _ => panic!("Vec2 component {k} out of range"),
        }
    }
}

impl FieldValue for Vec3 {
    const COMPONENTS: usize = 3;

    fn zero() -> Self {
        Vec3::zero()
    }

    fn add(self, other: Self) -> Self {
        Vec3::add(self, other)
    }

    fn sub(self, other: Self) -> Self {
        Vec3::sub(self, other)
    }

    fn scale(self, s: f32) -> Self {
        Vec3::scale(self, s)
    }

    fn component(&self, k: usize) -> f32 {
        match k {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            _ => panic!("Vec3 component {k} out of range"),
        }
    }

    fn set_component(&mut self, k: usize, value: f32) {
        match k {
            0 => self.x = value,
            1 => self.y = value,
            2 => self.z = value,
            _ => panic!("Vec3 component {k} out of range"),
        }
    }
}
