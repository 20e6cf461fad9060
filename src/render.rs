use crate::{Field2, Vec2, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualizeType {
    #[default]
    Density,
    Velocity,
}

/// Dye magnitude per channel.
pub fn fill_color(color: &mut Field2<Vec3>, density: &Field2<Vec3>) {
    color.fill_with_index(|x, y| density.get(x, y).abs());
}

/// Speed along each axis in red and green over a fixed blue.
pub fn fill_color_velocity(color: &mut Field2<Vec3>, velocity: &Field2<Vec2>) {
    color.fill_with_index(|x, y| {
        let v = velocity.get(x, y).abs();
        Vec3::new(v.x, v.y, 0.25)
    });
}

/// Row-major RGB bytes, bottom row first, channels saturated to `[0, 1]`.
pub fn to_rgb8(color: &Field2<Vec3>) -> Vec<u8> {
    let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    let mut out = Vec::with_capacity(color.as_slice().len() * 3);
    for c in color.as_slice() {
        out.extend_from_slice(&[to_byte(c.x), to_byte(c.y), to_byte(c.z)]);
    }
    out
}
