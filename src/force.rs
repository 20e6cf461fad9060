use crate::{error::SimError, Field2, Vec2, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneType {
    #[default]
    MouseDragDye,
    ShotFromBottom,
}

/// One frame of user forcing, positions in cell units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ForceInput {
    pub direction: Vec2,
    pub position: (f32, f32),
    pub color: Vec3,
}

impl ForceInput {
    pub fn new(direction: Vec2, position: (f32, f32), color: Vec3) -> Self {
        Self {
            direction,
            position,
            color,
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let finite = self.direction.is_finite()
            && self.position.0.is_finite()
            && self.position.1.is_finite()
            && self.color.is_finite();
        if finite {
            Ok(())
        } else {
            Err(SimError::InvalidInput(format!(
                "force input must be finite, got {self:?}"
            )))
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForceConfig {
    pub strength: f32,
    pub dye_decay: f32,
    pub dye_threshold: f32,
    pub force_radius: f32,
    pub inv_force_radius: f32,
    pub inv_dye_denom: f32,
    pub gravity: Vec2,
    pub shot_direction: Vec2,
    pub source: (f32, f32),
    pub fluid_color: Vec3,
}

impl ForceConfig {
    /// Constants scaled to a grid `width` cells across.
    pub fn for_width(width: usize) -> Self {
        let res = width as f32;
        let force_radius = res / 3.0;
        let dye_radius = res / 15.0;
        Self {
            strength: 10_000.0,
            dye_decay: 0.99,
            dye_threshold: 0.5,
            force_radius,
            inv_force_radius: 1.0 / force_radius,
            inv_dye_denom: 4.0 / (dye_radius * dye_radius),
            gravity: Vec2::new(-9.8, -9.8),
            shot_direction: Vec2::new(0.0, 1.0),
            source: (res / 2.0, 0.0),
            fluid_color: Vec3::new(0.65, 0.5, 0.9),
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        [
            self.strength,
            self.dye_decay,
            self.dye_threshold,
            self.force_radius,
            self.inv_force_radius,
            self.inv_dye_denom,
            self.source.0,
            self.source.1,
        ]
        .iter()
        .all(|v| v.is_finite())
            && self.gravity.is_finite()
            && self.shot_direction.is_finite()
            && self.fluid_color.is_finite()
    }
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self::for_width(512)
    }
}

fn dist2(x: usize, y: usize, (cx, cy): (f32, f32)) -> f32 {
    let dx = x as f32 + 0.5 - cx;
    let dy = y as f32 + 0.5 - cy;
    dx * dx + dy * dy
}

/// Gaussian impulse around the input position. Dye is only injected while the
/// drag is fast enough, and always decays.
pub fn apply_impulse(
    velocity: &mut Field2<Vec2>,
    dye: &mut Field2<Vec3>,
    input: &ForceInput,
    cfg: &ForceConfig,
    dt: f32,
) {
    let push = input.direction.scale(cfg.strength * dt);
    let inject = input.direction.norm() > cfg.dye_threshold;
    velocity.update_zip_with_index(dye, |x, y, v, d| {
        let d2 = dist2(x, y, input.position);
        *v = v.add(push.scale((-d2 * cfg.inv_force_radius).exp()));
        if inject {
            *d = d.add(input.color.scale((-d2 * cfg.inv_dye_denom).exp()));
        }
        *d = d.scale(cfg.dye_decay);
    });
}

/// Upward jet from the fixed source plus gravity, feeding capped dye.
pub fn apply_shot(velocity: &mut Field2<Vec2>, dye: &mut Field2<Vec3>, cfg: &ForceConfig, dt: f32) {
    let shot = cfg.shot_direction.scale(cfg.strength);
    velocity.update_zip_with_index(dye, |x, y, v, d| {
        let d2 = dist2(x, y, cfg.source);
        let accel = shot.scale((-d2 * cfg.inv_force_radius).exp()).add(cfg.gravity);
        *v = v.add(accel.scale(dt));
        let fed = d.add(cfg.fluid_color.scale((-d2 * cfg.inv_dye_denom).exp()));
        *d = fed.scale(cfg.dye_decay).min(cfg.fluid_color);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Grid2;

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    fn fields(grid: Grid2) -> (Field2<Vec2>, Field2<Vec3>) {
        (Field2::zeros(grid), Field2::zeros(grid))
    }

    #[test]
    fn defaults_scale_with_resolution() {
        let cfg = ForceConfig::for_width(150);
        assert_close(cfg.force_radius, 50.0, 1e-5);
        assert_close(cfg.inv_force_radius, 0.02, 1e-7);
        assert_close(cfg.inv_dye_denom, 0.04, 1e-6);
        assert_eq!(cfg.source, (75.0, 0.0));
    }

    #[test]
    fn impulse_peaks_at_center_in_forced_direction() {
        let grid = Grid2::new(4, 4, 1.0);
        let (mut v, mut dye) = fields(grid);
        let cfg = ForceConfig::for_width(4);
        let input = ForceInput::new(Vec2::new(1.0, 0.0), (2.5, 2.5), Vec3::new(1.0, 0.5, 0.0));
        apply_impulse(&mut v, &mut dye, &input, &cfg, 0.03);
        assert_close(v.get(2, 2).x, 300.0, 1e-3);
        assert_eq!(v.get(2, 2).y, 0.0);
        assert!(v.get(0, 0).x < v.get(2, 2).x);
        assert_close(dye.get(2, 2).x, 0.99, 1e-6);
        assert_close(dye.get(2, 2).y, 0.495, 1e-6);
    }

    #[test]
    fn slow_drag_moves_fluid_without_dye() {
        let grid = Grid2::new(4, 4, 1.0);
        let (mut v, mut dye) = fields(grid);
        let cfg = ForceConfig::for_width(4);
        let input = ForceInput::new(Vec2::new(0.3, 0.0), (2.5, 2.5), Vec3::splat(1.0));
        apply_impulse(&mut v, &mut dye, &input, &cfg, 0.03);
        assert!(v.get(2, 2).x > 0.0);
        assert_eq!(dye.max_abs_component(), 0.0);
    }

    #[test]
    fn dye_decays_geometrically() {
        let grid = Grid2::new(3, 3, 1.0);
        let (mut v, mut dye) = fields(grid);
        dye.fill(Vec3::splat(1.0));
        let cfg = ForceConfig::for_width(3);
        let idle = ForceInput::default();
        for _ in 0..10 {
            apply_impulse(&mut v, &mut dye, &idle, &cfg, 0.03);
        }
        assert_close(dye.get(1, 1).x, 0.99_f32.powi(10), 1e-5);
        assert_eq!(v.max_abs_component(), 0.0);
    }

    #[test]
    fn shot_pushes_up_near_source_and_caps_dye() {
        let grid = Grid2::new(16, 16, 1.0);
        let (mut v, mut dye) = fields(grid);
        let cfg = ForceConfig::for_width(16);
        for _ in 0..50 {
            apply_shot(&mut v, &mut dye, &cfg, 0.03);
        }
        assert!(v.get(8, 0).y > 0.0);
        assert_close(v.get(8, 0).x, -9.8 * 0.03 * 50.0, 1e-3);
        for d in dye.as_slice() {
            assert!(d.x <= cfg.fluid_color.x && d.y <= cfg.fluid_color.y && d.z <= cfg.fluid_color.z);
        }
        assert_eq!(dye.get(8, 0), cfg.fluid_color);
    }

    #[test]
    fn shot_gravity_pulls_far_cells_down() {
        let grid = Grid2::new(64, 64, 1.0);
        let (mut v, mut dye) = fields(grid);
        let mut cfg = ForceConfig::for_width(64);
        cfg.strength = 1.0;
        apply_shot(&mut v, &mut dye, &cfg, 0.1);
        assert!(v.get(0, 63).y < 0.0);
        assert_close(v.get(0, 63).x, -0.98, 1e-5);
        assert_close(v.get(32, 0).x, -0.98, 1e-5);
    }

    #[test]
    fn rejects_non_finite_input() {
        let input = ForceInput::new(Vec2::new(f32::NAN, 0.0), (1.0, 1.0), Vec3::zero());
        assert!(matches!(input.validate(), Err(SimError::InvalidInput(_))));
        assert!(ForceInput::default().validate().is_ok());
    }
}
