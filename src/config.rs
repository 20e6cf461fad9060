use crate::{
    advection::AdvectionType, backtrace::BacktraceOrder, error::SimError, force::ForceConfig,
    force::SceneType, projection::ProjectionType, render::VisualizeType, Grid2,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeType {
    AdvectionProjection,
    #[default]
    AdvectionReflection,
}

/// Fields missing from a serialized config take their `SimConfig::new`
/// values, so the force constants follow the loaded `width`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "PartialSimConfig")]
pub struct SimConfig {
    pub width: usize,
    pub height: usize,
    pub dx: f32,
    pub dt: f32,
    pub scheme: SchemeType,
    pub visualize: VisualizeType,
    pub scene: SceneType,
    pub advection: AdvectionType,
    pub backtrace_order: BacktraceOrder,
    pub mac_cormack_clipping: bool,
    pub projection: ProjectionType,
    pub pressure_iters: usize,
    pub viscosity: f32,
    pub viscosity_iters: usize,
    pub force: ForceConfig,
}

impl SimConfig {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            dx: 1.0,
            dt: 0.03,
            scheme: SchemeType::default(),
            visualize: VisualizeType::default(),
            scene: SceneType::default(),
            advection: AdvectionType::default(),
            backtrace_order: BacktraceOrder::default(),
            mac_cormack_clipping: true,
            projection: ProjectionType::default(),
            pressure_iters: 30,
            viscosity: 0.0,
            viscosity_iters: 20,
            force: ForceConfig::for_width(width),
        }
    }

    pub fn half_dt(&self) -> f32 {
        0.5 * self.dt
    }

    pub fn grid(&self) -> Grid2 {
        Grid2::new(self.width, self.height, self.dx)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.width == 0 || self.height == 0 {
            return Err(SimError::InvalidConfig(format!(
                "grid must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.dx.is_finite() && self.dx > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "dx must be positive, got {}",
                self.dx
            )));
        }
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "dt must be positive, got {}",
                self.dt
            )));
        }
        if !(self.viscosity.is_finite() && self.viscosity >= 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "viscosity must be non-negative, got {}",
                self.viscosity
            )));
        }
        if !self.force.is_finite() {
            return Err(SimError::InvalidConfig(
                "force constants must be finite".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.force.dye_decay) {
            return Err(SimError::InvalidConfig(format!(
                "dye_decay must lie in [0, 1], got {}",
                self.force.dye_decay
            )));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct PartialSimConfig {
    width: Option<usize>,
    height: Option<usize>,
    dx: Option<f32>,
    dt: Option<f32>,
    scheme: Option<SchemeType>,
    visualize: Option<VisualizeType>,
    scene: Option<SceneType>,
    advection: Option<AdvectionType>,
    backtrace_order: Option<BacktraceOrder>,
    mac_cormack_clipping: Option<bool>,
    projection: Option<ProjectionType>,
    pressure_iters: Option<usize>,
    viscosity: Option<f32>,
    viscosity_iters: Option<usize>,
    force: Option<ForceConfig>,
}

impl From<PartialSimConfig> for SimConfig {
    fn from(raw: PartialSimConfig) -> Self {
        let defaults = SimConfig::default();
        let mut cfg = SimConfig::new(
            raw.width.unwrap_or(defaults.width),
            raw.height.unwrap_or(defaults.height),
        );
        cfg.dx = raw.dx.unwrap_or(cfg.dx);
        cfg.dt = raw.dt.unwrap_or(cfg.dt);
        cfg.scheme = raw.scheme.unwrap_or(cfg.scheme);
        cfg.visualize = raw.visualize.unwrap_or(cfg.visualize);
        cfg.scene = raw.scene.unwrap_or(cfg.scene);
        cfg.advection = raw.advection.unwrap_or(cfg.advection);
        cfg.backtrace_order = raw.backtrace_order.unwrap_or(cfg.backtrace_order);
        cfg.mac_cormack_clipping = raw.mac_cormack_clipping.unwrap_or(cfg.mac_cormack_clipping);
        cfg.projection = raw.projection.unwrap_or(cfg.projection);
        cfg.pressure_iters = raw.pressure_iters.unwrap_or(cfg.pressure_iters);
        cfg.viscosity = raw.viscosity.unwrap_or(cfg.viscosity);
        cfg.viscosity_iters = raw.viscosity_iters.unwrap_or(cfg.viscosity_iters);
        if let Some(force) = raw.force {
            cfg.force = force;
        }
        cfg
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new(512, 512)
    }
}

macro_rules! selector_from_str {
    ($ty:ty, $kind:literal, { $($name:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = SimError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
                    $($name => Ok($variant),)+
                    _ => Err(SimError::unknown($kind, s)),
                }
            }
        }
    };
}

selector_from_str!(SchemeType, "scheme", {
    "advection_projection" => SchemeType::AdvectionProjection,
    "advection_reflection" => SchemeType::AdvectionReflection,
});

selector_from_str!(VisualizeType, "visualization", {
    "density" => VisualizeType::Density,
    "velocity" => VisualizeType::Velocity,
});

selector_from_str!(SceneType, "scene", {
    "mouse_drag_dye" => SceneType::MouseDragDye,
    "shot_from_bottom" => SceneType::ShotFromBottom,
});

selector_from_str!(AdvectionType, "advection solver", {
    "semi_lagrangian" => AdvectionType::SemiLagrangian,
    "mac_cormack" => AdvectionType::MacCormack,
});

selector_from_str!(BacktraceOrder, "backtrace order", {
    "rk1" => BacktraceOrder::Rk1,
    "rk2" => BacktraceOrder::Rk2,
    "rk3" => BacktraceOrder::Rk3,
});

selector_from_str!(ProjectionType, "projection solver", {
    "jacobi" => ProjectionType::Jacobi,
    "red_black_gauss_seidel" => ProjectionType::RedBlackGaussSeidel,
});
