mod advection;
mod backtrace;
mod config;
mod error;
mod field;
mod field_pair;
mod fluid_grid;
mod force;
mod grid;
mod parallel;
mod projection;
mod render;
mod scheme;
mod value;
mod vec2;
mod vec3;

pub use advection::{AdvectionSolver, AdvectionType, Advector, MacCormackSolver, SemiLagrangianSolver};
pub use backtrace::{BacktraceOrder, SemiLagrangian};
pub use config::{SchemeType, SimConfig};
pub use error::SimError;
pub use field::Field2;
pub use field_pair::FieldPair;
pub use fluid_grid::FluidGrid;
pub use force::{apply_impulse, apply_shot, ForceConfig, ForceInput, SceneType};
pub use grid::Grid2;
pub use projection::{
    divergence, divergence_into, projection_solver, subtract_gradient, ImplicitViscosity,
    JacobiProjection, ProjectionSolver, ProjectionType, RedBlackGaussSeidelProjection,
};
pub use render::{fill_color, fill_color_velocity, to_rgb8, VisualizeType};
pub use scheme::{reflect, EulerScheme};
pub use value::FieldValue;
pub use vec2::Vec2;
pub use vec3::Vec3;
