use crate::{
    advection::{AdvectionSolver, Advector},
    config::{SchemeType, SimConfig},
    error::SimError,
    fluid_grid::FluidGrid,
    force::{apply_impulse, apply_shot, ForceInput, SceneType},
    projection::{projection_solver, subtract_gradient, ProjectionSolver},
    render::{fill_color, fill_color_velocity, VisualizeType},
    Field2, Vec2, Vec3,
};
use log::{debug, info, trace};

/// Mirrors the unprojected velocity in `dst` about `projected`.
pub fn reflect(dst: &mut Field2<Vec2>, projected: &Field2<Vec2>) {
    dst.update_with_index(|x, y, u| projected.get(x, y).scale(2.0).sub(u));
}

pub struct EulerScheme {
    config: SimConfig,
    grid: FluidGrid,
    color_buffer: Field2<Vec3>,
    advection: Advector,
    projection: Box<dyn ProjectionSolver>,
    frame: u64,
}

impl EulerScheme {
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let advection = Advector::new(
            config.advection,
            config.backtrace_order,
            config.mac_cormack_clipping,
        );
        let projection = projection_solver(
            config.projection,
            config.grid(),
            config.pressure_iters,
            config.viscosity,
            config.viscosity_iters,
        );
        Ok(Self::assemble(config, advection, projection))
    }

    /// Builds the orchestrator around caller-supplied solvers. The solver
    /// selections in `config` are ignored, but `projection` must be sized for
    /// the configured grid.
    pub fn with_solvers(
        config: SimConfig,
        advection: Advector,
        projection: Box<dyn ProjectionSolver>,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let grid = config.grid();
        if projection.grid() != grid {
            let solver_grid = projection.grid();
            return Err(SimError::InvalidConfig(format!(
                "{} projection built for {}x{} (dx {}), simulation grid is {}x{} (dx {})",
                projection.name(),
                solver_grid.width(),
                solver_grid.height(),
                solver_grid.dx(),
                grid.width(),
                grid.height(),
                grid.dx(),
            )));
        }
        Ok(Self::assemble(config, advection, projection))
    }

    fn assemble(config: SimConfig, advection: Advector, projection: Box<dyn ProjectionSolver>) -> Self {
        let grid = config.grid();
        info!(
            "fluid scheme {:?} on {}x{} (dx {}, dt {}), advection {:?} ({:?}, clipping {}), projection {}, scene {:?}",
            config.scheme,
            grid.width(),
            grid.height(),
            grid.dx(),
            config.dt,
            advection.kind(),
            advection.order(),
            advection.clipping(),
            projection.name(),
            config.scene,
        );
        Self {
            grid: FluidGrid::new(grid),
            color_buffer: Field2::zeros(grid),
            config,
            advection,
            projection,
            frame: 0,
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn fluid(&self) -> &FluidGrid {
        &self.grid
    }

    /// Direct access for seeding initial conditions.
    pub fn fluid_mut(&mut self) -> &mut FluidGrid {
        &mut self.grid
    }

    pub fn color_buffer(&self) -> &Field2<Vec3> {
        &self.color_buffer
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Self-advects velocity and carries dye along the pre-update velocity.
    fn advect(&mut self, dt: f32) {
        trace!("advect dt={dt}");
        let FluidGrid {
            v_pair,
            density_pair,
            ..
        } = &mut self.grid;
        let (v_cur, v_nxt) = v_pair.split_mut();
        self.advection.advect(v_cur, v_cur, v_nxt, dt);
        let (d_cur, d_nxt) = density_pair.split_mut();
        self.advection.advect(v_cur, d_cur, d_nxt, dt);
        v_pair.swap();
        density_pair.swap();
    }

    fn external_force(&mut self, input: Option<&ForceInput>, dt: f32) {
        trace!("external force dt={dt}");
        let FluidGrid {
            v_pair,
            density_pair,
            ..
        } = &mut self.grid;
        match self.config.scene {
            SceneType::MouseDragDye => {
                let idle = ForceInput::default();
                let input = input.unwrap_or(&idle);
                apply_impulse(
                    v_pair.cur_mut(),
                    density_pair.cur_mut(),
                    input,
                    &self.config.force,
                    dt,
                );
            }
            SceneType::ShotFromBottom => {
                apply_shot(
                    v_pair.cur_mut(),
                    density_pair.cur_mut(),
                    &self.config.force,
                    dt,
                );
            }
        }
    }

    /// Divergence, pressure solve and viscosity. The pressure gradient is
    /// subtracted by the caller so it can target either velocity buffer.
    fn project(&mut self, dt: f32) {
        trace!("project dt={dt}");
        self.grid.update_divergence();
        let FluidGrid {
            v_pair,
            p_pair,
            v_divs,
            ..
        } = &mut self.grid;
        self.projection.run_pressure(v_divs, p_pair);
        self.projection.run_viscosity(v_pair, dt);
    }

    fn subtract_pressure_gradient(&mut self) {
        let FluidGrid { v_pair, p_pair, .. } = &mut self.grid;
        subtract_gradient(v_pair.cur_mut(), p_pair.cur());
    }

    fn step_advection_projection(&mut self, input: Option<&ForceInput>) {
        let dt = self.config.dt;
        self.advect(dt);
        self.external_force(input, dt);
        self.project(dt);
        self.subtract_pressure_gradient();
    }

    fn step_advection_reflection(&mut self, input: Option<&ForceInput>) {
        let half_dt = self.config.half_dt();
        self.advect(half_dt);
        self.external_force(input, half_dt);
        self.grid.tmp_v.clone_from(self.grid.v_pair.cur());

        self.project(half_dt);
        {
            let FluidGrid { tmp_v, p_pair, .. } = &mut self.grid;
            subtract_gradient(tmp_v, p_pair.cur());
        }
        {
            let FluidGrid { v_pair, tmp_v, .. } = &mut self.grid;
            reflect(v_pair.cur_mut(), tmp_v);
        }

        self.advect(half_dt);
        self.external_force(input, half_dt);
        self.project(half_dt);
        self.subtract_pressure_gradient();
    }

    /// Advances one frame and refreshes the color buffer. Invalid input is
    /// rejected before any field is touched.
    pub fn step(&mut self, input: Option<&ForceInput>) -> Result<(), SimError> {
        if let Some(input) = input {
            input.validate()?;
        }
        match self.config.scheme {
            SchemeType::AdvectionProjection => self.step_advection_projection(input),
            SchemeType::AdvectionReflection => self.step_advection_reflection(input),
        }
        self.render_frame();
        self.frame += 1;
        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "frame {}: max speed {:.4}, max divergence {:.4}",
                self.frame,
                self.grid.max_speed(),
                self.grid.max_divergence()
            );
        }
        Ok(())
    }

    pub fn render_frame(&mut self) {
        match self.config.visualize {
            VisualizeType::Velocity => fill_color_velocity(&mut self.color_buffer, self.grid.velocity()),
            VisualizeType::Density => fill_color(&mut self.color_buffer, self.grid.density()),
        }
    }

    /// Zeroes every field in place and rewinds the frame counter.
    pub fn reset(&mut self) {
        self.grid.reset();
        self.color_buffer.fill(Vec3::zero());
        self.frame = 0;
        info!("fluid state reset");
    }
}
