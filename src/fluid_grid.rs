use crate::{
    projection::{divergence, divergence_into},
    Field2, FieldPair, Grid2, Vec2, Vec3,
};

/// All per-cell state the orchestrator steps. Buffers are allocated once and
/// reused for the lifetime of the simulation.
#[derive(Clone, Debug)]
pub struct FluidGrid {
    pub grid: Grid2,
    pub v_pair: FieldPair<Vec2>,
    pub density_pair: FieldPair<Vec3>,
    pub p_pair: FieldPair<f32>,
    pub v_divs: Field2<f32>,
    pub tmp_v: Field2<Vec2>,
}

impl FluidGrid {
    pub fn new(grid: Grid2) -> Self {
        Self {
            grid,
            v_pair: FieldPair::zeros(grid),
            density_pair: FieldPair::zeros(grid),
            p_pair: FieldPair::zeros(grid),
            v_divs: Field2::zeros(grid),
            tmp_v: Field2::zeros(grid),
        }
    }

    pub fn velocity(&self) -> &Field2<Vec2> {
        self.v_pair.cur()
    }

    pub fn density(&self) -> &Field2<Vec3> {
        self.density_pair.cur()
    }

    pub fn pressure(&self) -> &Field2<f32> {
        self.p_pair.cur()
    }

    pub fn reset(&mut self) {
        self.v_pair.reset();
        self.density_pair.reset();
        self.p_pair.reset();
        self.v_divs.fill(0.0);
        self.tmp_v.fill(Vec2::zero());
    }

    /// Recomputes the divergence of the current velocity into `v_divs`.
    pub fn update_divergence(&mut self) {
        divergence_into(&mut self.v_divs, self.v_pair.cur());
    }

    /// Divergence of the current velocity, computed into its own buffer so
    /// the solver's `v_divs` is left alone.
    pub fn max_divergence(&self) -> f32 {
        divergence(self.v_pair.cur()).max_abs_component()
    }

    pub fn max_speed(&self) -> f32 {
        self.v_pair
            .cur()
            .as_slice()
            .iter()
            .map(|v| v.norm())
            .fold(0.0_f32, f32::max)
    }

    pub fn kinetic_energy(&self) -> f32 {
        let dx = self.grid.dx();
        let sum: f32 = self.v_pair.cur().as_slice().iter().map(|v| v.dot(*v)).sum();
        0.5 * sum * dx * dx
    }

    pub fn total_dye(&self) -> Vec3 {
        self.density_pair.cur().sum()
    }
}
