use crate::{Field2, FieldPair, Grid2, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionType {
    #[default]
    Jacobi,
    RedBlackGaussSeidel,
}

/// Pressure and viscosity solves behind the projection phase.
///
/// Both calls are best effort: a solver runs its configured iteration count
/// and never reports convergence.
pub trait ProjectionSolver: Send {
    fn run_pressure(&mut self, divergence: &Field2<f32>, pressure: &mut FieldPair<f32>);
    fn run_viscosity(&mut self, velocity: &mut FieldPair<Vec2>, dt: f32);
    fn name(&self) -> &'static str;
    /// The grid the solver's scratch buffers were sized for.
    fn grid(&self) -> Grid2;
}

/// Central-difference divergence with no-through-flow walls.
pub fn divergence_into(out: &mut Field2<f32>, velocity: &Field2<Vec2>) {
    let grid = velocity.grid();
    let width = grid.width();
    let height = grid.height();
    let half_inv_dx = 0.5 / grid.dx();
    out.fill_with_index(|x, y| {
        let vc = velocity.get(x, y);
        let vl = if x == 0 { -vc.x } else { velocity.get(x - 1, y).x };
        let vr = if x + 1 == width { -vc.x } else { velocity.get(x + 1, y).x };
        let vb = if y == 0 { -vc.y } else { velocity.get(x, y - 1).y };
        let vt = if y + 1 == height { -vc.y } else { velocity.get(x, y + 1).y };
        (vr - vl + vt - vb) * half_inv_dx
    });
}

pub fn divergence(velocity: &Field2<Vec2>) -> Field2<f32> {
    let mut out = Field2::zeros(velocity.grid());
    divergence_into(&mut out, velocity);
    out
}

pub fn subtract_gradient(velocity: &mut Field2<Vec2>, pressure: &Field2<f32>) {
    let half_inv_dx = 0.5 / pressure.grid().dx();
    velocity.update_with_index(|x, y, v| {
        let xi = x as i32;
        let yi = y as i32;
        let pl = pressure.sample_clamped(xi - 1, yi);
        let pr = pressure.sample_clamped(xi + 1, yi);
        let pb = pressure.sample_clamped(xi, yi - 1);
        let pt = pressure.sample_clamped(xi, yi + 1);
        v.sub(Vec2::new(pr - pl, pt - pb).scale(half_inv_dx))
    });
}

fn neighbor_sum<T: crate::FieldValue>(field: &Field2<T>, x: usize, y: usize) -> T {
    let xi = x as i32;
    let yi = y as i32;
    field
        .sample_clamped(xi - 1, yi)
        .add(field.sample_clamped(xi + 1, yi))
        .add(field.sample_clamped(xi, yi - 1))
        .add(field.sample_clamped(xi, yi + 1))
}

fn pressure_update(pressure: &Field2<f32>, divergence: &Field2<f32>, dx2: f32, x: usize, y: usize) -> f32 {
    (neighbor_sum(pressure, x, y) - dx2 * divergence.get(x, y)) * 0.25
}

/// Implicit diffusion `(I - nu dt lap) v = v0` by Jacobi sweeps.
#[derive(Clone, Debug)]
pub struct ImplicitViscosity {
    viscosity: f32,
    iterations: usize,
    rhs: Field2<Vec2>,
}

impl ImplicitViscosity {
    pub fn new(grid: Grid2, viscosity: f32, iterations: usize) -> Self {
        Self {
            viscosity,
            iterations,
            rhs: Field2::zeros(grid),
        }
    }

    pub fn grid(&self) -> Grid2 {
        self.rhs.grid()
    }

    pub fn run(&mut self, velocity: &mut FieldPair<Vec2>, dt: f32) {
        if self.viscosity <= 0.0 || self.iterations == 0 || dt == 0.0 {
            return;
        }
        let dx = velocity.grid().dx();
        let alpha = self.viscosity * dt / (dx * dx);
        let inv_denom = 1.0 / (1.0 + 4.0 * alpha);
        self.rhs.clone_from(velocity.cur());
        let rhs = &self.rhs;
        for _ in 0..self.iterations {
            let (v, v_nxt) = velocity.split_mut();
            v_nxt.fill_with_index(|x, y| {
                rhs.get(x, y)
                    .add(neighbor_sum(v, x, y).scale(alpha))
                    .scale(inv_denom)
            });
            velocity.swap();
        }
    }
}

pub struct JacobiProjection {
    iterations: usize,
    viscosity: ImplicitViscosity,
}

impl JacobiProjection {
    pub fn new(grid: Grid2, iterations: usize, viscosity: f32, viscosity_iters: usize) -> Self {
        Self {
            iterations,
            viscosity: ImplicitViscosity::new(grid, viscosity, viscosity_iters),
        }
    }
}

impl ProjectionSolver for JacobiProjection {
    fn run_pressure(&mut self, divergence: &Field2<f32>, pressure: &mut FieldPair<f32>) {
        let dx = divergence.grid().dx();
        let dx2 = dx * dx;
        for _ in 0..self.iterations {
            let (p, p_nxt) = pressure.split_mut();
            p_nxt.fill_with_index(|x, y| pressure_update(p, divergence, dx2, x, y));
            pressure.swap();
        }
    }

    fn run_viscosity(&mut self, velocity: &mut FieldPair<Vec2>, dt: f32) {
        self.viscosity.run(velocity, dt);
    }

    fn name(&self) -> &'static str {
        "jacobi"
    }

    fn grid(&self) -> Grid2 {
        self.viscosity.grid()
    }
}

/// Gauss-Seidel in two colour half-sweeps. Each half-sweep goes through the
/// pressure pair, so cells of one colour only read cells of the other.
pub struct RedBlackGaussSeidelProjection {
    iterations: usize,
    viscosity: ImplicitViscosity,
}

impl RedBlackGaussSeidelProjection {
    pub fn new(grid: Grid2, iterations: usize, viscosity: f32, viscosity_iters: usize) -> Self {
        Self {
            iterations,
            viscosity: ImplicitViscosity::new(grid, viscosity, viscosity_iters),
        }
    }
}

impl ProjectionSolver for RedBlackGaussSeidelProjection {
    fn run_pressure(&mut self, divergence: &Field2<f32>, pressure: &mut FieldPair<f32>) {
        let dx = divergence.grid().dx();
        let dx2 = dx * dx;
        for _ in 0..self.iterations {
            for parity in [0, 1] {
                let (p, p_nxt) = pressure.split_mut();
                p_nxt.fill_with_index(|x, y| {
                    if (x + y) % 2 == parity {
                        pressure_update(p, divergence, dx2, x, y)
                    } else {
                        p.get(x, y)
                    }
                });
                pressure.swap();
            }
        }
    }

    fn run_viscosity(&mut self, velocity: &mut FieldPair<Vec2>, dt: f32) {
        self.viscosity.run(velocity, dt);
    }

    fn name(&self) -> &'static str {
        "red_black_gauss_seidel"
    }

    fn grid(&self) -> Grid2 {
        self.viscosity.grid()
    }
}

pub fn projection_solver(
    kind: ProjectionType,
    grid: Grid2,
    iterations: usize,
    viscosity: f32,
    viscosity_iters: usize,
) -> Box<dyn ProjectionSolver> {
    match kind {
        ProjectionType::Jacobi => Box::new(JacobiProjection::new(
            grid,
            iterations,
            viscosity,
            viscosity_iters,
        )),
        ProjectionType::RedBlackGaussSeidel => Box::new(RedBlackGaussSeidelProjection::new(
            grid,
            iterations,
            viscosity,
            viscosity_iters,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    fn max_abs(field: &Field2<f32>) -> f32 {
        field.max_abs_component()
    }

    fn jet(grid: Grid2) -> Field2<Vec2> {
        Field2::from_fn(grid, |x, y| {
            let dx = x as f32 + 0.5 - 5.0;
            let dy = y as f32 + 0.5 - 4.0;
            Vec2::new((-(dx * dx + dy * dy) * 0.2).exp() * 3.0, 0.0)
        })
    }

    #[test]
    fn divergence_of_zero_velocity_is_zero() {
        let grid = Grid2::new(5, 4, 1.0);
        let div = divergence(&Field2::zeros(grid));
        assert_eq!(div.abs_sum(), 0.0);
    }

    #[test]
    fn divergence_of_linear_expansion_in_interior() {
        let grid = Grid2::new(6, 6, 0.5);
        let velocity = Field2::from_fn(grid, |x, y| {
            let (px, py) = grid.cell_center(x, y);
            Vec2::new(px, py)
        });
        let div = divergence(&velocity);
        assert_close(div.get(2, 3), 2.0, 1e-5);
    }

    #[test]
    fn divergence_treats_walls_as_mirrored() {
        let grid = Grid2::new(3, 1, 1.0);
        let velocity = Field2::new(grid, Vec2::new(1.0, 0.0));
        let div = divergence(&velocity);
        assert_close(div.get(0, 0), 1.0, 1e-6);
        assert_close(div.get(1, 0), 0.0, 1e-6);
        assert_close(div.get(2, 0), -1.0, 1e-6);
    }

    #[test]
    fn subtract_gradient_of_constant_pressure_is_noop() {
        let grid = Grid2::new(4, 4, 1.0);
        let mut velocity = jet(grid);
        let before = velocity.clone();
        subtract_gradient(&mut velocity, &Field2::new(grid, 3.0));
        assert_eq!(velocity, before);
    }

    #[test]
    fn subtract_gradient_uses_central_difference() {
        let grid = Grid2::new(4, 4, 0.5);
        let pressure = Field2::from_fn(grid, |x, _| x as f32);
        let mut velocity = Field2::zeros(grid);
        subtract_gradient(&mut velocity, &pressure);
        assert_close(velocity.get(1, 1).x, -2.0, 1e-6);
        assert_close(velocity.get(1, 1).y, 0.0, 1e-6);
    }

    fn projected_divergence(mut solver: Box<dyn ProjectionSolver>) -> (f32, f32) {
        let grid = Grid2::new(10, 8, 1.0);
        let mut velocity = jet(grid);
        let div = divergence(&velocity);
        let mut pressure = FieldPair::zeros(grid);
        solver.run_pressure(&div, &mut pressure);
        subtract_gradient(&mut velocity, pressure.cur());
        (max_abs(&div), max_abs(&divergence(&velocity)))
    }

    #[test]
    fn jacobi_projection_reduces_divergence() {
        let grid = Grid2::new(10, 8, 1.0);
        let (before, after) = projected_divergence(projection_solver(
            ProjectionType::Jacobi,
            grid,
            40,
            0.0,
            0,
        ));
        assert!(after < before * 0.7, "divergence {before} -> {after}");
    }

    #[test]
    fn red_black_projection_reduces_divergence() {
        let grid = Grid2::new(10, 8, 1.0);
        let (before, after) = projected_divergence(projection_solver(
            ProjectionType::RedBlackGaussSeidel,
            grid,
            40,
            0.0,
            0,
        ));
        assert!(after < before * 0.7, "divergence {before} -> {after}");
    }

    #[test]
    fn zero_viscosity_leaves_velocity_untouched() {
        let grid = Grid2::new(6, 6, 1.0);
        let mut solver = JacobiProjection::new(grid, 10, 0.0, 20);
        let mut velocity = FieldPair::zeros(grid);
        velocity.cur_mut().clone_from(&jet(grid));
        let before = velocity.cur().clone();
        solver.run_viscosity(&mut velocity, 0.1);
        assert_eq!(velocity.cur(), &before);
    }

    #[test]
    fn viscosity_smooths_peak_and_keeps_bounds() {
        let grid = Grid2::new(10, 8, 1.0);
        let mut solver = JacobiProjection::new(grid, 10, 0.5, 20);
        let mut velocity = FieldPair::zeros(grid);
        velocity.cur_mut().clone_from(&jet(grid));
        let peak = velocity.cur().max_abs_component();
        solver.run_viscosity(&mut velocity, 1.0);
        let smoothed = velocity.cur().max_abs_component();
        assert!(smoothed < peak, "peak {peak} -> {smoothed}");
        assert!(velocity.cur().as_slice().iter().all(|v| v.x >= 0.0 && v.y == 0.0));
    }
}
