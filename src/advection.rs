use crate::{
    backtrace::{BacktraceOrder, SemiLagrangian},
    Field2, FieldValue, Vec2,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvectionType {
    SemiLagrangian,
    #[default]
    MacCormack,
}

/// Transports `q_cur` along `velocity` over `dt`, writing every cell of `q_nxt`.
///
/// `q_cur` and `velocity` are only read, so self-advection passes the same
/// buffer for both while `q_nxt` is always a distinct buffer.
pub trait AdvectionSolver {
    fn advect<T: FieldValue>(
        &self,
        velocity: &Field2<Vec2>,
        q_cur: &Field2<T>,
        q_nxt: &mut Field2<T>,
        dt: f32,
    );
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SemiLagrangianSolver {
    tracer: SemiLagrangian,
}

impl SemiLagrangianSolver {
    pub fn new(order: BacktraceOrder) -> Self {
        Self {
            tracer: SemiLagrangian::new(order),
        }
    }

    pub fn tracer(&self) -> &SemiLagrangian {
        &self.tracer
    }
}

impl AdvectionSolver for SemiLagrangianSolver {
    fn advect<T: FieldValue>(
        &self,
        velocity: &Field2<Vec2>,
        q_cur: &Field2<T>,
        q_nxt: &mut Field2<T>,
        dt: f32,
    ) {
        let grid = q_cur.grid();
        q_nxt.fill_with_index(|x, y| {
            let pos = grid.cell_center(x, y);
            let back = self.tracer.backtrace(velocity, pos, dt);
            q_cur.sample_linear(back)
        });
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MacCormackSolver {
    subsolver: SemiLagrangianSolver,
    clipping: bool,
}

impl MacCormackSolver {
    pub fn new(order: BacktraceOrder, clipping: bool) -> Self {
        Self {
            subsolver: SemiLagrangianSolver::new(order),
            clipping,
        }
    }

    pub fn clipping(&self) -> bool {
        self.clipping
    }
}

impl AdvectionSolver for MacCormackSolver {
    fn advect<T: FieldValue>(
        &self,
        velocity: &Field2<Vec2>,
        q_cur: &Field2<T>,
        q_nxt: &mut Field2<T>,
        dt: f32,
    ) {
        let grid = q_cur.grid();
        let tracer = self.subsolver.tracer();
        let clipping = self.clipping;
        q_nxt.fill_with_index(|x, y| {
            let pos = grid.cell_center(x, y);
            let p_mid = tracer.backtrace(velocity, pos, dt);
            let q_mid = q_cur.sample_linear(p_mid);

            let p_fin = tracer.backtrace(velocity, p_mid, -dt);
            let q_fin = q_cur.sample_linear(p_fin);

            let corrected = q_mid.add(q_fin.sub(q_cur.get(x, y)).scale(0.5));
            if clipping {
                let (min_value, max_value) = q_cur.sample_minmax(p_mid);
                revert_overshoot(corrected, q_mid, min_value, max_value)
            } else {
                corrected
            }
        });
    }
}

/// Falls back to the first-order estimate on every component that leaves the
/// open stencil range, rather than pinning it to the bound.
fn revert_overshoot<T: FieldValue>(corrected: T, q_mid: T, min_value: T, max_value: T) -> T {
    let mut out = corrected;
    for k in 0..T::COMPONENTS {
        let value = corrected.component(k);
        let inside = min_value.component(k) < value && value < max_value.component(k);
        if !inside {
            out.set_component(k, q_mid.component(k));
        }
    }
    out
}

/// The advection variants selectable from configuration.
#[derive(Clone, Copy, Debug)]
pub enum Advector {
    SemiLagrangian(SemiLagrangianSolver),
    MacCormack(MacCormackSolver),
}

impl Advector {
    pub fn new(kind: AdvectionType, order: BacktraceOrder, clipping: bool) -> Self {
        match kind {
            AdvectionType::SemiLagrangian => {
                Advector::SemiLagrangian(SemiLagrangianSolver::new(order))
            }
            AdvectionType::MacCormack => Advector::MacCormack(MacCormackSolver::new(order, clipping)),
        }
    }

    pub fn kind(&self) -> AdvectionType {
        match self {
            Advector::SemiLagrangian(_) => AdvectionType::SemiLagrangian,
            Advector::MacCormack(_) => AdvectionType::MacCormack,
        }
    }

    pub fn order(&self) -> BacktraceOrder {
        match self {
            Advector::SemiLagrangian(solver) => solver.tracer().order(),
            Advector::MacCormack(solver) => solver.subsolver.tracer().order(),
        }
    }

    /// Whether the MacCormack overshoot fallback is active.
    pub fn clipping(&self) -> bool {
        match self {
            Advector::SemiLagrangian(_) => false,
            Advector::MacCormack(solver) => solver.clipping(),
        }
    }
}

impl AdvectionSolver for Advector {
    fn advect<T: FieldValue>(
        &self,
        velocity: &Field2<Vec2>,
        q_cur: &Field2<T>,
        q_nxt: &mut Field2<T>,
        dt: f32,
    ) {
        match self {
            Advector::SemiLagrangian(solver) => solver.advect(velocity, q_cur, q_nxt, dt),
            Advector::MacCormack(solver) => solver.advect(velocity, q_cur, q_nxt, dt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Grid2, Vec3};

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    fn bump(grid: Grid2) -> Field2<Vec3> {
        Field2::from_fn(grid, |x, y| {
            let dx = x as f32 - 6.0;
            let dy = y as f32 - 5.0;
            let r2 = dx * dx + dy * dy;
            Vec3::new((-r2 * 0.3).exp(), if x > 6 { 1.0 } else { 0.0 }, 0.25)
        })
    }

    fn swirl(grid: Grid2) -> Field2<Vec2> {
        Field2::from_fn(grid, |x, y| {
            let (px, py) = grid.cell_center(x, y);
            Vec2::new(-(py - 6.0) * 0.8 + 0.3, (px - 6.0) * 0.8)
        })
    }

    fn all_solvers() -> Vec<Advector> {
        let mut solvers = Vec::new();
        for order in [BacktraceOrder::Rk1, BacktraceOrder::Rk2, BacktraceOrder::Rk3] {
            solvers.push(Advector::new(AdvectionType::SemiLagrangian, order, false));
            solvers.push(Advector::new(AdvectionType::MacCormack, order, false));
            solvers.push(Advector::new(AdvectionType::MacCormack, order, true));
        }
        solvers
    }

    #[test]
    fn advector_reports_its_configuration() {
        let mac = Advector::new(AdvectionType::MacCormack, BacktraceOrder::Rk3, true);
        assert_eq!(mac.kind(), AdvectionType::MacCormack);
        assert_eq!(mac.order(), BacktraceOrder::Rk3);
        assert!(mac.clipping());
        let semi = Advector::new(AdvectionType::SemiLagrangian, BacktraceOrder::Rk1, true);
        assert_eq!(semi.kind(), AdvectionType::SemiLagrangian);
        assert_eq!(semi.order(), BacktraceOrder::Rk1);
        assert!(!semi.clipping());
    }

    #[test]
    fn zero_velocity_leaves_field_unchanged() {
        let grid = Grid2::new(12, 10, 1.0);
        let velocity = Field2::zeros(grid);
        let q = bump(grid);
        for solver in all_solvers() {
            for dt in [0.1, 1.0, 7.5] {
                let mut out = Field2::zeros(grid);
                solver.advect(&velocity, &q, &mut out, dt);
                assert_eq!(out, q, "{solver:?} dt={dt}");
            }
        }
    }

    #[test]
    fn semi_lagrangian_shifts_by_whole_cells() {
        let grid = Grid2::new(6, 1, 1.0);
        let velocity = Field2::new(grid, Vec2::new(1.0, 0.0));
        let q = Field2::from_fn(grid, |x, _| x as f32);
        let mut out = Field2::zeros(grid);
        SemiLagrangianSolver::new(BacktraceOrder::Rk1).advect(&velocity, &q, &mut out, 1.0);
        assert_close(out.get(0, 0), 0.0, 1e-6);
        assert_close(out.get(3, 0), 2.0, 1e-6);
        assert_close(out.get(5, 0), 4.0, 1e-6);
    }

    #[test]
    fn mac_cormack_matches_semi_lagrangian_when_trace_is_reversible() {
        // Uniform velocity and dyadic dt make forward and backward traces exact inverses.
        let grid = Grid2::new(10, 8, 1.0);
        let velocity = Field2::new(grid, Vec2::new(1.0, -0.5));
        let q = bump(grid);
        for clipping in [false, true] {
            let mut semi = Field2::zeros(grid);
            let mut mac = Field2::zeros(grid);
            SemiLagrangianSolver::new(BacktraceOrder::Rk1).advect(&velocity, &q, &mut semi, 0.5);
            MacCormackSolver::new(BacktraceOrder::Rk1, clipping).advect(&velocity, &q, &mut mac, 0.5);
            assert_eq!(mac, semi);
        }
    }

    #[test]
    fn clipping_keeps_values_in_range_or_first_order() {
        let grid = Grid2::new(12, 10, 1.0);
        let velocity = swirl(grid);
        let q = bump(grid);
        let tracer = SemiLagrangian::new(BacktraceOrder::Rk2);
        let solver = MacCormackSolver::new(BacktraceOrder::Rk2, true);
        let mut out = Field2::zeros(grid);
        solver.advect(&velocity, &q, &mut out, 0.6);
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let p_mid = tracer.backtrace(&velocity, grid.cell_center(x, y), 0.6);
                let q_mid = q.sample_linear(p_mid);
                let (lo, hi) = q.sample_minmax(p_mid);
                let value = out.get(x, y);
                for k in 0..Vec3::COMPONENTS {
                    let c = value.component(k);
                    let in_range = lo.component(k) <= c && c <= hi.component(k);
                    assert!(
                        in_range || c == q_mid.component(k),
                        "cell ({x},{y}) component {k}: {c} outside [{}, {}]",
                        lo.component(k),
                        hi.component(k)
                    );
                }
            }
        }
    }

    #[test]
    fn clipping_reverts_to_midpoint_not_to_bound() {
        let corrected = Vec3::new(2.0, 0.5, -1.0);
        let q_mid = Vec3::new(0.9, 0.4, 0.1);
        let lo = Vec3::new(0.0, 0.0, 0.0);
        let hi = Vec3::new(1.0, 1.0, 1.0);
        let out = revert_overshoot(corrected, q_mid, lo, hi);
        assert_eq!(out, Vec3::new(0.9, 0.5, 0.1));
    }

    #[test]
    fn clipping_treats_bounds_as_outside() {
        let out = revert_overshoot(1.0_f32, 0.7, 0.0, 1.0);
        assert_eq!(out, 0.7);
    }

    #[test]
    fn unclipped_mac_cormack_can_overshoot() {
        let grid = Grid2::new(12, 1, 1.0);
        let velocity = Field2::from_fn(grid, |x, _| Vec2::new(0.2 + 0.15 * x as f32, 0.0));
        let q = Field2::from_fn(grid, |x, _| if x >= 6 { 1.0_f32 } else { 0.0 });
        let mut loose = Field2::zeros(grid);
        let mut tight = Field2::zeros(grid);
        MacCormackSolver::new(BacktraceOrder::Rk1, false).advect(&velocity, &q, &mut loose, 1.0);
        MacCormackSolver::new(BacktraceOrder::Rk1, true).advect(&velocity, &q, &mut tight, 1.0);
        let over = loose.as_slice().iter().any(|v| *v > 1.0 + 1e-6 || *v < -1e-6);
        assert!(over, "expected a step edge to overshoot without clipping");
        assert!(tight.as_slice().iter().all(|v| (-1e-6..=1.0 + 1e-6).contains(v)));
    }
}
