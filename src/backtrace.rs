use crate::{Field2, Vec2};
use serde::{Deserialize, Serialize};

/// Runge-Kutta order used when tracing a point through the velocity field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BacktraceOrder {
    Rk1,
    #[default]
    Rk2,
    Rk3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SemiLagrangian {
    order: BacktraceOrder,
}

impl SemiLagrangian {
    pub fn new(order: BacktraceOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> BacktraceOrder {
        self.order
    }

    /// Where a parcel at `pos` was `dt` ago. A negative `dt` traces forward.
    pub fn backtrace(&self, velocity: &Field2<Vec2>, pos: (f32, f32), dt: f32) -> (f32, f32) {
        let p = Vec2::from(pos);
        let sample = |q: Vec2| velocity.sample_linear((q.x, q.y));
        let back = match self.order {
            BacktraceOrder::Rk1 => p.sub(sample(p).scale(dt)),
            BacktraceOrder::Rk2 => {
                let mid = p.sub(sample(p).scale(0.5 * dt));
                p.sub(sample(mid).scale(dt))
            }
            BacktraceOrder::Rk3 => {
                let k1 = sample(p);
                let k2 = sample(p.sub(k1.scale(0.5 * dt)));
                let k3 = sample(p.sub(k2.scale(0.75 * dt)));
                let v = k1
                    .scale(2.0 / 9.0)
                    .add(k2.scale(1.0 / 3.0))
                    .add(k3.scale(4.0 / 9.0));
                p.sub(v.scale(dt))
            }
        };
        (back.x, back.y)
    }
}

impl Default for SemiLagrangian {
    fn default() -> Self {
        Self::new(BacktraceOrder::default())
    }
}
