use crate::{field::Field2, grid::Grid2, value::FieldValue};

/// Double-buffered field. Kernels read `cur` and write `nxt`, then `swap`.
#[derive(Clone, Debug)]
pub struct FieldPair<T: FieldValue> {
    cur: Field2<T>,
    nxt: Field2<T>,
}

impl<T: FieldValue> FieldPair<T> {
    pub fn new(grid: Grid2, fill: T) -> Self {
        Self {
            cur: Field2::new(grid, fill),
            nxt: Field2::new(grid, fill),
        }
    }

    pub fn zeros(grid: Grid2) -> Self {
        Self::new(grid, T::zero())
    }

    pub fn grid(&self) -> Grid2 {
        self.cur.grid()
    }

    pub fn cur(&self) -> &Field2<T> {
        &self.cur
    }

    pub fn nxt(&self) -> &Field2<T> {
        &self.nxt
    }

    pub fn cur_mut(&mut self) -> &mut Field2<T> {
        &mut self.cur
    }

    pub fn nxt_mut(&mut self) -> &mut Field2<T> {
        &mut self.nxt
    }

    /// Read-only `cur` alongside writable `nxt` for one kernel pass.
    pub fn split_mut(&mut self) -> (&Field2<T>, &mut Field2<T>) {
        (&self.cur, &mut self.nxt)
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.cur, &mut self.nxt);
    }

    pub fn reset(&mut self) {
        self.cur.fill(T::zero());
        self.nxt.fill(T::zero());
    }
}
