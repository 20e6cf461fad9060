use crate::{grid::Grid2, parallel::should_parallel, value::FieldValue};
use rayon::prelude::*;

/// Dense cell-centred field. Cell `(x, y)` sits at `(x + 0.5, y + 0.5) * dx`.
#[derive(Clone, Debug, PartialEq)]
pub struct Field2<T: FieldValue = f32> {
    grid: Grid2,
    data: Vec<T>,
}

impl<T: FieldValue> Field2<T> {
    pub fn new(grid: Grid2, fill: T) -> Self {
        let data = vec![fill; grid.size()];
        Self { grid, data }
    }

    pub fn zeros(grid: Grid2) -> Self {
        Self::new(grid, T::zero())
    }

    pub fn from_fn(grid: Grid2, f: impl Fn(usize, usize) -> T + Sync) -> Self {
        let mut field = Self::zeros(grid);
        field.fill_with_index(f);
        field
    }

    pub fn grid(&self) -> Grid2 {
        self.grid
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.grid.idx(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let i = self.grid.idx(x, y);
        self.data[i] = value;
    }

    pub fn sample_clamped(&self, x: i32, y: i32) -> T {
        let (cx, cy) = self.grid.clamp_coord(x, y);
        self.get(cx, cy)
    }

    fn stencil(&self, pos: (f32, f32)) -> ([T; 4], f32, f32) {
        let ((x0, y0), (sx, sy)) = self.grid.locate(pos);
        let nodes = [
            self.sample_clamped(x0, y0),
            self.sample_clamped(x0 + 1, y0),
            self.sample_clamped(x0, y0 + 1),
            self.sample_clamped(x0 + 1, y0 + 1),
        ];
        (nodes, sx, sy)
    }

    /// Bilinear interpolation with clamp-to-edge, the `interpolate_value` of the grid.
    pub fn sample_linear(&self, pos: (f32, f32)) -> T {
        let ([v00, v10, v01, v11], sx, sy) = self.stencil(pos);
        let vx0 = v00.lerp(v10, sx);
        let vx1 = v01.lerp(v11, sx);
        vx0.lerp(vx1, sy)
    }

    /// Component-wise bounds of the four nodes `sample_linear` would blend at `pos`.
    pub fn sample_minmax(&self, pos: (f32, f32)) -> (T, T) {
        let (nodes, _, _) = self.stencil(pos);
        let mut min_value = nodes[0];
        let mut max_value = nodes[0];
        for node in &nodes[1..] {
            min_value = min_value.component_min(*node);
            max_value = max_value.component_max(*node);
        }
        (min_value, max_value)
    }

    pub fn fill(&mut self, value: T) {
        if should_parallel(self.data.len()) {
            self.data.par_iter_mut().for_each(|v| *v = value);
        } else {
            self.data.iter_mut().for_each(|v| *v = value);
        }
    }

    pub fn fill_with_index(&mut self, f: impl Fn(usize, usize) -> T + Sync) {
        let grid = self.grid;
        if should_parallel(self.data.len()) {
            self.data.par_iter_mut().enumerate().for_each(|(i, value)| {
                let (x, y) = grid.coords(i);
                *value = f(x, y);
            });
        } else {
            for (i, value) in self.data.iter_mut().enumerate() {
                let (x, y) = grid.coords(i);
                *value = f(x, y);
            }
        }
    }

    pub fn update_with_index(&mut self, f: impl Fn(usize, usize, T) -> T + Sync) {
        let grid = self.grid;
        if should_parallel(self.data.len()) {
            self.data.par_iter_mut().enumerate().for_each(|(i, value)| {
                let (x, y) = grid.coords(i);
                *value = f(x, y, *value);
            });
        } else {
            for (i, value) in self.data.iter_mut().enumerate() {
                let (x, y) = grid.coords(i);
                *value = f(x, y, *value);
            }
        }
    }

    /// Per-cell kernel that mutates this field and `other` together.
    pub fn update_zip_with_index<U: FieldValue>(
        &mut self,
        other: &mut Field2<U>,
        f: impl Fn(usize, usize, &mut T, &mut U) + Sync,
    ) {
        assert_eq!(self.grid, other.grid, "field grid mismatch");
        let grid = self.grid;
        if should_parallel(self.data.len()) {
            self.data
                .par_iter_mut()
                .zip(other.data.par_iter_mut())
                .enumerate()
                .for_each(|(i, (a, b))| {
                    let (x, y) = grid.coords(i);
                    f(x, y, a, b)
                });
        } else {
            for (i, (a, b)) in self.data.iter_mut().zip(other.data.iter_mut()).enumerate() {
                let (x, y) = grid.coords(i);
                f(x, y, a, b);
            }
        }
    }

    pub fn clone_from(&mut self, other: &Self) {
        assert_eq!(self.grid, other.grid, "field grid mismatch");
        self.data.copy_from_slice(&other.data);
    }

    pub fn sum(&self) -> T {
        if should_parallel(self.data.len()) {
            self.data
                .par_iter()
                .copied()
                .reduce(T::zero, FieldValue::add)
        } else {
            self.data.iter().copied().fold(T::zero(), FieldValue::add)
        }
    }

    pub fn max_abs_component(&self) -> f32 {
        if should_parallel(self.data.len()) {
            self.data
                .par_iter()
                .map(FieldValue::max_abs_component)
                .reduce(|| 0.0_f32, f32::max)
        } else {
            self.data
                .iter()
                .map(FieldValue::max_abs_component)
                .fold(0.0_f32, f32::max)
        }
    }

    pub fn all_finite(&self) -> bool {
        self.data.iter().all(FieldValue::all_finite)
    }
}

impl Field2<f32> {
    pub fn abs_sum(&self) -> f32 {
        if should_parallel(self.data.len()) {
            self.data.par_iter().map(|value| value.abs()).sum()
        } else {
            self.data.iter().map(|value| value.abs()).sum()
        }
    }

    pub fn sum_squares(&self) -> f32 {
        if should_parallel(self.data.len()) {
            self.data.par_iter().map(|value| value * value).sum()
        } else {
            self.data.iter().map(|value| value * value).sum()
        }
    }
}
