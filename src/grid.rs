/// Uniform collocated grid: every field value lives at a cell centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid2 {
    width: usize,
    height: usize,
    dx: f32,
}

impl Grid2 {
    pub fn new(width: usize, height: usize, dx: f32) -> Self {
        assert!(width > 0 && height > 0, "grid must be non-empty");
        assert!(dx > 0.0, "cell size must be > 0");
        Self { width, height, dx }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dx(&self) -> f32 {
        self.dx
    }

    pub fn size(&self) -> usize {
        self.width * self.height
    }

    /// Row-major: `x` runs fastest.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    pub fn coords(&self, i: usize) -> (usize, usize) {
        (i % self.width, i / self.width)
    }

    pub fn clamp_coord(&self, x: i32, y: i32) -> (usize, usize) {
        let cx = x.clamp(0, self.width as i32 - 1);
        let cy = y.clamp(0, self.height as i32 - 1);
        (cx as usize, cy as usize)
    }

    pub fn cell_center(&self, x: usize, y: usize) -> (f32, f32) {
        ((x as f32 + 0.5) * self.dx, (y as f32 + 0.5) * self.dx)
    }

    /// Lower-left interpolation node and fractional offsets for a world position.
    /// Positions beyond the domain are pulled in to one node past the edge, so
    /// the node indices always fit in `i32` with room for the `+1` neighbour.
    pub fn locate(&self, pos: (f32, f32)) -> ((i32, i32), (f32, f32)) {
        let gx = (pos.0 / self.dx - 0.5).clamp(-1.0, self.width as f32);
        let gy = (pos.1 / self.dx - 0.5).clamp(-1.0, self.height as f32);
        let x0 = gx.floor();
        let y0 = gy.floor();
        ((x0 as i32, y0 as i32), (gx - x0, gy - y0))
    }
}
