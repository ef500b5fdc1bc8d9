use ndarray::Array2;

/// Single coordinate axis used for field width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    (a as CellCount).saturating_mul(b as CellCount)
}

/// The 8-neighborhood, center excluded, in row-major order.
const NEIGHBOR_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

fn shift((x, y): Coord2, (dx, dy): (i8, i8), (width, height): Coord2) -> Option<Coord2> {
    let x = x.checked_add_signed(dx).filter(|&x| x < width)?;
    let y = y.checked_add_signed(dy).filter(|&y| y < height)?;
    Some((x, y))
}

/// In-bounds neighbors of a cell, clipped to the grid edges.
#[derive(Clone, Debug)]
pub struct Neighbors {
    center: Coord2,
    bounds: Coord2,
    next: usize,
}

impl Neighbors {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            next: 0,
        }
    }
}

impl Iterator for Neighbors {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&delta) = NEIGHBOR_OFFSETS.get(self.next) {
            self.next += 1;
            if let Some(coords) = shift(self.center, delta, self.bounds) {
                return Some(coords);
            }
        }
        None
    }
}

/// Grid helpers shared by everything stored as an `Array2` indexed by `(x, y)`.
pub trait GridExt {
    fn size2(&self) -> Coord2;

    fn contains2(&self, coords: Coord2) -> bool {
        let (width, height) = self.size2();
        coords.0 < width && coords.1 < height
    }

    fn neighbors(&self, center: Coord2) -> Neighbors {
        Neighbors::new(center, self.size2())
    }
}

impl<T> GridExt for Array2<T> {
    fn size2(&self) -> Coord2 {
        // dimensions are bounded by `Coord` when the grid is built
        let (width, height) = self.dim();
        (
            Coord::try_from(width).unwrap_or(Coord::MAX),
            Coord::try_from(height).unwrap_or(Coord::MAX),
        )
    }
}
