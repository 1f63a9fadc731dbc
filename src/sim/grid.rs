//! Discrete grid primitives for the cell-based games
//!
//! Row 0 is the top of the board; `y` grows downward.

use serde::{Deserialize, Serialize};

use super::rng::SimRng;

/// Cardinal direction on a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Cell delta `(dx, dy)` for one step
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Integer cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn shifted(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Fixed-size rectangular grid stored row-major in a flat vector
///
/// Dimensions are set at construction and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            cells: vec![value; width * height],
        }
    }

    /// Build from nested rows; `None` if the rows are ragged or empty
    pub fn from_rows(rows: Vec<Vec<T>>) -> Option<Self> {
        let height = rows.len();
        let width = rows.first()?.len();
        if width == 0 || rows.iter().any(|r| r.len() != width) {
            return None;
        }
        Some(Self {
            width,
            height,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    #[inline]
    fn index(&self, pos: GridPos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width + pos.x as usize)
    }

    pub fn get(&self, pos: GridPos) -> Option<&T> {
        self.index(pos).map(|i| &self.cells[i])
    }

    /// Write a cell; out-of-bounds writes are ignored and return false
    pub fn set(&mut self, pos: GridPos, value: T) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    pub fn row(&self, y: usize) -> &[T] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.width)
    }

    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.rows().map(<[T]>::to_vec).collect()
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Positions of every cell matching `pred`, in row-major order
    pub fn positions_where(&self, pred: impl Fn(&T) -> bool) -> Vec<GridPos> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| pred(c))
            .map(|(i, _)| GridPos::new((i % self.width) as i32, (i / self.width) as i32))
            .collect()
    }

    /// Clockwise quarter turn; a `w x h` grid becomes `h x w`
    pub fn rotated_cw(&self) -> Self {
        let rows = rotate_cw(&self.to_rows());
        Self {
            width: self.height,
            height: self.width,
            cells: rows.into_iter().flatten().collect(),
        }
    }
}

/// Rotate a rectangular matrix 90 degrees clockwise (transpose, then reverse each row)
pub fn rotate_cw<T: Clone>(m: &[Vec<T>]) -> Vec<Vec<T>> {
    let Some(first) = m.first() else {
        return Vec::new();
    };
    (0..first.len())
        .map(|col| m.iter().rev().map(|row| row[col].clone()).collect())
        .collect()
}

/// Uniform choice among candidate cells
pub fn random_cell(rng: &mut SimRng, candidates: &[GridPos]) -> Option<GridPos> {
    rng.pick(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_cw_rectangular() {
        // J piece
        let m = vec![vec![1, 0, 0], vec![1, 1, 1]];
        let r = rotate_cw(&m);
        assert_eq!(r, vec![vec![1, 1], vec![1, 0], vec![1, 0]]);
        // Four turns return to the start
        let back = rotate_cw(&rotate_cw(&rotate_cw(&r)));
        assert_eq!(back, m);
    }

    #[test]
    fn test_rotate_empty() {
        let m: Vec<Vec<u8>> = Vec::new();
        assert!(rotate_cw(&m).is_empty());
    }

    #[test]
    fn test_grid_bounds() {
        let mut g = Grid::filled(3, 2, 0u8);
        assert!(g.in_bounds(GridPos::new(2, 1)));
        assert!(!g.in_bounds(GridPos::new(3, 0)));
        assert!(!g.in_bounds(GridPos::new(0, -1)));
        assert!(g.set(GridPos::new(1, 1), 5));
        assert!(!g.set(GridPos::new(-1, 0), 5));
        assert_eq!(g.get(GridPos::new(1, 1)), Some(&5));
        assert_eq!(g.row(1), &[0, 5, 0]);
    }

    #[test]
    fn test_grid_rotated_cw_dims() {
        let g = Grid::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        let r = g.rotated_cw();
        assert_eq!((r.width(), r.height()), (2, 3));
        assert_eq!(r.to_rows(), vec![vec![4, 1], vec![5, 2], vec![6, 3]]);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        assert!(Grid::from_rows(vec![vec![1, 2], vec![3]]).is_none());
        assert!(Grid::<u8>::from_rows(Vec::new()).is_none());
    }

    #[test]
    fn test_positions_where() {
        let g = Grid::from_rows(vec![vec![0, 1], vec![1, 0]]).unwrap();
        assert_eq!(
            g.positions_where(|&c| c == 0),
            vec![GridPos::new(0, 0), GridPos::new(1, 1)]
        );
    }

    #[test]
    fn test_direction_opposites() {
        for d in Direction::ALL {
            assert_eq!(d.opposite().opposite(), d);
            let p = GridPos::new(4, 4).offset(d).offset(d.opposite());
            assert_eq!(p, GridPos::new(4, 4));
        }
    }
}
