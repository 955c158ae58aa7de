//! Generic grid for per-tile map data

use crate::core::error::{Result, ScenarioError};
use crate::core::types::Location;

/// Row-major 2D grid addressed by [`Location`]
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    pub rows: usize,
    pub cols: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new(rows: usize, cols: usize, fill: T) -> Self {
        Self { rows, cols, data: vec![fill; rows * cols] }
    }

    /// Build from nested rows; every row must have the same length
    pub fn from_rows(name: &str, rows: Vec<Vec<T>>) -> Result<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let height = rows.len();
        let mut data = Vec::with_capacity(height * cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(ScenarioError::Layer {
                    key: name.to_string(),
                    reason: format!("row {} has {} cells, expected {}", i, row.len(), cols),
                });
            }
            data.extend(row);
        }
        Ok(Self { rows: height, cols, data })
    }

    pub fn fill(&mut self, value: T) {
        self.data.iter_mut().for_each(|v| *v = value.clone());
    }

    pub fn map<U, F: Fn(&T) -> U>(&self, f: F) -> Grid<U> {
        Grid { rows: self.rows, cols: self.cols, data: self.data.iter().map(f).collect() }
    }
}

impl<T> Grid<T> {
    #[inline]
    pub fn contains(&self, loc: Location) -> bool {
        loc.row < self.rows && loc.col < self.cols
    }

    #[inline]
    fn check(&self, loc: Location) -> Result<usize> {
        if self.contains(loc) {
            Ok(loc.row * self.cols + loc.col)
        } else {
            Err(ScenarioError::Position {
                row: loc.row as isize,
                col: loc.col as isize,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    #[inline]
    pub fn get(&self, loc: Location) -> Result<&T> {
        let index = self.check(loc)?;
        Ok(&self.data[index])
    }

    #[inline]
    pub fn get_mut(&mut self, loc: Location) -> Result<&mut T> {
        let index = self.check(loc)?;
        Ok(&mut self.data[index])
    }

    #[inline]
    pub fn set(&mut self, loc: Location, value: T) -> Result<()> {
        *self.get_mut(loc)? = value;
        Ok(())
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Wrap a signed offset position on both axes
    pub fn wrap(&self, row: isize, col: isize) -> Location {
        Location::new(
            row.rem_euclid(self.rows as isize) as usize,
            col.rem_euclid(self.cols as isize) as usize,
        )
    }

    /// Wrap the column only; rows outside the grid give `None`
    pub fn wrap_col(&self, row: isize, col: isize) -> Option<Location> {
        if row < 0 || row >= self.rows as isize {
            return None;
        }
        Some(Location::new(row as usize, col.rem_euclid(self.cols as isize) as usize))
    }

    /// Unwrapped position, `None` when outside the grid
    pub fn offset(&self, row: isize, col: isize) -> Option<Location> {
        if row < 0 || col < 0 || row >= self.rows as isize || col >= self.cols as isize {
            return None;
        }
        Some(Location::new(row as usize, col as usize))
    }

    /// Unwrapped position, failing with a position error outside the grid
    pub fn locate(&self, row: isize, col: isize) -> Result<Location> {
        self.offset(row, col).ok_or(ScenarioError::Position {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        })
    }

    pub fn iter_locations(&self) -> impl Iterator<Item = Location> + '_ {
        (0..self.rows).flat_map(move |r| (0..self.cols).map(move |c| Location::new(r, c)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Location, &T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (Location::new(i / self.cols, i % self.cols), v))
    }

    pub fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }
}

impl<T> std::ops::Index<Location> for Grid<T> {
    type Output = T;
    fn index(&self, loc: Location) -> &T {
        &self.data[loc.row * self.cols + loc.col]
    }
}

impl<T> std::ops::IndexMut<Location> for Grid<T> {
    fn index_mut(&mut self, loc: Location) -> &mut T {
        &mut self.data[loc.row * self.cols + loc.col]
    }
}

impl Grid<char> {
    /// Grid of single characters from text rows
    pub fn from_text_rows<S: AsRef<str>>(name: &str, rows: &[S]) -> Result<Self> {
        Self::from_rows(name, rows.iter().map(|r| r.as_ref().chars().collect()).collect())
    }

    pub fn row_text(&self, row: usize) -> String {
        self.row(row).iter().collect()
    }
}
