//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// A tile address on the map, row-major (`row` is latitude, `col` longitude)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub row: usize,
    pub col: usize,
}

impl Location {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Plain taxicab distance, no wraparound
    pub fn manhattan(&self, other: &Location) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Food / shield / trade productivity triple
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Fpt {
    pub food: f64,
    pub shield: f64,
    pub trade: f64,
}

impl Fpt {
    pub const ZERO: Fpt = Fpt { food: 0.0, shield: 0.0, trade: 0.0 };

    pub fn new(food: f64, shield: f64, trade: f64) -> Self {
        Self { food, shield, trade }
    }

    pub fn is_zero(&self) -> bool {
        self.food == 0.0 && self.shield == 0.0 && self.trade == 0.0
    }
}

impl std::ops::Add for Fpt {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            food: self.food + rhs.food,
            shield: self.shield + rhs.shield,
            trade: self.trade + rhs.trade,
        }
    }
}

impl std::ops::Sub for Fpt {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            food: self.food - rhs.food,
            shield: self.shield - rhs.shield,
            trade: self.trade - rhs.trade,
        }
    }
}

impl std::ops::AddAssign for Fpt {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::ops::SubAssign for Fpt {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl std::iter::Sum for Fpt {
    fn sum<I: Iterator<Item = Fpt>>(iter: I) -> Self {
        iter.fold(Fpt::ZERO, |acc, f| acc + f)
    }
}

/// Weights collapsing an [`Fpt`] into one comparable score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub food: f64,
    pub shield: f64,
    pub trade: f64,
}

impl Default for Weight {
    fn default() -> Self {
        Self { food: 0.4, shield: 0.4, trade: 0.2 }
    }
}

impl Weight {
    pub fn new(food: f64, shield: f64, trade: f64) -> Self {
        Self { food, shield, trade }
    }

    /// Weighted sum, rounded to 6 places to absorb float noise
    pub fn apply(&self, fpt: &Fpt) -> f64 {
        round_to(
            fpt.food * self.food + fpt.shield * self.shield + fpt.trade * self.trade,
            6,
        )
    }

    /// Weighted sum at comparison precision (3 places)
    pub fn score(&self, fpt: &Fpt) -> f64 {
        round_score(self.apply(fpt))
    }
}

/// Round to the fixed comparison precision used for buckets and bounds
#[inline]
pub fn round_score(value: f64) -> f64 {
    round_to(value, 3)
}

#[inline]
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Inclusive target band for the top-k scope score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBound {
    pub lower: f64,
    pub upper: f64,
}

impl ScoreBound {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, score: f64) -> bool {
        score >= self.lower && score <= self.upper
    }
}
