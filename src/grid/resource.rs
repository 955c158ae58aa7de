//! Resource codes of the extras layers
//!
//! Each `e0N` layer stores one hex digit per tile. The pair (layer, digit)
//! names a resource, printed `e0N_D`. Digit `0` means the tile holds nothing
//! on that layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::ScenarioError;

pub const EMPTY_DIGIT: char = '0';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceCode {
    pub layer: u8,
    pub digit: char,
}

impl ResourceCode {
    pub const fn new(layer: u8, digit: char) -> Self {
        Self { layer, digit }
    }

    pub fn is_empty(&self) -> bool {
        self.digit == EMPTY_DIGIT
    }

    /// Field series prefix of the layer holding this code (`e03`)
    pub fn layer_prefix(&self) -> String {
        layer_prefix(self.layer)
    }
}

pub fn layer_prefix(layer: u8) -> String {
    format!("e{:02}", layer)
}

/// Layer id of an `e0N` series prefix
pub fn parse_layer_prefix(prefix: &str) -> Option<u8> {
    let digits = prefix.strip_prefix('e')?;
    if digits.len() == 2 && digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

impl fmt::Display for ResourceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{:02}_{}", self.layer, self.digit)
    }
}

impl FromStr for ResourceCode {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScenarioError::Config(format!("invalid resource code `{}`", s));
        let (prefix, digit) = s.split_once('_').ok_or_else(invalid)?;
        let layer = parse_layer_prefix(prefix).ok_or_else(invalid)?;
        let mut chars = digit.chars();
        match (chars.next(), chars.next()) {
            (Some(d), None) if d.is_ascii_hexdigit() => Ok(Self::new(layer, d)),
            _ => Err(invalid()),
        }
    }
}

/// Every named extra of the classic save format
pub const EXTRA_CODES: [(&str, ResourceCode); 34] = [
    ("irrigation", ResourceCode::new(0, '1')),
    ("mine", ResourceCode::new(0, '2')),
    ("oil well", ResourceCode::new(0, '4')),
    ("pollution", ResourceCode::new(0, '8')),
    ("hut", ResourceCode::new(1, '1')),
    ("fallout", ResourceCode::new(1, '2')),
    ("farmland", ResourceCode::new(1, '4')),
    ("fortress", ResourceCode::new(1, '8')),
    ("airbase", ResourceCode::new(2, '1')),
    ("buoy", ResourceCode::new(2, '2')),
    ("ruins", ResourceCode::new(2, '4')),
    ("road", ResourceCode::new(2, '8')),
    ("railroad", ResourceCode::new(3, '1')),
    ("river", ResourceCode::new(3, '2')),
    ("gold", ResourceCode::new(3, '4')),
    ("iron", ResourceCode::new(3, '8')),
    ("game", ResourceCode::new(4, '1')),
    ("furs", ResourceCode::new(4, '2')),
    ("coal", ResourceCode::new(4, '4')),
    ("fish", ResourceCode::new(4, '8')),
    ("fruit", ResourceCode::new(5, '1')),
    ("gems", ResourceCode::new(5, '2')),
    ("buffalo", ResourceCode::new(5, '4')),
    ("wheat", ResourceCode::new(5, '8')),
    ("oasis", ResourceCode::new(6, '1')),
    ("peat", ResourceCode::new(6, '2')),
    ("pheasant", ResourceCode::new(6, '4')),
    ("resources", ResourceCode::new(6, '8')),
    ("ivory", ResourceCode::new(7, '1')),
    ("silk", ResourceCode::new(7, '2')),
    ("spice", ResourceCode::new(7, '4')),
    ("whales", ResourceCode::new(7, '8')),
    ("wine", ResourceCode::new(8, '1')),
    ("oil", ResourceCode::new(8, '2')),
];

/// The extras that are tile resources rather than improvements
pub const RESOURCE_NAMES: [&str; 20] = [
    "gold", "iron", "game", "furs", "coal", "fish", "fruit", "gems", "buffalo", "wheat", "oasis",
    "peat", "pheasant", "resources", "ivory", "silk", "spice", "whales", "wine", "oil",
];

pub fn code_for(name: &str) -> Option<ResourceCode> {
    let name = name.to_lowercase();
    EXTRA_CODES.iter().find(|(n, _)| *n == name).map(|(_, c)| *c)
}

pub fn name_for(code: ResourceCode) -> Option<&'static str> {
    EXTRA_CODES.iter().find(|(_, c)| *c == code).map(|(n, _)| *n)
}
