//! Terrain map characters and the classes the generator reasons about

pub const INACCESSIBLE: char = 'i';
pub const LAKE: char = '+';
pub const OCEAN: char = ' ';
pub const DEEP_OCEAN: char = ':';
pub const GLACIER: char = 'a';
/// Player-map marker for a tile the player has never seen
pub const UNKNOWN: char = 'u';

/// Land terrains a reclaimed ocean tile may become
pub const LAND_TERRAINS: [char; 9] = ['d', 'h', 'j', 'm', 's', 't', 'f', 'g', 'p'];

/// Classic ruleset terrain names and their map characters
pub const CLASSIC_IDENTS: [(&str, char); 14] = [
    ("inaccessible", INACCESSIBLE),
    ("lake", LAKE),
    ("ocean", OCEAN),
    ("deep ocean", DEEP_OCEAN),
    ("glacier", GLACIER),
    ("desert", 'd'),
    ("forest", 'f'),
    ("grassland", 'g'),
    ("hills", 'h'),
    ("jungle", 'j'),
    ("mountains", 'm'),
    ("plains", 'p'),
    ("swamp", 's'),
    ("tundra", 't'),
];

/// Tiles no land unit or city may stand on
#[inline]
pub fn is_blocked(terrain: char) -> bool {
    matches!(terrain, INACCESSIBLE | OCEAN | DEEP_OCEAN | GLACIER | LAKE)
}

/// Tiles ranked last by the keep-ocean top-k policy
#[inline]
pub fn is_zero_class(terrain: char) -> bool {
    matches!(terrain, INACCESSIBLE | OCEAN | DEEP_OCEAN | GLACIER)
}

#[inline]
pub fn is_ocean(terrain: char) -> bool {
    matches!(terrain, OCEAN | DEEP_OCEAN)
}

#[inline]
pub fn is_land(terrain: char) -> bool {
    LAND_TERRAINS.contains(&terrain)
}
