//! Unit vision ranges and the units that move on water

/// Vision radius (squared tiles) of the classic unit set
pub const VISION_RANGES: [(&str, u32); 52] = [
    ("settlers", 2),
    ("workers", 2),
    ("engineers", 2),
    ("warriors", 2),
    ("phalanx", 2),
    ("archers", 2),
    ("legion", 2),
    ("pikemen", 2),
    ("musketeers", 2),
    ("partisan", 2),
    ("alpine troops", 2),
    ("riflemen", 2),
    ("marines", 2),
    ("paratroopers", 2),
    ("mech. inf.", 2),
    ("horsemen", 2),
    ("chariot", 2),
    ("knights", 2),
    ("dragoons", 2),
    ("cavalry", 2),
    ("armor", 2),
    ("catapult", 2),
    ("cannon", 2),
    ("artillery", 2),
    ("howitzer", 2),
    ("fighter", 8),
    ("bomber", 8),
    ("helicopter", 8),
    ("stealth fighter", 8),
    ("stealth bomber", 8),
    ("trireme", 2),
    ("caravel", 2),
    ("galleon", 2),
    ("frigate", 2),
    ("ironclad", 2),
    ("destroyer", 8),
    ("cruiser", 8),
    ("aegis cruiser", 8),
    ("battleship", 8),
    ("submarine", 8),
    ("carrier", 8),
    ("transport", 8),
    ("cruise missile", 2),
    ("nuclear", 2),
    ("diplomat", 2),
    ("spy", 8),
    ("caravan", 2),
    ("freight", 2),
    ("explorer", 2),
    ("leader", 8),
    ("barbarian leader", 2),
    ("awacs", 26),
];

pub const OCEAN_UNITS: [&str; 12] = [
    "aegis cruiser",
    "trireme",
    "caravel",
    "galleon",
    "frigate",
    "ironclad",
    "transport",
    "destroyer",
    "cruiser",
    "battleship",
    "submarine",
    "carrier",
];

pub fn vision_range(unit: &str) -> Option<u32> {
    let unit = unit.to_lowercase();
    VISION_RANGES.iter().find(|(n, _)| *n == unit).map(|(_, r)| *r)
}

pub fn is_ocean_unit(unit: &str) -> bool {
    let unit = unit.to_lowercase();
    OCEAN_UNITS.contains(&unit.as_str())
}
