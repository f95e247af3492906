/// A named place with geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Place {
    pub name: &'static str,
    pub lon: f64,
    pub lat: f64,
}

/// Read-only registry of well-known places used as map anchors.
pub const NAMED_PLACES: &[Place] = &[
    Place {
        name: "Canico",
        lon: -16.8527449,
        lat: 32.6540819,
    },
    Place {
        name: "Brandenburger Tor",
        lon: 13.377777777778,
        lat: 52.516388888889,
    },
];

pub fn place_by_name(name: &str) -> Option<Place> {
    NAMED_PLACES.iter().copied().find(|place| place.name == name)
}
