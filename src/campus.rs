//! Campus reference data
//!
//! A small fixed table of dorms and landmarks with coordinates, used by
//! the `dorms` command and the chat's `/map` command.

use serde::Serialize;
use std::fmt;

/// Kind of campus place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceKind {
    /// Residence hall
    Dorm,
    /// Non-residential point of interest
    Landmark,
}

impl fmt::Display for PlaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceKind::Dorm => write!(f, "dorm"),
            PlaceKind::Landmark => write!(f, "landmark"),
        }
    }
}

/// A named campus location
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Place {
    /// Canonical name
    pub name: &'static str,
    /// Dorm or landmark
    pub kind: PlaceKind,
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
    /// Shorter names the place goes by in replies
    #[serde(skip)]
    pub aliases: &'static [&'static str],
}

impl Place {
    /// All names this place is recognized by, canonical first
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }

    /// Great-circle distance to another place in kilometres
    pub fn distance_km(&self, other: &Place) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;

        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlng = (other.lng - self.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// Known dorms and landmarks
pub const PLACES: &[Place] = &[
    Place {
        name: "Cobb Residence Hall",
        kind: PlaceKind::Dorm,
        lat: 35.9064,
        lng: -79.0460,
        aliases: &["Cobb"],
    },
    Place {
        name: "Craige North",
        kind: PlaceKind::Dorm,
        lat: 35.9069,
        lng: -79.0486,
        aliases: &[],
    },
    Place {
        name: "Morrison Hall",
        kind: PlaceKind::Dorm,
        lat: 35.9101,
        lng: -79.0469,
        aliases: &["Morrison"],
    },
    Place {
        name: "Teague",
        kind: PlaceKind::Dorm,
        lat: 35.9060,
        lng: -79.0468,
        aliases: &[],
    },
    Place {
        name: "Avery",
        kind: PlaceKind::Dorm,
        lat: 35.9090,
        lng: -79.0475,
        aliases: &[],
    },
    Place {
        name: "Davis Library",
        kind: PlaceKind::Landmark,
        lat: 35.9063,
        lng: -79.0492,
        aliases: &["Davis"],
    },
    Place {
        name: "Franklin Street",
        kind: PlaceKind::Landmark,
        lat: 35.9107,
        lng: -79.0523,
        aliases: &["Franklin St"],
    },
];

/// Dorms only
pub fn dorms() -> impl Iterator<Item = &'static Place> {
    PLACES.iter().filter(|place| place.kind == PlaceKind::Dorm)
}

/// Landmarks only
pub fn landmarks() -> impl Iterator<Item = &'static Place> {
    PLACES.iter().filter(|place| place.kind == PlaceKind::Landmark)
}

/// Finds a place by name or alias, ignoring case and surrounding space
///
/// # Examples
///
/// ```
/// use dormguide::campus;
///
/// let cobb = campus::lookup("cobb").unwrap();
/// assert_eq!(cobb.name, "Cobb Residence Hall");
/// assert!(campus::lookup("Hogwarts").is_none());
/// ```
pub fn lookup(name: &str) -> Option<&'static Place> {
    let wanted = name.trim().to_lowercase();
    PLACES
        .iter()
        .find(|place| place.names().any(|n| n.to_lowercase() == wanted))
}

/// Places mentioned anywhere in `text`, in table order without repeats
pub fn mentioned_in(text: &str) -> Vec<&'static Place> {
    let haystack = text.to_lowercase();
    PLACES
        .iter()
        .filter(|place| {
            place
                .names()
                .any(|n| contains_word(&haystack, &n.to_lowercase()))
        })
        .collect()
}

fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.map_or(false, char::is_alphanumeric) && !after.map_or(false, char::is_alphanumeric)
    })
}
