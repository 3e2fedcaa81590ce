use conference_roster_database::Collection;
use serde::{Deserialize, Serialize};

use crate::fields::Stored;

/// One lunch seating rule. A participant gets this lunch when one of their
/// classes or their unit type is listed here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lunch {
    pub name: String,
    pub seating: i32,
    pub location: String,
    pub classes: Vec<i32>,
    pub unit_types: Vec<String>,
}

impl Lunch {
    /// Used when the conference has no lunch rules at all.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            seating: 1,
            location: "TBD".to_owned(),
            ..Self::default()
        }
    }
}

/// Conference wide settings, stored as a single document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conference {
    /// Bumped on every edit so derived lookup tables can be rebuilt.
    pub version: u64,
    /// The first lunch is the default.
    pub lunches: Vec<Lunch>,
}

impl Conference {
    pub const KEY: &'static str = "conference";
}

impl Stored for Conference {
    const COLLECTION: Collection = Collection::Conference;

    fn key(&self) -> String {
        Self::KEY.to_owned()
    }
}
