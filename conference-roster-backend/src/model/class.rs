use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use conference_roster_database::Collection;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::fields::{FieldDigest, FieldSpec, Record, Stored};
use crate::schedule::NUM_SESSIONS;

/// Scouting programs a class is aimed at. `All` is a sentinel meaning every
/// program, it is never expanded into the other variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Program {
    Cub,
    Scouts,
    Venturing,
    Sea,
    Commissioner,
    All,
}

impl Program {
    pub const CODES: [(&'static str, Self); 6] = [
        ("CUB", Self::Cub),
        ("SCT", Self::Scouts),
        ("VEN", Self::Venturing),
        ("SEA", Self::Sea),
        ("COM", Self::Commissioner),
        ("ALL", Self::All),
    ];

    #[must_use]
    pub fn code(self) -> &'static str {
        Self::CODES
            .iter()
            .find(|(_, program)| *program == self)
            .map_or("", |(code, _)| code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown program code {0:?}")]
pub struct UnknownProgram(pub String);

impl FromStr for Program {
    type Err = UnknownProgram;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::CODES
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(s))
            .map(|(_, program)| *program)
            .ok_or_else(|| UnknownProgram(s.to_owned()))
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSet(BTreeSet<Program>);

impl ProgramSet {
    #[must_use]
    pub fn all() -> Self {
        Self(BTreeSet::from([Program::All]))
    }

    #[must_use]
    pub fn contains(&self, program: Program) -> bool {
        self.0.contains(&Program::All) || self.0.contains(&program)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Program> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Program> for ProgramSet {
    fn from_iter<T: IntoIterator<Item = Program>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Comma separated program codes, e.g. `"CUB, SCT"` or `"ALL"`.
impl FromStr for ProgramSet {
    type Err = UnknownProgram;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(Program::from_str)
            .collect()
    }
}

impl FieldDigest for ProgramSet {
    fn digest(&self, hasher: &mut Sha256) {
        self.0.len().digest(hasher);
        for program in &self.0 {
            program.code().digest(hasher);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Class {
    /// Hundreds digit is the first session, counted from 1.
    pub number: i32,
    /// Number of consecutive sessions.
    pub length: i32,
    pub responsibility: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub instructor_names: Vec<String>,
    pub instructor_emails: Vec<String>,
    pub evaluation_codes: Vec<String>,
    pub access_token: String,
    pub programs: ProgramSet,
    /// Zero means unlimited.
    pub capacity: i32,
}

impl Class {
    /// First session index, 0-based. Negative for numbers below 100.
    #[must_use]
    pub const fn start(&self) -> i32 {
        self.number / 100 - 1
    }

    /// Last session index, `None` when the length runs past `i32::MAX`.
    #[must_use]
    pub fn end(&self) -> Option<i32> {
        self.start().checked_add(self.length.max(1) - 1)
    }

    /// Session indexes the class occupies, `None` if any of them falls outside
    /// the conference grid.
    #[must_use]
    pub fn sessions(&self) -> Option<RangeInclusive<usize>> {
        let start = usize::try_from(self.start()).ok()?;
        let end = usize::try_from(self.end()?).ok()?;
        (end < NUM_SESSIONS).then_some(start..=end)
    }

    #[must_use]
    pub fn has_evaluation_code(&self, code: &str) -> bool {
        self.evaluation_codes
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(code.trim()))
    }
}

impl Stored for Class {
    const COLLECTION: Collection = Collection::Classes;

    fn key(&self) -> String {
        self.number.to_string()
    }
}

impl Record for Class {
    const FIELDS: &'static [FieldSpec<Self>] = crate::field_table!(Class {
        Feed number,
        Feed length,
        Feed responsibility,
        Feed title,
        Feed description,
        Feed location,
        Feed instructor_names,
        Feed instructor_emails,
        Feed evaluation_codes,
        Feed access_token,
        Feed programs,
        Feed capacity,
    });
    const HASH_SALT: &'static str = "class/v2";
}

/// Class reference data by number.
pub type ClassIndex = BTreeMap<i32, Class>;
