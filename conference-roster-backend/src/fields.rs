//! Field ownership tables and the routines driven by them.
//!
//! Every stored record kind lists its fields once, tagged as owned by the
//! external feed or owned locally. The import hash, the merge applied on
//! re-import and the feed equality check all walk that table, so a field can
//! not be hashed but forgotten on merge or the other way round.

use conference_roster_database::Collection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Authoritative value comes from the feed and is overwritten on merge.
    Feed,
    /// Maintained inside the system, never touched by an import.
    Local,
}

pub struct FieldSpec<R> {
    pub name: &'static str,
    pub ownership: Ownership,
    pub digest: fn(&R, &mut Sha256),
    pub equal: fn(&R, &R) -> bool,
    pub copy: fn(&mut R, &R),
}

/// Builds a `&'static [FieldSpec<_>]` from `Feed field` / `Local field` pairs.
#[macro_export]
macro_rules! field_table {
    ($record:ty { $($ownership:ident $field:ident),* $(,)? }) => {
        &[$(
            $crate::fields::FieldSpec::<$record> {
                name: stringify!($field),
                ownership: $crate::fields::Ownership::$ownership,
                digest: |record, hasher| {
                    $crate::fields::FieldDigest::digest(&record.$field, hasher);
                },
                equal: |a, b| a.$field == b.$field,
                copy: |into, from| into.$field.clone_from(&from.$field),
            },
        )*]
    };
}

/// Canonical, unambiguous encoding of a field value into the import hash.
pub trait FieldDigest {
    fn digest(&self, hasher: &mut Sha256);
}

impl FieldDigest for str {
    fn digest(&self, hasher: &mut Sha256) {
        (self.len() as u64).digest(hasher);
        hasher.update(self.as_bytes());
    }
}

impl FieldDigest for String {
    fn digest(&self, hasher: &mut Sha256) {
        self.as_str().digest(hasher);
    }
}

impl FieldDigest for bool {
    fn digest(&self, hasher: &mut Sha256) {
        hasher.update([u8::from(*self)]);
    }
}

impl FieldDigest for i32 {
    fn digest(&self, hasher: &mut Sha256) {
        hasher.update(self.to_le_bytes());
    }
}

impl FieldDigest for u64 {
    fn digest(&self, hasher: &mut Sha256) {
        hasher.update(self.to_le_bytes());
    }
}

impl FieldDigest for usize {
    fn digest(&self, hasher: &mut Sha256) {
        (*self as u64).digest(hasher);
    }
}

impl<T: FieldDigest> FieldDigest for [T] {
    fn digest(&self, hasher: &mut Sha256) {
        self.len().digest(hasher);
        for item in self {
            item.digest(hasher);
        }
    }
}

impl<T: FieldDigest> FieldDigest for Vec<T> {
    fn digest(&self, hasher: &mut Sha256) {
        self.as_slice().digest(hasher);
    }
}

/// Anything kept in the document store.
pub trait Stored: Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    fn key(&self) -> String;
}

/// A record kind that is reconciled against an external feed.
pub trait Record: Stored + Clone + 'static {
    /// Bump whenever the set of feed-owned fields changes so every stored hash
    /// is invalidated.
    const HASH_SALT: &'static str;

    const FIELDS: &'static [FieldSpec<Self>];
}

/// Digest over the feed-owned fields of `fields`, independent of the order
/// they are listed in.
pub fn digest_fields<R>(salt: &str, fields: &[FieldSpec<R>], record: &R) -> String {
    let mut feed_fields: Vec<&FieldSpec<R>> = fields
        .iter()
        .filter(|field| field.ownership == Ownership::Feed)
        .collect();
    feed_fields.sort_by_key(|field| field.name);

    let mut hasher = Sha256::new();
    salt.digest(&mut hasher);
    for field in feed_fields {
        field.name.digest(&mut hasher);
        (field.digest)(record, &mut hasher);
    }
    format!("{:x}", hasher.finalize())
}

pub fn import_hash<R: Record>(record: &R) -> String {
    digest_fields(R::HASH_SALT, R::FIELDS, record)
}

/// Copies every feed-owned field of `from` onto `into`.
pub fn merge_feed_fields<R: Record>(into: &mut R, from: &R) {
    for field in R::FIELDS {
        if field.ownership == Ownership::Feed {
            (field.copy)(into, from);
        }
    }
}

pub fn feed_fields_equal<R: Record>(a: &R, b: &R) -> bool {
    R::FIELDS
        .iter()
        .filter(|field| field.ownership == Ownership::Feed)
        .all(|field| (field.equal)(a, b))
}
