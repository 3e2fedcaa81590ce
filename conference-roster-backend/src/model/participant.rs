use conference_roster_database::Collection;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::fields::{FieldDigest, FieldSpec, Record, Stored};
use crate::identity::participant_id;

/// A session the participant teaches, entered by staff rather than imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorClass {
    pub class: i32,
    pub session: usize,
}

impl FieldDigest for InstructorClass {
    fn digest(&self, hasher: &mut Sha256) {
        self.class.digest(hasher);
        self.session.digest(hasher);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Participant {
    pub last_name: String,
    pub first_name: String,
    pub suffix: String,
    pub youth: bool,
    pub registration_number: String,

    pub nickname: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub council: String,
    pub district: String,
    pub unit_type: String,
    pub unit_number: String,
    pub dietary_restrictions: String,
    pub marketing: String,
    pub registered_by: String,
    pub registered_by_email: String,
    pub registered_by_phone: String,
    /// Always sorted ascending without duplicates.
    pub classes: Vec<i32>,
    pub banquet: bool,

    pub notes: String,
    pub no_show: bool,
    pub instructor_classes: Vec<InstructorClass>,
}

impl Participant {
    #[must_use]
    pub fn id(&self) -> String {
        participant_id(
            &self.last_name,
            &self.first_name,
            &self.suffix,
            &self.registration_number,
        )
    }

    pub fn set_classes(&mut self, classes: impl IntoIterator<Item = i32>) {
        let mut classes: Vec<i32> = classes.into_iter().collect();
        classes.sort_unstable();
        classes.dedup();
        self.classes = classes;
    }

    #[must_use]
    pub fn is_instructor_for(&self, session: usize) -> bool {
        self.instructor_classes
            .iter()
            .any(|instructor| instructor.session == session)
    }

    /// Nickname if there is one, first name otherwise.
    #[must_use]
    pub fn display_first_name(&self) -> &str {
        if self.nickname.is_empty() {
            &self.first_name
        } else {
            &self.nickname
        }
    }
}

impl Stored for Participant {
    const COLLECTION: Collection = Collection::Participants;

    fn key(&self) -> String {
        self.id()
    }
}

impl Record for Participant {
    const FIELDS: &'static [FieldSpec<Self>] = crate::field_table!(Participant {
        Feed last_name,
        Feed first_name,
        Feed suffix,
        Feed youth,
        Feed registration_number,
        Feed nickname,
        Feed phone,
        Feed email,
        Feed address,
        Feed city,
        Feed state,
        Feed zip,
        Feed council,
        Feed district,
        Feed unit_type,
        Feed unit_number,
        Feed dietary_restrictions,
        Feed marketing,
        Feed registered_by,
        Feed registered_by_email,
        Feed registered_by_phone,
        Feed classes,
        Feed banquet,
        Local notes,
        Local no_show,
        Local instructor_classes,
    });
    const HASH_SALT: &'static str = "participant/v3";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{import_hash, merge_feed_fields};

    fn participant() -> Participant {
        Participant {
            last_name: "Lee".to_owned(),
            first_name: "Ann".to_owned(),
            registration_number: "R-1".to_owned(),
            classes: vec![101, 301],
            ..Participant::default()
        }
    }

    #[test]
    fn set_classes_sorts_and_dedups() {
        let mut participant = participant();
        participant.set_classes([501, 101, 301, 101]);
        assert_eq!(participant.classes, vec![101, 301, 501]);
    }

    #[test]
    fn id_ignores_non_identity_fields() {
        let mut other = participant();
        other.email = "ann@example.org".to_owned();
        other.youth = true;
        other.notes = "late arrival".to_owned();
        assert_eq!(participant().id(), other.id());
    }

    #[test]
    fn local_fields_survive_merge_and_do_not_change_hash() {
        let mut stored = participant();
        stored.notes = "needs ramp access".to_owned();
        stored.no_show = true;
        stored.instructor_classes = vec![InstructorClass {
            class: 501,
            session: 2,
        }];
        let hash_before = import_hash(&stored);

        let mut incoming = participant();
        incoming.phone = "555-0100".to_owned();
        assert_ne!(import_hash(&incoming), hash_before);
        merge_feed_fields(&mut stored, &incoming);

        assert_eq!(stored.phone, "555-0100");
        assert_eq!(stored.notes, "needs ramp access");
        assert!(stored.no_show);
        assert!(stored.is_instructor_for(2));
        assert_eq!(import_hash(&stored), import_hash(&incoming));
    }

    #[test]
    fn display_name_prefers_nickname() {
        let mut participant = participant();
        assert_eq!(participant.display_first_name(), "Ann");
        participant.nickname = "Annie".to_owned();
        assert_eq!(participant.display_first_name(), "Annie");
    }
}
