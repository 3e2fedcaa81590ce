use std::collections::BTreeMap;

use conference_roster_database::Collection;
use serde::{Deserialize, Serialize};

use super::{ClassIndex, Participant};
use crate::fields::Stored;
use crate::schedule::{build_schedule, match_evaluation_code, Diagnostic};

/// A participant's evaluation of the class they attended in one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassEvaluation {
    pub participant_id: String,
    pub session: usize,
    pub class_number: i32,
    /// Question key to rating.
    pub ratings: BTreeMap<String, i32>,
    pub comments: String,
}

impl ClassEvaluation {
    #[must_use]
    pub fn key_for(participant_id: &str, session: usize) -> String {
        format!("{participant_id}/{session}")
    }

    /// An empty evaluation for the class the participant attended or taught
    /// that lists `code`. Participants enter the code they were given in
    /// class, which is how we know which session they are evaluating.
    pub fn for_code(
        participant: &Participant,
        classes: &ClassIndex,
        code: &str,
    ) -> Result<Self, Diagnostic> {
        let schedule = build_schedule(participant, classes);
        let (session, class_number) = match_evaluation_code(&schedule.sessions, classes, code)?;
        Ok(Self {
            participant_id: participant.id(),
            session,
            class_number,
            ..Self::default()
        })
    }
}

impl Stored for ClassEvaluation {
    const COLLECTION: Collection = Collection::ClassEvaluations;

    fn key(&self) -> String {
        Self::key_for(&self.participant_id, self.session)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConferenceEvaluation {
    pub participant_id: String,
    pub ratings: BTreeMap<String, i32>,
    pub comments: String,
}

impl Stored for ConferenceEvaluation {
    const COLLECTION: Collection = Collection::ConferenceEvaluations;

    fn key(&self) -> String {
        self.participant_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Class;

    #[test]
    fn code_picks_the_session() {
        let classes: ClassIndex = [(101, "A1"), (201, "B2")]
            .into_iter()
            .map(|(number, code)| {
                let class = Class {
                    number,
                    length: 1,
                    evaluation_codes: vec![code.to_owned()],
                    ..Class::default()
                };
                (number, class)
            })
            .collect();
        let mut participant = Participant {
            last_name: "Lee".to_owned(),
            first_name: "Ann".to_owned(),
            ..Participant::default()
        };
        participant.set_classes([101, 201]);

        let evaluation = ClassEvaluation::for_code(&participant, &classes, "b2").unwrap();
        assert_eq!(evaluation.session, 1);
        assert_eq!(evaluation.class_number, 201);
        assert_eq!(evaluation.key(), format!("{}/1", participant.id()));

        assert_eq!(
            ClassEvaluation::for_code(&participant, &classes, "C3"),
            Err(Diagnostic::UnmatchedEvaluationCode {
                code: "C3".to_owned()
            })
        );
    }
}
