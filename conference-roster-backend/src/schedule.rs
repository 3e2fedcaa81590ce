//! Per-participant view of the conference time slots.

use serde::Serialize;
use tracing::warn;

use crate::model::{ClassIndex, Participant};

/// Number of conference sessions. Class numbers encode their first session
/// as the hundreds digit, so this is shared with the spreadsheet authors.
pub const NUM_SESSIONS: usize = 6;

/// What a participant does in one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionClass {
    /// `None` means no class.
    pub number: Option<i32>,
    /// 1-based position within a multi-session class. For instructor slots
    /// this is relative to the class start and may be zero or negative.
    pub part: i32,
    pub instructor: bool,
}

pub type Schedule = [SessionClass; NUM_SESSIONS];

/// Problems that do not stop a schedule from being built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    UnknownClass { number: i32 },
    ClassOutsideGrid { number: i32 },
    InstructorSessionOutOfRange { number: i32, session: usize },
    UnmatchedEvaluationCode { code: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleOutcome {
    pub sessions: Schedule,
    pub diagnostics: Vec<Diagnostic>,
}

/// Lays the participant's classes out on the session grid. Attended classes
/// go in first, instructor sessions are applied afterwards and win any slot
/// they share with an attended class. Bad references are skipped and
/// reported, never fatal.
#[must_use]
pub fn build_schedule(participant: &Participant, classes: &ClassIndex) -> ScheduleOutcome {
    let mut sessions = [SessionClass::default(); NUM_SESSIONS];
    let mut diagnostics = Vec::new();

    for &number in &participant.classes {
        let Some(class) = classes.get(&number) else {
            warn!(number, "participant is enrolled in an unknown class");
            diagnostics.push(Diagnostic::UnknownClass { number });
            continue;
        };
        let Some(span) = class.sessions() else {
            warn!(number, length = class.length, "class does not fit the session grid");
            diagnostics.push(Diagnostic::ClassOutsideGrid { number });
            continue;
        };
        for (part, session) in (1..).zip(span) {
            sessions[session] = SessionClass {
                number: Some(number),
                part,
                instructor: false,
            };
        }
    }

    for instructor in &participant.instructor_classes {
        let number = instructor.class;
        let session = instructor.session;
        let Some(class) = classes.get(&number) else {
            warn!(number, "instructor override names an unknown class");
            diagnostics.push(Diagnostic::UnknownClass { number });
            continue;
        };
        if session >= NUM_SESSIONS {
            warn!(number, session, "instructor override is outside the session grid");
            diagnostics.push(Diagnostic::InstructorSessionOutOfRange { number, session });
            continue;
        }
        // session < NUM_SESSIONS, so this fits an i32
        let index = i32::try_from(session).unwrap_or(i32::MAX);
        sessions[session] = SessionClass {
            number: Some(number),
            // counted from the class start, zero or negative before it
            part: index - class.start() + 1,
            instructor: true,
        };
    }

    ScheduleOutcome {
        sessions,
        diagnostics,
    }
}

/// The session whose class lists `code` among its evaluation codes, searched
/// in session order.
pub fn match_evaluation_code(
    sessions: &Schedule,
    classes: &ClassIndex,
    code: &str,
) -> Result<(usize, i32), Diagnostic> {
    sessions
        .iter()
        .enumerate()
        .find_map(|(session, slot)| {
            let number = slot.number?;
            classes
                .get(&number)
                .filter(|class| class.has_evaluation_code(code))
                .map(|_| (session, number))
        })
        .ok_or_else(|| {
            warn!(code, "evaluation code matches none of the participant's classes");
            Diagnostic::UnmatchedEvaluationCode {
                code: code.to_owned(),
            }
        })
}
