mod class;
mod conference;
mod evaluation;
mod participant;

pub use class::{Class, ClassIndex, Program, ProgramSet, UnknownProgram};
pub use conference::{Conference, Lunch};
pub use evaluation::{ClassEvaluation, ConferenceEvaluation};
pub use participant::{InstructorClass, Participant};
