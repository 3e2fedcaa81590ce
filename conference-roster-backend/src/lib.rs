#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    reason = "not yet ready for that"
)]

pub mod error;
pub mod fields;
pub mod identity;
pub mod import;
pub mod lunch;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod repository;
pub mod schedule;
pub mod telemetry;

pub use error::{AppError, ImportError};
pub use lunch::{LunchCache, LunchResolver};
pub use reconcile::{sync, SyncOptions, SyncReport};
pub use schedule::{build_schedule, match_evaluation_code, Diagnostic, SessionClass, NUM_SESSIONS};
