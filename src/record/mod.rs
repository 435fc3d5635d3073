//! Research record model: the typed state for one property research run
//!
//! Replaces an ever-growing loosely-typed state dictionary with an explicit
//! aggregate, a typed partial update, and a declared reducer per field.

mod merge;
mod record;
mod types;
mod update;

pub use merge::merge;
pub use record::{
    IndividualContact, OwnerCandidate, PhoneCandidate, ResearchRecord, SourceReport,
};
pub use types::{Confidence, OwnerType, RunId, SourceId, Stage};
pub use update::{PhoneValidation, RecordUpdate};
