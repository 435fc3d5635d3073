//! Partial updates produced by collectors
//!
//! A `RecordUpdate` has the same field shapes as the record but everything
//! is optional or empty by default. Collectors build one per step; only the
//! merge function turns updates into a new record.

use super::record::{IndividualContact, OwnerCandidate, PhoneCandidate, SourceReport};
use super::types::{OwnerType, Stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A validation verdict for an already-known phone candidate.
///
/// Validations for digit strings with no matching candidate are dropped at
/// merge time: validation confirms or downgrades, it never invents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneValidation {
    pub digits: String,
    pub valid: bool,
    pub line_type: Option<String>,
}

/// Partial update to a `ResearchRecord`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordUpdate {
    /// Last writer wins
    pub current_step: Option<String>,
    /// Last writer wins (whole list replaced)
    pub pending_steps: Option<Vec<String>>,
    /// Forward-only; merged through `Stage::advance`
    pub stage: Option<Stage>,
    /// First report per source wins (each source runs at most once per run)
    pub reports: Vec<SourceReport>,
    /// Union by `(name, source)`
    pub owner_candidates: Vec<OwnerCandidate>,
    /// Union by `(name, source)`
    pub contacts: Vec<IndividualContact>,
    /// Union by digit string
    pub phone_candidates: Vec<PhoneCandidate>,
    /// Applied to matching candidates only
    pub phone_validations: Vec<PhoneValidation>,
    /// Union by value, case-insensitive
    pub emails: Vec<String>,
    /// Reconciler output: replaces the working owner list wholesale.
    /// Only the reconcile step writes this.
    pub ranked_owners: Option<Vec<OwnerCandidate>>,
    /// Reconciler output: replaces the working phone list wholesale.
    pub ranked_phones: Option<Vec<PhoneCandidate>>,
    /// Last writer wins
    pub primary_owner: Option<String>,
    pub owner_type: Option<OwnerType>,
    pub selected_phone: Option<String>,
    pub contact_number: Option<String>,
    /// Append-only
    pub errors: Vec<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl RecordUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update carrying only a progress string.
    pub fn step(text: impl Into<String>) -> Self {
        Self {
            current_step: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_step(mut self, text: impl Into<String>) -> Self {
        self.current_step = Some(text.into());
        self
    }

    pub fn with_report(mut self, report: SourceReport) -> Self {
        self.reports.push(report);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }

    pub fn add_owner(&mut self, candidate: OwnerCandidate) {
        self.owner_candidates.push(candidate);
    }

    pub fn add_contact(&mut self, contact: IndividualContact) {
        self.contacts.push(contact);
    }

    pub fn add_phone(&mut self, phone: PhoneCandidate) {
        self.phone_candidates.push(phone);
    }

    /// True if the update carries no data at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Stamp the update as completing the run.
    pub fn completing(mut self) -> Self {
        self.completed_at = Some(Utc::now());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_update_is_empty() {
        assert!(RecordUpdate::new().is_empty());
        assert!(!RecordUpdate::step("working").is_empty());
    }

    #[test]
    fn builders_accumulate() {
        let update = RecordUpdate::new()
            .with_step("Registry lookup completed")
            .with_error("registry: rate limited");
        assert_eq!(update.current_step.as_deref(), Some("Registry lookup completed"));
        assert_eq!(update.errors.len(), 1);
    }
}
