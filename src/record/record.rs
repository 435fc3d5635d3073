//! The research record: the single aggregate for one property address
//!
//! The record is mutable by replacement only. Collectors receive read
//! snapshots and emit `RecordUpdate`s; the engine folds updates back in
//! through `merge`, one at a time.

use super::types::{Confidence, OwnerType, RunId, SourceId, Stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Raw output from one collector, kept for audit and routing predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: SourceId,
    /// Opaque payload as the source returned it
    pub payload: serde_json::Value,
    pub collected_at: DateTime<Utc>,
}

impl SourceReport {
    pub fn new(source: impl Into<SourceId>, payload: serde_json::Value) -> Self {
        Self {
            source: source.into(),
            payload,
            collected_at: Utc::now(),
        }
    }
}

/// One asserted owner identity from one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerCandidate {
    /// Display name as the source reported it (original casing kept)
    pub name: String,
    pub owner_type: OwnerType,
    pub source: SourceId,
    pub confidence: Confidence,
    /// Discovery index, assigned at merge time in completion order
    pub order: usize,
}

impl OwnerCandidate {
    pub fn new(
        name: impl Into<String>,
        owner_type: OwnerType,
        source: impl Into<SourceId>,
    ) -> Self {
        Self {
            name: name.into(),
            owner_type,
            source: source.into(),
            confidence: Confidence::Low,
            order: 0,
        }
    }
}

/// An individual person associated with the property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualContact {
    pub name: String,
    pub source: SourceId,
    /// Free text, e.g. "owner", "manager", "signatory"
    pub role: String,
    /// Stable insertion index; restores original ordering after cleanup
    pub order: usize,
}

impl IndividualContact {
    pub fn new(
        name: impl Into<String>,
        source: impl Into<SourceId>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            role: role.into(),
            order: 0,
        }
    }
}

/// One phone number, deduplicated across sources by its digit string.
///
/// Created the first time any collector reports a never-seen digit string.
/// Afterwards `sources` and `contacts` only grow; validation may flip
/// `valid` but never removes the candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneCandidate {
    /// Number exactly as first reported
    pub raw: String,
    /// All non-digit characters stripped — the canonical dedup key
    pub digits: String,
    /// Display form, `(XXX) XXX-XXXX` where the digits allow it
    pub formatted: String,
    pub sources: BTreeSet<SourceId>,
    /// Co-report counts per associated contact name
    pub contacts: BTreeMap<String, u32>,
    /// Line type from validation (mobile, landline, voip), when known
    pub line_type: Option<String>,
    pub confidence: Confidence,
    /// Tri-state: unknown until a validation collector has run
    pub valid: Option<bool>,
    /// Discovery index, assigned at merge time in completion order
    pub order: usize,
}

impl PhoneCandidate {
    pub fn new(
        raw: impl Into<String>,
        source: impl Into<SourceId>,
        contact: Option<&str>,
    ) -> Self {
        let raw = raw.into();
        let digits = Self::normalize_digits(&raw);
        let formatted = Self::format_digits(&digits).unwrap_or_else(|| raw.clone());
        let mut sources = BTreeSet::new();
        sources.insert(source.into());
        let mut contacts = BTreeMap::new();
        if let Some(name) = contact {
            if !name.trim().is_empty() {
                contacts.insert(name.trim().to_string(), 1);
            }
        }
        Self {
            raw,
            digits,
            formatted,
            sources,
            contacts,
            line_type: None,
            confidence: Confidence::Low,
            valid: None,
            order: 0,
        }
    }

    /// Strip every non-digit character.
    pub fn normalize_digits(raw: &str) -> String {
        raw.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    /// Format a digit string as `(XXX) XXX-XXXX` for ten-digit numbers,
    /// with or without a leading country code `1`.
    pub fn format_digits(digits: &str) -> Option<String> {
        let d = match digits.len() {
            10 => digits,
            11 if digits.starts_with('1') => &digits[1..],
            _ => return None,
        };
        Some(format!("({}) {}-{}", &d[0..3], &d[3..6], &d[6..10]))
    }

    /// Fold a validation result in. Validation only downgrades or confirms:
    /// once invalid, a candidate stays invalid.
    pub fn apply_validation(&mut self, valid: bool, line_type: Option<&str>) {
        self.valid = match self.valid {
            Some(false) => Some(false),
            _ => Some(valid),
        };
        if self.line_type.is_none() {
            self.line_type = line_type.map(|t| t.to_string());
        }
    }

    /// True unless validation has marked this number invalid.
    pub fn eligible(&self) -> bool {
        self.valid != Some(false)
    }
}

/// Complete state for researching one property address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchRecord {
    pub run_id: RunId,
    /// Never empty; immutable once set
    pub address: String,
    pub stage: Stage,
    /// Progress display text for the step most recently merged
    pub current_step: String,
    /// Scheduling bookkeeping surfaced by steps for display
    pub pending_steps: Vec<String>,
    /// Raw collector output keyed by source name, absent until that source ran
    pub reports: BTreeMap<SourceId, SourceReport>,
    pub owner_candidates: Vec<OwnerCandidate>,
    pub contacts: Vec<IndividualContact>,
    pub phone_candidates: Vec<PhoneCandidate>,
    /// Deduplicated email addresses in insertion order
    pub emails: Vec<String>,
    /// Display name of the resolved primary owner
    pub primary_owner: Option<String>,
    pub owner_type: Option<OwnerType>,
    /// Digits of the chosen contact number; survives partial re-runs so
    /// primary selection can prefer it (stability preference)
    pub selected_phone: Option<String>,
    /// Display form of the chosen contact number
    pub contact_number: Option<String>,
    /// Append-only diagnostics; a non-empty list is not a failed run
    pub errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ResearchRecord {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            run_id: RunId::new(),
            address: address.into(),
            stage: Stage::Pending,
            current_step: String::new(),
            pending_steps: Vec::new(),
            reports: BTreeMap::new(),
            owner_candidates: Vec::new(),
            contacts: Vec::new(),
            phone_candidates: Vec::new(),
            emails: Vec::new(),
            primary_owner: None,
            owner_type: None,
            selected_phone: None,
            contact_number: None,
            errors: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// The report for a given source, if that collector has run.
    pub fn report(&self, source: &str) -> Option<&SourceReport> {
        self.reports.get(&SourceId::from(source))
    }

    /// Whether any owner identity is known yet (resolved or candidate).
    pub fn has_owner_identity(&self) -> bool {
        self.primary_owner.is_some() || !self.owner_candidates.is_empty()
    }

    /// The phone candidate with the given digit string, if present.
    pub fn phone(&self, digits: &str) -> Option<&PhoneCandidate> {
        self.phone_candidates.iter().find(|p| p.digits == digits)
    }
}
