//! Identifier newtypes and core enums for the research record

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one research run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new random RunId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a RunId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a data source (one per collector integration)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle stage of a research run.
///
/// Transitions are forward-only: `Pending → Running → {Completed, Failed}`.
/// `Failed` outranks `Completed` so a fatal fault is never masked by a
/// concurrent completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Pending,
    Running,
    Completed,
    Failed,
}

impl Stage {
    fn rank(self) -> u8 {
        match self {
            Stage::Pending => 0,
            Stage::Running => 1,
            Stage::Completed => 2,
            Stage::Failed => 3,
        }
    }

    /// Move to `to` only if that is a forward transition.
    pub fn advance(self, to: Stage) -> Stage {
        if to.rank() > self.rank() {
            to
        } else {
            self
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Pending => "pending",
            Stage::Running => "running",
            Stage::Completed => "completed",
            Stage::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Confidence label on a piece of reconciled evidence.
///
/// Ordered so that `Low < Medium < High`; merge keeps the higher label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        };
        write!(f, "{}", s)
    }
}

/// Classification of a property owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerType {
    Individual,
    Llc,
    Corporation,
    Trust,
    Unknown,
}

impl OwnerType {
    /// True for owner types that name a legal entity rather than a person.
    pub fn is_company(self) -> bool {
        matches!(self, OwnerType::Llc | OwnerType::Corporation | OwnerType::Trust)
    }
}

impl Default for OwnerType {
    fn default() -> Self {
        OwnerType::Unknown
    }
}

impl std::fmt::Display for OwnerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OwnerType::Individual => "individual",
            OwnerType::Llc => "llc",
            OwnerType::Corporation => "corporation",
            OwnerType::Trust => "trust",
            OwnerType::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_advances_forward_only() {
        assert_eq!(Stage::Pending.advance(Stage::Running), Stage::Running);
        assert_eq!(Stage::Running.advance(Stage::Completed), Stage::Completed);
        assert_eq!(Stage::Completed.advance(Stage::Running), Stage::Completed);
        assert_eq!(Stage::Completed.advance(Stage::Pending), Stage::Completed);
    }

    #[test]
    fn failed_outranks_completed() {
        assert_eq!(Stage::Failed.advance(Stage::Completed), Stage::Failed);
        assert_eq!(Stage::Completed.advance(Stage::Failed), Stage::Failed);
    }

    #[test]
    fn confidence_ordering() {
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
    }

    #[test]
    fn owner_type_company_classification() {
        assert!(OwnerType::Llc.is_company());
        assert!(OwnerType::Trust.is_company());
        assert!(!OwnerType::Individual.is_company());
        assert!(!OwnerType::Unknown.is_company());
    }

    #[test]
    fn source_id_round_trip() {
        let id = SourceId::new("registry");
        assert_eq!(id.as_str(), "registry");
        assert_eq!(id, SourceId::from("registry"));
    }
}
