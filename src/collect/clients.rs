//! Source client traits — the boundary to out-of-scope site lookups
//!
//! Each trait covers one external capability (registry query, document
//! extraction, people search, line-type check). Implementations are
//! injected once at construction; collectors hold them as explicit
//! dependencies rather than module-level globals. The crate ships
//! deterministic fixture implementations for tests and the demo CLI.

use crate::record::OwnerType;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Errors from an external source client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Result type for client calls
pub type ClientResult<T> = Result<T, ClientError>;

/// Owner of record as the registry reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryOwner {
    pub name: String,
    pub owner_type: OwnerType,
    /// Parcel or lot identifier, when the registry exposes one
    pub parcel_id: Option<String>,
}

/// A recorded property document reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDocument {
    /// e.g. "deed", "mortgage", "agreement"
    pub doc_type: String,
    pub reference: String,
    pub recorded_at: Option<DateTime<Utc>>,
    /// Short description of the document contents
    pub summary: String,
}

/// Everything the public-records lookup returned for an address.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordsBundle {
    pub documents: Vec<PropertyDocument>,
}

/// Structured fields the extraction capability pulled out of documents.
///
/// Extraction itself (NLP over unstructured text) is out of scope; this is
/// its fixed output contract.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractedOwnership {
    pub owner_name: Option<String>,
    pub owner_type: OwnerType,
    /// Individuals who signed the most recent documents
    pub signatories: Vec<String>,
}

/// A person listed against the property in a commercial directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedContact {
    pub name: String,
    pub role: String,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
}

/// A directory's view of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub owner_name: Option<String>,
    pub owner_type: OwnerType,
    pub contacts: Vec<ListedContact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyOfficer {
    pub name: String,
    pub role: String,
}

/// Corporate registry entry for a company owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company: String,
    pub jurisdiction: Option<String>,
    pub officers: Vec<CompanyOfficer>,
}

/// One person-search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonMatch {
    pub name: String,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
}

/// Verdict from a phone line-type lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStatus {
    pub valid: bool,
    /// mobile, landline, voip — when the provider reports it
    pub line_type: Option<String>,
}

#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// The owner of record for an address, if the registry knows it.
    async fn owner_of_record(&self, address: &str) -> ClientResult<Option<RegistryOwner>>;
}

#[async_trait]
pub trait RecordsClient: Send + Sync {
    /// Recorded documents for an address.
    async fn property_records(&self, address: &str) -> ClientResult<Option<RecordsBundle>>;
}

#[async_trait]
pub trait ExtractionClient: Send + Sync {
    /// Extract ownership fields from recorded documents.
    async fn extract_ownership(
        &self,
        documents: &[PropertyDocument],
    ) -> ClientResult<ExtractedOwnership>;
}

#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Commercial directory listing for an address.
    async fn property_listing(&self, address: &str) -> ClientResult<Option<DirectoryListing>>;
}

#[async_trait]
pub trait CorporateClient: Send + Sync {
    /// Corporate registry profile for a company name.
    async fn company_profile(&self, name: &str) -> ClientResult<Option<CompanyProfile>>;
}

#[async_trait]
pub trait PeopleSearchClient: Send + Sync {
    /// People-search hits for a person near an address.
    async fn search(&self, name: &str, address: &str) -> ClientResult<Vec<PersonMatch>>;
}

#[async_trait]
pub trait PhoneLineClient: Send + Sync {
    /// Line status for a digits-only phone number.
    async fn line_status(&self, digits: &str) -> ClientResult<LineStatus>;
}

/// The full set of source clients a pipeline needs, constructed once per
/// process and shared by reference.
#[derive(Clone)]
pub struct SourceClients {
    pub registry: Arc<dyn RegistryClient>,
    pub records: Arc<dyn RecordsClient>,
    pub extraction: Arc<dyn ExtractionClient>,
    pub directory: Arc<dyn DirectoryClient>,
    pub corporate: Arc<dyn CorporateClient>,
    pub people_primary: Arc<dyn PeopleSearchClient>,
    pub people_secondary: Arc<dyn PeopleSearchClient>,
    pub phone_line: Arc<dyn PhoneLineClient>,
}
