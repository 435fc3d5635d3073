//! Collectors and their external source clients
//!
//! A collector is one unit of data-gathering work bound to a workflow
//! step. The site lookups themselves live behind the client traits in
//! `clients`; the collectors turn client results into partial record
//! updates, failing soft on every error.

mod cancel;
mod clients;
mod fixtures;
mod lookup;
mod people;
mod refine;
mod traits;

pub use cancel::CancellationToken;
pub use clients::{
    ClientError, ClientResult, CompanyOfficer, CompanyProfile, CorporateClient, DirectoryClient,
    DirectoryListing, ExtractedOwnership, ExtractionClient, LineStatus, ListedContact,
    PeopleSearchClient, PersonMatch, PhoneLineClient, PropertyDocument, RecordsBundle,
    RecordsClient, RegistryClient, RegistryOwner, SourceClients,
};
pub use fixtures::FixtureSources;
pub use lookup::{
    has_documents, CorporateLookupCollector, DirectoryLookupCollector,
    DocumentExtractionCollector, InitializeCollector, RecordsLookupCollector,
    RegistryLookupCollector,
};
pub use people::PeopleSearchCollector;
pub use refine::{
    FinalizeCollector, OwnershipAnalysisCollector, PhoneValidationCollector,
    ReconcileEvidenceCollector,
};
pub use traits::{Collector, CollectorError, CollectorOutput, CollectorResult};

/// Source names used by the standard pipeline.
pub mod source {
    pub const REGISTRY: &str = "registry";
    pub const RECORDS: &str = "records";
    pub const DEED_EXTRACTION: &str = "deed_extraction";
    pub const DIRECTORY: &str = "directory";
    pub const CORPORATE: &str = "corporate_registry";
    pub const PEOPLE_PRIMARY: &str = "people_search_primary";
    pub const PEOPLE_SECONDARY: &str = "people_search_secondary";
    pub const LINE_CHECK: &str = "line_check";
}
