//! The standard research pipeline
//!
//! Wires the collectors into the default step graph:
//!
//! ```text
//! initialize → registry_lookup → records_lookup
//!   records_lookup  —has_documents?→   extract_documents | analyze_ownership
//!   extract_documents → analyze_ownership
//!   analyze_ownership —owner_is_company?→ corporate_lookup | directory_lookup
//!   corporate_lookup  ⇒ [directory_lookup, people_search_primary, people_search_secondary]
//!   directory_lookup  ⇒ [people_search_primary, people_search_secondary]
//!   {directory_lookup, people_search_primary, people_search_secondary}
//!       ⇒join⇒ reconcile_evidence → validate_phones → finalize
//! ```
//!
//! The join barrier guarantees reconciliation sees every contact source,
//! whichever path was taken and in whatever order branches finish.

use crate::collect::{
    source, CorporateLookupCollector, DirectoryLookupCollector, DocumentExtractionCollector,
    FinalizeCollector, InitializeCollector, OwnershipAnalysisCollector, PeopleSearchCollector,
    PhoneValidationCollector, ReconcileEvidenceCollector, RecordsLookupCollector,
    RegistryLookupCollector, SourceClients,
};
use crate::collect::has_documents;
use crate::reconcile::{EvidenceReconciler, ReconcileConfig};
use crate::record::ResearchRecord;
use crate::workflow::{GraphError, StepGraph};
use std::sync::Arc;

/// True when the working owner is a legal entity rather than a person.
fn owner_is_company(record: &ResearchRecord) -> bool {
    record
        .owner_type
        .map(|t| t.is_company())
        .unwrap_or(false)
}

/// Build the standard research graph over the given source clients.
pub fn standard_graph(
    clients: &SourceClients,
    config: ReconcileConfig,
) -> Result<StepGraph, GraphError> {
    let reconciler = EvidenceReconciler::new(config.clone());

    StepGraph::builder()
        .step("initialize", Arc::new(InitializeCollector))
        .step(
            "registry_lookup",
            Arc::new(RegistryLookupCollector::new(clients.registry.clone())),
        )
        .step(
            "records_lookup",
            Arc::new(RecordsLookupCollector::new(clients.records.clone())),
        )
        .step(
            "extract_documents",
            Arc::new(DocumentExtractionCollector::new(clients.extraction.clone())),
        )
        .step(
            "analyze_ownership",
            Arc::new(OwnershipAnalysisCollector::new(config)),
        )
        .step(
            "corporate_lookup",
            Arc::new(CorporateLookupCollector::new(clients.corporate.clone())),
        )
        .step(
            "directory_lookup",
            Arc::new(DirectoryLookupCollector::new(clients.directory.clone())),
        )
        .step(
            source::PEOPLE_PRIMARY,
            Arc::new(PeopleSearchCollector::new(
                source::PEOPLE_PRIMARY,
                clients.people_primary.clone(),
            )),
        )
        .step(
            source::PEOPLE_SECONDARY,
            Arc::new(PeopleSearchCollector::new(
                source::PEOPLE_SECONDARY,
                clients.people_secondary.clone(),
            )),
        )
        .step(
            "reconcile_evidence",
            Arc::new(ReconcileEvidenceCollector::new(reconciler)),
        )
        .step(
            "validate_phones",
            Arc::new(PhoneValidationCollector::new(clients.phone_line.clone())),
        )
        .step("finalize", Arc::new(FinalizeCollector))
        .start("initialize")
        .edge("initialize", "registry_lookup")
        .edge("registry_lookup", "records_lookup")
        .conditional(
            "records_lookup",
            "has_documents",
            has_documents,
            "extract_documents",
            "analyze_ownership",
        )
        .edge("extract_documents", "analyze_ownership")
        .conditional(
            "analyze_ownership",
            "owner_is_company",
            owner_is_company,
            "corporate_lookup",
            "directory_lookup",
        )
        .fan_out(
            "corporate_lookup",
            ["directory_lookup", source::PEOPLE_PRIMARY, source::PEOPLE_SECONDARY],
        )
        .fan_out(
            "directory_lookup",
            [source::PEOPLE_PRIMARY, source::PEOPLE_SECONDARY],
        )
        .edge("directory_lookup", "reconcile_evidence")
        .edge(source::PEOPLE_PRIMARY, "reconcile_evidence")
        .edge(source::PEOPLE_SECONDARY, "reconcile_evidence")
        .join(
            "reconcile_evidence",
            ["directory_lookup", source::PEOPLE_PRIMARY, source::PEOPLE_SECONDARY],
        )
        .edge("reconcile_evidence", "validate_phones")
        .edge("validate_phones", "finalize")
        .build()
}
