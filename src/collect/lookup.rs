//! Data-collection steps: registry, public records, document extraction,
//! directory, and corporate registry lookups
//!
//! Every collector here fails soft: a client error or empty result becomes
//! a diagnostic entry plus a best-effort (usually empty) update, never a
//! fault. Routing proceeds either way.

use super::cancel::CancellationToken;
use super::clients::{
    CorporateClient, DirectoryClient, ExtractionClient, RecordsBundle, RecordsClient,
    RegistryClient,
};
use super::source;
use super::traits::{Collector, CollectorError, CollectorOutput, CollectorResult};
use crate::reconcile::infer_owner_type;
use crate::record::{
    IndividualContact, OwnerCandidate, OwnerType, PhoneCandidate, RecordUpdate, ResearchRecord,
    SourceReport,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

fn payload_of<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, CollectorError> {
    serde_json::to_value(value).map_err(|e| CollectorError::Internal(e.to_string()))
}

/// Seeds the run bookkeeping before any source is queried.
pub struct InitializeCollector;

#[async_trait]
impl Collector for InitializeCollector {
    fn id(&self) -> &str {
        "initialize"
    }

    fn name(&self) -> &str {
        "Initializer"
    }

    async fn collect(
        &self,
        snapshot: &ResearchRecord,
        _cancel: &CancellationToken,
    ) -> CollectorResult {
        info!(address = %snapshot.address, "starting property research");
        let update = RecordUpdate {
            current_step: Some("Research initialized".into()),
            pending_steps: Some(vec![
                "registry_lookup".into(),
                "records_lookup".into(),
            ]),
            ..RecordUpdate::default()
        };
        Ok(CollectorOutput::new(update))
    }
}

/// Looks up the owner of record in the authoritative registry.
pub struct RegistryLookupCollector {
    client: Arc<dyn RegistryClient>,
}

impl RegistryLookupCollector {
    pub fn new(client: Arc<dyn RegistryClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Collector for RegistryLookupCollector {
    fn id(&self) -> &str {
        "registry_lookup"
    }

    fn name(&self) -> &str {
        "Registry lookup"
    }

    async fn collect(
        &self,
        snapshot: &ResearchRecord,
        _cancel: &CancellationToken,
    ) -> CollectorResult {
        let owner = match self.client.owner_of_record(&snapshot.address).await {
            Ok(owner) => owner,
            Err(e) => {
                return Ok(CollectorOutput::empty("Registry lookup failed")
                    .with_error(e.to_string()))
            }
        };

        match owner {
            Some(owner) => {
                info!(owner = %owner.name, "registry returned an owner of record");
                let mut update = RecordUpdate::step("Registry lookup completed")
                    .with_report(SourceReport::new(source::REGISTRY, payload_of(&owner)?));
                update.add_owner(OwnerCandidate::new(
                    owner.name,
                    owner.owner_type,
                    source::REGISTRY,
                ));
                Ok(CollectorOutput::new(update))
            }
            None => Ok(CollectorOutput::empty("Registry lookup found no owner")
                .with_error(format!("no owner of record for {}", snapshot.address))),
        }
    }
}

/// Fetches recorded property documents from the public-records source.
pub struct RecordsLookupCollector {
    client: Arc<dyn RecordsClient>,
}

impl RecordsLookupCollector {
    pub fn new(client: Arc<dyn RecordsClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Collector for RecordsLookupCollector {
    fn id(&self) -> &str {
        "records_lookup"
    }

    fn name(&self) -> &str {
        "Public records lookup"
    }

    async fn collect(
        &self,
        snapshot: &ResearchRecord,
        _cancel: &CancellationToken,
    ) -> CollectorResult {
        let bundle = match self.client.property_records(&snapshot.address).await {
            Ok(bundle) => bundle,
            Err(e) => {
                return Ok(CollectorOutput::empty("Public records lookup failed")
                    .with_error(e.to_string()))
            }
        };

        match bundle {
            Some(bundle) => {
                info!(documents = bundle.documents.len(), "public records fetched");
                let update = RecordUpdate::step(format!(
                    "Public records lookup completed ({} documents)",
                    bundle.documents.len()
                ))
                .with_report(SourceReport::new(source::RECORDS, payload_of(&bundle)?));
                Ok(CollectorOutput::new(update))
            }
            None => Ok(CollectorOutput::empty("Public records lookup found nothing")
                .with_error(format!("no recorded documents for {}", snapshot.address))),
        }
    }
}

/// True when the records lookup reported at least one document.
pub fn has_documents(record: &ResearchRecord) -> bool {
    record
        .report(source::RECORDS)
        .and_then(|r| r.payload.get("documents"))
        .and_then(|docs| docs.as_array())
        .map(|docs| !docs.is_empty())
        .unwrap_or(false)
}

/// Runs the opaque extraction capability over recorded documents.
pub struct DocumentExtractionCollector {
    client: Arc<dyn ExtractionClient>,
}

impl DocumentExtractionCollector {
    pub fn new(client: Arc<dyn ExtractionClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Collector for DocumentExtractionCollector {
    fn id(&self) -> &str {
        "extract_documents"
    }

    fn name(&self) -> &str {
        "Document extraction"
    }

    async fn collect(
        &self,
        snapshot: &ResearchRecord,
        _cancel: &CancellationToken,
    ) -> CollectorResult {
        let bundle: RecordsBundle = match snapshot.report(source::RECORDS) {
            Some(report) => match serde_json::from_value(report.payload.clone()) {
                Ok(bundle) => bundle,
                Err(e) => {
                    return Ok(CollectorOutput::empty("Document extraction skipped")
                        .with_error(format!("unreadable records payload: {}", e)))
                }
            },
            None => {
                return Ok(CollectorOutput::empty(
                    "Document extraction skipped (no records)",
                ))
            }
        };

        let extracted = match self.client.extract_ownership(&bundle.documents).await {
            Ok(extracted) => extracted,
            Err(e) => {
                return Ok(CollectorOutput::empty("Document extraction failed")
                    .with_error(e.to_string()))
            }
        };

        let mut update = RecordUpdate::step("Document extraction completed")
            .with_report(SourceReport::new(
                source::DEED_EXTRACTION,
                payload_of(&extracted)?,
            ));
        if let Some(name) = &extracted.owner_name {
            let owner_type = match extracted.owner_type {
                OwnerType::Unknown => infer_owner_type(name),
                t => t,
            };
            update.add_owner(OwnerCandidate::new(name.as_str(), owner_type, source::DEED_EXTRACTION));
        }
        for signatory in &extracted.signatories {
            update.add_contact(IndividualContact::new(
                signatory.as_str(),
                source::DEED_EXTRACTION,
                "signatory",
            ));
        }
        Ok(CollectorOutput::new(update))
    }
}

/// Queries a commercial property directory for listed owners and contacts.
pub struct DirectoryLookupCollector {
    client: Arc<dyn DirectoryClient>,
}

impl DirectoryLookupCollector {
    pub fn new(client: Arc<dyn DirectoryClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Collector for DirectoryLookupCollector {
    fn id(&self) -> &str {
        "directory_lookup"
    }

    fn name(&self) -> &str {
        "Directory lookup"
    }

    async fn collect(
        &self,
        snapshot: &ResearchRecord,
        _cancel: &CancellationToken,
    ) -> CollectorResult {
        let listing = match self.client.property_listing(&snapshot.address).await {
            Ok(listing) => listing,
            Err(e) => {
                return Ok(CollectorOutput::empty("Directory lookup failed")
                    .with_error(e.to_string()))
            }
        };

        let listing = match listing {
            Some(listing) => listing,
            None => {
                return Ok(CollectorOutput::empty("Directory lookup found no listing")
                    .with_error(format!("no directory listing for {}", snapshot.address)))
            }
        };

        let mut update = RecordUpdate::step("Directory lookup completed")
            .with_report(SourceReport::new(source::DIRECTORY, payload_of(&listing)?));
        if let Some(name) = &listing.owner_name {
            let owner_type = match listing.owner_type {
                OwnerType::Unknown => infer_owner_type(name),
                t => t,
            };
            update.add_owner(OwnerCandidate::new(name.as_str(), owner_type, source::DIRECTORY));
        }
        for contact in &listing.contacts {
            update.add_contact(IndividualContact::new(
                contact.name.as_str(),
                source::DIRECTORY,
                contact.role.as_str(),
            ));
            for phone in &contact.phones {
                update.add_phone(PhoneCandidate::new(
                    phone.as_str(),
                    source::DIRECTORY,
                    Some(&contact.name),
                ));
            }
            update.emails.extend(contact.emails.iter().cloned());
        }
        Ok(CollectorOutput::new(update))
    }
}

/// Looks up company officers when the resolved owner is a legal entity.
pub struct CorporateLookupCollector {
    client: Arc<dyn CorporateClient>,
}

impl CorporateLookupCollector {
    pub fn new(client: Arc<dyn CorporateClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Collector for CorporateLookupCollector {
    fn id(&self) -> &str {
        "corporate_lookup"
    }

    fn name(&self) -> &str {
        "Corporate registry lookup"
    }

    async fn collect(
        &self,
        snapshot: &ResearchRecord,
        _cancel: &CancellationToken,
    ) -> CollectorResult {
        let company = match &snapshot.primary_owner {
            Some(name) => name.clone(),
            None => {
                return Ok(CollectorOutput::empty(
                    "Corporate lookup skipped (no resolved owner)",
                ))
            }
        };

        let profile = match self.client.company_profile(&company).await {
            Ok(profile) => profile,
            Err(e) => {
                return Ok(CollectorOutput::empty("Corporate lookup failed")
                    .with_error(e.to_string()))
            }
        };

        match profile {
            Some(profile) => {
                info!(company = %profile.company, officers = profile.officers.len(),
                    "corporate registry matched");
                let mut update = RecordUpdate::step("Corporate lookup completed")
                    .with_report(SourceReport::new(source::CORPORATE, payload_of(&profile)?));
                for officer in &profile.officers {
                    update.add_contact(IndividualContact::new(
                        officer.name.as_str(),
                        source::CORPORATE,
                        officer.role.as_str(),
                    ));
                }
                Ok(CollectorOutput::new(update))
            }
            None => Ok(CollectorOutput::empty("Corporate lookup found no match")
                .with_error(format!("no corporate registry entry for {}", company))),
        }
    }
}
