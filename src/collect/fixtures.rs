//! Deterministic fixture sources
//!
//! One in-memory dataset behind every client trait, used by the demo CLI
//! and the test suites. Lookups are keyed by case-insensitive address or
//! name fragments; unknown keys return empty results, never errors, so
//! fixture-backed runs are deterministic in the output keys they touch.

use super::clients::{
    ClientResult, CompanyOfficer, CompanyProfile, CorporateClient, DirectoryClient,
    DirectoryListing, ExtractedOwnership, ExtractionClient, LineStatus, ListedContact,
    PeopleSearchClient, PersonMatch, PhoneLineClient, PropertyDocument, RecordsBundle,
    RecordsClient, RegistryClient, RegistryOwner, SourceClients,
};
use crate::record::OwnerType;
use async_trait::async_trait;
use std::sync::Arc;

/// Fixture dataset implementing every source client.
#[derive(Debug, Default)]
pub struct FixtureSources;

impl FixtureSources {
    /// Bundle one shared fixture instance behind all client traits.
    pub fn clients() -> SourceClients {
        let fixtures = Arc::new(FixtureSources);
        SourceClients {
            registry: fixtures.clone(),
            records: fixtures.clone(),
            extraction: fixtures.clone(),
            directory: fixtures.clone(),
            corporate: fixtures.clone(),
            people_primary: fixtures.clone(),
            people_secondary: fixtures.clone(),
            phone_line: fixtures,
        }
    }

    fn is_lexington(address: &str) -> bool {
        address.to_uppercase().contains("LEXINGTON")
    }

    fn is_greene(address: &str) -> bool {
        address.to_uppercase().contains("GREENE")
    }
}

#[async_trait]
impl RegistryClient for FixtureSources {
    async fn owner_of_record(&self, address: &str) -> ClientResult<Option<RegistryOwner>> {
        if Self::is_lexington(address) {
            return Ok(Some(RegistryOwner {
                name: "Lexington Holdings LLC".into(),
                owner_type: OwnerType::Llc,
                parcel_id: Some("1-1396-24".into()),
            }));
        }
        if Self::is_greene(address) {
            return Ok(Some(RegistryOwner {
                name: "Margaret Holloway".into(),
                owner_type: OwnerType::Individual,
                parcel_id: Some("2-0518-7".into()),
            }));
        }
        Ok(None)
    }
}

#[async_trait]
impl RecordsClient for FixtureSources {
    async fn property_records(&self, address: &str) -> ClientResult<Option<RecordsBundle>> {
        if Self::is_lexington(address) {
            return Ok(Some(RecordsBundle {
                documents: vec![
                    PropertyDocument {
                        doc_type: "deed".into(),
                        reference: "2019-081433".into(),
                        recorded_at: None,
                        summary: "Bargain and sale deed to Lexington Holdings LLC".into(),
                    },
                    PropertyDocument {
                        doc_type: "mortgage".into(),
                        reference: "2019-081434".into(),
                        recorded_at: None,
                        summary: "Mortgage agreement signed by managing member".into(),
                    },
                ],
            }));
        }
        // The Greene Street parcel has no digitized documents on file.
        if Self::is_greene(address) {
            return Ok(Some(RecordsBundle::default()));
        }
        Ok(None)
    }
}

#[async_trait]
impl ExtractionClient for FixtureSources {
    async fn extract_ownership(
        &self,
        documents: &[PropertyDocument],
    ) -> ClientResult<ExtractedOwnership> {
        let deed = documents.iter().find(|d| d.doc_type == "deed");
        match deed {
            Some(_) => Ok(ExtractedOwnership {
                owner_name: Some("LEXINGTON HOLDINGS LLC".into()),
                owner_type: OwnerType::Llc,
                signatories: vec!["David Rosen".into()],
            }),
            None => Ok(ExtractedOwnership::default()),
        }
    }
}

#[async_trait]
impl DirectoryClient for FixtureSources {
    async fn property_listing(&self, address: &str) -> ClientResult<Option<DirectoryListing>> {
        if Self::is_lexington(address) {
            return Ok(Some(DirectoryListing {
                owner_name: Some("Lexington Holdings L.L.C.".into()),
                owner_type: OwnerType::Llc,
                contacts: vec![ListedContact {
                    name: "David Rosen".into(),
                    role: "manager".into(),
                    phones: vec!["(212) 555-0184".into()],
                    emails: vec!["drosen@lexholdings.example".into()],
                }],
            }));
        }
        Ok(None)
    }
}

#[async_trait]
impl CorporateClient for FixtureSources {
    async fn company_profile(&self, name: &str) -> ClientResult<Option<CompanyProfile>> {
        if name.to_uppercase().contains("LEXINGTON") {
            return Ok(Some(CompanyProfile {
                company: "LEXINGTON HOLDINGS LLC".into(),
                jurisdiction: Some("NY".into()),
                officers: vec![
                    CompanyOfficer {
                        name: "David Rosen".into(),
                        role: "managing member".into(),
                    },
                    CompanyOfficer {
                        name: "Sarah Chen".into(),
                        role: "member".into(),
                    },
                ],
            }));
        }
        Ok(None)
    }
}

#[async_trait]
impl PeopleSearchClient for FixtureSources {
    async fn search(&self, name: &str, _address: &str) -> ClientResult<Vec<PersonMatch>> {
        let upper = name.to_uppercase();
        if upper.contains("ROSEN") {
            return Ok(vec![PersonMatch {
                name: "David Rosen".into(),
                phones: vec!["(212) 555-0184".into(), "917-555-0147".into()],
                emails: vec!["drosen@lexholdings.example".into()],
            }]);
        }
        if upper.contains("HOLLOWAY") {
            return Ok(vec![PersonMatch {
                name: "Margaret Holloway".into(),
                phones: vec!["(646) 555-0192".into()],
                emails: vec![],
            }]);
        }
        Ok(Vec::new())
    }
}

#[async_trait]
impl PhoneLineClient for FixtureSources {
    async fn line_status(&self, digits: &str) -> ClientResult<LineStatus> {
        let status = match digits {
            "2125550184" => LineStatus {
                valid: true,
                line_type: Some("landline".into()),
            },
            "9175550147" => LineStatus {
                valid: true,
                line_type: Some("mobile".into()),
            },
            "6465550192" => LineStatus {
                valid: true,
                line_type: Some("mobile".into()),
            },
            _ => LineStatus {
                valid: false,
                line_type: None,
            },
        };
        Ok(status)
    }
}
