//! People-search collectors
//!
//! Two independent people-search providers run in the pipeline's fan-out.
//! Each searches the individuals known so far (contacts, or an individual
//! owner) and reports phones and emails per person. The step id doubles as
//! the source name so corroboration across providers is visible to the
//! reconciler.

use super::cancel::CancellationToken;
use super::clients::PeopleSearchClient;
use super::traits::{Collector, CollectorOutput, CollectorResult};
use crate::record::{PhoneCandidate, RecordUpdate, ResearchRecord, SourceReport};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Names searched per run; people-search providers rate-limit hard.
const MAX_SEARCH_NAMES: usize = 5;

pub struct PeopleSearchCollector {
    step: String,
    client: Arc<dyn PeopleSearchClient>,
}

impl PeopleSearchCollector {
    /// `step` becomes both the step id and the source name.
    pub fn new(step: impl Into<String>, client: Arc<dyn PeopleSearchClient>) -> Self {
        Self {
            step: step.into(),
            client,
        }
    }

    /// Individuals worth searching: known contacts in discovery order,
    /// falling back to an individual primary owner.
    fn search_names(record: &ResearchRecord) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mut contacts: Vec<_> = record.contacts.iter().collect();
        contacts.sort_by_key(|c| c.order);
        for contact in contacts {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&contact.name)) {
                names.push(contact.name.clone());
            }
        }
        if names.is_empty() {
            if let (Some(owner), Some(owner_type)) = (&record.primary_owner, record.owner_type) {
                if !owner_type.is_company() {
                    names.push(owner.clone());
                }
            }
        }
        names.truncate(MAX_SEARCH_NAMES);
        names
    }
}

#[async_trait]
impl Collector for PeopleSearchCollector {
    fn id(&self) -> &str {
        &self.step
    }

    fn name(&self) -> &str {
        "People search"
    }

    async fn collect(
        &self,
        snapshot: &ResearchRecord,
        cancel: &CancellationToken,
    ) -> CollectorResult {
        let names = Self::search_names(snapshot);
        if names.is_empty() {
            return Ok(CollectorOutput::empty(format!(
                "People search skipped (no known individuals): {}",
                self.step
            )));
        }

        let mut update = RecordUpdate::new();
        let mut errors = Vec::new();
        let mut all_hits = Vec::new();

        for name in &names {
            if cancel.is_cancelled() {
                errors.push("cancelled before all names were searched".to_string());
                break;
            }
            match self.client.search(name, &snapshot.address).await {
                Ok(hits) => {
                    debug!(step = %self.step, name = %name, hits = hits.len(), "people search");
                    for hit in &hits {
                        for phone in &hit.phones {
                            update.add_phone(PhoneCandidate::new(
                                phone.as_str(),
                                self.step.as_str(),
                                Some(&hit.name),
                            ));
                        }
                        update.emails.extend(hit.emails.iter().cloned());
                    }
                    all_hits.extend(hits);
                }
                Err(e) => errors.push(format!("search for '{}' failed: {}", name, e)),
            }
        }

        update.current_step = Some(format!("People search completed: {}", self.step));
        match serde_json::to_value(&all_hits) {
            Ok(payload) => update
                .reports
                .push(SourceReport::new(self.step.as_str(), payload)),
            Err(e) => errors.push(format!("unserializable hits: {}", e)),
        }

        Ok(CollectorOutput { update, errors })
    }
}
