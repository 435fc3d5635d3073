//! Refinement steps: ownership analysis, evidence reconciliation, phone
//! validation, and finalization
//!
//! These steps are local computations (plus the line-type lookup) expressed
//! as ordinary collectors so the engine stays generic. The analysis step
//! runs mid-pipeline to give the people searches an identity to chase; the
//! reconcile step runs once behind the join barrier when all identity and
//! contact evidence is in.

use super::cancel::CancellationToken;
use super::clients::PhoneLineClient;
use super::source;
use super::traits::{Collector, CollectorOutput, CollectorResult};
use crate::reconcile::{resolve_owners, select_primary, EvidenceReconciler, ReconcileConfig};
use crate::record::{
    IndividualContact, PhoneValidation, RecordUpdate, ResearchRecord, SourceReport,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Numbers validated per run; line lookups are billed per query.
const MAX_VALIDATED_NUMBERS: usize = 10;

/// Resolves the working owner identity from the evidence gathered so far.
///
/// Runs before the contact fan-out so the people searches and the
/// corporate lookup know who to chase. The final say belongs to the
/// reconcile step.
pub struct OwnershipAnalysisCollector {
    config: ReconcileConfig,
}

impl OwnershipAnalysisCollector {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Collector for OwnershipAnalysisCollector {
    fn id(&self) -> &str {
        "analyze_ownership"
    }

    fn name(&self) -> &str {
        "Ownership analysis"
    }

    async fn collect(
        &self,
        snapshot: &ResearchRecord,
        _cancel: &CancellationToken,
    ) -> CollectorResult {
        let resolution = resolve_owners(&snapshot.owner_candidates, &self.config);
        let primary = match resolution.primary {
            Some(primary) => primary,
            None => {
                return Ok(CollectorOutput::empty("Ownership analysis found no owner")
                    .with_error("no owner candidates to analyze".to_string()))
            }
        };

        info!(
            owner = %primary.name,
            owner_type = %primary.owner_type,
            confidence = %primary.confidence,
            "ownership analysis resolved a working owner"
        );

        // Working identity only: the sighting list stays untouched so the
        // final reconciliation still sees every per-source assertion.
        let mut update = RecordUpdate {
            current_step: Some(format!("Ownership analysis completed: {}", primary.name)),
            primary_owner: Some(primary.name.clone()),
            owner_type: Some(primary.owner_type),
            ..RecordUpdate::default()
        };
        // An individual owner is their own first contact.
        if !primary.owner_type.is_company() {
            update.add_contact(IndividualContact::new(
                primary.name.as_str(),
                primary.source.clone(),
                "owner",
            ));
        }
        Ok(CollectorOutput::new(update))
    }
}

/// Final reconciliation behind the join barrier: dedup, confidence labels,
/// ranked candidates, primary owner and contact number.
pub struct ReconcileEvidenceCollector {
    reconciler: EvidenceReconciler,
}

impl ReconcileEvidenceCollector {
    pub fn new(reconciler: EvidenceReconciler) -> Self {
        Self { reconciler }
    }
}

#[async_trait]
impl Collector for ReconcileEvidenceCollector {
    fn id(&self) -> &str {
        "reconcile_evidence"
    }

    fn name(&self) -> &str {
        "Evidence reconciliation"
    }

    async fn collect(
        &self,
        snapshot: &ResearchRecord,
        _cancel: &CancellationToken,
    ) -> CollectorResult {
        let outcome = self.reconciler.reconcile(snapshot);
        info!(
            owners = outcome.ranked_owners.len(),
            phones = outcome.ranked_phones.len(),
            primary_owner = outcome.primary_owner.as_deref().unwrap_or("none"),
            "evidence reconciled"
        );

        let step = format!(
            "Evidence reconciliation completed ({} owners, {} phones)",
            outcome.ranked_owners.len(),
            outcome.ranked_phones.len()
        );
        let update = RecordUpdate {
            current_step: Some(step),
            primary_owner: outcome.primary_owner,
            owner_type: outcome.owner_type,
            contact_number: outcome.contact_number,
            selected_phone: outcome.selected_phone,
            ranked_owners: Some(outcome.ranked_owners),
            ranked_phones: Some(outcome.ranked_phones),
            ..RecordUpdate::default()
        };
        Ok(CollectorOutput::new(update))
    }
}

/// Validates phone candidates against a line-type provider.
///
/// Validation only downgrades or confirms: verdicts attach to known
/// candidates, and an invalid primary is replaced by the best remaining
/// eligible number.
pub struct PhoneValidationCollector {
    client: Arc<dyn PhoneLineClient>,
}

impl PhoneValidationCollector {
    pub fn new(client: Arc<dyn PhoneLineClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Collector for PhoneValidationCollector {
    fn id(&self) -> &str {
        "validate_phones"
    }

    fn name(&self) -> &str {
        "Phone validation"
    }

    async fn collect(
        &self,
        snapshot: &ResearchRecord,
        cancel: &CancellationToken,
    ) -> CollectorResult {
        if snapshot.phone_candidates.is_empty() {
            return Ok(CollectorOutput::empty(
                "Phone validation skipped (no phone numbers found)",
            ));
        }

        let mut errors = Vec::new();
        let mut validations = Vec::new();
        for candidate in snapshot.phone_candidates.iter().take(MAX_VALIDATED_NUMBERS) {
            if cancel.is_cancelled() {
                errors.push("cancelled before all numbers were validated".to_string());
                break;
            }
            match self.client.line_status(&candidate.digits).await {
                Ok(status) => {
                    debug!(digits = %candidate.digits, valid = status.valid, "line status");
                    validations.push(PhoneValidation {
                        digits: candidate.digits.clone(),
                        valid: status.valid,
                        line_type: status.line_type,
                    });
                }
                Err(e) => errors.push(format!(
                    "line status for {} failed: {}",
                    candidate.formatted, e
                )),
            }
        }

        // Re-pick the primary over the validated view so an invalid number
        // never stays selected.
        let mut validated = snapshot.phone_candidates.clone();
        for validation in &validations {
            if let Some(candidate) = validated.iter_mut().find(|p| p.digits == validation.digits) {
                candidate.apply_validation(validation.valid, validation.line_type.as_deref());
            }
        }
        let primary = select_primary(&validated, snapshot.selected_phone.as_deref());

        let mut update = RecordUpdate {
            current_step: Some("Phone validation completed".into()),
            contact_number: primary.map(|p| p.formatted.clone()),
            selected_phone: primary.map(|p| p.digits.clone()),
            ..RecordUpdate::default()
        };
        match serde_json::to_value(&validations) {
            Ok(payload) => update
                .reports
                .push(SourceReport::new(source::LINE_CHECK, payload)),
            Err(e) => errors.push(format!("unserializable validations: {}", e)),
        }
        update.phone_validations = validations;

        Ok(CollectorOutput { update, errors })
    }
}

/// Closes out the run.
pub struct FinalizeCollector;

#[async_trait]
impl Collector for FinalizeCollector {
    fn id(&self) -> &str {
        "finalize"
    }

    fn name(&self) -> &str {
        "Finalizer"
    }

    async fn collect(
        &self,
        snapshot: &ResearchRecord,
        _cancel: &CancellationToken,
    ) -> CollectorResult {
        info!(
            address = %snapshot.address,
            owner = snapshot.primary_owner.as_deref().unwrap_or("unknown"),
            contact = snapshot.contact_number.as_deref().unwrap_or("none"),
            "finalizing research"
        );
        let update = RecordUpdate {
            current_step: Some("Research completed".into()),
            pending_steps: Some(Vec::new()),
            ..RecordUpdate::default()
        }
        .completing();
        Ok(CollectorOutput::new(update))
    }
}
