use std::collections::HashSet;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::types::{ColumnMapping, ContactCandidate, FailedRow, ImportResult, RawRow, RowError};
use crate::error::AppError;
use crate::models::Contact;
use crate::services::store::RecordStore;

/// Validates every row and creates the ones that pass, in input order.
///
/// Duplicate emails are detected against contacts that existed before the
/// call; two rows of the same upload sharing an email are both created.
pub async fn bulk_import(
    store: &RecordStore<Contact>,
    rows: &[RawRow],
    mapping: &ColumnMapping,
) -> Result<ImportResult, AppError> {
    mapping.ensure_ready()?;

    let start = Instant::now();
    info!("Starting contact import of {} rows", rows.len());

    let candidates: Vec<ContactCandidate> = rows.iter().map(|row| mapping.apply(row)).collect();
    let now = Utc::now();
    let mut known_emails: Option<HashSet<String>> = None;

    let outcomes = store
        .create_many(candidates.iter().cloned(), |existing, id, candidate| {
            let known = known_emails.get_or_insert_with(|| {
                existing.iter().map(|contact| contact.email.to_lowercase()).collect()
            });
            validate(&candidate, known)?;
            Ok::<_, RowError>(candidate.into_contact(id, now))
        })
        .await;

    let mut result = ImportResult::default();
    for (index, (outcome, candidate)) in outcomes.into_iter().zip(candidates).enumerate() {
        let row = index + 1;
        match outcome {
            Ok(contact) => {
                debug!("Row {} imported as contact {}", row, contact.id);
                result.successful.push(contact);
            }
            Err(err) => {
                warn!("Row {} rejected: {}", row, err);
                result.failed.push(FailedRow {
                    row,
                    data: candidate,
                    error: err.to_string(),
                });
            }
        }
    }

    info!(
        "Contact import finished in {:?}: {} created, {} failed",
        start.elapsed(),
        result.successful.len(),
        result.failed.len()
    );
    Ok(result)
}

fn validate(candidate: &ContactCandidate, known_emails: &HashSet<String>) -> Result<(), RowError> {
    let email = match (&candidate.name, &candidate.email) {
        (Some(_), Some(email)) => email,
        _ => return Err(RowError::MissingRequired),
    };
    if known_emails.contains(&email.to_lowercase()) {
        return Err(RowError::DuplicateEmail);
    }
    Ok(())
}
