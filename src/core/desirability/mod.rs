//! Carrying hand-tuned `card_desirability` values into a rebuilt database.

use crate::core::export::{read_database, save, CardDatabase};
use crate::error::ExportError;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// An old record whose key no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingCard {
    pub key: String,
    pub name: String,
    pub desirability: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransferReport {
    /// Records in the old database
    pub total_old: usize,
    pub updated: usize,
    pub not_found: Vec<MissingCard>,
}

/// Copy every non-zero desirability from `old` into the record with the
/// same key in `new`. Zero values are never copied.
pub fn transfer(old: &CardDatabase, new: &mut CardDatabase) -> TransferReport {
    let mut report = TransferReport {
        total_old: old.len(),
        ..Default::default()
    };

    for (key, record) in old.iter().filter(|(_, r)| r.card_desirability != 0) {
        match new.get_mut(key) {
            Some(target) => {
                target.card_desirability = record.card_desirability;
                report.updated += 1;
            }
            None => {
                warn!(%key, name = %record.card_name, "Card not found in new database");
                report.not_found.push(MissingCard {
                    key: key.to_string(),
                    name: record.card_name.clone(),
                    desirability: record.card_desirability,
                });
            }
        }
    }

    report
}

/// File-level transfer. `output` defaults to overwriting `new_path`.
pub fn transfer_files(old_path: &Path, new_path: &Path, output: Option<&Path>) -> Result<TransferReport, ExportError> {
    let old = read_database(old_path)?;
    let mut new = read_database(new_path)?;

    let report = transfer(&old, &mut new);
    let output = output.unwrap_or(new_path);
    save(output, &new)?;

    info!(
        output = %output.display(),
        updated = report.updated,
        not_found = report.not_found.len(),
        "Desirability transferred"
    );
    Ok(report)
}
