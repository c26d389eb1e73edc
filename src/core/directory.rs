//! Therapist Directory Module
//!
//! Loads the CSV directory of therapists at startup. Records are immutable
//! once loaded and held for the process lifetime.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Failed to read therapist directory: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, DirectoryError>;

/// One row of the therapist directory.
///
/// Field names map to the CSV headers
/// `Name, Specialization, Experience, Contact, Approach`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct TherapistRecord {
    pub name: String,
    pub specialization: String,
    /// Years of experience.
    pub experience: u32,
    pub contact: String,
    pub approach: String,
}

/// Load the therapist directory from a CSV file.
///
/// One record per data row, fields copied verbatim. Malformed rows propagate
/// the parser error; callers treat this as fatal to startup.
pub fn load_therapists(path: &Path) -> Result<Vec<TherapistRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: TherapistRecord = row?;
        records.push(record);
    }
    log::info!(
        "Loaded {} therapist records from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Render the directory as the fixed prompt block handed to the LLM.
pub fn directory_prompt_block(records: &[TherapistRecord]) -> String {
    records
        .iter()
        .map(|t| {
            format!(
                "Name: {}, Specialization: {}, Experience: {} years\nContact: {}\nApproach: {}",
                t.name, t.specialization, t.experience, t.contact, t.approach
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
