// ============================================
// Offline table loader
// ============================================
//
// Reads the three tables produced by the offline pipeline. Each file is a
// CSV with a header row; columns are matched by name and any extra columns
// (score, tracks_played, ...) are ignored.
//
// Any read or parse failure is fatal: the service must not start serving
// with a missing index.

use crate::error::LoadError;
use crate::models::{OfflineEntry, PopularityEntry, SimilarityEdge};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{info, warn};

/// All offline tables, as read from disk
#[derive(Debug, Default)]
pub struct OfflineTables {
    pub personal: Vec<OfflineEntry>,
    pub popular: Vec<PopularityEntry>,
    pub similar: Vec<SimilarityEdge>,
}

/// Read every row of a headered CSV table
pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
    let table_error = |source| LoadError::Table {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(table_error)?;

    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(table_error)
}

pub fn load_tables(
    personal_path: &Path,
    popular_path: &Path,
    similar_path: &Path,
) -> Result<OfflineTables, LoadError> {
    info!(path = %personal_path.display(), "Loading personal recommendations");
    let personal: Vec<OfflineEntry> = read_table(personal_path)?;

    info!(path = %popular_path.display(), "Loading popular tracks");
    let popular: Vec<PopularityEntry> = read_table(popular_path)?;
    if popular.is_empty() {
        // without it, users with no personal rows get nothing
        return Err(LoadError::Empty {
            path: popular_path.to_path_buf(),
        });
    }

    info!(path = %similar_path.display(), "Loading similar tracks");
    let similar: Vec<SimilarityEdge> = read_table(similar_path)?;
    if similar.is_empty() {
        warn!(
            path = %similar_path.display(),
            "Similarity table is empty, online candidates disabled"
        );
    }

    info!(
        personal = personal.len(),
        popular = popular.len(),
        similar = similar.len(),
        "Offline tables loaded"
    );

    Ok(OfflineTables {
        personal,
        popular,
        similar,
    })
}
