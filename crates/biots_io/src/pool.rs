//! Genome pool files.
//!
//! A pool is a JSON array of genome records. Each record is validated on its
//! own; a malformed record is logged and skipped instead of failing the whole
//! file.

use crate::error::{IoError, Result};
use crate::serialization::{read_bytes, to_json_pretty, write_bytes};
use biots_data::{Genome, GenomeRecord};
use serde::Serialize;
use std::path::Path;

/// Outcome of loading a pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Records accepted into the pool.
    pub loaded: usize,
    /// Accepted records that were written in the single-hidden-layer layout.
    pub upgraded: usize,
    /// Records that failed to parse or validate.
    pub rejected: usize,
    /// Valid records dropped by the minimum-generation filter.
    pub filtered: usize,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedPool {
    pub genomes: Vec<Genome>,
    pub report: LoadReport,
}

/// Parses a pool document, keeping genomes with `generation >= min_generation`.
pub fn parse_pool(json: &str, min_generation: u32) -> Result<LoadedPool> {
    if json.trim().is_empty() {
        return Err(IoError::validation("Empty pool document"));
    }
    let values: Vec<serde_json::Value> = serde_json::from_str(json)?;

    let mut pool = LoadedPool::default();
    for (index, value) in values.into_iter().enumerate() {
        let record = match serde_json::from_value::<GenomeRecord>(value) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping unreadable genome record");
                pool.report.rejected += 1;
                continue;
            }
        };
        let legacy = record.is_legacy();
        let genome = match Genome::try_from(record) {
            Ok(genome) => genome,
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping invalid genome record");
                pool.report.rejected += 1;
                continue;
            }
        };
        if genome.generation < min_generation {
            pool.report.filtered += 1;
            continue;
        }
        if legacy {
            pool.report.upgraded += 1;
        }
        pool.report.loaded += 1;
        pool.genomes.push(genome);
    }

    tracing::debug!(
        loaded = pool.report.loaded,
        upgraded = pool.report.upgraded,
        rejected = pool.report.rejected,
        filtered = pool.report.filtered,
        "Parsed genome pool"
    );
    Ok(pool)
}

/// Loads a pool file (gzip when the path ends in `.gz`).
pub fn load_pool(path: &Path, min_generation: u32) -> Result<LoadedPool> {
    let bytes = read_bytes(path)?;
    let json = String::from_utf8(bytes)
        .map_err(|e| IoError::validation(format!("Invalid UTF-8 in {}: {e}", path.display())))?;
    let pool = parse_pool(&json, min_generation)
        .map_err(|e| e.with_context(format!("loading pool {}", path.display())))?;
    tracing::info!(
        path = %path.display(),
        loaded = pool.report.loaded,
        rejected = pool.report.rejected,
        "Loaded genome pool"
    );
    Ok(pool)
}

/// Writes genomes in the current record layout.
pub fn save_pool(genomes: &[Genome], path: &Path) -> Result<()> {
    write_bytes(path, to_json_pretty(&genomes)?.as_bytes())?;
    tracing::info!(path = %path.display(), count = genomes.len(), "Saved genome pool");
    Ok(())
}
