//! Source loader
//!
//! Scans the export directory once, groups files into families, and
//! deserializes each into raw records. Only the play-history family is
//! mandatory; every other family degrades to `None` when absent. A file
//! that fails to parse inside a present family is skipped with a warning
//! so one corrupt export file cannot take down the run.

mod models;

pub use models::{
    RawEra, RawLibraryDocument, RawLibraryTrack, RawMusicEvolution, RawPlayRecord, RawPlaylist,
    RawPlaylistItem, RawPlaylistTrack, RawPlaylistsDocument, RawSearchRecord, RawTechnicalRecord,
    RawWrappedDocument, RawWrappedEntry, RawYearlyMetrics, TechnicalFamily,
};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no streaming history files (Streaming_History_*.json) found under {dir:?}")]
    MissingPlayHistory { dir: PathBuf },
    #[error("streaming history files exist under {dir:?} but none could be parsed")]
    UnreadablePlayHistory { dir: PathBuf },
}

/// Everything the loader recovered from the export directory.
#[derive(Debug, Default)]
pub struct RawExport {
    pub plays: Vec<RawPlayRecord>,
    pub playlists: Option<Vec<RawPlaylist>>,
    pub searches: Option<Vec<RawSearchRecord>>,
    pub library: Option<RawLibraryDocument>,
    pub wrapped: Option<RawWrappedDocument>,
    pub technical: Vec<(TechnicalFamily, Vec<RawTechnicalRecord>)>,
}

fn parse_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse every file in `paths` as a JSON array of `T`, concatenated in
/// path order. Unparseable files are skipped with a warning.
fn parse_array_files<T: DeserializeOwned>(paths: &[PathBuf]) -> Vec<T> {
    let mut records = Vec::new();
    for path in paths {
        match parse_file::<Vec<T>>(path) {
            Ok(mut batch) => records.append(&mut batch),
            Err(err) => warn!("Skipping {}: {:#}", path.display(), err),
        }
    }
    records
}

fn file_stem_matches(name: &str, stem: &str) -> bool {
    name.starts_with(stem) && name.ends_with(".json")
}

pub fn load_export(dir: &Path) -> Result<RawExport, LoadError> {
    // One pass over the directory tree, sorted for a deterministic
    // concatenation order across runs.
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();
    files.sort();

    let named = |pred: &dyn Fn(&str) -> bool| -> Vec<PathBuf> {
        files
            .iter()
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(pred)
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    };

    let play_files = named(&|n| {
        file_stem_matches(n, "Streaming_History_Audio_")
            || file_stem_matches(n, "Streaming_History_Video_")
    });
    if play_files.is_empty() {
        return Err(LoadError::MissingPlayHistory { dir: dir.to_path_buf() });
    }
    let plays: Vec<RawPlayRecord> = parse_array_files(&play_files);
    if plays.is_empty() {
        return Err(LoadError::UnreadablePlayHistory { dir: dir.to_path_buf() });
    }
    info!("Loaded {} play records from {} files", plays.len(), play_files.len());

    let playlists = {
        let paths = named(&|n| file_stem_matches(n, "Playlist"));
        let mut all: Vec<RawPlaylist> = Vec::new();
        let mut seen_any = false;
        for path in &paths {
            match parse_file::<RawPlaylistsDocument>(path) {
                Ok(doc) => {
                    seen_any = true;
                    all.extend(doc.playlists);
                }
                Err(err) => warn!("Skipping {}: {:#}", path.display(), err),
            }
        }
        if seen_any {
            Some(all)
        } else {
            None
        }
    };

    let searches = {
        let paths = named(&|n| file_stem_matches(n, "SearchQueries"));
        if paths.is_empty() {
            None
        } else {
            Some(parse_array_files::<RawSearchRecord>(&paths))
        }
    };

    let library = named(&|n| file_stem_matches(n, "YourLibrary"))
        .iter()
        .find_map(|path| match parse_file::<RawLibraryDocument>(path) {
            Ok(doc) => Some(doc),
            Err(err) => {
                warn!("Skipping {}: {:#}", path.display(), err);
                None
            }
        });

    let wrapped = named(&|n| file_stem_matches(n, "Wrapped"))
        .iter()
        .find_map(|path| match parse_file::<RawWrappedDocument>(path) {
            Ok(doc) => Some(doc),
            Err(err) => {
                warn!("Skipping {}: {:#}", path.display(), err);
                None
            }
        });

    let mut technical = Vec::new();
    for family in TechnicalFamily::ALL {
        let paths = named(&|n| file_stem_matches(n, family.stem()));
        if paths.is_empty() {
            continue;
        }
        let records = parse_array_files::<RawTechnicalRecord>(&paths);
        info!("Loaded {} {} records", records.len(), family.stem());
        technical.push((family, records));
    }

    Ok(RawExport {
        plays,
        playlists,
        searches,
        library,
        wrapped,
        technical,
    })
}
