//! Shared library for the retrodex portal data core.
//!
//! The crate exposes the catalog types, the resource loader and the shared
//! search filter used by every listing, plus the admin-side templates and
//! editor. Public functions here form the contract the binaries depend on:
//! portal root discovery, data/schema directory resolution and logging setup.

use anyhow::{Result, bail};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing_subscriber::EnvFilter;

pub mod catalog;
pub mod editor;
pub mod filter;
pub mod loader;
pub mod schema_loader;
pub mod templates;

pub use catalog::{
    CatalogKind, ConsoleEntry, ConsoleSlug, ContentRepository, DownloadEntry, EmulatorCatalog,
    EmulatorEntry, EntryKey, FirmwareEntry, NewsItem, Platform, PlatformSection, PortalIndex,
    ResourceId, ToolEntry,
};
pub use editor::{Draft, SaveReport};
pub use filter::{Facet, FilterQuery, Listing, Searchable};
pub use loader::{
    AddressTemplate, DocumentStore, FetchError, FsDocumentStore, LoadError, LoadStatus,
    MemoryDocumentStore, ResourceLoader,
};
pub use schema_loader::{CompiledSchema, SchemaSet};

const DATA_DIR: &str = "data";
const SCHEMA_DIR: &str = "schema";
const LOG_ENV: &str = "RETRODEX_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Returns true when `candidate` holds both `data/` and `schema/`.
fn is_portal_root(candidate: &Path) -> bool {
    candidate.join(DATA_DIR).is_dir() && candidate.join(SCHEMA_DIR).is_dir()
}

fn portal_root_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !is_portal_root(&hint_path) {
        return None;
    }
    fs::canonicalize(hint_path).ok()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if is_portal_root(&dir) {
            return Some(dir);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the portal root.
///
/// Honors `RETRODEX_ROOT` when it points at a real portal, then climbs up from
/// the current executable, then falls back to the build-time hint.
pub fn find_portal_root() -> Result<PathBuf> {
    if let Ok(env_root) = env::var("RETRODEX_ROOT") {
        if let Some(root) = portal_root_from_hint(&env_root) {
            return Ok(root);
        }
    }

    if let Ok(exe_path) = env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            if let Some(root) = search_upwards(exe_dir) {
                return Ok(root);
            }
        }
    }

    if let Some(hint) = option_env!("RETRODEX_ROOT_HINT") {
        if let Some(root) = portal_root_from_hint(hint) {
            return Ok(root);
        }
    }

    bail!(
        "Unable to locate the portal root (a directory with data/ and schema/). Set RETRODEX_ROOT."
    );
}

/// Data directory for `root`, unless `RETRODEX_DATA_DIR` overrides it.
pub fn data_dir(root: &Path) -> PathBuf {
    match env::var("RETRODEX_DATA_DIR") {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => root.join(DATA_DIR),
    }
}

pub fn schema_dir(root: &Path) -> PathBuf {
    root.join(SCHEMA_DIR)
}

/// Install the stderr tracing subscriber used by the binaries.
///
/// The filter comes from `RETRODEX_LOG` (e.g. `retrodex=debug`) and defaults
/// to `warn`. Calling this twice is harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Split comma- or whitespace-delimited lists (e.g. `--kind` values).
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn root_requires_data_and_schema() {
        let dir = TempDir::new().unwrap();
        assert!(!is_portal_root(dir.path()));
        fs::create_dir(dir.path().join("data")).unwrap();
        assert!(!is_portal_root(dir.path()));
        fs::create_dir(dir.path().join("schema")).unwrap();
        assert!(is_portal_root(dir.path()));
    }

    #[test]
    fn search_climbs_to_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("data")).unwrap();
        fs::create_dir(dir.path().join("schema")).unwrap();
        let nested = dir.path().join("target").join("debug");
        fs::create_dir_all(&nested).unwrap();
        let found = search_upwards(&nested).unwrap();
        assert_eq!(found, fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn empty_hint_is_ignored() {
        assert!(portal_root_from_hint("").is_none());
    }

    #[test]
    fn build_hint_names_a_portal_root() {
        let hint = option_env!("RETRODEX_ROOT_HINT").unwrap_or_default();
        let root = portal_root_from_hint(hint).expect("build hint should point at a portal root");
        assert!(root.join("data").join("consoles.json").is_file());
        assert!(root.join("schema").join("consoles.schema.json").is_file());
    }

    #[test]
    fn split_list_handles_commas_and_spaces() {
        assert_eq!(split_list("news, tools  firmware"), vec!["news", "tools", "firmware"]);
        assert!(split_list(" , ").is_empty());
    }
}
