//! Portal catalog wiring.
//!
//! This module wraps the JSON documents under `data/` so callers can load a
//! validated snapshot and refer to content with consistent identifiers. Types
//! here mirror the schema fields; callers use `PortalIndex` for lookups and
//! `ContentRepository` when editing documents for the admin screen.

pub mod identity;
pub mod index;
pub mod model;
pub mod repository;

pub use identity::{CatalogKind, ConsoleSlug, Platform, ResourceId};
pub use index::{PortalDocuments, PortalIndex};
pub use model::{
    ConsoleCatalog, ConsoleEmulator, ConsoleEntry, ConsoleSpecs, DownloadEntry, EmulatorCatalog,
    EmulatorEntry, FirmwareEntry, NewsItem, PlatformSection, PopularGame, ToolEntry,
};
pub use repository::{ContentRepository, EntryKey};

pub use model::{load_document_from_path, parse_iso_date};
