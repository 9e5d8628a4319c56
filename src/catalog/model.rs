//! Deserializable representation of the portal documents under `data/`.
//!
//! The types mirror the JSON schemas in `schema/` so listings, detail pages and
//! the admin editor work with typed records instead of ad-hoc JSON. Field
//! names on disk are camelCase. Each listing record implements
//! [`Searchable`] with the fields its catalog page searches.

use crate::catalog::identity::{ConsoleSlug, Platform};
use crate::filter::Searchable;
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// `consoles.json`: console detail entries keyed by slug.
pub type ConsoleCatalog = BTreeMap<ConsoleSlug, ConsoleEntry>;

/// `emulators.json`: one listing section per host platform.
pub type EmulatorCatalog = BTreeMap<Platform, PlatformSection>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Full console record rendered on the console detail page.
pub struct ConsoleEntry {
    pub name: String,
    pub full_name: String,
    pub manufacturer: String,
    pub year: u16,
    #[serde(default)]
    pub generation: String,
    pub description: String,
    #[serde(default)]
    pub detailed_description: String,
    #[serde(default)]
    pub specs: ConsoleSpecs,
    #[serde(default)]
    pub popular_games: Vec<PopularGame>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub emulators: Vec<ConsoleEmulator>,
    #[serde(default)]
    pub trivia: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Hardware summary for a console.
pub struct ConsoleSpecs {
    #[serde(default)]
    pub cpu: String,
    #[serde(default)]
    pub memory: String,
    #[serde(default)]
    pub storage: String,
    #[serde(default)]
    pub graphics: String,
    #[serde(default)]
    pub audio: String,
    #[serde(default)]
    pub controllers: String,
    #[serde(default)]
    pub connectivity: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PopularGame {
    pub name: String,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub genre: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// Emulator recommendation attached to a console.
pub struct ConsoleEmulator {
    pub name: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub compatibility: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// Emulator listing for one host platform.
pub struct PlatformSection {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub emulators: Vec<EmulatorEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmulatorEntry {
    pub name: String,
    pub description: String,
    pub version: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub downloads: String,
    #[serde(default)]
    pub last_updated: Option<String>,
    /// Systems the emulator runs (e.g. "PlayStation 3").
    #[serde(default)]
    pub supported: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub download_url: String,
    #[serde(default)]
    pub info_url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FirmwareEntry {
    pub name: String,
    pub description: String,
    pub version: String,
    #[serde(default)]
    pub devices: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolEntry {
    pub name: String,
    pub description: String,
    pub version: String,
    pub category: String,
    #[serde(default)]
    pub platforms: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Row in the downloads library table.
pub struct DownloadEntry {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    pub version: String,
    pub os: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub excerpt: String,
    pub date: String,
    #[serde(default)]
    pub read_time: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: String,
}

impl Searchable for ConsoleEntry {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.full_name.as_str(),
            self.manufacturer.as_str(),
            self.description.as_str(),
        ]
    }

    fn facet(&self) -> Option<&str> {
        Some(self.manufacturer.as_str())
    }
}

impl Searchable for EmulatorEntry {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.description.as_str()];
        fields.extend(self.supported.iter().map(String::as_str));
        fields
    }
}

impl Searchable for FirmwareEntry {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.description.as_str()];
        fields.extend(self.devices.iter().map(String::as_str));
        fields
    }
}

impl Searchable for ToolEntry {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str()]
    }

    fn facet(&self) -> Option<&str> {
        Some(self.category.as_str())
    }
}

impl Searchable for DownloadEntry {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.os.as_str(), self.kind.as_str()];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn facet(&self) -> Option<&str> {
        Some(self.os.as_str())
    }
}

impl Searchable for NewsItem {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.excerpt.as_str()];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn facet(&self) -> Option<&str> {
        Some(self.category.as_str())
    }
}

/// Read and parse a portal document from disk without schema validation.
pub fn load_document_from_path<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let document: T =
        serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(document)
}

/// Parse a `YYYY-MM-DD` date, naming the offending field on failure.
pub fn parse_iso_date(field: &str, value: &str) -> Result<NaiveDate> {
    if value.len() != 10 {
        bail!("{field} must use YYYY-MM-DD, got '{value}'");
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("{field} must use YYYY-MM-DD, got '{value}'"))
}
