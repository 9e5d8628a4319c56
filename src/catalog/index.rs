//! Validated, indexed view of the whole portal data set.
//!
//! `PortalIndex::load` checks every document against its JSON schema and then
//! applies the rules a schema cannot express: unique names within a list,
//! well-formed console slugs, ratings inside 1–5, and real calendar dates.
//! Lookups mirror the detail pages (console by slug, emulators by platform,
//! consoles by manufacturer) and the facet pickers on the listing pages.

use crate::catalog::identity::{CatalogKind, ConsoleSlug, Platform};
use crate::catalog::model::{
    ConsoleCatalog, ConsoleEntry, DownloadEntry, EmulatorCatalog, FirmwareEntry, NewsItem,
    PlatformSection, ToolEntry, parse_iso_date,
};
use crate::filter::facet_values;
use crate::schema_loader::SchemaSet;
use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const MIN_RATING: f64 = 1.0;
const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Default)]
/// All six portal documents, typed but not yet cross-checked.
pub struct PortalDocuments {
    pub consoles: ConsoleCatalog,
    pub emulators: EmulatorCatalog,
    pub firmware: Vec<FirmwareEntry>,
    pub tools: Vec<ToolEntry>,
    pub downloads: Vec<DownloadEntry>,
    pub news: Vec<NewsItem>,
}

#[derive(Debug)]
/// Portal documents that passed schema and semantic validation.
pub struct PortalIndex {
    documents: PortalDocuments,
}

impl PortalIndex {
    /// Load every document from `data_dir`, validating each against the
    /// matching schema in `schema_dir`.
    pub fn load(data_dir: &Path, schema_dir: &Path) -> Result<Self> {
        let schemas = SchemaSet::from_dir(schema_dir)?;
        let documents = PortalDocuments {
            consoles: load_validated(data_dir, &schemas, CatalogKind::Console)?,
            emulators: load_validated(data_dir, &schemas, CatalogKind::Emulator)?,
            firmware: load_validated(data_dir, &schemas, CatalogKind::Firmware)?,
            tools: load_validated(data_dir, &schemas, CatalogKind::Tool)?,
            downloads: load_validated(data_dir, &schemas, CatalogKind::Download)?,
            news: load_validated(data_dir, &schemas, CatalogKind::News)?,
        };
        Self::from_documents(documents)
    }

    /// Apply the semantic checks to already-decoded documents.
    pub fn from_documents(documents: PortalDocuments) -> Result<Self> {
        validate_consoles(&documents.consoles)?;
        validate_emulators(&documents.emulators)?;
        ensure_unique_names("firmware.json", documents.firmware.iter().map(|f| f.name.as_str()))?;
        ensure_unique_names("tools.json", documents.tools.iter().map(|t| t.name.as_str()))?;
        validate_downloads(&documents.downloads)?;
        validate_news(&documents.news)?;
        Ok(Self { documents })
    }

    pub fn documents(&self) -> &PortalDocuments {
        &self.documents
    }

    /// Resolve a console by slug.
    ///
    /// Returns `None` instead of erroring; the detail page renders its own
    /// "not found" state.
    pub fn console(&self, slug: &ConsoleSlug) -> Option<&ConsoleEntry> {
        self.documents.consoles.get(slug)
    }

    /// Consoles in slug order.
    pub fn consoles(&self) -> impl Iterator<Item = (&ConsoleSlug, &ConsoleEntry)> {
        self.documents.consoles.iter()
    }

    /// Consoles whose manufacturer matches, ignoring case (route segments are
    /// lower-case).
    pub fn consoles_by_manufacturer(&self, manufacturer: &str) -> Vec<(&ConsoleSlug, &ConsoleEntry)> {
        self.documents
            .consoles
            .iter()
            .filter(|(_, entry)| entry.manufacturer.eq_ignore_ascii_case(manufacturer))
            .collect()
    }

    pub fn platform(&self, platform: &Platform) -> Option<&PlatformSection> {
        self.documents.emulators.get(platform)
    }

    pub fn platforms(&self) -> impl Iterator<Item = &Platform> {
        self.documents.emulators.keys()
    }

    pub fn manufacturers(&self) -> Vec<&str> {
        facet_values(self.documents.consoles.values())
    }

    pub fn tool_categories(&self) -> Vec<&str> {
        facet_values(&self.documents.tools)
    }

    pub fn news_categories(&self) -> Vec<&str> {
        facet_values(&self.documents.news)
    }

    pub fn download_systems(&self) -> Vec<&str> {
        facet_values(&self.documents.downloads)
    }

    pub fn firmware(&self) -> &[FirmwareEntry] {
        &self.documents.firmware
    }

    pub fn tools(&self) -> &[ToolEntry] {
        &self.documents.tools
    }

    pub fn downloads(&self) -> &[DownloadEntry] {
        &self.documents.downloads
    }

    pub fn news(&self) -> &[NewsItem] {
        &self.documents.news
    }
}

fn load_validated<T: DeserializeOwned>(
    data_dir: &Path,
    schemas: &SchemaSet,
    kind: CatalogKind,
) -> Result<T> {
    let path = data_dir.join(kind.document_name());
    let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    let value: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))?;

    if let Err(details) = schemas.check(&kind.resource_id(), &value) {
        bail!(
            "{} failed schema validation:\n{}",
            path.display(),
            details.join("\n")
        );
    }

    serde_json::from_value(value).with_context(|| format!("decoding {}", path.display()))
}

fn validate_consoles(consoles: &ConsoleCatalog) -> Result<()> {
    for (slug, console) in consoles {
        if !slug.is_well_formed() {
            bail!("console slug must match ^[a-z0-9]+(-[a-z0-9]+)*$, got '{slug}'");
        }
        for (field, value) in [
            ("name", &console.name),
            ("fullName", &console.full_name),
            ("manufacturer", &console.manufacturer),
        ] {
            if value.trim().is_empty() {
                bail!("console {slug} has an empty {field}");
            }
        }
        if console.year == 0 {
            bail!("console {slug} has no release year");
        }
        ensure_unique_names(
            &format!("console {slug} popularGames"),
            console.popular_games.iter().map(|g| g.name.as_str()),
        )?;
    }
    Ok(())
}

fn validate_emulators(emulators: &EmulatorCatalog) -> Result<()> {
    for (platform, section) in emulators {
        if section.title.trim().is_empty() {
            bail!("emulator section {platform} has an empty title");
        }
        ensure_unique_names(
            &format!("emulator section {platform}"),
            section.emulators.iter().map(|e| e.name.as_str()),
        )?;
        for emulator in &section.emulators {
            if let Some(rating) = emulator.rating {
                if !(MIN_RATING..=MAX_RATING).contains(&rating) {
                    bail!(
                        "emulator {} in {platform} has rating {rating}, expected {MIN_RATING}-{MAX_RATING}",
                        emulator.name
                    );
                }
            }
            if let Some(date) = &emulator.last_updated {
                parse_iso_date(&format!("{} lastUpdated", emulator.name), date)?;
            }
        }
    }
    Ok(())
}

fn validate_downloads(downloads: &[DownloadEntry]) -> Result<()> {
    ensure_unique_names("downloads.json", downloads.iter().map(|d| d.name.as_str()))?;
    for download in downloads {
        if let Some(date) = &download.updated {
            parse_iso_date(&format!("{} updated", download.name), date)?;
        }
    }
    Ok(())
}

fn validate_news(news: &[NewsItem]) -> Result<()> {
    ensure_unique_names("news.json", news.iter().map(|n| n.title.as_str()))?;
    for item in news {
        parse_iso_date(&format!("'{}' date", item.title), &item.date)?;
    }
    Ok(())
}

fn ensure_unique_names<'a>(context: &str, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = BTreeSet::new();
    for name in names {
        if name.trim().is_empty() {
            bail!("{context} contains an entry with no name");
        }
        if !seen.insert(name) {
            bail!("{context} lists '{name}' more than once");
        }
    }
    Ok(())
}
