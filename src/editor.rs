//! In-memory form state for the content-management screen.
//!
//! A [`Draft`] holds one entry being edited. Saving validates the draft and
//! reports the entry it would write; nothing leaves the process unless the
//! caller applies the report to a [`ContentRepository`] and exports it.

use crate::catalog::{
    CatalogKind, ConsoleEntry, ConsoleSlug, ContentRepository, DownloadEntry, EmulatorEntry,
    EntryKey, FirmwareEntry, NewsItem, Platform, ToolEntry, parse_iso_date,
};
use crate::schema_loader::SchemaSet;
use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local, NaiveDate};
use serde_json::Value;

const DEFAULT_RATING: f64 = 4.0;
const DEFAULT_DOWNLOAD_OS: &str = "Windows";
const DEFAULT_DOWNLOAD_TYPE: &str = "Emulator";
const DEFAULT_NEWS_CATEGORY: &str = "News";
const DEFAULT_TOOL_CATEGORY: &str = "Frontend";

/// One entry under edit, tagged with where it will live.
#[derive(Clone, Debug, PartialEq)]
pub enum Draft {
    Console { slug: ConsoleSlug, entry: ConsoleEntry },
    Emulator { platform: Platform, entry: EmulatorEntry },
    News(NewsItem),
    Tool(ToolEntry),
    Firmware(FirmwareEntry),
    Download(DownloadEntry),
}

impl Draft {
    /// Blank form for `kind`; date fields default to `today`.
    pub fn new(kind: CatalogKind, today: NaiveDate) -> Self {
        let today_str = today.format("%Y-%m-%d").to_string();
        match kind {
            CatalogKind::Console => Draft::Console {
                slug: ConsoleSlug(String::new()),
                entry: ConsoleEntry {
                    name: String::new(),
                    full_name: String::new(),
                    manufacturer: String::new(),
                    year: u16::try_from(today.year()).unwrap_or_default(),
                    generation: String::new(),
                    description: String::new(),
                    detailed_description: String::new(),
                    specs: Default::default(),
                    popular_games: Vec::new(),
                    image: String::new(),
                    emulators: Vec::new(),
                    trivia: Vec::new(),
                },
            },
            CatalogKind::Emulator => Draft::Emulator {
                platform: Platform::Windows,
                entry: EmulatorEntry {
                    name: String::new(),
                    description: String::new(),
                    version: String::new(),
                    rating: Some(DEFAULT_RATING),
                    downloads: String::new(),
                    last_updated: Some(today_str),
                    supported: Vec::new(),
                    features: Vec::new(),
                    platforms: Vec::new(),
                    download_url: String::new(),
                    info_url: String::new(),
                },
            },
            CatalogKind::News => Draft::News(NewsItem {
                title: String::new(),
                excerpt: String::new(),
                date: today_str,
                read_time: String::new(),
                category: DEFAULT_NEWS_CATEGORY.to_string(),
                tags: Vec::new(),
                image: String::new(),
            }),
            CatalogKind::Tool => Draft::Tool(ToolEntry {
                name: String::new(),
                description: String::new(),
                version: String::new(),
                category: DEFAULT_TOOL_CATEGORY.to_string(),
                platforms: Vec::new(),
            }),
            CatalogKind::Firmware => Draft::Firmware(FirmwareEntry {
                name: String::new(),
                description: String::new(),
                version: String::new(),
                devices: Vec::new(),
            }),
            CatalogKind::Download => Draft::Download(DownloadEntry {
                name: String::new(),
                display_name: String::new(),
                version: String::new(),
                os: DEFAULT_DOWNLOAD_OS.to_string(),
                kind: DEFAULT_DOWNLOAD_TYPE.to_string(),
                updated: Some(today_str),
                size: String::new(),
                tags: Vec::new(),
            }),
        }
    }

    /// Blank form dated with the local calendar day.
    pub fn new_today(kind: CatalogKind) -> Self {
        Self::new(kind, Local::now().date_naive())
    }

    pub fn kind(&self) -> CatalogKind {
        match self {
            Draft::Console { .. } => CatalogKind::Console,
            Draft::Emulator { .. } => CatalogKind::Emulator,
            Draft::News(_) => CatalogKind::News,
            Draft::Tool(_) => CatalogKind::Tool,
            Draft::Firmware(_) => CatalogKind::Firmware,
            Draft::Download(_) => CatalogKind::Download,
        }
    }

    pub fn key(&self) -> EntryKey {
        match self {
            Draft::Console { slug, .. } => EntryKey::Console(slug.clone()),
            Draft::Emulator { platform, entry } => EntryKey::Emulator {
                platform: platform.clone(),
                name: entry.name.clone(),
            },
            Draft::News(item) => EntryKey::Listed(item.title.clone()),
            Draft::Tool(tool) => EntryKey::Listed(tool.name.clone()),
            Draft::Firmware(firmware) => EntryKey::Listed(firmware.name.clone()),
            Draft::Download(download) => EntryKey::Listed(download.name.clone()),
        }
    }

    /// Set a console's full name and regenerate its slug from it.
    ///
    /// No-op for other kinds.
    pub fn set_full_name(&mut self, full_name: &str) {
        if let Draft::Console { entry, .. } = self {
            entry.full_name = full_name.to_string();
        }
        self.refresh_slug();
    }

    /// Recompute a console slug from the current full name.
    pub fn refresh_slug(&mut self) {
        if let Draft::Console { slug, entry } = self {
            *slug = ConsoleSlug(generate_slug(&entry.full_name));
        }
    }

    /// Check required fields, rating range, and date format.
    pub fn validate(&self) -> Result<()> {
        match self {
            Draft::Console { slug, entry } => {
                require("name", &entry.name)?;
                require("fullName", &entry.full_name)?;
                require("manufacturer", &entry.manufacturer)?;
                require("description", &entry.description)?;
                if !slug.is_well_formed() {
                    bail!("console slug '{slug}' is not usable; set a full name first");
                }
                if entry.year == 0 {
                    bail!("year must be a positive number");
                }
            }
            Draft::Emulator { entry, .. } => {
                require("name", &entry.name)?;
                require("description", &entry.description)?;
                require("version", &entry.version)?;
                if let Some(rating) = entry.rating {
                    if !(1.0..=5.0).contains(&rating) {
                        bail!("rating must be between 1 and 5, got {rating}");
                    }
                }
                if let Some(date) = &entry.last_updated {
                    parse_iso_date("lastUpdated", date)?;
                }
            }
            Draft::News(item) => {
                require("title", &item.title)?;
                require("excerpt", &item.excerpt)?;
                require("category", &item.category)?;
                parse_iso_date("date", &item.date)?;
            }
            Draft::Tool(tool) => {
                require("name", &tool.name)?;
                require("description", &tool.description)?;
                require("version", &tool.version)?;
                require("category", &tool.category)?;
            }
            Draft::Firmware(firmware) => {
                require("name", &firmware.name)?;
                require("description", &firmware.description)?;
                require("version", &firmware.version)?;
            }
            Draft::Download(download) => {
                require("name", &download.name)?;
                require("version", &download.version)?;
                require("os", &download.os)?;
                require("type", &download.kind)?;
                if let Some(date) = &download.updated {
                    parse_iso_date("updated", date)?;
                }
            }
        }
        Ok(())
    }

    /// The entry as it appears inside its document.
    pub fn to_json(&self) -> Result<Value> {
        let value = match self {
            Draft::Console { entry, .. } => serde_json::to_value(entry),
            Draft::Emulator { entry, .. } => serde_json::to_value(entry),
            Draft::News(item) => serde_json::to_value(item),
            Draft::Tool(tool) => serde_json::to_value(tool),
            Draft::Firmware(firmware) => serde_json::to_value(firmware),
            Draft::Download(download) => serde_json::to_value(download),
        };
        value.with_context(|| format!("serializing {} draft", self.kind()))
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{field} is required");
    }
    Ok(())
}

/// Append `value` to a tag-style list after trimming.
///
/// Returns false when the trimmed value is empty or already present.
pub fn add_item(list: &mut Vec<String>, value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() || list.iter().any(|existing| existing == trimmed) {
        return false;
    }
    list.push(trimmed.to_string());
    true
}

/// Remove every exact occurrence of `value`; returns whether anything changed.
pub fn remove_item(list: &mut Vec<String>, value: &str) -> bool {
    let before = list.len();
    list.retain(|existing| existing != value);
    list.len() != before
}

/// Lower-case `name` and collapse each run of characters outside `[a-z0-9]`
/// into one dash, trimming dashes at either end.
pub fn generate_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// What a save would write.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveReport {
    pub kind: CatalogKind,
    pub key: EntryKey,
    pub entry: Value,
}

impl SaveReport {
    /// Stage the saved entry into an in-memory working copy.
    pub fn apply(&self, repo: &mut ContentRepository) -> Result<()> {
        repo.upsert(self.kind, &self.key, self.entry.clone())
    }
}

/// Validate `draft` and report the entry it produces.
///
/// The report is logged; no file, API, or database is written.
pub fn save(draft: &Draft) -> Result<SaveReport> {
    draft
        .validate()
        .with_context(|| format!("{} draft is incomplete", draft.kind()))?;
    let report = SaveReport {
        kind: draft.kind(),
        key: draft.key(),
        entry: draft.to_json()?,
    };
    tracing::info!(
        kind = %report.kind,
        key = %report.key.label(),
        entry = %report.entry,
        "saved draft"
    );
    Ok(report)
}

/// Parse an uploaded document for `kind`.
///
/// Bytes must be JSON; when `schemas` is given the document must also satisfy
/// the schema registered for the kind's document.
pub fn parse_upload(kind: CatalogKind, bytes: &[u8], schemas: Option<&SchemaSet>) -> Result<Value> {
    let value: Value = serde_json::from_slice(bytes)
        .with_context(|| format!("invalid JSON in {} upload", kind))?;
    if let Some(schemas) = schemas {
        if let Err(details) = schemas.check(&kind.resource_id(), &value) {
            bail!(
                "{} upload does not match {}:\n{}",
                kind,
                kind.document_name(),
                details.join("\n")
            );
        }
    }
    tracing::info!(kind = %kind, "accepted upload");
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema_loader::bundled_schema_dir;
    use crate::templates::template;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn defaults_follow_form_conventions() {
        match Draft::new(CatalogKind::Emulator, day()) {
            Draft::Emulator { platform, entry } => {
                assert_eq!(platform, Platform::Windows);
                assert_eq!(entry.rating, Some(4.0));
                assert_eq!(entry.last_updated.as_deref(), Some("2025-06-01"));
            }
            other => panic!("unexpected draft {other:?}"),
        }
        match Draft::new(CatalogKind::Download, day()) {
            Draft::Download(download) => {
                assert_eq!(download.os, "Windows");
                assert_eq!(download.kind, "Emulator");
            }
            other => panic!("unexpected draft {other:?}"),
        }
        match Draft::new(CatalogKind::Console, day()) {
            Draft::Console { entry, .. } => assert_eq!(entry.year, 2025),
            other => panic!("unexpected draft {other:?}"),
        }
        match Draft::new(CatalogKind::News, day()) {
            Draft::News(item) => {
                assert_eq!(item.category, "News");
                assert_eq!(item.date, "2025-06-01");
            }
            other => panic!("unexpected draft {other:?}"),
        }
    }

    #[test]
    fn add_item_trims_and_skips_duplicates() {
        let mut tags = Vec::new();
        assert!(add_item(&mut tags, "  Netplay "));
        assert!(!add_item(&mut tags, "Netplay"));
        assert!(!add_item(&mut tags, "   "));
        assert!(add_item(&mut tags, "Save States"));
        assert_eq!(tags, vec!["Netplay", "Save States"]);
        assert!(remove_item(&mut tags, "Netplay"));
        assert!(!remove_item(&mut tags, "netplay"));
        assert_eq!(tags, vec!["Save States"]);
    }

    #[test]
    fn slugs_collapse_separators() {
        assert_eq!(generate_slug("Sony PlayStation 3"), "sony-playstation-3");
        assert_eq!(generate_slug("  Sega -- Dreamcast!  "), "sega-dreamcast");
        assert_eq!(generate_slug("Nintendo 64"), "nintendo-64");
        assert_eq!(generate_slug("!!!"), "");
    }

    #[test]
    fn full_name_drives_console_slug() {
        let mut draft = Draft::new(CatalogKind::Console, day());
        draft.set_full_name("Nintendo GameCube");
        assert_eq!(
            draft.key(),
            EntryKey::Console(ConsoleSlug("nintendo-gamecube".into()))
        );
    }

    #[test]
    fn blank_draft_fails_validation() {
        for kind in CatalogKind::ALL {
            let draft = Draft::new(kind, day());
            assert!(save(&draft).is_err(), "{kind} draft should be incomplete");
        }
    }

    #[test]
    fn rating_out_of_range_is_rejected() {
        let mut draft = Draft::new(CatalogKind::Emulator, day());
        if let Draft::Emulator { entry, .. } = &mut draft {
            entry.name = "Dolphin".into();
            entry.description = "GameCube and Wii".into();
            entry.version = "5.0".into();
            entry.rating = Some(0.5);
        }
        let err = draft.validate().unwrap_err();
        assert!(err.to_string().contains("rating"), "{err}");
    }

    #[test]
    fn save_reports_and_stages_entry() {
        let mut draft = Draft::new(CatalogKind::Tool, day());
        if let Draft::Tool(tool) = &mut draft {
            tool.name = "RetroArch".into();
            tool.description = "Frontend for libretro cores".into();
            tool.version = "1.20".into();
            add_item(&mut tool.platforms, "Windows");
        }
        let report = save(&draft).unwrap();
        assert_eq!(report.kind, CatalogKind::Tool);
        assert_eq!(report.key, EntryKey::Listed("RetroArch".into()));
        assert_eq!(report.entry["category"], "Frontend");

        let mut repo = ContentRepository::new();
        report.apply(&mut repo).unwrap();
        let exported = repo.export(CatalogKind::Tool);
        let schemas = SchemaSet::from_dir(&bundled_schema_dir()).unwrap();
        assert!(schemas.check(&CatalogKind::Tool.resource_id(), &exported).is_ok());
    }

    #[test]
    fn upload_rejects_invalid_json_and_schema_violations() {
        let schemas = SchemaSet::from_dir(&bundled_schema_dir()).unwrap();
        assert!(parse_upload(CatalogKind::News, b"{ nope", None).is_err());

        let wrong_shape = br#"{"title": "not an array"}"#;
        assert!(parse_upload(CatalogKind::News, wrong_shape, None).is_ok());
        assert!(parse_upload(CatalogKind::News, wrong_shape, Some(&schemas)).is_err());

        let bytes = serde_json::to_vec(&template(CatalogKind::Firmware)).unwrap();
        let value = parse_upload(CatalogKind::Firmware, &bytes, Some(&schemas)).unwrap();
        assert_eq!(value, template(CatalogKind::Firmware));
    }
}
