//! Working copies of the portal documents for the content-management screen.
//!
//! The repository keeps one JSON document per `CatalogKind`. Entries are
//! replaced in place when their key already exists and appended otherwise, so
//! an exported document keeps the order the portal listed it in.

use crate::catalog::identity::{CatalogKind, ConsoleSlug, Platform};
use crate::catalog::index::PortalIndex;
use anyhow::{Context, Result, bail};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// Where an entry lives inside its document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryKey {
    /// Key of the console map.
    Console(ConsoleSlug),
    /// Emulator `name` inside the section for `platform`.
    Emulator { platform: Platform, name: String },
    /// `name` (or `title` for news) of an entry in an array document.
    Listed(String),
}

impl EntryKey {
    pub fn label(&self) -> String {
        match self {
            EntryKey::Console(slug) => slug.to_string(),
            EntryKey::Emulator { platform, name } => format!("{platform}/{name}"),
            EntryKey::Listed(name) => name.clone(),
        }
    }
}

#[derive(Debug, Default)]
/// In-memory documents keyed by the kind of content they hold.
pub struct ContentRepository {
    documents: BTreeMap<CatalogKind, Value>,
}

impl ContentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with every document of a validated index.
    pub fn from_index(index: &PortalIndex) -> Result<Self> {
        let documents = index.documents();
        let mut repo = Self::new();
        repo.register(CatalogKind::Console, serde_json::to_value(&documents.consoles)?)?;
        repo.register(CatalogKind::Emulator, serde_json::to_value(&documents.emulators)?)?;
        repo.register(CatalogKind::Firmware, serde_json::to_value(&documents.firmware)?)?;
        repo.register(CatalogKind::Tool, serde_json::to_value(&documents.tools)?)?;
        repo.register(CatalogKind::Download, serde_json::to_value(&documents.downloads)?)?;
        repo.register(CatalogKind::News, serde_json::to_value(&documents.news)?)?;
        Ok(repo)
    }

    /// Register (or replace) the document for `kind`.
    ///
    /// Consoles and emulators are JSON objects; every other kind is an array.
    pub fn register(&mut self, kind: CatalogKind, document: Value) -> Result<()> {
        let shaped = if is_keyed(kind) {
            document.is_object()
        } else {
            document.is_array()
        };
        if !shaped {
            bail!(
                "{} must be a JSON {}",
                kind.document_name(),
                if is_keyed(kind) { "object" } else { "array" }
            );
        }
        self.documents.insert(kind, document);
        Ok(())
    }

    pub fn get(&self, kind: CatalogKind) -> Option<&Value> {
        self.documents.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = CatalogKind> + '_ {
        self.documents.keys().copied()
    }

    /// Look up one entry by key.
    pub fn entry(&self, kind: CatalogKind, key: &EntryKey) -> Option<&Value> {
        let document = self.documents.get(&kind)?;
        match key {
            EntryKey::Console(slug) => document.get(slug.as_str()),
            EntryKey::Emulator { platform, name } => document
                .get(platform.as_str())?
                .get("emulators")?
                .as_array()?
                .iter()
                .find(|entry| entry_name(kind, entry) == Some(name.as_str())),
            EntryKey::Listed(name) => document
                .as_array()?
                .iter()
                .find(|entry| entry_name(kind, entry) == Some(name.as_str())),
        }
    }

    /// Insert `entry` under `key`, replacing an existing entry with the same key.
    ///
    /// A missing document starts empty; a missing emulator section is created
    /// with a title derived from the platform.
    pub fn upsert(&mut self, kind: CatalogKind, key: &EntryKey, entry: Value) -> Result<()> {
        let document = self.documents.entry(kind).or_insert_with(|| {
            if is_keyed(kind) {
                Value::Object(Map::new())
            } else {
                Value::Array(Vec::new())
            }
        });

        match (kind, key) {
            (CatalogKind::Console, EntryKey::Console(slug)) => {
                let map = document
                    .as_object_mut()
                    .context("consoles.json is not an object")?;
                map.insert(slug.to_string(), entry);
            }
            (CatalogKind::Emulator, EntryKey::Emulator { platform, name }) => {
                let map = document
                    .as_object_mut()
                    .context("emulators.json is not an object")?;
                let section = map.entry(platform.as_str().to_string()).or_insert_with(|| {
                    json!({
                        "title": format!("{} Emulators", platform.label()),
                        "description": "",
                        "emulators": []
                    })
                });
                let list = section
                    .get_mut("emulators")
                    .and_then(Value::as_array_mut)
                    .with_context(|| format!("emulator section {platform} has no emulators list"))?;
                upsert_named(kind, list, name, entry);
            }
            (CatalogKind::Console | CatalogKind::Emulator, _) => {
                bail!("{} entries cannot be keyed by {}", kind, key.label());
            }
            (_, EntryKey::Listed(name)) => {
                let list = document
                    .as_array_mut()
                    .with_context(|| format!("{} is not an array", kind.document_name()))?;
                upsert_named(kind, list, name, entry);
            }
            (_, _) => bail!("{} entries are keyed by name, got {}", kind, key.label()),
        }
        Ok(())
    }

    /// Remove the entry under `key`, returning it when it existed.
    pub fn remove(&mut self, kind: CatalogKind, key: &EntryKey) -> Option<Value> {
        let document = self.documents.get_mut(&kind)?;
        match key {
            EntryKey::Console(slug) => document.as_object_mut()?.remove(slug.as_str()),
            EntryKey::Emulator { platform, name } => {
                let list = document
                    .get_mut(platform.as_str())?
                    .get_mut("emulators")?
                    .as_array_mut()?;
                remove_named(kind, list, name)
            }
            EntryKey::Listed(name) => remove_named(kind, document.as_array_mut()?, name),
        }
    }

    /// The document for `kind` as it would be written back to `data/`.
    pub fn export(&self, kind: CatalogKind) -> Value {
        self.documents.get(&kind).cloned().unwrap_or_else(|| {
            if is_keyed(kind) {
                Value::Object(Map::new())
            } else {
                Value::Array(Vec::new())
            }
        })
    }
}

fn is_keyed(kind: CatalogKind) -> bool {
    matches!(kind, CatalogKind::Console | CatalogKind::Emulator)
}

fn name_field(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::News => "title",
        _ => "name",
    }
}

fn entry_name(kind: CatalogKind, entry: &Value) -> Option<&str> {
    entry.get(name_field(kind)).and_then(Value::as_str)
}

fn upsert_named(kind: CatalogKind, list: &mut Vec<Value>, name: &str, entry: Value) {
    match list
        .iter_mut()
        .find(|existing| entry_name(kind, existing) == Some(name))
    {
        Some(existing) => *existing = entry,
        None => list.push(entry),
    }
}

fn remove_named(kind: CatalogKind, list: &mut Vec<Value>, name: &str) -> Option<Value> {
    let position = list
        .iter()
        .position(|entry| entry_name(kind, entry) == Some(name))?;
    Some(list.remove(position))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrongly_shaped_documents() {
        let mut repo = ContentRepository::new();
        assert!(repo.register(CatalogKind::Console, json!([])).is_err());
        assert!(repo.register(CatalogKind::News, json!({})).is_err());
        assert!(repo.register(CatalogKind::News, json!([])).is_ok());
    }

    #[test]
    fn upsert_replaces_by_name_and_keeps_order() {
        let mut repo = ContentRepository::new();
        repo.register(
            CatalogKind::Tool,
            json!([
                {"name": "RetroArch", "version": "1.19"},
                {"name": "ReShade", "version": "6.0"}
            ]),
        )
        .unwrap();
        let key = EntryKey::Listed("RetroArch".into());
        repo.upsert(CatalogKind::Tool, &key, json!({"name": "RetroArch", "version": "1.20"}))
            .unwrap();
        let exported = repo.export(CatalogKind::Tool);
        assert_eq!(exported[0]["version"], "1.20");
        assert_eq!(exported[1]["name"], "ReShade");
        assert_eq!(exported.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn news_is_keyed_by_title() {
        let mut repo = ContentRepository::new();
        let key = EntryKey::Listed("Hello".into());
        repo.upsert(CatalogKind::News, &key, json!({"title": "Hello"}))
            .unwrap();
        assert!(repo.entry(CatalogKind::News, &key).is_some());
        assert!(repo.remove(CatalogKind::News, &key).is_some());
        assert!(repo.remove(CatalogKind::News, &key).is_none());
    }

    #[test]
    fn emulator_upsert_creates_missing_section() {
        let mut repo = ContentRepository::new();
        let key = EntryKey::Emulator {
            platform: Platform::Macos,
            name: "OpenEmu".into(),
        };
        repo.upsert(CatalogKind::Emulator, &key, json!({"name": "OpenEmu"}))
            .unwrap();
        let exported = repo.export(CatalogKind::Emulator);
        assert_eq!(exported["macos"]["title"], "macOS Emulators");
        assert_eq!(exported["macos"]["emulators"][0]["name"], "OpenEmu");
    }

    #[test]
    fn mismatched_key_is_an_error() {
        let mut repo = ContentRepository::new();
        let err = repo
            .upsert(CatalogKind::Console, &EntryKey::Listed("x".into()), json!({}))
            .unwrap_err();
        assert!(err.to_string().contains("console"), "{err}");
        assert!(
            repo.upsert(
                CatalogKind::Tool,
                &EntryKey::Console(ConsoleSlug("x".into())),
                json!({})
            )
            .is_err()
        );
    }

    #[test]
    fn console_entries_keyed_by_slug() {
        let mut repo = ContentRepository::new();
        let key = EntryKey::Console(ConsoleSlug("sega-saturn".into()));
        repo.upsert(CatalogKind::Console, &key, json!({"name": "Saturn"}))
            .unwrap();
        assert_eq!(repo.export(CatalogKind::Console)["sega-saturn"]["name"], "Saturn");
        assert_eq!(repo.remove(CatalogKind::Console, &key), Some(json!({"name": "Saturn"})));
    }
}
