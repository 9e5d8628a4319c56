//! Starter documents offered on the admin screen.
//!
//! Each template is a complete, schema-valid document holding one placeholder
//! entry, shaped exactly like the file it will be merged into: console and
//! emulator templates are keyed maps, everything else is an array.

use crate::catalog::CatalogKind;
use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Placeholder document for `kind`.
pub fn template(kind: CatalogKind) -> Value {
    match kind {
        CatalogKind::Console => json!({
            "console-slug": {
                "name": "Console Name",
                "fullName": "Full Console Name",
                "manufacturer": "Manufacturer",
                "year": 2025,
                "generation": "Generation",
                "description": "Brief description",
                "detailedDescription": "Detailed description",
                "specs": {
                    "cpu": "CPU info",
                    "memory": "Memory info",
                    "storage": "Storage info",
                    "graphics": "Graphics info",
                    "audio": "Audio info",
                    "controllers": "Controller info",
                    "connectivity": ["Connection 1", "Connection 2"]
                },
                "popularGames": [
                    { "name": "Game Name", "year": 2025, "genre": "Genre" }
                ],
                "image": "https://images.pexels.com/photos/XXXXXX/image.jpeg",
                "emulators": [
                    { "name": "Emulator Name", "platform": "Platform", "compatibility": "Excellent" }
                ],
                "trivia": ["Fun fact 1", "Fun fact 2"]
            }
        }),
        CatalogKind::Emulator => json!({
            "windows": {
                "title": "Windows Emulators",
                "description": "Description",
                "emulators": [
                    {
                        "name": "Emulator Name",
                        "description": "Description",
                        "version": "1.0.0",
                        "rating": 4.5,
                        "downloads": "1M",
                        "lastUpdated": "2025-01-15",
                        "supported": ["Console"],
                        "features": ["Feature 1"],
                        "platforms": ["Windows"],
                        "downloadUrl": "#",
                        "infoUrl": "#"
                    }
                ]
            }
        }),
        CatalogKind::News => json!([
            {
                "title": "Article Title",
                "excerpt": "Brief summary",
                "date": "2025-01-15",
                "readTime": "5 min",
                "category": "News",
                "tags": ["Tag1", "Tag2"],
                "image": "https://images.pexels.com/photos/XXXXXX/image.jpeg"
            }
        ]),
        CatalogKind::Tool => json!([
            {
                "name": "Tool Name",
                "description": "Tool description",
                "version": "1.0.0",
                "category": "Frontend",
                "platforms": ["windows", "linux"]
            }
        ]),
        CatalogKind::Firmware => json!([
            {
                "name": "Firmware Name",
                "description": "Firmware description",
                "version": "1.0.0",
                "devices": ["Device 1", "Device 2"]
            }
        ]),
        CatalogKind::Download => json!([
            {
                "name": "Download Name",
                "displayName": "Display Name",
                "version": "1.0.0",
                "os": "Windows",
                "type": "Emulator",
                "updated": "2025-01-15",
                "size": "100MB",
                "tags": ["Tag1", "Tag2"]
            }
        ]),
    }
}

/// File name the admin screen downloads the template as.
pub fn template_file_name(kind: CatalogKind) -> String {
    format!("{}-template.json", kind.as_str())
}

/// Pretty-printed template text, two-space indented with a trailing newline.
pub fn render_template(kind: CatalogKind) -> Result<String> {
    let mut text = serde_json::to_string_pretty(&template(kind))
        .with_context(|| format!("serializing {kind} template"))?;
    text.push('\n');
    Ok(text)
}

/// Write the template for `kind` into `dir`, replacing any previous copy.
///
/// The file is staged next to its destination and renamed into place, so a
/// reader never observes a partially written template.
pub fn write_template(kind: CatalogKind, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(template_file_name(kind));
    let text = render_template(kind)?;
    let mut staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    staged
        .write_all(text.as_bytes())
        .with_context(|| format!("writing {} template", kind))?;
    staged
        .persist(&path)
        .with_context(|| format!("persisting {}", path.display()))?;
    tracing::debug!(kind = %kind, path = %path.display(), "wrote template");
    Ok(path)
}

/// Write every template into `dir`, in `CatalogKind::ALL` order.
pub fn write_all_templates(dir: &Path) -> Result<Vec<PathBuf>> {
    CatalogKind::ALL
        .iter()
        .map(|kind| write_template(*kind, dir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        ConsoleCatalog, DownloadEntry, EmulatorCatalog, FirmwareEntry, NewsItem, PortalDocuments,
        PortalIndex, ToolEntry,
    };
    use crate::schema_loader::{SchemaSet, bundled_schema_dir};
    use tempfile::TempDir;

    #[test]
    fn every_template_satisfies_its_schema() {
        let schemas = SchemaSet::from_dir(&bundled_schema_dir()).unwrap();
        for kind in CatalogKind::ALL {
            let result = schemas.check(&kind.resource_id(), &template(kind));
            assert!(result.is_ok(), "{kind}: {result:?}");
        }
    }

    #[test]
    fn templates_decode_and_pass_index_checks() {
        let documents = PortalDocuments {
            consoles: serde_json::from_value::<ConsoleCatalog>(template(CatalogKind::Console))
                .unwrap(),
            emulators: serde_json::from_value::<EmulatorCatalog>(template(CatalogKind::Emulator))
                .unwrap(),
            firmware: serde_json::from_value::<Vec<FirmwareEntry>>(template(CatalogKind::Firmware))
                .unwrap(),
            tools: serde_json::from_value::<Vec<ToolEntry>>(template(CatalogKind::Tool)).unwrap(),
            downloads: serde_json::from_value::<Vec<DownloadEntry>>(template(
                CatalogKind::Download,
            ))
            .unwrap(),
            news: serde_json::from_value::<Vec<NewsItem>>(template(CatalogKind::News)).unwrap(),
        };
        let index = PortalIndex::from_documents(documents).unwrap();
        assert_eq!(index.manufacturers(), vec!["Manufacturer"]);
    }

    #[test]
    fn file_names_follow_kind() {
        assert_eq!(template_file_name(CatalogKind::Console), "console-template.json");
        assert_eq!(template_file_name(CatalogKind::Download), "download-template.json");
    }

    #[test]
    fn write_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("news-template.json");
        std::fs::write(&target, "stale").unwrap();

        let path = write_template(CatalogKind::News, dir.path()).unwrap();
        assert_eq!(path, target);
        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, template(CatalogKind::News));
    }

    #[test]
    fn writes_all_six() {
        let dir = TempDir::new().unwrap();
        let paths = write_all_templates(dir.path()).unwrap();
        assert_eq!(paths.len(), CatalogKind::ALL.len());
        assert!(paths.iter().all(|p| p.is_file()));
    }
}
