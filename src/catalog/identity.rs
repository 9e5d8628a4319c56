use anyhow::{Result, bail};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Name of one JSON document in the portal data set (e.g., `news.json`).
///
/// The identifier is the only input to address derivation; changing it is what
/// starts a new load cycle.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub String);

/// URL-safe key of a console entry in `consoles.json`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsoleSlug(pub String);

impl ResourceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        ResourceId(value.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(value: String) -> Self {
        ResourceId(value)
    }
}

impl ConsoleSlug {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Slugs are lower-case ASCII words joined by single dashes.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty()
            && self.0.split('-').all(|part| {
                !part.is_empty()
                    && part
                        .chars()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            })
    }
}

impl fmt::Display for ConsoleSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The six content kinds the portal publishes.
///
/// `as_str` is the singular name used by the admin screen and template file
/// names; `document_name` is the JSON document each kind lives in.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum CatalogKind {
    Console,
    Emulator,
    News,
    Tool,
    Firmware,
    Download,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 6] = [
        CatalogKind::Console,
        CatalogKind::Emulator,
        CatalogKind::News,
        CatalogKind::Tool,
        CatalogKind::Firmware,
        CatalogKind::Download,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogKind::Console => "console",
            CatalogKind::Emulator => "emulator",
            CatalogKind::News => "news",
            CatalogKind::Tool => "tool",
            CatalogKind::Firmware => "firmware",
            CatalogKind::Download => "download",
        }
    }

    pub fn document_name(&self) -> &'static str {
        match self {
            CatalogKind::Console => "consoles.json",
            CatalogKind::Emulator => "emulators.json",
            CatalogKind::News => "news.json",
            CatalogKind::Tool => "tools.json",
            CatalogKind::Firmware => "firmware.json",
            CatalogKind::Download => "downloads.json",
        }
    }

    /// Record field the listing's facet picker selects on, if the listing has one.
    pub fn facet_field(&self) -> Option<&'static str> {
        match self {
            CatalogKind::Console => Some("manufacturer"),
            CatalogKind::Tool | CatalogKind::News => Some("category"),
            CatalogKind::Download => Some("os"),
            CatalogKind::Emulator | CatalogKind::Firmware => None,
        }
    }

    pub fn resource_id(&self) -> ResourceId {
        ResourceId::from(self.document_name())
    }

    /// Accepts the singular kind name or the plural page name.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "console" | "consoles" => Ok(CatalogKind::Console),
            "emulator" | "emulators" => Ok(CatalogKind::Emulator),
            "news" => Ok(CatalogKind::News),
            "tool" | "tools" => Ok(CatalogKind::Tool),
            "firmware" | "firmwares" => Ok(CatalogKind::Firmware),
            "download" | "downloads" => Ok(CatalogKind::Download),
            other => bail!(
                "unknown content kind '{other}' (expected console|emulator|news|tool|firmware|download)"
            ),
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host platform an emulator section targets.
///
/// Known variants keep serialization consistent; `Other` keeps documents that
/// introduce a new platform key loadable.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Platform {
    Windows,
    Linux,
    Macos,
    Android,
    Ios,
    Other(String),
}

impl Serialize for Platform {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value))
    }
}

impl Platform {
    pub fn as_str(&self) -> &str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Macos => "macos",
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Other(value) => value.as_str(),
        }
    }

    /// Human-facing platform name used in section titles.
    pub fn label(&self) -> &str {
        match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::Macos => "macOS",
            Platform::Android => "Android",
            Platform::Ios => "iOS",
            Platform::Other(value) => value.as_str(),
        }
    }

    /// Map a section key to a platform; unknown keys are kept verbatim.
    pub fn parse(value: &str) -> Self {
        match value {
            "windows" => Platform::Windows,
            "linux" => Platform::Linux,
            "macos" => Platform::Macos,
            "android" => Platform::Android,
            "ios" => Platform::Ios,
            other => Platform::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
