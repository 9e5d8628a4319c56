//! JSON Schema contracts for portal documents.
//!
//! Each document under `data/` is paired with `schema/<stem>.schema.json`.
//! Schemas are compiled once and then used at the loader boundary and by the
//! admin upload path, so a document shaped differently than expected is
//! rejected before any typed code sees it.

use crate::catalog::ResourceId;
use anyhow::{Context, Result, anyhow};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

const SCHEMA_SUFFIX: &str = ".schema.json";

/// A compiled schema plus the file it came from.
pub struct CompiledSchema {
    path: PathBuf,
    title: Option<String>,
    compiled: JSONSchema,
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("path", &self.path)
            .field("title", &self.title)
            .finish()
    }
}

impl CompiledSchema {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Validate an instance, collecting every violation rather than the first.
    pub fn validate(&self, instance: &Value) -> std::result::Result<(), Vec<String>> {
        match self.compiled.validate(instance) {
            Ok(()) => Ok(()),
            Err(errors) => Err(errors
                .map(|err| {
                    let pointer = err.instance_path.to_string();
                    if pointer.is_empty() {
                        err.to_string()
                    } else {
                        format!("{pointer}: {err}")
                    }
                })
                .collect()),
        }
    }
}

/// Load and compile a schema file.
pub fn load_json_schema(path: &Path) -> Result<CompiledSchema> {
    let file = File::open(path).with_context(|| format!("opening schema {}", path.display()))?;
    let schema_value: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing schema {}", path.display()))?;
    compile_schema(path, &schema_value)
}

fn compile_schema(path: &Path, schema_value: &Value) -> Result<CompiledSchema> {
    // The compile error borrows the schema value, so flatten it to a string here.
    let compiled = JSONSchema::compile(schema_value)
        .map_err(|err| anyhow!("compiling schema {}: {err}", path.display()))?;
    Ok(CompiledSchema {
        path: path.to_path_buf(),
        title: schema_value
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string),
        compiled,
    })
}

/// Compiled schemas keyed by the document they describe.
#[derive(Debug, Default)]
pub struct SchemaSet {
    by_id: BTreeMap<ResourceId, CompiledSchema>,
}

impl SchemaSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `<stem>.schema.json` under `dir` as the schema for `<stem>.json`.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut set = SchemaSet::new();
        let entries =
            fs::read_dir(dir).with_context(|| format!("reading schema dir {}", dir.display()))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(stem) = name.strip_suffix(SCHEMA_SUFFIX) else {
                continue;
            };
            let id = ResourceId(format!("{stem}.json"));
            let schema = load_json_schema(&path)?;
            set.insert(id, schema);
        }
        Ok(set)
    }

    pub fn insert(&mut self, id: ResourceId, schema: CompiledSchema) {
        self.by_id.insert(id, schema);
    }

    pub fn get(&self, id: &ResourceId) -> Option<&CompiledSchema> {
        self.by_id.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ResourceId> {
        self.by_id.keys()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Validate `instance` against the schema for `id`; documents without a
    /// registered schema pass.
    pub fn check(&self, id: &ResourceId, instance: &Value) -> std::result::Result<(), Vec<String>> {
        match self.get(id) {
            Some(schema) => schema.validate(instance),
            None => Ok(()),
        }
    }
}

/// Schema directory shipped with the crate.
pub fn bundled_schema_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("schema")
}
