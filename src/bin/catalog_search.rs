//! Search one portal catalog from the command line.
//!
//! Loads the catalog document through the resource loader (schema-checked),
//! applies the same text/facet filter the listing pages use, and prints each
//! match as one JSON line. An empty result prints `no results` on stderr and
//! still exits 0.

use anyhow::{Result, anyhow, bail};
use retrodex::catalog::{
    CatalogKind, ConsoleCatalog, DownloadEntry, EmulatorCatalog, FirmwareEntry, NewsItem, Platform,
    ToolEntry,
};
use retrodex::filter::{Facet, FilterQuery, Listing, search};
use retrodex::loader::{AddressTemplate, FsDocumentStore, LoadStatus, ResourceLoader};
use retrodex::{SchemaSet, data_dir, find_portal_root, init_logging, schema_dir};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = CliArgs::parse()?;
    let (data, schemas) = args.resolve_dirs()?;
    let schemas = Arc::new(SchemaSet::from_dir(&schemas)?);
    let ctx = Context {
        store_root: data,
        schemas,
    };
    let query = FilterQuery::new(args.query.clone()).with_facet(Facet::parse(&args.facet));

    let lines = match args.kind {
        CatalogKind::Console => {
            let consoles: Arc<ConsoleCatalog> = ctx.load(args.kind).await?;
            consoles
                .iter()
                .filter(|(_, entry)| query.matches(*entry))
                .map(|(slug, entry)| render(&json!({ "slug": slug, "entry": entry })))
                .collect::<Result<Vec<_>>>()?
        }
        CatalogKind::Emulator => {
            let sections: Arc<EmulatorCatalog> = ctx.load(args.kind).await?;
            let mut lines = Vec::new();
            for (platform, section) in sections.iter() {
                if args.platform.as_ref().is_some_and(|p| p != platform) {
                    continue;
                }
                for emulator in search(&section.emulators, &query).items() {
                    lines.push(render(&json!({ "platform": platform, "entry": emulator }))?);
                }
            }
            lines
        }
        CatalogKind::Firmware => {
            let items: Arc<Vec<FirmwareEntry>> = ctx.load(args.kind).await?;
            render_listing(search(items.iter(), &query))?
        }
        CatalogKind::Tool => {
            let items: Arc<Vec<ToolEntry>> = ctx.load(args.kind).await?;
            render_listing(search(items.iter(), &query))?
        }
        CatalogKind::Download => {
            let items: Arc<Vec<DownloadEntry>> = ctx.load(args.kind).await?;
            render_listing(search(items.iter(), &query))?
        }
        CatalogKind::News => {
            let items: Arc<Vec<NewsItem>> = ctx.load(args.kind).await?;
            render_listing(search(items.iter(), &query))?
        }
    };

    if lines.is_empty() {
        eprintln!("no results");
        return Ok(());
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

struct Context {
    store_root: PathBuf,
    schemas: Arc<SchemaSet>,
}

impl Context {
    async fn load<T>(&self, kind: CatalogKind) -> Result<Arc<T>>
    where
        T: DeserializeOwned,
    {
        let loader: ResourceLoader<_, T> = ResourceLoader::new(FsDocumentStore::new(&self.store_root))
            .with_template(AddressTemplate::new("{id}")?)
            .with_schemas(self.schemas.clone());
        match loader.load(kind.resource_id()).await {
            LoadStatus::Ready(snapshot) => Ok(snapshot),
            LoadStatus::Failed(message) => bail!(message),
            LoadStatus::Pending => bail!("{} is still loading", kind.document_name()),
        }
    }
}

fn render<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn render_listing<T: Serialize>(listing: Listing<'_, T>) -> Result<Vec<String>> {
    listing.items().iter().map(|item| render(item)).collect()
}

struct CliArgs {
    kind: CatalogKind,
    query: String,
    facet: String,
    platform: Option<Platform>,
    data_dir: Option<PathBuf>,
    schema_dir: Option<PathBuf>,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut kind = None;
        let mut query = String::new();
        let mut facet = Facet::ALL_SENTINEL.to_string();
        let mut platform = None;
        let mut data_dir = None;
        let mut schema_dir = None;

        while let Some(arg_os) = args.next() {
            let arg = os_to_string(arg_os);
            match arg.as_str() {
                "--kind" => kind = Some(CatalogKind::parse(&next_value(&mut args, "--kind")?)?),
                "--query" | "-q" => query = next_value(&mut args, arg.as_str())?,
                "--facet" => facet = next_value(&mut args, "--facet")?,
                "--platform" => {
                    let raw = next_value(&mut args, "--platform")?;
                    platform = Some(Platform::parse(&raw.trim().to_ascii_lowercase()))
                }
                "--data-dir" => data_dir = Some(PathBuf::from(next_value(&mut args, "--data-dir")?)),
                "--schema-dir" => {
                    schema_dir = Some(PathBuf::from(next_value(&mut args, "--schema-dir")?))
                }
                "--help" | "-h" => usage(0),
                other => {
                    eprintln!("Unknown argument: {other}");
                    usage(1);
                }
            }
        }

        let kind = kind.ok_or_else(|| anyhow!("Missing required flag: --kind"))?;
        if platform.is_some() && kind != CatalogKind::Emulator {
            bail!("--platform only applies to --kind emulator");
        }
        if Facet::parse(&facet) != Facet::All && kind.facet_field().is_none() {
            bail!("--facet does not apply to --kind {kind}; its listing has no facet");
        }
        Ok(Self {
            kind,
            query,
            facet,
            platform,
            data_dir,
            schema_dir,
        })
    }

    /// Explicit flags win; otherwise both directories come from the portal root.
    fn resolve_dirs(&self) -> Result<(PathBuf, PathBuf)> {
        if let (Some(data), Some(schema)) = (&self.data_dir, &self.schema_dir) {
            return Ok((data.clone(), schema.clone()));
        }
        let root = find_portal_root()?;
        Ok((
            self.data_dir.clone().unwrap_or_else(|| data_dir(&root)),
            self.schema_dir.clone().unwrap_or_else(|| schema_dir(&root)),
        ))
    }
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(os_to_string)
        .ok_or_else(|| anyhow!("Missing value for {flag}"))
}

fn os_to_string(value: OsString) -> String {
    value.to_string_lossy().into_owned()
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: catalog-search --kind KIND [--query TEXT] [--facet VALUE] [--platform P] [--data-dir DIR] [--schema-dir DIR]\n\n\
KIND is one of console, emulator, firmware, tool, download, news.\n\
--facet selects manufacturer (console), category (tool, news) or os (download); \"all\" disables it.\n\
--platform limits emulator results to one host section (windows, linux, macos, android, ios)."
    );
    std::process::exit(code);
}
