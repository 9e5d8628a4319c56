//! Validate the portal data set and summarize it.
//!
//! Every document under the data directory is checked against its schema and
//! the semantic rules in `PortalIndex`. On success a one-line-per-document
//! summary is printed (or a JSON object with `--json`); `--console SLUG` and
//! `--manufacturer NAME` print the matching console entries instead.

use anyhow::{Result, anyhow, bail};
use retrodex::catalog::{ConsoleSlug, PortalIndex};
use retrodex::{data_dir, find_portal_root, init_logging, schema_dir};
use serde_json::json;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse()?;
    let (data, schemas) = match (&args.data_dir, &args.schema_dir) {
        (Some(data), Some(schema)) => (data.clone(), schema.clone()),
        _ => {
            let root = find_portal_root()?;
            (
                args.data_dir.clone().unwrap_or_else(|| data_dir(&root)),
                args.schema_dir.clone().unwrap_or_else(|| schema_dir(&root)),
            )
        }
    };
    let index = PortalIndex::load(&data, &schemas)?;

    if let Some(slug) = &args.console {
        let slug = ConsoleSlug(slug.clone());
        let Some(entry) = index.console(&slug) else {
            bail!("console not found: {slug}");
        };
        println!("{}", serde_json::to_string_pretty(entry)?);
        return Ok(());
    }

    if let Some(manufacturer) = &args.manufacturer {
        let matches = index.consoles_by_manufacturer(manufacturer);
        if matches.is_empty() {
            eprintln!("no results");
        }
        for (slug, entry) in matches {
            println!("{}", serde_json::to_string(&json!({ "slug": slug, "entry": entry }))?);
        }
        return Ok(());
    }

    let emulator_count: usize = index
        .platforms()
        .filter_map(|p| index.platform(p))
        .map(|section| section.emulators.len())
        .sum();
    let consoles = index.consoles().count();

    if args.json {
        let summary = json!({
            "consoles": consoles,
            "emulators": emulator_count,
            "platforms": index.platforms().collect::<Vec<_>>(),
            "firmware": index.firmware().len(),
            "tools": index.tools().len(),
            "downloads": index.downloads().len(),
            "news": index.news().len(),
            "manufacturers": index.manufacturers(),
            "toolCategories": index.tool_categories(),
            "newsCategories": index.news_categories(),
            "downloadSystems": index.download_systems(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("consoles.json   {consoles} consoles ({})", index.manufacturers().join(", "));
    println!(
        "emulators.json  {emulator_count} emulators across {} platforms",
        index.platforms().count()
    );
    println!("firmware.json   {} entries", index.firmware().len());
    println!(
        "tools.json      {} tools ({})",
        index.tools().len(),
        index.tool_categories().join(", ")
    );
    println!(
        "downloads.json  {} downloads ({})",
        index.downloads().len(),
        index.download_systems().join(", ")
    );
    println!(
        "news.json       {} articles ({})",
        index.news().len(),
        index.news_categories().join(", ")
    );
    Ok(())
}

#[derive(Default)]
struct CliArgs {
    data_dir: Option<PathBuf>,
    schema_dir: Option<PathBuf>,
    console: Option<String>,
    manufacturer: Option<String>,
    json: bool,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut config = CliArgs::default();

        while let Some(arg_os) = args.next() {
            let arg = arg_os.to_string_lossy().into_owned();
            match arg.as_str() {
                "--data-dir" => {
                    config.data_dir = Some(PathBuf::from(next_value(&mut args, "--data-dir")?))
                }
                "--schema-dir" => {
                    config.schema_dir = Some(PathBuf::from(next_value(&mut args, "--schema-dir")?))
                }
                "--console" => config.console = Some(next_value(&mut args, "--console")?),
                "--manufacturer" => {
                    config.manufacturer = Some(next_value(&mut args, "--manufacturer")?)
                }
                "--json" => config.json = true,
                "--help" | "-h" => usage(0),
                other => {
                    eprintln!("Unknown argument: {other}");
                    usage(1);
                }
            }
        }

        if config.console.is_some() && config.manufacturer.is_some() {
            bail!("--console and --manufacturer are mutually exclusive");
        }
        Ok(config)
    }
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(|value| value.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("Missing value for {flag}"))
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: portal-check [--data-dir DIR] [--schema-dir DIR] [--json] [--console SLUG | --manufacturer NAME]"
    );
    std::process::exit(code);
}
