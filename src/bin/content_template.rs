//! Write the admin screen's JSON templates to disk.
//!
//! `--kind` may be repeated or given a comma-separated list; `--all` writes one
//! template per content kind. Without `--out` templates land in the current
//! directory. `--stdout` prints a single template instead of writing it.

use anyhow::{Context, Result, anyhow, bail};
use retrodex::catalog::CatalogKind;
use retrodex::templates::{render_template, write_template};
use retrodex::{init_logging, split_list};
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

    if args.stdout {
        let [kind] = args.kinds.as_slice() else {
            bail!("--stdout prints exactly one template; pass a single --kind");
        };
        print!("{}", render_template(*kind)?);
        return Ok(());
    }

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output dir {}", args.out.display()))?;
    for kind in &args.kinds {
        let path = write_template(*kind, &args.out)?;
        println!("{}", path.display());
    }
    Ok(())
}

struct CliArgs {
    kinds: Vec<CatalogKind>,
    out: PathBuf,
    stdout: bool,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args_os().skip(1);
        let mut kinds: Vec<CatalogKind> = Vec::new();
        let mut all = false;
        let mut out = PathBuf::from(".");
        let mut stdout = false;

        while let Some(arg_os) = args.next() {
            let arg = arg_os.to_string_lossy().into_owned();
            match arg.as_str() {
                "--kind" => {
                    for raw in split_list(&next_value(&mut args, "--kind")?) {
                        let kind = CatalogKind::parse(&raw)?;
                        if !kinds.contains(&kind) {
                            kinds.push(kind);
                        }
                    }
                }
                "--all" => all = true,
                "--out" => out = PathBuf::from(next_value(&mut args, "--out")?),
                "--stdout" => stdout = true,
                "--help" | "-h" => usage(0),
                other => {
                    eprintln!("Unknown argument: {other}");
                    usage(1);
                }
            }
        }

        if all {
            if !kinds.is_empty() {
                bail!("--all cannot be combined with --kind");
            }
            kinds = CatalogKind::ALL.to_vec();
        }
        if kinds.is_empty() {
            usage(1);
        }
        Ok(Self { kinds, out, stdout })
    }
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(|value| value.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("Missing value for {flag}"))
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: content-template (--kind KIND[,KIND...] | --all) [--out DIR] [--stdout]\n\n\
KIND is one of console, emulator, news, tool, firmware, download.\n\
Templates are written as <kind>-template.json."
    );
    std::process::exit(code);
}
