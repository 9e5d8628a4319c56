use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn shipped_data_dir() -> PathBuf {
    repo_root().join("data")
}

pub fn shipped_schema_dir() -> PathBuf {
    repo_root().join("schema")
}

/// Copy of the shipped `data/` and `schema/` trees that a test may mutate.
pub struct FixturePortal {
    pub dir: TempDir,
}

impl FixturePortal {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("failed to allocate fixture portal")?;
        copy_dir(&shipped_data_dir(), &dir.path().join("data"))?;
        copy_dir(&shipped_schema_dir(), &dir.path().join("schema"))?;
        Ok(Self { dir })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root().join("data")
    }

    pub fn schema_dir(&self) -> PathBuf {
        self.root().join("schema")
    }

    pub fn write_document(&self, name: &str, contents: &str) -> Result<()> {
        let path = self.data_dir().join(name);
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))
    }
}

fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from).with_context(|| format!("reading {}", from.display()))? {
        let path = entry?.path();
        if path.is_file() {
            if let Some(name) = path.file_name() {
                fs::copy(&path, to.join(name))
                    .with_context(|| format!("copying {}", path.display()))?;
            }
        }
    }
    Ok(())
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

pub fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}
