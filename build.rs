use std::env;
use std::path::{Path, PathBuf};

// The hint is only baked in when it names a portal root; otherwise the
// binaries fall back to RETRODEX_ROOT and the upward search at run time.
fn main() {
    println!("cargo:rerun-if-env-changed=RETRODEX_ROOT_HINT");
    println!("cargo:rerun-if-changed=data");
    println!("cargo:rerun-if-changed=schema");

    let explicit = env::var("RETRODEX_ROOT_HINT").ok().filter(|raw| !raw.is_empty());
    let candidates = explicit
        .into_iter()
        .chain(env::var("CARGO_MANIFEST_DIR").ok())
        .map(PathBuf::from);

    for candidate in candidates {
        if !holds_portal(&candidate) {
            println!(
                "cargo:warning=ignoring root hint {}: no data/ and schema/ there",
                candidate.display()
            );
            continue;
        }
        let canonical = candidate.canonicalize().unwrap_or(candidate);
        println!("cargo:rustc-env=RETRODEX_ROOT_HINT={}", canonical.display());
        return;
    }
}

fn holds_portal(candidate: &Path) -> bool {
    candidate.join("data").is_dir() && candidate.join("schema").is_dir()
}
