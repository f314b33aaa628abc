//! Manifest writer for Diabscreen model directories.
//!
//! Checks that the model and feature list load, then writes `manifest.json`
//! binding both files to their SHA-256 digests. With the manifest in place
//! (and `DIABSCREEN_REQUIRE_MANIFEST=true`) the app refuses to start on a
//! swapped or edited artifact.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin hash_artifacts -- <model_dir>
//! ```

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

use diabscreen::adapters::artifacts::{load_artifacts, write_manifest, LoadOptions, MANIFEST_FILE};

fn usage() -> String {
    "Usage: hash_artifacts <model_dir>".to_string()
}

fn parse_args() -> Result<PathBuf> {
    let mut args = env::args().skip(1);
    let model_dir = match args.next().as_deref() {
        None | Some("-h") | Some("--help") => bail!(usage()),
        Some(dir) => PathBuf::from(dir),
    };
    if args.next().is_some() {
        bail!(usage());
    }

    // Accept a path to one of the files as well as the directory.
    if model_dir.is_file() {
        return model_dir
            .parent()
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("Model path has no parent directory"));
    }
    Ok(model_dir)
}

fn main() -> Result<()> {
    let model_dir = parse_args()?;

    let artifact = load_artifacts(&model_dir, LoadOptions::default())
        .with_context(|| format!("Refusing to hash unloadable artifacts in {model_dir:?}"))?;

    let manifest = write_manifest(&model_dir, chrono::Utc::now().timestamp())
        .with_context(|| format!("Failed to write manifest in {model_dir:?}"))?;
    let manifest_path = model_dir.join(MANIFEST_FILE);

    println!("Wrote manifest: {manifest_path:?}");
    for (name, digest) in &manifest.files {
        println!("  {name}  sha256={digest}");
    }
    println!("Features: {}", artifact.schema().len());

    Ok(())
}
