//! Publishing the static-archive manifest.
//!
//! Only compiler (`libclang*`, minus the `libclang_rt` runtimes), LLVM
//! core, gtest, Swift and cmark archives go into the manifest consumed by the
//! downstream link.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

use crate::core::layout::Layout;
use crate::ops::symlink::install_build_symlink;
use crate::util::errors::PrepError;
use crate::util::fs::{ensure_dir, path_occupied, write_string};

/// File names eligible for the manifest (the `.a` extension is checked separately).
pub const ARCHIVE_NAME_PATTERN: &str = r"^lib(clang[^_]|LLVM|gtest|swift|cmark).*$";

fn archive_name_regex() -> Result<Regex> {
    Regex::new(ARCHIVE_NAME_PATTERN).context("invalid archive name pattern")
}

fn is_published_archive(re: &Regex, file_name: &str) -> bool {
    file_name.ends_with(".a") && re.is_match(file_name)
}

/// Listing order within a directory: case-insensitive, ties by exact name.
fn listing_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Eligible archives directly inside `dir`. A missing directory has none.
pub fn collect_archives_in(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        tracing::debug!("{} does not exist, no archives", dir.display());
        return Ok(Vec::new());
    }

    let re = archive_name_regex()?;
    let read = std::fs::read_dir(dir)
        .map_err(|e| PrepError::io(format!("failed to read directory: {}", dir.display()), e))?;

    let mut names = Vec::new();
    for entry in read {
        let entry = entry
            .map_err(|e| PrepError::io(format!("failed to read directory: {}", dir.display()), e))?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_published_archive(&re, name) {
                names.push(name.to_string());
            }
        }
    }

    names.sort_by(|a, b| listing_order(a, b));
    Ok(names.into_iter().map(|n| dir.join(n)).collect())
}

/// Eligible archives across every library directory, directory by directory.
pub fn archive_list(layout: &Layout) -> Result<Vec<PathBuf>> {
    let mut archives = Vec::new();
    for dir in layout.library_dirs() {
        archives.extend(collect_archives_in(&dir)?);
    }
    Ok(archives)
}

/// Make the conventional output location usable before anything is written
/// under it.
///
/// If nothing is there yet it becomes the build symlink, so a later build
/// still links its real output into place.
fn prepare_manifest_dir(layout: &Layout, manifest: &Path) -> Result<()> {
    let expected = layout.expected_output_dir();
    if !manifest.starts_with(&expected) || path_occupied(&expected) {
        return Ok(());
    }
    ensure_dir(&layout.output_dir())?;
    install_build_symlink(layout)?;
    Ok(())
}

/// Overwrite the manifest with one archive path per line.
pub fn write_archive_manifest(layout: &Layout) -> Result<Vec<PathBuf>> {
    let archives = archive_list(layout)?;
    let manifest = layout.manifest_path();
    prepare_manifest_dir(layout, &manifest)?;

    let mut contents = String::new();
    for archive in &archives {
        contents.push_str(&archive.to_string_lossy());
        contents.push('\n');
    }
    write_string(&manifest, &contents)?;

    tracing::info!(
        "Wrote {} archive(s) to {}",
        archives.len(),
        manifest.display()
    );
    Ok(archives)
}
