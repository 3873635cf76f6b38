//! Input resolution
//!
//! Locates installed packages the way Node.js does: `node_modules/<package>`
//! in the project root, then in each ancestor directory.

use crate::diagnostics::{DtsError, DtsResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Subset of `package.json` used to find a type package's entry point
#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    types: Option<String>,
    typings: Option<String>,
}

/// Resolves packages from `node_modules` directories
#[derive(Debug, Clone)]
pub struct PackageResolver {
    root: PathBuf,
}

impl PackageResolver {
    /// Create a resolver starting at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory of an installed package
    pub fn package_dir(&self, package: &str) -> DtsResult<PathBuf> {
        self.root
            .ancestors()
            .map(|dir| dir.join("node_modules").join(package))
            .find(|candidate| candidate.is_dir())
            .ok_or_else(|| DtsError::package_not_found(package, &self.root))
    }

    /// A file inside an installed package
    pub fn package_file(&self, package: &str, subpath: impl AsRef<Path>) -> DtsResult<PathBuf> {
        let file = self.package_dir(package)?.join(subpath);
        if file.is_file() {
            Ok(file)
        } else {
            Err(DtsError::FileNotFound(file))
        }
    }

    /// Declaration entry point of a type package (`types`, `typings`, or `index.d.ts`)
    pub fn types_entry(&self, package: &str) -> DtsResult<PathBuf> {
        let dir = self.package_dir(package)?;
        let manifest_path = dir.join("package.json");

        let manifest = if manifest_path.is_file() {
            let text = std::fs::read_to_string(&manifest_path).map_err(|source| {
                DtsError::Read {
                    path: manifest_path.clone(),
                    source,
                }
            })?;
            serde_json::from_str(&text).map_err(|source| DtsError::Manifest {
                file: manifest_path.clone(),
                source,
            })?
        } else {
            PackageManifest::default()
        };

        let entry = manifest
            .types
            .or(manifest.typings)
            .unwrap_or_else(|| "index.d.ts".to_string());
        let file = dir.join(entry);
        if file.is_file() {
            Ok(file)
        } else {
            Err(DtsError::FileNotFound(file))
        }
    }

    /// Every declaration file of a type package, entry point first
    ///
    /// Nested `node_modules` directories are skipped; the remaining files are
    /// sorted by path so runs are reproducible.
    pub fn declaration_files(&self, package: &str) -> DtsResult<Vec<PathBuf>> {
        let dir = self.package_dir(package)?;
        let entry = self.types_entry(package)?;

        let mut files = vec![entry.clone()];
        let walker = WalkDir::new(&dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || e.file_name() != "node_modules");

        for item in walker {
            let item = item.map_err(std::io::Error::from)?;
            let path = item.path();
            if item.file_type().is_file() && is_declaration_file(path) && path != entry {
                files.push(path.to_path_buf());
            }
        }

        tracing::debug!(package, count = files.len(), "resolved declaration files");
        Ok(files)
    }
}

/// Check if a path names a declaration file
pub fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.ends_with(".d.ts") || name.ends_with(".d.mts") || name.ends_with(".d.cts"))
        .unwrap_or(false)
}
