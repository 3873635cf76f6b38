//! Generator configuration
//!
//! The defaults reproduce the curated lists the committed `common.d.ts` was
//! generated with. A `common-dts.toml` in the project root may override any
//! field:
//!
//! ```toml
//! output = "common.d.ts"
//! allow_globals = ["Crypto", "atob", "btoa"]
//! excluded_interfaces = ["ServiceWorker"]
//! ```

use crate::diagnostics::{DtsError, DtsResult};
use indexmap::IndexSet;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Name of the optional configuration file in the project root
pub const CONFIG_FILE: &str = "common-dts.toml";

/// Globals available at runtime without an ambient declaration in the runtime types
pub const DEFAULT_ALLOW_GLOBALS: &[&str] = &[
    "Crypto",
    "CryptoKey",
    "Performance",
    "SubtleCrypto",
    "atob",
    "btoa",
];

/// Globals left out even when both environments declare them
pub const DEFAULT_EXCLUDED_GLOBALS: &[&str] = &["CacheStorage"];

/// Globals the runtime types declare but the runtime does not provide
pub const DEFAULT_UNAVAILABLE_GLOBALS: &[&str] = &["EventSource"];

/// Interfaces removed from the output and from `extends` clauses
pub const DEFAULT_EXCLUDED_INTERFACES: &[&str] = &[
    "CookieStoreManager",
    "MediaCapabilities",
    "NavigatorBadge",
    "NavigatorLocks",
    "NavigatorOnLine",
    "NavigationPreloadManager",
    "NavigatorStorage",
    "ServiceWorker",
    "ServiceWorkerContainer",
];

/// Configuration for the generator
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Project root; packages are resolved from `node_modules` above it
    #[serde(skip)]
    pub root: PathBuf,
    /// Output file, relative to the root
    pub output: PathBuf,
    /// Package providing the worker library
    pub worker_package: String,
    /// Worker library file inside `worker_package`
    pub worker_lib: PathBuf,
    /// Runtime type package; must be installed
    pub runtime_package: String,
    /// Additional runtime type packages, skipped when not installed
    pub runtime_extra_packages: Vec<String>,
    /// Names treated as runtime globals even without a runtime declaration
    pub allow_globals: IndexSet<String>,
    /// Worker globals never emitted
    pub excluded_globals: IndexSet<String>,
    /// Globals declared by the runtime types that do not work at runtime
    pub unavailable_globals: IndexSet<String>,
    /// Interfaces removed from the output, from `extends` clauses and from properties
    pub excluded_interfaces: IndexSet<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output: PathBuf::from("common.d.ts"),
            worker_package: "typescript".to_string(),
            worker_lib: PathBuf::from("lib/lib.webworker.d.ts"),
            runtime_package: "@types/node".to_string(),
            runtime_extra_packages: vec!["undici-types".to_string()],
            allow_globals: to_set(DEFAULT_ALLOW_GLOBALS),
            excluded_globals: to_set(DEFAULT_EXCLUDED_GLOBALS),
            unavailable_globals: to_set(DEFAULT_UNAVAILABLE_GLOBALS),
            excluded_interfaces: to_set(DEFAULT_EXCLUDED_INTERFACES),
        }
    }
}

impl GeneratorConfig {
    /// Create the default config for a project root
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Load `common-dts.toml` from the root, falling back to the defaults
    pub fn load(root: impl AsRef<Path>) -> DtsResult<Self> {
        let root = root.as_ref();
        let file = root.join(CONFIG_FILE);
        if !file.is_file() {
            return Ok(Self::new(root));
        }

        let text = std::fs::read_to_string(&file).map_err(|source| DtsError::Read {
            path: file.clone(),
            source,
        })?;
        let mut config = Self::from_toml(&text).map_err(|source| DtsError::Config {
            file: file.clone(),
            source,
        })?;
        config.root = root.to_path_buf();
        tracing::debug!(file = %file.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse a TOML document
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Absolute output path
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output)
    }
}

fn to_set(names: &[&str]) -> IndexSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}
