//! Error types
//!
//! Every failure in the pipeline is fatal: resolution, parsing and emission
//! errors propagate to the caller and no output file is written.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for common-dts operations
pub type DtsResult<T> = Result<T, DtsError>;

/// Main error type for common-dts
#[derive(Debug, Error)]
pub enum DtsError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A declaration source could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output document could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A package could not be found in any `node_modules` directory
    #[error("Package `{package}` not found in node_modules above {}", .from.display())]
    PackageNotFound { package: String, from: PathBuf },

    /// A resolved file does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// TypeScript parse error
    #[error("TypeScript parse error in {file}: {message}")]
    TypeScriptParse { file: PathBuf, message: String },

    /// package.json could not be decoded
    #[error("Invalid package manifest {file}: {source}")]
    Manifest {
        file: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration error
    #[error("Configuration error in {file}: {source}")]
    Config {
        file: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A rewrite rule built from configured names failed to compile
    #[error("Invalid rewrite pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The emitted document declares a global that is not a common binding
    #[error("Emitted global `{0}` is not a common binding")]
    UncommonGlobal(String),
}

impl DtsError {
    /// Create a parse error
    pub fn parse(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        DtsError::TypeScriptParse {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a package-not-found error
    pub fn package_not_found(package: impl Into<String>, from: impl Into<PathBuf>) -> Self {
        DtsError::PackageNotFound {
            package: package.into(),
            from: from.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DtsError::parse("/lib/lib.webworker.d.ts", "Expected ';'");
        assert_eq!(
            err.to_string(),
            "TypeScript parse error in /lib/lib.webworker.d.ts: Expected ';'"
        );

        let err = DtsError::package_not_found("@types/node", "/project");
        assert_eq!(
            err.to_string(),
            "Package `@types/node` not found in node_modules above /project"
        );
    }
}
