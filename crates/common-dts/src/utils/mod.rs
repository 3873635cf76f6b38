//! Utilities for common-dts
//!
//! This module provides utilities for:
//! - SWC/deno_ast declaration parsing

pub mod swc;

pub use swc::{parse_declaration_file, parse_declaration_source, ParsedModule, SourceInfo};
