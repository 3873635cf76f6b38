//! common-dts: ambient declarations shared by web workers and Node.js
//!
//! This crate generates `common.d.ts` by:
//! - Parsing `typescript/lib/lib.webworker.d.ts` and the `@types/node` /
//!   `undici-types` declarations using deno_ast/SWC
//! - Keeping the worker globals that the runtime also declares globally
//! - Pulling in every interface, alias, class and enum those globals need
//! - Stripping interfaces the runtime does not provide
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐    ┌──────────────────────┐
//! │ lib.webworker.d.ts   │    │ @types/node          │
//! │ (SWC parse)          │    │ undici-types         │
//! └──────────┬───────────┘    └──────────┬───────────┘
//!            ▼                           ▼
//!    ┌────────────────┐          ┌──────────────┐
//!    │ DeclarationSet │          │ RuntimeScan  │
//!    └───────┬────────┘          └──────┬───────┘
//!            └────────────┬─────────────┘
//!                         ▼
//!                 ┌───────────────┐
//!                 │ common globals│
//!                 └───────┬───────┘
//!                         ▼
//!                 ┌───────────────┐
//!                 │   closure     │
//!                 └───────┬───────┘
//!                         ▼
//!                 ┌───────────────┐
//!                 │  common.d.ts  │
//!                 └───────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use common_dts::{Generator, GeneratorConfig};
//!
//! let config = GeneratorConfig::load(".").expect("Failed to load configuration");
//! let report = Generator::new(config).run().expect("Failed to generate common.d.ts");
//! println!("{} declarations", report.emitted);
//! ```

// Pipeline
pub mod closure;
pub mod declaration;
pub mod emit;
pub mod reconcile;
pub mod references;

// Inputs and outputs
pub mod globals;
pub mod resolve;
pub mod utils;

// Orchestration
pub mod config;
pub mod diagnostics;
pub mod generator;

// Re-exports for convenience
pub use closure::build_closure;
pub use config::{GeneratorConfig, CONFIG_FILE};
pub use declaration::{DeclKind, DeclNode, Declaration, DeclarationSet, NameEntry};
pub use diagnostics::{DtsError, DtsResult};
pub use emit::{select_declarations, Emitter, RewriteRules, HEADER};
pub use generator::{GenerationReport, Generated, Generator};
pub use globals::declared_globals;
pub use reconcile::{common_globals, GlobalLists, RuntimeScan};
pub use references::references;
pub use resolve::PackageResolver;
pub use utils::swc::{parse_declaration_file, parse_declaration_source, ParsedModule};
