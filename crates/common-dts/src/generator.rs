//! Generator - pipeline orchestration
//!
//! Coordinates one generation run:
//! 1. Resolve and parse the runtime type packages
//! 2. Collect runtime globals
//! 3. Collect runtime type names
//! 4. Parse the worker library and extract its declarations
//! 5. Reconcile the common globals
//! 6. Build the dependency closure and emit the document
//!
//! Progress is narrated through `tracing` at `info` level. The output file is
//! written once, after the document has been fully built and checked.

use crate::closure::build_closure;
use crate::config::GeneratorConfig;
use crate::declaration::DeclarationSet;
use crate::diagnostics::{DtsError, DtsResult};
use crate::emit::{select_declarations, Emitter};
use crate::globals::uncommon_globals;
use crate::reconcile::{common_globals, GlobalLists, RuntimeScan};
use crate::resolve::PackageResolver;
use crate::utils::swc::{parse_declaration_file, ParsedModule};
use indexmap::IndexSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Counts gathered during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Global bindings found in the runtime types
    pub runtime_globals: usize,
    /// Type names found in the primary runtime package
    pub runtime_type_names: usize,
    /// Declarations extracted from the worker library
    pub worker_declarations: usize,
    /// Common globals
    pub common_globals: usize,
    /// Names in the dependency closure
    pub closure: usize,
    /// Declarations written to the output
    pub emitted: usize,
    /// Lines in the output document
    pub lines: usize,
}

/// Result of [`Generator::generate`]
#[derive(Debug, Clone)]
pub struct Generated {
    /// The output document
    pub text: String,
    /// Worker bindings that are runtime globals
    pub common_globals: IndexSet<String>,
    /// Every name the output needs
    pub closure: IndexSet<String>,
    /// Names of the emitted declarations, in output order
    pub emitted: Vec<String>,
    pub report: GenerationReport,
}

/// Generates `common.d.ts`
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run the full pipeline and write the output file
    pub fn run(&self) -> DtsResult<GenerationReport> {
        let root = self
            .config
            .root
            .canonicalize()
            .map_err(|source| DtsError::Read {
                path: self.config.root.clone(),
                source,
            })?;
        let resolver = PackageResolver::new(&root);

        info!(root = %root.display(), "generating common declarations");
        let runtime = self.scan_runtime(&resolver)?;
        let worker = self.load_worker(&resolver)?;
        let generated = self.generate(&worker, &runtime)?;

        let output = root.join(&self.config.output);
        write_output(&output, &generated.text)?;
        info!(
            output = %output.display(),
            lines = generated.report.lines,
            "wrote common declarations"
        );

        Ok(generated.report)
    }

    /// Parse the runtime type packages and collect their globals and type names
    pub fn scan_runtime(&self, resolver: &PackageResolver) -> DtsResult<RuntimeScan> {
        info!("Step 1: Resolving runtime type packages...");
        let primary = parse_package(resolver, &self.config.runtime_package)?;

        let mut extra = Vec::new();
        for package in &self.config.runtime_extra_packages {
            match parse_package(resolver, package) {
                Ok(modules) => extra.extend(modules),
                Err(DtsError::PackageNotFound { .. }) => {
                    warn!(package = %package, "runtime package not installed, skipping");
                }
                Err(err) => return Err(err),
            }
        }
        info!(
            files = primary.len() + extra.len(),
            "parsed runtime declaration files"
        );

        info!("Step 2: Extracting runtime global declarations...");
        let scan = RuntimeScan::from_modules(&primary, &extra);
        info!(
            count = scan.globals.len(),
            examples = %preview(&scan.globals, 10),
            "found runtime globals"
        );

        info!("Step 3: Collecting runtime type names...");
        info!(
            count = scan.type_names.len(),
            examples = %preview(&scan.type_names, 10),
            "found runtime type names"
        );

        Ok(scan)
    }

    /// Parse the worker library
    pub fn load_worker(&self, resolver: &PackageResolver) -> DtsResult<ParsedModule> {
        let path = resolver.package_file(&self.config.worker_package, &self.config.worker_lib)?;
        info!(file = %path.display(), "Step 4: Parsing worker library...");
        parse_declaration_file(&path)
    }

    /// Build the output document from parsed inputs
    ///
    /// Fails when the document would declare a global that is not common.
    pub fn generate(&self, worker: &ParsedModule, runtime: &RuntimeScan) -> DtsResult<Generated> {
        let config = &self.config;

        let declarations = DeclarationSet::extract(worker);
        info!(count = declarations.len(), "found worker declarations");

        info!("Step 5: Finding globals common to both environments...");
        let common = common_globals(
            &declarations,
            &runtime.globals,
            GlobalLists::from_config(config),
        );
        info!(
            count = common.len(),
            examples = %preview(&common, 10),
            "found common globals"
        );

        info!("Step 6: Finding all referenced types...");
        let closure = build_closure(&declarations, &common, &config.excluded_interfaces);
        info!(count = closure.len(), "found types including dependencies");

        let selected = select_declarations(
            &declarations,
            &closure,
            &common,
            &config.excluded_interfaces,
        );
        let emitted: Vec<String> = selected
            .iter()
            .map(|&position| declarations.declarations()[position].name.clone())
            .collect();
        info!(
            count = emitted.len(),
            examples = %preview(&emitted, 20),
            "including declarations"
        );

        let emitter = Emitter::new(&config.excluded_interfaces)?;
        let text = emitter.emit(&declarations, &selected);

        if let Some(name) = uncommon_globals(&text, &common).into_iter().next() {
            return Err(DtsError::UncommonGlobal(name));
        }
        debug!("declared globals are all common");

        let report = GenerationReport {
            runtime_globals: runtime.globals.len(),
            runtime_type_names: runtime.type_names.len(),
            worker_declarations: declarations.len(),
            common_globals: common.len(),
            closure: closure.len(),
            emitted: emitted.len(),
            lines: text.split('\n').count(),
        };

        Ok(Generated {
            text,
            common_globals: common,
            closure,
            emitted,
            report,
        })
    }
}

fn parse_package(resolver: &PackageResolver, package: &str) -> DtsResult<Vec<ParsedModule>> {
    let files = resolver.declaration_files(package)?;
    debug!(package, files = files.len(), "parsing runtime package");
    files.iter().map(parse_declaration_file).collect()
}

fn write_output(path: &Path, text: &str) -> DtsResult<()> {
    std::fs::write(path, text).map_err(|source| DtsError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// First `limit` names, comma separated
fn preview<'a>(names: impl IntoIterator<Item = &'a String>, limit: usize) -> String {
    let mut names = names.into_iter();
    let shown: Vec<&str> = names.by_ref().take(limit).map(String::as_str).collect();
    let mut text = shown.join(", ");
    if names.next().is_some() {
        text.push_str(", ...");
    }
    text
}
