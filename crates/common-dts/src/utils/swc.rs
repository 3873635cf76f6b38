//! SWC/deno_ast declaration parsing utilities
//!
//! This module parses ambient declaration files (`.d.ts`) with deno_ast
//! (which wraps SWC) and provides:
//! - Byte-accurate source text extraction for spans
//! - Leading JSDoc lookup
//! - Statement boundary helpers for declared items

use crate::diagnostics::{DtsError, DtsResult};
use deno_ast::swc::common::comments::{Comment, CommentKind};
use deno_ast::swc::common::{BytePos, Span};
use deno_ast::{MediaType, ParseParams, ParsedSource, SourcePos, StartSourcePos};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Information about the source file
#[derive(Debug, Clone)]
pub struct SourceInfo {
    /// The file path
    pub path: PathBuf,
    /// The source text
    pub text: Arc<str>,
}

impl SourceInfo {
    /// Create source info from a file path and content
    pub fn new(path: impl Into<PathBuf>, text: impl Into<Arc<str>>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Get the source text as a string slice
    pub fn source_text(&self) -> &str {
        &self.text
    }

    /// Convert an SWC byte position into an index into the source text
    pub fn byte_index(&self, pos: BytePos) -> usize {
        // SWC reserves BytePos(0), so positions are offset by the start position
        SourcePos::unsafely_from_byte_pos(pos)
            .as_byte_index(StartSourcePos::START_SOURCE_POS)
            .min(self.text.len())
    }

    /// Convert a span into a byte range of the source text
    pub fn byte_range(&self, span: Span) -> Range<usize> {
        self.byte_index(span.lo)..self.byte_index(span.hi)
    }

    /// Extract source text for a span
    pub fn text_for_span(&self, span: Span) -> &str {
        &self.text[self.byte_range(span)]
    }
}

/// A parsed declaration document with source information
#[derive(Debug)]
pub struct ParsedModule {
    /// The parsed source from deno_ast
    pub source: ParsedSource,
    /// Source information for text extraction
    pub source_info: SourceInfo,
}

impl ParsedModule {
    /// Get the program AST as a reference
    pub fn program_ref(&self) -> deno_ast::ProgramRef<'_> {
        self.source.program_ref()
    }

    /// Get the source text
    pub fn source_text(&self) -> &str {
        self.source_info.source_text()
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.source_info.path
    }

    /// Convert an SWC byte position into an index into the source text
    pub fn byte_index(&self, pos: BytePos) -> usize {
        self.source_info.byte_index(pos)
    }

    /// Convert a span into a byte range of the source text
    pub fn byte_range(&self, span: Span) -> Range<usize> {
        self.source_info.byte_range(span)
    }

    /// Extract source text for a span
    pub fn text_for_span(&self, span: Span) -> &str {
        self.source_info.text_for_span(span)
    }

    /// Get leading comments attached to a token position
    pub fn leading_comments(&self, pos: BytePos) -> Vec<Comment> {
        let source_pos = SourcePos::unsafely_from_byte_pos(pos);
        self.source
            .comments()
            .get_leading(source_pos)
            .map(|v| v.to_vec())
            .unwrap_or_default()
    }

    /// Byte range of the `/** ... */` block attached to the token at `pos`
    ///
    /// Only the last JSDoc block before the token counts, and only when
    /// nothing but whitespace separates it from the token.
    pub fn jsdoc_before(&self, pos: BytePos) -> Option<Range<usize>> {
        let leading = self.leading_comments(pos);
        let jsdoc = leading.iter().rev().find(|c| is_jsdoc(c))?;
        let range = self.byte_range(jsdoc.span);
        let gap = &self.source_text()[range.end..self.byte_index(pos)];
        gap.trim().is_empty().then_some(range)
    }

    /// Start of a statement, widened over a leading `declare` keyword
    ///
    /// Returns the byte index together with the matching SWC position, which
    /// is the key leading comments are stored under.
    pub fn statement_start(&self, span: Span) -> (usize, BytePos) {
        let lo = self.byte_index(span.lo);
        let before = self.source_text()[..lo].trim_end();
        let widened = before
            .strip_suffix("declare")
            .filter(|rest| !rest.ends_with(is_ident_char))
            .map(str::len);

        match widened {
            Some(start) => (start, BytePos(span.lo.0 - (lo - start) as u32)),
            None => (lo, span.lo),
        }
    }

    /// End of a statement, widened over a trailing `;` on the same line
    pub fn statement_end(&self, span: Span) -> usize {
        let hi = self.byte_index(span.hi);
        let rest = &self.source_text()[hi..];
        let padding = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        if rest[padding..].starts_with(';') {
            hi + padding + 1
        } else {
            hi
        }
    }
}

/// Whether a comment is a JSDoc block (`/** ... */`)
pub fn is_jsdoc(comment: &Comment) -> bool {
    comment.kind == CommentKind::Block && comment.text.starts_with('*')
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Parse a declaration file from disk
pub fn parse_declaration_file(path: impl AsRef<Path>) -> DtsResult<ParsedModule> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| DtsError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_declaration_source(path, text)
}

/// Parse declaration source code from a string
///
/// `path` must be absolute; it determines the media type and the module
/// specifier used in diagnostics.
pub fn parse_declaration_source(
    path: impl AsRef<Path>,
    source: impl Into<Arc<str>>,
) -> DtsResult<ParsedModule> {
    let path = path.as_ref();
    let source: Arc<str> = source.into();

    let media_type = MediaType::from_path(path);

    let specifier = deno_ast::ModuleSpecifier::from_file_path(path)
        .map_err(|_| DtsError::InvalidPath(path.display().to_string()))?;

    let parsed = deno_ast::parse_module(ParseParams {
        specifier,
        text: source.clone(),
        media_type,
        capture_tokens: false,
        scope_analysis: false,
        maybe_syntax: None,
    })
    .map_err(|e| DtsError::parse(path, e.to_string()))?;

    for diagnostic in parsed.diagnostics() {
        tracing::warn!(file = %path.display(), "{}", diagnostic);
    }

    Ok(ParsedModule {
        source: parsed,
        source_info: SourceInfo::new(path, source),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use deno_ast::swc::common::Spanned;

    fn first_stmt_span(parsed: &ParsedModule) -> Span {
        match parsed.program_ref() {
            deno_ast::ProgramRef::Module(m) => m.body[0].span(),
            deno_ast::ProgramRef::Script(s) => s.body[0].span(),
        }
    }

    #[test]
    fn test_parse_declaration_source() {
        let source = "interface Foo {\n    x: number;\n}\ndeclare var Foo: Foo;\n";

        // deno_ast requires absolute paths for file specifiers
        let parsed = parse_declaration_source("/tmp/test.d.ts", source).unwrap();
        match parsed.program_ref() {
            deno_ast::ProgramRef::Module(m) => assert_eq!(m.body.len(), 2),
            deno_ast::ProgramRef::Script(s) => assert_eq!(s.body.len(), 2),
        }
    }

    #[test]
    fn test_relative_path_is_rejected() {
        let err = parse_declaration_source("lib.d.ts", "interface A {}").unwrap_err();
        assert!(matches!(err, DtsError::InvalidPath(_)));
    }

    #[test]
    fn test_text_for_span_is_byte_accurate() {
        let source = "// leading\ninterface Foo {}\n";
        let parsed = parse_declaration_source("/tmp/test.d.ts", source).unwrap();
        let span = first_stmt_span(&parsed);
        assert_eq!(parsed.text_for_span(span), "interface Foo {}");
    }

    #[test]
    fn test_statement_bounds_cover_declare_and_semicolon() {
        let source = "declare function atob(data: string): string;\n";
        let parsed = parse_declaration_source("/tmp/test.d.ts", source).unwrap();
        let span = first_stmt_span(&parsed);
        let (start, _) = parsed.statement_start(span);
        let end = parsed.statement_end(span);
        assert_eq!(&source[start..end], "declare function atob(data: string): string;");
    }

    #[test]
    fn test_jsdoc_before() {
        let source = "/** first */\n/** The Foo type */\ninterface Foo {}\n";
        let parsed = parse_declaration_source("/tmp/test.d.ts", source).unwrap();
        let span = first_stmt_span(&parsed);
        let (_, key) = parsed.statement_start(span);
        let range = parsed.jsdoc_before(key).unwrap();
        assert_eq!(&source[range], "/** The Foo type */");
    }

    #[test]
    fn test_jsdoc_ignores_plain_comments() {
        let source = "/* plain */\n// line\ninterface Foo {}\n";
        let parsed = parse_declaration_source("/tmp/test.d.ts", source).unwrap();
        let span = first_stmt_span(&parsed);
        assert!(parsed.jsdoc_before(span.lo).is_none());

        let source = "/** doc */\n// interrupted\ninterface Foo {}\n";
        let parsed = parse_declaration_source("/tmp/test.d.ts", source).unwrap();
        let span = first_stmt_span(&parsed);
        assert!(parsed.jsdoc_before(span.lo).is_none());
    }

    #[test]
    fn test_is_jsdoc() {
        let source = "/**/\ninterface A {}\n";
        let parsed = parse_declaration_source("/tmp/test.d.ts", source).unwrap();
        let span = first_stmt_span(&parsed);
        let leading = parsed.leading_comments(span.lo);
        assert_eq!(leading.len(), 1);
        assert!(!is_jsdoc(&leading[0]));
    }
}
