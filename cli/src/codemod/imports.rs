//! # Import Analyzer
//!
//! File: cli/src/codemod/imports.rs
//!
//! ## Overview
//!
//! Finds the ES `import` statements of a source file with a line scanner.
//! There is no JavaScript parser here: a line whose trimmed text starts with
//! the `import` keyword opens a statement, and lines are accumulated until
//! the accumulated text ends in a `from '<module>'` clause (or is a bare
//! side-effect import). Each statement is classified by kind and its
//! specifiers are extracted, including inline `type` markers.
//!
//! If a statement never terminates (an opening brace with no `from` clause
//! within a bounded number of lines) the whole analysis degrades to "no
//! imports found". Callers then insert at the top of the file, which is
//! always syntactically safe.
//!
//! The analysis also records the file's dominant quote character so new
//! statements match the surrounding style.
//!
use crate::codemod::text::{line_at, line_end, line_starts};
use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::OnceLock;
use tracing::debug;

/// Upper bound on the number of lines a single import statement may span.
const MAX_STATEMENT_LINES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import { a, b } from "m"` (optionally with a default binding).
    Named,
    /// `import * as ns from "m"`.
    Namespace,
    /// `import Thing from "m"`.
    Default,
    /// `import type { A } from "m"` or `import type A from "m"`.
    TypeOnly,
    /// `import "m"`.
    SideEffect,
}

/// One imported name. `name` is the exported name, not the local alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Specifier {
    pub name: String,
    pub is_type: bool,
}

impl Specifier {
    pub fn value(name: impl Into<String>) -> Self {
        Specifier {
            name: name.into(),
            is_type: false,
        }
    }

    pub fn type_only(name: impl Into<String>) -> Self {
        Specifier {
            name: name.into(),
            is_type: true,
        }
    }

    /// Source text for this specifier inside braces. Inside an
    /// `import type { ... }` statement the `type` keyword is implied.
    pub fn render(&self, in_type_statement: bool) -> String {
        if self.is_type && !in_type_statement {
            format!("type {}", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// A parsed import statement with the positions needed to edit it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub kind: ImportKind,
    pub specifiers: Vec<Specifier>,
    pub default_binding: Option<String>,
    pub namespace: Option<String>,
    pub module_path: String,
    pub quote: char,
    /// First and last line of the statement (0-based, inclusive).
    pub start_line: usize,
    pub end_line: usize,
    /// Byte range of the clause between `import` and `from`.
    pub clause: Option<Range<usize>>,
    /// Byte range of the text between `{` and `}`.
    pub braces: Option<Range<usize>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportAnalysis {
    pub statements: Vec<ImportStatement>,
    pub quote: char,
}

impl ImportAnalysis {
    /// Statements importing exactly `module`.
    pub fn from_module<'a>(
        &'a self,
        module: &'a str,
    ) -> impl Iterator<Item = &'a ImportStatement> + 'a {
        self.statements
            .iter()
            .filter(move |stmt| stmt.module_path == module)
    }
}

fn from_clause_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^import\s*(?P<clause>[^'"]*?)\s*\bfrom\s*(?P<q>['"])(?P<path>[^'"\r\n]+)['"]"#,
        )
        .expect("valid import regex")
    })
}

fn side_effect_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^import\s*(?P<q>['"])(?P<path>[^'"\r\n]+)['"]"#)
            .expect("valid side-effect import regex")
    })
}

/// True if a trimmed line opens an import statement. Excludes dynamic
/// `import(...)` and `import.meta`.
pub fn is_import_start(trimmed: &str) -> bool {
    match trimmed.strip_prefix("import") {
        Some(rest) => rest
            .chars()
            .next()
            .is_some_and(|c| c.is_whitespace() || matches!(c, '{' | '*' | '\'' | '"')),
        None => false,
    }
}

/// Quote character of the first import line that contains one; `"` if no
/// import line has a quote.
pub fn dominant_quote(text: &str) -> char {
    text.lines()
        .map(str::trim_start)
        .filter(|line| line.starts_with("import"))
        .find_map(|line| line.chars().find(|c| *c == '\'' || *c == '"'))
        .unwrap_or('"')
}

/// Finds every import statement in `text`.
pub fn analyze(text: &str) -> ImportAnalysis {
    let quote = dominant_quote(text);
    let starts = line_starts(text);
    let mut statements = Vec::new();
    let mut past_import_block = false;

    let mut line = 0;
    while line < starts.len() {
        let content = line_at(text, &starts, line);
        // Top-level statements start in column 0.
        if !is_import_start(content) {
            past_import_block |= is_code_line(content);
            line += 1;
            continue;
        }
        let stmt_start = starts[line];

        let mut end = line;
        let parsed = loop {
            let chunk = &text[stmt_start..line_end(text, &starts, end)];
            if let Some(stmt) = parse_statement(chunk, stmt_start) {
                break Some(stmt);
            }
            end += 1;
            if end >= starts.len() || end - line >= MAX_STATEMENT_LINES {
                break None;
            }
        };

        match parsed {
            Some(mut stmt) => {
                stmt.start_line = line;
                stmt.end_line = end;
                statements.push(stmt);
                line = end + 1;
            }
            None if !past_import_block => {
                debug!(
                    "Unterminated import statement at line {}; treating file as having no imports",
                    line + 1
                );
                return ImportAnalysis {
                    statements: Vec::new(),
                    quote,
                };
            }
            None => {
                debug!("Ignoring unparseable import-like line {}", line + 1);
                line += 1;
            }
        }
    }

    ImportAnalysis { statements, quote }
}

/// True for a line of code other than imports, comments, directives or a
/// shebang.
fn is_code_line(line: &str) -> bool {
    let trimmed = line.trim();
    !(trimmed.is_empty()
        || trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*')
        || trimmed.starts_with("#!")
        || trimmed.starts_with('"')
        || trimmed.starts_with('\''))
}

/// Parses the statement at the start of `chunk`. `base` is the byte offset
/// of `chunk` within the file.
fn parse_statement(chunk: &str, base: usize) -> Option<ImportStatement> {
    if let Some(caps) = side_effect_regex().captures(chunk) {
        return Some(ImportStatement {
            kind: ImportKind::SideEffect,
            specifiers: Vec::new(),
            default_binding: None,
            namespace: None,
            module_path: caps["path"].to_string(),
            quote: quote_of(&caps),
            start_line: 0,
            end_line: 0,
            clause: None,
            braces: None,
        });
    }

    let caps = from_clause_regex().captures(chunk)?;
    let clause_match = caps.name("clause")?;
    let clause = clause_match.as_str();
    if clause.is_empty() {
        return None;
    }
    let clause_start = base + clause_match.start();

    let (type_only, body) = match clause.strip_prefix("type") {
        Some(rest) if rest.starts_with(|c: char| c.is_whitespace() || c == '{' || c == '*') => {
            (true, rest.trim_start())
        }
        _ => (false, clause),
    };
    let body_start = clause_start + (clause.len() - body.len());

    let mut default_binding = None;
    let mut namespace = None;
    let mut specifiers = Vec::new();
    let mut braces = None;

    if let Some(open) = body.find('{') {
        let close = open + body[open..].find('}')?;
        braces = Some(body_start + open + 1..body_start + close);
        specifiers = split_entries(&body[open + 1..close])
            .iter()
            .filter_map(|entry| specifier_from_entry(entry))
            .collect();
        default_binding = binding_before(&body[..open]);
    } else if let Some(star) = body.find('*') {
        let after = body[star + 1..].trim_start();
        namespace = after
            .strip_prefix("as")
            .map(|rest| rest.trim().to_string())
            .filter(|name| !name.is_empty());
        default_binding = binding_before(&body[..star]);
    } else {
        default_binding = binding_before(body);
    }

    let kind = if type_only {
        ImportKind::TypeOnly
    } else if namespace.is_some() {
        ImportKind::Namespace
    } else if braces.is_some() {
        ImportKind::Named
    } else {
        ImportKind::Default
    };

    Some(ImportStatement {
        kind,
        specifiers,
        default_binding,
        namespace,
        module_path: caps["path"].to_string(),
        quote: quote_of(&caps),
        start_line: 0,
        end_line: 0,
        clause: Some(clause_start..clause_start + clause.len()),
        braces,
    })
}

fn quote_of(caps: &Captures<'_>) -> char {
    caps["q"].chars().next().unwrap_or('"')
}

fn binding_before(text: &str) -> Option<String> {
    let binding = text.trim().trim_end_matches(',').trim();
    (!binding.is_empty()).then(|| binding.to_string())
}

/// Splits brace content on commas that are not inside a comment. Pieces are
/// returned untrimmed so callers can recover comments and layout.
pub(crate) fn split_entries(inner: &str) -> Vec<&str> {
    let bytes = inner.as_bytes();
    let mut pieces = Vec::new();
    let mut piece_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 2;
                continue;
            }
            b',' => {
                pieces.push(&inner[piece_start..i]);
                piece_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    pieces.push(&inner[piece_start.min(inner.len())..]);
    pieces
}

/// Removes `//` and `/* */` comments from a specifier entry.
pub(crate) fn strip_comments(entry: &str) -> String {
    let mut out = String::with_capacity(entry.len());
    let mut rest = entry;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("//") {
            rest = after.find('\n').map(|nl| &after[nl..]).unwrap_or("");
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.find("*/").map(|end| &after[end + 2..]).unwrap_or("");
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
    }
    out
}

/// Parses one brace entry (`A`, `type B`, `C as D`) into a specifier.
pub(crate) fn specifier_from_entry(entry: &str) -> Option<Specifier> {
    let code = strip_comments(entry);
    let code = code.trim();
    if code.is_empty() {
        return None;
    }
    let (is_type, rest) = match code.strip_prefix("type") {
        Some(rest) if rest.starts_with(char::is_whitespace) => (true, rest.trim_start()),
        _ => (false, code),
    };
    let name = rest.split_whitespace().next()?;
    Some(Specifier {
        name: name.trim_matches(|c| c == '"' || c == '\'').to_string(),
        is_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(stmt: &ImportStatement) -> Vec<(&str, bool)> {
        stmt.specifiers
            .iter()
            .map(|s| (s.name.as_str(), s.is_type))
            .collect()
    }

    #[test]
    fn test_classifies_statement_kinds() {
        let text = r#"import React from "react";
import * as path from "node:path";
import { useState, type FC } from "react";
import type { Route } from "./types";
import "./styles.css";
"#;
        let analysis = analyze(text);
        let kinds: Vec<ImportKind> = analysis.statements.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ImportKind::Default,
                ImportKind::Namespace,
                ImportKind::Named,
                ImportKind::TypeOnly,
                ImportKind::SideEffect
            ]
        );
        assert_eq!(analysis.statements[0].default_binding.as_deref(), Some("React"));
        assert_eq!(analysis.statements[1].namespace.as_deref(), Some("path"));
        assert_eq!(
            names(&analysis.statements[2]),
            vec![("useState", false), ("FC", true)]
        );
        assert_eq!(analysis.statements[4].module_path, "./styles.css");
    }

    #[test]
    fn test_multiline_statement_spans_lines() {
        let text = "import {\n  BrowserRouter,\n  Routes as R, // main switch\n  Route,\n} from 'react-router-dom';\nconst x = 1;\n";
        let analysis = analyze(text);
        assert_eq!(analysis.statements.len(), 1);
        let stmt = &analysis.statements[0];
        assert_eq!((stmt.start_line, stmt.end_line), (0, 4));
        assert_eq!(stmt.quote, '\'');
        assert_eq!(
            names(stmt),
            vec![("BrowserRouter", false), ("Routes", false), ("Route", false)]
        );
        let braces = stmt.braces.clone().unwrap();
        assert!(text[braces].contains("BrowserRouter"));
    }

    #[test]
    fn test_default_with_named() {
        let analysis = analyze("import React, { useState } from \"react\";\n");
        let stmt = &analysis.statements[0];
        assert_eq!(stmt.kind, ImportKind::Named);
        assert_eq!(stmt.default_binding.as_deref(), Some("React"));
        assert_eq!(names(stmt), vec![("useState", false)]);
    }

    #[test]
    fn test_unterminated_statement_yields_no_imports() {
        let text = "import React from 'react';\nimport {\n  a,\n  b,\n\nconst x = 1;\n";
        let analysis = analyze(text);
        assert!(analysis.statements.is_empty());
    }

    #[test]
    fn test_import_text_below_the_block_keeps_statements() {
        let text = "import { BrowserRouter, Routes, Route } from \"react-router-dom\";\n\nexport default () => (\n  <p>\n        import your data below\n  </p>\n);\nimport stray\nconst y = 2;\n";
        let analysis = analyze(text);
        assert_eq!(analysis.statements.len(), 1);
        assert_eq!(analysis.statements[0].module_path, "react-router-dom");
        assert_eq!(
            names(&analysis.statements[0]),
            vec![("BrowserRouter", false), ("Routes", false), ("Route", false)]
        );
    }

    #[test]
    fn test_ignores_dynamic_import_and_import_meta() {
        let text = "const m = import('./lazy');\nconsole.log(import.meta.env);\n";
        assert!(analyze(text).statements.is_empty());
        assert!(!is_import_start("import('./x')"));
        assert!(!is_import_start("import.meta"));
        assert!(!is_import_start("importer()"));
        assert!(is_import_start("import{a} from 'b'"));
    }

    #[test]
    fn test_dominant_quote() {
        assert_eq!(dominant_quote("import a from 'a';\nimport b from \"b\";"), '\'');
        assert_eq!(dominant_quote("const x = 'y';"), '"');
        assert_eq!(dominant_quote("  import \"./x.css\";"), '"');
    }

    #[test]
    fn test_split_entries_respects_comments() {
        let pieces = split_entries(" a, /* b, c */ d, // e, f\n g ");
        assert_eq!(pieces.len(), 3);
        assert_eq!(specifier_from_entry(pieces[1]), Some(Specifier::value("d")));
        assert_eq!(specifier_from_entry(pieces[2]), Some(Specifier::value("g")));
    }
}
