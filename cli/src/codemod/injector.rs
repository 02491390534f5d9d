//! # Import Injector
//!
//! File: cli/src/codemod/injector.rs
//!
//! ## Overview
//!
//! Guarantees that a named (or type) import exists in a source file while
//! disturbing the file as little as possible. The decision ladder is:
//!
//! 1. Every requested specifier is already imported from the module: no-op.
//! 2. A value import from the module exists: merge the missing specifiers
//!    into its braces, keeping single-line/multi-line layout, brace spacing
//!    and trailing commas. New value specifiers go before the first inline
//!    `type` specifier, new type specifiers go last. A default-only import
//!    gains a `{ ... }` clause.
//! 3. Only a namespace import exists: add a separate named import directly
//!    after it.
//! 4. Otherwise insert a new statement after the leading import block (or at
//!    the top of the file, after any directive prologue).
//!
//! New statements use the file's dominant quote and line ending. All
//! functions are pure: they take text and return text.
//!
use crate::codemod::imports::{
    analyze, specifier_from_entry, split_entries, strip_comments, ImportAnalysis, ImportKind,
    ImportStatement, Specifier,
};
use crate::codemod::text::{
    insert_line, leading_whitespace, line_at, line_ending, line_starts, splice,
};

/// What the injector did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectOutcome {
    AlreadyPresent,
    /// Specifiers were merged into the statement starting at `line`.
    Merged { line: usize, added: Vec<String> },
    /// A new statement was added right after a namespace import.
    AddedAfterNamespace { line: usize },
    /// A new statement was inserted as line `line`.
    Inserted { line: usize },
}

impl InjectOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, InjectOutcome::AlreadyPresent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    pub text: String,
    pub outcome: InjectOutcome,
}

impl Injection {
    fn unchanged(text: &str) -> Self {
        Injection {
            text: text.to_string(),
            outcome: InjectOutcome::AlreadyPresent,
        }
    }
}

/// Ensures `text` imports every specifier in `wanted` from `module`.
pub fn ensure_named_imports(text: &str, module: &str, wanted: &[Specifier]) -> Injection {
    let analysis = analyze(text);
    let existing: Vec<&ImportStatement> = analysis.from_module(module).collect();

    let mut missing: Vec<&Specifier> = Vec::new();
    for spec in wanted {
        if !is_present(spec, &existing) && !missing.iter().any(|m| m.name == spec.name) {
            missing.push(spec);
        }
    }
    if missing.is_empty() {
        return Injection::unchanged(text);
    }

    if let Some(target) = existing
        .iter()
        .find(|s| matches!(s.kind, ImportKind::Named | ImportKind::Default))
    {
        if let Some(merged) = merge_into(text, target, &missing, false) {
            return merged;
        }
    }

    if missing.iter().all(|s| s.is_type) {
        if let Some(target) = existing
            .iter()
            .find(|s| s.kind == ImportKind::TypeOnly && s.braces.is_some())
        {
            if let Some(merged) = merge_into(text, target, &missing, true) {
                return merged;
            }
        }
    }

    let statement = render_statement(&missing, module, analysis.quote);

    if let Some(namespace) = existing.iter().find(|s| s.kind == ImportKind::Namespace) {
        let line = namespace.end_line + 1;
        return Injection {
            text: insert_line(text, line, &statement),
            outcome: InjectOutcome::AddedAfterNamespace { line },
        };
    }

    let line = insertion_line(text, &analysis);
    Injection {
        text: insert_line(text, line, &statement),
        outcome: InjectOutcome::Inserted { line },
    }
}

/// Ensures `text` has a side-effect import (`import "module";`).
pub fn ensure_side_effect_import(text: &str, module: &str) -> Injection {
    let analysis = analyze(text);
    if analysis.from_module(module).next().is_some() {
        return Injection::unchanged(text);
    }
    let quote = analysis.quote;
    let statement = format!("import {quote}{module}{quote};");
    let line = insertion_line(text, &analysis);
    Injection {
        text: insert_line(text, line, &statement),
        outcome: InjectOutcome::Inserted { line },
    }
}

fn is_present(spec: &Specifier, existing: &[&ImportStatement]) -> bool {
    existing.iter().any(|stmt| {
        let has_name = |require_value: bool| {
            stmt.specifiers
                .iter()
                .any(|s| s.name == spec.name && !(require_value && s.is_type))
        };
        match stmt.kind {
            ImportKind::Namespace | ImportKind::SideEffect => false,
            ImportKind::TypeOnly => spec.is_type && has_name(false),
            ImportKind::Named | ImportKind::Default => has_name(!spec.is_type),
        }
    })
}

fn render_statement(specs: &[&Specifier], module: &str, quote: char) -> String {
    let mut ordered: Vec<&Specifier> = specs.iter().copied().filter(|s| !s.is_type).collect();
    ordered.extend(specs.iter().copied().filter(|s| s.is_type));
    let list = ordered
        .iter()
        .map(|s| s.render(false))
        .collect::<Vec<_>>()
        .join(", ");
    format!("import {{ {list} }} from {quote}{module}{quote};")
}

fn merge_into(
    text: &str,
    target: &ImportStatement,
    missing: &[&Specifier],
    in_type_statement: bool,
) -> Option<Injection> {
    let added: Vec<String> = missing.iter().map(|s| s.name.clone()).collect();

    let new_text = match (&target.braces, &target.clause) {
        (Some(braces), _) => {
            let inner = &text[braces.clone()];
            let merged = merge_brace_content(inner, missing, in_type_statement, line_ending(text));
            splice(text, braces.clone(), &merged)
        }
        (None, Some(clause)) if target.kind == ImportKind::Default => {
            let list = missing
                .iter()
                .map(|s| s.render(false))
                .collect::<Vec<_>>()
                .join(", ");
            splice(text, clause.end..clause.end, &format!(", {{ {list} }}"))
        }
        _ => return None,
    };

    Some(Injection {
        text: new_text,
        outcome: InjectOutcome::Merged {
            line: target.start_line,
            added,
        },
    })
}

/// One entry of an existing brace list, split into code and the line
/// comment that trails it.
struct Entry {
    code: String,
    comment: Option<String>,
    is_type: bool,
}

fn parse_entries(inner: &str) -> (Vec<Entry>, bool) {
    let pieces = split_entries(inner);
    let mut entries: Vec<Entry> = Vec::new();
    let mut trailing_comma = false;

    for (index, piece) in pieces.iter().enumerate() {
        let mut rest: &str = piece;

        // `A, // note` puts the comment after the comma, in the next piece.
        let first_line_end = rest.find('\n').unwrap_or(rest.len());
        if rest[..first_line_end].trim_start().starts_with("//") {
            if let Some(prev) = entries.last_mut() {
                prev.comment = Some(rest[..first_line_end].trim().to_string());
                rest = &rest[first_line_end..];
            }
        }

        if strip_comments(rest).trim().is_empty() {
            if index == pieces.len() - 1 && index > 0 {
                trailing_comma = true;
            }
            continue;
        }

        let trimmed = rest.trim();
        let last_line_start = trimmed.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let (code, comment) = match trimmed[last_line_start..].find("//") {
            Some(pos) => {
                let split = last_line_start + pos;
                (
                    trimmed[..split].trim_end().to_string(),
                    Some(trimmed[split..].trim_end().to_string()),
                )
            }
            None => (trimmed.to_string(), None),
        };
        let is_type = specifier_from_entry(&code).is_some_and(|s| s.is_type);
        entries.push(Entry {
            code,
            comment,
            is_type,
        });
    }
    (entries, trailing_comma)
}

fn merge_brace_content(
    inner: &str,
    missing: &[&Specifier],
    in_type_statement: bool,
    newline: &str,
) -> String {
    let (mut entries, trailing_comma) = parse_entries(inner);

    let insert_at = entries
        .iter()
        .position(|e| e.is_type)
        .unwrap_or(entries.len());
    let new_values: Vec<Entry> = missing
        .iter()
        .filter(|s| !s.is_type)
        .map(|s| Entry {
            code: s.render(in_type_statement),
            comment: None,
            is_type: false,
        })
        .collect();
    entries.splice(insert_at..insert_at, new_values);
    entries.extend(missing.iter().filter(|s| s.is_type).map(|s| Entry {
        code: s.render(in_type_statement),
        comment: None,
        is_type: true,
    }));

    if inner.contains('\n') {
        let lines: Vec<&str> = inner.split('\n').collect();
        // `{ A,` keeps its first entry on the brace line, `B }` keeps the
        // closing brace on the last entry's line.
        let first_inline = !lines[0].trim().is_empty();
        let closing_inline = lines.last().is_some_and(|tail| !tail.trim().is_empty());
        let indent = lines
            .iter()
            .skip(usize::from(first_inline))
            .find(|line| !line.trim().is_empty())
            .map(|line| leading_whitespace(line).to_string())
            .unwrap_or_else(|| "  ".to_string());

        let mut out = if first_inline {
            leading_whitespace(lines[0]).to_string()
        } else {
            newline.to_string()
        };
        let last = entries.len().saturating_sub(1);
        for (index, entry) in entries.iter().enumerate() {
            if !(first_inline && index == 0) {
                out.push_str(&indent);
            }
            out.push_str(&entry.code);
            if index < last || trailing_comma {
                out.push(',');
            }
            if let Some(comment) = &entry.comment {
                out.push(' ');
                out.push_str(comment);
            }
            if index < last || !closing_inline {
                out.push_str(newline);
            }
        }
        if closing_inline {
            out.push_str(&inner[inner.trim_end().len()..]);
        } else if let Some(tail) = lines.last() {
            out.push_str(tail.trim_end_matches('\r'));
        }
        return out;
    }

    let pad = |present: bool| if present || inner.trim().is_empty() { " " } else { "" };
    let left = pad(inner.starts_with(char::is_whitespace));
    let right = pad(inner.ends_with(char::is_whitespace));
    let separator = if inner.contains(',') && !inner.contains(", ") {
        ","
    } else {
        ", "
    };
    let list = entries
        .iter()
        .map(|e| e.code.as_str())
        .collect::<Vec<_>>()
        .join(separator);
    let comma = if trailing_comma { "," } else { "" };
    format!("{left}{list}{comma}{right}")
}

/// Line at which a new import statement belongs: after the last statement of
/// the leading import block, or after a directive prologue / shebang when the
/// file has no imports, or line 0.
fn insertion_line(text: &str, analysis: &ImportAnalysis) -> usize {
    let starts = line_starts(text);
    let mut last_import_end = None;
    let mut prologue_end = None;
    let mut in_block_comment = false;

    let mut line = 0;
    while line < starts.len() {
        let trimmed = line_at(text, &starts, line).trim();
        if in_block_comment {
            in_block_comment = !trimmed.contains("*/");
            line += 1;
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with("//") {
            line += 1;
            continue;
        }
        if trimmed.starts_with("/*") {
            in_block_comment = !trimmed.contains("*/");
            line += 1;
            continue;
        }
        if let Some(stmt) = analysis.statements.iter().find(|s| s.start_line == line) {
            last_import_end = Some(stmt.end_line);
            line = stmt.end_line + 1;
            continue;
        }
        if last_import_end.is_none() && (is_directive(trimmed) || (line == 0 && trimmed.starts_with("#!"))) {
            prologue_end = Some(line);
            line += 1;
            continue;
        }
        break;
    }

    match (last_import_end, prologue_end) {
        (Some(end), _) => end + 1,
        (None, Some(end)) => end + 1,
        (None, None) => 0,
    }
}

fn is_directive(trimmed: &str) -> bool {
    let body = trimmed.trim_end_matches(';');
    ["use client", "use strict", "use server"].iter().any(|d| {
        body == format!("\"{d}\"") || body == format!("'{d}'")
    })
}
