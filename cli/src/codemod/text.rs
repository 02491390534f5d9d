//! Line-oriented text primitives shared by the analyzer, the injector, the
//! structural patcher and the template rewriter.
//!
//! Lines are addressed by 0-based index and by byte offset. A trailing
//! newline does not start an extra empty line.

/// Byte offset at which every line of `text` starts.
pub fn line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
    if starts.len() > 1 && starts.last() == Some(&text.len()) {
        starts.pop();
    }
    starts
}

/// Byte offset just past the content of line `index` (before its `\n`).
pub fn line_end(text: &str, starts: &[usize], index: usize) -> usize {
    starts
        .get(index + 1)
        .map(|next| next - 1)
        .unwrap_or(text.len())
}

/// Content of line `index` without its line terminator.
pub fn line_at<'a>(text: &'a str, starts: &[usize], index: usize) -> &'a str {
    text[starts[index]..line_end(text, starts, index)].trim_end_matches('\r')
}

/// The line terminator used by `text`; `\n` unless the text uses `\r\n`.
pub fn line_ending(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Leading spaces and tabs of `line`.
pub fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

/// Inserts `statement` as a whole new line before line `index`. An index
/// past the last line appends, adding a terminator to an unterminated final
/// line first.
pub fn insert_line(text: &str, index: usize, statement: &str) -> String {
    let newline = line_ending(text);
    let starts = line_starts(text);
    if !text.is_empty() && index < starts.len() {
        let offset = starts[index];
        let mut out = String::with_capacity(text.len() + statement.len() + 2);
        out.push_str(&text[..offset]);
        out.push_str(statement);
        out.push_str(newline);
        out.push_str(&text[offset..]);
        return out;
    }
    let mut out = text.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push_str(newline);
    }
    out.push_str(statement);
    out.push_str(newline);
    out
}

/// Replaces the byte range `range` of `text` with `replacement`.
pub fn splice(text: &str, range: std::ops::Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..range.start]);
    out.push_str(replacement);
    out.push_str(&text[range.end..]);
    out
}
