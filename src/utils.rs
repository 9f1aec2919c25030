/// Joins trimmed description lines, keeping a single empty line where the
/// source had a paragraph break, and trims the result as a whole.
pub(crate) fn join_description(lines: &[String]) -> String {
    lines.join("\n").trim().to_string()
}

/// Removes up to `indent` leading whitespace characters from a PyString body line.
/// Non-whitespace content is never removed, so under-indented lines keep their text.
pub(crate) fn strip_indent(line: &str, indent: usize) -> String {
    let mut rest = line;
    for _ in 0..indent {
        match rest.chars().next() {
            Some(c) if c == ' ' || c == '\t' => rest = &rest[c.len_utf8()..],
            _ => break,
        }
    }
    rest.to_string()
}

/// Splits a `|`-delimited table row into trimmed cells.
///
/// Text before the first pipe and after the last pipe is discarded. `\|`, `\\`
/// and `\n` are unescaped inside cells.
pub(crate) fn split_row_cells(row: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = row.trim().chars();
    let mut opened = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('|') => current.push('|'),
                Some('\\') => current.push('\\'),
                Some('n') => current.push('\n'),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            '|' => {
                if opened {
                    cells.push(current.trim().to_string());
                }
                opened = true;
                current.clear();
            }
            _ => current.push(c),
        }
    }
    cells
}
