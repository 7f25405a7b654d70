//! Escaping for text embedded in an ffmpeg filter graph.
//!
//! A drawtext value passes through two parsers: the filter-option parser
//! (`key=value:key=value`) and, around it, the filter-graph parser
//! (`filter,filter;[label]`). Each level gets its own backslash escaping,
//! applied innermost first.

/// Characters the filter-option parser treats specially.
const OPTION_SPECIAL: &[char] = &['\\', '\'', ':'];

/// Characters the filter-graph parser treats specially.
const GRAPH_SPECIAL: &[char] = &['\\', '\'', '[', ']', ',', ';'];

/// Escape a value for the filter-option level.
///
/// Leading and trailing whitespace is escaped too, since the option parser
/// trims unescaped whitespace at both ends.
pub fn escape_option_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let first_kept = chars.iter().position(|c| !c.is_whitespace());
    let last_kept = chars.iter().rposition(|c| !c.is_whitespace());

    let mut out = String::with_capacity(value.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        let edge_whitespace = c.is_whitespace()
            && match (first_kept, last_kept) {
                (Some(first), Some(last)) => i < first || i > last,
                _ => true,
            };
        if OPTION_SPECIAL.contains(&c) || edge_whitespace {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape a filter argument string for the filter-graph level.
pub fn escape_graph_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        if GRAPH_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape caption text for a drawtext `text=` option inside a graph.
///
/// The text is otherwise kept verbatim; drawtext must run with
/// `expansion=none` so `%` sequences are not interpreted.
pub fn escape_drawtext_text(text: &str) -> String {
    escape_graph_value(&escape_option_value(text))
}
