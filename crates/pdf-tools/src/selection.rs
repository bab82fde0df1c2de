//! Page range expressions
//!
//! An expression is a comma separated list of 1-based page numbers (`5`) and
//! inclusive ranges (`2-4`). Parsing is forgiving: each number is read from
//! its leading digits (`3abc` is page 3, `2.9` is page 2), a range uses the
//! first two numbers around its dashes (`1-3-5` is `1-3`), and tokens without
//! digits, reversed ranges and pages outside the document are dropped. Only an
//! expression that selects nothing at all is an error.

use crate::{Result, ToolError};
use std::collections::BTreeSet;

/// Parse `expr` into ascending, de-duplicated zero-based page indices
pub fn parse_ranges(expr: &str, page_count: usize) -> Result<Vec<usize>> {
    let mut pages = BTreeSet::new();

    for token in expr.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let (start, end) = if token.contains('-') {
            let mut bounds = token.split('-');
            match (
                bounds.next().and_then(parse_page),
                bounds.next().and_then(parse_page),
            ) {
                (Some(start), Some(end)) => (start, end),
                _ => continue,
            }
        } else {
            match parse_page(token) {
                Some(page) => (page, page),
                None => continue,
            }
        };

        // Clamp before iterating so "1-999999999" stays cheap
        let first = start.max(1);
        let last = end.min(page_count);
        for page in first..=last {
            pages.insert(page - 1);
        }
    }

    if pages.is_empty() {
        return Err(ToolError::EmptySelection(format!(
            "\"{expr}\" selects no pages of a {page_count}-page document"
        )));
    }
    Ok(pages.into_iter().collect())
}

/// Leading decimal digits of `text`, after whitespace and an optional `+`
fn parse_page(text: &str) -> Option<usize> {
    let text = text.trim_start();
    let text = text.strip_prefix('+').unwrap_or(text);
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let digits = &text[..end];
    if digits.is_empty() {
        return None;
    }
    // Too many digits for usize is past the end of any document
    Some(digits.parse().unwrap_or(usize::MAX))
}

/// Format zero-based indices as the range expression a user would type
///
/// Consecutive runs collapse into `start-end`.
pub fn format_selection(indices: &[usize]) -> String {
    let sorted: BTreeSet<usize> = indices.iter().copied().collect();
    let mut parts = Vec::new();
    let mut iter = sorted.into_iter().map(|i| i + 1).peekable();

    while let Some(start) = iter.next() {
        let mut end = start;
        while iter.peek() == Some(&(end + 1)) {
            end += 1;
            iter.next();
        }
        if start == end {
            parts.push(start.to_string());
        } else {
            parts.push(format!("{start}-{end}"));
        }
    }

    parts.join(", ")
}
