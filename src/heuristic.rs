//! Regex heuristic: derive read/write/text from a single line of Go
//! source, without an oracle.
//!
//! This is deliberately approximate. It reasons about one line at a
//! time, so multi-line statements, shadowing, and mutation through
//! pointers are out of reach; such occurrences fall back to `Read` or
//! `Unknown` rather than guessing harder.

use std::collections::HashMap;

use regex::Regex;

use crate::classify::Classify;
use crate::source::LineSource;
use crate::types::{Classification, Location};

/// Matches an assignment operator directly after the occurrence:
/// `=`, `:=`, compound ops (`+=`, `<<=`, `&^=`, ...), optionally
/// reached through index expressions (`x[i] = ...`) or a tuple
/// assignment list (`x, err := ...`). A doubled `=` and the `!=`, `<=`,
/// `>=` comparisons cannot match: `<`, `>`, `!` are not in the operator
/// set and `=(?:[^=]|$)` refuses `==`.
const ASSIGN_AFTER: &str = r"^(?:\s*\[[^\]]*\])*(?:\s*,\s*[A-Za-z_][\w.]*(?:\[[^\]]*\])?)*\s*(?::=|(?:<<|>>|&\^|[+\-*/%&|^])?=(?:[^=]|$))";

/// Matches `++`/`--` directly after the occurrence, optionally through
/// an index expression (`counts[k]++`).
const INCDEC_AFTER: &str = r"^(?:\s*\[[^\]]*\])*\s*(?:\+\+|--)";

/// Line-local classification backed by a [`LineSource`].
///
/// The symbol text is taken from the occurrence's own range, so the
/// classifier needs nothing beyond the location itself. Per-symbol
/// patterns are compiled once and reused across a reference set.
pub struct HeuristicClassifier {
    assign: Regex,
    incdec: Regex,
    self_append: HashMap<String, Regex>,
    source: Box<dyn LineSource>,
}

impl HeuristicClassifier {
    /// # Panics
    ///
    /// Panics if the hardcoded operator regexes are invalid
    /// (compile-time invariant).
    pub fn new(source: Box<dyn LineSource>) -> Self {
        return Self {
            assign: Regex::new(ASSIGN_AFTER).expect("valid regex"),
            incdec: Regex::new(INCDEC_AFTER).expect("valid regex"),
            self_append: HashMap::new(),
            source,
        };
    }

    /// Classify the occurrence of `symbol` at char column `column` of
    /// the (already neutralized) line.
    fn classify_in_line(&mut self, neutral: &str, symbol: &str, column: u32) -> Classification {
        let symbol_len = u32::try_from(symbol.chars().count()).unwrap_or(u32::MAX);
        let Some(occurrence) = slice_columns(neutral, column, column.saturating_add(symbol_len))
        else {
            return Classification::Unknown;
        };

        // The occurrence's own characters were blanked away: it lives
        // inside a string literal or comment.
        if occurrence != symbol {
            return Classification::Text;
        }

        let Some(after_offset) = byte_offset(neutral, column.saturating_add(symbol_len)) else {
            return Classification::Unknown;
        };
        let Some(after) = neutral.get(after_offset..) else {
            return Classification::Unknown;
        };

        if self.assign.is_match(after) || self.incdec.is_match(after) {
            return Classification::Write;
        }
        if self.self_append_pattern(symbol).is_match(neutral) {
            return Classification::Write;
        }
        return Classification::Read;
    }

    /// The `symbol = append(symbol, ...)` pattern, compiled on first use.
    ///
    /// # Panics
    ///
    /// Panics if the built pattern is invalid, which is impossible with an
    /// escaped symbol (compile-time invariant).
    fn self_append_pattern(&mut self, symbol: &str) -> &Regex {
        return self.self_append.entry(symbol.to_string()).or_insert_with(|| {
            let escaped = regex::escape(symbol);
            let pattern = format!(r"\b{escaped}\s*=\s*append\(\s*{escaped}\s*[,)]");
            return Regex::new(&pattern).expect("valid regex");
        });
    }
}

impl Classify for HeuristicClassifier {
    fn classify(&mut self, location: &Location) -> Classification {
        let range = &location.range;
        // Line-local only: a range spanning lines can't be reasoned about here.
        if range.start.line != range.end.line || range.end.column <= range.start.column {
            return Classification::Unknown;
        }

        let Some(line) = self.source.line(&location.path, range.start.line) else {
            return Classification::Unknown;
        };
        let Some(symbol) = slice_columns(&line, range.start.column, range.end.column) else {
            return Classification::Unknown;
        };
        // The file may have changed underneath the reference list; only
        // classify when the range still delimits an identifier.
        if !is_identifier(symbol) || !has_identifier_boundaries(&line, range.start.column, range.end.column)
        {
            return Classification::Unknown;
        }

        let symbol = symbol.to_string();
        let neutral = neutralize(&line);
        return self.classify_in_line(&neutral, &symbol, range.start.column);
    }

    fn reset(&mut self) {
        self.source.clear();
    }
}

/// Byte offset of a zero-based char column. `Some(len)` when the column
/// is one past the last character.
fn byte_offset(line: &str, column: u32) -> Option<usize> {
    let Ok(column) = usize::try_from(column) else {
        return None;
    };
    let mut count = 0_usize;
    for (idx, _) in line.char_indices() {
        if count == column {
            return Some(idx);
        }
        count += 1;
    }
    if count == column {
        return Some(line.len());
    }
    return None;
}

/// Whether the chars surrounding `[start, end)` terminate an identifier.
fn has_identifier_boundaries(line: &str, start: u32, end: u32) -> bool {
    let before = start
        .checked_sub(1)
        .and_then(|col| slice_columns(line, col, start))
        .and_then(|s| s.chars().next());
    if before.is_some_and(is_word_char) {
        return false;
    }
    let after = slice_columns(line, end, end.saturating_add(1)).and_then(|s| s.chars().next());
    return !after.is_some_and(is_word_char);
}

/// Whether `text` is a plausible identifier occurrence.
fn is_identifier(text: &str) -> bool {
    return !text.is_empty() && text.chars().all(is_word_char);
}

fn is_word_char(c: char) -> bool {
    return c.is_alphanumeric() || c == '_';
}

/// Blank string-literal interiors and trailing `//` comments with
/// spaces, preserving the char length so columns keep their meaning.
/// Quotes stay in place; `\"` escapes are honored inside interpreted
/// strings and rune literals, not inside raw back-quoted strings.
fn neutralize(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        let Some(quote) = in_string else {
            if c == '"' || c == '`' || c == '\'' {
                in_string = Some(c);
                out.push(c);
            } else if c == '/' && chars.peek() == Some(&'/') {
                out.push(' ');
                for _ in chars.by_ref() {
                    out.push(' ');
                }
            } else {
                out.push(c);
            }
            continue;
        };

        if escaped {
            escaped = false;
            out.push(' ');
        } else if c == '\\' && quote != '`' {
            escaped = true;
            out.push(' ');
        } else if c == quote {
            in_string = None;
            out.push(quote);
        } else {
            out.push(' ');
        }
    }

    return out;
}

/// Slice a line by zero-based char columns `[start, end)`.
fn slice_columns(line: &str, start: u32, end: u32) -> Option<&str> {
    let start = byte_offset(line, start)?;
    let end = byte_offset(line, end)?;
    if end < start {
        return None;
    }
    return line.get(start..end);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryLineSource;
    use crate::types::{Position, Range};

    /// A classifier over a single in-memory document.
    fn classifier(content: &str) -> HeuristicClassifier {
        let mut source = MemoryLineSource::new();
        source.insert("/m/main.go", content);
        return HeuristicClassifier::new(Box::new(source));
    }

    /// Location of `symbol` on the zero-based `line`, at its `nth`
    /// occurrence within that line of `content`.
    fn occurrence(content: &str, line: u32, symbol: &str, nth: usize) -> Location {
        let text = content.lines().nth(usize::try_from(line).unwrap()).unwrap();
        let mut from = 0_usize;
        let mut byte_start = 0_usize;
        for _ in 0..=nth {
            byte_start = from + text[from..].find(symbol).unwrap();
            from = byte_start + symbol.len();
        }
        let column = u32::try_from(text[..byte_start].chars().count()).unwrap();
        let len = u32::try_from(symbol.chars().count()).unwrap();
        return Location {
            path: "/m/main.go".into(),
            range: Range {
                end: Position { column: column + len, line },
                start: Position { column, line },
            },
        };
    }

    fn classify(content: &str, line: u32, symbol: &str, nth: usize) -> Classification {
        let mut c = classifier(content);
        return c.classify(&occurrence(content, line, symbol, nth));
    }

    #[test]
    fn plain_assignment_is_a_write() {
        assert_eq!(classify("x = x + 1\n", 0, "x", 0), Classification::Write);
    }

    #[test]
    fn right_hand_side_of_assignment_is_a_read() {
        assert_eq!(classify("x = x + 1\n", 0, "x", 1), Classification::Read);
    }

    #[test]
    fn comparison_is_a_read() {
        assert_eq!(classify("if x == 1 {\n", 0, "x", 0), Classification::Read);
        assert_eq!(classify("if x <= limit {\n", 0, "x", 0), Classification::Read);
        assert_eq!(classify("if x != 0 {\n", 0, "x", 0), Classification::Read);
    }

    #[test]
    fn short_declaration_is_a_write() {
        assert_eq!(classify("x := compute()\n", 0, "x", 0), Classification::Write);
    }

    #[test]
    fn compound_assignment_is_a_write() {
        assert_eq!(classify("x += 2\n", 0, "x", 0), Classification::Write);
        assert_eq!(classify("x >>= 1\n", 0, "x", 0), Classification::Write);
        assert_eq!(classify("x &^= mask\n", 0, "x", 0), Classification::Write);
    }

    #[test]
    fn increment_and_decrement_are_writes() {
        assert_eq!(classify("x++\n", 0, "x", 0), Classification::Write);
        assert_eq!(classify("x--\n", 0, "x", 0), Classification::Write);
        assert_eq!(classify("counts[k]++\n", 0, "counts", 0), Classification::Write);
    }

    #[test]
    fn indexed_assignment_is_a_write() {
        assert_eq!(classify("cells[i] = v\n", 0, "cells", 0), Classification::Write);
    }

    #[test]
    fn index_key_is_a_read() {
        assert_eq!(classify("cells[i] = v\n", 0, "i", 0), Classification::Read);
    }

    #[test]
    fn tuple_assignment_writes_every_target() {
        assert_eq!(classify("x, err := f()\n", 0, "x", 0), Classification::Write);
        assert_eq!(classify("x, err := f()\n", 0, "err", 0), Classification::Write);
    }

    #[test]
    fn self_append_writes_both_occurrences() {
        let line = "results = append(results, v)\n";
        assert_eq!(classify(line, 0, "results", 0), Classification::Write);
        assert_eq!(classify(line, 0, "results", 1), Classification::Write);
    }

    #[test]
    fn append_from_another_slice_reads_the_argument() {
        assert_eq!(classify("x = append(y, x)\n", 0, "x", 1), Classification::Read);
    }

    #[test]
    fn function_argument_is_a_read() {
        assert_eq!(classify("fmt.Println(x)\n", 0, "x", 0), Classification::Read);
    }

    #[test]
    fn occurrence_inside_string_is_text() {
        assert_eq!(classify("log(\"x is done\")\n", 0, "x", 0), Classification::Text);
    }

    #[test]
    fn occurrence_inside_comment_is_text() {
        assert_eq!(classify("return // x gets reset later\n", 0, "x", 0), Classification::Text);
    }

    #[test]
    fn assignment_operator_inside_string_does_not_mislead() {
        // The `=` lives in the literal; the trailing occurrence reads.
        assert_eq!(classify("print(\"x = \", x)\n", 0, "x", 1), Classification::Read);
    }

    #[test]
    fn comment_marker_inside_string_is_not_a_comment() {
        assert_eq!(classify("u := \"http://h\"; x = 1\n", 0, "x", 0), Classification::Write);
    }

    #[test]
    fn stale_range_classifies_unknown() {
        // Range no longer delimits an identifier boundary.
        assert_eq!(classify("xy = 1\n", 0, "x", 0), Classification::Unknown);
    }

    #[test]
    fn out_of_range_line_classifies_unknown() {
        let mut c = classifier("x = 1\n");
        let mut loc = occurrence("x = 1\n", 0, "x", 0);
        loc.range.start.line = 9;
        loc.range.end.line = 9;
        assert_eq!(c.classify(&loc), Classification::Unknown);
    }

    #[test]
    fn multi_line_range_classifies_unknown() {
        let mut c = classifier("x = 1\ny = 2\n");
        let mut loc = occurrence("x = 1\ny = 2\n", 0, "x", 0);
        loc.range.end.line = 1;
        assert_eq!(c.classify(&loc), Classification::Unknown);
    }

    #[test]
    fn neutralize_preserves_char_length() {
        let line = "s := \"a // b\" // trailing";
        assert_eq!(neutralize(line).chars().count(), line.chars().count());
    }

    #[test]
    fn neutralize_blanks_strings_and_comments() {
        assert_eq!(neutralize("f(\"ab\") // c"), "f(\"  \")     ");
        assert_eq!(neutralize("r := `a=b`"), "r := `   `");
        assert_eq!(neutralize("q := \"a\\\"b\""), "q := \"    \"");
    }
}
