//! Review-sheet grading rules.
//!
//! Pure table grading: the caller decodes the uploaded workbook into
//! [`SheetRow`]s, and this module scores them against an [`AnswerKey`].
//! Cell comparison is whitespace- and case-insensitive, and leading zeros
//! are ignored when both sides still have digits left.

use std::collections::HashMap;

/// One decoded sheet row: the row label (the question identifier in the
/// first column) plus the remaining cells in key column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub label: String,
    pub cells: Vec<String>,
}

impl SheetRow {
    #[must_use]
    pub fn new(label: impl Into<String>, cells: &[&str]) -> Self {
        Self {
            label: label.into(),
            cells: cells.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}

/// Expected answers, keyed by normalized row label.
#[derive(Debug, Clone)]
pub struct AnswerKey {
    /// Column headings after the label column, in cell order.
    pub columns: Vec<String>,
    rows: HashMap<String, Vec<String>>,
}

impl AnswerKey {
    #[must_use]
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            rows: HashMap::new(),
        }
    }

    pub fn insert_row(&mut self, label: &str, expected: &[&str]) {
        self.rows.insert(
            normalize(label),
            expected.iter().map(|e| (*e).to_string()).collect(),
        );
    }

    fn expected(&self, label: &str) -> Option<&[String]> {
        self.rows.get(&normalize(label)).map(Vec::as_slice)
    }

    /// Total gradable cells in the key.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }
}

/// Grading result: a 0..=100 score plus per-mistake feedback lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeOutcome {
    pub score: u8,
    pub feedback: String,
}

/// Score decoded sheet rows against the key.
///
/// Every key cell counts toward the denominator, so missing rows and
/// missing cells cost the same as wrong answers. Rows the key does not
/// know are ignored (headers, notes, blank padding).
#[must_use]
pub fn grade_review_sheet(rows: &[SheetRow], key: &AnswerKey) -> GradeOutcome {
    let total = key.cell_count();
    if total == 0 {
        return GradeOutcome {
            score: 0,
            feedback: "Answer key is empty.".to_string(),
        };
    }

    let mut correct = 0usize;
    let mut mistakes: Vec<String> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for row in rows {
        let Some(expected) = key.expected(&row.label) else {
            continue;
        };
        seen.push(normalize(&row.label));

        for (i, want) in expected.iter().enumerate() {
            let column = key.columns.get(i).map_or("?", String::as_str);
            match row.cells.get(i) {
                Some(got) if cells_match(got, want) => correct += 1,
                Some(got) if got.trim().is_empty() => {
                    mistakes.push(format!("Row {}, {column}: left blank", row.label));
                }
                Some(got) => {
                    mistakes.push(format!(
                        "Row {}, {column}: expected {want}, got {got}",
                        row.label
                    ));
                }
                None => {
                    mistakes.push(format!("Row {}, {column}: left blank", row.label));
                }
            }
        }
    }

    for (label, expected) in &key.rows {
        if !seen.contains(label) {
            mistakes.push(format!(
                "Row {}: missing ({} answers)",
                label.to_uppercase(),
                expected.len()
            ));
        }
    }
    mistakes.sort();

    let score = ((correct as f64 / total as f64) * 100.0).round() as u8;
    let feedback = if mistakes.is_empty() {
        "All answers correct.".to_string()
    } else {
        mistakes.join("\n")
    };

    GradeOutcome { score, feedback }
}

fn cells_match(got: &str, want: &str) -> bool {
    let got = normalize(got);
    let want = normalize(want);
    if got == want {
        return true;
    }
    // 011001 and 11001 are the same answer.
    let got = got.trim_start_matches('0');
    let want = want.trim_start_matches('0');
    !got.is_empty() && got == want
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// The built-in number-systems review sheet key: rows A through E, each
/// converted across all five representations.
#[must_use]
pub fn number_systems_key() -> AnswerKey {
    let mut key = AnswerKey::new(&["Decimal", "Binary", "Octal", "Hexadecimal", "BCD", "Gray"]);
    key.insert_row("A", &["25", "11001", "31", "19", "0010 0101", "10101"]);
    key.insert_row("B", &["13", "1101", "15", "D", "0001 0011", "1001"]);
    key.insert_row("C", &["25", "11001", "31", "19", "0010 0101", "10101"]);
    key.insert_row("D", &["31", "11111", "37", "1F", "0011 0001", "10000"]);
    key.insert_row("E", &["64", "1000000", "100", "40", "0110 0100", "1100000"]);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_sheet_scores_100() {
        let key = number_systems_key();
        let rows = vec![
            SheetRow::new("A", &["25", "11001", "31", "19", "0010 0101", "10101"]),
            SheetRow::new("B", &["13", "1101", "15", "d", "00010011", "1001"]),
            SheetRow::new("C", &["25", "011001", "31", "19", "0010 0101", "10101"]),
            SheetRow::new("D", &["31", "11111", "37", "1f", "0011 0001", "10000"]),
            SheetRow::new("E", &["64", "1000000", "100", "40", "0110 0100", "1100000"]),
        ];

        let outcome = grade_review_sheet(&rows, &key);
        assert_eq!(outcome.score, 100);
        assert_eq!(outcome.feedback, "All answers correct.");
    }

    #[test]
    fn wrong_and_blank_cells_lower_the_score() {
        let mut key = AnswerKey::new(&["Decimal", "Binary"]);
        key.insert_row("A", &["25", "11001"]);
        key.insert_row("B", &["13", "1101"]);

        let rows = vec![
            SheetRow::new("A", &["25", "11000"]),
            SheetRow::new("B", &["13", ""]),
        ];

        let outcome = grade_review_sheet(&rows, &key);
        assert_eq!(outcome.score, 50);
        assert!(outcome.feedback.contains("Row A, Binary: expected 11001"));
        assert!(outcome.feedback.contains("Row B, Binary: left blank"));
    }

    #[test]
    fn missing_rows_count_against_the_denominator() {
        let mut key = AnswerKey::new(&["Decimal"]);
        key.insert_row("A", &["25"]);
        key.insert_row("B", &["13"]);

        let rows = vec![SheetRow::new("A", &["25"])];

        let outcome = grade_review_sheet(&rows, &key);
        assert_eq!(outcome.score, 50);
        assert!(outcome.feedback.contains("Row B: missing"));
    }

    #[test]
    fn unknown_rows_are_ignored() {
        let mut key = AnswerKey::new(&["Decimal"]);
        key.insert_row("A", &["25"]);

        let rows = vec![
            SheetRow::new("Question", &["Decimal"]), // header row
            SheetRow::new("A", &["25"]),
            SheetRow::new("notes", &["remember to study"]),
        ];

        let outcome = grade_review_sheet(&rows, &key);
        assert_eq!(outcome.score, 100);
    }

    #[test]
    fn leading_zeros_do_not_fail_a_cell() {
        assert!(cells_match("011001", "11001"));
        assert!(cells_match("0010 0101", "00100101"));
        assert!(!cells_match("0", "1"));
        assert!(!cells_match("", "1"));
    }
}
