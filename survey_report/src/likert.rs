use log::debug;

use crate::table::{Cell, SurveyTable};

/// How many non-missing answers of a column are inspected by [likert_columns].
///
/// A column whose agreement keywords only show up after this many answers is not
/// detected.
pub const CLASSIFIER_SAMPLE_SIZE: usize = 100;

const AGREEMENT_KEYWORDS: [&str; 2] = ["CONCORDO", "DISCORDO"];

/// The position of an answer on the 5-point agreement scale.
///
/// Answers are written as `"<n> - <label>"`, for example `"4 - Concordo Parcialmente"`.
/// Returns None for anything else, including missing cells.
pub fn extract_likert_value(cell: &Cell) -> Option<u8> {
    if cell.is_missing() {
        return None;
    }
    let s = cell.to_string();
    let s = s.trim();
    (1..=5u8).find(|n| s.starts_with(&format!("{} -", n)))
}

/// The columns that look like agreement-scale questions.
///
/// Only text columns are considered. A column is selected if one of its first
/// [CLASSIFIER_SAMPLE_SIZE] answers mentions agreement or disagreement.
pub fn likert_columns(table: &SurveyTable) -> Vec<String> {
    let mut res: Vec<String> = Vec::new();
    for col in table.columns().iter().filter(|c| c.is_text()) {
        let found = col
            .non_missing()
            .take(CLASSIFIER_SAMPLE_SIZE)
            .map(|c| c.to_string().to_uppercase())
            .any(|s| AGREEMENT_KEYWORDS.iter().any(|k| s.contains(k)));
        if found {
            debug!("likert_columns: detected {:?}", col.name);
            res.push(col.name.clone());
        }
    }
    res
}
