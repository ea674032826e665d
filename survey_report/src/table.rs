// ********* Input data structures ***********

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Display;

/// The content of one cell of the survey, after loading.
///
/// The loader is permissive: anything it cannot make sense of becomes `Missing`.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub enum Cell {
    Missing,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Cell::Text(_))
    }

    /// The numeric value of the cell, if any. Text holding a number (" 21 ") counts.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(x) if x.is_finite() => Some(*x),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|x| x.is_finite()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Cell::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// The string used to group identical answers together. None for missing cells.
    pub fn key(&self) -> Option<String> {
        if self.is_missing() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(x) => write!(f, "{}", format_number(*x)),
            Cell::Bool(true) => write!(f, "True"),
            Cell::Bool(false) => write!(f, "False"),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Integral values are printed without a fractional part: the spreadsheets store
/// every number as a float, including ages and years.
pub fn format_number(x: f64) -> String {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{:.0}", x)
    } else {
        format!("{}", x)
    }
}

/// Counts of the distinct answers of a column.
///
/// Missing cells are dropped. The entries are ordered by decreasing count; answers
/// with the same count stay in the order in which they first appear in the column.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize)]
pub struct FrequencyTable {
    entries: Vec<(String, u64)>,
}

impl FrequencyTable {
    pub fn from_keys<I: IntoIterator<Item = String>>(keys: I) -> FrequencyTable {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut entries: Vec<(String, u64)> = Vec::new();
        for k in keys {
            if let Some(pos) = positions.get(&k) {
                entries[*pos].1 += 1;
            } else {
                positions.insert(k.clone(), entries.len());
                entries.push((k, 1));
            }
        }
        // Stable sort: ties keep their order of appearance.
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        FrequencyTable { entries }
    }

    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| *c).sum()
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, c)| *c)
    }

    /// The `n` most frequent answers.
    pub fn head(&self, n: usize) -> FrequencyTable {
        FrequencyTable {
            entries: self.entries.iter().take(n).cloned().collect(),
        }
    }

    /// Reorders the entries by answer instead of by count. If every answer is a number,
    /// the numeric order is used, otherwise the lexicographic one.
    pub fn sorted_by_value(&self) -> FrequencyTable {
        let mut entries = self.entries.clone();
        let all_numeric = entries.iter().all(|(k, _)| k.trim().parse::<f64>().is_ok());
        if all_numeric {
            entries.sort_by(|(a, _), (b, _)| {
                let x: f64 = a.trim().parse().unwrap_or(f64::NAN);
                let y: f64 = b.trim().parse().unwrap_or(f64::NAN);
                x.total_cmp(&y)
            });
        } else {
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        }
        FrequencyTable { entries }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: &str, cells: Vec<Cell>) -> Column {
        Column {
            name: name.to_string(),
            cells,
        }
    }

    /// A column holds free text as soon as one of its cells is text.
    pub fn is_text(&self) -> bool {
        self.cells.iter().any(|c| c.is_text())
    }

    pub fn non_missing(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|c| !c.is_missing())
    }

    pub fn value_counts(&self) -> FrequencyTable {
        FrequencyTable::from_keys(self.cells.iter().filter_map(|c| c.key()))
    }

    /// Number of distinct non-missing answers.
    pub fn distinct_count(&self) -> usize {
        self.value_counts().len()
    }

    /// Mean over the numeric cells. None if there are none.
    pub fn mean(&self) -> Option<f64> {
        let values: Vec<f64> = self.cells.iter().filter_map(|c| c.as_number()).collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    /// Earliest and latest dates of the column.
    pub fn date_range(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut dates = self.cells.iter().filter_map(|c| c.as_date());
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Reinterprets every cell as a date. Returns how many non-missing cells could not
    /// be understood (they are now missing).
    pub fn coerce_dates(&mut self) -> usize {
        let mut failures = 0;
        for cell in self.cells.iter_mut() {
            let coerced = match &*cell {
                Cell::Missing => Cell::Missing,
                Cell::Date(d) => Cell::Date(*d),
                Cell::Number(x) => excel_serial_to_datetime(*x)
                    .map(Cell::Date)
                    .unwrap_or(Cell::Missing),
                Cell::Text(s) => parse_date(s).map(Cell::Date).unwrap_or(Cell::Missing),
                Cell::Bool(_) => Cell::Missing,
            };
            if coerced.is_missing() && !cell.is_missing() {
                failures += 1;
            }
            *cell = coerced;
        }
        failures
    }
}

/// The survey responses, one row per respondent.
///
/// The columns are stored in the order of the spreadsheet and all have the same length.
#[derive(PartialEq, Debug, Clone, Default, Serialize)]
pub struct SurveyTable {
    columns: Vec<Column>,
    num_rows: usize,
}

impl SurveyTable {
    /// Builds a table from columns. Shorter columns are padded with missing cells.
    pub fn new(columns: Vec<Column>) -> SurveyTable {
        let num_rows = columns.iter().map(|c| c.cells.len()).max().unwrap_or(0);
        let columns = columns
            .into_iter()
            .map(|mut c| {
                c.cells.resize(num_rows, Cell::Missing);
                c
            })
            .collect();
        SurveyTable { columns, num_rows }
    }

    /// Builds a table from a header and row-major data, as read from a worksheet.
    ///
    /// Empty header cells are named `Unnamed: <idx>`, repeated names get a `.<n>`
    /// suffix so that every column can be found by its exact name.
    pub fn from_rows(header: &[Option<String>], rows: Vec<Vec<Cell>>) -> SurveyTable {
        let width = rows
            .iter()
            .map(|r| r.len())
            .max()
            .unwrap_or(0)
            .max(header.len());
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut names: Vec<String> = Vec::with_capacity(width);
        for idx in 0..width {
            let base = match header.get(idx) {
                Some(Some(s)) if !s.trim().is_empty() => s.clone(),
                _ => format!("Unnamed: {}", idx),
            };
            let name = match seen.get(&base).cloned() {
                None => base.clone(),
                Some(n) => format!("{}.{}", base, n),
            };
            *seen.entry(base).or_insert(0) += 1;
            names.push(name);
        }
        debug!("from_rows: {} columns, {} rows", names.len(), rows.len());

        let mut cells: Vec<Vec<Cell>> = vec![Vec::with_capacity(rows.len()); width];
        for row in rows {
            let mut it = row.into_iter();
            for col in cells.iter_mut() {
                col.push(it.next().unwrap_or(Cell::Missing));
            }
        }
        let columns = names
            .into_iter()
            .zip(cells)
            .map(|(name, cells)| Column { name, cells })
            .collect();
        SurveyTable::new(columns)
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Looks up a column by its exact name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// The names of the columns containing all the given fragments, in table order.
    pub fn columns_containing(&self, fragments: &[&str]) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| fragments.iter().all(|f| c.name.contains(f)))
            .map(|c| c.name.as_str())
            .collect()
    }

    /// The cells of one respondent, in column order.
    pub fn row(&self, idx: usize) -> Option<Vec<&Cell>> {
        if idx >= self.num_rows {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.cells[idx]).collect())
    }

    /// Converts the named column to dates, if it exists. Returns the number of entries
    /// that could not be parsed.
    pub fn coerce_date_column(&mut self, name: &str) -> Option<usize> {
        let col = self.columns.iter_mut().find(|c| c.name == name)?;
        let failures = col.coerce_dates();
        debug!(
            "coerce_date_column: {:?}: {} unparseable entries",
            name, failures
        );
        Some(failures)
    }
}

// ********* Dates **********

const DATE_TIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Parses the date formats found in survey exports. None if nothing matches.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(d.naive_local());
    }
    for fmt in DATE_TIME_FORMATS.iter() {
        if let Ok(d) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATE_FORMATS.iter() {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    // Month and year only: "03/2022".
    if let Ok(d) = NaiveDate::parse_from_str(&format!("01/{}", s), "%d/%m/%Y") {
        return Some(d.and_time(NaiveTime::MIN));
    }
    None
}

/// Converts an Excel serial day number (1900 date system) to a date.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
    // Excel believes 1900 was a leap year.
    let days = if serial >= 60.0 { serial } else { serial + 1.0 };
    let ms = (days * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(ms))
}
