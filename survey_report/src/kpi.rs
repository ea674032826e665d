use log::debug;
use serde::Serialize;

use crate::schema::{AGE, COURSE, CREATION_DATE};
use crate::table::SurveyTable;

/// Shown when a statistic cannot be computed.
pub const NOT_AVAILABLE: &str = "N/A";

/// A summary statistic shown above the tabs.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct KpiTile {
    pub label: String,
    pub value: String,
}

impl KpiTile {
    fn new(label: &str, value: Option<String>) -> KpiTile {
        KpiTile {
            label: label.to_string(),
            value: value.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        }
    }
}

/// Formats an integer with `,` separating the thousands.
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut res = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, c) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            res.push(',');
        }
        res.push(c);
    }
    res
}

fn mean_age(table: &SurveyTable) -> Option<String> {
    let mean = table.column(AGE)?.mean()?;
    Some(format!("{:.1} anos", mean))
}

fn distinct_courses(table: &SurveyTable) -> Option<String> {
    Some(table.column(COURSE)?.distinct_count().to_string())
}

fn period(table: &SurveyTable) -> Option<String> {
    let (lo, hi) = table.column(CREATION_DATE)?.date_range()?;
    Some(format!("{} - {}", lo.format("%m/%Y"), hi.format("%m/%Y")))
}

/// The four tiles of the dashboard: responses, mean age, courses and collection period.
pub fn kpi_tiles(table: &SurveyTable) -> Vec<KpiTile> {
    let tiles = vec![
        KpiTile::new("Total de Respostas", Some(thousands(table.num_rows()))),
        KpiTile::new("Idade Média", mean_age(table)),
        KpiTile::new("Cursos Diferentes", distinct_courses(table)),
        KpiTile::new("Período", period(table)),
    ];
    debug!("kpi_tiles: {:?}", tiles);
    tiles
}
