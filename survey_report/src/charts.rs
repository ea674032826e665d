use log::debug;
use serde::{Serialize, Serializer};

use crate::likert::extract_likert_value;
use crate::schema::after_last_question_mark;
use crate::table::{Column, FrequencyTable, SurveyTable};

// ********* Colors **********

/// An RGB color, serialized as `#RRGGBB`.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b }
    }

    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Linear interpolation towards `other`. `t` is clamped to [0, 1].
    pub fn lerp(&self, other: &Color, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

/// The institutional colors.
pub mod palette {
    use super::Color;

    pub const BLUE: Color = Color::rgb(0x00, 0x33, 0x66);
    pub const DARK_BLUE: Color = Color::rgb(0x00, 0x1A, 0x33);
    pub const LIGHT_BLUE: Color = Color::rgb(0x4A, 0x90, 0xE2);
    pub const GREEN: Color = Color::rgb(0x28, 0xA7, 0x45);
    pub const YELLOW: Color = Color::rgb(0xFF, 0xC1, 0x07);
    pub const ORANGE: Color = Color::rgb(0xFD, 0x7E, 0x14);
    pub const RED: Color = Color::rgb(0xDC, 0x35, 0x45);
    pub const PURPLE: Color = Color::rgb(0x6B, 0x5B, 0x95);
    pub const GRAY: Color = Color::rgb(0x6C, 0x75, 0x7D);
}

/// A continuous color scale, used to shade bars by their count.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct Gradient {
    pub low: Color,
    pub high: Color,
}

impl Gradient {
    pub const BLUE: Gradient = Gradient {
        low: palette::BLUE,
        high: palette::LIGHT_BLUE,
    };
    pub const GREEN: Gradient = Gradient {
        low: palette::BLUE,
        high: palette::GREEN,
    };
    pub const WARM: Gradient = Gradient {
        low: palette::RED,
        high: palette::ORANGE,
    };

    fn shade(&self, values: &[u64]) -> Vec<Color> {
        let lo = values.iter().min().cloned().unwrap_or(0);
        let hi = values.iter().max().cloned().unwrap_or(0);
        values
            .iter()
            .map(|v| {
                let t = if hi == lo {
                    1.0
                } else {
                    (v - lo) as f64 / (hi - lo) as f64
                };
                self.low.lerp(&self.high, t)
            })
            .collect()
    }
}

// ********* Chart specifications **********

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: u64,
    pub color: Color,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct BarChart {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub orientation: Orientation,
    pub bars: Vec<Bar>,
    /// Print the count on each bar.
    pub show_values: bool,
    pub height: u32,
}

impl BarChart {
    pub fn total(&self) -> u64 {
        self.bars.iter().map(|b| b.value).sum()
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: u64,
    pub color: Color,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
    pub height: u32,
}

/// One layer of a stacked bar chart. `values` is aligned with the categories.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct Series {
    pub name: String,
    pub color: Color,
    pub values: Vec<u64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct StackedBarChart {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    pub height: u32,
}

impl StackedBarChart {
    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }
}

/// A rendering instruction. Built from the table on every render and never stored.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartSpec {
    Bar(BarChart),
    Pie(PieChart),
    StackedBar(StackedBarChart),
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Bar(c) => &c.title,
            ChartSpec::Pie(c) => &c.title,
            ChartSpec::StackedBar(c) => &c.title,
        }
    }
}

/// Titles of a chart.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ChartText {
    pub title: String,
    pub x_title: String,
    pub y_title: String,
}

impl ChartText {
    pub fn new(title: &str, x_title: &str, y_title: &str) -> ChartText {
        ChartText {
            title: title.to_string(),
            x_title: x_title.to_string(),
            y_title: y_title.to_string(),
        }
    }
}

// ********* Likert **********

pub const LIKERT_LABELS: [&str; 5] = [
    "1 - Discordo Totalmente",
    "2 - Discordo Parcialmente",
    "3 - Neutro",
    "4 - Concordo Parcialmente",
    "5 - Concordo Totalmente",
];

pub const LIKERT_COLORS: [Color; 5] = [
    palette::RED,
    palette::ORANGE,
    palette::YELLOW,
    palette::LIGHT_BLUE,
    palette::GREEN,
];

/// Bar chart of the answers of an agreement-scale question.
///
/// Answers without a scale prefix are ignored. There is one bar per scale value that
/// was given at least once, in increasing order. None if the column does not exist.
pub fn likert_chart(table: &SurveyTable, column: &str, title: &str) -> Option<BarChart> {
    let col = table.column(column)?;
    let mut counts = [0u64; 5];
    for v in col.cells.iter().filter_map(extract_likert_value) {
        counts[(v - 1) as usize] += 1;
    }
    debug!("likert_chart: {:?}: {:?}", column, counts);
    let bars = counts
        .iter()
        .enumerate()
        .filter(|(_, c)| **c > 0)
        .map(|(idx, c)| Bar {
            label: LIKERT_LABELS[idx].to_string(),
            value: *c,
            color: LIKERT_COLORS[idx],
        })
        .collect();
    Some(BarChart {
        title: title.to_string(),
        x_title: "Avaliação".to_string(),
        y_title: "Quantidade de Respostas".to_string(),
        orientation: Orientation::Vertical,
        bars,
        show_values: true,
        height: 400,
    })
}

// ********* Infrastructure **********

/// The answers of the quality questions.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum QualityTier {
    Excellent,
    Good,
    Fair,
    Poor,
    Terrible,
}

impl QualityTier {
    /// In matching order: the first keyword found in an answer wins.
    pub const ALL: [QualityTier; 5] = [
        QualityTier::Excellent,
        QualityTier::Good,
        QualityTier::Fair,
        QualityTier::Poor,
        QualityTier::Terrible,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            QualityTier::Excellent => "Excelente",
            QualityTier::Good => "Boa",
            QualityTier::Fair => "Razoável",
            QualityTier::Poor => "Ruim",
            QualityTier::Terrible => "Péssima",
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            QualityTier::Excellent => "EXCELENTE",
            QualityTier::Good => "BOA",
            QualityTier::Fair => "RAZOÁVEL",
            QualityTier::Poor => "RUIM",
            QualityTier::Terrible => "PÉSSIMA",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            QualityTier::Excellent => palette::GREEN,
            QualityTier::Good => palette::LIGHT_BLUE,
            QualityTier::Fair => palette::YELLOW,
            QualityTier::Poor => palette::ORANGE,
            QualityTier::Terrible => palette::RED,
        }
    }

    /// Case-insensitive substring match against the tier keywords.
    pub fn classify(answer: &str) -> Option<QualityTier> {
        let upper = answer.to_uppercase();
        QualityTier::ALL
            .iter()
            .find(|t| upper.contains(t.keyword()))
            .cloned()
    }
}

const ITEM_LABEL_MAX_CHARS: usize = 30;

/// The label of a question on the x axis: the end of the question, shortened.
pub fn item_label(column: &str) -> String {
    after_last_question_mark(column)
        .chars()
        .take(ITEM_LABEL_MAX_CHARS)
        .collect()
}

/// Stacked bar chart of the quality ratings given to each of the columns.
///
/// Returns None if no answer of any column mentions a quality tier.
pub fn infrastructure_chart(table: &SurveyTable, columns: &[&str]) -> Option<StackedBarChart> {
    // (item, tier, count), in the order they are found.
    let mut found: Vec<(String, QualityTier, u64)> = Vec::new();
    for cname in columns {
        let col = match table.column(cname) {
            Some(c) => c,
            None => continue,
        };
        let item = item_label(cname);
        for (answer, count) in col.value_counts().entries() {
            if let Some(tier) = QualityTier::classify(answer) {
                found.push((item.clone(), tier, *count));
            }
        }
    }
    if found.is_empty() {
        debug!("infrastructure_chart: no rating found in {:?}", columns);
        return None;
    }

    let mut categories: Vec<String> = Vec::new();
    for (item, _, _) in found.iter() {
        if !categories.contains(item) {
            categories.push(item.clone());
        }
    }
    let series: Vec<Series> = QualityTier::ALL
        .iter()
        .filter(|t| found.iter().any(|(_, t2, _)| t2 == *t))
        .map(|t| Series {
            name: t.label().to_string(),
            color: t.color(),
            values: categories
                .iter()
                .map(|cat| {
                    found
                        .iter()
                        .filter(|(item, t2, _)| item == cat && t2 == t)
                        .map(|(_, _, c)| *c)
                        .sum()
                })
                .collect(),
        })
        .collect();

    Some(StackedBarChart {
        title: "Avaliação da Infraestrutura".to_string(),
        x_title: "Item".to_string(),
        y_title: "Quantidade".to_string(),
        categories,
        series,
        height: 500,
    })
}

// ********* Frequency charts **********

fn shaded_bars(counts: &FrequencyTable, gradient: &Gradient) -> Vec<Bar> {
    let values: Vec<u64> = counts.entries().iter().map(|(_, c)| *c).collect();
    counts
        .entries()
        .iter()
        .zip(gradient.shade(&values))
        .map(|((label, value), color)| Bar {
            label: label.clone(),
            value: *value,
            color,
        })
        .collect()
}

/// Horizontal bar chart of the `n` most frequent answers of a column.
pub fn top_counts_chart(
    column: &Column,
    n: usize,
    text: ChartText,
    gradient: &Gradient,
    height: u32,
) -> BarChart {
    let counts = column.value_counts().head(n);
    BarChart {
        title: text.title,
        x_title: text.x_title,
        y_title: text.y_title,
        orientation: Orientation::Horizontal,
        bars: shaded_bars(&counts, gradient),
        show_values: false,
        height,
    }
}

/// Vertical bar chart of all the answers of a column, ordered by answer.
pub fn distribution_chart(
    column: &Column,
    text: ChartText,
    gradient: &Gradient,
    height: u32,
) -> BarChart {
    let counts = column.value_counts().sorted_by_value();
    BarChart {
        title: text.title,
        x_title: text.x_title,
        y_title: text.y_title,
        orientation: Orientation::Vertical,
        bars: shaded_bars(&counts, gradient),
        show_values: false,
        height,
    }
}

/// Pie chart of the answers of a column. The colors are reused in turn.
pub fn pie_chart(column: &Column, title: &str, colors: &[Color], height: u32) -> PieChart {
    let slices = column
        .value_counts()
        .entries()
        .iter()
        .enumerate()
        .map(|(idx, (label, value))| PieSlice {
            label: label.clone(),
            value: *value,
            color: if colors.is_empty() {
                palette::GRAY
            } else {
                colors[idx % colors.len()]
            },
        })
        .collect();
    PieChart {
        title: title.to_string(),
        slices,
        height,
    }
}
