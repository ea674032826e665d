// Drawing of the chart specifications as SVG, with plotters.

use log::debug;

use plotters::coord::ranged1d::SegmentValue;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::Color as _;

use snafu::prelude::*;

use survey_report::{BarChart, ChartSpec, Color, Orientation, PieChart, StackedBarChart};

use crate::dash::{DashResult, DrawingChartSnafu};

/// Width of the SVG coordinate system. The charts are scaled to the width of their panel.
const CHART_WIDTH: u32 = 640;
const FONT: &str = "sans-serif";

type DrawResult = Result<(), DrawingAreaErrorKind<std::io::Error>>;

/// Draws one chart as a standalone `<svg>` element.
pub fn render_chart(chart: &ChartSpec) -> DashResult<String> {
    let height = match chart {
        ChartSpec::Bar(c) => c.height,
        ChartSpec::Pie(c) => c.height,
        ChartSpec::StackedBar(c) => c.height,
    };
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, (CHART_WIDTH, height)).into_drawing_area();
        let res = root.fill(&WHITE).and_then(|_| match chart {
            ChartSpec::Bar(c) => match c.orientation {
                Orientation::Vertical => draw_vertical_bars(&root, c),
                Orientation::Horizontal => draw_horizontal_bars(&root, c),
            },
            ChartSpec::Pie(c) => draw_pie(&root, c),
            ChartSpec::StackedBar(c) => draw_stacked_bars(&root, c),
        });
        res.and_then(|_| root.present())
            .context(DrawingChartSnafu { title: chart.title() })?;
    }
    debug!("render_chart: {:?}: {} bytes", chart.title(), buf.len());
    Ok(buf)
}

fn rgb(c: &Color) -> RGBColor {
    RGBColor(c.r, c.g, c.b)
}

/// The upper bound of the value axis, with room for the labels above the bars.
fn value_range(max: u64) -> u64 {
    max + max / 10 + 1
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut res: String = s.chars().take(max_chars - 1).collect();
        res.push('…');
        res
    }
}

/// The label of the category under a segment of a categorical axis.
fn category_label(labels: &[String], v: &SegmentValue<i32>) -> String {
    match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
            labels.get(*i as usize).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    }
}

fn draw_empty(root: &DrawingArea<SVGBackend, Shift>, title: &str) -> DrawResult {
    let (w, h) = root.dim_in_pixel();
    root.draw(&Text::new(
        title.to_string(),
        (12, 12),
        (FONT, 18).into_font().color(&BLACK),
    ))?;
    root.draw(&Text::new(
        "Sem dados para exibir",
        (w as i32 / 2, h as i32 / 2),
        TextStyle::from((FONT, 14).into_font())
            .color(&RGBColor(0x6C, 0x75, 0x7D))
            .pos(Pos::new(HPos::Center, VPos::Center)),
    ))
}

fn draw_vertical_bars(root: &DrawingArea<SVGBackend, Shift>, chart: &BarChart) -> DrawResult {
    if chart.bars.is_empty() {
        return draw_empty(root, &chart.title);
    }
    let labels: Vec<String> = chart.bars.iter().map(|b| truncate(&b.label, 14)).collect();
    let max = chart.bars.iter().map(|b| b.value).max().unwrap_or(0);
    let n = chart.bars.len() as i32;

    let mut cc = ChartBuilder::on(root)
        .caption(&chart.title, (FONT, 18))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), 0u64..value_range(max))?;
    let fmt = |v: &SegmentValue<i32>| category_label(&labels, v);
    cc.configure_mesh()
        .disable_x_mesh()
        .x_labels(chart.bars.len())
        .x_label_formatter(&fmt)
        .x_desc(&chart.x_title)
        .y_desc(&chart.y_title)
        .draw()?;

    cc.draw_series(chart.bars.iter().enumerate().map(|(i, b)| {
        let i = i as i32;
        let mut bar = Rectangle::new(
            [(SegmentValue::Exact(i), 0), (SegmentValue::Exact(i + 1), b.value)],
            rgb(&b.color).filled(),
        );
        bar.set_margin(0, 0, 6, 6);
        bar
    }))?;
    if chart.show_values {
        let style = TextStyle::from((FONT, 12).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
        cc.draw_series(chart.bars.iter().enumerate().map(|(i, b)| {
            Text::new(
                b.value.to_string(),
                (SegmentValue::CenterOf(i as i32), b.value),
                style.clone(),
            )
        }))?;
    }
    Ok(())
}

fn draw_horizontal_bars(root: &DrawingArea<SVGBackend, Shift>, chart: &BarChart) -> DrawResult {
    if chart.bars.is_empty() {
        return draw_empty(root, &chart.title);
    }
    let labels: Vec<String> = chart.bars.iter().map(|b| truncate(&b.label, 34)).collect();
    let max = chart.bars.iter().map(|b| b.value).max().unwrap_or(0);
    let n = chart.bars.len() as i32;

    let mut cc = ChartBuilder::on(root)
        .caption(&chart.title, (FONT, 18))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(220)
        .build_cartesian_2d(0u64..value_range(max), (0..n).into_segmented())?;
    let fmt = |v: &SegmentValue<i32>| category_label(&labels, v);
    cc.configure_mesh()
        .disable_y_mesh()
        .y_labels(chart.bars.len())
        .y_label_formatter(&fmt)
        .x_desc(&chart.x_title)
        .y_desc(&chart.y_title)
        .draw()?;

    cc.draw_series(chart.bars.iter().enumerate().map(|(i, b)| {
        let i = i as i32;
        let mut bar = Rectangle::new(
            [(0, SegmentValue::Exact(i)), (b.value, SegmentValue::Exact(i + 1))],
            rgb(&b.color).filled(),
        );
        bar.set_margin(3, 3, 0, 0);
        bar
    }))?;
    if chart.show_values {
        let style = TextStyle::from((FONT, 12).into_font()).pos(Pos::new(HPos::Left, VPos::Center));
        cc.draw_series(chart.bars.iter().enumerate().map(|(i, b)| {
            Text::new(
                format!(" {}", b.value),
                (b.value, SegmentValue::CenterOf(i as i32)),
                style.clone(),
            )
        }))?;
    }
    Ok(())
}

fn draw_stacked_bars(
    root: &DrawingArea<SVGBackend, Shift>,
    chart: &StackedBarChart,
) -> DrawResult {
    if chart.categories.is_empty() || chart.series.is_empty() {
        return draw_empty(root, &chart.title);
    }
    let labels: Vec<String> = chart.categories.iter().map(|c| truncate(c, 16)).collect();
    let n = chart.categories.len();
    let totals: Vec<u64> = (0..n)
        .map(|idx| {
            chart
                .series
                .iter()
                .map(|s| s.values.get(idx).cloned().unwrap_or(0))
                .sum()
        })
        .collect();
    let max = totals.iter().cloned().max().unwrap_or(0);

    let mut cc = ChartBuilder::on(root)
        .caption(&chart.title, (FONT, 18))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n as i32).into_segmented(), 0u64..value_range(max))?;
    let fmt = |v: &SegmentValue<i32>| category_label(&labels, v);
    cc.configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&fmt)
        .x_desc(&chart.x_title)
        .y_desc(&chart.y_title)
        .draw()?;

    // Each series sits on top of the ones before it.
    let mut base = vec![0u64; n];
    for s in chart.series.iter() {
        let color = rgb(&s.color);
        let mut bars = Vec::new();
        for (idx, b) in base.iter_mut().enumerate() {
            let value = s.values.get(idx).cloned().unwrap_or(0);
            if value == 0 {
                continue;
            }
            let i = idx as i32;
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), *b), (SegmentValue::Exact(i + 1), *b + value)],
                color.filled(),
            );
            bar.set_margin(0, 0, 8, 8);
            bars.push(bar);
            *b += value;
        }
        cc.draw_series(bars)?
            .label(s.name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }
    cc.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}

fn draw_pie(root: &DrawingArea<SVGBackend, Shift>, chart: &PieChart) -> DrawResult {
    let total: u64 = chart.slices.iter().map(|s| s.value).sum();
    if total == 0 {
        return draw_empty(root, &chart.title);
    }
    let area = root.titled(&chart.title, (FONT, 18))?;
    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = (w.min(h) as f64 / 2.0 - 40.0).max(20.0);

    let sizes: Vec<f64> = chart.slices.iter().map(|s| s.value as f64).collect();
    let colors: Vec<RGBColor> = chart.slices.iter().map(|s| rgb(&s.color)).collect();
    let labels: Vec<String> = chart.slices.iter().map(|s| truncate(&s.label, 28)).collect();
    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style((FONT, 12).into_font().color(&BLACK));
    pie.percentages((FONT, 12).into_font().color(&WHITE));
    area.draw(&pie)
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_report::{palette, Bar, PieSlice, Series};

    fn bar(label: &str, value: u64, color: Color) -> Bar {
        Bar {
            label: label.to_string(),
            value,
            color,
        }
    }

    fn bar_chart(orientation: Orientation, bars: Vec<Bar>) -> BarChart {
        BarChart {
            title: "Cursos com Mais Respostas".to_string(),
            x_title: "Curso".to_string(),
            y_title: "Quantidade".to_string(),
            orientation,
            bars,
            show_values: true,
            height: 400,
        }
    }

    #[test]
    fn bars_are_drawn() {
        let chart = bar_chart(
            Orientation::Vertical,
            vec![
                bar("Engenharia", 3, palette::RED),
                bar("Física", 1, palette::GREEN),
            ],
        );
        let svg = render_chart(&ChartSpec::Bar(chart.clone())).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.to_uppercase().contains("#DC3545"));
        assert!(svg.to_uppercase().contains("#28A745"));
        assert!(svg.contains("Engenharia"));
        assert!(svg.contains("Cursos com Mais Respostas"));

        let horizontal = BarChart {
            orientation: Orientation::Horizontal,
            ..chart
        };
        let svg = render_chart(&ChartSpec::Bar(horizontal)).unwrap();
        assert!(svg.contains("Física"));
        assert!(svg.to_uppercase().contains("#DC3545"));
    }

    #[test]
    fn empty_chart_has_a_message() {
        let chart = bar_chart(Orientation::Vertical, vec![]);
        let svg = render_chart(&ChartSpec::Bar(chart)).unwrap();
        assert!(svg.contains("Sem dados para exibir"));
    }

    #[test]
    fn pie_slices() {
        let chart = PieChart {
            title: "Modelos de Ensino".to_string(),
            slices: vec![
                PieSlice {
                    label: "Presencial".to_string(),
                    value: 3,
                    color: palette::BLUE,
                },
                PieSlice {
                    label: "Remoto".to_string(),
                    value: 1,
                    color: palette::ORANGE,
                },
            ],
            height: 350,
        };
        let svg = render_chart(&ChartSpec::Pie(chart)).unwrap();
        assert!(svg.contains("Presencial"));
        assert!(svg.contains("Remoto"));
        assert!(svg.to_uppercase().contains("#FD7E14"));
    }

    #[test]
    fn stacked_series_have_a_legend() {
        let chart = StackedBarChart {
            title: "Avaliação da Infraestrutura".to_string(),
            x_title: "Item".to_string(),
            y_title: "Quantidade".to_string(),
            categories: vec!["Biblioteca".to_string(), "Laboratórios".to_string()],
            series: vec![
                Series {
                    name: "Excelente".to_string(),
                    values: vec![2, 0],
                    color: palette::GREEN,
                },
                Series {
                    name: "Ruim".to_string(),
                    values: vec![1, 4],
                    color: palette::ORANGE,
                },
            ],
            height: 500,
        };
        let svg = render_chart(&ChartSpec::StackedBar(chart)).unwrap();
        assert!(svg.contains("Excelente"));
        assert!(svg.contains("Ruim"));
        assert!(svg.contains("Biblioteca"));
    }

    #[test]
    fn value_axis_leaves_room_for_labels() {
        assert_eq!(value_range(0), 1);
        assert_eq!(value_range(7), 8);
        assert_eq!(value_range(100), 111);
    }

    #[test]
    fn long_labels_are_cut() {
        assert_eq!(truncate("Engenharia", 14), "Engenharia");
        assert_eq!(truncate("Engenharia de Computação", 10), "Engenhari…");
        let labels = vec!["a".to_string(), "b".to_string()];
        assert_eq!(category_label(&labels, &SegmentValue::CenterOf(1)), "b");
        assert_eq!(category_label(&labels, &SegmentValue::Exact(2)), "");
        assert_eq!(category_label(&labels, &SegmentValue::Last), "");
    }
}
