//! The view model of the dashboard: what every tab shows, computed from the table and
//! the current selections. Nothing here keeps state between two renders.

use log::{debug, info, warn};
use serde::Serialize;

use crate::charts::{
    distribution_chart, infrastructure_chart, likert_chart, palette, pie_chart,
    top_counts_chart, ChartSpec, ChartText, Gradient,
};
use crate::kpi::{kpi_tiles, KpiTile};
use crate::likert::likert_columns;
use crate::schema::*;
use crate::table::SurveyTable;

// ********* Selections **********

/// The choices made by the user on the page.
///
/// The trait selections are column names. None, or a name that is not offered, selects
/// the first option.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize)]
pub struct Selections {
    pub student_trait: Option<String>,
    pub professor_trait: Option<String>,
    pub show_raw_data: bool,
}

// ********* View model **********

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct DashboardView {
    pub kpis: Vec<KpiTile>,
    pub tabs: Vec<TabView>,
    /// The columns detected as agreement-scale questions.
    pub likert_columns: Vec<String>,
}

impl DashboardView {
    pub fn tab(&self, id: &str) -> Option<&TabView> {
        self.tabs.iter().find(|t| t.id == id)
    }
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct TabView {
    pub id: String,
    pub title: String,
    pub blocks: Vec<Block>,
}

impl TabView {
    fn new(id: &str, title: &str, blocks: Vec<Block>) -> TabView {
        TabView {
            id: id.to_string(),
            title: title.to_string(),
            blocks,
        }
    }

    /// All the items of the tab, in display order.
    pub fn items(&self) -> Vec<&SectionItem> {
        let mut res = Vec::new();
        for b in self.blocks.iter() {
            match b {
                Block::Full(p) => res.extend(p.items.iter()),
                Block::Split { left, right } => {
                    res.extend(left.items.iter());
                    res.extend(right.items.iter());
                }
            }
        }
        res
    }

    pub fn charts(&self) -> Vec<&ChartSpec> {
        self.items()
            .into_iter()
            .filter_map(|i| match i {
                SectionItem::Chart(c) => Some(c),
                _ => None,
            })
            .collect()
    }
}

/// A row of the tab: one panel on the full width, or two side by side.
#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Full(Panel),
    Split { left: Panel, right: Panel },
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Panel {
    pub heading: Option<String>,
    pub items: Vec<SectionItem>,
}

impl Panel {
    fn new(heading: &str, items: Vec<SectionItem>) -> Panel {
        Panel {
            heading: Some(heading.to_string()),
            items,
        }
    }

    fn untitled(items: Vec<SectionItem>) -> Panel {
        Panel {
            heading: None,
            items,
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionItem {
    Chart(ChartSpec),
    Selector(LikertSelector),
    RawData(RawDataView),
}

/// A dropdown over agreement-scale questions. Every option carries its chart.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct LikertSelector {
    pub id: String,
    pub prompt: String,
    pub options: Vec<SelectorOption>,
    /// Index in `options`.
    pub selected: usize,
}

impl LikertSelector {
    pub fn selected_option(&self) -> Option<&SelectorOption> {
        self.options.get(self.selected)
    }
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct SelectorOption {
    pub column: String,
    pub label: String,
    pub chart: ChartSpec,
}

/// The table itself, shown on demand, with the link to its CSV export.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct RawDataView {
    pub checkbox_label: String,
    pub visible: bool,
    pub columns: Vec<String>,
    /// Empty unless visible.
    pub rows: Vec<Vec<String>>,
    pub download_label: String,
    pub download_file_name: String,
}

// ********* Tabs **********

fn chart_item(chart: Option<ChartSpec>) -> Vec<SectionItem> {
    chart.map(SectionItem::Chart).into_iter().collect()
}

fn overview_tab(table: &SurveyTable) -> TabView {
    let courses = table.column(COURSE).map(|c| {
        ChartSpec::Bar(top_counts_chart(
            c,
            15,
            ChartText::new("Top 15 Cursos com Mais Respostas", "Quantidade", "Curso"),
            &Gradient::BLUE,
            500,
        ))
    });
    let ages = table.column(AGE).map(|c| {
        ChartSpec::Bar(distribution_chart(
            c,
            ChartText::new(
                "Distribuição de Idade dos Respondentes",
                "Idade",
                "Quantidade",
            ),
            &Gradient::BLUE,
            400,
        ))
    });
    let models = table.column(TEACHING_MODELS).map(|c| {
        ChartSpec::Pie(pie_chart(
            c,
            "Modelos de Ensino",
            &[
                palette::BLUE,
                palette::LIGHT_BLUE,
                palette::PURPLE,
                palette::GREEN,
            ],
            400,
        ))
    });
    TabView::new(
        "overview",
        "📊 Visão Geral",
        vec![
            Block::Full(Panel::new("Distribuição por Curso", chart_item(courses))),
            Block::Split {
                left: Panel::new("Distribuição por Idade", chart_item(ages)),
                right: Panel::new("Tipo de Ensino Vivenciado", chart_item(models)),
            },
        ],
    )
}

fn entrepreneurship_tab(table: &SurveyTable) -> TabView {
    let statements: Vec<SectionItem> = ENTREPRENEURSHIP_STATEMENTS
        .iter()
        .filter_map(|col| likert_chart(table, col, &col.replace('"', "")))
        .map(|c| SectionItem::Chart(ChartSpec::Bar(c)))
        .collect();
    let own_business = table.column(ENTREPRENEURSHIP_IS_OWN_BUSINESS).map(|c| {
        ChartSpec::Pie(pie_chart(
            c,
            "Empreendedorismo é abrir o próprio negócio?",
            &[palette::GREEN, palette::RED],
            350,
        ))
    });
    let partner = table.column(COMPANY_PARTNER).map(|c| {
        ChartSpec::Pie(pie_chart(
            c,
            "É sócio ou fundador de empresa?",
            &[
                palette::BLUE,
                palette::LIGHT_BLUE,
                palette::PURPLE,
                palette::ORANGE,
            ],
            350,
        ))
    });
    TabView::new(
        "entrepreneurship",
        "🎯 Empreendedorismo",
        vec![
            Block::Full(Panel::new("Percepções sobre Empreendedorismo", statements)),
            Block::Full(Panel::new("Entendimento sobre Empreendedorismo", vec![])),
            Block::Split {
                left: Panel::untitled(chart_item(own_business)),
                right: Panel::untitled(chart_item(partner)),
            },
        ],
    )
}

/// Builds a selector over the given columns. Returns None when there is nothing to select.
fn likert_selector(
    table: &SurveyTable,
    id: &str,
    prompt: &str,
    columns: &[&str],
    label_of: fn(&str) -> &str,
    requested: Option<&str>,
) -> Option<LikertSelector> {
    let options: Vec<SelectorOption> = columns
        .iter()
        .filter_map(|col| {
            let label = label_of(col);
            likert_chart(table, col, label).map(|chart| SelectorOption {
                column: col.to_string(),
                label: label.to_string(),
                chart: ChartSpec::Bar(chart),
            })
        })
        .collect();
    if options.is_empty() {
        return None;
    }
    let selected = match requested {
        None => 0,
        Some(name) => match options.iter().position(|o| o.column == name) {
            Some(idx) => idx,
            None => {
                warn!(
                    "likert_selector: {}: {:?} is not an option, selecting the first one",
                    id, name
                );
                0
            }
        },
    };
    Some(LikertSelector {
        id: id.to_string(),
        prompt: prompt.to_string(),
        options,
        selected,
    })
}

fn students_tab(table: &SurveyTable, selections: &Selections) -> TabView {
    let trait_columns = table.columns_containing(&[STUDENT_TRAITS_PATTERN]);
    let selector = likert_selector(
        table,
        "student-trait",
        "Selecione a característica para visualizar:",
        &trait_columns,
        after_last_question_mark,
        selections.student_trait.as_deref(),
    );
    let projects = table.column(PROJECTS).map(|c| {
        ChartSpec::Bar(top_counts_chart(
            c,
            10,
            ChartText::new(
                "Top 10 Projetos com Maior Participação",
                "Quantidade",
                "Projeto",
            ),
            &Gradient::GREEN,
            400,
        ))
    });
    TabView::new(
        "students",
        "👥 Perfil dos Alunos",
        vec![
            Block::Full(Panel::new(
                "Características dos Alunos",
                selector.map(SectionItem::Selector).into_iter().collect(),
            )),
            Block::Full(Panel::new("Participação em Projetos", chart_item(projects))),
        ],
    )
}

fn infrastructure_tab(table: &SurveyTable) -> TabView {
    let infra_columns: Vec<&str> = table
        .columns_containing(&[INFRASTRUCTURE_PATTERN, UNKNOWN_OPTION_PATTERN])
        .into_iter()
        .take(MAX_INFRASTRUCTURE_ITEMS)
        .collect();
    let access_columns: Vec<&str> = table
        .columns_containing(&[ACCESSIBILITY_PATTERN])
        .into_iter()
        .take(MAX_ACCESSIBILITY_ITEMS)
        .collect();
    let infra = infrastructure_chart(table, &infra_columns).map(ChartSpec::StackedBar);
    let access = infrastructure_chart(table, &access_columns).map(ChartSpec::StackedBar);
    let availability = likert_chart(table, INTERNET_AVAILABILITY, "Disponibilidade de Internet")
        .map(ChartSpec::Bar);
    let speed = likert_chart(table, INTERNET_SPEED, "Velocidade da Internet").map(ChartSpec::Bar);
    TabView::new(
        "infrastructure",
        "🏢 Infraestrutura",
        vec![
            Block::Full(Panel::new("Avaliação da Infraestrutura", chart_item(infra))),
            Block::Full(Panel::new("Acessibilidade", chart_item(access))),
            Block::Full(Panel::new("Qualidade da Internet", vec![])),
            Block::Split {
                left: Panel::untitled(chart_item(availability)),
                right: Panel::untitled(chart_item(speed)),
            },
        ],
    )
}

fn raw_data(table: &SurveyTable, visible: bool, csv_file_name: &str) -> RawDataView {
    let rows = if visible {
        (0..table.num_rows())
            .filter_map(|idx| table.row(idx))
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    } else {
        vec![]
    };
    RawDataView {
        checkbox_label: "Mostrar dados brutos".to_string(),
        visible,
        columns: table.column_names().iter().map(|s| s.to_string()).collect(),
        rows,
        download_label: "📥 Baixar dados em CSV".to_string(),
        download_file_name: csv_file_name.to_string(),
    }
}

fn detailed_tab(table: &SurveyTable, selections: &Selections, csv_file_name: &str) -> TabView {
    let reasons = |col: &str, title: &str, gradient: &Gradient| {
        table.column(col).map(|c| {
            ChartSpec::Bar(top_counts_chart(
                c,
                10,
                ChartText::new(title, "Quantidade", "Motivo"),
                gradient,
                500,
            ))
        })
    };
    let permanence = reasons(PERMANENCE_REASONS, "Motivos de Permanência", &Gradient::GREEN);
    let evasion = reasons(EVASION_REASONS, "Motivos de Evasão", &Gradient::WARM);

    let trait_columns =
        table.columns_containing(&[PROFESSOR_TRAITS_PATTERN, UNKNOWN_OPTION_PATTERN]);
    let selector = likert_selector(
        table,
        "professor-trait",
        "Selecione a característica dos professores para visualizar:",
        &trait_columns,
        professor_trait_label,
        selections.professor_trait.as_deref(),
    );
    TabView::new(
        "detailed",
        "📈 Análises Detalhadas",
        vec![
            Block::Full(Panel::new("Motivos de Permanência e Evasão", vec![])),
            Block::Split {
                left: Panel::untitled(chart_item(permanence)),
                right: Panel::untitled(chart_item(evasion)),
            },
            Block::Full(Panel::new(
                "Características dos Professores",
                selector.map(SectionItem::Selector).into_iter().collect(),
            )),
            Block::Full(Panel::new(
                "Dados Brutos",
                vec![SectionItem::RawData(raw_data(
                    table,
                    selections.show_raw_data,
                    csv_file_name,
                ))],
            )),
        ],
    )
}

/// Computes the whole dashboard for a loaded table.
///
/// Panels whose questions are absent from the table are left empty. The table is only
/// read.
pub fn build_dashboard(
    table: &SurveyTable,
    selections: &Selections,
    csv_file_name: &str,
) -> DashboardView {
    info!(
        "build_dashboard: {} rows, {} columns",
        table.num_rows(),
        table.num_columns()
    );
    debug!("build_dashboard: selections: {:?}", selections);
    DashboardView {
        kpis: kpi_tiles(table),
        tabs: vec![
            overview_tab(table),
            entrepreneurship_tab(table),
            students_tab(table, selections),
            infrastructure_tab(table),
            detailed_tab(table, selections, csv_file_name),
        ],
        likert_columns: likert_columns(table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, Column};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn texts(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|s| Cell::Text(s.to_string())).collect()
    }

    fn selector<'a>(tab: &'a TabView) -> Option<&'a LikertSelector> {
        tab.items().into_iter().find_map(|i| match i {
            SectionItem::Selector(s) => Some(s),
            _ => None,
        })
    }

    fn student_table() -> SurveyTable {
        SurveyTable::new(vec![
            Column::new(
                &format!("{}?Criatividade", STUDENT_TRAITS_PATTERN),
                texts(&["5 - Concordo Totalmente", "4 - Concordo Parcialmente"]),
            ),
            Column::new(
                &format!("{}?Liderança", STUDENT_TRAITS_PATTERN),
                texts(&["1 - Discordo Totalmente", "1 - Discordo Totalmente"]),
            ),
            Column::new(COURSE, texts(&["Engenharia", "Física"])),
        ])
    }

    #[test]
    fn empty_table_has_five_tabs() {
        init_logger();
        let view = build_dashboard(&SurveyTable::default(), &Selections::default(), "x.csv");
        let titles: Vec<&str> = view.tabs.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "📊 Visão Geral",
                "🎯 Empreendedorismo",
                "👥 Perfil dos Alunos",
                "🏢 Infraestrutura",
                "📈 Análises Detalhadas"
            ]
        );
        assert_eq!(view.kpis[0].value, "0");
        for tab in view.tabs.iter() {
            assert!(tab.charts().is_empty());
        }
        assert!(view.likert_columns.is_empty());
    }

    #[test]
    fn student_selector_defaults_to_first_option() {
        let table = student_table();
        let view = build_dashboard(&table, &Selections::default(), "x.csv");
        let s = selector(view.tab("students").unwrap()).unwrap();
        let labels: Vec<&str> = s.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Criatividade", "Liderança"]);
        assert_eq!(s.selected, 0);
        assert_eq!(s.selected_option().unwrap().chart.title(), "Criatividade");
        assert_eq!(view.likert_columns.len(), 2);
    }

    #[test]
    fn student_selector_follows_selection() {
        init_logger();
        let table = student_table();
        let second = format!("{}?Liderança", STUDENT_TRAITS_PATTERN);
        let selections = Selections {
            student_trait: Some(second),
            ..Selections::default()
        };
        let view = build_dashboard(&table, &selections, "x.csv");
        assert_eq!(selector(view.tab("students").unwrap()).unwrap().selected, 1);

        let unknown = Selections {
            student_trait: Some("nope".to_string()),
            ..Selections::default()
        };
        let view = build_dashboard(&table, &unknown, "x.csv");
        assert_eq!(selector(view.tab("students").unwrap()).unwrap().selected, 0);
    }

    #[test]
    fn professor_selector_needs_unknown_option() {
        let kept = format!(
            "{}? Caso não saiba, marcar \"Não observado\"Didática",
            PROFESSOR_TRAITS_PATTERN
        );
        let table = SurveyTable::new(vec![
            Column::new(&kept, texts(&["3 - Neutro"])),
            Column::new(
                &format!("{}?Ética", PROFESSOR_TRAITS_PATTERN),
                texts(&["3 - Neutro"]),
            ),
        ]);
        let view = build_dashboard(&table, &Selections::default(), "x.csv");
        let s = selector(view.tab("detailed").unwrap()).unwrap();
        assert_eq!(s.options.len(), 1);
        assert_eq!(s.options[0].label, "Didática");
        assert_eq!(s.options[0].column, kept);
    }

    #[test]
    fn entrepreneurship_titles_drop_quotes() {
        let table = SurveyTable::new(vec![Column::new(
            ENTREPRENEURSHIP_STATEMENTS[1],
            texts(&["4 - Concordo Parcialmente"]),
        )]);
        let view = build_dashboard(&table, &Selections::default(), "x.csv");
        let charts = view.tab("entrepreneurship").unwrap().charts();
        assert_eq!(charts.len(), 1);
        assert_eq!(
            charts[0].title(),
            "A matriz curricular do curso contribui para o desenvolvimento da minha postura empreendedora."
        );
    }

    #[test]
    fn infrastructure_columns_are_capped() {
        let columns: Vec<Column> = (0..10)
            .map(|idx| {
                Column::new(
                    &format!(
                        "{} ({}) Caso não saiba?Item {}",
                        INFRASTRUCTURE_PATTERN, idx, idx
                    ),
                    texts(&["Boa"]),
                )
            })
            .collect();
        let view = build_dashboard(&SurveyTable::new(columns), &Selections::default(), "x.csv");
        let charts = view.tab("infrastructure").unwrap().charts();
        assert_eq!(charts.len(), 1);
        match charts[0] {
            ChartSpec::StackedBar(c) => assert_eq!(c.categories.len(), MAX_INFRASTRUCTURE_ITEMS),
            other => panic!("unexpected chart {:?}", other),
        }
    }

    #[test]
    fn raw_data_only_when_asked() {
        let table = student_table();
        let find = |view: &DashboardView| -> RawDataView {
            view.tab("detailed")
                .unwrap()
                .items()
                .into_iter()
                .find_map(|i| match i {
                    SectionItem::RawData(r) => Some(r.clone()),
                    _ => None,
                })
                .unwrap()
        };
        let hidden = find(&build_dashboard(&table, &Selections::default(), "d.csv"));
        assert!(!hidden.visible);
        assert!(hidden.rows.is_empty());
        assert_eq!(hidden.download_file_name, "d.csv");

        let selections = Selections {
            show_raw_data: true,
            ..Selections::default()
        };
        let shown = find(&build_dashboard(&table, &selections, "d.csv"));
        assert_eq!(shown.rows.len(), 2);
        assert_eq!(shown.rows[1][2], "Física");
        assert_eq!(shown.columns.len(), 3);
    }
}
