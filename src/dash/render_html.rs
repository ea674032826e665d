//! HTML rendering of the dashboard
//!
//! The page is self-contained: styles, charts (inline SVG drawn by plotters) and scripts
//! are embedded, so that it can be opened offline. The tabs and the dropdowns are switched in the browser;
//! every option of a dropdown is rendered in advance.

use survey_report::{Block, DashboardView, KpiTile, LikertSelector, Panel, RawDataView, SectionItem};

use crate::dash::config_reader::{Layout, PageSettings, SidebarState};
use crate::dash::render_chart::render_chart;
use crate::dash::session::{Page, PageView, SidebarView};
use crate::dash::DashResult;

/// Renders the whole page.
pub fn render_page(page: &Page) -> DashResult<String> {
    let settings = &page.settings;
    let body = match &page.body {
        PageView::Welcome { error } => render_welcome(error.as_deref()),
        PageView::Dashboard { view, .. } => render_dashboard(view)?,
    };
    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{icon} {title}</title>
    <style>{css}</style>
</head>
<body>
    <div class="page">
        {sidebar}
        <main class="{layout}">
            {header}
            {body}
            {footer}
        </main>
    </div>
    <script>{js}</script>
</body>
</html>"#,
        icon = html_escape(&settings.page_icon),
        title = html_escape(&settings.page_title),
        css = inline_css(),
        js = inline_javascript(),
        sidebar = render_sidebar(&page.sidebar, settings),
        layout = match settings.layout {
            Layout::Wide => "wide",
            Layout::Centered => "centered",
        },
        header = render_header(settings),
        body = body,
        footer = render_footer(settings),
    ))
}

fn inline_css() -> &'static str {
    r#"
* { box-sizing: border-box; font-family: 'Inter', 'Segoe UI', Helvetica, Arial, sans-serif; }
body { margin: 0; background: #F5F7FA; color: #212529; }
.page { display: flex; min-height: 100vh; }

.sidebar {
    width: 280px;
    flex-shrink: 0;
    padding: 24px;
    color: white;
    background: linear-gradient(180deg, #003366 0%, #001A33 100%);
}
.sidebar.collapsed { display: none; }
.sidebar h3 { margin-top: 0; }
.sidebar .prompt { font-weight: 600; }
.sidebar .help, .sidebar .types { font-size: 13px; opacity: 0.85; }
.sidebar .status {
    margin-top: 16px;
    padding: 10px 12px;
    border-radius: 10px;
    background: rgba(40, 167, 69, 0.25);
}
.sidebar-toggle {
    position: fixed;
    top: 12px;
    left: 12px;
    border: none;
    border-radius: 8px;
    padding: 6px 10px;
    color: white;
    background: #003366;
    cursor: pointer;
    z-index: 10;
}

main { flex: 1; padding: 32px; min-width: 0; }
main.centered { max-width: 960px; margin: 0 auto; }

.header-gradient {
    background: linear-gradient(135deg, #003366 0%, #001A33 100%);
    padding: 40px;
    border-radius: 20px;
    margin-bottom: 30px;
    box-shadow: 0 10px 30px rgba(0,0,0,0.15);
    position: relative;
    overflow: hidden;
}
.header-gradient::before {
    content: '';
    position: absolute;
    top: -50%;
    right: -10%;
    width: 400px;
    height: 400px;
    background: rgba(255,255,255,0.1);
    border-radius: 50%;
}
.header-gradient h1 {
    color: white;
    margin: 0;
    font-size: 42px;
    font-weight: 700;
    text-shadow: 2px 2px 4px rgba(0,0,0,0.2);
}
.header-gradient p { color: rgba(255,255,255,0.95); font-size: 18px; margin-top: 10px; }

.kpis { display: grid; grid-template-columns: repeat(4, 1fr); gap: 20px; margin-bottom: 20px; }
.kpi-card-modern {
    background: linear-gradient(135deg, #6B5B95 0%, #8B7AB8 100%);
    padding: 30px;
    border-radius: 20px;
    box-shadow: 0 8px 24px rgba(0,0,0,0.12);
    transition: all 0.3s ease;
    color: white;
}
.kpi-card-modern:hover { transform: translateY(-5px); box-shadow: 0 12px 32px rgba(0,0,0,0.18); }
.kpi-card-modern .label { font-size: 14px; opacity: 0.9; }
.kpi-card-modern .value { font-size: 30px; font-weight: 700; margin-top: 6px; }

.content-card {
    background: white;
    padding: 25px;
    border-radius: 16px;
    box-shadow: 0 4px 16px rgba(0,0,0,0.08);
    margin-bottom: 20px;
    border: 1px solid rgba(0,0,0,0.05);
}
.content-card h3 { color: #001A33; font-size: 20px; font-weight: 600; margin: 0; }
.error {
    background: #F8D7DA;
    color: #842029;
    padding: 16px;
    border-radius: 10px;
    margin-bottom: 20px;
}

.tabs { display: flex; gap: 8px; flex-wrap: wrap; margin-bottom: 20px; }
.tab-button {
    border: none;
    border-radius: 10px;
    padding: 12px 24px;
    font-weight: 600;
    cursor: pointer;
    color: #003366;
    background: white;
    box-shadow: 0 2px 8px rgba(0,0,0,0.08);
}
.tab-button.active { color: white; background: linear-gradient(135deg, #003366 0%, #001A33 100%); }
.tab-panel { display: none; }
.tab-panel.active { display: block; }

.split { display: grid; grid-template-columns: 1fr 1fr; gap: 20px; }
.chart { background: white; border-radius: 16px; padding: 12px; margin-bottom: 20px; }
.chart svg { width: 100%; height: auto; display: block; }
.selector label { display: block; font-weight: 600; margin-bottom: 8px; }
.selector select { width: 100%; padding: 8px; border-radius: 8px; margin-bottom: 12px; }

.raw-data { overflow: auto; max-height: 480px; margin: 12px 0; }
.raw-data table { border-collapse: collapse; font-size: 13px; }
.raw-data th, .raw-data td { border: 1px solid #DEE2E6; padding: 4px 8px; text-align: left; white-space: nowrap; }
.raw-data th { background: #F1F3F5; position: sticky; top: 0; }
.download {
    display: inline-block;
    color: white;
    background: linear-gradient(135deg, #003366 0%, #001A33 100%);
    border-radius: 10px;
    padding: 12px 24px;
    font-weight: 600;
    text-decoration: none;
}

footer { text-align: center; color: #6C757D; padding: 20px; border-top: 1px solid #DEE2E6; margin-top: 20px; }

@media (max-width: 900px) {
    .kpis { grid-template-columns: repeat(2, 1fr); }
    .split { grid-template-columns: 1fr; }
    .sidebar { display: none; }
}
"#
}

fn inline_javascript() -> &'static str {
    r#"
document.querySelectorAll('.tab-button').forEach(function (button) {
    button.addEventListener('click', function () {
        var id = button.dataset.tab;
        document.querySelectorAll('.tab-button').forEach(function (b) {
            b.classList.toggle('active', b === button);
        });
        document.querySelectorAll('.tab-panel').forEach(function (p) {
            p.classList.toggle('active', p.dataset.tab === id);
        });
    });
});

document.querySelectorAll('select.likert-selector').forEach(function (select) {
    select.addEventListener('change', function () {
        var charts = document.querySelectorAll('.selector-chart');
        charts.forEach(function (div) {
            if (div.dataset.selector === select.dataset.selector) {
                div.hidden = div.dataset.option !== select.value;
            }
        });
    });
});

var toggle = document.querySelector('.sidebar-toggle');
if (toggle) {
    toggle.addEventListener('click', function () {
        document.querySelector('.sidebar').classList.toggle('collapsed');
    });
}
"#
}

fn render_header(settings: &PageSettings) -> String {
    format!(
        r#"<div class="header-gradient">
    <h1>{title}</h1>
    <p>{subtitle}</p>
</div>"#,
        title = html_escape(&settings.header_title),
        subtitle = html_escape(&settings.header_subtitle),
    )
}

fn render_sidebar(sidebar: &SidebarView, settings: &PageSettings) -> String {
    let collapsed = match settings.initial_sidebar_state {
        SidebarState::Expanded => "",
        SidebarState::Collapsed => " collapsed",
    };
    let status = sidebar
        .status
        .as_ref()
        .map(|s| format!(r#"<div class="status">{}</div>"#, html_escape(s)))
        .unwrap_or_default();
    format!(
        r#"<button class="sidebar-toggle" title="Menu">☰</button>
<aside class="sidebar{collapsed}">
    <h3>{heading}</h3>
    <p class="prompt">{prompt}</p>
    <p class="types">{types}</p>
    <p class="help">{help}</p>
    {status}
</aside>"#,
        collapsed = collapsed,
        heading = html_escape(&sidebar.heading),
        prompt = html_escape(&sidebar.prompt),
        types = html_escape(&sidebar.accepted_types.join(", ")),
        help = html_escape(&sidebar.help),
        status = status,
    )
}

fn render_welcome(error: Option<&str>) -> String {
    let error = error
        .map(|e| format!(r#"<div class="error">{}</div>"#, html_escape(e)))
        .unwrap_or_default();
    format!(
        r#"{error}
<div class="content-card">
    <h3>👋 Bem-vindo ao Dashboard CEFET-MG</h3>
    <p>Este dashboard permite visualizar e analisar os dados da pesquisa institucional do CEFET-MG.</p>
    <p><strong>Para começar:</strong></p>
    <ol>
        <li>Faça upload do arquivo Excel na barra lateral</li>
        <li>Explore os gráficos e análises gerados automaticamente</li>
        <li>Use os filtros para segmentar os dados</li>
    </ol>
</div>"#,
        error = error,
    )
}

fn render_dashboard(view: &DashboardView) -> DashResult<String> {
    let buttons: String = view
        .tabs
        .iter()
        .enumerate()
        .map(|(idx, t)| {
            format!(
                r#"<button class="tab-button{active}" data-tab="{id}">{title}</button>"#,
                active = if idx == 0 { " active" } else { "" },
                id = html_escape(&t.id),
                title = html_escape(&t.title),
            )
        })
        .collect();
    let panels: String = view
        .tabs
        .iter()
        .enumerate()
        .map(|(idx, t)| {
            let blocks: String = t.blocks.iter().map(render_block).collect::<DashResult<_>>()?;
            Ok(format!(
                r#"<section class="tab-panel{active}" data-tab="{id}">{blocks}</section>"#,
                active = if idx == 0 { " active" } else { "" },
                id = html_escape(&t.id),
                blocks = blocks,
            ))
        })
        .collect::<DashResult<_>>()?;
    Ok(format!(
        r#"{kpis}
<nav class="tabs">{buttons}</nav>
{panels}"#,
        kpis = render_kpis(&view.kpis),
        buttons = buttons,
        panels = panels,
    ))
}

fn render_kpis(kpis: &[KpiTile]) -> String {
    let cards: String = kpis
        .iter()
        .map(|k| {
            format!(
                r#"<div class="kpi-card-modern"><div class="label">{label}</div><div class="value">{value}</div></div>"#,
                label = html_escape(&k.label),
                value = html_escape(&k.value),
            )
        })
        .collect();
    format!(r#"<div class="kpis">{}</div>"#, cards)
}

fn render_block(block: &Block) -> DashResult<String> {
    Ok(match block {
        Block::Full(p) => render_panel(p)?,
        Block::Split { left, right } => format!(
            r#"<div class="split"><div>{}</div><div>{}</div></div>"#,
            render_panel(left)?,
            render_panel(right)?
        ),
    })
}

fn render_panel(panel: &Panel) -> DashResult<String> {
    let heading = panel
        .heading
        .as_ref()
        .map(|h| format!(r#"<div class="content-card"><h3>{}</h3></div>"#, html_escape(h)))
        .unwrap_or_default();
    let items: String = panel.items.iter().map(render_item).collect::<DashResult<_>>()?;
    Ok(format!("{}{}", heading, items))
}

fn render_item(item: &SectionItem) -> DashResult<String> {
    Ok(match item {
        SectionItem::Chart(c) => format!(r#"<div class="chart">{}</div>"#, render_chart(c)?),
        SectionItem::Selector(s) => render_selector(s)?,
        SectionItem::RawData(r) => render_raw_data(r),
    })
}

fn render_selector(selector: &LikertSelector) -> DashResult<String> {
    let id = html_escape(&selector.id);
    let options: String = selector
        .options
        .iter()
        .enumerate()
        .map(|(idx, o)| {
            format!(
                r#"<option value="{idx}"{selected} title="{column}">{label}</option>"#,
                idx = idx,
                selected = if idx == selector.selected { " selected" } else { "" },
                column = html_escape(&o.column),
                label = html_escape(&o.label),
            )
        })
        .collect();
    let charts: String = selector
        .options
        .iter()
        .enumerate()
        .map(|(idx, o)| {
            Ok(format!(
                r#"<div class="chart selector-chart" data-selector="{id}" data-option="{idx}"{hidden}>{chart}</div>"#,
                id = id,
                idx = idx,
                hidden = if idx == selector.selected { "" } else { " hidden" },
                chart = render_chart(&o.chart)?,
            ))
        })
        .collect::<DashResult<_>>()?;
    Ok(format!(
        r#"<div class="selector">
    <label for="{id}">{prompt}</label>
    <select id="{id}" class="likert-selector" data-selector="{id}">{options}</select>
    {charts}
</div>"#,
        id = id,
        prompt = html_escape(&selector.prompt),
        options = options,
        charts = charts,
    ))
}

fn render_raw_data(raw: &RawDataView) -> String {
    let checkbox = format!(
        r#"<label><input type="checkbox" disabled{checked}> {label}</label>"#,
        checked = if raw.visible { " checked" } else { "" },
        label = html_escape(&raw.checkbox_label),
    );
    if !raw.visible {
        return format!(r#"<div class="content-card">{}</div>"#, checkbox);
    }
    let header: String = raw
        .columns
        .iter()
        .map(|c| format!("<th>{}</th>", html_escape(c)))
        .collect();
    let rows: String = raw
        .rows
        .iter()
        .map(|r| {
            let cells: String = r
                .iter()
                .map(|c| format!("<td>{}</td>", html_escape(c)))
                .collect();
            format!("<tr>{}</tr>", cells)
        })
        .collect();
    format!(
        r#"<div class="content-card">
    {checkbox}
    <div class="raw-data">
        <table>
            <thead><tr>{header}</tr></thead>
            <tbody>{rows}</tbody>
        </table>
    </div>
    <a class="download" href="{file}" download="{file}">{download}</a>
</div>"#,
        checkbox = checkbox,
        header = header,
        rows = rows,
        file = html_escape(&raw.download_file_name),
        download = html_escape(&raw.download_label),
    )
}

fn render_footer(settings: &PageSettings) -> String {
    format!(
        r#"<footer>
    <p>{}</p>
</footer>"#,
        html_escape(&settings.footer)
    )
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
