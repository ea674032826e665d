use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use survey_report::*;

use crate::args::Args;
use crate::dash::config_reader::*;
use crate::dash::io_csv::write_csv;
use crate::dash::io_excel::CalamineLoader;
use crate::dash::render_html::render_page;
use crate::dash::session::{PageView, Session};

mod config_reader;
mod io_csv;
mod io_excel;
mod render_chart;
mod render_html;
mod session;

#[derive(Debug, Snafu)]
pub enum DashError {
    #[snafu(display("could not read the spreadsheet: {source}"))]
    OpeningSpreadsheet { source: calamine::Error },
    #[snafu(display("unsupported file type for {file_name} (expected .xlsx or .xls)"))]
    UnknownSpreadsheetFormat { file_name: String },
    #[snafu(display("the workbook has no worksheet or no header row"))]
    EmptyWorkbook {},
    #[snafu(display("could not read {path}: {source}"))]
    ReadingInput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("could not read {path}: {source}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("invalid JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("could not serialize the dashboard as JSON: {source}"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("could not draw the chart {title:?}: {source}"))]
    DrawingChart {
        source: plotters::drawing::DrawingAreaErrorKind<std::io::Error>,
        title: String,
    },
    #[snafu(display("could not write {path}: {source}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("could not export the data as CSV: {source}"))]
    CsvExport { source: csv::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashError>;

const DEFAULT_OUT: &str = "dashboard.html";
const STDOUT: &str = "stdout";

fn write_output(path: &str, contents: &str) -> DashResult<()> {
    if path == STDOUT {
        let mut out = std::io::stdout();
        out.write_all(contents.as_bytes())
            .context(WritingOutputSnafu { path })?;
    } else {
        fs::write(path, contents).context(WritingOutputSnafu { path })?;
        info!("write_output: wrote {}", path);
    }
    Ok(())
}

fn file_name_of(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Where the CSV export goes when it is not given explicitly: next to the page.
fn default_csv_path(out: &str, csv_file_name: &str) -> PathBuf {
    let dir = if out == STDOUT {
        None
    } else {
        Path::new(out).parent()
    };
    match dir {
        Some(d) => d.join(csv_file_name),
        None => PathBuf::from(csv_file_name),
    }
}

fn selections_from_args(args: &Args) -> Selections {
    Selections {
        student_trait: args.student_trait.clone(),
        professor_trait: args.professor_trait.clone(),
        show_raw_data: args.show_raw_data,
    }
}

/// The link from the page to the CSV export, relative to the directory of the page.
fn download_link(out: &str, csv_path: &Path) -> String {
    let page_dir = match Path::new(out).parent() {
        Some(d) if out != STDOUT => d,
        _ => Path::new(""),
    };
    let link = if csv_path.is_absolute() {
        csv_path.to_path_buf()
    } else if let Ok(p) = csv_path.strip_prefix(page_dir) {
        p.to_path_buf()
    } else if page_dir.is_absolute() {
        std::env::current_dir()
            .map(|d| d.join(csv_path))
            .unwrap_or_else(|_| csv_path.to_path_buf())
    } else {
        let mut up = PathBuf::new();
        for _ in page_dir.components() {
            up.push("..");
        }
        up.join(csv_path)
    };
    link.to_string_lossy().replace('\\', "/")
}

/// The column listing must not be mixed with a page written to stdout.
fn listing_goes_to_stderr(out: &str) -> bool {
    out == STDOUT
}

fn write_listing<W: Write>(columns: &[String], mut writer: W, path: &str) -> DashResult<()> {
    for c in columns.iter() {
        writeln!(writer, "{}", c).context(WritingOutputSnafu { path })?;
    }
    Ok(())
}

/// Renders the dashboard of the input file, as requested by the command line.
///
/// A spreadsheet that cannot be loaded is not an error: the welcome page is produced
/// with the error message, as the interactive page does.
pub fn run_dashboard(args: &Args) -> DashResult<()> {
    let settings = match &args.config {
        Some(p) => read_settings(p)?,
        None => PageSettings::default(),
    };
    debug!("run_dashboard: settings: {:?}", settings);
    let out = args.out.clone().unwrap_or_else(|| DEFAULT_OUT.to_string());
    ensure_whatever!(!out.is_empty(), "The output path may not be empty");
    let csv_path = match &args.csv_out {
        Some(p) => Some(PathBuf::from(p)),
        None if args.show_raw_data => Some(default_csv_path(&out, &settings.csv_file_name)),
        None => None,
    };

    let mut session = Session::new(CalamineLoader {}, settings);
    if let Some(input) = &args.input {
        let bytes = fs::read(input).context(ReadingInputSnafu { path: input })?;
        info!("run_dashboard: read {} bytes from {}", bytes.len(), input);
        session.upload(&file_name_of(input), bytes);
    }
    let selections = selections_from_args(args);
    session.select_student_trait(selections.student_trait);
    session.select_professor_trait(selections.professor_trait);
    session.set_show_raw_data(selections.show_raw_data);
    if let Some(p) = &csv_path {
        session.set_download_link(Some(download_link(&out, p)));
    }
    debug!("run_dashboard: selections: {:?}", session.selections());

    let page = session.render();

    match &page.body {
        PageView::Welcome { error: Some(e) } => {
            warn!("run_dashboard: the spreadsheet could not be loaded: {}", e)
        }
        PageView::Welcome { error: None } => {
            info!("run_dashboard: no input file, producing the welcome page")
        }
        PageView::Dashboard { view, .. } => {
            if args.list_likert {
                if listing_goes_to_stderr(&out) {
                    write_listing(&view.likert_columns, std::io::stderr(), "stderr")?;
                } else {
                    write_listing(&view.likert_columns, std::io::stdout(), STDOUT)?;
                }
            }
        }
    }

    write_output(&out, &render_page(&page)?)?;

    match (session.table(), csv_path) {
        (Some(table), Some(p)) => {
            let path_s = p.display().to_string();
            let file = fs::File::create(&p).context(WritingOutputSnafu { path: &path_s })?;
            write_csv(&table, file)?;
            info!("run_dashboard: wrote the CSV export to {}", path_s);
        }
        (None, Some(_)) if args.csv_out.is_some() => {
            warn!("run_dashboard: no data loaded, the CSV export is skipped")
        }
        _ => {}
    }

    if let Some(json_out) = &args.json_out {
        let js = serde_json::to_string_pretty(&page).context(SerializingJsonSnafu {})?;
        write_output(json_out, &js)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_next_to_page() {
        assert_eq!(
            default_csv_path("out/dash.html", "dados.csv"),
            PathBuf::from("out/dados.csv")
        );
        assert_eq!(
            default_csv_path("dash.html", "dados.csv"),
            PathBuf::from("dados.csv")
        );
        assert_eq!(
            default_csv_path(STDOUT, "dados.csv"),
            PathBuf::from("dados.csv")
        );
    }

    #[test]
    fn download_links_are_relative_to_the_page() {
        let link = |out: &str, csv: &str| download_link(out, Path::new(csv));
        assert_eq!(link("out/dash.html", "out/dados.csv"), "dados.csv");
        assert_eq!(link("dash.html", "exports/dados.csv"), "exports/dados.csv");
        assert_eq!(link("out/dash.html", "exports/dados.csv"), "../exports/dados.csv");
        assert_eq!(link("out/dash.html", "/tmp/dados.csv"), "/tmp/dados.csv");
        assert_eq!(link(STDOUT, "dados.csv"), "dados.csv");
        assert_eq!(
            link("dash.html", &default_csv_path("dash.html", "dados.csv").display().to_string()),
            "dados.csv"
        );
    }

    #[test]
    fn likert_listing_avoids_the_page_stream() {
        assert!(listing_goes_to_stderr(STDOUT));
        assert!(!listing_goes_to_stderr("dashboard.html"));
        let mut buf: Vec<u8> = Vec::new();
        let columns = vec!["q1".to_string(), "q2".to_string()];
        write_listing(&columns, &mut buf, "buffer").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "q1\nq2\n");
    }

    #[test]
    fn file_names() {
        assert_eq!(file_name_of("/tmp/dados.xlsx"), "dados.xlsx");
        assert_eq!(file_name_of("dados.xlsx"), "dados.xlsx");
    }

    #[test]
    fn errors_display() {
        let e = DashError::UnknownSpreadsheetFormat {
            file_name: "notas.txt".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "unsupported file type for notas.txt (expected .xlsx or .xls)"
        );
        let source = serde_json::from_str::<u32>("x").unwrap_err();
        let e = DashError::SerializingJson { source };
        assert!(e
            .to_string()
            .starts_with("could not serialize the dashboard as JSON: "));
    }
}
