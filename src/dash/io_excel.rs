// Reading the survey from Excel workbooks.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use survey_report::schema::DATE_COLUMNS;

use snafu::prelude::*;

use crate::dash::*;

const SPREADSHEET_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Turns the bytes of an uploaded file into a table.
pub trait SpreadsheetLoader {
    fn load(&self, file_name: &str, bytes: &[u8]) -> DashResult<SurveyTable>;
}

/// Reads the first worksheet of xlsx and xls workbooks.
#[derive(Debug, Clone, Default)]
pub struct CalamineLoader {}

impl SpreadsheetLoader for CalamineLoader {
    fn load(&self, file_name: &str, bytes: &[u8]) -> DashResult<SurveyTable> {
        check_extension(file_name)?;
        read_survey_bytes(bytes.to_vec())
    }
}

fn check_extension(file_name: &str) -> DashResult<()> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext {
        Some(e) if SPREADSHEET_EXTENSIONS.contains(&e.as_str()) => Ok(()),
        _ => UnknownSpreadsheetFormatSnafu { file_name }.fail(),
    }
}

pub fn read_survey_bytes(bytes: Vec<u8>) -> DashResult<SurveyTable> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).context(OpeningSpreadsheetSnafu {})?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyWorkbookSnafu {})?
        .context(OpeningSpreadsheetSnafu {})?;
    debug!("read_survey_bytes: range size: {:?}", wrange.get_size());
    let mut table = table_from_rows(wrange.rows())?;
    for name in DATE_COLUMNS.iter() {
        if let Some(failures) = table.coerce_date_column(name) {
            if failures > 0 {
                warn!(
                    "read_survey_bytes: {} entries of {:?} are not dates and are ignored",
                    failures, name
                );
            }
        }
    }
    info!(
        "read_survey_bytes: {} responses, {} questions",
        table.num_rows(),
        table.num_columns()
    );
    Ok(table)
}

/// Builds the table from the rows of a worksheet. The first row is the header.
fn table_from_rows<'a, I>(mut rows: I) -> DashResult<SurveyTable>
where
    I: Iterator<Item = &'a [Data]>,
{
    let header_row = rows.next().context(EmptyWorkbookSnafu {})?;
    let header: Vec<Option<String>> = header_row.iter().map(|c| cell_from_data(c).key()).collect();
    debug!("table_from_rows: header: {:?}", header);
    let data: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    Ok(SurveyTable::from_rows(&header, data))
}

fn cell_from_data(cell: &Data) -> Cell {
    match cell {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) if s.trim().is_empty() => Cell::Missing,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) if dt.is_datetime() => {
            dt.as_datetime().map(Cell::Date).unwrap_or(Cell::Missing)
        }
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) => parse_date(s)
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => {
            debug!("cell_from_data: error cell {:?}", e);
            Cell::Missing
        }
        Data::Empty => Cell::Missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};
    use survey_report::schema::{AGE, CREATION_DATE};

    fn s(x: &str) -> Data {
        Data::String(x.to_string())
    }

    #[test]
    fn extensions() {
        assert!(check_extension("dados.xlsx").is_ok());
        assert!(check_extension("DADOS.XLS").is_ok());
        assert!(matches!(
            check_extension("dados.csv"),
            Err(DashError::UnknownSpreadsheetFormat { .. })
        ));
        assert!(check_extension("dados").is_err());
    }

    #[test]
    fn garbage_is_an_error() {
        let res = read_survey_bytes(b"this is not a workbook".to_vec());
        assert!(matches!(res, Err(DashError::OpeningSpreadsheet { .. })));
        let res = CalamineLoader {}.load("dados.xlsx", &[]);
        assert!(res.is_err());
    }

    #[test]
    fn cells() {
        assert_eq!(cell_from_data(&Data::Int(21)), Cell::Number(21.0));
        assert_eq!(cell_from_data(&s("  ")), Cell::Missing);
        assert_eq!(cell_from_data(&s("Sim")), Cell::Text("Sim".to_string()));
        assert_eq!(cell_from_data(&Data::Empty), Cell::Missing);
        let d = cell_from_data(&Data::DateTime(ExcelDateTime::new(
            44927.0,
            ExcelDateTimeType::DateTime,
            false,
        )));
        assert_eq!(
            d.as_date().map(|d| d.format("%Y-%m-%d").to_string()),
            Some("2023-01-01".to_string())
        );
        let iso = cell_from_data(&s("2023-01-01"));
        assert!(iso.is_text());
        let iso = cell_from_data(&Data::DateTimeIso("2023-01-01T10:00:00".to_string()));
        assert!(iso.as_date().is_some());
    }

    #[test]
    fn rows_to_table() {
        let rows: Vec<Vec<Data>> = vec![
            vec![s(AGE), Data::Empty, s(CREATION_DATE)],
            vec![Data::Float(20.0), s("x"), Data::Float(44927.0)],
            vec![Data::Int(22), Data::Empty, s("garbage")],
        ];
        let table = table_from_rows(rows.iter().map(|r| r.as_slice())).unwrap();
        assert_eq!(table.column_names(), vec![AGE, "Unnamed: 1", CREATION_DATE]);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.column(AGE).unwrap().mean(), Some(21.0));
    }

    #[test]
    fn loads_a_workbook() {
        use rust_xlsxwriter::{Format, Workbook};
        use survey_report::{kpi_tiles, likert_columns};

        let mut workbook = Workbook::new();
        let date = Format::new().set_num_format("dd/mm/yyyy");
        let sheet = workbook.add_worksheet();
        for (col, name) in [CREATION_DATE, AGE, "q", "q"].iter().enumerate() {
            sheet.write_string(0, col as u16, *name).unwrap();
        }
        // 2023-03-15, no date, 2022-11-02
        sheet.write_number_with_format(1, 0, 45000.0, &date).unwrap();
        sheet.write_number_with_format(3, 0, 44867.0, &date).unwrap();
        for row in 1..=3u32 {
            sheet.write_number(row, 1, 18.0 + row as f64).unwrap();
            sheet.write_string(row, 2, "5 - Concordo Totalmente").unwrap();
            sheet.write_string(row, 3, "Sim").unwrap();
        }
        let bytes = workbook.save_to_buffer().unwrap();

        let table = CalamineLoader {}.load("respostas.xlsx", &bytes).unwrap();
        assert_eq!(table.column_names(), vec![CREATION_DATE, AGE, "q", "q.1"]);
        assert_eq!(table.num_rows(), 3);
        let dates: Vec<Option<String>> = table
            .column(CREATION_DATE)
            .unwrap()
            .cells
            .iter()
            .map(|c| c.as_date().map(|d| d.format("%Y-%m-%d").to_string()))
            .collect();
        assert_eq!(
            dates,
            vec![
                Some("2023-03-15".to_string()),
                None,
                Some("2022-11-02".to_string())
            ]
        );
        let period = kpi_tiles(&table)
            .into_iter()
            .find(|k| k.label == "Período")
            .map(|k| k.value);
        assert_eq!(period.as_deref(), Some("11/2022 - 03/2023"));
        assert_eq!(likert_columns(&table), vec!["q".to_string()]);

        // Same bytes under another extension.
        assert!(matches!(
            CalamineLoader {}.load("respostas.txt", &bytes),
            Err(DashError::UnknownSpreadsheetFormat { .. })
        ));
    }

    #[test]
    fn renamed_text_file_is_rejected() {
        let res = CalamineLoader {}.load("respostas.xlsx", b"IDADE;CURSO\n20;Engenharia\n");
        match res {
            Err(e @ DashError::OpeningSpreadsheet { .. }) => {
                assert!(e.to_string().starts_with("could not read the spreadsheet: "))
            }
            other => panic!("unexpected result {:?}", other.map(|t| t.num_rows())),
        }
    }

    #[test]
    fn no_rows() {
        let rows: Vec<Vec<Data>> = vec![];
        assert!(matches!(
            table_from_rows(rows.iter().map(|r| r.as_slice())),
            Err(DashError::EmptyWorkbook {})
        ));
    }
}
