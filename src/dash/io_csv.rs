// Export of the survey table as CSV.

use std::io;

use csv::Writer;

use snafu::prelude::*;

use crate::dash::*;

/// Writes the header and one line per respondent. Missing cells are empty fields.
pub fn write_csv<W: io::Write>(table: &SurveyTable, writer: W) -> DashResult<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(table.column_names())
        .context(CsvExportSnafu {})?;
    for idx in 0..table.num_rows() {
        if let Some(row) = table.row(idx) {
            wtr.write_record(row.iter().map(|c| c.to_string()))
                .context(CsvExportSnafu {})?;
        }
    }
    wtr.flush()
        .map_err(csv::Error::from)
        .context(CsvExportSnafu {})?;
    debug!("write_csv: {} lines", table.num_rows() + 1);
    Ok(())
}
