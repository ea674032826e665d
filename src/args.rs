use clap::Parser;

/// This is the reporting dashboard of the CEFET-MG institutional survey.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The Excel file (.xlsx or .xls) containing the survey answers. If not
    /// provided, the welcome page is produced.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path, 'stdout' or empty) The location of the generated HTML page. Defaults to
    /// dashboard.html.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, optional) A JSON file with the page settings (title, icon, layout, header,
    /// footer, name of the CSV export). See the manual for the fields.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (column name, optional) The student trait initially selected. Defaults to the first one.
    #[clap(long, value_parser)]
    pub student_trait: Option<String>,

    /// (column name, optional) The professor trait initially selected. Defaults to the first one.
    #[clap(long, value_parser)]
    pub professor_trait: Option<String>,

    /// Shows the raw data in the page and writes the CSV export next to it.
    #[clap(long, takes_value = false)]
    pub show_raw_data: bool,

    /// (file path, optional) Writes the CSV export of the data to this location.
    #[clap(long, value_parser)]
    pub csv_out: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the view model of the dashboard is written
    /// in JSON format to the given location.
    #[clap(long, value_parser)]
    pub json_out: Option<String>,

    /// Prints the columns detected as agreement-scale questions, one per line.
    #[clap(long, takes_value = false)]
    pub list_likert: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
