//! Analysis of the CEFET-MG institutional survey.
//!
//! The survey answers are loaded into a [SurveyTable] (by the `cefetdash` program or any
//! other loader). From the table, this crate computes the frequency counts, detects the
//! agreement-scale questions and builds chart specifications and the view model of the
//! dashboard. It does not render anything and never fails: missing questions simply
//! produce empty panels.
//!
//! ```
//! use survey_report::*;
//!
//! let table = SurveyTable::new(vec![Column::new(
//!     "q",
//!     vec![
//!         Cell::Text("5 - Concordo Totalmente".to_string()),
//!         Cell::Text("2 - Discordo Parcialmente".to_string()),
//!     ],
//! )]);
//! assert_eq!(likert_columns(&table), vec!["q"]);
//! let chart = likert_chart(&table, "q", "Pergunta").unwrap();
//! assert_eq!(chart.total(), 2);
//! ```
//!
//! See the [manual] for the description of the dashboard.

mod charts;
mod dashboard;
mod kpi;
mod likert;
pub mod manual;
pub mod schema;
mod table;

pub use crate::charts::*;
pub use crate::dashboard::*;
pub use crate::kpi::*;
pub use crate::likert::*;
pub use crate::table::*;
