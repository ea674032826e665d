use snafu::prelude::*;

use crate::dash::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Wide,
    Centered,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarState {
    Expanded,
    Collapsed,
}

/// The metadata of the page. Every field may be omitted from the JSON file.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    #[serde(rename = "pageTitle")]
    pub page_title: String,
    #[serde(rename = "pageIcon")]
    pub page_icon: String,
    pub layout: Layout,
    #[serde(rename = "initialSidebarState")]
    pub initial_sidebar_state: SidebarState,
    #[serde(rename = "headerTitle")]
    pub header_title: String,
    #[serde(rename = "headerSubtitle")]
    pub header_subtitle: String,
    pub footer: String,
    #[serde(rename = "csvFileName")]
    pub csv_file_name: String,
}

impl Default for PageSettings {
    fn default() -> Self {
        PageSettings {
            page_title: "Dashboard CEFET-MG".to_string(),
            page_icon: "🎓".to_string(),
            layout: Layout::Wide,
            initial_sidebar_state: SidebarState::Expanded,
            header_title: "🎓 Dashboard CEFET-MG".to_string(),
            header_subtitle: "Análise de Dados de Pesquisa Institucional".to_string(),
            footer: "Dashboard CEFET-MG".to_string(),
            csv_file_name: "dados_cefet_mg.csv".to_string(),
        }
    }
}

pub fn parse_settings(contents: &str) -> DashResult<PageSettings> {
    serde_json::from_str(contents).context(ParsingJsonSnafu {})
}

pub fn read_settings(path: &str) -> DashResult<PageSettings> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_settings: read content: {:?}", contents);
    parse_settings(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_for_missing_fields() {
        let s = parse_settings(r#"{"pageTitle": "Pesquisa 2023", "layout": "centered"}"#).unwrap();
        assert_eq!(s.page_title, "Pesquisa 2023");
        assert_eq!(s.layout, Layout::Centered);
        assert_eq!(s.initial_sidebar_state, SidebarState::Expanded);
        assert_eq!(s.csv_file_name, "dados_cefet_mg.csv");
        assert_eq!(parse_settings("{}").unwrap(), PageSettings::default());
    }

    #[test]
    fn malformed_settings() {
        assert!(matches!(
            parse_settings(r#"{"layout": "sideways"}"#),
            Err(DashError::ParsingJson { .. })
        ));
        assert!(matches!(
            parse_settings("not json"),
            Err(DashError::ParsingJson { .. })
        ));
        assert!(matches!(
            read_settings("/nonexistent/settings.json"),
            Err(DashError::OpeningJson { .. })
        ));
    }
}
