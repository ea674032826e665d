use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;

use crate::dash::io_excel::SpreadsheetLoader;
use crate::dash::*;

pub const LOADED_MESSAGE: &str = "✅ Arquivo carregado com sucesso!";

/// The outcome of the last upload.
#[derive(Debug, Clone)]
enum Upload {
    Loaded {
        file_name: String,
        table: Rc<SurveyTable>,
    },
    Failed {
        message: String,
    },
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct SidebarView {
    pub heading: String,
    pub prompt: String,
    pub help: String,
    pub accepted_types: Vec<String>,
    /// Shown once a file is loaded.
    pub status: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PageView {
    /// No file, or the file could not be loaded.
    Welcome { error: Option<String> },
    Dashboard {
        file_name: String,
        view: DashboardView,
    },
}

/// Everything needed to draw the page once.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct Page {
    pub settings: PageSettings,
    pub sidebar: SidebarView,
    pub body: PageView,
}

/// The state of one user of the dashboard: the uploaded data and the choices made on
/// the page.
///
/// Every interaction is followed by a call to [Session::render], which recomputes the
/// whole page. Only the parsing of the spreadsheet is remembered, keyed by the hash of
/// its content.
pub struct Session<L: SpreadsheetLoader> {
    loader: L,
    settings: PageSettings,
    cache: HashMap<String, Rc<SurveyTable>>,
    upload: Option<Upload>,
    selections: Selections,
    download_link: Option<String>,
}

impl<L: SpreadsheetLoader> Session<L> {
    pub fn new(loader: L, settings: PageSettings) -> Session<L> {
        Session {
            loader,
            settings,
            cache: HashMap::new(),
            upload: None,
            selections: Selections::default(),
            download_link: None,
        }
    }

    /// Loads a file. A failure is kept in the session and shown on the next render.
    pub fn upload(&mut self, file_name: &str, bytes: Vec<u8>) {
        let key = sha256::digest(&bytes);
        let table = match self.cache.get(&key) {
            Some(t) => {
                debug!("upload: {} already loaded ({})", file_name, key);
                Ok(t.clone())
            }
            None => self.loader.load(file_name, &bytes).map(Rc::new),
        };
        self.upload = match table {
            Ok(table) => {
                self.cache.insert(key, table.clone());
                Some(Upload::Loaded {
                    file_name: file_name.to_string(),
                    table,
                })
            }
            Err(e) => {
                warn!("upload: could not load {}: {}", file_name, e);
                Some(Upload::Failed {
                    message: e.to_string(),
                })
            }
        };
    }

    pub fn select_student_trait(&mut self, column: Option<String>) {
        self.selections.student_trait = column;
    }

    pub fn select_professor_trait(&mut self, column: Option<String>) {
        self.selections.professor_trait = column;
    }

    pub fn set_show_raw_data(&mut self, show: bool) {
        self.selections.show_raw_data = show;
    }

    /// Where the page links to the CSV export. Defaults to the file name of the settings.
    pub fn set_download_link(&mut self, link: Option<String>) {
        self.download_link = link;
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    /// The loaded table, if the last upload succeeded.
    pub fn table(&self) -> Option<Rc<SurveyTable>> {
        match &self.upload {
            Some(Upload::Loaded { table, .. }) => Some(table.clone()),
            _ => None,
        }
    }

    pub fn render(&self) -> Page {
        let (status, body) = match &self.upload {
            None => (None, PageView::Welcome { error: None }),
            Some(Upload::Failed { message }) => (
                None,
                PageView::Welcome {
                    error: Some(format!("Erro ao carregar arquivo: {}", message)),
                },
            ),
            Some(Upload::Loaded { file_name, table }) => (
                Some(LOADED_MESSAGE.to_string()),
                PageView::Dashboard {
                    file_name: file_name.clone(),
                    view: build_dashboard(
                        table,
                        &self.selections,
                        self.download_link
                            .as_deref()
                            .unwrap_or(&self.settings.csv_file_name),
                    ),
                },
            ),
        };
        Page {
            settings: self.settings.clone(),
            sidebar: SidebarView {
                heading: "📁 Upload de Dados".to_string(),
                prompt: "Selecione o arquivo Excel".to_string(),
                help: "Faça upload do arquivo de dados do CEFET-MG".to_string(),
                accepted_types: vec!["xlsx".to_string(), "xls".to_string()],
                status,
            },
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell as Counter;
    use survey_report::schema::{AGE, COURSE};

    /// Accepts anything but "bad" and counts the parses.
    struct CountingLoader {
        parses: Rc<Counter<usize>>,
    }

    impl SpreadsheetLoader for CountingLoader {
        fn load(&self, _file_name: &str, bytes: &[u8]) -> DashResult<SurveyTable> {
            self.parses.set(self.parses.get() + 1);
            if bytes == b"bad" {
                return EmptyWorkbookSnafu {}.fail();
            }
            Ok(SurveyTable::new(vec![Column::new(
                COURSE,
                vec![
                    Cell::Text(String::from_utf8_lossy(bytes).to_string()),
                    Cell::Text("Física".to_string()),
                ],
            )]))
        }
    }

    fn session() -> (Session<CountingLoader>, Rc<Counter<usize>>) {
        let parses = Rc::new(Counter::new(0));
        let loader = CountingLoader {
            parses: parses.clone(),
        };
        (Session::new(loader, PageSettings::default()), parses)
    }

    fn kpi(page: &Page, label: &str) -> String {
        match &page.body {
            PageView::Dashboard { view, .. } => view
                .kpis
                .iter()
                .find(|k| k.label == label)
                .map(|k| k.value.clone())
                .unwrap(),
            other => panic!("no dashboard: {:?}", other),
        }
    }

    #[test]
    fn welcome_without_file() {
        let (s, _) = session();
        let page = s.render();
        assert_eq!(page.body, PageView::Welcome { error: None });
        assert_eq!(page.sidebar.status, None);
        assert!(s.table().is_none());
    }

    #[test]
    fn load_is_memoized() {
        let (mut s, parses) = session();
        s.upload("a.xlsx", b"Engenharia".to_vec());
        s.upload("a.xlsx", b"Engenharia".to_vec());
        assert_eq!(parses.get(), 1);
        s.upload("b.xlsx", b"Direito".to_vec());
        assert_eq!(parses.get(), 2);
        s.upload("a.xlsx", b"Engenharia".to_vec());
        assert_eq!(parses.get(), 2);

        // Rendering does not parse again.
        s.set_show_raw_data(true);
        let page = s.render();
        assert_eq!(parses.get(), 2);
        assert_eq!(page.sidebar.status.as_deref(), Some(LOADED_MESSAGE));
        assert_eq!(kpi(&page, "Cursos Diferentes"), "2");
    }

    #[test]
    fn failed_load_shows_welcome() {
        let (mut s, parses) = session();
        s.upload("a.xlsx", b"Engenharia".to_vec());
        s.upload("broken.xlsx", b"bad".to_vec());
        match s.render().body {
            PageView::Welcome { error: Some(e) } => {
                assert!(e.starts_with("Erro ao carregar arquivo: "))
            }
            other => panic!("unexpected page {:?}", other),
        }
        assert!(s.table().is_none());
        // Failures are not remembered.
        s.upload("broken.xlsx", b"bad".to_vec());
        assert_eq!(parses.get(), 3);
    }

    #[test]
    fn missing_age_is_not_available() {
        let (mut s, _) = session();
        s.upload("a.xlsx", b"Engenharia".to_vec());
        let page = s.render();
        assert!(s.table().map(|t| !t.has_column(AGE)).unwrap_or(false));
        assert_eq!(kpi(&page, "Idade Média"), "N/A");
        assert_eq!(kpi(&page, "Total de Respostas"), "2");
    }

    fn download_file_name(page: &Page) -> Option<String> {
        match &page.body {
            PageView::Dashboard { view, .. } => view
                .tab("detailed")
                .and_then(|t| {
                    t.items().into_iter().find_map(|i| match i {
                        SectionItem::RawData(r) => Some(r.download_file_name.clone()),
                        _ => None,
                    })
                }),
            _ => None,
        }
    }

    #[test]
    fn download_link_follows_the_export() {
        let (mut s, _) = session();
        s.upload("a.xlsx", b"Engenharia".to_vec());
        s.set_show_raw_data(true);
        assert_eq!(
            download_file_name(&s.render()).as_deref(),
            Some("dados_cefet_mg.csv")
        );
        s.set_download_link(Some("../exports/respostas.csv".to_string()));
        assert_eq!(
            download_file_name(&s.render()).as_deref(),
            Some("../exports/respostas.csv")
        );
    }

    #[test]
    fn selections_are_kept() {
        let (mut s, _) = session();
        s.select_student_trait(Some("x".to_string()));
        s.select_professor_trait(None);
        assert_eq!(s.selections().student_trait.as_deref(), Some("x"));
        assert_eq!(s.selections().professor_trait, None);
    }
}
