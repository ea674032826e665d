/*!

This is the long-form manual for `survey_report` and `cefetdash`.

## Input

One Excel workbook (`.xlsx` or `.xls`), exported from the survey platform. Only the first
worksheet is read. Its first row holds the questions, one per column; every following row
is one respondent.

The questions are looked up by their exact text (see [crate::schema]). A column whose
question is not found is not an error: the panels that depend on it are left empty and
the summary statistics show `N/A`.

Three columns hold dates: `DATA CRIAÇÃO`, `date_modified` and the enrollment question.
Their cells are converted when the file is loaded: Excel dates, serial day numbers and
the usual text formats (`2023-03-15`, `15/03/2023`, `03/2023`...) are understood, and
anything else becomes empty.

## Agreement scales

Most questions are answered on a 5-point agreement scale, with answers written as
`"<n> - <label>"`:

| value | label                     | color  |
|-------|---------------------------|--------|
| 1     | Discordo Totalmente       | red    |
| 2     | Discordo Parcialmente     | orange |
| 3     | Neutro                    | yellow |
| 4     | Concordo Parcialmente     | light blue |
| 5     | Concordo Totalmente       | green  |

Other answers (`Não observado`, blanks) are ignored by the charts.

A column is detected as an agreement-scale question if one of its first 100 answers
contains `CONCORDO` or `DISCORDO`, in any case. `cefetdash --list-likert` prints the
detected columns.

## Quality ratings

The infrastructure and accessibility questions are answered with `Excelente`, `Boa`,
`Razoável`, `Ruim` or `Péssima`. They are shown in one stacked bar chart per group, with
the end of the question (after its last `?`, at most 30 characters) on the x axis.

## The dashboard

Four summary statistics: the number of responses, the mean age, the number of courses and
the collection period. Then five tabs:

- `📊 Visão Geral`: the 15 courses with the most responses, the ages and the teaching
  models experienced.
- `🎯 Empreendedorismo`: the three statements about entrepreneurship and two yes/no
  questions.
- `👥 Perfil dos Alunos`: the student traits (one at a time, chosen in a dropdown) and the
  10 most common projects.
- `🏢 Infraestrutura`: the infrastructure (first 8 items), accessibility (first 7 items)
  and internet quality.
- `📈 Análises Detalhadas`: the 10 most common reasons to stay and to leave, the
  professor traits and the raw data, with its CSV export.

## Page settings

The page metadata can be changed with a JSON file passed with `--config`. All the fields
are optional:

```json
{
  "pageTitle": "Dashboard CEFET-MG",
  "pageIcon": "🎓",
  "layout": "wide",
  "initialSidebarState": "expanded",
  "headerTitle": "🎓 Dashboard CEFET-MG",
  "headerSubtitle": "Análise de Dados de Pesquisa Institucional",
  "footer": "Dashboard CEFET-MG",
  "csvFileName": "dados_cefet_mg.csv"
}
```

*/
