//! The questions of the CEFET-MG survey, as they appear in the header of the exported
//! spreadsheet. The lookups are exact: a column whose text differs by one character
//! is treated as absent.

// ********* Metadata **********

pub const CREATION_DATE: &str = "DATA CRIAÇÃO";
pub const DATE_MODIFIED: &str = "date_modified";
pub const ENROLLMENT_DATE: &str = "Quando você ingressou na graduação?";
pub const AGE: &str = "IDADE";
pub const COURSE: &str = "CURSO DE GRADUAÇÃO OF";

/// The columns holding dates. They are converted when the file is loaded.
pub const DATE_COLUMNS: [&str; 3] = [CREATION_DATE, DATE_MODIFIED, ENROLLMENT_DATE];

// ********* Overview **********

pub const TEACHING_MODELS: &str = "Qual(is) o(s) tipos de modelos de ensino você já vivenciou na sua Instituição de Ensino Superior?";

// ********* Entrepreneurship **********

pub const ENTREPRENEURSHIP_STATEMENTS: [&str; 3] = [
    "\"O modelo/metodologia de ensino da minha Instituição de Ensino Superior contribui para que eu desenvolva postura empreendedora.\"",
    "\"A matriz curricular do curso contribui para o desenvolvimento da minha postura empreendedora.\"",
    "\"A minha Instituição de Ensino Superior oferece uma matriz curricular flexível para que eu possa me engajar em atividades extra-curriculares.\"",
];

pub const ENTREPRENEURSHIP_IS_OWN_BUSINESS: &str = "O que você entende como empreendedorismo?Empreendedorismo é abrir o próprio negócio (empresa)";
pub const COMPANY_PARTNER: &str = "Você é sócio(a) ou fundador(a) de alguma empresa?Response";

// ********* Students **********

pub const STUDENT_TRAITS_PATTERN: &str =
    "O quanto as seguintes características estão presentes nos(as) ALUNOS(AS)";
pub const PROJECTS: &str =
    "Ao longo da sua graduação, quais projetos você já participou ou participa?";

// ********* Infrastructure **********

pub const INFRASTRUCTURE_PATTERN: &str =
    "Como você avalia a qualidade da infraestrutura oferecida";
pub const UNKNOWN_OPTION_PATTERN: &str = "Caso não saiba";
pub const ACCESSIBILITY_PATTERN: &str = "destinada à pessoas com deficiência";

/// At most this many infrastructure questions are charted.
pub const MAX_INFRASTRUCTURE_ITEMS: usize = 8;
/// At most this many accessibility questions are charted.
pub const MAX_ACCESSIBILITY_ITEMS: usize = 7;

pub const INTERNET_AVAILABILITY: &str = "Como você avalia a qualidade da internet oferecida pela sua Instituição de Ensino Superior? (no ambiente presencial)Caso não saiba avaliar algum deles (seja por desconhecer ou por não ter experienciado ensino presencial), marcar a opção \"Não observado\"Disponibilidade de acesso a internet (Wi-Fi e/ou por cabo)";
pub const INTERNET_SPEED: &str = "Como você avalia a qualidade da internet oferecida pela sua Instituição de Ensino Superior? (no ambiente presencial)Caso não saiba avaliar algum deles (seja por desconhecer ou por não ter experienciado ensino presencial), marcar a opção \"Não observado\"Velocidade do acesso sem fio (Wi-Fi)";

// ********* Retention **********

pub const PERMANENCE_REASONS: &str =
    "Quais motivos você considera que te fazem permanecer na sua Instituição de Ensino Superior?";
pub const EVASION_REASONS: &str = "Quais motivos você considera que te fariam deixar (sair/transferir) a sua Instituição de Ensino Superior?";
pub const PROFESSOR_TRAITS_PATTERN: &str =
    "O quanto as seguintes características estão presentes nos(as) PROFESSORES(AS)";

/// The short label of a question: the text after its last question mark.
pub fn after_last_question_mark(column: &str) -> &str {
    column.rsplit('?').next().unwrap_or(column)
}

/// The short label of a professor trait: the text after the last double quote, or
/// after the last question mark if the question has no quote.
pub fn professor_trait_label(column: &str) -> &str {
    if column.contains('"') {
        column.rsplit('"').next().unwrap_or(column)
    } else {
        after_last_question_mark(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(
            after_last_question_mark("Como você avalia?Salas de aula"),
            "Salas de aula"
        );
        assert_eq!(after_last_question_mark("Sem pergunta"), "Sem pergunta");
        assert_eq!(after_last_question_mark("Termina em?"), "");
        assert_eq!(
            professor_trait_label("PROFESSORES(AS)? marcar \"Não observado\"Didática"),
            "Didática"
        );
        assert_eq!(professor_trait_label("PROFESSORES(AS)?Ética"), "Ética");
    }
}
