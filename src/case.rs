//! Identifier case conversion.
//!
//! sqlacodegen derives class names from table names by capitalising each
//! underscore-separated part (`note_nlp` → `NoteNlp`), so converting the class
//! name back gives the table identifier used as the description lookup key.

use regex::Regex;
use std::sync::LazyLock;

static CAPITALISED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("valid regex"));

static LOWER_UPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid regex"));

/// Converts an UpperCamelCase identifier to lower_snake_case.
///
/// Acronym runs stay together: `NoteNLP` becomes `note_nlp` and
/// `HTTPServer` becomes `http_server`.
pub fn camel_to_snake(ident: &str) -> String {
    let split = CAPITALISED_WORD.replace_all(ident, "${1}_${2}");
    let split = LOWER_UPPER.replace_all(&split, "${1}_${2}");
    split.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_words() {
        assert_eq!(camel_to_snake("ConditionEra"), "condition_era");
        assert_eq!(camel_to_snake("Person"), "person");
        assert_eq!(camel_to_snake("PayerPlanPeriod"), "payer_plan_period");
    }

    #[test]
    fn test_generator_style_acronyms() {
        // sqlacodegen capitalises only the first letter of each part
        assert_eq!(camel_to_snake("NoteNlp"), "note_nlp");
        assert_eq!(camel_to_snake("CdmSource"), "cdm_source");
    }

    #[test]
    fn test_acronym_runs() {
        assert_eq!(camel_to_snake("NoteNLP"), "note_nlp");
        assert_eq!(camel_to_snake("HTTPServer"), "http_server");
        assert_eq!(camel_to_snake("OMOPCDMModelBase"), "omopcdm_model_base");
    }

    #[test]
    fn test_digits_and_underscores() {
        assert_eq!(camel_to_snake("Table2Name"), "table2_name");
        assert_eq!(camel_to_snake("already_snake"), "already_snake");
        assert_eq!(camel_to_snake(""), "");
    }
}
