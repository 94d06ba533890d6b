//! Store key/path conventions.
//!
//! Pure string functions. These define the canonical layout of documents
//! in a qscale data directory.

pub fn questionnaire(code: &str) -> String {
    format!("questionnaires/{code}.json")
}

pub fn questionnaire_version(code: &str, version: &str) -> String {
    format!("questionnaires/{code}/{version}.json")
}

pub fn answer_sheet(id: u64) -> String {
    format!("answersheets/{id}.json")
}

pub fn medical_scale_by_questionnaire(questionnaire_code: &str) -> String {
    format!("medical-scales/by-questionnaire/{questionnaire_code}.json")
}

pub fn interpret_report(id: u64) -> String {
    format!("interpret-reports/{id}.json")
}

/// Codes become path segments, so only a conservative character set is
/// accepted.
pub fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
