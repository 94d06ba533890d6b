pub mod answer_sheet;
pub mod event;
pub mod medical_scale;
pub mod questionnaire;
pub mod report;
