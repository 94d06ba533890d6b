use qscale_core::models::answer_sheet::{Answer, AnswerSheet, AnswerValue};
use qscale_core::models::questionnaire::Questionnaire;
use qscale_store::{AnswerSheetStore, MemoryStore, QuestionnaireProvider, StoreError};

fn questionnaire(version: &str, title: &str) -> Questionnaire {
    Questionnaire {
        code: "PHQ9".to_string(),
        version: version.to_string(),
        title: title.to_string(),
        questions: Vec::new(),
    }
}

fn sheet() -> AnswerSheet {
    AnswerSheet {
        id: 11,
        questionnaire_code: "PHQ9".to_string(),
        questionnaire_version: "1.0".to_string(),
        title: String::new(),
        score: 0.0,
        answers: vec![
            Answer {
                question_code: "Q1".to_string(),
                question_type: "radio".to_string(),
                value: AnswerValue::Text("A".to_string()),
                score: None,
            },
            Answer {
                question_code: "Q2".to_string(),
                question_type: "text".to_string(),
                value: AnswerValue::Text("free text".to_string()),
                score: None,
            },
        ],
    }
}

#[tokio::test]
async fn questionnaire_version_then_latest() {
    let store = MemoryStore::new();
    store.insert_questionnaire(questionnaire("1.0", "first")).await;
    store.insert_questionnaire(questionnaire("2.0", "second")).await;

    let exact = store.get_questionnaire("PHQ9", "1.0").await.unwrap();
    assert_eq!(exact.title, "first");

    let latest = store.get_questionnaire("PHQ9", "").await.unwrap();
    assert_eq!(latest.title, "second");

    let fallback = store.get_questionnaire("PHQ9", "9.9").await.unwrap();
    assert_eq!(fallback.title, "second");

    let err = store.get_questionnaire("GAD7", "").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn saving_scores_updates_matching_answers() {
    let store = MemoryStore::new();
    store.insert_answer_sheet(sheet()).await;

    let mut scored = sheet().answers;
    scored[0].score = Some(3.0);
    store.save_answer_sheet_scores(11, 3.0, &scored).await.unwrap();

    let stored = store.answer_sheet(11).await.unwrap();
    assert_eq!(stored.score, 3.0);
    assert_eq!(stored.answers[0].score, Some(3.0));
    assert_eq!(stored.answers[1].score, None);
}

#[tokio::test]
async fn missing_answer_sheet_is_not_found() {
    let store = MemoryStore::new();
    let err = store.get_answer_sheet(1).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: "answer sheet", .. }));

    let err = store.save_answer_sheet_scores(1, 0.0, &[]).await.unwrap_err();
    assert!(err.is_not_found());
}
