use legacy_lens_core::contract::{LlmError, MockLlmClient};
use legacy_lens_core::features::{
    analyze_components, analyze_database, ask_question, explain_item, generate_brd,
    generate_diagram, generate_pseudo_code, DiagramKind, FeatureError, ItemKind, BRD_SECTIONS,
};
use legacy_lens_core::ingest::IngestionResult;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn ingested() -> IngestionResult {
    IngestionResult {
        corpus: "/********* /PAYROLL.cbl *********/\nMOVE GROSS TO NET.".to_string(),
        ..IngestionResult::default()
    }
}

#[tokio::test]
async fn test_features_refuse_to_run_without_a_corpus() {
    let client = MockLlmClient::new();
    let err = ask_question(&client, &IngestionResult::default(), "What?")
        .await
        .unwrap_err();
    assert!(matches!(err, FeatureError::NoCorpus));
}

#[tokio::test]
async fn test_ask_question_rejects_blank_question_before_calling() {
    let mut client = MockLlmClient::new();
    client.expect_complete().never();
    let err = ask_question(&client, &ingested(), "   ").await.unwrap_err();
    assert!(matches!(err, FeatureError::EmptyQuestion));
}

#[tokio::test]
async fn test_ask_question_sends_corpus_and_strips_fences() {
    let mut client = MockLlmClient::new();
    client
        .expect_complete()
        .withf(|system, user| {
            system.contains("expert on code functionality")
                && user.contains("MOVE GROSS TO NET.")
                && user.contains("Question:\nWhat does it compute?")
        })
        .times(1)
        .returning(|_, _| Ok("```text\nNet pay.\n```".to_string()));

    let answer = ask_question(&client, &ingested(), " What does it compute? ")
        .await
        .unwrap();
    assert_eq!(answer, "Net pay.");
}

#[tokio::test]
async fn test_analyze_components_parses_fenced_json() {
    let mut client = MockLlmClient::new();
    client.expect_complete().returning(|_, _| {
        Ok("```json\n{\"entities\": [\"EMPLOYEE\"], \"functions\": [\"CALC-NET()\"]}\n```".to_string())
    });

    let analysis = analyze_components(&client, &ingested()).await.unwrap();
    assert_eq!(analysis.entities, vec!["EMPLOYEE"]);
    assert_eq!(analysis.functions, vec!["CALC-NET()"]);
}

#[tokio::test]
async fn test_analyze_components_rejects_incomplete_json() {
    let mut client = MockLlmClient::new();
    client
        .expect_complete()
        .returning(|_, _| Ok("{\"entities\": []}".to_string()));
    let err = analyze_components(&client, &ingested()).await.unwrap_err();
    assert!(matches!(err, FeatureError::InvalidResponse(_)));

    let mut client = MockLlmClient::new();
    client
        .expect_complete()
        .returning(|_, _| Ok("not json at all".to_string()));
    let err = analyze_components(&client, &ingested()).await.unwrap_err();
    assert!(matches!(err, FeatureError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_explain_item_names_the_item_and_kind() {
    let mut client = MockLlmClient::new();
    client
        .expect_complete()
        .withf(|_, user| user.contains("ITEM: CALC-NET (type: function)"))
        .returning(|_, _| Ok("  Computes net pay.  ".to_string()));
    let text = explain_item(&client, &ingested(), "CALC-NET", ItemKind::Function)
        .await
        .unwrap();
    assert_eq!(text, "Computes net pay.");
}

#[tokio::test]
async fn test_empty_model_output_is_an_error() {
    let mut client = MockLlmClient::new();
    client
        .expect_complete()
        .returning(|_, _| Ok("   ".to_string()));
    let err = generate_pseudo_code(&client, &ingested()).await.unwrap_err();
    assert!(matches!(err, FeatureError::EmptyResponse));
}

#[tokio::test]
async fn test_llm_errors_are_surfaced_per_feature() {
    let mut client = MockLlmClient::new();
    client
        .expect_complete()
        .returning(|_, _| Err(LlmError::Api("quota exceeded".to_string())));
    let err = analyze_database(&client, &ingested()).await.unwrap_err();
    assert!(matches!(err, FeatureError::Llm(LlmError::Api(_))));
    assert!(err.to_string().contains("quota exceeded"));
}

#[tokio::test]
async fn test_brd_generates_every_section_and_isolates_failures() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let mut client = MockLlmClient::new();
    client
        .expect_complete()
        .times(BRD_SECTIONS.len())
        .returning(move |_, user| {
            counter.fetch_add(1, Ordering::SeqCst);
            if user.contains("\"Constraints\" section") {
                Err(LlmError::Transport("connection reset".to_string()))
            } else {
                Ok("<h2 style=\"color:red\">Section</h2>".to_string())
            }
        });

    let sections = generate_brd(&client, &ingested()).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), BRD_SECTIONS.len());
    assert_eq!(sections.len(), BRD_SECTIONS.len());
    assert_eq!(sections[0].title, "Introduction");

    for section in &sections {
        if section.title == "Constraints" {
            assert!(section.html.is_err());
        } else {
            assert_eq!(section.html.as_deref().unwrap(), "<h2>Section</h2>");
        }
    }
}

#[tokio::test]
async fn test_diagram_prompt_follows_kind() {
    let mut client = MockLlmClient::new();
    client
        .expect_complete()
        .withf(|system, user| {
            system.ends_with("Generate a Mermaid dfd diagram.")
                && user.contains("Generate a Mermaid Data Flow diagram")
        })
        .returning(|_, _| Ok("```mermaid\nflowchart LR\n  A-->B\n```".to_string()));
    let source = generate_diagram(&client, &ingested(), DiagramKind::DataFlow)
        .await
        .unwrap();
    assert_eq!(source, "flowchart LR\n  A-->B");
}
