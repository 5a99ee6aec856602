mod common;

use affinity_quiz::adjuster::LlmAdjuster;
use affinity_quiz::archetypes::{Archetype, ArchetypeCatalog};
use affinity_quiz::clients::{OfflineOracle, OracleError};
use affinity_quiz::pipeline::QuizPipeline;
use affinity_quiz::questions::{AnswerOption, Question, QuestionCatalog};
use affinity_quiz::{
    AffinityError, Dimension, DimensionVector, FreeTextResponse, QuizResult, QuizSubmission,
};
use common::{Reply, ScriptedOracle, reply};
use serde_json::json;

/// `q1: A` adds one emotional depth; a likert 4 on `q2` adds one communication style.
fn stub_questions() -> QuestionCatalog {
    QuestionCatalog::new(vec![
        Question::choice(
            "q1",
            "Pick one",
            vec![
                AnswerOption::new(
                    "A",
                    "A",
                    DimensionVector::zero().with(Dimension::EmotionalDepth, 1.0),
                ),
                AnswerOption::new("B", "B", DimensionVector::zero()),
            ],
        ),
        Question::likert("q2", "Agree?", Dimension::CommunicationStyle, 1.0),
        Question::free_text("ft1", "Tell us more"),
    ])
    .unwrap()
}

fn stub_archetype(id: &str, profile: DimensionVector) -> Archetype {
    Archetype {
        id: id.to_string(),
        name: id.to_string(),
        tagline: String::new(),
        description: String::new(),
        keywords: Vec::new(),
        compatible_with: Vec::new(),
        profile,
    }
}

fn pipeline(catalog: ArchetypeCatalog) -> QuizPipeline {
    QuizPipeline::new(stub_questions(), catalog, LlmAdjuster::default())
}

#[tokio::test]
async fn end_to_end_high_confidence_adjustment() {
    let oracle = ScriptedOracle::new(vec![Reply::Text(reply([
        (2.0, "high"),
        (0.0, "low"),
        (0.0, "low"),
        (0.0, "low"),
    ]))]);
    let p = pipeline(ArchetypeCatalog::builtin());
    let result = p
        .run(
            &json!({"q1": "A", "q2": 4}),
            &[FreeTextResponse::new("Tell us more", "I love long talks.")],
            &oracle,
        )
        .await
        .unwrap();

    assert_eq!(result.base_vector, DimensionVector::new(1.0, 0.0, 0.0, 1.0));
    assert_eq!(result.enhanced_vector.emotional_depth, 3.0);
    assert_eq!(result.enhanced_vector.communication_style, 1.0);
    assert_eq!(result.insights.len(), 4);
    assert_eq!(result.primary_archetype.id, "deep-connector");
    assert!(oracle.prompts()[0].contains("(emotional_depth): 1.00"));
}

#[tokio::test]
async fn total_oracle_failure_still_returns_result() {
    let oracle = ScriptedOracle::new(vec![
        Reply::Fail(OracleError::Http("connection refused".to_string())),
        Reply::Fail(OracleError::Timeout { timeout_ms: 20_000 }),
    ]);
    let p = pipeline(ArchetypeCatalog::builtin());
    let free_text = vec![
        FreeTextResponse::new("a", "b"),
        FreeTextResponse::new("c", "d"),
    ];
    let result = p.run(&json!({"q1": "A"}), &free_text, &oracle).await.unwrap();
    assert_eq!(result.enhanced_vector, result.base_vector);
    assert!(result.insights.is_empty());
}

#[tokio::test]
async fn partial_failure_keeps_first_and_third() {
    let oracle = ScriptedOracle::new(vec![
        Reply::Text(reply([(1.0, "medium"), (0.0, "low"), (0.0, "low"), (0.0, "low")])),
        Reply::Text("```\nnot json\n```".to_string()),
        Reply::Text(reply([(0.0, "low"), (0.0, "low"), (0.0, "low"), (1.0, "medium")])),
    ]);
    let p = pipeline(ArchetypeCatalog::builtin());
    let free_text = vec![
        FreeTextResponse::new("first", "1"),
        FreeTextResponse::new("second", "2"),
        FreeTextResponse::new("third", "3"),
    ];
    let result = p.run(&json!({}), &free_text, &oracle).await.unwrap();

    assert!((result.enhanced_vector.emotional_depth - 0.6).abs() < 1e-12);
    assert!((result.enhanced_vector.communication_style - 0.6).abs() < 1e-12);
    let questions: Vec<&str> = result.insights.iter().map(|i| i.question.as_str()).collect();
    assert_eq!(questions.iter().filter(|q| **q == "first").count(), 4);
    assert_eq!(questions.iter().filter(|q| **q == "third").count(), 4);
    assert!(!questions.contains(&"second"));
}

#[tokio::test]
async fn empty_catalog_never_calls_oracle() {
    let oracle = ScriptedOracle::new(vec![Reply::Text(reply([(1.0, "high"); 4]))]);
    let p = pipeline(ArchetypeCatalog::default());
    let res = p
        .run(&json!({"q1": "A"}), &[FreeTextResponse::new("q", "r")], &oracle)
        .await;
    assert!(matches!(res, Err(AffinityError::EmptyCatalog)));
    assert!(oracle.prompts().is_empty());
}

#[tokio::test]
async fn equidistant_archetypes_keep_catalog_order() {
    let catalog = ArchetypeCatalog::new(vec![
        stub_archetype("north", DimensionVector::new(0.0, 2.0, 0.0, 0.0)),
        stub_archetype("south", DimensionVector::new(0.0, -2.0, 0.0, 0.0)),
    ])
    .unwrap();
    let result = pipeline(catalog)
        .run(&json!({}), &[], &OfflineOracle)
        .await
        .unwrap();
    assert_eq!(result.primary_archetype.id, "north");
    assert_eq!(result.secondary_archetype.map(|a| a.id).as_deref(), Some("south"));
}

#[tokio::test]
async fn single_archetype_has_no_secondary() {
    let catalog =
        ArchetypeCatalog::new(vec![stub_archetype("only", DimensionVector::zero())]).unwrap();
    let result = pipeline(catalog)
        .run(&json!({"q2": 5}), &[], &OfflineOracle)
        .await
        .unwrap();
    assert_eq!(result.primary_archetype.id, "only");
    assert!(result.secondary_archetype.is_none());
    assert_eq!(result.all_matches.len(), 1);
}

#[tokio::test]
async fn submission_derives_free_text_from_answers() {
    let oracle = ScriptedOracle::new(vec![Reply::Text(reply([(0.0, "low"); 4]))]);
    let submission: QuizSubmission =
        serde_json::from_value(json!({"answers": {"q1": "B", "ft1": "  Walks on the beach.  "}}))
            .unwrap();
    let result = pipeline(ArchetypeCatalog::builtin())
        .run_submission(&submission, &oracle)
        .await
        .unwrap();

    assert_eq!(result.insights.len(), 4);
    assert_eq!(result.insights[0].question, "Tell us more");
    assert_eq!(result.insights[0].response, "Walks on the beach.");
    assert!(oracle.prompts()[0].contains("Answer: Walks on the beach."));
}

#[tokio::test]
async fn persisted_result_rematches_to_same_primary() {
    let oracle = ScriptedOracle::new(vec![Reply::Text(reply([
        (0.5, "medium"),
        (-2.0, "high"),
        (0.0, "low"),
        (1.0, "medium"),
    ]))]);
    let catalog = ArchetypeCatalog::builtin();
    let result = pipeline(catalog.clone())
        .run(
            &json!({"q1": "A", "q2": 2}),
            &[FreeTextResponse::new("q", "I travel alone a lot.")],
            &oracle,
        )
        .await
        .unwrap();

    let stored = serde_json::to_string(&result).unwrap();
    assert!(stored.contains("\"enhancedVector\""));
    assert!(stored.contains("\"primaryArchetype\""));
    let restored: QuizResult = serde_json::from_str(&stored).unwrap();
    assert_eq!(restored.id, result.id);
    assert_eq!(restored.insights.len(), result.insights.len());
    assert_eq!(restored.primary_archetype, result.primary_archetype);
    assert_eq!(
        restored.rematch(&catalog).unwrap().archetype.id,
        result.primary_archetype.id
    );
}

#[tokio::test]
async fn huge_adjustments_still_round_trip() {
    let oracle = ScriptedOracle::new(vec![
        Reply::Text(reply([(1.5e308, "high"), (0.0, "low"), (0.0, "low"), (0.0, "low")])),
        Reply::Text(reply([(1.5e308, "high"), (0.0, "low"), (0.0, "low"), (0.0, "low")])),
    ]);
    let result = pipeline(ArchetypeCatalog::builtin())
        .run(
            &json!({}),
            &[
                FreeTextResponse::new("a", "b"),
                FreeTextResponse::new("c", "d"),
            ],
            &oracle,
        )
        .await
        .unwrap();
    assert!(result.enhanced_vector.is_finite());
    assert_eq!(result.insights.len(), 4);

    let stored = serde_json::to_string(&result).unwrap();
    let restored: QuizResult = serde_json::from_str(&stored).unwrap();
    assert!(restored.enhanced_vector.is_finite());
    let ratio = restored.enhanced_vector.emotional_depth / result.enhanced_vector.emotional_depth;
    assert!((ratio - 1.0).abs() < 1e-12);
}
