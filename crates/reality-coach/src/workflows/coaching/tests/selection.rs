use super::common::*;
use crate::workflows::coaching::catalog::QuestionTemplate;
use crate::workflows::coaching::domain::{Bucket, QuestionSource};
use crate::workflows::coaching::selector::{
    self, render_pattern, substitution_context, Selection,
};

#[test]
fn fifo_returns_earliest_unanswered_question() {
    let questions = vec![
        question("sess-a", "q-1", 1, Bucket::Personality, 8),
        question("sess-a", "q-2", 2, Bucket::Daily, 6),
        question("sess-a", "q-3", 3, Bucket::Commitment, 10),
    ];
    let answers = vec![answer("sess-a", "q-1", true)];
    let snapshot = snapshot(session_record("sess-a"), questions, answers);

    let catalog = MemoryCatalog::seeded();
    let directory = MemoryDirectory::seeded();
    match selector::select_next(&snapshot, &catalog, &directory) {
        Selection::Outstanding(question) => assert_eq!(question.order, 2),
        other => panic!("expected outstanding question, got {other:?}"),
    }
}

#[test]
fn priority_walk_targets_first_bucket_without_an_answer() {
    let questions = vec![question("sess-a", "q-1", 1, Bucket::Personality, 8)];
    let answers = vec![answer("sess-a", "q-1", true)];
    let snapshot = snapshot(session_record("sess-a"), questions, answers);

    let catalog = MemoryCatalog::seeded();
    let directory = MemoryDirectory::seeded();
    match selector::select_next(&snapshot, &catalog, &directory) {
        Selection::Draft(draft) => {
            assert_eq!(draft.bucket, Bucket::Daily);
            assert_eq!(draft.source, QuestionSource::Generated);
        }
        other => panic!("expected draft, got {other:?}"),
    }
}

#[test]
fn priority_walk_defaults_to_personality_when_every_bucket_answered() {
    let questions: Vec<_> = Bucket::PRIORITY
        .into_iter()
        .enumerate()
        .map(|(index, bucket)| {
            question(
                "sess-a",
                &format!("q-{}", index + 1),
                (index + 1) as u32,
                bucket,
                5,
            )
        })
        .collect();
    let answers: Vec<_> = (1..=6)
        .map(|index| answer("sess-a", &format!("q-{index}"), true))
        .collect();
    let snapshot = snapshot(session_record("sess-a"), questions, answers);

    let catalog = MemoryCatalog::seeded();
    let directory = MemoryDirectory::seeded();
    match selector::select_next(&snapshot, &catalog, &directory) {
        Selection::Draft(draft) => assert_eq!(draft.bucket, Bucket::Personality),
        other => panic!("expected draft, got {other:?}"),
    }
}

#[test]
fn heaviest_active_template_wins_and_first_found_keeps_ties() {
    let catalog = MemoryCatalog::with(vec![
        QuestionTemplate {
            bucket: Bucket::Personality,
            pattern: "lighter".to_string(),
            weight: 6,
            is_active: true,
        },
        QuestionTemplate {
            bucket: Bucket::Personality,
            pattern: "first heavy".to_string(),
            weight: 8,
            is_active: true,
        },
        QuestionTemplate {
            bucket: Bucket::Personality,
            pattern: "second heavy".to_string(),
            weight: 8,
            is_active: true,
        },
        QuestionTemplate {
            bucket: Bucket::Personality,
            pattern: "inactive heavyweight".to_string(),
            weight: 10,
            is_active: false,
        },
    ]);
    let snapshot = snapshot(session_record("sess-a"), Vec::new(), Vec::new());
    let directory = MemoryDirectory::seeded();

    match selector::select_next(&snapshot, &catalog, &directory) {
        Selection::Draft(draft) => {
            assert_eq!(draft.weight, 8);
            assert_eq!(draft.text, "first heavy");
        }
        other => panic!("expected draft, got {other:?}"),
    }
}

#[test]
fn empty_catalog_falls_back_to_generic_commitment_question() {
    let snapshot = snapshot(session_record("sess-a"), Vec::new(), Vec::new());
    let catalog = MemoryCatalog::empty();
    let directory = MemoryDirectory::seeded();

    match selector::select_next(&snapshot, &catalog, &directory) {
        Selection::Draft(draft) => {
            assert_eq!(draft.bucket, Bucket::Commitment);
            assert_eq!(draft.weight, 7);
            assert!(draft.text.contains("Registered Nurse"));
        }
        other => panic!("expected draft, got {other:?}"),
    }
}

#[test]
fn unavailable_catalog_falls_back_to_generic_commitment_question() {
    let snapshot = snapshot(session_record("sess-a"), Vec::new(), Vec::new());
    let directory = MemoryDirectory::seeded();

    match selector::select_next(&snapshot, &FailingCatalog, &directory) {
        Selection::Draft(draft) => {
            assert_eq!(draft.bucket, Bucket::Commitment);
            assert_eq!(draft.weight, 7);
        }
        other => panic!("expected draft, got {other:?}"),
    }
}

#[test]
fn rendering_resolves_known_placeholders_in_one_pass() {
    let context = substitution_context(&intake(), None);
    let rendered = render_pattern(
        "Are you willing to complete {training_duration} before you can practice in {state}?",
        &context,
    );
    assert_eq!(
        rendered,
        "Are you willing to complete 2-4 years of education and training before you can \
         practice in CA?"
    );
}

#[test]
fn rendering_leaves_unknown_placeholders_verbatim() {
    let context = substitution_context(&intake(), None);
    let rendered = render_pattern("Can you handle {mystery_factor} every day?", &context);
    assert_eq!(rendered, "Can you handle {mystery_factor} every day?");

    let rendered = render_pattern("An unterminated {brace stays put", &context);
    assert_eq!(rendered, "An unterminated {brace stays put");
}

#[test]
fn career_fact_overrides_training_and_cost_defaults() {
    let fact = fixture_fact();
    let context = substitution_context(&intake(), Some(&fact));
    assert_eq!(
        context.get("training_duration").map(String::as_str),
        Some("2-4 years including 800+ clinical hours")
    );
    assert_eq!(
        context.get("financial_commitment").map(String::as_str),
        Some("$18,000-68,000")
    );

    // The other defaults stay intact.
    assert_eq!(
        context.get("routine_task").map(String::as_str),
        Some("routine administrative tasks")
    );
}

#[test]
fn unavailable_directory_degrades_to_default_context() {
    let snapshot = snapshot(session_record("sess-a"), Vec::new(), Vec::new());
    let catalog = MemoryCatalog::with(vec![QuestionTemplate {
        bucket: Bucket::Personality,
        pattern: "Can you commit to {training_duration}?".to_string(),
        weight: 8,
        is_active: true,
    }]);

    match selector::select_next(&snapshot, &catalog, &FailingDirectory) {
        Selection::Draft(draft) => {
            assert_eq!(
                draft.text,
                "Can you commit to 2-4 years of education and training?"
            );
        }
        other => panic!("expected draft, got {other:?}"),
    }
}
