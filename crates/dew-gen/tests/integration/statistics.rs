//! Integration tests for statistics over generated entries.

use dew_gen::{DatasetGenerator, GenerationOptions, MathQStats, QuestionType, load_templates, summary_table};

use crate::common::TestHarness;

#[tokio::test]
async fn test_stats_over_generated_dataset() {
    let harness = TestHarness::with_annotations();
    let templates = load_templates(harness.annotations_dir(), None).await.unwrap();
    let (entries, _) = DatasetGenerator::new(&harness.library, &harness.graph, &harness.catalog)
        .generate(&templates, &GenerationOptions::default().with_seed(5).with_variations(2))
        .unwrap();

    // Statistics read the dataset the way it is stored on disk.
    let json = serde_json::to_string_pretty(&entries).unwrap();
    let values: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
    let stats = MathQStats::from_entries(&values);

    assert_eq!(stats.total_questions, 4);
    assert_eq!(stats.unique_domains(), 2);
    assert_eq!(stats.domain_counts["economic evaluations"], 2);
    assert_eq!(stats.question_lengths.len(), 4);
    assert_eq!(stats.option_lengths.len(), 4);
    assert_eq!(stats.most_common_question_type(), Some(QuestionType::Other));

    let table = summary_table(&stats, None);
    assert!(table.contains("Mathematical water management"));
    assert!(table.lines().any(|l| l.starts_with("Total Questions") && l.ends_with('4')));
}
