//! Integration tests for the annotation-to-dataset pipeline.

use dew_gen::{
    AnswerValue, DatasetGenerator, ErrorHandling, GenerationOptions, combine_yaml_dir,
    load_templates,
};

use crate::common::TestHarness;

#[tokio::test]
async fn test_generate_from_annotation_folder() {
    let harness = TestHarness::with_annotations();
    let combined = harness.annotations_dir().join("out/problems_definition.json");

    let templates = load_templates(harness.annotations_dir(), Some(&combined))
        .await
        .expect("annotations load");
    assert_eq!(templates.len(), 2);
    assert!(combined.is_file(), "intermediate problems file is written");

    let options = GenerationOptions::default().with_seed(2024).with_variations(3);
    let (entries, stats) = DatasetGenerator::new(&harness.library, &harness.graph, &harness.catalog)
        .generate(&templates, &options)
        .expect("generation succeeds");

    assert_eq!(entries.len(), 6);
    assert_eq!(stats.produced, 6);
    assert_eq!(stats.failed + stats.skipped + stats.restricted_templates, 0);

    let original = &entries[0];
    assert!(original.is_original_version);
    assert_eq!(original.domain_id, "cost_savings");
    assert!(original.problem_id.starts_with("cost_savings_01_"));
    assert_eq!(original.domain, "irrigation system evaluation procedures");
    assert_eq!(original.topics, vec!["cost_savings"]);
    assert_eq!(original.difficulty_level, "hard");
    assert!(original.gold_problem.starts_with("A 120.0 acres farm reduces gross irrigation from 30.0 to 24.0 inches"));

    // 60 ac-ft saved; 600 on fuel plus 1500 on water
    let answer = &original.gold_solution_final_response["TCSPY"];
    assert_eq!(answer.value, AnswerValue::Int(2100));
    assert_eq!(answer.unit, "dollar");
    assert_eq!(original.gold_solution_final_response.len(), 1);

    let steps = &original.gold_solution_reasoning_steps;
    assert_eq!(steps.len(), 4);
    for (i, step) in steps.iter().enumerate() {
        assert!(step.starts_with(&format!("Step #{}: Using equation ", i + 1)), "{step}");
    }
    assert!(steps[3].ends_with("Result: TCSPY = 2100 dollar\n"));

    let mc = &original.multiple_choice_options["TCSPY"];
    assert_eq!(mc.options.len(), 4);
    assert_eq!(mc.options[mc.correct_index].value, AnswerValue::Int(2100));

    let path = original.hint_for_reasoning["solution_path"].as_array().unwrap();
    let targets: Vec<_> = path.iter().map(|s| s["target"].as_str().unwrap()).collect();
    assert_eq!(targets, vec!["AFSPY", "TPCPY", "TWPCPY", "TCSPY"]);
}

#[tokio::test]
async fn test_alternative_phrasing_and_defaults() {
    let harness = TestHarness::with_annotations();
    let templates = load_templates(harness.annotations_dir(), None).await.unwrap();
    let (entries, _) = DatasetGenerator::new(&harness.library, &harness.graph, &harness.catalog)
        .generate(&templates[1..], &GenerationOptions::default().with_seed(1))
        .unwrap();

    let entry = &entries[0];
    assert_eq!(
        entry.gold_problem,
        "Spread 12000.0 dollars of yearly ownership cost over 160.0 acres: what is the cost per acre?"
    );
    assert_eq!(entry.gold_solution_final_response["IOFCPA"].value, AnswerValue::Int(75));
    assert_eq!(entry.multiple_choice_options["IOFCPA"].options.len(), 3);
    assert_eq!(entry.domain, "economic evaluations");
    assert!(entry.topics.is_empty());
}

#[tokio::test]
async fn test_seed_fixes_output() {
    let harness = TestHarness::with_annotations();
    let templates = load_templates(harness.annotations_dir(), None).await.unwrap();
    let generator = DatasetGenerator::new(&harness.library, &harness.graph, &harness.catalog);
    let options = GenerationOptions::default().with_seed(99).with_variations(5);

    let (a, _) = generator.generate(&templates, &options).unwrap();
    let (b, _) = generator.generate(&templates, &options).unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );

    let (c, _) = generator.generate(&templates, &options.clone().with_seed(100)).unwrap();
    assert_ne!(a[0].problem_id, c[0].problem_id);
}

#[tokio::test]
async fn test_collect_keeps_going_past_unsolvable_problems() {
    let harness = TestHarness::with_annotations();
    // No POGIAPY: water saved cannot be computed.
    harness.write_annotation(
        "broken_03.yaml",
        &crate::common::COST_SAVINGS_YAML
            .replace("cost_savings_01", "broken_03")
            .replace(
                "    POGIAPY: {min: 24, max: 24, default_unit: inches, is_constant: true}\n",
                "",
            ),
    );
    let templates = load_templates(harness.annotations_dir(), None).await.unwrap();
    assert_eq!(templates[0].id, "broken_03");

    let options = GenerationOptions::default()
        .with_seed(3)
        .with_variations(2)
        .with_error_handling(ErrorHandling::Collect);
    let (entries, stats) = DatasetGenerator::new(&harness.library, &harness.graph, &harness.catalog)
        .generate(&templates, &options)
        .unwrap();

    assert_eq!(entries.len(), 4);
    assert_eq!(stats.failed, 2);
    assert!(stats.failures.iter().all(|f| f.problem_id.starts_with("broken_03_")));
    assert!(stats.failures[0].message.contains("TCSPY"));
}

#[tokio::test]
async fn test_combine_skips_bad_files() {
    let harness = TestHarness::with_annotations();
    harness.write_annotation("zz_broken.yaml", "- id: [oops\n");
    let combined = combine_yaml_dir(harness.annotations_dir(), None).await.unwrap();
    assert_eq!(combined.problems.len(), 2);
}
