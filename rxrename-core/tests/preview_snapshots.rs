use rxrename_core::{
    build_pattern, collect_candidates, plan_renames, render_plan, ApplyReport, ApplyResult,
    Environment, MemoryFs, OutputFormat, OutputFormatter, PlanOptions, PlanResult, Preview,
    RenamePair, RenamePlan, Template,
};

fn sample_plan() -> RenamePlan {
    let fs = MemoryFs::with_files(["a1.txt", "long_name_2.txt", "notes.md"]);
    let pattern = build_pattern(r"(?P<n>\d)\.txt$", false).unwrap();
    let names = ["a1.txt", "long_name_2.txt", "notes.md"];
    let candidates = collect_candidates(&pattern, names, false, &mut Vec::new()).unwrap();

    plan_renames(
        candidates,
        &Template::parse("out/{n:03}.txt").unwrap(),
        &Environment::new(),
        &PlanOptions {
            make_dirs: true,
            ..PlanOptions::default()
        },
        &fs,
        &mut Vec::new(),
    )
    .unwrap()
}

#[test]
fn test_pairs_preview() {
    let output = render_plan(&sample_plan(), Preview::Pairs, false);
    insta::assert_snapshot!(output, @r#"
    mkdir: "out"
    "a1.txt"          => "out/001.txt"
    "long_name_2.txt" => "out/002.txt"
    "#);
}

#[test]
fn test_table_preview_lists_every_pair() {
    let output = render_plan(&sample_plan(), Preview::Table, false);
    assert!(output.starts_with("mkdir: \"out\"\n"));
    for text in ["Source", "Destination", "long_name_2.txt", "out/001.txt"] {
        assert!(output.contains(text), "missing {text:?} in:\n{output}");
    }
}

#[test]
fn test_colored_pairs_preview() {
    let output = render_plan(&sample_plan(), Preview::Pairs, true);
    assert!(output.contains("\u{1b}[32m\"out/001.txt\"\u{1b}[0m"));
}

#[test]
fn test_plan_json() {
    let result = PlanResult {
        dry_run: true,
        plan: sample_plan(),
        warnings: Vec::new(),
        preview: Preview::Pairs,
        use_color: false,
    };
    let json: serde_json::Value =
        serde_json::from_str(&result.format(OutputFormat::Json)).unwrap();

    assert_eq!(json["operation"], "plan");
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["summary"]["renames"], 2);
    assert_eq!(json["directories"][0], "out");
    assert_eq!(json["pairs"][1]["source"], "long_name_2.txt");
}

#[test]
fn test_apply_summary_without_directories() {
    let result = ApplyResult {
        report: ApplyReport {
            directories_created: Vec::new(),
            renamed: vec![RenamePair::new("a", "b")],
            staged: false,
        },
    };
    insta::assert_snapshot!(result.format(OutputFormat::Summary), @"✓ Renamed 1 file");
}
