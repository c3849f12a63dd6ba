use hotmethod_studio::aggregator::{
    analyze_file, build_trees, format_tree, produce_reports, FilterPolicy, PrefixClassifier,
    TreeBuilder,
};
use hotmethod_studio::parser::{read_samples, DisplayNode, SampleReader};
use hotmethod_studio::utils::error::{MalformedReason, ParseError};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

const PROFILE: &str = "\
start_thread;java.lang.Thread//run;com.example.Worker//loop;com.example.Parser//parse 40
start_thread;java.lang.Thread//run;com.example.Worker//loop;sun.reflect.GeneratedMethodAccessor1//invoke;java.lang.reflect.Method//invoke;com.example.Handler//handle 25
start_thread;java.lang.Thread//run;com.example.Worker//loop;memcpy 10
start_thread;GCTaskThread::run 15
java.lang.Thread//run;com.example.Worker//loop 10
";

fn collapsed_file(content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".collapsed")
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn assert_consistent(node: &DisplayNode) {
    let children_total: u64 = node.children.iter().map(|c| c.value).sum();
    assert!(node.value >= children_total, "node {} overfull", node.name);
    for pair in node.children.windows(2) {
        assert!(pair[0].value >= pair[1].value, "children of {} unsorted", node.name);
    }
    node.children.iter().for_each(assert_consistent);
}

fn child<'a>(node: &'a DisplayNode, name: &str) -> &'a DisplayNode {
    node.children
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("{} has no child {}", node.name, name))
}

#[test]
fn test_conservation_under_identity() {
    let file = collapsed_file(PROFILE);
    let input_total: u64 = read_samples(file.path()).unwrap().iter().map(|s| s.count).sum();

    let trees = build_trees(
        SampleReader::new(PROFILE.as_bytes(), "memory"),
        &PrefixClassifier::default(),
    )
    .unwrap();

    assert_eq!(input_total, 100);
    assert_eq!(trees.identity.self_count_sum(), input_total);
    assert_eq!(trees.identity.total_count(), input_total);
}

#[test]
fn test_filter_monotonicity() {
    let file = collapsed_file(PROFILE);
    let reports = produce_reports(file.path(), &PrefixClassifier::default()).unwrap();

    assert_eq!(reports.identity.value, 100);
    assert_eq!(reports.language.value, 85);
    assert_eq!(reports.compacted.value, 85);
    assert!(reports.compacted.value <= reports.language.value);
    assert!(reports.language.value <= reports.identity.value);

    for (_, report) in reports.iter() {
        assert_eq!(report.name, "root");
        assert_consistent(report);
    }
}

#[test]
fn test_compacted_report_folds_reflection_frames() {
    let file = collapsed_file(PROFILE);
    let reports = produce_reports(file.path(), &PrefixClassifier::default()).unwrap();

    let worker = child(child(&reports.compacted, "java.lang.Thread//run"), "com.example.Worker//loop");
    let accessor = child(worker, "sun.reflect.GeneratedMethodAccessor1//invoke");
    assert_eq!(accessor.value, 25);
    assert_eq!(accessor.children.len(), 1);
    assert_eq!(accessor.children[0].name, "com.example.Handler//handle");

    // Language view keeps both reflection frames
    let worker = child(child(&reports.language, "java.lang.Thread//run"), "com.example.Worker//loop");
    let accessor = child(worker, "sun.reflect.GeneratedMethodAccessor1//invoke");
    assert_eq!(accessor.children[0].name, "java.lang.reflect.Method//invoke");
}

#[test]
fn test_language_view_drops_native_only_samples() {
    let file = collapsed_file(PROFILE);
    let language = analyze_file(
        file.path(),
        FilterPolicy::LanguageOnly,
        &PrefixClassifier::default(),
    )
    .unwrap();

    // start_thread and GC frames are gone; every language path merges under Thread.run
    assert_eq!(language.children.len(), 1);
    assert_eq!(language.children[0].name, "java.lang.Thread//run");
    assert_eq!(language.children[0].value, 85);
}

#[test]
fn test_idempotent_reformat() {
    let trees = build_trees(
        SampleReader::new(PROFILE.as_bytes(), "memory"),
        &PrefixClassifier::default(),
    )
    .unwrap();

    for policy in FilterPolicy::ALL {
        let first = serde_json::to_vec(&format_tree(trees.get(policy))).unwrap();
        let second = serde_json::to_vec(&format_tree(trees.get(policy))).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_round_trip_single_sample() {
    let file = collapsed_file("X;Y 5\n");
    let display = analyze_file(file.path(), FilterPolicy::Identity, &|_: &str| false).unwrap();

    let expected = DisplayNode {
        name: "root".to_string(),
        value: 5,
        children: vec![DisplayNode {
            name: "X".to_string(),
            value: 5,
            children: vec![DisplayNode::new("Y", 5)],
        }],
    };
    assert_eq!(display, expected);

    let mut builder = TreeBuilder::new();
    builder.insert(&["X", "Y"], 5).unwrap();
    let tree = builder.finish().unwrap();
    assert_eq!(tree.find(&["X"]).unwrap().self_count(), 0);
    assert_eq!(tree.find(&["X", "Y"]).unwrap().self_count(), 5);
}

#[test]
fn test_malformed_line_fails_whole_analysis() {
    let file = collapsed_file("a;b 3\nonlyframes_no_count\nc 1\n");
    let err = produce_reports(file.path(), &PrefixClassifier::default()).unwrap_err();

    match err {
        ParseError::MalformedLine {
            line_number,
            line,
            reason,
        } => {
            assert_eq!(line_number, 2);
            assert_eq!(line, "onlyframes_no_count");
            assert_eq!(reason, MalformedReason::MissingCount);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let err = produce_reports("/no/such/file.collapsed", &PrefixClassifier::default()).unwrap_err();
    assert!(matches!(err, ParseError::Io { .. }));
    assert_eq!(err.line_number(), None);
}

#[test]
fn test_no_language_frames_is_empty_not_error() {
    let file = collapsed_file("start_thread;poll 4\nmain;malloc 6\n");
    let reports = produce_reports(file.path(), &PrefixClassifier::default()).unwrap();

    assert_eq!(reports.identity.value, 10);
    assert_eq!(reports.language, DisplayNode::new("root", 0));
    assert_eq!(reports.compacted, DisplayNode::new("root", 0));
}

#[test]
fn test_empty_file_produces_empty_trees() {
    let file = collapsed_file("\n\n");
    let reports = produce_reports(file.path(), &PrefixClassifier::default()).unwrap();

    for (_, report) in reports.iter() {
        assert_eq!(report, &DisplayNode::new("root", 0));
    }
}

#[test]
fn test_analyses_run_concurrently() {
    let file = collapsed_file(PROFILE);
    let path = file.path().to_path_buf();

    let values: Vec<u64> = std::thread::scope(|scope| {
        let handles: Vec<_> = FilterPolicy::ALL
            .into_iter()
            .map(|policy| {
                let path = &path;
                scope.spawn(move || {
                    analyze_file(path, policy, &PrefixClassifier::default())
                        .unwrap()
                        .value
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(values, vec![100, 85, 85]);
}

#[test]
fn test_very_deep_stack_is_reported_in_full() {
    let frames: Vec<String> = (0..100_000).map(|i| format!("p.C{}//m", i)).collect();
    let file = collapsed_file(&format!("{} 1\n", frames.join(";")));

    // Runs on a default-sized test thread
    let reports = produce_reports(file.path(), &PrefixClassifier::default()).unwrap();

    for (_, report) in reports.iter() {
        assert_eq!(report.value, 1);
        assert_eq!(report.depth(), 100_000);
    }
}

#[test]
fn test_count_overflow_fails_with_line_number() {
    let file = collapsed_file("a;b 18446744073709551615\na;c 2\n");
    let err = produce_reports(file.path(), &PrefixClassifier::default()).unwrap_err();

    match err {
        ParseError::MalformedLine {
            line_number,
            reason,
            ..
        } => {
            assert_eq!(line_number, 2);
            assert_eq!(reason, MalformedReason::TotalOverflow);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_largest_total_still_fits() {
    let file = collapsed_file("a;b 18446744073709551614\na;c 1\n");
    let reports = produce_reports(file.path(), &PrefixClassifier::default()).unwrap();

    assert_eq!(reports.identity.value, u64::MAX);
    assert_eq!(reports.identity.children[0].value, u64::MAX);
}
