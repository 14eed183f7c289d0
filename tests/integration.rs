//! Integration tests for the MQTT ACL analyzer

use mqtt_acl_analyzer::acl::{validate_acl_rules, AccessMode, AclGenerator, RuleModel};
use mqtt_acl_analyzer::analytics::{FindingCategory, GraphNode, MatrixCell, Severity};
use mqtt_acl_analyzer::config::*;
use mqtt_acl_analyzer::mqtt::TopicMatcher;
use mqtt_acl_analyzer::{analyze, parse_acl, AclAnalyzer, AclParser, RuleModelStore};
use proptest::prelude::*;

const SAMPLE_ACL: &str = "\
# Sensors publish readings, the dashboard reads them
user sensor-01
topic write sensors/temp/living
topic write sensors/humidity/living

user dashboard
topic read sensors/+/living
topic read sensors/temp/living

user bridge
topic readwrite sensors/temp/living
topic read $SYS/broker/#

user admin
topic readwrite #
";

/// Reader and writer on one topic overlap without a multi-writer warning
#[test]
fn test_single_writer_overlap() {
    let model = parse_acl("user a\ntopic read sensors/t\nuser b\ntopic write sensors/t").unwrap();
    let view = analyze(&model);

    assert_eq!(view.overlaps.len(), 1);
    let overlap = &view.overlaps[0];
    assert_eq!(overlap.topic, "sensors/t");
    assert_eq!(overlap.client_count, 2);
    assert_eq!(overlap.clients[0].client, "a");
    assert_eq!(overlap.clients[0].access, AccessMode::Read);
    assert_eq!(overlap.clients[1].client, "b");
    assert_eq!(overlap.clients[1].access, AccessMode::Write);

    assert!(view.security_analysis.warnings.is_empty());
    assert_eq!(view.security_analysis.security_score, 100);
}

/// Write access to `#` is a single high-severity issue
#[test]
fn test_admin_write_all_topics() {
    let model = parse_acl("user admin\ntopic readwrite #").unwrap();
    let report = analyze(&model).security_analysis;

    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].level, Severity::High);
    assert_eq!(report.issues[0].category, FindingCategory::WriteAllTopics);
    assert_eq!(report.issues[0].client.as_deref(), Some("admin"));
    assert_eq!(report.security_score, 80);
}

/// A file of only comments and blanks analyzes to empty views
#[test]
fn test_comments_only_file() {
    let model = parse_acl("# nothing here\n\n   \n# still nothing\n").unwrap();
    assert!(model.is_empty());

    let view = analyze(&model);
    assert!(view.clients.is_empty());
    assert!(view.topics.is_empty());
    assert!(view.relationships.nodes.is_empty());
    assert!(view.relationships.edges.is_empty());
    assert!(view.overlaps.is_empty());
    assert!(view.hierarchy.children.is_empty());
    assert!(view.matrix.clients.is_empty());
    assert_eq!(view.statistics.total_clients, 0);
    assert_eq!(view.statistics.total_rules, 0);
    assert_eq!(view.statistics.avg_rules_per_client, 0.0);
    assert_eq!(view.security_analysis.security_score, 100);
}

/// A topic line before any user line is rejected with its line number
#[test]
fn test_topic_without_user() {
    let err = parse_acl("# header\ntopic write sensors/+/temp").unwrap_err();
    assert_eq!(err.line, 2);
    assert_eq!(err.text, "topic write sensors/+/temp");
    assert!(err.to_string().starts_with("Line 2:"));
}

#[test]
fn test_sample_acl_views() {
    let model = parse_acl(SAMPLE_ACL).unwrap();
    let analyzer = AclAnalyzer::new(&model);

    let clients = analyzer.client_summaries();
    let names: Vec<&str> = clients.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["sensor-01", "dashboard", "bridge", "admin"]);

    let dashboard = &clients[1];
    assert_eq!(dashboard.total_rules, 2);
    assert_eq!(dashboard.read_rules, 2);
    assert_eq!(dashboard.wildcard_topics, 1);
    assert_eq!(dashboard.exact_topics, 1);

    // sensors/temp/living is referenced by three clients
    let topics = analyzer.topic_summaries();
    assert_eq!(topics[0].topic, "sensors/temp/living");
    assert_eq!(topics[0].clients, vec!["bridge", "dashboard", "sensor-01"]);
    assert_eq!(topics[0].write_clients, vec!["sensor-01", "bridge"]);

    let report = analyzer.security_analysis();
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].category, FindingCategory::MultipleWriters);
    assert_eq!(report.security_score, 75);
}

#[test]
fn test_edges_match_topic_rule_counts() {
    let model = parse_acl(SAMPLE_ACL).unwrap();
    let view = analyze(&model);

    let rule_total: usize = view.topics.iter().map(|t| t.rule_count).sum();
    assert_eq!(view.relationships.edges.len(), rule_total);
    assert_eq!(view.relationships.edges.len(), model.rule_count());

    let client_nodes = view
        .relationships
        .nodes
        .iter()
        .filter(|n| matches!(n, GraphNode::Client { .. }))
        .count();
    assert_eq!(client_nodes, model.client_count());
}

#[test]
fn test_hierarchy_excludes_wildcards() {
    let model = parse_acl(SAMPLE_ACL).unwrap();
    let hierarchy = AclAnalyzer::new(&model).hierarchy();

    assert!(hierarchy.children.contains_key("sensors"));
    assert!(!hierarchy.children.contains_key("#"));
    assert!(!hierarchy.children.contains_key("$SYS"));

    let sensors = hierarchy.node("sensors").unwrap();
    assert!(!sensors.children.contains_key("+"));
    assert_eq!(hierarchy.node("sensors/temp/living").unwrap().terminal_rules, 3);
    assert_eq!(sensors.rule_count, 4);
}

#[test]
fn test_matrix_cells() {
    let model = parse_acl(SAMPLE_ACL).unwrap();
    let matrix = AclAnalyzer::new(&model).matrix();

    assert_eq!(matrix.clients, vec!["admin", "bridge", "dashboard", "sensor-01"]);
    assert_eq!(
        matrix.cell("bridge", "sensors/temp/living"),
        Some(&MatrixCell::Single(AccessMode::ReadWrite))
    );
    assert_eq!(matrix.cell("admin", "sensors/temp/living"), Some(&MatrixCell::Empty));
    assert_eq!(matrix.cell("nobody", "#"), None);
}

#[test]
fn test_wildcard_coverage() {
    let model = parse_acl(SAMPLE_ACL).unwrap();
    let coverage = AclAnalyzer::new(&model).wildcard_coverage();

    let plus = coverage
        .iter()
        .find(|c| c.pattern == "sensors/+/living")
        .unwrap();
    assert_eq!(plus.clients, vec!["dashboard"]);
    let matched: Vec<&str> = plus.matched_topics.iter().map(|t| t.topic.as_str()).collect();
    assert_eq!(matched, vec!["sensors/humidity/living", "sensors/temp/living"]);

    let all = coverage.iter().find(|c| c.pattern == "#").unwrap();
    assert_eq!(all.matched_topics.len(), 2);
}

#[test]
fn test_aggregate_json_shape() {
    let model = parse_acl(SAMPLE_ACL).unwrap();
    let json = serde_json::to_value(analyze(&model)).unwrap();

    for key in [
        "clients",
        "topics",
        "relationships",
        "overlaps",
        "hierarchy",
        "matrix",
        "security_analysis",
        "statistics",
    ] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }

    assert_eq!(json["relationships"]["nodes"][0]["type"], "client");
    assert_eq!(json["relationships"]["edges"][0]["access"], "write");
    assert_eq!(json["security_analysis"]["issues"][0]["level"], "high");
    assert_eq!(json["statistics"]["total_rules"], 7);
}

#[test]
fn test_validation_warnings() {
    let model = parse_acl("user idle\nuser pub\ntopic write sensors/+\ntopic read temp#").unwrap();
    let warnings = validate_acl_rules(&model);

    assert!(warnings.iter().any(|w| w.client == "idle"));
    assert!(warnings
        .iter()
        .any(|w| w.topic.as_deref() == Some("sensors/+")));
    assert!(warnings.iter().any(|w| w.topic.as_deref() == Some("temp#")));
}

#[test]
fn test_generated_text_round_trips() {
    let model = parse_acl(SAMPLE_ACL).unwrap();
    let text = AclGenerator::new(false, true).generate(&model, None).unwrap();

    assert!(text.starts_with("# Mosquitto ACL file\n# 4 client(s), 7 rule(s)\n"));
    assert_eq!(parse_acl(&text).unwrap(), model);
}

#[test]
fn test_generate_with_access_filter() {
    let model = parse_acl(SAMPLE_ACL).unwrap();
    let text = AclGenerator::new(true, false)
        .generate(&model, Some(&[AccessMode::Write]))
        .unwrap();

    let regenerated = parse_acl(&text).unwrap();
    let names: Vec<&str> = regenerated.client_names().collect();
    assert_eq!(names, vec!["admin", "bridge", "dashboard", "sensor-01"]);
    assert!(regenerated.iter_rules().all(|r| r.access == AccessMode::Write));
    assert_eq!(regenerated.rule_count(), 2);
}

#[test]
fn test_rule_model_json() {
    let model = parse_acl("user a\ntopic read t\nuser b").unwrap();
    let json = serde_json::to_string(&model).unwrap();
    assert_eq!(
        json,
        r#"{"a":[{"client":"a","access":"read","topic":"t"}],"b":[]}"#
    );

    let back: RuleModel = serde_json::from_str(&json).unwrap();
    assert_eq!(back, model);
}

/// Exported rule JSON feeds straight back into the generator
#[test]
fn test_export_then_generate() {
    let model = parse_acl(SAMPLE_ACL).unwrap();
    let exported = serde_json::to_string_pretty(&model).unwrap();

    let json: serde_json::Value = serde_json::from_str(&exported).unwrap();
    assert_eq!(json["bridge"][1]["topic"], "$SYS/broker/#");
    assert_eq!(json["admin"][0]["access"], "readwrite");

    let imported: RuleModel = serde_json::from_str(&exported).unwrap();
    let text = AclGenerator::new(false, false).generate(&imported, None).unwrap();
    assert_eq!(parse_acl(&text).unwrap(), model);

    // Sorted output keeps every client and its rules, in name order
    let sorted = AclGenerator::default().generate(&imported, None).unwrap();
    let reparsed = parse_acl(&sorted).unwrap();
    let names: Vec<&str> = reparsed.client_names().collect();
    assert_eq!(names, vec!["admin", "bridge", "dashboard", "sensor-01"]);
    for name in model.client_names() {
        assert!(reparsed.contains_client(name));
        assert_eq!(reparsed.rules_for(name), model.rules_for(name));
    }
}

#[test]
fn test_parse_file() {
    let path = std::env::temp_dir().join(format!("acl-analyzer-{}.acl", std::process::id()));
    std::fs::write(&path, SAMPLE_ACL).unwrap();

    let model = AclParser::new().parse_file(&path).unwrap();
    assert_eq!(model.client_count(), 4);
    std::fs::remove_file(&path).unwrap();

    let err = AclParser::new().parse_file(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to read ACL file"));
}

#[test]
fn test_store_shares_models() {
    let store = RuleModelStore::new(&StoreConfig {
        max_entries: 2,
        ttl_secs: 0,
    });
    let stored = store.insert("upload", parse_acl(SAMPLE_ACL).unwrap());

    let fetched = store.get("upload").unwrap();
    assert_eq!(analyze(&fetched).statistics.total_rules, stored.rule_count());
}

#[test]
fn test_config_deserialization() {
    let json = r#"{
        "analysis": { "top-topics": 3, "large-acl-threshold": 10 },
        "generator": {
            "sort-clients": false,
            "include-comments": false,
            "access-filter": ["read", "readwrite"]
        },
        "output": { "pretty": false }
    }"#;

    let config: AnalyzerConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.analysis.top_topics, 3);
    assert_eq!(config.analysis.large_acl_threshold, 10);
    assert!(!config.generator.sort_clients);
    assert_eq!(
        config.generator.access_filter,
        Some(vec![AccessMode::Read, AccessMode::ReadWrite])
    );
    assert_eq!(config.store.max_entries, 64);
    assert!(!config.output.pretty);
}

#[test]
fn test_topic_matching() {
    let matcher = TopicMatcher::new();

    assert!(matcher.matches("sensors/+/living", "sensors/temp/living"));
    assert!(matcher.matches("sensors/#", "sensors"));
    assert!(matcher.matches("#", "anything/at/all"));
    assert!(!matcher.matches("sensors/+", "sensors/temp/living"));
}

fn topic_strategy() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(prop_oneof![4 => "[a-z0-9]{1,5}", 1 => Just("+".to_string())], 1..4),
        any::<bool>(),
    )
        .prop_map(|(mut levels, multi)| {
            if multi {
                levels.push("#".to_string());
            }
            levels.join("/")
        })
}

fn access_strategy() -> impl Strategy<Value = AccessMode> {
    prop_oneof![
        Just(AccessMode::Read),
        Just(AccessMode::Write),
        Just(AccessMode::ReadWrite),
    ]
}

/// Few clients and topics, so shared topics are common
fn crowded_model_strategy() -> impl Strategy<Value = RuleModel> {
    prop::collection::vec(
        (
            prop::sample::select(vec!["a", "b", "c", "d"]),
            access_strategy(),
            prop::sample::select(vec!["t", "t/1", "t/+", "#"]),
        ),
        0..24,
    )
    .prop_map(|rules| {
        let mut model = RuleModel::new();
        for (client, access, topic) in rules {
            model.add_rule(client, access, topic);
        }
        model
    })
}

fn model_strategy() -> impl Strategy<Value = RuleModel> {
    prop::collection::vec(
        ("[a-z][a-z0-9_-]{0,6}", access_strategy(), topic_strategy()),
        0..20,
    )
    .prop_map(|rules| {
        let mut model = RuleModel::new();
        for (client, access, topic) in rules {
            model.add_rule(&client, access, &topic);
        }
        model
    })
}

proptest! {
    #[test]
    fn prop_generate_then_parse_round_trips(model in model_strategy()) {
        let text = AclGenerator::new(false, true).generate(&model, None).unwrap();
        prop_assert_eq!(parse_acl(&text).unwrap(), model);
    }

    #[test]
    fn prop_security_score_in_range(model in model_strategy()) {
        let report = AclAnalyzer::new(&model).security_analysis();
        prop_assert!(report.security_score <= 100);
        let expected = 100i64 - 20 * report.issues.len() as i64 - 5 * report.warnings.len() as i64;
        prop_assert_eq!(report.security_score as i64, expected.max(0));
    }

    #[test]
    fn prop_overlaps_are_exactly_shared_topics(model in crowded_model_strategy()) {
        let analyzer = AclAnalyzer::new(&model);
        let overlaps = analyzer.overlaps();

        for overlap in &overlaps {
            prop_assert!(overlap.client_count >= 2);
        }

        let shared: Vec<String> = analyzer
            .topic_summaries()
            .into_iter()
            .filter(|t| t.client_count >= 2)
            .map(|t| t.topic)
            .collect();
        let overlapping: Vec<String> = overlaps.into_iter().map(|o| o.topic).collect();
        prop_assert_eq!(overlapping, shared);
    }
}
