use chatlens::charts::{
    SessionHourlySeries, SessionTokenTotals, common_words, hourly_activity, hourly_interactions,
    response_length_densities, session_token_totals,
};
use chatlens::models::Document;
use chatlens::table::{Table, table_from_documents};
use serde_json::Value;

fn multi_session_table() -> Table {
    let content: Value =
        serde_json::from_str(include_str!("../../../fixtures/chat_history/multi_session.json"))
            .expect("fixture should be valid JSON");
    table_from_documents(&[Document::new("multi_session.json", content)])
        .expect("table should build")
}

fn single_session_table() -> Table {
    let content: Value =
        serde_json::from_str(include_str!("../../../fixtures/chat_history/single_session.json"))
            .expect("fixture should be valid JSON");
    table_from_documents(&[Document::new("single_session.json", content)])
        .expect("table should build")
}

#[test]
fn hourly_interactions_count_rows_per_session_and_hour() {
    let table = multi_session_table();
    let rows = table.rows_for_source("multi_session.json");

    let series = hourly_interactions(&rows);

    assert_eq!(
        series,
        vec![
            SessionHourlySeries {
                session_id: "alpha".to_string(),
                points: vec![(9, 2), (14, 1)],
            },
            SessionHourlySeries {
                session_id: "beta".to_string(),
                points: vec![(14, 2)],
            },
        ]
    );
}

#[test]
fn token_totals_sum_input_and_output_per_session() {
    let table = multi_session_table();
    let rows = table.rows_for_source("multi_session.json");

    let totals = session_token_totals(&rows);

    assert_eq!(
        totals,
        vec![
            SessionTokenTotals {
                session_id: "alpha".to_string(),
                input_tokens: 22.0,
                output_tokens: 38.0,
            },
            SessionTokenTotals {
                session_id: "beta".to_string(),
                input_tokens: 5.0,
                output_tokens: 12.0,
            },
        ]
    );
}

#[test]
fn common_words_skip_stop_words_and_keep_first_seen_ties() {
    let table = multi_session_table();
    let rows = table.rows_for_source("multi_session.json");

    let words = common_words(&rows, 4);
    let ranked: Vec<(&str, usize)> = words
        .iter()
        .map(|entry| (entry.word.as_str(), entry.count))
        .collect();

    assert_eq!(
        ranked,
        vec![
            ("explain", 2),
            ("rust", 2),
            ("summarize", 2),
            ("lifetimes", 1)
        ]
    );
    assert!(words.iter().all(|entry| entry.word != "the"));
    assert_eq!(common_words(&rows, 4), words);
}

#[test]
fn heatmap_excludes_rows_without_timestamp() {
    let table = multi_session_table();
    let rows = table.rows_for_source("multi_session.json");

    let activity = hourly_activity(&rows);

    assert_eq!(activity.hours, vec![9, 14]);
    assert_eq!(activity.session_ids, vec!["alpha", "beta"]);
    assert_eq!(activity.counts, vec![vec![2, 0], vec![1, 2]]);
    assert_eq!(activity.max_count(), 2);

    let counted: usize = activity.counts.iter().flatten().sum();
    assert_eq!(counted, 5);
}

#[test]
fn density_curves_need_spread_in_lengths() {
    let multi = multi_session_table();
    let densities = response_length_densities(&multi.rows_for_source("multi_session.json"));

    assert_eq!(densities.len(), 2);
    assert_eq!(densities[0].session_id, "alpha");
    assert_eq!(densities[0].lengths, vec![5, 26, 16]);
    let curve = densities[0].curve.as_ref().expect("alpha should get a curve");
    assert!(curve.bandwidth > 0.0);
    assert!(curve.points.iter().all(|(_, density)| *density >= 0.0));
    assert_eq!(densities[1].lengths, vec![2, 4, 0]);

    let single = single_session_table();
    let flat = response_length_densities(&single.rows_for_source("single_session.json"));
    assert_eq!(flat[0].lengths, vec![11, 11]);
    assert!(flat[0].curve.is_none());
}

#[test]
fn empty_rows_produce_empty_datasets() {
    let rows = Vec::new();

    assert!(hourly_interactions(&rows).is_empty());
    assert!(session_token_totals(&rows).is_empty());
    assert!(common_words(&rows, 20).is_empty());
    assert!(hourly_activity(&rows).hours.is_empty());
    assert_eq!(hourly_activity(&rows).max_count(), 0);
}

#[test]
fn numeric_session_ids_sort_by_value() {
    let content = serde_json::json!({"chat_history": [
        {"session_id": 10, "chat_data": [
            {"input_tokens": 1, "output_tokens": 2, "timestamp": "2024-01-01T08:00:00"}
        ]},
        {"session_id": 9, "chat_data": [
            {"input_tokens": 3, "output_tokens": 4, "timestamp": "2024-01-01T08:30:00"}
        ]},
        {"session_id": "ops", "chat_data": [
            {"input_tokens": -2, "output_tokens": 0.5, "timestamp": "2024-01-01T09:00:00"}
        ]}
    ]});
    let table = table_from_documents(&[Document::new("numeric_ids.json", content)])
        .expect("table should build");
    let rows = table.rows_for_source("numeric_ids.json");

    let totals = session_token_totals(&rows);
    let order: Vec<&str> = totals
        .iter()
        .map(|session| session.session_id.as_str())
        .collect();
    assert_eq!(order, vec!["9", "10", "ops"]);
    assert_eq!(totals[2].input_tokens, -2.0);
    assert_eq!(totals[2].output_tokens, 0.5);

    let activity = hourly_activity(&rows);
    assert_eq!(activity.session_ids, vec!["9", "10", "ops"]);
    assert_eq!(activity.counts, vec![vec![1, 1, 0], vec![0, 0, 1]]);
}
