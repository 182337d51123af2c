use llm_perf_rs::optimizer::{OptimumRow, OptimumTable};
use llm_perf_rs::{recommend, MatchKind, PipelineError, Record, Recommender, Value};
use std::sync::Arc;

fn optimum_table(groups: &[(i64, &str, f64)]) -> OptimumTable {
    let rows = groups
        .iter()
        .map(|&(group, backend, score)| {
            OptimumRow::new(
                group,
                score,
                vec![Value::Number(group as f64 + 250.0), Value::from(backend)],
            )
        })
        .collect();
    OptimumTable::new(vec!["Memory (MB)".to_string(), "Backend".to_string()], rows).unwrap()
}

fn query(memory: f64) -> Record {
    Record::new()
        .with("Memory (MB)", memory)
        .with("Backend", "TensorFlow")
        .with("Precision", "float32")
        .with("Quantization", "None")
        .with("Attention", "Standard")
        .with("Kernel", "Default")
        .with("Energy (tokens/kWh)", 5000.0)
        .with("Open LLM Score (%)", 80.0)
        .with("Params (B)", 1.2)
}

#[test]
fn test_exact_bucket_returns_stored_row() {
    let table = optimum_table(&[(0, "pytorch", 0.8), (1000, "onnxruntime", 0.6), (2000, "tgi", 0.4)]);
    let rec = recommend(&query(1500.0), &table).unwrap();

    assert_eq!(rec.match_kind, MatchKind::Exact);
    assert_eq!(rec.query_memory_group, 1000);
    assert_eq!(rec.record, table.record(table.get(1000).unwrap()));
    assert_eq!(rec.record.get("Backend"), Some(&Value::from("onnxruntime")));
    assert_eq!(rec.record.get("Energy_Performance_Score"), Some(&Value::Number(0.6)));
}

#[test]
fn test_missing_bucket_falls_back_to_smaller_equidistant_key() {
    let table = optimum_table(&[(0, "pytorch", 0.8), (2000, "tgi", 0.4)]);
    let rec = recommend(&query(1500.0), &table).unwrap();

    assert_eq!(rec.match_kind, MatchKind::Nearest);
    assert_eq!(rec.query_memory_group, 1000);
    assert_eq!(rec.memory_group, 0);
    assert_eq!(rec.record.get("Backend"), Some(&Value::from("pytorch")));
}

#[test]
fn test_fallback_picks_closest_bucket() {
    let table = optimum_table(&[(0, "pytorch", 0.8), (6000, "tgi", 0.4), (9000, "vllm", 0.3)]);

    assert_eq!(recommend(&query(7200.0), &table).unwrap().memory_group, 6000);
    assert_eq!(recommend(&query(8100.0), &table).unwrap().memory_group, 9000);
    assert_eq!(recommend(&query(25_000.0), &table).unwrap().memory_group, 9000);
    assert_eq!(recommend(&query(2100.0), &table).unwrap().memory_group, 0);
}

#[test]
fn test_bucket_edges_match_optimizer() {
    let table = optimum_table(&[(0, "pytorch", 0.8), (1000, "onnxruntime", 0.6)]);
    assert_eq!(recommend(&query(999.0), &table).unwrap().memory_group, 0);
    assert_eq!(recommend(&query(1000.0), &table).unwrap().memory_group, 1000);
    assert_eq!(recommend(&query(1999.0), &table).unwrap().memory_group, 1000);
}

#[test]
fn test_memory_beyond_bucket_range_is_parse_error() {
    let table = optimum_table(&[(0, "pytorch", 0.8), (2000, "tgi", 0.4)]);

    assert_eq!(
        recommend(&query(1e19), &table).unwrap_err(),
        PipelineError::Parse {
            column: "Memory (MB)".to_string(),
            row: 0,
            value: "10000000000000000000".to_string(),
        }
    );
    assert!(matches!(
        Recommender::new(&table).recommend_for_memory(f64::MAX),
        Err(PipelineError::Parse { .. })
    ));
    // the largest representable bucket still resolves
    assert_eq!(recommend(&query(9.0e18), &table).unwrap().memory_group, 2000);
}

#[test]
fn test_empty_table_is_error() {
    let table = optimum_table(&[]);
    assert_eq!(
        recommend(&query(1500.0), &table).unwrap_err(),
        PipelineError::EmptyTable
    );
}

#[test]
fn test_lookup_leaves_table_untouched() {
    let table = optimum_table(&[(0, "pytorch", 0.8), (2000, "tgi", 0.4)]);
    let before = table.clone();
    for memory in [10.0, 1500.0, 2500.0, 90_000.0] {
        recommend(&query(memory), &table).unwrap();
    }
    assert_eq!(table, before);
}

#[test]
fn test_concurrent_queries_share_one_table() {
    let table = Arc::new(optimum_table(&[(0, "pytorch", 0.8), (3000, "tgi", 0.4)]));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let table = Arc::clone(&table);
            std::thread::spawn(move || {
                Recommender::new(&table)
                    .recommend_for_memory(i as f64 * 1000.0)
                    .map(|r| r.memory_group)
            })
        })
        .collect();

    let groups: Vec<i64> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();
    // 0 -> 0, 1000 -> 0, 2000 -> 3000, 3000 -> 3000
    assert_eq!(groups, vec![0, 0, 3000, 3000]);
}
