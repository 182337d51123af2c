//! CLI command implementations

use anyhow::{Context, Result};
use std::path::PathBuf;
use llm_perf_rs::config::Config;
use llm_perf_rs::data::{read_dataset, write_dataset, Record};
use llm_perf_rs::optimizer::OptimumTable;
use llm_perf_rs::recommender::{MatchKind, Recommender};
use llm_perf_rs::scorer::SCORE_COLUMN;
use llm_perf_rs::Pipeline;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

fn banner(title: &str) {
    println!("{}", RULE);
    println!("{}", title);
    println!("{}", RULE);
}

fn print_optimum_table(config: &Config, table: &OptimumTable) {
    let backend_idx = table.columns().iter().position(|c| c == "Backend");
    let memory_idx = table
        .columns()
        .iter()
        .position(|c| *c == config.columns.memory);

    println!("  {:>12}  {:>12}  {:>8}  Backend", "Memory Group", "Memory (MB)", "Score");
    for row in table.rows() {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.values().get(i))
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string())
        };
        println!(
            "  {:>12}  {:>12}  {:>8.4}  {}",
            row.memory_group(),
            cell(memory_idx),
            row.score(),
            cell(backend_idx)
        );
    }
}

/// Stage 1: normalize and score the raw benchmark table
pub fn score(config: &Config, input: Option<String>, output: Option<String>) -> Result<()> {
    let input = input.unwrap_or_else(|| config.paths.input_csv.clone());
    let output = output.unwrap_or_else(|| config.paths.scored_csv.clone());

    banner("Energy-Performance Scoring");
    println!("  Input:   {}", input);

    let dataset = read_dataset(&input)?;
    let rows_in = dataset.len();
    let scored = Pipeline::new(config.clone())
        .score(dataset)
        .with_context(|| format!("Failed to score {}", input))?;

    write_dataset(&output, scored.table())?;

    println!("  Rows:    {} read, {} scored", rows_in, scored.len());
    if let Some(best) = scored.scores().iter().cloned().reduce(f64::max) {
        println!("  Best:    {:.4}", best);
    }
    println!("  Output:  {}", output);
    println!("{}", RULE);
    Ok(())
}

/// Stage 2: pick the best configuration of every memory bucket
pub fn optimize(config: &Config, input: Option<String>, output: Option<String>) -> Result<()> {
    let input = input.unwrap_or_else(|| config.paths.scored_csv.clone());
    let output = output.unwrap_or_else(|| config.paths.optimum_csv.clone());

    banner("Memory-Bucketed Optimization");
    println!("  Input:   {}", input);

    let dataset = read_dataset(&input)?;
    let (_, optima) = Pipeline::new(config.clone())
        .optimize_scored(dataset)
        .with_context(|| format!("Failed to optimize {}", input))?;

    write_dataset(&output, &optima.to_dataset()?)?;

    println!("  Buckets: {}", optima.len());
    println!();
    print_optimum_table(config, &optima);
    println!();
    println!("  Output:  {}", output);
    println!("{}", RULE);
    Ok(())
}

/// Stage 3: recommend the stored optimum for a new benchmark entry
pub fn recommend(
    config: &Config,
    optimum: Option<String>,
    query: Option<String>,
    memory: Option<f64>,
    output: Option<String>,
    table_output: Option<String>,
) -> Result<()> {
    let optimum = optimum.unwrap_or_else(|| config.paths.optimum_csv.clone());
    let memory_column = config.columns.memory.as_str();

    let table = OptimumTable::from_dataset(read_dataset(&optimum)?)
        .with_context(|| format!("Invalid optimum table {}", optimum))?;

    let query_record = match (query, memory) {
        (Some(path), _) => read_dataset(&path)?
            .record(0)
            .ok_or_else(|| anyhow::anyhow!("Query file {} has no rows", path))?,
        (None, Some(mb)) => Record::new().with(memory_column, mb),
        (None, None) => anyhow::bail!("Provide a new entry with --query <csv> or --memory <MB>"),
    };

    let recommendation = Recommender::new(&table)
        .with_memory_column(memory_column)
        .recommend(&query_record)?;

    banner("Recommendation");
    println!("  Query memory group:  {}", recommendation.query_memory_group);
    match recommendation.match_kind {
        MatchKind::Exact => println!("  Match:               exact"),
        MatchKind::Nearest => println!(
            "  Match:               nearest (memory group {})",
            recommendation.memory_group
        ),
    }
    println!();
    for (name, value) in recommendation.record.fields() {
        if name == SCORE_COLUMN {
            if let Some(score) = value.to_f64() {
                println!("  {:<28} {:.4}", name, score);
                continue;
            }
        }
        println!("  {:<28} {}", name, value);
    }
    println!("{}", RULE);

    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| config.paths.recommendation_file());
    std::fs::write(&path, serde_json::to_string_pretty(&recommendation.to_json())?)
        .with_context(|| format!("Failed to write recommendation to {}", path.display()))?;
    println!("Recommendation saved to {}", path.display());

    let table_path = table_output
        .map(PathBuf::from)
        .unwrap_or_else(|| config.paths.recommendation_table_file());
    write_dataset(&table_path, &recommendation.to_dataset()?)?;
    println!("Recommended row saved to {}", table_path.display());

    Ok(())
}

/// All stages over one input file
pub fn run(mut config: Config, input: Option<String>, output_dir: Option<String>) -> Result<()> {
    if let Some(dir) = output_dir {
        config.paths.output_dir = dir;
    }
    let input = input.unwrap_or_else(|| config.paths.input_csv.clone());
    let out_dir = PathBuf::from(&config.paths.output_dir);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    banner("Energy-Performance Pipeline");
    println!("  Input:   {}", input);

    let dataset = read_dataset(&input)?;
    let pipeline = Pipeline::new(config.clone());
    let output = pipeline
        .run(dataset)
        .with_context(|| format!("Pipeline failed for {}", input))?;

    let scored_path = config.paths.scored_file();
    let optimum_path = config.paths.optimum_file();
    write_dataset(&scored_path, &output.scored_labels()?)?;
    write_dataset(&optimum_path, &output.optima.to_dataset()?)?;

    println!("  Scored:  {} rows -> {}", output.scored.len(), scored_path.display());
    println!("  Optima:  {} buckets -> {}", output.optima.len(), optimum_path.display());
    for field in output.codec.fields() {
        if let Some(entry) = output.codec.get(field) {
            println!("  {:<13} {} labels", format!("{}:", field), entry.len());
        }
    }
    println!();
    print_optimum_table(&config, &output.optima);
    println!("{}", RULE);
    Ok(())
}
