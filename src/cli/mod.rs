pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use llm_perf_rs::Config;

#[derive(Parser)]
#[command(name = "llm_perf")]
#[command(about = "Energy-Performance optimization for LLM inference configurations", long_about = None)]
struct Cli {
    /// JSON config file (column names, scoring policy, default paths)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize benchmark data and add the Energy-Performance score
    Score {
        /// Benchmark CSV (defaults to paths.input_csv)
        #[arg(long)]
        input: Option<String>,
        /// Scored CSV to write (defaults to paths.scored_csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Select the best configuration of every memory bucket
    Optimize {
        /// Scored CSV from the score command (defaults to paths.scored_csv)
        #[arg(long)]
        input: Option<String>,
        /// Optimum table CSV to write (defaults to paths.optimum_csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Recommend the optimal configuration for a new benchmark entry
    Recommend {
        /// Optimum table CSV (defaults to paths.optimum_csv)
        #[arg(long)]
        optimum: Option<String>,
        /// CSV whose first row is the new entry
        #[arg(long, conflicts_with = "memory")]
        query: Option<String>,
        /// Memory footprint of the new entry in MB
        #[arg(long)]
        memory: Option<f64>,
        /// Recommendation JSON to write (defaults to paths.output_dir/paths.recommendation_json)
        #[arg(long)]
        output: Option<String>,
        /// One-row CSV to write (defaults to paths.output_dir/paths.recommendation_csv)
        #[arg(long)]
        table: Option<String>,
    },
    /// Score, optimize and write both tables in one pass
    Run {
        /// Benchmark CSV (defaults to paths.input_csv)
        #[arg(long)]
        input: Option<String>,
        /// Directory for the output files (defaults to paths.output_dir)
        #[arg(long)]
        output_dir: Option<String>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Score { input, output } => commands::score(&config, input, output),
        Commands::Optimize { input, output } => commands::optimize(&config, input, output),
        Commands::Recommend {
            optimum,
            query,
            memory,
            output,
            table,
        } => commands::recommend(&config, optimum, query, memory, output, table),
        Commands::Run { input, output_dir } => commands::run(config, input, output_dir),
    }
}
