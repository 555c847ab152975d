use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use data_loader::read_reviews;
use pipeline::{PipelineError, RecommendationIndex, RecommendationPipeline, SimilarityResult};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

/// BizRecs - "if you like X, you may like Y" over business reviews
#[derive(Parser)]
#[command(name = "biz-recs")]
#[command(about = "Business recommendations from review data via Pearson-correlated co-reviewers", long_about = None)]
struct Cli {
    /// Path to the review CSV file
    #[arg(short, long)]
    data: PathBuf,

    /// Maximum recommendations to show per business; zero or negative shows all
    #[arg(short, long, default_value = "10")]
    limit: i64,

    /// Minimum reviews a user must have to be kept
    #[arg(long, default_value = "60")]
    min_user_reviews: usize,

    /// Minimum reviews a business must have to be kept
    #[arg(long, default_value = "150")]
    min_business_reviews: usize,

    /// Shrinkage constant discounting correlations built on few reviewers
    #[arg(long, default_value = "3.0")]
    shrinkage: f64,

    /// Emit results as JSON instead of formatted text
    #[arg(long)]
    json: bool,

    /// Businesses (by display name) to fetch recommendations for
    #[arg(required = true)]
    names: Vec<String>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let start = Instant::now();
    let rows = read_reviews(&cli.data)
        .with_context(|| format!("Failed to read reviews from {}", cli.data.display()))?;
    println!(
        "{} Read {} review rows in {:?}",
        "✓".green(),
        rows.len(),
        start.elapsed()
    );

    let pipeline = RecommendationPipeline::new()
        .with_min_user_ratings(cli.min_user_reviews)
        .with_min_business_ratings(cli.min_business_reviews)
        .with_shrinkage(cli.shrinkage);

    let outcome = match pipeline.run(rows) {
        Ok(outcome) => outcome,
        Err(PipelineError::NoRatingsRemain) => {
            println!(
                "{}",
                "No reviews survived filtering; no recommendations possible".yellow()
            );
            return Ok(());
        }
        Err(error) => return Err(error.into()),
    };

    if !outcome.skipped_rows.is_empty() {
        println!(
            "{} {} rows skipped during loading (run with RUST_LOG=warn for details)",
            "!".yellow(),
            outcome.skipped_rows.len()
        );
    }

    if cli.json {
        print_json(&outcome.index, &cli.names, cli.limit)?;
    } else {
        for name in &cli.names {
            print_recommendations(&outcome.index, name, cli.limit);
        }
    }

    Ok(())
}

/// Number of candidates to show from a ranked list.
fn shown(candidates: &[SimilarityResult], limit: i64) -> usize {
    if limit > 0 {
        candidates.len().min(limit as usize)
    } else {
        candidates.len()
    }
}

/// Print the ranked lists for one queried display name.
fn print_recommendations(index: &RecommendationIndex, name: &str, limit: i64) {
    let Some(by_id) = index.lookup(name) else {
        println!("No recommendations available for those who like {name}");
        return;
    };

    println!(
        "{}",
        format!("Recommendations for those who like {name}:").bold().blue()
    );
    if by_id.len() > 1 {
        println!("Multiple businesses by that name found");
    }

    // Deterministic output order over same-named locations
    let mut ids: Vec<&String> = by_id.keys().collect();
    ids.sort();
    for id in ids {
        println!("  {id}:");
        let candidates = &by_id[id];
        for result in &candidates[..shown(candidates, limit)] {
            println!(
                "    {}: review avg: {:.3} similarity rating: {:.3} common reviewers: {}",
                result.name, result.avg, result.similarity, result.common_raters
            );
        }
    }
}

/// Serialize the lookup results for every queried name as one JSON object.
/// Unknown names map to null, so callers can tell "unknown" from "empty".
fn print_json(index: &RecommendationIndex, names: &[String], limit: i64) -> Result<()> {
    let mut output: BTreeMap<&str, Option<BTreeMap<&String, &[SimilarityResult]>>> =
        BTreeMap::new();
    for name in names {
        let trimmed = index.lookup(name).map(|by_id| {
            by_id
                .iter()
                .map(|(id, candidates)| (id, &candidates[..shown(candidates, limit)]))
                .collect()
        });
        output.insert(name, trimmed);
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
