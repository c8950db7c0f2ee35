// Colored terminal output for the analysis views.
//
// Each `display_*` function prints one view; main.rs does the computing
// and hands the finished structures over.

use std::path::Path;

use colored::{ColoredString, Colorize};

use super::truncate_chars;
use crate::analysis::frequency::FrequencyTable;
use crate::analysis::network::{CooccurrenceGraph, FrequencyBand, ThresholdRange};
use crate::analysis::AnalysisError;
use crate::dataset::browse::ReviewEntry;
use crate::dataset::models::{KeywordColumn, TextColumn};
use crate::dataset::regions::Region;
use crate::sentiment::{RegionBaseline, SentimentComparison, SentimentResult};
use crate::topics::model::TopicSummary;

/// A non-fatal analysis notice (too few reviews, nothing left to show).
pub fn display_notice(notice: &AnalysisError) {
    println!("  {} {}", "!".yellow().bold(), notice.to_string().yellow());
}

pub fn display_regions(regions: &[Region], data_dir: &Path) {
    println!("\n{}", "=== Regions ===".bold());
    for region in regions {
        let path = region.path_in(data_dir);
        let status = if path.exists() {
            "cached".green()
        } else if region.drive_id.is_some() {
            "downloads on first use".dimmed()
        } else {
            "missing".red()
        };
        println!("  {:<28} {:<32} {}", region.name, region.file_name, status);
    }
}

pub fn display_stores(region: &str, stores: &[(String, usize)], limit: usize) {
    println!(
        "\n{}",
        format!("=== Stores in {} ({} total) ===", region, stores.len()).bold()
    );
    for (i, (store, count)) in stores.iter().take(limit).enumerate() {
        println!("  {:>4}. {:<40} {:>5} reviews", i + 1, store, count);
    }
    if stores.len() > limit {
        println!("  {}", format!("... {} more", stores.len() - limit).dimmed());
    }
}

pub fn display_reviews(store: &str, reviews: &[ReviewEntry], limit: usize) {
    println!(
        "\n{}",
        format!("=== Reviews for {} ({}) ===", store, reviews.len()).bold()
    );
    if reviews.is_empty() {
        println!("  No reviews found.");
        return;
    }

    for entry in reviews.iter().take(limit) {
        let date = match (&entry.date, &entry.date_text) {
            (Some(date), _) => date.to_string(),
            (None, Some(raw)) => raw.clone(),
            (None, None) => "-".to_string(),
        };
        println!("\n  {}", date.cyan());
        println!("  {}", truncate_chars(&entry.content, 200));
        for url in &entry.image_urls {
            println!("    {} {}", "img".dimmed(), url.dimmed());
        }
    }
}

/// Top words per column with a proportional bar.
pub fn display_word_tables(
    store: &str,
    columns: &[(TextColumn, Result<FrequencyTable, AnalysisError>)],
    top: usize,
) {
    println!("\n{}", format!("=== Word frequencies for {} ===", store).bold());

    for (column, table) in columns {
        println!("\n  {}", column.to_string().bold());
        let table = match table {
            Ok(table) => table,
            Err(notice) => {
                display_notice(notice);
                continue;
            }
        };

        let ranked = table.top_n(top);
        let max = ranked.first().map(|w| w.count).unwrap_or(1).max(1);
        for word in &ranked {
            let bar_len = (word.count * 30).div_ceil(max);
            println!(
                "    {:<16} {:>5}  {:>5.1}%  {}",
                word.word,
                word.count,
                word.share * 100.0,
                "#".repeat(bar_len).cyan()
            );
        }
        println!(
            "    {}",
            format!("{} tokens, {} distinct", table.total(), table.distinct()).dimmed()
        );
    }
}

pub fn display_network(store: &str, graph: &CooccurrenceGraph, range: &ThresholdRange, top_edges: usize) {
    println!("\n{}", format!("=== Co-occurrence network for {} ===", store).bold());
    println!(
        "  Minimum frequency: {} (range {}-{}, default {})",
        graph.threshold, range.min, range.max, range.default
    );
    println!(
        "  {} nodes, {} edges  |  bands: {} {}  {} {}  {} {}",
        graph.nodes.len(),
        graph.edges.len(),
        colorize_band(FrequencyBand::High),
        graph.band_count(FrequencyBand::High),
        colorize_band(FrequencyBand::Medium),
        graph.band_count(FrequencyBand::Medium),
        colorize_band(FrequencyBand::Low),
        graph.band_count(FrequencyBand::Low),
    );

    println!("\n  {}", "Nodes".bold());
    for node in graph.nodes.iter().take(top_edges) {
        println!(
            "    {:<16} freq {:>5}  degree {:>3}  {}",
            node.token,
            node.frequency,
            node.degree,
            colorize_band(node.band)
        );
    }

    println!("\n  {}", "Strongest pairs".bold());
    for edge in graph.edges.iter().take(top_edges) {
        println!("    {:<16} - {:<16} {:>4}", edge.source, edge.target, edge.weight);
    }
}

pub fn display_topics(store: &str, documents: usize, topics: &[TopicSummary]) {
    println!(
        "\n{}",
        format!("=== Topics for {} ({} reviews sampled) ===", store, documents).bold()
    );
    for topic in topics {
        let terms: Vec<&str> = topic.terms.iter().map(|t| t.term.as_str()).collect();
        println!(
            "  {:>2}. {:>5.1}%  {}",
            topic.id + 1,
            topic.prevalence * 100.0,
            terms.join(", ")
        );
    }
}

pub fn display_sentiment(result: &SentimentResult, comparison: Option<&SentimentComparison>) {
    println!(
        "\n{}",
        format!("=== Sentiment for {} ===", result.store).bold()
    );
    println!(
        "  {} sentences from {} reviews",
        result.sentences_analyzed, result.reviews_analyzed
    );

    let total_delta = comparison.map(|c| c.total_delta);
    println!(
        "\n  {:<12} {}  {}",
        "Overall".bold(),
        colorize_score(Some(result.total)),
        format_delta(total_delta)
    );

    for column in KeywordColumn::ALL {
        let delta = comparison.and_then(|c| c.keyword_delta(column));
        println!(
            "  {:<12} {}  {}",
            column.as_str(),
            colorize_score(result.keyword(column)),
            format_delta(delta)
        );
    }

    if let Some(c) = comparison {
        println!(
            "\n  {}",
            format!(
                "Compared with {} analyzed stores in {}",
                c.baseline.stores, c.baseline.region
            )
            .dimmed()
        );
    }
}

pub fn display_baseline(baseline: &RegionBaseline) {
    println!(
        "\n{}",
        format!(
            "=== Sentiment baseline for {} ({} stores) ===",
            baseline.region, baseline.stores
        )
        .bold()
    );
    println!("  {:<12} {}", "Overall".bold(), colorize_score(Some(baseline.total)));
    for column in KeywordColumn::ALL {
        println!(
            "  {:<12} {}",
            column.as_str(),
            colorize_score(baseline.keyword(column))
        );
    }
}

fn colorize_band(band: FrequencyBand) -> ColoredString {
    match band {
        FrequencyBand::High => band.as_str().red().bold(),
        FrequencyBand::Medium => band.as_str().yellow(),
        FrequencyBand::Low => band.as_str().blue(),
    }
}

fn colorize_score(score: Option<f64>) -> ColoredString {
    match score {
        None => format!("{:>6}", "-").dimmed(),
        Some(s) => {
            let text = format!("{s:>6.1}");
            if s >= 70.0 {
                text.green()
            } else if s >= 40.0 {
                text.yellow()
            } else {
                text.red()
            }
        }
    }
}

fn format_delta(delta: Option<f64>) -> ColoredString {
    match delta {
        None => "".normal(),
        Some(d) if d >= 0.0 => format!("(+{d:.1} vs region)").green(),
        Some(d) => format!("({d:.1} vs region)").red(),
    }
}
