// src/report.rs
//! Output formatting for comparison results.
//!
//! Human-readable terminal output and machine-readable JSON share the same
//! record types; the caller picks the format.

use crate::analysis::detect::ComparisonResult;
use crate::ngram;
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;

/// One structural comparison, tagged with the two input names.
#[derive(Debug, Clone, Serialize)]
pub struct PairReport {
    pub file_a: String,
    pub file_b: String,
    #[serde(flatten)]
    pub result: ComparisonResult,
}

/// One n-gram comparison.
#[derive(Debug, Clone, Serialize)]
pub struct NgramPairReport {
    pub file_a: String,
    pub file_b: String,
    pub matching_ngrams: usize,
    pub total_ngrams: usize,
    pub similarity_percentage: f64,
}

/// Directory-scan tallies, bucketed at fixed 0.75 / 0.50 cutoffs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSummary {
    pub comparisons: usize,
    pub high_similarity: usize,
    pub medium_similarity: usize,
    pub low_similarity: usize,
}

impl ScanSummary {
    pub fn record(&mut self, result: &ComparisonResult) {
        self.comparisons += 1;
        if result.overall_score >= 0.75 {
            self.high_similarity += 1;
        } else if result.overall_score >= 0.50 {
            self.medium_similarity += 1;
        } else {
            self.low_similarity += 1;
        }
    }
}

fn separator() -> String {
    "─".repeat(64).dimmed().to_string()
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Formats one structural pair for the terminal.
#[must_use]
pub fn format_pair(report: &PairReport) -> String {
    let result = &report.result;
    let mut out = String::new();

    writeln!(out, "{}", separator()).ok();
    writeln!(out, "Comparing:").ok();
    writeln!(
        out,
        "  File 1: {} ({} nodes)",
        report.file_a.cyan(),
        result.node_count_a
    )
    .ok();
    writeln!(
        out,
        "  File 2: {} ({} nodes)",
        report.file_b.cyan(),
        result.node_count_b
    )
    .ok();
    writeln!(out).ok();
    writeln!(out, "Similarity Metrics:").ok();
    writeln!(out, "  AST Similarity:   {}", percent(result.ast_similarity)).ok();
    writeln!(out, "  CFG Similarity:   {}", percent(result.cfg_similarity)).ok();
    writeln!(out, "  DAG Similarity:   {}", percent(result.dag_similarity)).ok();
    writeln!(out).ok();
    writeln!(
        out,
        "OVERALL SCORE:    {}",
        percent(result.overall_score).bold()
    )
    .ok();

    let verdict = result.verdict.label();
    let colored_verdict = if result.overall_score >= 0.75 {
        verdict.red().bold().to_string()
    } else if result.overall_score >= 0.50 {
        verdict.yellow().to_string()
    } else {
        verdict.green().to_string()
    };
    writeln!(out, "VERDICT: {colored_verdict}").ok();
    writeln!(out, "{}", separator()).ok();

    out
}

/// Formats the directory-scan summary.
#[must_use]
pub fn format_summary(summary: &ScanSummary) -> String {
    let mut out = String::new();

    writeln!(out, "{}", separator()).ok();
    writeln!(out, "{}", "SUMMARY".bold()).ok();
    writeln!(out, "  Total comparisons:  {}", summary.comparisons).ok();
    writeln!(
        out,
        "  High plagiarism:    {}",
        highlight_count(summary.high_similarity)
    )
    .ok();
    writeln!(
        out,
        "  Medium similarity:  {}",
        summary.medium_similarity
    )
    .ok();
    writeln!(out, "  Low/No similarity:  {}", summary.low_similarity).ok();
    writeln!(out, "{}", separator()).ok();

    out
}

fn highlight_count(n: usize) -> String {
    if n == 0 {
        n.to_string()
    } else {
        n.to_string().red().bold().to_string()
    }
}

/// Formats the n-gram engine's report: flagged pairs first, then the full
/// detail listing.
#[must_use]
pub fn format_ngram_report(reports: &[NgramPairReport], threshold: f64) -> String {
    let mut out = String::new();

    writeln!(out, "{}", separator()).ok();
    writeln!(out, "{}", "N-GRAM OVERLAP REPORT".bold()).ok();
    writeln!(out, "Total Comparisons: {}", reports.len()).ok();
    writeln!(out, "Threshold: {threshold:.1}%").ok();
    writeln!(out, "{}", separator()).ok();
    writeln!(out).ok();

    let mut flagged = 0usize;
    for report in reports {
        if report.similarity_percentage >= threshold {
            flagged += 1;
            writeln!(out, "{} #{flagged}:", "FLAGGED PAIR".red().bold()).ok();
            writeln!(out, "  File 1: {}", report.file_a).ok();
            writeln!(out, "  File 2: {}", report.file_b).ok();
            writeln!(
                out,
                "  Similarity: {:.2}% ({})",
                report.similarity_percentage,
                ngram::status_label(report.similarity_percentage)
            )
            .ok();
            writeln!(
                out,
                "  Matches: {} / {} n-grams",
                report.matching_ngrams, report.total_ngrams
            )
            .ok();
            writeln!(out).ok();
        }
    }

    if flagged == 0 {
        writeln!(out, "{}", "No pairs above threshold.".green()).ok();
        writeln!(out).ok();
    }

    writeln!(out, "DETAILED RESULTS:").ok();
    for (i, report) in reports.iter().enumerate() {
        writeln!(
            out,
            "[{}] {:5.1}% | {} vs {}",
            i + 1,
            report.similarity_percentage,
            report.file_a,
            report.file_b
        )
        .ok();
    }
    writeln!(out, "{}", separator()).ok();

    out
}

/// JSON document for a structural run.
///
/// # Panics
/// Never: the report types serialize infallibly.
#[must_use]
pub fn format_json(pairs: &[PairReport], summary: &ScanSummary) -> String {
    #[derive(Serialize)]
    struct Document<'a> {
        pairs: &'a [PairReport],
        summary: &'a ScanSummary,
    }

    serde_json::to_string_pretty(&Document { pairs, summary })
        .expect("report serialization cannot fail")
}

/// JSON document for an n-gram run.
///
/// # Panics
/// Never: the report types serialize infallibly.
#[must_use]
pub fn format_ngram_json(pairs: &[NgramPairReport]) -> String {
    serde_json::to_string_pretty(pairs).expect("report serialization cannot fail")
}
