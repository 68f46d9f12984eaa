// src/bin/codesim.rs
use anyhow::{bail, Context, Result};
use clap::Parser;
use codesim_core::analysis::detect;
use codesim_core::discovery;
use codesim_core::ngram;
use codesim_core::report::{self, NgramPairReport, PairReport, ScanSummary};
use colored::Colorize;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "codesim")]
#[command(version)]
#[command(about = "Structural code similarity detector (AST + CFG + DAG analysis)")]
struct Cli {
    /// Two files to compare, or a single directory to scan pairwise
    #[arg(required = true, num_args = 1..=2)]
    paths: Vec<PathBuf>,

    /// Output format: terminal or json
    #[arg(long, default_value = "terminal")]
    format: String,

    /// Flag pairs at or above this similarity in the n-gram report (percent)
    #[arg(long, default_value_t = 75.0)]
    threshold: f64,

    /// Skip paths matching these regexes in directory mode
    #[arg(long)]
    exclude: Vec<String>,

    /// Use the token n-gram engine instead of the structural pipeline
    #[arg(long)]
    ngram: bool,

    /// Shingle width for the n-gram engine
    #[arg(long, default_value_t = ngram::DEFAULT_NGRAM_SIZE)]
    ngram_size: usize,

    /// Verbose progress output
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.paths.as_slice() {
        [file_a, file_b] => compare_two(&cli, file_a, file_b),
        [root] => scan_directory(&cli, root),
        _ => unreachable!("clap bounds the positional count"),
    }
}

fn compare_two(cli: &Cli, file_a: &Path, file_b: &Path) -> Result<()> {
    let code_a = discovery::read_source(file_a)
        .with_context(|| format!("could not read {}", file_a.display()))?;
    let code_b = discovery::read_source(file_b)
        .with_context(|| format!("could not read {}", file_b.display()))?;

    if cli.ngram {
        let pair = compare_pair_ngram(
            file_a.display().to_string(),
            file_b.display().to_string(),
            &code_a,
            &code_b,
            cli.ngram_size,
        );
        print_ngram_reports(cli, &[pair]);
        return Ok(());
    }

    let pair = PairReport {
        file_a: file_a.display().to_string(),
        file_b: file_b.display().to_string(),
        result: detect::compare(&code_a, &code_b),
    };

    if cli.format == "json" {
        let mut summary = ScanSummary::default();
        summary.record(&pair.result);
        println!("{}", report::format_json(std::slice::from_ref(&pair), &summary));
    } else {
        print!("{}", report::format_pair(&pair));
    }
    Ok(())
}

fn scan_directory(cli: &Cli, root: &Path) -> Result<()> {
    let excludes = discovery::compile_excludes(&cli.exclude)?;
    let files = discovery::discover(root, &excludes)?;

    if cli.verbose {
        eprintln!("Discovered {} source files under {}", files.len(), root.display());
    }

    // Unreadable files are reported and left out of the pairing.
    let sources: Vec<(String, String)> = files
        .iter()
        .filter_map(|path| match discovery::read_source(path) {
            Ok(content) => Some((path.display().to_string(), content)),
            Err(err) => {
                eprintln!("{} {err}", "WARN:".yellow());
                None
            }
        })
        .collect();

    if sources.len() < 2 {
        bail!("need at least 2 readable source files for comparison");
    }

    let pairs: Vec<(usize, usize)> = (0..sources.len())
        .flat_map(|i| (i + 1..sources.len()).map(move |j| (i, j)))
        .collect();

    if cli.ngram {
        let reports = ngram_scan(&sources, &pairs, cli.ngram_size);
        print_ngram_reports(cli, &reports);
        return Ok(());
    }

    // Pairs share no mutable state, so they compare in parallel.
    let reports: Vec<PairReport> = pairs
        .par_iter()
        .map(|&(i, j)| PairReport {
            file_a: sources[i].0.clone(),
            file_b: sources[j].0.clone(),
            result: detect::compare(&sources[i].1, &sources[j].1),
        })
        .collect();

    let mut summary = ScanSummary::default();
    for pair in &reports {
        summary.record(&pair.result);
    }

    if cli.format == "json" {
        println!("{}", report::format_json(&reports, &summary));
    } else {
        for pair in &reports {
            print!("{}", report::format_pair(pair));
        }
        print!("{}", report::format_summary(&summary));
    }
    Ok(())
}

fn ngram_scan(
    sources: &[(String, String)],
    pairs: &[(usize, usize)],
    n: usize,
) -> Vec<NgramPairReport> {
    let fingerprints: Vec<Vec<ngram::Ngram>> = sources
        .par_iter()
        .map(|(_, content)| ngram::fingerprint(content, n))
        .collect();

    pairs
        .par_iter()
        .map(|&(i, j)| {
            compare_fingerprints(
                sources[i].0.clone(),
                sources[j].0.clone(),
                &fingerprints[i],
                &fingerprints[j],
            )
        })
        .collect()
}

fn compare_pair_ngram(
    file_a: String,
    file_b: String,
    code_a: &str,
    code_b: &str,
    n: usize,
) -> NgramPairReport {
    let ngrams_a = ngram::fingerprint(code_a, n);
    let ngrams_b = ngram::fingerprint(code_b, n);
    compare_fingerprints(file_a, file_b, &ngrams_a, &ngrams_b)
}

fn compare_fingerprints(
    file_a: String,
    file_b: String,
    ngrams_a: &[ngram::Ngram],
    ngrams_b: &[ngram::Ngram],
) -> NgramPairReport {
    let matching = ngrams_a
        .iter()
        .filter(|n| ngrams_b.iter().any(|m| m.hash == n.hash))
        .count();
    NgramPairReport {
        file_a,
        file_b,
        matching_ngrams: matching,
        total_ngrams: ngrams_a.len(),
        similarity_percentage: ngram::similarity(ngrams_a, ngrams_b),
    }
}

fn print_ngram_reports(cli: &Cli, reports: &[NgramPairReport]) {
    if cli.format == "json" {
        println!("{}", report::format_ngram_json(reports));
    } else {
        print!("{}", report::format_ngram_report(reports, cli.threshold));
    }
}
