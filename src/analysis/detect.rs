// src/analysis/detect.rs
//! The similarity engine: orchestrates the pipeline for a pair of sources,
//! blends three metrics into one score and maps it to a verdict.
//!
//! Every abnormal condition terminates with a descriptive verdict and zeroed
//! scores instead of an error; nothing in the pipeline can fail.

use super::ast::AstNode;
use super::{cfg, dag, lexer, normalizer, parser};
use serde::{Serialize, Serializer};

/// Inputs with fewer tokens than this are rejected as too small.
pub const MIN_TOKENS: usize = 5;

/// Inputs whose raw AST has fewer nodes than this are rejected as trivial.
pub const MIN_AST_NODES: usize = 3;

/// Blend weights (ast, cfg, dag) by average raw node count.
const WEIGHTS_SMALL: (f64, f64, f64) = (0.50, 0.30, 0.20);
const WEIGHTS_MEDIUM: (f64, f64, f64) = (0.35, 0.35, 0.30);
const WEIGHTS_LARGE: (f64, f64, f64) = (0.25, 0.40, 0.35);

/// Final classification of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    NullInput,
    EmptyCode,
    ExactCopy,
    TooSmall,
    TooSimple,
    AlmostIdentical,
    LikelyPlagiarized,
    SameLogic,
    CommonPatterns,
    DifferentApproaches,
    LikelyDifferent,
}

impl Verdict {
    /// Maps an overall score to one of the six similarity bands.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 0.85 {
            Self::AlmostIdentical
        } else if score >= 0.75 {
            Self::LikelyPlagiarized
        } else if score >= 0.60 {
            Self::SameLogic
        } else if score >= 0.40 {
            Self::CommonPatterns
        } else if score >= 0.25 {
            Self::DifferentApproaches
        } else {
            Self::LikelyDifferent
        }
    }

    /// Human-readable verdict line.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::NullInput => "NULL input",
            Self::EmptyCode => "Empty code",
            Self::ExactCopy => "EXACT COPY - 100% identical",
            Self::TooSmall => "Code too small (less than 5 tokens)",
            Self::TooSimple => "Code too simple (less than 3 nodes)",
            Self::AlmostIdentical => "HIGH PLAGIARISM - Almost identical code",
            Self::LikelyPlagiarized => "HIGH Similarity - Likely plagiarized",
            Self::SameLogic => "MEDIUM Similarity - Same logic, different style",
            Self::CommonPatterns => "LOW-MEDIUM Similarity - Some common patterns",
            Self::DifferentApproaches => "LOW Similarity - Different approaches",
            Self::LikelyDifferent => "MINIMAL Similarity - Likely different code",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// The outcome of one pairwise comparison. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub overall_score: f64,
    pub ast_similarity: f64,
    pub cfg_similarity: f64,
    pub dag_similarity: f64,
    pub node_count_a: usize,
    pub node_count_b: usize,
    pub verdict: Verdict,
}

impl ComparisonResult {
    fn terminal(verdict: Verdict) -> Self {
        Self {
            overall_score: 0.0,
            ast_similarity: 0.0,
            cfg_similarity: 0.0,
            dag_similarity: 0.0,
            node_count_a: 0,
            node_count_b: 0,
            verdict,
        }
    }

    /// Result for an absent input (e.g. an unreadable file at the I/O
    /// boundary). All scores zero.
    #[must_use]
    pub fn null_input() -> Self {
        Self::terminal(Verdict::NullInput)
    }
}

/// Compares two source texts and produces one result record.
#[must_use]
pub fn compare(code_a: &str, code_b: &str) -> ComparisonResult {
    if code_a.is_empty() || code_b.is_empty() {
        return ComparisonResult::terminal(Verdict::EmptyCode);
    }

    if code_a == code_b {
        let mut result = ComparisonResult::terminal(Verdict::ExactCopy);
        result.overall_score = 1.0;
        result.ast_similarity = 1.0;
        result.cfg_similarity = 1.0;
        result.dag_similarity = 1.0;
        return result;
    }

    let tokens_a = lexer::tokenize(code_a);
    let tokens_b = lexer::tokenize(code_b);
    if tokens_a.len() < MIN_TOKENS || tokens_b.len() < MIN_TOKENS {
        return ComparisonResult::terminal(Verdict::TooSmall);
    }

    let ast_a = parser::parse(&tokens_a);
    let ast_b = parser::parse(&tokens_b);

    let node_count_a = ast_a.node_count();
    let node_count_b = ast_b.node_count();
    if node_count_a < MIN_AST_NODES || node_count_b < MIN_AST_NODES {
        let mut result = ComparisonResult::terminal(Verdict::TooSimple);
        result.node_count_a = node_count_a;
        result.node_count_b = node_count_b;
        return result;
    }

    let norm_a = normalizer::normalize(&ast_a);
    let norm_b = normalizer::normalize(&ast_b);

    let ast_similarity = ast_similarity(&norm_a, &norm_b);

    let cfg_a = cfg::build_cfg(&norm_a);
    let cfg_b = cfg::build_cfg(&norm_b);
    let cfg_similarity = if cfg_a.node_count() > 2 && cfg_b.node_count() > 2 {
        cfg::compare_cfg(&cfg_a, &cfg_b)
    } else {
        ast_similarity * 0.9
    };

    let dag_a = dag::build_dag(&norm_a);
    let dag_b = dag::build_dag(&norm_b);
    let dag_similarity = if dag_a.node_count() > 0 && dag_b.node_count() > 0 {
        dag::compare_dag(&dag_a, &dag_b)
    } else {
        ast_similarity * 0.85
    };

    let overall_score = overall_score(
        ast_similarity,
        cfg_similarity,
        dag_similarity,
        node_count_a,
        node_count_b,
    );

    ComparisonResult {
        overall_score,
        ast_similarity,
        cfg_similarity,
        dag_similarity,
        node_count_a,
        node_count_b,
        verdict: Verdict::from_score(overall_score),
    }
}

/// Positional edit distance between two subtrees: 1 per kind mismatch, and
/// children compared index by index, a missing child costing its
/// counterpart's full subtree size. A linear approximation, not the optimal
/// tree edit distance.
fn tree_distance(a: Option<&AstNode>, b: Option<&AstNode>) -> usize {
    match (a, b) {
        (None, None) => 0,
        (Some(a), None) => a.node_count(),
        (None, Some(b)) => b.node_count(),
        (Some(a), Some(b)) => {
            let cost = usize::from(a.kind != b.kind);
            if a.children.is_empty() && b.children.is_empty() {
                return cost;
            }
            let max_children = a.children.len().max(b.children.len());
            let mut total = cost;
            for i in 0..max_children {
                total += tree_distance(a.children.get(i), b.children.get(i));
            }
            total
        }
    }
}

/// AST similarity over canonical trees, normalized against 1.5 × the larger
/// tree and clamped into [0, 1].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ast_similarity(a: &AstNode, b: &AstNode) -> f64 {
    let distance = tree_distance(Some(a), Some(b));
    let max_size = a.node_count().max(b.node_count());
    if max_size == 0 {
        return 1.0;
    }
    (1.0 - distance as f64 / (max_size as f64 * 1.5)).clamp(0.0, 1.0)
}

/// Blends the three metrics into the overall score.
///
/// Weights are picked by the bucket of the average raw node count, then two
/// post-adjustments apply in order: a 1.08× boost (capped at 1.0) when the
/// metrics agree tightly above 0.6, or a 0.92× damp when they disagree
/// widely; and a size-ratio discount of 0.75× below 0.4 or 0.90× below 0.6.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn overall_score(ast: f64, cfg: f64, dag: f64, nodes_a: usize, nodes_b: usize) -> f64 {
    let avg_nodes = (nodes_a + nodes_b) / 2;
    let (w_ast, w_cfg, w_dag) = if avg_nodes < 10 {
        WEIGHTS_SMALL
    } else if avg_nodes < 30 {
        WEIGHTS_MEDIUM
    } else {
        WEIGHTS_LARGE
    };

    let mut score = w_ast * ast + w_cfg * cfg + w_dag * dag;

    let min_metric = ast.min(cfg).min(dag);
    let max_metric = ast.max(cfg).max(dag);
    let spread = max_metric - min_metric;

    if spread < 0.15 && score > 0.6 {
        score = (score * 1.08).min(1.0);
    } else if spread > 0.35 {
        score *= 0.92;
    }

    let max_nodes = nodes_a.max(nodes_b);
    let size_ratio = if max_nodes == 0 {
        1.0
    } else {
        nodes_a.min(nodes_b) as f64 / max_nodes as f64
    };
    if size_ratio < 0.4 {
        score *= 0.75;
    } else if size_ratio < 0.6 {
        score *= 0.90;
    }

    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_bands_at_boundaries() {
        assert_eq!(Verdict::from_score(1.0), Verdict::AlmostIdentical);
        assert_eq!(Verdict::from_score(0.85), Verdict::AlmostIdentical);
        assert_eq!(Verdict::from_score(0.8499), Verdict::LikelyPlagiarized);
        assert_eq!(Verdict::from_score(0.75), Verdict::LikelyPlagiarized);
        assert_eq!(Verdict::from_score(0.7499), Verdict::SameLogic);
        assert_eq!(Verdict::from_score(0.60), Verdict::SameLogic);
        assert_eq!(Verdict::from_score(0.5999), Verdict::CommonPatterns);
        assert_eq!(Verdict::from_score(0.40), Verdict::CommonPatterns);
        assert_eq!(Verdict::from_score(0.3999), Verdict::DifferentApproaches);
        assert_eq!(Verdict::from_score(0.25), Verdict::DifferentApproaches);
        assert_eq!(Verdict::from_score(0.2499), Verdict::LikelyDifferent);
        assert_eq!(Verdict::from_score(0.0), Verdict::LikelyDifferent);
    }

    #[test]
    fn size_ratio_discount_is_monotonic() {
        let even = overall_score(0.8, 0.8, 0.8, 100, 100);
        let lopsided = overall_score(0.8, 0.8, 0.8, 59, 100);
        let extreme = overall_score(0.8, 0.8, 0.8, 39, 100);
        assert!(even > lopsided);
        assert!(lopsided > extreme);
    }

    #[test]
    fn agreement_boost_caps_at_one() {
        let score = overall_score(1.0, 1.0, 1.0, 50, 50);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn disagreement_damps_the_blend() {
        // Spread of 0.6 triggers the 0.92 damp.
        let damped = overall_score(0.9, 0.3, 0.6, 50, 50);
        let raw = 0.25 * 0.9 + 0.40 * 0.3 + 0.35 * 0.6;
        assert!((damped - raw * 0.92).abs() < 1e-9);
    }

    #[test]
    fn ast_similarity_clamps_at_zero() {
        use crate::analysis::lexer::tokenize;
        use crate::analysis::normalizer::normalize;
        use crate::analysis::parser::parse;

        let a = normalize(&parse(&tokenize("x = 1;")));
        let b = normalize(&parse(&tokenize(
            "while (p > 0) { if (q > p) { r[p] = q; } p = p - 1; }",
        )));
        let sim = ast_similarity(&a, &b);
        assert!((0.0..=1.0).contains(&sim));
    }
}
