// src/analysis/dag.rs
//! Expression graph derivation: the AST quotiented by structural hash.
//!
//! Each subtree is converted bottom-up into a node carrying a structural
//! hash. When a freshly built node's hash already exists in the graph, the
//! existing node is reused and the new one discarded; that sharing is what
//! makes the result a DAG instead of a tree. Unification is by hash alone,
//! with no structural verification. Operand edges are indices into the
//! graph's own node list.

use super::ast::{AstKind, AstNode};

/// One DAG node: kind, structural hash and non-owning operand references.
#[derive(Debug, Clone)]
pub struct DagNode {
    pub id: usize,
    pub kind: AstKind,
    pub hash: u64,
    pub operands: Vec<usize>,
}

/// A structurally-deduplicated expression/statement graph.
#[derive(Debug, Clone, Default)]
pub struct Dag {
    pub nodes: Vec<DagNode>,
}

impl Dag {
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn find_by_hash(&self, hash: u64) -> Option<usize> {
        self.nodes.iter().position(|n| n.hash == hash)
    }
}

/// Builds the DAG of a canonical AST. Each top-level statement is converted
/// in order; the program node itself has no counterpart in the graph.
#[must_use]
pub fn build_dag(ast: &AstNode) -> Dag {
    let mut dag = Dag::default();
    for child in &ast.children {
        convert(child, &mut dag);
    }
    dag
}

/// djb2 over the payload, mixed with the node kind as the seed.
fn seed_hash(kind: AstKind, value: &str) -> u64 {
    let mut hash: u64 = 5381;
    for byte in value.bytes() {
        hash = (hash << 5).wrapping_add(hash).wrapping_add(u64::from(byte));
    }
    hash.wrapping_mul(31).wrapping_add(kind as u64)
}

/// Converts one subtree, returning the index of its representative node.
fn convert(node: &AstNode, dag: &mut Dag) -> usize {
    let mut hash = seed_hash(node.kind, &node.value);
    let mut operands = Vec::with_capacity(node.children.len());

    for child in &node.children {
        let operand = convert(child, dag);
        let operand_hash = dag.nodes[operand].hash;
        // Binary operators fold operand hashes commutatively so `a+b` and
        // `b+a` unify; everything else is order-dependent.
        if node.kind == AstKind::BinOp {
            hash ^= operand_hash;
        } else {
            hash = hash.wrapping_mul(31).wrapping_add(operand_hash);
        }
        operands.push(operand);
    }

    if let Some(existing) = dag.find_by_hash(hash) {
        return existing;
    }

    let id = dag.nodes.len();
    dag.nodes.push(DagNode {
        id,
        kind: node.kind,
        hash,
        operands,
    });
    id
}

/// DAG similarity: 0.7 × hash-overlap ratio + 0.3 × positional kind-match
/// ratio. Each node of `a` whose hash occurs anywhere in `b` counts double,
/// against the combined node count.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compare_dag(a: &Dag, b: &Dag) -> f64 {
    if a.nodes.is_empty() || b.nodes.is_empty() {
        return 0.0;
    }

    let total = a.nodes.len() + b.nodes.len();
    let mut hash_matches = 0usize;
    for node in &a.nodes {
        if b.nodes.iter().any(|m| m.hash == node.hash) {
            hash_matches += 2;
        }
    }
    let hash_sim = hash_matches as f64 / total as f64;

    let min_count = a.nodes.len().min(b.nodes.len());
    let max_count = a.nodes.len().max(b.nodes.len());
    let type_matches = (0..min_count)
        .filter(|&i| a.nodes[i].kind == b.nodes[i].kind)
        .count();
    let type_sim = type_matches as f64 / max_count as f64;

    0.7 * hash_sim + 0.3 * type_sim
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::lexer::tokenize;
    use crate::analysis::normalizer::normalize;
    use crate::analysis::parser::parse;

    fn dag_of(code: &str) -> (Dag, usize) {
        let norm = normalize(&parse(&tokenize(code)));
        (build_dag(&norm), norm.node_count())
    }

    #[test]
    fn commutative_subexpressions_unify() {
        let (dag, ast_nodes) = dag_of("x = a + b; y = b + a;");
        let binops = dag
            .nodes
            .iter()
            .filter(|n| n.kind == AstKind::BinOp)
            .count();
        assert_eq!(binops, 1, "a+b and b+a must share one node");
        assert!(dag.node_count() < ast_nodes);
    }

    #[test]
    fn identical_statements_share_everything() {
        let (dag, _) = dag_of("x = a * 2; y = a * 2;");
        // var_0 = .. and var_2 = .. differ, but the multiply subtree and its
        // leaves are shared.
        let multiplies = dag
            .nodes
            .iter()
            .filter(|n| n.kind == AstKind::BinOp)
            .count();
        assert_eq!(multiplies, 1);
    }

    #[test]
    fn ordered_nodes_stay_distinct() {
        let (dag, _) = dag_of("a[1] = 0; a[2] = 0;");
        let accesses = dag
            .nodes
            .iter()
            .filter(|n| n.kind == AstKind::ArrayAccess)
            .count();
        assert_eq!(accesses, 2, "different indices must not unify");
    }

    #[test]
    fn identical_graphs_score_one() {
        let (a, _) = dag_of("x = 1 + 2;");
        let (b, _) = dag_of("y = 2 + 1;");
        let sim = compare_dag(&a, &b);
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_dag_scores_zero() {
        let empty = Dag::default();
        let (full, _) = dag_of("x = 1 + 2;");
        assert_eq!(compare_dag(&empty, &full), 0.0);
    }
}
