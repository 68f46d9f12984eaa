// src/analysis/normalizer.rs
//! Canonicalization pass: erases syntactic variation while preserving
//! execution structure.
//!
//! Rewrites, applied top-down with one rename table threaded through the
//! whole pass:
//! 1. `switch` becomes a nested `if`/`else` chain comparing the switch
//!    expression against each case value with `==`. Fallthrough is lost and
//!    `default` is dropped.
//! 2. `for (init; cond; inc) body` becomes `{ init; while (cond) { body; inc } }`.
//! 3. Every loop node carries the same canonical `loop` tag.
//! 4. Identifiers are renamed `var_0`, `var_1`, ... in first-seen order over
//!    the whole file (shadowing across nested scopes is not modeled); integer
//!    width keywords collapse to `int` and `double` to `float`.
//!
//! The input tree is not mutated; the output is freshly built.

use super::ast::{AstKind, AstNode};
use std::collections::HashMap;

/// Identifier rename table local to one normalization pass.
#[derive(Debug, Default)]
struct RenameTable {
    map: HashMap<String, String>,
}

impl RenameTable {
    /// Canonical name for `original`, assigned in first-seen order.
    fn canonical(&mut self, original: &str) -> String {
        if let Some(name) = self.map.get(original) {
            return name.clone();
        }
        let name = format!("var_{}", self.map.len());
        self.map.insert(original.to_string(), name.clone());
        name
    }
}

/// Produces the canonical form of `ast`. Deterministic: structurally equal
/// inputs yield structurally equal outputs, and the pass is idempotent.
#[must_use]
pub fn normalize(ast: &AstNode) -> AstNode {
    let mut table = RenameTable::default();
    normalize_node(ast, &mut table)
}

fn normalize_node(node: &AstNode, table: &mut RenameTable) -> AstNode {
    if node.kind == AstKind::Switch {
        return rewrite_switch(node, table);
    }
    if node.kind == AstKind::For {
        return desugar_for(node, table);
    }

    let value = match node.kind {
        AstKind::Var | AstKind::ArrayAccess => match node.value.as_str() {
            "long" | "short" | "unsigned" | "signed" => "int".to_string(),
            "double" => "float".to_string(),
            _ => table.canonical(&node.value),
        },
        AstKind::While => "loop".to_string(),
        _ => node.value.clone(),
    };

    let mut out = AstNode::new(node.kind, value);
    for child in &node.children {
        out.push(normalize_node(child, table));
    }
    out
}

/// `for (init; cond; inc) body` → `{ init; while (cond) { body...; inc } }`.
///
/// Clauses are normalized in source order (init, cond, body, inc) so the
/// rename table sees identifiers exactly as a second pass over the desugared
/// tree would, which is what makes normalization idempotent.
fn desugar_for(node: &AstNode, table: &mut RenameTable) -> AstNode {
    let init = node.children.first();
    let cond = node.children.get(1);
    let inc = node.children.get(2);
    let body = node.children.get(3);

    let mut outer = AstNode::new(AstKind::Block, "block");
    if let Some(init) = init {
        outer.push(normalize_node(init, table));
    }

    let mut while_node = AstNode::new(AstKind::While, "loop");
    match cond {
        Some(cond) => while_node.push(normalize_node(cond, table)),
        None => while_node.push(AstNode::new(AstKind::Literal, "1")),
    }

    let mut while_body = AstNode::new(AstKind::Block, "block");
    if let Some(body) = body {
        let b = normalize_node(body, table);
        if b.kind == AstKind::Block {
            for child in b.children {
                while_body.push(child);
            }
        } else {
            while_body.push(b);
        }
    }
    if let Some(inc) = inc {
        while_body.push(normalize_node(inc, table));
    }
    while_node.push(while_body);

    outer.push(while_node);
    outer
}

/// `switch` → nested `if`/`else` chain. Each case becomes an exclusive
/// branch testing `switch_expr == case_value`; the next case nests in the
/// else slot. `default` has no counterpart in the output.
fn rewrite_switch(node: &AstNode, table: &mut RenameTable) -> AstNode {
    if node.children.len() < 2 {
        return node.clone();
    }
    let switch_expr = &node.children[0];

    let mut arms: Vec<AstNode> = Vec::new();
    for case_node in &node.children[1..] {
        if case_node.kind != AstKind::Case || case_node.children.len() < 2 {
            continue;
        }

        let mut condition = AstNode::new(AstKind::BinOp, "==");
        condition.push(switch_expr.clone());
        condition.push(case_node.children[0].clone());

        let mut if_node = AstNode::new(AstKind::If, "if");
        if_node.push(condition);
        if_node.push(case_node.children[1].clone());
        arms.push(if_node);
    }

    let chain = arms.into_iter().rev().reduce(|else_branch, mut if_node| {
        if_node.push(else_branch);
        if_node
    });

    match chain {
        Some(chain) => normalize_node(&chain, table),
        None => node.clone(),
    }
}
