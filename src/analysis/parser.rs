// src/analysis/parser.rs
//! Recursive-descent parser with single-token lookahead.
//!
//! Total: [`parse`] always returns a program node, possibly near-empty for
//! severely malformed input. There is no error type; recovery is built into
//! the statement loop. Whenever a statement parse yields nothing, the loop
//! advances exactly one token if the failed attempt consumed none, so every
//! iteration makes forward progress and arbitrary garbage terminates.
//!
//! The expression grammar climbs primary → multiplicative → additive → one
//! flat level for all relational, equality and logical operators with
//! left-to-right associativity and no precedence among them. Downstream
//! comparisons depend on the exact tree shapes produced here.

use super::ast::{AstKind, AstNode};
use super::lexer::{self, Token, TokenKind};

/// Type keywords that can open a declaration.
const TYPE_KEYWORDS: &[&str] = &[
    "int", "float", "char", "double", "long", "short", "unsigned", "signed", "void",
];

/// Width/signedness keywords that may follow the first type keyword.
const TYPE_SUFFIX_KEYWORDS: &[&str] = &["int", "long", "short", "unsigned", "signed"];

/// Tokenizes and parses source text in one step.
#[must_use]
pub fn parse_source(code: &str) -> AstNode {
    parse(&lexer::tokenize(code))
}

/// Parses a token sequence into an AST rooted at a program node.
#[must_use]
pub fn parse(tokens: &[Token]) -> AstNode {
    let mut root = AstNode::new(AstKind::Program, "program");

    // Recovery relies on a trailing end-of-file token; append one for
    // slices that did not come from the lexer.
    let owned: Vec<Token>;
    let tokens = if tokens.last().is_some_and(|t| t.kind == TokenKind::Eof) {
        tokens
    } else {
        let line = tokens.last().map_or(1, |t| t.line);
        owned = tokens
            .iter()
            .cloned()
            .chain(std::iter::once(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                line,
            }))
            .collect();
        &owned
    };

    let mut parser = Parser { tokens, pos: 0 };
    while !parser.check(TokenKind::Eof) {
        let before = parser.pos;
        match parser.parse_statement() {
            Some(stmt) => root.push(stmt),
            None => {
                if parser.pos == before {
                    parser.advance();
                }
            }
        }
    }
    root
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn check_keyword(&self, keyword: &str) -> bool {
        let tok = self.current();
        tok.kind == TokenKind::Keyword && tok.text == keyword
    }

    /// Consumes the current token if it has the given kind.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn parse_statement(&mut self) -> Option<AstNode> {
        if TYPE_KEYWORDS.iter().any(|k| self.check_keyword(k)) {
            return self.parse_declaration();
        }

        if self.check(TokenKind::Identifier) {
            return self.parse_assignment_statement();
        }

        if self.check_keyword("if") {
            return self.parse_if();
        }

        if self.check_keyword("while") {
            return self.parse_while();
        }

        if self.check_keyword("for") {
            return self.parse_for();
        }

        if self.check_keyword("do") {
            return self.parse_do_while();
        }

        if self.check_keyword("switch") {
            return self.parse_switch();
        }

        if self.check_keyword("return") {
            self.advance();
            let mut ret = AstNode::new(AstKind::Return, "return");
            if !self.check(TokenKind::Semicolon) {
                if let Some(expr) = self.parse_expression() {
                    ret.push(expr);
                }
            }
            self.eat(TokenKind::Semicolon);
            return Some(ret);
        }

        if self.check_keyword("break") {
            self.advance();
            self.eat(TokenKind::Semicolon);
            return Some(AstNode::new(AstKind::Break, "break"));
        }

        if self.check_keyword("continue") {
            self.advance();
            self.eat(TokenKind::Semicolon);
            return Some(AstNode::new(AstKind::Continue, "continue"));
        }

        if self.check(TokenKind::LBrace) {
            return self.parse_block();
        }

        None
    }

    /// Declarations, and the special case of an identifier immediately
    /// followed by `(`: a function definition. Parameters are skipped unread
    /// and only the brace-delimited body is kept; the function's own name and
    /// identity are discarded.
    fn parse_declaration(&mut self) -> Option<AstNode> {
        self.advance();
        while TYPE_SUFFIX_KEYWORDS.iter().any(|k| self.check_keyword(k)) {
            self.advance();
        }

        if !self.check(TokenKind::Identifier) {
            return None;
        }
        let name = self.current().text.clone();
        self.advance();

        if self.check(TokenKind::LParen) {
            self.advance();
            while !self.check(TokenKind::RParen) && !self.check(TokenKind::Eof) {
                self.advance();
            }
            self.eat(TokenKind::RParen);

            if self.check(TokenKind::LBrace) {
                return self.parse_block();
            }

            // Prototype without a body contributes nothing.
            self.eat(TokenKind::Semicolon);
            return None;
        }

        if self.check(TokenKind::LBracket) {
            self.advance();
            if self.check(TokenKind::Number) {
                self.advance();
            }
            self.eat(TokenKind::RBracket);
        }

        if self.check(TokenKind::Assign) {
            self.advance();
            let mut assign = AstNode::new(AstKind::Assign, "=");
            assign.push(AstNode::new(AstKind::Var, name));
            if let Some(expr) = self.parse_expression() {
                assign.push(expr);
            }
            self.eat(TokenKind::Semicolon);
            return Some(assign);
        }

        // A declaration without an initializer produces no node.
        self.eat(TokenKind::Semicolon);
        None
    }

    fn parse_assignment_statement(&mut self) -> Option<AstNode> {
        let name = self.current().text.clone();
        self.advance();

        if self.check(TokenKind::LBracket) {
            self.advance();
            let index = self.parse_expression();
            self.eat(TokenKind::RBracket);

            if self.check(TokenKind::Assign) {
                self.advance();
                let mut assign = AstNode::new(AstKind::Assign, "=");
                let mut access = AstNode::new(AstKind::ArrayAccess, name);
                if let Some(index) = index {
                    access.push(index);
                }
                assign.push(access);
                if let Some(expr) = self.parse_expression() {
                    assign.push(expr);
                }
                self.eat(TokenKind::Semicolon);
                return Some(assign);
            }
        }

        if self.check(TokenKind::Assign) {
            self.advance();
            let mut assign = AstNode::new(AstKind::Assign, "=");
            assign.push(AstNode::new(AstKind::Var, name));
            if let Some(expr) = self.parse_expression() {
                assign.push(expr);
            }
            self.eat(TokenKind::Semicolon);
            return Some(assign);
        }

        if self.check(TokenKind::Operator) {
            let op = &self.current().text;
            if op == "++" || op == "--" {
                self.advance();
                self.eat(TokenKind::Semicolon);
            }
        }

        None
    }

    fn parse_if(&mut self) -> Option<AstNode> {
        self.advance();
        if !self.check(TokenKind::LParen) {
            return None;
        }
        self.advance();

        let mut if_node = AstNode::new(AstKind::If, "if");
        if let Some(cond) = self.parse_expression() {
            if_node.push(cond);
        }

        if !self.check(TokenKind::RParen) {
            return None;
        }
        self.advance();

        if let Some(then_body) = self.parse_block() {
            if_node.push(then_body);
        }

        if self.check_keyword("else") {
            self.advance();
            if let Some(else_body) = self.parse_block() {
                if_node.push(else_body);
            }
        }

        Some(if_node)
    }

    fn parse_while(&mut self) -> Option<AstNode> {
        self.advance();
        if !self.check(TokenKind::LParen) {
            return None;
        }
        self.advance();

        let mut while_node = AstNode::new(AstKind::While, "while");
        if let Some(cond) = self.parse_expression() {
            while_node.push(cond);
        }

        if !self.check(TokenKind::RParen) {
            return None;
        }
        self.advance();

        if let Some(body) = self.parse_block() {
            while_node.push(body);
        }

        Some(while_node)
    }

    /// `for` always yields a 4-child node: init, condition, increment, body.
    /// Elided clauses default to placeholder nodes so the shape is uniform.
    fn parse_for(&mut self) -> Option<AstNode> {
        self.advance();
        if !self.check(TokenKind::LParen) {
            return None;
        }
        self.advance();

        let mut for_node = AstNode::new(AstKind::For, "for");

        let init = if self.check(TokenKind::Semicolon) {
            None
        } else {
            self.parse_statement()
        };
        self.eat(TokenKind::Semicolon);

        let cond = if self.check(TokenKind::Semicolon) {
            None
        } else {
            self.parse_expression()
        };
        self.eat(TokenKind::Semicolon);

        let inc = if self.check(TokenKind::RParen) {
            None
        } else {
            self.parse_expression()
        };
        self.eat(TokenKind::RParen);

        let body = self.parse_block();

        for_node.push(init.unwrap_or_else(|| AstNode::new(AstKind::Literal, "NULL")));
        for_node.push(cond.unwrap_or_else(|| AstNode::new(AstKind::Literal, "1")));
        for_node.push(inc.unwrap_or_else(|| AstNode::new(AstKind::Literal, "NULL")));
        for_node.push(body.unwrap_or_else(|| AstNode::new(AstKind::Block, "empty")));

        Some(for_node)
    }

    /// `do ... while` shares the while node kind and is tagged as a canonical
    /// loop up front; children end up in [condition, body] order.
    fn parse_do_while(&mut self) -> Option<AstNode> {
        self.advance();

        let mut do_node = AstNode::new(AstKind::While, "loop");
        let body = self.parse_block();

        if self.check_keyword("while") {
            self.advance();
            self.eat(TokenKind::LParen);
            if let Some(cond) = self.parse_expression() {
                do_node.push(cond);
            }
            self.eat(TokenKind::RParen);
        }

        if let Some(body) = body {
            do_node.push(body);
        }
        self.eat(TokenKind::Semicolon);

        Some(do_node)
    }

    fn parse_switch(&mut self) -> Option<AstNode> {
        self.advance();
        if !self.check(TokenKind::LParen) {
            return None;
        }
        self.advance();

        let mut switch_node = AstNode::new(AstKind::Switch, "switch");
        if let Some(expr) = self.parse_expression() {
            switch_node.push(expr);
        }

        if !self.check(TokenKind::RParen) {
            return None;
        }
        self.advance();
        if !self.check(TokenKind::LBrace) {
            return None;
        }
        self.advance();

        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            if self.check_keyword("case") {
                self.advance();
                let mut case_node = AstNode::new(AstKind::Case, "case");
                if let Some(value) = self.parse_expression() {
                    case_node.push(value);
                }
                self.eat(TokenKind::Colon);

                let mut case_body = AstNode::new(AstKind::Block, "case_body");
                while !self.check_keyword("case")
                    && !self.check_keyword("default")
                    && !self.check(TokenKind::RBrace)
                    && !self.check(TokenKind::Eof)
                {
                    if self.check_keyword("break") {
                        self.advance();
                        self.eat(TokenKind::Semicolon);
                        break;
                    }
                    let before = self.pos;
                    match self.parse_statement() {
                        Some(stmt) => case_body.push(stmt),
                        None => {
                            if self.pos == before {
                                self.advance();
                            }
                        }
                    }
                }
                case_node.push(case_body);
                switch_node.push(case_node);
            } else if self.check_keyword("default") {
                self.advance();
                self.eat(TokenKind::Colon);

                // Default bodies are consumed but contribute no node.
                while !self.check_keyword("case")
                    && !self.check(TokenKind::RBrace)
                    && !self.check(TokenKind::Eof)
                {
                    if self.check_keyword("break") {
                        self.advance();
                        self.eat(TokenKind::Semicolon);
                        break;
                    }
                    let before = self.pos;
                    if self.parse_statement().is_none() && self.pos == before {
                        self.advance();
                    }
                }
            } else {
                self.advance();
            }
        }

        self.eat(TokenKind::RBrace);
        Some(switch_node)
    }

    fn parse_block(&mut self) -> Option<AstNode> {
        if !self.check(TokenKind::LBrace) {
            return self.parse_statement();
        }
        self.advance();

        let mut block = AstNode::new(AstKind::Block, "block");
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) {
            let before = self.pos;
            match self.parse_statement() {
                Some(stmt) => block.push(stmt),
                None => {
                    if self.pos == before {
                        self.advance();
                    }
                }
            }
        }

        self.eat(TokenKind::RBrace);
        Some(block)
    }

    fn parse_expression(&mut self) -> Option<AstNode> {
        self.parse_comparison()
    }

    /// One flat level for `< > <= >= == != && ||`, left-to-right.
    fn parse_comparison(&mut self) -> Option<AstNode> {
        let mut left = self.parse_additive()?;

        while self.check(TokenKind::Operator) {
            let op = self.current().text.clone();
            if !matches!(
                op.as_str(),
                "<" | ">" | "<=" | ">=" | "==" | "!=" | "&&" | "||"
            ) {
                break;
            }
            self.advance();
            let Some(right) = self.parse_additive() else {
                break;
            };
            let mut binop = AstNode::new(AstKind::BinOp, op);
            binop.push(left);
            binop.push(right);
            left = binop;
        }

        Some(left)
    }

    fn parse_additive(&mut self) -> Option<AstNode> {
        let mut left = self.parse_multiplicative()?;

        while self.check(TokenKind::Operator) {
            let op = self.current().text.clone();
            if !matches!(op.as_str(), "+" | "-") {
                break;
            }
            self.advance();
            let Some(right) = self.parse_multiplicative() else {
                break;
            };
            let mut binop = AstNode::new(AstKind::BinOp, op);
            binop.push(left);
            binop.push(right);
            left = binop;
        }

        Some(left)
    }

    fn parse_multiplicative(&mut self) -> Option<AstNode> {
        let mut left = self.parse_primary()?;

        while self.check(TokenKind::Operator) {
            let op = self.current().text.clone();
            if !matches!(op.as_str(), "*" | "/" | "%") {
                break;
            }
            self.advance();
            let Some(right) = self.parse_primary() else {
                break;
            };
            let mut binop = AstNode::new(AstKind::BinOp, op);
            binop.push(left);
            binop.push(right);
            left = binop;
        }

        Some(left)
    }

    fn parse_primary(&mut self) -> Option<AstNode> {
        if self.check(TokenKind::LParen) {
            self.advance();
            let expr = self.parse_comparison();
            self.eat(TokenKind::RParen);
            return expr;
        }

        if self.check(TokenKind::Number) {
            let node = AstNode::new(AstKind::Literal, self.current().text.clone());
            self.advance();
            return Some(node);
        }

        if self.check(TokenKind::Identifier) {
            let name = self.current().text.clone();
            self.advance();

            if self.check(TokenKind::LBracket) {
                self.advance();
                let mut access = AstNode::new(AstKind::ArrayAccess, name);
                if let Some(index) = self.parse_comparison() {
                    access.push(index);
                }
                self.eat(TokenKind::RBracket);
                return Some(access);
            }

            return Some(AstNode::new(AstKind::Var, name));
        }

        None
    }
}
