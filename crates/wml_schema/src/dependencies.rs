//! Free-variable extraction for embedded expressions.
//!
//! Works over the coarse token stream from
//! [`ExpressionLexer`](wml_language::expression::ExpressionLexer). Every
//! identifier that is not a keyword, property name, or object key is a
//! reference. A reference is dropped only when it falls inside the scope of
//! a binding of the same name (arrow or function parameter, `let`/`const`/
//! `var`, `catch` parameter), so a true dependency is never omitted.

use std::collections::BTreeSet;

use wml_language::expression::{ExprToken, ExpressionLexer};

pub(crate) const KEYWORDS: &[&str] = &[
    "async",
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "default",
    "delete",
    "do",
    "else",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "in",
    "instanceof",
    "let",
    "new",
    "null",
    "of",
    "return",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "undefined",
    "var",
    "void",
    "while",
    "yield",
];

/// A name bound over an inclusive range of token indices.
#[derive(Debug)]
struct Binding {
    name: String,
    site: usize,
    scope: (usize, usize),
}

/// Returns the free variables of an expression.
#[must_use]
pub fn extract(source: &str) -> BTreeSet<String> {
    let tokens = ExpressionLexer::tokenize_all(source);
    Scopes::new(&tokens).free_variables()
}

struct Scopes<'a> {
    tokens: &'a [ExprToken],
    /// Nesting depth each token sits at (brackets count at their outer depth).
    depth: Vec<usize>,
    /// Index of the matching bracket for every opener and closer.
    partner: Vec<Option<usize>>,
    bindings: Vec<Binding>,
}

impl<'a> Scopes<'a> {
    fn new(tokens: &'a [ExprToken]) -> Self {
        let mut depth = Vec::with_capacity(tokens.len());
        let mut partner = vec![None; tokens.len()];
        let mut open: Vec<usize> = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            match token {
                ExprToken::Open(_) => {
                    depth.push(open.len());
                    open.push(i);
                }
                ExprToken::Close(_) => {
                    if let Some(j) = open.pop() {
                        partner[i] = Some(j);
                        partner[j] = Some(i);
                    }
                    depth.push(open.len());
                }
                _ => depth.push(open.len()),
            }
        }
        Self {
            tokens,
            depth,
            partner,
            bindings: Vec::new(),
        }
    }

    fn free_variables(mut self) -> BTreeSet<String> {
        self.collect_bindings();
        let mut free = BTreeSet::new();
        for (i, token) in self.tokens.iter().enumerate() {
            let ExprToken::Ident(name) = token else {
                continue;
            };
            if KEYWORDS.contains(&name.as_str()) || self.is_property(i) || self.is_object_key(i) {
                continue;
            }
            let bound = self.bindings.iter().any(|b| {
                b.name == *name && (b.site == i || (b.scope.0 <= i && i <= b.scope.1))
            });
            if !bound {
                free.insert(name.clone());
            }
        }
        free
    }

    fn ident(&self, i: usize) -> Option<&str> {
        match self.tokens.get(i) {
            Some(ExprToken::Ident(name)) => Some(name),
            _ => None,
        }
    }

    fn punct(&self, i: usize, p: &str) -> bool {
        self.tokens.get(i).is_some_and(|t| t.is_punct(p))
    }

    /// `a.b` or `a?.b`: `b` is a property name.
    fn is_property(&self, i: usize) -> bool {
        i > 0 && (self.punct(i - 1, ".") || self.punct(i - 1, "?."))
    }

    /// `{ b: ... }`: `b` is an object key.
    fn is_object_key(&self, i: usize) -> bool {
        if i == 0 || !self.punct(i + 1, ":") {
            return false;
        }
        match self.tokens[i - 1] {
            ExprToken::Open('{') => true,
            _ => self.punct(i - 1, ",") && self.enclosing_opener(i) == Some('{'),
        }
    }

    /// Returns the bracket enclosing token `i`.
    fn enclosing_opener(&self, i: usize) -> Option<char> {
        let depth = self.depth[i];
        (0..i).rev().find_map(|j| match self.tokens[j] {
            ExprToken::Open(c) if self.depth[j] < depth && self.partner[j].is_none_or(|p| p > i) => {
                Some(c)
            }
            _ => None,
        })
    }

    fn collect_bindings(&mut self) {
        for i in 0..self.tokens.len() {
            if self.punct(i, "=>") {
                self.arrow(i);
            } else {
                match self.ident(i) {
                    Some("let" | "const" | "var") => self.declaration(i),
                    Some("function") => self.function(i),
                    Some("catch") => self.catch(i),
                    _ => {}
                }
            }
        }
    }

    fn bind(&mut self, site: usize, scope: (usize, usize)) {
        if let Some(name) = self.ident(site) {
            let name = name.to_string();
            self.bindings.push(Binding { name, site, scope });
        }
    }

    /// `x => body` or `(a, {b}, c = d) => body`.
    fn arrow(&mut self, arrow: usize) {
        let Some(before) = arrow.checked_sub(1) else {
            return;
        };
        let scope = (arrow + 1, self.body_end(arrow + 1, self.depth[arrow]));
        if self.ident(before).is_some() {
            self.bind(before, scope);
        } else if matches!(self.tokens[before], ExprToken::Close(')')) {
            if let Some(open) = self.partner[before] {
                for site in self.pattern_names(open, before) {
                    self.bind(site, scope);
                }
            }
        }
    }

    /// `let a = 1, {b} = c` binds to the end of the enclosing block.
    fn declaration(&mut self, keyword: usize) {
        let depth = self.depth[keyword];
        let end = self.block_end(keyword);
        let scope = (keyword, end);
        let mut i = keyword + 1;
        loop {
            match self.tokens.get(i) {
                Some(ExprToken::Ident(_)) => self.bind(i, scope),
                Some(ExprToken::Open('{' | '[')) => {
                    if let Some(close) = self.partner[i] {
                        for site in self.pattern_names(i, close) {
                            self.bind(site, scope);
                        }
                    }
                }
                _ => return,
            }
            // Skip the initializer to the next declarator
            let mut j = i + 1;
            while j <= end && j < self.tokens.len() {
                if self.depth[j] == depth && self.punct(j, ",") {
                    break;
                }
                if self.depth[j] == depth && self.punct(j, ";") {
                    return;
                }
                j += 1;
            }
            if j > end || j >= self.tokens.len() {
                return;
            }
            i = j + 1;
        }
    }

    /// `function name(a, b) { body }`
    fn function(&mut self, keyword: usize) {
        let mut open = keyword + 1;
        if self.ident(open).is_some() {
            let scope = (keyword, self.block_end(keyword));
            self.bind(open, scope);
            open += 1;
        }
        if !matches!(self.tokens.get(open), Some(ExprToken::Open('('))) {
            return;
        }
        let Some(close) = self.partner[open] else {
            return;
        };
        let body_end = match self.tokens.get(close + 1) {
            Some(ExprToken::Open('{')) => self.partner[close + 1].unwrap_or(self.tokens.len() - 1),
            _ => return,
        };
        for site in self.pattern_names(open, close) {
            self.bind(site, (open, body_end));
        }
    }

    /// `catch (e) { body }`
    fn catch(&mut self, keyword: usize) {
        let open = keyword + 1;
        if !matches!(self.tokens.get(open), Some(ExprToken::Open('('))) {
            return;
        }
        let Some(close) = self.partner[open] else {
            return;
        };
        if let Some(body_end) = self.partner.get(close + 1).copied().flatten() {
            for site in self.pattern_names(open, close) {
                self.bind(site, (open, body_end));
            }
        }
    }

    /// Names bound by a parameter list or destructuring pattern between the
    /// brackets at `open` and `close`. Default-value expressions are skipped.
    fn pattern_names(&self, open: usize, close: usize) -> Vec<usize> {
        let mut sites = Vec::new();
        // Depths of the default values currently being skipped
        let mut defaults: Vec<usize> = Vec::new();
        for i in open + 1..close {
            let depth = self.depth[i];
            if self.punct(i, "=") {
                defaults.push(depth);
                continue;
            }
            if self.punct(i, ",") {
                while defaults.last().is_some_and(|&d| d >= depth) {
                    defaults.pop();
                }
                continue;
            }
            if matches!(self.tokens[i], ExprToken::Close(_)) {
                while defaults.last().is_some_and(|&d| d > depth) {
                    defaults.pop();
                }
                continue;
            }
            if !defaults.is_empty() || self.ident(i).is_none() {
                continue;
            }
            let after_opener = matches!(self.tokens[i - 1], ExprToken::Open(_))
                || self.punct(i - 1, ",")
                || self.punct(i - 1, "...")
                || self.punct(i - 1, ":");
            let before_closer = matches!(self.tokens.get(i + 1), Some(ExprToken::Close(_)))
                || self.punct(i + 1, ",")
                || self.punct(i + 1, "=");
            if after_opener && before_closer {
                sites.push(i);
            }
        }
        sites
    }

    /// End of an arrow body starting at `start`.
    fn body_end(&self, start: usize, depth: usize) -> usize {
        let last = self.tokens.len().saturating_sub(1);
        match self.tokens.get(start) {
            Some(ExprToken::Open('{')) => self.partner[start].unwrap_or(last),
            Some(_) => {
                for i in start..self.tokens.len() {
                    let closes = matches!(self.tokens[i], ExprToken::Close(_)) && self.depth[i] < depth;
                    let separates = self.depth[i] == depth && (self.punct(i, ",") || self.punct(i, ";"));
                    if closes || separates {
                        return i.saturating_sub(1).max(start);
                    }
                }
                last
            }
            None => last,
        }
    }

    /// End of the block enclosing `i`.
    fn block_end(&self, i: usize) -> usize {
        let depth = self.depth[i];
        (i..self.tokens.len())
            .find(|&j| matches!(self.tokens[j], ExprToken::Close(_)) && self.depth[j] < depth)
            .unwrap_or(self.tokens.len().saturating_sub(1))
    }
}
