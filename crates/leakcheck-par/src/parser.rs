//! The permissive class-and-function skeleton parser (spec §4.2).
//!
//! This is not a C++ grammar. It's a flat token-stream walker with small,
//! fixed look-ahead windows that makes local decisions ("does this look like
//! a member declaration?") and falls back to "advance one token" whenever it
//! doesn't recognize what's in front of it. Everything it can't place —
//! templates, macros it didn't already lose in the lexer, nested
//! types it doesn't special-case — just gets walked over one token at a
//! time, which is also how its brace-depth tracking stays correct in the
//! presence of constructs it never explicitly models.

use leakcheck_lex::{lex, Token, TokenKind};
use leakcheck_util::Span;

use crate::model::{Allocation, Class, Deallocation, Function, Member, PointerAlias};

/// Parses one source file into the class records it can recover from it.
/// `file` is used only for display/merge-tiebreak purposes (see the
/// registry's header-vs-implementation preference).
pub fn parse_source(source: &str, file: &str) -> Vec<Class> {
    let tokens = lex(source);
    Parser { tokens, pos: 0 }.run(file)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn run(&mut self, file: &str) -> Vec<Class> {
        let mut classes: Vec<Class> = Vec::new();
        while !self.at_end() {
            let t = self.cur().clone();
            if self.is_kw(&t, "class") || self.is_kw(&t, "struct") {
                self.advance();
                if let Some(class) = self.parse_inline_class(file) {
                    classes.push(class);
                }
                continue;
            }
            if self.looks_like_out_of_class_method() {
                if let Some((class_name, function)) = self.parse_out_of_class_method() {
                    self.attach_function(&mut classes, file, class_name, function);
                    continue;
                }
            }
            self.advance();
        }
        classes
    }

    fn attach_function(
        &self,
        classes: &mut Vec<Class>,
        file: &str,
        class_name: String,
        function: Function,
    ) {
        let idx = match classes.iter().position(|c| c.name == class_name) {
            Some(i) => i,
            None => {
                classes.push(Class::placeholder(class_name, file));
                classes.len() - 1
            }
        };
        let class = &mut classes[idx];
        if function.is_destructor {
            class.destructor = Some(function);
        } else if function.name == class.name {
            class.constructor = Some(function);
        } else {
            class.methods.insert(function.name.clone(), function);
        }
    }

    // ---- §4.2.1 inline class ------------------------------------------

    fn parse_inline_class(&mut self, file: &str) -> Option<Class> {
        if !self.is_ident(self.cur()) {
            return None;
        }
        let name_tok = self.cur().clone();
        let class_name = name_tok.lexeme.clone();
        self.advance();

        // Inheritance list, ignored in full.
        while !self.at_end() && !self.is_punct(self.cur(), "{") && !self.is_punct(self.cur(), ";")
        {
            self.advance();
        }
        if self.is_punct(self.cur(), ";") {
            self.advance();
            return None; // forward declaration
        }
        if !self.is_punct(self.cur(), "{") {
            return None;
        }
        self.advance(); // consume '{'

        let mut class = Class::new(class_name.clone(), file.to_string(), name_tok.span);
        let mut depth = 1i32;

        while !self.at_end() && depth > 0 {
            let t = self.cur().clone();

            if self.is_kw(&t, "public") || self.is_kw(&t, "private") || self.is_kw(&t, "protected")
            {
                self.advance();
                if self.is_punct(self.cur(), ":") {
                    self.advance();
                }
                continue;
            }

            let is_destructor_start = (self.is_op(&t, "~")
                && self.is_ident(self.at(1))
                && self.at(1).lexeme == class_name)
                || (self.is_kw(&t, "virtual") && self.is_op(self.at(1), "~"));
            if is_destructor_start {
                class.destructor = Some(self.parse_inline_destructor(&class_name));
                continue;
            }

            if self.is_ident(&t) && t.lexeme == class_name && self.is_punct(self.at(1), "(") {
                class.constructor = Some(self.parse_inline_constructor(&class_name));
                continue;
            }

            if self.looks_like_member() {
                if let Some(member) = self.parse_member() {
                    class.members.push(member);
                }
                continue;
            }

            if self.looks_like_function_start() {
                if let Some(function) = self.parse_generic_method() {
                    class.methods.insert(function.name.clone(), function);
                }
                continue;
            }

            if self.is_punct(&t, "{") {
                depth += 1;
                self.advance();
                continue;
            }
            if self.is_punct(&t, "}") {
                depth -= 1;
                class.end_line = t.span;
                self.advance();
                continue;
            }
            self.advance();
        }

        Some(class)
    }

    /// §4.2.4 — destructor written inline in a class body.
    fn parse_inline_destructor(&mut self, class_name: &str) -> Function {
        if self.is_kw(self.cur(), "virtual") {
            self.advance();
        }
        let tilde = self.cur().clone(); // '~'
        self.advance();
        if self.is_ident(self.cur()) {
            self.advance(); // class-name ident
        }
        self.skip_balanced_if_open("(", ")");

        let mut function = Function::new(format!("~{}", class_name), true, tilde.span);
        self.finish_ctor_or_dtor_body(&mut function, false);
        function
    }

    /// §4.2.5 — constructor written inline in a class body.
    fn parse_inline_constructor(&mut self, class_name: &str) -> Function {
        let name_tok = self.cur().clone();
        self.advance(); // class-name ident
        self.skip_balanced_if_open("(", ")");

        let mut function = Function::new(class_name, false, name_tok.span);
        self.finish_ctor_or_dtor_body(&mut function, true);
        function
    }

    /// Shared tail of §4.2.4/§4.2.5: optional initializer list (constructors
    /// only), then either a `;` declaration or a `{ ... }` body.
    fn finish_ctor_or_dtor_body(&mut self, function: &mut Function, allow_init_list: bool) {
        if allow_init_list && self.is_punct(self.cur(), ":") {
            while !self.at_end()
                && !self.is_punct(self.cur(), "{")
                && !self.is_punct(self.cur(), ";")
            {
                self.advance();
            }
        }
        if self.is_punct(self.cur(), ";") {
            function.end_line = self.cur().span;
            self.advance();
            return;
        }
        if self.is_punct(self.cur(), "{") {
            self.fill_body(function);
        }
    }

    /// §4.2.6 — pointer-member declaration.
    fn parse_member(&mut self) -> Option<Member> {
        let mut run: Vec<Token> = Vec::new();
        while !self.at_end() && !self.is_punct(self.cur(), ";") {
            run.push(self.advance());
        }
        if self.is_punct(self.cur(), ";") {
            self.advance();
        }

        let is_pointer = run.iter().any(|t| self.is_op(t, "*"));
        let is_array = run.iter().any(|t| self.is_punct(t, "["));
        if !is_pointer {
            return None;
        }

        let mut name_idx = None;
        for (i, t) in run.iter().enumerate() {
            if t.kind != TokenKind::Ident {
                continue;
            }
            let is_last = i == run.len() - 1;
            let followed_by_bracket_or_eq = run
                .get(i + 1)
                .map(|n| self.is_punct(n, "[") || self.is_op(n, "="))
                .unwrap_or(false);
            if is_last || followed_by_bracket_or_eq {
                name_idx = Some(i);
            }
        }
        let name_idx = name_idx?;

        let type_text = run
            .iter()
            .enumerate()
            .filter(|&(i, t)| i != name_idx && t.kind == TokenKind::Ident)
            .map(|(_, t)| t.lexeme.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Some(Member {
            name: run[name_idx].lexeme.clone(),
            type_text,
            is_pointer,
            is_array,
            line: run[name_idx].span,
        })
    }

    /// §4.2.7 — a generic (non-constructor, non-destructor) method.
    fn parse_generic_method(&mut self) -> Option<Function> {
        let start_span = self.cur().span;
        let mut last_ident: Option<String> = None;
        loop {
            if self.at_end() {
                return None;
            }
            let t = self.cur().clone();
            if self.is_punct(&t, "(") {
                break;
            }
            if self.is_ident(&t) {
                last_ident = Some(t.lexeme.clone());
            }
            self.advance();
        }
        let method_name = last_ident.unwrap_or_default();
        self.skip_balanced("(", ")");

        while !self.at_end() && !self.is_punct(self.cur(), "{") && !self.is_punct(self.cur(), ";")
        {
            self.advance();
        }
        if self.is_punct(self.cur(), ";") {
            self.advance();
            return None; // declaration only
        }
        if !self.is_punct(self.cur(), "{") {
            return None;
        }

        let mut function = Function::new(method_name, false, start_span);
        self.fill_body(&mut function);
        Some(function)
    }

    /// §4.2.3 — an out-of-class definition: `T Class::Method(...) { ... }`.
    fn parse_out_of_class_method(&mut self) -> Option<(String, Function)> {
        let start_span = self.cur().span;
        let mut last_ident: Option<String> = None;
        loop {
            if self.at_end() {
                return None;
            }
            let t = self.cur().clone();
            if self.is_op(&t, "::") {
                self.advance();
                break;
            }
            if self.is_ident(&t) {
                last_ident = Some(t.lexeme.clone());
            }
            self.advance();
        }
        let class_name = last_ident?;

        let is_destructor = self.is_op(self.cur(), "~");
        if is_destructor {
            self.advance();
        }
        if !self.is_ident(self.cur()) {
            return None;
        }
        let method_ident = self.cur().lexeme.clone();
        self.advance();
        self.skip_balanced_if_open("(", ")");

        if !is_destructor && self.is_punct(self.cur(), ":") {
            while !self.at_end()
                && !self.is_punct(self.cur(), "{")
                && !self.is_punct(self.cur(), ";")
            {
                self.advance();
            }
        }

        let name = if is_destructor {
            format!("~{}", class_name)
        } else {
            method_ident
        };
        let mut function = Function::new(name, is_destructor, start_span);

        if self.is_punct(self.cur(), ";") {
            function.end_line = self.cur().span;
            self.advance();
        } else if self.is_punct(self.cur(), "{") {
            self.fill_body(&mut function);
        }

        Some((class_name, function))
    }

    /// §4.2.2 — a `{ ... }` function body, assumed to start at the current
    /// `{` token.
    fn fill_body(&mut self, function: &mut Function) {
        let (allocations, deallocations, invocations, aliases, end_line) =
            self.parse_function_body();
        function.allocations = allocations;
        function.deallocations = deallocations;
        function.invocations = invocations;
        function.aliases = aliases;
        function.end_line = end_line;
    }

    fn parse_function_body(
        &mut self,
    ) -> (
        Vec<Allocation>,
        Vec<Deallocation>,
        Vec<String>,
        Vec<PointerAlias>,
        Span,
    ) {
        let mut allocations = Vec::new();
        let mut deallocations = Vec::new();
        let mut invocations = Vec::new();
        let mut aliases = Vec::new();
        let mut end_line = self.cur().span;

        if !self.is_punct(self.cur(), "{") {
            return (allocations, deallocations, invocations, aliases, end_line);
        }
        self.advance(); // consume '{'

        let mut depth = 1i32;
        while !self.at_end() && depth > 0 {
            let t = self.cur().clone();

            if self.is_punct(&t, "{") {
                depth += 1;
                self.advance();
                continue;
            }
            if self.is_punct(&t, "}") {
                depth -= 1;
                end_line = t.span;
                self.advance();
                continue;
            }
            if self.is_kw(&t, "new") {
                self.parse_allocation(&mut allocations);
                continue;
            }
            if self.is_kw(&t, "delete") {
                self.parse_deallocation(&mut deallocations);
                continue;
            }
            if self.is_ident(&t) && self.is_punct(self.at(1), "(") {
                invocations.push(t.lexeme.clone());
                self.advance();
                continue;
            }
            if self.is_ident(&t)
                && self.is_op(self.at(1), "=")
                && self.is_ident(self.at(2))
                && self.at(2).lexeme != "new"
                && (self.is_punct(self.at(3), ";")
                    || self.is_punct(self.at(3), "}")
                    || self.is_punct(self.at(3), ","))
            {
                aliases.push(PointerAlias {
                    target: t.lexeme.clone(),
                    source: self.at(2).lexeme.clone(),
                    line: t.span,
                });
                self.advance();
                continue;
            }
            self.advance();
        }

        (allocations, deallocations, invocations, aliases, end_line)
    }

    /// `new` handling: array-ness is determined by scanning forward to the
    /// statement terminator; the target variable is recovered by scanning
    /// backward for an `=` and then for the identifier assigned through it.
    fn parse_allocation(&mut self, out: &mut Vec<Allocation>) {
        let new_idx = self.pos;
        let new_tok = self.cur().clone();

        let mut is_array = self.is_punct(self.at(1), "[");
        let mut scan = self.pos + 1;
        let mut terminator_idx = None;
        loop {
            let t = self.tok(scan).clone();
            if t.is_end() {
                break;
            }
            if self.is_punct(&t, ";") || self.is_punct(&t, "{") {
                terminator_idx = Some(scan);
                break;
            }
            if self.is_punct(&t, "[") {
                is_array = true;
            }
            scan += 1;
        }

        let mut eq_idx = None;
        for back in 1..=10usize {
            if back > new_idx {
                break;
            }
            let j = new_idx - back;
            if self.is_op(self.tok(j), "=") {
                eq_idx = Some(j);
                break;
            }
        }

        let mut variable = None;
        if let Some(eq) = eq_idx {
            for back in 1..=5usize {
                if back > eq {
                    break;
                }
                let j = eq - back;
                let t = self.tok(j);
                if t.kind == TokenKind::Ident && t.lexeme != "this" {
                    variable = Some(t.lexeme.clone());
                    break;
                }
            }
        }

        if let Some(variable) = variable {
            out.push(Allocation {
                variable,
                is_array,
                line: new_tok.span,
            });
        }

        self.pos = terminator_idx.unwrap_or(scan.min(self.tokens.len() - 1));
    }

    /// `delete` handling: array-ness from an immediate `[`, target from
    /// either `this->name` or a bare identifier.
    fn parse_deallocation(&mut self, out: &mut Vec<Deallocation>) {
        let del_tok = self.cur().clone();
        self.advance(); // consume 'delete'

        let mut is_array = false;
        if self.is_punct(self.cur(), "[") {
            is_array = true;
            self.advance();
            if self.is_punct(self.cur(), "]") {
                self.advance();
            }
        }

        let variable = if self.is_kw(self.cur(), "this")
            && self.is_op(self.at(1), "->")
            && self.is_ident(self.at(2))
        {
            let name = self.at(2).lexeme.clone();
            self.advance();
            self.advance();
            self.advance();
            Some(name)
        } else if self.is_ident(self.cur()) {
            let name = self.cur().lexeme.clone();
            self.advance();
            Some(name)
        } else {
            None
        };

        if let Some(variable) = variable {
            out.push(Deallocation {
                variable,
                is_array,
                line: del_tok.span,
            });
        }
    }

    // ---- look-ahead predicates -----------------------------------------

    fn looks_like_out_of_class_method(&self) -> bool {
        let mut coloncolon_idx = None;
        for k in 0..10 {
            let t = self.tok(self.pos + k);
            if t.is_end() {
                break;
            }
            if self.is_punct(t, ";") || self.is_punct(t, "{") || self.is_punct(t, "}") {
                break;
            }
            if self.is_op(t, "::") {
                coloncolon_idx = Some(self.pos + k);
                break;
            }
        }
        let Some(cc_idx) = coloncolon_idx else {
            return false;
        };
        for k in 1..=5 {
            let t = self.tok(cc_idx + k);
            if t.is_end() {
                return false;
            }
            if self.is_punct(t, "(") {
                return true;
            }
            if self.is_punct(t, ";") || self.is_punct(t, "{") || self.is_punct(t, "}") {
                return false;
            }
        }
        false
    }

    fn looks_like_member(&self) -> bool {
        let mut has_star = false;
        let mut has_ident = false;
        for k in 0..10 {
            let t = self.tok(self.pos + k);
            if t.is_end() {
                return false;
            }
            if self.is_punct(t, ";") {
                return has_star && has_ident;
            }
            if self.is_punct(t, "(") || self.is_punct(t, "{") {
                return false;
            }
            if self.is_op(t, "*") {
                has_star = true;
            }
            if self.is_ident(t) {
                has_ident = true;
            }
        }
        false
    }

    fn looks_like_function_start(&self) -> bool {
        for k in 0..15 {
            let t = self.tok(self.pos + k);
            if t.is_end() {
                return false;
            }
            if self.is_punct(t, "(") {
                return true;
            }
            if self.is_punct(t, ";") || self.is_punct(t, "{") || self.is_punct(t, "}") {
                return false;
            }
        }
        false
    }

    // ---- low-level token helpers ----------------------------------------

    fn tok(&self, i: usize) -> &Token {
        self.tokens.get(i).unwrap_or_else(|| self.tokens.last().unwrap())
    }

    fn cur(&self) -> &Token {
        self.tok(self.pos)
    }

    fn at(&self, offset: usize) -> &Token {
        self.tok(self.pos + offset)
    }

    fn at_end(&self) -> bool {
        self.cur().is_end()
    }

    fn advance(&mut self) -> Token {
        let t = self.cur().clone();
        if !self.at_end() {
            self.pos += 1;
        }
        t
    }

    fn is_kw(&self, t: &Token, word: &str) -> bool {
        t.kind == TokenKind::Keyword && t.lexeme == word
    }

    fn is_ident(&self, t: &Token) -> bool {
        t.kind == TokenKind::Ident
    }

    fn is_punct(&self, t: &Token, p: &str) -> bool {
        t.kind == TokenKind::Punctuation && t.lexeme == p
    }

    fn is_op(&self, t: &Token, op: &str) -> bool {
        t.kind == TokenKind::Operator && t.lexeme == op
    }

    fn skip_balanced_if_open(&mut self, open: &str, close: &str) {
        if self.is_punct(self.cur(), open) {
            self.skip_balanced(open, close);
        }
    }

    /// Consumes a balanced `open ... close` run starting at the current
    /// `open` token, tracking nesting of that same pair.
    fn skip_balanced(&mut self, open: &str, close: &str) {
        if !self.is_punct(self.cur(), open) {
            return;
        }
        let mut depth = 0i32;
        loop {
            if self.at_end() {
                break;
            }
            let t = self.cur().clone();
            if self.is_punct(&t, open) {
                depth += 1;
                self.advance();
            } else if self.is_punct(&t, close) {
                depth -= 1;
                self.advance();
                if depth == 0 {
                    break;
                }
            } else {
                self.advance();
            }
        }
    }
}
