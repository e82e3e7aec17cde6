//! Statements.

use super::{node, Children, Parser};
use dataverse_lint_core::syntax::{GreenNode, SyntaxKind, TokenKind};

/// Modifiers allowed before a local declaration or local function.
const LOCAL_MODIFIERS: &[&str] = &["const", "static", "unsafe", "extern", "readonly", "ref"];

impl Parser {
    pub(super) fn block(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.expect("{", &mut children);
        while !self.at_eof() && !self.at("}") {
            match self.statement() {
                Some(statement) => children.push(statement.into()),
                None => self.skip_token("expected statement", &mut children),
            }
        }
        self.expect("}", &mut children);
        node(SyntaxKind::Block, children)
    }

    /// Parses one statement, or returns `None` without consuming anything.
    pub(super) fn statement(&mut self) -> Option<GreenNode> {
        let token = self.current();
        let next = self.nth_text(1).to_owned();
        match (token.kind(), token.text()) {
            (TokenKind::Punct, "{") => return Some(self.block()),
            (TokenKind::Punct, ";") => {
                return Some(node(SyntaxKind::EmptyStatement, vec![self.bump()]));
            }
            (TokenKind::Keyword, keyword) => {
                if let Some(statement) = self.keyword_statement(keyword, &next) {
                    return Some(statement);
                }
            }
            (TokenKind::Identifier, "yield") if matches!(next.as_str(), "return" | "break") => {
                return Some(self.yield_statement());
            }
            (TokenKind::Identifier, "await") if matches!(next.as_str(), "foreach" | "using") => {
                let mut children = Vec::new();
                self.push_keyword(&mut children);
                return Some(if next == "foreach" {
                    self.foreach_statement(children)
                } else {
                    self.push(&mut children);
                    self.using_statement(children)
                });
            }
            (TokenKind::Identifier, _) if next == ":" => {
                let mut children = Vec::new();
                self.push(&mut children);
                self.push(&mut children);
                self.embedded_statement(&mut children);
                return Some(node(SyntaxKind::LabeledStatement, children));
            }
            _ => {}
        }
        if let Some(statement) = self.local_declaration_or_function() {
            return Some(statement);
        }
        self.expression_statement()
    }

    fn keyword_statement(&mut self, keyword: &str, next: &str) -> Option<GreenNode> {
        let statement = match keyword {
            "if" => self.if_statement(),
            "while" => {
                let mut children = Vec::new();
                self.push(&mut children);
                self.parenthesized_condition(&mut children);
                self.embedded_statement(&mut children);
                node(SyntaxKind::WhileStatement, children)
            }
            "do" => {
                let mut children = Vec::new();
                self.push(&mut children);
                self.embedded_statement(&mut children);
                self.expect("while", &mut children);
                self.parenthesized_condition(&mut children);
                self.expect(";", &mut children);
                node(SyntaxKind::DoStatement, children)
            }
            "for" => self.for_statement(),
            "foreach" => self.foreach_statement(Vec::new()),
            "return" => self.jump_statement(SyntaxKind::ReturnStatement),
            "throw" => self.jump_statement(SyntaxKind::ThrowStatement),
            "break" => self.jump_statement(SyntaxKind::BreakStatement),
            "continue" => self.jump_statement(SyntaxKind::ContinueStatement),
            "goto" => self.goto_statement(),
            "try" => self.try_statement(),
            "lock" => {
                let mut children = Vec::new();
                self.push(&mut children);
                self.parenthesized_condition(&mut children);
                self.embedded_statement(&mut children);
                node(SyntaxKind::LockStatement, children)
            }
            "switch" => self.switch_statement(),
            "checked" | "unchecked" if next == "{" => {
                let mut children = vec![self.bump()];
                children.push(self.block().into());
                node(SyntaxKind::CheckedStatement, children)
            }
            "unsafe" if next == "{" => {
                let mut children = vec![self.bump()];
                children.push(self.block().into());
                node(SyntaxKind::UnsafeStatement, children)
            }
            "fixed" => {
                let mut children = Vec::new();
                self.push(&mut children);
                self.expect("(", &mut children);
                match self.variable_declaration() {
                    Some(declaration) => children.push(declaration.into()),
                    None => self.error("expected declaration"),
                }
                self.expect(")", &mut children);
                self.embedded_statement(&mut children);
                node(SyntaxKind::FixedStatement, children)
            }
            "using" => self.using_statement(vec![]),
            _ => return None,
        };
        Some(statement)
    }

    /// Parses a statement into `children`, recording an error when missing.
    fn embedded_statement(&mut self, children: &mut Children) {
        match self.statement() {
            Some(statement) => children.push(statement.into()),
            None => self.error("expected statement"),
        }
    }

    fn parenthesized_condition(&mut self, children: &mut Children) {
        self.expect("(", children);
        self.expect_expression(children);
        self.expect(")", children);
    }

    fn if_statement(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        self.parenthesized_condition(&mut children);
        self.embedded_statement(&mut children);
        if self.at("else") {
            let mut clause = Vec::new();
            self.push(&mut clause);
            self.embedded_statement(&mut clause);
            children.push(node(SyntaxKind::ElseClause, clause).into());
        }
        node(SyntaxKind::IfStatement, children)
    }

    /// `return`, `throw`, `break` and `continue`, with an optional value.
    fn jump_statement(&mut self, kind: SyntaxKind) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        if !self.at(";") {
            if let Some(value) = self.expression() {
                children.push(value.into());
            }
        }
        self.expect(";", &mut children);
        node(kind, children)
    }

    fn yield_statement(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.push_keyword(&mut children);
        let kind = if self.at("return") {
            self.push(&mut children);
            self.expect_expression(&mut children);
            SyntaxKind::YieldReturnStatement
        } else {
            self.push(&mut children);
            SyntaxKind::YieldBreakStatement
        };
        self.expect(";", &mut children);
        node(kind, children)
    }

    fn goto_statement(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        if self.eat("case", &mut children) {
            self.expect_expression(&mut children);
        } else if !self.eat("default", &mut children) {
            self.expect_expression(&mut children);
        }
        self.expect(";", &mut children);
        node(SyntaxKind::GotoStatement, children)
    }

    /// True when the tokens at `index` start `Type name` followed by
    /// one of `follow`.
    fn declaration_at(&self, index: usize, follow: &[&str]) -> bool {
        self.scan_type(index).is_some_and(|end| {
            end > index
                && self.kind_at(end) == TokenKind::Identifier
                && follow.contains(&self.text_at(end + 1))
        })
    }

    fn for_statement(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        self.expect("(", &mut children);
        if !self.at(";") {
            if self.declaration_at(self.pos, &["=", ";", ","]) {
                if let Some(declaration) = self.variable_declaration() {
                    children.push(declaration.into());
                }
            } else {
                self.expression_list(&mut children);
            }
        }
        self.expect(";", &mut children);
        if !self.at(";") {
            self.expect_expression(&mut children);
        }
        self.expect(";", &mut children);
        if !self.at(")") {
            self.expression_list(&mut children);
        }
        self.expect(")", &mut children);
        self.embedded_statement(&mut children);
        node(SyntaxKind::ForStatement, children)
    }

    fn expression_list(&mut self, children: &mut Children) {
        loop {
            if !self.expect_expression(children) {
                break;
            }
            if !self.eat(",", children) {
                break;
            }
        }
    }

    fn foreach_statement(&mut self, mut children: Children) -> GreenNode {
        self.push(&mut children);
        self.expect("(", &mut children);
        self.expect_type(&mut children);
        if self.at("(") {
            self.expect_expression(&mut children);
        } else {
            self.expect_identifier(&mut children);
        }
        self.expect("in", &mut children);
        self.expect_expression(&mut children);
        self.expect(")", &mut children);
        self.embedded_statement(&mut children);
        node(SyntaxKind::ForEachStatement, children)
    }

    /// `using (...) stmt` or a `using` declaration; the `using` keyword is
    /// current unless an `await` prefix already consumed it.
    fn using_statement(&mut self, mut children: Children) -> GreenNode {
        if self.at("using") {
            self.push(&mut children);
        }
        if self.eat("(", &mut children) {
            if self.declaration_at(self.pos, &["="]) {
                if let Some(declaration) = self.variable_declaration() {
                    children.push(declaration.into());
                }
            } else {
                self.expect_expression(&mut children);
            }
            self.expect(")", &mut children);
            self.embedded_statement(&mut children);
            return node(SyntaxKind::UsingStatement, children);
        }
        match self.variable_declaration() {
            Some(declaration) => children.push(declaration.into()),
            None => self.error("expected declaration"),
        }
        self.expect(";", &mut children);
        node(SyntaxKind::LocalDeclarationStatement, children)
    }

    fn try_statement(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        self.expect_block(&mut children);
        while self.at("catch") {
            let mut clause = Vec::new();
            self.push(&mut clause);
            if self.at("(") {
                let mut declaration = Vec::new();
                self.push(&mut declaration);
                self.expect_type(&mut declaration);
                if self.at_identifier() {
                    self.push(&mut declaration);
                }
                self.expect(")", &mut declaration);
                clause.push(node(SyntaxKind::CatchDeclaration, declaration).into());
            }
            if self.at_word("when") {
                let mut filter = Vec::new();
                self.push(&mut filter);
                self.parenthesized_condition(&mut filter);
                clause.push(node(SyntaxKind::CatchFilterClause, filter).into());
            }
            self.expect_block(&mut clause);
            children.push(node(SyntaxKind::CatchClause, clause).into());
        }
        if self.at("finally") {
            let mut clause = Vec::new();
            self.push(&mut clause);
            self.expect_block(&mut clause);
            children.push(node(SyntaxKind::FinallyClause, clause).into());
        }
        node(SyntaxKind::TryStatement, children)
    }

    fn expect_block(&mut self, children: &mut Children) {
        if self.at("{") {
            children.push(self.block().into());
        } else {
            self.error("expected `{`");
        }
    }

    fn switch_statement(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        self.expect_expression(&mut children);
        if !self.expect("{", &mut children) {
            return node(SyntaxKind::SwitchStatement, children);
        }
        while !self.at_eof() && !self.at("}") {
            if !self.at_switch_label() {
                self.skip_token("expected `case` or `default`", &mut children);
                continue;
            }
            let mut section = Vec::new();
            while self.at_switch_label() {
                section.push(self.switch_label().into());
            }
            while !self.at_eof() && !self.at("}") && !self.at_switch_label() {
                match self.statement() {
                    Some(statement) => section.push(statement.into()),
                    None => self.skip_token("expected statement", &mut section),
                }
            }
            children.push(node(SyntaxKind::SwitchSection, section).into());
        }
        self.expect("}", &mut children);
        node(SyntaxKind::SwitchStatement, children)
    }

    fn at_switch_label(&self) -> bool {
        self.at("case") || (self.at("default") && self.nth_text(1) == ":")
    }

    fn switch_label(&mut self) -> GreenNode {
        let mut children = Vec::new();
        if self.at("default") {
            self.push(&mut children);
            self.push(&mut children);
            return node(SyntaxKind::DefaultSwitchLabel, children);
        }
        self.push(&mut children);
        match self.pattern() {
            Some(pattern) => children.push(pattern.into()),
            None => self.error("expected pattern"),
        }
        if self.at_word("when") {
            self.push(&mut children);
            self.expect_expression(&mut children);
        }
        self.expect(":", &mut children);
        node(SyntaxKind::CaseSwitchLabel, children)
    }

    fn local_declaration_or_function(&mut self) -> Option<GreenNode> {
        let mut index = self.pos;
        loop {
            let text = self.text_at(index);
            let modifier = match self.kind_at(index) {
                TokenKind::Keyword => LOCAL_MODIFIERS.contains(&text),
                TokenKind::Identifier => {
                    matches!(text, "async" | "scoped")
                        && matches!(
                            self.kind_at(index + 1),
                            TokenKind::Identifier | TokenKind::Keyword
                        )
                }
                _ => false,
            };
            if !modifier {
                break;
            }
            index += 1;
        }
        if self.kind_at(index) == TokenKind::Identifier && self.text_at(index) == "await" {
            return None;
        }
        let end = self.scan_type(index)?;
        if end == index || self.kind_at(end) != TokenKind::Identifier {
            return None;
        }
        let function = match self.text_at(end + 1) {
            "(" | "<" => true,
            "=" | ";" | "," => false,
            _ => return None,
        };

        let mut children = Vec::new();
        while self.pos < index {
            self.push_keyword(&mut children);
        }
        let ty = self.parse_type()?;
        if !function {
            children.push(self.variable_declaration_rest(ty).into());
            self.expect(";", &mut children);
            return Some(node(SyntaxKind::LocalDeclarationStatement, children));
        }
        children.push(ty.into());
        self.push(&mut children);
        if self.at("<") {
            children.push(self.type_parameter_list().into());
        }
        if self.at("(") {
            children.push(self.parameter_list(")", SyntaxKind::ParameterList).into());
        } else {
            self.error("expected `(`");
        }
        self.constraint_clauses(&mut children);
        self.member_body(&mut children);
        Some(node(SyntaxKind::LocalFunctionStatement, children))
    }

    fn expression_statement(&mut self) -> Option<GreenNode> {
        let expression = self.expression()?;
        let mut children = vec![expression.into()];
        self.expect(";", &mut children);
        Some(node(SyntaxKind::ExpressionStatement, children))
    }
}
