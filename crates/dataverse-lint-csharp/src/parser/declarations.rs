//! Namespaces, type declarations and members.

use super::{node, Children, Parser};
use dataverse_lint_core::syntax::{GreenElement, GreenNode, SyntaxKind, TokenKind};

const MODIFIER_KEYWORDS: &[&str] = &[
    "public", "private", "protected", "internal", "static", "abstract", "sealed", "virtual",
    "override", "readonly", "extern", "unsafe", "new", "const", "volatile",
];

/// Modifiers that are only keywords when followed by another word.
const CONTEXTUAL_MODIFIERS: &[&str] = &["async", "partial", "required", "file"];

const PARAMETER_MODIFIERS: &[&str] = &["this", "ref", "out", "in", "params", "readonly"];

const ACCESSOR_KEYWORDS: &[&str] = &["get", "set", "init", "add", "remove"];

impl Parser {
    pub(super) fn namespace_body(&mut self, children: &mut Children, braced: bool) {
        while !self.at_eof() && !(braced && self.at("}")) {
            if self.at_using_directive() {
                children.push(self.using_directive().into());
            } else if self.at("namespace") {
                children.push(self.namespace_declaration().into());
            } else if self.at("[")
                && matches!(self.nth_text(1), "assembly" | "module")
                && self.nth_text(2) == ":"
            {
                children.push(self.attribute_list().into());
            } else if self.looks_like_type_declaration() {
                children.push(self.member_declaration().into());
            } else if let Some(statement) = self.statement() {
                children.push(statement.into());
            } else {
                self.skip_token("expected declaration", children);
            }
        }
    }

    fn at_using_directive(&self) -> bool {
        let start = if self.at_word("global") && self.nth_text(1) == "using" {
            self.pos + 1
        } else {
            self.pos
        };
        if self.text_at(start) != "using" {
            return false;
        }
        let next = start + 1;
        if self.text_at(next) == "static" {
            return true;
        }
        if self.kind_at(next) != TokenKind::Identifier {
            return false;
        }
        if self.text_at(next + 1) == "=" {
            return true;
        }
        self.scan_type(next)
            .is_some_and(|end| self.text_at(end) == ";")
    }

    fn using_directive(&mut self) -> GreenNode {
        let mut children = Vec::new();
        if self.at_word("global") {
            self.push_keyword(&mut children);
        }
        self.push(&mut children);
        self.eat("static", &mut children);
        if self.at_identifier() && self.nth_text(1) == "=" {
            self.push(&mut children);
            self.push(&mut children);
        }
        self.expect_type(&mut children);
        self.expect(";", &mut children);
        node(SyntaxKind::UsingDirective, children)
    }

    fn namespace_declaration(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        match self.parse_name() {
            Some(name) => children.push(name.into()),
            None => self.error("expected namespace name"),
        }
        if self.eat(";", &mut children) {
            self.namespace_body(&mut children, false);
            return node(SyntaxKind::FileScopedNamespaceDeclaration, children);
        }
        if self.expect("{", &mut children) {
            self.namespace_body(&mut children, true);
            self.expect("}", &mut children);
        }
        node(SyntaxKind::NamespaceDeclaration, children)
    }

    fn is_modifier_at(&self, index: usize) -> bool {
        let text = self.text_at(index);
        match self.kind_at(index) {
            TokenKind::Keyword => MODIFIER_KEYWORDS.contains(&text),
            TokenKind::Identifier => {
                CONTEXTUAL_MODIFIERS.contains(&text)
                    && matches!(
                        self.kind_at(index + 1),
                        TokenKind::Identifier | TokenKind::Keyword
                    )
            }
            _ => false,
        }
    }

    fn type_keyword_at(&self, index: usize) -> bool {
        match self.text_at(index) {
            "class" | "struct" | "interface" | "enum" | "delegate" => {
                self.kind_at(index) == TokenKind::Keyword
            }
            "record" => {
                self.kind_at(index) == TokenKind::Identifier
                    && (self.kind_at(index + 1) == TokenKind::Identifier
                        || matches!(self.text_at(index + 1), "class" | "struct"))
            }
            _ => false,
        }
    }

    fn looks_like_type_declaration(&self) -> bool {
        let mut i = self.pos;
        loop {
            if self.text_at(i) == "[" {
                match self.skip_balanced(i, "[", "]") {
                    Some(next) => i = next,
                    None => return false,
                }
            } else if self.is_modifier_at(i) {
                i += 1;
            } else {
                break;
            }
        }
        self.type_keyword_at(i)
    }

    pub(super) fn attribute_lists(&mut self, children: &mut Children) {
        while self.at("[") {
            children.push(self.attribute_list().into());
        }
    }

    pub(super) fn attribute_list(&mut self) -> GreenNode {
        let mut children = Vec::new();
        let mut depth = 0usize;
        while !self.at_eof() {
            if self.at("[") {
                depth += 1;
            } else if self.at("]") {
                depth -= 1;
            }
            self.push(&mut children);
            if depth == 0 {
                return node(SyntaxKind::AttributeList, children);
            }
        }
        self.error("expected `]`");
        node(SyntaxKind::AttributeList, children)
    }

    fn modifiers(&mut self, children: &mut Children) {
        while self.is_modifier_at(self.pos) {
            self.push_keyword(children);
        }
    }

    /// Parses one member of a type body (or a type at namespace level).
    /// Always consumes at least one token.
    pub(super) fn member_declaration(&mut self) -> GreenNode {
        let start = self.pos;
        let mut children = Vec::new();
        self.attribute_lists(&mut children);
        self.modifiers(&mut children);

        if self.type_keyword_at(self.pos) {
            return self.type_declaration(children);
        }
        match self.current().text() {
            "event" => return self.event_declaration(children),
            "~" => return self.destructor_declaration(children),
            "implicit" | "explicit" => return self.conversion_operator(children),
            _ => {}
        }
        if self.at_identifier() && self.nth_text(1) == "(" {
            return self.constructor_declaration(children);
        }
        if self.scan_type(self.pos).is_some() {
            if let Some(ty) = self.parse_type() {
                return self.member_after_type(children, ty);
            }
        }

        self.error("expected member declaration");
        if self.pos == start && !self.at_eof() {
            self.push(&mut children);
        }
        node(SyntaxKind::Error, children)
    }

    fn type_declaration(&mut self, mut children: Children) -> GreenNode {
        let kind = match self.current().text() {
            "class" => SyntaxKind::ClassDeclaration,
            "struct" => SyntaxKind::StructDeclaration,
            "interface" => SyntaxKind::InterfaceDeclaration,
            "enum" => return self.enum_declaration(children),
            "delegate" => return self.delegate_declaration(children),
            _ => {
                self.push_keyword(&mut children);
                if self.eat("struct", &mut children) {
                    SyntaxKind::RecordStructDeclaration
                } else {
                    self.eat("class", &mut children);
                    SyntaxKind::RecordDeclaration
                }
            }
        };
        if !matches!(
            kind,
            SyntaxKind::RecordDeclaration | SyntaxKind::RecordStructDeclaration
        ) {
            self.push(&mut children);
        }
        self.expect_identifier(&mut children);
        if self.at("<") {
            children.push(self.type_parameter_list().into());
        }
        if self.at("(") {
            children.push(self.parameter_list(")", SyntaxKind::ParameterList).into());
        }
        if self.at(":") {
            children.push(self.base_list().into());
        }
        self.constraint_clauses(&mut children);
        if self.eat("{", &mut children) {
            while !self.at_eof() && !self.at("}") {
                children.push(self.member_declaration().into());
            }
            self.expect("}", &mut children);
            self.eat(";", &mut children);
        } else {
            self.expect(";", &mut children);
        }
        node(kind, children)
    }

    fn base_list(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        loop {
            let Some(ty) = self.parse_type() else {
                self.error("expected base type");
                break;
            };
            let mut base = vec![GreenElement::from(ty)];
            if self.at("(") {
                base.push(self.argument_list().into());
            }
            children.push(node(SyntaxKind::SimpleBaseType, base).into());
            if !self.eat(",", &mut children) {
                break;
            }
        }
        node(SyntaxKind::BaseList, children)
    }

    fn enum_declaration(&mut self, mut children: Children) -> GreenNode {
        self.push(&mut children);
        self.expect_identifier(&mut children);
        if self.at(":") {
            children.push(self.base_list().into());
        }
        if self.expect("{", &mut children) {
            while !self.at_eof() && !self.at("}") {
                let mut member = Vec::new();
                self.attribute_lists(&mut member);
                if !self.expect_identifier(&mut member) {
                    children.extend(member);
                    self.skip_token("expected enum member", &mut children);
                    continue;
                }
                if self.at("=") {
                    member.push(self.equals_value_clause().into());
                }
                children.push(node(SyntaxKind::EnumMemberDeclaration, member).into());
                if !self.eat(",", &mut children) {
                    break;
                }
            }
            self.expect("}", &mut children);
            self.eat(";", &mut children);
        }
        node(SyntaxKind::EnumDeclaration, children)
    }

    fn delegate_declaration(&mut self, mut children: Children) -> GreenNode {
        self.push(&mut children);
        self.expect_type(&mut children);
        self.expect_identifier(&mut children);
        if self.at("<") {
            children.push(self.type_parameter_list().into());
        }
        if self.at("(") {
            children.push(self.parameter_list(")", SyntaxKind::ParameterList).into());
        } else {
            self.error("expected `(`");
        }
        self.constraint_clauses(&mut children);
        self.expect(";", &mut children);
        node(SyntaxKind::DelegateDeclaration, children)
    }

    pub(super) fn type_parameter_list(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        loop {
            let mut parameter = Vec::new();
            self.attribute_lists(&mut parameter);
            if self.at("in") || self.at("out") {
                self.push(&mut parameter);
            }
            self.expect_identifier(&mut parameter);
            if !parameter.is_empty() {
                children.push(node(SyntaxKind::TypeParameter, parameter).into());
            }
            if !self.eat(",", &mut children) {
                break;
            }
        }
        self.expect(">", &mut children);
        node(SyntaxKind::TypeParameterList, children)
    }

    pub(super) fn constraint_clauses(&mut self, children: &mut Children) {
        while self.at_word("where") && self.kind_at(self.pos + 1) == TokenKind::Identifier {
            let mut clause = Vec::new();
            self.push_keyword(&mut clause);
            self.push(&mut clause);
            self.expect(":", &mut clause);
            loop {
                if self.at("class") || self.at("struct") {
                    self.push(&mut clause);
                    self.eat("?", &mut clause);
                } else if self.at("new") {
                    self.push(&mut clause);
                    self.expect("(", &mut clause);
                    self.expect(")", &mut clause);
                } else if !self.expect_type(&mut clause) {
                    break;
                }
                if !self.eat(",", &mut clause) {
                    break;
                }
            }
            children.push(node(SyntaxKind::TypeParameterConstraintClause, clause).into());
        }
    }

    /// `(a, b)` or `[a, b]`; the opening token is current.
    pub(super) fn parameter_list(&mut self, close: &str, kind: SyntaxKind) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        if !self.at(close) {
            loop {
                match self.parameter(close) {
                    Some(parameter) => children.push(parameter.into()),
                    None => {
                        self.error("expected parameter");
                        break;
                    }
                }
                if !self.eat(",", &mut children) {
                    break;
                }
            }
        }
        self.expect(close, &mut children);
        node(kind, children)
    }

    fn parameter(&mut self, close: &str) -> Option<GreenNode> {
        let mut children = Vec::new();
        self.attribute_lists(&mut children);
        loop {
            let scoped = self.at_word("scoped")
                && matches!(
                    self.kind_at(self.pos + 1),
                    TokenKind::Identifier | TokenKind::Keyword
                );
            let keyword = self.current_kind() == TokenKind::Keyword
                && PARAMETER_MODIFIERS.contains(&self.text_at(self.pos));
            if !(scoped || keyword) {
                break;
            }
            self.push_keyword(&mut children);
        }
        if self.at_identifier() && matches!(self.nth_text(1), "," | ")" | "]") {
            self.push(&mut children);
        } else if let Some(ty) = self.parse_type() {
            children.push(ty.into());
            self.expect_identifier(&mut children);
        } else if !self.at(close) && !self.at(",") && !self.at_eof() && !children.is_empty() {
            self.skip_token("expected parameter type", &mut children);
        }
        if self.at("=") {
            children.push(self.equals_value_clause().into());
        }
        (!children.is_empty()).then(|| node(SyntaxKind::Parameter, children))
    }

    fn constructor_declaration(&mut self, mut children: Children) -> GreenNode {
        self.push(&mut children);
        children.push(self.parameter_list(")", SyntaxKind::ParameterList).into());
        if self.at(":") && matches!(self.nth_text(1), "base" | "this") {
            let mut init = Vec::new();
            self.push(&mut init);
            self.push(&mut init);
            if self.at("(") {
                init.push(self.argument_list().into());
            } else {
                self.error("expected `(`");
            }
            children.push(node(SyntaxKind::ConstructorInitializer, init).into());
        }
        self.member_body(&mut children);
        node(SyntaxKind::ConstructorDeclaration, children)
    }

    fn destructor_declaration(&mut self, mut children: Children) -> GreenNode {
        self.push(&mut children);
        self.expect_identifier(&mut children);
        if self.at("(") {
            children.push(self.parameter_list(")", SyntaxKind::ParameterList).into());
        } else {
            self.error("expected `(`");
        }
        self.member_body(&mut children);
        node(SyntaxKind::DestructorDeclaration, children)
    }

    fn conversion_operator(&mut self, mut children: Children) -> GreenNode {
        self.push(&mut children);
        self.expect("operator", &mut children);
        self.eat("checked", &mut children);
        self.expect_type(&mut children);
        if self.at("(") {
            children.push(self.parameter_list(")", SyntaxKind::ParameterList).into());
        } else {
            self.error("expected `(`");
        }
        self.member_body(&mut children);
        node(SyntaxKind::OperatorDeclaration, children)
    }

    fn event_declaration(&mut self, mut children: Children) -> GreenNode {
        self.push(&mut children);
        let Some(ty) = self.parse_type() else {
            self.error("expected type");
            return node(SyntaxKind::EventDeclaration, children);
        };
        if let Some(specifier) = self.explicit_interface_specifier() {
            children.push(ty.into());
            children.push(specifier.into());
            self.expect_identifier(&mut children);
            self.accessor_list_or_semicolon(&mut children);
        } else if self.at_identifier() && self.nth_text(1) == "{" {
            children.push(ty.into());
            self.push(&mut children);
            children.push(self.accessor_list().into());
        } else {
            children.push(self.variable_declaration_rest(ty).into());
            self.expect(";", &mut children);
        }
        node(SyntaxKind::EventDeclaration, children)
    }

    fn member_after_type(&mut self, mut children: Children, ty: GreenNode) -> GreenNode {
        if self.at_identifier() && matches!(self.nth_text(1), "=" | ";" | ",") {
            children.push(self.variable_declaration_rest(ty).into());
            self.expect(";", &mut children);
            return node(SyntaxKind::FieldDeclaration, children);
        }
        children.push(ty.into());

        if self.at("operator") {
            self.push(&mut children);
            self.eat("checked", &mut children);
            self.operator_token(&mut children);
            if self.at("(") {
                children.push(self.parameter_list(")", SyntaxKind::ParameterList).into());
            } else {
                self.error("expected `(`");
            }
            self.member_body(&mut children);
            return node(SyntaxKind::OperatorDeclaration, children);
        }

        if let Some(specifier) = self.explicit_interface_specifier() {
            children.push(specifier.into());
        }
        if self.at("this") {
            self.push(&mut children);
            if self.at("[") {
                children.push(self.parameter_list("]", SyntaxKind::BracketedParameterList).into());
            } else {
                self.error("expected `[`");
            }
            self.accessor_list_or_arrow(&mut children);
            return node(SyntaxKind::IndexerDeclaration, children);
        }
        if !self.expect_identifier(&mut children) {
            return node(SyntaxKind::Error, children);
        }

        if self.at("<") || self.at("(") {
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
            return node(SyntaxKind::MethodDeclaration, children);
        }
        if self.at("{") || self.at("=>") {
            self.accessor_list_or_arrow(&mut children);
            return node(SyntaxKind::PropertyDeclaration, children);
        }
        self.error("expected `(`, `{` or `=>`");
        node(SyntaxKind::Error, children)
    }

    /// Parses `IFoo.` / `IFoo<T>.Bar.` prefixes of an explicitly implemented
    /// member name.
    pub(super) fn explicit_interface_specifier(&mut self) -> Option<GreenNode> {
        let mut acc: Option<(GreenNode, GreenElement)> = None;
        while self.specifier_segment_end().is_some() {
            let segment = self.simple_type_name();
            let name = match acc.take() {
                None => segment,
                Some((left, dot)) => node(
                    SyntaxKind::QualifiedName,
                    vec![left.into(), dot, segment.into()],
                ),
            };
            let dot = self.bump();
            acc = Some((name, dot));
        }
        acc.map(|(name, dot)| node(SyntaxKind::ExplicitInterfaceSpecifier, vec![name.into(), dot]))
    }

    fn specifier_segment_end(&self) -> Option<usize> {
        if !self.at_identifier() {
            return None;
        }
        let mut end = self.pos + 1;
        if self.text_at(end) == "<" {
            end = self.scan_type_args(end)?;
        }
        (self.text_at(end) == ".").then_some(end)
    }

    fn operator_token(&mut self, children: &mut Children) {
        if self.at_eof() {
            self.error("expected operator");
            return;
        }
        if self.at(">") && self.joined(self.pos) && self.nth_text(1) == ">" {
            self.push(children);
            if self.joined(self.pos) && self.nth_text(1) == ">" {
                self.push(children);
            }
        }
        self.push(children);
    }

    fn accessor_list_or_arrow(&mut self, children: &mut Children) {
        if self.at("=>") {
            children.push(self.arrow_clause().into());
            self.expect(";", children);
            return;
        }
        self.accessor_list_or_semicolon(children);
        if self.at("=") {
            children.push(self.equals_value_clause().into());
            self.expect(";", children);
        }
    }

    fn accessor_list_or_semicolon(&mut self, children: &mut Children) {
        if self.at("{") {
            children.push(self.accessor_list().into());
        } else {
            self.expect(";", children);
        }
    }

    fn accessor_list(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        while !self.at_eof() && !self.at("}") {
            let mut accessor = Vec::new();
            self.attribute_lists(&mut accessor);
            while matches!(
                self.current().text(),
                "private" | "protected" | "internal" | "readonly"
            ) {
                self.push(&mut accessor);
            }
            if self.at_identifier() && ACCESSOR_KEYWORDS.contains(&self.current().text()) {
                self.push_keyword(&mut accessor);
                self.member_body(&mut accessor);
                children.push(node(SyntaxKind::AccessorDeclaration, accessor).into());
            } else {
                children.extend(accessor);
                self.skip_token("expected accessor", &mut children);
            }
        }
        self.expect("}", &mut children);
        node(SyntaxKind::AccessorList, children)
    }

    /// Block body, expression body or `;`.
    pub(super) fn member_body(&mut self, children: &mut Children) {
        if self.at("{") {
            children.push(self.block().into());
        } else if self.at("=>") {
            children.push(self.arrow_clause().into());
            self.expect(";", children);
        } else {
            self.expect(";", children);
        }
    }

    pub(super) fn arrow_clause(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        self.expect_expression(&mut children);
        node(SyntaxKind::ArrowExpressionClause, children)
    }

    pub(super) fn equals_value_clause(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        if self.at("{") {
            children.push(self.initializer().into());
        } else {
            self.expect_expression(&mut children);
        }
        node(SyntaxKind::EqualsValueClause, children)
    }

    /// `Type a = 1, b` with the type already parsed.
    pub(super) fn variable_declaration_rest(&mut self, ty: GreenNode) -> GreenNode {
        let mut children = vec![GreenElement::from(ty)];
        loop {
            let mut declarator = Vec::new();
            if !self.expect_identifier(&mut declarator) {
                break;
            }
            if self.at("[") {
                declarator.push(self.bracketed_argument_list().into());
            }
            if self.at("=") {
                declarator.push(self.equals_value_clause().into());
            }
            children.push(node(SyntaxKind::VariableDeclarator, declarator).into());
            if !(self.at(",") && self.kind_at(self.pos + 1) == TokenKind::Identifier) {
                break;
            }
            self.push(&mut children);
        }
        node(SyntaxKind::VariableDeclaration, children)
    }

    pub(super) fn variable_declaration(&mut self) -> Option<GreenNode> {
        let ty = self.parse_type()?;
        Some(self.variable_declaration_rest(ty))
    }
}
