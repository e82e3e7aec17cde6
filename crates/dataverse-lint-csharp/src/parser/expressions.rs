//! Expressions, by precedence climbing.

use super::{node, Children, Parser};
use dataverse_lint_core::syntax::{GreenElement, GreenNode, SyntaxKind, TokenKind};

const EXPRESSION_KEYWORDS: &[&str] = &[
    "this", "base", "new", "typeof", "default", "true", "false", "null", "checked",
    "unchecked", "sizeof", "throw", "delegate", "ref", "stackalloc",
];

/// Tokens that may follow `Name<T>` for it to be read as a generic name
/// rather than a comparison.
const GENERIC_FOLLOW: &[&str] = &[
    "(", ")", "]", "}", ":", ";", ",", ".", "?.", "?", "==", "!=", "|", "^", "&&", "||", "&",
    "[",
];

const PREFIX_OPERATORS: &[&str] = &["!", "-", "+", "~", "++", "--", "^", "&", "*"];

const COMPOUND_ASSIGNMENTS: &[&str] = &[
    "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", "??=",
];

#[derive(Clone, Copy)]
enum BinaryForm {
    Plain,
    Is,
    As,
    Switch,
    With,
    Range,
}

impl Parser {
    pub(super) fn expression(&mut self) -> Option<GreenNode> {
        self.assignment()
    }

    /// Parses an expression into `children`, recording an error when none
    /// can start here.
    pub(super) fn expect_expression(&mut self, children: &mut Children) -> bool {
        match self.expression() {
            Some(expression) => {
                children.push(expression.into());
                true
            }
            None => {
                self.error("expected expression");
                false
            }
        }
    }

    pub(super) fn can_start_expression(&self, index: usize) -> bool {
        let text = self.text_at(index);
        match self.kind_at(index) {
            TokenKind::Identifier
            | TokenKind::NumericLiteral
            | TokenKind::StringLiteral
            | TokenKind::CharLiteral
            | TokenKind::InterpolatedString => true,
            TokenKind::Keyword => EXPRESSION_KEYWORDS.contains(&text) || self.is_predefined_at(index),
            TokenKind::Punct => {
                text == "(" || text == "[" || text == ".." || PREFIX_OPERATORS.contains(&text)
            }
            TokenKind::EndOfFile | TokenKind::Unknown => false,
        }
    }

    fn assignment(&mut self) -> Option<GreenNode> {
        if let Some(lambda) = self.lambda() {
            return Some(lambda);
        }
        let target = self.conditional()?;
        let Some((kind, width)) = self.assignment_operator() else {
            return Some(target);
        };
        let mut children = vec![GreenElement::from(target)];
        for _ in 0..width {
            self.push(&mut children);
        }
        if kind == SyntaxKind::SimpleAssignmentExpression && self.at("{") {
            children.push(self.initializer().into());
        } else {
            self.expect_expression(&mut children);
        }
        Some(node(kind, children))
    }

    fn assignment_operator(&self) -> Option<(SyntaxKind, usize)> {
        let text = self.text_at(self.pos);
        if text == "=" {
            return Some((SyntaxKind::SimpleAssignmentExpression, 1));
        }
        if COMPOUND_ASSIGNMENTS.contains(&text) {
            return Some((SyntaxKind::CompoundAssignmentExpression, 1));
        }
        if text == ">" && self.joined(self.pos) {
            match self.nth_text(1) {
                ">=" => return Some((SyntaxKind::CompoundAssignmentExpression, 2)),
                ">" if self.joined(self.pos + 1) && self.nth_text(2) == ">=" => {
                    return Some((SyntaxKind::CompoundAssignmentExpression, 3));
                }
                _ => {}
            }
        }
        None
    }

    fn conditional(&mut self) -> Option<GreenNode> {
        let condition = self.binary(0)?;
        if !self.at("?") {
            return Some(condition);
        }
        let mut children = vec![GreenElement::from(condition)];
        self.push(&mut children);
        self.expect_expression(&mut children);
        if self.expect(":", &mut children) {
            self.expect_expression(&mut children);
        }
        Some(node(SyntaxKind::ConditionalExpression, children))
    }

    /// Precedence, token width and form of the binary operator at the
    /// cursor.
    fn binary_operator(&self) -> Option<(u8, usize, BinaryForm)> {
        let text = self.text_at(self.pos);
        let kind = self.current_kind();
        let plain = |precedence| Some((precedence, 1, BinaryForm::Plain));
        match (kind, text) {
            (TokenKind::Punct, "??") => plain(1),
            (TokenKind::Punct, "||") => plain(2),
            (TokenKind::Punct, "&&") => plain(3),
            (TokenKind::Punct, "|") => plain(4),
            (TokenKind::Punct, "^") => plain(5),
            (TokenKind::Punct, "&") => plain(6),
            (TokenKind::Punct, "==" | "!=") => plain(7),
            (TokenKind::Punct, "<" | "<=" | ">=") => plain(8),
            (TokenKind::Punct, ">") => {
                if !self.joined(self.pos) {
                    return plain(8);
                }
                match self.nth_text(1) {
                    ">=" => None,
                    ">" if self.joined(self.pos + 1) && self.nth_text(2) == ">=" => None,
                    ">" if self.joined(self.pos + 1) && self.nth_text(2) == ">" => {
                        Some((9, 3, BinaryForm::Plain))
                    }
                    ">" => Some((9, 2, BinaryForm::Plain)),
                    _ => plain(8),
                }
            }
            (TokenKind::Keyword, "is") => Some((8, 1, BinaryForm::Is)),
            (TokenKind::Keyword, "as") => Some((8, 1, BinaryForm::As)),
            (TokenKind::Punct, "<<") => plain(9),
            (TokenKind::Punct, "+" | "-") => plain(10),
            (TokenKind::Punct, "*" | "/" | "%") => plain(11),
            (TokenKind::Keyword, "switch") if self.nth_text(1) == "{" => {
                Some((12, 1, BinaryForm::Switch))
            }
            (TokenKind::Identifier, "with") if self.nth_text(1) == "{" => {
                Some((12, 1, BinaryForm::With))
            }
            (TokenKind::Punct, "..") => Some((13, 1, BinaryForm::Range)),
            _ => None,
        }
    }

    fn binary(&mut self, min_precedence: u8) -> Option<GreenNode> {
        let mut left = self.unary()?;
        while let Some((precedence, width, form)) = self.binary_operator() {
            if precedence < min_precedence {
                break;
            }
            let mut children = vec![GreenElement::from(left)];
            for _ in 0..width {
                self.push(&mut children);
            }
            let kind = match form {
                BinaryForm::Is => {
                    match self.pattern() {
                        Some(pattern) => children.push(pattern.into()),
                        None => self.error("expected pattern"),
                    }
                    SyntaxKind::IsPatternExpression
                }
                BinaryForm::As => {
                    match self.parse_type_with(false, true) {
                        Some(ty) => {
                            let ty = if self.at("?") && !self.can_start_expression(self.pos + 1) {
                                node(SyntaxKind::NullableType, vec![ty.into(), self.bump()])
                            } else {
                                ty
                            };
                            children.push(ty.into());
                        }
                        None => self.error("expected type"),
                    }
                    SyntaxKind::AsExpression
                }
                BinaryForm::Switch => {
                    self.switch_expression_body(&mut children);
                    SyntaxKind::SwitchExpression
                }
                BinaryForm::With => {
                    children.push(self.initializer().into());
                    SyntaxKind::WithExpression
                }
                BinaryForm::Range => {
                    if self.can_start_expression(self.pos) {
                        if let Some(end) = self.binary(precedence + 1) {
                            children.push(end.into());
                        }
                    }
                    SyntaxKind::RangeExpression
                }
                BinaryForm::Plain => {
                    // `??` is right-associative.
                    let next = if precedence == 1 { precedence } else { precedence + 1 };
                    match self.binary(next) {
                        Some(right) => children.push(right.into()),
                        None => self.error("expected expression"),
                    }
                    SyntaxKind::BinaryExpression
                }
            };
            left = node(kind, children);
        }
        Some(left)
    }

    fn unary(&mut self) -> Option<GreenNode> {
        let token = self.current();
        match (token.kind(), token.text()) {
            (TokenKind::Punct, op) if PREFIX_OPERATORS.contains(&op) => {
                let mut children = vec![self.bump()];
                match self.unary() {
                    Some(operand) => children.push(operand.into()),
                    None => self.error("expected expression"),
                }
                Some(node(SyntaxKind::PrefixUnaryExpression, children))
            }
            (TokenKind::Punct, "..") => {
                let mut children = vec![self.bump()];
                if self.can_start_expression(self.pos) {
                    if let Some(end) = self.unary() {
                        children.push(end.into());
                    }
                }
                Some(node(SyntaxKind::RangeExpression, children))
            }
            (TokenKind::Keyword, "ref") => {
                let mut children = vec![self.bump()];
                self.eat("readonly", &mut children);
                match self.unary() {
                    Some(operand) => children.push(operand.into()),
                    None => self.error("expected expression"),
                }
                Some(node(SyntaxKind::PrefixUnaryExpression, children))
            }
            (TokenKind::Keyword, "throw") => {
                let mut children = vec![self.bump()];
                self.expect_expression(&mut children);
                Some(node(SyntaxKind::ThrowExpression, children))
            }
            (TokenKind::Identifier, "await")
                if self.can_start_expression(self.pos + 1)
                    && !matches!(self.nth_text(1), "-" | "+" | "*" | "&" | "^" | "..") =>
            {
                let mut children = Vec::new();
                self.push_keyword(&mut children);
                match self.unary() {
                    Some(operand) => children.push(operand.into()),
                    None => self.error("expected expression"),
                }
                Some(node(SyntaxKind::AwaitExpression, children))
            }
            (TokenKind::Punct, "(") => {
                if let Some(cast) = self.cast() {
                    return Some(cast);
                }
                let primary = self.primary()?;
                Some(self.postfix(primary))
            }
            _ => {
                let primary = self.primary()?;
                Some(self.postfix(primary))
            }
        }
    }

    fn cast(&mut self) -> Option<GreenNode> {
        let close = self.scan_type(self.pos + 1)?;
        if self.text_at(close) != ")" {
            return None;
        }
        let after = close + 1;
        let is_cast = if self.is_predefined_at(self.pos + 1) {
            self.can_start_expression(after)
        } else {
            match self.kind_at(after) {
                TokenKind::Identifier
                | TokenKind::NumericLiteral
                | TokenKind::StringLiteral
                | TokenKind::CharLiteral
                | TokenKind::InterpolatedString => true,
                TokenKind::Keyword => {
                    EXPRESSION_KEYWORDS.contains(&self.text_at(after)) || self.is_predefined_at(after)
                }
                TokenKind::Punct => matches!(self.text_at(after), "(" | "!" | "~"),
                TokenKind::EndOfFile | TokenKind::Unknown => false,
            }
        };
        if !is_cast {
            return None;
        }
        let mut children = vec![self.bump()];
        let ty = self.parse_type()?;
        children.push(ty.into());
        self.expect(")", &mut children);
        match self.unary() {
            Some(operand) => children.push(operand.into()),
            None => self.error("expected expression"),
        }
        Some(node(SyntaxKind::CastExpression, children))
    }

    fn primary(&mut self) -> Option<GreenNode> {
        let token = self.current();
        let kind = match (token.kind(), token.text()) {
            (TokenKind::NumericLiteral, _) => Some(SyntaxKind::NumericLiteralExpression),
            (TokenKind::StringLiteral, _) => Some(SyntaxKind::StringLiteralExpression),
            (TokenKind::CharLiteral, _) => Some(SyntaxKind::CharacterLiteralExpression),
            (TokenKind::InterpolatedString, _) => Some(SyntaxKind::InterpolatedStringExpression),
            (TokenKind::Keyword, "true") => Some(SyntaxKind::TrueLiteralExpression),
            (TokenKind::Keyword, "false") => Some(SyntaxKind::FalseLiteralExpression),
            (TokenKind::Keyword, "null") => Some(SyntaxKind::NullLiteralExpression),
            (TokenKind::Keyword, "this") => Some(SyntaxKind::ThisExpression),
            (TokenKind::Keyword, "base") => Some(SyntaxKind::BaseExpression),
            (TokenKind::Keyword, "default") if self.nth_text(1) != "(" => {
                Some(SyntaxKind::DefaultLiteralExpression)
            }
            _ => None,
        };
        if let Some(kind) = kind {
            return Some(node(kind, vec![self.bump()]));
        }

        match (token.kind(), token.text()) {
            (TokenKind::Identifier, _) => Some(self.simple_name_expression()),
            (TokenKind::Keyword, "new") => Some(self.creation()),
            (TokenKind::Keyword, "typeof") => Some(self.parenthesized_type(SyntaxKind::TypeOfExpression)),
            (TokenKind::Keyword, "default") => Some(self.parenthesized_type(SyntaxKind::DefaultExpression)),
            (TokenKind::Keyword, "sizeof") => Some(self.parenthesized_type(SyntaxKind::SizeOfExpression)),
            (TokenKind::Keyword, "checked" | "unchecked") => {
                let mut children = vec![self.bump()];
                self.parenthesized_expression_parts(&mut children);
                Some(node(SyntaxKind::CheckedExpression, children))
            }
            (TokenKind::Keyword, "delegate") => Some(self.anonymous_method(Vec::new())),
            (TokenKind::Keyword, "stackalloc") => {
                let mut children = vec![self.bump()];
                self.array_creation_rest(&mut children);
                Some(node(SyntaxKind::ArrayCreationExpression, children))
            }
            (TokenKind::Keyword, _) if self.is_predefined_at(self.pos) => {
                Some(node(SyntaxKind::PredefinedType, vec![self.bump()]))
            }
            (TokenKind::Punct, "(") => Some(self.parenthesized_or_tuple()),
            (TokenKind::Punct, "[") => Some(self.collection_expression()),
            _ => None,
        }
    }

    /// `Name` or `Name<Args>` in an expression; the identifier is current.
    fn simple_name_expression(&mut self) -> GreenNode {
        if self.nth_text(1) == "<" {
            if let Some(end) = self.scan_type_args(self.pos + 1) {
                if self.kind_at(end) == TokenKind::EndOfFile
                    || GENERIC_FOLLOW.contains(&self.text_at(end))
                {
                    let ident = self.bump();
                    let args = self.type_argument_list();
                    return node(SyntaxKind::GenericName, vec![ident, args.into()]);
                }
            }
        }
        node(SyntaxKind::IdentifierName, vec![self.bump()])
    }

    fn postfix(&mut self, mut expression: GreenNode) -> GreenNode {
        loop {
            let token = self.current();
            let kind = match (token.kind(), token.text()) {
                (TokenKind::Punct, "." | "::" | "->") => {
                    let mut children = vec![GreenElement::from(expression), self.bump()];
                    if self.at_identifier() {
                        children.push(self.simple_name_expression().into());
                    } else {
                        self.error("expected identifier");
                        return node(SyntaxKind::SimpleMemberAccessExpression, children);
                    }
                    expression = node(SyntaxKind::SimpleMemberAccessExpression, children);
                    continue;
                }
                (TokenKind::Punct, "?.") => {
                    let mut children = vec![GreenElement::from(expression), self.bump()];
                    if self.at_identifier() {
                        children.push(self.simple_name_expression().into());
                    } else if self.at("[") {
                        children.push(self.bracketed_argument_list().into());
                    } else {
                        self.error("expected identifier");
                        return node(SyntaxKind::ConditionalAccessExpression, children);
                    }
                    expression = node(SyntaxKind::ConditionalAccessExpression, children);
                    continue;
                }
                (TokenKind::Punct, "(") => SyntaxKind::InvocationExpression,
                (TokenKind::Punct, "[") => SyntaxKind::ElementAccessExpression,
                (TokenKind::Punct, "?") if self.joined(self.pos) && self.nth_text(1) == "[" => {
                    let mut children = vec![GreenElement::from(expression), self.bump()];
                    children.push(self.bracketed_argument_list().into());
                    expression = node(SyntaxKind::ElementAccessExpression, children);
                    continue;
                }
                (TokenKind::Punct, "++" | "--" | "!") => {
                    let operator = self.bump();
                    expression = node(
                        SyntaxKind::PostfixUnaryExpression,
                        vec![expression.into(), operator],
                    );
                    continue;
                }
                _ => return expression,
            };
            let arguments = if kind == SyntaxKind::InvocationExpression {
                self.argument_list()
            } else {
                self.bracketed_argument_list()
            };
            expression = node(kind, vec![expression.into(), arguments.into()]);
        }
    }

    pub(super) fn argument_list(&mut self) -> GreenNode {
        self.arguments(")", SyntaxKind::ArgumentList)
    }

    pub(super) fn bracketed_argument_list(&mut self) -> GreenNode {
        self.arguments("]", SyntaxKind::BracketedArgumentList)
    }

    fn arguments(&mut self, close: &str, kind: SyntaxKind) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        if !self.at(close) {
            loop {
                match self.argument(false) {
                    Some(argument) => children.push(argument.into()),
                    None => {
                        self.error("expected argument");
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

    /// One argument or tuple element. `typed_declarations` allows
    /// `Type name` elements without `out`.
    fn argument(&mut self, typed_declarations: bool) -> Option<GreenNode> {
        let mut children = Vec::new();
        if self.at_identifier() && self.nth_text(1) == ":" {
            let mut name = Vec::new();
            self.push(&mut name);
            self.push(&mut name);
            children.push(node(SyntaxKind::NameColon, name).into());
        }
        let mut out = false;
        if matches!(self.current().text(), "ref" | "out" | "in")
            && self.current_kind() == TokenKind::Keyword
        {
            out = self.at("out");
            self.push(&mut children);
        }
        if let Some(declaration) = self.declaration_expression(out || typed_declarations) {
            children.push(declaration.into());
        } else if let Some(expression) = self.expression() {
            children.push(expression.into());
        } else if children.is_empty() {
            return None;
        } else {
            self.error("expected expression");
        }
        Some(node(SyntaxKind::Argument, children))
    }

    fn declaration_expression(&mut self, typed: bool) -> Option<GreenNode> {
        let end = self.scan_type(self.pos)?;
        let declares = self.kind_at(end) == TokenKind::Identifier
            && matches!(self.text_at(end + 1), "," | ")")
            && (typed || self.at_word("var"));
        if !declares {
            return None;
        }
        let ty = self.parse_type()?;
        let mut children = vec![GreenElement::from(ty)];
        self.push(&mut children);
        Some(node(SyntaxKind::DeclarationExpression, children))
    }

    fn parenthesized_or_tuple(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        let named = self.at_identifier() && self.nth_text(1) == ":";
        let declared = self.declaration_expression(true);
        let first = match declared {
            Some(declaration) => Some(declaration),
            None if named => None,
            None => self.expression(),
        };
        let tuple = named
            || self.at(",")
            || first
                .as_ref()
                .is_some_and(|f| f.kind() == SyntaxKind::DeclarationExpression);
        if !tuple {
            match first {
                Some(inner) => children.push(inner.into()),
                None => self.error("expected expression"),
            }
            self.expect(")", &mut children);
            return node(SyntaxKind::ParenthesizedExpression, children);
        }

        match first {
            Some(element) => children.push(node(SyntaxKind::Argument, vec![element.into()]).into()),
            None => {
                if let Some(element) = self.argument(true) {
                    children.push(element.into());
                }
            }
        }
        while self.eat(",", &mut children) {
            match self.argument(true) {
                Some(element) => children.push(element.into()),
                None => {
                    self.error("expected expression");
                    break;
                }
            }
        }
        self.expect(")", &mut children);
        node(SyntaxKind::TupleExpression, children)
    }

    fn parenthesized_expression_parts(&mut self, children: &mut Children) {
        self.expect("(", children);
        self.expect_expression(children);
        self.expect(")", children);
    }

    /// `typeof(T)`, `default(T)` and `sizeof(T)`.
    fn parenthesized_type(&mut self, kind: SyntaxKind) -> GreenNode {
        let mut children = vec![self.bump()];
        self.expect("(", &mut children);
        self.expect_type(&mut children);
        self.expect(")", &mut children);
        node(kind, children)
    }

    fn collection_expression(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        self.element_list("]", &mut children);
        self.expect("]", &mut children);
        node(SyntaxKind::CollectionExpression, children)
    }

    /// Comma-separated expressions (or nested initializers) up to `close`.
    fn element_list(&mut self, close: &str, children: &mut Children) {
        while !self.at_eof() && !self.at(close) {
            let element = if self.at("{") {
                Some(self.initializer())
            } else {
                self.expression()
            };
            match element {
                Some(element) => children.push(element.into()),
                None => {
                    self.skip_token("expected expression", children);
                    continue;
                }
            }
            if !self.eat(",", children) {
                break;
            }
        }
    }

    pub(super) fn initializer(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        self.element_list("}", &mut children);
        self.expect("}", &mut children);
        node(SyntaxKind::InitializerExpression, children)
    }

    fn creation(&mut self) -> GreenNode {
        let mut children = vec![self.bump()];
        if self.at("{") {
            children.push(self.initializer().into());
            return node(SyntaxKind::AnonymousObjectCreationExpression, children);
        }
        if self.at("(") {
            children.push(self.argument_list().into());
            if self.at("{") {
                children.push(self.initializer().into());
            }
            return node(SyntaxKind::ImplicitObjectCreationExpression, children);
        }
        if self.at("[") {
            let mut rank = Vec::new();
            self.push(&mut rank);
            while self.at(",") {
                self.push(&mut rank);
            }
            self.expect("]", &mut rank);
            children.push(node(SyntaxKind::ArrayRankSpecifier, rank).into());
            if self.at("{") {
                children.push(self.initializer().into());
            }
            return node(SyntaxKind::ImplicitArrayCreationExpression, children);
        }
        let Some(ty) = self.parse_type_with(true, false) else {
            self.error("expected type");
            return node(SyntaxKind::ObjectCreationExpression, children);
        };
        if self.at("[") {
            let mut array = vec![GreenElement::from(ty)];
            self.rank_specifiers(&mut array);
            children.push(node(SyntaxKind::ArrayType, array).into());
            if self.at("{") {
                children.push(self.initializer().into());
            }
            return node(SyntaxKind::ArrayCreationExpression, children);
        }
        children.push(ty.into());
        if self.at("(") {
            children.push(self.argument_list().into());
        }
        if self.at("{") {
            children.push(self.initializer().into());
        }
        node(SyntaxKind::ObjectCreationExpression, children)
    }

    /// Element type, sized rank specifiers and optional initializer, after
    /// `stackalloc`.
    fn array_creation_rest(&mut self, children: &mut Children) {
        let Some(ty) = self.parse_type_with(false, false) else {
            if self.at("[") {
                let mut array = Vec::new();
                self.rank_specifiers(&mut array);
                children.extend(array);
            }
            if self.at("{") {
                children.push(self.initializer().into());
            }
            return;
        };
        let mut array = vec![GreenElement::from(ty)];
        self.rank_specifiers(&mut array);
        children.push(node(SyntaxKind::ArrayType, array).into());
        if self.at("{") {
            children.push(self.initializer().into());
        }
    }

    /// `[n]`, `[,]`, `[]` ... with optional size expressions.
    fn rank_specifiers(&mut self, children: &mut Children) {
        while self.at("[") {
            let mut rank = Vec::new();
            self.push(&mut rank);
            while !self.at_eof() && !self.at("]") {
                if self.eat(",", &mut rank) {
                    continue;
                }
                if !self.expect_expression(&mut rank) {
                    break;
                }
            }
            self.expect("]", &mut rank);
            children.push(node(SyntaxKind::ArrayRankSpecifier, rank).into());
        }
    }

    fn switch_expression_body(&mut self, children: &mut Children) {
        if !self.expect("{", children) {
            return;
        }
        while !self.at_eof() && !self.at("}") {
            let Some(pattern) = self.pattern() else {
                self.skip_token("expected pattern", children);
                continue;
            };
            let mut arm = vec![GreenElement::from(pattern)];
            if self.at_word("when") {
                self.push(&mut arm);
                self.expect_expression(&mut arm);
            }
            self.expect("=>", &mut arm);
            self.expect_expression(&mut arm);
            children.push(node(SyntaxKind::SwitchExpressionArm, arm).into());
            if !self.eat(",", children) {
                break;
            }
        }
        self.expect("}", children);
    }

    /// Collects the tokens of a pattern up to the first terminator at
    /// nesting depth zero. Patterns are kept as flat token runs.
    pub(super) fn pattern(&mut self) -> Option<GreenNode> {
        let mut children = Vec::new();
        let mut depth = 0usize;
        while !self.at_eof() {
            let token = self.current();
            let text = token.text();
            if depth == 0 {
                let terminator = match token.kind() {
                    TokenKind::Punct => matches!(
                        text,
                        ")" | "]" | "}" | ";" | "," | ":" | "=>" | "&&" | "||" | "??" | "=="
                            | "!=" | "?" | "="
                    ),
                    TokenKind::Identifier => text == "when",
                    _ => false,
                };
                if terminator {
                    break;
                }
            }
            match text {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth -= 1,
                _ => {}
            }
            self.push(&mut children);
        }
        (!children.is_empty()).then(|| node(SyntaxKind::Pattern, children))
    }

    fn lambda(&mut self) -> Option<GreenNode> {
        let mut index = self.pos;
        if self.text_at(index) == "static" && self.kind_at(index) == TokenKind::Keyword {
            index += 1;
        }
        if self.kind_at(index) == TokenKind::Identifier
            && self.text_at(index) == "async"
            && (matches!(self.kind_at(index + 1), TokenKind::Identifier)
                || matches!(self.text_at(index + 1), "(" | "delegate"))
        {
            index += 1;
        }
        let kind = if self.kind_at(index) == TokenKind::Identifier && self.text_at(index + 1) == "=>" {
            SyntaxKind::SimpleLambdaExpression
        } else if self.text_at(index) == "(" && self.lambda_parameters_end(index).is_some() {
            SyntaxKind::ParenthesizedLambdaExpression
        } else if self.text_at(index) == "delegate" && index > self.pos {
            let mut modifiers = Vec::new();
            while self.pos < index {
                self.push_keyword(&mut modifiers);
            }
            return Some(self.anonymous_method(modifiers));
        } else {
            return None;
        };

        let mut children = Vec::new();
        while self.pos < index {
            self.push_keyword(&mut children);
        }
        if kind == SyntaxKind::SimpleLambdaExpression {
            let parameter = vec![self.bump()];
            children.push(node(SyntaxKind::Parameter, parameter).into());
        } else {
            children.push(self.parameter_list(")", SyntaxKind::ParameterList).into());
        }
        self.expect("=>", &mut children);
        if self.at("{") {
            children.push(self.block().into());
        } else {
            self.expect_expression(&mut children);
        }
        Some(node(kind, children))
    }

    /// Index of `=>` after the parenthesized parameter list at `index`.
    fn lambda_parameters_end(&self, index: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut i = index;
        loop {
            match self.text_at(i) {
                "(" => depth += 1,
                ")" => {
                    depth -= 1;
                    if depth == 0 {
                        return (self.text_at(i + 1) == "=>").then_some(i + 1);
                    }
                }
                ";" | "{" | "}" => return None,
                _ if self.kind_at(i) == TokenKind::EndOfFile => return None,
                _ => {}
            }
            i += 1;
        }
    }

    /// `delegate (params) { ... }`, mapped onto a parenthesized lambda.
    fn anonymous_method(&mut self, mut children: Children) -> GreenNode {
        self.push(&mut children);
        if self.at("(") {
            children.push(self.parameter_list(")", SyntaxKind::ParameterList).into());
        }
        if self.at("{") {
            children.push(self.block().into());
        } else {
            self.error("expected `{`");
        }
        node(SyntaxKind::ParenthesizedLambdaExpression, children)
    }
}
