//! Type syntax and the speculative scans used to classify ambiguous input.

use super::{node, Children, Parser};
use dataverse_lint_core::syntax::{GreenElement, GreenNode, SyntaxKind, TokenKind};

pub(super) const PREDEFINED_TYPES: &[&str] = &[
    "bool", "byte", "sbyte", "char", "decimal", "double", "float", "int", "uint", "long",
    "ulong", "short", "ushort", "object", "string", "void",
];

impl Parser {
    pub(super) fn is_predefined_at(&self, index: usize) -> bool {
        self.kind_at(index) == TokenKind::Keyword && PREDEFINED_TYPES.contains(&self.text_at(index))
    }

    /// Index just past a type starting at `index`, without consuming.
    pub(super) fn scan_type(&self, index: usize) -> Option<usize> {
        let mut end = if self.is_predefined_at(index) {
            index + 1
        } else if self.kind_at(index) == TokenKind::Identifier {
            self.scan_name(index)
        } else if self.text_at(index) == "(" {
            self.scan_tuple_type(index)?
        } else {
            return None;
        };
        loop {
            match self.text_at(end) {
                "?" => end += 1,
                "[" => {
                    let mut close = end + 1;
                    while self.text_at(close) == "," {
                        close += 1;
                    }
                    if self.text_at(close) != "]" {
                        break;
                    }
                    end = close + 1;
                }
                _ => break,
            }
        }
        Some(end)
    }

    fn scan_name(&self, index: usize) -> usize {
        let mut end = index + 1;
        if self.text_at(end) == "<" {
            if let Some(close) = self.scan_type_args(end) {
                end = close;
            }
        }
        while matches!(self.text_at(end), "." | "::")
            && self.kind_at(end + 1) == TokenKind::Identifier
        {
            end += 2;
            if self.text_at(end) == "<" {
                if let Some(close) = self.scan_type_args(end) {
                    end = close;
                }
            }
        }
        end
    }

    /// Index just past `<...>` at `index`, or `None` if it is not a type
    /// argument list.
    pub(super) fn scan_type_args(&self, index: usize) -> Option<usize> {
        let mut end = index + 1;
        if matches!(self.text_at(end), "," | ">") {
            while self.text_at(end) == "," {
                end += 1;
            }
            return (self.text_at(end) == ">").then_some(end + 1);
        }
        loop {
            end = self.scan_type(end)?;
            match self.text_at(end) {
                "," => end += 1,
                ">" => return Some(end + 1),
                _ => return None,
            }
        }
    }

    fn scan_tuple_type(&self, index: usize) -> Option<usize> {
        let mut end = index + 1;
        let mut elements = 0;
        loop {
            end = self.scan_type(end)?;
            if self.kind_at(end) == TokenKind::Identifier {
                end += 1;
            }
            elements += 1;
            match self.text_at(end) {
                "," => end += 1,
                ")" => return (elements >= 2).then_some(end + 1),
                _ => return None,
            }
        }
    }

    pub(super) fn parse_type(&mut self) -> Option<GreenNode> {
        self.parse_type_with(true, true)
    }

    /// Parses a type. `nullable` allows a trailing `?`; `arrays` allows
    /// empty rank specifiers.
    pub(super) fn parse_type_with(&mut self, nullable: bool, arrays: bool) -> Option<GreenNode> {
        let mut ty = if self.is_predefined_at(self.pos) {
            node(SyntaxKind::PredefinedType, vec![self.bump()])
        } else if self.at_identifier() {
            self.parse_name()?
        } else if self.at("(") && self.scan_tuple_type(self.pos).is_some() {
            self.tuple_type()
        } else {
            return None;
        };
        loop {
            if nullable && self.at("?") {
                ty = node(SyntaxKind::NullableType, vec![ty.into(), self.bump()]);
            } else if arrays && self.at("[") && self.at_empty_rank() {
                let mut children = vec![GreenElement::from(ty)];
                while self.at("[") && self.at_empty_rank() {
                    let mut rank = Vec::new();
                    self.push(&mut rank);
                    while self.at(",") {
                        self.push(&mut rank);
                    }
                    self.push(&mut rank);
                    children.push(node(SyntaxKind::ArrayRankSpecifier, rank).into());
                }
                ty = node(SyntaxKind::ArrayType, children);
            } else {
                break;
            }
        }
        Some(ty)
    }

    fn at_empty_rank(&self) -> bool {
        let mut i = self.pos + 1;
        while self.text_at(i) == "," {
            i += 1;
        }
        self.text_at(i) == "]"
    }

    /// Parses a type into `children`, recording an error when none is present.
    pub(super) fn expect_type(&mut self, children: &mut Children) -> bool {
        match self.parse_type() {
            Some(ty) => {
                children.push(ty.into());
                true
            }
            None => {
                self.error("expected type");
                false
            }
        }
    }

    /// Dotted name: `A`, `A.B<C>`, `global::A.B`.
    pub(super) fn parse_name(&mut self) -> Option<GreenNode> {
        if !self.at_identifier() {
            return None;
        }
        let mut name = self.simple_type_name();
        while (self.at(".") || self.at("::"))
            && self.kind_at(self.pos + 1) == TokenKind::Identifier
        {
            let dot = self.bump();
            let right = self.simple_type_name();
            name = node(SyntaxKind::QualifiedName, vec![name.into(), dot, right.into()]);
        }
        Some(name)
    }

    /// `Name` or `Name<Args>` in a type position; the identifier is current.
    pub(super) fn simple_type_name(&mut self) -> GreenNode {
        let ident = self.bump();
        if self.at("<") && self.scan_type_args(self.pos).is_some() {
            let args = self.type_argument_list();
            return node(SyntaxKind::GenericName, vec![ident, args.into()]);
        }
        node(SyntaxKind::IdentifierName, vec![ident])
    }

    pub(super) fn type_argument_list(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        loop {
            if self.at(",") {
                self.push(&mut children);
            } else if self.at(">") {
                self.push(&mut children);
                break;
            } else if let Some(ty) = self.parse_type() {
                children.push(ty.into());
            } else {
                self.error("expected `>`");
                break;
            }
        }
        node(SyntaxKind::TypeArgumentList, children)
    }

    fn tuple_type(&mut self) -> GreenNode {
        let mut children = Vec::new();
        self.push(&mut children);
        loop {
            if !self.expect_type(&mut children) {
                break;
            }
            if self.at_identifier() {
                self.push(&mut children);
            }
            if !self.eat(",", &mut children) {
                break;
            }
        }
        self.expect(")", &mut children);
        node(SyntaxKind::TupleType, children)
    }
}
