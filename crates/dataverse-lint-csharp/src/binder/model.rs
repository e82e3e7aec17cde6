//! Per-file semantic model: parameters, locals and expression types.

use super::declarations::{accepts, parameter_decls, type_parameter_names};
use super::{
    contains, dotted_name, identifier_name, is_value_like, special, Compilation, Scope,
};
use dataverse_lint_core::semantic::{
    MethodSymbol, ParameterSymbol, SemanticModel, SpecialType, TypeSymbol,
};
use dataverse_lint_core::syntax::{SyntaxKind, SyntaxNode, SyntaxTree, TextRange};
use std::collections::HashMap;
use std::sync::Arc;

/// Bound on nested inference steps; deeper chains (and self-referential
/// `var` declarations) come back unresolved.
const MAX_DEPTH: usize = 32;

/// How a local's type is found.
#[derive(Debug)]
enum LocalType {
    /// Declared type syntax; `var` takes the initializer's type.
    Declared {
        syntax: SyntaxNode,
        initializer: Option<SyntaxNode>,
    },
    /// `foreach` variable; `var` takes the collection's element type.
    Element {
        syntax: SyntaxNode,
        collection: SyntaxNode,
    },
    /// Implicitly typed lambda parameter.
    Unknown,
}

#[derive(Debug)]
struct Local {
    name: String,
    /// Visible from this offset on.
    offset: usize,
    ty: LocalType,
}

/// A region with its own parameters and locals: a member body, a local
/// function, an accessor, or the whole file for top-level statements.
#[derive(Debug)]
struct Body {
    span: TextRange,
    scope: Arc<Scope>,
    parameters: Vec<Local>,
    locals: Vec<Local>,
}

/// Semantic model of one file of a [`Compilation`].
#[derive(Debug)]
pub struct FileModel {
    compilation: Arc<Compilation>,
    file: usize,
    /// The first body is the file itself.
    bodies: Vec<Body>,
    /// Names assigned inside object initializers and `with` expressions,
    /// mapped to the expression whose type declares them.
    initializer_targets: HashMap<TextRange, SyntaxNode>,
    local_functions: Vec<SyntaxNode>,
}

impl FileModel {
    pub(crate) fn new(compilation: Arc<Compilation>, file: usize, tree: &SyntaxTree) -> Self {
        let root = tree.root();
        let mut model = Self {
            compilation,
            file,
            bodies: Vec::new(),
            initializer_targets: HashMap::new(),
            local_functions: Vec::new(),
        };
        model.push_body(root.full_span(), Vec::new(), Vec::new());

        let mut locals = Vec::new();
        for node in root.descendants() {
            match node.kind() {
                SyntaxKind::MethodDeclaration
                | SyntaxKind::ConstructorDeclaration
                | SyntaxKind::OperatorDeclaration
                | SyntaxKind::DestructorDeclaration
                | SyntaxKind::LocalFunctionStatement => {
                    let parameters = node
                        .child_of_kind(SyntaxKind::ParameterList)
                        .map(|list| parameter_locals(&list))
                        .unwrap_or_default();
                    model.push_body(node.span(), type_parameter_names(&node), parameters);
                    if node.kind() == SyntaxKind::LocalFunctionStatement {
                        model.local_functions.push(node.clone());
                    }
                }
                SyntaxKind::IndexerDeclaration => {
                    let parameters = node
                        .child_of_kind(SyntaxKind::BracketedParameterList)
                        .map(|list| parameter_locals(&list))
                        .unwrap_or_default();
                    model.push_body(node.span(), Vec::new(), parameters);
                    model.push_setter_bodies(&node);
                }
                SyntaxKind::PropertyDeclaration | SyntaxKind::EventDeclaration => {
                    model.push_setter_bodies(&node);
                }
                kind if kind.is_type_declaration() => {
                    if let Some(list) = node.child_of_kind(SyntaxKind::ParameterList) {
                        model.push_body(node.span(), Vec::new(), parameter_locals(&list));
                    }
                }
                SyntaxKind::LocalDeclarationStatement
                | SyntaxKind::ForStatement
                | SyntaxKind::UsingStatement
                | SyntaxKind::FixedStatement => {
                    if let Some(declaration) = node.child_of_kind(SyntaxKind::VariableDeclaration) {
                        locals.extend(declared_locals(&declaration));
                    }
                }
                SyntaxKind::ForEachStatement => locals.extend(foreach_local(&node)),
                SyntaxKind::CatchDeclaration | SyntaxKind::DeclarationExpression => {
                    if let (Some(name), Some(syntax)) =
                        (identifier_name(&node), node.find_child(SyntaxKind::is_type))
                    {
                        locals.push(Local {
                            name,
                            offset: node.span().start,
                            ty: LocalType::Declared {
                                syntax,
                                initializer: None,
                            },
                        });
                    }
                }
                SyntaxKind::SimpleLambdaExpression => {
                    if let Some(name) = node
                        .child_of_kind(SyntaxKind::Parameter)
                        .and_then(|p| identifier_name(&p))
                    {
                        locals.push(Local {
                            name,
                            offset: node.span().start,
                            ty: LocalType::Unknown,
                        });
                    }
                }
                SyntaxKind::ParenthesizedLambdaExpression => {
                    if let Some(list) = node.child_of_kind(SyntaxKind::ParameterList) {
                        locals.extend(parameter_locals(&list).into_iter().map(|mut local| {
                            local.offset = node.span().start;
                            local
                        }));
                    }
                }
                SyntaxKind::ObjectCreationExpression => {
                    if let Some(initializer) = node.child_of_kind(SyntaxKind::InitializerExpression) {
                        model.record_initializer(&node, &initializer);
                    }
                }
                SyntaxKind::WithExpression => {
                    let receiver = node.child_nodes().next();
                    let initializer = node.child_of_kind(SyntaxKind::InitializerExpression);
                    if let (Some(receiver), Some(initializer)) = (receiver, initializer) {
                        model.record_initializer(&receiver, &initializer);
                    }
                }
                SyntaxKind::SimpleAssignmentExpression => {
                    // Nested `Member = { ... }` initializers.
                    let mut parts = node.child_nodes();
                    if let (Some(target), Some(value)) = (parts.next(), parts.next()) {
                        if target.kind() == SyntaxKind::IdentifierName
                            && value.kind() == SyntaxKind::InitializerExpression
                        {
                            model.record_initializer(&target, &value);
                        }
                    }
                }
                _ => {}
            }
        }
        for local in locals {
            let body = model.innermost_body(local.offset);
            model.bodies[body].locals.push(local);
        }
        model
    }

    fn push_body(&mut self, span: TextRange, type_parameters: Vec<String>, parameters: Vec<Local>) {
        let scope = self.compilation.files[self.file].scope_at(span.start);
        let scope = if type_parameters.is_empty() {
            scope
        } else {
            let mut combined = Scope::clone(&scope);
            combined.type_parameters.extend(type_parameters);
            Arc::new(combined)
        };
        self.bodies.push(Body {
            span,
            scope,
            parameters,
            locals: Vec::new(),
        });
    }

    /// `set` and `init` accessors see an implicit `value` of the member's type.
    fn push_setter_bodies(&mut self, member: &SyntaxNode) {
        let Some(syntax) = member.find_child(SyntaxKind::is_type) else {
            return;
        };
        let Some(list) = member.child_of_kind(SyntaxKind::AccessorList) else {
            return;
        };
        for accessor in list.children_of_kind(SyntaxKind::AccessorDeclaration) {
            let setter = accessor
                .child_tokens()
                .any(|t| matches!(t.text(), "set" | "init" | "add" | "remove"));
            if setter {
                let value = Local {
                    name: "value".to_string(),
                    offset: accessor.span().start,
                    ty: LocalType::Declared {
                        syntax: syntax.clone(),
                        initializer: None,
                    },
                };
                self.push_body(accessor.span(), Vec::new(), vec![value]);
            }
        }
    }

    fn record_initializer(&mut self, target: &SyntaxNode, initializer: &SyntaxNode) {
        for assignment in initializer.children_of_kind(SyntaxKind::SimpleAssignmentExpression) {
            if let Some(name) = assignment
                .child_nodes()
                .next()
                .filter(|n| n.kind() == SyntaxKind::IdentifierName)
            {
                self.initializer_targets.insert(name.span(), target.clone());
            }
        }
    }

    fn innermost_body(&self, offset: usize) -> usize {
        self.bodies
            .iter()
            .enumerate()
            .filter(|(_, body)| contains(body.span, offset))
            .min_by_key(|(_, body)| body.span.len())
            .map_or(0, |(index, _)| index)
    }

    /// Bodies around `offset`, innermost first.
    fn bodies_at(&self, offset: usize) -> Vec<&Body> {
        let mut bodies: Vec<&Body> = self
            .bodies
            .iter()
            .filter(|body| contains(body.span, offset))
            .collect();
        bodies.sort_by_key(|body| body.span.len());
        bodies
    }

    fn scope_at(&self, offset: usize) -> Arc<Scope> {
        match self.innermost_body(offset) {
            0 => self.compilation.files[self.file].scope_at(offset),
            index => Arc::clone(&self.bodies[index].scope),
        }
    }

    fn enclosing_type(&self, offset: usize) -> Option<Arc<TypeSymbol>> {
        self.compilation.files[self.file]
            .type_at(offset)
            .map(|context| self.compilation.symbol(context.decl))
    }

    fn expression_type(&self, node: &SyntaxNode, depth: usize) -> Option<Arc<TypeSymbol>> {
        if depth > MAX_DEPTH {
            return None;
        }
        let offset = node.span().start;
        let first = || node.child_nodes().next();
        match node.kind() {
            kind if kind.is_type_declaration() => self.compilation.files[self.file]
                .types
                .iter()
                .find(|context| context.span == node.span())
                .map(|context| self.compilation.symbol(context.decl)),
            SyntaxKind::IdentifierName | SyntaxKind::GenericName => {
                self.identifier_type(node, depth)
            }
            SyntaxKind::QualifiedName
            | SyntaxKind::PredefinedType
            | SyntaxKind::NullableType
            | SyntaxKind::ArrayType
            | SyntaxKind::TupleType => Some(self.compilation.resolve_type(node, &self.scope_at(offset))),
            SyntaxKind::NumericLiteralExpression => Some(special(numeric_literal_type(&node.text()))),
            SyntaxKind::StringLiteralExpression | SyntaxKind::InterpolatedStringExpression => {
                Some(special(SpecialType::String))
            }
            SyntaxKind::CharacterLiteralExpression => Some(special(SpecialType::Char)),
            SyntaxKind::TrueLiteralExpression
            | SyntaxKind::FalseLiteralExpression
            | SyntaxKind::IsPatternExpression => Some(special(SpecialType::Boolean)),
            SyntaxKind::SizeOfExpression => Some(special(SpecialType::Int32)),
            SyntaxKind::ThisExpression => self.enclosing_type(offset),
            SyntaxKind::BaseExpression => self.enclosing_type(offset)?.base_type().cloned(),
            SyntaxKind::ParenthesizedExpression
            | SyntaxKind::CheckedExpression
            | SyntaxKind::SimpleAssignmentExpression
            | SyntaxKind::CompoundAssignmentExpression
            | SyntaxKind::PostfixUnaryExpression
            | SyntaxKind::EqualsValueClause
            | SyntaxKind::ArrowExpressionClause => self.expression_type(&first()?, depth + 1),
            SyntaxKind::CastExpression
            | SyntaxKind::DefaultExpression
            | SyntaxKind::ObjectCreationExpression
            | SyntaxKind::ArrayCreationExpression
            | SyntaxKind::Parameter
            | SyntaxKind::PropertyDeclaration => {
                let syntax = node.find_child(SyntaxKind::is_type)?;
                Some(self.compilation.resolve_type(&syntax, &self.scope_at(offset)))
            }
            SyntaxKind::DeclarationExpression => {
                let syntax = node.find_child(SyntaxKind::is_type)?;
                (!is_var(&syntax))
                    .then(|| self.compilation.resolve_type(&syntax, &self.scope_at(offset)))
            }
            SyntaxKind::AsExpression => {
                let syntax = node.child_nodes().nth(1)?;
                let ty = self.compilation.resolve_type(&syntax, &self.scope_at(offset));
                Some(if is_value_like(&ty) {
                    Arc::new(TypeSymbol::nullable_of(ty))
                } else {
                    ty
                })
            }
            SyntaxKind::TypeOfExpression => self
                .compilation
                .resolve_dotted("System.Type", &self.scope_at(offset)),
            SyntaxKind::SimpleMemberAccessExpression => self.member_access_type(node, depth),
            SyntaxKind::ConditionalAccessExpression => {
                let ty = self.member_access_type(node, depth)?;
                Some(if is_value_like(&ty) {
                    Arc::new(TypeSymbol::nullable_of(ty))
                } else {
                    ty
                })
            }
            SyntaxKind::ElementAccessExpression => {
                let receiver = self.expression_type(&first()?, depth + 1)?;
                self.compilation.indexer_type(&receiver)
            }
            SyntaxKind::InvocationExpression => {
                let callee = first()?;
                if callee.kind() == SyntaxKind::IdentifierName
                    && identifier_name(&callee).as_deref() == Some("nameof")
                {
                    return Some(special(SpecialType::String));
                }
                self.invocation_method(node, depth)?.return_type
            }
            SyntaxKind::AwaitExpression => {
                let awaited = self.expression_type(&first()?, depth + 1)?;
                if matches!(awaited.name(), "Task" | "ValueTask")
                    && awaited.namespace() == Some("System.Threading.Tasks")
                {
                    return Some(
                        awaited
                            .type_arguments()
                            .first()
                            .cloned()
                            .unwrap_or_else(|| special(SpecialType::Void)),
                    );
                }
                Some(awaited)
            }
            SyntaxKind::ConditionalExpression => {
                let mut parts = node.child_nodes().skip(1);
                let (when_true, when_false) = (parts.next()?, parts.next()?);
                self.expression_type(&when_true, depth + 1)
                    .or_else(|| self.expression_type(&when_false, depth + 1))
            }
            SyntaxKind::PrefixUnaryExpression => {
                if node.first_token().is_some_and(|t| t.text() == "!") {
                    return Some(special(SpecialType::Boolean));
                }
                self.expression_type(&first()?, depth + 1)
            }
            SyntaxKind::BinaryExpression => self.binary_type(node, depth),
            _ => None,
        }
    }

    fn binary_type(&self, node: &SyntaxNode, depth: usize) -> Option<Arc<TypeSymbol>> {
        let operator: String = node.child_tokens().map(|t| t.text().to_string()).collect();
        let mut operands = node.child_nodes();
        let (left, right) = (operands.next()?, operands.next()?);
        match operator.as_str() {
            "==" | "!=" | "<" | ">" | "<=" | ">=" | "&&" | "||" => {
                Some(special(SpecialType::Boolean))
            }
            "??" => {
                let left = self.expression_type(&left, depth + 1);
                match left {
                    Some(ty) if ty.is_nullable_wrapper() => ty.type_arguments().first().cloned(),
                    Some(ty) => Some(ty),
                    None => self.expression_type(&right, depth + 1),
                }
            }
            "+" => {
                let left = self.expression_type(&left, depth + 1);
                let right = self.expression_type(&right, depth + 1);
                let is_string = |t: &Option<Arc<TypeSymbol>>| {
                    t.as_ref().is_some_and(|t| t.special_type() == SpecialType::String)
                };
                if is_string(&left) || is_string(&right) {
                    return Some(special(SpecialType::String));
                }
                left.or(right)
            }
            _ => self
                .expression_type(&left, depth + 1)
                .or_else(|| self.expression_type(&right, depth + 1)),
        }
    }

    /// Locals, then parameters, then members of the enclosing types, then
    /// type names. Names that resolve nowhere become error-kind symbols.
    fn identifier_type(&self, node: &SyntaxNode, depth: usize) -> Option<Arc<TypeSymbol>> {
        let name = identifier_name(node)?;
        let offset = node.span().start;
        if let Some(target) = self.initializer_targets.get(&node.span()) {
            let target = self.expression_type(target, depth + 1)?;
            return self.compilation.member_type(&target, &name);
        }
        if node.kind() == SyntaxKind::IdentifierName {
            for body in self.bodies_at(offset) {
                let local = body
                    .locals
                    .iter()
                    .rev()
                    .find(|local| local.name == name && local.offset <= offset)
                    .or_else(|| body.parameters.iter().find(|p| p.name == name));
                if let Some(local) = local {
                    return self.local_type(local, depth);
                }
            }
            let scope = self.scope_at(offset);
            for &outer in scope.types.iter().rev() {
                let outer = self.compilation.symbol(outer);
                if let Some(ty) = self.compilation.member_type(&outer, &name) {
                    return Some(ty);
                }
            }
        }
        let scope = self.scope_at(offset);
        let arguments = self.compilation.type_arguments(node, &scope);
        Some(self.compilation.resolve_name(&name, arguments, &scope))
    }

    fn local_type(&self, local: &Local, depth: usize) -> Option<Arc<TypeSymbol>> {
        match &local.ty {
            LocalType::Declared {
                syntax,
                initializer,
            } => {
                if is_var(syntax) {
                    return self.expression_type(initializer.as_ref()?, depth + 1);
                }
                Some(self.declared(syntax))
            }
            LocalType::Element { syntax, collection } => {
                if is_var(syntax) {
                    let collection = self.expression_type(collection, depth + 1)?;
                    return self.compilation.element_type(&collection);
                }
                Some(self.declared(syntax))
            }
            LocalType::Unknown => None,
        }
    }

    fn declared(&self, syntax: &SyntaxNode) -> Arc<TypeSymbol> {
        self.compilation
            .resolve_type(syntax, &self.scope_at(syntax.span().start))
    }

    fn member_access_type(&self, node: &SyntaxNode, depth: usize) -> Option<Arc<TypeSymbol>> {
        let mut parts = node.child_nodes();
        let (receiver, member) = (parts.next()?, parts.next()?);
        let receiver_type = self.expression_type(&receiver, depth + 1);
        if member.kind() == SyntaxKind::BracketedArgumentList {
            return self.compilation.indexer_type(&receiver_type?);
        }
        let name = identifier_name(&member)?;
        if let Some(receiver_type) = &receiver_type {
            if let Some(ty) = self.compilation.member_type(receiver_type, &name) {
                return Some(ty);
            }
        }
        // `System.Guid` and friends: a namespace-qualified type reference.
        let dotted = dotted_name(node)?;
        self.compilation
            .resolve_dotted(&dotted, &self.scope_at(node.span().start))
    }

    fn invocation_method(&self, invocation: &SyntaxNode, depth: usize) -> Option<MethodSymbol> {
        if depth > MAX_DEPTH {
            return None;
        }
        let callee = invocation.child_nodes().next()?;
        let arguments = invocation
            .child_of_kind(SyntaxKind::ArgumentList)
            .map_or(0, |list| list.children_of_kind(SyntaxKind::Argument).len());
        let scope = self.scope_at(invocation.span().start);
        match callee.kind() {
            SyntaxKind::IdentifierName | SyntaxKind::GenericName => {
                let name = identifier_name(&callee)?;
                let type_arguments = self.compilation.type_arguments(&callee, &scope);
                if let Some(function) = self.local_function(&name, arguments, &type_arguments) {
                    return Some(function);
                }
                scope.types.iter().rev().find_map(|&outer| {
                    self.compilation.find_method(
                        &self.compilation.symbol(outer),
                        &name,
                        arguments,
                        &type_arguments,
                    )
                })
            }
            SyntaxKind::SimpleMemberAccessExpression | SyntaxKind::ConditionalAccessExpression => {
                let mut parts = callee.child_nodes();
                let (receiver, member) = (parts.next()?, parts.next()?);
                if !member.kind().is_simple_name() {
                    return None;
                }
                let name = identifier_name(&member)?;
                let type_arguments = self.compilation.type_arguments(&member, &scope);
                self.expression_type(&receiver, depth + 1)
                    .and_then(|ty| {
                        self.compilation
                            .find_method(&ty, &name, arguments, &type_arguments)
                    })
                    .or_else(|| {
                        self.compilation
                            .find_extension(&name, arguments, &type_arguments)
                    })
            }
            _ => None,
        }
    }

    fn local_function(
        &self,
        name: &str,
        arguments: usize,
        type_arguments: &[Arc<TypeSymbol>],
    ) -> Option<MethodSymbol> {
        self.local_functions.iter().find_map(|function| {
            if identifier_name(function).as_deref() != Some(name) {
                return None;
            }
            let list = function.child_of_kind(SyntaxKind::ParameterList)?;
            let parameters = parameter_decls(&list);
            if !accepts(&parameters, arguments) {
                return None;
            }
            let scope = self.scope_at(list.span().start);
            let type_parameters = type_parameter_names(function);
            let map: Vec<(String, Arc<TypeSymbol>)> = type_parameters
                .into_iter()
                .zip(type_arguments.iter().cloned())
                .collect();
            let resolve = |syntax: &SyntaxNode| {
                super::substitute(&self.compilation.resolve_type(syntax, &scope), &map)
            };
            Some(MethodSymbol {
                name: name.to_string(),
                containing_type: None,
                parameters: parameters
                    .iter()
                    .map(|p| ParameterSymbol {
                        name: p.name.clone(),
                        ty: p.ty.as_ref().map(&resolve),
                        is_params: p.is_params,
                        is_optional: p.is_optional,
                    })
                    .collect(),
                return_type: function.find_child(SyntaxKind::is_type).map(|t| resolve(&t)),
            })
        })
    }
}

impl SemanticModel for FileModel {
    fn type_of(&self, node: &SyntaxNode) -> Option<Arc<TypeSymbol>> {
        self.expression_type(node, 0)
    }

    fn method_of(&self, invocation: &SyntaxNode) -> Option<MethodSymbol> {
        if invocation.kind() != SyntaxKind::InvocationExpression {
            return None;
        }
        self.invocation_method(invocation, 0)
    }
}

fn is_var(syntax: &SyntaxNode) -> bool {
    syntax.kind() == SyntaxKind::IdentifierName && syntax.text() == "var"
}

fn parameter_locals(list: &SyntaxNode) -> Vec<Local> {
    parameter_decls(list)
        .into_iter()
        .map(|parameter| Local {
            name: parameter.name,
            offset: list.span().start,
            ty: match parameter.ty {
                Some(syntax) => LocalType::Declared {
                    syntax,
                    initializer: None,
                },
                None => LocalType::Unknown,
            },
        })
        .collect()
}

fn declared_locals(declaration: &SyntaxNode) -> Vec<Local> {
    let Some(syntax) = declaration.find_child(SyntaxKind::is_type) else {
        return Vec::new();
    };
    declaration
        .children_of_kind(SyntaxKind::VariableDeclarator)
        .iter()
        .filter_map(|declarator| {
            Some(Local {
                name: identifier_name(declarator)?,
                offset: declarator.span().start,
                ty: LocalType::Declared {
                    syntax: syntax.clone(),
                    initializer: declarator
                        .child_of_kind(SyntaxKind::EqualsValueClause)
                        .and_then(|clause| clause.child_nodes().next()),
                },
            })
        })
        .collect()
}

fn foreach_local(statement: &SyntaxNode) -> Option<Local> {
    let name = statement.identifier()?;
    let mut parts = statement.child_nodes();
    let (syntax, collection) = (parts.next()?, parts.next()?);
    Some(Local {
        name: super::name_text(name.text()).to_string(),
        offset: name.span().start,
        ty: LocalType::Element { syntax, collection },
    })
}

/// Type of a numeric literal from its form and suffix.
fn numeric_literal_type(text: &str) -> SpecialType {
    let lower = text.to_ascii_lowercase();
    let hex = lower.starts_with("0x") || lower.starts_with("0b");
    if lower.ends_with("ul") || lower.ends_with("lu") {
        SpecialType::UInt64
    } else if lower.ends_with('l') {
        SpecialType::Int64
    } else if lower.ends_with('u') {
        SpecialType::UInt32
    } else if lower.ends_with('m') {
        SpecialType::Decimal
    } else if !hex && lower.ends_with('f') {
        SpecialType::Single
    } else if !hex && (lower.ends_with('d') || lower.contains('.') || lower.contains('e')) {
        SpecialType::Double
    } else {
        SpecialType::Int32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_literal_types() {
        assert_eq!(numeric_literal_type("42"), SpecialType::Int32);
        assert_eq!(numeric_literal_type("42L"), SpecialType::Int64);
        assert_eq!(numeric_literal_type("42UL"), SpecialType::UInt64);
        assert_eq!(numeric_literal_type("1.5"), SpecialType::Double);
        assert_eq!(numeric_literal_type("1.5m"), SpecialType::Decimal);
        assert_eq!(numeric_literal_type("2f"), SpecialType::Single);
        assert_eq!(numeric_literal_type("0xFF"), SpecialType::Int32);
        assert_eq!(numeric_literal_type("1e3"), SpecialType::Double);
    }
}
