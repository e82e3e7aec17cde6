//! Type declarations gathered from every tree, name lookup and type-syntax
//! resolution.

use super::{
    dotted_name, identifier_name, is_value_like, join, name_text, FileScopes, Imports, Scope,
    TypeContext,
};
use dataverse_lint_core::semantic::{SpecialType, TypeKind, TypeSymbol};
use dataverse_lint_core::syntax::{SyntaxKind, SyntaxNode, SyntaxTree};
use std::collections::HashMap;
use std::sync::Arc;

/// Built-in types that get a special symbol when the prelude declares them.
const SPECIAL_TYPES: &[SpecialType] = &[
    SpecialType::Object,
    SpecialType::Void,
    SpecialType::String,
    SpecialType::Boolean,
    SpecialType::Char,
    SpecialType::SByte,
    SpecialType::Byte,
    SpecialType::Int16,
    SpecialType::UInt16,
    SpecialType::Int32,
    SpecialType::UInt32,
    SpecialType::Int64,
    SpecialType::UInt64,
    SpecialType::Single,
    SpecialType::Double,
    SpecialType::Decimal,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MemberKind {
    Field,
    Property,
    Event,
    Method,
    Constructor,
    Indexer,
    EnumMember,
}

#[derive(Debug)]
pub(super) struct ParameterDecl {
    pub(super) name: String,
    pub(super) ty: Option<SyntaxNode>,
    pub(super) is_params: bool,
    pub(super) is_optional: bool,
    pub(super) is_this: bool,
}

#[derive(Debug)]
pub(super) struct Member {
    pub(super) name: String,
    pub(super) kind: MemberKind,
    /// Declared type syntax; `None` for constructors and enum members.
    pub(super) ty: Option<SyntaxNode>,
    pub(super) parameters: Vec<ParameterDecl>,
    pub(super) type_parameters: Vec<String>,
    /// Scope the member's own syntax resolves in.
    pub(super) scope: Arc<Scope>,
}

#[derive(Debug)]
struct BaseDecl {
    syntax: SyntaxNode,
    scope: Arc<Scope>,
    /// First entry of its base list, the only slot a base class may take.
    first: bool,
}

#[derive(Debug)]
pub(super) struct TypeDecl {
    pub(super) name: String,
    /// Containing namespace, or the outer type's full name for nested types.
    pub(super) namespace: String,
    pub(super) kind: TypeKind,
    pub(super) type_parameters: Vec<String>,
    bases: Vec<BaseDecl>,
    pub(super) members: Vec<Member>,
}

#[derive(Debug, Default)]
pub(super) struct Declarations {
    pub(super) types: Vec<TypeDecl>,
    by_name: HashMap<String, Vec<usize>>,
    by_simple: HashMap<String, Vec<usize>>,
    /// `(type, member)` pairs of methods whose first parameter is `this`.
    pub(super) extensions: Vec<(usize, usize)>,
}

impl Declarations {
    /// Imports from `global using` directives, which apply to every file.
    pub(super) fn global_imports(trees: &[SyntaxTree]) -> Arc<Imports> {
        let mut imports = Imports::default();
        for tree in trees {
            for using in tree.root().children_of_kind(SyntaxKind::UsingDirective) {
                if using.has_token("global") {
                    imports.add(&using);
                }
            }
        }
        Arc::new(imports)
    }

    /// Collects the declarations of one tree and returns its scopes.
    pub(super) fn collect(&mut self, root: &SyntaxNode, global: &Arc<Imports>) -> FileScopes {
        let mut file = FileScopes::default();
        let scope = Scope {
            imports: Imports::extended(global, root),
            ..Scope::default()
        };
        self.collect_container(root, scope, &mut file);
        file
    }

    fn collect_container(&mut self, container: &SyntaxNode, scope: Scope, file: &mut FileScopes) {
        let scope = Arc::new(scope);
        file.namespaces.push((container.span(), Arc::clone(&scope)));
        for child in container.child_nodes() {
            match child.kind() {
                SyntaxKind::NamespaceDeclaration | SyntaxKind::FileScopedNamespaceDeclaration => {
                    let Some(name) = child
                        .find_child(SyntaxKind::is_type)
                        .and_then(|name| dotted_name(&name))
                    else {
                        continue;
                    };
                    let inner = Scope {
                        namespace: join(&scope.namespace, &name),
                        imports: Imports::extended(&scope.imports, &child),
                        ..Scope::default()
                    };
                    self.collect_container(&child, inner, file);
                }
                kind if kind.is_type_declaration() => {
                    self.collect_type(&child, &scope.namespace, &scope, file);
                }
                _ => {}
            }
        }
    }

    fn collect_type(
        &mut self,
        node: &SyntaxNode,
        namespace: &str,
        outer: &Scope,
        file: &mut FileScopes,
    ) {
        let Some(name) = identifier_name(node) else {
            return;
        };
        let kind = match node.kind() {
            SyntaxKind::StructDeclaration => TypeKind::Struct,
            SyntaxKind::InterfaceDeclaration => TypeKind::Interface,
            SyntaxKind::EnumDeclaration => TypeKind::Enum,
            SyntaxKind::RecordDeclaration | SyntaxKind::RecordStructDeclaration => TypeKind::Record,
            _ => TypeKind::Class,
        };
        let type_parameters = type_parameter_names(node);
        let full = join(namespace, &name);
        let index = match self.find_exact(&full, type_parameters.len()) {
            // Partial declarations share one entry.
            Some(existing) => existing,
            None => {
                self.types.push(TypeDecl {
                    name: name.clone(),
                    namespace: namespace.to_string(),
                    kind,
                    type_parameters,
                    bases: Vec::new(),
                    members: Vec::new(),
                });
                let index = self.types.len() - 1;
                self.by_name.entry(full.clone()).or_default().push(index);
                self.by_simple.entry(name).or_default().push(index);
                index
            }
        };

        let mut types = outer.types.clone();
        types.push(index);
        let scope = Arc::new(Scope {
            namespace: outer.namespace.clone(),
            imports: Arc::clone(&outer.imports),
            types,
            type_parameters: Vec::new(),
        });
        file.types.push(TypeContext {
            span: node.span(),
            decl: index,
            scope: Arc::clone(&scope),
        });

        if let Some(list) = node.child_of_kind(SyntaxKind::BaseList) {
            for (position, base) in list
                .children_of_kind(SyntaxKind::SimpleBaseType)
                .iter()
                .enumerate()
            {
                if let Some(syntax) = base.find_child(SyntaxKind::is_type) {
                    self.types[index].bases.push(BaseDecl {
                        syntax,
                        scope: Arc::clone(&scope),
                        first: position == 0,
                    });
                }
            }
        }

        // Primary constructor; record parameters double as properties.
        if let Some(list) = node.child_of_kind(SyntaxKind::ParameterList) {
            if kind == TypeKind::Record {
                for parameter in parameter_decls(&list) {
                    self.add_member(index, Member {
                        name: parameter.name,
                        kind: MemberKind::Property,
                        ty: parameter.ty,
                        parameters: Vec::new(),
                        type_parameters: Vec::new(),
                        scope: Arc::clone(&scope),
                    });
                }
            }
            self.add_member(index, Member {
                name: ".ctor".to_string(),
                kind: MemberKind::Constructor,
                ty: None,
                parameters: parameter_decls(&list),
                type_parameters: Vec::new(),
                scope: Arc::clone(&scope),
            });
        }

        for child in node.child_nodes() {
            if child.kind().is_type_declaration() {
                self.collect_type(&child, &full, &scope, file);
            } else {
                self.collect_member(index, &child, &scope);
            }
        }
    }

    fn collect_member(&mut self, owner: usize, node: &SyntaxNode, scope: &Arc<Scope>) {
        let simple = |name: String, kind: MemberKind, ty: Option<SyntaxNode>| Member {
            name,
            kind,
            ty,
            parameters: Vec::new(),
            type_parameters: Vec::new(),
            scope: Arc::clone(scope),
        };
        match node.kind() {
            SyntaxKind::FieldDeclaration | SyntaxKind::EventDeclaration => {
                let kind = if node.kind() == SyntaxKind::FieldDeclaration {
                    MemberKind::Field
                } else {
                    MemberKind::Event
                };
                if let Some(declaration) = node.child_of_kind(SyntaxKind::VariableDeclaration) {
                    let ty = declaration.find_child(SyntaxKind::is_type);
                    for declarator in declaration.children_of_kind(SyntaxKind::VariableDeclarator) {
                        if let Some(name) = identifier_name(&declarator) {
                            self.add_member(owner, simple(name, kind, ty.clone()));
                        }
                    }
                } else if let Some(name) = identifier_name(node) {
                    let ty = node.find_child(SyntaxKind::is_type);
                    self.add_member(owner, simple(name, kind, ty));
                }
            }
            SyntaxKind::PropertyDeclaration => {
                if let Some(name) = identifier_name(node) {
                    let ty = node.find_child(SyntaxKind::is_type);
                    self.add_member(owner, simple(name, MemberKind::Property, ty));
                }
            }
            SyntaxKind::IndexerDeclaration => {
                let mut member = simple(
                    "this".to_string(),
                    MemberKind::Indexer,
                    node.find_child(SyntaxKind::is_type),
                );
                if let Some(list) = node.child_of_kind(SyntaxKind::BracketedParameterList) {
                    member.parameters = parameter_decls(&list);
                }
                self.add_member(owner, member);
            }
            SyntaxKind::MethodDeclaration | SyntaxKind::ConstructorDeclaration => {
                let method = node.kind() == SyntaxKind::MethodDeclaration;
                let Some(name) = identifier_name(node) else {
                    return;
                };
                let type_parameters = type_parameter_names(node);
                let scope = if type_parameters.is_empty() {
                    Arc::clone(scope)
                } else {
                    Arc::new(Scope {
                        type_parameters: type_parameters.clone(),
                        ..Scope::clone(scope)
                    })
                };
                let parameters = node
                    .child_of_kind(SyntaxKind::ParameterList)
                    .map(|list| parameter_decls(&list))
                    .unwrap_or_default();
                let extension = method && parameters.first().is_some_and(|p| p.is_this);
                let member = Member {
                    name: if method { name } else { ".ctor".to_string() },
                    kind: if method {
                        MemberKind::Method
                    } else {
                        MemberKind::Constructor
                    },
                    ty: if method {
                        node.find_child(SyntaxKind::is_type)
                    } else {
                        None
                    },
                    parameters,
                    type_parameters,
                    scope,
                };
                let index = self.add_member(owner, member);
                if extension {
                    self.extensions.push((owner, index));
                }
            }
            SyntaxKind::EnumMemberDeclaration => {
                if let Some(name) = identifier_name(node) {
                    self.add_member(owner, simple(name, MemberKind::EnumMember, None));
                }
            }
            _ => {}
        }
    }

    fn add_member(&mut self, owner: usize, member: Member) -> usize {
        let members = &mut self.types[owner].members;
        members.push(member);
        members.len() - 1
    }

    fn find_exact(&self, full: &str, arity: usize) -> Option<usize> {
        self.by_name
            .get(full)?
            .iter()
            .copied()
            .find(|&i| self.types[i].type_parameters.len() == arity)
    }

    /// Declaration named `full`, preferring one with `arity` type parameters.
    pub(super) fn find_qualified(&self, full: &str, arity: usize) -> Option<usize> {
        let candidates = self.by_name.get(full)?;
        candidates
            .iter()
            .copied()
            .find(|&i| self.types[i].type_parameters.len() == arity)
            .or_else(|| candidates.first().copied())
    }

    fn full_name(&self, index: usize) -> String {
        let decl = &self.types[index];
        join(&decl.namespace, &decl.name)
    }

    /// Looks up a simple type name: nested types of the enclosing types,
    /// the namespace chain, aliases, imported namespaces, then any
    /// declaration with that name.
    fn lookup(&self, name: &str, arity: usize, scope: &Scope) -> Option<usize> {
        for &outer in scope.types.iter().rev() {
            if let Some(found) = self.find_qualified(&join(&self.full_name(outer), name), arity) {
                return Some(found);
            }
        }
        let mut namespace = scope.namespace.as_str();
        loop {
            if let Some(found) = self.find_qualified(&join(namespace, name), arity) {
                return Some(found);
            }
            if namespace.is_empty() {
                break;
            }
            namespace = parent_namespace(namespace);
        }
        if let Some((_, target)) = scope.imports.aliases.iter().find(|(alias, _)| alias == name) {
            if let Some(found) = self.find_qualified(target, arity) {
                return Some(found);
            }
        }
        for import in &scope.imports.namespaces {
            if let Some(found) = self.find_qualified(&join(import, name), arity) {
                return Some(found);
            }
        }
        let candidates = self.by_simple.get(name)?;
        candidates
            .iter()
            .copied()
            .find(|&i| self.types[i].type_parameters.len() == arity)
            .or_else(|| candidates.first().copied())
    }

    /// Looks up `A.B.C`: as written, relative to the enclosing namespaces
    /// and imports, then with the first segment as an alias or type.
    pub(super) fn lookup_dotted(&self, dotted: &str, arity: usize, scope: &Scope) -> Option<usize> {
        if let Some(found) = self.find_qualified(dotted, arity) {
            return Some(found);
        }
        let mut namespace = scope.namespace.as_str();
        while !namespace.is_empty() {
            if let Some(found) = self.find_qualified(&join(namespace, dotted), arity) {
                return Some(found);
            }
            namespace = parent_namespace(namespace);
        }
        for import in &scope.imports.namespaces {
            if let Some(found) = self.find_qualified(&join(import, dotted), arity) {
                return Some(found);
            }
        }
        let (head, rest) = dotted.split_once('.')?;
        if let Some((_, target)) = scope.imports.aliases.iter().find(|(alias, _)| alias == head) {
            if let Some(found) = self.find_qualified(&join(target, rest), arity) {
                return Some(found);
            }
        }
        let outer = self.lookup(head, 0, scope)?;
        self.find_qualified(&join(&self.full_name(outer), rest), arity)
    }

    /// Resolves type syntax. `symbol` supplies the declared symbol for a
    /// declaration index, so the same code serves symbol building and
    /// later queries.
    pub(super) fn resolve_type(
        &self,
        syntax: &SyntaxNode,
        scope: &Scope,
        symbol: &mut dyn FnMut(usize) -> Arc<TypeSymbol>,
    ) -> Arc<TypeSymbol> {
        match syntax.kind() {
            SyntaxKind::PredefinedType => syntax
                .first_token()
                .and_then(|token| SpecialType::from_keyword(token.text()))
                .map_or_else(
                    || error_symbol(&syntax.text()),
                    |special| Arc::new(TypeSymbol::special(special)),
                ),
            SyntaxKind::NullableType => {
                let Some(inner) = syntax.child_nodes().next() else {
                    return error_symbol(&syntax.text());
                };
                let inner = self.resolve_type(&inner, scope, symbol);
                if is_value_like(&inner) {
                    Arc::new(TypeSymbol::nullable_of(inner))
                } else {
                    inner
                }
            }
            SyntaxKind::ArrayType => {
                let mut parts = syntax.child_nodes();
                let Some(element) = parts.next() else {
                    return error_symbol(&syntax.text());
                };
                let mut ty = self.resolve_type(&element, scope, symbol);
                for _ in parts.filter(|p| p.kind() == SyntaxKind::ArrayRankSpecifier) {
                    ty = Arc::new(TypeSymbol::array_of(ty));
                }
                ty
            }
            SyntaxKind::TupleType => {
                let elements = syntax
                    .child_nodes()
                    .map(|element| self.resolve_type(&element, scope, symbol))
                    .collect();
                Arc::new(
                    TypeSymbol::new("ValueTuple", TypeKind::Struct)
                        .in_namespace("System")
                        .with_type_arguments(elements),
                )
            }
            SyntaxKind::IdentifierName | SyntaxKind::GenericName => {
                let Some(name) = identifier_name(syntax) else {
                    return error_symbol(&syntax.text());
                };
                let arguments = self.type_arguments(syntax, scope, symbol);
                self.resolve_name(&name, arguments, scope, symbol)
            }
            SyntaxKind::QualifiedName => {
                let Some(dotted) = dotted_name(syntax) else {
                    return error_symbol(&syntax.text());
                };
                let arguments = syntax
                    .child_nodes()
                    .last()
                    .map(|last| self.type_arguments(&last, scope, symbol))
                    .unwrap_or_default();
                match self.lookup_dotted(&dotted, arguments.len(), scope) {
                    Some(index) => instantiate(symbol(index), arguments),
                    None => {
                        let last = dotted.rsplit('.').next().unwrap_or(&dotted);
                        Arc::new(TypeSymbol::new(last, TypeKind::Error).with_type_arguments(arguments))
                    }
                }
            }
            _ => error_symbol(&syntax.text()),
        }
    }

    /// Resolves a simple name with its type arguments.
    pub(super) fn resolve_name(
        &self,
        name: &str,
        arguments: Vec<Arc<TypeSymbol>>,
        scope: &Scope,
        symbol: &mut dyn FnMut(usize) -> Arc<TypeSymbol>,
    ) -> Arc<TypeSymbol> {
        if arguments.is_empty() {
            if self.is_type_parameter(name, scope) {
                return Arc::new(TypeSymbol::new(name, TypeKind::TypeParameter));
            }
            if name == "dynamic" {
                return Arc::new(TypeSymbol::special(SpecialType::Object));
            }
        }
        match self.lookup(name, arguments.len(), scope) {
            Some(index) => instantiate(symbol(index), arguments),
            None => Arc::new(TypeSymbol::new(name, TypeKind::Error).with_type_arguments(arguments)),
        }
    }

    fn type_arguments(
        &self,
        name: &SyntaxNode,
        scope: &Scope,
        symbol: &mut dyn FnMut(usize) -> Arc<TypeSymbol>,
    ) -> Vec<Arc<TypeSymbol>> {
        let Some(list) = name.child_of_kind(SyntaxKind::TypeArgumentList) else {
            return Vec::new();
        };
        list.child_nodes()
            .map(|argument| self.resolve_type(&argument, scope, symbol))
            .collect()
    }

    fn is_type_parameter(&self, name: &str, scope: &Scope) -> bool {
        scope.type_parameters.iter().any(|p| p == name)
            || scope
                .types
                .iter()
                .any(|&t| self.types[t].type_parameters.iter().any(|p| p == name))
    }

    /// Builds the declared symbol of every declaration, bases first.
    pub(super) fn build_symbols(&self) -> Vec<Arc<TypeSymbol>> {
        let mut builder = SymbolBuilder {
            declarations: self,
            memo: vec![None; self.types.len()],
            in_progress: vec![false; self.types.len()],
        };
        (0..self.types.len()).map(|index| builder.symbol(index)).collect()
    }

    /// Symbol for a declaration without base or interfaces.
    fn shell(&self, index: usize) -> TypeSymbol {
        let decl = &self.types[index];
        if decl.namespace == "System" && decl.type_parameters.is_empty() {
            if let Some(special) = SPECIAL_TYPES
                .iter()
                .copied()
                .find(|s| s.metadata_name() == Some(decl.name.as_str()))
            {
                return TypeSymbol::special(special);
            }
        }
        let parameters = decl
            .type_parameters
            .iter()
            .map(|p| Arc::new(TypeSymbol::new(p.as_str(), TypeKind::TypeParameter)))
            .collect();
        TypeSymbol::new(decl.name.as_str(), decl.kind)
            .in_namespace(decl.namespace.as_str())
            .with_type_arguments(parameters)
    }
}

/// Memoized symbol construction; a declaration reached again while its
/// own bases are being resolved gets a symbol without bases.
struct SymbolBuilder<'a> {
    declarations: &'a Declarations,
    memo: Vec<Option<Arc<TypeSymbol>>>,
    in_progress: Vec<bool>,
}

impl SymbolBuilder<'_> {
    fn symbol(&mut self, index: usize) -> Arc<TypeSymbol> {
        if let Some(done) = &self.memo[index] {
            return Arc::clone(done);
        }
        let declarations = self.declarations;
        let shell = declarations.shell(index);
        if self.in_progress[index] {
            return Arc::new(shell);
        }
        self.in_progress[index] = true;

        let decl = &declarations.types[index];
        let class_like = matches!(decl.kind, TypeKind::Class | TypeKind::Record);
        let mut base = None;
        let mut interfaces = Vec::new();
        if decl.kind != TypeKind::Enum {
            for entry in &decl.bases {
                let ty = declarations.resolve_type(&entry.syntax, &entry.scope, &mut |i| self.symbol(i));
                if class_like && entry.first && base.is_none() && is_base_class(&ty) {
                    base = Some(ty);
                } else {
                    interfaces.push(ty);
                }
            }
        }
        let is_object = shell.special_type() == SpecialType::Object;
        let mut symbol = shell.with_interfaces(interfaces);
        match base {
            Some(base) => symbol = symbol.with_base(base),
            None if class_like && !is_object => {
                symbol = symbol.with_base(Arc::new(TypeSymbol::special(SpecialType::Object)));
            }
            None => {}
        }

        let symbol = Arc::new(symbol);
        self.memo[index] = Some(Arc::clone(&symbol));
        self.in_progress[index] = false;
        symbol
    }
}

/// Parameters of a parameter list.
pub(super) fn parameter_decls(list: &SyntaxNode) -> Vec<ParameterDecl> {
    list.children_of_kind(SyntaxKind::Parameter)
        .iter()
        .filter_map(|parameter| {
            Some(ParameterDecl {
                name: identifier_name(parameter)?,
                ty: parameter.find_child(SyntaxKind::is_type),
                is_params: parameter.has_token("params"),
                is_optional: parameter.child_of_kind(SyntaxKind::EqualsValueClause).is_some(),
                is_this: parameter.has_token("this"),
            })
        })
        .collect()
}

/// True when a call with `count` arguments can bind to `parameters`.
pub(super) fn accepts(parameters: &[ParameterDecl], count: usize) -> bool {
    let required = parameters
        .iter()
        .filter(|p| !p.is_optional && !p.is_params)
        .count();
    let variadic = parameters.iter().any(|p| p.is_params);
    count >= required && (variadic || count <= parameters.len())
}

pub(super) fn type_parameter_names(node: &SyntaxNode) -> Vec<String> {
    node.child_of_kind(SyntaxKind::TypeParameterList)
        .map(|list| {
            list.children_of_kind(SyntaxKind::TypeParameter)
                .iter()
                .filter_map(identifier_name)
                .collect()
        })
        .unwrap_or_default()
}

fn instantiate(declared: Arc<TypeSymbol>, arguments: Vec<Arc<TypeSymbol>>) -> Arc<TypeSymbol> {
    if arguments.is_empty() {
        return declared;
    }
    Arc::new(TypeSymbol::clone(&declared).with_type_arguments(arguments))
}

fn error_symbol(text: &str) -> Arc<TypeSymbol> {
    Arc::new(TypeSymbol::new(name_text(text.trim()), TypeKind::Error))
}

fn parent_namespace(namespace: &str) -> &str {
    namespace.rsplit_once('.').map_or("", |(parent, _)| parent)
}

/// A base-list entry that can be the base class. Unknown names that read
/// like interfaces (`IFoo`) are treated as interfaces.
fn is_base_class(ty: &TypeSymbol) -> bool {
    match ty.kind() {
        TypeKind::Class | TypeKind::Record => true,
        TypeKind::Error => {
            let mut chars = ty.name().chars();
            !(chars.next() == Some('I') && chars.next().is_some_and(char::is_uppercase))
        }
        _ => false,
    }
}
