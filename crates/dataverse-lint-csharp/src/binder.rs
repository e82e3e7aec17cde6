//! Name binding across every tree of a run.
//!
//! [`Compilation`] gathers the type declarations of all files plus a small
//! prelude of framework stubs (`System`, `Microsoft.Xrm.Sdk`), builds one
//! [`TypeSymbol`] per declaration and hands out a [`FileModel`] per tree.
//! Binding is best effort: anything that does not resolve comes back as
//! `None`, or as an error-kind symbol that still carries the written name.

mod declarations;
mod model;
mod prelude;

pub use model::FileModel;

use crate::parser;
use declarations::{accepts, Declarations, Member, MemberKind};
use dataverse_lint_core::semantic::{
    MethodSymbol, ParameterSymbol, SemanticModel, SpecialType, TypeKind, TypeSymbol,
};
use dataverse_lint_core::syntax::{SyntaxKind, SyntaxNode, SyntaxTree, TextRange};
use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;

/// Type parameter names mapped to the arguments that replace them.
type Substitution = Vec<(String, Arc<TypeSymbol>)>;

/// Hierarchy walks stop after this many types.
const MAX_HIERARCHY: usize = 64;

/// Namespaces and aliases imported at some point of a file.
#[derive(Debug, Default)]
struct Imports {
    namespaces: Vec<String>,
    aliases: Vec<(String, String)>,
}

impl Imports {
    /// `base` plus the non-global using directives directly under `container`.
    fn extended(base: &Arc<Imports>, container: &SyntaxNode) -> Arc<Imports> {
        let usings: Vec<SyntaxNode> = container
            .children_of_kind(SyntaxKind::UsingDirective)
            .into_iter()
            .filter(|using| !using.has_token("global"))
            .collect();
        if usings.is_empty() {
            return Arc::clone(base);
        }
        let mut imports = Imports {
            namespaces: base.namespaces.clone(),
            aliases: base.aliases.clone(),
        };
        for using in &usings {
            imports.add(using);
        }
        Arc::new(imports)
    }

    fn add(&mut self, using: &SyntaxNode) {
        if using.has_token("static") {
            return;
        }
        let Some(target) = using
            .find_child(SyntaxKind::is_type)
            .and_then(|name| dotted_name(&name))
        else {
            return;
        };
        if using.has_token("=") {
            if let Some(alias) = using.identifier() {
                self.aliases.push((name_text(alias.text()).to_string(), target));
            }
            return;
        }
        self.namespaces.push(target);
    }
}

/// Where a piece of syntax sits, for name lookup.
#[derive(Debug, Clone, Default)]
struct Scope {
    namespace: String,
    imports: Arc<Imports>,
    /// Enclosing type declarations, outermost first.
    types: Vec<usize>,
    /// Method-level type parameters.
    type_parameters: Vec<String>,
}

/// Span of a type declaration in a user file.
#[derive(Debug)]
struct TypeContext {
    span: TextRange,
    decl: usize,
    scope: Arc<Scope>,
}

/// Scopes recorded for one user file while collecting declarations.
#[derive(Debug, Default)]
struct FileScopes {
    namespaces: Vec<(TextRange, Arc<Scope>)>,
    types: Vec<TypeContext>,
}

impl FileScopes {
    /// Scope of the innermost type, or failing that namespace, around `offset`.
    fn scope_at(&self, offset: usize) -> Arc<Scope> {
        if let Some(context) = self.type_at(offset) {
            return Arc::clone(&context.scope);
        }
        self.namespaces
            .iter()
            .filter(|(span, _)| contains(*span, offset))
            .min_by_key(|(span, _)| span.len())
            .map_or_else(|| Arc::new(Scope::default()), |(_, scope)| Arc::clone(scope))
    }

    fn type_at(&self, offset: usize) -> Option<&TypeContext> {
        self.types
            .iter()
            .filter(|context| contains(context.span, offset))
            .min_by_key(|context| context.span.len())
    }
}

/// Every declaration of a run, with a symbol built for each.
#[derive(Debug)]
pub struct Compilation {
    declarations: Declarations,
    symbols: Vec<Arc<TypeSymbol>>,
    files: Vec<FileScopes>,
}

impl Compilation {
    /// Collects declarations from `trees` and the prelude and builds symbols.
    #[must_use]
    pub fn new(trees: &[SyntaxTree]) -> Self {
        let mut declarations = Declarations::default();
        let global = Declarations::global_imports(trees);
        let files = trees
            .iter()
            .map(|tree| declarations.collect(&tree.root(), &global))
            .collect();
        let prelude = parser::parse(Path::new("prelude.cs"), prelude::SOURCE);
        declarations.collect(&prelude.root(), &Arc::new(Imports::default()));
        let symbols = declarations.build_symbols();
        tracing::debug!(
            files = trees.len(),
            types = symbols.len(),
            "Bound compilation"
        );
        Self {
            declarations,
            symbols,
            files,
        }
    }

    fn symbol(&self, index: usize) -> Arc<TypeSymbol> {
        Arc::clone(&self.symbols[index])
    }

    /// Resolves type syntax; unknown names become error-kind symbols.
    fn resolve_type(&self, syntax: &SyntaxNode, scope: &Scope) -> Arc<TypeSymbol> {
        let symbols = &self.symbols;
        self.declarations
            .resolve_type(syntax, scope, &mut |index| Arc::clone(&symbols[index]))
    }

    fn resolve_name(
        &self,
        name: &str,
        arguments: Vec<Arc<TypeSymbol>>,
        scope: &Scope,
    ) -> Arc<TypeSymbol> {
        let symbols = &self.symbols;
        self.declarations
            .resolve_name(name, arguments, scope, &mut |index| Arc::clone(&symbols[index]))
    }

    /// A dotted reference such as `System.Guid`, when it names a declaration.
    fn resolve_dotted(&self, dotted: &str, scope: &Scope) -> Option<Arc<TypeSymbol>> {
        self.declarations
            .lookup_dotted(dotted, 0, scope)
            .map(|index| self.symbol(index))
    }

    fn type_arguments(&self, name: &SyntaxNode, scope: &Scope) -> Vec<Arc<TypeSymbol>> {
        name.child_of_kind(SyntaxKind::TypeArgumentList)
            .map(|list| {
                list.child_nodes()
                    .map(|argument| self.resolve_type(&argument, scope))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn declaration_of(&self, ty: &TypeSymbol) -> Option<usize> {
        match ty.kind() {
            TypeKind::TypeParameter | TypeKind::Error => None,
            TypeKind::Array => self.declarations.find_qualified("System.Array", 0),
            _ => self.declarations.find_qualified(
                &join(ty.namespace().unwrap_or(""), ty.name()),
                ty.type_arguments().len(),
            ),
        }
    }

    /// `ty`, its base chain, then every reachable interface, each paired
    /// with its declaration and the substitution for its type parameters.
    fn hierarchy(&self, ty: &Arc<TypeSymbol>) -> Vec<(usize, Substitution, Arc<TypeSymbol>)> {
        let mut visited = Vec::new();
        let mut seen = HashSet::new();
        let mut pending = VecDeque::from([Arc::clone(ty)]);
        while let Some(current) = pending.pop_front() {
            if visited.len() >= MAX_HIERARCHY || !seen.insert(current.full_name()) {
                continue;
            }
            let Some(decl) = self.declaration_of(&current) else {
                continue;
            };
            let map: Substitution = self.declarations.types[decl]
                .type_parameters
                .iter()
                .cloned()
                .zip(current.type_arguments().iter().cloned())
                .collect();
            let declared = &self.symbols[decl];
            if let Some(base) = declared.base_type() {
                pending.push_back(substitute(base, &map));
            }
            pending.extend(declared.interfaces().iter().map(|i| substitute(i, &map)));
            visited.push((decl, map, current));
        }
        visited
    }

    /// Type of the field, property, event or enum member `name` on `ty`.
    fn member_type(&self, ty: &Arc<TypeSymbol>, name: &str) -> Option<Arc<TypeSymbol>> {
        for (decl, map, _) in self.hierarchy(ty) {
            let Some(member) = self.declarations.types[decl].members.iter().find(|m| {
                m.name == name
                    && matches!(
                        m.kind,
                        MemberKind::Field
                            | MemberKind::Property
                            | MemberKind::Event
                            | MemberKind::EnumMember
                    )
            }) else {
                continue;
            };
            if member.kind == MemberKind::EnumMember {
                return Some(self.symbol(decl));
            }
            let syntax = member.ty.as_ref()?;
            return Some(substitute(&self.resolve_type(syntax, &member.scope), &map));
        }
        None
    }

    /// Element type of `ty[...]`.
    fn indexer_type(&self, ty: &Arc<TypeSymbol>) -> Option<Arc<TypeSymbol>> {
        if ty.kind() == TypeKind::Array {
            return ty.type_arguments().first().cloned();
        }
        self.hierarchy(ty).into_iter().find_map(|(decl, map, _)| {
            let member = self.declarations.types[decl]
                .members
                .iter()
                .find(|m| m.kind == MemberKind::Indexer)?;
            let syntax = member.ty.as_ref()?;
            Some(substitute(&self.resolve_type(syntax, &member.scope), &map))
        })
    }

    /// Element type when `ty` is enumerated by `foreach`.
    fn element_type(&self, ty: &Arc<TypeSymbol>) -> Option<Arc<TypeSymbol>> {
        if ty.kind() == TypeKind::Array {
            return ty.type_arguments().first().cloned();
        }
        self.hierarchy(ty)
            .into_iter()
            .find_map(|(_, _, t)| {
                (t.is_named("System.Collections.Generic", "IEnumerable")
                    && t.type_arguments().len() == 1)
                    .then(|| Arc::clone(&t.type_arguments()[0]))
            })
            .or_else(|| match ty.type_arguments() {
                [single] => Some(Arc::clone(single)),
                _ => None,
            })
    }

    /// First method named `name` on `ty` or its hierarchy that accepts
    /// `arguments` arguments.
    fn find_method(
        &self,
        ty: &Arc<TypeSymbol>,
        name: &str,
        arguments: usize,
        type_arguments: &[Arc<TypeSymbol>],
    ) -> Option<MethodSymbol> {
        self.hierarchy(ty).into_iter().find_map(|(decl, map, owner)| {
            let member = self.declarations.types[decl].members.iter().find(|m| {
                m.kind == MemberKind::Method
                    && m.name == name
                    && accepts(&m.parameters, arguments)
                    && (type_arguments.is_empty()
                        || m.type_parameters.len() == type_arguments.len())
            })?;
            Some(self.method_symbol(owner, member, map, type_arguments, false))
        })
    }

    /// Extension method named `name` callable with `arguments` arguments.
    fn find_extension(
        &self,
        name: &str,
        arguments: usize,
        type_arguments: &[Arc<TypeSymbol>],
    ) -> Option<MethodSymbol> {
        self.declarations
            .extensions
            .iter()
            .find_map(|&(decl, index)| {
                let member = &self.declarations.types[decl].members[index];
                (member.name == name && accepts(&member.parameters, arguments + 1))
                    .then(|| {
                        self.method_symbol(
                            self.symbol(decl),
                            member,
                            Vec::new(),
                            type_arguments,
                            true,
                        )
                    })
            })
    }

    fn method_symbol(
        &self,
        owner: Arc<TypeSymbol>,
        member: &Member,
        mut map: Substitution,
        type_arguments: &[Arc<TypeSymbol>],
        reduced: bool,
    ) -> MethodSymbol {
        map.extend(
            member
                .type_parameters
                .iter()
                .cloned()
                .zip(type_arguments.iter().cloned()),
        );
        let resolve =
            |syntax: &SyntaxNode| substitute(&self.resolve_type(syntax, &member.scope), &map);
        MethodSymbol {
            name: member.name.clone(),
            containing_type: Some(owner),
            parameters: member
                .parameters
                .iter()
                .skip(usize::from(reduced))
                .map(|p| ParameterSymbol {
                    name: p.name.clone(),
                    ty: p.ty.as_ref().map(&resolve),
                    is_params: p.is_params,
                    is_optional: p.is_optional,
                })
                .collect(),
            return_type: member.ty.as_ref().map(&resolve),
        }
    }
}

/// Binds `trees` together and returns one model per tree, in order.
#[must_use]
pub fn bind(trees: &[SyntaxTree]) -> Vec<Box<dyn SemanticModel>> {
    let compilation = Arc::new(Compilation::new(trees));
    trees
        .iter()
        .enumerate()
        .map(|(index, tree)| {
            Box::new(FileModel::new(Arc::clone(&compilation), index, tree))
                as Box<dyn SemanticModel>
        })
        .collect()
}

/// Replaces type parameters in `ty` according to `map`.
fn substitute(ty: &Arc<TypeSymbol>, map: &Substitution) -> Arc<TypeSymbol> {
    if map.is_empty() {
        return Arc::clone(ty);
    }
    if ty.kind() == TypeKind::TypeParameter {
        if let Some((_, replacement)) = map.iter().find(|(name, _)| name == ty.name()) {
            return Arc::clone(replacement);
        }
    }
    if ty.type_arguments().is_empty() {
        return Arc::clone(ty);
    }
    let arguments = ty
        .type_arguments()
        .iter()
        .map(|argument| substitute(argument, map))
        .collect();
    Arc::new(TypeSymbol::clone(ty).with_type_arguments(arguments))
}

fn is_value_like(ty: &TypeSymbol) -> bool {
    matches!(ty.kind(), TypeKind::Struct | TypeKind::Enum) && !ty.is_nullable_wrapper()
}

fn special(special: SpecialType) -> Arc<TypeSymbol> {
    Arc::new(TypeSymbol::special(special))
}

fn contains(span: TextRange, offset: usize) -> bool {
    span.start <= offset && offset <= span.end
}

fn join(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    }
}

/// Identifier text without a verbatim `@`.
fn name_text(text: &str) -> &str {
    text.strip_prefix('@').unwrap_or(text)
}

/// Name of a declaration or simple name node.
fn identifier_name(node: &SyntaxNode) -> Option<String> {
    node.identifier().map(|t| name_text(t.text()).to_string())
}

/// Dotted form of a name or member-access chain, with `global::` dropped.
fn dotted_name(node: &SyntaxNode) -> Option<String> {
    match node.kind() {
        SyntaxKind::IdentifierName | SyntaxKind::GenericName => identifier_name(node),
        SyntaxKind::QualifiedName | SyntaxKind::SimpleMemberAccessExpression => {
            let mut parts = node.child_nodes();
            let left = parts.next()?;
            let right = dotted_name(&parts.next()?)?;
            if node.has_token("::") {
                return Some(right);
            }
            Some(format!("{}.{right}", dotted_name(&left)?))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataverse_lint_core::semantic::Resolver;

    fn trees(sources: &[&str]) -> Vec<SyntaxTree> {
        sources
            .iter()
            .enumerate()
            .map(|(i, source)| parser::parse(Path::new(&format!("File{i}.cs")), source))
            .collect()
    }

    fn nodes(tree: &SyntaxTree, kind: SyntaxKind) -> Vec<SyntaxNode> {
        tree.root().descendants().filter(|n| n.kind() == kind).collect()
    }

    fn assignment_target(tree: &SyntaxTree, index: usize) -> SyntaxNode {
        nodes(tree, SyntaxKind::SimpleAssignmentExpression)[index]
            .child_nodes()
            .next()
            .unwrap()
    }

    const ENTITIES: &str = r"using Microsoft.Xrm.Sdk;

namespace Contoso.Model
{
    public enum AccountState { Active, Inactive }

    public class Account : Entity
    {
        public AccountState? StateCode { get; set; }
        public string Name { get; set; }
    }
}
";

    #[test]
    fn test_enum_typed_field_assignment() {
        let trees = trees(&["enum Status { Open } class C { Status status; void M() { status = 2; } }"]);
        let models = bind(&trees);
        let ty = models[0].type_of(&assignment_target(&trees[0], 0)).unwrap();
        assert!(ty.is_enum());
        assert_eq!(ty.display_name(), "Status");
    }

    #[test]
    fn test_member_of_entity_subclass_across_files() {
        let trees = trees(&[
            ENTITIES,
            "using Contoso.Model;\nclass C { void M() { var account = new Account(); account.StateCode = 1; } }",
        ]);
        let models = bind(&trees);
        let ty = models[1].type_of(&assignment_target(&trees[1], 0)).unwrap();
        assert!(ty.is_nullable_wrapper());
        assert!(ty.type_arguments()[0].is_enum());
        assert_eq!(ty.display_name(), "AccountState?");
    }

    #[test]
    fn test_object_initializer_member() {
        let trees = trees(&[
            ENTITIES,
            "using Contoso.Model;\nclass C { object M() => new Account { StateCode = 0, Name = \"x\" }; }",
        ]);
        let models = bind(&trees);
        let state = models[1].type_of(&assignment_target(&trees[1], 0)).unwrap();
        assert_eq!(state.display_name(), "AccountState?");
        let name = models[1].type_of(&assignment_target(&trees[1], 1)).unwrap();
        assert_eq!(name.special_type(), SpecialType::String);
    }

    #[test]
    fn test_entity_contains_resolves_to_sdk_method() {
        let trees = trees(&[r#"using Microsoft.Xrm.Sdk;
class C {
    void M(IPluginExecutionContext context) {
        var target = (Entity)context.InputParameters["Target"];
        if (target.Contains("name")) { }
        if (target.Attributes.Contains("name")) { }
    }
}"#]);
        let models = bind(&trees);
        let calls = nodes(&trees[0], SyntaxKind::InvocationExpression);

        let method = models[0].method_of(&calls[0]).unwrap();
        assert!(method.has_single_parameter_of(SpecialType::String));
        let receiver = calls[0].child_nodes().next().unwrap().child_nodes().next().unwrap();
        let receiver_type = models[0].type_of(&receiver).unwrap();
        assert!(Resolver::base_chain_contains(
            &receiver_type,
            "Microsoft.Xrm.Sdk",
            "Entity"
        ));

        let receiver = calls[1].child_nodes().next().unwrap().child_nodes().next().unwrap();
        let receiver_type = models[0].type_of(&receiver).unwrap();
        assert_eq!(receiver_type.display_name(), "AttributeCollection");
        assert!(!Resolver::base_chain_contains(
            &receiver_type,
            "Microsoft.Xrm.Sdk",
            "Entity"
        ));
    }

    #[test]
    fn test_generic_method_return_type() {
        let trees = trees(&[r#"using Microsoft.Xrm.Sdk;
class C { void M(Entity e) { var value = e.GetAttributeValue<OptionSetValue>("statuscode"); } }"#]);
        let models = bind(&trees);
        let call = &nodes(&trees[0], SyntaxKind::InvocationExpression)[0];
        let method = models[0].method_of(call).unwrap();
        assert_eq!(method.return_type.unwrap().display_name(), "OptionSetValue");
    }

    #[test]
    fn test_plugin_base_chain_across_files() {
        let trees = trees(&[
            "using Microsoft.Xrm.Sdk;\npublic abstract class PluginBase : IPlugin { public abstract void Execute(IServiceProvider sp); }",
            "public sealed class AccountPlugin : PluginBase { }",
        ]);
        let models = bind(&trees);
        let class = &nodes(&trees[1], SyntaxKind::ClassDeclaration)[0];
        let ty = models[1].type_of(class).unwrap();
        assert!(Resolver::implements(&ty, "IPlugin"));
        assert!(Resolver::implements(&ty, "PluginBase"));
    }

    #[test]
    fn test_unknown_parameter_type_keeps_written_name() {
        let trees = trees(&["class C { C(IFooService a, IFooService b) { } }"]);
        let models = bind(&trees);
        let parameter = &nodes(&trees[0], SyntaxKind::Parameter)[0];
        let syntax = parameter.find_child(SyntaxKind::is_type).unwrap();
        let ty = models[0].type_of(&syntax).unwrap();
        assert_eq!(ty.kind(), TypeKind::Error);
        assert_eq!(ty.display_name(), "IFooService");
    }

    #[test]
    fn test_self_referential_var_is_unresolved() {
        let trees = trees(&["class C { void M() { var x = x.Next; x = 1; } }"]);
        let models = bind(&trees);
        assert!(models[0].type_of(&assignment_target(&trees[0], 0)).is_none());
    }

    #[test]
    fn test_foreach_over_generic_list() {
        let trees = trees(&[r"using System.Collections.Generic;
using Microsoft.Xrm.Sdk;
class C { void M(List<Entity> items) { foreach (var item in items) { item = null; } var first = items[0]; first = null; } }"]);
        let models = bind(&trees);
        let item = models[0].type_of(&assignment_target(&trees[0], 0)).unwrap();
        assert_eq!(item.display_name(), "Entity");
        let first = models[0].type_of(&assignment_target(&trees[0], 1)).unwrap();
        assert_eq!(first.display_name(), "Entity");
    }

    #[test]
    fn test_partial_declarations_merge() {
        let trees = trees(&[
            "namespace N { public partial class Job { public int Count; } }",
            "namespace N { public partial class Job { void M() { Count = 1; } } }",
        ]);
        let models = bind(&trees);
        let ty = models[1].type_of(&assignment_target(&trees[1], 0)).unwrap();
        assert_eq!(ty.special_type(), SpecialType::Int32);
    }
}
