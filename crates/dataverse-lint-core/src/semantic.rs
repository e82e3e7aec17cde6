//! Semantic queries over an externally supplied model.
//!
//! A front-end binds trees to symbols and exposes the result through
//! [`SemanticModel`]. Rules never talk to the model directly; they go through
//! [`Resolver`], which adds the base-chain and nullable helpers every rule
//! needs. No query fails: anything the model cannot resolve is `None`.

use crate::syntax::SyntaxNode;
use std::collections::HashSet;
use std::sync::Arc;

/// Shape of a type symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Reference type.
    Class,
    /// Value type.
    Struct,
    /// Interface.
    Interface,
    /// Enumeration.
    Enum,
    /// Record class or record struct.
    Record,
    /// Single- or multi-dimensional array; the element is the only type argument.
    Array,
    /// Generic type parameter.
    TypeParameter,
    /// A written name that resolved to no known declaration.
    Error,
}

/// Built-in types the language gives special meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum SpecialType {
    None,
    Object,
    Void,
    String,
    Boolean,
    Char,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    /// `System.Nullable<T>`.
    Nullable,
}

impl SpecialType {
    /// Language keyword for the type, if any.
    #[must_use]
    pub fn keyword(self) -> Option<&'static str> {
        Some(match self {
            Self::Object => "object",
            Self::Void => "void",
            Self::String => "string",
            Self::Boolean => "bool",
            Self::Char => "char",
            Self::SByte => "sbyte",
            Self::Byte => "byte",
            Self::Int16 => "short",
            Self::UInt16 => "ushort",
            Self::Int32 => "int",
            Self::UInt32 => "uint",
            Self::Int64 => "long",
            Self::UInt64 => "ulong",
            Self::Single => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::None | Self::Nullable => return None,
        })
    }

    /// Metadata name in the `System` namespace.
    #[must_use]
    pub fn metadata_name(self) -> Option<&'static str> {
        Some(match self {
            Self::Object => "Object",
            Self::Void => "Void",
            Self::String => "String",
            Self::Boolean => "Boolean",
            Self::Char => "Char",
            Self::SByte => "SByte",
            Self::Byte => "Byte",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Int64 => "Int64",
            Self::UInt64 => "UInt64",
            Self::Single => "Single",
            Self::Double => "Double",
            Self::Decimal => "Decimal",
            Self::Nullable => "Nullable",
            Self::None => return None,
        })
    }

    /// Maps a keyword (`int`, `string`, ...) to its special type.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "object" => Self::Object,
            "void" => Self::Void,
            "string" => Self::String,
            "bool" => Self::Boolean,
            "char" => Self::Char,
            "sbyte" => Self::SByte,
            "byte" => Self::Byte,
            "short" => Self::Int16,
            "ushort" => Self::UInt16,
            "int" => Self::Int32,
            "uint" => Self::UInt32,
            "long" => Self::Int64,
            "ulong" => Self::UInt64,
            "float" => Self::Single,
            "double" => Self::Double,
            "decimal" => Self::Decimal,
            _ => return None,
        })
    }

    /// True for value types.
    #[must_use]
    pub fn is_value_type(self) -> bool {
        !matches!(self, Self::None | Self::Object | Self::String | Self::Void)
    }
}

/// A resolved type.
#[derive(Debug, Clone)]
pub struct TypeSymbol {
    name: String,
    namespace: Option<String>,
    kind: TypeKind,
    special: SpecialType,
    base_type: Option<Arc<TypeSymbol>>,
    interfaces: Vec<Arc<TypeSymbol>>,
    type_arguments: Vec<Arc<TypeSymbol>>,
}

impl TypeSymbol {
    /// Creates a type with no namespace, base or type arguments.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            kind,
            special: SpecialType::None,
            base_type: None,
            interfaces: Vec::new(),
            type_arguments: Vec::new(),
        }
    }

    /// Creates a built-in type in `System`.
    #[must_use]
    pub fn special(special: SpecialType) -> Self {
        let kind = if special.is_value_type() {
            TypeKind::Struct
        } else {
            TypeKind::Class
        };
        let mut ty = Self::new(special.metadata_name().unwrap_or("Object"), kind)
            .in_namespace("System");
        ty.special = special;
        ty
    }

    /// Wraps `inner` in `System.Nullable<T>`.
    #[must_use]
    pub fn nullable_of(inner: Arc<TypeSymbol>) -> Self {
        let mut ty = Self::new("Nullable", TypeKind::Struct)
            .in_namespace("System")
            .with_type_arguments(vec![inner]);
        ty.special = SpecialType::Nullable;
        ty
    }

    /// Array of `element`.
    #[must_use]
    pub fn array_of(element: Arc<TypeSymbol>) -> Self {
        Self::new("Array", TypeKind::Array).with_type_arguments(vec![element])
    }

    /// Sets the containing namespace.
    #[must_use]
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = (!namespace.is_empty()).then_some(namespace);
        self
    }

    /// Sets the base type.
    #[must_use]
    pub fn with_base(mut self, base: Arc<TypeSymbol>) -> Self {
        self.base_type = Some(base);
        self
    }

    /// Sets the directly implemented interfaces.
    #[must_use]
    pub fn with_interfaces(mut self, interfaces: Vec<Arc<TypeSymbol>>) -> Self {
        self.interfaces = interfaces;
        self
    }

    /// Sets the type arguments.
    #[must_use]
    pub fn with_type_arguments(mut self, args: Vec<Arc<TypeSymbol>>) -> Self {
        self.type_arguments = args;
        self
    }

    /// Simple name, without namespace or type arguments.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Containing namespace, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Type kind.
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Special type tag.
    #[must_use]
    pub fn special_type(&self) -> SpecialType {
        self.special
    }

    /// Base type, if any.
    #[must_use]
    pub fn base_type(&self) -> Option<&Arc<TypeSymbol>> {
        self.base_type.as_ref()
    }

    /// Directly implemented interfaces.
    #[must_use]
    pub fn interfaces(&self) -> &[Arc<TypeSymbol>] {
        &self.interfaces
    }

    /// Type arguments.
    #[must_use]
    pub fn type_arguments(&self) -> &[Arc<TypeSymbol>] {
        &self.type_arguments
    }

    /// True for enumerations.
    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    /// True for built-in types.
    #[must_use]
    pub fn is_special(&self) -> bool {
        self.special != SpecialType::None
    }

    /// True when this is `Nullable<T>` around exactly one type.
    #[must_use]
    pub fn is_nullable_wrapper(&self) -> bool {
        self.special == SpecialType::Nullable && self.type_arguments.len() == 1
    }

    /// Minimally qualified display form: `string`, `List<int>`, `Status?`.
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(keyword) = self.special.keyword() {
            return keyword.to_string();
        }
        if self.is_nullable_wrapper() {
            return format!("{}?", self.type_arguments[0].display_name());
        }
        if let (TypeKind::Array, [element]) = (self.kind, self.type_arguments.as_slice()) {
            return format!("{}[]", element.display_name());
        }
        if self.type_arguments.is_empty() {
            return self.name.clone();
        }
        let args: Vec<String> = self
            .type_arguments
            .iter()
            .map(|a| a.display_name())
            .collect();
        format!("{}<{}>", self.name, args.join(", "))
    }

    /// Namespace-qualified form, type arguments included.
    #[must_use]
    pub fn full_name(&self) -> String {
        if let (TypeKind::Array, [element]) = (self.kind, self.type_arguments.as_slice()) {
            return format!("{}[]", element.full_name());
        }
        let mut out = String::new();
        if let Some(ns) = &self.namespace {
            out.push_str(ns);
            out.push('.');
        }
        out.push_str(&self.name);
        if !self.type_arguments.is_empty() {
            let args: Vec<String> = self.type_arguments.iter().map(|a| a.full_name()).collect();
            out.push('<');
            out.push_str(&args.join(", "));
            out.push('>');
        }
        out
    }

    /// True when name and namespace match exactly.
    #[must_use]
    pub fn is_named(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref().unwrap_or("") == namespace
    }
}

impl PartialEq for TypeSymbol {
    fn eq(&self, other: &Self) -> bool {
        self.full_name() == other.full_name()
    }
}

impl Eq for TypeSymbol {}

impl std::hash::Hash for TypeSymbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.full_name().hash(state);
    }
}

impl std::fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSymbol {
    /// Parameter name.
    pub name: String,
    /// Declared type, if it resolved.
    pub ty: Option<Arc<TypeSymbol>>,
    /// Declared with `params`.
    pub is_params: bool,
    /// Has a default value.
    pub is_optional: bool,
}

/// A resolved method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSymbol {
    /// Method name.
    pub name: String,
    /// Declaring type.
    pub containing_type: Option<Arc<TypeSymbol>>,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterSymbol>,
    /// Return type; `None` when it did not resolve.
    pub return_type: Option<Arc<TypeSymbol>>,
}

impl MethodSymbol {
    /// True when the method takes exactly one parameter of the given special type.
    #[must_use]
    pub fn has_single_parameter_of(&self, special: SpecialType) -> bool {
        matches!(
            self.parameters.as_slice(),
            [p] if p.ty.as_ref().is_some_and(|t| t.special_type() == special)
        )
    }
}

/// Read-only bound view of a compilation, supplied by the front-end.
pub trait SemanticModel: Send + Sync {
    /// Static type of an expression or type-syntax node.
    fn type_of(&self, node: &SyntaxNode) -> Option<Arc<TypeSymbol>>;

    /// Target method of an invocation expression.
    fn method_of(&self, invocation: &SyntaxNode) -> Option<MethodSymbol>;
}

/// A model that resolves nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyModel;

impl SemanticModel for EmptyModel {
    fn type_of(&self, _node: &SyntaxNode) -> Option<Arc<TypeSymbol>> {
        None
    }

    fn method_of(&self, _invocation: &SyntaxNode) -> Option<MethodSymbol> {
        None
    }
}

/// Query surface rules use.
#[derive(Clone, Copy)]
pub struct Resolver<'m> {
    model: &'m dyn SemanticModel,
}

impl std::fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

impl<'m> Resolver<'m> {
    /// Wraps a model.
    #[must_use]
    pub fn new(model: &'m dyn SemanticModel) -> Self {
        Self { model }
    }

    /// Static type of `node`.
    #[must_use]
    pub fn type_of(&self, node: &SyntaxNode) -> Option<Arc<TypeSymbol>> {
        self.model.type_of(node)
    }

    /// Target method of `invocation`.
    #[must_use]
    pub fn method_of(&self, invocation: &SyntaxNode) -> Option<MethodSymbol> {
        self.model.method_of(invocation)
    }

    /// Walks `ty`, then its base type, and so on, looking for
    /// `namespace.name`. A cyclic chain ends the walk.
    #[must_use]
    pub fn base_chain_contains(ty: &TypeSymbol, namespace: &str, name: &str) -> bool {
        BaseChain::new(ty).any(|t| t.is_named(namespace, name))
    }

    /// True when `ty`, a base type, or any interface reachable from them has
    /// the simple name `name`.
    #[must_use]
    pub fn implements(ty: &TypeSymbol, name: &str) -> bool {
        let mut seen = HashSet::new();
        let mut pending: Vec<&TypeSymbol> = vec![ty];
        while let Some(current) = pending.pop() {
            if !seen.insert(current.full_name()) {
                continue;
            }
            if current.name() == name {
                return true;
            }
            if let Some(base) = current.base_type() {
                pending.push(base);
            }
            pending.extend(current.interfaces().iter().map(|i| &**i));
        }
        false
    }

    /// Underlying type of `Nullable<T>`; any other type unchanged.
    #[must_use]
    pub fn unwrap_optional(ty: &Arc<TypeSymbol>) -> Arc<TypeSymbol> {
        if ty.is_nullable_wrapper() {
            Arc::clone(&ty.type_arguments()[0])
        } else {
            Arc::clone(ty)
        }
    }
}

/// Iterator over a type and its base types, guarded against cycles.
#[derive(Debug)]
pub struct BaseChain<'a> {
    next: Option<&'a TypeSymbol>,
    seen: HashSet<String>,
}

impl<'a> BaseChain<'a> {
    /// Starts at `ty` itself.
    #[must_use]
    pub fn new(ty: &'a TypeSymbol) -> Self {
        Self {
            next: Some(ty),
            seen: HashSet::new(),
        }
    }
}

impl<'a> Iterator for BaseChain<'a> {
    type Item = &'a TypeSymbol;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if !self.seen.insert(current.full_name()) {
            return None;
        }
        self.next = current.base_type().map(|b| &**b);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(ns: &str, name: &str) -> TypeSymbol {
        TypeSymbol::new(name, TypeKind::Class).in_namespace(ns)
    }

    fn entity_chain(depth: usize) -> TypeSymbol {
        let mut ty = class("Microsoft.Xrm.Sdk", "Entity");
        for i in 0..depth {
            ty = class("Contoso", &format!("Level{i}")).with_base(Arc::new(ty));
        }
        ty
    }

    #[test]
    fn base_chain_finds_deep_ancestor() {
        let ty = entity_chain(40);
        assert!(Resolver::base_chain_contains(&ty, "Microsoft.Xrm.Sdk", "Entity"));
        assert!(!Resolver::base_chain_contains(&ty, "Other", "Entity"));
    }

    #[test]
    fn base_chain_includes_the_type_itself() {
        let ty = class("Microsoft.Xrm.Sdk", "Entity");
        assert!(Resolver::base_chain_contains(&ty, "Microsoft.Xrm.Sdk", "Entity"));
    }

    #[test]
    fn implements_sees_interfaces_of_bases() {
        let plugin = Arc::new(TypeSymbol::new("IPlugin", TypeKind::Interface).in_namespace("Microsoft.Xrm.Sdk"));
        let base = Arc::new(class("Contoso", "PluginBase").with_interfaces(vec![plugin]));
        let ty = class("Contoso", "AccountPlugin").with_base(base);
        assert!(Resolver::implements(&ty, "IPlugin"));
        assert!(!Resolver::implements(&ty, "Plugin"));
    }

    #[test]
    fn unwrap_optional_strips_one_level() {
        let status = Arc::new(TypeSymbol::new("Status", TypeKind::Enum));
        let nullable = Arc::new(TypeSymbol::nullable_of(Arc::clone(&status)));
        assert_eq!(Resolver::unwrap_optional(&nullable).name(), "Status");
        assert_eq!(Resolver::unwrap_optional(&status).name(), "Status");

        let twice = Arc::new(TypeSymbol::nullable_of(Arc::clone(&nullable)));
        assert!(Resolver::unwrap_optional(&twice).is_nullable_wrapper());
    }

    #[test]
    fn display_names() {
        let int = Arc::new(TypeSymbol::special(SpecialType::Int32));
        let list = class("System.Collections.Generic", "List").with_type_arguments(vec![int]);
        assert_eq!(list.display_name(), "List<int>");
        assert_eq!(list.full_name(), "System.Collections.Generic.List<System.Int32>");

        let status = Arc::new(TypeSymbol::new("Status", TypeKind::Enum));
        assert_eq!(TypeSymbol::nullable_of(status).display_name(), "Status?");
        assert_eq!(TypeSymbol::special(SpecialType::String).display_name(), "string");

        let names = TypeSymbol::array_of(Arc::new(TypeSymbol::special(SpecialType::String)));
        assert_eq!(names.display_name(), "string[]");
        assert_eq!(names.full_name(), "System.String[]");
    }

    #[test]
    fn equality_includes_type_arguments() {
        let a = class("N", "Box").with_type_arguments(vec![Arc::new(class("N", "A"))]);
        let b = class("N", "Box").with_type_arguments(vec![Arc::new(class("N", "B"))]);
        assert_ne!(a, b);
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn single_string_parameter() {
        let method = MethodSymbol {
            name: "Contains".into(),
            containing_type: None,
            parameters: vec![ParameterSymbol {
                name: "attributeName".into(),
                ty: Some(Arc::new(TypeSymbol::special(SpecialType::String))),
                is_params: false,
                is_optional: false,
            }],
            return_type: Some(Arc::new(TypeSymbol::special(SpecialType::Boolean))),
        };
        assert!(method.has_single_parameter_of(SpecialType::String));
        assert!(!method.has_single_parameter_of(SpecialType::Int32));
    }
}
