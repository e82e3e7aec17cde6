//! Closed set of node and token kinds.

use serde::{Deserialize, Serialize};

/// Kind tag of an interior tree node.
///
/// The set is closed: rules declare the kinds they trigger on and the
/// dispatcher routes nodes through a kind-keyed lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum SyntaxKind {
    // Compilation structure
    CompilationUnit,
    UsingDirective,
    NamespaceDeclaration,
    FileScopedNamespaceDeclaration,

    // Type declarations
    ClassDeclaration,
    StructDeclaration,
    InterfaceDeclaration,
    RecordDeclaration,
    RecordStructDeclaration,
    EnumDeclaration,
    EnumMemberDeclaration,
    DelegateDeclaration,
    AttributeList,
    BaseList,
    SimpleBaseType,
    TypeParameterList,
    TypeParameter,
    TypeParameterConstraintClause,

    // Members
    FieldDeclaration,
    PropertyDeclaration,
    IndexerDeclaration,
    AccessorList,
    AccessorDeclaration,
    EventDeclaration,
    MethodDeclaration,
    OperatorDeclaration,
    ConstructorDeclaration,
    DestructorDeclaration,
    ExplicitInterfaceSpecifier,
    ConstructorInitializer,
    ParameterList,
    BracketedParameterList,
    Parameter,
    EqualsValueClause,
    ArrowExpressionClause,
    VariableDeclaration,
    VariableDeclarator,

    // Statements
    Block,
    LocalDeclarationStatement,
    LocalFunctionStatement,
    ExpressionStatement,
    EmptyStatement,
    IfStatement,
    ElseClause,
    ForStatement,
    ForEachStatement,
    WhileStatement,
    DoStatement,
    ReturnStatement,
    ThrowStatement,
    BreakStatement,
    ContinueStatement,
    YieldReturnStatement,
    YieldBreakStatement,
    GotoStatement,
    LabeledStatement,
    CheckedStatement,
    UnsafeStatement,
    FixedStatement,
    TryStatement,
    CatchClause,
    CatchDeclaration,
    CatchFilterClause,
    FinallyClause,
    UsingStatement,
    LockStatement,
    SwitchStatement,
    SwitchSection,
    CaseSwitchLabel,
    DefaultSwitchLabel,

    // Expressions
    NumericLiteralExpression,
    StringLiteralExpression,
    CharacterLiteralExpression,
    InterpolatedStringExpression,
    TrueLiteralExpression,
    FalseLiteralExpression,
    NullLiteralExpression,
    DefaultLiteralExpression,
    IdentifierName,
    GenericName,
    ThisExpression,
    BaseExpression,
    SimpleMemberAccessExpression,
    ConditionalAccessExpression,
    InvocationExpression,
    ElementAccessExpression,
    ArgumentList,
    BracketedArgumentList,
    Argument,
    NameColon,
    ObjectCreationExpression,
    ImplicitObjectCreationExpression,
    AnonymousObjectCreationExpression,
    ArrayCreationExpression,
    ImplicitArrayCreationExpression,
    InitializerExpression,
    CollectionExpression,
    SimpleAssignmentExpression,
    CompoundAssignmentExpression,
    BinaryExpression,
    AsExpression,
    IsPatternExpression,
    Pattern,
    PrefixUnaryExpression,
    PostfixUnaryExpression,
    ConditionalExpression,
    CastExpression,
    ParenthesizedExpression,
    TupleExpression,
    AwaitExpression,
    SimpleLambdaExpression,
    ParenthesizedLambdaExpression,
    TypeOfExpression,
    DefaultExpression,
    ThrowExpression,
    DeclarationExpression,
    SwitchExpression,
    SwitchExpressionArm,
    WithExpression,
    RangeExpression,
    CheckedExpression,
    SizeOfExpression,

    // Type syntax
    QualifiedName,
    TypeArgumentList,
    PredefinedType,
    NullableType,
    ArrayType,
    ArrayRankSpecifier,
    TupleType,

    /// Tokens the parser could not place; kept so no source text is lost.
    Error,
}

impl SyntaxKind {
    /// Returns true for statement kinds (the children of a block).
    #[must_use]
    pub fn is_statement(self) -> bool {
        matches!(
            self,
            Self::Block
                | Self::LocalDeclarationStatement
                | Self::LocalFunctionStatement
                | Self::ExpressionStatement
                | Self::EmptyStatement
                | Self::IfStatement
                | Self::ForStatement
                | Self::ForEachStatement
                | Self::WhileStatement
                | Self::DoStatement
                | Self::ReturnStatement
                | Self::ThrowStatement
                | Self::BreakStatement
                | Self::ContinueStatement
                | Self::YieldReturnStatement
                | Self::YieldBreakStatement
                | Self::GotoStatement
                | Self::LabeledStatement
                | Self::CheckedStatement
                | Self::UnsafeStatement
                | Self::FixedStatement
                | Self::TryStatement
                | Self::UsingStatement
                | Self::LockStatement
                | Self::SwitchStatement
        )
    }

    /// Returns true for type declaration kinds.
    #[must_use]
    pub fn is_type_declaration(self) -> bool {
        matches!(
            self,
            Self::ClassDeclaration
                | Self::StructDeclaration
                | Self::InterfaceDeclaration
                | Self::RecordDeclaration
                | Self::RecordStructDeclaration
                | Self::EnumDeclaration
        )
    }

    /// Returns true for type syntax (names that may appear in a type position).
    #[must_use]
    pub fn is_type(self) -> bool {
        matches!(
            self,
            Self::IdentifierName
                | Self::GenericName
                | Self::QualifiedName
                | Self::PredefinedType
                | Self::NullableType
                | Self::ArrayType
                | Self::TupleType
        )
    }

    /// Returns true for simple names (`Foo`, `Foo<T>`).
    #[must_use]
    pub fn is_simple_name(self) -> bool {
        matches!(self, Self::IdentifierName | Self::GenericName)
    }

    /// Returns true for literal expression kinds.
    #[must_use]
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::NumericLiteralExpression
                | Self::StringLiteralExpression
                | Self::CharacterLiteralExpression
                | Self::InterpolatedStringExpression
                | Self::TrueLiteralExpression
                | Self::FalseLiteralExpression
                | Self::NullLiteralExpression
                | Self::DefaultLiteralExpression
        )
    }

    /// Returns true for expression kinds.
    #[must_use]
    pub fn is_expression(self) -> bool {
        self.is_literal()
            || matches!(
                self,
                Self::IdentifierName
                    | Self::GenericName
                    | Self::QualifiedName
                    | Self::PredefinedType
                    | Self::ThisExpression
                    | Self::BaseExpression
                    | Self::SimpleMemberAccessExpression
                    | Self::ConditionalAccessExpression
                    | Self::InvocationExpression
                    | Self::ElementAccessExpression
                    | Self::ObjectCreationExpression
                    | Self::ImplicitObjectCreationExpression
                    | Self::AnonymousObjectCreationExpression
                    | Self::ArrayCreationExpression
                    | Self::ImplicitArrayCreationExpression
                    | Self::InitializerExpression
                    | Self::CollectionExpression
                    | Self::SimpleAssignmentExpression
                    | Self::CompoundAssignmentExpression
                    | Self::BinaryExpression
                    | Self::AsExpression
                    | Self::IsPatternExpression
                    | Self::PrefixUnaryExpression
                    | Self::PostfixUnaryExpression
                    | Self::ConditionalExpression
                    | Self::CastExpression
                    | Self::ParenthesizedExpression
                    | Self::TupleExpression
                    | Self::AwaitExpression
                    | Self::SimpleLambdaExpression
                    | Self::ParenthesizedLambdaExpression
                    | Self::TypeOfExpression
                    | Self::DefaultExpression
                    | Self::ThrowExpression
                    | Self::DeclarationExpression
                    | Self::SwitchExpression
                    | Self::WithExpression
                    | Self::RangeExpression
                    | Self::CheckedExpression
                    | Self::SizeOfExpression
            )
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Kind tag of a leaf token.
///
/// Keywords share one kind; the token text tells them apart. Contextual
/// keywords (`var`, `await`, `yield`, `record`, ...) lex as identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// Identifier or contextual keyword.
    Identifier,
    /// Reserved keyword.
    Keyword,
    /// Integer or real literal.
    NumericLiteral,
    /// Regular, verbatim or raw string literal.
    StringLiteral,
    /// Character literal.
    CharLiteral,
    /// Interpolated string, lexed as a single token.
    InterpolatedString,
    /// Operator or punctuation.
    Punct,
    /// End of input; carries the file's final trivia.
    EndOfFile,
    /// A character the lexer does not recognise.
    Unknown,
}

/// Kind tag of a trivia piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriviaKind {
    /// Spaces and tabs.
    Whitespace,
    /// A line break (`\n` or `\r\n`).
    EndOfLine,
    /// `// ...` up to the end of the line.
    LineComment,
    /// `/* ... */`.
    BlockComment,
    /// `/// ...` documentation line, up to the end of the line.
    DocComment,
    /// Preprocessor directive line (`#region`, `#if`, ...).
    Directive,
}
