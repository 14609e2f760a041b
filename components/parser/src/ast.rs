//! Abstract Syntax Tree node definitions
//!
//! Every node carries the [`Span`] of source it was built from. Trees
//! serialize to ESTree-flavored JSON: nodes are tagged with a `"type"` field.

use core_types::Span;
use serde::Serialize;

/// A parsed script or module
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    /// Top-level statements
    pub body: Vec<Statement>,
    /// Source location
    pub span: Span,
}

/// JavaScript statements
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Statement {
    /// Variable declaration (let, const, var)
    VariableDeclaration {
        /// Declaration kind (let, const, var)
        kind: VariableKind,
        /// List of declarators
        declarations: Vec<VariableDeclarator>,
        /// Source location
        span: Span,
    },

    /// Function declaration
    FunctionDeclaration {
        /// Function name
        name: String,
        /// Parameter patterns
        params: Vec<Pattern>,
        /// Function body
        body: Vec<Statement>,
        /// Is async function
        is_async: bool,
        /// Is generator function
        is_generator: bool,
        /// Source location
        span: Span,
    },

    /// Class declaration
    ClassDeclaration {
        /// Class name
        name: String,
        /// Superclass expression
        super_class: Option<Box<Expression>>,
        /// Class body
        body: ClassBody,
        /// Source location
        span: Span,
    },

    /// Expression statement
    ExpressionStatement {
        /// The expression
        expression: Expression,
        /// Source location
        span: Span,
    },

    /// Return statement
    ReturnStatement {
        /// Return value
        argument: Option<Expression>,
        /// Source location
        span: Span,
    },

    /// If statement
    IfStatement {
        /// Condition
        test: Expression,
        /// Consequent block
        consequent: Box<Statement>,
        /// Alternate block
        alternate: Option<Box<Statement>>,
        /// Source location
        span: Span,
    },

    /// While loop
    WhileStatement {
        /// Loop condition
        test: Expression,
        /// Loop body
        body: Box<Statement>,
        /// Source location
        span: Span,
    },

    /// Do-while loop
    DoWhileStatement {
        /// Loop body
        body: Box<Statement>,
        /// Loop condition
        test: Expression,
        /// Source location
        span: Span,
    },

    /// For loop
    ForStatement {
        /// Initialization
        init: Option<ForInit>,
        /// Condition
        test: Option<Expression>,
        /// Update expression
        update: Option<Expression>,
        /// Loop body
        body: Box<Statement>,
        /// Source location
        span: Span,
    },

    /// For...in loop
    ForInStatement {
        /// Left side (variable or target)
        left: ForInOfLeft,
        /// Object to iterate over
        right: Expression,
        /// Loop body
        body: Box<Statement>,
        /// Source location
        span: Span,
    },

    /// For...of loop
    ForOfStatement {
        /// Left side (variable or target)
        left: ForInOfLeft,
        /// Iterable to iterate over
        right: Expression,
        /// Loop body
        body: Box<Statement>,
        /// Source location
        span: Span,
    },

    /// Block statement
    BlockStatement {
        /// Block body
        body: Vec<Statement>,
        /// Source location
        span: Span,
    },

    /// Empty statement
    EmptyStatement {
        /// Source location
        span: Span,
    },

    /// Break statement
    BreakStatement {
        /// Optional label
        label: Option<String>,
        /// Source location
        span: Span,
    },

    /// Continue statement
    ContinueStatement {
        /// Optional label
        label: Option<String>,
        /// Source location
        span: Span,
    },

    /// Throw statement
    ThrowStatement {
        /// Exception to throw
        argument: Expression,
        /// Source location
        span: Span,
    },

    /// Try statement
    TryStatement {
        /// Try block
        block: Vec<Statement>,
        /// Catch clause
        handler: Option<CatchClause>,
        /// Finally block
        finalizer: Option<Vec<Statement>>,
        /// Source location
        span: Span,
    },

    /// Switch statement
    SwitchStatement {
        /// Discriminant expression
        discriminant: Expression,
        /// Case clauses
        cases: Vec<SwitchCase>,
        /// Source location
        span: Span,
    },

    /// Debugger statement
    DebuggerStatement {
        /// Source location
        span: Span,
    },

    /// Labeled statement
    LabeledStatement {
        /// Label name
        label: String,
        /// Body statement
        body: Box<Statement>,
        /// Source location
        span: Span,
    },
}

impl Statement {
    /// Source location of the statement
    pub fn span(&self) -> &Span {
        match self {
            Statement::VariableDeclaration { span, .. }
            | Statement::FunctionDeclaration { span, .. }
            | Statement::ClassDeclaration { span, .. }
            | Statement::ExpressionStatement { span, .. }
            | Statement::ReturnStatement { span, .. }
            | Statement::IfStatement { span, .. }
            | Statement::WhileStatement { span, .. }
            | Statement::DoWhileStatement { span, .. }
            | Statement::ForStatement { span, .. }
            | Statement::ForInStatement { span, .. }
            | Statement::ForOfStatement { span, .. }
            | Statement::BlockStatement { span, .. }
            | Statement::EmptyStatement { span }
            | Statement::BreakStatement { span, .. }
            | Statement::ContinueStatement { span, .. }
            | Statement::ThrowStatement { span, .. }
            | Statement::TryStatement { span, .. }
            | Statement::SwitchStatement { span, .. }
            | Statement::DebuggerStatement { span }
            | Statement::LabeledStatement { span, .. } => span,
        }
    }
}

/// Switch case clause
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchCase {
    /// Test expression (None for default case)
    pub test: Option<Expression>,
    /// Consequent statements
    pub consequent: Vec<Statement>,
}

/// A `#name` class element name or private member property.
///
/// `name` is stored without the `#` sigil.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrivateName {
    /// Bare name
    pub name: String,
    /// Source location, including the `#`
    pub span: Span,
}

/// JavaScript expressions
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Expression {
    /// Identifier reference
    Identifier {
        /// Variable name
        name: String,
        /// Source location
        span: Span,
    },

    /// Private name; only valid as the property of a member access
    PrivateName(PrivateName),

    /// Literal value
    Literal {
        /// Literal value
        value: Literal,
        /// Source location
        span: Span,
    },

    /// Binary operation
    BinaryExpression {
        /// Left operand
        left: Box<Expression>,
        /// Operator
        operator: BinaryOperator,
        /// Right operand
        right: Box<Expression>,
        /// Source location
        span: Span,
    },

    /// Unary operation
    UnaryExpression {
        /// Operator
        operator: UnaryOperator,
        /// Operand
        argument: Box<Expression>,
        /// Source location
        span: Span,
    },

    /// Update expression (++, --)
    UpdateExpression {
        /// Operator
        operator: UpdateOperator,
        /// Operand
        argument: Box<Expression>,
        /// Is prefix operator
        prefix: bool,
        /// Source location
        span: Span,
    },

    /// Logical expression (&&, ||, ??)
    LogicalExpression {
        /// Left operand
        left: Box<Expression>,
        /// Operator
        operator: LogicalOperator,
        /// Right operand
        right: Box<Expression>,
        /// Source location
        span: Span,
    },

    /// Assignment expression
    AssignmentExpression {
        /// Left-hand side
        left: AssignmentTarget,
        /// Operator
        operator: AssignmentOperator,
        /// Right-hand side
        right: Box<Expression>,
        /// Source location
        span: Span,
    },

    /// Conditional expression (ternary)
    ConditionalExpression {
        /// Condition
        test: Box<Expression>,
        /// Consequent
        consequent: Box<Expression>,
        /// Alternate
        alternate: Box<Expression>,
        /// Source location
        span: Span,
    },

    /// Function call
    CallExpression {
        /// Function being called
        callee: Box<Expression>,
        /// Arguments
        arguments: Vec<Expression>,
        /// Optional call (e.g., foo?.())
        optional: bool,
        /// Source location
        span: Span,
    },

    /// Member access (`obj.prop`, `obj[prop]` or `obj.#prop`)
    MemberExpression {
        /// Object
        object: Box<Expression>,
        /// Property: an identifier, a private name, or the computed expression
        property: Box<Expression>,
        /// Is computed (bracket notation)
        computed: bool,
        /// Optional access (e.g., obj?.prop)
        optional: bool,
        /// Source location
        span: Span,
    },

    /// New expression
    NewExpression {
        /// Constructor
        callee: Box<Expression>,
        /// Arguments
        arguments: Vec<Expression>,
        /// Source location
        span: Span,
    },

    /// Array literal
    ArrayExpression {
        /// Elements; holes are `None`
        elements: Vec<Option<Expression>>,
        /// Source location
        span: Span,
    },

    /// Object literal
    ObjectExpression {
        /// Properties
        properties: Vec<ObjectProperty>,
        /// Source location
        span: Span,
    },

    /// Arrow function
    ArrowFunctionExpression {
        /// Parameters
        params: Vec<Pattern>,
        /// Body (expression or block)
        body: ArrowFunctionBody,
        /// Is async
        is_async: bool,
        /// Source location
        span: Span,
    },

    /// Function expression
    FunctionExpression {
        /// Optional name
        name: Option<String>,
        /// Parameters
        params: Vec<Pattern>,
        /// Body
        body: Vec<Statement>,
        /// Is async
        is_async: bool,
        /// Is generator
        is_generator: bool,
        /// Source location
        span: Span,
    },

    /// Class expression
    ClassExpression {
        /// Class name (optional for expressions)
        name: Option<String>,
        /// Superclass
        super_class: Option<Box<Expression>>,
        /// Class body
        body: ClassBody,
        /// Source location
        span: Span,
    },

    /// This expression
    ThisExpression {
        /// Source location
        span: Span,
    },

    /// `super` keyword, as callee or member object
    Super {
        /// Source location
        span: Span,
    },

    /// Await expression
    AwaitExpression {
        /// Argument
        argument: Box<Expression>,
        /// Source location
        span: Span,
    },

    /// Yield expression
    YieldExpression {
        /// Argument
        argument: Option<Box<Expression>>,
        /// Is delegated (yield*)
        delegate: bool,
        /// Source location
        span: Span,
    },

    /// Template literal
    TemplateLiteral {
        /// Quasis (string parts)
        quasis: Vec<TemplateElement>,
        /// Expressions (interpolated parts)
        expressions: Vec<Expression>,
        /// Source location
        span: Span,
    },

    /// Tagged template (tag`...`)
    TaggedTemplateExpression {
        /// Tag function
        tag: Box<Expression>,
        /// The template literal
        quasi: Box<Expression>,
        /// Source location
        span: Span,
    },

    /// Spread element
    SpreadElement {
        /// Argument to spread
        argument: Box<Expression>,
        /// Source location
        span: Span,
    },

    /// Sequence expression (comma-separated)
    SequenceExpression {
        /// Expressions
        expressions: Vec<Expression>,
        /// Source location
        span: Span,
    },
}

impl Expression {
    /// Source location of the expression
    pub fn span(&self) -> &Span {
        match self {
            Expression::PrivateName(private) => &private.span,
            Expression::Identifier { span, .. }
            | Expression::Literal { span, .. }
            | Expression::BinaryExpression { span, .. }
            | Expression::UnaryExpression { span, .. }
            | Expression::UpdateExpression { span, .. }
            | Expression::LogicalExpression { span, .. }
            | Expression::AssignmentExpression { span, .. }
            | Expression::ConditionalExpression { span, .. }
            | Expression::CallExpression { span, .. }
            | Expression::MemberExpression { span, .. }
            | Expression::NewExpression { span, .. }
            | Expression::ArrayExpression { span, .. }
            | Expression::ObjectExpression { span, .. }
            | Expression::ArrowFunctionExpression { span, .. }
            | Expression::FunctionExpression { span, .. }
            | Expression::ClassExpression { span, .. }
            | Expression::ThisExpression { span }
            | Expression::Super { span }
            | Expression::AwaitExpression { span, .. }
            | Expression::YieldExpression { span, .. }
            | Expression::TemplateLiteral { span, .. }
            | Expression::TaggedTemplateExpression { span, .. }
            | Expression::SpreadElement { span, .. }
            | Expression::SequenceExpression { span, .. } => span,
        }
    }

    /// True for `obj.#name` and `obj?.#name`
    pub fn is_private_member(&self) -> bool {
        matches!(
            self,
            Expression::MemberExpression { property, .. }
                if matches!(property.as_ref(), Expression::PrivateName(_))
        )
    }
}

/// Variable declaration kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    /// let declaration
    Let,
    /// const declaration
    Const,
    /// var declaration
    Var,
}

/// Variable declarator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableDeclarator {
    /// Pattern (identifier or destructuring)
    pub id: Pattern,
    /// Initial value
    pub init: Option<Expression>,
}

/// Pattern for variable binding
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Pattern {
    /// Simple identifier
    Identifier {
        /// Bound name
        name: String,
        /// Source location
        span: Span,
    },
    /// Object destructuring
    ObjectPattern {
        /// Destructured properties
        properties: Vec<ObjectPatternProperty>,
        /// Trailing rest element
        rest: Option<Box<Pattern>>,
        /// Source location
        span: Span,
    },
    /// Array destructuring
    ArrayPattern {
        /// Elements; holes are `None`
        elements: Vec<Option<Pattern>>,
        /// Source location
        span: Span,
    },
    /// Assignment pattern (with default value)
    AssignmentPattern {
        /// Left side
        left: Box<Pattern>,
        /// Default value
        right: Box<Expression>,
        /// Source location
        span: Span,
    },
    /// Rest element (...rest)
    RestElement {
        /// Rest target
        argument: Box<Pattern>,
        /// Source location
        span: Span,
    },
    /// Member expression target (destructuring assignment only, never a binding)
    /// Example: [obj.prop] = [1] or ({ a: this.#x } = o)
    MemberExpression {
        /// The `MemberExpression` being assigned
        expression: Box<Expression>,
    },
}

impl Pattern {
    /// Source location of the pattern
    pub fn span(&self) -> &Span {
        match self {
            Pattern::Identifier { span, .. }
            | Pattern::ObjectPattern { span, .. }
            | Pattern::ArrayPattern { span, .. }
            | Pattern::AssignmentPattern { span, .. }
            | Pattern::RestElement { span, .. } => span,
            Pattern::MemberExpression { expression } => expression.span(),
        }
    }
}

/// Object pattern property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectPatternProperty {
    /// Key (can be literal or computed)
    pub key: PropertyKey,
    /// Value pattern
    pub value: Pattern,
    /// Is shorthand (e.g., { a } instead of { a: a })
    pub shorthand: bool,
}

/// Literal value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    /// Number
    Number(f64),
    /// BigInt (stored as string to preserve exact value)
    BigInt(String),
    /// String
    String(String),
    /// Boolean
    Boolean(bool),
    /// Null
    Null,
    /// Regular expression
    RegExp {
        /// Pattern source
        pattern: String,
        /// Flags
        flags: String,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    /// Addition
    Add,
    /// Subtraction
    Sub,
    /// Multiplication
    Mul,
    /// Division
    Div,
    /// Modulo
    Mod,
    /// Exponentiation
    Exp,
    /// Equality
    Eq,
    /// Inequality
    NotEq,
    /// Strict equality
    StrictEq,
    /// Strict inequality
    StrictNotEq,
    /// Less than
    Lt,
    /// Less than or equal
    LtEq,
    /// Greater than
    Gt,
    /// Greater than or equal
    GtEq,
    /// Bitwise AND
    BitwiseAnd,
    /// Bitwise OR
    BitwiseOr,
    /// Bitwise XOR
    BitwiseXor,
    /// Left shift
    LeftShift,
    /// Right shift
    RightShift,
    /// Unsigned right shift
    UnsignedRightShift,
    /// Instanceof
    Instanceof,
    /// In
    In,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    /// Negate
    Minus,
    /// Plus (type coercion)
    Plus,
    /// Logical NOT
    Not,
    /// Bitwise NOT
    BitwiseNot,
    /// Typeof
    Typeof,
    /// Void
    Void,
    /// Delete
    Delete,
}

/// Update operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateOperator {
    /// Increment
    Increment,
    /// Decrement
    Decrement,
}

/// Logical operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogicalOperator {
    /// Logical AND
    And,
    /// Logical OR
    Or,
    /// Nullish coalescing
    NullishCoalesce,
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssignmentOperator {
    /// Simple assignment (=)
    Assign,
    /// Addition assignment (+=)
    AddAssign,
    /// Subtraction assignment (-=)
    SubAssign,
    /// Multiplication assignment (*=)
    MulAssign,
    /// Division assignment (/=)
    DivAssign,
    /// Modulo assignment (%=)
    ModAssign,
    /// Exponentiation assignment (**=)
    ExpAssign,
    /// Bitwise AND assignment (&=)
    BitAndAssign,
    /// Bitwise OR assignment (|=)
    BitOrAssign,
    /// Bitwise XOR assignment (^=)
    BitXorAssign,
    /// Left shift assignment (<<=)
    LeftShiftAssign,
    /// Right shift assignment (>>=)
    RightShiftAssign,
    /// Unsigned right shift assignment (>>>=)
    UnsignedRightShiftAssign,
    /// Logical AND assignment (&&=)
    LogicalAndAssign,
    /// Logical OR assignment (||=)
    LogicalOrAssign,
    /// Nullish coalescing assignment (??=)
    NullishCoalesceAssign,
}

/// Assignment target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AssignmentTarget {
    /// Identifier or member expression
    Simple(Box<Expression>),
    /// Destructuring pattern
    Pattern(Pattern),
}

/// For loop initialization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ForInit {
    /// Variable declaration
    VariableDeclaration {
        /// Kind
        kind: VariableKind,
        /// Declarations
        declarations: Vec<VariableDeclarator>,
    },
    /// Expression
    Expression(Expression),
}

/// Left side of for-in/for-of loop
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ForInOfLeft {
    /// Variable declaration (let x, const x, var x)
    VariableDeclaration {
        /// Kind
        kind: VariableKind,
        /// Binding pattern
        id: Pattern,
    },
    /// Left-hand side expression (e.g., identifier or member expression)
    Expression(Expression),
    /// Destructuring target (e.g., `for ([a, this.#b] of pairs)`)
    Pattern(Pattern),
}

/// Catch clause
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatchClause {
    /// Parameter
    pub param: Option<Pattern>,
    /// Body
    pub body: Vec<Statement>,
}

/// Member list of a class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassBody {
    /// Elements in source order
    pub body: Vec<ClassElement>,
    /// Source location, from `{` to `}`
    pub span: Span,
}

/// Class element
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ClassElement {
    /// Method definition
    MethodDefinition {
        /// Method name
        key: PropertyKey,
        /// Method kind
        kind: MethodKind,
        /// Value (function expression starting at the parameter list)
        value: Expression,
        /// Is static
        is_static: bool,
        /// Is computed (e.g., [expr])
        computed: bool,
        /// Source location
        span: Span,
    },
    /// Property definition (class field)
    PropertyDefinition {
        /// Property key
        key: PropertyKey,
        /// Initial value
        value: Option<Expression>,
        /// Is static
        is_static: bool,
        /// Is computed (e.g., [expr])
        computed: bool,
        /// Source location
        span: Span,
    },
    /// `static { ... }` initialization block
    StaticBlock {
        /// Block body
        body: Vec<Statement>,
        /// Source location
        span: Span,
    },
}

/// Method kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    /// Regular method
    Method,
    /// Getter
    Get,
    /// Setter
    Set,
    /// Constructor
    Constructor,
}

/// Object literal property kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    /// Plain value or method
    Init,
    /// Getter
    Get,
    /// Setter
    Set,
}

/// Object property
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ObjectProperty {
    /// Property with key and value
    Property {
        /// Key
        key: PropertyKey,
        /// Value
        value: Expression,
        /// Init, get or set
        kind: PropertyKind,
        /// Written with method syntax
        method: bool,
        /// Is shorthand
        shorthand: bool,
        /// Is computed
        computed: bool,
        /// Source location
        span: Span,
    },
    /// Spread property
    SpreadElement {
        /// Spread argument
        argument: Expression,
        /// Source location
        span: Span,
    },
}

/// Property key
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum PropertyKey {
    /// Identifier key
    Identifier {
        /// Key name
        name: String,
        /// Source location
        span: Span,
    },
    /// Private name key (`#name`), only in class bodies
    PrivateName(PrivateName),
    /// String literal key
    StringLiteral {
        /// Key value
        value: String,
        /// Source location
        span: Span,
    },
    /// Number literal key
    NumericLiteral {
        /// Key value
        value: f64,
        /// Source location
        span: Span,
    },
    /// Computed key
    Computed {
        /// Key expression
        expression: Box<Expression>,
        /// Source location, including the brackets
        span: Span,
    },
}

impl PropertyKey {
    /// Source location of the key
    pub fn span(&self) -> &Span {
        match self {
            PropertyKey::PrivateName(private) => &private.span,
            PropertyKey::Identifier { span, .. }
            | PropertyKey::StringLiteral { span, .. }
            | PropertyKey::NumericLiteral { span, .. }
            | PropertyKey::Computed { span, .. } => span,
        }
    }

    /// The key's name when it is statically known and not private
    pub fn static_name(&self) -> Option<&str> {
        match self {
            PropertyKey::Identifier { name, .. } => Some(name),
            PropertyKey::StringLiteral { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Arrow function body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ArrowFunctionBody {
    /// Expression body
    Expression(Box<Expression>),
    /// Block body
    Block(Vec<Statement>),
}

/// Template literal element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateElement {
    /// Cooked string value
    pub cooked: String,
    /// Is tail element
    pub tail: bool,
}
