//! The AST node model.
//!
//! A node is a kind tag plus an ordered list of owned children. Ownership
//! is the attachment rule: a child is moved into its parent's vector and
//! can never be shared between two parents. Productions that fail simply
//! drop the nodes they built.
//!
//! Several kinds use fixed child positions, documented on the variant.
//! The `left`/`right` accessors mirror the first two children, which is
//! how binary operators and member accesses are navigated.

use crate::token_kind::TokenKind;
use crate::types::{Attributes, LangLevel, Mode, TokenGroups, VarKind};
use escript_core::intern::InternedString;
use escript_core::value::Value;
use std::sync::Arc;

/// A possibly namespace-qualified name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName {
    pub name: InternedString,
    pub space: Option<InternedString>,
}

impl QName {
    pub fn new(name: InternedString) -> Self {
        Self { name, space: None }
    }

    pub fn qualified(name: InternedString, space: InternedString) -> Self {
        Self {
            name,
            space: Some(space),
        }
    }
}

/// Source provenance recorded on every node for diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceLoc {
    pub filename: Option<Arc<str>>,
    /// 1-based line number, zero when unknown.
    pub line_number: u32,
    /// 0-based column.
    pub column: usize,
    /// Snapshot of the source line the node started on.
    pub current_line: Option<Arc<str>>,
}

/// Which form a `this` expression takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThisKind {
    Default,
    Callee,
    Generator,
    Function,
    Type,
}

/// Case label kind inside a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseKind {
    Case,
    Default,
}

/// Object literal field kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `name: expr`
    Value,
    /// `get name() {...}`, field value is a reference to the hoisted
    /// accessor function.
    Get,
    /// `set name() {...}`
    Set,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub kind: FieldKind,
    /// Declared with a `const` prefix.
    pub const_field: bool,
}

/// Signature details carried by a function node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionInfo {
    pub getter: bool,
    pub setter: bool,
    pub is_method: bool,
    pub is_constructor: bool,
    /// Synthesized because the class declared no constructor.
    pub is_default_constructor: bool,
    /// Overloaded operator name, e.g. `+` for `function + (...)`.
    pub operator: Option<String>,
    /// The last parameter is a `...rest` parameter.
    pub has_rest: bool,
    /// Function expression rather than declaration.
    pub expression: bool,
    /// The declared result type may be null (`:Type?` style nullability
    /// is recorded here, not in the type node).
    pub nullable_result: bool,
}

/// Class and interface details.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassInfo {
    pub is_interface: bool,
    pub extends: Option<QName>,
    /// Set when the class body declared its own constructor.
    pub has_constructor: bool,
}

/// `use strict` / `use standard` / `use lang` pragma payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PragmaKind {
    Mode(Mode),
    Lang(LangLevel),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Root of a compilation. Children: one module per compiled unit.
    Program,
    /// Module wrapper. Name in `qname`; `default_module` when it is the
    /// synthesized anonymous module. Children: `[Block]`.
    Module { default_module: bool },
    /// Lexical block. Children: `[Directives]`, possibly with a loop
    /// node appended after for `let`-scoped loop variables.
    Block,
    /// Ordered directive list.
    Directives,
    /// Qualified name reference; the name lives in `qname`. `attribute`
    /// marks `@name` forms. An expression qualifier or computed name is
    /// carried as the only child.
    Name { attribute: bool },
    /// Literal value.
    Literal(Value),
    /// Object literal. Children: `[type name, field...]`.
    ObjectLiteral,
    /// Object literal field. Children: `[field name, value]`.
    Field(FieldInfo),
    /// Array literal. Children: `[type name, Expressions]` where the
    /// expressions are the synthesized indexed assignments.
    ArrayLiteral,
    /// Assignment. Children: `[lhs, rhs]`.
    AssignOp,
    /// Binary operator. Children: `[left, right]`.
    BinaryOp(TokenKind),
    /// Type test or conversion operator (`cast`, `is`, `like`,
    /// `instanceof`). Children: `[expr, type]`.
    BinaryTypeOp(TokenKind),
    /// Prefix unary operator. Children: `[operand]`.
    UnaryOp(TokenKind),
    /// Postfix `++`/`--`. Children: `[operand]`.
    PostfixOp(TokenKind),
    /// Comma-joined expression list.
    Expressions,
    /// Children: `[cond, then]` or `[cond, then, else]`.
    If,
    /// C-style for. Children: `[init, cond, incr, body]` with `Nop`
    /// placeholders for omitted clauses.
    For,
    /// for-in / for-each-in. Children: `[iter var, iter get call, body]`.
    ForIn { each: bool },
    /// Children: `[cond, body]`.
    While,
    /// Children: `[body, cond]`.
    Do,
    /// Children: `[expr, CaseElements]`.
    Switch,
    CaseElements,
    /// Children: `[case expr, Directives]` for `Case`, `[Directives]`
    /// for `Default`.
    CaseLabel(CaseKind),
    /// Optional label in `qname`.
    Break,
    /// Optional label in `qname`.
    Continue,
    /// Children: `[expr]` when a value is returned.
    Return { has_value: bool },
    /// Children: `[try Block, CatchClauses]` plus a trailing finally
    /// `Block` when present.
    Try { has_finally: bool },
    CatchClauses,
    /// One catch clause. Children: `[Block]`. A declared catch parameter
    /// becomes an assignment from `CatchArg` at the front of the block.
    Catch,
    /// Placeholder for the caught exception value.
    CatchArg,
    /// Children: `[expr]`.
    Throw,
    /// Children: `[callee, Args]`.
    Call,
    Args,
    /// Member access, `.` or `..` by the creating token. Children:
    /// `[left, right]`.
    Dot,
    /// Children: `[constructor expr]`. A bare `new X` gets a synthesized
    /// empty-argument `Call` so constructor invocations are uniform.
    New,
    /// Children: `[Args]` when called with arguments.
    Super,
    /// Reference to the literal object currently under construction;
    /// used by array literal element assignments.
    Ref,
    This(ThisKind),
    /// Variable definition. Children: one name or assignment per
    /// declared variable. The declaring namespace is in `qname.space`.
    VarDefinition(VarKind),
    /// Function definition or expression. Name in `qname`. Children:
    /// `[Args (parameters), result type, body Directives]`; the body is
    /// absent for bodyless native/interface functions.
    Function(FunctionInfo),
    /// Class or interface. Name in `qname`. Children:
    /// `[TypeIdentifiers (implements), body Directives]`.
    Class(ClassInfo),
    /// List of type names (implements clause).
    TypeIdentifiers,
    Pragmas,
    Pragma(PragmaKind),
    /// `use module`. Module name in `qname`.
    UseModule,
    /// `use namespace` / `use default namespace` / module namespace
    /// injection. Namespace in `qname`.
    UseNamespace { is_default: bool, literal: bool },
    /// `# expr` conditional directive. Children: `[Directives]`.
    Hash { condition: String },
    /// Children: `[object, Block]`.
    With,
    /// Empty statement or omitted clause placeholder.
    Nop,
}

/// One AST node: a kind, owned children, and shared bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
    /// Definition or reference name, when the kind carries one.
    pub qname: Option<QName>,
    /// Merged declaration attributes.
    pub attributes: Attributes,
    /// Token that created this node, with its classification.
    pub token: Option<TokenKind>,
    pub groups: TokenGroups,
    pub sub: Option<TokenKind>,
    pub loc: SourceLoc,
    /// Doc comment attached to this declaration, when capture is on.
    pub doc: Option<String>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            qname: None,
            attributes: Attributes::NONE,
            token: None,
            groups: TokenGroups::NONE,
            sub: None,
            loc: SourceLoc::default(),
            doc: None,
        }
    }

    /// Attach a child, transferring ownership.
    pub fn append(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Attach a child at the front of the child list. Used for injected
    /// namespace nodes and catch parameter bindings.
    pub fn prepend(&mut self, child: Node) {
        self.children.insert(0, child);
    }

    /// Detach and return the first child.
    pub fn remove_left(&mut self) -> Option<Node> {
        if self.children.is_empty() {
            None
        } else {
            Some(self.children.remove(0))
        }
    }

    pub fn left(&self) -> Option<&Node> {
        self.children.first()
    }

    pub fn right(&self) -> Option<&Node> {
        self.children.get(1)
    }

    pub fn left_mut(&mut self) -> Option<&mut Node> {
        self.children.first_mut()
    }

    pub fn right_mut(&mut self) -> Option<&mut Node> {
        self.children.get_mut(1)
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    pub fn is_kind(&self, kind: &NodeKind) -> bool {
        std::mem::discriminant(&self.kind) == std::mem::discriminant(kind)
    }

    /// The literal value, for literal nodes.
    pub fn value(&self) -> Option<&Value> {
        match &self.kind {
            NodeKind::Literal(v) => Some(v),
            _ => None,
        }
    }

    /// The function signature details, for function nodes.
    pub fn function(&self) -> Option<&FunctionInfo> {
        match &self.kind {
            NodeKind::Function(info) => Some(info),
            _ => None,
        }
    }

    pub fn function_mut(&mut self) -> Option<&mut FunctionInfo> {
        match &mut self.kind {
            NodeKind::Function(info) => Some(info),
            _ => None,
        }
    }

    pub fn class(&self) -> Option<&ClassInfo> {
        match &self.kind {
            NodeKind::Class(info) => Some(info),
            _ => None,
        }
    }

    /// Depth-first preorder walk.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_left_right_mirror_first_children() {
        let mut op = Node::new(NodeKind::BinaryOp(TokenKind::Plus));
        op.append(Node::new(NodeKind::Literal(Value::Number(1.0))));
        op.append(Node::new(NodeKind::Literal(Value::Number(2.0))));
        assert_eq!(op.left().unwrap().value(), Some(&Value::Number(1.0)));
        assert_eq!(op.right().unwrap().value(), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_prepend_puts_child_first() {
        let mut block = Node::new(NodeKind::Directives);
        block.append(Node::new(NodeKind::Nop));
        block.prepend(Node::new(NodeKind::UseNamespace {
            is_default: true,
            literal: false,
        }));
        assert!(matches!(
            block.left().unwrap().kind,
            NodeKind::UseNamespace { .. }
        ));
    }

    #[test]
    fn test_walk_visits_all_nodes() {
        let mut root = Node::new(NodeKind::Directives);
        let mut inner = Node::new(NodeKind::Expressions);
        inner.append(Node::new(NodeKind::Nop));
        root.append(inner);
        let mut count = 0;
        root.walk(&mut |_| count += 1);
        assert_eq!(count, 3);
    }
}
