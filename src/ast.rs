//! The abstract syntax tree (spec §3): ~25 node kinds, each carrying the
//! source span that produced it so errors can point an arrow at it.

use std::rc::Rc;

use smartstring::alias::String as SmartString;

use crate::token::Position;
use crate::value::Number;

/// A parsed construct's body: either a single inline expression, or a
/// `chau`-terminated block of statements (§4.2's block convention).
#[derive(Debug, Clone)]
pub struct Body {
    pub node: Box<Node>,
    pub is_block: bool,
}

impl Body {
    pub fn inline(node: Node) -> Self {
        Self { node: Box::new(node), is_block: false }
    }

    pub fn block(statements: Vec<Node>, pos_start: Position, pos_end: Position) -> Self {
        Self { node: Box::new(Node::new(NodeKind::Statements(statements), pos_start, pos_end)), is_block: true }
    }
}

/// One `si`/`osi` branch: `(condition, body)`.
#[derive(Debug, Clone)]
pub struct IfCase {
    pub condition: Node,
    pub body: Body,
}

/// A function/method parameter: name plus an optional pre-evaluated default.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: SmartString,
    pub default: Option<Node>,
}

#[derive(Debug, Clone)]
pub struct DictPair {
    pub key: Node,
    pub value: Node,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Number(Number),
    Str(Rc<str>),
    List(Vec<Node>),
    Dict(Vec<DictPair>),

    VarAccess(SmartString),
    VarAssign(SmartString, Box<Node>),
    Reassign(SmartString, Box<Node>),

    BinOp(Box<Node>, SmartString, Box<Node>),
    UnaryOp(SmartString, Box<Node>),

    If {
        cases: Vec<IfCase>,
        else_case: Option<Body>,
    },
    For {
        var_name: SmartString,
        start: Box<Node>,
        end: Box<Node>,
        step: Option<Box<Node>>,
        body: Body,
    },
    While {
        condition: Box<Node>,
        body: Body,
    },

    FuncDef {
        name: Option<SmartString>,
        params: Vec<Param>,
        body: Box<Node>,
        auto_return: bool,
        is_method: bool,
    },
    Call {
        callee: Box<Node>,
        args: Vec<Node>,
    },

    ClassDef {
        name: SmartString,
        methods: Vec<Node>,
        parent: Option<SmartString>,
    },
    InstanceNew {
        class_name: SmartString,
        args: Vec<Node>,
    },
    MethodCall {
        receiver: Box<Node>,
        access_chain: Vec<SmartString>,
        method: SmartString,
        args: Vec<Node>,
    },
    InstanceVarAccess {
        receiver: Box<Node>,
        access_chain: Vec<SmartString>,
    },
    InstanceVarAssign {
        receiver: Box<Node>,
        name: SmartString,
        value: Box<Node>,
    },
    InstanceVarAccessAndAssign {
        receiver: Box<Node>,
        access_chain: Vec<SmartString>,
        value: Box<Node>,
    },

    Return(Option<Box<Node>>),
    Continue,
    Break,

    Import(SmartString),

    Try {
        try_body: Box<Node>,
        error_tag: SmartString,
        except_body: Box<Node>,
    },
    Raise {
        error_tag: SmartString,
        message: Box<Node>,
    },

    /// A sequence of statements evaluated top-to-bottom; the program root
    /// and every block body are one of these.
    Statements(Vec<Node>),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub pos_start: Position,
    pub pos_end: Position,
}

impl Node {
    pub fn new(kind: NodeKind, pos_start: Position, pos_end: Position) -> Self {
        Self { kind, pos_start, pos_end }
    }
}
