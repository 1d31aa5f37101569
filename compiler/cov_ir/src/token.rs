//! Token types shared by the lexer, the compiler and the runtime.
//!
//! A token line is a flat `Vec<TokenId>` into the unit's [`TokenPool`];
//! bracketed groups and parsed expressions are themselves tokens, so a
//! statement is always one flat line of tokens regardless of nesting.
//!
//! [`TokenPool`]: crate::TokenPool

use std::fmt;
use std::hash::{Hash, Hasher};

use cov_value::Var;

use crate::BinaryTree;

/// Index of a token in a [`TokenPool`](crate::TokenPool).
#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TokenId(u32);

impl TokenId {
    /// Placeholder for "no token", used for unary operand positions.
    pub const INVALID: TokenId = TokenId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        TokenId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl Hash for TokenId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "TokenId({})", self.0)
        } else {
            write!(f, "TokenId::INVALID")
        }
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// One statement's worth of tokens.
pub type TokenLine = Vec<TokenId>;

/// Expression tree over pooled tokens.
pub type ExprTree = BinaryTree<TokenId>;

/// Operators and punctuation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Signal {
    Add,
    AddAsi,
    Sub,
    SubAsi,
    /// Unary `-`.
    Minus,
    Mul,
    MulAsi,
    /// Unary `*`.
    Escape,
    Div,
    DivAsi,
    Mod,
    ModAsi,
    Pow,
    PowAsi,
    Dot,
    Arrow,
    /// `(` following an operand.
    Fcall,
    /// `[` following an operand.
    Access,
    /// Unary `&`.
    Addr,
    Und,
    Abo,
    Ueq,
    Aeq,
    Equ,
    Neq,
    Asi,
    LnkAsi,
    And,
    Or,
    Not,
    Inc,
    Dec,
    Pair,
    Choice,
    Com,
    Slb,
    Srb,
    Mlb,
    Mrb,
    Llb,
    Lrb,
}

impl Signal {
    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Add => "+",
            Signal::AddAsi => "+=",
            Signal::Sub => "-",
            Signal::SubAsi => "-=",
            Signal::Minus => "-val",
            Signal::Mul => "*",
            Signal::MulAsi => "*=",
            Signal::Escape => "*val",
            Signal::Div => "/",
            Signal::DivAsi => "/=",
            Signal::Mod => "%",
            Signal::ModAsi => "%=",
            Signal::Pow => "^",
            Signal::PowAsi => "^=",
            Signal::Dot => ".",
            Signal::Arrow => "->",
            Signal::Fcall => "fcall",
            Signal::Access => "access",
            Signal::Addr => "&",
            Signal::Und => "<",
            Signal::Abo => ">",
            Signal::Ueq => "<=",
            Signal::Aeq => ">=",
            Signal::Equ => "==",
            Signal::Neq => "!=",
            Signal::Asi => "=",
            Signal::LnkAsi => ":=",
            Signal::And => "&&",
            Signal::Or => "||",
            Signal::Not => "!",
            Signal::Inc => "++",
            Signal::Dec => "--",
            Signal::Pair => ":",
            Signal::Choice => "?",
            Signal::Com => ",",
            Signal::Slb => "(",
            Signal::Srb => ")",
            Signal::Mlb => "[",
            Signal::Mrb => "]",
            Signal::Llb => "{",
            Signal::Lrb => "}",
        }
    }

    /// Opening bracket signals.
    pub fn is_open_bracket(self) -> bool {
        matches!(
            self,
            Signal::Slb | Signal::Mlb | Signal::Llb | Signal::Fcall | Signal::Access
        )
    }

    pub fn is_close_bracket(self) -> bool {
        matches!(self, Signal::Srb | Signal::Mrb | Signal::Lrb)
    }

    /// Prefix operators that take no left operand.
    pub fn is_prefix(self) -> bool {
        matches!(
            self,
            Signal::Minus | Signal::Escape | Signal::Addr | Signal::Not
        )
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statement keywords.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Action {
    Import,
    Package,
    Using,
    Namespace,
    Struct,
    Class,
    Extends,
    Function,
    Override,
    Return,
    If,
    Else,
    Switch,
    Case,
    Default,
    While,
    Until,
    Loop,
    For,
    Foreach,
    In,
    Do,
    Break,
    Continue,
    Block,
    End,
    Try,
    Catch,
    Throw,
    Var,
    Constant,
    Link,
}

impl Action {
    pub const ALL: [Action; 32] = [
        Action::Import,
        Action::Package,
        Action::Using,
        Action::Namespace,
        Action::Struct,
        Action::Class,
        Action::Extends,
        Action::Function,
        Action::Override,
        Action::Return,
        Action::If,
        Action::Else,
        Action::Switch,
        Action::Case,
        Action::Default,
        Action::While,
        Action::Until,
        Action::Loop,
        Action::For,
        Action::Foreach,
        Action::In,
        Action::Do,
        Action::Break,
        Action::Continue,
        Action::Block,
        Action::End,
        Action::Try,
        Action::Catch,
        Action::Throw,
        Action::Var,
        Action::Constant,
        Action::Link,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Action::Import => "import",
            Action::Package => "package",
            Action::Using => "using",
            Action::Namespace => "namespace",
            Action::Struct => "struct",
            Action::Class => "class",
            Action::Extends => "extends",
            Action::Function => "function",
            Action::Override => "override",
            Action::Return => "return",
            Action::If => "if",
            Action::Else => "else",
            Action::Switch => "switch",
            Action::Case => "case",
            Action::Default => "default",
            Action::While => "while",
            Action::Until => "until",
            Action::Loop => "loop",
            Action::For => "for",
            Action::Foreach => "foreach",
            Action::In => "in",
            Action::Do => "do",
            Action::Break => "break",
            Action::Continue => "continue",
            Action::Block => "block",
            Action::End => "end",
            Action::Try => "try",
            Action::Catch => "catch",
            Action::Throw => "throw",
            Action::Var => "var",
            Action::Constant => "constant",
            Action::Link => "link",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Token payloads.
#[derive(Clone, Debug)]
pub enum TokenKind {
    Action(Action),
    Signal(Signal),
    Id(String),
    Value(Var),
    Endline,
    /// `( ... )` split on commas.
    Sblist(Vec<TokenLine>),
    /// `[ ... ]` split on commas.
    Mblist(Vec<TokenLine>),
    /// `{ ... }` split on commas.
    Lblist(Vec<TokenLine>),
    Expr(ExprTree),
    /// Call arguments.
    Arglist(Vec<ExprTree>),
    /// Array literal elements.
    Array(Vec<ExprTree>),
    /// Parenthesized comma list outside a call.
    Parallel(Vec<ExprTree>),
}

/// Payload-free discriminant of [`TokenKind`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TokenTag {
    Action,
    Signal,
    Id,
    Value,
    Endline,
    Sblist,
    Mblist,
    Lblist,
    Expr,
    Arglist,
    Array,
    Parallel,
}

impl TokenKind {
    pub fn tag(&self) -> TokenTag {
        match self {
            TokenKind::Action(_) => TokenTag::Action,
            TokenKind::Signal(_) => TokenTag::Signal,
            TokenKind::Id(_) => TokenTag::Id,
            TokenKind::Value(_) => TokenTag::Value,
            TokenKind::Endline => TokenTag::Endline,
            TokenKind::Sblist(_) => TokenTag::Sblist,
            TokenKind::Mblist(_) => TokenTag::Mblist,
            TokenKind::Lblist(_) => TokenTag::Lblist,
            TokenKind::Expr(_) => TokenTag::Expr,
            TokenKind::Arglist(_) => TokenTag::Arglist,
            TokenKind::Array(_) => TokenTag::Array,
            TokenKind::Parallel(_) => TokenTag::Parallel,
        }
    }

    /// Grammar comparison: same tag, and for keywords the same keyword.
    pub fn grammar_eq(&self, other: &TokenKind) -> bool {
        match (self, other) {
            (TokenKind::Action(a), TokenKind::Action(b)) => a == b,
            _ => self.tag() == other.tag(),
        }
    }

    pub fn signal(&self) -> Option<Signal> {
        match self {
            TokenKind::Signal(signal) => Some(*signal),
            _ => None,
        }
    }

    pub fn action(&self) -> Option<Action> {
        match self {
            TokenKind::Action(action) => Some(*action),
            _ => None,
        }
    }

    pub fn is_signal(&self, signal: Signal) -> bool {
        self.signal() == Some(signal)
    }
}

/// A token and the source line it came from (1-based).
#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, line: usize) -> Self {
        Token { kind, line }
    }

    #[inline]
    pub fn tag(&self) -> TokenTag {
        self.kind.tag()
    }
}
