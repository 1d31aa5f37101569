//! Cov IR - tokens and expression trees
//!
//! This crate holds the data the compiler passes between its phases:
//! - [`Token`]s, addressed by [`TokenId`] in a per-unit [`TokenPool`]
//! - [`BinaryTree`], a parent-linked arena tree used for expressions
//! - [`CsymInfo`] for relocating diagnostics of generated code
//!
//! # Design Philosophy
//!
//! - **Index, don't point**: tokens and tree nodes are arena indices, so
//!   a stale handle is a checked error rather than a dangling pointer.
//! - **Flat lines**: nested brackets and parsed expressions are tokens too.

mod csym;
mod pool;
mod token;
mod tree;

pub use csym::CsymInfo;
pub use pool::{PoolMark, TokenPool};
pub use token::{Action, ExprTree, Signal, Token, TokenId, TokenKind, TokenLine, TokenTag};
pub use tree::{BinaryTree, NodeId, TreeIter};
