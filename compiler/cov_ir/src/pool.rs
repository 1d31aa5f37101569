//! Token pool.
//!
//! Every token of a compilation unit is allocated here and addressed by
//! [`TokenId`]. Tokens never move, so ids held by lines and trees stay valid
//! until the pool is collected or rolled back past them.

use crate::{Token, TokenId, TokenKind, TokenTag};

/// Position in the pool, used to undo a failed unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PoolMark(usize);

#[derive(Debug, Default)]
pub struct TokenPool {
    tokens: Vec<Token>,
}

impl TokenPool {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "a unit never holds u32::MAX tokens"
    )]
    pub fn alloc(&mut self, kind: TokenKind, line: usize) -> TokenId {
        let id = TokenId::new(self.tokens.len() as u32);
        self.tokens.push(Token::new(kind, line));
        id
    }

    pub fn try_get(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(id.index())
    }

    /// # Panics
    ///
    /// Panics if `id` was not allocated by this pool.
    pub fn get(&self, id: TokenId) -> &Token {
        &self.tokens[id.index()]
    }

    /// # Panics
    ///
    /// Panics if `id` was not allocated by this pool.
    pub fn get_mut(&mut self, id: TokenId) -> &mut Token {
        &mut self.tokens[id.index()]
    }

    pub fn tag(&self, id: TokenId) -> Option<TokenTag> {
        self.try_get(id).map(Token::tag)
    }

    pub fn kind(&self, id: TokenId) -> Option<&TokenKind> {
        self.try_get(id).map(|token| &token.kind)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn mark(&self) -> PoolMark {
        PoolMark(self.tokens.len())
    }

    /// Free every token allocated after `mark`.
    pub fn rollback(&mut self, mark: PoolMark) {
        self.tokens.truncate(mark.0);
    }

    /// Free every token; returns how many were released.
    pub fn collect(&mut self) -> usize {
        let count = self.tokens.len();
        self.tokens.clear();
        count
    }
}
