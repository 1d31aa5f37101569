//! Operator precedence and associativity tables.

use cov_ir::{Signal, TokenId, TokenKind, TokenPool};
use cov_lexer::Lexicon;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::CompileError;

/// Binding strength of each signal (higher binds tighter), the set of
/// left-associative signals, and the lexer's word tables.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    pub levels: FxHashMap<Signal, u8>,
    pub left_associative: FxHashSet<Signal>,
    pub lexicon: Lexicon,
}

impl SymbolTable {
    pub fn level(&self, signal: Signal) -> Option<u8> {
        self.levels.get(&signal).copied()
    }

    pub fn is_left_associative(&self, signal: Signal) -> bool {
        self.left_associative.contains(&signal)
    }

    fn signal_of(pool: &TokenPool, id: TokenId) -> Result<Signal, CompileError> {
        match pool.kind(id) {
            None => Err(CompileError::new("Get the level of null token.")),
            Some(TokenKind::Signal(signal)) => Ok(*signal),
            Some(_) => Err(CompileError::new("Get the level of non-signal token.")),
        }
    }

    /// Level of the signal token `id`.
    pub fn signal_level(&self, pool: &TokenPool, id: TokenId) -> Result<u8, CompileError> {
        let signal = Self::signal_of(pool, id)?;
        self.level(signal)
            .ok_or_else(|| CompileError::new(format!("Signal \"{signal}\" has no level.")))
    }

    /// Associativity of the signal token `id`.
    pub fn token_left_associative(
        &self,
        pool: &TokenPool,
        id: TokenId,
    ) -> Result<bool, CompileError> {
        Self::signal_of(pool, id).map(|signal| self.is_left_associative(signal))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        use Signal::{
            Abo, Access, Add, AddAsi, Addr, Aeq, And, Arrow, Asi, Choice, Com, Dec, Div, DivAsi,
            Dot, Equ, Escape, Fcall, Inc, LnkAsi, Minus, Mod, ModAsi, Mul, MulAsi, Neq, Not, Or,
            Pair, Pow, PowAsi, Sub, SubAsi, Ueq, Und,
        };
        let groups: [(u8, &[Signal]); 14] = [
            (0, &[Com]),
            (1, &[Asi, AddAsi, SubAsi, MulAsi, DivAsi, ModAsi, PowAsi, LnkAsi]),
            (2, &[Choice]),
            (3, &[Pair]),
            (4, &[Or]),
            (5, &[And]),
            (6, &[Equ, Neq]),
            (7, &[Und, Abo, Ueq, Aeq]),
            (8, &[Add, Sub]),
            (9, &[Mul, Div, Mod]),
            (10, &[Pow]),
            (11, &[Minus, Escape, Addr, Not]),
            (12, &[Inc, Dec]),
            (13, &[Dot, Arrow, Fcall, Access]),
        ];
        let levels = groups
            .iter()
            .flat_map(|&(level, signals)| signals.iter().map(move |&s| (s, level)))
            .collect();
        let left_associative = [
            Com, Pair, Or, And, Equ, Neq, Und, Abo, Ueq, Aeq, Add, Sub, Mul, Div, Mod, Dot, Arrow,
            Fcall, Access,
        ]
        .into_iter()
        .collect();
        SymbolTable {
            levels,
            left_associative,
            lexicon: Lexicon::default(),
        }
    }
}
