//! Words and escapes the lexer recognizes.

use cov_ir::Action;
use cov_value::Var;
use rustc_hash::FxHashMap;

/// Keyword, reserved-literal and escape tables.
///
/// The default table carries every statement keyword, the literals `true`,
/// `false` and `null`, and the usual C escapes.
#[derive(Clone, Debug)]
pub struct Lexicon {
    pub actions: FxHashMap<String, Action>,
    pub reserved: FxHashMap<String, Var>,
    pub escapes: FxHashMap<char, char>,
}

impl Lexicon {
    /// Empty tables: every word is an identifier and no escape is valid.
    pub fn empty() -> Self {
        Lexicon {
            actions: FxHashMap::default(),
            reserved: FxHashMap::default(),
            escapes: FxHashMap::default(),
        }
    }

    pub fn action(&self, word: &str) -> Option<Action> {
        self.actions.get(word).copied()
    }

    pub fn reserved(&self, word: &str) -> Option<&Var> {
        self.reserved.get(word)
    }

    pub fn escape(&self, ch: char) -> Option<char> {
        self.escapes.get(&ch).copied()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        let actions = Action::ALL
            .iter()
            .map(|&action| (action.keyword().to_owned(), action))
            .collect();
        let reserved = [
            ("true", Var::make(true)),
            ("false", Var::make(false)),
            ("null", Var::null()),
        ]
        .into_iter()
        .map(|(word, value)| (word.to_owned(), value))
        .collect();
        let escapes = [
            ('a', '\u{7}'),
            ('b', '\u{8}'),
            ('f', '\u{c}'),
            ('n', '\n'),
            ('r', '\r'),
            ('t', '\t'),
            ('v', '\u{b}'),
            ('0', '\0'),
            ('\\', '\\'),
            ('\'', '\''),
            ('"', '"'),
        ]
        .into_iter()
        .collect();
        Lexicon {
            actions,
            reserved,
            escapes,
        }
    }
}
