//! The operator surface every script type dispatches through.

use std::fmt;

/// Operator kinds routed through a value's dispatch table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Minus,
    Escape,
    SelfInc,
    SelfDec,
    Compare,
    AboCmp,
    UndCmp,
    AepCmp,
    UeqCmp,
    Index,
    Access,
    Arrow,
    Call,
}

impl Operator {
    pub const ALL: [Operator; 19] = [
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Mod,
        Operator::Pow,
        Operator::Minus,
        Operator::Escape,
        Operator::SelfInc,
        Operator::SelfDec,
        Operator::Compare,
        Operator::AboCmp,
        Operator::UndCmp,
        Operator::AepCmp,
        Operator::UeqCmp,
        Operator::Index,
        Operator::Access,
        Operator::Arrow,
        Operator::Call,
    ];

    /// Form used in "does not support" messages.
    pub const fn display_form(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Pow => "^",
            Operator::Minus => "-val",
            Operator::Escape => "*val",
            Operator::SelfInc => "++",
            Operator::SelfDec => "--",
            Operator::Compare => "==",
            Operator::AboCmp => ">",
            Operator::UndCmp => "<",
            Operator::AepCmp => ">=",
            Operator::UeqCmp => "<=",
            Operator::Index => "data[index]",
            Operator::Access => "data.member",
            Operator::Arrow => "data->member",
            Operator::Call => "func(...)",
        }
    }

    /// Binary arithmetic operators producing a new value.
    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Operator::Add
                | Operator::Sub
                | Operator::Mul
                | Operator::Div
                | Operator::Mod
                | Operator::Pow
        )
    }

    /// Binary operators producing a boolean.
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::Compare
                | Operator::AboCmp
                | Operator::UndCmp
                | Operator::AepCmp
                | Operator::UeqCmp
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_form())
    }
}
