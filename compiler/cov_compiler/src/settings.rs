//! Compiler configuration.

/// How [`Compiler::trim_expression`](crate::Compiler::trim_expression)
/// rewrites a tree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TrimMode {
    /// Inline parenthesized sub-expressions and deduce `this`.
    #[default]
    Normal,
    /// Keep parenthesized sub-expressions as `Expr` leaves.
    NoExprFold,
    /// Skip `this` deduction for member names.
    NoThisDeduce,
}

/// How [`Compiler::optimize_expression`](crate::Compiler::optimize_expression)
/// folds a tree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OptimizeMode {
    /// Fold operators over literal operands.
    #[default]
    Normal,
    /// Also substitute registered constants and fold member access on them.
    EnableNamespace,
}

/// Whether translated statements get optimized expressions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TranslateMode {
    #[default]
    Optimized,
    /// Expressions are kept exactly as built.
    Raw,
}

/// Compiler switches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerSettings {
    /// Never run constant folding.
    pub disable_optimizer: bool,
    /// Inline parenthesized sub-expressions while trimming.
    pub fold_expr: bool,
    pub trim: TrimMode,
    pub optimize: OptimizeMode,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        CompilerSettings {
            disable_optimizer: false,
            fold_expr: true,
            trim: TrimMode::Normal,
            optimize: OptimizeMode::Normal,
        }
    }
}

impl CompilerSettings {
    /// Trim mode after applying `fold_expr`.
    pub fn effective_trim(&self) -> TrimMode {
        if self.fold_expr {
            self.trim
        } else {
            TrimMode::NoExprFold
        }
    }
}
