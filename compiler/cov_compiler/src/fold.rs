//! Operator semantics shared by constant folding and evaluation.

use cov_ir::Signal;
use cov_value::{InternalError, Pair, Result, RuntimeError, Var, VarBorrower};

/// Boolean value of a condition operand.
pub fn truthy(value: &Var) -> Result<bool> {
    match value.const_val::<bool>() {
        Ok(flag) => Ok(*flag),
        Err(_) => Err(RuntimeError::type_mismatch(value.type_name(), "boolean").into()),
    }
}

/// Apply a non-assigning binary operator to two evaluated operands.
///
/// `&&` and `||` here see both operands; short-circuiting is the
/// caller's job.
pub fn apply_binary(signal: Signal, lhs: &Var, rhs: &Var) -> Result<Var> {
    match signal {
        Signal::Add => lhs.add(rhs),
        Signal::Sub => lhs.sub(rhs),
        Signal::Mul => lhs.mul(rhs),
        Signal::Div => lhs.div(rhs),
        Signal::Mod => lhs.rem(rhs),
        Signal::Pow => lhs.pow(rhs),
        Signal::Und => lhs.undcmp(rhs).map(Var::make),
        Signal::Abo => lhs.abocmp(rhs).map(Var::make),
        Signal::Ueq => lhs.ueqcmp(rhs).map(Var::make),
        Signal::Aeq => lhs.aepcmp(rhs).map(Var::make),
        Signal::Equ => Ok(Var::make(lhs.compare(rhs))),
        Signal::Neq => Ok(Var::make(!lhs.compare(rhs))),
        Signal::And => Ok(Var::make(truthy(lhs)? && truthy(rhs)?)),
        Signal::Or => Ok(Var::make(truthy(lhs)? || truthy(rhs)?)),
        Signal::Pair => Ok(Var::make::<Pair>((lhs.clone(), rhs.clone()))),
        other => Err(InternalError::new(format!("\"{other}\" is not a binary operator.")).into()),
    }
}

/// Apply a prefix operator that produces a fresh value.
pub fn apply_unary(signal: Signal, operand: &Var) -> Result<Var> {
    match signal {
        Signal::Minus => operand.minus(),
        Signal::Not => Ok(Var::make(!truthy(operand)?)),
        Signal::Escape => operand.escape().map(VarBorrower::into_owned),
        other => Err(InternalError::new(format!("\"{other}\" is not a unary operator.")).into()),
    }
}

/// Binary operator behind a compound assignment.
pub fn compound_operator(signal: Signal) -> Option<Signal> {
    Some(match signal {
        Signal::AddAsi => Signal::Add,
        Signal::SubAsi => Signal::Sub,
        Signal::MulAsi => Signal::Mul,
        Signal::DivAsi => Signal::Div,
        Signal::ModAsi => Signal::Mod,
        Signal::PowAsi => Signal::Pow,
        _ => return None,
    })
}

/// Whether [`apply_binary`] folds `signal` when both operands are literal.
pub fn is_foldable_binary(signal: Signal) -> bool {
    matches!(
        signal,
        Signal::Add
            | Signal::Sub
            | Signal::Mul
            | Signal::Div
            | Signal::Mod
            | Signal::Pow
            | Signal::Und
            | Signal::Abo
            | Signal::Ueq
            | Signal::Aeq
            | Signal::Equ
            | Signal::Neq
            | Signal::And
            | Signal::Or
            | Signal::Pair
    )
}
