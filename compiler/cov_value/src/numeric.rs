//! Script numbers: a 64-bit integer or a float.
//!
//! # Promotion
//!
//! Two integers stay integer; any float operand promotes the result to
//! float. Integer division stays integer only when exact, so `7 / 2` is
//! `3.5` while `8 / 2` is `4`. Integer division or modulo by zero raises
//! `Divide by zero.`; float division follows IEEE.

use std::cmp::Ordering;
use std::fmt;

use crate::errors::{LangError, Result, RuntimeError};
use crate::script_type::ScriptType;
use crate::var::Var;

#[derive(Clone, Copy, Debug)]
pub enum Numeric {
    Integer(i64),
    Float(f64),
}

impl Default for Numeric {
    fn default() -> Self {
        Numeric::Integer(0)
    }
}

#[allow(
    clippy::should_implement_trait,
    reason = "division is fallible, so the arithmetic set stays inherent"
)]
impl Numeric {
    pub fn is_integer(self) -> bool {
        matches!(self, Numeric::Integer(_))
    }

    pub fn is_float(self) -> bool {
        matches!(self, Numeric::Float(_))
    }

    /// Truncates floats toward zero.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "script integer conversion truncates"
    )]
    pub fn as_integer(self) -> i64 {
        match self {
            Numeric::Integer(value) => value,
            Numeric::Float(value) => value as i64,
        }
    }

    #[allow(clippy::cast_precision_loss, reason = "script float conversion")]
    pub fn as_float(self) -> f64 {
        match self {
            Numeric::Integer(value) => value as f64,
            Numeric::Float(value) => value,
        }
    }

    pub fn add(self, rhs: Numeric) -> Numeric {
        match (self, rhs) {
            (Numeric::Integer(a), Numeric::Integer(b)) => Numeric::Integer(a.wrapping_add(b)),
            _ => Numeric::Float(self.as_float() + rhs.as_float()),
        }
    }

    pub fn sub(self, rhs: Numeric) -> Numeric {
        match (self, rhs) {
            (Numeric::Integer(a), Numeric::Integer(b)) => Numeric::Integer(a.wrapping_sub(b)),
            _ => Numeric::Float(self.as_float() - rhs.as_float()),
        }
    }

    pub fn mul(self, rhs: Numeric) -> Numeric {
        match (self, rhs) {
            (Numeric::Integer(a), Numeric::Integer(b)) => Numeric::Integer(a.wrapping_mul(b)),
            _ => Numeric::Float(self.as_float() * rhs.as_float()),
        }
    }

    pub fn div(self, rhs: Numeric) -> Result<Numeric, RuntimeError> {
        match (self, rhs) {
            (Numeric::Integer(_), Numeric::Integer(0)) => Err(RuntimeError::divide_by_zero()),
            (Numeric::Integer(a), Numeric::Integer(b)) => {
                match (a.checked_div(b), a.checked_rem(b)) {
                    (Some(quot), Some(0)) => Ok(Numeric::Integer(quot)),
                    _ => Ok(Numeric::Float(self.as_float() / rhs.as_float())),
                }
            }
            _ => Ok(Numeric::Float(self.as_float() / rhs.as_float())),
        }
    }

    pub fn rem(self, rhs: Numeric) -> Result<Numeric, RuntimeError> {
        match (self, rhs) {
            (Numeric::Integer(_), Numeric::Integer(0)) => Err(RuntimeError::divide_by_zero()),
            (Numeric::Integer(a), Numeric::Integer(b)) => {
                Ok(Numeric::Integer(a.checked_rem(b).unwrap_or(0)))
            }
            _ => Ok(Numeric::Float(self.as_float() % rhs.as_float())),
        }
    }

    /// Integer powers with a non-negative exponent stay integer unless they
    /// overflow.
    pub fn pow(self, rhs: Numeric) -> Numeric {
        if let (Numeric::Integer(base), Numeric::Integer(exp)) = (self, rhs) {
            if let Some(value) = u32::try_from(exp).ok().and_then(|exp| base.checked_pow(exp)) {
                return Numeric::Integer(value);
            }
        }
        Numeric::Float(self.as_float().powf(rhs.as_float()))
    }

    pub fn negate(self) -> Numeric {
        match self {
            Numeric::Integer(value) => Numeric::Integer(value.wrapping_neg()),
            Numeric::Float(value) => Numeric::Float(-value),
        }
    }

    pub fn increment(&mut self) {
        *self = self.add(Numeric::Integer(1));
    }

    pub fn decrement(&mut self) {
        *self = self.sub(Numeric::Integer(1));
    }
}

impl From<i64> for Numeric {
    fn from(value: i64) -> Self {
        Numeric::Integer(value)
    }
}

impl From<i32> for Numeric {
    fn from(value: i32) -> Self {
        Numeric::Integer(i64::from(value))
    }
}

impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        Numeric::Float(value)
    }
}

/// The integer a whole, in-range float stands for exactly.
#[allow(clippy::cast_possible_truncation, reason = "range checked before the cast")]
fn exact_integer(value: f64) -> Option<i64> {
    // -2^63 is representable; 2^63 is the first float past i64::MAX.
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    (value.fract() == 0.0 && (-BOUND..BOUND).contains(&value)).then(|| value as i64)
}

#[allow(clippy::cast_precision_loss, reason = "ties are resolved exactly")]
fn compare_mixed(int: i64, float: f64) -> Option<Ordering> {
    if let Some(whole) = exact_integer(float) {
        return Some(int.cmp(&whole));
    }
    match (int as f64).partial_cmp(&float)? {
        // Only 2^63 rounds onto an integer it does not equal.
        Ordering::Equal => Some(Ordering::Less),
        other => Some(other),
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Numeric {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (*self, *other) {
            (Numeric::Integer(a), Numeric::Integer(b)) => Some(a.cmp(&b)),
            (Numeric::Float(a), Numeric::Float(b)) => a.partial_cmp(&b),
            (Numeric::Integer(a), Numeric::Float(b)) => compare_mixed(a, b),
            (Numeric::Float(a), Numeric::Integer(b)) => {
                compare_mixed(b, a).map(Ordering::reverse)
            }
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Integer(value) => write!(f, "{value}"),
            Numeric::Float(value) => write!(f, "{value}"),
        }
    }
}

impl ScriptType for Numeric {
    fn type_name() -> &'static str {
        "number"
    }

    fn to_integer(&self) -> Result<i64, LangError> {
        Ok(self.as_integer())
    }

    fn stringify(&self) -> String {
        self.to_string()
    }

    /// Whole floats hash like the equal integer.
    #[allow(clippy::cast_sign_loss, reason = "hash codes reinterpret bits")]
    fn hash_code(&self) -> Result<u64, LangError> {
        Ok(match *self {
            Numeric::Integer(value) => value as u64,
            Numeric::Float(value) => match exact_integer(value) {
                Some(whole) => whole as u64,
                None => value.to_bits(),
            },
        })
    }

    fn equals(&self, other: &Self) -> bool {
        self == other
    }

    fn op_add(&self, rhs: &Self) -> Result<Var> {
        Ok(Var::make(self.add(*rhs)))
    }

    fn op_sub(&self, rhs: &Self) -> Result<Var> {
        Ok(Var::make(self.sub(*rhs)))
    }

    fn op_mul(&self, rhs: &Self) -> Result<Var> {
        Ok(Var::make(self.mul(*rhs)))
    }

    fn op_div(&self, rhs: &Self) -> Result<Var> {
        Ok(Var::make(self.div(*rhs)?))
    }

    fn op_mod(&self, rhs: &Self) -> Result<Var> {
        Ok(Var::make(self.rem(*rhs)?))
    }

    fn op_pow(&self, rhs: &Self) -> Result<Var> {
        Ok(Var::make(self.pow(*rhs)))
    }

    fn op_minus(&self) -> Result<Var> {
        Ok(Var::make(self.negate()))
    }

    fn op_selfinc(&mut self) -> Result<()> {
        self.increment();
        Ok(())
    }

    fn op_selfdec(&mut self) -> Result<()> {
        self.decrement();
        Ok(())
    }

    fn op_abocmp(&self, rhs: &Self) -> Result<bool> {
        Ok(self > rhs)
    }

    fn op_undcmp(&self, rhs: &Self) -> Result<bool> {
        Ok(self < rhs)
    }

    fn op_aepcmp(&self, rhs: &Self) -> Result<bool> {
        Ok(self >= rhs)
    }

    fn op_ueqcmp(&self, rhs: &Self) -> Result<bool> {
        Ok(self <= rhs)
    }
}

#[cfg(test)]
mod tests;
