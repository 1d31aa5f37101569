//! CovScript values.
//!
//! This crate provides:
//! - `Var`, the small-value-optimized type-erased container
//! - `ScriptType`, the per-type capability table behind it
//! - `Operator` and `Operand`, the operator dispatch surface
//! - `VarBorrower` for results that borrow into containers
//! - `Numeric` and the other built-in script types
//! - `HeapPointer`, the handle to garbage-collectable records
//! - Error types shared by the rest of the runtime

pub mod alloc;
mod borrower;
mod errors;
mod heap;
mod numeric;
mod operator;
mod script_type;
mod stack;
mod types;
mod var;

pub use borrower::VarBorrower;
pub use errors::{Error, InternalError, LangError, Result, RuntimeError, RuntimeErrorKind};
pub use heap::{HeapPointer, HeapRecord};
pub use numeric::Numeric;
pub use operator::Operator;
pub use script_type::{unsupported, ScriptType};
pub use stack::ensure_sufficient_stack;
pub use types::{Array, Callable, CallableKind, FwdArray, HashMap, HashSet, List, Pair};
pub use var::{is_inline, Operand, Var, SVO_ALIGN_SIZE, SVO_CAPACITY};
