//! The type-erased script value.
//!
//! # Design
//!
//! A `Var` is a header word pointing at a static per-type dispatch table
//! plus an aligned buffer. Types that fit the buffer (size and alignment)
//! live inline; larger ones are moved into a pooled block and the buffer
//! holds the pointer. The dispatch table is built once per concrete type
//! from its [`ScriptType`] impl, so copying, dropping, comparing and
//! operator dispatch all go through one indirect call.
//!
//! An absent table means null. Null stringifies as `null`, hashes to 0 and
//! converts to integer 0.
//!
//! Rust moves are bitwise, so inline values need no move hook. `Var` is
//! neither `Send` nor `Sync`: payloads may hold thread-local handles.

#![allow(
    unsafe_code,
    reason = "type-erased inline storage dispatched through per-type tables"
)]

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem::{self, MaybeUninit};
use std::ptr;

use crate::alloc;
use crate::borrower::VarBorrower;
use crate::errors::{Error, InternalError, LangError, Result, RuntimeError};
use crate::operator::Operator;
use crate::script_type::ScriptType;

/// Total footprint of a `Var`; one cache line by default.
pub const SVO_ALIGN_SIZE: usize = 64;

const STORE_ALIGN: usize = 16;

/// Bytes available for inline payloads.
pub const SVO_CAPACITY: usize = SVO_ALIGN_SIZE - STORE_ALIGN;

/// Whether `T` is stored inline.
pub const fn is_inline<T>() -> bool {
    mem::size_of::<T>() <= SVO_CAPACITY && mem::align_of::<T>() <= STORE_ALIGN
}

#[repr(C, align(16))]
struct Store {
    bytes: [MaybeUninit<u8>; SVO_CAPACITY],
}

impl Store {
    const fn uninit() -> Self {
        Store {
            bytes: [MaybeUninit::uninit(); SVO_CAPACITY],
        }
    }

    fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr().cast()
    }

    fn as_mut_ptr(&mut self) -> *mut u8 {
        self.bytes.as_mut_ptr().cast()
    }

    fn new<T: 'static>(value: T) -> Self {
        let mut store = Store::uninit();
        if is_inline::<T>() {
            // SAFETY: the buffer is 16-aligned and large enough for `T`.
            unsafe { ptr::write(store.as_mut_ptr().cast::<T>(), value) };
        } else {
            let raw = alloc::allocate(value);
            // SAFETY: a pointer fits and is suitably aligned.
            unsafe { ptr::write(store.as_mut_ptr().cast::<*mut T>(), raw) };
        }
        store
    }

    /// # Safety
    ///
    /// The store must hold a live `T` written by `Store::new::<T>`.
    unsafe fn get<T: 'static>(&self) -> &T {
        if is_inline::<T>() {
            unsafe { &*self.as_ptr().cast::<T>() }
        } else {
            unsafe { &**self.as_ptr().cast::<*mut T>() }
        }
    }

    /// # Safety
    ///
    /// Same as [`Store::get`].
    unsafe fn get_mut<T: 'static>(&mut self) -> &mut T {
        if is_inline::<T>() {
            unsafe { &mut *self.as_mut_ptr().cast::<T>() }
        } else {
            unsafe { &mut **self.as_mut_ptr().cast::<*mut T>() }
        }
    }

    /// # Safety
    ///
    /// Same as [`Store::get`]; the store is dead afterwards.
    unsafe fn drop_as<T: 'static>(&mut self) {
        if is_inline::<T>() {
            unsafe { ptr::drop_in_place(self.as_mut_ptr().cast::<T>()) };
        } else {
            let raw = unsafe { ptr::read(self.as_ptr().cast::<*mut T>()) };
            unsafe { alloc::release(raw) };
        }
    }
}

/// Receiver of an operator call.
enum Receiver<'a> {
    Shared(&'a Store),
    Exclusive(&'a mut Store),
}

impl<'a> Receiver<'a> {
    fn shared(self) -> &'a Store {
        match self {
            Receiver::Shared(store) => store,
            Receiver::Exclusive(store) => store,
        }
    }
}

/// Right-hand side of an operator call.
pub enum Operand<'a> {
    None,
    Var(&'a Var),
    Member(&'a str),
    Args(&'a mut [Var]),
}

impl<'a> Operand<'a> {
    fn var(self, op: Operator) -> Result<&'a Var> {
        match self {
            Operand::Var(var) => Ok(var),
            _ => Err(arity_error(op)),
        }
    }

    fn member(self, op: Operator) -> Result<&'a str> {
        match self {
            Operand::Member(member) => Ok(member),
            _ => Err(arity_error(op)),
        }
    }

    fn args(self, op: Operator) -> Result<&'a mut [Var]> {
        match self {
            Operand::Args(args) => Ok(args),
            _ => Err(arity_error(op)),
        }
    }
}

fn arity_error(op: Operator) -> Error {
    InternalError::new(format!("wrong operand kind for {op} operator")).into()
}

type OperateFn =
    for<'a, 'b> unsafe fn(Operator, Receiver<'a>, Operand<'b>) -> Result<VarBorrower<'a>>;

struct VarVTable {
    type_id: fn() -> TypeId,
    type_name: fn() -> &'static str,
    clone: unsafe fn(&Store) -> Store,
    drop: unsafe fn(&mut Store),
    to_integer: unsafe fn(&Store) -> Result<i64, LangError>,
    stringify: unsafe fn(&Store) -> String,
    hash_code: unsafe fn(&Store) -> Result<u64, LangError>,
    equals: unsafe fn(&Store, &Store) -> bool,
    mark_reachable: unsafe fn(&Store),
    operate: OperateFn,
}

struct VTableFor<T>(PhantomData<T>);

impl<T: ScriptType> VTableFor<T> {
    const VTABLE: &'static VarVTable = &VarVTable {
        type_id: TypeId::of::<T>,
        type_name: T::type_name,
        clone: clone_as::<T>,
        drop: Store::drop_as::<T>,
        to_integer: to_integer_as::<T>,
        stringify: stringify_as::<T>,
        hash_code: hash_code_as::<T>,
        equals: equals_as::<T>,
        mark_reachable: mark_reachable_as::<T>,
        operate: operate_as::<T>,
    };
}

unsafe fn clone_as<T: ScriptType>(store: &Store) -> Store {
    Store::new(unsafe { store.get::<T>() }.clone())
}

unsafe fn to_integer_as<T: ScriptType>(store: &Store) -> Result<i64, LangError> {
    unsafe { store.get::<T>() }.to_integer()
}

unsafe fn stringify_as<T: ScriptType>(store: &Store) -> String {
    unsafe { store.get::<T>() }.stringify()
}

unsafe fn hash_code_as<T: ScriptType>(store: &Store) -> Result<u64, LangError> {
    unsafe { store.get::<T>() }.hash_code()
}

unsafe fn equals_as<T: ScriptType>(lhs: &Store, rhs: &Store) -> bool {
    unsafe { lhs.get::<T>().equals(rhs.get::<T>()) }
}

unsafe fn mark_reachable_as<T: ScriptType>(store: &Store) {
    unsafe { store.get::<T>() }.mark_reachable();
}

unsafe fn operate_as<'a, T: ScriptType>(
    op: Operator,
    receiver: Receiver<'a>,
    operand: Operand<'_>,
) -> Result<VarBorrower<'a>> {
    if op.is_arithmetic() {
        let rhs = operand.var(op)?.const_val::<T>()?;
        let lhs = unsafe { receiver.shared().get::<T>() };
        let result = match op {
            Operator::Add => lhs.op_add(rhs),
            Operator::Sub => lhs.op_sub(rhs),
            Operator::Mul => lhs.op_mul(rhs),
            Operator::Div => lhs.op_div(rhs),
            Operator::Mod => lhs.op_mod(rhs),
            _ => lhs.op_pow(rhs),
        };
        return result.map(VarBorrower::Owned);
    }
    if op.is_comparison() {
        let rhs = operand.var(op)?.const_val::<T>()?;
        let lhs = unsafe { receiver.shared().get::<T>() };
        let result = match op {
            Operator::Compare => Ok(lhs.equals(rhs)),
            Operator::AboCmp => lhs.op_abocmp(rhs),
            Operator::UndCmp => lhs.op_undcmp(rhs),
            Operator::AepCmp => lhs.op_aepcmp(rhs),
            _ => lhs.op_ueqcmp(rhs),
        };
        return result.map(|flag| VarBorrower::Owned(Var::make(flag)));
    }
    match (op, receiver) {
        (Operator::Minus, receiver) => unsafe { receiver.shared().get::<T>() }
            .op_minus()
            .map(VarBorrower::Owned),
        (Operator::Escape, receiver) => unsafe { receiver.shared().get::<T>() }.op_escape(),
        (Operator::SelfInc, Receiver::Exclusive(store)) => {
            unsafe { store.get_mut::<T>() }.op_selfinc()?;
            Ok(VarBorrower::Empty)
        }
        (Operator::SelfDec, Receiver::Exclusive(store)) => {
            unsafe { store.get_mut::<T>() }.op_selfdec()?;
            Ok(VarBorrower::Empty)
        }
        (Operator::Index, Receiver::Exclusive(store)) => {
            unsafe { store.get_mut::<T>() }.op_index_mut(operand.var(op)?)
        }
        (Operator::Index, Receiver::Shared(store)) => {
            unsafe { store.get::<T>() }.op_index(operand.var(op)?)
        }
        (Operator::Access, receiver) => {
            unsafe { receiver.shared().get::<T>() }.op_access(operand.member(op)?)
        }
        (Operator::Arrow, receiver) => {
            unsafe { receiver.shared().get::<T>() }.op_arrow(operand.member(op)?)
        }
        (Operator::Call, receiver) => unsafe { receiver.shared().get::<T>() }
            .op_call(operand.args(op)?)
            .map(VarBorrower::Owned),
        (Operator::SelfInc | Operator::SelfDec, Receiver::Shared(_)) => Err(InternalError::new(
            format!("{op} operator applied to a read-only value"),
        )
        .into()),
        _ => Err(arity_error(op)),
    }
}

/// Type-erased script value.
pub struct Var {
    vtable: Option<&'static VarVTable>,
    store: Store,
    _not_send: PhantomData<*const ()>,
}

const NULL_TYPE_NAME: &str = "null";

impl Var {
    /// The null value.
    pub const fn null() -> Self {
        Var {
            vtable: None,
            store: Store::uninit(),
            _not_send: PhantomData,
        }
    }

    /// Wrap `value`.
    pub fn make<T: ScriptType>(value: T) -> Self {
        Var {
            vtable: Some(VTableFor::<T>::VTABLE),
            store: Store::new(value),
            _not_send: PhantomData,
        }
    }

    /// Largest payload size stored without a heap block.
    pub const fn internal_svo_threshold() -> usize {
        SVO_CAPACITY
    }

    pub fn usable(&self) -> bool {
        self.vtable.is_some()
    }

    pub fn is_null(&self) -> bool {
        self.vtable.is_none()
    }

    /// `TypeId` of the held value, `None` for null.
    pub fn type_id(&self) -> Option<TypeId> {
        self.vtable.map(|vtable| (vtable.type_id)())
    }

    pub fn is_type_of<T: ScriptType>(&self) -> bool {
        self.type_id() == Some(TypeId::of::<T>())
    }

    pub fn type_name(&self) -> &'static str {
        self.vtable
            .map_or(NULL_TYPE_NAME, |vtable| (vtable.type_name)())
    }

    fn checked<T: ScriptType>(&self) -> Result<(), RuntimeError> {
        match self.vtable {
            None => Err(RuntimeError::null_access()),
            Some(vtable) if (vtable.type_id)() == TypeId::of::<T>() => Ok(()),
            Some(vtable) => Err(RuntimeError::type_mismatch(
                (vtable.type_name)(),
                T::type_name(),
            )),
        }
    }

    pub fn const_val<T: ScriptType>(&self) -> Result<&T, RuntimeError> {
        self.checked::<T>()?;
        // SAFETY: the dynamic type was checked above.
        Ok(unsafe { self.store.get::<T>() })
    }

    pub fn val<T: ScriptType>(&mut self) -> Result<&mut T, RuntimeError> {
        self.checked::<T>()?;
        // SAFETY: the dynamic type was checked above.
        Ok(unsafe { self.store.get_mut::<T>() })
    }

    pub fn to_integer(&self) -> Result<i64, LangError> {
        match self.vtable {
            // SAFETY: the table was built for the stored type.
            Some(vtable) => unsafe { (vtable.to_integer)(&self.store) },
            None => Ok(0),
        }
    }

    pub fn hash(&self) -> Result<u64, LangError> {
        match self.vtable {
            // SAFETY: the table was built for the stored type.
            Some(vtable) => unsafe { (vtable.hash_code)(&self.store) },
            None => Ok(0),
        }
    }

    /// Equality across dynamic types: values of different types are unequal,
    /// two nulls are equal.
    pub fn compare(&self, other: &Var) -> bool {
        match (self.vtable, other.vtable) {
            (None, None) => true,
            (Some(lhs), Some(rhs)) if (lhs.type_id)() == (rhs.type_id)() => {
                // SAFETY: both stores hold the table's type.
                unsafe { (lhs.equals)(&self.store, &other.store) }
            }
            _ => false,
        }
    }

    /// Visit values kept alive by this one.
    pub fn mark_reachable(&self) {
        if let Some(vtable) = self.vtable {
            // SAFETY: the table was built for the stored type.
            unsafe { (vtable.mark_reachable)(&self.store) };
        }
    }

    pub fn swap(&mut self, other: &mut Var) {
        mem::swap(self, other);
    }

    /// Move the value out, leaving null behind.
    pub fn take(&mut self) -> Var {
        mem::take(self)
    }

    /// Dispatch `op` with a read-only receiver.
    pub fn operate(&self, op: Operator, operand: Operand<'_>) -> Result<VarBorrower<'_>> {
        if op == Operator::Compare {
            let rhs = operand.var(op)?;
            return Ok(VarBorrower::Owned(Var::make(self.compare(rhs))));
        }
        match self.vtable {
            // SAFETY: the table was built for the stored type.
            Some(vtable) => unsafe { (vtable.operate)(op, Receiver::Shared(&self.store), operand) },
            None => Err(LangError::unsupported_operator(NULL_TYPE_NAME, op).into()),
        }
    }

    /// Dispatch `op` with a mutable receiver.
    pub fn operate_mut(&mut self, op: Operator, operand: Operand<'_>) -> Result<VarBorrower<'_>> {
        if op == Operator::Compare {
            let rhs = operand.var(op)?;
            return Ok(VarBorrower::Owned(Var::make(self.compare(rhs))));
        }
        match self.vtable {
            // SAFETY: the table was built for the stored type.
            Some(vtable) => unsafe {
                (vtable.operate)(op, Receiver::Exclusive(&mut self.store), operand)
            },
            None => Err(LangError::unsupported_operator(NULL_TYPE_NAME, op).into()),
        }
    }
}

fn truth(result: VarBorrower<'_>) -> Result<bool> {
    let value = result.into_owned();
    Ok(*value.const_val::<bool>()?)
}

#[allow(
    clippy::should_implement_trait,
    reason = "script operators are fallible and dispatch on the dynamic type"
)]
impl Var {
    pub fn add(&self, rhs: &Var) -> Result<Var> {
        self.operate(Operator::Add, Operand::Var(rhs))
            .map(VarBorrower::into_owned)
    }

    pub fn sub(&self, rhs: &Var) -> Result<Var> {
        self.operate(Operator::Sub, Operand::Var(rhs))
            .map(VarBorrower::into_owned)
    }

    pub fn mul(&self, rhs: &Var) -> Result<Var> {
        self.operate(Operator::Mul, Operand::Var(rhs))
            .map(VarBorrower::into_owned)
    }

    pub fn div(&self, rhs: &Var) -> Result<Var> {
        self.operate(Operator::Div, Operand::Var(rhs))
            .map(VarBorrower::into_owned)
    }

    pub fn rem(&self, rhs: &Var) -> Result<Var> {
        self.operate(Operator::Mod, Operand::Var(rhs))
            .map(VarBorrower::into_owned)
    }

    pub fn pow(&self, rhs: &Var) -> Result<Var> {
        self.operate(Operator::Pow, Operand::Var(rhs))
            .map(VarBorrower::into_owned)
    }

    pub fn minus(&self) -> Result<Var> {
        self.operate(Operator::Minus, Operand::None)
            .map(VarBorrower::into_owned)
    }

    pub fn escape(&self) -> Result<VarBorrower<'_>> {
        self.operate(Operator::Escape, Operand::None)
    }

    pub fn selfinc(&mut self) -> Result<()> {
        self.operate_mut(Operator::SelfInc, Operand::None).map(drop)
    }

    pub fn selfdec(&mut self) -> Result<()> {
        self.operate_mut(Operator::SelfDec, Operand::None).map(drop)
    }

    pub fn abocmp(&self, rhs: &Var) -> Result<bool> {
        truth(self.operate(Operator::AboCmp, Operand::Var(rhs))?)
    }

    pub fn undcmp(&self, rhs: &Var) -> Result<bool> {
        truth(self.operate(Operator::UndCmp, Operand::Var(rhs))?)
    }

    pub fn aepcmp(&self, rhs: &Var) -> Result<bool> {
        truth(self.operate(Operator::AepCmp, Operand::Var(rhs))?)
    }

    pub fn ueqcmp(&self, rhs: &Var) -> Result<bool> {
        truth(self.operate(Operator::UeqCmp, Operand::Var(rhs))?)
    }

    pub fn index(&self, index: &Var) -> Result<VarBorrower<'_>> {
        self.operate(Operator::Index, Operand::Var(index))
    }

    pub fn index_mut(&mut self, index: &Var) -> Result<VarBorrower<'_>> {
        self.operate_mut(Operator::Index, Operand::Var(index))
    }

    pub fn access(&self, member: &str) -> Result<VarBorrower<'_>> {
        self.operate(Operator::Access, Operand::Member(member))
    }

    pub fn arrow(&self, member: &str) -> Result<VarBorrower<'_>> {
        self.operate(Operator::Arrow, Operand::Member(member))
    }

    pub fn call(&self, args: &mut [Var]) -> Result<Var> {
        self.operate(Operator::Call, Operand::Args(args))
            .map(VarBorrower::into_owned)
    }
}

impl Default for Var {
    fn default() -> Self {
        Var::null()
    }
}

impl Clone for Var {
    fn clone(&self) -> Self {
        match self.vtable {
            None => Var::null(),
            Some(vtable) => Var {
                vtable: Some(vtable),
                // SAFETY: the table was built for the stored type.
                store: unsafe { (vtable.clone)(&self.store) },
                _not_send: PhantomData,
            },
        }
    }
}

impl Drop for Var {
    fn drop(&mut self) {
        if let Some(vtable) = self.vtable.take() {
            // SAFETY: the table was built for the stored type, and the
            // header is cleared so the payload is dropped exactly once.
            unsafe { (vtable.drop)(&mut self.store) };
        }
    }
}

impl PartialEq for Var {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other)
    }
}

impl Eq for Var {}

/// Unhashable payloads hash by type only; containers reject them before
/// insertion.
impl Hash for Var {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match Var::hash(self) {
            Ok(code) => state.write_u64(code),
            Err(_) => self.type_id().hash(state),
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.vtable {
            // SAFETY: the table was built for the stored type.
            Some(vtable) => f.write_str(&unsafe { (vtable.stringify)(&self.store) }),
            None => f.write_str(NULL_TYPE_NAME),
        }
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Var({}: {self})", self.type_name())
    }
}
