//! RAII scope guards for [`Instance`] memory.
//!
//! [`ScopeGuard`] pairs `enter_domain` with `leave_domain`: the domain is
//! left when the guard is dropped, also during unwinding.
//!
//! # Design
//!
//! The guard holds `&mut Instance` and implements `Deref`/`DerefMut`, so
//! everything on the instance stays reachable while the scope is open.
//!
//! ```text
//! instance.with_scope("<call>", false, |scoped| {
//!     scoped.declare_var("x", Var::make(true), false)?;
//!     scoped.access("x").cloned()
//! })
//! ```

use std::ops::{Deref, DerefMut};

use cov_value::RuntimeError;

use super::Instance;

pub struct ScopeGuard<'a> {
    instance: &'a mut Instance,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.instance.leave_domain(false) {
            tracing::error!(%err, "scope guard could not leave its domain");
        }
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = Instance;

    fn deref(&self) -> &Self::Target {
        self.instance
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.instance
    }
}

impl Instance {
    /// Enter domain `name` and return a guard that leaves it on drop.
    pub fn scoped(&mut self, name: &str, declare: bool) -> Result<ScopeGuard<'_>, RuntimeError> {
        self.enter_domain(name, declare)?;
        Ok(ScopeGuard { instance: self })
    }

    /// Run `f` inside domain `name`.
    pub fn with_scope<T, F>(&mut self, name: &str, declare: bool, f: F) -> Result<T, RuntimeError>
    where
        F: FnOnce(&mut ScopeGuard<'_>) -> T,
    {
        let mut scoped = self.scoped(name, declare)?;
        Ok(f(&mut scoped))
    }
}
