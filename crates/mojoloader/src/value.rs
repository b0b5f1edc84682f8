// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Values exchanged between the loader, the host and loaded libraries
//!
//! A [`Scope`] is a shared, mutable symbol table. The same type backs the
//! host's global object, the isolated scope a library runs in, and the
//! library's exports. Scopes compare by identity, never by content.

use crate::error::Result;
use crate::loader::NestedLoader;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Signature of host and library functions stored in a scope
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value> + Send + Sync;

/// A named native function
#[derive(Clone)]
pub struct NativeFunction {
    name: String,
    func: Arc<NativeFn>,
}

impl NativeFunction {
    /// Wrap a closure
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// The function name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the function
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.func)(args)
    }

    /// Whether both handles point at the same closure
    pub fn ptr_eq(&self, other: &NativeFunction) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// A dynamically typed value
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// undefined
    #[default]
    Undefined,
    /// null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number
    Number(f64),
    /// String
    String(String),
    /// Shared object reference
    Object(Scope),
    /// Callable
    Function(NativeFunction),
    /// A loader capability bound to a library root
    Loader(NestedLoader),
}

impl Value {
    /// Whether this is `undefined`
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Borrow the object, if this is one
    pub fn as_object(&self) -> Option<&Scope> {
        match self {
            Value::Object(scope) => Some(scope),
            _ => None,
        }
    }

    /// Borrow the function, if this is one
    pub fn as_function(&self) -> Option<&NativeFunction> {
        match self {
            Value::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Borrow the loader, if this is one
    pub fn as_loader(&self) -> Option<&NestedLoader> {
        match self {
            Value::Loader(loader) => Some(loader),
            _ => None,
        }
    }

    /// Borrow the string, if this is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The `typeof`-style name of the value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) | Value::Loader(_) => "object",
            Value::Function(_) => "function",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Loader(a), Value::Loader(b)) => a.root() == b.root(),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Scope> for Value {
    fn from(scope: Scope) -> Self {
        Value::Object(scope)
    }
}

impl From<NativeFunction> for Value {
    fn from(func: NativeFunction) -> Self {
        Value::Function(func)
    }
}

/// A shared symbol table with reference identity
#[derive(Clone, Default)]
pub struct Scope {
    symbols: Arc<RwLock<HashMap<String, Value>>>,
}

impl Scope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a symbol
    pub fn get(&self, name: &str) -> Option<Value> {
        self.symbols.read().get(name).cloned()
    }

    /// Look up a symbol that must be a function
    pub fn function(&self, name: &str) -> Option<NativeFunction> {
        match self.get(name) {
            Some(Value::Function(func)) => Some(func),
            _ => None,
        }
    }

    /// Bind a symbol, replacing any previous binding
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.symbols.write().insert(name.into(), value.into());
    }

    /// Whether a binding exists, even if it is `undefined`
    pub fn contains(&self, name: &str) -> bool {
        self.symbols.read().contains_key(name)
    }

    /// Remove a binding
    pub fn remove(&self, name: &str) -> Option<Value> {
        self.symbols.write().remove(name)
    }

    /// Sorted symbol names
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.symbols.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.symbols.read().len()
    }

    /// Whether the scope has no bindings
    pub fn is_empty(&self) -> bool {
        self.symbols.read().is_empty()
    }

    /// Whether both handles refer to the same table
    pub fn ptr_eq(&self, other: &Scope) -> bool {
        Arc::ptr_eq(&self.symbols, &other.symbols)
    }
}

impl fmt::Debug for Scope {
    // Scopes can contain themselves, so only the keys are printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope").field("keys", &self.keys()).finish()
    }
}
