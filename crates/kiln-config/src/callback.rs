//! Caller-supplied option callbacks.
//!
//! A callback receives the default options object and returns the object to
//! use. The return value always wins: returning the (possibly edited) input
//! keeps the defaults, returning a new object replaces them in full.

use std::fmt;

use serde_json::Value;

/// Identity callback, for when a method takes a callback but you have nothing to change.
pub fn keep(options: Value) -> Value {
    options
}

pub struct OptionsCallback(Box<dyn Fn(Value) -> Value + Send + Sync>);

impl OptionsCallback {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self(Box::new(callback))
    }

    pub fn identity() -> Self {
        Self::new(keep)
    }

    pub fn apply(&self, defaults: Value) -> Value {
        (self.0)(defaults)
    }
}

impl Default for OptionsCallback {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for OptionsCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OptionsCallback(..)")
    }
}

impl<F> From<F> for OptionsCallback
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    fn from(callback: F) -> Self {
        Self::new(callback)
    }
}
