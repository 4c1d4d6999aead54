//! Named template bindings (`${name}` / `:{name}`).
//!
//! A binding maps a name to one identifier or to an ordered list of
//! identifiers. Values are quoted with [`quote_name`](crate::ident::quote_name)
//! at render time, never when they are registered.

use crate::error::{SqlError, SqlResult};
use crate::ident::quote_name;
use std::collections::BTreeMap;

/// The value registered for one binding name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Single(String),
    Multi(Vec<String>),
}

impl Binding {
    /// Render the binding as SQL text: the quoted identifier, or the quoted
    /// identifiers joined by `", "`.
    pub fn quoted(&self) -> SqlResult<String> {
        match self {
            Binding::Single(name) => quote_name(name),
            Binding::Multi(names) => Ok(names
                .iter()
                .map(|n| quote_name(n))
                .collect::<SqlResult<Vec<_>>>()?
                .join(", ")),
        }
    }
}

/// Binding names of one statement buffer. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    entries: BTreeMap<String, Binding>,
}

/// Binding names must match `\w+` (ASCII word characters).
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

pub(crate) fn duplicate_name(name: &str) -> SqlError {
    SqlError::invalid_argument(format!("The binding name \"{name}\" must be unique"))
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Fail if `name` is malformed or already registered.
    pub fn check_name(&self, name: &str) -> SqlResult<()> {
        if !is_valid_name(name) {
            return Err(SqlError::invalid_argument(format!(
                "The binding name \"{name}\" must only consist of word characters [a-zA-Z_0-9]"
            )));
        }
        if self.contains(name) {
            return Err(duplicate_name(name));
        }
        Ok(())
    }

    /// Register one binding.
    pub fn insert(&mut self, name: impl Into<String>, binding: Binding) -> SqlResult<()> {
        let name = name.into();
        self.check_name(&name)?;
        self.entries.insert(name, binding);
        Ok(())
    }

    /// Register several bindings at once. Either all of them are added or none.
    pub fn insert_all<I, K>(&mut self, bindings: I) -> SqlResult<()>
    where
        I: IntoIterator<Item = (K, Binding)>,
        K: Into<String>,
    {
        let pending: Vec<(String, Binding)> = bindings
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect();

        let mut staged = Bindings::new();
        for (name, binding) in pending {
            self.check_name(&name)?;
            staged.insert(name, binding)?;
        }
        self.entries.append(&mut staged.entries);
        Ok(())
    }

    /// Copy every binding of `other` into `self`, failing on the first name
    /// both tables define. Nothing is copied on failure.
    pub fn merge(&mut self, other: &Bindings) -> SqlResult<()> {
        self.insert_all(other.iter().map(|(k, v)| (k, v.clone())))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
