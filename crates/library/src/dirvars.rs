//! Caller-supplied bindings for the `{name}` placeholders in file directories.

use crate::error::{Error, ErrorKind, Result};
use shelf_metadata::models::is_var_name;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// A single `name=value` binding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirVar {
    pub name: String,
    pub value: String,
}
impl FromStr for DirVar {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, value)) if is_var_name(name) => Ok(Self { name: name.to_string(), value: value.to_string() }),
            _ => exn::bail!(ErrorKind::DirVar(s.to_string())),
        }
    }
}
impl Display for DirVar {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Every dir var binding for a run, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
pub struct DirVars(BTreeMap<String, String>);
impl DirVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects bindings, rejecting a name that's bound more than once.
    pub fn try_from_iter(vars: impl IntoIterator<Item = DirVar>) -> Result<Self> {
        let mut bindings = Self::new();
        for DirVar { name, value } in vars {
            if bindings.0.contains_key(&name) {
                exn::bail!(ErrorKind::DuplicateDirVar(name));
            }
            bindings.0.insert(name, value);
        }
        Ok(bindings)
    }

    /// Binds `name`, returning the previous value if it was already bound.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
impl Display for DirVars {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.0.is_empty() {
            true => write!(f, "<none provided>"),
            false => {
                let bindings: Vec<_> = self.iter().map(|(name, value)| format!("{name}={value}")).collect();
                write!(f, "{}", bindings.join(", "))
            },
        }
    }
}
