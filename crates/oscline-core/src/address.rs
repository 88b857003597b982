//! OSC addresses
//!
//! An address is an ordered list of container names followed by a method
//! name:
//! ```text
//! /synth/1/osc/gain
//!  ^^^^^^^^^^^^ containers
//!               ^^^^ method
//! ```
//!
//! The canonical path string, its hash and the two validity flags are cached
//! and rebuilt after every mutation, so they are never stale. Equality,
//! ordering and hashing use the canonical path only.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::pattern;
use crate::{Error, Result};

/// Path separator
pub const SEPARATOR: char = '/';

/// A hierarchical OSC address or address pattern
#[derive(Debug, Clone)]
pub struct OscAddress {
    containers: Vec<String>,
    method: String,

    // Derived from the fields above by `rebuild`
    path: String,
    hash: u64,
    is_valid_path: bool,
    is_valid_pattern: bool,
}

impl OscAddress {
    /// Create an address with no containers
    pub fn new(method: &str) -> Result<Self> {
        let mut address = Self::empty();
        address.set_method(method)?;
        Ok(address)
    }

    /// Parse an address string such as `/synth/*/gain`.
    ///
    /// The string must start with `/`. Empty parts and glob characters are
    /// accepted here and only reflected in [`is_valid_path`](Self::is_valid_path)
    /// and [`is_valid_pattern`](Self::is_valid_pattern).
    pub fn parse(s: &str) -> Result<Self> {
        if !s.starts_with(SEPARATOR) {
            return Err(Error::InvalidAddress(format!(
                "address must start with '/': {:?}",
                s
            )));
        }
        Ok(Self::from_wire(s))
    }

    /// Build an address from a received string without rejecting anything
    pub(crate) fn from_wire(s: &str) -> Self {
        let body = s.strip_prefix(SEPARATOR).unwrap_or(s);
        let mut parts: Vec<String> = body.split(SEPARATOR).map(str::to_string).collect();
        // `split` always yields at least one item
        let method = parts.pop().unwrap_or_default();

        let mut address = Self {
            containers: parts,
            method,
            path: String::new(),
            hash: 0,
            is_valid_path: false,
            is_valid_pattern: false,
        };
        address.rebuild();
        address
    }

    fn empty() -> Self {
        let mut address = Self {
            containers: Vec::new(),
            method: String::new(),
            path: String::new(),
            hash: 0,
            is_valid_path: false,
            is_valid_pattern: false,
        };
        address.rebuild();
        address
    }

    /// Recompute every cached field from `containers` and `method`
    fn rebuild(&mut self) {
        let mut path = String::with_capacity(
            self.containers.iter().map(|c| c.len() + 1).sum::<usize>() + self.method.len() + 1,
        );
        for container in &self.containers {
            path.push(SEPARATOR);
            path.push_str(container);
        }
        path.push(SEPARATOR);
        path.push_str(&self.method);

        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);

        let parts = || self.containers.iter().map(String::as_str).chain([self.method.as_str()]);

        self.is_valid_path = parts().all(pattern::is_valid_path_part);
        self.is_valid_pattern = parts().all(pattern::is_valid_pattern_part);
        self.hash = hasher.finish();
        self.path = path;
    }

    /// Components may not contain the separator or a NUL, which would end
    /// the address string on the wire
    fn check_component(name: &str) -> Result<()> {
        if name.contains(SEPARATOR) || name.contains('\0') {
            return Err(Error::InvalidComponent(name.to_string()));
        }
        Ok(())
    }

    /// Append a container
    pub fn push_container(&mut self, name: &str) -> Result<()> {
        Self::check_component(name)?;
        self.containers.push(name.to_string());
        self.rebuild();
        Ok(())
    }

    /// Append several containers; nothing is added if any name is rejected
    pub fn push_containers<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names.into_iter().map(|s| s.as_ref().to_string()).collect();
        for name in &names {
            Self::check_component(name)?;
        }
        self.containers.extend(names);
        self.rebuild();
        Ok(())
    }

    /// Remove and return the last container
    pub fn pop_container(&mut self) -> Option<String> {
        let popped = self.containers.pop();
        if popped.is_some() {
            self.rebuild();
        }
        popped
    }

    /// Remove `count` containers starting at `index`, clamped to the list
    pub fn remove_containers(&mut self, index: usize, count: usize) {
        let start = index.min(self.containers.len());
        let end = index.saturating_add(count).min(self.containers.len());
        if start < end {
            self.containers.drain(start..end);
            self.rebuild();
        }
    }

    pub fn clear_containers(&mut self) {
        self.containers.clear();
        self.rebuild();
    }

    /// Replace the method name
    pub fn set_method(&mut self, name: &str) -> Result<()> {
        Self::check_component(name)?;
        if name.is_empty() {
            return Err(Error::EmptyMethod);
        }
        self.method = name.to_string();
        self.rebuild();
        Ok(())
    }

    /// Builder form of [`push_container`](Self::push_container)
    pub fn with_container(mut self, name: &str) -> Result<Self> {
        self.push_container(name)?;
        Ok(self)
    }

    pub fn containers(&self) -> &[String] {
        &self.containers
    }

    pub fn container(&self, index: usize) -> Option<&str> {
        self.containers.get(index).map(String::as_str)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Canonical `/container/.../method` string
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Cached structural hash of the canonical path
    pub fn path_hash(&self) -> u64 {
        self.hash
    }

    /// Usable as a concrete destination: no glob characters, no empty parts
    pub fn is_valid_path(&self) -> bool {
        self.is_valid_path
    }

    /// Usable as a pattern: glob constructs are well formed, no empty parts
    pub fn is_valid_pattern(&self) -> bool {
        self.is_valid_pattern
    }

    /// A valid pattern that is not also a plain path
    pub fn is_pattern(&self) -> bool {
        self.is_valid_pattern && !self.is_valid_path
    }

    /// Does this pattern match the concrete address `path`?
    pub fn matches(&self, path: &OscAddress) -> bool {
        pattern::matches(self, path)
    }
}

impl PartialEq for OscAddress {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.path == other.path
    }
}

impl Eq for OscAddress {}

impl Hash for OscAddress {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl PartialOrd for OscAddress {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OscAddress {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.path.cmp(&other.path)
    }
}

impl std::fmt::Display for OscAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

impl FromStr for OscAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        OscAddress::parse(s)
    }
}

impl TryFrom<&str> for OscAddress {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        OscAddress::parse(s)
    }
}

impl TryFrom<String> for OscAddress {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        OscAddress::parse(&s)
    }
}
