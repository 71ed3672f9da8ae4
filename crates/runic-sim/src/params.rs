//! Typed access to a node's IR parameter map.
//!
//! The IR keeps parameters loosely typed so it stays portable. Node
//! factories read them through [`ParamReader`], which converts each value to
//! the shape the node expects and fails with [`LoadError::InvalidParam`] on
//! a mismatch instead of falling back to a default. An absent parameter is
//! `Ok(None)` and left to the factory to default.
//!
//! Strings holding a number are accepted wherever a number is expected,
//! since hand-written IR and bare identifiers in source both produce them.

use runic_core::{AmplitudeSpec, ElementSpec, ElementType, ParamValue, Params};

use crate::error::LoadError;

pub struct ParamReader<'a> {
    node: &'a str,
    params: &'a Params,
}

impl<'a> ParamReader<'a> {
    pub fn new(node: &'a str, params: &'a Params) -> Self {
        ParamReader { node, params }
    }

    /// Id of the node being built.
    pub fn node(&self) -> &str {
        self.node
    }

    pub fn get(&self, key: &str) -> Option<&'a ParamValue> {
        self.params.get(key)
    }

    pub fn int(&self, key: &'static str) -> Result<Option<i64>, LoadError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        match value {
            ParamValue::Int(n) => Ok(Some(*n)),
            ParamValue::Str(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| self.invalid(key, "an integer", value)),
            _ => Err(self.invalid(key, "an integer", value)),
        }
    }

    /// A non-negative integer that fits in a magnitude.
    pub fn u32(&self, key: &'static str) -> Result<Option<u32>, LoadError> {
        match self.int(key)? {
            Some(n) => u32::try_from(n)
                .map(Some)
                .map_err(|_| self.invalid(key, "a non-negative integer", &ParamValue::Int(n))),
            None => Ok(None),
        }
    }

    pub fn u32_or(&self, key: &'static str, default: u32) -> Result<u32, LoadError> {
        Ok(self.u32(key)?.unwrap_or(default))
    }

    pub fn float(&self, key: &'static str) -> Result<Option<f64>, LoadError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        if let Some(x) = value.as_float() {
            return Ok(Some(x));
        }
        value
            .as_str()
            .and_then(|s| s.trim().parse().ok())
            .map(Some)
            .ok_or_else(|| self.invalid(key, "a number", value))
    }

    pub fn float_or(&self, key: &'static str, default: f64) -> Result<f64, LoadError> {
        Ok(self.float(key)?.unwrap_or(default))
    }

    pub fn string(&self, key: &'static str) -> Result<Option<&'a str>, LoadError> {
        match self.get(key) {
            Some(ParamValue::Str(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(self.invalid(key, "a string", other)),
            None => Ok(None),
        }
    }

    pub fn element(&self, key: &'static str) -> Result<Option<ElementType>, LoadError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        value
            .as_str()
            .and_then(|s| s.trim().parse().ok())
            .map(Some)
            .ok_or_else(|| self.invalid(key, "an element name", value))
    }

    /// An element name or the `Any` wildcard.
    pub fn element_spec(&self, key: &'static str) -> Result<Option<ElementSpec>, LoadError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        value
            .as_str()
            .and_then(|s| s.trim().parse().ok())
            .map(Some)
            .ok_or_else(|| self.invalid(key, "an element name or Any", value))
    }

    /// `"5"`, `"5+"`, `"3..10"` or a bare integer. Absent means `Exact(1)`.
    pub fn amplitude(&self, key: &'static str) -> Result<AmplitudeSpec, LoadError> {
        match self.get(key) {
            None => Ok(AmplitudeSpec::default()),
            Some(ParamValue::Int(n)) => u32::try_from(*n)
                .map(AmplitudeSpec::Exact)
                .map_err(|_| self.invalid(key, "an amplitude", &ParamValue::Int(*n))),
            Some(value) => value
                .as_str()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| self.invalid(key, "an amplitude", value)),
        }
    }

    /// Turns an absent parameter into [`LoadError::MissingParam`].
    pub fn require<T>(&self, key: &'static str, value: Option<T>) -> Result<T, LoadError> {
        value.ok_or_else(|| LoadError::MissingParam {
            node: self.node.to_string(),
            param: key,
        })
    }

    pub(crate) fn invalid(&self, key: &str, expected: &'static str, found: &ParamValue) -> LoadError {
        LoadError::InvalidParam {
            node: self.node.to_string(),
            param: key.to_string(),
            expected,
            found: format!("{} {found}", found.kind()),
        }
    }
}
