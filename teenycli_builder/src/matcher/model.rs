use thiserror::Error;

use super::api::*;

/// The raw tokens aligned to one argument/flag, keyed by its destination name.
#[derive(Debug, PartialEq, Eq, Hash)]
pub(crate) struct MatchTokens {
    pub name: String,
    pub values: Vec<OffsetValue>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CloseError {
    #[error("too few values provided for '{name}' (provided={provided}, expected={expected}).")]
    TooFewValues {
        name: String,
        provided: usize,
        expected: u8,
    },

    #[error("too many values provided for '{name}' (provided={provided}, expected={expected}).")]
    TooManyValues {
        name: String,
        provided: usize,
        expected: u8,
    },
}

#[derive(Debug)]
pub(crate) struct MatchBuffer {
    name: String,
    bound: Bound,
    values: Vec<OffsetValue>,
}

impl MatchBuffer {
    pub(crate) fn new(name: impl Into<String>, bound: Bound) -> Self {
        Self {
            name: name.into(),
            bound,
            values: Vec::default(),
        }
    }

    fn lower(&self) -> u8 {
        match self.bound {
            Bound::Range(lower, _) | Bound::Lower(lower) => lower,
        }
    }

    fn upper(&self) -> Option<u8> {
        match self.bound {
            Bound::Range(_, upper) => Some(upper),
            Bound::Lower(_) => None,
        }
    }

    pub(crate) fn push(&mut self, offset: usize, value: impl Into<String>) {
        self.values.push((offset, value.into()));
    }

    /// Whether this buffer would take another value.
    pub(crate) fn is_open(&self) -> bool {
        match self.upper() {
            Some(upper) => self.values.len() < upper as usize,
            None => true,
        }
    }

    pub(crate) fn close(self) -> Result<MatchTokens, CloseError> {
        let provided = self.values.len();

        if provided < self.lower() as usize {
            return Err(CloseError::TooFewValues {
                expected: self.lower(),
                name: self.name,
                provided,
            });
        }

        if let Some(upper) = self.upper() {
            if provided > upper as usize {
                return Err(CloseError::TooManyValues {
                    name: self.name,
                    provided,
                    expected: upper,
                });
            }
        }

        Ok(MatchTokens {
            name: self.name,
            values: self.values,
        })
    }
}
