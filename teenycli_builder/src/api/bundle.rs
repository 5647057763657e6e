use std::any::{type_name, Any};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::api::capture::Datum;

/// The failure to fetch a value from a [`Bundle`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BundleError {
    /// The argument is absent: it was neither given nor defaulted, or was never declared.
    #[error("Argument '{0}' is absent.")]
    Absent(String),

    /// The argument holds a value of some other type.
    #[error("Argument '{name}' is not of type {expected}.")]
    Mismatch {
        /// The argument dest.
        name: String,
        /// The requested type.
        expected: &'static str,
    },
}

/// The parsed arguments of the selected command path, keyed by their dest.
///
/// Every declared argument of each visited node is represented.
/// An argument which was neither given on the command line nor defaulted is *absent* (`None`).
#[derive(Debug, Default)]
pub struct Bundle {
    values: BTreeMap<String, Option<Box<dyn Datum>>>,
}

impl Bundle {
    /// Whether `name` was declared by a visited node (even if its value is absent).
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Borrow the value of `name`, if present and of type `T`.
    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        self.values
            .get(name)
            .and_then(|value| value.as_deref())
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Borrow the value of `name`, explaining why it cannot be.
    ///
    /// ### Example
    /// ```
    /// # use teenycli_builder as teenycli;
    /// use teenycli::{ArgP, Argument};
    ///
    /// let mut argp: ArgP = ArgP::new("program");
    /// argp.add(Argument::new(["count"]).convert::<u32>()).unwrap();
    /// let bundle = argp.parse_tokens(&["3"]).unwrap();
    ///
    /// assert_eq!(bundle.fetch::<u32>("count"), Ok(&3));
    /// assert!(bundle.fetch::<String>("count").is_err());
    /// ```
    pub fn fetch<T: Any>(&self, name: &str) -> Result<&T, BundleError> {
        match self.values.get(name).and_then(|value| value.as_deref()) {
            None => Err(BundleError::Absent(name.to_string())),
            Some(value) => value.downcast_ref::<T>().ok_or(BundleError::Mismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            }),
        }
    }

    /// The state of the `Arity::Zero` flag `name`; `false` when it is not a declared flag.
    pub fn flag(&self, name: &str) -> bool {
        self.get::<bool>(name).copied().unwrap_or(false)
    }

    /// Take the value of `name`, if present and of type `T`.
    /// A value of some other type is left in place.
    pub fn remove<T: Any>(&mut self, name: &str) -> Option<T> {
        match self.values.get(name) {
            Some(Some(value)) if value.downcast_ref::<T>().is_some() => self
                .values
                .remove(name)
                .flatten()
                .and_then(|value| value.downcast::<T>()),
            _ => None,
        }
    }

    /// The dests held by the bundle, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// The number of dests held by the bundle.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bundle holds no dests at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn merge(&mut self, values: Vec<(String, Option<Box<dyn Datum>>)>) {
        self.values.extend(values);
    }
}

#[cfg(any(test, feature = "unit_test"))]
impl Bundle {
    /// An empty bundle, for testing handlers in isolation.
    pub fn test_dummy() -> Self {
        Self::default()
    }

    /// Add (or replace) the value of `name`.
    pub fn insert<T: Datum>(mut self, name: impl Into<String>, value: T) -> Self {
        self.values.insert(name.into(), Some(Box::new(value)));
        self
    }

    /// Add (or replace) `name` as absent.
    pub fn insert_absent(mut self, name: impl Into<String>) -> Self {
        self.values.insert(name.into(), None);
        self
    }
}
