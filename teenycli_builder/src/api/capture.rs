use std::any::Any;
use std::fmt::Debug;
use std::str::FromStr;
use thiserror::Error;

/// A value held in a [`Bundle`](crate::Bundle).
///
/// Implemented for every `'static` type that is `Debug`, so it never needs to be implemented by hand.
pub trait Datum: Any + Debug {
    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;

    #[doc(hidden)]
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any + Debug> Datum for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl dyn Datum {
    /// Borrow the datum as a `T`, if that is its type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Take the datum as a `T`, if that is its type.
    pub fn downcast<T: Any>(self: Box<Self>) -> Option<T> {
        self.into_any().downcast::<T>().ok().map(|value| *value)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[doc(hidden)]
pub enum InvalidCapture {
    #[error("'{token}' cannot convert to {type_name}.")]
    InvalidConversion {
        token: String,
        type_name: &'static str,
    },
}

/// Converts raw tokens into the typed value of one argument.
///
/// Held as plain function pointers, so that the converted type `T` is fixed at declaration time while
/// the parser itself works across all `T`.
#[derive(Clone, Copy)]
pub(crate) struct Converter {
    type_name: &'static str,
    one: fn(&str) -> Result<Box<dyn Datum>, InvalidCapture>,
    many: fn(&[&str]) -> Result<Box<dyn Datum>, (usize, InvalidCapture)>,
    empty: fn() -> Box<dyn Datum>,
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Converter<{}>", self.type_name)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::of::<String>()
    }
}

impl Converter {
    pub(crate) fn of<T>() -> Self
    where
        T: FromStr + Debug + 'static,
    {
        Self {
            type_name: std::any::type_name::<T>(),
            one: convert_one::<T>,
            many: convert_many::<T>,
            empty: empty_many::<T>,
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Capture a single value.
    pub(crate) fn capture(&self, token: &str) -> Result<Box<dyn Datum>, InvalidCapture> {
        (self.one)(token)
    }

    /// Capture a sequence of values into a `Vec<T>`.
    /// On failure, reports the index of the offending token.
    pub(crate) fn capture_all(
        &self,
        tokens: &[&str],
    ) -> Result<Box<dyn Datum>, (usize, InvalidCapture)> {
        (self.many)(tokens)
    }

    /// An empty `Vec<T>`.
    pub(crate) fn empty(&self) -> Box<dyn Datum> {
        (self.empty)()
    }
}

fn parse<T: FromStr>(token: &str) -> Result<T, InvalidCapture> {
    T::from_str(token).map_err(|_| InvalidCapture::InvalidConversion {
        token: token.to_string(),
        type_name: std::any::type_name::<T>(),
    })
}

fn convert_one<T>(token: &str) -> Result<Box<dyn Datum>, InvalidCapture>
where
    T: FromStr + Debug + 'static,
{
    Ok(Box::new(parse::<T>(token)?))
}

fn convert_many<T>(tokens: &[&str]) -> Result<Box<dyn Datum>, (usize, InvalidCapture)>
where
    T: FromStr + Debug + 'static,
{
    let mut values: Vec<T> = Vec::with_capacity(tokens.len());

    for (index, token) in tokens.iter().enumerate() {
        values.push(parse::<T>(token).map_err(|error| (index, error))?);
    }

    Ok(Box::new(values))
}

fn empty_many<T: Debug + 'static>() -> Box<dyn Datum> {
    Box::new(Vec::<T>::new())
}
