mod bundle;
mod capture;
mod core;
mod parameter;

pub use self::core::{ArgP, Command, Handler};
pub use bundle::*;
pub use capture::Datum;
pub use parameter::Argument;

pub(crate) use capture::InvalidCapture;
pub(crate) use parameter::{ArgumentSpec, ParameterClass};
