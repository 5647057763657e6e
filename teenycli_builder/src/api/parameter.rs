use std::fmt::Debug;
use std::str::FromStr;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::api::capture::{Converter, Datum};
use crate::matcher::{ArgumentConfig, Bound, OptionConfig};
use crate::model::{Arity, Nargs};
use crate::parser::{ArgumentParameter, ConfigError, OptionParameter};

type DefaultFn = Box<dyn Fn() -> Box<dyn Datum>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParameterClass {
    Flag,
    Positional,
}

/// The declaration of an argument, to be resolved via [`ArgP::add`](crate::ArgP::add).
///
/// The first name decides the kind of argument: a leading hyphen (`-C`, `--message`) makes it a flag,
/// otherwise it is a positional.
/// Everything left unset is inferred during resolution:
/// * Flags default to `Arity::Zero` (a `bool` switch) and optional.
/// * Positionals default to `Arity::One` and required.
///
/// ### Example
/// ```
/// # use teenycli_builder as teenycli;
/// use teenycli::{ArgP, Argument, Arity};
///
/// let mut argp: ArgP = ArgP::new("program");
/// argp.add(Argument::new(["-m", "--message"]).arity(Arity::One))
///     .unwrap()
///     .add(Argument::new(["paths"]).arity(Arity::Many).required(false))
///     .unwrap();
/// ```
pub struct Argument {
    names: Vec<String>,
    arity: Option<Arity>,
    required: Option<bool>,
    default: Option<DefaultFn>,
    converter: Option<Converter>,
    help: Option<String>,
    dest: Option<String>,
}

impl Argument {
    /// Declare an argument by its names (aliases).
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            arity: None,
            required: None,
            default: None,
            converter: None,
            help: None,
            dest: None,
        }
    }

    /// Set how many values the argument consumes.
    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity.replace(arity);
        self
    }

    /// Set whether the argument must be present.
    pub fn required(mut self, required: bool) -> Self {
        self.required.replace(required);
        self
    }

    /// Set the value used when the argument is absent.
    /// A default makes the argument optional; it cannot be combined with `required(true)`.
    ///
    /// For `Arity::Many` the default should be a `Vec<T>`, and for `Arity::Zero` it must be a `bool`.
    /// `&'static str` values are stored as `String`, to match unconverted tokens.
    pub fn default<T>(mut self, value: T) -> Self
    where
        T: Clone + Debug + 'static,
    {
        self.default
            .replace(Box::new(move || normalize(Box::new(value.clone()))));
        self
    }

    /// Convert each raw token to `T` (via `FromStr`) at parse time.
    /// Without a converter, tokens are kept as `String`.
    pub fn convert<T>(mut self) -> Self
    where
        T: FromStr + Debug + 'static,
    {
        self.converter.replace(Converter::of::<T>());
        self
    }

    /// Document the argument for the help message.
    pub fn help(mut self, description: impl Into<String>) -> Self {
        self.help.replace(description.into());
        self
    }

    /// Override the name the argument is stored under in the [`Bundle`](crate::Bundle).
    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest.replace(dest.into());
        self
    }
}

fn normalize(datum: Box<dyn Datum>) -> Box<dyn Datum> {
    if let Some(value) = datum.downcast_ref::<&'static str>() {
        return Box::new(value.to_string());
    }

    if let Some(values) = datum.downcast_ref::<Vec<&'static str>>() {
        return Box::new(values.iter().map(|v| v.to_string()).collect::<Vec<String>>());
    }

    datum
}

/// Strip leading hyphens and turn the internal ones into underscores.
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim_start_matches('-').replace('-', "_")
}

/// The fully resolved parsing rule for one argument.
pub(crate) struct ArgumentSpec {
    class: ParameterClass,
    names: Vec<String>,
    dest: String,
    arity: Arity,
    required: bool,
    nargs: Nargs,
    default: Option<DefaultFn>,
    converter: Converter,
    help: Option<String>,
}

impl std::fmt::Debug for ArgumentSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let class = match &self.class {
            ParameterClass::Flag => "Flag",
            ParameterClass::Positional => "Positional",
        };

        write!(
            f,
            "{class}[{names}, dest={dest}, {arity}, {nargs}, required={required}, {t}]",
            names = self.names.join("/"),
            dest = self.dest,
            arity = self.arity,
            nargs = self.nargs,
            required = self.required,
            t = self.converter.type_name(),
        )
    }
}

impl ArgumentSpec {
    /// Resolve a declaration into its parsing rule.
    ///
    /// The steps are applied in order, and each may reject the declaration:
    /// 1. At least one name.
    /// 2. The first name decides between flag and positional.
    /// 3. `Arity::Zero` is for flags only.
    /// 4. `Arity::Zero` cannot be required.
    /// 5. An explicit default cannot be required, and otherwise makes the argument optional.
    /// 6. Without a default, `Arity::Many` defaults to an empty sequence and others to absent.
    /// 7. Without an arity, an un-required flag is `Arity::Zero`; anything else is `Arity::One`.
    /// 8. Without `required`, positionals are required and flags are not.
    pub(crate) fn resolve(argument: Argument) -> Result<Self, ConfigError> {
        let Argument {
            names,
            arity,
            mut required,
            mut default,
            converter,
            help,
            dest,
        } = argument;

        let first = match names.first() {
            Some(first) => first.clone(),
            None => return Err(ConfigError::NoNames),
        };
        let is_flag = first.starts_with('-');
        validate_names(&names, is_flag)?;

        if arity == Some(Arity::Zero) && !is_flag {
            return Err(ConfigError::ZeroPositional(first));
        }

        if arity == Some(Arity::Zero) && required == Some(true) {
            return Err(ConfigError::ZeroRequired(first));
        }

        let has_default = default.is_some();

        if has_default {
            if required == Some(true) {
                return Err(ConfigError::RequiredDefault(first));
            }

            required.replace(false);
        }

        let arity = arity.unwrap_or(if is_flag && required.is_none() {
            Arity::Zero
        } else {
            Arity::One
        });
        let required = required.unwrap_or(!is_flag);

        if arity == Arity::Zero {
            if converter.is_some() {
                return Err(ConfigError::ZeroConvert(first));
            }

            match &default {
                Some(default_fn) => {
                    if default_fn().downcast_ref::<bool>().is_none() {
                        return Err(ConfigError::ZeroDefault(first));
                    }
                }
                None => {
                    default.replace(Box::new(|| -> Box<dyn Datum> { Box::new(false) }));
                }
            }
        }

        let converter = converter.unwrap_or_default();

        if !has_default && arity == Arity::Many {
            default.replace(Box::new(move || converter.empty()));
        }

        let dest = match dest {
            Some(dest) => dest,
            None => {
                let chosen = names
                    .iter()
                    .find(|name| name.starts_with("--"))
                    .unwrap_or(&first);
                normalize_name(chosen)
            }
        };

        let spec = Self {
            class: if is_flag {
                ParameterClass::Flag
            } else {
                ParameterClass::Positional
            },
            nargs: Nargs::derive(arity, is_flag, required),
            names,
            dest,
            arity,
            required,
            default,
            converter,
            help,
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Resolved {spec:?}.");
        }

        Ok(spec)
    }

    pub(crate) fn class(&self) -> ParameterClass {
        self.class
    }

    pub(crate) fn names(&self) -> &[String] {
        &self.names
    }

    pub(crate) fn dest(&self) -> &str {
        &self.dest
    }

    pub(crate) fn arity(&self) -> Arity {
        self.arity
    }

    #[cfg(test)]
    pub(crate) fn required(&self) -> bool {
        self.required
    }

    #[cfg(test)]
    pub(crate) fn nargs(&self) -> Nargs {
        self.nargs
    }

    pub(crate) fn converter(&self) -> &Converter {
        &self.converter
    }

    /// A fresh copy of the default; `None` is the absent sentinel.
    pub(crate) fn default_value(&self) -> Option<Box<dyn Datum>> {
        self.default.as_ref().map(|default_fn| default_fn())
    }
}

fn validate_names(names: &[String], is_flag: bool) -> Result<(), ConfigError> {
    for name in names {
        if name.is_empty() || name == "-" || name == "--" {
            return Err(ConfigError::InvalidName {
                name: name.clone(),
                reason: "names must contain at least one non-hyphen character",
            });
        }

        if name.starts_with('-') != is_flag {
            return Err(ConfigError::InvalidName {
                name: name.clone(),
                reason: "flag and positional names cannot be mixed",
            });
        }

        if name.contains('=') {
            return Err(ConfigError::InvalidName {
                name: name.clone(),
                reason: "names cannot contain '='",
            });
        }
    }

    if !is_flag && names.len() > 1 {
        return Err(ConfigError::InvalidName {
            name: names[1].clone(),
            reason: "positionals take precisely one name",
        });
    }

    Ok(())
}

impl From<&ArgumentSpec> for OptionConfig {
    fn from(value: &ArgumentSpec) -> Self {
        OptionConfig::new(
            value.dest.clone(),
            value.names.clone(),
            Bound::from(value.nargs),
            value.required,
        )
    }
}

impl From<&ArgumentSpec> for ArgumentConfig {
    fn from(value: &ArgumentSpec) -> Self {
        ArgumentConfig::new(value.dest.clone(), Bound::from(value.nargs))
    }
}

impl From<&ArgumentSpec> for OptionParameter {
    fn from(value: &ArgumentSpec) -> Self {
        OptionParameter::new(
            value.names.clone(),
            value.dest.clone(),
            value.nargs,
            value.required,
            value.help.clone(),
        )
    }
}

impl From<&ArgumentSpec> for ArgumentParameter {
    fn from(value: &ArgumentSpec) -> Self {
        ArgumentParameter::new(value.dest.clone(), value.nargs, value.help.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn no_names() {
        let result = ArgumentSpec::resolve(Argument::new(Vec::<String>::new()));
        assert_matches!(result, Err(ConfigError::NoNames));
    }

    #[rstest]
    #[case(vec![""])]
    #[case(vec!["-"])]
    #[case(vec!["--"])]
    #[case(vec!["--long", "paths"])]
    #[case(vec!["paths", "--long"])]
    #[case(vec!["paths", "files"])]
    #[case(vec!["--color=auto"])]
    fn invalid_names(#[case] names: Vec<&str>) {
        let result = ArgumentSpec::resolve(Argument::new(names));
        assert_matches!(result, Err(ConfigError::InvalidName { .. }));
    }

    #[test]
    fn zero_positional() {
        let result = ArgumentSpec::resolve(Argument::new(["paths"]).arity(Arity::Zero));
        assert_matches!(result, Err(ConfigError::ZeroPositional(name)) => {
            assert_eq!(name, "paths");
        });
    }

    #[test]
    fn zero_required() {
        let result = ArgumentSpec::resolve(
            Argument::new(["--long"])
                .arity(Arity::Zero)
                .required(true),
        );
        assert_matches!(result, Err(ConfigError::ZeroRequired(name)) => {
            assert_eq!(name, "--long");
        });
    }

    #[rstest]
    #[case(vec!["--color"])]
    #[case(vec!["paths"])]
    fn required_default(#[case] names: Vec<&str>) {
        let result =
            ArgumentSpec::resolve(Argument::new(names).required(true).default("auto"));
        assert_matches!(result, Err(ConfigError::RequiredDefault(_)));
    }

    #[test]
    fn zero_convert() {
        let result = ArgumentSpec::resolve(
            Argument::new(["--long"])
                .arity(Arity::Zero)
                .convert::<u32>(),
        );
        assert_matches!(result, Err(ConfigError::ZeroConvert(_)));
    }

    #[test]
    fn zero_default_not_bool() {
        let result = ArgumentSpec::resolve(
            Argument::new(["--long"])
                .arity(Arity::Zero)
                .default("yes"),
        );
        assert_matches!(result, Err(ConfigError::ZeroDefault(_)));
    }

    #[test]
    fn zero_default_bool() {
        let spec = ArgumentSpec::resolve(
            Argument::new(["--long"])
                .arity(Arity::Zero)
                .default(true),
        )
        .unwrap();
        assert_eq!(spec.arity(), Arity::Zero);
        assert_eq!(
            spec.default_value().unwrap().downcast_ref::<bool>(),
            Some(&true)
        );
    }

    #[rstest]
    // Flags.
    #[case(Argument::new(["--long"]), Arity::Zero, false, Nargs::Precisely(0))]
    #[case(Argument::new(["--color"]).arity(Arity::One), Arity::One, false, Nargs::Precisely(1))]
    #[case(Argument::new(["--color"]).required(false), Arity::One, false, Nargs::Precisely(1))]
    #[case(Argument::new(["--color"]).required(true), Arity::One, true, Nargs::Precisely(1))]
    #[case(Argument::new(["--color"]).default("auto"), Arity::One, false, Nargs::Precisely(1))]
    #[case(Argument::new(["--items"]).arity(Arity::Many), Arity::Many, false, Nargs::Any)]
    #[case(Argument::new(["--items"]).arity(Arity::Many).required(true), Arity::Many, true, Nargs::AtLeastOne)]
    // Positionals.
    #[case(Argument::new(["path"]), Arity::One, true, Nargs::Precisely(1))]
    #[case(Argument::new(["path"]).required(false), Arity::One, false, Nargs::Optional)]
    #[case(Argument::new(["path"]).default("."), Arity::One, false, Nargs::Optional)]
    #[case(Argument::new(["paths"]).arity(Arity::Many), Arity::Many, true, Nargs::AtLeastOne)]
    #[case(Argument::new(["paths"]).arity(Arity::Many).required(false), Arity::Many, false, Nargs::Any)]
    #[case(Argument::new(["paths"]).arity(Arity::Many).default(vec!["."]), Arity::Many, false, Nargs::Any)]
    fn inference(
        #[case] argument: Argument,
        #[case] expected_arity: Arity,
        #[case] expected_required: bool,
        #[case] expected_nargs: Nargs,
    ) {
        // Execute
        let spec = ArgumentSpec::resolve(argument).unwrap();

        // Verify
        assert_eq!(spec.arity(), expected_arity);
        assert_eq!(spec.required(), expected_required);
        assert_eq!(spec.nargs(), expected_nargs);
    }

    #[test]
    fn default_flag_is_false() {
        let spec = ArgumentSpec::resolve(Argument::new(["--long"])).unwrap();
        assert_eq!(spec.class(), ParameterClass::Flag);
        assert_eq!(
            spec.default_value().unwrap().downcast_ref::<bool>(),
            Some(&false)
        );
    }

    #[test]
    fn default_one_is_absent() {
        let spec = ArgumentSpec::resolve(Argument::new(["--color"]).arity(Arity::One)).unwrap();
        assert!(spec.default_value().is_none());
    }

    #[test]
    fn default_many_is_empty() {
        let spec = ArgumentSpec::resolve(
            Argument::new(["--items"])
                .arity(Arity::Many)
                .convert::<u32>(),
        )
        .unwrap();
        assert_eq!(
            spec.default_value().unwrap().downcast_ref::<Vec<u32>>(),
            Some(&vec![])
        );
    }

    #[test]
    fn default_str_normalized() {
        let spec = ArgumentSpec::resolve(Argument::new(["--color"]).default("auto")).unwrap();
        assert_eq!(
            spec.default_value().unwrap().downcast_ref::<String>(),
            Some(&"auto".to_string())
        );

        let spec = ArgumentSpec::resolve(
            Argument::new(["paths"])
                .arity(Arity::Many)
                .default(vec!["a", "b"]),
        )
        .unwrap();
        assert_eq!(
            spec.default_value().unwrap().downcast_ref::<Vec<String>>(),
            Some(&vec!["a".to_string(), "b".to_string()])
        );
    }

    #[rstest]
    #[case(Argument::new(["--long"]), "long")]
    #[case(Argument::new(["-m", "--message"]), "message")]
    #[case(Argument::new(["-C"]), "C")]
    #[case(Argument::new(["-C"]).dest("change"), "change")]
    #[case(Argument::new(["--dry-run"]), "dry_run")]
    #[case(Argument::new(["-n", "--dry-run", "--no-op"]), "dry_run")]
    #[case(Argument::new(["file-paths"]), "file_paths")]
    fn dest(#[case] argument: Argument, #[case] expected: &str) {
        let spec = ArgumentSpec::resolve(argument).unwrap();
        assert_eq!(spec.dest(), expected);
    }

    #[test]
    fn configs() {
        let spec = ArgumentSpec::resolve(
            Argument::new(["-i", "--items"])
                .arity(Arity::Many)
                .required(true),
        )
        .unwrap();
        let option_config = OptionConfig::from(&spec);
        assert_eq!(option_config.name(), "items");
        assert_eq!(option_config.bound(), Bound::Lower(1));
        assert!(option_config.required());

        let spec = ArgumentSpec::resolve(Argument::new(["path"]).required(false)).unwrap();
        let argument_config = ArgumentConfig::from(&spec);
        assert_eq!(argument_config.name(), "path");
        assert_eq!(argument_config.bound(), Bound::Range(0, 1));
    }
}
