/// How many values a declared argument consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Presence only; the argument resolves to a `bool`.
    /// Only applies to flags.
    Zero,
    /// A single value.
    One,
    /// A sequence of values.
    Many,
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The cardinality of inputs to match for an argument/flag.
///
/// Inspired by argparse: <https://docs.python.org/3/library/argparse.html#nargs>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nargs {
    /// `N`: Precisely `N` values.
    Precisely(u8),
    /// `?`: Either zero or one value.
    Optional,
    /// `*`: May be any number of values, including `0`.
    Any,
    /// `+`: At least one value must be specified.
    AtLeastOne,
}

impl Nargs {
    /// Derive the multiplicity for a resolved argument.
    pub(crate) fn derive(arity: Arity, is_flag: bool, required: bool) -> Self {
        match arity {
            Arity::Zero => Nargs::Precisely(0),
            Arity::One => {
                if !required && !is_flag {
                    Nargs::Optional
                } else {
                    Nargs::Precisely(1)
                }
            }
            Arity::Many => {
                if required {
                    Nargs::AtLeastOne
                } else {
                    Nargs::Any
                }
            }
        }
    }
}

impl std::fmt::Display for Nargs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Arity::Zero, true, false, Nargs::Precisely(0))]
    #[case(Arity::One, true, false, Nargs::Precisely(1))]
    #[case(Arity::One, true, true, Nargs::Precisely(1))]
    #[case(Arity::One, false, true, Nargs::Precisely(1))]
    #[case(Arity::One, false, false, Nargs::Optional)]
    #[case(Arity::Many, true, false, Nargs::Any)]
    #[case(Arity::Many, true, true, Nargs::AtLeastOne)]
    #[case(Arity::Many, false, true, Nargs::AtLeastOne)]
    #[case(Arity::Many, false, false, Nargs::Any)]
    fn derive(
        #[case] arity: Arity,
        #[case] is_flag: bool,
        #[case] required: bool,
        #[case] expected: Nargs,
    ) {
        assert_eq!(Nargs::derive(arity, is_flag, required), expected);
    }
}
