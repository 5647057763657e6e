use crate::model::Nargs;

pub(crate) type OffsetValue = (usize, String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Bound {
    Range(u8, u8),
    Lower(u8),
}

impl From<Nargs> for Bound {
    fn from(value: Nargs) -> Self {
        match value {
            Nargs::Precisely(n) => Bound::Range(n, n),
            Nargs::Optional => Bound::Range(0, 1),
            Nargs::Any => Bound::Lower(0),
            Nargs::AtLeastOne => Bound::Lower(1),
        }
    }
}

#[cfg(test)]
impl rand::distributions::Distribution<Bound> for rand::distributions::Standard {
    fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Bound {
        match rng.gen_range(0..2) {
            0 => {
                let upper: u8 = rng.gen();

                if upper == 0 {
                    Bound::Range(0, upper)
                } else {
                    Bound::Range(rng.gen_range(0..upper), upper)
                }
            }
            1 => Bound::Lower(rng.gen()),
            _ => unreachable!("internal error - impossible gen_range()"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ArgumentConfig {
    name: String,
    bound: Bound,
}

impl ArgumentConfig {
    pub(crate) fn new(name: impl Into<String>, bound: Bound) -> Self {
        Self {
            name: name.into(),
            bound,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn bound(&self) -> Bound {
        self.bound
    }
}

/// A flag as seen by the matcher.
/// The `name` is the destination, while `aliases` hold the literal Cli spellings (ex: `-m`, `--message`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptionConfig {
    name: String,
    aliases: Vec<String>,
    bound: Bound,
    required: bool,
}

impl OptionConfig {
    pub(crate) fn new(
        name: impl Into<String>,
        aliases: Vec<String>,
        bound: Bound,
        required: bool,
    ) -> Self {
        Self {
            name: name.into(),
            aliases,
            bound,
            required,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub(crate) fn bound(&self) -> Bound {
        self.bound
    }

    pub(crate) fn required(&self) -> bool {
        self.required
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Matches {
    pub values: Vec<crate::matcher::MatchTokens>,
}

impl Matches {
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.values.iter().any(|mt| mt.name == name)
    }
}
