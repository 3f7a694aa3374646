use {
    crate::{date_helpers, registrations::Discrimination},
    rocket::serde::{de, Deserialize},
    std::fmt,
};

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Whether registrations without individual, bulk or booth details are reported as sponsor
    /// registrations without checking for the sponsor details. If false, registrations need to
    /// have exactly one detail attached, others fail the whole request.
    #[serde(default = "enabled")]
    pub legacy_sponsor_fallback: bool,

    /// Whether an empty database is answered with 404 instead of an empty list.
    #[serde(default = "enabled")]
    pub empty_as_not_found: bool,

    /// Put in front of every amount of money shown on the dashboard.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// How the creation date is shown in the registration table, in `strftime` syntax.
    #[serde(
        default = "default_date_format",
        deserialize_with = "deserialize_date_format"
    )]
    pub date_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            legacy_sponsor_fallback: true,
            empty_as_not_found: true,
            currency_symbol: default_currency_symbol(),
            date_format: default_date_format(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            discrimination: if self.legacy_sponsor_fallback {
                Discrimination::LegacySponsorFallback
            } else {
                Discrimination::Strict
            },
            empty_as_not_found: self.empty_as_not_found,
        }
    }
}

/// The part of the config needed to load registrations, small enough to be moved into database
/// closures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    pub discrimination: Discrimination,
    pub empty_as_not_found: bool,
}

fn enabled() -> bool {
    true
}

fn default_currency_symbol() -> String {
    "R".to_string()
}

fn default_date_format() -> String {
    "%Y/%m/%d".to_string()
}

/// Only lets through formats chrono can actually render, so formatting can't panic later on.
fn deserialize_date_format<'de, D: de::Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    use de::Unexpected::Str;

    struct Visitor;

    impl<'de> de::Visitor<'de> for Visitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a strftime format string")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            if date_helpers::is_valid_format(value) {
                Ok(value.to_string())
            } else {
                Err(E::invalid_value(Str(value), &self))
            }
        }
    }

    de.deserialize_str(Visitor)
}
