//! Range checks for the player and app settings
//!
//! A hand-edited `config.toml` may hold values the player cannot use. Loading
//! keeps them and logs the [`Violations`]; saving refuses them.

use std::fmt;

/// One setting outside what the player accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path as written in `config.toml`, e.g. `player.audio_speed`
    pub field: String,
    pub problem: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            problem: problem.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.problem)
    }
}

/// Every problem found in one pass over the settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<ValidationError>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Records `section.field` unless `min <= value <= max`; NaN never passes
    pub fn check_range<T>(&mut self, section: &str, field: &str, value: T, min: T, max: T)
    where
        T: PartialOrd + fmt::Display,
    {
        let within = min <= value && value <= max;
        if !within {
            self.push(ValidationError::new(
                format!("{}.{}", section, field),
                format!("expected {} to {}, got {}", min, max, value),
            ));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

/// A `[table]` of `config.toml`
pub trait ConfigSection: Default {
    /// Table name, used as the prefix of every reported field
    const NAME: &'static str;

    fn check(&self, found: &mut Violations);

    fn validate(&self) -> Result<(), Violations> {
        let mut found = Violations::new();
        self.check(&mut found);
        found.into_result()
    }
}
