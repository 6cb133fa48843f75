//! Bounded country selection.

use crate::error::{AppError, Result};

use super::Country;

/// Upper bound on countries per run.
pub const MAX_SELECTED: usize = 10;

/// Ordered set of selected countries, capped at a maximum size.
#[derive(Debug, Clone)]
pub struct CountrySelection {
    selected: Vec<Country>,
    limit: usize,
}

impl CountrySelection {
    pub fn new() -> Self {
        Self::with_limit(MAX_SELECTED)
    }

    /// A selection that holds at most `limit` countries, never more than
    /// [`MAX_SELECTED`].
    pub fn with_limit(limit: usize) -> Self {
        Self {
            selected: Vec::new(),
            limit: limit.min(MAX_SELECTED),
        }
    }

    /// Build a selection from country codes, in the given order.
    pub fn from_codes<S: AsRef<str>>(codes: &[S], limit: usize) -> Result<Self> {
        let mut selection = Self::with_limit(limit);
        for code in codes {
            let code = code.as_ref();
            let country = Country::find(code)
                .ok_or_else(|| AppError::validation(format!("Unknown country code '{code}'")))?;
            if selection.contains(country.code) {
                continue;
            }
            selection.select(*country)?;
        }
        Ok(selection)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.selected.iter().any(|c| c.code == code)
    }

    /// Add a country. Fails once the limit is reached; re-adding is a no-op.
    pub fn select(&mut self, country: Country) -> Result<()> {
        if self.contains(country.code) {
            return Ok(());
        }
        if self.selected.len() >= self.limit {
            return Err(AppError::validation(format!(
                "At most {} countries can be selected",
                self.limit
            )));
        }
        self.selected.push(country);
        Ok(())
    }

    /// Select if absent, deselect if present. Returns whether the country is
    /// selected afterwards.
    pub fn toggle(&mut self, country: Country) -> Result<bool> {
        if self.contains(country.code) {
            self.selected.retain(|c| c.code != country.code);
            Ok(false)
        } else {
            self.select(country)?;
            Ok(true)
        }
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn countries(&self) -> &[Country] {
        &self.selected
    }

    pub fn into_countries(self) -> Vec<Country> {
        self.selected
    }
}

impl Default for CountrySelection {
    fn default() -> Self {
        Self::new()
    }
}
