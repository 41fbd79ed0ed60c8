//! Van der Waals radii used to size each atom's sampling sphere.
//!
//! The built-in table covers the elements found in biological structures
//! (C, N, O, S, H, P, halogens and common metal ions). Elements outside the
//! table are an error unless a fallback radius is configured explicitly, since
//! a silently substituted radius distorts every surface area around it.

use phf::{Map, phf_map};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Built-in van der Waals radii in Angstroms, keyed by upper-case element symbol.
pub static DEFAULT_RADII: Map<&'static str, f64> = phf_map! {
    "H" => 1.20, "D" => 1.20, "HE" => 1.40,
    "C" => 1.70, "N" => 1.55, "O" => 1.52, "F" => 1.47,
    "NA" => 2.27, "MG" => 1.73, "AL" => 1.84, "SI" => 2.10,
    "P" => 1.80, "S" => 1.80, "CL" => 1.75,
    "K" => 2.75, "CA" => 2.31,
    "MN" => 2.00, "FE" => 2.00, "CO" => 2.00, "NI" => 1.63, "CU" => 1.40, "ZN" => 1.39,
    "SE" => 1.90, "BR" => 1.85, "CD" => 1.58, "I" => 1.98, "HG" => 1.55,
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RadiusError {
    #[error("No van der Waals radius defined for element '{0}'")]
    UnknownElement(String),
    #[error("Invalid radius {radius} for element '{element}' (must be finite and positive)")]
    InvalidRadius { element: String, radius: f64 },
    #[error("Failed to read radius table '{path}': {message}")]
    Load { path: String, message: String },
}

/// Result of a radius lookup, recording whether the fallback was used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RadiusLookup {
    Table(f64),
    Fallback(f64),
}

impl RadiusLookup {
    pub fn value(self) -> f64 {
        match self {
            RadiusLookup::Table(r) | RadiusLookup::Fallback(r) => r,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, RadiusLookup::Fallback(_))
    }
}

/// Element → radius mapping with optional overrides and fallback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadiusTable {
    overrides: HashMap<String, f64>,
    fallback: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct RadiusTableFile {
    fallback: Option<f64>,
    #[serde(default)]
    radii: HashMap<String, f64>,
}

fn validate(element: &str, radius: f64) -> Result<f64, RadiusError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(RadiusError::InvalidRadius {
            element: element.to_string(),
            radius,
        })
    }
}

impl RadiusTable {
    /// Creates a table backed by [`DEFAULT_RADII`] with no fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces entries. Keys are matched case-insensitively.
    pub fn with_overrides<I, S>(mut self, entries: I) -> Result<Self, RadiusError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        for (element, radius) in entries {
            let key = element.as_ref().trim().to_ascii_uppercase();
            let radius = validate(&key, radius)?;
            self.overrides.insert(key, radius);
        }
        Ok(self)
    }

    /// Uses `radius` for any element missing from the table.
    pub fn with_fallback(mut self, radius: f64) -> Result<Self, RadiusError> {
        self.fallback = Some(validate("*", radius)?);
        Ok(self)
    }

    /// Loads overrides and an optional fallback from a TOML file:
    ///
    /// ```toml
    /// fallback = 2.0
    ///
    /// [radii]
    /// FE = 2.0
    /// MO = 2.1
    /// ```
    pub fn from_toml_file(path: &Path) -> Result<Self, RadiusError> {
        let load_err = |message: String| RadiusError::Load {
            path: path.display().to_string(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let file: RadiusTableFile = toml::from_str(&content).map_err(|e| load_err(e.to_string()))?;
        debug!(
            path = %path.display(),
            overrides = file.radii.len(),
            "Loaded radius table."
        );

        let table = Self::new().with_overrides(file.radii)?;
        match file.fallback {
            Some(r) => table.with_fallback(r),
            None => Ok(table),
        }
    }

    pub fn fallback(&self) -> Option<f64> {
        self.fallback
    }

    /// Looks up the radius for an element symbol.
    ///
    /// # Errors
    ///
    /// Returns [`RadiusError::UnknownElement`] if the element is neither in the
    /// overrides nor the built-in table and no fallback is configured.
    pub fn lookup(&self, element: &str) -> Result<RadiusLookup, RadiusError> {
        let key = element.trim().to_ascii_uppercase();
        if let Some(&r) = self.overrides.get(&key) {
            return Ok(RadiusLookup::Table(r));
        }
        if let Some(&r) = DEFAULT_RADII.get(key.as_str()) {
            return Ok(RadiusLookup::Table(r));
        }
        match self.fallback {
            Some(r) => Ok(RadiusLookup::Fallback(r)),
            None => Err(RadiusError::UnknownElement(key)),
        }
    }

    /// Shorthand for [`lookup`](Self::lookup) that discards the fallback flag.
    pub fn radius(&self, element: &str) -> Result<f64, RadiusError> {
        self.lookup(element).map(RadiusLookup::value)
    }
}
