//! Thickness notation
//!
//! A layer thickness cell accepts, besides a plain number of nanometres:
//!
//! | Input | Optical thickness |
//! |-------|-------------------|
//! | `L/N`, `l/N`, `/N` | λ0 / N |
//! | `*X` | X quarter waves, 0.25 · X · λ0 |
//!
//! The physical thickness is the optical thickness divided by the layer
//! material's index at λ0.

use coatingtk_core::{codes, CoatingError, MaterialLookup};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

fn get_fraction_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[Ll]?/([0-9]+)$").unwrap())
}

fn get_quarter_wave_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\*([0-9]*\.?[0-9]*)$").unwrap())
}

/// Parsed thickness text
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notation {
    /// `L/N`: optical thickness λ0 / N. Held as f64 so any digit run parses
    Fraction(f64),
    /// `*X`: optical thickness 0.25 · X · λ0
    QuarterWaves(f64),
    /// Physical thickness in nm
    Literal(f64),
}

impl Notation {
    /// Classify thickness text; the first matching form wins
    pub fn parse(text: &str) -> Result<Self, CoatingError> {
        if let Some(caps) = get_fraction_regex().captures(text) {
            return match caps[1].parse::<f64>() {
                Ok(n) if n > 0.0 => Ok(Notation::Fraction(n)),
                _ => Err(CoatingError::invalid_thickness(text)),
            };
        }
        if let Some(caps) = get_quarter_wave_regex().captures(text) {
            if let Ok(x) = caps[1].parse::<f64>() {
                return Ok(Notation::QuarterWaves(x));
            }
        }
        match text.trim().parse::<f64>() {
            Ok(t) if t.is_finite() && t >= 0.0 => Ok(Notation::Literal(t)),
            _ => Err(CoatingError::invalid_thickness(text)),
        }
    }

    /// Fraction of λ0 for the two wavelength-relative forms
    pub fn wavelength_fraction(&self) -> Option<f64> {
        match *self {
            Notation::Fraction(n) => Some(1.0 / n),
            Notation::QuarterWaves(x) => Some(0.25 * x),
            Notation::Literal(_) => None,
        }
    }
}

/// Outcome of resolving thickness text
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Physical thickness in nm
    Resolved(f64),
    /// The layer material is not defined yet, the text is kept as typed
    Unchanged(String),
}

/// Resolve thickness text against the layer material at `lambda0`.
///
/// An undefined material is not an error here: the user may still be typing
/// its name, so the text comes back untouched.
pub fn resolve(
    text: &str,
    material_name: &str,
    lambda0: f64,
    materials: &dyn MaterialLookup,
) -> Result<Resolution, CoatingError> {
    let fraction = match Notation::parse(text)? {
        Notation::Literal(t) => return Ok(Resolution::Resolved(t)),
        notation => notation.wavelength_fraction().unwrap_or(0.0),
    };

    let material = match materials.get_material(material_name) {
        Ok(m) => m,
        Err(e) if e.is(codes::MATERIAL_NOT_DEFINED) => {
            debug!(text, material = material_name, "thickness notation left unresolved");
            return Ok(Resolution::Unchanged(text.to_string()));
        }
        Err(e) => return Err(e),
    };
    let n = material.n(lambda0);
    if !(n > 0.0 && n.is_finite()) {
        return Err(CoatingError::invalid_value(material.name(), &n.to_string(), "a refractive index > 0"));
    }
    Ok(Resolution::Resolved(fraction * lambda0 / n))
}
