//! SI unit scaling.
//!
//! Positions handed to the index resolver may be given in any SI-scalable
//! variant of a dimension's declared unit, e.g. a position in `"ms"` against a
//! dimension declared in `"s"`. [`scaling`] computes the multiplicative factor
//! between two such unit strings, failing if they are not scaled versions of
//! the same base unit.

use thiserror::Error;

/// A unit that cannot be interpreted or converted.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UnitError {
    /// The unit string cannot be parsed.
    #[error("cannot interpret unit {_0:?}")]
    InvalidUnit(String),
    /// The units are not scaled versions of the same base unit.
    #[error("unit {_0:?} is not scalable to {_1:?}")]
    NotScalable(String, String),
}

/// SI prefixes, longest first so that `"da"` wins over `"d"`.
const PREFIXES: &[(&str, f64)] = &[
    ("da", 1e1),
    ("Y", 1e24),
    ("Z", 1e21),
    ("E", 1e18),
    ("P", 1e15),
    ("T", 1e12),
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("h", 1e2),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("\u{b5}", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
    ("f", 1e-15),
    ("a", 1e-18),
    ("z", 1e-21),
    ("y", 1e-24),
];

/// Split an optional integer power suffix, e.g. `"s^2"` into `("s", 2)`.
fn split_power(unit: &str) -> Result<(&str, i32), UnitError> {
    match unit.split_once('^') {
        Some((body, power)) => {
            let power = power
                .parse::<i32>()
                .map_err(|_| UnitError::InvalidUnit(unit.to_string()))?;
            Ok((body, power))
        }
        None => Ok((unit, 1)),
    }
}

/// All readings of a unit body: as a bare base unit, and as prefix + base.
fn readings(body: &str) -> Vec<(f64, &str)> {
    let mut out = vec![(1.0, body)];
    for (prefix, factor) in PREFIXES {
        if let Some(base) = body.strip_prefix(prefix) {
            if !base.is_empty() {
                out.push((*factor, base));
            }
        }
    }
    out
}

/// Return the factor that converts a quantity given in `from` into `to`.
///
/// Both units must be SI-scaled versions of the same base unit; the base unit
/// itself is an opaque string. An optional `^N` power suffix is honoured and
/// must agree between the two units.
///
/// # Errors
/// Returns [`UnitError`] if either unit is malformed or the units do not share
/// a base unit.
pub fn scaling(from: &str, to: &str) -> Result<f64, UnitError> {
    if from.is_empty() || to.is_empty() {
        return Err(UnitError::InvalidUnit(
            if from.is_empty() { from } else { to }.to_string(),
        ));
    }
    if from == to {
        return Ok(1.0);
    }

    let (from_body, from_power) = split_power(from)?;
    let (to_body, to_power) = split_power(to)?;
    if from_power != to_power {
        return Err(UnitError::NotScalable(from.to_string(), to.to_string()));
    }

    for (from_factor, from_base) in readings(from_body) {
        for (to_factor, to_base) in readings(to_body) {
            if from_base == to_base {
                return Ok((from_factor / to_factor).powi(from_power));
            }
        }
    }
    Err(UnitError::NotScalable(from.to_string(), to.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_identity() {
        assert_eq!(scaling("s", "s").unwrap(), 1.0);
        assert_eq!(scaling("mV", "mV").unwrap(), 1.0);
    }

    #[test]
    fn scaling_prefix_to_base() {
        assert_eq!(scaling("ms", "s").unwrap(), 1e-3);
        assert_eq!(scaling("s", "ms").unwrap(), 1e3);
        assert_eq!(scaling("kV", "V").unwrap(), 1e3);
        assert_eq!(scaling("uA", "A").unwrap(), 1e-6);
    }

    #[test]
    fn scaling_prefix_to_prefix() {
        let scale = scaling("mV", "kV").unwrap();
        assert!((scale - 1e-6).abs() < 1e-18);
        assert_eq!(scaling("um", "mm").unwrap(), 1e-3);
    }

    #[test]
    fn scaling_powers() {
        assert_eq!(scaling("ms^2", "s^2").unwrap(), 1e-6);
        assert_eq!(
            scaling("s^2", "s"),
            Err(UnitError::NotScalable("s^2".to_string(), "s".to_string()))
        );
    }

    #[test]
    fn scaling_incompatible() {
        assert!(scaling("s", "V").is_err());
        assert!(scaling("mV", "ms").is_err());
    }

    #[test]
    fn scaling_empty_is_invalid() {
        assert_eq!(scaling("", "s"), Err(UnitError::InvalidUnit(String::new())));
    }
}
