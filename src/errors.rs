// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Errors associated with all aspects of array_beam.
 */

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BeamError {
    /// A parameter was out of its allowed range (e.g. a non-positive spacing,
    /// radius or wavenumber, or no antennas).
    #[error("Invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A caller-supplied buffer can't hold everything that would be written.
    #[error("The {name} buffer is too small; it needs at least {required} elements, but has {got}")]
    BufferTooSmall {
        name: &'static str,
        required: usize,
        got: usize,
    },

    #[error("Found a non-finite value in {what} (index {index})")]
    NonFiniteInput { what: &'static str, index: usize },

    /// The circular layout generator couldn't keep an antenna away from its
    /// neighbours.
    #[error("Couldn't place antenna {index} at least {min_separation} m from its neighbours after {attempts} attempts; try a smaller minimum separation, smaller placement errors or a different seed")]
    ConstraintUnsatisfiable {
        index: usize,
        attempts: u32,
        min_separation: f64,
    },
}

impl BeamError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> BeamError {
        BeamError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Complain unless `value` is finite and strictly positive.
pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<(), BeamError> {
    if !value.is_finite() {
        return Err(BeamError::invalid(name, format!("{value} isn't finite")));
    }
    if value <= 0.0 {
        return Err(BeamError::invalid(
            name,
            format!("{value} must be greater than 0"),
        ));
    }
    Ok(())
}

/// Complain unless `value` is finite and not negative.
pub(crate) fn check_non_negative(name: &'static str, value: f64) -> Result<(), BeamError> {
    if !value.is_finite() {
        return Err(BeamError::invalid(name, format!("{value} isn't finite")));
    }
    if value < 0.0 {
        return Err(BeamError::invalid(name, format!("{value} is negative")));
    }
    Ok(())
}
