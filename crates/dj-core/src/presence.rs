//! # Presence Tristate
//!
//! `Presence<T>` records whether a field was omitted (`Unset`), sent as an
//! explicit null (`Null`), or sent with a value (`Value(T)`).
//!
//! The distinction matters on the way back out: re-encoding omits `Unset`
//! fields entirely and writes `null` for `Null` fields, so a transport can
//! tell "leave unchanged" from "clear this value".

use crate::error::PresenceError;

/// Three-way presence state of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Presence<T> {
    /// The field was omitted entirely.
    #[default]
    Unset,
    /// The field was present with an explicit null.
    Null,
    /// The field was present with a value.
    Value(T),
}

impl<T> Presence<T> {
    /// Returns true unless the field was omitted.
    pub fn is_set(&self) -> bool {
        !matches!(self, Presence::Unset)
    }

    /// Returns true if the field was omitted.
    pub fn is_unset(&self) -> bool {
        matches!(self, Presence::Unset)
    }

    /// Returns true if the field carried an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, Presence::Null)
    }

    /// Returns true if the field carried a value.
    pub fn is_value(&self) -> bool {
        matches!(self, Presence::Value(_))
    }

    /// Borrow the value.
    ///
    /// # Errors
    ///
    /// Returns `PresenceError::Unset` or `PresenceError::Null` when there is
    /// no value to borrow.
    pub fn get(&self) -> Result<&T, PresenceError> {
        match self {
            Presence::Value(v) => Ok(v),
            Presence::Null => Err(PresenceError::Null { field: None }),
            Presence::Unset => Err(PresenceError::Unset { field: None }),
        }
    }

    /// Take the value.
    ///
    /// # Errors
    ///
    /// Same as [`Presence::get`].
    pub fn into_value(self) -> Result<T, PresenceError> {
        match self {
            Presence::Value(v) => Ok(v),
            Presence::Null => Err(PresenceError::Null { field: None }),
            Presence::Unset => Err(PresenceError::Unset { field: None }),
        }
    }

    /// The value if present. `Unset` and `Null` both collapse to `None`.
    pub fn value(&self) -> Option<&T> {
        match self {
            Presence::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Consume into an `Option`, collapsing `Unset` and `Null`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Presence::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Presence<&T> {
        match self {
            Presence::Unset => Presence::Unset,
            Presence::Null => Presence::Null,
            Presence::Value(v) => Presence::Value(v),
        }
    }

    /// Map the carried value, preserving `Unset` and `Null`.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Presence<U> {
        match self {
            Presence::Unset => Presence::Unset,
            Presence::Null => Presence::Null,
            Presence::Value(v) => Presence::Value(f(v)),
        }
    }

    /// Map the carried value through a fallible conversion.
    pub fn try_map<U, E, F: FnOnce(T) -> Result<U, E>>(self, f: F) -> Result<Presence<U>, E> {
        Ok(match self {
            Presence::Unset => Presence::Unset,
            Presence::Null => Presence::Null,
            Presence::Value(v) => Presence::Value(f(v)?),
        })
    }
}

impl<T> From<Option<T>> for Presence<T> {
    /// `None` maps to `Null`, not `Unset`: an `Option` always says something.
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Presence::Value(v),
            None => Presence::Null,
        }
    }
}
