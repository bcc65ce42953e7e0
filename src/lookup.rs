//! Typed access to input values.

use crate::input::Input;
use crate::kind::InputKind;
use thiserror::Error;

/// Errors raised by typed lookups.
///
/// A missing name is never an error; only a name bound to an input of a
/// different kind is, since that points at a broken tree definition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("input '{name}' is a {actual}, not a {expected}")]
    StructuralMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// A Rust type that can be read out of an input's value slot.
pub trait InputValue: Sized {
    /// Kind name reported when the stored input does not match.
    const EXPECTED: &'static str;

    /// Whether inputs of `kind` store values of this type.
    fn accepts(kind: &InputKind) -> bool;

    /// The stored value, or `None` if the slot is unset or of another kind.
    fn from_kind(kind: &InputKind) -> Option<Self>;
}

impl InputValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn accepts(kind: &InputKind) -> bool {
        matches!(
            kind,
            InputKind::Flag(_) | InputKind::Boolean(_) | InputKind::Feature(_)
        )
    }

    fn from_kind(kind: &InputKind) -> Option<Self> {
        match kind {
            InputKind::Flag(value) | InputKind::Boolean(value) => *value,
            InputKind::Feature(feature) => feature.matched(),
            _ => None,
        }
    }
}

macro_rules! impl_number_value {
    ($($ty:ty => $variant:ident, $label:literal;)*) => {
        $(
            impl InputValue for $ty {
                const EXPECTED: &'static str = $label;

                fn accepts(kind: &InputKind) -> bool {
                    matches!(kind, InputKind::$variant(_))
                }

                fn from_kind(kind: &InputKind) -> Option<Self> {
                    match kind {
                        InputKind::$variant(value) => *value,
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_number_value! {
    i8 => Int8, "int8";
    i16 => Int16, "int16";
    i32 => Int32, "int32";
    i64 => Int64, "int64";
    u8 => UInt8, "uint8";
    u16 => UInt16, "uint16";
    u32 => UInt32, "uint32";
    u64 => UInt64, "uint64";
}

impl InputValue for String {
    const EXPECTED: &'static str = "string";

    fn accepts(kind: &InputKind) -> bool {
        matches!(kind, InputKind::String(_))
    }

    fn from_kind(kind: &InputKind) -> Option<Self> {
        match kind {
            InputKind::String(value) => value.clone(),
            _ => None,
        }
    }
}

impl InputValue for Vec<String> {
    const EXPECTED: &'static str = "string list";

    fn accepts(kind: &InputKind) -> bool {
        matches!(kind, InputKind::StringList(_))
    }

    fn from_kind(kind: &InputKind) -> Option<Self> {
        match kind {
            InputKind::StringList(values) => values.clone(),
            _ => None,
        }
    }
}

/// Read the value of a located input, failing if it is of another kind.
pub(crate) fn read<T: InputValue>(input: Option<&Input>) -> Result<Option<T>, LookupError> {
    let Some(input) = input else {
        return Ok(None);
    };

    if !T::accepts(input.kind()) {
        return Err(mismatch(input, T::EXPECTED));
    }

    Ok(T::from_kind(input.kind()))
}

/// Return the located input if it is a feature.
pub(crate) fn read_feature(input: Option<&Input>) -> Result<Option<&Input>, LookupError> {
    match input {
        Some(input) if input.as_feature().is_none() => Err(mismatch(input, "feature")),
        other => Ok(other),
    }
}

fn mismatch(input: &Input, expected: &'static str) -> LookupError {
    LookupError::StructuralMismatch {
        name: input.name().to_string(),
        expected,
        actual: input.kind().label(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_absent_is_none() {
        assert_eq!(read::<i32>(None), Ok(None));
    }

    #[test]
    fn test_read_unset_is_none() {
        let input = Input::int32("level", ["--level"], "Level");
        assert_eq!(read::<i32>(Some(&input)), Ok(None));
    }

    #[test]
    fn test_read_wrong_kind_is_error() {
        let input = Input::string("name", ["--name"], "Name");
        let err = read::<u64>(Some(&input)).unwrap_err();
        assert_eq!(
            err,
            LookupError::StructuralMismatch {
                name: "name".to_string(),
                expected: "uint64",
                actual: "string",
            }
        );
        assert_eq!(err.to_string(), "input 'name' is a string, not a uint64");
    }

    #[test]
    fn test_widths_do_not_coerce() {
        let input = Input::int16("n", ["-n"], "N");
        assert!(read::<i32>(Some(&input)).is_err());
        assert!(read::<i16>(Some(&input)).is_ok());
    }

    #[test]
    fn test_bool_accepts_flag_kinds() {
        assert!(bool::accepts(&InputKind::Flag(None)));
        assert!(bool::accepts(&InputKind::Boolean(None)));
        assert!(!bool::accepts(&InputKind::String(None)));
    }

    #[test]
    fn test_read_feature_rejects_other_kinds() {
        let input = Input::flag("verbose", ["-v"], "Verbose");
        assert!(read_feature(Some(&input)).is_err());
        assert!(matches!(read_feature(None), Ok(None)));
    }
}
