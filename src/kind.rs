//! Input kinds and their token consumption rules.

use crate::feature::Feature;
use std::str::FromStr;

/// The kind of an input together with its value slot.
///
/// Every slot starts unset (`None`). Scalar kinds are overwritten on each
/// successful match, `StringList` appends.
#[derive(Debug)]
pub enum InputKind {
    /// A boolean switch that takes no value (e.g., --verbose)
    Flag(Option<bool>),
    /// A boolean that takes a `true`/`false` value (e.g., --color=false)
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    /// A single string value
    String(Option<String>),
    /// A string value that may be given multiple times
    StringList(Option<Vec<String>>),
    /// A feature (sub-command) that opens matching for its children
    Feature(Feature),
}

impl InputKind {
    /// Human readable name of the kind, used in lookup errors.
    pub fn label(&self) -> &'static str {
        match self {
            InputKind::Flag(_) => "flag",
            InputKind::Boolean(_) => "boolean",
            InputKind::Int8(_) => "int8",
            InputKind::Int16(_) => "int16",
            InputKind::Int32(_) => "int32",
            InputKind::Int64(_) => "int64",
            InputKind::UInt8(_) => "uint8",
            InputKind::UInt16(_) => "uint16",
            InputKind::UInt32(_) => "uint32",
            InputKind::UInt64(_) => "uint64",
            InputKind::String(_) => "string",
            InputKind::StringList(_) => "string list",
            InputKind::Feature(_) => "feature",
        }
    }

    /// Whether a match consumes a value (inline or from the next token).
    pub fn takes_value(&self) -> bool {
        !matches!(self, InputKind::Flag(_) | InputKind::Feature(_))
    }

    /// Whether the value slot has been written by a match.
    pub fn is_set(&self) -> bool {
        match self {
            InputKind::Flag(v) | InputKind::Boolean(v) => v.is_some(),
            InputKind::Int8(v) => v.is_some(),
            InputKind::Int16(v) => v.is_some(),
            InputKind::Int32(v) => v.is_some(),
            InputKind::Int64(v) => v.is_some(),
            InputKind::UInt8(v) => v.is_some(),
            InputKind::UInt16(v) => v.is_some(),
            InputKind::UInt32(v) => v.is_some(),
            InputKind::UInt64(v) => v.is_some(),
            InputKind::String(v) => v.is_some(),
            InputKind::StringList(v) => v.is_some(),
            InputKind::Feature(feature) => feature.matched().is_some(),
        }
    }

    /// Render the flags of an input for help output.
    ///
    /// Valued kinds show each flag with a trailing `=`.
    pub fn format_flags(&self, flags: &[String]) -> String {
        if self.takes_value() {
            flags
                .iter()
                .map(|flag| format!("{}=", flag))
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            flags.join(", ")
        }
    }

    /// Consume the value for a flag that matched the token at `index`.
    ///
    /// On failure the slot and `index` are left untouched. A spaced value
    /// advances `index` to the consumed token.
    pub(crate) fn consume(&mut self, args: &[String], index: &mut usize) -> bool {
        match self {
            InputKind::Flag(value) => {
                *value = Some(true);
                true
            }
            InputKind::Feature(feature) => {
                feature.mark_matched();
                true
            }
            InputKind::Boolean(slot) => assign(slot, args, index, parse_bool),
            InputKind::Int8(slot) => assign(slot, args, index, parse_number),
            InputKind::Int16(slot) => assign(slot, args, index, parse_number),
            InputKind::Int32(slot) => assign(slot, args, index, parse_number),
            InputKind::Int64(slot) => assign(slot, args, index, parse_number),
            InputKind::UInt8(slot) => assign(slot, args, index, parse_number),
            InputKind::UInt16(slot) => assign(slot, args, index, parse_number),
            InputKind::UInt32(slot) => assign(slot, args, index, parse_number),
            InputKind::UInt64(slot) => assign(slot, args, index, parse_number),
            InputKind::String(slot) => assign(slot, args, index, |raw| Some(raw.to_string())),
            InputKind::StringList(list) => {
                let Some((raw, position)) = locate_value(args, *index) else {
                    return false;
                };
                list.get_or_insert_with(Vec::new).push(raw.to_string());
                *index = position;
                true
            }
        }
    }
}

/// Find the value belonging to the flag token at `index`.
///
/// `--name=value` yields everything after the first `=` (possibly empty) and
/// stays on the same token; `--name value` yields the next token verbatim.
fn locate_value(args: &[String], index: usize) -> Option<(&str, usize)> {
    let token = args.get(index)?;
    match token.split_once('=') {
        Some((_, value)) => Some((value, index)),
        None => args.get(index + 1).map(|next| (next.as_str(), index + 1)),
    }
}

fn assign<T>(
    slot: &mut Option<T>,
    args: &[String],
    index: &mut usize,
    parse: impl Fn(&str) -> Option<T>,
) -> bool {
    let Some((raw, position)) = locate_value(args, *index) else {
        return false;
    };
    let Some(value) = parse(raw) else {
        return false;
    };

    *slot = Some(value);
    *index = position;
    true
}

fn parse_number<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
