//! cmdset - Recursive command-line input trees with typed lookup and help output.
//!
//! A host application declares a tree of named inputs (flags, typed values,
//! string lists and features), registers the top-level entries in an
//! [`InputSet`] and hands it the raw argument vector. Matching recurses into
//! the tree, unknown tokens are kept on the dispatched feature, and values are
//! read back by name with typed, fallible lookups.

pub mod builtin;
pub mod config;
pub mod feature;
pub mod help;
pub mod input;
pub mod kind;
pub mod lookup;
pub mod report;
pub mod set;

pub use config::{Config, ConfigError, InputConfig, InputType};
pub use feature::{Context, Feature, Handler};
pub use help::{Buffer, Console, Stdout, DEFAULT_MIDPOINT, DEFAULT_PRE};
pub use input::Input;
pub use kind::InputKind;
pub use lookup::{InputValue, LookupError};
pub use report::{Report, ReportHandler, ReportValue};
pub use set::{DispatchError, InputSet};
