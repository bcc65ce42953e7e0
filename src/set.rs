//! The top-level input set: dispatch and typed lookup over the whole tree.

use crate::builtin;
use crate::feature::{Context, Role};
use crate::help::Console;
use crate::input::{find_in, Input};
use crate::lookup::{self, InputValue, LookupError};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that end a dispatch.
///
/// Malformed values and unknown tokens never show up here; they are kept as
/// unmatched inputs on the dispatched feature.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("'{0}' is not a valid feature flag")]
    UnresolvedTopLevel(String),

    #[error("'{0}' is not a feature")]
    NotAFeature(String),

    #[error("invalid arguments for feature: {0}")]
    InvalidArguments(String),

    #[error("missing required inputs for feature: {0}")]
    MissingRequiredInput(String),

    #[error("feature failed: {0}")]
    ExecutionFailed(String),
}

/// A logically grouped set of inputs addressed by the first argument.
///
/// Only top-level inputs are registered; their children are reached through
/// them.
#[derive(Debug, Default)]
pub struct InputSet {
    header: Vec<String>,
    footer: Vec<String>,
    inputs: Vec<Input>,
    default_feature: Option<String>,
}

impl InputSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines printed before the option list in help output.
    pub fn with_header<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Lines printed after the option list in help output.
    pub fn with_footer<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.footer = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn footer(&self) -> &[String] {
        &self.footer
    }

    /// Register a top-level input, replacing one with the same name.
    pub fn add(&mut self, input: Input) {
        match self.inputs.iter_mut().find(|i| i.name() == input.name()) {
            Some(existing) => *existing = input,
            None => self.inputs.push(input),
        }
    }

    /// Register every child of `input` as a top-level input.
    pub fn add_from(&mut self, input: Input) {
        for child in input.into_children() {
            self.add(child);
        }
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// Directly address a top-level input by name.
    pub fn get(&self, name: &str) -> Option<&Input> {
        self.inputs.iter().find(|i| i.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Input> {
        self.inputs.iter_mut().find(|i| i.name() == name)
    }

    /// Name a top-level feature whose children are listed in generic and full
    /// help instead of the feature itself. Dispatch is unaffected.
    pub fn set_default_feature(&mut self, name: impl Into<String>) {
        self.default_feature = Some(name.into());
    }

    pub fn default_feature(&self) -> Option<&Input> {
        self.default_feature.as_deref().and_then(|name| self.get(name))
    }

    /// Resolve a token to the name of a top-level input.
    ///
    /// Only the part before the first `=` is compared, against both names and
    /// flags.
    pub fn resolve_name(&self, token: &str) -> Option<&str> {
        let key = token.split('=').next().unwrap_or(token);
        self.inputs
            .iter()
            .find(|input| input.name() == key || input.contains_flag(key))
            .map(Input::name)
    }

    /// The top-level input addressed by a name or flag.
    pub fn top_level(&self, token: &str) -> Option<&Input> {
        self.resolve_name(token).and_then(|name| self.get(name))
    }

    pub fn is_top_level(&self, token: &str) -> bool {
        self.resolve_name(token).is_some()
    }

    /// Find an input anywhere in the set by name.
    ///
    /// Top-level inputs are checked first, then each subtree in insertion
    /// order.
    pub fn find(&self, key: &str) -> Option<&Input> {
        find_in(&self.inputs, key)
    }

    /// Look up a value anywhere in the set.
    ///
    /// Returns `Ok(None)` for an unknown name or an unset value, and an error
    /// when the name belongs to an input of another kind.
    pub fn try_get<T: InputValue>(&self, key: &str) -> Result<Option<T>, LookupError> {
        lookup::read(self.find(key))
    }

    /// Like [`InputSet::try_get`], falling back to `default`.
    pub fn get_or<T: InputValue>(&self, key: &str, default: T) -> Result<T, LookupError> {
        Ok(self.try_get(key)?.unwrap_or(default))
    }

    /// Look up a feature anywhere in the set.
    pub fn get_feature(&self, key: &str) -> Result<Option<&Input>, LookupError> {
        lookup::read_feature(self.find(key))
    }

    /// Parse an argument vector and run the feature it selects.
    ///
    /// The first argument selects a top-level feature; the rest is matched
    /// against that feature's tree. No arguments shows the full help and
    /// succeeds.
    pub fn dispatch(
        &mut self,
        args: &[String],
        console: &mut dyn Console,
    ) -> Result<(), DispatchError> {
        let Some(first) = args.first() else {
            debug!("no arguments, showing help");
            self.output_all_help(console, false);
            return Ok(());
        };

        let Some(name) = self.resolve_name(first).map(str::to_string) else {
            warn!(token = %first, "unresolved top-level input");
            let err = DispatchError::UnresolvedTopLevel(first.clone());
            console.write_line(&err.to_string());
            self.output_feature_help(console, Some(first), false);
            return Err(err);
        };

        let role = match self.get(&name).and_then(Input::as_feature) {
            Some(feature) => feature.role(),
            None => {
                warn!(input = %name, "top-level input is not a feature");
                let err = DispatchError::NotAFeature(name);
                console.write_line(&err.to_string());
                self.output_feature_help(console, Some(first), false);
                return Err(err);
            }
        };

        match role {
            Role::Help => {
                builtin::show_help(self, args, console, false);
                return Ok(());
            }
            Role::HelpDetailed => {
                builtin::show_help(self, args, console, true);
                return Ok(());
            }
            Role::Command => {}
        }

        // A bare feature has nothing left to match.
        let processed = args.len() == 1
            || self
                .get_mut(&name)
                .is_some_and(|input| input.process_args(args, 1));
        if !processed {
            self.output_feature_help(console, Some(&name), false);
            return Err(DispatchError::InvalidArguments(name));
        }

        let Some(input) = self.get(&name) else {
            return Err(DispatchError::NotAFeature(name));
        };
        let Some(feature) = input.as_feature() else {
            return Err(DispatchError::NotAFeature(name));
        };

        let ctx = Context::new(self, input);
        if feature.requires_inputs() && !feature.verify_inputs(&ctx) {
            debug!(feature = %name, "input verification failed");
            self.output_feature_help(console, Some(&name), false);
            return Err(DispatchError::MissingRequiredInput(name));
        }

        debug!(feature = %name, inputs = ?feature.inputs(), "executing feature");
        if feature.execute(&ctx, console) {
            Ok(())
        } else {
            Err(DispatchError::ExecutionFailed(name))
        }
    }
}
