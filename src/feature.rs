//! Features: inputs that consume argument vectors and run host behavior.

use crate::help::Console;
use crate::input::Input;
use crate::kind::InputKind;
use crate::lookup::{InputValue, LookupError};
use crate::set::InputSet;
use std::fmt;
use tracing::{debug, warn};

/// Behavior attached to a feature.
pub trait Handler {
    /// Check the feature's preconditions after parsing.
    ///
    /// Only called when the feature requires inputs.
    fn verify_inputs(&self, _ctx: &Context<'_>) -> bool {
        true
    }

    /// Run the feature. The return value is the overall success signal.
    fn execute(&self, ctx: &Context<'_>, console: &mut dyn Console) -> bool;
}

/// What dispatching a feature does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Command,
    Help,
    HelpDetailed,
}

/// State of a feature input: whether its flag matched, the tokens it could
/// not match, and its handler.
pub struct Feature {
    matched: Option<bool>,
    inputs: Vec<String>,
    requires_inputs: bool,
    role: Role,
    handler: Option<Box<dyn Handler>>,
}

impl fmt::Debug for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feature")
            .field("matched", &self.matched)
            .field("inputs", &self.inputs)
            .field("requires_inputs", &self.requires_inputs)
            .field("role", &self.role)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

impl Feature {
    pub(crate) fn new(role: Role, handler: Option<Box<dyn Handler>>) -> Self {
        Self {
            matched: None,
            inputs: Vec::new(),
            requires_inputs: false,
            role,
            handler,
        }
    }

    /// `Some(true)` once the feature's own flag has been matched.
    pub fn matched(&self) -> Option<bool> {
        self.matched
    }

    pub(crate) fn mark_matched(&mut self) {
        self.matched = Some(true);
    }

    /// Tokens that matched neither this feature nor any of its descendants.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn requires_inputs(&self) -> bool {
        self.requires_inputs
    }

    pub(crate) fn role(&self) -> Role {
        self.role
    }

    pub(crate) fn verify_inputs(&self, ctx: &Context<'_>) -> bool {
        self.handler
            .as_ref()
            .map_or(true, |handler| handler.verify_inputs(ctx))
    }

    pub(crate) fn execute(&self, ctx: &Context<'_>, console: &mut dyn Console) -> bool {
        match &self.handler {
            Some(handler) => handler.execute(ctx, console),
            None => true,
        }
    }
}

impl Input {
    /// Create a feature input that runs `handler` when dispatched.
    pub fn feature<I, S>(
        name: impl Into<String>,
        flags: I,
        description: impl Into<String>,
        handler: impl Handler + 'static,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let feature = Feature::new(Role::Command, Some(Box::new(handler)));
        Self::new(name, flags, description, InputKind::Feature(feature))
    }

    /// Require the feature's handler to verify its inputs before running.
    ///
    /// Has no effect on inputs that are not features.
    pub fn requiring_inputs(mut self) -> Self {
        if let Some(feature) = self.as_feature_mut() {
            feature.requires_inputs = true;
        }
        self
    }

    /// Unmatched tokens collected by this feature; empty for other kinds.
    pub fn inputs(&self) -> &[String] {
        match self.as_feature() {
            Some(feature) => feature.inputs(),
            None => &[],
        }
    }

    /// Match every token from `index` on against this feature's subtree.
    ///
    /// Tokens that do not match are recorded verbatim as unmatched inputs
    /// instead of failing the parse. Empty `args` always succeeds; an
    /// out-of-range `index` fails. Inputs that are not features never accept
    /// an argument vector.
    pub fn process_args(&mut self, args: &[String], index: usize) -> bool {
        if self.as_feature().is_none() {
            warn!(input = %self.name(), "only features can process arguments");
            return false;
        }

        if args.is_empty() {
            return true;
        }

        if index >= args.len() {
            return false;
        }

        let mut i = index;
        while i < args.len() {
            if !self.process_input(args, &mut i) {
                debug!(feature = %self.name(), token = %args[i], "unmatched token");
                if let Some(feature) = self.as_feature_mut() {
                    feature.inputs.push(args[i].clone());
                }
            }
            i += 1;
        }

        true
    }
}

/// What a handler sees while it runs: the whole set and its own feature.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    set: &'a InputSet,
    feature: &'a Input,
}

impl<'a> Context<'a> {
    pub fn new(set: &'a InputSet, feature: &'a Input) -> Self {
        Self { set, feature }
    }

    pub fn set(&self) -> &'a InputSet {
        self.set
    }

    pub fn feature(&self) -> &'a Input {
        self.feature
    }

    /// Unmatched tokens of the running feature.
    pub fn inputs(&self) -> &'a [String] {
        self.feature.inputs()
    }

    /// Look up a value anywhere in the set.
    pub fn try_get<T: InputValue>(&self, key: &str) -> Result<Option<T>, LookupError> {
        self.set.try_get(key)
    }

    pub fn get_or<T: InputValue>(&self, key: &str, default: T) -> Result<T, LookupError> {
        self.set.get_or(key, default)
    }
}
