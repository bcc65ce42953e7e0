//! JSON declaration of an input tree.

use crate::builtin;
use crate::input::Input;
use crate::report::ReportHandler;
use crate::set::InputSet;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading and validating a declaration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse JSON config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("failed to read config file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input name must not be empty")]
    EmptyName,

    #[error("input '{0}' has no flags")]
    NoFlags(String),

    #[error("input '{0}' has an empty flag")]
    EmptyFlag(String),

    #[error("duplicate input name: {0}")]
    DuplicateName(String),

    #[error("default feature '{0}' is not a top-level input")]
    UnknownDefault(String),

    #[error("default input '{0}' is not a feature")]
    DefaultNotFeature(String),

    #[error("'requires_inputs' on input '{0}' requires type feature")]
    RequiresInputsOnNonFeature(String),
}

/// The kind of a declared input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    /// Present or absent, takes no value (e.g. `--verbose`)
    Flag,
    /// A `true`/`false` value (e.g. `--color=false`)
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    String,
    /// A repeatable string value
    #[serde(rename = "list")]
    StringList,
    /// A command that collects unmatched arguments and prints a report
    Feature,
}

/// Declaration of a single input and its children.
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub input_type: InputType,
    pub flags: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub long_description: Option<String>,
    /// Fail the feature when no unmatched arguments remain (features only)
    #[serde(default)]
    pub requires_inputs: bool,
    #[serde(default)]
    pub children: Vec<InputConfig>,
}

impl InputConfig {
    /// Build the input node and its children.
    pub fn build(&self) -> Input {
        let name = self.name.as_str();
        let flags = self.flags.iter().cloned();
        let description = self.description.as_str();

        let mut input = match self.input_type {
            InputType::Flag => Input::flag(name, flags, description),
            InputType::Boolean => Input::boolean(name, flags, description),
            InputType::Int8 => Input::int8(name, flags, description),
            InputType::Int16 => Input::int16(name, flags, description),
            InputType::Int32 => Input::int32(name, flags, description),
            InputType::Int64 => Input::int64(name, flags, description),
            InputType::UInt8 => Input::uint8(name, flags, description),
            InputType::UInt16 => Input::uint16(name, flags, description),
            InputType::UInt32 => Input::uint32(name, flags, description),
            InputType::UInt64 => Input::uint64(name, flags, description),
            InputType::String => Input::string(name, flags, description),
            InputType::StringList => Input::string_list(name, flags, description),
            InputType::Feature => Input::feature(name, flags, description, ReportHandler),
        };

        if self.requires_inputs {
            input = input.requiring_inputs();
        }
        if let Some(text) = &self.long_description {
            input = input.with_long_description(text.as_str());
        }
        for child in &self.children {
            input.add(child.build());
        }
        input
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.flags.is_empty() {
            return Err(ConfigError::NoFlags(self.name.clone()));
        }
        if self.flags.iter().any(|flag| flag.is_empty()) {
            return Err(ConfigError::EmptyFlag(self.name.clone()));
        }
        if self.requires_inputs && self.input_type != InputType::Feature {
            return Err(ConfigError::RequiresInputsOnNonFeature(self.name.clone()));
        }
        validate_siblings(&self.children)
    }
}

fn validate_siblings(inputs: &[InputConfig]) -> Result<(), ConfigError> {
    let mut names = HashSet::new();
    for input in inputs {
        if !names.insert(input.name.as_str()) {
            return Err(ConfigError::DuplicateName(input.name.clone()));
        }
        input.validate()?;
    }
    Ok(())
}

fn default_builtins() -> bool {
    true
}

/// Top-level declaration of a program's inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Program name, used as a fallback header line
    pub name: Option<String>,
    /// Reported by the built-in version feature
    pub version: Option<String>,
    #[serde(default)]
    pub header: Vec<String>,
    #[serde(default)]
    pub footer: Vec<String>,
    /// Add the built-in help, detailed help and version features (default: true)
    #[serde(default = "default_builtins")]
    pub builtins: bool,
    /// Top-level feature whose children generic help lists in its place
    pub default: Option<String>,
    #[serde(default)]
    pub inputs: Vec<InputConfig>,
}

impl Config {
    /// Parse a JSON string into a Config.
    pub fn from_json(json: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Read and parse a JSON file.
    pub fn from_path(path: &Path) -> Result<Config, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Validate the declaration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_siblings(&self.inputs)?;

        if let Some(name) = &self.default {
            let input = self
                .inputs
                .iter()
                .find(|input| &input.name == name)
                .ok_or_else(|| ConfigError::UnknownDefault(name.clone()))?;
            if input.input_type != InputType::Feature {
                return Err(ConfigError::DefaultNotFeature(name.clone()));
            }
        }

        Ok(())
    }

    /// Validate the declaration and build the input set it describes.
    pub fn build(&self) -> Result<InputSet, ConfigError> {
        self.validate()?;

        let header = match (&self.name, self.header.is_empty()) {
            (Some(name), true) => vec![name.clone()],
            _ => self.header.clone(),
        };
        let mut set = InputSet::new()
            .with_header(header)
            .with_footer(self.footer.iter().cloned());

        if self.builtins {
            set.add(builtin::help());
            set.add(builtin::help_detailed());
            set.add(builtin::version(self.version.as_deref()));
        }
        for input in &self.inputs {
            set.add(input.build());
        }
        if let Some(name) = &self.default {
            set.set_default_feature(name.as_str());
        }

        debug!(inputs = set.inputs().len(), "built input set from config");
        Ok(set)
    }
}
