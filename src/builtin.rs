//! Built-in help, detailed help and version features.

use crate::feature::{Context, Feature, Handler, Role};
use crate::help::Console;
use crate::input::Input;
use crate::kind::InputKind;
use crate::set::InputSet;

pub const HELP_NAME: &str = "help";
pub const HELP_DETAILED_NAME: &str = "help-detailed";
pub const VERSION_NAME: &str = "version";

/// Generic help, or help for the feature named by the next argument.
pub fn help() -> Input {
    Input::new(
        HELP_NAME,
        ["-?", "-h", "--help"],
        "Show this help",
        InputKind::Feature(Feature::new(Role::Help, None)),
    )
    .with_long_description("Built-in to most of the programs is a basic help text.")
}

/// Recursive help including long descriptions.
pub fn help_detailed() -> Input {
    Input::new(
        HELP_DETAILED_NAME,
        ["-??", "-hd", "--help-detailed"],
        "Show this detailed help",
        InputKind::Feature(Feature::new(Role::HelpDetailed, None)),
    )
    .with_long_description("Display a detailed help text to the screen.")
}

/// Prints the host's version, e.g. `version(Some(env!("CARGO_PKG_VERSION")))`.
pub fn version(version: Option<&str>) -> Input {
    Input::feature(
        VERSION_NAME,
        ["-v", "--version"],
        "Prints version",
        VersionHandler {
            version: version.map(str::to_string),
        },
    )
    .with_long_description("Prints current program version.")
}

struct VersionHandler {
    version: Option<String>,
}

impl Handler for VersionHandler {
    fn execute(&self, _ctx: &Context<'_>, console: &mut dyn Console) -> bool {
        match &self.version {
            Some(version) => console.write_line(&format!("Version: {}", version)),
            None => console.write_line("Version: unavailable (no version information provided)"),
        }
        true
    }
}

/// Run a help feature: `args[1]`, if present, selects the feature to show.
pub(crate) fn show_help(
    set: &InputSet,
    args: &[String],
    console: &mut dyn Console,
    detailed: bool,
) {
    match args.get(1) {
        Some(name) => set.output_feature_help(console, Some(name), detailed),
        None if detailed => set.output_all_help(console, true),
        None => set.output_generic_help(console, false),
    }
}
