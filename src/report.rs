//! JSON reports of parsed feature values.

use crate::feature::{Context, Handler};
use crate::help::Console;
use crate::input::Input;
use crate::kind::InputKind;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::error;

/// A single parsed value, serialized without a type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReportValue {
    Bool(bool),
    Signed(i64),
    Unsigned(u64),
    Text(String),
    List(Vec<String>),
}

impl ReportValue {
    fn from_kind(kind: &InputKind) -> Option<Self> {
        let value = match kind {
            InputKind::Flag(v) | InputKind::Boolean(v) => ReportValue::Bool((*v)?),
            InputKind::Feature(feature) => ReportValue::Bool(feature.matched()?),
            InputKind::Int8(v) => ReportValue::Signed((*v)?.into()),
            InputKind::Int16(v) => ReportValue::Signed((*v)?.into()),
            InputKind::Int32(v) => ReportValue::Signed((*v)?.into()),
            InputKind::Int64(v) => ReportValue::Signed((*v)?),
            InputKind::UInt8(v) => ReportValue::Unsigned((*v)?.into()),
            InputKind::UInt16(v) => ReportValue::Unsigned((*v)?.into()),
            InputKind::UInt32(v) => ReportValue::Unsigned((*v)?.into()),
            InputKind::UInt64(v) => ReportValue::Unsigned((*v)?),
            InputKind::String(v) => ReportValue::Text(v.clone()?),
            InputKind::StringList(v) => ReportValue::List(v.clone()?),
        };
        Some(value)
    }
}

/// Values set within one feature's subtree, plus its unmatched inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub feature: String,
    pub values: BTreeMap<String, ReportValue>,
    pub inputs: Vec<String>,
}

impl Report {
    /// Collect the set values below `feature`.
    ///
    /// When a name repeats, the value that name lookups would return wins.
    pub fn collect(feature: &Input) -> Self {
        let mut found = BTreeMap::new();
        collect_level(feature.children(), &mut found);

        Self {
            feature: feature.name().to_string(),
            values: found
                .into_iter()
                .filter_map(|(name, value)| value.map(|value| (name, value)))
                .collect(),
            inputs: feature.inputs().to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Record every name below `inputs`, set or not, in lookup order: a level's
/// own inputs first, then each subtree in insertion order.
fn collect_level(inputs: &[Input], found: &mut BTreeMap<String, Option<ReportValue>>) {
    for input in inputs {
        found
            .entry(input.name().to_string())
            .or_insert_with(|| ReportValue::from_kind(input.kind()));
    }

    for input in inputs {
        let mut nested = BTreeMap::new();
        collect_level(input.children(), &mut nested);
        for (name, value) in nested {
            found.entry(name).or_insert(value);
        }
    }
}

/// Handler that prints the report of its feature as JSON.
///
/// Requires at least one unmatched input when the feature requires inputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportHandler;

impl Handler for ReportHandler {
    fn verify_inputs(&self, ctx: &Context<'_>) -> bool {
        !ctx.inputs().is_empty()
    }

    fn execute(&self, ctx: &Context<'_>, console: &mut dyn Console) -> bool {
        match Report::collect(ctx.feature()).to_json() {
            Ok(json) => {
                for line in json.lines() {
                    console.write_line(line);
                }
                true
            }
            Err(err) => {
                error!(feature = %ctx.feature().name(), %err, "failed to serialize report");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::help::Buffer;
    use crate::set::InputSet;

    fn args(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    fn sample_set() -> InputSet {
        let mut set = InputSet::new();
        set.add(
            Input::feature("convert", ["convert", "-c"], "Convert files", ReportHandler)
                .with_child(Input::flag("quiet", ["-q"], "Quiet"))
                .with_child(Input::int16("depth", ["--depth"], "Depth"))
                .with_child(Input::uint8("retries", ["--retries"], "Retries"))
                .with_child(Input::string_list("tag", ["-t"], "Tags"))
                .with_child(
                    Input::flag("group", ["--group"], "Group")
                        .with_child(Input::string("name", ["--name"], "Name")),
                ),
        );
        set
    }

    #[test]
    fn test_collect_only_set_values() {
        let mut feature = Input::feature("convert", ["convert"], "Convert", ReportHandler)
            .with_child(Input::flag("quiet", ["-q"], "Quiet"))
            .with_child(Input::int16("depth", ["--depth"], "Depth"));
        assert!(feature.process_args(&args(&["convert", "--depth=-5", "in.txt"]), 1));

        let report = Report::collect(&feature);
        assert_eq!(report.feature, "convert");
        assert_eq!(report.values.len(), 1);
        assert_eq!(report.values.get("depth"), Some(&ReportValue::Signed(-5)));
        assert_eq!(report.inputs, vec!["in.txt".to_string()]);
    }

    #[test]
    fn test_collect_matches_lookup_order() {
        let mut feature = Input::feature("root", ["root"], "Root", ReportHandler)
            .with_child(
                Input::flag("a", ["-a"], "A").with_child(Input::string("x", ["--ax"], "A x")),
            )
            .with_child(
                Input::flag("b", ["-b"], "B").with_child(Input::string("x", ["--bx"], "B x")),
            );
        assert!(feature.process_args(&args(&["root", "--bx=1"]), 1));

        let report = Report::collect(&feature);
        assert_eq!(feature.try_get::<String>("x"), Ok(None));
        assert!(report.values.get("x").is_none());
    }

    #[test]
    fn test_collect_nested_and_shadowed() {
        let mut feature = Input::feature("root", ["root"], "Root", ReportHandler)
            .with_child(
                Input::flag("branch", ["-b"], "Branch")
                    .with_child(Input::string("dup", ["--deep"], "Deep")),
            )
            .with_child(Input::string("dup", ["--shallow"], "Shallow"));
        assert!(feature.process_args(&args(&["root", "--deep=x"]), 1));

        let report = Report::collect(&feature);
        assert!(report.values.get("dup").is_none());
        assert!(report.values.get("branch").is_none());
    }

    #[test]
    fn test_report_json() {
        let mut set = sample_set();
        let mut console = Buffer::new(80);
        let result = set.dispatch(
            &args(&["-c", "-q", "--retries", "3", "-t=a", "-t", "b", "--name", "x", "file"]),
            &mut console,
        );
        assert_eq!(result, Ok(()));

        let json: serde_json::Value =
            serde_json::from_str(&console.lines().join("\n")).unwrap();
        assert_eq!(json["feature"], "convert");
        assert_eq!(json["values"]["quiet"], true);
        assert_eq!(json["values"]["retries"], 3);
        assert_eq!(json["values"]["tag"], serde_json::json!(["a", "b"]));
        assert_eq!(json["values"]["name"], "x");
        assert!(json["values"].get("depth").is_none());
        assert!(json["values"].get("group").is_none());
        assert_eq!(json["inputs"], serde_json::json!(["file"]));
    }

    #[test]
    fn test_report_handler_verifies_inputs() {
        let mut set = InputSet::new();
        set.add(
            Input::feature("convert", ["convert"], "Convert files", ReportHandler)
                .requiring_inputs(),
        );

        let mut console = Buffer::new(80);
        assert!(set.dispatch(&args(&["convert"]), &mut console).is_err());
        assert!(set.dispatch(&args(&["convert", "in.txt"]), &mut console).is_ok());
    }
}
