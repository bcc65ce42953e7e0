//! The input tree node and its matching rules.

use crate::feature::Feature;
use crate::kind::InputKind;
use crate::lookup::{self, InputValue, LookupError};
use tracing::debug;

/// Leading characters ignored when comparing flags by their first letter.
pub(crate) const FLAG_PUNCTUATION: &[char] = &['-', '/', '\\'];

/// A named, flag-matchable input that may own child inputs.
///
/// Children are kept in insertion order, which is also the order used for
/// matching, name lookup and help output.
#[derive(Debug)]
pub struct Input {
    name: String,
    flags: Vec<String>,
    description: String,
    long_description: Option<String>,
    kind: InputKind,
    children: Vec<Input>,
}

fn collect_flags<I, S>(flags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    flags.into_iter().map(Into::into).collect()
}

impl Input {
    /// Create an input of the given kind.
    ///
    /// Flags must not collide with the flags of the input's siblings; this is
    /// not checked.
    pub fn new<I, S>(
        name: impl Into<String>,
        flags: I,
        description: impl Into<String>,
        kind: InputKind,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            flags: collect_flags(flags),
            description: description.into(),
            long_description: None,
            kind,
            children: Vec::new(),
        }
    }

    pub fn flag<I, S>(name: impl Into<String>, flags: I, description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, flags, description, InputKind::Flag(None))
    }

    pub fn boolean<I, S>(name: impl Into<String>, flags: I, description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, flags, description, InputKind::Boolean(None))
    }

    pub fn int8<I, S>(name: impl Into<String>, flags: I, description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, flags, description, InputKind::Int8(None))
    }

    pub fn int16<I, S>(name: impl Into<String>, flags: I, description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, flags, description, InputKind::Int16(None))
    }

    pub fn int32<I, S>(name: impl Into<String>, flags: I, description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, flags, description, InputKind::Int32(None))
    }

    pub fn int64<I, S>(name: impl Into<String>, flags: I, description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, flags, description, InputKind::Int64(None))
    }

    pub fn uint8<I, S>(name: impl Into<String>, flags: I, description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, flags, description, InputKind::UInt8(None))
    }

    pub fn uint16<I, S>(name: impl Into<String>, flags: I, description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, flags, description, InputKind::UInt16(None))
    }

    pub fn uint32<I, S>(name: impl Into<String>, flags: I, description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, flags, description, InputKind::UInt32(None))
    }

    pub fn uint64<I, S>(name: impl Into<String>, flags: I, description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, flags, description, InputKind::UInt64(None))
    }

    pub fn string<I, S>(name: impl Into<String>, flags: I, description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, flags, description, InputKind::String(None))
    }

    pub fn string_list<I, S>(
        name: impl Into<String>,
        flags: I,
        description: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, flags, description, InputKind::StringList(None))
    }

    /// Attach a long description, shown by detailed help.
    pub fn with_long_description(mut self, text: impl Into<String>) -> Self {
        self.long_description = Some(text.into());
        self
    }

    /// Add a child and return self, for building trees inline.
    pub fn with_child(mut self, child: Input) -> Self {
        self.add(child);
        self
    }

    /// Add a child input, replacing any existing child with the same name.
    pub fn add(&mut self, child: Input) {
        match self.children.iter_mut().find(|c| c.name == child.name) {
            Some(existing) => *existing = child,
            None => self.children.push(child),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn long_description(&self) -> Option<&str> {
        self.long_description.as_deref()
    }

    pub fn kind(&self) -> &InputKind {
        &self.kind
    }

    pub fn children(&self) -> &[Input] {
        &self.children
    }

    pub(crate) fn into_children(self) -> Vec<Input> {
        self.children
    }

    /// Directly address a child by name.
    pub fn child(&self, name: &str) -> Option<&Input> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Input> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    pub fn as_feature(&self) -> Option<&Feature> {
        match &self.kind {
            InputKind::Feature(feature) => Some(feature),
            _ => None,
        }
    }

    pub(crate) fn as_feature_mut(&mut self) -> Option<&mut Feature> {
        match &mut self.kind {
            InputKind::Feature(feature) => Some(feature),
            _ => None,
        }
    }

    /// Returns true if `token` is one of the flags, or a flag followed by `=`.
    pub fn contains_flag(&self, token: &str) -> bool {
        self.flags.iter().any(|flag| {
            token == flag
                || token
                    .strip_prefix(flag.as_str())
                    .is_some_and(|rest| rest.starts_with('='))
        })
    }

    /// Returns true if any flag, ignoring leading punctuation, starts with `c`.
    ///
    /// The comparison is case-insensitive.
    pub fn starts_with(&self, c: char) -> bool {
        self.flags.iter().any(|flag| {
            flag.trim_start_matches(FLAG_PUNCTUATION)
                .chars()
                .next()
                .is_some_and(|first| first.to_lowercase().eq(c.to_lowercase()))
        })
    }

    /// Try to match the token at `index` against this input or its subtree.
    ///
    /// If the token is not one of this input's flags, each child is tried in
    /// order and the first acceptance wins. A valued input that consumes the
    /// following token moves `index` onto it; on failure `index` is unchanged.
    pub fn process_input(&mut self, args: &[String], index: &mut usize) -> bool {
        let Some(token) = args.get(*index) else {
            return false;
        };

        if !self.contains_flag(token) {
            return self
                .children
                .iter_mut()
                .any(|child| child.process_input(args, index));
        }

        let matched = self.kind.consume(args, index);
        if matched {
            debug!(input = %self.name, token = %token, "matched input");
        } else {
            debug!(input = %self.name, token = %token, "malformed or missing value");
        }
        matched
    }

    /// Find a descendant by name.
    ///
    /// Direct children are checked first, then each child's subtree in
    /// insertion order; the first hit wins.
    pub fn find(&self, key: &str) -> Option<&Input> {
        find_in(&self.children, key)
    }

    /// The value of this input itself.
    pub fn value<T: InputValue>(&self) -> Result<Option<T>, LookupError> {
        lookup::read(Some(self))
    }

    /// Look up a descendant's value by name.
    ///
    /// Returns `Ok(None)` when no descendant has that name or its value was
    /// never set, and an error when the name belongs to another kind.
    pub fn try_get<T: InputValue>(&self, key: &str) -> Result<Option<T>, LookupError> {
        lookup::read(self.find(key))
    }

    /// Like [`Input::try_get`], falling back to `default`.
    pub fn get_or<T: InputValue>(&self, key: &str, default: T) -> Result<T, LookupError> {
        Ok(self.try_get(key)?.unwrap_or(default))
    }

    /// Look up a descendant feature by name.
    pub fn get_feature(&self, key: &str) -> Result<Option<&Input>, LookupError> {
        lookup::read_feature(self.find(key))
    }
}

/// Two-phase name search shared by inputs and the top-level set.
pub(crate) fn find_in<'a>(inputs: &'a [Input], key: &str) -> Option<&'a Input> {
    inputs
        .iter()
        .find(|input| input.name == key)
        .or_else(|| inputs.iter().find_map(|input| find_in(&input.children, key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    fn group(name: &str) -> Input {
        Input::flag(name, [name], name)
    }

    #[test]
    fn test_add_and_retrieve() {
        let mut input = group("a");
        input.add(Input::flag("input1", ["--input1"], "input1"));
        input.add(Input::flag("input2", ["--input2"], "input2"));

        assert_eq!(input.child("input1").map(Input::name), Some("input1"));
        assert_eq!(input.child("input2").map(Input::name), Some("input2"));
        assert!(input.child("input3").is_none());
    }

    #[test]
    fn test_add_replaces_same_name() {
        let mut input = group("a");
        input.add(Input::flag("x", ["-x"], "first"));
        input.add(Input::flag("y", ["-y"], "y"));
        input.add(Input::string("x", ["-x"], "second"));

        assert_eq!(input.children().len(), 2);
        assert_eq!(input.children()[0].description(), "second");
    }

    #[test]
    fn test_contains_flag() {
        let input = Input::flag("a", ["a", "--b"], "a");
        assert!(input.contains_flag("a"));
        assert!(input.contains_flag("--b="));
        assert!(input.contains_flag("--b=value"));
        assert!(!input.contains_flag("--bb"));
        assert!(!input.contains_flag("-c"));
    }

    #[test]
    fn test_starts_with() {
        let input = Input::flag("a", ["a", "--B"], "a");
        assert!(input.starts_with('a'));
        assert!(input.starts_with('b'));
        assert!(!input.starts_with('c'));
    }

    #[test]
    fn test_process_input_out_of_range() {
        let mut input = Input::int16("a", ["a"], "a");
        let mut index = 2;
        assert!(!input.process_input(&args(&["a", "5"]), &mut index));
        assert_eq!(index, 2);

        let mut index = 0;
        assert!(!input.process_input(&[], &mut index));
        assert_eq!(index, 0);
        assert_eq!(input.value::<i16>(), Ok(None));
    }

    #[test]
    fn test_process_input_flag() {
        let mut input = Input::flag("verbose", ["-v", "--verbose"], "Verbose");
        let mut index = 0;
        assert!(input.process_input(&args(&["--verbose"]), &mut index));
        assert_eq!(index, 0);
        assert_eq!(input.value::<bool>(), Ok(Some(true)));
    }

    #[test]
    fn test_process_input_unmatched_leaves_value_unset() {
        let mut input = Input::flag("verbose", ["-v"], "Verbose");
        let mut index = 0;
        assert!(!input.process_input(&args(&["-q"]), &mut index));
        assert_eq!(input.value::<bool>(), Ok(None));
    }

    #[test]
    fn test_process_input_numeric_syntaxes() {
        for tokens in [&["--n=-7"][..], &["--n", "-7"][..]] {
            let mut input = Input::int64("n", ["--n"], "N");
            let mut index = 0;
            assert!(input.process_input(&args(tokens), &mut index));
            assert_eq!(index, tokens.len() - 1);
            assert_eq!(input.value::<i64>(), Ok(Some(-7)));
        }
    }

    #[test]
    fn test_process_input_invalid_number_keeps_value() {
        let mut input = Input::uint16("n", ["--n"], "N");
        let mut index = 0;
        assert!(input.process_input(&args(&["--n=5"]), &mut index));
        assert!(!input.process_input(&args(&["--n", "ANY"]), &mut index));
        assert!(!input.process_input(&args(&["--n=70000"]), &mut index));
        assert_eq!(index, 0);
        assert_eq!(input.value::<u16>(), Ok(Some(5)));
    }

    #[test]
    fn test_process_input_list_accumulates() {
        let mut input = Input::string_list("x", ["--x"], "X");
        let tokens = args(&["--x=a", "--x=b", "--x", "c"]);
        let mut index = 0;
        while index < tokens.len() {
            assert!(input.process_input(&tokens, &mut index));
            index += 1;
        }
        assert_eq!(
            input.value::<Vec<String>>(),
            Ok(Some(vec!["a".to_string(), "b".to_string(), "c".to_string()]))
        );
    }

    #[test]
    fn test_process_input_recurses_into_children() {
        let mut input = group("a").with_child(
            group("b").with_child(Input::string("path", ["--path"], "Path")),
        );
        let mut index = 0;
        assert!(input.process_input(&args(&["--path", "/tmp"]), &mut index));
        assert_eq!(index, 1);
        assert_eq!(input.try_get::<String>("path"), Ok(Some("/tmp".to_string())));
    }

    #[test]
    fn test_find_prefers_direct_children() {
        let input = group("root")
            .with_child(group("branch").with_child(Input::int8("dup", ["-d"], "deep")))
            .with_child(Input::string("dup", ["--dup"], "shallow"));

        assert_eq!(input.find("dup").map(Input::description), Some("shallow"));
    }

    #[test]
    fn test_find_uses_insertion_order_between_branches() {
        let input = group("root")
            .with_child(group("first").with_child(Input::int8("dup", ["-d"], "first")))
            .with_child(group("second").with_child(Input::int8("dup", ["-e"], "second")));

        assert_eq!(input.find("dup").map(Input::description), Some("first"));
    }

    #[test]
    fn test_try_get_nested() {
        let mut input =
            group("a").with_child(group("b").with_child(Input::boolean("c", ["c"], "c")));
        let mut index = 0;
        assert!(input.process_input(&args(&["c", "true"]), &mut index));
        assert_eq!(input.try_get::<bool>("c"), Ok(Some(true)));
    }

    #[test]
    fn test_try_get_missing_and_wrong_kind() {
        let input = group("a").with_child(Input::int8("b", ["b"], "b"));
        assert_eq!(input.try_get::<i8>("c"), Ok(None));
        assert_eq!(input.get_or::<i8>("c", i8::MIN), Ok(i8::MIN));
        assert!(input.try_get::<bool>("b").is_err());
        assert!(input.get_feature("b").is_err());
    }
}
