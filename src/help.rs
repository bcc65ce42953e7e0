//! Help text generation for input trees.

use crate::input::{Input, FLAG_PUNCTUATION};
use crate::set::InputSet;

/// Spaces before each top-level help line.
pub const DEFAULT_PRE: usize = 2;
/// Column where descriptions start in help lines.
pub const DEFAULT_MIDPOINT: usize = 30;
/// Extra indentation per tree level and for long descriptions.
const DEPTH_INDENT: usize = 4;
/// Width used when the console cannot report one.
const FALLBACK_WIDTH: usize = 80;

/// Where help output goes, and how wide it may be.
pub trait Console {
    /// Width in columns, or 0 if unknown.
    fn width(&self) -> usize;

    fn write_line(&mut self, line: &str);
}

/// Console writing to standard output.
///
/// The width is read once from `COLUMNS`, if set.
#[derive(Debug, Clone)]
pub struct Stdout {
    width: usize,
}

impl Stdout {
    pub fn new() -> Self {
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|columns| columns.trim().parse().ok())
            .unwrap_or(0);
        Self { width }
    }

    pub fn with_width(width: usize) -> Self {
        Self { width }
    }
}

impl Default for Stdout {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for Stdout {
    fn width(&self) -> usize {
        self.width
    }

    fn write_line(&mut self, line: &str) {
        println!("{}", line);
    }
}

/// Console collecting lines in memory.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    width: usize,
    lines: Vec<String>,
}

impl Buffer {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl Console for Buffer {
    fn width(&self) -> usize {
        self.width
    }

    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

fn effective_width(width: usize) -> usize {
    if width == 0 {
        FALLBACK_WIDTH
    } else {
        width
    }
}

fn write_all(console: &mut dyn Console, lines: &[String]) {
    for line in lines {
        console.write_line(line);
    }
}

impl Input {
    /// Format this input's help: the summary line and, if `detailed`, the
    /// wrapped long description.
    pub fn format(&self, pre: usize, midpoint: usize, width: usize, detailed: bool) -> Vec<String> {
        let mut lines = vec![self.summary_line(pre, midpoint)];
        if detailed {
            lines.extend(self.format_long_description(pre, width));
        }
        lines
    }

    /// Format this input and all of its descendants, indenting each level.
    pub fn format_recursive(
        &self,
        pre: usize,
        midpoint: usize,
        width: usize,
        detailed: bool,
    ) -> Vec<String> {
        let mut lines = Vec::new();
        self.format_at_depth(0, pre, midpoint, width, detailed, &mut lines);
        lines
    }

    fn format_at_depth(
        &self,
        depth: usize,
        pre: usize,
        midpoint: usize,
        width: usize,
        detailed: bool,
        lines: &mut Vec<String>,
    ) {
        let shift = DEPTH_INDENT * depth;
        lines.extend(self.format(pre + shift, midpoint + shift, width, detailed));
        for child in self.children() {
            child.format_at_depth(depth + 1, pre, midpoint, width, detailed, lines);
        }
    }

    /// Flags padded to the `midpoint` column, then the description.
    fn summary_line(&self, pre: usize, midpoint: usize) -> String {
        let flags = self.kind().format_flags(self.flags());
        let used = pre + flags.chars().count();
        let gap = if midpoint > used { midpoint - used } else { 1 };
        format!(
            "{}{}{}{}",
            " ".repeat(pre),
            flags,
            " ".repeat(gap),
            self.description()
        )
    }

    /// Word-wrap the long description to `width - 1` columns.
    ///
    /// Every source line starts a new output line and keeps its leading
    /// spaces. A trailing blank line separates it from what follows.
    pub fn format_long_description(&self, pre: usize, width: usize) -> Vec<String> {
        let Some(text) = self.long_description().filter(|text| !text.is_empty()) else {
            return Vec::new();
        };

        let text = text.replace("\r\n", "\n");
        let indent = " ".repeat(pre + DEPTH_INDENT);
        let limit = effective_width(width) - 1;

        let mut lines = Vec::new();
        for source in text.split('\n') {
            wrap_line(source, &indent, limit, &mut lines);
        }
        lines.push(String::new());
        lines
    }
}

fn wrap_line(source: &str, indent: &str, limit: usize, lines: &mut Vec<String>) {
    let body = source.trim_start_matches(' ');
    let start = format!("{}{}", indent, &source[..source.len() - body.len()]);
    let start_len = start.chars().count();

    let mut line = start.clone();
    let mut line_len = start_len;
    for word in body.split(' ').filter(|word| !word.is_empty()) {
        let word_len = word.chars().count();
        if line_len > start_len && line_len + 1 + word_len > limit {
            lines.push(std::mem::replace(&mut line, start.clone()));
            line_len = start_len;
        }
        if line_len > start_len {
            line.push(' ');
            line_len += 1;
        }
        line.push_str(word);
        line_len += word_len;
    }
    lines.push(line);
}

impl InputSet {
    /// Top-level inputs shown in help; the default feature is replaced by its
    /// children.
    fn listed(&self) -> impl Iterator<Item = &Input> {
        let default = self.default_feature().map(Input::name);
        self.inputs()
            .iter()
            .filter(move |input| Some(input.name()) != default)
    }

    fn default_children(&self) -> &[Input] {
        match self.default_feature() {
            Some(feature) => feature.children(),
            None => &[],
        }
    }

    /// Help for the top-level inputs only.
    pub fn generic_help(&self, width: usize, detailed: bool) -> Vec<String> {
        let mut lines = self.header().to_vec();
        lines.push("Available options:".to_string());
        for input in self.listed().chain(self.default_children()) {
            lines.extend(input.format(DEFAULT_PRE, DEFAULT_MIDPOINT, width, detailed));
        }
        lines.extend(self.footer().iter().cloned());
        lines
    }

    /// Help for every input in the tree.
    pub fn all_help(&self, width: usize, detailed: bool) -> Vec<String> {
        let mut lines = self.header().to_vec();
        lines.push("Available options:".to_string());
        for input in self.listed().chain(self.default_children()) {
            lines.extend(input.format_recursive(DEFAULT_PRE, DEFAULT_MIDPOINT, width, detailed));
        }
        lines.extend(self.footer().iter().cloned());
        lines
    }

    /// Help for one top-level input, or suggestions if `name` resolves to
    /// nothing.
    ///
    /// A missing name, or one made only of flag punctuation, yields the
    /// generic help.
    pub fn feature_help(&self, name: Option<&str>, width: usize, detailed: bool) -> Vec<String> {
        let name = name.unwrap_or_default();
        let trimmed = name.trim_start_matches(FLAG_PUNCTUATION);
        let Some(first) = trimmed.chars().next() else {
            return self.generic_help(width, detailed);
        };

        if let Some(input) = self.top_level(name) {
            let mut lines = vec![format!("Available options for {}:", input.name())];
            lines.extend(input.format_recursive(DEFAULT_PRE, DEFAULT_MIDPOINT, width, detailed));
            return lines;
        }

        let suggestions = self.suggestions(first);
        if suggestions.is_empty() {
            return Vec::new();
        }

        let mut lines = vec![format!("\"{}\" not found. Did you mean:", name)];
        for input in suggestions {
            lines.extend(input.format(DEFAULT_PRE, DEFAULT_MIDPOINT, width, detailed));
        }
        lines
    }

    /// Top-level inputs with a flag starting with `c`.
    pub fn suggestions(&self, c: char) -> Vec<&Input> {
        self.inputs()
            .iter()
            .filter(|input| input.starts_with(c))
            .collect()
    }

    pub fn output_generic_help(&self, console: &mut dyn Console, detailed: bool) {
        let lines = self.generic_help(console.width(), detailed);
        write_all(console, &lines);
    }

    pub fn output_all_help(&self, console: &mut dyn Console, detailed: bool) {
        let lines = self.all_help(console.width(), detailed);
        write_all(console, &lines);
    }

    pub fn output_feature_help(
        &self,
        console: &mut dyn Console,
        name: Option<&str>,
        detailed: bool,
    ) {
        let lines = self.feature_help(name, console.width(), detailed);
        write_all(console, &lines);
    }
}
