use std::borrow::Cow;
use std::fmt;
use tracing::trace;

use super::rule::{Rule, TransformError};
use super::stages;
use crate::dictionary::CommandDictionary;

/// Named steps of the rewrite pipeline, listed in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Envelope,
    Headings,
    Layout,
    Items,
    MathDelimiters,
    Norms,
    Reals,
    Sets,
    /// User dictionary entries; only present when a dictionary is layered in
    Dictionary,
    Symbols,
    Primes,
    Scripts,
    SignSpacing,
    Equals,
    DelimiterCleanup,
    Whitespace,
    Quads,
    OperatorSpacing,
    GreekCapitals,
    Tags,
}

impl StageKind {
    /// Built-in stages in the order they run
    pub const BUILTIN: [StageKind; 19] = [
        StageKind::Envelope,
        StageKind::Headings,
        StageKind::Layout,
        StageKind::Items,
        StageKind::MathDelimiters,
        StageKind::Norms,
        StageKind::Reals,
        StageKind::Sets,
        StageKind::Symbols,
        StageKind::Primes,
        StageKind::Scripts,
        StageKind::SignSpacing,
        StageKind::Equals,
        StageKind::DelimiterCleanup,
        StageKind::Whitespace,
        StageKind::Quads,
        StageKind::OperatorSpacing,
        StageKind::GreekCapitals,
        StageKind::Tags,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Envelope => "envelope",
            StageKind::Headings => "headings",
            StageKind::Layout => "layout",
            StageKind::Items => "items",
            StageKind::MathDelimiters => "math-delimiters",
            StageKind::Norms => "norms",
            StageKind::Reals => "reals",
            StageKind::Sets => "sets",
            StageKind::Dictionary => "dictionary",
            StageKind::Symbols => "symbols",
            StageKind::Primes => "primes",
            StageKind::Scripts => "scripts",
            StageKind::SignSpacing => "sign-spacing",
            StageKind::Equals => "equals",
            StageKind::DelimiterCleanup => "delimiter-cleanup",
            StageKind::Whitespace => "whitespace",
            StageKind::Quads => "quads",
            StageKind::OperatorSpacing => "operator-spacing",
            StageKind::GreekCapitals => "greek-capitals",
            StageKind::Tags => "tags",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordered group of rules applied one after another
#[derive(Debug, Clone)]
pub struct Stage {
    kind: StageKind,
    rules: Vec<Rule>,
}

impl Stage {
    pub fn new(kind: StageKind, rules: Vec<Rule>) -> Self {
        Self { kind, rules }
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn apply(&self, text: &str) -> String {
        let mut current = text.to_string();
        for rule in &self.rules {
            let next = match rule.apply(&current) {
                Cow::Borrowed(_) => continue,
                Cow::Owned(next) => next,
            };
            trace!("Rule {} rewrote {} stage text", rule.name(), self.kind);
            current = next;
        }
        current
    }
}

/// The full ordered sequence of stages; each stage sees the previous stage's output
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// The built-in stages without any dictionary layer
    pub fn builtin() -> Result<Self, TransformError> {
        let stages = StageKind::BUILTIN
            .iter()
            .map(|&kind| stages::builtin_stage(kind))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { stages })
    }

    /// Insert (or replace) the dictionary stage right before the symbol table so
    /// dictionary phrases win over built-in ones for the same command
    pub fn with_dictionary(mut self, dictionary: &CommandDictionary) -> Self {
        self.stages.retain(|stage| stage.kind != StageKind::Dictionary);
        if dictionary.is_empty() {
            return self;
        }

        let stage = stages::dictionary_stage(dictionary);
        let position = self
            .stages
            .iter()
            .position(|stage| stage.kind == StageKind::Symbols)
            .unwrap_or(self.stages.len());
        self.stages.insert(position, stage);
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(&self, kind: StageKind) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.kind == kind)
    }

    pub fn run(&self, text: &str) -> String {
        self.run_stages(text, self.stages.len())
    }

    /// Run every stage up to and including `last`; the whole pipeline if `last` is absent
    pub fn run_through(&self, text: &str, last: StageKind) -> String {
        let count = self
            .stages
            .iter()
            .position(|stage| stage.kind == last)
            .map_or(self.stages.len(), |idx| idx + 1);
        self.run_stages(text, count)
    }

    fn run_stages(&self, text: &str, count: usize) -> String {
        let mut current = text.to_string();
        for stage in &self.stages[..count] {
            current = stage.apply(&current);
            trace!("After stage {}: {} chars", stage.kind, current.len());
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_stage_order() {
        let pipeline = Pipeline::builtin().unwrap();
        let kinds: Vec<StageKind> = pipeline.stages().iter().map(Stage::kind).collect();
        assert_eq!(kinds, StageKind::BUILTIN.to_vec());
    }

    #[test]
    fn test_run_through_stops_after_stage() {
        let pipeline = Pipeline::builtin().unwrap();
        let text = pipeline.run_through(r"\section{Intro} $x$", StageKind::MathDelimiters);
        assert_eq!(text, r"Section Intro \(x\)");
    }

    #[test]
    fn test_dictionary_stage_sits_before_symbols() {
        let temp_dir = TempDir::new().unwrap();
        let mut dictionary = CommandDictionary::new(temp_dir.path().join("dict.json"));
        dictionary.add(r"\alpha", "alpha").unwrap();

        let pipeline = Pipeline::builtin().unwrap().with_dictionary(&dictionary);
        let names: Vec<&str> = pipeline.stages().iter().map(|s| s.kind().name()).collect();
        let dict_idx = names.iter().position(|&n| n == "dictionary").unwrap();
        assert_eq!(names[dict_idx + 1], "symbols");
        assert_eq!(names.len(), 20);

        // Layering twice does not duplicate the stage
        let pipeline = pipeline.with_dictionary(&dictionary);
        assert_eq!(pipeline.stages().len(), 20);
    }

    #[test]
    fn test_empty_dictionary_adds_no_stage() {
        let temp_dir = TempDir::new().unwrap();
        let dictionary = CommandDictionary::new(temp_dir.path().join("dict.json"));
        let pipeline = Pipeline::builtin().unwrap().with_dictionary(&dictionary);
        assert!(pipeline.stage(StageKind::Dictionary).is_none());
    }
}
