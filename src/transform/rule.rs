use regex::{NoExpand, Regex};
use std::borrow::Cow;
use std::fmt;

/// Error types for building rewrite rules
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Invalid pattern for rule {rule}: {source}")]
    Pattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
}

/// A rewrite that cannot be written as a single look-around-free regex
pub type RewriteFn = fn(&str) -> String;

#[derive(Clone)]
enum Rewrite {
    /// Replacement may reference capture groups as `${1}`
    Template { regex: Regex, replacement: String },
    /// Replacement inserted verbatim
    Phrase { regex: Regex, phrase: String },
    Literal { from: String, to: String },
    /// LaTeX control sequence; a name ending in a letter must not run into another letter
    Command { command: String, phrase: String },
    Function(RewriteFn),
}

impl fmt::Debug for Rewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rewrite::Template { regex, replacement } => {
                write!(f, "Template({:?} -> {:?})", regex.as_str(), replacement)
            }
            Rewrite::Phrase { regex, phrase } => {
                write!(f, "Phrase({:?} -> {:?})", regex.as_str(), phrase)
            }
            Rewrite::Literal { from, to } => write!(f, "Literal({:?} -> {:?})", from, to),
            Rewrite::Command { command, phrase } => {
                write!(f, "Command({:?} -> {:?})", command, phrase)
            }
            Rewrite::Function(_) => write!(f, "Function"),
        }
    }
}

/// One named text substitution applied across the whole document
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    rewrite: Rewrite,
}

fn compile(name: &str, pattern: &str) -> Result<Regex, TransformError> {
    Regex::new(pattern).map_err(|source| TransformError::Pattern {
        rule: name.to_string(),
        source,
    })
}

impl Rule {
    /// Regex rule whose replacement may use `${n}` capture references
    pub fn template(
        name: impl Into<String>,
        pattern: &str,
        replacement: impl Into<String>,
    ) -> Result<Self, TransformError> {
        let name = name.into();
        let regex = compile(&name, pattern)?;
        Ok(Self {
            name,
            rewrite: Rewrite::Template {
                regex,
                replacement: replacement.into(),
            },
        })
    }

    /// Regex rule whose replacement is taken literally
    pub fn phrase(
        name: impl Into<String>,
        pattern: &str,
        phrase: impl Into<String>,
    ) -> Result<Self, TransformError> {
        let name = name.into();
        let regex = compile(&name, pattern)?;
        Ok(Self {
            name,
            rewrite: Rewrite::Phrase {
                regex,
                phrase: phrase.into(),
            },
        })
    }

    /// Replace a LaTeX command with a phrase. A command name ends at the first
    /// non-letter, so `\in` leaves `\int` alone but still matches in `\in_0`.
    /// The phrase is padded with a space where it would touch a letter or digit.
    pub fn command(command: &str, phrase: impl Into<String>) -> Self {
        Self {
            name: command.to_string(),
            rewrite: Rewrite::Command {
                command: command.to_string(),
                phrase: phrase.into(),
            },
        }
    }

    pub fn literal(name: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rewrite: Rewrite::Literal {
                from: from.into(),
                to: to.into(),
            },
        }
    }

    pub fn function(name: impl Into<String>, rewrite: RewriteFn) -> Self {
        Self {
            name: name.into(),
            rewrite: Rewrite::Function(rewrite),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply the rule; borrows the input when nothing matched
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match &self.rewrite {
            Rewrite::Template { regex, replacement } => {
                regex.replace_all(text, replacement.as_str())
            }
            Rewrite::Phrase { regex, phrase } => regex.replace_all(text, NoExpand(phrase.as_str())),
            Rewrite::Literal { from, to } => {
                if text.contains(from.as_str()) {
                    Cow::Owned(text.replace(from.as_str(), to))
                } else {
                    Cow::Borrowed(text)
                }
            }
            Rewrite::Command { command, phrase } => replace_command(text, command, phrase),
            Rewrite::Function(rewrite) => Cow::Owned(rewrite(text)),
        }
    }
}

fn replace_command<'a>(text: &'a str, command: &str, phrase: &str) -> Cow<'a, str> {
    if command.is_empty() {
        return Cow::Borrowed(text);
    }
    let letter_named = command.chars().last().map_or(false, |c| c.is_ascii_alphabetic());

    let mut out = String::new();
    let mut last = 0;
    let mut replaced = false;
    for (start, matched) in text.match_indices(command) {
        let end = start + matched.len();
        let before = text[..start].chars().next_back();
        let after = text[end..].chars().next();
        if letter_named && after.map_or(false, |c| c.is_ascii_alphabetic()) {
            continue;
        }

        out.push_str(&text[last..start]);
        if !phrase.is_empty() && before.map_or(false, char::is_alphanumeric) {
            out.push(' ');
        }
        out.push_str(phrase);
        if !phrase.is_empty() && after.map_or(false, char::is_alphanumeric) {
            out.push(' ');
        }
        last = end;
        replaced = true;
    }

    if !replaced {
        return Cow::Borrowed(text);
    }
    out.push_str(&text[last..]);
    Cow::Owned(out)
}
