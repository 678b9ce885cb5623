// Built-in rule tables, one constructor per stage.
// Rule order inside each table matters: `\leq` must run before `\le`, the
// squared norm before the plain norm, and so on.

use super::math;
use super::pipeline::{Stage, StageKind};
use super::rule::{Rule, TransformError};
use crate::dictionary::CommandDictionary;

/// Math environments are turned into display markers instead of being dropped,
/// so later stages still know their content is math
const MATH_ENVIRONMENTS: &str = "equation|align|gather|multline|eqnarray|displaymath";

const SYMBOLS: &[(&str, &str)] = &[
    (r"\infty", "infinity"),
    (r"\subset", "subset of"),
    (r"\supset", "superset of"),
    (r"\leq", "less than or equal to"),
    (r"\geq", "greater than or equal to"),
    (r"\le", "less than or equal to"),
    (r"\ge", "greater than or equal to"),
    (r"\to", "approaches"),
    (r"\cdots", "dot dot dot"),
    (r"\ldots", "dot dot dot"),
    (r"\in", "element of"),
    (r"\dots", "dot dot dot"),
    (r"\forall", "for all"),
    (r"\exists", "there exists"),
    (r"\neq", "not equal to"),
    (r"\pm", "plus or minus"),
    (r"\mp", "minus or plus"),
    (r"\times", "times"),
    (r"\div", "divided by"),
    (r"\cup", "union"),
    (r"\cap", "intersection"),
    (r"\emptyset", "empty set"),
    (r"\Rightarrow", "implies"),
    (r"\implies", "implies"),
    (r"\iff", "if and only if"),
];

const GREEK_CAPITALS: [&str; 24] = [
    "Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta", "Eta", "Theta", "Iota", "Kappa",
    "Lambda", "Mu", "Nu", "Xi", "Omicron", "Pi", "Rho", "Sigma", "Tau", "Upsilon", "Phi", "Chi",
    "Psi", "Omega",
];

pub fn builtin_stage(kind: StageKind) -> Result<Stage, TransformError> {
    let rules = match kind {
        StageKind::Envelope => envelope()?,
        StageKind::Headings => vec![
            Rule::template("section", r"\\section\*?\{([^}]+)\}", "Section ${1}")?,
            Rule::template("subsection", r"\\subsection\*?\{([^}]+)\}", "Sub-section ${1}")?,
        ],
        StageKind::Layout => layout()?,
        StageKind::Items => vec![Rule::phrase("item", r"\\item\b", "item")?],
        StageKind::MathDelimiters => vec![Rule::function("dollars", math::toggle_dollars)],
        StageKind::Norms => vec![
            Rule::template(
                "squared-norm",
                r"\\\|(.+?)\\\|\s*\^\{?2\}?",
                "the two norm of ${1}",
            )?,
            Rule::template("norm", r"\\\|(.+?)\\\|", "the norm of ${1}")?,
        ],
        StageKind::Reals => vec![Rule::literal("reals", r"\mathbb{R}", "the reals")],
        StageKind::Sets => vec![Rule::template("sequence", r"\\\{(.+?)\\\}", "the sequence ${1}")?],
        StageKind::Dictionary => Vec::new(),
        StageKind::Symbols => symbols()?,
        StageKind::Primes => vec![
            Rule::literal("braced-prime", r"^{\prime}", " prime"),
            Rule::literal("prime", r"^\prime", " prime"),
        ],
        StageKind::Scripts => vec![
            Rule::template("subscript", r"_([a-zA-Z0-9])", " sub ${1}")?,
            Rule::template("braced-subscript", r"_\{([^}]+)\}", " sub ${1}")?,
            Rule::template("superscript", r"\^([a-zA-Z0-9])", " to the power of ${1}")?,
            Rule::template("braced-superscript", r"\^\{([^}]+)\}", " to the power of ${1}")?,
        ],
        StageKind::SignSpacing => vec![Rule::function("signs", math::space_signs)],
        StageKind::Equals => vec![Rule::literal("equals", "=", " equals ")],
        StageKind::DelimiterCleanup => vec![
            Rule::literal("inline-open", r"\(", ""),
            Rule::literal("inline-close", r"\)", ""),
            Rule::literal("display-open", r"\[", ""),
            Rule::literal("display-close", r"\]", ""),
            Rule::literal("escaped-dollar", r"\$", "$"),
        ],
        StageKind::Whitespace => vec![
            Rule::phrase("collapse", r"\s+", " ")?,
            Rule::function("trim", |text: &str| text.trim().to_string()),
        ],
        StageKind::Quads => vec![Rule::phrase("quad", r"\\q?quad\b ?", "")?],
        StageKind::OperatorSpacing => vec![Rule::function("operators", math::space_operators)],
        StageKind::GreekCapitals => GREEK_CAPITALS
            .iter()
            .map(|name| {
                Rule::phrase(
                    *name,
                    &format!(r"\\{}\b", name),
                    format!("capital {}", name.to_lowercase()),
                )
            })
            .collect::<Result<Vec<_>, _>>()?,
        StageKind::Tags => vec![Rule::template("tag", r"\\tag\{([^}]+)\}", "equation ${1}")?],
    };

    Ok(Stage::new(kind, rules))
}

fn envelope() -> Result<Vec<Rule>, TransformError> {
    Ok(vec![
        Rule::phrase("preamble", r"(?s)\A.*?\\begin\{document\}", "")?,
        Rule::phrase("postamble", r"(?s)\\end\{document\}.*\z", "")?,
        Rule::phrase("documentclass", r"\\documentclass(?:\[[^\]]*\])?\{.*?\}", "")?,
        Rule::phrase("document-markers", r"\\begin\{document\}|\\end\{document\}", "")?,
        Rule::phrase("maketitle", r"\\maketitle\b", "")?,
        Rule::phrase("left", r"\\left\b", "")?,
        Rule::phrase("right", r"\\right\b", "")?,
    ])
}

fn layout() -> Result<Vec<Rule>, TransformError> {
    Ok(vec![
        Rule::phrase("textwidth", r"\\textwidth\b", "")?,
        Rule::phrase(
            "math-begin",
            &format!(r"\\begin\{{(?:{})\*?\}}", MATH_ENVIRONMENTS),
            r"\[ ",
        )?,
        Rule::phrase(
            "math-end",
            &format!(r"\\end\{{(?:{})\*?\}}", MATH_ENVIRONMENTS),
            r" \]",
        )?,
        Rule::phrase("environments", r"\\begin\{[^}]+\}|\\end\{[^}]+\}", "")?,
        Rule::phrase("spacing", r"\\q?quad\b|\\[,;:!]", " ")?,
    ])
}

fn symbols() -> Result<Vec<Rule>, TransformError> {
    let mut rules: Vec<Rule> = SYMBOLS
        .iter()
        .map(|&(command, phrase)| Rule::command(command, phrase))
        .collect();

    rules.push(Rule::literal("less-than", "<", " less than "));
    rules.push(Rule::literal("greater-than", ">", " greater than "));
    rules.push(Rule::template("absolute-value", r"\|([^|]+)\|", "absolute value of ${1}")?);
    Ok(rules)
}

/// Longest commands first so `\leq` is replaced before a shorter `\le` entry
pub fn dictionary_stage(dictionary: &CommandDictionary) -> Stage {
    let mut entries: Vec<(&String, &String)> = dictionary.entries().iter().collect();
    entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));

    let rules = entries
        .into_iter()
        .filter(|(command, _)| !command.is_empty())
        .map(|(command, phrase)| Rule::command(command, phrase.as_str()))
        .collect();

    Stage::new(StageKind::Dictionary, rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(kind: StageKind, text: &str) -> String {
        builtin_stage(kind).unwrap().apply(text)
    }

    #[test]
    fn test_every_builtin_stage_compiles() {
        for kind in StageKind::BUILTIN {
            assert_eq!(builtin_stage(kind).unwrap().kind(), kind);
        }
    }

    #[test]
    fn test_envelope_strips_preamble_and_postamble() {
        let doc = "\\documentclass[12pt]{article}\n\\usepackage{amsmath}\n\\begin{document}\n\\maketitle\nHello\n\\end{document}\ntrailing";
        let out = run(StageKind::Envelope, doc);
        assert_eq!(out.trim(), "Hello");
    }

    #[test]
    fn test_envelope_keeps_sized_delimiter_content() {
        assert_eq!(run(StageKind::Envelope, r"\left( x \right)"), "( x )");
        assert_eq!(run(StageKind::Envelope, r"\leftarrow"), r"\leftarrow");
    }

    #[test]
    fn test_headings() {
        assert_eq!(run(StageKind::Headings, r"\section*{Intro}"), "Section Intro");
        assert_eq!(run(StageKind::Headings, r"\subsection{Details}"), "Sub-section Details");
    }

    #[test]
    fn test_layout_strips_environments_but_marks_math() {
        assert_eq!(run(StageKind::Layout, r"\begin{itemize}a\end{itemize}"), "a");
        assert_eq!(run(StageKind::Layout, r"\begin{align*}a\end{align*}"), r"\[ a \]");
        assert_eq!(run(StageKind::Layout, r"a\quad b"), "a  b");
    }

    #[test]
    fn test_norms_match_squared_form_first() {
        assert_eq!(run(StageKind::Norms, r"\|v\|^2"), "the two norm of v");
        assert_eq!(run(StageKind::Norms, r"\|v\|^{2}"), "the two norm of v");
        assert_eq!(run(StageKind::Norms, r"\|a\| + \|b\|"), "the norm of a + the norm of b");
    }

    #[test]
    fn test_sets() {
        assert_eq!(run(StageKind::Sets, r"\{x_n\}"), "the sequence x_n");
    }

    #[test]
    fn test_symbols_prefer_longer_commands() {
        assert_eq!(run(StageKind::Symbols, r"a \leq b"), "a less than or equal to b");
        assert_eq!(run(StageKind::Symbols, r"a \le b"), "a less than or equal to b");
        assert_eq!(run(StageKind::Symbols, r"n \to \infty"), "n approaches infinity");
        assert_eq!(run(StageKind::Symbols, r"A \subseteq B"), r"A \subseteq B");
    }

    #[test]
    fn test_symbols_before_scripts_and_digits() {
        assert_eq!(run(StageKind::Symbols, r"\cup_{i} A_i"), "union_{i} A_i");
        assert_eq!(run(StageKind::Symbols, r"\cap_n B_n"), "intersection_n B_n");
        assert_eq!(run(StageKind::Symbols, r"x\le0"), "x less than or equal to 0");
        assert_eq!(run(StageKind::Symbols, r"\int_0"), r"\int_0");
    }

    #[test]
    fn test_symbols_absolute_value_and_comparisons() {
        assert_eq!(run(StageKind::Symbols, "|x|"), "absolute value of x");
        assert_eq!(run(StageKind::Symbols, "a<b"), "a less than b");
    }

    #[test]
    fn test_primes_and_scripts() {
        assert_eq!(run(StageKind::Primes, r"f^{\prime}"), "f prime");
        assert_eq!(run(StageKind::Primes, r"f^\prime"), "f prime");
        assert_eq!(run(StageKind::Scripts, "x_1"), "x sub 1");
        assert_eq!(run(StageKind::Scripts, "x_{ij}"), "x sub ij");
        assert_eq!(run(StageKind::Scripts, "x^2"), "x to the power of 2");
        assert_eq!(run(StageKind::Scripts, "e^{i t}"), "e to the power of i t");
    }

    #[test]
    fn test_delimiter_cleanup_unescapes_dollar() {
        assert_eq!(run(StageKind::DelimiterCleanup, r"\(x\) costs \$5"), "x costs $5");
    }

    #[test]
    fn test_whitespace_collapse() {
        assert_eq!(run(StageKind::Whitespace, "  a \n\n\t b  "), "a b");
    }

    #[test]
    fn test_greek_capitals() {
        assert_eq!(run(StageKind::GreekCapitals, r"\Gamma(n)"), "capital gamma(n)");
        assert_eq!(run(StageKind::GreekCapitals, r"\Omega"), "capital omega");
        assert_eq!(run(StageKind::GreekCapitals, r"\Pi \Phi"), "capital pi capital phi");
        assert_eq!(run(StageKind::GreekCapitals, r"\Pisano"), r"\Pisano");
    }

    #[test]
    fn test_tags() {
        assert_eq!(run(StageKind::Tags, r"x \tag{3}"), "x equation 3");
    }
}
