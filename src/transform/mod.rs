// LaTeX text transformer - turns LaTeX source into speakable plain text
// through an ordered pipeline of rewrite stages

mod math;
mod pipeline;
mod rule;
mod stages;

use tracing::debug;

use crate::dictionary::CommandDictionary;

pub use pipeline::{Pipeline, Stage, StageKind};
pub use rule::{Rule, RewriteFn, TransformError};

/// Stateless converter; build once and share freely between threads
#[derive(Debug, Clone)]
pub struct LatexTransformer {
    pipeline: Pipeline,
}

impl LatexTransformer {
    /// Transformer using only the built-in rule tables
    pub fn new() -> Result<Self, TransformError> {
        Ok(Self {
            pipeline: Pipeline::builtin()?,
        })
    }

    /// Transformer whose dictionary entries override built-in phrases for the same command.
    /// The dictionary is snapshotted; later edits need a new transformer.
    pub fn with_dictionary(dictionary: &CommandDictionary) -> Result<Self, TransformError> {
        let pipeline = Pipeline::builtin()?.with_dictionary(dictionary);
        debug!(
            "Built transformer with {} dictionary overrides",
            dictionary.len()
        );
        Ok(Self { pipeline })
    }

    pub fn from_pipeline(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Convert LaTeX source into plain text. Never fails; constructs the
    /// pipeline does not understand pass through partially converted.
    pub fn transform(&self, latex: &str) -> String {
        let text = self.pipeline.run(latex);
        debug!(
            "Transformed {} bytes of LaTeX into {} bytes of text",
            latex.len(),
            text.len()
        );
        text
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.pipeline
            .stages()
            .iter()
            .map(|stage| stage.kind().name())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn convert(latex: &str) -> String {
        LatexTransformer::new().unwrap().transform(latex)
    }

    const SAMPLE: &str = r"\documentclass{article}
\usepackage{amsmath}
\title{Notes}
\begin{document}
\maketitle
\section{Intro}
Let $x_1, \dots, x_n \in \mathbb{R}$ and consider $\|v\|^2 \leq 1$.

\subsection*{Details}
\begin{itemize}
  \item A well-known bound: $|x| < n-1$.
  \item We have $f^{\prime}(x) = x^{2}$ for all $x \geq 0$.
\end{itemize}
\begin{equation}
  \Gamma(n) = (n-1)! \tag{1}
\end{equation}
\end{document}
ignored trailing text";

    #[test]
    fn test_document_markers_are_removed() {
        let out = convert(SAMPLE);
        assert!(!out.contains(r"\begin{document}"));
        assert!(!out.contains(r"\end{document}"));
        assert!(!out.contains("usepackage"));
        assert!(!out.contains("ignored trailing text"));
    }

    #[test]
    fn test_sections() {
        assert!(convert(r"\section{Intro}").contains("Section Intro"));
        assert!(convert(r"\subsection{Details}").contains("Sub-section Details"));
    }

    #[test]
    fn test_inline_math_delimiters_removed() {
        let out = convert("$x$");
        assert!(!out.contains('$'));
        assert!(!out.contains(r"\("));
        assert!(!out.contains(r"\)"));
        assert_eq!(out, "x");
    }

    #[test]
    fn test_scripts() {
        assert!(convert("x_1").contains("x sub 1"));
        assert!(convert("x^2").contains("x to the power of 2"));
    }

    #[test]
    fn test_bare_math_speaks_signs() {
        assert_eq!(
            convert("x_{n+1} = x_n-1"),
            "x sub n plus 1 equals x sub n minus 1"
        );
        assert_eq!(
            convert("$x_{n+1} = x_n-1$"),
            "x sub n plus 1 equals x sub n minus 1"
        );
        assert_eq!(convert("a well-known fact"), "a well-known fact");
    }

    #[test]
    fn test_escaped_dollar_is_spoken_as_dollar() {
        assert_eq!(convert(r"costs \$5 and $x$"), "costs $5 and x");
    }

    #[test]
    fn test_builtin_symbols_before_scripts() {
        assert_eq!(convert(r"$\cup_{i} A_i$"), "union sub i A sub i");
        assert_eq!(convert(r"$x\le0$"), "x less than or equal to 0");
    }

    #[test]
    fn test_inequality() {
        assert!(convert(r"a \leq b").contains("a less than or equal to b"));
    }

    #[test]
    fn test_squared_norm_precedes_plain_norm() {
        let out = convert(r"\|v\|^2");
        assert!(out.contains("the two norm of v"));
        assert!(!out.contains("power"));
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        let out = convert("  alpha \n\n  beta\t\tgamma \n ");
        assert_eq!(out, "alpha beta gamma");
    }

    #[test]
    fn test_sample_document() {
        let out = convert(SAMPLE);
        assert!(out.starts_with("Section Intro"));
        assert!(out.contains("x sub 1, dot dot dot, x sub n element of the reals"));
        assert!(out.contains("the two norm of v less than or equal to 1"));
        assert!(out.contains("Sub-section Details"));
        assert!(out.contains("item A well-known bound"));
        assert!(out.contains("absolute value of x less than n minus 1"));
        assert!(out.contains("f prime(x) equals x to the power of 2"));
        assert!(out.contains("greater than or equal to 0"));
        assert!(out.contains("capital gamma(n) equals (n minus 1)! equation 1"));
        assert!(!out.contains("  "));
    }

    #[test]
    fn test_second_pass_changes_at_most_whitespace() {
        let transformer = LatexTransformer::new().unwrap();
        let once = transformer.transform(SAMPLE);
        let twice = transformer.transform(&once);

        let squash = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(squash(&once), squash(&twice));
    }

    #[test]
    fn test_malformed_input_does_not_panic() {
        let out = convert(r"\section{Unclosed $x^{2 \| \{ _");
        assert!(!out.is_empty());
    }

    #[test]
    fn test_unknown_commands_pass_through() {
        assert_eq!(convert(r"\alpha + \int f"), r"\alpha + \int f");
    }

    #[test]
    fn test_dictionary_overrides_builtin_phrase() {
        let temp_dir = TempDir::new().unwrap();
        let mut dictionary = CommandDictionary::new(temp_dir.path().join("dict.json"));
        dictionary.add(r"\leq", "is at most").unwrap();
        dictionary.add(r"\alpha", "alpha").unwrap();
        dictionary.add(r"\int", "the integral of").unwrap();

        let transformer = LatexTransformer::with_dictionary(&dictionary).unwrap();
        assert_eq!(transformer.transform(r"$\alpha \leq b$"), "alpha is at most b");
        assert_eq!(transformer.transform(r"\int f"), "the integral of f");
        // Built-in rules still cover what the dictionary does not
        assert_eq!(transformer.transform(r"a \geq b"), "a greater than or equal to b");
        assert!(transformer.stage_names().contains(&"dictionary"));
    }

    #[test]
    fn test_dictionary_command_followed_by_subscript() {
        let temp_dir = TempDir::new().unwrap();
        let mut dictionary = CommandDictionary::new(temp_dir.path().join("dict.json"));
        dictionary.add(r"\sum", "the sum of").unwrap();

        let transformer = LatexTransformer::with_dictionary(&dictionary).unwrap();
        assert_eq!(
            transformer.transform(r"$\sum_{i=1}^n x_i$"),
            "the sum of sub i equals 1 to the power of n x sub i"
        );
        assert_eq!(
            transformer.transform(r"$\sum _{i=1}^n x_i$"),
            "the sum of sub i equals 1 to the power of n x sub i"
        );
    }

    #[test]
    fn test_transformer_is_shareable_across_threads() {
        let transformer = LatexTransformer::new().unwrap();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let transformer = &transformer;
                    scope.spawn(move || transformer.transform(&format!("x_{}", i)))
                })
                .collect();
            for (i, handle) in handles.into_iter().enumerate() {
                assert_eq!(handle.join().unwrap(), format!("x sub {}", i));
            }
        });
    }

    #[test]
    fn test_stage_names_follow_pipeline_order() {
        let names = LatexTransformer::new().unwrap().stage_names();
        assert_eq!(names.first(), Some(&"envelope"));
        assert_eq!(names.last(), Some(&"tags"));
        assert_eq!(names.len(), 19);
    }
}
