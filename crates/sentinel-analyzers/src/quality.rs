//! Quality analyzer
//!
//! Approximates classic maintainability metrics with token counts:
//! cyclomatic complexity, a Halstead-like volume, a brace-depth cognitive
//! score, a 0-100 maintainability index and a list of code smells.

use crate::matchers;
use lazy_static::lazy_static;
use regex::Regex;
use sentinel_core::{Analyzer, AnalyzerError};
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref IF_PAREN: Regex = Regex::new(r"if\s*\(").unwrap();
    static ref FOR_PAREN: Regex = Regex::new(r"for\s*\(").unwrap();
    static ref WHILE_PAREN: Regex = Regex::new(r"while\s*\(").unwrap();
    static ref CASE_LABEL: Regex = Regex::new(r"case\s+").unwrap();
    static ref TERNARY: Regex = Regex::new(r"\?\s*:").unwrap();
    static ref BOOLEAN_OP: Regex = Regex::new(r"&&|\|\|").unwrap();

    static ref OPERATOR: Regex = Regex::new(r"[=+\-*/<>!&|^~%]=?|=>|\+\+|--|&&|\|\||[{}()\[\];,:]").unwrap();
    static ref OPERAND: Regex = Regex::new(r"\b[a-zA-Z_][a-zA-Z0-9_]*\b").unwrap();
    static ref CONTROL_KEYWORD: Regex = Regex::new(r"if|for|while").unwrap();

    static ref MAGIC_NUMBER: Regex = Regex::new(r"\b\d{3,}\b").unwrap();
    static ref WORD: Regex = Regex::new(r"[A-Za-z0-9_]+").unwrap();
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    /// 0-100, higher is better
    pub maintainability_index: u32,
    pub cyclomatic_complexity: u32,
    pub halstead_volume: u32,
    pub cognitive_complexity: u32,
    pub technical_debt: String,
    pub code_smells: Vec<String>,
}

impl Default for QualityMetrics {
    /// Metrics of an empty buffer
    fn default() -> Self {
        Self {
            maintainability_index: 100,
            cyclomatic_complexity: 1,
            halstead_volume: 0,
            cognitive_complexity: 0,
            technical_debt: "Low (1-4 hours)".to_string(),
            code_smells: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct QualityAnalyzer;

impl QualityAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for QualityAnalyzer {
    type Output = QualityMetrics;

    fn id(&self) -> &'static str {
        "quality.v1"
    }

    fn analyze(&self, code: &str) -> Result<QualityMetrics, AnalyzerError> {
        if code.is_empty() {
            return Ok(QualityMetrics::default());
        }

        let smells = code_smells(code);
        let cyclomatic = cyclomatic_complexity(code);

        Ok(QualityMetrics {
            maintainability_index: maintainability_index(code, cyclomatic, smells.len()),
            cyclomatic_complexity: cyclomatic,
            halstead_volume: halstead_volume(code),
            cognitive_complexity: cognitive_complexity(code),
            technical_debt: technical_debt(cyclomatic, smells.len()).to_string(),
            code_smells: smells,
        })
    }
}

fn line_count(code: &str) -> usize {
    code.split('\n').count()
}

/// Decision points plus one
pub fn cyclomatic_complexity(code: &str) -> u32 {
    let decisions: usize = [&*IF_PAREN, &*FOR_PAREN, &*WHILE_PAREN, &*CASE_LABEL, &*TERNARY, &*BOOLEAN_OP]
        .iter()
        .map(|re| re.find_iter(code).count())
        .sum();

    1 + decisions as u32
}

/// Operator count plus operand count
pub fn halstead_volume(code: &str) -> u32 {
    (OPERATOR.find_iter(code).count() + OPERAND.find_iter(code).count()) as u32
}

/// Each opening line adds its nesting depth; closing lines pop one level
pub fn cognitive_complexity(code: &str) -> u32 {
    let mut complexity = 0u32;
    let mut nesting = 0u32;

    for line in code.split('\n') {
        if line.contains('{') || (line.contains('(') && CONTROL_KEYWORD.is_match(line)) {
            nesting += 1;
            complexity += nesting;
        }
        if line.contains('}') || line.contains(')') {
            nesting = nesting.saturating_sub(1);
        }
    }

    complexity
}

/// 100 minus penalties for length, complexity and smells, clamped to 0..=100
pub fn maintainability_index(code: &str, cyclomatic: u32, smell_count: usize) -> u32 {
    let lines = line_count(code);
    let mut score: i64 = 100;

    if lines > 100 {
        score -= 20;
    } else if lines > 50 {
        score -= 10;
    }

    if cyclomatic > 10 {
        score -= 30;
    } else if cyclomatic > 5 {
        score -= 15;
    }

    score -= smell_count as i64 * 5;

    score.clamp(0, 100) as u32
}

pub fn technical_debt(cyclomatic: u32, smell_count: usize) -> &'static str {
    let hours = cyclomatic as f64 * 0.5 + smell_count as f64 * 2.0;

    if hours < 4.0 {
        "Low (1-4 hours)"
    } else if hours < 8.0 {
        "Medium (4-8 hours)"
    } else {
        "High (8+ hours)"
    }
}

pub fn code_smells(code: &str) -> Vec<String> {
    let mut smells = Vec::new();

    if line_count(code) > 50 {
        smells.push("Long Method".to_string());
    }
    if BOOLEAN_OP.find_iter(code).count() > 3 {
        smells.push("Complex Conditional".to_string());
    }
    if matchers::has_nested_for_smell(code) {
        smells.push("Nested Loops".to_string());
    }
    if MAGIC_NUMBER.is_match(code) {
        smells.push("Magic Numbers".to_string());
    }
    if has_repeated_word(code) {
        smells.push("Possible Code Duplication".to_string());
    }

    smells
}

/// Duplication proxy: some word reappears later on the same line.
/// The repeat is a plain substring match, so `i` in `i++` counts.
fn has_repeated_word(code: &str) -> bool {
    code.split('\n').any(|line| {
        WORD.find_iter(line)
            .any(|word| line[word.end()..].contains(word.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(code: &str) -> QualityMetrics {
        QualityAnalyzer::new().analyze(code).unwrap()
    }

    #[test]
    fn test_empty_is_default() {
        assert_eq!(metrics(""), QualityMetrics::default());
    }

    #[test]
    fn test_cyclomatic() {
        assert_eq!(cyclomatic_complexity("let a = 1;"), 1);
        assert_eq!(cyclomatic_complexity("if (a && b) { for (;;) {} }"), 4);
        assert_eq!(cyclomatic_complexity("switch (x) { case 1: case 2: }"), 3);
    }

    #[test]
    fn test_cognitive_nesting() {
        let code = "function f() {\n  if (a) {\n    b();\n  }\n}";
        // both opening lines also close a paren, so each sits at depth 1
        assert_eq!(cognitive_complexity(code), 2);
        assert_eq!(cognitive_complexity("{
{
}
}"), 3);
    }

    #[test]
    fn test_smells() {
        let smells = code_smells("for (let i = 0; i < 1000; i++) { for (let j = 0; j < n; j++) {} }");
        assert!(smells.contains(&"Nested Loops".to_string()));
        assert!(smells.contains(&"Magic Numbers".to_string()));
        assert!(smells.contains(&"Possible Code Duplication".to_string()));
        assert!(!smells.contains(&"Long Method".to_string()));

        let long = "x;\n".repeat(60);
        assert!(code_smells(&long).contains(&"Long Method".to_string()));
        assert!(code_smells("a && b || c && d || e").contains(&"Complex Conditional".to_string()));
    }

    #[test]
    fn test_no_duplication_on_distinct_words() {
        assert!(!has_repeated_word("let total;\nconst value;"));
        assert!(has_repeated_word("count = count + 1"));
    }

    #[test]
    fn test_maintainability_bounds() {
        assert_eq!(maintainability_index("x", 1, 0), 100);
        assert_eq!(maintainability_index(&"x\n".repeat(200), 40, 5), 25);
        assert_eq!(maintainability_index(&"x\n".repeat(200), 40, 20), 0);
    }

    #[test]
    fn test_technical_debt() {
        assert_eq!(technical_debt(1, 0), "Low (1-4 hours)");
        assert_eq!(technical_debt(4, 1), "Medium (4-8 hours)");
        assert_eq!(technical_debt(10, 2), "High (8+ hours)");
    }

    #[test]
    fn test_index_always_in_range() {
        let samples = [
            "",
            "{{{{",
            "}}}} ))))",
            "not code at all, just prose.",
            &"if (a && b || c) { for (;;) { while (x) {} } }\n".repeat(80),
        ];
        for sample in samples {
            let m = metrics(sample);
            assert!(m.maintainability_index <= 100, "out of range for {:?}", sample);
        }
    }
}
