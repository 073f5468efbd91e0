//! Language detection
//!
//! Substring markers pick a language; each language carries a small table
//! of performance patterns reported by [`language_findings`].

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Javascript,
    Typescript,
    Python,
    Java,
    Cpp,
}

pub struct LanguageConfig {
    pub name: &'static str,
    pub extension: &'static str,
    pub complexity_keywords: &'static [&'static str],
    pub performance_patterns: Vec<Regex>,
}

fn patterns(sources: &[&str]) -> Vec<Regex> {
    sources.iter().map(|s| Regex::new(s).unwrap()).collect()
}

const NESTED_FOR: &str = r"for\s*\([^)]*\)\s*\{[^}]*for\s*\([^)]*\)";

lazy_static! {
    static ref JAVASCRIPT: LanguageConfig = LanguageConfig {
        name: "JavaScript",
        extension: "js",
        complexity_keywords: &["forEach", "map", "filter", "reduce", "includes", "indexOf"],
        performance_patterns: patterns(&[r"\.forEach.*\.forEach", NESTED_FOR, r"\.includes.*for"]),
    };
    static ref TYPESCRIPT: LanguageConfig = LanguageConfig {
        name: "TypeScript",
        extension: "ts",
        complexity_keywords: &["forEach", "map", "filter", "reduce", "includes", "indexOf"],
        performance_patterns: patterns(&[r"\.forEach.*\.forEach", NESTED_FOR, r"\.includes.*for"]),
    };
    static ref PYTHON: LanguageConfig = LanguageConfig {
        name: "Python",
        extension: "py",
        complexity_keywords: &["for", "in", "range", "len", "append", "list comprehension"],
        performance_patterns: patterns(&[
            r"for\s+\w+\s+in[^:]+:\s*for\s+\w+\s+in",
            r"\.append.*for",
            r"in\s+list.*for",
        ]),
    };
    static ref JAVA: LanguageConfig = LanguageConfig {
        name: "Java",
        extension: "java",
        complexity_keywords: &["for", "forEach", "stream", "contains", "indexOf"],
        performance_patterns: patterns(&[NESTED_FOR, r"\.stream\(\)\.forEach", r"\.contains.*for"]),
    };
    static ref CPP: LanguageConfig = LanguageConfig {
        name: "C++",
        extension: "cpp",
        complexity_keywords: &["for", "while", "vector", "push_back", "find"],
        performance_patterns: patterns(&[NESTED_FOR, r"\.push_back.*for", r"std::find.*for"]),
    };
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
        }
    }

    pub fn config(&self) -> &'static LanguageConfig {
        match self {
            Language::Javascript => &JAVASCRIPT,
            Language::Typescript => &TYPESCRIPT,
            Language::Python => &PYTHON,
            Language::Java => &JAVA,
            Language::Cpp => &CPP,
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.config().name
    }

    pub fn extension(&self) -> &'static str {
        self.config().extension
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `code` by substring markers, first match wins
pub fn detect_language(code: &str) -> Language {
    let any = |markers: &[&str]| markers.iter().any(|m| code.contains(m));

    if any(&["def ", "import ", "print("]) {
        Language::Python
    } else if any(&["public class", "import java.", "System.out."]) {
        Language::Java
    } else if any(&["#include", "std::", "cout <<"]) {
        Language::Cpp
    } else if code.contains(':') && code.contains("type") && code.contains("interface") {
        Language::Typescript
    } else {
        Language::Javascript
    }
}

/// One message per performance pattern of `language` that matches `code`
pub fn language_findings(code: &str, language: Language) -> Vec<String> {
    let config = language.config();
    config
        .performance_patterns
        .iter()
        .filter(|re| re.is_match(code))
        .map(|re| format!("Detected {} performance pattern: /{}/", config.name, re.as_str()))
        .collect()
}
