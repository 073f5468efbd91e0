//! Security analyzer: one finding per matched vulnerability category, each
//! tagged with a fixed CWE identifier.

use crate::matchers;
use sentinel_core::{Analyzer, AnalyzerError, Severity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecurityCategory {
    SqlInjection,
    Xss,
    CodeInjection,
    DataLeak,
}

impl SecurityCategory {
    pub fn cwe_id(&self) -> &'static str {
        match self {
            Self::SqlInjection => "CWE-89",
            Self::Xss => "CWE-79",
            Self::CodeInjection => "CWE-94",
            Self::DataLeak => "CWE-532",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityIssue {
    #[serde(rename = "type")]
    pub category: SecurityCategory,
    pub severity: Severity,
    pub line: usize,
    pub description: String,
    pub fix: String,
    pub cwe_id: String,
}

struct SecurityCheck {
    category: SecurityCategory,
    severity: Severity,
    detect: fn(&str) -> bool,
    line_patterns: &'static [&'static str],
    description: &'static str,
    fix: &'static str,
}

static CHECKS: [SecurityCheck; 4] = [
    SecurityCheck {
        category: SecurityCategory::SqlInjection,
        severity: Severity::Critical,
        detect: matchers::has_sql_concatenation,
        line_patterns: &["SELECT", "INSERT", "UPDATE"],
        description: "Potential SQL injection vulnerability - user input concatenated directly into SQL query",
        fix: "Use parameterized queries or prepared statements",
    },
    SecurityCheck {
        category: SecurityCategory::Xss,
        severity: Severity::High,
        detect: matchers::has_unsafe_html_sink,
        line_patterns: &["innerHTML", "document.write"],
        description: "Potential Cross-Site Scripting (XSS) vulnerability",
        fix: "Use textContent or proper input sanitization",
    },
    SecurityCheck {
        category: SecurityCategory::CodeInjection,
        severity: Severity::Critical,
        detect: matchers::has_dynamic_code_execution,
        line_patterns: &["eval", "Function", "setTimeout"],
        description: "Potential code injection vulnerability",
        fix: "Avoid eval() and dynamic code execution with user input",
    },
    SecurityCheck {
        category: SecurityCategory::DataLeak,
        severity: Severity::Medium,
        detect: matchers::has_sensitive_logging,
        line_patterns: &["console.log"],
        description: "Potential sensitive data exposure in console logs",
        fix: "Remove debug statements containing sensitive information",
    },
];

#[derive(Debug, Default, Clone, Copy)]
pub struct SecurityAnalyzer;

impl SecurityAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for SecurityAnalyzer {
    type Output = Vec<SecurityIssue>;

    fn id(&self) -> &'static str {
        "security.v1"
    }

    fn analyze(&self, code: &str) -> Result<Vec<SecurityIssue>, AnalyzerError> {
        Ok(CHECKS
            .iter()
            .filter(|check| (check.detect)(code))
            .map(|check| SecurityIssue {
                category: check.category,
                severity: check.severity,
                line: matchers::find_line(code, check.line_patterns),
                description: check.description.to_string(),
                fix: check.fix.to_string(),
                cwe_id: check.category.cwe_id().to_string(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_injection() {
        let code = "const query = \"SELECT * FROM users WHERE id=\" + userId;\ndb.run(query);";
        let issues = SecurityAnalyzer::new().analyze(code).unwrap();

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, SecurityCategory::SqlInjection);
        assert_eq!(issues[0].cwe_id, "CWE-89");
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].line, 1);
    }

    #[test]
    fn test_multiple_categories() {
        let code = "el.innerHTML = input;\nconsole.log('token', token);\neval(payload);";
        let issues = SecurityAnalyzer::new().analyze(code).unwrap();
        let categories: Vec<_> = issues.iter().map(|i| i.category).collect();

        assert_eq!(
            categories,
            vec![SecurityCategory::Xss, SecurityCategory::CodeInjection, SecurityCategory::DataLeak]
        );
        assert_eq!(issues[1].line, 3);
    }

    #[test]
    fn test_clean_code() {
        assert!(SecurityAnalyzer::new().analyze("").unwrap().is_empty());
        assert!(SecurityAnalyzer::new().analyze("const a = b;").unwrap().is_empty());
    }

    #[test]
    fn test_wire_name() {
        let json = serde_json::to_value(SecurityCategory::SqlInjection).unwrap();
        assert_eq!(json, "sql-injection");
    }
}
