//! Pattern matchers: narrow lexical detectors over raw source text.
//!
//! Each matcher approximates a code smell with a regular expression or a
//! substring test. They are deliberately imprecise and stateless; the
//! analyzers only ever see them through [`Detector`], so a parser-backed
//! implementation can replace any of them later.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `for (...) { ... for (...)` with no closing brace in between
    static ref NESTED_FOR: Regex = Regex::new(r"for\s*\([^)]*\)\s*\{[^}]*for\s*\([^)]*\)").unwrap();

    /// `while (...) { ... for|while (...)`
    static ref NESTED_WHILE: Regex = Regex::new(r"while\s*\([^)]*\)\s*\{[^}]*(for|while)\s*\([^)]*\)").unwrap();

    /// Loose nested-loop shape used by the quality smells
    static ref NESTED_FOR_LOOSE: Regex = Regex::new(r"for\s*\([^)]*\)\s*\{[^}]*for").unwrap();

    /// Single-line nested loop shape used by the performance suite
    static ref NESTED_FOR_INLINE: Regex = Regex::new(r"for.*\{[^}]*for").unwrap();

    static ref ARRAY_METHOD: Regex = Regex::new(r"(\.forEach|\.map|\.filter|\.reduce)").unwrap();

    static ref INCLUDES_CALL: Regex = Regex::new(r"\.includes\(.*\)").unwrap();

    static ref INDEX_OF_CALL: Regex = Regex::new(r"\.indexOf\(.*\)").unwrap();

    /// A named function whose body calls something before its first `}`
    static ref SELF_CALL: Regex = Regex::new(r"function\s+\w+\([^)]*\)\s*\{[^}]*\w+\([^)]*\)").unwrap();

    static ref CONCAT_BEFORE_FOR: Regex = Regex::new(r"(\+=|=\s*\w+\s*\+).*for.*\(").unwrap();

    static ref CONCAT_BEFORE_WHILE: Regex = Regex::new(r"(\+=|=\s*\w+\s*\+).*while.*\(").unwrap();

    /// `+ identifier`, the concatenation half of the SQL check
    static ref PLUS_IDENT: Regex = Regex::new(r"\+\s*\w+").unwrap();

    static ref ARRAY_METHOD_LINE: Regex = Regex::new(r"\.(forEach|map|filter|reduce)").unwrap();
}

/// Swappable boolean detector over a code string
pub trait Detector: Send + Sync {
    /// Stable detector name (e.g. "nested-loops")
    fn name(&self) -> &'static str;

    /// Whether the pattern is present
    fn detect(&self, code: &str) -> bool;
}

/// Detector backed by a plain function
#[derive(Clone, Copy)]
pub struct FnDetector {
    name: &'static str,
    check: fn(&str) -> bool,
}

impl FnDetector {
    pub const fn new(name: &'static str, check: fn(&str) -> bool) -> Self {
        Self { name, check }
    }
}

impl Detector for FnDetector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn detect(&self, code: &str) -> bool {
        (self.check)(code)
    }
}

impl std::fmt::Debug for FnDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("FnDetector").field("name", &self.name).finish()
    }
}

// ============================================================================
// PERFORMANCE MATCHERS
// ============================================================================

pub fn has_nested_loops(code: &str) -> bool {
    NESTED_FOR.is_match(code) || NESTED_WHILE.is_match(code)
}

/// More than two `.forEach/.map/.filter/.reduce` calls anywhere
pub fn has_repeated_array_iteration(code: &str) -> bool {
    ARRAY_METHOD.find_iter(code).count() > 2
}

/// `.includes(...)` or `.indexOf(...)` in code that mentions `for`
pub fn has_linear_search_in_loop(code: &str) -> bool {
    (INCLUDES_CALL.is_match(code) || INDEX_OF_CALL.is_match(code)) && code.contains("for")
}

pub fn has_unmemoized_recursion(code: &str) -> bool {
    SELF_CALL.is_match(code) && !code.contains("memo") && !code.contains("cache")
}

pub fn has_string_concat_in_loop(code: &str) -> bool {
    CONCAT_BEFORE_FOR.is_match(code) || CONCAT_BEFORE_WHILE.is_match(code)
}

/// Nested loop shape used by the quality smell list
pub fn has_nested_for_smell(code: &str) -> bool {
    code.contains("for") && code.contains('{') && NESTED_FOR_LOOSE.is_match(code)
}

/// Nested loops written on one line, as the performance suite sees them
pub fn has_inline_nested_loops(code: &str) -> bool {
    NESTED_FOR_INLINE.is_match(code)
}

// ============================================================================
// SECURITY MATCHERS
// ============================================================================

pub fn has_sql_concatenation(code: &str) -> bool {
    (code.contains("SELECT") || code.contains("INSERT") || code.contains("UPDATE"))
        && code.contains('+')
        && PLUS_IDENT.is_match(code)
}

pub fn has_unsafe_html_sink(code: &str) -> bool {
    code.contains("innerHTML") || code.contains("document.write")
}

pub fn has_dynamic_code_execution(code: &str) -> bool {
    code.contains("eval(")
        || code.contains("Function(")
        || (code.contains("setTimeout(") && code.contains('"'))
}

pub fn has_sensitive_logging(code: &str) -> bool {
    code.contains("console.log")
        && (code.contains("password") || code.contains("secret") || code.contains("token"))
}

// ============================================================================
// LOCATION AND SNIPPET HELPERS
// ============================================================================

/// 1-based line of the first line containing any pattern, tried in order.
/// Falls back to line 1.
pub fn find_line(code: &str, patterns: &[&str]) -> usize {
    for pattern in patterns {
        if let Some(index) = code.split('\n').position(|line| line.contains(pattern)) {
            return index + 1;
        }
    }
    1
}

fn first_line_where(code: &str, pred: impl Fn(&str) -> bool) -> Option<String> {
    code.split('\n')
        .find(|line| pred(line))
        .map(|line| line.trim().to_string())
}

pub fn nested_loop_snippet(code: &str) -> String {
    first_line_where(code, |l| l.contains("for") && l.contains('{'))
        .unwrap_or_else(|| "for (let i = 0; i < n; i++) { for (let j = 0; j < n; j++) { ... } }".to_string())
}

pub fn array_method_snippet(code: &str) -> String {
    first_line_where(code, |l| ARRAY_METHOD_LINE.is_match(l))
        .unwrap_or_else(|| "array.forEach(...); array.map(...);".to_string())
}

pub fn search_snippet(code: &str) -> String {
    first_line_where(code, |l| l.contains(".includes") || l.contains(".indexOf"))
        .unwrap_or_else(|| "if (array.includes(value)) { ... }".to_string())
}

pub fn recursion_snippet(code: &str) -> String {
    first_line_where(code, |l| l.contains("function") && l.contains('('))
        .unwrap_or_else(|| "function recursive(n) { return recursive(n-1) + recursive(n-2); }".to_string())
}

pub fn concat_snippet(code: &str) -> String {
    first_line_where(code, |l| l.contains("+=") || (l.contains('+') && l.contains("for")))
        .unwrap_or_else(|| "str += \"text\";".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str = "for (let i = 0; i < a.length; i++) {\n  for (let j = 0; j < a.length; j++) {\n    sum += a[i] * a[j];\n  }\n}";

    #[test]
    fn test_nested_loops() {
        assert!(has_nested_loops(NESTED));
        assert!(has_nested_loops("while (x) { while (y) { } }"));
        assert!(!has_nested_loops("for (const x of xs) { total += x; }"));
    }

    #[test]
    fn test_nested_loops_false_negative_is_preserved() {
        // A closing brace between the loops hides the nesting
        let code = "for (let i = 0; i < n; i++) { if (x) { y(); } for (let j = 0; j < n; j++) {} }";
        assert!(!has_nested_loops(code));
    }

    #[test]
    fn test_repeated_array_iteration() {
        assert!(has_repeated_array_iteration("a.map(f).filter(g).reduce(h, 0)"));
        assert!(!has_repeated_array_iteration("a.map(f).filter(g)"));
    }

    #[test]
    fn test_linear_search() {
        assert!(has_linear_search_in_loop("for (const x of xs) { if (ys.includes(x)) {} }"));
        assert!(!has_linear_search_in_loop("ys.includes(x)"));
    }

    #[test]
    fn test_recursion() {
        let fib = "function fib(n) { return fib(n - 1) + fib(n - 2); }";
        assert!(has_unmemoized_recursion(fib));
        assert!(!has_unmemoized_recursion("function fib(n, memo) { return fib(n - 1, memo); }"));
    }

    #[test]
    fn test_string_concat() {
        assert!(has_string_concat_in_loop("out += x; for (let i = 0; i < n; i++) {}"));
        assert!(!has_string_concat_in_loop("const s = `a${b}`;"));
    }

    #[test]
    fn test_security_matchers() {
        assert!(has_sql_concatenation("const q = \"SELECT * FROM users WHERE id=\" + userId;"));
        assert!(!has_sql_concatenation("const q = 'SELECT 1';"));
        assert!(has_unsafe_html_sink("el.innerHTML = html;"));
        assert!(has_dynamic_code_execution("eval(input)"));
        assert!(has_dynamic_code_execution("setTimeout(\"run()\", 10)"));
        assert!(!has_dynamic_code_execution("setTimeout(run, 10)"));
        assert!(has_sensitive_logging("console.log(password)"));
        assert!(!has_sensitive_logging("console.log(count)"));
    }

    #[test]
    fn test_find_line() {
        let code = "let a = 1;\nfor (;;) {}\nx.indexOf(y)";
        assert_eq!(find_line(code, &["for"]), 2);
        assert_eq!(find_line(code, &[".includes", "indexOf"]), 3);
        assert_eq!(find_line(code, &["while"]), 1);
        assert_eq!(find_line("", &["for"]), 1);
    }

    #[test]
    fn test_snippets() {
        assert_eq!(nested_loop_snippet(NESTED), "for (let i = 0; i < a.length; i++) {");
        assert!(search_snippet("nothing here").contains("includes"));
    }

    #[test]
    fn test_fn_detector() {
        let detector = FnDetector::new("nested-loops", has_nested_loops);
        assert_eq!(detector.name(), "nested-loops");
        assert!(detector.detect(NESTED));
    }
}
