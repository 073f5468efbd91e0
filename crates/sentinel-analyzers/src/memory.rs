//! Memory analyzer
//!
//! Keyword-count estimates of heap, stack and GC pressure, plus leak
//! heuristics for listeners, timers, closures and oversized arrays.

use crate::matchers;
use lazy_static::lazy_static;
use regex::Regex;
use sentinel_core::{Analyzer, AnalyzerError};
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref LOOP_KEYWORD: Regex = Regex::new(r"for|while").unwrap();
    static ref FUNCTION_DECL: Regex = Regex::new(r"function\s+\w+|=>").unwrap();
    static ref CALL_SHAPE: Regex = Regex::new(r"\w+\(.*\)").unwrap();
    static ref ARRAY_SIZE: Regex = Regex::new(r"Array\((\d+)\)").unwrap();
}

/// Allocations above this many elements are reported
const LARGE_ARRAY_THRESHOLD: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryProfile {
    /// Estimated heap usage in arbitrary units, at least 10
    pub heap_usage: u32,
    pub stack_depth: u32,
    pub garbage_collection: u32,
    pub memory_leaks: Vec<String>,
}

impl Default for MemoryProfile {
    fn default() -> Self {
        Self {
            heap_usage: 10,
            stack_depth: 1,
            garbage_collection: 1,
            memory_leaks: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryAnalyzer;

impl MemoryAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for MemoryAnalyzer {
    type Output = MemoryProfile;

    fn id(&self) -> &'static str {
        "memory.v1"
    }

    fn analyze(&self, code: &str) -> Result<MemoryProfile, AnalyzerError> {
        Ok(MemoryProfile {
            heap_usage: estimate_heap_usage(code),
            stack_depth: estimate_stack_depth(code),
            garbage_collection: estimate_gc_cycles(code),
            memory_leaks: detect_leaks(code),
        })
    }
}

pub fn detect_leaks(code: &str) -> Vec<String> {
    let mut leaks = Vec::new();

    if code.contains("addEventListener") && !code.contains("removeEventListener") {
        leaks.push("Potential event listener memory leak".to_string());
    }
    if code.contains("setInterval") && !code.contains("clearInterval") {
        leaks.push("Potential interval memory leak".to_string());
    }
    if code.contains("setTimeout") && code.contains("function") && !code.contains("clearTimeout") {
        leaks.push("Potential timeout memory leak".to_string());
    }
    if let Some(size) = first_array_size(code) {
        if size > LARGE_ARRAY_THRESHOLD {
            leaks.push("Large array allocation detected".to_string());
        }
    }
    if code.contains("function") && code.contains("return function") {
        leaks.push("Potential closure memory retention".to_string());
    }

    leaks
}

/// Size literal of the first `Array(N)` allocation, if any.
/// Literals too large for u64 saturate.
fn first_array_size(code: &str) -> Option<u64> {
    let digits = ARRAY_SIZE.captures(code)?.get(1)?.as_str();
    Some(digits.parse().unwrap_or(u64::MAX))
}

fn estimate_heap_usage(code: &str) -> u32 {
    let mut usage = 0u32;

    if code.contains("Array") {
        usage += 50;
    }
    if code.contains("Object") {
        usage += 30;
    }
    if code.contains("Map") || code.contains("Set") {
        usage += 40;
    }
    if code.contains("string") || code.contains("String") {
        usage += 20;
    }
    usage += LOOP_KEYWORD.find_iter(code).count() as u32 * 10;

    usage.max(10)
}

fn estimate_stack_depth(code: &str) -> u32 {
    let mut depth = 1 + FUNCTION_DECL.find_iter(code).count() as u32;

    if code.contains("function") && CALL_SHAPE.is_match(code) {
        depth += 2;
    }

    depth
}

fn estimate_gc_cycles(code: &str) -> u32 {
    let mut cycles = 1;

    if code.contains("new Array") || code.contains("JSON.parse") {
        cycles += 2;
    }
    if code.contains(".map") || code.contains(".filter") {
        cycles += 1;
    }
    if matchers::has_nested_loops(code) {
        cycles += 3;
    }

    cycles
}
