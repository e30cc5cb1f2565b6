//! Context analysis stage.
//!
//! Classifies the code surrounding a candidate into one of nine context
//! types and computes the multiplicative context modifier. The rules run
//! in a fixed priority order and the first match wins; this is what keeps
//! classification reproducible (a commented-out label is Documentation,
//! never Label).

use crate::config;
use crate::constants;
use crate::types::{Candidate, ContextType};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TEST_KEYWORD_REGEX: Regex = Regex::new(
        r"(?:^|[\W_])((?i:test|tests|testing|mock|mocked|sample|demo|fake|dummy|stub|placeholder|example|fixture))(?:$|[\W_0-9]|[A-Z])"
    )
    .expect("CRITICAL: test keyword regex is invalid - this should never fail");
    static ref SQL_KEYWORD_REGEX: Regex =
        Regex::new(r"\b(SELECT|INSERT|UPDATE|DELETE|FROM|WHERE|SET|INTO|VALUES)\b")
            .expect("CRITICAL: SQL keyword regex is invalid - this should never fail");
    static ref ORM_METHOD_REGEX: Regex = Regex::new(r"\.(where|filter|findOne)\(")
        .expect("CRITICAL: ORM method regex is invalid - this should never fail");
    static ref CONNECTION_STRING_REGEX: Regex = Regex::new(r"jdbc:|mongodb://")
        .expect("CRITICAL: connection string regex is invalid - this should never fail");
    static ref CONFIG_KV_REGEX: Regex = Regex::new(
        r"^\s*(?:export\s+)?[A-Za-z][A-Za-z0-9_.-]*\s*(?::[ \t]+|=(?:[^=>]|$))"
    )
    .expect("CRITICAL: config key-value regex is invalid - this should never fail");
    static ref INI_SECTION_REGEX: Regex = Regex::new(r"^\s*\[[^\]]+\]\s*$")
        .expect("CRITICAL: INI section regex is invalid - this should never fail");
    static ref CONFIG_PREFIX_REGEX: Regex =
        Regex::new(r"\b(?:default_|initial_|fallback_|config_|setting_)[a-z0-9_]+")
            .expect("CRITICAL: config prefix regex is invalid - this should never fail");
    static ref LOG_LEVEL_REGEX: Regex = Regex::new(r"\b(INFO|DEBUG|ERROR|WARN|TRACE|FATAL):")
        .expect("CRITICAL: log level regex is invalid - this should never fail");
    static ref LOG_TIMESTAMP_REGEX: Regex = Regex::new(
        r"^\s*\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}\S*\s+(?:INFO|DEBUG|ERROR|WARN|TRACE|FATAL)\b"
    )
    .expect("CRITICAL: log timestamp regex is invalid - this should never fail");
    static ref LOG_CALL_REGEX: Regex =
        Regex::new(r"(?:logger|log)\.(?:info|debug|error|warn|trace|fatal)\(|console\.log\(")
            .expect("CRITICAL: log call regex is invalid - this should never fail");
    static ref JSON_VALUE_REGEX: Regex = Regex::new(r#""[A-Za-z0-9_.-]+"\s*:\s*"?\s*$"#)
        .expect("CRITICAL: JSON value regex is invalid - this should never fail");
    static ref QUERY_STRING_REGEX: Regex = Regex::new(r"[?&][A-Za-z0-9_]+=$")
        .expect("CRITICAL: query string regex is invalid - this should never fail");
    static ref DECLARATION_REGEX: Regex = Regex::new(
        r"\b(?:var|let|const|final|static|my|local)\s+([A-Za-z_][A-Za-z0-9_]*)\s*=[^=]"
    )
    .expect("CRITICAL: declaration regex is invalid - this should never fail");
    static ref TYPED_DECLARATION_REGEX: Regex = Regex::new(
        r"\b(?:int|long|float|double|bool|boolean|char|string|String|auto)\s+([A-Za-z_][A-Za-z0-9_]*)\s*=[^=]"
    )
    .expect("CRITICAL: typed declaration regex is invalid - this should never fail");
    static ref WALRUS_DECLARATION_REGEX: Regex = Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*:=")
        .expect("CRITICAL: walrus declaration regex is invalid - this should never fail");
    static ref DESTRUCTURING_REGEX: Regex = Regex::new(
        r"\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*[^}]+\}\s*=|\(([A-Za-z_][A-Za-z0-9_]*)\s*=\s*[^)]+\)"
    )
    .expect("CRITICAL: destructuring regex is invalid - this should never fail");
}

/// PI labels recognised by the label rule, longest first so the most
/// specific label wins the distance measurement.
const PI_LABELS: &[&str] = &[
    "australian business number",
    "australian company number",
    "social security number",
    "tax file number",
    "driver licence number",
    "driver license number",
    "medicare card",
    "medicare number",
    "account number",
    "credit card number",
    "credit card",
    "card number",
    "licence number",
    "license number",
    "ip address",
    "medicare",
    "passport",
    "address",
    "mobile",
    "email",
    "phone",
    "name",
    "tfn",
    "abn",
    "acn",
    "bsb",
    "ssn",
];

/// Output of context classification for one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextClassification {
    pub context_type: ContextType,
    pub modifier: f64,
    pub keywords: Vec<String>,
    pub context_before: String,
    pub context_after: String,
}

pub struct ContextAnalyzer {
    test_path_patterns: Vec<String>,
}

impl ContextAnalyzer {
    pub fn new(test_path_patterns: Vec<String>) -> Self {
        Self { test_path_patterns }
    }

    pub fn with_defaults() -> Self {
        Self::new(config::default_test_path_patterns())
    }

    /// Classify the surroundings of a candidate. Total: every candidate
    /// gets a classification, falling through to Production.
    pub fn analyze(&self, candidate: &Candidate, text: &str) -> ContextClassification {
        let span_start = candidate.byte_span.0.min(text.len());
        let span_end = candidate.byte_span.1.min(text.len());

        let context_before = window_before(text, span_start, constants::CONTEXT_SNIPPET_CHARS);
        let context_after = window_after(text, span_end, constants::CONTEXT_SNIPPET_CHARS);
        let (line_start, line_end) = line_bounds(text, span_start);
        let line = &text[line_start..line_end];
        let column = span_start - line_start;

        let classify = |context_type, modifier, keywords| ContextClassification {
            context_type,
            modifier,
            keywords,
            context_before: context_before.to_string(),
            context_after: context_after.to_string(),
        };

        // 1. Test data: keyword window or test-shaped path.
        if let Some(keywords) = self.match_test(candidate, text, span_start, span_end) {
            return classify(ContextType::Test, 0.1, keywords);
        }

        // 2. Documentation: literal inside a comment region.
        if let Some(keywords) = match_documentation(text, span_start, line, column) {
            return classify(ContextType::Documentation, 0.4, keywords);
        }

        // 3. Database: SQL, ORM calls, connection strings nearby.
        let rule_before = window_before(text, span_start, constants::CONTEXT_RULE_WINDOW_CHARS);
        let rule_after = window_after(text, span_end, constants::CONTEXT_RULE_WINDOW_CHARS);
        if let Some(keywords) = match_database(rule_before, rule_after) {
            return classify(ContextType::Database, 0.8, keywords);
        }

        // 4. Configuration: key-value lines, INI headers, config-prefixed keys.
        if let Some(keywords) = match_configuration(line) {
            return classify(ContextType::Configuration, 0.6, keywords);
        }

        // 5. Log statements and log-file lines.
        if let Some(keywords) = match_log(line) {
            return classify(ContextType::Log, 0.7, keywords);
        }

        // 6. Form fields, JSON values, query strings.
        if let Some(keywords) = match_form(text, span_start, rule_before) {
            return classify(ContextType::Form, 0.8, keywords);
        }

        // 7. Variable declarations; a test-named variable is near-suppressed,
        //    anything else is treated as a production variable.
        if let Some((identifier, is_test_name)) = match_variable(line) {
            let modifier = if is_test_name { 0.3 } else { 1.0 };
            return classify(ContextType::Variable, modifier, vec![identifier]);
        }

        // 8. PI label shortly before the literal.
        if let Some((label, modifier)) = match_label(rule_before) {
            return classify(ContextType::Label, modifier, vec![label]);
        }

        // 9. Default: production code.
        classify(ContextType::Production, 1.0, Vec::new())
    }

    fn match_test(
        &self,
        candidate: &Candidate,
        text: &str,
        span_start: usize,
        span_end: usize,
    ) -> Option<Vec<String>> {
        if let Some(fragment) = path_test_fragment(&candidate.file_path, &self.test_path_patterns)
        {
            return Some(vec![fragment]);
        }
        let before = window_before(text, span_start, constants::TEST_KEYWORD_WINDOW_CHARS);
        let after = window_after(text, span_end, constants::TEST_KEYWORD_WINDOW_CHARS);
        let window = format!("{before} {after}");
        TEST_KEYWORD_REGEX
            .captures(&window)
            .map(|caps| vec![caps[1].to_lowercase()])
    }
}

/// Does the path look like test data? Returns the matching fragment.
fn path_test_fragment(path: &str, patterns: &[String]) -> Option<String> {
    let normalized = path.replace('\\', "/").to_lowercase();
    let file_name = normalized.rsplit('/').next().unwrap_or(&normalized);
    for pattern in patterns {
        let hit = match pattern.as_str() {
            "*_test.*" => file_name.contains("_test."),
            "test_*" => file_name.starts_with("test_"),
            "*.md" => file_name.ends_with(".md"),
            "*.rst" => file_name.ends_with(".rst"),
            p if p.starts_with('/') && p.ends_with('/') => normalized.contains(p),
            p => normalized.contains(p),
        };
        if hit {
            return Some(pattern.clone());
        }
    }
    None
}

fn match_documentation(
    text: &str,
    span_start: usize,
    line: &str,
    column: usize,
) -> Option<Vec<String>> {
    // Line comments: marker earlier on the same line.
    for marker in ["//", "#", "--", "<!--"] {
        if let Some(idx) = line.find(marker) {
            if idx < column {
                return Some(vec![marker.to_string()]);
            }
        }
    }
    // Block comments: an unclosed opener before the literal.
    let prefix = &text[..span_start];
    for (open, close) in [("/*", "*/"), ("<!--", "-->")] {
        if let Some(open_idx) = prefix.rfind(open) {
            let closed = prefix[open_idx..].contains(close);
            if !closed {
                return Some(vec![open.to_string()]);
            }
        }
    }
    // Triple-quoted strings: an odd number of fences before the literal.
    for fence in ["\"\"\"", "'''"] {
        let count = prefix.matches(fence).count();
        if count % 2 == 1 {
            return Some(vec![fence.to_string()]);
        }
    }
    None
}

fn match_database(before: &str, after: &str) -> Option<Vec<String>> {
    let window = format!("{before} {after}");
    if let Some(caps) = SQL_KEYWORD_REGEX.captures(&window) {
        return Some(vec![caps[1].to_string()]);
    }
    if let Some(caps) = ORM_METHOD_REGEX.captures(&window) {
        return Some(vec![format!(".{}(", &caps[1])]);
    }
    if let Some(m) = CONNECTION_STRING_REGEX.find(&window) {
        return Some(vec![m.as_str().to_string()]);
    }
    None
}

fn match_configuration(line: &str) -> Option<Vec<String>> {
    // A log-level key is a log line, not configuration; let rule 5 take it.
    if LOG_LEVEL_REGEX.is_match(line) || LOG_TIMESTAMP_REGEX.is_match(line) {
        return None;
    }
    if INI_SECTION_REGEX.is_match(line) {
        return Some(vec!["ini_section".to_string()]);
    }
    if let Some(m) = CONFIG_PREFIX_REGEX.find(line) {
        return Some(vec![m.as_str().to_string()]);
    }
    if CONFIG_KV_REGEX.is_match(line) {
        return Some(vec!["key_value".to_string()]);
    }
    None
}

fn match_log(line: &str) -> Option<Vec<String>> {
    if LOG_TIMESTAMP_REGEX.is_match(line) {
        return Some(vec!["timestamped_log_line".to_string()]);
    }
    if let Some(caps) = LOG_LEVEL_REGEX.captures(line) {
        return Some(vec![format!("{}:", &caps[1])]);
    }
    if let Some(m) = LOG_CALL_REGEX.find(line) {
        return Some(vec![m.as_str().to_string()]);
    }
    None
}

fn match_form(text: &str, span_start: usize, before: &str) -> Option<Vec<String>> {
    // Inside an unclosed form tag?
    let prefix = &text[..span_start];
    if let Some(open_idx) = prefix.rfind('<') {
        let tag = &prefix[open_idx..];
        if !tag.contains('>') {
            for name in ["<input", "<textarea", "<select"] {
                if tag.to_lowercase().starts_with(name) {
                    return Some(vec![name.to_string()]);
                }
            }
        }
    }
    if JSON_VALUE_REGEX.is_match(before) {
        return Some(vec!["json_value".to_string()]);
    }
    if QUERY_STRING_REGEX.is_match(before) {
        return Some(vec!["query_string".to_string()]);
    }
    None
}

/// Declaration forms; returns the identifier and whether it is test-named.
fn match_variable(line: &str) -> Option<(String, bool)> {
    let identifier = DECLARATION_REGEX
        .captures(line)
        .or_else(|| TYPED_DECLARATION_REGEX.captures(line))
        .or_else(|| WALRUS_DECLARATION_REGEX.captures(line))
        .and_then(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .or_else(|| {
            DESTRUCTURING_REGEX.captures(line).and_then(|caps| {
                caps.get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str().to_string())
            })
        })?;
    let is_test_name = TEST_KEYWORD_REGEX.is_match(&identifier);
    Some((identifier, is_test_name))
}

/// Label rule: a PI label within the before-window, followed by `:`/`=` or
/// whitespace. When several labels appear, the one nearest the literal
/// wins. The modifier decays with word distance beyond two, down to the
/// floor.
fn match_label(before: &str) -> Option<(String, f64)> {
    let lower = before.to_lowercase();
    let mut nearest: Option<(usize, &str)> = None;

    for label in PI_LABELS {
        let mut search_from = 0usize;
        while let Some(rel_idx) = lower[search_from..].find(label) {
            let idx = search_from + rel_idx;
            let label_end = idx + label.len();
            let followed_ok = lower[label_end..]
                .chars()
                .next()
                .map(|c| c == ':' || c == '=' || c.is_whitespace())
                .unwrap_or(true);
            let standalone = idx == 0
                || !lower[..idx]
                    .chars()
                    .next_back()
                    .map(char::is_alphanumeric)
                    .unwrap_or(false);
            if followed_ok && standalone && nearest.map(|(end, _)| label_end > end).unwrap_or(true)
            {
                nearest = Some((label_end, label));
            }
            search_from = label_end;
        }
    }

    let (label_end, label) = nearest?;
    let gap_words = lower[label_end..]
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count();
    let over = gap_words.saturating_sub(2) as f64;
    let modifier =
        (0.9 - over * constants::LABEL_DISTANCE_DECAY).max(constants::LABEL_MODIFIER_FLOOR);
    Some((label.to_string(), modifier))
}

/// Byte range of the line containing `offset`.
fn line_bounds(text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = text[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(text.len());
    (start, end)
}

/// Up to `chars` bytes before `idx`, clamped to a char boundary. Never
/// panics on out-of-range indices.
fn window_before(text: &str, idx: usize, chars: usize) -> &str {
    let idx = idx.min(text.len());
    let mut start = idx.saturating_sub(chars);
    while start > 0 && !text.is_char_boundary(start) {
        start -= 1;
    }
    &text[start..idx]
}

/// Up to `chars` bytes after `idx`, clamped to a char boundary.
fn window_after(text: &str, idx: usize, chars: usize) -> &str {
    let idx = idx.min(text.len());
    let mut end = (idx + chars).min(text.len());
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    &text[idx..end]
}
