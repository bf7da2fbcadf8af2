// File: rescue-rules/src/predicates.rs
// Purpose: Built-in predicates

use chrono::{DateTime, Duration, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::EngineConfig;
use crate::registry::Predicate;
use crate::value::{FieldValue, ValueKind};

pub const REQUIRED: &str = "required";

// Optional sign, no leading zeros
static INT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?(?:0|[1-9][0-9]*)$").unwrap()
});

// Distinct patterns kept compiled before the cache starts over
const MAX_CACHED_PATTERNS: usize = 256;

/// All built-ins, keyed by their rule name
pub fn builtins(config: &EngineConfig) -> Vec<(&'static str, Arc<dyn Predicate>)> {
    let tolerance = future_tolerance(config);

    vec![
        (REQUIRED, Arc::new(Required) as Arc<dyn Predicate>),
        ("int", Arc::new(Int)),
        ("positive", Arc::new(Positive)),
        ("positivedecimal", Arc::new(PositiveDecimal)),
        ("range", Arc::new(Range)),
        ("matches", Arc::new(Matches::default())),
        ("today", Arc::new(Today)),
        ("future", Arc::new(Future { tolerance })),
    ]
}

/// Same calendar day in local time
pub fn is_same_local_day(ts: DateTime<Local>, now: DateTime<Local>) -> bool {
    ts.date_naive() == now.date_naive()
}

/// `ts` lies after `now - tolerance`
///
/// A tolerance reaching past the earliest representable time puts no
/// lower bound on `ts`.
pub fn is_within_past_tolerance(ts: DateTime<Local>, now: DateTime<Local>, tolerance: Duration) -> bool {
    match now.checked_sub_signed(tolerance) {
        Some(earliest) => ts > earliest,
        None => true,
    }
}

/// The configured `future` tolerance, `None` when chrono cannot represent it
fn future_tolerance(config: &EngineConfig) -> Option<Duration> {
    let tolerance = Duration::from_std(config.future_tolerance()).ok();
    if tolerance.is_none() {
        tracing::warn!(
            "future_tolerance_secs = {} is out of range; `future` accepts any past timestamp",
            config.future_tolerance_secs
        );
    }
    tolerance
}

/// Rewrite `\d`, `\w`, `\s` and `\b` (and their negations) to their ASCII
/// meaning, leaving literal Unicode such as `[ก-ฮ]` untouched
///
/// Inside a bracket class the POSIX forms are used (`[:digit:]`), outside
/// an explicit class is spelled out.
pub fn ascii_classes(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut class_depth = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let Some(escaped) = chars.next() else {
                    out.push(c);
                    break;
                };
                let rewrite = if class_depth > 0 {
                    match escaped {
                        'd' => Some("[:digit:]"),
                        'D' => Some("[:^digit:]"),
                        'w' => Some("[:word:]"),
                        'W' => Some("[:^word:]"),
                        's' => Some("[:space:]"),
                        'S' => Some("[:^space:]"),
                        _ => None,
                    }
                } else {
                    match escaped {
                        'd' => Some("[0-9]"),
                        'D' => Some("[^0-9]"),
                        'w' => Some("[0-9A-Za-z_]"),
                        'W' => Some("[^0-9A-Za-z_]"),
                        's' => Some(r"[\t\n\x0B\x0C\r ]"),
                        'S' => Some(r"[^\t\n\x0B\x0C\r ]"),
                        'b' => Some(r"(?-u:\b)"),
                        _ => None,
                    }
                };
                match rewrite {
                    Some(ascii) => out.push_str(ascii),
                    None => {
                        out.push(c);
                        out.push(escaped);
                    }
                }
            }
            '[' => {
                out.push(c);
                if class_depth > 0 && chars.peek() == Some(&':') {
                    // POSIX class such as [:alpha:], copied through its closing ']'
                    for inner in chars.by_ref() {
                        out.push(inner);
                        if inner == ']' {
                            break;
                        }
                    }
                    continue;
                }
                class_depth += 1;
                // A leading ']' (after an optional '^') is a literal member
                if chars.peek() == Some(&'^') {
                    out.push('^');
                    chars.next();
                }
                if chars.peek() == Some(&']') {
                    out.push(']');
                    chars.next();
                }
            }
            ']' if class_depth > 0 => {
                class_depth -= 1;
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}

/// Value is not the zero value of its kind
pub struct Required;

impl Predicate for Required {
    fn test(&self, value: &FieldValue<'_>, _params: &[String]) -> Result<bool, String> {
        Ok(!value.is_zero())
    }
}

/// Integer, or text that reads as one
pub struct Int;

impl Predicate for Int {
    fn kinds(&self) -> &[ValueKind] {
        &[ValueKind::Int, ValueKind::Text]
    }

    fn test(&self, value: &FieldValue<'_>, _params: &[String]) -> Result<bool, String> {
        Ok(match value {
            FieldValue::Int(_) => true,
            FieldValue::Text(s) => INT_REGEX.is_match(s),
            _ => false,
        })
    }
}

/// Integer >= 1
pub struct Positive;

impl Predicate for Positive {
    fn kinds(&self) -> &[ValueKind] {
        &[ValueKind::Int]
    }

    fn test(&self, value: &FieldValue<'_>, _params: &[String]) -> Result<bool, String> {
        Ok(matches!(value, FieldValue::Int(n) if *n >= 1))
    }
}

/// Float > 0.0
pub struct PositiveDecimal;

impl Predicate for PositiveDecimal {
    fn kinds(&self) -> &[ValueKind] {
        &[ValueKind::Float]
    }

    fn test(&self, value: &FieldValue<'_>, _params: &[String]) -> Result<bool, String> {
        Ok(matches!(value, FieldValue::Float(x) if *x > 0.0))
    }
}

/// Integer within inclusive bounds: `range(min|max)`
pub struct Range;

impl Range {
    fn bounds(params: &[String]) -> Result<(i64, i64), String> {
        let [min, max] = params else {
            return Err(format!("range takes 2 bounds, got {}", params.len()));
        };
        let min: i64 = min
            .trim()
            .parse()
            .map_err(|_| format!("range bound '{}' is not an integer", min))?;
        let max: i64 = max
            .trim()
            .parse()
            .map_err(|_| format!("range bound '{}' is not an integer", max))?;
        if min > max {
            return Err(format!("range lower bound {} exceeds upper bound {}", min, max));
        }
        Ok((min, max))
    }
}

impl Predicate for Range {
    fn kinds(&self) -> &[ValueKind] {
        &[ValueKind::Int]
    }

    fn check_params(&self, params: &[String]) -> Result<(), String> {
        Self::bounds(params).map(|_| ())
    }

    fn test(&self, value: &FieldValue<'_>, params: &[String]) -> Result<bool, String> {
        let (min, max) = Self::bounds(params)?;
        Ok(matches!(value, FieldValue::Int(n) if (min..=max).contains(n)))
    }
}

/// Text fully matches a regular expression: `matches(pattern)`
///
/// The parser splits parameters on `|`, so they are re-joined here to
/// restore alternations. Perl classes are ASCII-only (`\d` is `[0-9]`).
/// Compiled patterns are kept for reuse, up to a fixed number of distinct
/// patterns.
#[derive(Default)]
pub struct Matches {
    compiled: RwLock<HashMap<String, Regex>>,
}

impl Matches {
    fn pattern(params: &[String]) -> Result<String, String> {
        if params.is_empty() {
            return Err("matches requires a pattern".to_string());
        }
        Ok(params.join("|"))
    }

    fn with_regex<T>(&self, params: &[String], f: impl FnOnce(&Regex) -> T) -> Result<T, String> {
        let pattern = Self::pattern(params)?;

        if let Some(regex) = self
            .compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&pattern)
        {
            return Ok(f(regex));
        }

        let regex = Regex::new(&format!("^(?:{})$", ascii_classes(&pattern)))
            .map_err(|e| format!("invalid pattern '{}': {}", pattern, e))?;
        let result = f(&regex);

        let mut compiled = self.compiled.write().unwrap_or_else(PoisonError::into_inner);
        if compiled.len() >= MAX_CACHED_PATTERNS {
            tracing::debug!("Pattern cache full ({} entries), clearing", compiled.len());
            compiled.clear();
        }
        compiled.insert(pattern, regex);
        Ok(result)
    }

    #[cfg(test)]
    fn cached_patterns(&self) -> usize {
        self.compiled.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Predicate for Matches {
    fn kinds(&self) -> &[ValueKind] {
        &[ValueKind::Text]
    }

    fn check_params(&self, params: &[String]) -> Result<(), String> {
        self.with_regex(params, |_| ())
    }

    fn test(&self, value: &FieldValue<'_>, params: &[String]) -> Result<bool, String> {
        match value {
            FieldValue::Text(s) => self.with_regex(params, |regex| regex.is_match(s)),
            _ => Ok(false),
        }
    }
}

/// Timestamp falls on today's local date
pub struct Today;

impl Predicate for Today {
    fn kinds(&self) -> &[ValueKind] {
        &[ValueKind::Timestamp]
    }

    fn test(&self, value: &FieldValue<'_>, _params: &[String]) -> Result<bool, String> {
        Ok(matches!(value, FieldValue::Timestamp(ts) if is_same_local_day(*ts, Local::now())))
    }
}

/// Timestamp is no further in the past than the tolerance
///
/// The tolerance given at registration applies to bare `test` calls; under
/// a validator the validator's own config decides.
pub struct Future {
    tolerance: Option<Duration>,
}

impl Future {
    fn check(value: &FieldValue<'_>, tolerance: Option<Duration>) -> bool {
        match (value, tolerance) {
            (FieldValue::Timestamp(ts), Some(tolerance)) => is_within_past_tolerance(*ts, Local::now(), tolerance),
            (FieldValue::Timestamp(_), None) => true,
            _ => false,
        }
    }
}

impl Predicate for Future {
    fn kinds(&self) -> &[ValueKind] {
        &[ValueKind::Timestamp]
    }

    fn test(&self, value: &FieldValue<'_>, _params: &[String]) -> Result<bool, String> {
        Ok(Self::check(value, self.tolerance))
    }

    fn test_with_config(
        &self,
        value: &FieldValue<'_>,
        _params: &[String],
        config: &EngineConfig,
    ) -> Result<bool, String> {
        Ok(Self::check(value, future_tolerance(config)))
    }
}
