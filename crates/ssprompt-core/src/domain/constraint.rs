//! Dependency version constraints.
//!
//! A constraint is one of:
//!
//! | Form       | Example    | Accepts                                             |
//! |------------|------------|-----------------------------------------------------|
//! | `latest`   | `latest`   | anything; selection picks the index's latest        |
//! | caret      | `^1.2.0`   | same segment count, candidate >= constraint         |
//! | tilde      | `~1.2.0`   | same segment count, candidate >= constraint         |
//! | wildcard   | `1.*.*`    | full match, `*` standing for one or more digits     |
//!
//! Caret and tilde compare dot-separated segments pairwise and stop at the
//! first difference. Candidates with a different number of segments never
//! match (`1.2` does not satisfy `^1.2.0`).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::domain::error::DomainError;

const LATEST: &str = "latest";

/// A parsed version constraint.
#[derive(Debug, Clone)]
pub enum VersionConstraint {
    Latest,
    Caret(Vec<String>),
    Tilde(Vec<String>),
    Wildcard { pattern: String, regex: Regex },
}

impl VersionConstraint {
    /// Parse a constraint string.
    ///
    /// Malformed input is a configuration error and is never treated as
    /// "matches nothing".
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(invalid(raw, "constraint is empty"));
        }
        if raw == LATEST {
            return Ok(Self::Latest);
        }
        if let Some(body) = raw.strip_prefix('^') {
            return Ok(Self::Caret(segments(raw, body)?));
        }
        if let Some(body) = raw.strip_prefix('~') {
            return Ok(Self::Tilde(segments(raw, body)?));
        }
        Self::wildcard(raw)
    }

    fn wildcard(raw: &str) -> Result<Self, DomainError> {
        check_charset(raw, raw, true)?;

        let mut pattern = String::with_capacity(raw.len() * 2 + 2);
        pattern.push('^');
        for c in raw.chars() {
            if c == '*' {
                pattern.push_str(r"\d+");
            } else {
                pattern.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
            }
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|e| invalid(raw, &e.to_string()))?;
        Ok(Self::Wildcard {
            pattern: raw.to_string(),
            regex,
        })
    }

    /// Whether `version` satisfies this constraint.
    pub fn matches(&self, version: &str) -> bool {
        let version = version.trim();
        match self {
            Self::Latest => true,
            Self::Caret(required) => caret_matches(required, version),
            Self::Tilde(required) => tilde_matches(required, version),
            Self::Wildcard { regex, .. } => regex.is_match(version),
        }
    }

    /// Pick a version from `available`.
    ///
    /// `latest` short-circuits to `latest_version` without looking at the
    /// list. Every other form returns the first entry, in the order given,
    /// that matches.
    pub fn select<S: AsRef<str>>(&self, available: &[S], latest_version: &str) -> Option<String> {
        if matches!(self, Self::Latest) {
            return Some(latest_version.to_string());
        }
        available
            .iter()
            .map(AsRef::as_ref)
            .find(|v| self.matches(v))
            .map(str::to_string)
    }

    pub const fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }
}

impl PartialEq for VersionConstraint {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Latest, Self::Latest) => true,
            (Self::Caret(a), Self::Caret(b)) | (Self::Tilde(a), Self::Tilde(b)) => a == b,
            (Self::Wildcard { pattern: a, .. }, Self::Wildcard { pattern: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl Eq for VersionConstraint {}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST),
            Self::Caret(segs) => write!(f, "^{}", segs.join(".")),
            Self::Tilde(segs) => write!(f, "~{}", segs.join(".")),
            Self::Wildcard { pattern, .. } => f.write_str(pattern),
        }
    }
}

impl FromStr for VersionConstraint {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Whether `version` satisfies `constraint`.
pub fn matches(version: &str, constraint: &str) -> Result<bool, DomainError> {
    Ok(VersionConstraint::parse(constraint)?.matches(version))
}

/// First version in `available` compatible with `constraint`.
pub fn select_compatible<S: AsRef<str>>(
    constraint: &str,
    available: &[S],
    latest_version: &str,
) -> Result<Option<String>, DomainError> {
    Ok(VersionConstraint::parse(constraint)?.select(available, latest_version))
}

// ── segment comparison ────────────────────────────────────────────────────────

fn caret_matches(required: &[String], version: &str) -> bool {
    let candidate: Vec<&str> = version.split('.').collect();
    if candidate.len() != required.len() {
        return false;
    }
    for (c, r) in candidate.iter().zip(required) {
        match compare_segments(c, r) {
            Ordering::Greater => return true,
            Ordering::Less => return false,
            Ordering::Equal => {}
        }
    }
    true
}

fn tilde_matches(required: &[String], version: &str) -> bool {
    let candidate: Vec<&str> = version.split('.').collect();
    if candidate.len() != required.len() {
        return false;
    }
    let (Some((last_required, leading_required)), Some((last_candidate, leading_candidate))) =
        (required.split_last(), candidate.split_last())
    else {
        return false;
    };

    for (c, r) in leading_candidate.iter().zip(leading_required) {
        match compare_segments(c, r) {
            Ordering::Greater => return true,
            Ordering::Less => return false,
            Ordering::Equal => {}
        }
    }
    compare_segments(last_candidate, last_required) != Ordering::Less
}

/// Order two dotted versions segment by segment; a shorter version that is a
/// prefix of a longer one sorts first.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (Some(x), Some(y)) => match compare_segments(x, y) {
                Ordering::Equal => {}
                other => return other,
            },
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (None, None) => return Ordering::Equal,
        }
    }
}

/// Order two version segments.
///
/// Purely numeric segments compare by value (`"10" > "9"`); anything else
/// falls back to byte-wise comparison.
pub(crate) fn compare_segments(a: &str, b: &str) -> Ordering {
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|c| c.is_ascii_digit());
    if numeric(a) && numeric(b) {
        let a = a.trim_start_matches('0');
        let b = b.trim_start_matches('0');
        return a.len().cmp(&b.len()).then_with(|| a.cmp(b));
    }
    a.cmp(b)
}

// ── parsing helpers ───────────────────────────────────────────────────────────

fn segments(raw: &str, body: &str) -> Result<Vec<String>, DomainError> {
    if body.is_empty() {
        return Err(invalid(raw, "missing version after operator"));
    }
    check_charset(raw, body, false)?;

    let segs: Vec<String> = body.split('.').map(str::to_string).collect();
    if segs.iter().any(String::is_empty) {
        return Err(invalid(raw, "empty version segment"));
    }
    Ok(segs)
}

fn check_charset(raw: &str, body: &str, allow_star: bool) -> Result<(), DomainError> {
    let allowed = |c: char| {
        c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '!' | '-') || (allow_star && c == '*')
    };
    if let Some(bad) = body.chars().find(|c| !allowed(*c)) {
        return Err(invalid(raw, &format!("unexpected character '{bad}'")));
    }
    Ok(())
}

fn invalid(raw: &str, reason: &str) -> DomainError {
    DomainError::InvalidConstraint {
        constraint: raw.to_string(),
        reason: reason.to_string(),
    }
}
