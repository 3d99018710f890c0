//! Prefix/suffix pattern matching.

use crate::config::ConfigError;
use crate::crypto::{HEX_LEN, MARKER};

/// Longest prefix or suffix accepted, in hex digits.
pub const MAX_DIGITS: usize = HEX_LEN - 1;

/// Result of a pattern match operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    /// Full match found
    Match,
    /// No match
    NoMatch,
}

impl MatchResult {
    #[inline]
    pub fn is_match(self) -> bool {
        matches!(self, MatchResult::Match)
    }
}

impl From<bool> for MatchResult {
    #[inline]
    fn from(matched: bool) -> Self {
        if matched {
            MatchResult::Match
        } else {
            MatchResult::NoMatch
        }
    }
}

/// A compiled prefix/suffix pattern.
///
/// Addresses are compared in their EIP-55 form with the `0x` marker, so a
/// prefix always starts with the marker. When the pattern is case
/// insensitive both components are lowered once, at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    prefix: String,
    suffix: String,
    case_sensitive: bool,
}

fn is_hex_run(s: &str) -> bool {
    (1..=MAX_DIGITS).contains(&s.len()) && s.chars().all(|c| c.is_ascii_hexdigit())
}

impl Pattern {
    /// Creates a pattern from components that are already well formed.
    ///
    /// Empty strings mean "no constraint". At least one component must be
    /// non-empty.
    pub fn new(
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        case_sensitive: bool,
    ) -> Result<Self, ConfigError> {
        let normalize = |s: String| if case_sensitive { s } else { s.to_lowercase() };
        let prefix = normalize(prefix.into());
        let suffix = normalize(suffix.into());

        if prefix.is_empty() && suffix.is_empty() {
            return Err(ConfigError::EmptyPattern);
        }

        Ok(Self {
            prefix,
            suffix,
            case_sensitive,
        })
    }

    /// Validates raw user input and builds the pattern.
    ///
    /// A prefix must be the marker followed by 1 to 39 hex digits, a suffix
    /// 1 to 39 hex digits.
    pub fn parse(prefix: &str, suffix: &str, case_sensitive: bool) -> Result<Self, ConfigError> {
        if !prefix.is_empty() {
            let valid = prefix
                .strip_prefix(MARKER)
                .map(is_hex_run)
                .unwrap_or(false);
            if !valid {
                return Err(ConfigError::InvalidPrefix(prefix.to_string()));
            }
        }

        if !suffix.is_empty() && !is_hex_run(suffix) {
            return Err(ConfigError::InvalidSuffix(suffix.to_string()));
        }

        Self::new(prefix, suffix, case_sensitive)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Matches a rendered address against this pattern.
    #[inline]
    pub fn matches(&self, address: &str) -> MatchResult {
        if self.case_sensitive {
            self.matches_folded(address)
        } else {
            self.matches_folded(&address.to_ascii_lowercase())
        }
    }

    #[inline]
    fn matches_folded(&self, address: &str) -> MatchResult {
        (address.starts_with(&self.prefix) && address.ends_with(&self.suffix)).into()
    }

    /// Expected number of attempts to find one match.
    ///
    /// Each hex digit has 16 possible values. With case sensitivity every
    /// letter must also land on the requested EIP-55 casing, which halves
    /// the odds again.
    pub fn estimated_difficulty(&self) -> u64 {
        let digits = self
            .prefix
            .strip_prefix(MARKER)
            .unwrap_or(&self.prefix)
            .chars()
            .chain(self.suffix.chars());

        digits.fold(1u64, |acc, c| {
            let odds = if self.case_sensitive && c.is_ascii_alphabetic() {
                32
            } else {
                16
            };
            acc.saturating_mul(odds)
        })
    }

    /// Returns a human-readable difficulty estimate.
    pub fn difficulty_description(&self) -> String {
        let diff = self.estimated_difficulty();
        match diff {
            0..=1_000 => "Very Easy (< 1 second)".into(),
            1_001..=100_000 => "Easy (seconds)".into(),
            100_001..=10_000_000 => "Medium (minutes)".into(),
            10_000_001..=1_000_000_000 => "Hard (hours)".into(),
            _ => "Very Hard (days or more)".into(),
        }
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = if self.prefix.is_empty() { "-" } else { self.prefix.as_str() };
        let suffix = if self.suffix.is_empty() { "-" } else { self.suffix.as_str() };
        write!(
            f,
            "prefix={} suffix={} ({})",
            prefix,
            suffix,
            if self.case_sensitive {
                "case sensitive"
            } else {
                "ignore case"
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0xabcdef0123456789ABCDEF0123456789abcdef01";

    fn sample_addresses() -> Vec<String> {
        vec![
            ADDR.to_string(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf".into(),
            format!("0x{}", "0".repeat(40)),
            "0xDeaDbeefdEAdbeefdEadbEEFdeadbeEFdEaDbeeF".into(),
        ]
    }

    #[test]
    fn test_prefix_only_is_starts_with() {
        for addr in sample_addresses() {
            for len in [3, 4, 8, 20, 42] {
                let prefix = &addr[..len];
                let sensitive = Pattern::new(prefix, "", true).unwrap();
                assert!(sensitive.matches(&addr).is_match());

                let other = Pattern::new("0x1234", "", true).unwrap();
                assert_eq!(other.matches(&addr).is_match(), addr.starts_with("0x1234"));

                let folded = Pattern::new(prefix.to_uppercase().replace("0X", "0x"), "", false)
                    .unwrap();
                assert!(folded.matches(&addr).is_match());
            }
        }
    }

    #[test]
    fn test_suffix_only_is_ends_with() {
        for addr in sample_addresses() {
            for len in [1, 4, 39] {
                let suffix = &addr[addr.len() - len..];
                let pattern = Pattern::new("", suffix, true).unwrap();
                assert!(pattern.matches(&addr).is_match());

                let folded = Pattern::new("", suffix.to_uppercase(), false).unwrap();
                assert!(folded.matches(&addr).is_match());
            }
            let miss = Pattern::new("", "fff", true).unwrap();
            assert_eq!(miss.matches(&addr).is_match(), addr.ends_with("fff"));
        }
    }

    #[test]
    fn test_prefix_and_suffix() {
        let pattern = Pattern::new("0xabc", "ef01", true).unwrap();
        assert!(pattern.matches(ADDR).is_match());

        let pattern = Pattern::new("0xabc", "ef02", true).unwrap();
        assert!(!pattern.matches(ADDR).is_match());
    }

    #[test]
    fn test_ignore_case_matches_mixed_case() {
        let pattern = Pattern::new("0xAB", "", false).unwrap();
        assert_eq!(pattern.prefix(), "0xab");
        assert!(pattern.matches("0xabcdef0000000000000000000000000000000000").is_match());
    }

    #[test]
    fn test_case_sensitive_mismatch() {
        let pattern = Pattern::new("0xAB", "", true).unwrap();
        assert!(!pattern.matches("0xabcdef0000000000000000000000000000000000").is_match());
        assert!(pattern.matches("0xABcdef0000000000000000000000000000000000").is_match());
    }

    #[test]
    fn test_idempotent() {
        let pattern = Pattern::new("0xab", "01", false).unwrap();
        let first = pattern.matches(ADDR);
        let second = pattern.matches(ADDR);
        assert_eq!(first, second);
        assert!(first.is_match());
    }

    #[test]
    fn test_max_length_prefix() {
        let prefix = &ADDR[..2 + MAX_DIGITS];
        let pattern = Pattern::parse(prefix, "", true).unwrap();
        assert!(pattern.matches(ADDR).is_match());

        // Only the final digit is free
        let mut other = ADDR[..41].to_string();
        other.push('2');
        assert!(pattern.matches(&other).is_match());

        let mut flipped = ADDR.to_string();
        flipped.replace_range(40..41, "1");
        assert!(!pattern.matches(&flipped).is_match());
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(matches!(
            Pattern::new("", "", false),
            Err(ConfigError::EmptyPattern)
        ));
        assert!(matches!(
            Pattern::parse("", "", true),
            Err(ConfigError::EmptyPattern)
        ));
    }

    #[test]
    fn test_parse_validation() {
        assert!(Pattern::parse("0xdead", "", false).is_ok());
        assert!(Pattern::parse("", "BEEF", false).is_ok());
        assert!(Pattern::parse("0xABc", "DEf", true).is_ok());

        assert!(matches!(
            Pattern::parse("dead", "", false),
            Err(ConfigError::InvalidPrefix(_))
        ));
        assert!(matches!(
            Pattern::parse("0x", "", false),
            Err(ConfigError::InvalidPrefix(_))
        ));
        assert!(matches!(
            Pattern::parse("0xzz", "", false),
            Err(ConfigError::InvalidPrefix(_))
        ));
        assert!(matches!(
            Pattern::parse(&format!("0x{}", "a".repeat(40)), "", false),
            Err(ConfigError::InvalidPrefix(_))
        ));
        assert!(matches!(
            Pattern::parse("", "0xbeef", false),
            Err(ConfigError::InvalidSuffix(_))
        ));
        assert!(matches!(
            Pattern::parse("", &"1".repeat(40), false),
            Err(ConfigError::InvalidSuffix(_))
        ));
    }

    #[test]
    fn test_difficulty() {
        let pattern = Pattern::new("0xdead", "", false).unwrap();
        assert_eq!(pattern.estimated_difficulty(), 65536); // 16^4

        let pattern = Pattern::new("0x12", "ab", false).unwrap();
        assert_eq!(pattern.estimated_difficulty(), 65536);

        let pattern = Pattern::new("0xA1", "", true).unwrap();
        assert_eq!(pattern.estimated_difficulty(), 32 * 16);

        let pattern = Pattern::new(format!("0x{}", "f".repeat(39)), "", false).unwrap();
        assert_eq!(pattern.estimated_difficulty(), u64::MAX);
        assert_eq!(pattern.difficulty_description(), "Very Hard (days or more)");
    }
}
