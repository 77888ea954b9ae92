// src/modules/tripwire/matcher.rs

use crate::modules::tripwire::error::ConfigError;
use regex::Regex;

// Unanchored search: a pattern flags a path if it matches anywhere in it,
// so `/admin` also catches `/wp/admin/setup.php`. Anchor with `^`/`$` in the
// pattern itself for stricter rules.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    banned: Regex,
    whitelist: Option<Regex>,
}

impl PatternMatcher {
    pub fn new(banned_pattern: &str, whitelist_pattern: &str) -> Result<Self, ConfigError> {
        if banned_pattern.is_empty() {
            return Err(ConfigError::MissingBannedPattern);
        }
        let banned = compile("banned_pattern", banned_pattern)?;
        let whitelist = match whitelist_pattern {
            "" => None,
            pattern => Some(compile("whitelist_pattern", pattern)?),
        };
        Ok(Self { banned, whitelist })
    }

    pub fn is_banned(&self, path: &str) -> bool {
        self.banned.is_match(path)
    }

    // `host` is the caller address with the port already stripped.
    pub fn is_whitelisted(&self, host: &str) -> bool {
        self.whitelist.as_ref().is_some_and(|re| re.is_match(host))
    }

    pub fn whitelist_pattern(&self) -> Option<&str> {
        self.whitelist.as_ref().map(Regex::as_str)
    }
}

fn compile(field: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_anywhere_in_path() {
        let matcher = PatternMatcher::new("/admin", "").unwrap();
        assert!(matcher.is_banned("/admin"));
        assert!(matcher.is_banned("/admin/login"));
        assert!(matcher.is_banned("/site/admin.php"));
        assert!(!matcher.is_banned("/adm"));
        assert!(!matcher.is_banned("/"));
    }

    #[test]
    fn alternation_covers_several_signatures() {
        let matcher = PatternMatcher::new(r"^/(wp-login\.php|\.env|\.git/)", "").unwrap();
        assert!(matcher.is_banned("/wp-login.php"));
        assert!(matcher.is_banned("/.git/config"));
        assert!(!matcher.is_banned("/blog/wp-login.php"));
    }

    #[test]
    fn nothing_is_whitelisted_without_a_pattern() {
        let matcher = PatternMatcher::new("/admin", "").unwrap();
        assert!(!matcher.is_whitelisted("127.0.0.1"));
        assert_eq!(matcher.whitelist_pattern(), None);
    }

    #[test]
    fn whitelist_matches_host() {
        let matcher = PatternMatcher::new("/admin", r"203\.0\.113\.").unwrap();
        assert!(matcher.is_whitelisted("203.0.113.5"));
        assert!(!matcher.is_whitelisted("198.51.100.7"));
    }

    #[test]
    fn invalid_patterns_are_config_errors() {
        let err = PatternMatcher::new("(/admin", "").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidPattern { field: "banned_pattern", .. }
        ));

        let err = PatternMatcher::new("/admin", "[10.").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidPattern { field: "whitelist_pattern", .. }
        ));
    }

    #[test]
    fn empty_banned_pattern_is_rejected() {
        assert!(matches!(
            PatternMatcher::new("", ""),
            Err(ConfigError::MissingBannedPattern)
        ));
    }
}
