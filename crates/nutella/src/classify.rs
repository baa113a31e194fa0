//! Keyword-based intent classification for incoming queries
//!
//! Decides whether a free-text question targets the users or the domains
//! resource of the admin API. Matching is case-insensitive substring search
//! against two fixed keyword sets.

use serde::{Deserialize, Serialize};

/// Keywords that indicate a question about domains or their configuration
const DOMAIN_KEYWORDS: &[&str] = &[
    "domain",
    "domains",
    "configuration",
    "config",
    "setting",
    "settings",
    "environment",
    "setup",
];

/// Keywords that indicate a question about users or accounts
const USER_KEYWORDS: &[&str] = &[
    "user", "users", "account", "accounts", "profile", "profiles", "member", "members", "people",
    "person",
];

/// The resource kind a query concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Users,
    Domains,
}

impl Route {
    /// Fallback route for queries matching both keyword sets or neither.
    ///
    /// Ambiguous and keyword-free questions go to the users resource. Kept as
    /// a single named policy so the fallback can change without touching the
    /// dispatch wiring.
    pub fn ambiguous_default() -> Self {
        Route::Users
    }

    /// Resource path segment on the admin API
    pub fn resource(&self) -> &'static str {
        match self {
            Route::Users => "users",
            Route::Domains => "domains",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.resource())
    }
}

/// Classify a query as targeting users or domains.
///
/// A query routes to domains only when it contains a domain keyword and no
/// user keyword; every other combination takes the ambiguous default.
/// Always returns a route.
pub fn classify(query: &str) -> Route {
    let lowered = query.to_lowercase();

    let mentions_domains = contains_any(&lowered, DOMAIN_KEYWORDS);
    let mentions_users = contains_any(&lowered, USER_KEYWORDS);

    if mentions_domains && !mentions_users {
        Route::Domains
    } else {
        Route::ambiguous_default()
    }
}

fn contains_any(haystack: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| haystack.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_keyword_routes_to_users() {
        assert_eq!(classify("show me all accounts"), Route::Users);
        assert_eq!(classify("how many users do we have?"), Route::Users);
        assert_eq!(classify("list every member"), Route::Users);
        assert_eq!(classify("who is this PERSON"), Route::Users);
    }

    #[test]
    fn test_domain_keyword_routes_to_domains() {
        assert_eq!(classify("which domains are registered?"), Route::Domains);
        assert_eq!(classify("show the environment setup"), Route::Domains);
        assert_eq!(classify("current CONFIG values"), Route::Domains);
    }

    #[test]
    fn test_both_keyword_sets_default_to_users() {
        assert_eq!(classify("which users changed domain settings?"), Route::Users);
    }

    #[test]
    fn test_no_keywords_default_to_users() {
        assert_eq!(classify("what happened yesterday?"), Route::Users);
        assert_eq!(classify(""), Route::Users);
    }

    #[test]
    fn test_keywords_match_as_substrings() {
        // "configuration" contains "config"; "usernames" contains "user"
        assert_eq!(classify("reconfiguration planned"), Route::Domains);
        assert_eq!(classify("dump the usernames"), Route::Users);
    }

    #[test]
    fn test_route_resource_paths() {
        assert_eq!(Route::Users.resource(), "users");
        assert_eq!(Route::Domains.resource(), "domains");
        assert_eq!(Route::Domains.to_string(), "domains");
    }

    #[test]
    fn test_ambiguous_default_is_users() {
        assert_eq!(Route::ambiguous_default(), Route::Users);
    }
}
