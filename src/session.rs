use cookie::time::Duration;
use cookie::{Cookie, SameSite};
use std::fmt;

/// Token issued by the backend at login and kept in the auth cookie.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        AuthToken(token.into())
    }

    /// Finds the named cookie in a `Cookie:` header (or `document.cookie`)
    /// string. Empty values count as logged out.
    ///
    /// # Example
    /// ```
    /// use talho::session::AuthToken;
    ///
    /// let token = AuthToken::from_cookie_header("theme=dark; auth=abc123", "auth").unwrap();
    /// assert_eq!(token.authorization(), "Bearer abc123");
    /// ```
    pub fn from_cookie_header(header: &str, name: &str) -> Option<AuthToken> {
        Cookie::split_parse(header)
            .flatten()
            .find(|cookie| cookie.name() == name)
            .map(|cookie| cookie.value().trim().to_string())
            .filter(|value| !value.is_empty())
            .map(AuthToken)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value of the `Authorization` header for authenticated requests.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Keep tokens out of logs.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(..)")
    }
}

/// `Set-Cookie` value that stores the token after login.
pub fn session_cookie(name: &str, token: &AuthToken, days: i64) -> String {
    Cookie::build((name.to_string(), token.as_str().to_string()))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(Duration::days(days))
        .build()
        .to_string()
}

/// `Set-Cookie` value that clears the auth cookie on logout.
pub fn expired_cookie(name: &str) -> String {
    let mut cookie = Cookie::build((name.to_string(), String::new()))
        .path("/")
        .build();
    cookie.make_removal();
    cookie.to_string()
}
