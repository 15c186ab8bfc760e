//! Double-submit anti-forgery tokens for the HTML forms.
//!
//! Rendering a form hands the browser a random nonce in a strict same-site
//! cookie and puts `hex(sha256(secret ":" nonce))` in a hidden field. A post is
//! accepted only when the field matches the signature of the cookie's nonce.

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const COOKIE_NAME: &str = "movies_af";
pub const FORM_FIELD: &str = "_csrf";

#[derive(Clone)]
pub struct Antiforgery {
    secret: Arc<str>,
    secure_cookie: bool,
}

/// Token handed out with a rendered form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormToken {
    pub nonce: String,
    pub value: String,
    secure_cookie: bool,
}

impl FormToken {
    /// `Set-Cookie` value carrying the nonce.
    pub fn cookie(&self) -> String {
        let mut cookie = format!(
            "{COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Strict",
            self.nonce
        );
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

impl Antiforgery {
    pub fn new(secret: impl Into<String>, secure_cookie: bool) -> Self {
        Self {
            secret: Arc::from(secret.into()),
            secure_cookie,
        }
    }

    /// Uses a per-process secret; tokens do not survive a restart.
    pub fn random(secure_cookie: bool) -> Self {
        Self::new(
            format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple()),
            secure_cookie,
        )
    }

    fn sign(&self, nonce: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b":");
        hasher.update(nonce.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Issues a token, reusing the request's nonce so other open forms stay valid.
    pub fn issue(&self, headers: &HeaderMap) -> FormToken {
        let nonce = cookie_value(headers, COOKIE_NAME)
            .filter(|n| is_valid_nonce(n))
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

        FormToken {
            value: self.sign(&nonce),
            nonce,
            secure_cookie: self.secure_cookie,
        }
    }

    pub fn verify(&self, headers: &HeaderMap, submitted: &str) -> bool {
        match cookie_value(headers, COOKIE_NAME) {
            Some(nonce) if is_valid_nonce(&nonce) => constant_time_eq(&self.sign(&nonce), submitted),
            _ => false,
        }
    }
}

fn is_valid_nonce(nonce: &str) -> bool {
    nonce.len() == 32 && nonce.bytes().all(|b| b.is_ascii_hexdigit())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .bytes()
            .zip(b.bytes())
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_issued_token_verifies_against_its_cookie() {
        let af = Antiforgery::new("secret", false);
        let token = af.issue(&HeaderMap::new());

        let headers = headers_with_cookie(&format!("theme=dark; {COOKIE_NAME}={}", token.nonce));
        assert!(af.verify(&headers, &token.value));
    }

    #[test]
    fn test_missing_cookie_or_wrong_value_fails() {
        let af = Antiforgery::new("secret", false);
        let token = af.issue(&HeaderMap::new());

        assert!(!af.verify(&HeaderMap::new(), &token.value));

        let headers = headers_with_cookie(&format!("{COOKIE_NAME}={}", token.nonce));
        assert!(!af.verify(&headers, "forged"));
    }

    #[test]
    fn test_token_from_other_secret_fails() {
        let issuer = Antiforgery::new("one", false);
        let checker = Antiforgery::new("two", false);
        let token = issuer.issue(&HeaderMap::new());

        let headers = headers_with_cookie(&format!("{COOKIE_NAME}={}", token.nonce));
        assert!(!checker.verify(&headers, &token.value));
    }

    #[test]
    fn test_existing_nonce_is_reused() {
        let af = Antiforgery::new("secret", true);
        let first = af.issue(&HeaderMap::new());

        let headers = headers_with_cookie(&format!("{COOKIE_NAME}={}", first.nonce));
        let second = af.issue(&headers);
        assert_eq!(first, second);
        assert!(second.cookie().ends_with("; Secure"));
    }
}
