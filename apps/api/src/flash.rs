//! One-shot user messages carried across a redirect.
//!
//! Messages live in a signed cookie as URL-safe base64 JSON so the value stays
//! within the cookie character set. Rendering a page drains them.
//!
//! Browsers drop cookies over 4096 bytes, so each message is truncated and the
//! oldest pending messages are discarded once the encoded value gets too big.

use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};
use tracing::warn;

const FLASH_COOKIE: &str = "_flash";

/// Longest message kept, in characters.
const MAX_MESSAGE_CHARS: usize = 500;

/// Budget for the encoded value; leaves room for the signature and attributes.
const MAX_ENCODED_BYTES: usize = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    /// CSS class used by the templates.
    pub fn css_class(&self) -> &'static str {
        match self {
            FlashLevel::Success => "flash-success",
            FlashLevel::Error => "flash-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

fn decode(jar: &SignedCookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .and_then(|c| Base64UrlUnpadded::decode_vec(c.value()).ok())
        .and_then(|raw| serde_json::from_slice(&raw).ok())
        .unwrap_or_default()
}

fn encode(flashes: &[Flash]) -> String {
    // Serializing a Vec of plain structs cannot fail.
    Base64UrlUnpadded::encode_string(&serde_json::to_vec(flashes).unwrap_or_default())
}

fn truncate_message(message: String) -> String {
    match message.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((idx, _)) => format!("{}…", &message[..idx]),
        None => message,
    }
}

/// Appends a message to the pending list.
pub fn push(jar: SignedCookieJar, level: FlashLevel, message: impl Into<String>) -> SignedCookieJar {
    let mut flashes = decode(&jar);
    flashes.push(Flash {
        level,
        message: truncate_message(message.into()),
    });
    let mut value = encode(&flashes);
    while value.len() > MAX_ENCODED_BYTES && flashes.len() > 1 {
        flashes.remove(0);
        value = encode(&flashes);
    }
    let cookie = Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    jar.add(cookie)
}

pub fn error(jar: SignedCookieJar, message: impl Into<String>) -> SignedCookieJar {
    push(jar, FlashLevel::Error, message)
}

pub fn success(jar: SignedCookieJar, message: impl Into<String>) -> SignedCookieJar {
    push(jar, FlashLevel::Success, message)
}

/// Removes all pending messages, returning them with the updated jar.
pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Vec<Flash>) {
    let flashes = decode(&jar);
    if flashes.is_empty() && jar.get(FLASH_COOKIE).is_none() {
        return (jar, flashes);
    }
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, flashes)
}

/// Key for signing the flash cookie.
///
/// Falls back to a random key when no secret is configured or it is shorter
/// than 64 bytes; flashes then do not survive a restart.
pub fn signing_key(secret: Option<&str>) -> Key {
    match secret.map(|s| Key::try_from(s.as_bytes())) {
        Some(Ok(key)) => key,
        Some(Err(_)) => {
            warn!("SECRET_KEY is shorter than 64 bytes; using a random cookie key");
            Key::generate()
        }
        None => {
            warn!("SECRET_KEY not set; using a random cookie key");
            Key::generate()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::header, response::IntoResponse};

    #[test]
    fn test_push_then_take_returns_messages_in_order() {
        let jar = SignedCookieJar::new(Key::generate());
        let jar = error(jar, "first");
        let jar = success(jar, "second");

        let (jar, flashes) = take(jar);
        assert_eq!(
            flashes,
            vec![
                Flash {
                    level: FlashLevel::Error,
                    message: "first".to_string()
                },
                Flash {
                    level: FlashLevel::Success,
                    message: "second".to_string()
                },
            ]
        );

        let (_, again) = take(jar);
        assert!(again.is_empty());
    }

    #[test]
    fn test_take_on_empty_jar() {
        let jar = SignedCookieJar::new(Key::generate());
        let (_, flashes) = take(jar);
        assert!(flashes.is_empty());
    }

    #[test]
    fn test_encoded_value_is_cookie_safe() {
        let value = encode(&[Flash {
            level: FlashLevel::Error,
            message: "Lỗi: \"bad\"; x=1, y".to_string(),
        }]);
        assert!(value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    fn set_cookie_len(jar: SignedCookieJar) -> usize {
        let response = jar.into_response();
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.len())
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_long_message_fits_in_a_cookie() {
        let message = format!(
            "Error: LLM call failed: API error (status 502): {}",
            "x".repeat(2100)
        );
        let jar = error(SignedCookieJar::new(Key::generate()), message);
        assert!(set_cookie_len(jar.clone()) < 4096);

        let (_, flashes) = take(jar);
        assert_eq!(flashes.len(), 1);
        assert!(flashes[0].message.starts_with("Error: LLM call failed"));
        assert_eq!(flashes[0].message.chars().count(), MAX_MESSAGE_CHARS + 1);
    }

    #[test]
    fn test_many_wide_messages_drop_the_oldest() {
        let mut jar = SignedCookieJar::new(Key::generate());
        for i in 0..6 {
            jar = error(jar, format!("{i}{}", "错".repeat(600)));
        }
        assert!(set_cookie_len(jar.clone()) < 4096);

        let (_, flashes) = take(jar);
        assert!(!flashes.is_empty());
        assert!(flashes.last().unwrap().message.starts_with('5'));
    }

    #[test]
    fn test_signing_key_from_secret_is_stable() {
        let secret = "s".repeat(64);
        let a = signing_key(Some(&secret));
        let b = signing_key(Some(&secret));
        assert_eq!(a.master(), b.master());
    }

    #[test]
    fn test_short_secret_falls_back_to_random_key() {
        let a = signing_key(Some("short"));
        let b = signing_key(Some("short"));
        assert_ne!(a.master(), b.master());
    }
}
