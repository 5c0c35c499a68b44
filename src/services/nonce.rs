//! Request nonces
//!
//! Short-lived HMAC-SHA256 tokens bound to an action name. A token is valid
//! for the tick it was issued in and the one after, where a tick is half the
//! configured lifetime.

use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Token length in bytes before hex encoding
const TOKEN_BYTES: usize = 10;

/// Action protecting the settings form
pub const SETTINGS_ACTION: &str = "shortcode_locator_settings";

pub struct NonceService {
    key: Vec<u8>,
    tick_seconds: u64,
}

impl NonceService {
    /// `secret` of `None` generates a per-process key, so tokens do not
    /// survive a restart.
    pub fn new(secret: Option<&str>, lifetime_seconds: u64) -> Self {
        let key = match secret {
            Some(secret) if !secret.is_empty() => secret.as_bytes().to_vec(),
            _ => {
                let mut key = Uuid::new_v4().as_bytes().to_vec();
                key.extend_from_slice(Uuid::new_v4().as_bytes());
                key
            }
        };

        Self {
            key,
            tick_seconds: (lifetime_seconds / 2).max(1),
        }
    }

    pub fn create(&self, action: &str) -> String {
        self.create_at(action, now())
    }

    pub fn verify(&self, action: &str, token: &str) -> bool {
        self.verify_at(action, token, now())
    }

    /// Token for `action` at unix time `now`
    pub fn create_at(&self, action: &str, now: u64) -> String {
        match self.mac(action, self.tick(now)) {
            Some(mac) => HEXLOWER.encode(&mac.finalize().into_bytes()[..TOKEN_BYTES]),
            None => String::new(),
        }
    }

    /// Check `token` against the current and previous tick
    pub fn verify_at(&self, action: &str, token: &str, now: u64) -> bool {
        let Ok(bytes) = HEXLOWER_PERMISSIVE.decode(token.as_bytes()) else {
            warn!("Rejected malformed nonce for '{}'", action);
            return false;
        };
        if bytes.len() != TOKEN_BYTES {
            warn!("Rejected nonce of wrong length for '{}'", action);
            return false;
        }

        let tick = self.tick(now);
        let valid = [Some(tick), tick.checked_sub(1)]
            .into_iter()
            .flatten()
            .filter_map(|t| self.mac(action, t))
            .any(|mac| mac.verify_truncated_left(&bytes).is_ok());

        if !valid {
            warn!("Rejected expired or invalid nonce for '{}'", action);
        }
        valid
    }

    fn tick(&self, now: u64) -> u64 {
        now / self.tick_seconds
    }

    fn mac(&self, action: &str, tick: u64) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.key).ok()?;
        mac.update(format!("{}|{}", action, tick).as_bytes());
        Some(mac)
    }
}

fn now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
