//! Bearer Token Validation
//!
//! Resolves a bearer API key to a user by decoding the token and comparing
//! its embedded epoch against the user's stored `key_epoch`. Epochs are
//! integer milliseconds on both sides: the value written at issuance is the
//! value compared here, with no truncation step anywhere in between.

use chrono::Utc;
use sqlx::PgPool;
use tracing::warn;

use super::error::{AuthError, AuthResult};
use super::keys::decode_api_key;
use crate::db::{self, User};

/// Outcome of comparing a token's embedded epoch against the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochCheck {
    /// `users.key_epoch` is NULL: the row predates the epoch column and no
    /// key has ever been issued for it.
    Uninitialized,
    /// Embedded epoch equals the stored epoch exactly.
    Match,
    /// Embedded epoch differs from the stored epoch: every earlier key is
    /// revoked the instant a new one is issued.
    Mismatch,
}

/// Compare epochs at full `i64` millisecond precision.
pub const fn check_epoch(stored: Option<i64>, presented: i64) -> EpochCheck {
    match stored {
        None => EpochCheck::Uninitialized,
        Some(epoch) if epoch == presented => EpochCheck::Match,
        Some(_) => EpochCheck::Mismatch,
    }
}

/// Current time in integer milliseconds, the epoch's storage precision.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Validate a bearer API key and resolve its user.
///
/// Every failure maps to `AuthError::InvalidApiKey`; the response does not
/// reveal which check failed. The distinct causes are logged for audit.
pub async fn validate_api_key(pool: &PgPool, token: &str, secret_hex: &str) -> AuthResult<User> {
    let (user_id, presented_epoch) = match decode_api_key(token, secret_hex) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(error = %e, "API key rejected: token failed to decode");
            return Err(AuthError::InvalidApiKey);
        }
    };

    let Some(user) = db::find_user_by_id(pool, user_id).await? else {
        warn!(user_id = %user_id, "API key rejected: no matching user");
        return Err(AuthError::InvalidApiKey);
    };

    match check_epoch(user.key_epoch, presented_epoch) {
        EpochCheck::Match => Ok(user),
        EpochCheck::Uninitialized => {
            // Legacy row from before the epoch column existed. Stamp it so
            // subsequent requests compare against a real value instead of
            // re-entering this branch; the presented token cannot carry the
            // freshly stamped epoch and stays rejected.
            db::set_key_epoch(pool, user.id, now_epoch_ms()).await?;
            warn!(user_id = %user.id, "API key rejected: epoch was uninitialized, stamped now");
            Err(AuthError::InvalidApiKey)
        }
        EpochCheck::Mismatch => {
            warn!(user_id = %user.id, "API key rejected: epoch mismatch (key revoked)");
            Err(AuthError::InvalidApiKey)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_passes() {
        assert_eq!(check_epoch(Some(1722325600123), 1722325600123), EpochCheck::Match);
    }

    #[test]
    fn test_one_millisecond_off_is_a_mismatch() {
        assert_eq!(check_epoch(Some(1722325600123), 1722325600122), EpochCheck::Mismatch);
        assert_eq!(check_epoch(Some(1722325600123), 1722325600124), EpochCheck::Mismatch);
    }

    #[test]
    fn test_missing_stored_epoch_is_uninitialized_not_match() {
        assert_eq!(check_epoch(None, 1722325600123), EpochCheck::Uninitialized);
        assert_eq!(check_epoch(None, 0), EpochCheck::Uninitialized);
    }

    #[test]
    fn test_zero_epoch_still_compares_exactly() {
        assert_eq!(check_epoch(Some(0), 0), EpochCheck::Match);
        assert_eq!(check_epoch(Some(0), 1), EpochCheck::Mismatch);
    }

    #[test]
    fn test_now_epoch_ms_is_millisecond_scale() {
        // 2020-01-01 in milliseconds; a seconds-scale value would be three
        // orders of magnitude smaller.
        assert!(now_epoch_ms() > 1_577_836_800_000);
    }
}
