//! User Password Value Object
//!
//! A password chosen at signup, reset or rotation, together with its
//! confirmation. Delegates policy and hashing to `platform::password`.

use platform::password::ClearTextPassword;
use std::fmt;

const PASSWORD_MISSING: &str = "Please create a password";
const CONFIRM_MISSING: &str = "Please confirm your password";
const CONFIRM_MISMATCH: &str = "Passwords do not match. Please try again";

/// Policy-checked password whose confirmation matched.
pub struct NewPassword(ClearTextPassword);

impl NewPassword {
    /// Every problem is reported, not just the first.
    pub fn new(password: Option<String>, confirm: Option<String>) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();

        let password = match password {
            None => {
                errors.push(PASSWORD_MISSING.to_string());
                None
            }
            Some(raw) => match ClearTextPassword::new(raw) {
                Ok(password) => Some(password),
                Err(e) => {
                    errors.push(e.to_string().trim_end_matches('.').to_string());
                    None
                }
            },
        };

        match confirm.as_deref() {
            None => errors.push(CONFIRM_MISSING.to_string()),
            Some(confirm) if confirm.trim().is_empty() => errors.push(CONFIRM_MISSING.to_string()),
            Some(confirm) => {
                if password.as_ref().is_some_and(|p| !p.matches(confirm)) {
                    errors.push(CONFIRM_MISMATCH.to_string());
                }
            }
        }

        match password {
            Some(password) if errors.is_empty() => Ok(Self(password)),
            _ => Err(errors),
        }
    }

    pub fn into_inner(self) -> ClearTextPassword {
        self.0
    }
}

impl fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NewPassword").field(&"[REDACTED]").finish()
    }
}
