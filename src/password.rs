//! Password rules applied by the account store.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Character and length rules for new passwords.
///
/// `Default` is the administration area's relaxed setting: at least three
/// characters, three of them distinct, no character-class requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordOptions {
    /// Minimum number of characters
    pub required_length: usize,
    /// Minimum number of distinct characters
    pub required_unique_chars: usize,
    /// At least one ASCII digit
    pub require_digit: bool,
    /// At least one lowercase letter
    pub require_lowercase: bool,
    /// At least one uppercase letter
    pub require_uppercase: bool,
    /// At least one character that is neither a letter nor a digit
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            required_length: 3,
            required_unique_chars: 3,
            require_digit: false,
            require_lowercase: false,
            require_uppercase: false,
            require_non_alphanumeric: false,
        }
    }
}

/// A rule a password failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PasswordViolation {
    /// Shorter than `required_length`
    #[error("password must be at least {required} characters")]
    TooShort {
        /// Configured minimum
        required: usize,
    },
    /// Fewer distinct characters than `required_unique_chars`
    #[error("password must use at least {required} different characters")]
    TooFewUniqueChars {
        /// Configured minimum
        required: usize,
    },
    /// No digit
    #[error("password must contain a digit")]
    MissingDigit,
    /// No lowercase letter
    #[error("password must contain a lowercase letter")]
    MissingLowercase,
    /// No uppercase letter
    #[error("password must contain an uppercase letter")]
    MissingUppercase,
    /// No symbol
    #[error("password must contain a non-alphanumeric character")]
    MissingNonAlphanumeric,
}

impl PasswordOptions {
    /// Checks a password, reporting every rule it fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use admin_authz::{PasswordOptions, PasswordViolation};
    ///
    /// let options = PasswordOptions::default();
    /// assert!(options.validate("abc").is_ok());
    /// assert_eq!(
    ///     options.validate("aaa").unwrap_err(),
    ///     vec![PasswordViolation::TooFewUniqueChars { required: 3 }],
    /// );
    /// ```
    pub fn validate(&self, password: &str) -> Result<(), Vec<PasswordViolation>> {
        let mut violations = Vec::new();

        if password.chars().count() < self.required_length {
            violations.push(PasswordViolation::TooShort {
                required: self.required_length,
            });
        }
        if password.chars().collect::<HashSet<_>>().len() < self.required_unique_chars {
            violations.push(PasswordViolation::TooFewUniqueChars {
                required: self.required_unique_chars,
            });
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            violations.push(PasswordViolation::MissingDigit);
        }
        if self.require_lowercase && !password.chars().any(char::is_lowercase) {
            violations.push(PasswordViolation::MissingLowercase);
        }
        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            violations.push(PasswordViolation::MissingUppercase);
        }
        if self.require_non_alphanumeric && password.chars().all(char::is_alphanumeric) {
            violations.push(PasswordViolation::MissingNonAlphanumeric);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relaxed_defaults_accept_short_passwords() {
        let options = PasswordOptions::default();
        assert!(options.validate("xyz").is_ok());
        assert!(options.validate("a1!").is_ok());
    }

    #[test]
    fn reports_every_failed_rule() {
        let options = PasswordOptions::default();
        assert_eq!(
            options.validate("aa").unwrap_err(),
            vec![
                PasswordViolation::TooShort { required: 3 },
                PasswordViolation::TooFewUniqueChars { required: 3 },
            ]
        );
    }

    #[test]
    fn strict_options_check_character_classes() {
        let options = PasswordOptions {
            required_length: 8,
            required_unique_chars: 1,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        };

        assert!(options.validate("Secr3t!pass").is_ok());
        assert_eq!(
            options.validate("password").unwrap_err(),
            vec![
                PasswordViolation::MissingDigit,
                PasswordViolation::MissingUppercase,
                PasswordViolation::MissingNonAlphanumeric,
            ]
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let options = PasswordOptions::default();
        assert!(options.validate("äöü").is_ok());
    }

    #[test]
    fn violations_describe_the_rule() {
        assert_eq!(
            PasswordViolation::TooShort { required: 6 }.to_string(),
            "password must be at least 6 characters"
        );
        assert_eq!(
            PasswordViolation::MissingNonAlphanumeric.to_string(),
            "password must contain a non-alphanumeric character"
        );
    }
}
