//! Password policy applied at registration.

/// Password requirements. The default mirrors the account rules every
/// registration is held to.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        }
    }
}

/// A single unmet password requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    PasswordTooShort { min_length: usize },
    PasswordMissingDigit,
    PasswordMissingLowercase,
    PasswordMissingUppercase,
    PasswordMissingNonAlphanumeric,
}

impl std::fmt::Display for PolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyError::PasswordTooShort { min_length } => {
                write!(f, "Passwords must be at least {} characters.", min_length)
            }
            PolicyError::PasswordMissingDigit => {
                write!(f, "Passwords must have at least one digit ('0'-'9').")
            }
            PolicyError::PasswordMissingLowercase => {
                write!(f, "Passwords must have at least one lowercase ('a'-'z').")
            }
            PolicyError::PasswordMissingUppercase => {
                write!(f, "Passwords must have at least one uppercase ('A'-'Z').")
            }
            PolicyError::PasswordMissingNonAlphanumeric => {
                write!(f, "Passwords must have at least one non alphanumeric character.")
            }
        }
    }
}

impl std::error::Error for PolicyError {}

impl PasswordPolicy {
    /// Every violation, in a stable order, so callers can report them together.
    pub fn violations(&self, password: &str) -> Vec<PolicyError> {
        let mut errors = Vec::new();

        if password.chars().count() < self.min_length {
            errors.push(PolicyError::PasswordTooShort {
                min_length: self.min_length,
            });
        }

        if self.require_non_alphanumeric && password.chars().all(|c| c.is_ascii_alphanumeric()) {
            errors.push(PolicyError::PasswordMissingNonAlphanumeric);
        }

        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(PolicyError::PasswordMissingDigit);
        }

        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push(PolicyError::PasswordMissingLowercase);
        }

        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push(PolicyError::PasswordMissingUppercase);
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_password_passes() {
        assert!(PasswordPolicy::default().violations("Secret#1").is_empty());
    }

    #[test]
    fn test_all_violations_are_reported() {
        let errors = PasswordPolicy::default().violations("abc");
        assert_eq!(
            errors,
            vec![
                PolicyError::PasswordTooShort { min_length: 6 },
                PolicyError::PasswordMissingNonAlphanumeric,
                PolicyError::PasswordMissingDigit,
                PolicyError::PasswordMissingUppercase,
            ]
        );
    }

    #[test]
    fn test_empty_password_fails_every_rule() {
        assert_eq!(PasswordPolicy::default().violations("").len(), 5);
    }
}
