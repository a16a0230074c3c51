use crate::error::{AppError, AppResult};
use regex::Regex;

/// 验证用户名: 3-20位字母数字下划线
pub fn validate_username(username: &str) -> AppResult<()> {
    let username_regex = Regex::new(r"^[a-zA-Z0-9_]{3,20}$").unwrap();

    if !username_regex.is_match(username) {
        return Err(AppError::ValidationError(
            "Username must be 3-20 characters of letters, digits or underscores".to_string(),
        ));
    }

    Ok(())
}

/// 验证邮箱格式
pub fn validate_email(email: &str) -> AppResult<()> {
    let email_regex = Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();

    if email.len() > 254 || !email_regex.is_match(email) {
        return Err(AppError::ValidationError(
            "Invalid email address".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("ab").is_err()); // 太短
        assert!(validate_username("name with spaces").is_err());
        assert!(validate_username("way_too_long_username_over_limit").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("fan@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.org").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
    }
}
