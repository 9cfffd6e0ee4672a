/// 本文の最大文字数。
pub const MAX_CONTENT_CHARS: usize = 4096;
/// 表示名の最大文字数。
pub const MAX_NAME_CHARS: usize = 64;
/// サイト URL・メールアドレスの最大文字数。
pub const MAX_SITE_CHARS: usize = 256;
pub const MAX_EMAIL_CHARS: usize = 256;

/// 識別子を整形する。前後の空白を除去し、空なら拒否する。
pub fn check_id(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("id must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}

/// 本文を整形する。空文字と長過ぎる入力を拒否する。
pub fn check_content(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("content must not be empty".to_string());
    }
    if trimmed.chars().count() > MAX_CONTENT_CHARS {
        return Err(format!(
            "content must be at most {MAX_CONTENT_CHARS} characters"
        ));
    }
    Ok(trimmed.to_string())
}

/// 表示名を整形する。空は拒否。
pub fn check_display_name(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("name must not be empty".to_string());
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(format!("name must be at most {MAX_NAME_CHARS} characters"));
    }
    Ok(trimmed.to_string())
}

/// 任意項目のサイト URL を整形する。空なら None。
pub fn check_optional_site(raw: &str) -> Result<Option<String>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_SITE_CHARS {
        return Err(format!("site must be at most {MAX_SITE_CHARS} characters"));
    }
    Ok(Some(trimmed.to_string()))
}

/// 任意項目のメールアドレスを整形する。空なら None。
pub fn check_optional_email(raw: &str) -> Result<Option<String>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_EMAIL_CHARS {
        return Err(format!("email must be at most {MAX_EMAIL_CHARS} characters"));
    }
    if !trimmed.contains('@') {
        return Err("email address is invalid".to_string());
    }
    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_content_trims_and_rejects_empty() {
        assert_eq!(check_content("  hello  "), Ok("hello".to_string()));
        assert!(check_content("   ").is_err());
        assert!(check_content("").is_err());
    }

    #[test]
    fn check_content_rejects_oversized_input() {
        let long = "a".repeat(MAX_CONTENT_CHARS + 1);
        assert!(check_content(&long).is_err());
        let at_limit = "a".repeat(MAX_CONTENT_CHARS);
        assert!(check_content(&at_limit).is_ok());
    }

    #[test]
    fn check_display_name_is_required() {
        assert_eq!(check_display_name(" yuki "), Ok("yuki".to_string()));
        assert!(check_display_name("  ").is_err());
    }

    #[test]
    fn check_optional_email_requires_at_sign() {
        assert_eq!(check_optional_email(""), Ok(None));
        assert_eq!(
            check_optional_email("me@example.com"),
            Ok(Some("me@example.com".to_string()))
        );
        assert!(check_optional_email("not-an-address").is_err());
    }
}
