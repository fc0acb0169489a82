use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::error::{AppError, Result};

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// 把 `user-profile` / `user_profile` 这样的名称段转成 StudlyCase 类名
pub fn to_studly(segment: &str) -> Result<String> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Err(AppError::InvalidInput(
            "Name segment cannot be empty".to_string(),
        ));
    }

    let mut studly = String::with_capacity(segment.len());
    let mut upper_next = true;
    for c in segment.chars() {
        if c == '-' || c == '_' {
            upper_next = true;
            continue;
        }
        if upper_next {
            studly.extend(c.to_uppercase());
            upper_next = false;
        } else {
            studly.push(c);
        }
    }

    if !IDENTIFIER_RE.is_match(&studly) {
        return Err(AppError::InvalidInput(format!(
            "Invalid name segment: {}",
            segment
        )));
    }

    Ok(studly)
}

/// 拆分 `admin/UserValidator` 形式的名称为目录段与类名段（均为 StudlyCase）
pub fn split_validator_name(name: &str) -> Result<(Vec<String>, String)> {
    let normalized = name.replace('\\', "/");
    let mut segments: Vec<&str> = normalized
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if segments.is_empty() {
        return Err(AppError::InvalidInput(
            "Validator name cannot be empty".to_string(),
        ));
    }

    let class_segment = segments.pop().expect("non-empty");
    let class = to_studly(class_segment)?;
    let dirs = segments
        .into_iter()
        .map(to_studly)
        .collect::<Result<Vec<_>>>()?;

    Ok((dirs, class))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_studly() {
        assert_eq!(to_studly("user_validator").unwrap(), "UserValidator");
        assert_eq!(to_studly("user-profile").unwrap(), "UserProfile");
        assert_eq!(to_studly("UserValidator").unwrap(), "UserValidator");
    }

    #[test]
    fn test_to_studly_rejects_invalid_segment() {
        assert!(to_studly("").is_err());
        assert!(to_studly("123abc").is_err());
        assert!(to_studly("user.validator").is_err());
    }

    #[test]
    fn test_split_validator_name() {
        let (dirs, class) = split_validator_name("admin/user_validator").unwrap();
        assert_eq!(dirs, vec!["Admin".to_string()]);
        assert_eq!(class, "UserValidator");

        let (dirs, class) = split_validator_name("UserValidator").unwrap();
        assert!(dirs.is_empty());
        assert_eq!(class, "UserValidator");
    }

    #[test]
    fn test_split_validator_name_empty() {
        assert!(split_validator_name("").is_err());
        assert!(split_validator_name("//").is_err());
    }
}
