//! Input validation for registration operations.

use crate::error::{LedgerError, Result};
use crate::storage::{NewBook, NewMember};

/// Maximum bytes for any free-text field.
pub const MAX_FIELD_BYTES: usize = 1024;

/// A `NewBook` after validation, with text fields trimmed.
#[derive(Debug)]
pub struct ValidBook {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub copies: u32,
}

/// A `NewMember` after validation. The email is kept byte-for-byte.
#[derive(Debug)]
pub struct ValidMember {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

pub fn validate_book(book: NewBook) -> Result<ValidBook> {
    if book.copies == 0 {
        return Err(LedgerError::invalid("copies must be greater than zero"));
    }

    Ok(ValidBook {
        title: required("title", &book.title)?,
        author: required("author", &book.author)?,
        isbn: optional("isbn", book.isbn.as_deref())?,
        copies: book.copies,
    })
}

pub fn validate_member(member: NewMember) -> Result<ValidMember> {
    let name = required("name", &member.name)?;
    validate_email(&member.email)?;
    let phone = optional("phone", member.phone.as_deref())?;

    Ok(ValidMember {
        name,
        email: member.email,
        phone,
    })
}

/// Check the basic shape of an email address.
///
/// Matching is exact and case-sensitive, so the address is rejected rather
/// than rewritten when it carries whitespace.
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(LedgerError::invalid("email must not be empty"));
    }
    if email.len() > MAX_FIELD_BYTES {
        return Err(LedgerError::invalid(format!(
            "email too long (max {} bytes)",
            MAX_FIELD_BYTES
        )));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(LedgerError::invalid("email must not contain whitespace"));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(LedgerError::invalid(format!("malformed email: {}", email))),
    }
}

fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::invalid(format!("{} must not be empty", field)));
    }
    check_length(field, trimmed)?;
    Ok(trimmed.to_string())
}

fn optional(field: &str, value: Option<&str>) -> Result<Option<String>> {
    match value.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => {
            check_length(field, trimmed)?;
            Ok(Some(trimmed.to_string()))
        }
        _ => Ok(None),
    }
}

fn check_length(field: &str, value: &str) -> Result<()> {
    if value.len() > MAX_FIELD_BYTES {
        return Err(LedgerError::invalid(format!(
            "{} too long (max {} bytes)",
            field, MAX_FIELD_BYTES
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_fields_are_trimmed_and_blank_isbn_dropped() {
        let book = validate_book(NewBook::new("  Dune ", "Herbert", 2).with_isbn("   ")).unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.isbn, None);
    }

    #[test]
    fn test_zero_copies_rejected() {
        let err = validate_book(NewBook::new("Dune", "Herbert", 0)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
    }

    #[test]
    fn test_blank_author_rejected() {
        assert!(validate_book(NewBook::new("Dune", " \t", 1)).is_err());
    }

    #[test]
    fn test_email_shapes() {
        assert!(validate_email("ann@x.com").is_ok());
        assert!(validate_email("Ann@X.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("ann.x.com").is_err());
        assert!(validate_email("@x.com").is_err());
        assert!(validate_email("ann@").is_err());
        assert!(validate_email("ann@x@y").is_err());
        assert!(validate_email(" ann@x.com").is_err());
    }

    #[test]
    fn test_member_email_kept_verbatim() {
        let member = validate_member(NewMember::new(" Ann ", "Ann@X.com").with_phone("")).unwrap();
        assert_eq!(member.name, "Ann");
        assert_eq!(member.email, "Ann@X.com");
        assert_eq!(member.phone, None);
    }
}
