//! Field-level validation helpers used by [`crate::record::Record::validate`].

use crate::ValidationError;

/// Fail with [`ValidationError::Required`] if `value` is blank.
pub fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    Err(ValidationError::Required(field))
  } else {
    Ok(())
  }
}

/// Accept a phone number with 10 or 11 digits once formatting characters
/// (spaces, parentheses, dashes, dots, a leading `+`) are stripped.
pub fn phone(value: &str) -> Result<(), ValidationError> {
  let malformed = || ValidationError::Phone(value.to_owned());

  let mut digits = 0usize;
  for c in value.trim().trim_start_matches('+').chars() {
    match c {
      '0'..='9' => digits += 1,
      ' ' | '(' | ')' | '-' | '.' => {}
      _ => return Err(malformed()),
    }
  }

  if (10..=11).contains(&digits) { Ok(()) } else { Err(malformed()) }
}

/// Minimal sanity check for a login email.
pub fn email(value: &str) -> Result<(), ValidationError> {
  let value = value.trim();
  required("email", value)?;
  match value.split_once('@') {
    Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
    _ => Err(ValidationError::Email(value.to_owned())),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn phone_accepts_formatted_numbers() {
    assert!(phone("(11) 98765-4321").is_ok());
    assert!(phone("11 3456-7890").is_ok());
    assert!(phone("+5511987654321").is_err(), "13 digits");
  }

  #[test]
  fn phone_rejects_letters_and_short_numbers() {
    assert_eq!(phone("call me"), Err(ValidationError::Phone("call me".into())));
    assert!(phone("12345").is_err());
  }

  #[test]
  fn email_needs_both_halves() {
    assert!(email("a@b").is_ok());
    assert!(email("@b").is_err());
    assert!(email("ab").is_err());
    assert_eq!(email("  "), Err(ValidationError::Required("email")));
  }
}
