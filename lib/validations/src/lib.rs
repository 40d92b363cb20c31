//! # Input Validation Module
//!
//! Validation for the job form and the login dialog. All checks
//! run before submission; the converter itself never validates,
//! and messages returned here are surfaced to the user verbatim.

use std::sync::OnceLock;

use anyhow::{Context, anyhow};
use regex::Regex;

/// Options to validate input strings to have certain properties.
/// This ensures only valid data can enter the system.
///
/// ## Usage
///
/// ```
/// use validations::{StringValidator, StringValidatorMatches};
///
/// fn check(input: &str) -> anyhow::Result<()> {
///   StringValidator::default()
///     .min_length(1)
///     .max_length(128)
///     .matches(StringValidatorMatches::JobName)
///     .validate(input)
/// }
///
/// check("my-job_1.0").unwrap();
/// check("-bad").unwrap_err();
/// ```
#[derive(Default)]
pub struct StringValidator {
  /// Specify the minimum length of string.
  /// Setting `0` will effectively skip this validation.
  pub min_length: usize,
  /// Specify max length of string, or None to allow arbitrary length.
  pub max_length: Option<usize>,
  /// Skip the control character check.
  /// Most values should not contain these by default.
  pub skip_control_check: bool,
  /// Specify a pattern to validate the string contents.
  pub matches: Option<StringValidatorMatches>,
}

impl StringValidator {
  /// Returns Ok if input passes validations, otherwise includes
  /// error with failure reason.
  pub fn validate(&self, input: &str) -> anyhow::Result<()> {
    let len = input.len();

    if len < self.min_length {
      return Err(anyhow!(
        "Input too short. Must be at least {} characters.",
        self.min_length
      ));
    }

    if let Some(max_length) = self.max_length
      && len > max_length
    {
      return Err(anyhow!(
        "Input too long. Must be at most {max_length} characters."
      ));
    }

    if !self.skip_control_check {
      validate_no_control_chars(input)?;
    }

    if let Some(matches) = &self.matches {
      matches.validate(input)?
    }

    Ok(())
  }

  pub fn min_length(mut self, min_length: usize) -> StringValidator {
    self.min_length = min_length;
    self
  }

  pub fn max_length(
    mut self,
    max_length: impl Into<Option<usize>>,
  ) -> StringValidator {
    self.max_length = max_length.into();
    self
  }

  pub fn skip_control_check(mut self) -> StringValidator {
    self.skip_control_check = true;
    self
  }

  pub fn matches(
    mut self,
    matches: impl Into<Option<StringValidatorMatches>>,
  ) -> StringValidator {
    self.matches = matches.into();
    self
  }
}

pub enum StringValidatorMatches {
  /// - starts with a letter or digit
  /// - continues with letters, digits, dots,
  ///   underscores, hyphens
  JobName,
  /// - http or https URL.
  HttpUrl,
}

impl StringValidatorMatches {
  /// Returns Ok if input passes validations, otherwise includes
  /// error with failure reason.
  fn validate(&self, input: &str) -> anyhow::Result<()> {
    let validate = || match self {
      StringValidatorMatches::JobName => {
        if job_name_regex().is_match(input) {
          Ok(())
        } else {
          Err(anyhow!(
            "Must start with a letter or digit, followed by letters, digits, dots, underscores, or hyphens"
          ))
        }
      }

      StringValidatorMatches::HttpUrl => {
        if !input.starts_with("http://")
          && !input.starts_with("https://")
        {
          return Err(anyhow!(
            "Input must start with http:// or https://"
          ));
        }
        url::Url::parse(input)
          .context("Failed to parse input as URL")
          .map(|_| ())
      }
    };
    validate().context("Invalid characters in input")
  }
}

fn job_name_regex() -> &'static Regex {
  static JOB_NAME_REGEX: OnceLock<Regex> = OnceLock::new();
  JOB_NAME_REGEX.get_or_init(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9._-]*$")
      .expect("Failed to initialize job name regex")
  })
}

fn validate_no_control_chars(input: &str) -> anyhow::Result<()> {
  for (index, char) in input.chars().enumerate() {
    if char.is_control() {
      return Err(anyhow!(
        "Control character at index {index}. Input: \"{input}\""
      ));
    }
  }
  Ok(())
}

/// True iff the name starts with a letter or digit and continues
/// with letters, digits, `.`, `_`, `-`.
pub fn is_valid_job_name(name: &str) -> bool {
  job_name_regex().is_match(name)
}

/// True iff the trimmed image reference is non empty.
pub fn is_valid_image_name(image: &str) -> bool {
  !image.trim().is_empty()
}

pub fn validate_image_name(image: &str) -> anyhow::Result<()> {
  if is_valid_image_name(image) {
    Ok(())
  } else {
    Err(anyhow!("Container image must not be empty"))
  }
}

/// Nothing to check while the private registry toggle is off.
/// With it on, both credentials must be present.
pub fn validate_registry_auth(
  use_private_registry: bool,
  username: Option<&str>,
  password: Option<&str>,
) -> anyhow::Result<()> {
  if !use_private_registry {
    return Ok(());
  }
  if username.map(str::trim).unwrap_or_default().is_empty() {
    return Err(anyhow!(
      "Private registry is enabled but the username is missing"
    ));
  }
  if password.map(str::trim).unwrap_or_default().is_empty() {
    return Err(anyhow!(
      "Private registry is enabled but the password is missing"
    ));
  }
  Ok(())
}

/// Static host ports must fit the valid port range.
pub fn validate_port_value(value: u64) -> anyhow::Result<()> {
  if (1..=65_535).contains(&value) {
    Ok(())
  } else {
    Err(anyhow!("Port must be between 1 and 65535, got {value}"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn job_names() {
    assert!(is_valid_job_name("my-job_1.0"));
    assert!(is_valid_job_name("0job"));
    assert!(!is_valid_job_name("-bad"));
    assert!(!is_valid_job_name(".bad"));
    assert!(!is_valid_job_name(""));
    assert!(!is_valid_job_name("has space"));
  }

  #[test]
  fn job_name_through_string_validator() {
    let validator = StringValidator::default()
      .min_length(1)
      .max_length(128)
      .matches(StringValidatorMatches::JobName);
    assert!(validator.validate("web-1").is_ok());
    assert!(validator.validate("-web").is_err());
    assert!(validator.validate("").is_err());
  }

  #[test]
  fn image_names() {
    assert!(is_valid_image_name("nginx:1.27"));
    assert!(!is_valid_image_name(""));
    assert!(!is_valid_image_name("   "));
  }

  #[test]
  fn registry_auth() {
    assert!(validate_registry_auth(false, None, None).is_ok());
    assert!(
      validate_registry_auth(true, Some("u"), Some("p")).is_ok()
    );
    assert!(
      validate_registry_auth(true, None, Some("p")).is_err()
    );
    assert!(
      validate_registry_auth(true, Some("u"), Some("  "))
        .is_err()
    );
  }

  #[test]
  fn ports() {
    assert!(validate_port_value(8080).is_ok());
    assert!(validate_port_value(0).is_err());
    assert!(validate_port_value(70_000).is_err());
  }

  #[test]
  fn http_urls() {
    let validator = StringValidator::default()
      .matches(StringValidatorMatches::HttpUrl);
    assert!(validator.validate("http://10.0.0.1:4646").is_ok());
    assert!(validator.validate("ftp://10.0.0.1").is_err());
  }

  #[test]
  fn control_chars_rejected() {
    let validator = StringValidator::default();
    assert!(validator.validate("ok").is_ok());
    assert!(validator.validate("bad\u{0007}").is_err());
  }
}
