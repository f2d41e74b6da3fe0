//! Field validation for everything that enters the system.
//!
//! These checks are the sole authority on input validity. Clients may run similar checks for convenience, but the
//! engine never assumes they did. All validation happens before any store mutation.
use ipay_common::Amount;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Symbols that satisfy the "special character" requirement for passwords.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*()_+={}[]:;\"'<>,.?/\\|`~-";
pub const MIN_PASSWORD_LENGTH: usize = 8;

static FULL_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z\s'-]{2,}$").expect("full name regex"));
static ID_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{13}$").expect("id number regex"));
static ACCOUNT_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{7,12}$").expect("account number regex"));
static SWIFT_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[A-Z0-9]{8}(?:[A-Z0-9]{3})?$").expect("swift code regex"));
static CURRENCY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("currency regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required.")]
    MissingField(&'static str),
    #[error("Full name must be at least 2 characters and contain only letters, spaces, hyphens or apostrophes.")]
    InvalidFullName,
    #[error("ID number must be exactly 13 digits.")]
    InvalidIdNumber,
    #[error("Account number must be 7-12 digits.")]
    InvalidAccountNumber,
    #[error(
        "Password must be at least 8 characters long and contain an uppercase letter, a lowercase letter, a number \
         and a special character."
    )]
    WeakPassword,
    #[error("Amount must be a positive number with up to 2 decimal places.")]
    InvalidAmount,
    #[error("Currency must be a 3-letter uppercase code (e.g. USD, EUR).")]
    InvalidCurrency,
    #[error("Payee account number must be 7-12 digits.")]
    InvalidPayeeAccount,
    #[error("SWIFT code must be 8 or 11 alphanumeric characters.")]
    InvalidSwiftCode,
    #[error("At least one transaction id is required.")]
    EmptySelection,
    #[error("At most {0} transactions can be submitted at once.")]
    BatchTooLarge(usize),
    #[error("{0} is not a status that can be requested.")]
    UnsupportedStatus(String),
}

pub fn validate_full_name(name: &str) -> Result<(), ValidationError> {
    FULL_NAME.is_match(name).then_some(()).ok_or(ValidationError::InvalidFullName)
}

pub fn validate_id_number(id_number: &str) -> Result<(), ValidationError> {
    ID_NUMBER.is_match(id_number).then_some(()).ok_or(ValidationError::InvalidIdNumber)
}

pub fn validate_account_number(account_number: &str) -> Result<(), ValidationError> {
    ACCOUNT_NUMBER.is_match(account_number).then_some(()).ok_or(ValidationError::InvalidAccountNumber)
}

pub fn validate_payee_account(account_number: &str) -> Result<(), ValidationError> {
    ACCOUNT_NUMBER.is_match(account_number).then_some(()).ok_or(ValidationError::InvalidPayeeAccount)
}

pub fn validate_swift_code(swift_code: &str) -> Result<(), ValidationError> {
    SWIFT_CODE.is_match(swift_code).then_some(()).ok_or(ValidationError::InvalidSwiftCode)
}

pub fn validate_currency(currency: &str) -> Result<(), ValidationError> {
    CURRENCY.is_match(currency).then_some(()).ok_or(ValidationError::InvalidCurrency)
}

/// Parses and validates a payment amount: a positive decimal with at most two fractional digits.
pub fn parse_amount(amount: &str) -> Result<Amount, ValidationError> {
    amount.parse::<Amount>().ok().filter(Amount::is_positive).ok_or(ValidationError::InvalidAmount)
}

/// Password strength rules. Length is measured in UTF-16 code units and line terminators are not allowed, which
/// matches how browser-side checks measure the same rule.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let has_line_break = password.chars().any(|c| matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}'));
    let long_enough = password.encode_utf16().count() >= MIN_PASSWORD_LENGTH;
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));
    if !has_line_break && long_enough && has_lower && has_upper && has_digit && has_symbol {
        Ok(())
    } else {
        Err(ValidationError::WeakPassword)
    }
}

pub fn require_non_blank(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}
