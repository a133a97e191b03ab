//! Form field validation for the signup, checkout and account forms.
//!
//! Every error displays as the Portuguese message written into the form's
//! error node.

use crate::cpf::{digits_only, validate_cpf};
use chrono::{Datelike, Months, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_AGE_YEARS: u32 = 18;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    // DDD + landline (8 digits starting 2-5) or mobile (9 + 8 digits)
    static ref PHONE_REGEX: Regex =
        Regex::new(r"^[1-9]{2}(?:9[0-9]{8}|[2-5][0-9]{7})$").unwrap();
    static ref CEP_REGEX: Regex = Regex::new(r"^[0-9]{5}-?[0-9]{3}$").unwrap();
    static ref DATE_REGEX: Regex = Regex::new(r"^([0-9]{2})/([0-9]{2})/([0-9]{4})$").unwrap();
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Preencha o campo {0}.")]
    Required(&'static str),

    #[error("Informe um e-mail válido.")]
    Email,

    #[error("Informe um telefone válido com DDD.")]
    Phone,

    #[error("Informe um CEP válido.")]
    Cep,

    #[error("Informe um CPF válido.")]
    Cpf,

    #[error("Informe uma data de nascimento válida.")]
    Birthday,

    #[error("É preciso ter pelo menos 18 anos.")]
    Underage,

    #[error("A senha deve ter pelo menos 8 caracteres.")]
    Password,
}

/// Rejects blank input, naming the field in the message.
pub fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_REGEX.is_match(email.trim()) {
        Ok(())
    } else {
        Err(ValidationError::Email)
    }
}

/// Accepts any punctuation around a Brazilian number with area code and
/// returns its digits.
pub fn validate_phone(phone: &str) -> Result<String, ValidationError> {
    let digits = digits_only(phone);
    if PHONE_REGEX.is_match(&digits) {
        Ok(digits)
    } else {
        Err(ValidationError::Phone)
    }
}

/// Accepts `00000-000` or `00000000` and returns the 8 digits.
pub fn validate_cep(cep: &str) -> Result<String, ValidationError> {
    let cep = cep.trim();
    if CEP_REGEX.is_match(cep) {
        Ok(digits_only(cep))
    } else {
        Err(ValidationError::Cep)
    }
}

pub fn validate_cpf_field(cpf: &str) -> Result<String, ValidationError> {
    if validate_cpf(cpf) {
        Ok(digits_only(cpf))
    } else {
        Err(ValidationError::Cpf)
    }
}

/// Parses a `dd/mm/yyyy` birthday. The date must exist on the calendar,
/// must not be before 1900 and must be at least [`MIN_AGE_YEARS`] years
/// before `today`.
pub fn validate_birthday(birthday: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let caps = DATE_REGEX
        .captures(birthday.trim())
        .ok_or(ValidationError::Birthday)?;

    let day: u32 = caps[1].parse().map_err(|_| ValidationError::Birthday)?;
    let month: u32 = caps[2].parse().map_err(|_| ValidationError::Birthday)?;
    let year: i32 = caps[3].parse().map_err(|_| ValidationError::Birthday)?;

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(ValidationError::Birthday)?;
    if date > today || date.year() < 1900 {
        return Err(ValidationError::Birthday);
    }
    let cutoff = today
        .checked_sub_months(Months::new(12 * MIN_AGE_YEARS))
        .ok_or(ValidationError::Birthday)?;
    if date > cutoff {
        return Err(ValidationError::Underage);
    }
    Ok(date)
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ValidationError::Password)
    }
}
