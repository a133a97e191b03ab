use chrono::NaiveDate;
use talho::cpf::{digits_only, format_cpf, validate_cpf};
use talho::validation::{
    ValidationError, require, validate_birthday, validate_cep, validate_cpf_field,
    validate_email, validate_password, validate_phone,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 14).unwrap()
}

#[test]
fn cpf_check_digits() {
    assert!(validate_cpf("11144477735"));
    assert!(validate_cpf("111.444.777-35"));
    assert!(validate_cpf("529.982.247-25"));

    // wrong check digit
    assert!(!validate_cpf("11144477736"));
    assert!(!validate_cpf("11144477745"));
    // repeated digits pass the checksum but are not real numbers
    assert!(!validate_cpf("11111111111"));
    assert!(!validate_cpf("000.000.000-00"));
    // length
    assert!(!validate_cpf("1114447773"));
    assert!(!validate_cpf("111444777350"));
    assert!(!validate_cpf(""));
}

#[test]
fn cpf_formatting() {
    assert_eq!(format_cpf("11144477735").as_deref(), Some("111.444.777-35"));
    assert_eq!(format_cpf("11144477736"), None);
    assert_eq!(digits_only(" 111.444.777-35 "), "11144477735");
}

#[test]
fn required_fields() {
    assert_eq!(require("  ", "nome"), Err(ValidationError::Required("nome")));
    assert!(require("Ana", "nome").is_ok());
    assert_eq!(
        ValidationError::Required("nome").to_string(),
        "Preencha o campo nome."
    );
}

#[test]
fn emails() {
    assert!(validate_email("ana@talho.com.br").is_ok());
    assert!(validate_email("  ana@talho.com ").is_ok());
    assert_eq!(validate_email("ana@talho"), Err(ValidationError::Email));
    assert_eq!(validate_email("ana talho@x.com"), Err(ValidationError::Email));
}

#[test]
fn phones_keep_only_digits() {
    assert_eq!(validate_phone("(11) 98765-4321").unwrap(), "11987654321");
    assert_eq!(validate_phone("11 3456-7890").unwrap(), "1134567890");
    assert_eq!(validate_phone("98765-4321"), Err(ValidationError::Phone));
    assert_eq!(validate_phone("(01) 98765-4321"), Err(ValidationError::Phone));
}

#[test]
fn ceps() {
    assert_eq!(validate_cep("01310-100").unwrap(), "01310100");
    assert_eq!(validate_cep("01310100").unwrap(), "01310100");
    assert_eq!(validate_cep("1310-100"), Err(ValidationError::Cep));
    assert_eq!(validate_cep("01.310-100"), Err(ValidationError::Cep));
}

#[test]
fn cpf_field_returns_digits() {
    assert_eq!(validate_cpf_field("111.444.777-35").unwrap(), "11144477735");
    assert_eq!(validate_cpf_field("123"), Err(ValidationError::Cpf));
    assert_eq!(ValidationError::Cpf.to_string(), "Informe um CPF válido.");
}

#[test]
fn birthdays() {
    assert_eq!(
        validate_birthday("15/05/1990", today()).unwrap(),
        NaiveDate::from_ymd_opt(1990, 5, 15).unwrap()
    );
    // eighteenth birthday is today
    assert!(validate_birthday("14/10/2006", today()).is_ok());
    assert_eq!(
        validate_birthday("15/10/2006", today()),
        Err(ValidationError::Underage)
    );
    assert_eq!(
        validate_birthday("15/10/2024", today()),
        Err(ValidationError::Birthday)
    );
    assert_eq!(
        validate_birthday("31/02/2000", today()),
        Err(ValidationError::Birthday)
    );
    assert_eq!(
        validate_birthday("01/01/1899", today()),
        Err(ValidationError::Birthday)
    );
    assert_eq!(
        validate_birthday("1990-05-15", today()),
        Err(ValidationError::Birthday)
    );
}

#[test]
fn passwords() {
    assert!(validate_password("12345678").is_ok());
    assert!(validate_password("açougue!").is_ok());
    assert_eq!(validate_password("1234567"), Err(ValidationError::Password));
}
