//! Account page: the customer's personal data, shown and edited in place.

use crate::api::{ApiError, Client, Transport};
use crate::cpf::format_cpf;
use crate::models::Profile;
use crate::store::{FieldId, Store, StoreBuilder, StoreError};
use crate::validation::{
    ValidationError, require, validate_birthday, validate_cpf_field, validate_email,
    validate_phone,
};
use chrono::NaiveDate;
use log::{info, warn};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PersonalField {
    Name,
    LastName,
    Email,
    Phone,
    Cpf,
    Birthday,
    FullName,
}

impl FieldId for PersonalField {
    const ALL: &'static [Self] = &[
        PersonalField::Name,
        PersonalField::LastName,
        PersonalField::Email,
        PersonalField::Phone,
        PersonalField::Cpf,
        PersonalField::Birthday,
        PersonalField::FullName,
    ];
}

const STORED: [PersonalField; 6] = [
    PersonalField::Name,
    PersonalField::LastName,
    PersonalField::Email,
    PersonalField::Phone,
    PersonalField::Cpf,
    PersonalField::Birthday,
];

pub trait PersonalView {
    /// Writes the text of one field's display node.
    fn display(&self, field: PersonalField, text: &str);
    fn show_error(&self, message: &str);
    fn show_saved(&self);
    fn redirect_to_login(&self);
}

/// Checks a submitted form and returns it normalized: trimmed names and
/// email, digits-only phone and CPF. Fails on the first invalid field.
pub fn validate_profile(form: &Profile, today: NaiveDate) -> Result<Profile, ValidationError> {
    require(&form.name, "nome")?;
    require(&form.last_name, "sobrenome")?;
    require(&form.email, "e-mail")?;
    validate_email(&form.email)?;
    let phone = validate_phone(&form.phone)?;
    let cpf = validate_cpf_field(&form.cpf)?;
    validate_birthday(&form.birthday, today)?;

    Ok(Profile {
        name: form.name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone,
        cpf,
        birthday: form.birthday.trim().to_string(),
    })
}

fn full_name(store: &Store<PersonalField, String>) -> String {
    let name = store.peek(PersonalField::Name).map_or("", String::as_str);
    let last = store.peek(PersonalField::LastName).map_or("", String::as_str);
    format!("{} {}", name.trim(), last.trim()).trim().to_string()
}

pub struct PersonalDataWidget {
    store: Store<PersonalField, String>,
    view: Rc<dyn PersonalView>,
}

impl PersonalDataWidget {
    pub fn new(view: Rc<dyn PersonalView>) -> Result<Self, StoreError> {
        let mut builder = StoreBuilder::new().derived(PersonalField::FullName, full_name);

        for field in STORED {
            let field_view = view.clone();
            builder = builder
                .stored(field, String::new())
                .effect(field, move |store, value| {
                    match field {
                        PersonalField::Cpf => {
                            let shown = format_cpf(value).unwrap_or_else(|| value.clone());
                            field_view.display(field, &shown);
                        }
                        PersonalField::Name | PersonalField::LastName => {
                            field_view.display(field, value);
                            field_view.display(
                                PersonalField::FullName,
                                &store.get(PersonalField::FullName),
                            );
                        }
                        _ => field_view.display(field, value),
                    }
                    Ok(())
                });
        }

        Ok(PersonalDataWidget {
            store: builder.build()?,
            view,
        })
    }

    pub fn store(&self) -> &Store<PersonalField, String> {
        &self.store
    }

    pub fn get(&self, field: PersonalField) -> String {
        self.store.get(field)
    }

    pub fn full_name(&self) -> String {
        self.store.get(PersonalField::FullName)
    }

    /// Current values as a profile.
    pub fn profile(&self) -> Profile {
        Profile {
            name: self.get(PersonalField::Name),
            last_name: self.get(PersonalField::LastName),
            email: self.get(PersonalField::Email),
            phone: self.get(PersonalField::Phone),
            cpf: self.get(PersonalField::Cpf),
            birthday: self.get(PersonalField::Birthday),
        }
    }

    /// Writes every field of `profile`, refreshing each display node.
    pub fn fill(&mut self, profile: &Profile) -> Result<(), StoreError> {
        self.store.set(PersonalField::Name, profile.name.clone())?;
        self.store
            .set(PersonalField::LastName, profile.last_name.clone())?;
        self.store.set(PersonalField::Email, profile.email.clone())?;
        self.store.set(PersonalField::Phone, profile.phone.clone())?;
        self.store.set(PersonalField::Cpf, profile.cpf.clone())?;
        self.store
            .set(PersonalField::Birthday, profile.birthday.clone())
    }

    pub async fn load<T: Transport>(&mut self, client: &Client<T>) -> Result<bool, StoreError> {
        let result = client.get_profile().await;
        self.apply(result)
    }

    /// Validates and submits the edited form. Nothing is sent when a field
    /// is invalid; its message is shown instead.
    pub async fn save<T: Transport>(
        &mut self,
        client: &Client<T>,
        form: &Profile,
        today: NaiveDate,
    ) -> Result<bool, StoreError> {
        let profile = match validate_profile(form, today) {
            Ok(profile) => profile,
            Err(e) => {
                self.view.show_error(&e.to_string());
                return Ok(false);
            }
        };

        let result = client.update_profile(&profile).await;
        let saved = self.apply(result)?;
        if saved {
            info!("personal data saved");
            self.view.show_saved();
        }
        Ok(saved)
    }

    fn apply(&mut self, result: Result<Profile, ApiError>) -> Result<bool, StoreError> {
        match result {
            Ok(profile) => {
                self.fill(&profile)?;
                Ok(true)
            }
            Err(ApiError::Unauthorized) => {
                self.view.redirect_to_login();
                Ok(false)
            }
            Err(e) => {
                warn!("personal data request failed: {}", e);
                self.view.show_error(&e.to_string());
                Ok(false)
            }
        }
    }
}
