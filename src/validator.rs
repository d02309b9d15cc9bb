// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Form submission validator.
//!
//! Checks run in a fixed order and stop at the first failure, so a visitor
//! always sees one message at a time:
//! name, e-mail, phone, selectors, free text, and finally Habeas Data consent.
//! Messages are the Spanish strings the website shows verbatim.

use crate::forms::{
    ContactForm, CourseRegistrationForm, DonationForm, DonationKind, PaymentMethod,
    Submission, VolunteerForm, MIN_DONATION_COP,
};
use thiserror::Error;
use tracing::debug;

/// Validation error types.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("El nombre es obligatorio")]
    MissingName,

    /// The contact form words its e-mail message differently from the other forms.
    #[error("Por favor ingrese un correo electrónico válido")]
    InvalidContactEmail,

    #[error("Correo electrónico inválido")]
    InvalidEmail,

    #[error("El teléfono es obligatorio")]
    MissingPhone,

    #[error("Por favor seleccione un tipo de consulta")]
    MissingInquiryType,

    #[error("El mensaje es obligatorio")]
    MissingMessage,

    #[error("La cédula es obligatoria")]
    MissingIdNumber,

    #[error("Seleccione un curso")]
    MissingCourse,

    #[error("Seleccione un área de interés")]
    MissingAreaOfInterest,

    #[error("Seleccione su disponibilidad")]
    MissingAvailability,

    #[error("Por favor cuéntenos su motivación")]
    MissingMotivation,

    #[error("Seleccione el tipo de donación")]
    MissingDonationKind,

    #[error("El monto mínimo de donación es $10.000 COP")]
    AmountBelowMinimum,

    #[error("Seleccione un método de pago")]
    MissingPaymentMethod,

    #[error("Debe aceptar la política de tratamiento de datos")]
    ConsentRequired,
}

impl ValidationError {
    /// Stable machine-readable code, returned next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingName => "MISSING_NAME",
            Self::InvalidContactEmail | Self::InvalidEmail => "INVALID_EMAIL",
            Self::MissingPhone => "MISSING_PHONE",
            Self::MissingInquiryType => "MISSING_INQUIRY_TYPE",
            Self::MissingMessage => "MISSING_MESSAGE",
            Self::MissingIdNumber => "MISSING_ID_NUMBER",
            Self::MissingCourse => "MISSING_COURSE",
            Self::MissingAreaOfInterest => "MISSING_AREA_OF_INTEREST",
            Self::MissingAvailability => "MISSING_AVAILABILITY",
            Self::MissingMotivation => "MISSING_MOTIVATION",
            Self::MissingDonationKind => "MISSING_DONATION_KIND",
            Self::AmountBelowMinimum => "AMOUNT_BELOW_MINIMUM",
            Self::MissingPaymentMethod => "MISSING_PAYMENT_METHOD",
            Self::ConsentRequired => "CONSENT_REQUIRED",
        }
    }
}

/// Result of validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Request is valid
    Valid,
    /// Request is invalid
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(e) => Some(e),
        }
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(e) => Err(e),
        }
    }
}

impl From<Result<(), ValidationError>> for ValidationResult {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => ValidationResult::Valid,
            Err(e) => {
                debug!(code = e.code(), "Form validation failed");
                ValidationResult::Invalid(e)
            }
        }
    }
}

/// Validator for the website's forms.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormValidator;

impl FormValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a contact message.
    pub fn validate_contact(&self, form: &ContactForm) -> ValidationResult {
        check_contact(form).into()
    }

    /// Validate a volunteer sign-up.
    pub fn validate_volunteer(&self, form: &VolunteerForm) -> ValidationResult {
        check_volunteer(form).into()
    }

    /// Validate a course registration.
    pub fn validate_course(&self, form: &CourseRegistrationForm) -> ValidationResult {
        check_course(form).into()
    }

    /// Validate a donation pledge.
    pub fn validate_donation(&self, form: &DonationForm) -> ValidationResult {
        check_donation(form).into()
    }

    /// Validate any multi-form submission.
    pub fn validate(&self, submission: &Submission) -> ValidationResult {
        match submission {
            Submission::Volunteer(form) => self.validate_volunteer(form),
            Submission::CourseRegistration(form) => self.validate_course(form),
            Submission::Donation(form) => self.validate_donation(form),
        }
    }
}

/// Check that an e-mail address has the `local@domain.tld` shape.
///
/// One `@`, no whitespace anywhere, and a dot in the domain with text on both
/// sides of it.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .filter(|(_, c)| *c == '.')
        .any(|(i, _)| i > 0 && i + 1 < domain.len())
}

fn check_contact(form: &ContactForm) -> Result<(), ValidationError> {
    require_text(&form.nombre, ValidationError::MissingName)?;
    require_email(&form.email, ValidationError::InvalidContactEmail)?;
    require_text(&form.telefono, ValidationError::MissingPhone)?;
    require_selection(&form.tipo_consulta, ValidationError::MissingInquiryType)?;
    require_text(&form.mensaje, ValidationError::MissingMessage)?;
    require_consent(form.habeas_data)
}

fn check_volunteer(form: &VolunteerForm) -> Result<(), ValidationError> {
    require_text(&form.nombre, ValidationError::MissingName)?;
    require_email(&form.email, ValidationError::InvalidEmail)?;
    require_text(&form.telefono, ValidationError::MissingPhone)?;
    require_selection(&form.area_interes, ValidationError::MissingAreaOfInterest)?;
    require_selection(&form.disponibilidad, ValidationError::MissingAvailability)?;
    require_text(&form.motivacion, ValidationError::MissingMotivation)?;
    require_consent(form.habeas_data)
}

fn check_course(form: &CourseRegistrationForm) -> Result<(), ValidationError> {
    require_text(&form.nombre, ValidationError::MissingName)?;
    require_email(&form.email, ValidationError::InvalidEmail)?;
    require_text(&form.telefono, ValidationError::MissingPhone)?;
    require_text(&form.cedula, ValidationError::MissingIdNumber)?;
    require_selection(&form.curso, ValidationError::MissingCourse)?;
    require_consent(form.habeas_data)
}

fn check_donation(form: &DonationForm) -> Result<(), ValidationError> {
    require_text(&form.nombre, ValidationError::MissingName)?;
    require_email(&form.email, ValidationError::InvalidEmail)?;
    require_text(&form.telefono, ValidationError::MissingPhone)?;
    form.tipo_donacion
        .as_deref()
        .and_then(DonationKind::parse)
        .ok_or(ValidationError::MissingDonationKind)?;
    match form.monto {
        Some(amount) if amount >= MIN_DONATION_COP => {}
        _ => return Err(ValidationError::AmountBelowMinimum),
    }
    form.metodo_pago
        .as_deref()
        .and_then(PaymentMethod::parse)
        .ok_or(ValidationError::MissingPaymentMethod)?;
    require_consent(form.habeas_data)
}

fn require_text(value: &Option<String>, error: ValidationError) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(error),
    }
}

/// Select inputs only need a non-empty value.
fn require_selection(value: &Option<String>, error: ValidationError) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_empty() => Ok(()),
        _ => Err(error),
    }
}

fn require_email(value: &Option<String>, error: ValidationError) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() && is_valid_email(v) => Ok(()),
        _ => Err(error),
    }
}

fn require_consent(habeas_data: bool) -> Result<(), ValidationError> {
    if habeas_data {
        Ok(())
    } else {
        Err(ValidationError::ConsentRequired)
    }
}
