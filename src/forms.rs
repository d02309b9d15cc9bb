// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Form payloads accepted by the website's endpoints.
//!
//! Required text fields are `Option<String>` so that an absent field reaches
//! the validator and produces its own message instead of a parse failure.
//! Field names follow the JSON the site's forms already send.

use crate::sanitizer::Sanitizer;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Minimum accepted donation, in Colombian pesos.
pub const MIN_DONATION_COP: u64 = 10_000;

/// Contact form (`/api/contact`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub tipo_consulta: Option<String>,
    pub mensaje: Option<String>,
    #[serde(default, deserialize_with = "consent_flag")]
    pub habeas_data: bool,
}

/// Volunteer sign-up (`type: "voluntario"`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerForm {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub edad: Option<String>,
    pub ocupacion: Option<String>,
    pub parroquia: Option<String>,
    pub area_interes: Option<String>,
    pub disponibilidad: Option<String>,
    pub experiencia: Option<String>,
    pub motivacion: Option<String>,
    #[serde(default, deserialize_with = "consent_flag")]
    pub habeas_data: bool,
}

/// Course registration (`type: "inscripcion-curso"`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRegistrationForm {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub cedula: Option<String>,
    pub curso: Option<String>,
    pub conocimiento_previo: Option<String>,
    #[serde(default, deserialize_with = "consent_flag")]
    pub habeas_data: bool,
}

/// Donation pledge (`type: "donacion"`).
///
/// No money moves through this service; the pledge is recorded so the
/// parish office can follow up on the transfer.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationForm {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub tipo_donacion: Option<String>,
    #[serde(default, deserialize_with = "amount_from_number_or_text")]
    pub monto: Option<u64>,
    pub metodo_pago: Option<String>,
    #[serde(default, deserialize_with = "consent_flag")]
    pub habeas_data: bool,
}

/// An unchecked consent box may arrive as `false`, `null` or not at all.
fn consent_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// The amount input on the site is a text box, so accept `75000` and `"75000"` alike.
///
/// Negative or fractional amounts decode to 0 so they fail the minimum check
/// instead of the whole payload. Whole floats such as `50000.0` keep their value.
fn amount_from_number_or_text<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Whole(u64),
        Other(f64),
        Text(String),
    }

    match Option::<Amount>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Amount::Whole(n)) => Ok(Some(n)),
        Some(Amount::Other(n)) => Ok(Some(whole_or_zero(n))),
        Some(Amount::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            match text.parse::<u64>() {
                Ok(n) => Ok(Some(n)),
                Err(e) => match text.parse::<f64>() {
                    Ok(n) if n.is_finite() => Ok(Some(whole_or_zero(n))),
                    _ => Err(de::Error::custom(e)),
                },
            }
        }
    }
}

fn whole_or_zero(amount: f64) -> u64 {
    if amount >= 0.0 && amount.fract() == 0.0 && amount <= u64::MAX as f64 {
        amount as u64
    } else {
        0
    }
}

/// One-off or recurring donation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonationKind {
    OneTime,
    Monthly,
}

impl DonationKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unica" => Some(Self::OneTime),
            "mensual" => Some(Self::Monthly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    BankTransfer,
    Nequi,
    Card,
}

impl PaymentMethod {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "transferencia" => Some(Self::BankTransfer),
            "nequi" => Some(Self::Nequi),
            "tarjeta" => Some(Self::Card),
            _ => None,
        }
    }
}

/// Discriminator of the multi-form endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    Contact,
    Volunteer,
    CourseRegistration,
    Donation,
}

impl FormKind {
    /// Parse the `type` field of `/api/sheets`. Contact messages have their own endpoint.
    pub fn from_submission_type(value: &str) -> Option<Self> {
        match value {
            "voluntario" => Some(Self::Volunteer),
            "inscripcion-curso" => Some(Self::CourseRegistration),
            "donacion" => Some(Self::Donation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contact => "contacto",
            Self::Volunteer => "voluntario",
            Self::CourseRegistration => "inscripcion-curso",
            Self::Donation => "donacion",
        }
    }

    /// Spreadsheet tab the records of this form are appended to.
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Self::Contact => "Contacto",
            Self::Volunteer => "Voluntarios",
            Self::CourseRegistration => "Inscripciones",
            Self::Donation => "Donaciones",
        }
    }

    /// Message shown to the visitor once the submission is accepted.
    pub fn success_message(&self) -> &'static str {
        match self {
            Self::Contact => "Mensaje enviado correctamente",
            Self::Volunteer => "Inscripción de voluntario recibida",
            Self::CourseRegistration => "Inscripción al curso recibida",
            Self::Donation => "Intención de donación registrada",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw body of `/api/sheets`: `{ "type": ..., "data": {...} }`.
#[derive(Debug, Deserialize)]
pub struct SubmissionEnvelope {
    #[serde(rename = "type", default)]
    pub form_type: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// A multi-form submission after its `data` has been decoded for its type.
#[derive(Debug, Clone)]
pub enum Submission {
    Volunteer(VolunteerForm),
    CourseRegistration(CourseRegistrationForm),
    Donation(DonationForm),
}

impl Submission {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::Volunteer(_) => FormKind::Volunteer,
            Self::CourseRegistration(_) => FormKind::CourseRegistration,
            Self::Donation(_) => FormKind::Donation,
        }
    }

    /// Decode `data` according to `kind`.
    pub fn decode(kind: FormKind, data: Value) -> serde_json::Result<Option<Self>> {
        let submission = match kind {
            FormKind::Volunteer => Self::Volunteer(serde_json::from_value(data)?),
            FormKind::CourseRegistration => Self::CourseRegistration(serde_json::from_value(data)?),
            FormKind::Donation => Self::Donation(serde_json::from_value(data)?),
            FormKind::Contact => return Ok(None),
        };
        Ok(Some(submission))
    }

    pub fn sanitize(&self, sanitizer: &Sanitizer, submitted_at: DateTime<Utc>) -> SanitizedRecord {
        match self {
            Self::Volunteer(form) => form.sanitize(sanitizer, submitted_at),
            Self::CourseRegistration(form) => form.sanitize(sanitizer, submitted_at),
            Self::Donation(form) => form.sanitize(sanitizer, submitted_at),
        }
    }
}

/// Cleaned, ordered row ready for dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SanitizedRecord {
    #[serde(skip)]
    pub kind: FormKind,
    /// Target sheet
    pub category: &'static str,
    pub submitted_at: DateTime<Utc>,
    /// Column name to cleaned value, in sheet column order (`fecha` first)
    pub fields: Map<String, Value>,
}

impl SanitizedRecord {
    fn builder(kind: FormKind, submitted_at: DateTime<Utc>) -> RecordBuilder {
        let mut fields = Map::new();
        fields.insert(
            "fecha".to_string(),
            Value::String(submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        RecordBuilder {
            record: SanitizedRecord {
                kind,
                category: kind.sheet_name(),
                submitted_at,
                fields,
            },
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).and_then(Value::as_str)
    }

    /// Values in column order, as appended to a sheet row.
    pub fn row(&self) -> Vec<Value> {
        self.fields.values().cloned().collect()
    }
}

struct RecordBuilder {
    record: SanitizedRecord,
}

impl RecordBuilder {
    fn field(mut self, column: &str, value: String) -> Self {
        self.record
            .fields
            .insert(column.to_string(), Value::String(value));
        self
    }

    fn finish(self) -> SanitizedRecord {
        self.record
    }
}

impl ContactForm {
    pub fn sanitize(&self, s: &Sanitizer, submitted_at: DateTime<Utc>) -> SanitizedRecord {
        SanitizedRecord::builder(FormKind::Contact, submitted_at)
            .field("nombre", s.clean(self.nombre.as_deref()))
            .field("email", s.clean_email(self.email.as_deref()))
            .field("telefono", s.clean(self.telefono.as_deref()))
            .field("tipoConsulta", s.clean(self.tipo_consulta.as_deref()))
            .field("mensaje", s.clean(self.mensaje.as_deref()))
            .finish()
    }
}

impl VolunteerForm {
    pub fn sanitize(&self, s: &Sanitizer, submitted_at: DateTime<Utc>) -> SanitizedRecord {
        SanitizedRecord::builder(FormKind::Volunteer, submitted_at)
            .field("nombre", s.clean(self.nombre.as_deref()))
            .field("email", s.clean_email(self.email.as_deref()))
            .field("telefono", s.clean(self.telefono.as_deref()))
            .field("edad", s.clean(self.edad.as_deref()))
            .field("ocupacion", s.clean(self.ocupacion.as_deref()))
            .field("parroquia", s.clean(self.parroquia.as_deref()))
            .field("areaInteres", s.clean(self.area_interes.as_deref()))
            .field("disponibilidad", s.clean(self.disponibilidad.as_deref()))
            .field("experiencia", s.clean(self.experiencia.as_deref()))
            .field("motivacion", s.clean(self.motivacion.as_deref()))
            .finish()
    }
}

impl CourseRegistrationForm {
    pub fn sanitize(&self, s: &Sanitizer, submitted_at: DateTime<Utc>) -> SanitizedRecord {
        SanitizedRecord::builder(FormKind::CourseRegistration, submitted_at)
            .field("nombre", s.clean(self.nombre.as_deref()))
            .field("cedula", s.clean(self.cedula.as_deref()))
            .field("email", s.clean_email(self.email.as_deref()))
            .field("telefono", s.clean(self.telefono.as_deref()))
            .field("curso", s.clean(self.curso.as_deref()))
            .field("conocimientoPrevio", s.clean(self.conocimiento_previo.as_deref()))
            .finish()
    }
}

impl DonationForm {
    pub fn sanitize(&self, s: &Sanitizer, submitted_at: DateTime<Utc>) -> SanitizedRecord {
        let monto = self.monto.map(|m| m.to_string());
        SanitizedRecord::builder(FormKind::Donation, submitted_at)
            .field("nombre", s.clean(self.nombre.as_deref()))
            .field("email", s.clean_email(self.email.as_deref()))
            .field("telefono", s.clean(self.telefono.as_deref()))
            .field("tipoDonacion", s.clean(self.tipo_donacion.as_deref()))
            .field("monto", s.clean(monto.as_deref()))
            .field("metodoPago", s.clean(self.metodo_pago.as_deref()))
            .finish()
    }
}
