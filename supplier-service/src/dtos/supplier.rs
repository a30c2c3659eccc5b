//! Wire shapes for `/api/proveedores`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{Supplier, SupplierFields};

/// Body of create and full-update requests.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "La Razón Social es obligatoria."),
        length(max = 255, message = "La Razón Social no puede exceder los 255 caracteres.")
    )]
    pub razon_social: String,

    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "El Nombre Comercial es obligatorio."),
        length(max = 255, message = "El Nombre Comercial no puede exceder los 255 caracteres.")
    )]
    pub nombre_comercial: String,

    #[serde(default)]
    #[validate(custom(
        function = "eleven_digits",
        message = "La Identificación Tributaria (RUC) debe ser numérica y tener 11 dígitos."
    ))]
    pub ruc: String,

    #[serde(default)]
    #[validate(
        custom(function = "phone_number"),
        length(max = 50, message = "El Número Telefónico no puede exceder los 50 caracteres.")
    )]
    pub telefono: String,

    #[serde(default)]
    #[validate(
        email(message = "El formato del Correo Electrónico no es válido."),
        length(max = 255, message = "El Correo Electrónico no puede exceder los 255 caracteres.")
    )]
    pub correo_electronico: String,

    #[serde(default)]
    #[validate(
        url(message = "El formato del Sitio Web no es válido."),
        length(max = 500, message = "El Sitio Web no puede exceder los 500 caracteres.")
    )]
    pub sitio_web: String,

    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "La Dirección Física es obligatoria."),
        length(max = 500, message = "La Dirección Física no puede exceder los 500 caracteres.")
    )]
    pub direccion: String,

    #[serde(default)]
    #[validate(
        custom(function = "not_blank", message = "El País es obligatorio."),
        length(max = 100, message = "El País no puede exceder los 100 caracteres.")
    )]
    pub pais: String,

    #[serde(default)]
    #[validate(
        required(message = "La Facturación Anual en USD es obligatoria."),
        custom(
            function = "non_negative",
            message = "La Facturación Anual en USD no puede ser negativa."
        )
    )]
    pub facturacion_anual_usd: Option<Decimal>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn eleven_digits(value: &str) -> Result<(), ValidationError> {
    if value.len() == 11 && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("ruc"))
    }
}

fn phone_number(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::Borrowed("El Número Telefónico es obligatorio."));
        return Err(err);
    }

    phone_format(value).map_err(|mut err| {
        err.message = Some(Cow::Borrowed("El formato del Número Telefónico no es válido."));
        err
    })
}

/// Digits with the usual separators, an optional leading `+` and an optional
/// `x`/`ext` extension.
fn phone_format(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();

    let lower = value.to_ascii_lowercase();
    let (number, extension) = match lower.find("ext").or_else(|| lower.find('x')) {
        Some(idx) => {
            let rest = lower[idx..].trim_start_matches("ext").trim_start_matches(['x', '.']);
            (&lower[..idx], Some(rest.trim()))
        }
        None => (lower.as_str(), None),
    };

    let number = number.strip_prefix('+').unwrap_or(number);
    let digits = number.chars().filter(|c| c.is_ascii_digit()).count();
    let number_ok = digits > 0
        && number
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | '(' | ')'));
    let extension_ok = extension
        .map(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(true);

    if number_ok && extension_ok {
        Ok(())
    } else {
        Err(ValidationError::new("phone"))
    }
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("range"));
    }
    Ok(())
}

impl SupplierRequest {
    /// Trimmed domain fields with revenue rounded to cents. Call after `validate()`.
    pub fn into_fields(self) -> SupplierFields {
        SupplierFields {
            legal_name: self.razon_social.trim().to_string(),
            trade_name: self.nombre_comercial.trim().to_string(),
            ruc: self.ruc,
            phone: self.telefono.trim().to_string(),
            email: self.correo_electronico.trim().to_string(),
            website: self.sitio_web.trim().to_string(),
            address: self.direccion.trim().to_string(),
            country: self.pais.trim().to_string(),
            annual_revenue_usd: self.facturacion_anual_usd.unwrap_or_default().round_dp(2),
        }
    }
}

/// Supplier as returned to callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierResponse {
    pub id: Uuid,
    pub razon_social: String,
    pub nombre_comercial: String,
    pub ruc: String,
    pub telefono: String,
    pub correo_electronico: String,
    pub sitio_web: String,
    pub direccion: String,
    pub pais: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub facturacion_anual_usd: Decimal,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: Option<DateTime<Utc>>,
}

impl From<Supplier> for SupplierResponse {
    fn from(s: Supplier) -> Self {
        Self {
            id: s.supplier_id,
            razon_social: s.legal_name,
            nombre_comercial: s.trade_name,
            ruc: s.ruc,
            telefono: s.phone,
            correo_electronico: s.email,
            sitio_web: s.website,
            direccion: s.address,
            pais: s.country,
            facturacion_anual_usd: s.annual_revenue_usd,
            fecha_creacion: s.created_utc,
            fecha_actualizacion: s.updated_utc,
        }
    }
}

/// `?razonSocial=` on the name lookup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalNameQuery {
    #[serde(default)]
    pub razon_social: Option<String>,
}
