//! Supplier registry entity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Registered supplier.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Supplier {
    pub supplier_id: Uuid,
    pub legal_name: String,
    pub trade_name: String,
    /// 11-digit Peruvian tax id. Unique across suppliers.
    pub ruc: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub address: String,
    pub country: String,
    pub annual_revenue_usd: Decimal,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: Option<DateTime<Utc>>,
}

/// Caller-editable supplier attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplierFields {
    pub legal_name: String,
    pub trade_name: String,
    pub ruc: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub address: String,
    pub country: String,
    pub annual_revenue_usd: Decimal,
}

impl Supplier {
    /// Fresh supplier with a new id. Both timestamps start at `now`.
    pub fn new(fields: SupplierFields, now: DateTime<Utc>) -> Self {
        Self {
            supplier_id: Uuid::new_v4(),
            legal_name: fields.legal_name,
            trade_name: fields.trade_name,
            ruc: fields.ruc,
            phone: fields.phone,
            email: fields.email,
            website: fields.website,
            address: fields.address,
            country: fields.country,
            annual_revenue_usd: fields.annual_revenue_usd,
            created_utc: now,
            updated_utc: Some(now),
        }
    }

    /// Copy of `self` carrying `fields`. Id and creation time are preserved.
    pub fn with_changes(&self, fields: SupplierFields, now: DateTime<Utc>) -> Self {
        Self {
            supplier_id: self.supplier_id,
            created_utc: self.created_utc,
            updated_utc: Some(now),
            ..Supplier::new(fields, now)
        }
    }
}
