//! Supplier registry operations and watchlist screening.

use chrono::Utc;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::models::{
    AuthContext, ListQuery, PagedResult, Role, ScreeningResponse, Supplier, SupplierFields,
};
use crate::services::credentials::CredentialProvider;
use crate::services::metrics::SCREENING_REQUESTS_TOTAL;
use crate::services::screening::ScreeningClient;
use crate::services::store::{SupplierStore, UserStore};
use crate::services::ServiceError;

#[derive(Clone)]
pub struct SupplierService {
    suppliers: Arc<dyn SupplierStore>,
    users: Arc<dyn UserStore>,
    screening: Arc<dyn ScreeningClient>,
    credentials: CredentialProvider,
}

impl SupplierService {
    pub fn new(
        suppliers: Arc<dyn SupplierStore>,
        users: Arc<dyn UserStore>,
        screening: Arc<dyn ScreeningClient>,
        credentials: CredentialProvider,
    ) -> Self {
        Self {
            suppliers,
            users,
            screening,
            credentials,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self, query: ListQuery) -> Result<PagedResult<Supplier>, ServiceError> {
        let (items, total) = self.suppliers.list(&query).await?;
        Ok(PagedResult::new(items, total, query.page_number, query.page_size))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Supplier, ServiceError> {
        self.suppliers
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::supplier_not_found(id))
    }

    pub async fn get_by_legal_name(&self, legal_name: &str) -> Result<Option<Supplier>, ServiceError> {
        self.suppliers.get_by_legal_name(legal_name).await
    }

    #[instrument(skip(self, fields), fields(ruc = %fields.ruc))]
    pub async fn create(&self, fields: SupplierFields) -> Result<Supplier, ServiceError> {
        if self.suppliers.ruc_exists(&fields.ruc, None).await? {
            return Err(ServiceError::duplicate_ruc(&fields.ruc));
        }

        let supplier = Supplier::new(fields, Utc::now());
        self.suppliers.insert(&supplier).await?;

        tracing::info!(supplier_id = %supplier.supplier_id, "Supplier created");
        Ok(supplier)
    }

    #[instrument(skip(self, fields), fields(ruc = %fields.ruc))]
    pub async fn update(&self, id: Uuid, fields: SupplierFields) -> Result<Supplier, ServiceError> {
        let current = self.get_by_id(id).await?;

        if self.suppliers.ruc_exists(&fields.ruc, Some(id)).await? {
            return Err(ServiceError::duplicate_ruc(&fields.ruc));
        }

        let updated = current.with_changes(fields, Utc::now());
        if !self.suppliers.update(&updated).await? {
            return Err(ServiceError::supplier_not_found(id));
        }

        tracing::info!(supplier_id = %id, "Supplier updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        if !self.suppliers.delete(id).await? {
            return Err(ServiceError::supplier_not_found(id));
        }

        tracing::info!(supplier_id = %id, "Supplier deleted");
        Ok(())
    }

    /// Screen a supplier's trade name against the external watchlist source.
    ///
    /// The caller must resolve to a stored user holding `Admin`; the token's
    /// role claim alone is not trusted here.
    #[instrument(skip(self, caller), fields(caller = %caller.subject))]
    pub async fn perform_screening(
        &self,
        id: Uuid,
        caller: &AuthContext,
    ) -> Result<ScreeningResponse, ServiceError> {
        let result = self.screen(id, caller).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(ServiceError::Unauthorized(_)) => "unauthorized",
            Err(ServiceError::NotFound { .. }) => "not_found",
            Err(ServiceError::External(_)) => "external_error",
            Err(_) => "error",
        };
        SCREENING_REQUESTS_TOTAL.with_label_values(&[outcome]).inc();

        result
    }

    async fn screen(&self, id: Uuid, caller: &AuthContext) -> Result<ScreeningResponse, ServiceError> {
        let user_id = Uuid::parse_str(caller.subject.trim()).map_err(|_| {
            ServiceError::Unauthorized("User identity could not be determined.".to_string())
        })?;

        let user = self.users.find_by_id(user_id).await?.ok_or_else(|| {
            ServiceError::Unauthorized("User identity could not be determined.".to_string())
        })?;

        let roles = self.users.roles_for(user.user_id).await?;
        if !roles.iter().any(|r| r == Role::Admin.as_str()) {
            tracing::warn!(user_id = %user.user_id, "Screening refused: caller is not an administrator");
            return Err(ServiceError::Unauthorized(
                "Only administrators can perform supplier screening.".to_string(),
            ));
        }

        let credentials = self.credentials.credentials();
        if !credentials.is_complete() {
            return Err(ServiceError::Operational(
                "Scraping service credentials are not configured.".to_string(),
            ));
        }

        let token = self
            .screening
            .login(
                &credentials.username,
                credentials.password.expose_secret(),
                &credentials.tenant_id,
            )
            .await
            .and_then(|login| login.token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ServiceError::External("Could not authenticate with the scraping service.".to_string())
            })?;

        let supplier = self.get_by_id(id).await?;

        let response = self
            .screening
            .scrape_company(&supplier.trade_name, &token)
            .await?;

        tracing::info!(
            supplier_id = %supplier.supplier_id,
            hits = response.hits,
            "Supplier screening completed"
        );

        Ok(response)
    }
}
