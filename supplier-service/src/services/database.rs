//! PostgreSQL-backed stores.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{ListQuery, Role, Supplier, User};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::{SupplierStore, UserStore};
use crate::services::ServiceError;

const SUPPLIER_COLUMNS: &str = "supplier_id, legal_name, trade_name, ruc, phone, email, website, \
     address, country, annual_revenue_usd, created_utc, updated_utc";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "supplier-service"))]
    pub async fn new(
        database_url: &Secret<String>,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url.expose_secret())
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

/// `%term%` with LIKE metacharacters escaped by backslash.
fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[async_trait]
impl SupplierStore for Database {
    #[instrument(skip(self))]
    async fn list(&self, query: &ListQuery) -> Result<(Vec<Supplier>, i64), ServiceError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_suppliers"])
            .start_timer();

        let pattern = query.search_term.as_deref().map(contains_pattern);
        let filter = r"($1::text IS NULL OR trade_name ILIKE $1 ESCAPE '\' OR legal_name ILIKE $1 ESCAPE '\')";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM suppliers WHERE {}", filter))
            .bind(pattern.as_deref())
            .fetch_one(&self.pool)
            .await?;

        // Column and direction come from closed enums, never from the caller.
        let sql = format!(
            "SELECT {} FROM suppliers WHERE {} ORDER BY {} {} NULLS LAST, supplier_id LIMIT $2 OFFSET $3",
            SUPPLIER_COLUMNS,
            filter,
            query.sort_field.column(),
            query.direction.keyword(),
        );

        let suppliers = sqlx::query_as::<_, Supplier>(&sql)
            .bind(pattern.as_deref())
            .bind(query.page_size)
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        timer.observe_duration();

        Ok((suppliers, total))
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Supplier>, ServiceError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_supplier"])
            .start_timer();

        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {} FROM suppliers WHERE supplier_id = $1",
            SUPPLIER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        timer.observe_duration();

        Ok(supplier)
    }

    #[instrument(skip(self))]
    async fn get_by_legal_name(&self, legal_name: &str) -> Result<Option<Supplier>, ServiceError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_supplier_by_legal_name"])
            .start_timer();

        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            r"SELECT {} FROM suppliers WHERE legal_name ILIKE $1 ESCAPE '\'
              ORDER BY created_utc, supplier_id LIMIT 1",
            SUPPLIER_COLUMNS
        ))
        .bind(contains_pattern(legal_name))
        .fetch_optional(&self.pool)
        .await?;

        timer.observe_duration();

        Ok(supplier)
    }

    #[instrument(skip(self))]
    async fn ruc_exists(&self, ruc: &str, excluding: Option<Uuid>) -> Result<bool, ServiceError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM suppliers
                WHERE ruc = $1 AND ($2::uuid IS NULL OR supplier_id <> $2)
            )
            "#,
        )
        .bind(ruc)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    #[instrument(skip(self, supplier), fields(supplier_id = %supplier.supplier_id))]
    async fn insert(&self, supplier: &Supplier) -> Result<(), ServiceError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_supplier"])
            .start_timer();

        sqlx::query(
            r#"
            INSERT INTO suppliers (supplier_id, legal_name, trade_name, ruc, phone, email, website,
                                   address, country, annual_revenue_usd, created_utc, updated_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(supplier.supplier_id)
        .bind(&supplier.legal_name)
        .bind(&supplier.trade_name)
        .bind(&supplier.ruc)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.website)
        .bind(&supplier.address)
        .bind(&supplier.country)
        .bind(supplier.annual_revenue_usd)
        .bind(supplier.created_utc)
        .bind(supplier.updated_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ServiceError::duplicate_ruc(&supplier.ruc)
            } else {
                ServiceError::Database(e)
            }
        })?;

        timer.observe_duration();

        Ok(())
    }

    #[instrument(skip(self, supplier), fields(supplier_id = %supplier.supplier_id))]
    async fn update(&self, supplier: &Supplier) -> Result<bool, ServiceError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_supplier"])
            .start_timer();

        let result = sqlx::query(
            r#"
            UPDATE suppliers
            SET legal_name = $2, trade_name = $3, ruc = $4, phone = $5, email = $6, website = $7,
                address = $8, country = $9, annual_revenue_usd = $10, updated_utc = $11
            WHERE supplier_id = $1
            "#,
        )
        .bind(supplier.supplier_id)
        .bind(&supplier.legal_name)
        .bind(&supplier.trade_name)
        .bind(&supplier.ruc)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.website)
        .bind(&supplier.address)
        .bind(&supplier.country)
        .bind(supplier.annual_revenue_usd)
        .bind(supplier.updated_utc)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ServiceError::duplicate_ruc(&supplier.ruc)
            } else {
                ServiceError::Database(e)
            }
        })?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_supplier"])
            .start_timer();

        let result = sqlx::query("DELETE FROM suppliers WHERE supplier_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), ServiceError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for Database {
    #[instrument(skip(self, email))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, email, password_hash, created_utc FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, email, password_hash, created_utc FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    async fn create_with_roles(&self, user: &User, roles: &[Role]) -> Result<(), ServiceError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_user"])
            .start_timer();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO users (user_id, email, password_hash, created_utc) VALUES ($1, $2, $3, $4)",
        )
        .bind(user.user_id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_utc)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ServiceError::UserAlreadyExists
            } else {
                ServiceError::Database(e)
            }
        })?;

        let role_names: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();
        let assigned = sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            SELECT $1, role_id FROM roles WHERE role_name = ANY($2::text[])
            "#,
        )
        .bind(user.user_id)
        .bind(&role_names)
        .execute(&mut *tx)
        .await?;

        if assigned.rows_affected() != role_names.len() as u64 {
            return Err(ServiceError::Internal(anyhow::anyhow!(
                "Roles {:?} are not all seeded",
                role_names
            )));
        }

        tx.commit().await?;

        timer.observe_duration();

        Ok(())
    }

    #[instrument(skip(self))]
    async fn roles_for(&self, user_id: Uuid) -> Result<Vec<String>, ServiceError> {
        let roles = sqlx::query_scalar::<_, String>(
            r#"
            SELECT r.role_name
            FROM user_roles ur
            JOIN roles r ON r.role_id = ur.role_id
            WHERE ur.user_id = $1
            ORDER BY r.role_name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }
}
