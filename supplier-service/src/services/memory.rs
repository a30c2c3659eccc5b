//! In-process stores for tests and database-less local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::models::{ListQuery, Role, SortDirection, SortField, Supplier, User};
use crate::services::store::{SupplierStore, UserStore};
use crate::services::ServiceError;

#[derive(Default)]
struct Tables {
    suppliers: HashMap<Uuid, Supplier>,
    users: HashMap<Uuid, User>,
    user_roles: HashMap<Uuid, Vec<Role>>,
}

/// Both stores over one lock, so every check-then-write is atomic.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, ServiceError> {
        self.tables
            .read()
            .map_err(|_| ServiceError::Internal(anyhow::anyhow!("In-memory store lock poisoned")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, ServiceError> {
        self.tables
            .write()
            .map_err(|_| ServiceError::Internal(anyhow::anyhow!("In-memory store lock poisoned")))
    }
}

fn ruc_taken(tables: &Tables, ruc: &str, excluding: Option<Uuid>) -> bool {
    tables
        .suppliers
        .values()
        .any(|s| s.ruc == ruc && Some(s.supplier_id) != excluding)
}

fn compare(a: &Supplier, b: &Supplier, field: SortField, direction: SortDirection) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    let primary = match field {
        // Missing update times sort last in both directions.
        SortField::UpdatedAt => match (a.updated_utc, b.updated_utc) {
            (Some(x), Some(y)) => match direction {
                SortDirection::Asc => x.cmp(&y),
                SortDirection::Desc => y.cmp(&x),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortField::TradeName | SortField::LegalName => {
            let (x, y) = if field == SortField::TradeName {
                (&a.trade_name, &b.trade_name)
            } else {
                (&a.legal_name, &b.legal_name)
            };
            match direction {
                SortDirection::Asc => x.cmp(y),
                SortDirection::Desc => y.cmp(x),
            }
        }
    };

    primary.then_with(|| a.supplier_id.cmp(&b.supplier_id))
}

#[async_trait]
impl SupplierStore for InMemoryStore {
    async fn list(&self, query: &ListQuery) -> Result<(Vec<Supplier>, i64), ServiceError> {
        let tables = self.read()?;
        let needle = query.search_term.as_ref().map(|t| t.to_lowercase());

        let mut matching: Vec<&Supplier> = tables
            .suppliers
            .values()
            .filter(|s| match &needle {
                Some(n) => {
                    s.trade_name.to_lowercase().contains(n) || s.legal_name.to_lowercase().contains(n)
                }
                None => true,
            })
            .collect();

        let total = matching.len() as i64;
        matching.sort_by(|a, b| compare(a, b, query.sort_field, query.direction));

        let page = matching
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(query.page_size).unwrap_or(0))
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Supplier>, ServiceError> {
        Ok(self.read()?.suppliers.get(&id).cloned())
    }

    async fn get_by_legal_name(&self, legal_name: &str) -> Result<Option<Supplier>, ServiceError> {
        let needle = legal_name.to_lowercase();
        let tables = self.read()?;

        Ok(tables
            .suppliers
            .values()
            .filter(|s| s.legal_name.to_lowercase().contains(&needle))
            .min_by(|a, b| {
                a.created_utc
                    .cmp(&b.created_utc)
                    .then_with(|| a.supplier_id.cmp(&b.supplier_id))
            })
            .cloned())
    }

    async fn ruc_exists(&self, ruc: &str, excluding: Option<Uuid>) -> Result<bool, ServiceError> {
        let tables = self.read()?;
        Ok(ruc_taken(&tables, ruc, excluding))
    }

    async fn insert(&self, supplier: &Supplier) -> Result<(), ServiceError> {
        let mut tables = self.write()?;
        if ruc_taken(&tables, &supplier.ruc, None) {
            return Err(ServiceError::duplicate_ruc(&supplier.ruc));
        }
        tables.suppliers.insert(supplier.supplier_id, supplier.clone());
        Ok(())
    }

    async fn update(&self, supplier: &Supplier) -> Result<bool, ServiceError> {
        let mut tables = self.write()?;
        if !tables.suppliers.contains_key(&supplier.supplier_id) {
            return Ok(false);
        }
        if ruc_taken(&tables, &supplier.ruc, Some(supplier.supplier_id)) {
            return Err(ServiceError::duplicate_ruc(&supplier.ruc));
        }
        tables.suppliers.insert(supplier.supplier_id, supplier.clone());
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(self.write()?.suppliers.remove(&id).is_some())
    }

    async fn health_check(&self) -> Result<(), ServiceError> {
        self.read().map(|_| ())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let tables = self.read()?;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>, ServiceError> {
        Ok(self.read()?.users.get(&user_id).cloned())
    }

    async fn create_with_roles(&self, user: &User, roles: &[Role]) -> Result<(), ServiceError> {
        let mut tables = self.write()?;
        if tables.users.values().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(ServiceError::UserAlreadyExists);
        }
        tables.users.insert(user.user_id, user.clone());
        tables.user_roles.insert(user.user_id, roles.to_vec());
        Ok(())
    }

    async fn roles_for(&self, user_id: Uuid) -> Result<Vec<String>, ServiceError> {
        let tables = self.read()?;
        let mut roles: Vec<String> = tables
            .user_roles
            .get(&user_id)
            .map(|r| r.iter().map(|role| role.as_str().to_string()).collect())
            .unwrap_or_default();
        roles.sort();
        Ok(roles)
    }
}
