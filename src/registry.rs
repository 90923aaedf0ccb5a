use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::admission;
use crate::error::AppError;
use crate::models::category::{
    CategoryResponse, CreateCategoryRequest, GuestCategory, NewCategory, UpdateCategoryRequest,
};
use crate::models::couple::Side;
use crate::store::Store;

/// Per-category mutual exclusion for read-decide-write sequences against
/// the approved-guest aggregate.
///
/// Guards are process-local; running several instances against one database
/// would need a database-side lock instead.
#[derive(Clone, Default)]
pub struct CategoryLocks {
    inner: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl CategoryLocks {
    pub async fn acquire(&self, category_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self.inner.entry(category_id).or_default().clone();
        lock.lock_owned().await
    }
}

/// Guest categories, their quotas, and the live approved aggregate.
#[derive(Clone)]
pub struct CategoryRegistry {
    store: Store,
    locks: CategoryLocks,
}

fn validate_category(name: &str, max_guests: i32) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Category name is required".into()));
    }
    if max_guests < 0 {
        return Err(AppError::BadRequest(
            "Maximum guest count cannot be negative".into(),
        ));
    }
    Ok(name.to_string())
}

impl CategoryRegistry {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            locks: CategoryLocks::default(),
        }
    }

    pub async fn lock(&self, category_id: Uuid) -> OwnedMutexGuard<()> {
        self.locks.acquire(category_id).await
    }

    pub async fn create_category(
        &self,
        couple_id: Uuid,
        side: Side,
        request: CreateCategoryRequest,
    ) -> Result<GuestCategory, AppError> {
        let name = validate_category(&request.name, request.max_guests)?;

        if self.store.get_category_by_name(&name).await?.is_some() {
            return Err(AppError::Conflict(
                "A category with that name already exists".into(),
            ));
        }
        if request.is_default && self.store.default_category_for_side(side).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "A default category already exists for {side}"
            )));
        }

        let category = self
            .store
            .insert_category(&NewCategory {
                name,
                side,
                max_guests: request.max_guests,
                invitation_token: request.invitation_token.unwrap_or_else(Uuid::new_v4),
                is_default: request.is_default,
                couple_id,
            })
            .await?;

        tracing::info!(
            category_id = %category.id,
            side = %category.side,
            max_guests = category.max_guests,
            "category created"
        );
        Ok(category)
    }

    /// Only the owning couple may update a category. Lowering the quota below
    /// the current approved aggregate is allowed and leaves negative
    /// remaining capacity.
    pub async fn update_category(
        &self,
        couple_id: Uuid,
        category_id: Uuid,
        request: UpdateCategoryRequest,
    ) -> Result<GuestCategory, AppError> {
        let mut category = self.get(category_id).await?;
        if category.couple_id != couple_id {
            return Err(AppError::Forbidden);
        }

        let name = request.name.unwrap_or_else(|| category.name.clone());
        let max_guests = request.max_guests.unwrap_or(category.max_guests);
        category.name = validate_category(&name, max_guests)?;
        category.max_guests = max_guests;

        if let Some(side) = request.side {
            if category.is_default
                && side != category.side
                && self.store.default_category_for_side(side).await?.is_some()
            {
                return Err(AppError::Conflict(format!(
                    "A default category already exists for {side}"
                )));
            }
            category.side = side;
        }
        if let Some(token) = request.invitation_token {
            category.invitation_token = token;
        }

        let updated = self
            .store
            .update_category(&category)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

        tracing::info!(category_id = %updated.id, "category updated");
        Ok(updated)
    }

    pub async fn get(&self, category_id: Uuid) -> Result<GuestCategory, AppError> {
        self.store
            .get_category(category_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".into()))
    }

    /// The message is deliberately the same for every unknown token.
    pub async fn resolve_by_token(&self, token: Uuid) -> Result<GuestCategory, AppError> {
        self.store
            .get_category_by_token(token)
            .await?
            .ok_or_else(|| AppError::NotFound("Invalid invitation link.".into()))
    }

    pub async fn resolve_default_for_side(&self, side: Side) -> Result<GuestCategory, AppError> {
        self.store
            .default_category_for_side(side)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("No default category configured for {side}"))
            })
    }

    pub async fn approved_guest_aggregate(&self, category_id: Uuid) -> Result<i64, AppError> {
        self.store.approved_guest_count(category_id).await
    }

    pub async fn remaining_capacity(&self, category_id: Uuid) -> Result<i64, AppError> {
        let category = self.get(category_id).await?;
        let approved = self.approved_guest_aggregate(category_id).await?;
        Ok(admission::remaining(&category, approved))
    }

    pub async fn list_for_couple(&self, couple_id: Uuid) -> Result<Vec<CategoryResponse>, AppError> {
        let categories = self.store.list_categories_by_couple(couple_id).await?;

        let mut items = Vec::with_capacity(categories.len());
        for category in categories {
            let approved_guests = self.approved_guest_aggregate(category.id).await?;
            items.push(CategoryResponse {
                remaining_guests: admission::remaining(&category, approved_guests),
                approved_guests,
                category,
            });
        }
        Ok(items)
    }
}
