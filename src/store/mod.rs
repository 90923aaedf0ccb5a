//! Persistence for couples, guest categories, and RSVPs.
//!
//! [`Store`] dispatches to either the postgres backend or an in-process one
//! with the same uniqueness rules. Unique violations surface as
//! [`AppError::Conflict`].

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::category::{GuestCategory, NewCategory};
use crate::models::couple::{Couple, NewCouple, Side};
use crate::models::rsvp::{NewRsvp, Rsvp, RsvpFilter, RsvpStatus};

#[derive(Clone)]
pub enum Store {
    Postgres(PgStore),
    Memory(MemoryStore),
}

impl Store {
    pub async fn ping(&self) -> Result<(), AppError> {
        match self {
            Self::Postgres(s) => s.ping().await,
            Self::Memory(_) => Ok(()),
        }
    }

    // --- Couples ---

    pub async fn create_couple(&self, couple: &NewCouple) -> Result<Couple, AppError> {
        match self {
            Self::Postgres(s) => s.create_couple(couple).await,
            Self::Memory(s) => s.create_couple(couple),
        }
    }

    pub async fn get_couple(&self, id: Uuid) -> Result<Option<Couple>, AppError> {
        match self {
            Self::Postgres(s) => s.get_couple(id).await,
            Self::Memory(s) => s.get_couple(id),
        }
    }

    pub async fn get_couple_by_email(&self, email: &str) -> Result<Option<Couple>, AppError> {
        match self {
            Self::Postgres(s) => s.get_couple_by_email(email).await,
            Self::Memory(s) => s.get_couple_by_email(email),
        }
    }

    // --- Categories ---

    pub async fn insert_category(&self, category: &NewCategory) -> Result<GuestCategory, AppError> {
        match self {
            Self::Postgres(s) => s.insert_category(category).await,
            Self::Memory(s) => s.insert_category(category),
        }
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Option<GuestCategory>, AppError> {
        match self {
            Self::Postgres(s) => s.get_category(id).await,
            Self::Memory(s) => s.get_category(id),
        }
    }

    pub async fn get_category_by_token(
        &self,
        token: Uuid,
    ) -> Result<Option<GuestCategory>, AppError> {
        match self {
            Self::Postgres(s) => s.get_category_by_token(token).await,
            Self::Memory(s) => s.get_category_by_token(token),
        }
    }

    pub async fn get_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<GuestCategory>, AppError> {
        match self {
            Self::Postgres(s) => s.get_category_by_name(name).await,
            Self::Memory(s) => s.get_category_by_name(name),
        }
    }

    pub async fn default_category_for_side(
        &self,
        side: Side,
    ) -> Result<Option<GuestCategory>, AppError> {
        match self {
            Self::Postgres(s) => s.default_category_for_side(side).await,
            Self::Memory(s) => s.default_category_for_side(side),
        }
    }

    pub async fn list_categories_by_couple(
        &self,
        couple_id: Uuid,
    ) -> Result<Vec<GuestCategory>, AppError> {
        match self {
            Self::Postgres(s) => s.list_categories_by_couple(couple_id).await,
            Self::Memory(s) => s.list_categories_by_couple(couple_id),
        }
    }

    /// Overwrite name, side, quota and token. Only matches a row owned by
    /// `category.couple_id`; returns `None` otherwise.
    pub async fn update_category(
        &self,
        category: &GuestCategory,
    ) -> Result<Option<GuestCategory>, AppError> {
        match self {
            Self::Postgres(s) => s.update_category(category).await,
            Self::Memory(s) => s.update_category(category),
        }
    }

    /// Sum of `guests` over APPROVED RSVPs in the category, recomputed on
    /// every call.
    pub async fn approved_guest_count(&self, category_id: Uuid) -> Result<i64, AppError> {
        match self {
            Self::Postgres(s) => s.approved_guest_count(category_id).await,
            Self::Memory(s) => s.approved_guest_count(category_id),
        }
    }

    // --- RSVPs ---

    pub async fn insert_rsvp(&self, rsvp: &NewRsvp) -> Result<Rsvp, AppError> {
        match self {
            Self::Postgres(s) => s.insert_rsvp(rsvp).await,
            Self::Memory(s) => s.insert_rsvp(rsvp),
        }
    }

    pub async fn get_rsvp(&self, id: Uuid) -> Result<Option<Rsvp>, AppError> {
        match self {
            Self::Postgres(s) => s.get_rsvp(id).await,
            Self::Memory(s) => s.get_rsvp(id),
        }
    }

    /// Oldest first. A side filter matches the category's side, or the side
    /// picked on the website form when the RSVP has no category yet.
    pub async fn list_rsvps(&self, filter: RsvpFilter) -> Result<Vec<Rsvp>, AppError> {
        match self {
            Self::Postgres(s) => s.list_rsvps(filter).await,
            Self::Memory(s) => s.list_rsvps(filter),
        }
    }

    pub async fn list_rsvps_by_category(&self, category_id: Uuid) -> Result<Vec<Rsvp>, AppError> {
        match self {
            Self::Postgres(s) => s.list_rsvps_by_category(category_id).await,
            Self::Memory(s) => s.list_rsvps_by_category(category_id),
        }
    }

    /// Move a PENDING RSVP to `status`, optionally (re)assigning its category.
    /// Returns `None` when the RSVP is missing or no longer PENDING.
    pub async fn transition_rsvp(
        &self,
        id: Uuid,
        status: RsvpStatus,
        category_id: Option<Uuid>,
    ) -> Result<Option<Rsvp>, AppError> {
        match self {
            Self::Postgres(s) => s.transition_rsvp(id, status, category_id).await,
            Self::Memory(s) => s.transition_rsvp(id, status, category_id),
        }
    }

    pub async fn delete_rsvp(&self, id: Uuid) -> Result<bool, AppError> {
        match self {
            Self::Postgres(s) => s.delete_rsvp(id).await,
            Self::Memory(s) => s.delete_rsvp(id),
        }
    }
}
