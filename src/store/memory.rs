use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::error::{conflict_message, AppError};
use crate::models::category::{GuestCategory, NewCategory};
use crate::models::couple::{Couple, NewCouple, Side};
use crate::models::rsvp::{NewRsvp, Rsvp, RsvpFilter, RsvpStatus};

#[derive(Default)]
struct Tables {
    couples: Vec<Couple>,
    categories: Vec<GuestCategory>,
    rsvps: Vec<Rsvp>,
}

impl Tables {
    fn category_conflict(&self, candidate: &GuestCategory) -> Option<&'static str> {
        let others = self.categories.iter().filter(|c| c.id != candidate.id);
        for other in others {
            if other.name == candidate.name {
                return Some("guest_categories_name_key");
            }
            if other.invitation_token == candidate.invitation_token {
                return Some("guest_categories_invitation_token_key");
            }
            if candidate.is_default && other.is_default && other.side == candidate.side {
                return Some("guest_categories_one_default_per_side");
            }
        }
        None
    }

    fn side_of(&self, rsvp: &Rsvp) -> Option<Side> {
        rsvp.category_id
            .and_then(|id| self.categories.iter().find(|c| c.id == id))
            .map(|c| c.side)
            .or(rsvp.requested_side)
    }
}

/// In-process store with the same constraints as the postgres schema.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

fn conflict(constraint: &str) -> AppError {
    AppError::Conflict(conflict_message(constraint).to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }

    pub fn create_couple(&self, couple: &NewCouple) -> Result<Couple, AppError> {
        let mut tables = self.tables()?;
        if tables.couples.iter().any(|c| c.email == couple.email) {
            return Err(conflict("couples_email_key"));
        }
        let row = Couple {
            id: Uuid::new_v4(),
            name: couple.name.clone(),
            email: couple.email.clone(),
            side: couple.side,
            created_at: Utc::now(),
        };
        tables.couples.push(row.clone());
        Ok(row)
    }

    pub fn get_couple(&self, id: Uuid) -> Result<Option<Couple>, AppError> {
        Ok(self.tables()?.couples.iter().find(|c| c.id == id).cloned())
    }

    pub fn get_couple_by_email(&self, email: &str) -> Result<Option<Couple>, AppError> {
        Ok(self
            .tables()?
            .couples
            .iter()
            .find(|c| c.email == email)
            .cloned())
    }

    pub fn insert_category(&self, category: &NewCategory) -> Result<GuestCategory, AppError> {
        let mut tables = self.tables()?;
        let row = GuestCategory {
            id: Uuid::new_v4(),
            name: category.name.clone(),
            side: category.side,
            max_guests: category.max_guests,
            invitation_token: category.invitation_token,
            is_default: category.is_default,
            couple_id: category.couple_id,
            created_at: Utc::now(),
        };
        if let Some(constraint) = tables.category_conflict(&row) {
            return Err(conflict(constraint));
        }
        tables.categories.push(row.clone());
        Ok(row)
    }

    pub fn get_category(&self, id: Uuid) -> Result<Option<GuestCategory>, AppError> {
        Ok(self
            .tables()?
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    pub fn get_category_by_token(&self, token: Uuid) -> Result<Option<GuestCategory>, AppError> {
        Ok(self
            .tables()?
            .categories
            .iter()
            .find(|c| c.invitation_token == token)
            .cloned())
    }

    pub fn get_category_by_name(&self, name: &str) -> Result<Option<GuestCategory>, AppError> {
        Ok(self
            .tables()?
            .categories
            .iter()
            .find(|c| c.name == name)
            .cloned())
    }

    pub fn default_category_for_side(&self, side: Side) -> Result<Option<GuestCategory>, AppError> {
        Ok(self
            .tables()?
            .categories
            .iter()
            .find(|c| c.is_default && c.side == side)
            .cloned())
    }

    pub fn list_categories_by_couple(&self, couple_id: Uuid) -> Result<Vec<GuestCategory>, AppError> {
        Ok(self
            .tables()?
            .categories
            .iter()
            .filter(|c| c.couple_id == couple_id)
            .cloned()
            .collect())
    }

    pub fn update_category(
        &self,
        category: &GuestCategory,
    ) -> Result<Option<GuestCategory>, AppError> {
        let mut tables = self.tables()?;
        let Some(index) = tables
            .categories
            .iter()
            .position(|c| c.id == category.id && c.couple_id == category.couple_id)
        else {
            return Ok(None);
        };

        let mut updated = tables.categories[index].clone();
        updated.name = category.name.clone();
        updated.side = category.side;
        updated.max_guests = category.max_guests;
        updated.invitation_token = category.invitation_token;

        if let Some(constraint) = tables.category_conflict(&updated) {
            return Err(conflict(constraint));
        }
        tables.categories[index] = updated.clone();
        Ok(Some(updated))
    }

    pub fn approved_guest_count(&self, category_id: Uuid) -> Result<i64, AppError> {
        Ok(self
            .tables()?
            .rsvps
            .iter()
            .filter(|r| r.category_id == Some(category_id) && r.status == RsvpStatus::Approved)
            .map(|r| i64::from(r.guests))
            .sum())
    }

    pub fn insert_rsvp(&self, rsvp: &NewRsvp) -> Result<Rsvp, AppError> {
        let mut tables = self.tables()?;
        if tables.rsvps.iter().any(|r| r.email == rsvp.email) {
            return Err(conflict("rsvps_email_key"));
        }
        if tables.rsvps.iter().any(|r| r.phone == rsvp.phone) {
            return Err(conflict("rsvps_phone_key"));
        }
        let row = Rsvp {
            id: Uuid::new_v4(),
            guest_name: rsvp.guest_name.clone(),
            email: rsvp.email.clone(),
            phone: rsvp.phone.clone(),
            guests: rsvp.guests,
            status: rsvp.status,
            category_id: rsvp.category_id,
            requested_side: rsvp.requested_side,
            submitted_at: Utc::now(),
            decided_at: None,
        };
        tables.rsvps.push(row.clone());
        Ok(row)
    }

    pub fn get_rsvp(&self, id: Uuid) -> Result<Option<Rsvp>, AppError> {
        Ok(self.tables()?.rsvps.iter().find(|r| r.id == id).cloned())
    }

    pub fn list_rsvps(&self, filter: RsvpFilter) -> Result<Vec<Rsvp>, AppError> {
        let tables = self.tables()?;
        Ok(tables
            .rsvps
            .iter()
            .filter(|r| filter.status.is_none_or(|s| r.status == s))
            .filter(|r| filter.side.is_none_or(|s| tables.side_of(r) == Some(s)))
            .cloned()
            .collect())
    }

    pub fn list_rsvps_by_category(&self, category_id: Uuid) -> Result<Vec<Rsvp>, AppError> {
        Ok(self
            .tables()?
            .rsvps
            .iter()
            .rev()
            .filter(|r| r.category_id == Some(category_id))
            .cloned()
            .collect())
    }

    pub fn transition_rsvp(
        &self,
        id: Uuid,
        status: RsvpStatus,
        category_id: Option<Uuid>,
    ) -> Result<Option<Rsvp>, AppError> {
        let mut tables = self.tables()?;
        let Some(rsvp) = tables
            .rsvps
            .iter_mut()
            .find(|r| r.id == id && r.status == RsvpStatus::Pending)
        else {
            return Ok(None);
        };
        rsvp.status = status;
        if category_id.is_some() {
            rsvp.category_id = category_id;
        }
        rsvp.decided_at = Some(Utc::now());
        Ok(Some(rsvp.clone()))
    }

    pub fn delete_rsvp(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables()?;
        let before = tables.rsvps.len();
        tables.rsvps.retain(|r| r.id != id);
        Ok(tables.rsvps.len() != before)
    }
}
