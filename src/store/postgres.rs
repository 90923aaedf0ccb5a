use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::category::{GuestCategory, NewCategory};
use crate::models::couple::{Couple, NewCouple, Side};
use crate::models::rsvp::{NewRsvp, Rsvp, RsvpFilter, RsvpStatus};

const COUPLE_COLUMNS: &str = "id, name, email, side, created_at";

const CATEGORY_COLUMNS: &str =
    "id, name, side, max_guests, invitation_token, is_default, couple_id, created_at";

const RSVP_COLUMNS: &str = "id, guest_name, email, phone, guests, status, category_id, \
     requested_side, submitted_at, decided_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn create_couple(&self, couple: &NewCouple) -> Result<Couple, AppError> {
        let row = sqlx::query_as::<_, Couple>(&format!(
            "INSERT INTO couples (name, email, side) VALUES ($1, $2, $3)
             RETURNING {COUPLE_COLUMNS}"
        ))
        .bind(&couple.name)
        .bind(&couple.email)
        .bind(couple.side)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_couple(&self, id: Uuid) -> Result<Option<Couple>, AppError> {
        let row = sqlx::query_as::<_, Couple>(&format!(
            "SELECT {COUPLE_COLUMNS} FROM couples WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_couple_by_email(&self, email: &str) -> Result<Option<Couple>, AppError> {
        let row = sqlx::query_as::<_, Couple>(&format!(
            "SELECT {COUPLE_COLUMNS} FROM couples WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert_category(&self, category: &NewCategory) -> Result<GuestCategory, AppError> {
        let row = sqlx::query_as::<_, GuestCategory>(&format!(
            "INSERT INTO guest_categories
                 (name, side, max_guests, invitation_token, is_default, couple_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(&category.name)
        .bind(category.side)
        .bind(category.max_guests)
        .bind(category.invitation_token)
        .bind(category.is_default)
        .bind(category.couple_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Option<GuestCategory>, AppError> {
        let row = sqlx::query_as::<_, GuestCategory>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM guest_categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_category_by_token(
        &self,
        token: Uuid,
    ) -> Result<Option<GuestCategory>, AppError> {
        let row = sqlx::query_as::<_, GuestCategory>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM guest_categories WHERE invitation_token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<GuestCategory>, AppError> {
        let row = sqlx::query_as::<_, GuestCategory>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM guest_categories WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn default_category_for_side(
        &self,
        side: Side,
    ) -> Result<Option<GuestCategory>, AppError> {
        let row = sqlx::query_as::<_, GuestCategory>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM guest_categories
             WHERE side = $1 AND is_default
             ORDER BY created_at ASC
             LIMIT 1"
        ))
        .bind(side)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_categories_by_couple(
        &self,
        couple_id: Uuid,
    ) -> Result<Vec<GuestCategory>, AppError> {
        let rows = sqlx::query_as::<_, GuestCategory>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM guest_categories
             WHERE couple_id = $1
             ORDER BY created_at ASC"
        ))
        .bind(couple_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn update_category(
        &self,
        category: &GuestCategory,
    ) -> Result<Option<GuestCategory>, AppError> {
        let row = sqlx::query_as::<_, GuestCategory>(&format!(
            "UPDATE guest_categories
             SET name = $3, side = $4, max_guests = $5, invitation_token = $6
             WHERE id = $1 AND couple_id = $2
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(category.id)
        .bind(category.couple_id)
        .bind(&category.name)
        .bind(category.side)
        .bind(category.max_guests)
        .bind(category.invitation_token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn approved_guest_count(&self, category_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(guests), 0)::BIGINT FROM rsvps
             WHERE category_id = $1 AND status = 'APPROVED'",
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn insert_rsvp(&self, rsvp: &NewRsvp) -> Result<Rsvp, AppError> {
        let row = sqlx::query_as::<_, Rsvp>(&format!(
            "INSERT INTO rsvps
                 (guest_name, email, phone, guests, status, category_id, requested_side)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {RSVP_COLUMNS}"
        ))
        .bind(&rsvp.guest_name)
        .bind(&rsvp.email)
        .bind(&rsvp.phone)
        .bind(rsvp.guests)
        .bind(rsvp.status)
        .bind(rsvp.category_id)
        .bind(rsvp.requested_side)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_rsvp(&self, id: Uuid) -> Result<Option<Rsvp>, AppError> {
        let row = sqlx::query_as::<_, Rsvp>(&format!(
            "SELECT {RSVP_COLUMNS} FROM rsvps WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_rsvps(&self, filter: RsvpFilter) -> Result<Vec<Rsvp>, AppError> {
        let rows = sqlx::query_as::<_, Rsvp>(
            "SELECT r.id, r.guest_name, r.email, r.phone, r.guests, r.status, r.category_id,
                    r.requested_side, r.submitted_at, r.decided_at
             FROM rsvps r
             LEFT JOIN guest_categories c ON c.id = r.category_id
             WHERE ($1::rsvp_status IS NULL OR r.status = $1)
               AND ($2::couple_side IS NULL OR COALESCE(c.side, r.requested_side) = $2)
             ORDER BY r.submitted_at ASC, r.id",
        )
        .bind(filter.status)
        .bind(filter.side)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_rsvps_by_category(&self, category_id: Uuid) -> Result<Vec<Rsvp>, AppError> {
        let rows = sqlx::query_as::<_, Rsvp>(&format!(
            "SELECT {RSVP_COLUMNS} FROM rsvps
             WHERE category_id = $1
             ORDER BY submitted_at DESC"
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn transition_rsvp(
        &self,
        id: Uuid,
        status: RsvpStatus,
        category_id: Option<Uuid>,
    ) -> Result<Option<Rsvp>, AppError> {
        let row = sqlx::query_as::<_, Rsvp>(&format!(
            "UPDATE rsvps
             SET status = $2, category_id = COALESCE($3, category_id), decided_at = now()
             WHERE id = $1 AND status = 'PENDING'
             RETURNING {RSVP_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn delete_rsvp(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM rsvps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
