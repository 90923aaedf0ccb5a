//! Capacity-aware admission decisions.
//!
//! These are pure functions over a category and its approved-guest
//! aggregate. Callers are responsible for holding the category's lock from
//! the aggregate read until the resulting write lands.

use crate::models::category::GuestCategory;
use crate::models::rsvp::RsvpStatus;

/// Initial status for a submission that resolved to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Approved,
    /// Over quota. The guest is not turned away; an admin triages it.
    Pending,
}

impl From<Admission> for RsvpStatus {
    fn from(admission: Admission) -> Self {
        match admission {
            Admission::Approved => RsvpStatus::Approved,
            Admission::Pending => RsvpStatus::Pending,
        }
    }
}

pub fn remaining(category: &GuestCategory, approved: i64) -> i64 {
    i64::from(category.max_guests) - approved
}

pub fn fits(category: &GuestCategory, approved: i64, requested: i32) -> bool {
    approved + i64::from(requested) <= i64::from(category.max_guests)
}

pub fn evaluate(category: &GuestCategory, approved: i64, requested: i32) -> Admission {
    if fits(category, approved, requested) {
        Admission::Approved
    } else {
        Admission::Pending
    }
}
