//! RSVP lifecycle: submission, admin decisions, and removal.
//!
//! An RSVP starts PENDING or APPROVED and leaves PENDING at most once.
//! Anything that reads a category's approved aggregate and then writes an
//! RSVP counted by it does so while holding that category's lock.

use uuid::Uuid;

use crate::admission::{self, Admission};
use crate::error::AppError;
use crate::invitation::InvitationResolver;
use crate::models::category::GuestCategory;
use crate::models::couple::Side;
use crate::models::rsvp::{NewRsvp, Rsvp, RsvpFilter, RsvpStatus, SubmitRsvpRequest};
use crate::notify::Notifier;
use crate::registry::CategoryRegistry;
use crate::store::Store;

/// How a submission reached us.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Route {
    Invitation(String),
    Website(Side),
}

#[derive(Debug)]
struct Submission {
    guest_name: String,
    email: String,
    phone: String,
    guests: i32,
    route: Route,
}

impl TryFrom<SubmitRsvpRequest> for Submission {
    type Error = AppError;

    fn try_from(req: SubmitRsvpRequest) -> Result<Self, Self::Error> {
        let guest_name = req.name.trim().to_string();
        let email = req.email.trim().to_lowercase();
        let phone = req.phone.trim().to_string();

        if guest_name.is_empty() || email.is_empty() || phone.is_empty() {
            return Err(AppError::BadRequest(
                "Name, email and phone are required".into(),
            ));
        }
        if !email.contains('@') {
            return Err(AppError::BadRequest("Email address is invalid".into()));
        }
        if req.guests < 1 {
            return Err(AppError::BadRequest(
                "At least one guest is required".into(),
            ));
        }

        let token = req.token.filter(|t| !t.trim().is_empty());
        let side = req.selected_side.filter(|s| !s.trim().is_empty());
        let route = match (token, side) {
            (Some(token), _) => Route::Invitation(token),
            (None, Some(side)) => Route::Website(side.parse().map_err(AppError::BadRequest)?),
            (None, None) => {
                return Err(AppError::BadRequest(
                    "Missing required RSVP information.".into(),
                ));
            }
        };

        Ok(Self {
            guest_name,
            email,
            phone,
            guests: req.guests,
            route,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// `category_id` overrides (or supplies) the RSVP's category.
    Approve { category_id: Option<Uuid> },
    Reject,
}

fn missing_category(suggested: Option<&GuestCategory>) -> AppError {
    let message = "A category must be assigned to approve this RSVP";
    AppError::BadRequest(match suggested {
        Some(category) => format!("{message} (suggested: {})", category.name),
        None => message.to_string(),
    })
}

fn already_decided(status: RsvpStatus) -> AppError {
    let verb = match status {
        RsvpStatus::Approved => "approved",
        RsvpStatus::Rejected => "rejected",
        RsvpStatus::Pending => "decided",
    };
    AppError::Conflict(format!("This RSVP has already been {verb}"))
}

#[derive(Clone)]
pub struct RsvpLifecycle {
    store: Store,
    registry: CategoryRegistry,
    invitations: InvitationResolver,
    notifier: Notifier,
}

impl RsvpLifecycle {
    pub fn new(
        store: Store,
        registry: CategoryRegistry,
        invitations: InvitationResolver,
        notifier: Notifier,
    ) -> Self {
        Self {
            store,
            registry,
            invitations,
            notifier,
        }
    }

    pub async fn submit(&self, request: SubmitRsvpRequest) -> Result<Rsvp, AppError> {
        let submission = Submission::try_from(request)?;

        let rsvp = match &submission.route {
            Route::Invitation(token) => {
                let category = self.invitations.resolve(token).await?;
                self.admit(&submission, category.id).await?
            }
            Route::Website(side) => {
                self.store
                    .insert_rsvp(&NewRsvp {
                        guest_name: submission.guest_name.clone(),
                        email: submission.email.clone(),
                        phone: submission.phone.clone(),
                        guests: submission.guests,
                        status: RsvpStatus::Pending,
                        category_id: None,
                        requested_side: Some(*side),
                    })
                    .await?
            }
        };

        tracing::info!(
            rsvp_id = %rsvp.id,
            status = ?rsvp.status,
            category_id = ?rsvp.category_id,
            guests = rsvp.guests,
            "rsvp submitted"
        );
        self.notifier.dispatch(&rsvp);
        Ok(rsvp)
    }

    async fn admit(&self, submission: &Submission, category_id: Uuid) -> Result<Rsvp, AppError> {
        let _guard = self.registry.lock(category_id).await;

        let category = self.registry.get(category_id).await?;
        let approved = self.registry.approved_guest_aggregate(category.id).await?;
        let admission = admission::evaluate(&category, approved, submission.guests);
        if admission == Admission::Pending {
            tracing::info!(
                category_id = %category.id,
                approved,
                requested = submission.guests,
                max_guests = category.max_guests,
                "over quota, holding for review"
            );
        }

        self.store
            .insert_rsvp(&NewRsvp {
                guest_name: submission.guest_name.clone(),
                email: submission.email.clone(),
                phone: submission.phone.clone(),
                guests: submission.guests,
                status: admission.into(),
                category_id: Some(category.id),
                requested_side: Some(category.side),
            })
            .await
    }

    /// Applies an admin decision made by `decided_by`. A category named
    /// explicitly in the decision must belong to that couple.
    pub async fn decide(
        &self,
        decided_by: Uuid,
        rsvp_id: Uuid,
        decision: Decision,
    ) -> Result<Rsvp, AppError> {
        let rsvp = self
            .store
            .get_rsvp(rsvp_id)
            .await?
            .ok_or_else(|| AppError::NotFound("RSVP not found".into()))?;
        if rsvp.status.is_terminal() {
            return Err(already_decided(rsvp.status));
        }

        let decided = match decision {
            Decision::Reject => {
                self.store
                    .transition_rsvp(rsvp.id, RsvpStatus::Rejected, None)
                    .await?
            }
            Decision::Approve { category_id } => {
                let target = self.approval_category(decided_by, &rsvp, category_id).await?;
                self.approve_into(&rsvp, target.id).await?
            }
        };

        // Another admin got there between our read and the write.
        let decided = match decided {
            Some(rsvp) => rsvp,
            None => {
                let current = self.store.get_rsvp(rsvp_id).await?;
                return Err(match current {
                    Some(r) => already_decided(r.status),
                    None => AppError::NotFound("RSVP not found".into()),
                });
            }
        };

        tracing::info!(
            rsvp_id = %decided.id,
            status = ?decided.status,
            category_id = ?decided.category_id,
            "rsvp decided"
        );
        self.notifier.dispatch(&decided);
        Ok(decided)
    }

    /// The explicit category wins, then the one the RSVP already has.
    /// Nothing is ever assigned implicitly; the side's default category is
    /// only named in the error as a suggestion.
    async fn approval_category(
        &self,
        decided_by: Uuid,
        rsvp: &Rsvp,
        requested: Option<Uuid>,
    ) -> Result<GuestCategory, AppError> {
        if let Some(id) = requested {
            let category = self.registry.get(id).await?;
            if category.couple_id != decided_by {
                return Err(AppError::Forbidden);
            }
            return Ok(category);
        }
        if let Some(id) = rsvp.category_id {
            return self.registry.get(id).await;
        }

        let suggested = match rsvp.requested_side {
            Some(side) => match self.registry.resolve_default_for_side(side).await {
                Ok(category) => Some(category),
                Err(AppError::NotFound(_)) => None,
                Err(e) => return Err(e),
            },
            None => None,
        };
        Err(missing_category(suggested.as_ref()))
    }

    /// Capacity re-check and approval as one unit under the category lock.
    async fn approve_into(
        &self,
        rsvp: &Rsvp,
        category_id: Uuid,
    ) -> Result<Option<Rsvp>, AppError> {
        let _guard = self.registry.lock(category_id).await;

        let category = self.registry.get(category_id).await?;
        let approved = self.registry.approved_guest_aggregate(category.id).await?;
        if !admission::fits(&category, approved, rsvp.guests) {
            let remaining = admission::remaining(&category, approved).max(0);
            return Err(AppError::Conflict(format!(
                "{} has {remaining} seat(s) left but this RSVP needs {}",
                category.name, rsvp.guests
            )));
        }

        self.store
            .transition_rsvp(rsvp.id, RsvpStatus::Approved, Some(category.id))
            .await
    }

    pub async fn list(&self, filter: RsvpFilter) -> Result<Vec<Rsvp>, AppError> {
        self.store.list_rsvps(filter).await
    }

    pub async fn list_for_category(
        &self,
        couple_id: Uuid,
        category_id: Uuid,
    ) -> Result<Vec<Rsvp>, AppError> {
        let category = self.registry.get(category_id).await?;
        if category.couple_id != couple_id {
            return Err(AppError::Forbidden);
        }
        self.store.list_rsvps_by_category(category.id).await
    }

    /// Administrative removal. An approved RSVP's seats are freed with it.
    pub async fn remove(&self, rsvp_id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_rsvp(rsvp_id).await? {
            return Err(AppError::NotFound("RSVP not found".into()));
        }
        tracing::info!(%rsvp_id, "rsvp removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::category::CreateCategoryRequest;
    use crate::models::couple::NewCouple;
    use crate::notify::{Mailer, Notice, RecordingMailer, Sent};
    use crate::store::MemoryStore;
    use tokio::sync::mpsc::UnboundedReceiver;

    struct Fixture {
        lifecycle: RsvpLifecycle,
        registry: CategoryRegistry,
        store: Store,
        outbox: UnboundedReceiver<Sent>,
        couple_id: Uuid,
        category: GuestCategory,
    }

    impl Fixture {
        async fn new(max_guests: i32, already_approved: i32) -> Self {
            let (mailer, outbox) = RecordingMailer::new();
            Self::with_mailer(max_guests, already_approved, mailer, outbox).await
        }

        async fn with_mailer(
            max_guests: i32,
            already_approved: i32,
            mailer: RecordingMailer,
            outbox: UnboundedReceiver<Sent>,
        ) -> Self {
            let store = Store::Memory(MemoryStore::new());
            let couple = store
                .create_couple(&NewCouple {
                    name: "Diamond".into(),
                    email: "bride@example.com".into(),
                    side: Side::Bride,
                })
                .await
                .unwrap();
            let registry = CategoryRegistry::new(store.clone());
            let category = registry
                .create_category(couple.id, Side::Bride, category_request("Bride's Family", max_guests))
                .await
                .unwrap();

            if already_approved > 0 {
                store
                    .insert_rsvp(&NewRsvp {
                        guest_name: "Early Bird".into(),
                        email: "early@example.com".into(),
                        phone: "555-0000".into(),
                        guests: already_approved,
                        status: RsvpStatus::Approved,
                        category_id: Some(category.id),
                        requested_side: Some(Side::Bride),
                    })
                    .await
                    .unwrap();
            }

            let invitations = InvitationResolver::new(registry.clone());
            let lifecycle = RsvpLifecycle::new(
                store.clone(),
                registry.clone(),
                invitations,
                Notifier::new(Mailer::Recording(mailer)),
            );

            Self {
                lifecycle,
                registry,
                store,
                outbox,
                couple_id: couple.id,
                category,
            }
        }

        fn token(&self) -> Option<String> {
            Some(self.category.invitation_token.to_string())
        }

        async fn aggregate(&self) -> i64 {
            self.registry
                .approved_guest_aggregate(self.category.id)
                .await
                .unwrap()
        }

        async fn next_notice(&mut self) -> Sent {
            self.outbox.recv().await.unwrap()
        }

        async fn add_category(&self, name: &str, max_guests: i32) -> GuestCategory {
            self.registry
                .create_category(self.couple_id, Side::Bride, category_request(name, max_guests))
                .await
                .unwrap()
        }
    }

    fn category_request(name: &str, max_guests: i32) -> CreateCategoryRequest {
        CreateCategoryRequest {
            name: name.into(),
            side: None,
            max_guests,
            invitation_token: None,
            is_default: false,
        }
    }

    fn request(n: u32, guests: i32, token: Option<String>, side: Option<&str>) -> SubmitRsvpRequest {
        SubmitRsvpRequest {
            name: format!("Guest {n}"),
            email: format!("guest{n}@example.com"),
            phone: format!("555-1{n:03}"),
            guests,
            token,
            selected_side: side.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn token_submission_within_quota_is_approved() {
        let mut fx = Fixture::new(10, 8).await;

        let rsvp = fx.lifecycle.submit(request(1, 2, fx.token(), None)).await.unwrap();

        assert_eq!(rsvp.status, RsvpStatus::Approved);
        assert_eq!(rsvp.category_id, Some(fx.category.id));
        assert_eq!(fx.aggregate().await, 10);

        let (to, notice) = fx.next_notice().await;
        assert_eq!(to, "guest1@example.com");
        assert!(matches!(notice, Notice::Confirmed { pass, .. } if pass.rsvp_id == rsvp.id));
    }

    #[tokio::test]
    async fn token_submission_over_quota_is_pending_in_category() {
        let mut fx = Fixture::new(10, 8).await;

        let rsvp = fx.lifecycle.submit(request(1, 3, fx.token(), None)).await.unwrap();

        assert_eq!(rsvp.status, RsvpStatus::Pending);
        assert_eq!(rsvp.category_id, Some(fx.category.id));
        assert_eq!(fx.aggregate().await, 8);
        assert_eq!(fx.next_notice().await.1.kind(), "received");
    }

    #[tokio::test]
    async fn website_submission_is_pending_without_category() {
        let fx = Fixture::new(10, 0).await;

        for (n, guests) in [(1, 1), (2, 500)] {
            let rsvp = fx
                .lifecycle
                .submit(request(n, guests, None, Some("BRIDE")))
                .await
                .unwrap();
            assert_eq!(rsvp.status, RsvpStatus::Pending);
            assert_eq!(rsvp.category_id, None);
            assert_eq!(rsvp.requested_side, Some(Side::Bride));
        }
        assert_eq!(fx.aggregate().await, 0);
    }

    #[tokio::test]
    async fn unknown_token_creates_nothing() {
        let fx = Fixture::new(10, 0).await;

        let err = fx
            .lifecycle
            .submit(request(1, 1, Some(Uuid::new_v4().to_string()), None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(fx.store.list_rsvps(RsvpFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn submission_needs_token_or_side_and_valid_fields() {
        let fx = Fixture::new(10, 0).await;

        for bad in [
            request(1, 1, None, None),
            request(1, 1, Some("garbage".into()), None),
            request(1, 1, None, Some("BEST_MAN")),
            request(1, 0, None, Some("GROOM")),
            SubmitRsvpRequest {
                name: "  ".into(),
                ..request(1, 1, None, Some("GROOM"))
            },
        ] {
            let err = fx.lifecycle.submit(bad).await.unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)), "got {err}");
        }
    }

    #[tokio::test]
    async fn duplicate_email_or_phone_conflicts() {
        let fx = Fixture::new(10, 0).await;
        fx.lifecycle
            .submit(request(1, 1, None, Some("BRIDE")))
            .await
            .unwrap();

        let same_email = SubmitRsvpRequest {
            phone: "555-9999".into(),
            ..request(1, 1, fx.token(), None)
        };
        let same_phone = SubmitRsvpRequest {
            email: "other@example.com".into(),
            ..request(1, 1, None, Some("GROOM"))
        };

        for dup in [same_email, same_phone] {
            let err = fx.lifecycle.submit(dup).await.unwrap_err();
            assert!(matches!(err, AppError::Conflict(_)));
        }
        assert_eq!(fx.store.list_rsvps(RsvpFilter::default()).await.unwrap().len(), 1);
        assert_eq!(fx.aggregate().await, 0);
    }

    #[tokio::test]
    async fn approve_without_category_fails_and_leaves_rsvp_pending() {
        let fx = Fixture::new(10, 0).await;
        let rsvp = fx
            .lifecycle
            .submit(request(1, 2, None, Some("BRIDE")))
            .await
            .unwrap();

        let err = fx
            .lifecycle
            .decide(fx.couple_id, rsvp.id, Decision::Approve { category_id: None })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        let stored = fx.store.get_rsvp(rsvp.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RsvpStatus::Pending);
        assert_eq!(stored.category_id, None);
    }

    #[tokio::test]
    async fn approve_into_full_category_is_refused() {
        let fx = Fixture::new(10, 10).await;
        let rsvp = fx
            .lifecycle
            .submit(request(1, 1, None, Some("BRIDE")))
            .await
            .unwrap();

        let err = fx
            .lifecycle
            .decide(
                fx.couple_id,
                rsvp.id,
                Decision::Approve {
                    category_id: Some(fx.category.id),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        let stored = fx.store.get_rsvp(rsvp.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RsvpStatus::Pending);
        assert_eq!(stored.category_id, None);
        assert_eq!(fx.aggregate().await, 10);
    }

    #[tokio::test]
    async fn over_quota_pending_cannot_be_approved_in_place() {
        let fx = Fixture::new(10, 8).await;
        let rsvp = fx.lifecycle.submit(request(1, 3, fx.token(), None)).await.unwrap();
        assert_eq!(rsvp.status, RsvpStatus::Pending);

        let err = fx
            .lifecycle
            .decide(fx.couple_id, rsvp.id, Decision::Approve { category_id: None })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Moving it to a roomier category works.
        let overflow = fx.add_category("Overflow", 5).await;
        let approved = fx
            .lifecycle
            .decide(
                fx.couple_id,
                rsvp.id,
                Decision::Approve {
                    category_id: Some(overflow.id),
                },
            )
            .await
            .unwrap();
        assert_eq!(approved.status, RsvpStatus::Approved);
        assert_eq!(approved.category_id, Some(overflow.id));
        assert_eq!(fx.aggregate().await, 8);
    }

    #[tokio::test]
    async fn approve_assigns_category_and_sends_pass() {
        let mut fx = Fixture::new(10, 0).await;
        let rsvp = fx
            .lifecycle
            .submit(request(1, 4, None, Some("BRIDE")))
            .await
            .unwrap();
        fx.next_notice().await;

        let approved = fx
            .lifecycle
            .decide(
                fx.couple_id,
                rsvp.id,
                Decision::Approve {
                    category_id: Some(fx.category.id),
                },
            )
            .await
            .unwrap();

        assert_eq!(approved.status, RsvpStatus::Approved);
        assert_eq!(approved.category_id, Some(fx.category.id));
        assert!(approved.decided_at.is_some());
        assert_eq!(fx.aggregate().await, 4);

        let (_, notice) = fx.next_notice().await;
        match notice {
            Notice::Confirmed { pass, guests, .. } => {
                assert_eq!(guests, 4);
                assert_eq!(pass.rsvp_id, rsvp.id);
                assert_eq!(pass.phone, rsvp.phone);
            }
            other => panic!("expected confirmation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn default_category_is_suggested_but_never_assigned() {
        let fx = Fixture::new(10, 0).await;
        fx.registry
            .create_category(
                fx.couple_id,
                Side::Bride,
                CreateCategoryRequest {
                    is_default: true,
                    ..category_request("Bride's Guests", 20)
                },
            )
            .await
            .unwrap();
        let rsvp = fx
            .lifecycle
            .submit(request(1, 2, None, Some("BRIDE")))
            .await
            .unwrap();

        let err = fx
            .lifecycle
            .decide(fx.couple_id, rsvp.id, Decision::Approve { category_id: None })
            .await
            .unwrap_err();

        match err {
            AppError::BadRequest(message) => assert!(message.contains("Bride's Guests")),
            other => panic!("expected BadRequest, got {other:?}"),
        }
        let stored = fx.store.get_rsvp(rsvp.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RsvpStatus::Pending);
        assert_eq!(stored.category_id, None);
        assert_eq!(stored.decided_at, None);
    }

    #[tokio::test]
    async fn explicit_category_must_belong_to_the_deciding_couple() {
        let fx = Fixture::new(10, 0).await;
        let groom = fx
            .store
            .create_couple(&NewCouple {
                name: "Onyx".into(),
                email: "groom@example.com".into(),
                side: Side::Groom,
            })
            .await
            .unwrap();
        let rsvp = fx
            .lifecycle
            .submit(request(1, 2, None, Some("GROOM")))
            .await
            .unwrap();

        let err = fx
            .lifecycle
            .decide(
                groom.id,
                rsvp.id,
                Decision::Approve {
                    category_id: Some(fx.category.id),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden));
        let stored = fx.store.get_rsvp(rsvp.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RsvpStatus::Pending);
        assert_eq!(fx.aggregate().await, 0);
    }

    #[tokio::test]
    async fn decided_rsvps_are_terminal() {
        let mut fx = Fixture::new(10, 0).await;
        let rsvp = fx
            .lifecycle
            .submit(request(1, 1, None, Some("GROOM")))
            .await
            .unwrap();
        fx.next_notice().await;

        let rejected = fx
            .lifecycle
            .decide(fx.couple_id, rsvp.id, Decision::Reject)
            .await
            .unwrap();
        assert_eq!(rejected.status, RsvpStatus::Rejected);
        assert_eq!(fx.next_notice().await.1.kind(), "rejected");

        let err = fx
            .lifecycle
            .decide(
                fx.couple_id,
                rsvp.id,
                Decision::Approve {
                    category_id: Some(fx.category.id),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(fx.aggregate().await, 0);
    }

    #[tokio::test]
    async fn decide_unknown_rsvp_is_not_found() {
        let fx = Fixture::new(10, 0).await;
        let err = fx
            .lifecycle
            .decide(fx.couple_id, Uuid::new_v4(), Decision::Reject)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_submissions_never_overbook() {
        let fx = Fixture::new(10, 8).await;

        let handles: Vec<_> = (0..16)
            .map(|n| {
                let lifecycle = fx.lifecycle.clone();
                let token = fx.token();
                tokio::spawn(async move { lifecycle.submit(request(n, 2, token, None)).await })
            })
            .collect();

        let mut approved = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().status == RsvpStatus::Approved {
                approved += 1;
            }
        }

        assert_eq!(approved, 1);
        assert_eq!(fx.aggregate().await, 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_approvals_never_overbook() {
        let fx = Fixture::new(10, 6).await;
        let mut ids = Vec::new();
        for n in 0..6 {
            let rsvp = fx
                .lifecycle
                .submit(request(n, 2, None, Some("BRIDE")))
                .await
                .unwrap();
            ids.push(rsvp.id);
        }

        let handles: Vec<_> = ids
            .into_iter()
            .map(|id| {
                let lifecycle = fx.lifecycle.clone();
                let couple_id = fx.couple_id;
                let category_id = Some(fx.category.id);
                tokio::spawn(async move {
                    lifecycle
                        .decide(couple_id, id, Decision::Approve { category_id })
                        .await
                })
            })
            .collect();

        let mut approved = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => approved += 1,
                Err(e) => assert!(matches!(e, AppError::Conflict(_))),
            }
        }

        assert_eq!(approved, 2);
        assert_eq!(fx.aggregate().await, 10);
    }

    #[tokio::test]
    async fn notification_failure_keeps_the_rsvp() {
        let (mailer, outbox) = RecordingMailer::failing();
        let mut fx = Fixture::with_mailer(10, 0, mailer, outbox).await;

        let rsvp = fx.lifecycle.submit(request(1, 2, fx.token(), None)).await.unwrap();
        fx.next_notice().await;

        let stored = fx.store.get_rsvp(rsvp.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RsvpStatus::Approved);
    }

    #[tokio::test]
    async fn removing_an_approved_rsvp_frees_its_seats() {
        let fx = Fixture::new(10, 0).await;
        let rsvp = fx.lifecycle.submit(request(1, 6, fx.token(), None)).await.unwrap();
        assert_eq!(fx.aggregate().await, 6);

        fx.lifecycle.remove(rsvp.id).await.unwrap();
        assert_eq!(fx.aggregate().await, 0);
        assert!(matches!(
            fx.lifecycle.remove(rsvp.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn category_listing_is_owner_only() {
        let fx = Fixture::new(10, 3).await;

        let rsvps = fx
            .lifecycle
            .list_for_category(fx.couple_id, fx.category.id)
            .await
            .unwrap();
        assert_eq!(rsvps.len(), 1);

        let err = fx
            .lifecycle
            .list_for_category(Uuid::new_v4(), fx.category.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }
}
