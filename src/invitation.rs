use uuid::Uuid;

use crate::error::AppError;
use crate::models::category::{GuestCategory, PublicCategoryMeta};
use crate::registry::CategoryRegistry;

pub fn parse_token(raw: &str) -> Result<Uuid, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::BadRequest("Invitation token is required".into()));
    }
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid invitation link.".into()))
}

/// Maps invitation tokens to categories without exposing internal ids.
#[derive(Clone)]
pub struct InvitationResolver {
    registry: CategoryRegistry,
}

impl InvitationResolver {
    pub fn new(registry: CategoryRegistry) -> Self {
        Self { registry }
    }

    pub async fn resolve(&self, raw_token: &str) -> Result<GuestCategory, AppError> {
        let token = parse_token(raw_token)?;
        self.registry.resolve_by_token(token).await
    }

    /// Informational snapshot. Holding it reserves nothing; a later
    /// submission re-evaluates against the live aggregate.
    pub async fn public_meta(&self, raw_token: &str) -> Result<PublicCategoryMeta, AppError> {
        let category = self.resolve(raw_token).await?;
        let remaining_guests = self.registry.remaining_capacity(category.id).await?;

        Ok(PublicCategoryMeta {
            name: category.name,
            side: category.side,
            remaining_guests,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::category::CreateCategoryRequest;
    use crate::models::couple::{NewCouple, Side};
    use crate::store::{MemoryStore, Store};

    async fn resolver_with_category(max_guests: i32) -> (InvitationResolver, GuestCategory) {
        let store = Store::Memory(MemoryStore::new());
        let couple = store
            .create_couple(&NewCouple {
                name: "Babatunde".into(),
                email: "groom@example.com".into(),
                side: Side::Groom,
            })
            .await
            .unwrap();
        let registry = CategoryRegistry::new(store);
        let category = registry
            .create_category(
                couple.id,
                Side::Groom,
                CreateCategoryRequest {
                    name: "Groom's Friends".into(),
                    side: None,
                    max_guests,
                    invitation_token: None,
                    is_default: false,
                },
            )
            .await
            .unwrap();
        (InvitationResolver::new(registry), category)
    }

    #[test]
    fn blank_and_malformed_tokens_are_validation_errors() {
        assert!(matches!(parse_token(""), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_token("not-a-uuid"), Err(AppError::BadRequest(_))));
        assert!(parse_token(&Uuid::new_v4().simple().to_string()).is_ok());
    }

    #[tokio::test]
    async fn unknown_token_is_not_found() {
        let (resolver, _) = resolver_with_category(10).await;
        let err = resolver
            .public_meta(&Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "Invalid invitation link."));
    }

    #[tokio::test]
    async fn meta_is_stable_without_writes() {
        let (resolver, category) = resolver_with_category(50).await;
        let token = category.invitation_token.to_string();

        let first = resolver.public_meta(&token).await.unwrap();
        let second = resolver.public_meta(&token).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.remaining_guests, 50);
        assert_eq!(first.name, "Groom's Friends");
        assert_eq!(first.side, Side::Groom);
    }
}
