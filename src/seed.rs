use crate::config::Config;
use crate::error::AppError;
use crate::models::category::CreateCategoryRequest;
use crate::models::couple::{Couple, NewCouple, Side};
use crate::registry::CategoryRegistry;
use crate::store::Store;

/// Starter categories per side: (label, quota). A zero quota marks the
/// side's default category.
const STARTER_CATEGORIES: &[(&str, i32)] = &[("Family", 100), ("Friends", 50)];

pub struct Seeded {
    pub bride: Couple,
    pub groom: Couple,
}

/// Creates both couple accounts and their starter categories. Anything that
/// already exists is left alone, so this is safe to run repeatedly.
pub async fn run(
    store: &Store,
    registry: &CategoryRegistry,
    config: &Config,
) -> Result<Seeded, AppError> {
    tracing::info!("seeding database");

    let bride = seed_couple(store, &config.bride_name, &config.bride_email, Side::Bride).await?;
    let groom = seed_couple(store, &config.groom_name, &config.groom_email, Side::Groom).await?;

    for couple in [&bride, &groom] {
        let prefix = match couple.side {
            Side::Bride => "Bride's",
            Side::Groom => "Groom's",
        };
        for &(label, max_guests) in STARTER_CATEGORIES {
            let name = format!("{prefix} {label}");
            if store.get_category_by_name(&name).await?.is_some() {
                tracing::info!(%name, "category already exists, skipping");
                continue;
            }
            registry
                .create_category(
                    couple.id,
                    couple.side,
                    CreateCategoryRequest {
                        name,
                        side: Some(couple.side),
                        max_guests,
                        invitation_token: None,
                        is_default: max_guests == 0,
                    },
                )
                .await?;
        }
    }

    tracing::info!("seeding complete");
    Ok(Seeded { bride, groom })
}

async fn seed_couple(
    store: &Store,
    name: &str,
    email: &str,
    side: Side,
) -> Result<Couple, AppError> {
    if let Some(existing) = store.get_couple_by_email(email).await? {
        tracing::info!(%name, "couple already exists, skipping");
        return Ok(existing);
    }

    tracing::info!(%name, %side, "creating couple");
    store
        .create_couple(&NewCouple {
            name: name.to_string(),
            email: email.to_string(),
            side,
        })
        .await
}
