//! Seed the permission matrix and demo accounts.

use clap::Args;
use tracing::info;

use warden_auth::PasswordHasher;
use warden_core::error::AppError;
use warden_core::result::AppResult;
use warden_database::{CredentialStore, PgStore};
use warden_entity::user::{CreateUser, UserRole};

use crate::output;

/// Accounts created by `seed --with-users` and by `serve --memory`.
const DEMO_USERS: &[(&str, &str, &str, UserRole)] = &[
    ("admin@example.com", "admin", "admin123", UserRole::Admin),
    ("user@example.com", "user", "user123", UserRole::User),
];

/// Arguments for the seed command
#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Also create the demo admin and user accounts
    #[arg(long)]
    pub with_users: bool,
}

/// Execute the seed command
pub async fn execute(args: &SeedArgs, env: &str) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let pool = super::connect(&config).await?;

    warden_database::seed::seed_permissions(pool.pool()).await?;
    output::print_success("Permission matrix seeded.");

    if args.with_users {
        let store = PgStore::new(pool.pool().clone());
        let created = seed_demo_users(&store, &PasswordHasher::new()).await?;
        output::print_kv("Demo users created", &created.to_string());
    }

    pool.close().await;
    Ok(())
}

/// Create the demo accounts that do not exist yet. Returns how many were created.
pub async fn seed_demo_users(
    store: &dyn CredentialStore,
    hasher: &PasswordHasher,
) -> AppResult<usize> {
    let mut created = 0;
    for (email, username, password, role) in DEMO_USERS {
        if store.find_user_by_email(email).await?.is_some() {
            continue;
        }
        let user = store
            .create_user(&CreateUser {
                email: email.to_string(),
                username: username.to_string(),
                password_hash: Some(hasher.hash_password(password)?),
                full_name: None,
                role: *role,
            })
            .await?;
        info!(user_id = %user.id, role = %user.role, "Demo user created");
        created += 1;
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use warden_database::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_demo_users_are_created_once() {
        let store = MemoryStore::new();
        let hasher = PasswordHasher::new();

        assert_eq!(seed_demo_users(&store, &hasher).await.unwrap(), 2);
        assert_eq!(seed_demo_users(&store, &hasher).await.unwrap(), 0);

        let admin = store
            .find_user_by_email("admin@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, UserRole::Admin);
        let hash = admin.password_hash.unwrap();
        assert!(hasher.verify_password("admin123", &hash).unwrap());
    }
}
