//! User management CLI commands.

use clap::{Args, Subcommand};
use dialoguer::Password;
use serde::Serialize;
use tabled::Tabled;

use warden_auth::{PasswordHasher, PasswordValidator};
use warden_core::error::AppError;
use warden_core::types::PageRequest;
use warden_database::CredentialStore;
use warden_entity::user::{CreateUser, UpdateUser, User, UserFilter, UserRole};

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List users
    List {
        /// Filter by role (admin or user)
        #[arg(short, long)]
        role: Option<String>,
        /// Email or username substring
        #[arg(short, long)]
        search: Option<String>,
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Page size
        #[arg(long, default_value_t = 50)]
        limit: u64,
    },
    /// Enable a user
    Enable {
        /// Email address
        email: String,
    },
    /// Disable a user and revoke their sessions
    Disable {
        /// Email address
        email: String,
    },
    /// Create a user; the password is prompted for
    Create {
        /// Email address
        email: String,
        /// Username
        username: String,
        /// Role (admin or user)
        #[arg(short, long, default_value = "user")]
        role: String,
        /// Full name
        #[arg(long)]
        full_name: Option<String>,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    /// User ID
    id: String,
    /// Username
    username: String,
    /// Email
    email: String,
    /// Role
    role: String,
    /// Active or disabled
    status: String,
    /// SSO-only accounts have no password
    login: String,
    /// Created at
    created_at: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            username: u.username.clone(),
            email: u.email.clone(),
            role: u.role.to_string(),
            status: if u.is_active { "active" } else { "disabled" }.to_string(),
            login: if u.password_hash.is_some() {
                "password"
            } else {
                "sso"
            }
            .to_string(),
            created_at: u.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute user commands
pub async fn execute(args: &UserArgs, env: &str, format: OutputFormat) -> Result<(), AppError> {
    let config = super::load_config(env)?;
    let store = super::create_store(&config).await?;

    match &args.command {
        UserCommand::List {
            role,
            search,
            page,
            limit,
        } => {
            let filter = UserFilter {
                role: role.as_deref().map(str::parse::<UserRole>).transpose()?,
                is_active: None,
                search: search.clone(),
            };
            let users = store
                .list_users(&filter, &PageRequest::new(*page, *limit))
                .await?;
            let rows: Vec<UserRow> = users.items.iter().map(UserRow::from).collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                output::print_kv(
                    "Page",
                    &format!("{} of {} ({} users)", users.page, users.total_pages, users.total),
                );
            }
        }
        UserCommand::Enable { email } => {
            let user = find_by_email(&store, email).await?;
            set_active(&store, &user, true).await?;
            output::print_success(&format!("User '{}' enabled", user.email));
        }
        UserCommand::Disable { email } => {
            let user = find_by_email(&store, email).await?;
            set_active(&store, &user, false).await?;
            let revoked = store.revoke_all_for_user(user.id).await?;
            output::print_success(&format!(
                "User '{}' disabled, {revoked} refresh token(s) revoked",
                user.email
            ));
        }
        UserCommand::Create {
            email,
            username,
            role,
            full_name,
        } => {
            let role: UserRole = role.parse()?;
            let password = Password::new()
                .with_prompt("Password")
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()
                .map_err(|e| AppError::internal(format!("Input error: {e}")))?;
            PasswordValidator::new(&config.auth).validate(&password)?;

            let user = store
                .create_user(&CreateUser {
                    email: email.trim().to_lowercase(),
                    username: username.clone(),
                    password_hash: Some(PasswordHasher::new().hash_password(&password)?),
                    full_name: full_name.clone(),
                    role,
                })
                .await?;
            output::print_item(&UserRow::from(&user), format);
        }
    }

    Ok(())
}

async fn find_by_email(store: &dyn CredentialStore, email: &str) -> Result<User, AppError> {
    store
        .find_user_by_email(&email.trim().to_lowercase())
        .await?
        .ok_or_else(|| AppError::not_found(format!("User '{email}' not found")))
}

async fn set_active(store: &dyn CredentialStore, user: &User, active: bool) -> Result<(), AppError> {
    store
        .update_user(
            user.id,
            &UpdateUser {
                is_active: Some(active),
                ..UpdateUser::default()
            },
        )
        .await?;
    Ok(())
}
