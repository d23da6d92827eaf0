//! Admin account provisioning used by the `seed_admin` binary.

use qcall_admin::{
    auth::{ADMIN_ROLE, NewUser},
    db::{DbResult, UserRepository},
};

/// Admin account to create or update
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Already hashed with [`AuthManager::hash_password`](qcall_admin::AuthManager::hash_password)
    pub password_hash: String,
}

/// What [`seed_admin`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// A new admin was inserted with this id
    Created(String),
    /// The existing admin's password was replaced
    PasswordReset,
    /// An admin with this email exists and `reset` was not requested
    AlreadyExists,
    /// The email belongs to a non-admin account, which was left untouched
    NotAdmin { role: String },
}

/// Create the admin account, or replace its password when `reset` is set.
///
/// Accounts with any other role are never modified.
///
/// # Errors
///
/// * `DbError` - The credential store could not be queried or written
pub async fn seed_admin(
    users: &dyn UserRepository,
    account: AdminAccount,
    reset: bool,
) -> DbResult<SeedOutcome> {
    let Some(existing) = users.find_by_email(&account.email).await? else {
        let id = users
            .insert_user(NewUser {
                first_name: account.first_name,
                last_name: account.last_name,
                email: account.email,
                password_hash: account.password_hash,
                role: ADMIN_ROLE.to_string(),
            })
            .await?;
        return Ok(SeedOutcome::Created(id));
    };

    if existing.role != ADMIN_ROLE {
        return Ok(SeedOutcome::NotAdmin {
            role: existing.role,
        });
    }

    if !reset {
        return Ok(SeedOutcome::AlreadyExists);
    }

    users
        .update_password(&account.email, &account.password_hash)
        .await?;
    Ok(SeedOutcome::PasswordReset)
}
