//! Membership - Regole su manager e ruoli delle organizzazioni
//!
//! Un'organizzazione ha al più un manager; un utente con ruolo `manager` che non
//! gestisce più nessuna organizzazione torna `user`. Gli admin non vengono mai
//! retrocessi, ma un admin portato a `user` perde le organizzazioni che gestiva.
//! Tutte le funzioni async lavorano su una connessione presa da una transazione già
//! aperta dal chiamante e bloccano le organizzazioni prima degli utenti.

use crate::core::AppError;
use crate::entities::UserRole;
use crate::repositories::{OrganizationRepository, UserRepository};
use sqlx::MySqlConnection;
use tracing::{debug, info, instrument};

/// Ruolo di chi diventa manager di un'organizzazione
pub fn role_after_promotion(role: UserRole) -> UserRole {
    match role {
        UserRole::Admin => UserRole::Admin,
        _ => UserRole::Manager,
    }
}

/// Ruolo di chi perde la gestione di un'organizzazione
pub fn role_after_losing_management(role: UserRole, still_manages_other: bool) -> UserRole {
    match role {
        UserRole::Manager if !still_manages_other => UserRole::User,
        other => other,
    }
}

/// Quali organizzazioni gestite da un utente vanno liberate dopo una modifica
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Release {
    Nothing,
    All,
    AllExcept(String),
}

/// Calcola cosa liberare quando un utente passa da (`role`, `organization`)
/// a (`new_role`, `new_organization`)
pub fn release_for_change(
    role: UserRole,
    organization: Option<&str>,
    new_role: UserRole,
    new_organization: Option<&str>,
) -> Release {
    // un `user` non può restare manager di nulla, qualunque fosse il ruolo di partenza
    if new_role == UserRole::User || (role == UserRole::Manager && new_role != UserRole::Manager) {
        return Release::All;
    }
    if organization != new_organization {
        return match new_organization {
            Some(id) => Release::AllExcept(id.to_string()),
            None => Release::All,
        };
    }
    Release::Nothing
}

pub async fn apply_release(
    conn: &mut MySqlConnection,
    user_id: &str,
    release: &Release,
) -> Result<u64, AppError> {
    let released = match release {
        Release::Nothing => 0,
        Release::All => OrganizationRepository::release_manager(conn, user_id, None).await?,
        Release::AllExcept(keep) => {
            OrganizationRepository::release_manager(conn, user_id, Some(keep.as_str())).await?
        }
    };
    if released > 0 {
        debug!("Released {} organizations managed by {}", released, user_id);
    }
    Ok(released)
}

/// Retrocede `user_id` se è un manager che non gestisce più nulla
#[instrument(skip(conn))]
pub async fn demote_if_unmanaged(conn: &mut MySqlConnection, user_id: &str) -> Result<(), AppError> {
    let still_manages = !OrganizationRepository::managed_ids(conn, user_id, None)
        .await?
        .is_empty();

    let Some(user) = UserRepository::read_for_update(conn, user_id).await? else {
        return Ok(());
    };
    let role = role_after_losing_management(user.role, still_manages);

    if role != user.role {
        UserRepository::set_role(conn, user_id, role).await?;
        info!("User {} demoted from {} to {}", user_id, user.role, role);
    }
    Ok(())
}

/// Rende `user_id` manager di `organization_id`.
///
/// L'utente entra nell'organizzazione, diventa `manager` (se non è admin) e lascia
/// la gestione di altre organizzazioni; il manager precedente viene retrocesso
/// se rimane senza organizzazioni da gestire.
#[instrument(skip(conn))]
pub async fn assign_manager(
    conn: &mut MySqlConnection,
    organization_id: &str,
    user_id: &str,
) -> Result<(), AppError> {
    OrganizationRepository::lock_for_user(conn, user_id, &[organization_id]).await?;
    let organization = OrganizationRepository::read_for_update(conn, organization_id)
        .await?
        .ok_or_else(|| AppError::not_found("Organization not found"))?;

    let previous = organization
        .manager_id
        .as_deref()
        .filter(|p| *p != user_id);
    if let Some(previous) = previous {
        OrganizationRepository::lock_for_user(conn, previous, &[]).await?;
    }

    let user = UserRepository::read_for_update(conn, user_id)
        .await?
        .ok_or_else(|| AppError::bad_request("Manager must be an existing user"))?;

    OrganizationRepository::release_manager(conn, user_id, Some(organization_id)).await?;
    UserRepository::set_role_and_organization(
        conn,
        user_id,
        role_after_promotion(user.role),
        Some(organization_id),
    )
    .await?;
    OrganizationRepository::set_manager(conn, organization_id, Some(user_id)).await?;

    if let Some(previous) = previous {
        demote_if_unmanaged(conn, previous).await?;
    }

    info!("User {} is now manager of {}", user_id, organization_id);
    Ok(())
}

/// Toglie il manager da un'organizzazione, restituisce l'id del manager rimosso
#[instrument(skip(conn))]
pub async fn clear_manager(
    conn: &mut MySqlConnection,
    organization_id: &str,
) -> Result<Option<String>, AppError> {
    let organization = OrganizationRepository::read_for_update(conn, organization_id)
        .await?
        .ok_or_else(|| AppError::not_found("Organization not found"))?;

    let Some(previous) = organization.manager_id else {
        return Ok(None);
    };

    OrganizationRepository::set_manager(conn, organization_id, None).await?;
    demote_if_unmanaged(conn, &previous).await?;

    info!("Organization {} has no manager now", organization_id);
    Ok(Some(previous))
}

/// Se l'organizzazione non ha manager, `user_id` lo diventa
pub async fn claim_if_unmanaged(
    conn: &mut MySqlConnection,
    organization_id: &str,
    user_id: &str,
) -> Result<bool, AppError> {
    let organization = OrganizationRepository::read_for_update(conn, organization_id)
        .await?
        .ok_or_else(|| AppError::bad_request("Organization not found"))?;

    if organization.manager_id.is_some() {
        return Ok(false);
    }

    OrganizationRepository::set_manager(conn, organization_id, Some(user_id)).await?;
    info!("User {} claimed management of {}", user_id, organization_id);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admins_are_never_demoted() {
        assert_eq!(role_after_losing_management(UserRole::Admin, false), UserRole::Admin);
        assert_eq!(role_after_promotion(UserRole::Admin), UserRole::Admin);
    }

    #[test]
    fn test_manager_keeps_role_while_managing_something() {
        assert_eq!(role_after_losing_management(UserRole::Manager, true), UserRole::Manager);
        assert_eq!(role_after_losing_management(UserRole::Manager, false), UserRole::User);
        assert_eq!(role_after_losing_management(UserRole::User, false), UserRole::User);
    }

    #[test]
    fn test_promotion() {
        assert_eq!(role_after_promotion(UserRole::User), UserRole::Manager);
        assert_eq!(role_after_promotion(UserRole::Manager), UserRole::Manager);
    }

    #[test]
    fn test_leaving_manager_role_releases_everything() {
        let release = release_for_change(
            UserRole::Manager,
            Some("org-alpha"),
            UserRole::User,
            Some("org-alpha"),
        );
        assert_eq!(release, Release::All);
    }

    #[test]
    fn test_admin_turned_user_releases_everything() {
        let release = release_for_change(
            UserRole::Admin,
            Some("org-alpha"),
            UserRole::User,
            Some("org-alpha"),
        );
        assert_eq!(release, Release::All);

        let release = release_for_change(UserRole::Admin, None, UserRole::User, None);
        assert_eq!(release, Release::All);
    }

    #[test]
    fn test_moving_organization_keeps_only_the_new_one() {
        let release = release_for_change(
            UserRole::Manager,
            Some("org-alpha"),
            UserRole::Manager,
            Some("org-beta"),
        );
        assert_eq!(release, Release::AllExcept("org-beta".into()));

        let release = release_for_change(UserRole::Admin, Some("org-alpha"), UserRole::Admin, None);
        assert_eq!(release, Release::All);
    }

    #[test]
    fn test_no_change_releases_nothing() {
        let release = release_for_change(
            UserRole::Manager,
            Some("org-alpha"),
            UserRole::Manager,
            Some("org-alpha"),
        );
        assert_eq!(release, Release::Nothing);
        assert_eq!(
            release_for_change(UserRole::User, None, UserRole::Admin, None),
            Release::Nothing
        );
    }
}
