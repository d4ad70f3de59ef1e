//! User services - Gestione utenti dal pannello admin

use crate::core::{AppError, AppState};
use crate::dtos::{
    CreateUserDTO, Page, UpdateUserDTO, UserDTO, UserDetailDTO, UserSearchQuery, UserSummaryDTO,
};
use crate::entities::{User, UserRole};
use crate::repositories::{
    CourseRepository, ExamScoreRepository, FeedbackRepository, NewUser, OrganizationRepository,
    Read, UserChanges, UserRepository,
};
use crate::services::membership::{self, Release};
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_macros::debug_handler;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state, params))]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserSearchQuery>, // /users?search=anna&role=manager&page=2
) -> Result<Json<Page<UserSummaryDTO>>, AppError> {
    debug!("Searching users");
    let (users, total) = state.user.search(&params).await?;
    info!("Found {} users ({} total)", users.len(), total);
    Ok(Json(Page::new(users, total, &params.page_request())))
}

#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>, // parametro dalla URL /users/{user_id}
) -> Result<Json<UserDetailDTO>, AppError> {
    debug!("Fetching user detail");
    let user = state.user.read(&user_id).await?.ok_or_else(|| {
        warn!("User not found");
        AppError::not_found("User not found")
    })?;

    let organization = async {
        match user.organization_id.as_deref() {
            Some(organization_id) => state.organization.read(organization_id).await,
            None => Ok(None),
        }
    };

    // query indipendenti, eseguite in parallelo
    let (organization, managed_organizations, feedbacks, exam_scores, courses) = futures::try_join!(
        organization,
        state.organization.managed_by(&user_id),
        state.feedback.for_user(&user_id),
        state.exam.for_user(&user_id),
        state.course.owned_by(&user_id),
    )?;

    Ok(Json(UserDetailDTO {
        user: UserDTO::from(user),
        organization,
        managed_organizations,
        feedbacks,
        exam_scores,
        courses,
    }))
}

#[instrument(skip(state, body), fields(username = %body.username, email = %body.email))]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserDTO>, // JSON body
) -> Result<impl IntoResponse, AppError> {
    // 1. Validare il DTO con validator (username, email, lunghezza password)
    // 2. Un manager deve appartenere a un'organizzazione esistente
    // 3. L'email deve essere univoca, altrimenti CONFLICT
    // 4. Generare l'hash della password
    // 5. In una transazione: inserire l'utente e, se manager, prendere la gestione
    //    dell'organizzazione quando non ne ha già una
    body.validate()?;

    let role = body.role.unwrap_or_default();
    if role == UserRole::Manager && body.organization_id.is_none() {
        return Err(AppError::bad_request("A manager must belong to an organization"));
    }

    if state.user.email_taken(&body.email, None).await? {
        warn!("Email already registered");
        return Err(AppError::conflict("Email already registered"));
    }

    if let Some(ref organization_id) = body.organization_id {
        if state.organization.read(organization_id).await?.is_none() {
            return Err(AppError::bad_request("Organization not found"));
        }
    }

    let password_hash = User::hash_password(&body.password)?;
    let data = NewUser::now(
        body.username.trim().to_string(),
        body.email.trim().to_string(),
        Some(password_hash),
        role,
        body.organization_id,
    );

    let manages = match (role, data.organization_id.as_deref()) {
        (UserRole::Manager, Some(organization_id)) => Some(organization_id),
        _ => None,
    };

    let mut tx = state.begin().await?;
    if let Some(organization_id) = manages {
        OrganizationRepository::read_for_update(&mut tx, organization_id).await?;
    }
    let created = UserRepository::insert(&mut tx, &data).await?;
    if let Some(organization_id) = manages {
        membership::claim_if_unmanaged(&mut tx, organization_id, &created.id).await?;
    }
    tx.commit().await?;

    info!("User {} created with role {}", created.id, created.role);
    Ok((StatusCode::CREATED, Json(UserDTO::from(created))))
}

#[instrument(skip(state, current_user, body), fields(user_id = %user_id, admin_id = %current_user.id))]
#[debug_handler]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>, // ottenuto dall'autenticazione tramite token jwt
    Path(user_id): Path<String>,
    Json(body): Json<UpdateUserDTO>,
) -> Result<Json<UserDTO>, AppError> {
    // 1. Validare il DTO e, se cambia, l'unicità dell'email (prima di aprire la transazione)
    // 2. Bloccare le organizzazioni coinvolte (gestite, attuale, nuova) e poi l'utente
    // 3. Controllare i vincoli su ruolo e organizzazione
    // 4. Liberare le organizzazioni che l'utente non può più gestire, applicare le
    //    modifiche e, se manager, prendere la gestione dell'organizzazione libera
    body.validate()?;

    if let Some(ref email) = body.email {
        if state.user.email_taken(email, Some(&user_id)).await? {
            warn!("Email already registered to another user");
            return Err(AppError::conflict("Email already registered"));
        }
    }

    let mut tx = state.begin().await?;

    let stored_organization = UserRepository::organization_of(&mut tx, &user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let requested_organization = body.organization_id.as_ref().and_then(|o| o.as_deref());
    let involved: Vec<&str> = stored_organization
        .as_deref()
        .into_iter()
        .chain(requested_organization)
        .collect();
    OrganizationRepository::lock_for_user(&mut tx, &user_id, &involved).await?;

    let current = UserRepository::read_for_update(&mut tx, &user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let new_role = body.role.unwrap_or(current.role);
    let new_organization = match body.organization_id {
        Some(organization_id) => organization_id,
        None => current.organization_id.clone(),
    };

    if current.id == current_user.id && new_role != UserRole::Admin {
        return Err(AppError::bad_request("You cannot remove your own admin role"));
    }

    if new_role == UserRole::Manager && new_organization.is_none() {
        return Err(AppError::bad_request("A manager must belong to an organization"));
    }

    if let Some(organization_id) = new_organization.as_deref() {
        if current.organization_id.as_deref() != Some(organization_id)
            && OrganizationRepository::read_for_update(&mut tx, organization_id)
                .await?
                .is_none()
        {
            return Err(AppError::bad_request("Organization not found"));
        }
    }

    let release = membership::release_for_change(
        current.role,
        current.organization_id.as_deref(),
        new_role,
        new_organization.as_deref(),
    );
    if release != Release::Nothing {
        debug!("Releasing managed organizations: {:?}", release);
    }
    membership::apply_release(&mut tx, &user_id, &release).await?;

    let password_hash = body
        .password
        .as_deref()
        .map(User::hash_password)
        .transpose()?;

    let changes = UserChanges {
        username: body
            .username
            .map(|u| u.trim().to_string())
            .unwrap_or(current.username),
        email: body
            .email
            .map(|e| e.trim().to_string())
            .unwrap_or(current.email),
        password_hash,
        role: new_role,
        organization_id: new_organization.clone(),
    };
    UserRepository::apply_changes(&mut tx, &user_id, &changes).await?;

    if let (UserRole::Manager, Some(organization_id)) = (new_role, new_organization.as_deref()) {
        membership::claim_if_unmanaged(&mut tx, organization_id, &user_id).await?;
    }

    let updated = UserRepository::read_for_update(&mut tx, &user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    tx.commit().await?;

    info!("User updated");
    Ok(Json(UserDTO::from(updated)))
}

#[instrument(skip(state, current_user), fields(user_id = %user_id, admin_id = %current_user.id))]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Un admin non può cancellare il proprio account
    // 2. In una transazione: cancellare feedback e punteggi, liberare le organizzazioni
    //    gestite, staccare i corsi di cui è owner, infine cancellare l'utente
    if current_user.id == user_id {
        warn!("Admin tried to delete their own account");
        return Err(AppError::bad_request("You cannot delete your own account"));
    }

    let mut tx = state.begin().await?;
    OrganizationRepository::lock_for_user(&mut tx, &user_id, &[]).await?;
    UserRepository::read_for_update(&mut tx, &user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let feedbacks = FeedbackRepository::delete_for_user(&mut tx, &user_id).await?;
    let scores = ExamScoreRepository::delete_for_user(&mut tx, &user_id).await?;
    membership::apply_release(&mut tx, &user_id, &Release::All).await?;
    CourseRepository::detach_owner(&mut tx, &user_id).await?;
    UserRepository::delete_row(&mut tx, &user_id).await?;

    tx.commit().await?;

    info!(
        "User deleted with {} feedbacks and {} exam scores",
        feedbacks, scores
    );
    Ok(StatusCode::NO_CONTENT)
}
