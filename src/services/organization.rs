//! Organization services - Gestione organizzazioni, codici di invito e manager

use crate::core::{AppError, AppState};
use crate::dtos::{
    CreateOrganizationDTO, InvitationCodePath, OrganizationDetailDTO, OrganizationSearchQuery,
    OrganizationSummaryDTO, UpdateOrganizationDTO, UserDTO,
};
use crate::entities::Organization;
use crate::repositories::{
    CourseRepository, NewOrganization, OrganizationDetails, OrganizationRepository, Read,
    UserRepository,
};
use crate::services::membership;
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::MySqlConnection;
use axum_macros::debug_handler;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Tentativi prima di arrendersi nella generazione di un codice univoco
const MAX_CODE_ATTEMPTS: usize = 10;

const INVITATION_CODE_CONSTRAINT: &str = "uq_organizations_invitation_code";

/// Violazione del vincolo di unicità sul codice di invito
fn is_code_collision(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation() && db_err.message().contains(INVITATION_CODE_CONSTRAINT)
    )
}

fn no_unique_code() -> AppError {
    warn!("No unique invitation code after {} attempts", MAX_CODE_ATTEMPTS);
    AppError::internal_server_error("Unable to generate a unique invitation code")
}

/// Inserisce l'organizzazione provando i codici di `codes` finché uno non è libero.
/// L'unicità la decide il vincolo del database dentro la stessa transazione.
pub async fn insert_with_fresh_code<I>(
    conn: &mut MySqlConnection,
    data: &mut NewOrganization,
    codes: I,
) -> Result<Organization, AppError>
where
    I: IntoIterator<Item = String>,
{
    for (attempt, code) in codes.into_iter().take(MAX_CODE_ATTEMPTS).enumerate() {
        data.invitation_code = code;
        match OrganizationRepository::insert(&mut *conn, data).await {
            Ok(organization) => return Ok(organization),
            Err(err) if is_code_collision(&err) => {
                debug!("Invitation code collision on attempt {}", attempt + 1);
            }
            Err(err) => return Err(err.into()),
        }
    }
    Err(no_unique_code())
}

#[instrument(skip(state, params))]
pub async fn list_organizations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OrganizationSearchQuery>, // /organizations?search=alpha
) -> Result<Json<Vec<OrganizationSummaryDTO>>, AppError> {
    debug!("Listing organizations");
    let organizations = state.organization.list(params.search.as_deref()).await?;
    info!("Found {} organizations", organizations.len());
    Ok(Json(organizations))
}

#[instrument(skip(state), fields(organization_id = %organization_id))]
pub async fn get_organization(
    State(state): State<Arc<AppState>>,
    Path(organization_id): Path<String>,
) -> Result<Json<OrganizationDetailDTO>, AppError> {
    debug!("Fetching organization detail");
    let organization = state
        .organization
        .read(&organization_id)
        .await?
        .ok_or_else(|| AppError::not_found("Organization not found"))?;

    let manager = async {
        match organization.manager_id.as_deref() {
            Some(manager_id) => state.user.read(manager_id).await,
            None => Ok(None),
        }
    };
    let (manager, members, courses) = futures::try_join!(
        manager,
        state.user.find_by_organization(&organization_id),
        state.course.of_organization(&organization_id),
    )?;

    Ok(Json(OrganizationDetailDTO {
        organization,
        manager: manager.map(UserDTO::from),
        members,
        courses,
    }))
}

#[instrument(skip(state, path), fields(code = %path.code))]
pub async fn get_organization_by_code(
    State(state): State<Arc<AppState>>,
    Path(path): Path<InvitationCodePath>,
) -> Result<Json<Organization>, AppError> {
    path.validate()?;

    let organization = state
        .organization
        .find_by_invitation_code(&path.code)
        .await?
        .ok_or_else(|| {
            warn!("No organization with invitation code");
            AppError::not_found("Organization not found")
        })?;

    Ok(Json(organization))
}

#[instrument(skip(state, body), fields(name = %body.name))]
pub async fn create_organization(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateOrganizationDTO>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validare il DTO
    // 2. In una transazione: inserire l'organizzazione con un codice di invito libero
    //    (nuovo codice a ogni collisione) e, se richiesto, assegnare il manager
    // 3. Ritornare l'organizzazione creata con StatusCode::CREATED
    body.validate()?;

    let mut data = NewOrganization {
        id: Organization::new_id(),
        name: body.name.trim().to_string(),
        description: body.description,
        invitation_code: String::new(),
        registered_at: Utc::now().naive_utc(),
    };

    let mut tx = state.begin().await?;
    insert_with_fresh_code(
        &mut tx,
        &mut data,
        std::iter::repeat_with(Organization::generate_invitation_code),
    )
    .await?;
    if let Some(ref manager_id) = body.manager_id {
        membership::assign_manager(&mut tx, &data.id, manager_id).await?;
    }
    tx.commit().await?;

    let organization = state
        .organization
        .read(&data.id)
        .await?
        .ok_or_else(|| AppError::internal_server_error("Organization vanished after insert"))?;

    info!("Organization {} created", organization.id);
    Ok((StatusCode::CREATED, Json(organization)))
}

#[instrument(skip(state, body), fields(organization_id = %organization_id))]
#[debug_handler]
pub async fn update_organization(
    State(state): State<Arc<AppState>>,
    Path(organization_id): Path<String>,
    Json(body): Json<UpdateOrganizationDTO>,
) -> Result<Json<Organization>, AppError> {
    body.validate()?;

    let mut tx = state.begin().await?;
    let current = OrganizationRepository::read_for_update(&mut tx, &organization_id)
        .await?
        .ok_or_else(|| AppError::not_found("Organization not found"))?;

    let details = OrganizationDetails {
        name: body.name.map(|n| n.trim().to_string()),
        description: body.description,
    };
    OrganizationRepository::apply_details(&mut tx, &organization_id, &details).await?;

    match body.manager_id {
        Some(Some(ref manager_id)) if !current.is_managed_by(manager_id) => {
            membership::assign_manager(&mut tx, &organization_id, manager_id).await?;
        }
        Some(None) => {
            membership::clear_manager(&mut tx, &organization_id).await?;
        }
        _ => {}
    }
    tx.commit().await?;

    let organization = state
        .organization
        .read(&organization_id)
        .await?
        .ok_or_else(|| AppError::not_found("Organization not found"))?;

    info!("Organization updated");
    Ok(Json(organization))
}

#[instrument(skip(state), fields(organization_id = %organization_id))]
pub async fn regenerate_invitation_code(
    State(state): State<Arc<AppState>>,
    Path(organization_id): Path<String>,
) -> Result<Json<Organization>, AppError> {
    let mut updated = false;
    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let code = Organization::generate_invitation_code();
        match state
            .organization
            .set_invitation_code(&organization_id, &code)
            .await
        {
            Ok(()) => {
                updated = true;
                break;
            }
            Err(err) if is_code_collision(&err) => {
                debug!("Invitation code collision on attempt {}", attempt);
            }
            Err(err) => return Err(err.into()),
        }
    }
    if !updated {
        return Err(no_unique_code());
    }

    let organization = state
        .organization
        .read(&organization_id)
        .await?
        .ok_or_else(|| AppError::not_found("Organization not found"))?;

    info!("Invitation code regenerated");
    Ok(Json(organization))
}

#[instrument(skip(state), fields(organization_id = %organization_id))]
pub async fn delete_organization(
    State(state): State<Arc<AppState>>,
    Path(organization_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // Tutto in una transazione: manager retrocesso, membri e corsi staccati, poi la delete
    let mut tx = state.begin().await?;

    membership::clear_manager(&mut tx, &organization_id).await?;
    let members = UserRepository::detach_from_organization(&mut tx, &organization_id).await?;
    let courses = CourseRepository::detach_organization(&mut tx, &organization_id).await?;
    OrganizationRepository::delete_row(&mut tx, &organization_id).await?;

    tx.commit().await?;

    info!(
        "Organization deleted, detached {} members and {} courses",
        members, courses
    );
    Ok(StatusCode::NO_CONTENT)
}
