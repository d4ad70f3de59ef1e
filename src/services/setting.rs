//! Setting services - Impostazioni di sistema condivise con l'Engine

use crate::core::{AppError, AppState};
use crate::dtos::{SettingKeyPath, UpdateSettingDTO};
use crate::entities::SystemSetting;
use axum::extract::{Json, Path, State};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

#[instrument(skip(state))]
pub async fn list_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SystemSetting>>, AppError> {
    Ok(Json(state.setting.list().await?))
}

#[instrument(skip(state, path, body), fields(key = %path.key))]
pub async fn update_setting(
    State(state): State<Arc<AppState>>,
    Path(path): Path<SettingKeyPath>,
    Json(body): Json<UpdateSettingDTO>,
) -> Result<Json<SystemSetting>, AppError> {
    path.validate()?;
    let setting = state
        .setting
        .upsert(&path.key, body.value.as_deref())
        .await?;
    info!("Setting saved");
    Ok(Json(setting))
}
