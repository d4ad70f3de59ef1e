use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Debug)]
pub struct UpdateSettingDTO {
    pub value: Option<String>,
}

/// Chiave dal path di `PUT /settings/{key}`, la colonna è VARCHAR(50)
#[derive(Deserialize, Debug, Validate)]
pub struct SettingKeyPath {
    #[validate(length(min = 1, max = 50, message = "Setting key must be between 1 and 50 characters"))]
    pub key: String,
}
