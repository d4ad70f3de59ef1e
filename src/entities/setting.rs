use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct SystemSetting {
    pub key: String,
    pub value: Option<String>,
}
