//! SettingRepository - Impostazioni chiave/valore condivise con l'Engine

use super::Read;
use crate::entities::SystemSetting;
use sqlx::{Error, MySqlPool};

pub struct SettingRepository {
    connection_pool: MySqlPool,
}

impl SettingRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    pub async fn list(&self) -> Result<Vec<SystemSetting>, Error> {
        sqlx::query_as::<_, SystemSetting>("SELECT `key`, `value` FROM system_settings ORDER BY `key`")
            .fetch_all(&self.connection_pool)
            .await
    }

    pub async fn upsert(&self, key: &str, value: Option<&str>) -> Result<SystemSetting, Error> {
        sqlx::query(
            "INSERT INTO system_settings (`key`, `value`) VALUES (?, ?) ON DUPLICATE KEY UPDATE `value` = VALUES(`value`)",
        )
        .bind(key)
        .bind(value)
        .execute(&self.connection_pool)
        .await?;

        self.read(key).await?.ok_or(Error::RowNotFound)
    }
}

impl Read<SystemSetting, str> for SettingRepository {
    async fn read(&self, key: &str) -> Result<Option<SystemSetting>, Error> {
        sqlx::query_as::<_, SystemSetting>("SELECT `key`, `value` FROM system_settings WHERE `key` = ?")
            .bind(key)
            .fetch_optional(&self.connection_pool)
            .await
    }
}
