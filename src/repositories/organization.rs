//! OrganizationRepository - Repository per la gestione delle organizzazioni

use super::{Count, Read, contains_pattern};
use crate::dtos::{OrganizationSummaryDTO, OrganizationUsageDTO};
use crate::entities::Organization;
use chrono::NaiveDateTime;
use sqlx::{Error, MySql, MySqlConnection, MySqlPool, QueryBuilder};

const SELECT_ORGANIZATION: &str =
    "SELECT id, name, description, manager_id, registered_at, invitation_code FROM organizations";

/// Dati di inserimento, codice di invito già generato e verificato dal service
#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub invitation_code: String,
    pub registered_at: NaiveDateTime,
}

/// Campi descrittivi modificabili direttamente (il manager passa da membership)
#[derive(Debug, Clone, Default)]
pub struct OrganizationDetails {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

//ORGANIZATION REPOSITORY
pub struct OrganizationRepository {
    connection_pool: MySqlPool,
}

impl OrganizationRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Lista con nome del manager e numero di membri, filtrabile per nome
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<OrganizationSummaryDTO>, Error> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);

        sqlx::query_as::<_, OrganizationSummaryDTO>(
            r#"
            SELECT
                o.id,
                o.name,
                o.description,
                o.manager_id,
                m.username AS manager_username,
                o.invitation_code,
                o.registered_at,
                (SELECT COUNT(*) FROM users u WHERE u.organization_id = o.id) AS member_count
            FROM organizations o
            LEFT JOIN users m ON m.id = o.manager_id
            WHERE (? IS NULL OR o.name LIKE ? ESCAPE '!')
            ORDER BY o.name, o.id
            "#,
        )
        .bind(pattern.as_deref())
        .bind(pattern.as_deref())
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn find_by_invitation_code(&self, code: &str) -> Result<Option<Organization>, Error> {
        sqlx::query_as::<_, Organization>(&format!("{SELECT_ORGANIZATION} WHERE invitation_code = ?"))
            .bind(code)
            .fetch_optional(&self.connection_pool)
            .await
    }

    pub async fn set_invitation_code(&self, id: &str, code: &str) -> Result<(), Error> {
        let result = sqlx::query("UPDATE organizations SET invitation_code = ? WHERE id = ?")
            .bind(code)
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        Ok(())
    }

    pub async fn managed_by(&self, user_id: &str) -> Result<Vec<Organization>, Error> {
        sqlx::query_as::<_, Organization>(&format!(
            "{SELECT_ORGANIZATION} WHERE manager_id = ? ORDER BY name"
        ))
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Membri e corsi per organizzazione, ordinati per numero di membri
    pub async fn usage(&self) -> Result<Vec<OrganizationUsageDTO>, Error> {
        sqlx::query_as::<_, OrganizationUsageDTO>(
            r#"
            SELECT
                o.id AS organization_id,
                o.name,
                (SELECT COUNT(*) FROM users u WHERE u.organization_id = o.id) AS member_count,
                (SELECT COUNT(*) FROM course_metadata c WHERE c.organization_id = o.id) AS course_count
            FROM organizations o
            ORDER BY member_count DESC, o.name
            "#,
        )
        .fetch_all(&self.connection_pool)
        .await
    }

    // ******************** OPERAZIONI IN TRANSAZIONE ******************** //

    pub async fn read_for_update(
        conn: &mut MySqlConnection,
        id: &str,
    ) -> Result<Option<Organization>, Error> {
        sqlx::query_as::<_, Organization>(&format!("{SELECT_ORGANIZATION} WHERE id = ? FOR UPDATE"))
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn insert(
        conn: &mut MySqlConnection,
        data: &NewOrganization,
    ) -> Result<Organization, Error> {
        sqlx::query(
            r#"
            INSERT INTO organizations (id, name, description, manager_id, registered_at, invitation_code)
            VALUES (?, ?, ?, NULL, ?, ?)
            "#,
        )
        .bind(&data.id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.registered_at)
        .bind(&data.invitation_code)
        .execute(conn)
        .await?;

        Ok(Organization {
            id: data.id.clone(),
            name: data.name.clone(),
            description: data.description.clone(),
            manager_id: None,
            registered_at: data.registered_at,
            invitation_code: data.invitation_code.clone(),
        })
    }

    /// Blocca, in ordine di id, le organizzazioni gestite da `user_id` e quelle in `ids`.
    /// Le transazioni bloccano le organizzazioni prima delle righe di `users`.
    pub async fn lock_for_user<'a>(
        conn: &mut MySqlConnection,
        user_id: &'a str,
        ids: &[&'a str],
    ) -> Result<Vec<String>, Error> {
        let mut query = QueryBuilder::<MySql>::new("SELECT id FROM organizations WHERE manager_id = ");
        query.push_bind(user_id);
        if !ids.is_empty() {
            query.push(" OR id IN (");
            let mut separated = query.separated(", ");
            for id in ids {
                separated.push_bind(*id);
            }
            separated.push_unseparated(")");
        }
        query.push(" ORDER BY id FOR UPDATE");

        query.build_query_scalar::<String>().fetch_all(conn).await
    }

    /// Id delle organizzazioni gestite da un utente, escludendo eventualmente `except`
    pub async fn managed_ids(
        conn: &mut MySqlConnection,
        user_id: &str,
        except: Option<&str>,
    ) -> Result<Vec<String>, Error> {
        sqlx::query_scalar(
            "SELECT id FROM organizations WHERE manager_id = ? AND id <> COALESCE(?, '') FOR UPDATE",
        )
        .bind(user_id)
        .bind(except)
        .fetch_all(conn)
        .await
    }

    pub async fn set_manager(
        conn: &mut MySqlConnection,
        id: &str,
        manager_id: Option<&str>,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE organizations SET manager_id = ? WHERE id = ?")
            .bind(manager_id)
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Toglie `user_id` da manager di ogni organizzazione tranne `except`
    pub async fn release_manager(
        conn: &mut MySqlConnection,
        user_id: &str,
        except: Option<&str>,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            "UPDATE organizations SET manager_id = NULL WHERE manager_id = ? AND id <> COALESCE(?, '')",
        )
        .bind(user_id)
        .bind(except)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Aggiorna solo i campi presenti; nessun campo = nessuna query
    pub async fn apply_details(
        conn: &mut MySqlConnection,
        id: &str,
        data: &OrganizationDetails,
    ) -> Result<(), Error> {
        if data.name.is_none() && data.description.is_none() {
            return Ok(());
        }

        // Build dynamic UPDATE query using QueryBuilder
        let mut query_builder = QueryBuilder::<MySql>::new("UPDATE organizations SET ");

        let mut separated = query_builder.separated(", ");
        if let Some(ref name) = data.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name.as_str());
        }
        if let Some(ref description) = data.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.as_deref());
        }

        query_builder.push(" WHERE id = ");
        query_builder.push_bind(id);

        query_builder.build().execute(conn).await?;
        Ok(())
    }

    pub async fn delete_row(conn: &mut MySqlConnection, id: &str) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl Read<Organization, str> for OrganizationRepository {
    async fn read(&self, id: &str) -> Result<Option<Organization>, Error> {
        sqlx::query_as::<_, Organization>(&format!("{SELECT_ORGANIZATION} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Count for OrganizationRepository {
    async fn count(&self) -> Result<i64, Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM organizations")
            .fetch_one(&self.connection_pool)
            .await
    }
}
