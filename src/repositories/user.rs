//! UserRepository - Repository per la gestione degli utenti
//!
//! Le funzioni associate che ricevono una `&mut MySqlConnection` servono a comporre
//! le mutazioni dentro una transazione aperta dal service (promozioni/retrocessioni).

use super::{Count, Read, contains_pattern};
use crate::dtos::{UserSearchQuery, UserSummaryDTO};
use crate::entities::{User, UserRole};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::{Error, MySql, MySqlConnection, MySqlPool, QueryBuilder, Transaction};

const SELECT_USER: &str = "SELECT id, username, email, password_hash, google_id, picture, birthday, \
     registered_at, last_login, organization_id, role FROM users";

const SELECT_USER_SUMMARY: &str = "SELECT u.id, u.username, u.email, u.role, u.organization_id, \
     o.name AS organization_name, u.registered_at, u.last_login \
     FROM users u LEFT JOIN organizations o ON o.id = u.organization_id";

/// Dati di inserimento: password già hashata, id generato dal chiamante
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: UserRole,
    pub organization_id: Option<String>,
    pub registered_at: NaiveDateTime,
}

/// Valori finali di un utente dopo una modifica dal pannello
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub username: String,
    pub email: String,
    /// None = hash invariato
    pub password_hash: Option<String>,
    pub role: UserRole,
    pub organization_id: Option<String>,
}

// USER REPO
pub struct UserRepository {
    connection_pool: MySqlPool,
}

impl UserRepository {
    pub fn new(connection_pool: MySqlPool) -> UserRepository {
        Self { connection_pool }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, MySql>, Error> {
        self.connection_pool.begin().await
    }

    /// Email univoca nel database condiviso, usata per il login via Engine
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.connection_pool)
            .await
    }

    pub async fn email_taken(&self, email: &str, except_id: Option<&str>) -> Result<bool, Error> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ? AND id <> COALESCE(?, '')")
                .bind(email)
                .bind(except_id)
                .fetch_one(&self.connection_pool)
                .await?;
        Ok(count > 0)
    }

    /// Lista paginata con filtri opzionali, restituisce anche il totale
    pub async fn search(
        &self,
        filter: &UserSearchQuery,
    ) -> Result<(Vec<UserSummaryDTO>, i64), Error> {
        let page = filter.page_request();

        let mut count_query = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM users u");
        push_user_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.connection_pool)
            .await?;

        let mut list_query = QueryBuilder::<MySql>::new(SELECT_USER_SUMMARY);
        push_user_filters(&mut list_query, filter);
        list_query
            .push(" ORDER BY u.registered_at DESC, u.id LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let users = list_query
            .build_query_as::<UserSummaryDTO>()
            .fetch_all(&self.connection_pool)
            .await?;

        Ok((users, total))
    }

    pub async fn find_by_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<UserSummaryDTO>, Error> {
        sqlx::query_as::<_, UserSummaryDTO>(&format!(
            "{SELECT_USER_SUMMARY} WHERE u.organization_id = ? ORDER BY u.username"
        ))
        .bind(organization_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Nuovi utenti per giorno di registrazione a partire da `since` (incluso)
    pub async fn count_registered_per_day(
        &self,
        since: NaiveDate,
    ) -> Result<Vec<(NaiveDate, i64)>, Error> {
        sqlx::query_as::<_, (NaiveDate, i64)>(
            r#"
            SELECT DATE(registered_at) AS day, COUNT(*) AS amount
            FROM users
            WHERE registered_at >= ?
            GROUP BY DATE(registered_at)
            ORDER BY day
            "#,
        )
        .bind(since.and_time(NaiveTime::MIN))
        .fetch_all(&self.connection_pool)
        .await
    }

    // ******************** OPERAZIONI IN TRANSAZIONE ******************** //

    /// Organizzazione dell'utente letta senza lock; `None` se l'utente non esiste
    pub async fn organization_of(
        conn: &mut MySqlConnection,
        id: &str,
    ) -> Result<Option<Option<String>>, Error> {
        sqlx::query_scalar("SELECT organization_id FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn read_for_update(
        conn: &mut MySqlConnection,
        id: &str,
    ) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = ? FOR UPDATE"))
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn insert(conn: &mut MySqlConnection, data: &NewUser) -> Result<User, Error> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, registered_at, organization_id, role)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&data.id)
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.registered_at)
        .bind(&data.organization_id)
        .bind(data.role.as_str())
        .execute(&mut *conn)
        .await?;

        Self::read_for_update(conn, &data.id)
            .await?
            .ok_or(Error::RowNotFound)
    }

    pub async fn apply_changes(
        conn: &mut MySqlConnection,
        id: &str,
        changes: &UserChanges,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET username = ?, email = ?, password_hash = COALESCE(?, password_hash),
                role = ?, organization_id = ?
            WHERE id = ?
            "#,
        )
        .bind(&changes.username)
        .bind(&changes.email)
        .bind(&changes.password_hash)
        .bind(changes.role.as_str())
        .bind(&changes.organization_id)
        .bind(id)
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn set_role(
        conn: &mut MySqlConnection,
        id: &str,
        role: UserRole,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn set_role_and_organization(
        conn: &mut MySqlConnection,
        id: &str,
        role: UserRole,
        organization_id: Option<&str>,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE users SET role = ?, organization_id = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(organization_id)
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Stacca tutti i membri da un'organizzazione che sta per essere eliminata
    pub async fn detach_from_organization(
        conn: &mut MySqlConnection,
        organization_id: &str,
    ) -> Result<u64, Error> {
        let result = sqlx::query("UPDATE users SET organization_id = NULL WHERE organization_id = ?")
            .bind(organization_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Cancellazione definitiva, le righe dipendenti vanno rimosse prima dal chiamante
    pub async fn delete_row(conn: &mut MySqlConnection, id: &str) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn push_user_filters<'a>(query: &mut QueryBuilder<'a, MySql>, filter: &'a UserSearchQuery) {
    query.push(" WHERE 1 = 1");

    if let Some(search) = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let pattern = contains_pattern(search);
        query
            .push(" AND (u.username LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '!' OR u.email LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '!')");
    }

    if let Some(role) = filter.role {
        query.push(" AND u.role = ").push_bind(role.as_str());
    }

    if let Some(ref organization_id) = filter.organization_id {
        query
            .push(" AND u.organization_id = ")
            .push_bind(organization_id.as_str());
    }
}

impl Read<User, str> for UserRepository {
    async fn read(&self, id: &str) -> Result<Option<User>, Error> {
        sqlx::query_as::<_, User>(&format!("{SELECT_USER} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Count for UserRepository {
    async fn count(&self) -> Result<i64, Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.connection_pool)
            .await
    }
}

impl NewUser {
    /// Utente creato ora dal pannello admin
    pub fn now(
        username: String,
        email: String,
        password_hash: Option<String>,
        role: UserRole,
        organization_id: Option<String>,
    ) -> Self {
        Self {
            id: User::new_id(),
            username,
            email,
            password_hash,
            role,
            organization_id,
            registered_at: Utc::now().naive_utc(),
        }
    }
}
