//! CourseRepository - Metadati dei corsi in sola lettura (il contenuto è dell'Engine)

use super::{Count, Read};
use crate::dtos::{CourseDTO, CourseQuery};
use crate::entities::CourseMetadata;
use sqlx::{Error, MySql, MySqlConnection, MySqlPool, QueryBuilder};

const SELECT_COURSE: &str =
    "SELECT uid, title, description, owner_id, organization_id, created_at FROM course_metadata";

const SELECT_COURSE_DTO: &str = r#"
    SELECT
        c.uid,
        c.title,
        c.description,
        c.owner_id,
        u.username AS owner_username,
        c.organization_id,
        o.name AS organization_name,
        c.created_at,
        (SELECT COUNT(*) FROM feedbacks f WHERE f.course_id = c.uid) AS feedback_count
    FROM course_metadata c
    LEFT JOIN users u ON u.id = c.owner_id
    LEFT JOIN organizations o ON o.id = c.organization_id"#;

pub struct CourseRepository {
    connection_pool: MySqlPool,
}

impl CourseRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    pub async fn list(&self, filter: &CourseQuery) -> Result<Vec<CourseDTO>, Error> {
        let mut query = QueryBuilder::<MySql>::new(SELECT_COURSE_DTO);
        query.push(" WHERE 1 = 1");
        if let Some(ref organization_id) = filter.organization_id {
            query
                .push(" AND c.organization_id = ")
                .push_bind(organization_id.as_str());
        }
        if let Some(ref owner_id) = filter.owner_id {
            query.push(" AND c.owner_id = ").push_bind(owner_id.as_str());
        }
        query.push(" ORDER BY c.created_at DESC, c.uid");

        query
            .build_query_as::<CourseDTO>()
            .fetch_all(&self.connection_pool)
            .await
    }

    pub async fn find_dto(&self, uid: &str) -> Result<Option<CourseDTO>, Error> {
        sqlx::query_as::<_, CourseDTO>(&format!("{SELECT_COURSE_DTO} WHERE c.uid = ?"))
            .bind(uid)
            .fetch_optional(&self.connection_pool)
            .await
    }

    pub async fn owned_by(&self, user_id: &str) -> Result<Vec<CourseMetadata>, Error> {
        sqlx::query_as::<_, CourseMetadata>(&format!(
            "{SELECT_COURSE} WHERE owner_id = ? ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn of_organization(&self, organization_id: &str) -> Result<Vec<CourseMetadata>, Error> {
        sqlx::query_as::<_, CourseMetadata>(&format!(
            "{SELECT_COURSE} WHERE organization_id = ? ORDER BY created_at DESC"
        ))
        .bind(organization_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    // ******************** OPERAZIONI IN TRANSAZIONE ******************** //

    /// Usato solo dal seeding demo, in produzione i metadati li scrive l'Engine
    pub async fn insert(conn: &mut MySqlConnection, course: &CourseMetadata) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO course_metadata (uid, title, description, owner_id, organization_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&course.uid)
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.owner_id)
        .bind(&course.organization_id)
        .bind(course.created_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn detach_organization(
        conn: &mut MySqlConnection,
        organization_id: &str,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            "UPDATE course_metadata SET organization_id = NULL WHERE organization_id = ?",
        )
        .bind(organization_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn detach_owner(conn: &mut MySqlConnection, user_id: &str) -> Result<u64, Error> {
        let result = sqlx::query("UPDATE course_metadata SET owner_id = NULL WHERE owner_id = ?")
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

impl Read<CourseMetadata, str> for CourseRepository {
    async fn read(&self, uid: &str) -> Result<Option<CourseMetadata>, Error> {
        sqlx::query_as::<_, CourseMetadata>(&format!("{SELECT_COURSE} WHERE uid = ?"))
            .bind(uid)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Count for CourseRepository {
    async fn count(&self) -> Result<i64, Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM course_metadata")
            .fetch_one(&self.connection_pool)
            .await
    }
}
