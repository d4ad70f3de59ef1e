//! Integration tests per gli endpoints delle organizzazioni
//!
//! Test per:
//! - GET    /organizations
//! - GET    /organizations/{id}
//! - GET    /organizations/code/{code}
//! - POST   /organizations
//! - PATCH  /organizations/{id}
//! - POST   /organizations/{id}/invitation-code
//! - DELETE /organizations/{id}
//!
//! Richiedono un MySQL raggiungibile tramite DATABASE_URL (`#[sqlx::test]`).
//! Sono `#[ignore]`: in locale `cargo test -- --ignored`, la CI le esegue con
//! `--include-ignored` contro il servizio MySQL di `.github/workflows/ci.yml`.

mod common;

#[cfg(test)]
mod organization_tests {
    use super::common::*;
    use ambalearn_dashboard::entities::Organization;
    use ambalearn_dashboard::repositories::NewOrganization;
    use ambalearn_dashboard::services::organization::insert_with_fresh_code;
    use chrono::Utc;
    use axum::http::{HeaderName, StatusCode};
    use serde_json::json;
    use sqlx::MySqlPool;

    async fn role_of(pool: &MySqlPool, user_id: &str) -> String {
        sqlx::query_scalar("SELECT role FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn manager_of(pool: &MySqlPool, organization_id: &str) -> Option<String> {
        sqlx::query_scalar("SELECT manager_id FROM organizations WHERE id = ?")
            .bind(organization_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    // ============================================================
    // Test per GET /organizations - list_organizations
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("organizations", "users")))]
    #[ignore = "requires a MySQL DATABASE_URL"]
    async fn test_list_organizations(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool, UNREACHABLE_ENGINE));

        let response = server
            .get("/organizations")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .await;

        response.assert_status_ok();
        let organizations: Vec<serde_json::Value> = response.json();
        assert_eq!(organizations.len(), 3);
        // ordinate per nome
        assert_eq!(organizations[0]["id"], "org-alpha");
        assert_eq!(organizations[0]["manager_username"], "anna");
        assert_eq!(organizations[0]["member_count"], 2);
        assert_eq!(organizations[2]["member_count"], 0);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("organizations", "users")))]
    #[ignore = "requires a MySQL DATABASE_URL"]
    async fn test_search_organizations_by_name(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool, UNREACHABLE_ENGINE));

        let response = server
            .get("/organizations?search=beta")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .await;

        response.assert_status_ok();
        let organizations: Vec<serde_json::Value> = response.json();
        assert_eq!(organizations.len(), 1);
        assert_eq!(organizations[0]["name"], "Beta Institute");

        Ok(())
    }

    // ============================================================
    // Test per GET /organizations/{id} e /organizations/code/{code}
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("organizations", "users")))]
    #[ignore = "requires a MySQL DATABASE_URL"]
    async fn test_search_treats_wildcards_literally(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool, UNREACHABLE_ENGINE));

        for search in ["%25", "_", "%25a"] {
            let response = server
                .get(&format!("/organizations?search={search}"))
                .add_header(HeaderName::from_static("authorization"), admin_bearer())
                .await;
            response.assert_status_ok();
            let organizations: Vec<serde_json::Value> = response.json();
            assert!(organizations.is_empty(), "search {search:?} matched {organizations:?}");
        }

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("organizations", "users", "courses")))]
    #[ignore = "requires a MySQL DATABASE_URL"]
    async fn test_organization_detail(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool, UNREACHABLE_ENGINE));

        let response = server
            .get("/organizations/org-alpha")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .await;

        response.assert_status_ok();
        let detail: serde_json::Value = response.json();
        assert_eq!(detail["organization"]["invitation_code"], "ALPHA1");
        assert_eq!(detail["manager"]["id"], "u-anna");
        assert_eq!(detail["members"].as_array().unwrap().len(), 2);
        assert_eq!(detail["courses"][0]["uid"], "c-rust");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("organizations", "users")))]
    #[ignore = "requires a MySQL DATABASE_URL"]
    async fn test_organization_detail_not_found(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool, UNREACHABLE_ENGINE));

        let response = server
            .get("/organizations/org-missing")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .await;

        response.assert_status_not_found();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("organizations", "users")))]
    #[ignore = "requires a MySQL DATABASE_URL"]
    async fn test_lookup_by_invitation_code(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool, UNREACHABLE_ENGINE));

        let found = server
            .get("/organizations/code/BETA22")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .await;
        found.assert_status_ok();
        let organization: serde_json::Value = found.json();
        assert_eq!(organization["id"], "org-beta");

        let malformed = server
            .get("/organizations/code/beta22")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .await;
        malformed.assert_status_bad_request();

        let missing = server
            .get("/organizations/code/ZZZZZZ")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .await;
        missing.assert_status_not_found();

        Ok(())
    }

    // ============================================================
    // Test per POST /organizations - create_organization
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("organizations", "users")))]
    #[ignore = "requires a MySQL DATABASE_URL"]
    async fn test_create_organization_without_manager(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool, UNREACHABLE_ENGINE));

        let response = server
            .post("/organizations")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .json(&json!({ "name": "Delta School", "description": "Nuova" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let organization: serde_json::Value = response.json();
        let code = organization["invitation_code"].as_str().unwrap();
        assert!(Organization::is_valid_invitation_code(code));
        assert!(organization["manager_id"].is_null());
        assert_eq!(organization["id"].as_str().unwrap().len(), 36);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("organizations", "users")))]
    #[ignore = "requires a MySQL DATABASE_URL"]
    async fn test_create_organization_with_manager_promotes_user(
        pool: MySqlPool,
    ) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone(), UNREACHABLE_ENGINE));

        let response = server
            .post("/organizations")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .json(&json!({ "name": "Delta School", "manager_id": "u-dario" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let organization: serde_json::Value = response.json();
        assert_eq!(organization["manager_id"], "u-dario");
        assert_eq!(role_of(&pool, "u-dario").await, "manager");

        let organization_id: Option<String> =
            sqlx::query_scalar("SELECT organization_id FROM users WHERE id = 'u-dario'")
                .fetch_one(&pool)
                .await?;
        assert_eq!(organization_id.as_deref(), organization["id"].as_str());

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("organizations", "users")))]
    #[ignore = "requires a MySQL DATABASE_URL"]
    async fn test_create_organization_moves_manager_from_old_organization(
        pool: MySqlPool,
    ) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone(), UNREACHABLE_ENGINE));

        let response = server
            .post("/organizations")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .json(&json!({ "name": "Delta School", "manager_id": "u-carla" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        // carla non gestisce più beta, ma resta manager della nuova organizzazione
        assert_eq!(manager_of(&pool, "org-beta").await, None);
        assert_eq!(role_of(&pool, "u-carla").await, "manager");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("organizations", "users")))]
    #[ignore = "requires a MySQL DATABASE_URL"]
    async fn test_create_organization_with_unknown_manager(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone(), UNREACHABLE_ENGINE));

        let response = server
            .post("/organizations")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .json(&json!({ "name": "Delta School", "manager_id": "u-ghost" }))
            .await;

        response.assert_status_bad_request();
        // la transazione è stata annullata
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM organizations")
            .fetch_one(&pool)
            .await?;
        assert_eq!(count, 3);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("organizations", "users")))]
    #[ignore = "requires a MySQL DATABASE_URL"]
    async fn test_create_organization_empty_name(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool, UNREACHABLE_ENGINE));

        let response = server
            .post("/organizations")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .json(&json!({ "name": "" }))
            .await;

        response.assert_status_bad_request();

        Ok(())
    }

    // ============================================================
    // Test per PATCH /organizations/{id} - update_organization
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("organizations", "users")))]
    #[ignore = "requires a MySQL DATABASE_URL"]
    async fn test_change_manager_demotes_previous(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone(), UNREACHABLE_ENGINE));

        let response = server
            .patch("/organizations/org-alpha")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .json(&json!({ "manager_id": "u-bruno" }))
            .await;

        response.assert_status_ok();
        let organization: serde_json::Value = response.json();
        assert_eq!(organization["manager_id"], "u-bruno");
        assert_eq!(role_of(&pool, "u-bruno").await, "manager");
        assert_eq!(role_of(&pool, "u-anna").await, "user");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("organizations", "users")))]
    #[ignore = "requires a MySQL DATABASE_URL"]
    async fn test_admin_manager_is_never_demoted(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone(), UNREACHABLE_ENGINE));

        let response = server
            .patch("/organizations/org-gamma")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .json(&json!({ "manager_id": "u-admin" }))
            .await;
        response.assert_status_ok();
        assert_eq!(role_of(&pool, "u-admin").await, "admin");

        let response = server
            .patch("/organizations/org-gamma")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .json(&json!({ "manager_id": null }))
            .await;
        response.assert_status_ok();
        assert_eq!(manager_of(&pool, "org-gamma").await, None);
        assert_eq!(role_of(&pool, "u-admin").await, "admin");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("organizations", "users")))]
    #[ignore = "requires a MySQL DATABASE_URL"]
    async fn test_clear_manager_and_rename(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone(), UNREACHABLE_ENGINE));

        let response = server
            .patch("/organizations/org-beta")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .json(&json!({ "name": "Beta Reloaded", "manager_id": null }))
            .await;

        response.assert_status_ok();
        let organization: serde_json::Value = response.json();
        assert_eq!(organization["name"], "Beta Reloaded");
        assert!(organization["manager_id"].is_null());
        assert_eq!(role_of(&pool, "u-carla").await, "user");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("organizations", "users")))]
    #[ignore = "requires a MySQL DATABASE_URL"]
    async fn test_patch_without_manager_keeps_it(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone(), UNREACHABLE_ENGINE));

        let response = server
            .patch("/organizations/org-alpha")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .json(&json!({ "description": null }))
            .await;

        response.assert_status_ok();
        let organization: serde_json::Value = response.json();
        assert!(organization["description"].is_null());
        assert_eq!(organization["manager_id"], "u-anna");

        Ok(())
    }

    // ============================================================
    // Test per POST /organizations/{id}/invitation-code
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("organizations", "users")))]
    #[ignore = "requires a MySQL DATABASE_URL"]
    async fn test_regenerate_invitation_code(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool, UNREACHABLE_ENGINE));

        let response = server
            .post("/organizations/org-alpha/invitation-code")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .await;

        response.assert_status_ok();
        let organization: serde_json::Value = response.json();
        let code = organization["invitation_code"].as_str().unwrap();
        assert_ne!(code, "ALPHA1");
        assert!(Organization::is_valid_invitation_code(code));

        let missing = server
            .post("/organizations/org-missing/invitation-code")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .await;
        missing.assert_status_not_found();

        Ok(())
    }

    fn new_organization(name: &str) -> NewOrganization {
        NewOrganization {
            id: Organization::new_id(),
            name: name.to_string(),
            description: None,
            invitation_code: String::new(),
            registered_at: Utc::now().naive_utc(),
        }
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("organizations", "users")))]
    #[ignore = "requires a MySQL DATABASE_URL"]
    async fn test_insert_skips_taken_invitation_codes(pool: MySqlPool) -> sqlx::Result<()> {
        let mut conn = pool.acquire().await?;

        let mut data = new_organization("Delta School");
        let codes = ["ALPHA1".to_string(), "FRESH1".to_string()];
        let organization = insert_with_fresh_code(&mut conn, &mut data, codes)
            .await
            .unwrap();
        assert_eq!(organization.invitation_code, "FRESH1");

        let stored: String =
            sqlx::query_scalar("SELECT invitation_code FROM organizations WHERE id = ?")
                .bind(&organization.id)
                .fetch_one(&pool)
                .await?;
        assert_eq!(stored, "FRESH1");

        // solo codici già presi: nessuna riga e 500
        let mut data = new_organization("Epsilon School");
        let codes = ["BETA22".to_string(), "GAMMA3".to_string()];
        let err = insert_with_fresh_code(&mut conn, &mut data, codes)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM organizations")
            .fetch_one(&pool)
            .await?;
        assert_eq!(total, 4);

        Ok(())
    }

    // ============================================================
    // Test per DELETE /organizations/{id} - delete_organization
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("organizations", "users", "courses")))]
    #[ignore = "requires a MySQL DATABASE_URL"]
    async fn test_delete_organization_detaches_everything(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool.clone(), UNREACHABLE_ENGINE));

        let response = server
            .delete("/organizations/org-alpha")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .await;

        response.assert_status(StatusCode::NO_CONTENT);

        let members: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE organization_id = 'org-alpha'")
                .fetch_one(&pool)
                .await?;
        assert_eq!(members, 0);

        let course_org: Option<String> =
            sqlx::query_scalar("SELECT organization_id FROM course_metadata WHERE uid = 'c-rust'")
                .fetch_one(&pool)
                .await?;
        assert_eq!(course_org, None);

        assert_eq!(role_of(&pool, "u-anna").await, "user");

        let missing = server
            .delete("/organizations/org-alpha")
            .add_header(HeaderName::from_static("authorization"), admin_bearer())
            .await;
        missing.assert_status_not_found();

        Ok(())
    }
}
