//! Registration atomicity against a live database. Run with a Postgres
//! instance that has `schema.sql` loaded:
//!
//!     DATABASE_URL=postgres://... cargo test -- --ignored

use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use storehub_api::services::registration::{register_owner, RegistrationError};
use storehub_api::services::tenant_service::TenantServiceError;

async fn pool() -> sqlx::PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for this test");
    PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect test database")
}

#[tokio::test]
#[ignore = "needs a live database with schema.sql loaded"]
async fn failed_registration_leaves_no_user_behind() {
    let pool = pool().await;
    let run = Uuid::new_v4().simple().to_string();
    let taken = format!("taken-{}", &run[..12]);

    let first_email = format!("first-{}@example.com", run);
    register_owner(&pool, &first_email, "password123", &taken)
        .await
        .expect("first registration");

    // Second account tries the same subdomain: the store insert loses the
    // uniqueness race and the whole registration must roll back
    let second_email = format!("second-{}@example.com", run);
    let err = register_owner(&pool, &second_email, "password123", &taken)
        .await
        .expect_err("duplicate subdomain must fail");
    assert!(matches!(
        err,
        RegistrationError::Tenant(TenantServiceError::AlreadyExists(_))
    ));

    // No stranded user row: the same email registers cleanly once it picks
    // a free subdomain
    let fresh = format!("fresh-{}", &run[..12]);
    let (user, tenant) = register_owner(&pool, &second_email, "password123", &fresh)
        .await
        .expect("retry with the same email");
    assert_eq!(user.email, second_email);
    assert_eq!(tenant.subdomain, fresh);
    assert_eq!(tenant.owner_id, user.id);
}
