//! Integration tests for registration and login.

use tradepost_core::Role;
use tradepost_integration_tests::TestContext;
use tradepost_storefront::services::auth::{AuthError, AuthService, RegisterError};

/// Count rows in the users table.
async fn user_count(ctx: &TestContext) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&ctx.pool)
        .await
        .expect("Failed to count users")
}

#[tokio::test]
async fn test_register_and_login_roundtrip() {
    let ctx = TestContext::new().await;
    let auth = AuthService::new(&ctx.pool);

    let id = auth
        .register("alice", "a@x.com", "pw123", Role::Buyer)
        .await
        .expect("registration should succeed");

    let user = auth
        .login("a@x.com", "pw123")
        .await
        .expect("login should succeed");

    assert_eq!(user.id, id);
    assert_eq!(user.username.as_str(), "alice");
    assert_eq!(user.role, Role::Buyer);
}

#[tokio::test]
async fn test_new_account_starts_with_empty_cart() {
    let ctx = TestContext::new().await;
    let auth = AuthService::new(&ctx.pool);

    let id = auth
        .register("alice", "a@x.com", "pw123", Role::Buyer)
        .await
        .expect("registration should succeed");

    let cart: String = sqlx::query_scalar("SELECT cart FROM users WHERE id = $1")
        .bind(id.as_i64())
        .fetch_one(&ctx.pool)
        .await
        .expect("Failed to read cart");

    assert_eq!(cart, "[]");
}

#[tokio::test]
async fn test_duplicate_identity_rejected() {
    let ctx = TestContext::new().await;
    let auth = AuthService::new(&ctx.pool);

    auth.register("alice", "a@x.com", "pw123", Role::Buyer)
        .await
        .expect("first registration should succeed");

    // Same username, different email
    let err = auth
        .register("alice", "other@x.com", "pw123", Role::Buyer)
        .await
        .expect_err("duplicate username should fail");
    assert!(matches!(err, RegisterError::DuplicateIdentity));

    // Same email, different username
    let err = auth
        .register("alice2", "a@x.com", "pw123", Role::Buyer)
        .await
        .expect_err("duplicate email should fail");
    assert!(matches!(err, RegisterError::DuplicateIdentity));

    assert_eq!(user_count(&ctx).await, 1);
}

#[tokio::test]
async fn test_missing_fields_rejected_before_storage() {
    let ctx = TestContext::new().await;
    let auth = AuthService::new(&ctx.pool);

    let err = auth
        .register("", "a@x.com", "pw123", Role::Buyer)
        .await
        .expect_err("empty username should fail");
    assert!(matches!(err, RegisterError::MissingField("username")));

    let err = auth
        .register("alice", "", "pw123", Role::Buyer)
        .await
        .expect_err("empty email should fail");
    assert!(matches!(err, RegisterError::MissingField("email")));

    let err = auth
        .register("alice", "a@x.com", "", Role::Buyer)
        .await
        .expect_err("empty password should fail");
    assert!(matches!(err, RegisterError::MissingField("password")));

    assert_eq!(user_count(&ctx).await, 0);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
    let ctx = TestContext::new().await;
    let auth = AuthService::new(&ctx.pool);

    auth.register("alice", "a@x.com", "pw123", Role::Buyer)
        .await
        .expect("registration should succeed");

    let wrong_password = auth
        .login("a@x.com", "not-the-password")
        .await
        .expect_err("wrong password should fail");
    let unknown_email = auth
        .login("nobody@x.com", "pw123")
        .await
        .expect_err("unknown email should fail");

    // Both failures collapse to the same variant with the same message
    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_email, AuthError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn test_seller_role_roundtrips() {
    let ctx = TestContext::new().await;
    let auth = AuthService::new(&ctx.pool);

    auth.register("bob", "b@x.com", "pw123", Role::Seller)
        .await
        .expect("registration should succeed");

    let user = auth
        .login("b@x.com", "pw123")
        .await
        .expect("login should succeed");
    assert_eq!(user.role, Role::Seller);
}
