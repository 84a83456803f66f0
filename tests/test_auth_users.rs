mod helpers;

use helpers::*;
use oxicrm::domain::entities::{
    ChangePasswordRequest, CreateUserRequest, LoginRequest, PageRequest, ResetPasswordRequest,
    UpdateUserRequest, UserFilter, UserProfile,
};
use oxicrm::domain::ports::{SessionRepository, UserRepository};
use oxicrm::infrastructure::http::middleware::ApiError;

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_login_opens_session() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = test_state(db, date(2025, 3, 14));
    let user = create_seller(db, "Maria").await;

    let response = state
        .auth_service
        .login(login("  MARIA@oxicrm.test ", TEST_PASSWORD))
        .await
        .unwrap();

    assert_eq!(response.token.len(), 64);
    assert_eq!(response.user.id, user.id);
    assert!(response.user.last_login_at.is_some());
    assert!(response.user.permissions.create_contacts);
    assert!(!response.user.permissions.manage_users);

    let session = db.find_session(&response.token).await.unwrap();
    assert_eq!(session.map(|s| s.user_id), Some(user.id.clone()));

    let stored = db.get_user_by_id(&user.id).await.unwrap().unwrap();
    assert!(stored.last_login_at.is_some());

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_login_failures() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = test_state(db, date(2025, 3, 14));
    let user = create_seller(db, "Maria").await;

    let err = state
        .auth_service
        .login(login("", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let err = state
        .auth_service
        .login(login("nobody@oxicrm.test", TEST_PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Unauthorized("Invalid credentials".to_string()));

    let err = state
        .auth_service
        .login(login(&user.email, "wrong-password"))
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Unauthorized("Invalid credentials".to_string()));

    let mut inactive = user.clone();
    inactive.active = false;
    db.update_user(&inactive).await.unwrap();
    let err = state
        .auth_service
        .login(login(&user.email, TEST_PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Unauthorized("User is inactive".to_string()));

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_repeated_failures_lock_the_email() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = test_state(db, date(2025, 3, 14));
    let user = create_seller(db, "Maria").await;

    for _ in 0..5 {
        let err = state
            .auth_service
            .login(login(&user.email, "wrong-password"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    let err = state
        .auth_service
        .login(login(&user.email, "wrong-password"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::TooManyRequests(_)));

    // Locked even with the right password
    let err = state
        .auth_service
        .login(login(&user.email, TEST_PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::TooManyRequests(_)));

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_change_password() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = test_state(db, date(2025, 3, 14));
    let user = create_seller(db, "Maria").await;
    let auth_user = authenticated(&user);

    let err = state
        .auth_service
        .change_password(
            &auth_user,
            ChangePasswordRequest {
                current_password: "not-it".to_string(),
                new_password: "newsecret".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Unauthorized("Current password is incorrect".to_string())
    );

    let err = state
        .auth_service
        .change_password(
            &auth_user,
            ChangePasswordRequest {
                current_password: TEST_PASSWORD.to_string(),
                new_password: "short".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    state
        .auth_service
        .change_password(
            &auth_user,
            ChangePasswordRequest {
                current_password: TEST_PASSWORD.to_string(),
                new_password: "newsecret".to_string(),
            },
        )
        .await
        .unwrap();

    assert!(state
        .auth_service
        .login(login(&user.email, "newsecret"))
        .await
        .is_ok());

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_create_and_update_users() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = test_state(db, date(2025, 3, 14));
    let existing = create_seller(db, "Maria").await;

    let err = state
        .user_service
        .create_user(CreateUserRequest {
            email: "joao@oxicrm.test".to_string(),
            password: TEST_PASSWORD.to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::BadRequest("Name is required".to_string()));

    let err = state
        .user_service
        .create_user(CreateUserRequest {
            name: "Other Maria".to_string(),
            email: existing.email.to_uppercase(),
            password: TEST_PASSWORD.to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Conflict("Email already exists".to_string()));

    let joao = state
        .user_service
        .create_user(CreateUserRequest {
            name: "Joao".to_string(),
            email: "Joao@OxiCRM.test".to_string(),
            password: TEST_PASSWORD.to_string(),
            department: Some("Parts".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(joao.email, "joao@oxicrm.test");
    assert_eq!(joao.profile, UserProfile::Seller);
    assert!(joao.active);

    let err = state
        .user_service
        .update_user(
            &joao.id,
            UpdateUserRequest {
                email: Some(existing.email.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    let promoted = state
        .user_service
        .update_user(
            &joao.id,
            UpdateUserRequest {
                profile: Some(UserProfile::Master),
                job_title: Some("Manager".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(promoted.profile, UserProfile::Master);
    assert!(promoted.permissions.manage_users);
    assert_eq!(promoted.job_title.as_deref(), Some("Manager"));
    assert_eq!(promoted.department.as_deref(), Some("Parts"));

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_deactivation_revokes_sessions() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = test_state(db, date(2025, 3, 14));
    let master = authenticated(&create_master(db).await);
    let seller = create_seller(db, "Maria").await;

    let session = state
        .auth_service
        .login(login(&seller.email, TEST_PASSWORD))
        .await
        .unwrap();

    let err = state
        .user_service
        .deactivate_user(&master, &master.user.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let deactivated = state
        .user_service
        .deactivate_user(&master, &seller.id)
        .await
        .unwrap();
    assert!(!deactivated.active);
    assert!(db.find_session(&session.token).await.unwrap().is_none());

    let toggled = state
        .user_service
        .toggle_user_status(&master, &seller.id)
        .await
        .unwrap();
    assert!(toggled.active);

    state
        .user_service
        .reset_password(
            &seller.id,
            ResetPasswordRequest {
                new_password: "fresh-pass".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(state
        .auth_service
        .login(login(&seller.email, "fresh-pass"))
        .await
        .is_ok());

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_list_users_and_stats() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = test_state(db, date(2025, 3, 14));
    create_master(db).await;
    create_seller(db, "Maria").await;
    let joao = create_seller(db, "Joao").await;

    let mut inactive = joao.clone();
    inactive.active = false;
    db.update_user(&inactive).await.unwrap();

    let page = PageRequest::new(Some(1), Some(2), 20);
    let all = state
        .user_service
        .list_users(&UserFilter::default(), page)
        .await
        .unwrap();
    assert_eq!(all.pagination.total, 3);
    assert_eq!(all.data.len(), 2);
    assert!(all.pagination.has_next);

    let active = state
        .user_service
        .list_users(
            &UserFilter {
                search: None,
                active_only: true,
            },
            PageRequest::new(None, None, 20),
        )
        .await
        .unwrap();
    assert_eq!(active.pagination.total, 2);

    let search = state
        .user_service
        .list_users(
            &UserFilter {
                search: Some("mari".to_string()),
                active_only: false,
            },
            PageRequest::new(None, None, 20),
        )
        .await
        .unwrap();
    assert_eq!(search.pagination.total, 1);

    let stats = state.user_service.user_stats().await.unwrap();
    assert_eq!(stats.total_users, 3);
    assert_eq!(stats.active_users, 2);
    assert_eq!(stats.inactive_users, 1);
    assert_eq!(stats.master_users, 1);
    assert_eq!(stats.seller_users, 2);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_master_user_bootstrap_is_idempotent() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let config = test_config();

    oxicrm::bootstrap::initialize_admin(db, &config).await.unwrap();
    oxicrm::bootstrap::initialize_admin(db, &config).await.unwrap();

    let admin = db
        .get_user_by_email(&config.admin_email)
        .await
        .unwrap()
        .expect("master user created");
    assert_eq!(admin.profile, UserProfile::Master);
    assert_eq!(db.count_users(&UserFilter::default()).await.unwrap(), 1);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_expired_session_is_rejected_and_swept() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = test_state(db, date(2025, 3, 14));
    let user = create_seller(db, "Maria").await;

    let live = state.session_service.open(&user.id).await.unwrap();
    let stale = oxicrm::domain::entities::Session::new(user.id.clone(), "stale".to_string(), -1);
    let swept = oxicrm::domain::entities::Session::new(user.id.clone(), "swept".to_string(), -1);
    db.insert_session(&stale).await.unwrap();
    db.insert_session(&swept).await.unwrap();

    let resolved = state.session_service.resolve(&live.token).await.unwrap();
    assert_eq!(resolved.user_id, user.id);

    match state.session_service.resolve("stale").await {
        Err(ApiError::Unauthorized(msg)) => assert_eq!(msg, "Session expired"),
        other => panic!("expected expiry, got {:?}", other.map(|s| s.token)),
    }
    assert!(db.find_session("stale").await.unwrap().is_none());

    assert!(matches!(
        state.session_service.resolve("nope").await,
        Err(ApiError::Unauthorized(_))
    ));

    assert_eq!(state.session_service.sweep_expired().await.unwrap(), 1);
    assert!(db.find_session(&live.token).await.unwrap().is_some());

    teardown_test_db(test_db).await;
}
