mod helpers;

use helpers::*;
use oxicrm::domain::entities::{CreateHolidayRequest, UpdateHolidayRequest};
use oxicrm::infrastructure::http::middleware::ApiError;

fn request(name: &str, day: &str, recurring: bool) -> CreateHolidayRequest {
    CreateHolidayRequest {
        name: name.to_string(),
        date: day.to_string(),
        recurring,
    }
}

#[tokio::test]
async fn test_holiday_crud() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = test_state(db, date(2025, 3, 14));
    let service = &state.holiday_service;

    let natal = service
        .create_holiday(request(" Natal ", "2025-12-25", true))
        .await
        .unwrap();
    assert_eq!(natal.name, "Natal");
    assert!(natal.recurring);
    service
        .create_holiday(request("Carnaval", "2025-03-04", false))
        .await
        .unwrap();

    let listed = service.list_holidays().await.unwrap();
    let dates: Vec<&str> = listed.iter().map(|h| h.date.as_str()).collect();
    assert_eq!(dates, vec!["2025-03-04", "2025-12-25"]);

    let moved = service
        .update_holiday(
            &natal.id,
            UpdateHolidayRequest {
                date: Some("2025-12-24".to_string()),
                recurring: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.date, "2025-12-24");
    assert!(!moved.recurring);
    assert_eq!(service.get_holiday(&natal.id).await.unwrap().date, "2025-12-24");

    tokio_test::assert_ok!(service.delete_holiday(&natal.id).await);
    let err = service.get_holiday(&natal.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_holiday_validation() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = test_state(db, date(2025, 3, 14));
    let service = &state.holiday_service;

    let err = service
        .create_holiday(request("  ", "2025-12-25", false))
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::BadRequest("Name is required".to_string()));

    let err = service
        .create_holiday(request("Natal", "25/12/2025", false))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::BadRequest("Invalid date format. Use YYYY-MM-DD".to_string())
    );

    let first = service
        .create_holiday(request("Natal", "2025-12-25", false))
        .await
        .unwrap();
    let err = service
        .create_holiday(request("Natal again", "2025-12-25", false))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    // keeping its own date is not a conflict
    let same = service
        .update_holiday(
            &first.id,
            UpdateHolidayRequest {
                name: Some("Christmas".to_string()),
                date: Some("2025-12-25".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(same.name, "Christmas");

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_holiday_set_expands_recurring_dates() {
    let test_db = setup_test_db().await;
    let db = test_db.db();
    let state = test_state(db, date(2025, 3, 14));
    create_test_holiday(db, "Natal", "2019-12-25", true).await;
    create_test_holiday(db, "Carnaval", "2025-03-04", false).await;

    let set = state
        .holiday_service
        .holiday_set(date(2025, 12, 10))
        .await
        .unwrap();

    assert!(set.contains(&date(2025, 12, 25)));
    assert!(set.contains(&date(2026, 12, 25)));
    assert!(set.contains(&date(2025, 3, 4)));
    assert!(!set.contains(&date(2019, 12, 25)));

    teardown_test_db(test_db).await;
}
