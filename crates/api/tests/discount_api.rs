//! HTTP-level integration tests for discount management and the
//! discount-info lookup.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_discount, create_product, delete_as, get, post_json, post_json_as,
    put_json_as,
};
use sqlx::PgPool;

const SELLER: i64 = 7;
const OTHER_SELLER: i64 = 8;

fn assert_money(value: &serde_json::Value, expected: f64) {
    let actual = value.as_f64().expect("expected a number");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// A product at 20.00 with a 15.5% window over [2026-02-10, 2026-02-28].
async fn seeded(pool: &PgPool) -> (i64, i64) {
    let product_id = create_product(pool, SELLER, "Chrono Trigger", 20.0).await;
    let response = create_discount(pool, SELLER, product_id, 15.5, "2026-02-10", "2026-02-28").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let discount_id = body_json(response).await["id"].as_i64().unwrap();
    (product_id, discount_id)
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_discount_returns_201(pool: PgPool) {
    let product_id = create_product(&pool, SELLER, "EarthBound", 20.0).await;
    let response =
        create_discount(&pool, SELLER, product_id, 15.5, "2026-02-10", "2026-02-28").await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["product_id"], product_id);
    assert_money(&json["percent"], 15.5);
    assert_eq!(json["start_date"], "2026-02-10");
    assert_eq!(json["end_date"], "2026-02-28");
    assert!(json["id"].is_number());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_overlapping_window_returns_409(pool: PgPool) {
    let (product_id, discount_id) = seeded(&pool).await;

    let response =
        create_discount(&pool, SELLER, product_id, 20.0, "2026-02-20", "2026-03-05").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "OVERLAP_CONFLICT");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains(&discount_id.to_string()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_shared_boundary_day_is_an_overlap(pool: PgPool) {
    let (product_id, _) = seeded(&pool).await;

    let response =
        create_discount(&pool, SELLER, product_id, 10.0, "2026-02-28", "2026-03-10").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_adjacent_window_is_accepted(pool: PgPool) {
    let (product_id, _) = seeded(&pool).await;

    let response =
        create_discount(&pool, SELLER, product_id, 10.0, "2026-03-01", "2026-03-10").await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_percent_above_hundred_returns_invalid_range(pool: PgPool) {
    let product_id = create_product(&pool, SELLER, "Star Fox", 20.0).await;

    let response =
        create_discount(&pool, SELLER, product_id, 150.0, "2026-02-10", "2026-02-28").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_RANGE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_end_before_start_returns_invalid_range(pool: PgPool) {
    let product_id = create_product(&pool, SELLER, "F-Zero", 20.0).await;

    for (start, end) in [("2026-02-28", "2026-02-10"), ("2026-02-10", "2026-02-10")] {
        let response = create_discount(&pool, SELLER, product_id, 10.0, start, end).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "INVALID_RANGE");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_impossible_date_returns_invalid_format(pool: PgPool) {
    let product_id = create_product(&pool, SELLER, "Pilotwings", 20.0).await;

    let response =
        create_discount(&pool, SELLER, product_id, 10.0, "2026-02-10", "2026-02-30").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_FORMAT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_product_returns_404(pool: PgPool) {
    let response = create_discount(&pool, SELLER, 999_999, 10.0, "2026-02-10", "2026-02-28").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_other_sellers_product_returns_403(pool: PgPool) {
    let product_id = create_product(&pool, SELLER, "Mother 3", 20.0).await;

    let response =
        create_discount(&pool, OTHER_SELLER, product_id, 10.0, "2026-02-10", "2026-02-28").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_seller_header_returns_401(pool: PgPool) {
    let product_id = create_product(&pool, SELLER, "Secret of Mana", 20.0).await;

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/discounts",
        serde_json::json!({
            "product_id": product_id,
            "percent": 10,
            "start_date": "2026-02-10",
            "end_date": "2026-02-28",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

// ---------------------------------------------------------------------------
// Update / remove
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_may_overlap_its_own_previous_range(pool: PgPool) {
    let (_, discount_id) = seeded(&pool).await;

    let response = put_json_as(
        common::build_test_app(pool),
        &format!("/api/v1/discounts/{discount_id}"),
        SELLER,
        serde_json::json!({
            "percent": 25,
            "start_date": "2026-02-12",
            "end_date": "2026-03-02",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_money(&json["percent"], 25.0);
    assert_eq!(json["end_date"], "2026-03-02");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_into_neighbouring_window_returns_409(pool: PgPool) {
    let (product_id, discount_id) = seeded(&pool).await;
    let response =
        create_discount(&pool, SELLER, product_id, 10.0, "2026-03-05", "2026-03-10").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = put_json_as(
        common::build_test_app(pool),
        &format!("/api/v1/discounts/{discount_id}"),
        SELLER,
        serde_json::json!({
            "percent": 15.5,
            "start_date": "2026-02-10",
            "end_date": "2026-03-05",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_missing_discount_returns_404(pool: PgPool) {
    let response = put_json_as(
        common::build_test_app(pool),
        "/api/v1/discounts/999999",
        SELLER,
        serde_json::json!({
            "percent": 10,
            "start_date": "2026-02-10",
            "end_date": "2026-02-28",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_remove_twice_returns_404_second_time(pool: PgPool) {
    let (_, discount_id) = seeded(&pool).await;
    let uri = format!("/api/v1/discounts/{discount_id}");

    let first = delete_as(common::build_test_app(pool.clone()), &uri, SELLER).await;
    assert_eq!(first.status(), StatusCode::NO_CONTENT);

    let second = delete_as(common::build_test_app(pool), &uri, SELLER).await;
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_remove_by_other_seller_returns_403(pool: PgPool) {
    let (_, discount_id) = seeded(&pool).await;

    let response = delete_as(
        common::build_test_app(pool),
        &format!("/api/v1/discounts/{discount_id}"),
        OTHER_SELLER,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Discount info
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_discount_info_applies_active_window(pool: PgPool) {
    let (product_id, discount_id) = seeded(&pool).await;

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/discount-info?productId={product_id}&price=20.00&asOf=2026-02-15"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["has_discount"], true);
    assert_money(&json["original_price"], 20.0);
    assert_money(&json["discount_percent"], 15.5);
    assert_money(&json["discount_amount"], 3.1);
    assert_money(&json["discounted_price"], 16.9);
    assert_eq!(json["discount_id"], discount_id);
    assert_eq!(json["start_date"], "2026-02-10");
    assert_eq!(json["end_date"], "2026-02-28");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_discount_info_inclusive_bounds(pool: PgPool) {
    let (product_id, _) = seeded(&pool).await;

    for (day, expected) in [
        ("2026-02-09", false),
        ("2026-02-10", true),
        ("2026-02-28", true),
        ("2026-03-01", false),
    ] {
        let response = get(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/discount-info?productId={product_id}&price=20&asOf={day}"),
        )
        .await;
        let json = body_json(response).await;
        assert_eq!(json["has_discount"], expected, "on {day}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_discount_info_without_discount(pool: PgPool) {
    let (product_id, _) = seeded(&pool).await;

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/discount-info?product_id={product_id}&price=20.00&as_of=2026-03-01"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["has_discount"], false);
    assert_money(&json["discount_percent"], 0.0);
    assert_money(&json["discount_amount"], 0.0);
    assert_money(&json["discounted_price"], 20.0);
    assert!(json["discount_id"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_discount_info_rejects_bad_input(pool: PgPool) {
    let (product_id, _) = seeded(&pool).await;

    let negative = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/discount-info?productId={product_id}&price=-1"),
    )
    .await;
    assert_eq!(negative.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(negative).await["code"], "INVALID_RANGE");

    let garbage = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/discount-info?productId={product_id}&price=cheap"),
    )
    .await;
    assert_eq!(body_json(garbage).await["code"], "INVALID_FORMAT");

    let unknown = get(
        common::build_test_app(pool),
        "/api/v1/discount-info?productId=999999&price=20",
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_discount_info_rejects_price_above_ceiling(pool: PgPool) {
    let (product_id, _) = seeded(&pool).await;

    let huge = get(
        common::build_test_app(pool.clone()),
        &format!(
            "/api/v1/discount-info?productId={product_id}&price=70000000000000000000000000000&asOf=2026-02-15"
        ),
    )
    .await;
    assert_eq!(huge.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(huge).await["code"], "INVALID_RANGE");

    let ceiling = get(
        common::build_test_app(pool),
        &format!("/api/v1/discount-info?productId={product_id}&price=99999999.99&asOf=2026-02-15"),
    )
    .await;
    assert_eq!(ceiling.status(), StatusCode::OK);
    let json = body_json(ceiling).await;
    assert_eq!(json["has_discount"], true);
    assert_money(&json["original_price"], 99_999_999.99);
}

// ---------------------------------------------------------------------------
// Listings and stats
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_active_upcoming_and_stats(pool: PgPool) {
    let (product_id, active_id) = seeded(&pool).await;
    let upcoming = create_discount(&pool, SELLER, product_id, 10.0, "2026-03-01", "2026-03-10").await;
    let upcoming_id = body_json(upcoming).await["id"].as_i64().unwrap();
    create_discount(&pool, SELLER, product_id, 30.0, "2026-01-01", "2026-01-31").await;
    // Starts beyond the 30-day look-ahead.
    create_discount(&pool, SELLER, product_id, 5.0, "2026-04-01", "2026-04-10").await;

    let active = body_json(
        get(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/discounts/active?seller_id={SELLER}&as_of=2026-02-15"),
        )
        .await,
    )
    .await;
    let ids: Vec<i64> = active["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![active_id]);

    let soon = body_json(
        get(
            common::build_test_app(pool.clone()),
            "/api/v1/discounts/upcoming?as_of=2026-02-15",
        )
        .await,
    )
    .await;
    let ids: Vec<i64> = soon["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![upcoming_id]);

    let wide = body_json(
        get(
            common::build_test_app(pool.clone()),
            "/api/v1/discounts/upcoming?as_of=2026-02-15&within_days=60",
        )
        .await,
    )
    .await;
    assert_eq!(wide["data"].as_array().unwrap().len(), 2);

    let stats = body_json(
        get(
            common::build_test_app(pool),
            &format!("/api/v1/discounts/stats?seller_id={SELLER}&as_of=2026-02-15"),
        )
        .await,
    )
    .await;
    assert_eq!(stats["data"]["total"], 4);
    assert_eq!(stats["data"]["active"], 1);
    assert_eq!(stats["data"]["upcoming"], 2);
    assert_eq!(stats["data"]["expired"], 1);
    // (15.5 + 10 + 30 + 5) / 4 = 15.125 -> 15.13
    assert_money(&stats["data"]["avg_percent"], 15.13);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_negative_within_days_returns_400(pool: PgPool) {
    let response = get(
        common::build_test_app(pool),
        "/api/v1/discounts/upcoming?within_days=-1",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_RANGE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stats_for_seller_without_discounts(pool: PgPool) {
    let response = get(
        common::build_test_app(pool),
        "/api/v1/discounts/stats?seller_id=42",
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 0);
    assert_money(&json["data"]["avg_percent"], 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_by_status(pool: PgPool) {
    let (product_id, _) = seeded(&pool).await;
    let next = create_discount(&pool, SELLER, product_id, 10.0, "2026-03-01", "2026-03-10").await;
    let next_id = body_json(next).await["id"].as_i64().unwrap();

    let json = body_json(
        get(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/discounts?seller_id={SELLER}&status=upcoming&as_of=2026-02-15"),
        )
        .await,
    )
    .await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], next_id);
    assert_eq!(data[0]["status"], "upcoming");

    let bad = get(
        common::build_test_app(pool),
        "/api/v1/discounts?status=someday",
    )
    .await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_discount_includes_status(pool: PgPool) {
    let (_, discount_id) = seeded(&pool).await;

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/discounts/{discount_id}?as_of=2026-03-01"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "expired");

    let missing = get(common::build_test_app(pool), "/api/v1/discounts/999999").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Audit trail
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_mutations_are_audited(pool: PgPool) {
    let (_, discount_id) = seeded(&pool).await;
    put_json_as(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/discounts/{discount_id}"),
        SELLER,
        serde_json::json!({"percent": 20, "start_date": "2026-02-10", "end_date": "2026-02-28"}),
    )
    .await;
    delete_as(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/discounts/{discount_id}"),
        SELLER,
    )
    .await;

    let json = body_json(
        get(
            common::build_test_app(pool),
            &format!("/api/v1/audit-logs?entity_type=discount&entity_id={discount_id}"),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["total"], 3);

    let actions: Vec<&str> = json["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action_type"].as_str().unwrap())
        .collect();
    assert_eq!(
        actions,
        vec!["discount_delete", "discount_update", "discount_create"]
    );

    let delete_entry = &json["data"]["items"][0];
    assert_eq!(delete_entry["user_id"], SELLER);
    assert_eq!(delete_entry["details_json"]["old"]["id"], discount_id);
    assert!(delete_entry["details_json"]["new"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rejected_mutation_is_not_audited(pool: PgPool) {
    let (product_id, _) = seeded(&pool).await;
    let response = post_json_as(
        common::build_test_app(pool.clone()),
        "/api/v1/discounts",
        SELLER,
        serde_json::json!({
            "product_id": product_id,
            "percent": 10,
            "start_date": "2026-02-20",
            "end_date": "2026-03-05",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(
        get(
            common::build_test_app(pool),
            "/api/v1/audit-logs?action_type=discount_create",
        )
        .await,
    )
    .await;
    assert_eq!(json["data"]["total"], 1);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_overlapping_creates_admit_one(pool: PgPool) {
    let product_id = create_product(&pool, SELLER, "Final Fantasy VI", 20.0).await;

    let mut handles = Vec::new();
    for (start, end) in [
        ("2026-02-10", "2026-02-20"),
        ("2026-02-15", "2026-02-25"),
        ("2026-02-20", "2026-02-28"),
    ] {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            create_discount(&pool, SELLER, product_id, 10.0, start, end)
                .await
                .status()
        }));
    }

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => conflicts += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(conflicts, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_audits_state_committed_while_waiting_for_lock(pool: PgPool) {
    let (product_id, discount_id) = seeded(&pool).await;

    // Another writer holds the product lock and changes the window.
    let mut writer = pool.begin().await.unwrap();
    sqlx::query("SELECT id FROM products WHERE id = $1 FOR UPDATE")
        .bind(product_id)
        .execute(&mut *writer)
        .await
        .unwrap();
    sqlx::query("UPDATE discount_windows SET percent = 25 WHERE id = $1")
        .bind(discount_id)
        .execute(&mut *writer)
        .await
        .unwrap();

    let app = common::build_test_app(pool.clone());
    let pending = tokio::spawn(async move {
        put_json_as(
            app,
            &format!("/api/v1/discounts/{discount_id}"),
            SELLER,
            serde_json::json!({"percent": 30, "start_date": "2026-02-10", "end_date": "2026-02-28"}),
        )
        .await
        .status()
    });
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    writer.commit().await.unwrap();
    assert_eq!(pending.await.unwrap(), StatusCode::OK);

    let json = body_json(
        get(
            common::build_test_app(pool),
            &format!("/api/v1/audit-logs?action_type=discount_update&entity_id={discount_id}"),
        )
        .await,
    )
    .await;
    let details = &json["data"]["items"][0]["details_json"];
    assert_money(&details["old"]["percent"], 25.0);
    assert_money(&details["new"]["percent"], 30.0);
}
