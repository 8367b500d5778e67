//! HTTP handlers for restaurant endpoints.
//!
//! Restaurants are created and read over the API but never deleted: wines and
//! sales both hang off a restaurant row, so removal is an operational task
//! rather than an API call.

use crate::{
    AppState,
    api::models::{
        pagination::PaginatedResponse,
        restaurants::{ListRestaurantsQuery, RestaurantCreate, RestaurantResponse},
    },
    db::handlers::Restaurants,
    errors::{Error, Result},
    types::RestaurantId,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

#[utoipa::path(
    post,
    path = "/restaurants",
    tag = "restaurants",
    summary = "Register a restaurant",
    request_body = RestaurantCreate,
    responses(
        (status = 201, description = "Restaurant created", body = RestaurantResponse),
        (status = 400, description = "Invalid restaurant data or email already registered"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_restaurant(
    State(state): State<AppState>,
    Json(request): Json<RestaurantCreate>,
) -> Result<(StatusCode, Json<RestaurantResponse>)> {
    request.validate().map_err(|message| Error::BadRequest { message })?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Restaurants::new(&mut conn);

    // Duplicate email is reported as a validation failure, not a 409; a
    // lost race still trips the unique constraint on the insert.
    if repo.get_by_email(&request.email).await?.is_some() {
        return Err(Error::BadRequest {
            message: "Restaurant with this email already exists".to_string(),
        });
    }

    let created = repo.create(&request.into()).await?;

    Ok((StatusCode::CREATED, Json(RestaurantResponse::from(created))))
}

#[utoipa::path(
    get,
    path = "/restaurants/{id}",
    tag = "restaurants",
    summary = "Get a restaurant",
    params(
        ("id" = uuid::Uuid, Path, description = "Restaurant ID"),
    ),
    responses(
        (status = 200, description = "Restaurant", body = RestaurantResponse),
        (status = 404, description = "Restaurant not found"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<RestaurantId>,
) -> Result<Json<RestaurantResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Restaurants::new(&mut conn);

    let restaurant = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Restaurant".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(RestaurantResponse::from(restaurant)))
}

#[utoipa::path(
    get,
    path = "/restaurants",
    tag = "restaurants",
    summary = "List restaurants",
    params(ListRestaurantsQuery),
    responses(
        (status = 200, description = "Paginated list of restaurants", body = PaginatedResponse<RestaurantResponse>),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_restaurants(
    State(state): State<AppState>,
    Query(query): Query<ListRestaurantsQuery>,
) -> Result<Json<PaginatedResponse<RestaurantResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Restaurants::new(&mut conn);

    let page = query.pagination.page();
    let page_size = query.pagination.page_size();

    let total = repo.count().await?;
    let restaurants = repo.list(query.pagination.offset(), page_size).await?;

    let items: Vec<RestaurantResponse> = restaurants.into_iter().map(RestaurantResponse::from).collect();

    Ok(Json(PaginatedResponse::new(items, total, page, page_size)))
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::{pagination::PaginatedResponse, restaurants::RestaurantResponse},
        test_utils::*,
    };
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use sqlx::SqlitePool;
    use uuid::Uuid;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_and_get_restaurant(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app
            .post("/api/v1/restaurants")
            .json(&json!({
                "name": "Maison Lumiere",
                "email": "cellar@maisonlumiere.example",
                "city": "Portland",
                "state": "OR"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let created: RestaurantResponse = response.json();
        assert_eq!(created.name, "Maison Lumiere");
        assert!(created.is_active);
        assert_eq!(created.subscription_tier, "trial");

        let response = app.get(&format!("/api/v1/restaurants/{}", created.id)).await;
        response.assert_status_ok();
        let fetched: RestaurantResponse = response.json();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.email, "cellar@maisonlumiere.example");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_missing_restaurant_is_404(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app.get(&format!("/api/v1/restaurants/{}", Uuid::new_v4())).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_email_is_rejected(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let body = json!({
            "name": "Maison Lumiere",
            "email": "cellar@maisonlumiere.example"
        });

        app.post("/api/v1/restaurants").json(&body).await.assert_status(StatusCode::CREATED);

        let response = app.post("/api/v1/restaurants").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = response.json();
        assert_eq!(error["error"], "Restaurant with this email already exists");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_invalid_email_is_rejected(pool: SqlitePool) {
        let app = create_test_app(pool).await;

        let response = app
            .post("/api/v1/restaurants")
            .json(&json!({
                "name": "Maison Lumiere",
                "email": "front-desk"
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = response.json();
        assert_eq!(error["error"], "Invalid email address: front-desk");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_restaurants_paginated(pool: SqlitePool) {
        let app = create_test_app(pool.clone()).await;

        for i in 0..3 {
            create_test_restaurant(&pool, &format!("Restaurant {i}"), &format!("r{i}@example.com")).await;
        }

        let response = app.get("/api/v1/restaurants?page=1&page_size=2").await;
        response.assert_status_ok();
        let page: PaginatedResponse<RestaurantResponse> = response.json();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages, 2);

        let response = app.get("/api/v1/restaurants?page=2&page_size=2").await;
        let page: PaginatedResponse<RestaurantResponse> = response.json();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.page, 2);
    }
}
