//! HTTP routes for reviews.
//!
//! - `GET    /api/reviews`                  list all reviews
//! - `GET    /api/reviews/filter`           reviews of a POS by approval flag
//! - `GET    /api/reviews/:id`              one review
//! - `POST   /api/reviews`                  create
//! - `PUT    /api/reviews/:id`              update text / POS
//! - `DELETE /api/reviews/:id`              delete
//! - `POST   /api/reviews/:id/approve`      approve as `user_id`

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::common::ReviewId;
use crate::domains::reviews::data::{ApproveQuery, ReviewData, ReviewFilterQuery, ReviewInput};
use crate::domains::reviews::ReviewRuleEngine;
use crate::server::ApiError;

/// State shared with the review handlers.
#[derive(Clone)]
pub struct ReviewsState {
    pub engine: Arc<ReviewRuleEngine>,
}

/// Build the axum router for review endpoints.
pub fn router(state: ReviewsState) -> Router {
    Router::new()
        .route("/api/reviews", get(list_reviews).post(create_review))
        .route("/api/reviews/filter", get(filter_reviews))
        .route(
            "/api/reviews/:id",
            get(get_review).put(update_review).delete(delete_review),
        )
        .route("/api/reviews/:id/approve", post(approve_review))
        .with_state(state)
}

fn require_text(input: &ReviewInput) -> Result<(), ApiError> {
    match input.trimmed_text() {
        Some(_) => Ok(()),
        None => Err(ApiError::BadRequest("Review text must not be blank".into())),
    }
}

async fn list_reviews(
    State(state): State<ReviewsState>,
) -> Result<Json<Vec<ReviewData>>, ApiError> {
    let reviews = state.engine.get_all().await?;
    Ok(Json(reviews.into_iter().map(ReviewData::from).collect()))
}

async fn get_review(
    State(state): State<ReviewsState>,
    Path(id): Path<ReviewId>,
) -> Result<Json<ReviewData>, ApiError> {
    let review = state.engine.get_by_id(id).await?;
    Ok(Json(review.into()))
}

async fn create_review(
    State(state): State<ReviewsState>,
    Json(input): Json<ReviewInput>,
) -> Result<(StatusCode, Json<ReviewData>), ApiError> {
    require_text(&input)?;
    if input.id.is_some() {
        return Err(ApiError::BadRequest(
            "ID must not be set when creating a review".into(),
        ));
    }

    let review = state.engine.upsert(input.into_new_review()).await?;
    Ok((StatusCode::CREATED, Json(review.into())))
}

async fn update_review(
    State(state): State<ReviewsState>,
    Path(id): Path<ReviewId>,
    Json(input): Json<ReviewInput>,
) -> Result<Json<ReviewData>, ApiError> {
    require_text(&input)?;
    if input.id.is_some_and(|body_id| body_id != id) {
        return Err(ApiError::BadRequest(format!(
            "ID in path ({}) does not match ID in body",
            id
        )));
    }

    // Author and approval count stay as stored
    let review = state.engine.edit(id, input.pos_id, input.review).await?;
    Ok(Json(review.into()))
}

async fn delete_review(
    State(state): State<ReviewsState>,
    Path(id): Path<ReviewId>,
) -> Result<StatusCode, ApiError> {
    state.engine.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn filter_reviews(
    State(state): State<ReviewsState>,
    Query(query): Query<ReviewFilterQuery>,
) -> Result<Json<Vec<ReviewData>>, ApiError> {
    tracing::debug!(pos_id = %query.pos_id, approved = query.approved, "Filtering reviews");
    let reviews = state.engine.filter(query.pos_id, query.approved).await?;
    Ok(Json(reviews.into_iter().map(ReviewData::from).collect()))
}

async fn approve_review(
    State(state): State<ReviewsState>,
    Path(id): Path<ReviewId>,
    Query(query): Query<ApproveQuery>,
) -> Result<Json<ReviewData>, ApiError> {
    tracing::debug!(review_id = %id, user_id = %query.user_id, "Approving review");
    let review = state.engine.approve(id, query.user_id).await?;
    Ok(Json(review.into()))
}
