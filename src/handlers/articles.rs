//! Blog article and product review endpoints. Bodies are passed through.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::handlers::envelope::{or_default, ProxyError};
use crate::handlers::{custom_api, fetch_cached};
use crate::http::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ArticleQuery {
    pub per_page: Option<String>,
    pub page: Option<String>,
    pub category: Option<String>,
}

pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ArticleQuery>,
) -> Result<Json<Value>, ProxyError> {
    let url = state
        .client
        .endpoint(
            &custom_api(&["posts"]),
            &[
                ("per_page", or_default(query.per_page.as_deref(), "10")),
                ("page", or_default(query.page.as_deref(), "1")),
                ("category", query.category.as_deref().unwrap_or_default()),
            ],
        )
        .map_err(|e| ProxyError::from_upstream("articles", e, ""))?;

    let (data, _) = fetch_cached(&state, "articles", url, state.article_ttl)
        .await
        .map_err(|e| ProxyError::from_upstream("articles", e, "Failed to fetch articles"))?;
    Ok(Json(data))
}

pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ProxyError> {
    let url = state
        .client
        .endpoint(&custom_api(&["post", id.as_str()]), &[])
        .map_err(|e| ProxyError::from_upstream("article", e, ""))?;

    let (data, _) = fetch_cached(&state, "article", url, state.article_ttl)
        .await
        .map_err(|e| ProxyError::from_upstream("article", e, "Article not found"))?;
    Ok(Json(data))
}

pub async fn get_product_reviews(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ProxyError> {
    let url = state
        .client
        .endpoint(&custom_api(&["product", id.as_str(), "review"]), &[])
        .map_err(|e| ProxyError::from_upstream("reviews", e, ""))?;

    let (data, _) = fetch_cached(&state, "reviews", url, state.article_ttl)
        .await
        .map_err(|e| ProxyError::from_upstream("reviews", e, "Reviews not found"))?;
    Ok(Json(data))
}
