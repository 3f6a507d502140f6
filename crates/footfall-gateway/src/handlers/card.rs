use crate::error::{AppError, Result};
use crate::model::CardQuery;
use crate::state::AppState;
use crate::writings::WritingSource;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use footfall_seeded::{
    prepare_social_writing, prepare_writing, CardLayout, CardOptions, SocialLayout, Theme,
};
use tracing::{debug, warn};

const CARD_CACHE_CONTROL: &str = "public, max-age=86400, immutable";
const SOCIAL_CACHE_CONTROL: &str = "public, max-age=3600, immutable";
pub const MISSING_WRITING: &str = "This writing does not exist.";

pub async fn card_handler(
    Path(slug): Path<String>,
    Query(query): Query<CardQuery>,
    State(state): State<AppState>,
) -> Result<Response> {
    let source = load_writing(&state, &slug).await?;
    let card = CardLayout::build(&prepare_writing(&source), &slug, card_options(&query));
    Ok(([(header::CACHE_CONTROL, CARD_CACHE_CONTROL)], Json(card)).into_response())
}

/// Square dark layout for sharing on social feeds. Takes no options.
pub async fn social_card_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let source = load_writing(&state, &slug).await?;
    let layout = SocialLayout::build(&prepare_social_writing(&source), &slug);
    Ok(([(header::CACHE_CONTROL, SOCIAL_CACHE_CONTROL)], Json(layout)).into_response())
}

async fn load_writing(state: &AppState, slug: &str) -> Result<String> {
    if !WritingSource::is_valid_slug(slug) {
        return Err(AppError::BadRequest(format!("invalid slug '{slug}'")));
    }

    state
        .writings()
        .load(slug)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| {
            warn!(slug, "Layout requested for missing writing");
            AppError::NotFound(MISSING_WRITING.to_string())
        })
}

fn card_options(query: &CardQuery) -> CardOptions {
    let theme = match query.theme.as_deref() {
        None => Theme::default(),
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            debug!(error = %e, "Falling back to default theme");
            Theme::default()
        }),
    };

    let defaults = CardOptions::default();
    CardOptions::builder()
        .theme(theme)
        .width(query.width.unwrap_or(defaults.width))
        .height(query.height.unwrap_or(defaults.height))
        .build()
}
