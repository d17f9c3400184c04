//! Home page endpoint

use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

use crate::{error::AppResult, models::summary::CatalogSummary, AppState};

/// Cookie carrying the visitor session id
pub const SESSION_COOKIE: &str = "sessionid";

/// Session id of the visitor, issuing a new cookie when it is absent or not a UUID
fn visitor_session(jar: CookieJar) -> (CookieJar, Uuid) {
    if let Some(id) = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
    {
        return (jar, id);
    }

    let id = Uuid::new_v4();
    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    (jar.add(cookie), id)
}

/// Catalogue counts and the number of earlier visits in this session
#[utoipa::path(
    get,
    path = "/",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalogue summary", body = CatalogSummary)
    )
)]
pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<CatalogSummary>)> {
    let (jar, session_id) = visitor_session(jar);

    let mut summary = state.services.catalog.summary().await?;
    summary.num_visits = state
        .services
        .sessions
        .record_visit(&session_id.to_string())
        .await?;

    Ok((jar, Json(summary)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_session_is_kept() {
        let id = Uuid::new_v4();
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, id.to_string()));

        let (jar, session) = visitor_session(jar);
        assert_eq!(session, id);
        assert_eq!(jar.get(SESSION_COOKIE).unwrap().value(), id.to_string());
    }

    #[test]
    fn test_missing_session_gets_new_cookie() {
        let (jar, session) = visitor_session(CookieJar::new());
        assert_eq!(jar.get(SESSION_COOKIE).unwrap().value(), session.to_string());
    }

    #[test]
    fn test_forged_session_is_replaced() {
        let forged = "x".repeat(4096);
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, forged.clone()));

        let (jar, session) = visitor_session(jar);
        let value = jar.get(SESSION_COOKIE).unwrap().value().to_string();
        assert_ne!(value, forged);
        assert_eq!(value, session.to_string());
    }
}
