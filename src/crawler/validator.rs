//! User existence check

use crate::crawler::session::CrawlSession;
use crate::ExporterError;

/// Returns whether `user` resolves to a real profile
///
/// A profile page showing the not-found heading yields `Ok(false)`; fetch
/// failures and a 404 without that heading are errors.
pub async fn validate_user(session: &CrawlSession, user: &str) -> Result<bool, ExporterError> {
    let url = session.urls().profile_url(user);
    let exists = session.profile_exists(&url).await?;

    if exists {
        tracing::debug!("Profile {} exists", url);
    } else {
        tracing::info!("User '{}' not found at {}", user, url);
    }
    Ok(exists)
}
