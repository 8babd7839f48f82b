//! Password login, trying a remembered password first.

use anyhow::Result;
use tracing::warn;

use newsdesk_core::NewsApi;

/// Log in with `saved` when there is one. If the server rejects it,
/// `forget_saved` runs and the password is asked for through `prompt`.
///
/// Returns the password the server accepted.
pub async fn login_with_fallback(
    api: &NewsApi,
    username: &str,
    saved: Option<String>,
    forget_saved: impl FnOnce(),
    prompt: impl FnOnce() -> Result<String>,
) -> Result<String> {
    if let Some(password) = saved {
        match api.login(username, &password).await {
            Ok(_) => return Ok(password),
            Err(e) if e.is_auth_expired() => {
                warn!(username, "Remembered password was rejected");
                forget_saved();
            }
            Err(e) => return Err(e.into()),
        }
    }

    let password = prompt()?;
    api.login(username, &password).await?;
    Ok(password)
}
