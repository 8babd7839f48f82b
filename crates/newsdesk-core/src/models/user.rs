use serde::{Deserialize, Serialize};

/// Body of `POST /api/user/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    pub token: String,
}
