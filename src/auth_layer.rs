use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;
use uuid::Uuid;

use crate::error::ServerError;
use crate::service::AppState;

const BEARER_SCHEME: &str = "Bearer";
const TOKEN_KEY_CONTEXT: &str = "social-backend 2024-06-01 bearer token v1";

/// Key used to mint and check bearer tokens.
///
/// A token is `<user id>.<hex mac>` where the mac is the blake3 keyed hash of
/// the user id bytes. Tokens don't expire; rotating `TOKEN_SECRET` revokes
/// all of them at once.
#[derive(Clone)]
pub struct TokenKey([u8; blake3::KEY_LEN]);

impl TokenKey {
    pub fn from_secret(secret: &str) -> Self {
        TokenKey(blake3::derive_key(TOKEN_KEY_CONTEXT, secret.as_bytes()))
    }

    pub fn mint(&self, user_id: Uuid) -> String {
        format!("{}.{}", user_id, hex::encode(self.mac(user_id).as_bytes()))
    }

    /// The user id the token was minted for, if the mac checks out.
    pub fn verify(&self, token: &str) -> Option<Uuid> {
        let (id_part, mac_hex) = token.split_once('.')?;
        let user_id = Uuid::parse_str(id_part).ok()?;
        let mut mac = [0u8; blake3::OUT_LEN];
        hex::decode_to_slice(mac_hex, &mut mac).ok()?;
        // blake3::Hash compares in constant time
        (self.mac(user_id) == blake3::Hash::from(mac)).then_some(user_id)
    }

    fn mac(&self, user_id: Uuid) -> blake3::Hash {
        blake3::keyed_hash(&self.0, user_id.as_bytes())
    }
}

// auth schemes are case-insensitive, the token itself is not
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let (scheme, token) = headers.get(header::AUTHORIZATION)?.to_str().ok()?.split_once(' ')?;
    scheme.eq_ignore_ascii_case(BEARER_SCHEME).then(|| token.trim())
}

/// Resolves the bearer token to an active [`crate::models::User`] and stores
/// it in the request extensions for handlers to pick up.
pub async fn bearer_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    debug!("authenticating request for {}", request.uri());

    let user_id = bearer_token(request.headers())
        .and_then(|token| state.token_key.verify(token))
        .ok_or(ServerError::Unauthenticated)?;

    let user = state
        .store
        .find_active_user(user_id)
        .await?
        .ok_or_else(|| {
            debug!("token for unknown or inactive user {user_id}");
            ServerError::Unauthenticated
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
