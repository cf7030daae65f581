pub mod extractors;
pub mod middleware;
pub mod token;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

pub use extractors::AuthenticatedClaims;
pub use middleware::AccessGuard;
pub use token::{Claims, TokenService};

/// Body of `POST /jwt`.
///
/// The frontend posts the signed-in user's email; any further fields are signed
/// into the token as extra claims.
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(email)]
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response structure for `POST /jwt`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}
