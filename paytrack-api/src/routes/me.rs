/// Caller identity endpoint
///
/// ```text
/// GET /api/me?userId=3
/// ```
///
/// ```json
/// { "userId": 3, "source": "query" }
/// ```

use axum::Json;
use paytrack_shared::auth::identity::CallerIdentity;

use crate::extract::Caller;

pub async fn whoami(Caller(caller): Caller) -> Json<CallerIdentity> {
    Json(caller)
}
