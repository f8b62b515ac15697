//! Identity boundary. Authentication happens upstream (gateway / session
//! service); this middleware only lifts the already-authenticated user id
//! out of the request and makes it available to handlers. Authorization
//! (creator-equality) is checked in the services.

use axum::{
    body::Body,
    extract::Request,
    http::header::HeaderName,
    middleware::Next,
    response::Response,
};

pub static USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: String,
}

pub async fn require_identity(mut request: Request, next: Next) -> Response {
    let user_id = request
        .headers()
        .get(&USER_ID_HEADER)
        .and_then(|hv| hv.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    if let Some(id) = user_id {
        request.extensions_mut().insert(AuthenticatedUser { id });
        return next.run(request).await;
    }

    Response::builder()
        .status(401)
        .body(Body::from("Unauthorized - missing identity"))
        .unwrap()
}
