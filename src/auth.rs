// Bearer token extraction for gateway handlers.
//
// The gateway does not validate tokens itself; it forwards them to the
// marketplace API, which answers 401 when they are bad.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use tracing::warn;

use crate::error::AppError;

async fn bearer_from(parts: &mut Parts) -> Option<String> {
    parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .ok()
        .map(|TypedHeader(Authorization(bearer))| bearer.token().trim().to_string())
        .filter(|token| !token.is_empty())
}

// Caller's token when present; anonymous calls get None
#[derive(Debug, Clone, Default)]
pub struct ForwardedToken(pub Option<String>);

impl ForwardedToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ForwardedToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ForwardedToken(bearer_from(parts).await))
    }
}

// For routes that make no sense anonymously (me, mutations, admin)
#[derive(Debug, Clone)]
pub struct RequiredToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for RequiredToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match bearer_from(parts).await {
            Some(token) => Ok(RequiredToken(token)),
            None => {
                warn!("Missing or invalid Authorization header on {}", parts.uri.path());
                Err(AppError::Unauthorized("Missing or invalid Authorization header".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Request};

    fn parts(auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/me");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn forwarded_token_is_optional() {
        let mut with = parts(Some("Bearer abc"));
        let token = ForwardedToken::from_request_parts(&mut with, &()).await.unwrap();
        assert_eq!(token.as_deref(), Some("abc"));

        let mut without = parts(None);
        let token = ForwardedToken::from_request_parts(&mut without, &()).await.unwrap();
        assert_eq!(token.as_deref(), None);

        let mut basic = parts(Some("Basic dXNlcjpwdw=="));
        let token = ForwardedToken::from_request_parts(&mut basic, &()).await.unwrap();
        assert_eq!(token.as_deref(), None);
    }

    #[tokio::test]
    async fn required_token_rejects_anonymous_calls() {
        let mut without = parts(None);
        let rejection = RequiredToken::from_request_parts(&mut without, &()).await.unwrap_err();
        assert!(matches!(rejection, AppError::Unauthorized(_)));

        let mut with = parts(Some("Bearer xyz"));
        let RequiredToken(token) = RequiredToken::from_request_parts(&mut with, &()).await.unwrap();
        assert_eq!(token, "xyz");
    }
}
