use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

pub const BUYER_ID_HEADER: &str = "x-buyer-id";

/// The calling buyer, as asserted by the upstream authentication layer in the
/// `x-buyer-id` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buyer(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for Buyer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(BUYER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized(format!("missing {} header", BUYER_ID_HEADER)))?;

        match raw.trim().parse::<i64>() {
            Ok(id) if id > 0 => Ok(Buyer(id)),
            _ => Err(AppError::Unauthorized(format!(
                "invalid {} header",
                BUYER_ID_HEADER
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<Buyer, AppError> {
        let mut builder = Request::builder().uri("/orders");
        if let Some(value) = header {
            builder = builder.header(BUYER_ID_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Buyer::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn extracts_buyer_from_header() {
        assert_eq!(extract(Some("42")).await.unwrap(), Buyer(42));
    }

    #[tokio::test]
    async fn rejects_missing_header() {
        assert!(matches!(extract(None).await, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn rejects_non_numeric_or_non_positive_ids() {
        assert!(extract(Some("abc")).await.is_err());
        assert!(extract(Some("0")).await.is_err());
        assert!(extract(Some("-3")).await.is_err());
    }
}
