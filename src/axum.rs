use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use axum_core::{
    extract::{FromRef, FromRequestParts},
    response::{IntoResponse, Response},
};
use http::{header::ACCEPT, request::Parts, StatusCode};
use thiserror::Error as ThisError;

use crate::{Error, Negotiator};

/// Extracts the value negotiated from the request's `Accept` header.
///
/// Falls back to the first supported value when the header is missing or
/// accepts none of them.
#[derive(Clone, Debug)]
pub struct Negotiation<T>(pub T);

impl<T> Negotiation<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Negotiation<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S, T> FromRequestParts<S> for Negotiation<T>
where
    Arc<Negotiator<T>>: FromRef<S>,
    S: Send + Sync,
    T: Clone + Send + Sync,
{
    type Rejection = NegotiationError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let negotiator = Arc::<Negotiator<T>>::from_ref(state);
        let res = match parts.headers.get(ACCEPT) {
            Some(header) => {
                let header = header
                    .to_str()
                    .map_err(|_| NegotiationError::InvalidAcceptHeader)?;
                negotiator
                    .negotiate(header)
                    .map_err(NegotiationError::NegotiationFailure)?
            }
            None => None,
        };

        Ok(Negotiation(
            res.unwrap_or_else(|| negotiator.unwrap_first()).clone(),
        ))
    }
}

#[derive(ThisError, Eq, PartialEq, Debug)]
pub enum NegotiationError {
    #[error("invalid accept header")]
    InvalidAcceptHeader,
    #[error("negotiation failure: {0}")]
    NegotiationFailure(Error),
}

impl IntoResponse for NegotiationError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}
