//! Accept header content negotiation.
//!
//! [`MediaTypeMatcher`] walks the media ranges of an `Accept` header in
//! preference order. [`Negotiator`] uses it to pick, among the content types
//! a server can produce, the one to respond with.

#[cfg(feature = "axum")]
pub mod axum;
mod candidate;
mod content_type;
mod error;
mod matcher;
mod negotiator;

pub use candidate::MediaTypeCandidate;
pub use content_type::{FilterContentType, ParameterMatching};
pub use error::Error;
pub use matcher::{MatcherOptions, MediaTypeMatcher};
pub use negotiator::{AsNegotiationStr, Negotiator};

fn matches_wildcard(maybe_wildcard: &str, specific: &str) -> bool {
    let maybe_wildcard = maybe_wildcard.trim();
    maybe_wildcard == "*" || maybe_wildcard.eq_ignore_ascii_case(specific)
}
