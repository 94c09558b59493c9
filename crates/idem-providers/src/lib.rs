//! # idem-providers
//!
//! Provider-facing half of the idem identity engine. Each verifier turns a
//! raw token into a verified `ResolvedIdentity` or a typed `VerifierError`:
//!
//! - **Google** — signed ID token first (JWKS signature, audience, issuer),
//!   falling back to the userinfo endpoint when the token turns out to be
//!   an access token.
//! - **Facebook** — graph API lookup with the token as a query credential.
//! - **Apple** — RS256 ID token against Apple's published keys; the display
//!   name arrives out-of-band on first login only.
//!
//! Outbound calls go through the `HttpClient` trait so tests can script
//! provider responses without a network.

pub mod apple;
pub mod claims;
pub mod facebook;
pub mod google;
pub mod http;
pub mod identity;
pub mod key_cache;
pub mod provider;

pub use apple::{AppleVerifier, APPLE_ISSUER};
pub use facebook::{FacebookVerifier, FACEBOOK_GRAPH_URL};
pub use google::{GoogleVerifier, GOOGLE_ISSUERS, GOOGLE_USERINFO_URL};
pub use http::{
    HttpClient, HttpClientError, HttpResponse, MockHttpClient, RecordedRequest, ReqwestHttpClient,
};
pub use identity::{pseudo_email, ResolvedIdentity};
pub use key_cache::{Jwk, JwkSet, ProviderKeyCache, APPLE_JWKS_URL, GOOGLE_JWKS_URL};
pub use provider::{Provider, TokenVerifier, VerifierError};
