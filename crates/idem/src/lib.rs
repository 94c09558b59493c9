// idem — main library crate
//
// Wires together crypto, the identity resolver, the user reconciler, and the
// boundary handlers. Embedders construct an `AuthContext` with their store
// and HTTP client, then call the `routes::handle_*` functions from whatever
// transport they use.

pub mod context;
pub mod crypto;
pub mod reconciler;
pub mod resolver;
pub mod routes;

pub use context::AuthContext;
pub use reconciler::UserReconciler;
pub use resolver::IdentityResolver;

pub use idem_core::{IdemOptions, User, UserStore};
pub use idem_providers::{HttpClient, Provider, ReqwestHttpClient, ResolvedIdentity};
