// Boundary handlers — one module per operation.
//
// Each handler is transport-agnostic: `(Arc<AuthContext>, request) ->
// Result<response, ApiError>`. The embedder binds them to its HTTP
// framework; `ApiError` carries the status code and the failure body.

pub mod activate;
pub mod check_email;
pub mod login;
pub mod register;
pub mod social_login;

pub use activate::{handle_activate, ActivateRequest, ActivateResponse};
pub use check_email::{handle_check_email, CheckEmailRequest, CheckEmailResponse};
pub use login::{handle_login, LoginRequest, LoginResponse};
pub use register::{handle_register, RegisterRequest, RegisterResponse};
pub use social_login::{handle_social_login, SocialLoginRequest, SocialLoginResponse};
