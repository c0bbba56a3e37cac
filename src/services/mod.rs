pub mod auth_service;
pub mod contact_service;
pub mod email_service;
pub mod token_service;
pub mod user_service;

pub use auth_service::{AuthService, AuthServiceError, ConfirmationOutcome};
pub use contact_service::ContactService;
pub use email_service::{create_email_service, EmailService, MockEmailService, SmtpEmailService};
pub use token_service::{TokenScope, TokenService};
pub use user_service::{UserService, UserServiceError};
