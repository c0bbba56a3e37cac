use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use std::env;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Failed to build email message: {0}")]
    MessageBuild(String),
    #[error("Failed to send email: {0}")]
    SendFailed(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send_confirmation_email(
        &self,
        to_email: &str,
        username: &str,
        token: &str,
    ) -> Result<(), EmailError>;
}

fn confirmation_url(base_url: &str, token: &str) -> String {
    format!(
        "{}/api/auth/confirmed_email/{}",
        base_url.trim_end_matches('/'),
        token
    )
}

/// Logs confirmation links instead of sending them.
pub struct MockEmailService {
    base_url: String,
}

impl MockEmailService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send_confirmation_email(
        &self,
        to_email: &str,
        username: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        tracing::info!(
            to = to_email,
            username,
            link = %confirmation_url(&self.base_url, token),
            "[MOCK EMAIL] Confirm your email"
        );
        Ok(())
    }
}

pub struct SmtpEmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_email: String,
    from_name: String,
    base_url: String,
}

impl SmtpEmailService {
    pub fn new(base_url: impl Into<String>) -> Result<Self, EmailError> {
        let smtp_host = env::var("SMTP_HOST")
            .map_err(|_| EmailError::ConfigError("SMTP_HOST not set".to_string()))?;
        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .map_err(|_| EmailError::ConfigError("Invalid SMTP_PORT".to_string()))?;
        let smtp_username = env::var("SMTP_USERNAME")
            .map_err(|_| EmailError::ConfigError("SMTP_USERNAME not set".to_string()))?;
        let smtp_password = env::var("SMTP_PASSWORD")
            .map_err(|_| EmailError::ConfigError("SMTP_PASSWORD not set".to_string()))?;
        let from_email = env::var("SMTP_FROM_EMAIL")
            .map_err(|_| EmailError::ConfigError("SMTP_FROM_EMAIL not set".to_string()))?;
        let from_name = env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Contacts".to_string());

        let encryption = env::var("SMTP_ENCRYPTION").unwrap_or_else(|_| "starttls".to_string());

        let credentials = Credentials::new(smtp_username, smtp_password);

        let mailer = match encryption.to_lowercase().as_str() {
            "tls" => AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp_host)
                .map_err(|e| EmailError::ConfigError(format!("SMTP relay error: {}", e)))?
                .port(smtp_port)
                .credentials(credentials)
                .build(),
            "starttls" => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp_host)
                .map_err(|e| EmailError::ConfigError(format!("SMTP starttls error: {}", e)))?
                .port(smtp_port)
                .credentials(credentials)
                .build(),
            "none" => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp_host)
                .port(smtp_port)
                .credentials(credentials)
                .build(),
            _ => {
                return Err(EmailError::ConfigError(format!(
                    "Invalid SMTP_ENCRYPTION value: {}. Use 'tls', 'starttls', or 'none'",
                    encryption
                )))
            }
        };

        Ok(Self {
            mailer,
            from_email,
            from_name,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send_confirmation_email(
        &self,
        to_email: &str,
        username: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let link = confirmation_url(&self.base_url, token);

        let html_body = format!(
            r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
</head>
<body style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h1 style="color: #333;">Hello, {}!</h1>
    <p>Thanks for registering. Please confirm your email address:</p>
    <p style="text-align: center; margin: 30px 0;">
        <a href="{}" style="background-color: #4CAF50; color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; display: inline-block;">Confirm Email</a>
    </p>
    <p style="color: #666; font-size: 14px; word-break: break-all;">{}</p>
</body>
</html>
"#,
            username, link, link
        );

        let email = Message::builder()
            .from(
                format!("{} <{}>", self.from_name, self.from_email)
                    .parse()
                    .map_err(|e| {
                        EmailError::MessageBuild(format!("Invalid from address: {}", e))
                    })?,
            )
            .to(to_email
                .parse()
                .map_err(|e| EmailError::MessageBuild(format!("Invalid to address: {}", e)))?)
            .subject("Confirm your email")
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .map_err(|e| EmailError::MessageBuild(e.to_string()))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        Ok(())
    }
}

pub fn create_email_service(base_url: &str) -> Arc<dyn EmailService> {
    if env::var("SMTP_HOST").is_ok() {
        match SmtpEmailService::new(base_url) {
            Ok(service) => {
                tracing::info!("Using SMTP email service");
                Arc::new(service)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize SMTP email service: {}. Falling back to mock service",
                    e
                );
                Arc::new(MockEmailService::new(base_url))
            }
        }
    } else {
        tracing::info!(
            "SMTP not configured. Using mock email service (emails will be logged to console)"
        );
        Arc::new(MockEmailService::new(base_url))
    }
}
