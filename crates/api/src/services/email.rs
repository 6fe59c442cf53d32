//! Email service for account notifications.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. Account
//! flows never block on delivery: notification sends run on background
//! tasks with bounded retries, and terminal failures are logged, not
//! surfaced to the caller.

use std::time::Duration;

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use gxi_core::Email;

use crate::config::EmailConfig;

/// Delivery attempts before a notification is abandoned.
const MAX_SEND_ATTEMPTS: u32 = 3;

/// Wait between delivery attempts.
const RETRY_DELAY: Duration = Duration::from_secs(60);

/// HTML template for the welcome email.
#[derive(Template)]
#[template(path = "email/welcome.html")]
struct WelcomeEmailHtml<'a> {
    first_name: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Plain text template for the welcome email.
#[derive(Template)]
#[template(path = "email/welcome.txt")]
struct WelcomeEmailText<'a> {
    first_name: &'a str,
    email: &'a str,
    password: &'a str,
}

/// HTML template for the password recovery code email.
#[derive(Template)]
#[template(path = "email/otp_code.html")]
struct OtpCodeEmailHtml<'a> {
    code: &'a str,
}

/// Plain text template for the password recovery code email.
#[derive(Template)]
#[template(path = "email/otp_code.txt")]
struct OtpCodeEmailText<'a> {
    code: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Queue the post-registration welcome email, which carries the
    /// generated initial password.
    ///
    /// Fire-and-forget: runs on a background task with retries, and the
    /// registration response never waits for or learns about delivery.
    pub fn send_welcome_in_background(&self, to: &Email, first_name: &str, password: &str) {
        let service = self.clone();
        let to = to.clone();
        let first_name = first_name.to_owned();
        let password = password.to_owned();

        tokio::spawn(async move {
            service
                .send_with_retries("welcome", || {
                    service.send_welcome(&to, &first_name, &password)
                })
                .await;
        });
    }

    /// Queue a password recovery code email.
    ///
    /// Fire-and-forget like the welcome email: a recovery request succeeds
    /// even when SMTP is down, so an attacker cannot probe the mail path.
    pub fn send_otp_code_in_background(&self, to: &Email, code: &str) {
        let service = self.clone();
        let to = to.clone();
        let code = code.to_owned();

        tokio::spawn(async move {
            service
                .send_with_retries("otp_code", || service.send_otp_code(&to, &code))
                .await;
        });
    }

    /// Send the welcome email immediately.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_welcome(
        &self,
        to: &Email,
        first_name: &str,
        password: &str,
    ) -> Result<(), EmailError> {
        let email = to.as_str();
        let html = WelcomeEmailHtml {
            first_name,
            email,
            password,
        }
        .render()?;
        let text = WelcomeEmailText {
            first_name,
            email,
            password,
        }
        .render()?;

        self.send_multipart_email(email, "Welcome to GXI", &text, &html)
            .await
    }

    /// Send a password recovery code email immediately.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_otp_code(&self, to: &Email, code: &str) -> Result<(), EmailError> {
        let html = OtpCodeEmailHtml { code }.render()?;
        let text = OtpCodeEmailText { code }.render()?;

        self.send_multipart_email(to.as_str(), "Your GXI password reset code", &text, &html)
            .await
    }

    /// Run a send closure with bounded retries, logging the terminal outcome.
    async fn send_with_retries<F, Fut>(&self, kind: &str, send: F)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<(), EmailError>>,
    {
        for attempt in 1..=MAX_SEND_ATTEMPTS {
            match send().await {
                Ok(()) => return,
                Err(e) if attempt < MAX_SEND_ATTEMPTS => {
                    tracing::warn!(
                        kind = %kind,
                        attempt = attempt,
                        error = %e,
                        "Email send failed, will retry"
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(e) => {
                    tracing::error!(
                        kind = %kind,
                        attempts = MAX_SEND_ATTEMPTS,
                        error = %e,
                        "Email send failed, giving up"
                    );
                }
            }
        }
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}
