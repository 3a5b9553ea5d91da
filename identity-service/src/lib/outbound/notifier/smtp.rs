use async_trait::async_trait;
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;

use crate::config::EmailConfig;
use crate::domain::auth::errors::NotifierError;
use crate::domain::auth::models::EmailMessage;
use crate::domain::auth::ports::Notifier;

/// Email delivery over SMTP with STARTTLS.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpNotifier {
    /// Build a notifier from mailer configuration.
    ///
    /// # Arguments
    /// * `config` - SMTP relay host, port, optional credentials, and sender
    ///
    /// # Returns
    /// Configured notifier with a pooled transport
    ///
    /// # Errors
    /// * `Transport` - Relay parameters were rejected
    pub fn new(config: &EmailConfig) -> Result<Self, NotifierError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| NotifierError::Transport(e.to_string()))?
            .port(config.smtp_port);

        if let (Some(user), Some(password)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifierError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|e: lettre::address::AddressError| {
                        NotifierError::Address(e.to_string())
                    })?,
            )
            .to(message
                .to
                .parse()
                .map_err(|e: lettre::address::AddressError| NotifierError::Address(e.to_string()))?)
            .subject(message.subject)
            .multipart(MultiPart::alternative_plain_html(
                message.text_body,
                message.html_body,
            ))
            .map_err(|e| NotifierError::Build(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotifierError::Transport(e.to_string()))?;

        tracing::debug!(to = %message.to, "Notification email delivered");
        Ok(())
    }
}
