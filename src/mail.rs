use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use uuid::Uuid;

use crate::{
    config::SmtpConfig,
    error::{AppError, AppResult},
    payments::to_major_units,
};

type SmtpTransport = AsyncSmtpTransport<Tokio1Executor>;

#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> AppResult<()>;
}

pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let transport = SmtpTransport::starttls_relay(&config.host)?
            .credentials(creds)
            .port(config.port)
            .build();
        let from: Mailbox = config.from.parse()?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &Email) -> AppResult<()> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| AppError::BadRequest(format!("Invalid recipient email: {e}")))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to build email: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to send email: {e}")))?;
        tracing::info!(to = %email.to, subject = %email.subject, "email sent");
        Ok(())
    }
}

/// Used when no SMTP relay is configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> AppResult<()> {
        tracing::info!(to = %email.to, subject = %email.subject, "email (not sent, smtp disabled)");
        Ok(())
    }
}

pub async fn send_best_effort(mailer: &dyn Mailer, email: Email) {
    if let Err(err) = mailer.send(&email).await {
        tracing::warn!(error = %err, to = %email.to, "email delivery failed");
    }
}

pub fn order_placed(to: &str, order_id: Uuid, amount: i64) -> Email {
    Email {
        to: to.to_string(),
        subject: format!("Great! Order ID {order_id} has been successfully purchased"),
        body: format!(
            "Congratulations, you have made your order of {}. This order will be delivered to you soon.",
            to_major_units(amount)
        ),
    }
}

pub fn payment_failed(to: &str, order_id: Uuid) -> Email {
    Email {
        to: to.to_string(),
        subject: format!("Payment for order {order_id} failed"),
        body: "Your payment could not be completed. Please try again from your cart.".to_string(),
    }
}

pub fn login_code(to: &str, otp: &str) -> Email {
    Email {
        to: to.to_string(),
        subject: "Your login code".to_string(),
        body: format!("Your verification code is {otp}. It expires in 10 minutes."),
    }
}
