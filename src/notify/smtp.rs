use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::{self, AsyncSmtpTransportBuilder};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{Notice, NotifyError};
use crate::config::{SmtpConfig, SmtpTls};

type Transport = AsyncSmtpTransport<Tokio1Executor>;

fn transport_builder(config: &SmtpConfig) -> Result<AsyncSmtpTransportBuilder, NotifyError> {
    let relay_error = |e: smtp::Error| NotifyError::Delivery(format!("SMTP relay error: {e}"));
    match config.tls {
        SmtpTls::Implicit => Transport::relay(&config.host).map_err(relay_error),
        SmtpTls::StartTls => Transport::starttls_relay(&config.host).map_err(relay_error),
        SmtpTls::Disabled => Ok(Transport::builder_dangerous(&config.host)),
    }
}

/// Sends notices over SMTP. The TLS mode comes from [`SmtpTls`].
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Transport,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig, from_name: &str, from_address: &str) -> Result<Self, NotifyError> {
        let transport = transport_builder(config)?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: format!("{from_name} <{from_address}>"),
        })
    }

    pub async fn send(&self, to: &str, notice: &Notice) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| NotifyError::Address(format!("from {}: {e}", self.from)))?,
            )
            .to(to
                .parse()
                .map_err(|e| NotifyError::Address(format!("to {to}: {e}")))?)
            .subject(notice.subject())
            .header(ContentType::TEXT_HTML)
            .body(notice.html_body()?)
            .map_err(|e| NotifyError::Build(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;
        Ok(())
    }
}
