//! Guest notifications.
//!
//! Every RSVP outcome maps to exactly one [`Notice`]. Delivery happens on a
//! spawned task after the state change has committed; failures are logged
//! and never reach the caller.

mod console;
#[cfg(test)]
mod recording;
mod smtp;

pub use console::ConsoleMailer;
#[cfg(test)]
pub use recording::{RecordingMailer, Sent};
pub use smtp::SmtpMailer;

use std::io::Cursor;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};
use serde::Serialize;
use uuid::Uuid;

use crate::models::rsvp::{Rsvp, RsvpStatus};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("invalid address: {0}")]
    Address(String),
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
    #[error("failed to encode check-in pass: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to render check-in QR code: {0}")]
    Qr(String),
}

/// Target edge length of the rendered QR image, in pixels.
const QR_SIZE: u32 = 256;
/// Quiet zone around the symbol, in modules.
const QR_QUIET_ZONE: u32 = 4;

/// Day-of check-in credential, scanned at the door.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckInPass {
    #[serde(rename = "rsvpID")]
    pub rsvp_id: Uuid,
    #[serde(rename = "guestName")]
    pub guest_name: String,
    pub phone: String,
}

impl CheckInPass {
    pub fn for_rsvp(rsvp: &Rsvp) -> Self {
        Self {
            rsvp_id: rsvp.id,
            guest_name: rsvp.guest_name.clone(),
            phone: rsvp.phone.clone(),
        }
    }

    /// The JSON the door scanner reads.
    pub fn payload(&self) -> Result<String, NotifyError> {
        Ok(serde_json::to_string(self)?)
    }

    /// URL-safe base64 of the JSON payload, printed under the QR code for
    /// manual entry.
    pub fn encode(&self) -> Result<String, NotifyError> {
        Ok(URL_SAFE_NO_PAD.encode(self.payload()?))
    }

    /// The payload as a PNG QR code at medium error correction.
    pub fn qr_png(&self) -> Result<Vec<u8>, NotifyError> {
        let code = QrCode::with_error_correction_level(self.payload()?, EcLevel::M)
            .map_err(|e| NotifyError::Qr(e.to_string()))?;

        let modules = code.width() as u32;
        let span = modules + 2 * QR_QUIET_ZONE;
        let scale = (QR_SIZE / span).max(1);
        let img = GrayImage::from_fn(span * scale, span * scale, |x, y| {
            let (mx, my) = (x / scale, y / scale);
            let inside = (QR_QUIET_ZONE..QR_QUIET_ZONE + modules).contains(&mx)
                && (QR_QUIET_ZONE..QR_QUIET_ZONE + modules).contains(&my);
            let dark = inside
                && code[((mx - QR_QUIET_ZONE) as usize, (my - QR_QUIET_ZONE) as usize)]
                    == Color::Dark;
            if dark { Luma([0]) } else { Luma([255]) }
        });

        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| NotifyError::Qr(format!("failed to encode PNG: {e}")))?;
        Ok(buf.into_inner())
    }

    /// `data:` URL embedding [`Self::qr_png`], for inline `<img>` use.
    pub fn qr_data_url(&self) -> Result<String, NotifyError> {
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(self.qr_png()?)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Confirmed {
        guest_name: String,
        guests: i32,
        pass: CheckInPass,
    },
    Received {
        guest_name: String,
    },
    Rejected {
        guest_name: String,
    },
}

impl Notice {
    pub fn for_rsvp(rsvp: &Rsvp) -> Self {
        let guest_name = rsvp.guest_name.clone();
        match rsvp.status {
            RsvpStatus::Approved => Self::Confirmed {
                guest_name,
                guests: rsvp.guests,
                pass: CheckInPass::for_rsvp(rsvp),
            },
            RsvpStatus::Pending => Self::Received { guest_name },
            RsvpStatus::Rejected => Self::Rejected { guest_name },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Confirmed { .. } => "confirmed",
            Self::Received { .. } => "received",
            Self::Rejected { .. } => "rejected",
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            Self::Confirmed { .. } => "Your RSVP is Confirmed - See you there!",
            Self::Received { .. } => "We've Received Your RSVP!",
            Self::Rejected { .. } => "An Update on Your RSVP",
        }
    }

    /// Guest-supplied text is HTML-escaped before it reaches the body.
    pub fn html_body(&self) -> Result<String, NotifyError> {
        let body = match self {
            Self::Confirmed {
                guest_name,
                guests,
                pass,
            } => {
                let guest_name = html_escape::encode_text(guest_name);
                let qr = pass.qr_data_url()?;
                let code = pass.encode()?;
                format!(
                    r#"<p>Dear {guest_name},</p>
<p>Your RSVP for {guests} guest(s) is confirmed. We can't wait to celebrate with you!</p>
<p>Please show this QR code at the entrance on the day:</p>
<p><img src="{qr}" alt="Check-in QR code" width="{QR_SIZE}" height="{QR_SIZE}"></p>
<p style="font-family: monospace; word-break: break-all;">{code}</p>"#
                )
            }
            Self::Received { guest_name } => {
                let guest_name = html_escape::encode_text(guest_name);
                format!(
                    "<p>Dear {guest_name},</p>\n\
                     <p>Thank you for your RSVP. We have received it and will confirm \
                     your place shortly.</p>"
                )
            }
            Self::Rejected { guest_name } => {
                let guest_name = html_escape::encode_text(guest_name);
                format!(
                    "<p>Dear {guest_name},</p>\n\
                     <p>Thank you for your interest. Unfortunately we are unable to \
                     accommodate your RSVP this time.</p>"
                )
            }
        };
        Ok(body)
    }
}

#[derive(Clone)]
pub enum Mailer {
    Console(ConsoleMailer),
    Smtp(SmtpMailer),
    #[cfg(test)]
    Recording(RecordingMailer),
}

impl Mailer {
    pub async fn send(&self, to: &str, notice: &Notice) -> Result<(), NotifyError> {
        match self {
            Self::Console(m) => m.send(to, notice),
            Self::Smtp(m) => m.send(to, notice).await,
            #[cfg(test)]
            Self::Recording(m) => m.send(to, notice),
        }
    }
}

#[derive(Clone)]
pub struct Notifier {
    mailer: Mailer,
}

impl Notifier {
    pub fn new(mailer: Mailer) -> Self {
        Self { mailer }
    }

    /// Fire-and-forget delivery of the notice matching the RSVP's status.
    pub fn dispatch(&self, rsvp: &Rsvp) {
        let mailer = self.mailer.clone();
        let to = rsvp.email.clone();
        let rsvp_id = rsvp.id;
        let notice = Notice::for_rsvp(rsvp);

        tokio::spawn(async move {
            match mailer.send(&to, &notice).await {
                Ok(()) => tracing::debug!(%rsvp_id, kind = notice.kind(), "notification sent"),
                Err(e) => tracing::warn!(
                    %rsvp_id,
                    kind = notice.kind(),
                    error = %e,
                    "notification failed"
                ),
            }
        });
    }
}
