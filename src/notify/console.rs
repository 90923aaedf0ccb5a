use tracing::info;

use super::{Notice, NotifyError};

/// Logs notices instead of sending them. Used for local development.
#[derive(Clone, Debug, Default)]
pub struct ConsoleMailer;

impl ConsoleMailer {
    pub fn new() -> Self {
        Self
    }

    pub fn send(&self, to: &str, notice: &Notice) -> Result<(), NotifyError> {
        let check_in_code = match notice {
            Notice::Confirmed { pass, .. } => Some(pass.encode()?),
            _ => None,
        };

        info!(
            to = %to,
            kind = notice.kind(),
            subject = notice.subject(),
            check_in_code = check_in_code.as_deref().unwrap_or("-"),
            "email (console transport)"
        );
        Ok(())
    }
}
