//! One-shot operations behind the `fetch`, `send` and `logout` subcommands.

use anyhow::{Result, anyhow};

use crate::api::MailTransport;
use crate::domain::email::Message;
use crate::screens::compose::{ComposeController, SEND_FAILED};
use crate::screens::inbox::{FetchOutcome, InboxController, LOAD_FAILED};
use crate::session::SharedSession;

pub const NOT_SIGNED_IN: &str = "No stored session; sign in with `rs_webmail tui` first";

/// Loads one page of `folder` for the stored session.
pub fn fetch(
    session: SharedSession,
    transport: &dyn MailTransport,
    folder: &str,
    limit: u32,
) -> Result<Vec<Message>> {
    let mut inbox = InboxController::open(session, limit).ok_or_else(|| anyhow!(NOT_SIGNED_IN))?;
    if inbox.current_folder().id != folder && inbox.select_folder(folder).is_none() {
        return Err(anyhow!("unknown folder '{folder}'"));
    }

    match inbox.load(transport) {
        FetchOutcome::Loaded(_) => Ok(inbox.messages().to_vec()),
        _ => {
            let msg = inbox
                .take_notice()
                .map(|n| n.message)
                .unwrap_or_else(|| LOAD_FAILED.to_string());
            Err(anyhow!(msg))
        }
    }
}

/// One listing line: id, flags (N unread, * starred, @ attachment), date, sender, subject.
pub fn listing_line(m: &Message) -> String {
    let flags = format!(
        "{}{}{}",
        if m.is_read { ' ' } else { 'N' },
        if m.is_starred { '*' } else { ' ' },
        if m.has_attachment { '@' } else { ' ' },
    );
    format!("{:>6} {flags} {:<16} {:<30} {}", m.id, m.date, m.from, m.subject)
}

/// Sends a message for the stored session and returns the confirmation text.
pub fn send(
    session: &SharedSession,
    transport: &dyn MailTransport,
    to: &str,
    subject: &str,
    body: &str,
) -> Result<String> {
    let mut compose = ComposeController::new(session).ok_or_else(|| anyhow!(NOT_SIGNED_IN))?;
    compose.to = to.to_string();
    compose.subject = subject.to_string();
    compose.body = body.to_string();

    let sent = compose.submit(transport);
    let message = compose.take_notice().map(|n| n.message);
    if sent {
        Ok(message.unwrap_or_default())
    } else {
        Err(anyhow!(message.unwrap_or_else(|| SEND_FAILED.to_string())))
    }
}

/// Clears the stored session; false when there was nothing to clear.
pub fn logout(session: &SharedSession) -> bool {
    let was_signed_in = session.borrow().is_signed_in();
    session.borrow_mut().sign_out();
    was_signed_in
}
