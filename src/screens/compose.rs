use log::info;

use crate::api::{MailTransport, Reply, StatusReply};
use crate::domain::credentials::Credentials;
use crate::domain::email::Message;
use crate::screens::Notice;
use crate::session::SharedSession;

pub const RECIPIENT_REQUIRED: &str = "Recipient is required";
pub const SEND_FAILED: &str = "Could not send message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub credentials: Credentials,
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub struct ComposeController {
    credentials: Credentials,
    pub to: String,
    pub subject: String,
    pub body: String,
    sending: bool,
    notice: Option<Notice>,
}

impl ComposeController {
    pub fn new(session: &SharedSession) -> Option<Self> {
        let credentials = session.borrow().credentials()?.clone();
        Some(Self {
            credentials,
            to: String::new(),
            subject: String::new(),
            body: String::new(),
            sending: false,
            notice: None,
        })
    }

    /// Pre-fills recipient and subject from the message being answered.
    pub fn reply_to(session: &SharedSession, original: &Message) -> Option<Self> {
        let mut c = Self::new(session)?;
        c.to = original.from.clone();
        c.subject = reply_subject(&original.subject);
        Some(c)
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn begin(&mut self) -> Option<SendRequest> {
        if self.sending {
            return None;
        }
        let to = self.to.trim();
        if to.is_empty() {
            self.notice = Some(Notice::error("Error", RECIPIENT_REQUIRED));
            return None;
        }
        self.sending = true;
        Some(SendRequest {
            credentials: self.credentials.clone(),
            to: to.to_string(),
            subject: self.subject.clone(),
            body: self.body.clone(),
        })
    }

    /// Returns true when the message went out; the form is cleared in that case.
    pub fn finish(&mut self, reply: StatusReply) -> bool {
        if !self.sending {
            return false;
        }
        self.sending = false;
        match reply.into_result(SEND_FAILED) {
            Ok(()) => {
                info!("sent message to {}", self.to.trim());
                self.notice = Some(Notice::success(
                    "Message sent",
                    format!("Sent to {}", self.to.trim()),
                ));
                self.to.clear();
                self.subject.clear();
                self.body.clear();
                true
            }
            Err(e) => {
                self.notice = Some(Notice::error("Sending failed", e.to_string()));
                false
            }
        }
    }

    pub fn submit(&mut self, transport: &dyn MailTransport) -> bool {
        let Some(req) = self.begin() else {
            return false;
        };
        let reply = transport.send_message(&req.credentials, &req.to, &req.subject, &req.body);
        self.finish(reply)
    }
}

fn reply_subject(subject: &str) -> String {
    let s = subject.trim();
    if s.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("re:")) {
        s.to_string()
    } else {
        format!("Re: {s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeTransport, message};
    use crate::session::{MemoryStorage, Session, SessionStore};

    fn session() -> SharedSession {
        let mut s = Session::new(SessionStore::new(MemoryStorage::new()));
        s.sign_in(Credentials::new("a@b.com", "x"));
        s.shared()
    }

    #[test]
    fn requires_a_signed_in_session() {
        let s = Session::new(SessionStore::new(MemoryStorage::new())).shared();
        assert!(ComposeController::new(&s).is_none());
    }

    #[test]
    fn sends_and_clears_the_form() {
        let transport = FakeTransport::new();
        let mut c = ComposeController::new(&session()).unwrap();
        c.to = " bob@b.com ".into();
        c.subject = "Hi".into();
        c.body = "Hello Bob".into();

        assert!(c.submit(&transport));
        assert_eq!(
            transport.calls(),
            vec![Call::Send {
                to: "bob@b.com".into(),
                subject: "Hi".into(),
                body: "Hello Bob".into()
            }]
        );
        assert!(c.to.is_empty() && c.subject.is_empty() && c.body.is_empty());
        assert!(!c.take_notice().unwrap().is_error());
    }

    #[test]
    fn missing_recipient_is_rejected_locally() {
        let transport = FakeTransport::new();
        let mut c = ComposeController::new(&session()).unwrap();
        c.body = "orphan".into();
        assert!(!c.submit(&transport));
        assert!(transport.calls().is_empty());
        assert_eq!(c.take_notice().unwrap().message, RECIPIENT_REQUIRED);
    }

    #[test]
    fn failure_keeps_the_draft() {
        let mut transport = FakeTransport::new();
        transport.send = StatusReply::failed("Mailbox full".into());
        let mut c = ComposeController::new(&session()).unwrap();
        c.to = "bob@b.com".into();
        c.body = "draft".into();

        assert!(!c.submit(&transport));
        assert!(!c.is_sending());
        assert_eq!(c.body, "draft");
        assert_eq!(c.take_notice().unwrap().message, "Mailbox full");
    }

    #[test]
    fn reply_prefills_sender_and_subject_once() {
        let s = session();
        let c = ComposeController::reply_to(&s, &message(1, "ann@b.com", "Docs")).unwrap();
        assert_eq!(c.to, "ann@b.com");
        assert_eq!(c.subject, "Re: Docs");

        let again = ComposeController::reply_to(&s, &message(2, "bob@b.com", "RE: Docs")).unwrap();
        assert_eq!(again.subject, "RE: Docs");

        let cyrillic = ComposeController::reply_to(&s, &message(3, "n@b.com", "Встреча")).unwrap();
        assert_eq!(cyrillic.subject, "Re: Встреча");
    }
}
