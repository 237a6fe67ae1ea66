use std::collections::VecDeque;
use std::sync::Mutex;

use crate::api::{FetchReply, MailTransport, RegisterReply, StatusReply};
use crate::domain::credentials::Credentials;
use crate::domain::email::Message;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Register { full_name: String, email: String },
    Authenticate(Credentials),
    Fetch { folder: String, limit: u32 },
    Send { to: String, subject: String, body: String },
}

/// In-memory stand-in for the mail service, recording every call.
#[derive(Default)]
pub struct FakeTransport {
    pub auth: StatusReply,
    pub register: RegisterReply,
    pub send: StatusReply,
    fetches: Mutex<VecDeque<FetchReply>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            auth: StatusReply::ok(),
            register: RegisterReply {
                success: true,
                ..Default::default()
            },
            send: StatusReply::ok(),
            ..Default::default()
        }
    }

    pub fn queue_fetch(&self, reply: FetchReply) -> &Self {
        self.fetches.lock().unwrap().push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl MailTransport for FakeTransport {
    fn register(&self, full_name: &str, email: &str, _password: &str) -> RegisterReply {
        self.record(Call::Register {
            full_name: full_name.into(),
            email: email.into(),
        });
        self.register.clone()
    }

    fn authenticate(&self, credentials: &Credentials) -> StatusReply {
        self.record(Call::Authenticate(credentials.clone()));
        self.auth.clone()
    }

    fn fetch_messages(&self, _credentials: &Credentials, folder: &str, limit: u32) -> FetchReply {
        self.record(Call::Fetch {
            folder: folder.into(),
            limit,
        });
        self.fetches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| FetchReply::with_emails(vec![]))
    }

    fn send_message(
        &self,
        _credentials: &Credentials,
        to: &str,
        subject: &str,
        body: &str,
    ) -> StatusReply {
        self.record(Call::Send {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        });
        self.send.clone()
    }
}

pub fn message(id: u32, from: &str, subject: &str) -> Message {
    Message {
        id,
        from: from.into(),
        subject: subject.into(),
        preview: format!("{subject}..."),
        date: "10:30".into(),
        is_read: false,
        has_attachment: false,
        is_starred: false,
        content: format!("Body of {subject}"),
    }
}
