//! Remote calls run on short-lived threads; results come back over a channel
//! that the event loop drains between input polls.

use log::debug;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use crate::api::{FetchReply, MailTransport, RegisterReply, StatusReply};
use crate::domain::credentials::Credentials;
use crate::screens::compose::SendRequest;
use crate::screens::inbox::FetchTicket;
use crate::screens::register::RegisterRequest;

#[derive(Debug)]
pub enum Job {
    Authenticate(Credentials),
    Register(RegisterRequest),
    Fetch(FetchTicket),
    Send(SendRequest),
}

#[derive(Debug)]
pub enum Done {
    Authenticated(StatusReply),
    Registered(RegisterReply),
    Fetched { id: u64, reply: FetchReply },
    Sent(StatusReply),
}

pub fn run_job(transport: &dyn MailTransport, job: Job) -> Done {
    match job {
        Job::Authenticate(c) => Done::Authenticated(transport.authenticate(&c)),
        Job::Register(r) => Done::Registered(transport.register(&r.full_name, &r.email, &r.password)),
        Job::Fetch(t) => Done::Fetched {
            id: t.id,
            reply: transport.fetch_messages(&t.credentials, &t.folder, t.limit),
        },
        Job::Send(s) => Done::Sent(transport.send_message(&s.credentials, &s.to, &s.subject, &s.body)),
    }
}

pub fn spawn(transport: Arc<dyn MailTransport>, job: Job, tx: Sender<Done>) {
    thread::spawn(move || {
        let done = run_job(transport.as_ref(), job);
        // receiver gone means the UI already quit
        if tx.send(done).is_err() {
            debug!("dropping reply after shutdown");
        }
    });
}
