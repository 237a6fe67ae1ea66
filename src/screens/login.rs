use log::info;

use crate::api::{MailTransport, Reply, StatusReply};
use crate::domain::credentials::Credentials;
use crate::screens::Notice;
use crate::session::SharedSession;

pub const INVALID_LOGIN: &str = "Invalid email or password";
pub const MISSING_FIELDS: &str = "Enter your email and password";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoginPhase {
    #[default]
    Idle,
    Submitting(Credentials),
}

pub struct LoginController {
    session: SharedSession,
    pub email: String,
    pub password: String,
    phase: LoginPhase,
    notice: Option<Notice>,
}

impl LoginController {
    pub fn new(session: SharedSession) -> Self {
        Self {
            session,
            email: String::new(),
            password: String::new(),
            phase: LoginPhase::Idle,
            notice: None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, LoginPhase::Submitting(_))
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Moves to `Submitting` and returns the pair to authenticate with.
    /// `None` if a request is already in flight or the form is incomplete.
    pub fn begin(&mut self) -> Option<Credentials> {
        if self.is_submitting() {
            return None;
        }
        let credentials = Credentials::new(self.email.trim(), self.password.clone());
        if !credentials.is_complete() {
            self.notice = Some(Notice::error("Sign-in failed", MISSING_FIELDS));
            return None;
        }
        self.phase = LoginPhase::Submitting(credentials.clone());
        Some(credentials)
    }

    /// Applies the authenticate reply. On success the session is signed in
    /// and the accepted pair is returned.
    pub fn finish(&mut self, reply: StatusReply) -> Option<Credentials> {
        let LoginPhase::Submitting(credentials) = std::mem::take(&mut self.phase) else {
            return None;
        };
        match reply.into_result(INVALID_LOGIN) {
            Ok(()) => {
                info!("authenticated {}", credentials.email);
                self.notice = Some(Notice::success(
                    "Signed in",
                    format!("Welcome, {}", credentials.email),
                ));
                self.session.borrow_mut().sign_in(credentials.clone());
                Some(credentials)
            }
            Err(e) => {
                self.notice = Some(Notice::error("Sign-in failed", e.to_string()));
                None
            }
        }
    }

    pub fn submit(&mut self, transport: &dyn MailTransport) -> Option<Credentials> {
        let credentials = self.begin()?;
        let reply = transport.authenticate(&credentials);
        self.finish(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeTransport};
    use crate::api::{CONNECTION_ERROR, Reply};
    use crate::session::{MemoryStorage, Session, SessionStore};

    fn controller() -> (LoginController, SharedSession, MemoryStorage) {
        let storage = MemoryStorage::new();
        let session = Session::new(SessionStore::new(storage.clone())).shared();
        (LoginController::new(session.clone()), session, storage)
    }

    #[test]
    fn successful_login_persists_exact_pair() {
        let (mut login, session, storage) = controller();
        let transport = FakeTransport::new();
        login.email = "a@b.com".into();
        login.password = "x".into();

        let accepted = login.submit(&transport);

        let expected = Credentials::new("a@b.com", "x");
        assert_eq!(accepted, Some(expected.clone()));
        assert_eq!(session.borrow().credentials(), Some(&expected));
        assert_eq!(
            SessionStore::new(storage).load(),
            Some(expected.clone())
        );
        assert_eq!(transport.calls(), vec![Call::Authenticate(expected)]);
        assert!(!login.take_notice().unwrap().is_error());
        assert!(!login.is_submitting());
    }

    #[test]
    fn rejected_login_shows_service_error_and_returns_to_idle() {
        let (mut login, session, storage) = controller();
        let mut transport = FakeTransport::new();
        transport.auth = StatusReply::failed("Wrong password".into());
        login.email = "a@b.com".into();
        login.password = "bad".into();

        assert_eq!(login.submit(&transport), None);
        let notice = login.take_notice().unwrap();
        assert!(notice.is_error());
        assert_eq!(notice.message, "Wrong password");
        assert!(!login.is_submitting());
        assert!(!session.borrow().is_signed_in());
        assert_eq!(storage.peek(), None);
    }

    #[test]
    fn failure_without_message_uses_default_text() {
        let (mut login, _, _) = controller();
        let mut transport = FakeTransport::new();
        transport.auth = StatusReply::default();
        login.email = "a@b.com".into();
        login.password = "x".into();

        login.submit(&transport);
        assert_eq!(login.take_notice().unwrap().message, INVALID_LOGIN);
    }

    #[test]
    fn connection_failure_is_reported_generically() {
        let (mut login, _, _) = controller();
        let mut transport = FakeTransport::new();
        transport.auth = StatusReply::failed(CONNECTION_ERROR.into());
        login.email = "a@b.com".into();
        login.password = "x".into();

        login.submit(&transport);
        assert_eq!(login.take_notice().unwrap().message, "Connection error");
    }

    #[test]
    fn empty_fields_never_reach_the_transport() {
        let (mut login, _, _) = controller();
        let transport = FakeTransport::new();
        login.email = "a@b.com".into();

        assert_eq!(login.submit(&transport), None);
        assert!(transport.calls().is_empty());
        assert_eq!(login.take_notice().unwrap().message, MISSING_FIELDS);
    }

    #[test]
    fn second_begin_while_submitting_is_ignored() {
        let (mut login, _, _) = controller();
        login.email = "a@b.com".into();
        login.password = "x".into();

        assert!(login.begin().is_some());
        assert!(login.begin().is_none());
        assert!(login.is_submitting());
    }

    #[test]
    fn finish_without_pending_request_does_nothing() {
        let (mut login, session, _) = controller();
        assert_eq!(login.finish(StatusReply::ok()), None);
        assert!(!session.borrow().is_signed_in());
    }
}
