//! Screen controllers: per-screen UI state plus the request lifecycle
//! (validate, call the transport, turn the reply into a notice).
//!
//! Controllers never block on I/O themselves except through the `submit`
//! helpers; the terminal front end uses the `begin`/`finish` halves so the
//! remote call can run on a worker thread.

pub mod compose;
pub mod inbox;
pub mod login;
pub mod register;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient notification shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}
