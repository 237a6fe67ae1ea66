use log::info;
use std::time::{Duration, Instant};

use crate::api::{MailTransport, RegisterReply, Reply};
use crate::screens::Notice;

pub const MIN_PASSWORD_LEN: usize = 6;
/// How long the confirmation stays up before switching to the login screen.
pub const LOGIN_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

pub const FIELDS_REQUIRED: &str = "Please fill in all fields";
pub const PASSWORD_MISMATCH: &str = "Passwords do not match";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const REGISTER_FAILED: &str = "Could not create account";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RegisterPhase {
    #[default]
    Idle,
    Submitting,
    /// `mailbox` is the address the service confirmed.
    Registered { at: Instant, mailbox: String },
}

#[derive(Default)]
pub struct RegisterController {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    phase: RegisterPhase,
    notice: Option<Notice>,
}

impl RegisterController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &RegisterPhase {
        &self.phase
    }

    /// Fields may only be edited while no request is pending or done.
    pub fn is_idle(&self) -> bool {
        self.phase == RegisterPhase::Idle
    }

    pub fn registered_mailbox(&self) -> Option<&str> {
        match &self.phase {
            RegisterPhase::Registered { mailbox, .. } => Some(mailbox),
            _ => None,
        }
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Local checks, in the order they are reported.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.full_name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
        {
            return Err(FIELDS_REQUIRED);
        }
        if self.password != self.confirm_password {
            return Err(PASSWORD_MISMATCH);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(PASSWORD_TOO_SHORT);
        }
        Ok(())
    }

    /// Validates the form; only a valid form yields a request and enters `Submitting`.
    pub fn begin(&mut self) -> Option<RegisterRequest> {
        if !self.is_idle() {
            return None;
        }
        if let Err(msg) = self.validate() {
            self.notice = Some(Notice::error("Error", msg));
            return None;
        }
        self.phase = RegisterPhase::Submitting;
        Some(RegisterRequest {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }

    pub fn finish(&mut self, reply: RegisterReply, now: Instant) {
        if self.phase != RegisterPhase::Submitting {
            return;
        }
        match reply.into_result(REGISTER_FAILED) {
            Ok(assigned) => {
                let mailbox = assigned.unwrap_or_else(|| self.email.trim().to_string());
                info!("registered mailbox {mailbox}");
                self.notice = Some(Notice::success(
                    "Registration complete",
                    format!("Mailbox {mailbox} created"),
                ));
                self.phase = RegisterPhase::Registered { at: now, mailbox };
            }
            Err(e) => {
                self.notice = Some(Notice::error("Registration failed", e.to_string()));
                self.phase = RegisterPhase::Idle;
            }
        }
    }

    pub fn submit(&mut self, transport: &dyn MailTransport, now: Instant) {
        if let Some(req) = self.begin() {
            let reply = transport.register(&req.full_name, &req.email, &req.password);
            self.finish(reply, now);
        }
    }

    /// True once the post-registration delay has elapsed.
    pub fn ready_for_login(&self, now: Instant) -> bool {
        match self.phase {
            RegisterPhase::Registered { at, .. } => now.duration_since(at) >= LOGIN_REDIRECT_DELAY,
            _ => false,
        }
    }
}
