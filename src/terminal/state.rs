use log::debug;
use std::time::{Duration, Instant};

use crate::screens::Notice;
use crate::screens::compose::ComposeController;
use crate::screens::inbox::InboxController;
use crate::screens::login::LoginController;
use crate::screens::register::RegisterController;
use crate::session::SharedSession;
use crate::terminal::worker::{Done, Job};

/// How long a notice stays in the status line.
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Folders,
    Messages,
    Body,
}

/// Text form with a focused field.
pub trait TextForm {
    /// (label, value, secret)
    fn fields(&self) -> Vec<(&'static str, &str, bool)>;
    fn active(&self) -> usize;
    fn set_active(&mut self, idx: usize);
    fn input_mut(&mut self) -> &mut String;

    fn next_field(&mut self) {
        let n = self.fields().len();
        self.set_active((self.active() + 1) % n);
    }

    fn prev_field(&mut self) {
        let n = self.fields().len();
        self.set_active((self.active() + n - 1) % n);
    }
}

pub struct LoginForm {
    pub ctl: LoginController,
    pub field: usize,
}

impl TextForm for LoginForm {
    fn fields(&self) -> Vec<(&'static str, &str, bool)> {
        vec![
            ("Email", self.ctl.email.as_str(), false),
            ("Password", self.ctl.password.as_str(), true),
        ]
    }
    fn active(&self) -> usize {
        self.field
    }
    fn set_active(&mut self, idx: usize) {
        self.field = idx;
    }
    fn input_mut(&mut self) -> &mut String {
        match self.field {
            0 => &mut self.ctl.email,
            _ => &mut self.ctl.password,
        }
    }
}

pub struct RegisterForm {
    pub ctl: RegisterController,
    pub field: usize,
}

impl TextForm for RegisterForm {
    fn fields(&self) -> Vec<(&'static str, &str, bool)> {
        vec![
            ("Full name", self.ctl.full_name.as_str(), false),
            ("Email", self.ctl.email.as_str(), false),
            ("Password", self.ctl.password.as_str(), true),
            ("Confirm password", self.ctl.confirm_password.as_str(), true),
        ]
    }
    fn active(&self) -> usize {
        self.field
    }
    fn set_active(&mut self, idx: usize) {
        self.field = idx;
    }
    fn input_mut(&mut self) -> &mut String {
        match self.field {
            0 => &mut self.ctl.full_name,
            1 => &mut self.ctl.email,
            2 => &mut self.ctl.password,
            _ => &mut self.ctl.confirm_password,
        }
    }
}

pub struct ComposeForm {
    pub ctl: ComposeController,
    pub field: usize,
}

impl ComposeForm {
    pub const BODY: usize = 2;

    pub fn new(ctl: ComposeController) -> Self {
        // replies already have a recipient
        let field = if ctl.to.is_empty() { 0 } else { Self::BODY };
        Self { ctl, field }
    }
}

impl TextForm for ComposeForm {
    fn fields(&self) -> Vec<(&'static str, &str, bool)> {
        vec![
            ("To", self.ctl.to.as_str(), false),
            ("Subject", self.ctl.subject.as_str(), false),
            ("Message", self.ctl.body.as_str(), false),
        ]
    }
    fn active(&self) -> usize {
        self.field
    }
    fn set_active(&mut self, idx: usize) {
        self.field = idx;
    }
    fn input_mut(&mut self) -> &mut String {
        match self.field {
            0 => &mut self.ctl.to,
            1 => &mut self.ctl.subject,
            _ => &mut self.ctl.body,
        }
    }
}

pub struct InboxView {
    pub ctl: InboxController,
    pub pane: Pane,
    pub folder_cursor: usize,
    pub compose: Option<ComposeForm>,
    pub searching: bool,
    pub body_scroll: u16,
}

impl InboxView {
    fn new(ctl: InboxController) -> Self {
        Self {
            ctl,
            pane: Pane::Messages,
            folder_cursor: 0,
            compose: None,
            searching: false,
            body_scroll: 0,
        }
    }

    pub fn cycle_pane(&mut self) {
        self.pane = match self.pane {
            Pane::Folders => Pane::Messages,
            Pane::Messages => Pane::Body,
            Pane::Body => Pane::Folders,
        };
    }

    pub fn scroll_body(&mut self, delta: i32) {
        if delta < 0 {
            self.body_scroll = self.body_scroll.saturating_sub(delta.unsigned_abs() as u16);
        } else {
            self.body_scroll = self.body_scroll.saturating_add(delta as u16);
        }
    }
}

pub enum Screen {
    Login(LoginForm),
    Register(RegisterForm),
    Inbox(Box<InboxView>),
}

pub struct App {
    pub session: SharedSession,
    pub page_size: u32,
    pub screen: Screen,
    pub notice: Option<(Notice, Instant)>,
    pub quit: bool,
}

impl App {
    /// Starts on the inbox when the session was restored, on the login screen otherwise.
    /// The returned job is the initial folder fetch, if any.
    pub fn start(session: SharedSession, page_size: u32) -> (Self, Option<Job>) {
        let mut app = Self {
            screen: Screen::Login(LoginForm {
                ctl: LoginController::new(session.clone()),
                field: 0,
            }),
            session,
            page_size,
            notice: None,
            quit: false,
        };
        let job = if app.session.borrow().is_signed_in() {
            app.show_inbox()
        } else {
            None
        };
        (app, job)
    }

    pub fn show_login(&mut self, email: Option<String>) {
        let mut ctl = LoginController::new(self.session.clone());
        let field = match email {
            Some(e) => {
                ctl.email = e;
                1
            }
            None => 0,
        };
        self.screen = Screen::Login(LoginForm { ctl, field });
    }

    pub fn show_register(&mut self) {
        self.screen = Screen::Register(RegisterForm {
            ctl: RegisterController::new(),
            field: 0,
        });
    }

    /// Opens the inbox for the current session and returns the fetch for its first folder.
    pub fn show_inbox(&mut self) -> Option<Job> {
        let Some(ctl) = InboxController::open(self.session.clone(), self.page_size) else {
            self.show_login(None);
            return None;
        };
        let mut view = InboxView::new(ctl);
        let ticket = view.ctl.refresh();
        self.screen = Screen::Inbox(Box::new(view));
        Some(Job::Fetch(ticket))
    }

    pub fn logout(&mut self) {
        let previous = std::mem::replace(
            &mut self.screen,
            Screen::Login(LoginForm {
                ctl: LoginController::new(self.session.clone()),
                field: 0,
            }),
        );
        if let Screen::Inbox(view) = previous {
            view.ctl.logout();
        }
    }

    pub fn post(&mut self, notice: Notice) {
        self.notice = Some((notice, Instant::now()));
    }

    /// Moves any pending notice from the active controllers to the status line.
    pub fn collect_notice(&mut self) {
        let notice = match &mut self.screen {
            Screen::Login(f) => f.ctl.take_notice(),
            Screen::Register(f) => f.ctl.take_notice(),
            Screen::Inbox(v) => {
                let from_compose = v.compose.as_mut().and_then(|c| c.ctl.take_notice());
                from_compose.or_else(|| v.ctl.take_notice())
            }
        };
        if let Some(n) = notice {
            self.post(n);
        }
    }

    /// Applies a worker result to the screen that asked for it. Results for a
    /// screen that has since been replaced are dropped.
    pub fn on_done(&mut self, done: Done) -> Option<Job> {
        let mut signed_in = false;
        match (&mut self.screen, done) {
            (Screen::Login(form), Done::Authenticated(reply)) => {
                signed_in = form.ctl.finish(reply).is_some();
            }
            (Screen::Register(form), Done::Registered(reply)) => {
                form.ctl.finish(reply, Instant::now());
            }
            (Screen::Inbox(view), Done::Fetched { id, reply }) => {
                view.ctl.apply(id, reply);
                view.body_scroll = 0;
            }
            (Screen::Inbox(view), Done::Sent(reply)) => {
                if let Some(compose) = view.compose.as_mut()
                    && compose.ctl.finish(reply)
                {
                    if let Some(n) = compose.ctl.take_notice() {
                        self.notice = Some((n, Instant::now()));
                    }
                    view.compose = None;
                }
            }
            (_, done) => debug!("discarding result for a closed screen: {done:?}"),
        }
        self.collect_notice();
        if signed_in { self.show_inbox() } else { None }
    }

    /// Time-driven transitions: notice expiry and the post-registration redirect.
    pub fn tick(&mut self, now: Instant) {
        if let Some((_, at)) = &self.notice
            && now.duration_since(*at) >= NOTICE_TTL
        {
            self.notice = None;
        }
        if let Screen::Register(form) = &self.screen
            && form.ctl.ready_for_login(now)
        {
            let email = form
                .ctl
                .registered_mailbox()
                .unwrap_or(form.ctl.email.trim())
                .to_string();
            self.show_login(Some(email));
        }
    }
}
