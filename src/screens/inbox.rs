use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::api::{FetchReply, MailTransport, Reply};
use crate::domain::credentials::Credentials;
use crate::domain::email::{EmailId, Folder, Message};
use crate::screens::Notice;
use crate::session::SharedSession;

pub const LOAD_FAILED: &str = "Failed to load messages";

// Process-wide so a reply from a previous inbox can never match a new one.
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// One fetch request, tagged with the id it must match when its reply comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: u64,
    pub folder: String,
    pub limit: u32,
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded(usize),
    Failed,
    /// Superseded by a newer request; the reply was dropped.
    Stale,
}

pub struct InboxController {
    session: SharedSession,
    credentials: Credentials,
    folders: Vec<Folder>,
    folder: usize,
    messages: Vec<Message>,
    selected: Option<EmailId>,
    search: String,
    loading: bool,
    page_size: u32,
    latest_request: u64,
    notice: Option<Notice>,
}

impl InboxController {
    /// Only a signed-in session can open the inbox.
    pub fn open(session: SharedSession, page_size: u32) -> Option<Self> {
        let credentials = session.borrow().credentials()?.clone();
        Some(Self {
            session,
            credentials,
            folders: Folder::defaults(),
            folder: 0,
            messages: vec![],
            selected: None,
            search: String::new(),
            loading: false,
            page_size,
            latest_request: 0,
            notice: None,
        })
    }

    pub fn account(&self) -> &str {
        &self.credentials.email
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn current_folder(&self) -> &Folder {
        &self.folders[self.folder]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Messages passing the current search filter, in server order.
    pub fn visible(&self) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| m.matches(&self.search))
            .collect()
    }

    pub fn selected_message(&self) -> Option<&Message> {
        let id = self.selected?;
        self.messages.iter().find(|m| m.id == id)
    }

    /// Switches folder and issues a fetch for it; `None` for an unknown id or the current folder.
    pub fn select_folder(&mut self, folder_id: &str) -> Option<FetchTicket> {
        let idx = self.folders.iter().position(|f| f.id == folder_id)?;
        if idx == self.folder {
            return None;
        }
        self.folder = idx;
        Some(self.refresh())
    }

    /// Issues a fetch for the current folder. Any earlier request still in flight becomes stale.
    pub fn refresh(&mut self) -> FetchTicket {
        self.latest_request = NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed);
        self.loading = true;
        FetchTicket {
            id: self.latest_request,
            folder: self.current_folder().id.to_string(),
            limit: self.page_size,
            credentials: self.credentials.clone(),
        }
    }

    pub fn apply(&mut self, request_id: u64, reply: FetchReply) -> FetchOutcome {
        if request_id != self.latest_request || !self.loading {
            debug!(
                "dropping stale fetch reply {request_id} (latest {})",
                self.latest_request
            );
            return FetchOutcome::Stale;
        }
        self.loading = false;
        match reply.into_result(LOAD_FAILED) {
            Ok(messages) => {
                let unread = messages.iter().filter(|m| !m.is_read).count();
                self.folders[self.folder].unread = Some(unread);
                self.selected = messages
                    .iter()
                    .find(|m| m.matches(&self.search))
                    .map(|m| m.id);
                self.messages = messages;
                debug!(
                    "loaded {} messages into {}",
                    self.messages.len(),
                    self.current_folder().id
                );
                FetchOutcome::Loaded(self.messages.len())
            }
            Err(e) => {
                self.notice = Some(Notice::error("Loading failed", e.to_string()));
                FetchOutcome::Failed
            }
        }
    }

    /// Fetches the current folder synchronously.
    pub fn load(&mut self, transport: &dyn MailTransport) -> FetchOutcome {
        let ticket = self.refresh();
        let reply = transport.fetch_messages(&ticket.credentials, &ticket.folder, ticket.limit);
        self.apply(ticket.id, reply)
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        let still_visible = self
            .selected_message()
            .is_some_and(|m| m.matches(&self.search));
        if !still_visible {
            let first = self.visible().first().map(|m| m.id);
            self.selected = first;
        }
    }

    /// Moves the selection within the visible list, clamped at both ends.
    pub fn move_selection(&mut self, delta: i32) {
        let ids: Vec<EmailId> = self.visible().iter().map(|m| m.id).collect();
        if ids.is_empty() {
            self.selected = None;
            return;
        }
        let cur = self
            .selected
            .and_then(|id| ids.iter().position(|&x| x == id))
            .unwrap_or(0) as i32;
        let next = (cur + delta).clamp(0, ids.len() as i32 - 1) as usize;
        self.selected = Some(ids[next]);
    }

    pub fn select_message(&mut self, id: EmailId) -> bool {
        if self.messages.iter().any(|m| m.id == id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    /// Marks the selected message read. Local only: the service has no flag endpoint.
    pub fn open_selected(&mut self) -> Option<&Message> {
        let id = self.selected?;
        let folder = &mut self.folders[self.folder];
        let message = self.messages.iter_mut().find(|m| m.id == id)?;
        if !message.is_read {
            message.is_read = true;
            if let Some(n) = folder.unread.as_mut() {
                *n = n.saturating_sub(1);
            }
        }
        Some(message)
    }

    /// Flips the star on the selected message (local only) and returns the new state.
    pub fn toggle_star(&mut self) -> Option<bool> {
        let id = self.selected?;
        let message = self.messages.iter_mut().find(|m| m.id == id)?;
        message.is_starred = !message.is_starred;
        Some(message.is_starred)
    }

    /// Ends the session; the message list goes with the controller.
    pub fn logout(self) {
        self.session.borrow_mut().sign_out();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeTransport, message};
    use crate::session::{MemoryStorage, Session, SessionStore};

    fn signed_in() -> (SharedSession, MemoryStorage) {
        let storage = MemoryStorage::new();
        let mut session = Session::new(SessionStore::new(storage.clone()));
        session.sign_in(Credentials::new("a@b.com", "x"));
        (session.shared(), storage)
    }

    fn inbox() -> InboxController {
        InboxController::open(signed_in().0, 20).unwrap()
    }

    #[test]
    fn cannot_open_without_credentials() {
        let session = Session::new(SessionStore::new(MemoryStorage::new())).shared();
        assert!(InboxController::open(session, 20).is_none());
    }

    #[test]
    fn loading_inbox_sets_list_and_selects_first() {
        let transport = FakeTransport::new();
        let (m1, m2) = (message(1, "Ann", "Docs"), message(2, "Bob", "Lunch"));
        transport.queue_fetch(FetchReply::with_emails(vec![m1.clone(), m2.clone()]));
        let mut inbox = inbox();

        assert_eq!(inbox.load(&transport), FetchOutcome::Loaded(2));

        assert_eq!(inbox.messages(), &[m1.clone(), m2]);
        assert_eq!(inbox.selected_message(), Some(&m1));
        assert!(!inbox.is_loading());
        assert_eq!(inbox.current_folder().unread, Some(2));
        assert_eq!(
            transport.calls(),
            vec![Call::Fetch {
                folder: "inbox".into(),
                limit: 20
            }]
        );
    }

    #[test]
    fn failed_fetch_keeps_list_and_reports_exact_error() {
        let transport = FakeTransport::new();
        transport.queue_fetch(FetchReply::with_emails(vec![message(1, "Ann", "Docs")]));
        transport.queue_fetch(FetchReply::failed("quota exceeded".into()));
        let mut inbox = inbox();
        inbox.load(&transport);
        let before = inbox.messages().to_vec();

        assert_eq!(inbox.load(&transport), FetchOutcome::Failed);

        assert_eq!(inbox.messages(), before.as_slice());
        assert!(!inbox.is_loading());
        let notice = inbox.take_notice().unwrap();
        assert!(notice.is_error());
        assert_eq!(notice.message, "quota exceeded");
    }

    #[test]
    fn empty_folder_clears_selection() {
        let transport = FakeTransport::new();
        transport.queue_fetch(FetchReply::with_emails(vec![message(1, "Ann", "Docs")]));
        transport.queue_fetch(FetchReply::with_emails(vec![]));
        let mut inbox = inbox();
        inbox.load(&transport);

        inbox.select_folder("trash").unwrap();
        assert_eq!(inbox.load(&transport), FetchOutcome::Loaded(0));
        assert_eq!(inbox.selected_message(), None);
        assert_eq!(inbox.current_folder().unread, Some(0));
    }

    #[test]
    fn only_the_latest_request_is_applied() {
        let mut inbox = inbox();
        let sent = inbox.select_folder("sent").unwrap();
        let spam = inbox.select_folder("spam").unwrap();
        assert!(spam.id > sent.id);

        // the older request completes last
        let outcome = inbox.apply(spam.id, FetchReply::with_emails(vec![message(3, "Spammer", "Win")]));
        assert_eq!(outcome, FetchOutcome::Loaded(1));
        let outcome = inbox.apply(sent.id, FetchReply::with_emails(vec![message(1, "Me", "Hi")]));
        assert_eq!(outcome, FetchOutcome::Stale);

        assert_eq!(inbox.current_folder().id, "spam");
        assert_eq!(inbox.messages()[0].id, 3);
        assert!(!inbox.is_loading());
    }

    #[test]
    fn stale_reply_arriving_first_keeps_loading() {
        let mut inbox = inbox();
        let sent = inbox.select_folder("sent").unwrap();
        let drafts = inbox.select_folder("drafts").unwrap();

        assert_eq!(
            inbox.apply(sent.id, FetchReply::failed("boom".into())),
            FetchOutcome::Stale
        );
        assert!(inbox.is_loading());
        assert!(inbox.take_notice().is_none());

        inbox.apply(drafts.id, FetchReply::with_emails(vec![]));
        assert!(!inbox.is_loading());
    }

    #[test]
    fn duplicate_reply_is_ignored() {
        let mut inbox = inbox();
        let t = inbox.refresh();
        inbox.apply(t.id, FetchReply::with_emails(vec![message(1, "Ann", "Docs")]));
        assert_eq!(
            inbox.apply(t.id, FetchReply::with_emails(vec![])),
            FetchOutcome::Stale
        );
        assert_eq!(inbox.messages().len(), 1);
    }

    #[test]
    fn selecting_current_or_unknown_folder_issues_nothing() {
        let mut inbox = inbox();
        assert!(inbox.select_folder("inbox").is_none());
        assert!(inbox.select_folder("calendar").is_none());
        assert!(!inbox.is_loading());
    }

    #[test]
    fn ticket_carries_session_credentials_and_page_size() {
        let mut inbox = InboxController::open(signed_in().0, 50).unwrap();
        let ticket = inbox.refresh();
        assert_eq!(ticket.credentials, Credentials::new("a@b.com", "x"));
        assert_eq!(ticket.limit, 50);
        assert_eq!(ticket.folder, "inbox");
    }

    #[test]
    fn navigation_follows_search_filter() {
        let transport = FakeTransport::new();
        transport.queue_fetch(FetchReply::with_emails(vec![
            message(1, "Ann", "Docs"),
            message(2, "Bob", "Lunch"),
            message(3, "Ann", "Contract"),
        ]));
        let mut inbox = inbox();
        inbox.load(&transport);

        inbox.set_search("ann");
        assert_eq!(inbox.visible().len(), 2);
        inbox.move_selection(1);
        assert_eq!(inbox.selected_message().unwrap().id, 3);
        inbox.move_selection(5);
        assert_eq!(inbox.selected_message().unwrap().id, 3);

        inbox.set_search("lunch");
        assert_eq!(inbox.selected_message().unwrap().id, 2);

        inbox.set_search("nothing matches");
        assert_eq!(inbox.selected_message(), None);
        // the list itself is untouched
        assert_eq!(inbox.messages().len(), 3);
    }

    #[test]
    fn refresh_under_a_filter_selects_first_visible() {
        let transport = FakeTransport::new();
        transport.queue_fetch(FetchReply::with_emails(vec![
            message(1, "Ann", "Docs"),
            message(2, "Bob", "Lunch"),
        ]));
        let mut inbox = inbox();
        inbox.set_search("bob");

        assert_eq!(inbox.load(&transport), FetchOutcome::Loaded(2));
        assert_eq!(inbox.selected_message().unwrap().id, 2);

        transport.queue_fetch(FetchReply::with_emails(vec![message(4, "Eve", "Hi")]));
        inbox.load(&transport);
        assert_eq!(inbox.selected_message(), None);
        assert_eq!(inbox.messages().len(), 1);
    }

    #[test]
    fn opening_marks_read_and_star_toggles_locally() {
        let transport = FakeTransport::new();
        transport.queue_fetch(FetchReply::with_emails(vec![message(1, "Ann", "Docs")]));
        let mut inbox = inbox();
        inbox.load(&transport);

        assert!(inbox.open_selected().unwrap().is_read);
        assert_eq!(inbox.current_folder().unread, Some(0));
        assert_eq!(inbox.toggle_star(), Some(true));
        assert_eq!(inbox.toggle_star(), Some(false));
        // nothing is written back
        assert_eq!(transport.calls().len(), 1);
    }

    #[test]
    fn logout_clears_stored_session() {
        let (session, storage) = signed_in();
        let inbox = InboxController::open(session.clone(), 20).unwrap();
        inbox.logout();
        assert!(!session.borrow().is_signed_in());
        assert_eq!(storage.peek(), None);
    }
}
