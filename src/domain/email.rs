use serde::{Deserialize, Serialize};

pub type EmailId = u32;

/// A message as returned by the fetch endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: EmailId,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub preview: String,
    /// Display label as sent by the server ("10:30", "Yesterday", an RFC 2822 date...)
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub has_attachment: bool,
    #[serde(default)]
    pub is_starred: bool,
    #[serde(default)]
    pub content: String,
}

impl Message {
    /// Case-insensitive match against sender, subject and preview.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        [&self.from, &self.subject, &self.preview]
            .iter()
            .any(|field| field.to_lowercase().contains(&q))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub unread: Option<usize>,
}

impl Folder {
    const fn new(id: &'static str, label: &'static str, icon: &'static str) -> Self {
        Self {
            id,
            label,
            icon,
            unread: None,
        }
    }

    /// The fixed folder list shown in the sidebar; `inbox` comes first.
    pub fn defaults() -> Vec<Folder> {
        vec![
            Folder::new("inbox", "Inbox", "inbox"),
            Folder::new("sent", "Sent", "send"),
            Folder::new("drafts", "Drafts", "file-text"),
            Folder::new("spam", "Spam", "alert-triangle"),
            Folder::new("trash", "Trash", "trash"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_decodes_camel_case_and_defaults_missing_flags() {
        let m: Message = serde_json::from_str(
            r#"{"id": 7, "from": "Ann", "subject": "Docs", "preview": "p", "date": "10:30",
                "isRead": true, "content": "body"}"#,
        )
        .unwrap();
        assert_eq!(m.id, 7);
        assert!(m.is_read);
        assert!(!m.has_attachment);
        assert!(!m.is_starred);
        assert_eq!(m.content, "body");
    }

    #[test]
    fn search_matches_sender_subject_and_preview() {
        let m = Message {
            id: 1,
            from: "Nikolai Petrov".into(),
            subject: "Meeting on Thursday".into(),
            preview: "Let's discuss the project".into(),
            date: "09:15".into(),
            is_read: false,
            has_attachment: false,
            is_starred: false,
            content: String::new(),
        };
        assert!(m.matches("petrov"));
        assert!(m.matches("THURSDAY"));
        assert!(m.matches("project"));
        assert!(m.matches("  "));
        assert!(!m.matches("invoice"));
    }

    #[test]
    fn default_folders_start_with_inbox() {
        let folders = Folder::defaults();
        assert_eq!(folders[0].id, "inbox");
        assert!(folders.iter().all(|f| f.unread.is_none()));
    }
}
