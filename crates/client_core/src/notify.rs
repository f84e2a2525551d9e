use tokio::sync::broadcast;
use tracing::{error, info, warn};

const NOTICE_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Transient, non-blocking user notification (a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Clone)]
pub struct Notifier {
    events: broadcast::Sender<Notice>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);
        Self { events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.events.subscribe()
    }

    pub fn emit(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => {
                error!(title = %notice.title, description = ?notice.description, "notice")
            }
            NoticeLevel::Warning => {
                warn!(title = %notice.title, description = ?notice.description, "notice")
            }
            NoticeLevel::Success | NoticeLevel::Info => {
                info!(title = %notice.title, description = ?notice.description, "notice")
            }
        }
        // Nobody listening is fine; notices are fire-and-forget.
        let _ = self.events.send(notice);
    }

    pub fn success(&self, title: impl Into<String>, description: impl Into<String>) {
        self.emit(Notice {
            level: NoticeLevel::Success,
            title: title.into(),
            description: Some(description.into()),
        });
    }

    pub fn warning(&self, title: impl Into<String>) {
        self.emit(Notice {
            level: NoticeLevel::Warning,
            title: title.into(),
            description: None,
        });
    }

    pub fn error(&self, title: impl Into<String>, description: impl Into<String>) {
        self.emit(Notice {
            level: NoticeLevel::Error,
            title: title.into(),
            description: Some(description.into()),
        });
    }
}
