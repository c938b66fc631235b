use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    RepositoryItemSelected,
    RepositoryItemDeselected,
    ListItemDeleted,
    ItemUpsert,
    ErrorEvent,
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::RepositoryItemSelected => "REPOSITORY_ITEM_SELECTED",
            EventType::RepositoryItemDeselected => "REPOSITORY_ITEM_DESELECTED",
            EventType::ListItemDeleted => "LIST_ITEM_DELETED",
            EventType::ItemUpsert => "ITEM_UPSERT",
            EventType::ErrorEvent => "ERROR_EVENT",
        }
    }

    pub fn all_events() -> Vec<EventType> {
        vec![
            EventType::RepositoryItemSelected,
            EventType::RepositoryItemDeselected,
            EventType::ListItemDeleted,
            EventType::ItemUpsert,
            EventType::ErrorEvent,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Info,
    Error,
}

/// Toast shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Error, message: message.into() }
    }

    /// Error toast with the server-provided reason appended when present.
    pub fn error_with_reason(prefix: &str, reason: Option<&str>) -> Self {
        match reason {
            Some(reason) if !reason.is_empty() => Self::error(format!("{prefix} Reason: {reason}")),
            _ => Self::error(prefix),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPayload {
    pub id: Option<String>,
    /// Whether the new item should receive UI focus (add and clone).
    pub focus: bool,
    pub upserted_resource: String,
    pub notification: Notification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub id: Option<String>,
    pub notification: Notification,
}

/// Event published on the application bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppEvent {
    RepositoryItemSelected { id: String },
    RepositoryItemDeselected { id: String },
    ListItemDeleted { id: String, notification: Option<Notification> },
    ItemUpsert(UpsertPayload),
    #[serde(rename = "ERROR_EVENT")]
    Error(ErrorPayload),
}

impl AppEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            AppEvent::RepositoryItemSelected { .. } => EventType::RepositoryItemSelected,
            AppEvent::RepositoryItemDeselected { .. } => EventType::RepositoryItemDeselected,
            AppEvent::ListItemDeleted { .. } => EventType::ListItemDeleted,
            AppEvent::ItemUpsert(_) => EventType::ItemUpsert,
            AppEvent::Error(_) => EventType::ErrorEvent,
        }
    }

    pub fn error(id: Option<String>, notification: Notification) -> Self {
        AppEvent::Error(ErrorPayload { id, notification })
    }

    pub fn notification(&self) -> Option<&Notification> {
        match self {
            AppEvent::ItemUpsert(payload) => Some(&payload.notification),
            AppEvent::Error(payload) => Some(&payload.notification),
            AppEvent::ListItemDeleted { notification, .. } => notification.as_ref(),
            _ => None,
        }
    }
}
