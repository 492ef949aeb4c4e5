//! Slack Web API request and response types

use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use qa_mocks_storage::slack::entities::{Channel, File, Message};
use qa_mocks_storage::slack::ThreadSummary;
use qa_mocks_web::WebError;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Poster name when `chat.postMessage` gives none
pub const DEFAULT_USERNAME: &str = "SlackBot";

pub const HISTORY_DEFAULT_LIMIT: usize = 100;
pub const HISTORY_MAX_LIMIT: usize = 1000;

const CURSOR_PREFIX: &str = "offset:";

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PostMessageRequest {
    /// Channel id or name
    pub channel: Option<String>,
    pub text: Option<String>,
    pub username: Option<String>,
    /// Parent message `ts` when replying in a thread
    pub thread_ts: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    pub channel: Option<String>,
    /// Page size, default 100, at most 1000
    pub limit: Option<i64>,
    /// `next_cursor` of the previous page
    pub cursor: Option<String>,
    /// Only messages after this `ts`
    pub oldest: Option<String>,
    /// Only messages before this `ts`
    pub latest: Option<String>,
    /// Include messages exactly at `oldest`/`latest`
    pub inclusive: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RepliesQuery {
    pub channel: Option<String>,
    /// `ts` of the thread parent
    pub ts: Option<String>,
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChannelQuery {
    pub channel: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FileQuery {
    /// `F...` id
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FileRef {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageView {
    #[serde(rename = "type")]
    pub kind: String,
    pub user: String,
    pub text: String,
    pub ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_users: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileRef>>,
}

impl MessageView {
    pub fn new(message: Message, summaries: &HashMap<String, ThreadSummary>) -> Self {
        let ts = message.ts();
        let summary = summaries.get(&ts);
        Self {
            kind: "message".to_string(),
            thread_ts: message.thread_ts.or_else(|| summary.map(|_| ts.clone())),
            reply_count: summary.map(|s| s.reply_count),
            latest_reply: summary.map(|s| s.latest_reply.clone()),
            reply_users: summary.map(|s| s.reply_users.clone()),
            files: message
                .file_id
                .map(|id| vec![FileRef { id: format!("F{:010}", id) }]),
            user: message.user,
            text: message.text,
            ts,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TextValue {
    pub value: String,
    pub creator: String,
    pub last_set: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChannelView {
    pub id: String,
    pub name: String,
    pub is_channel: bool,
    pub is_private: bool,
    pub is_archived: bool,
    pub created: i64,
    pub topic: TextValue,
    pub purpose: TextValue,
}

impl From<Channel> for ChannelView {
    fn from(channel: Channel) -> Self {
        let created = channel.created;
        let text = |value: String| TextValue {
            value,
            creator: String::new(),
            last_set: created,
        };
        Self {
            is_channel: !channel.is_private,
            is_private: channel.is_private,
            is_archived: false,
            created,
            topic: text(channel.topic),
            purpose: text(channel.purpose),
            id: channel.id,
            name: channel.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FileView {
    pub id: String,
    pub name: String,
    pub title: String,
    pub mimetype: String,
    pub filetype: String,
    pub size: i64,
    pub user: String,
    pub url_private: String,
    pub permalink: String,
    pub created: i64,
    pub timestamp: i64,
    pub channels: Vec<String>,
}

impl From<File> for FileView {
    fn from(file: File) -> Self {
        let id = file.public_id();
        Self {
            url_private: format!("https://files.slack.com/files-pri/{}/{}", id, file.name),
            permalink: format!("https://mockslack.slack.com/files/{}", id),
            channels: file.channel_list(),
            name: file.name,
            title: file.title,
            mimetype: file.mimetype,
            filetype: file.filetype,
            size: file.size,
            user: file.user,
            created: file.created,
            timestamp: file.created,
            id,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResponseMetadata {
    /// Empty when there is no further page
    pub next_cursor: String,
}

impl ResponseMetadata {
    pub fn new(next_offset: Option<usize>) -> Self {
        Self {
            next_cursor: next_offset.map(encode_cursor).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PostMessageResponse {
    pub ok: bool,
    pub channel: String,
    pub ts: String,
    pub message: MessageView,
}

/// Page of messages from `conversations.history` or `conversations.replies`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessagesResponse {
    pub ok: bool,
    pub messages: Vec<MessageView>,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_count: Option<u32>,
    pub response_metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChannelsResponse {
    pub ok: bool,
    pub channels: Vec<ChannelView>,
    pub response_metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChannelResponse {
    pub ok: bool,
    pub channel: ChannelView,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FileResponse {
    pub ok: bool,
    pub file: FileView,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SlackResetResponse {
    pub ok: bool,
    pub status: String,
    pub service: String,
}

/// Opaque cursor for an offset
pub fn encode_cursor(offset: usize) -> String {
    STANDARD.encode(format!("{}{}", CURSOR_PREFIX, offset))
}

pub fn decode_cursor(cursor: Option<&str>) -> Result<Option<i64>, WebError> {
    let Some(cursor) = cursor.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };

    STANDARD
        .decode(cursor)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .and_then(|text| text.strip_prefix(CURSOR_PREFIX)?.parse::<i64>().ok())
        .filter(|offset| *offset >= 0)
        .map(Some)
        .ok_or_else(|| WebError::validation_single("cursor", "Invalid cursor", "INVALID"))
}

/// Slack treats `true` and `1` as set
pub fn flag(raw: Option<&str>) -> bool {
    matches!(raw.map(str::trim), Some("true" | "1" | "TRUE" | "True"))
}

/// File type from an explicit value or the filename extension
pub fn infer_filetype(explicit: Option<&str>, filename: &str) -> String {
    if let Some(filetype) = explicit.map(str::trim).filter(|f| !f.is_empty()) {
        return filetype.to_string();
    }
    match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_ascii_lowercase(),
        _ => "unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_round_trip_and_rejection() {
        let cursor = encode_cursor(40);
        assert_eq!(decode_cursor(Some(&cursor)).unwrap(), Some(40));
        assert_eq!(decode_cursor(None).unwrap(), None);
        assert_eq!(decode_cursor(Some("")).unwrap(), None);
        assert!(decode_cursor(Some("not-base64!")).is_err());
        assert!(decode_cursor(Some(&STANDARD.encode("page:2"))).is_err());
    }

    #[test]
    fn test_flags_and_filetypes() {
        assert!(flag(Some("true")));
        assert!(flag(Some("1")));
        assert!(!flag(Some("0")));
        assert!(!flag(None));

        assert_eq!(infer_filetype(None, "report.HTML"), "html");
        assert_eq!(infer_filetype(Some("csv"), "report.txt"), "csv");
        assert_eq!(infer_filetype(None, "README"), "unknown");
    }

    #[test]
    fn test_thread_parent_gets_reply_summary() {
        let parent = Message {
            id: 2,
            ts_micros: 1_700_000_100_000_200,
            channel_id: "C1".into(),
            user: "U2".into(),
            text: "parent".into(),
            thread_ts: None,
            file_id: None,
        };
        let mut summaries = HashMap::new();
        summaries.insert(
            "1700000100.000200".to_string(),
            ThreadSummary {
                reply_count: 1,
                latest_reply: "1700000200.000300".into(),
                reply_users: vec!["U1".into()],
            },
        );

        let view = MessageView::new(parent, &summaries);
        assert_eq!(view.reply_count, Some(1));
        assert_eq!(view.thread_ts.as_deref(), Some("1700000100.000200"));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["type"], "message");
        assert!(json.get("files").is_none());
    }
}
