use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbBackend, DbErr, EntityTrait, Order, QueryFilter,
    QueryOrder, Set, Statement, TransactionTrait,
};

use super::entities::{channels, messages, Channel, Channels, File, FileActiveModel, Files, Message, Messages};
use super::ts::format_ts;
use crate::connection::DatabaseConnection;
use crate::error::{StorageError, StorageResult};
use crate::gate::ResetGate;

/// Author of the comment messages posted for uploads
pub const FILE_UPLOADER: &str = "FileUploader";

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub channel_id: String,
    pub user: String,
    pub text: String,
    pub thread_ts: Option<String>,
}

/// Time window for channel history, in microseconds
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryWindow {
    pub oldest: Option<i64>,
    pub latest: Option<i64>,
    /// Include messages exactly at `oldest`/`latest`
    pub inclusive: bool,
}

#[derive(Debug, Clone)]
pub struct NewFile {
    pub name: String,
    pub title: String,
    pub mimetype: String,
    pub filetype: String,
    pub size: i64,
    pub user: String,
    /// Resolved channel ids
    pub channels: Vec<String>,
    pub initial_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadSummary {
    pub reply_count: u64,
    pub latest_reply: String,
    pub reply_users: Vec<String>,
}

/// A channel's messages together with reply statistics for its threads
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMessages {
    pub channel: Channel,
    pub messages: Vec<Message>,
    /// Keyed by parent `ts`
    pub threads: HashMap<String, ThreadSummary>,
}

/// Repository for Slack channels, messages and file metadata
#[derive(Clone)]
pub struct SlackRepository {
    db: DatabaseConnection,
    gate: ResetGate,
}

impl SlackRepository {
    pub fn new(db: DatabaseConnection, gate: ResetGate) -> Self {
        Self { db, gate }
    }

    pub async fn list_channels(&self) -> StorageResult<Vec<Channel>> {
        let _guard = self.gate.shared().await;
        Ok(Channels::find()
            .order_by(channels::Column::Name, Order::Asc)
            .all(self.db.get_connection())
            .await?)
    }

    /// Channel by id (`C...`) or name, with or without a leading `#`
    pub async fn find_channel(&self, id_or_name: &str) -> StorageResult<Option<Channel>> {
        let _guard = self.gate.shared().await;
        find_channel(self.db.get_connection(), id_or_name).await
    }

    pub async fn get_channel(&self, id_or_name: &str) -> StorageResult<Channel> {
        self.find_channel(id_or_name)
            .await?
            .ok_or_else(|| StorageError::not_found("channel", id_or_name))
    }

    /// Post a message with a fresh, strictly increasing timestamp
    pub async fn post_message(&self, new: NewMessage) -> StorageResult<Message> {
        let _guard = self.gate.shared().await;
        let txn = self.db.get_connection().begin().await?;

        let message = insert_message(&txn, new, None).await?;

        txn.commit().await?;
        Ok(message)
    }

    /// Top-level messages of a channel, newest first
    pub async fn history(&self, id_or_name: &str, window: HistoryWindow) -> StorageResult<ChannelMessages> {
        let _guard = self.gate.shared().await;
        let conn = self.db.get_connection();

        let channel = require_channel(conn, id_or_name).await?;
        let mut query = Messages::find()
            .filter(messages::Column::ChannelId.eq(channel.id.as_str()))
            .filter(messages::Column::ThreadTs.is_null());

        if let Some(oldest) = window.oldest {
            query = if window.inclusive {
                query.filter(messages::Column::TsMicros.gte(oldest))
            } else {
                query.filter(messages::Column::TsMicros.gt(oldest))
            };
        }
        if let Some(latest) = window.latest {
            query = if window.inclusive {
                query.filter(messages::Column::TsMicros.lte(latest))
            } else {
                query.filter(messages::Column::TsMicros.lt(latest))
            };
        }

        let top_level = query.order_by(messages::Column::TsMicros, Order::Desc).all(conn).await?;
        let threads = thread_summaries(conn, &channel.id).await?;
        Ok(ChannelMessages {
            channel,
            messages: top_level,
            threads,
        })
    }

    /// Thread parent followed by its replies, oldest first
    pub async fn replies(&self, id_or_name: &str, thread_ts: i64) -> StorageResult<ChannelMessages> {
        let _guard = self.gate.shared().await;
        let conn = self.db.get_connection();

        let channel = require_channel(conn, id_or_name).await?;
        let parent = Messages::find()
            .filter(messages::Column::ChannelId.eq(channel.id.as_str()))
            .filter(messages::Column::TsMicros.eq(thread_ts))
            .one(conn)
            .await?
            .ok_or_else(|| StorageError::not_found("thread", format_ts(thread_ts)))?;

        let mut thread = vec![parent];
        let replies = Messages::find()
            .filter(messages::Column::ChannelId.eq(channel.id.as_str()))
            .filter(messages::Column::ThreadTs.eq(format_ts(thread_ts)))
            .order_by(messages::Column::TsMicros, Order::Asc)
            .all(conn)
            .await?;
        thread.extend(replies);

        let threads = thread_summaries(conn, &channel.id).await?;
        Ok(ChannelMessages {
            channel,
            messages: thread,
            threads,
        })
    }

    /// Record file metadata and post the upload notice in each target channel
    pub async fn upload_file(&self, new: NewFile) -> StorageResult<(File, Vec<Message>)> {
        let _guard = self.gate.shared().await;
        let txn = self.db.get_connection().begin().await?;

        let file = FileActiveModel {
            name: Set(new.name.clone()),
            title: Set(new.title),
            mimetype: Set(new.mimetype),
            filetype: Set(new.filetype),
            size: Set(new.size),
            user: Set(new.user),
            channels: Set(serde_json::to_value(&new.channels)?),
            created: Set(Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let notice = match new.initial_comment.as_deref().map(str::trim) {
            Some(comment) if !comment.is_empty() => format!("{}\n📎 Uploaded: {}", comment, new.name),
            _ => format!("📎 Uploaded: {}", new.name),
        };

        let mut posted = Vec::with_capacity(new.channels.len());
        for channel_id in new.channels {
            let message = insert_message(
                &txn,
                NewMessage {
                    channel_id,
                    user: FILE_UPLOADER.to_string(),
                    text: notice.clone(),
                    thread_ts: None,
                },
                Some(file.id),
            )
            .await?;
            posted.push(message);
        }

        txn.commit().await?;
        Ok((file, posted))
    }

    /// File by numeric id or public `F...` id
    pub async fn get_file(&self, id: &str) -> StorageResult<File> {
        let _guard = self.gate.shared().await;
        let numeric = id
            .strip_prefix('F')
            .unwrap_or(id)
            .parse::<i32>()
            .map_err(|_| StorageError::not_found("file", id))?;

        Files::find_by_id(numeric)
            .one(self.db.get_connection())
            .await?
            .ok_or_else(|| StorageError::not_found("file", id))
    }
}

async fn find_channel<C: ConnectionTrait>(conn: &C, id_or_name: &str) -> StorageResult<Option<Channel>> {
    let key = id_or_name.trim().trim_start_matches('#');
    Ok(Channels::find()
        .filter(
            Condition::any()
                .add(channels::Column::Id.eq(key))
                .add(channels::Column::Name.eq(key)),
        )
        .one(conn)
        .await?)
}

async fn require_channel<C: ConnectionTrait>(conn: &C, id_or_name: &str) -> StorageResult<Channel> {
    find_channel(conn, id_or_name)
        .await?
        .ok_or_else(|| StorageError::not_found("channel", id_or_name))
}

/// Reply statistics for every thread parent in a channel, keyed by parent `ts`
async fn thread_summaries<C: ConnectionTrait>(
    conn: &C,
    channel_id: &str,
) -> StorageResult<HashMap<String, ThreadSummary>> {
    let replies = Messages::find()
        .filter(messages::Column::ChannelId.eq(channel_id))
        .filter(messages::Column::ThreadTs.is_not_null())
        .order_by(messages::Column::TsMicros, Order::Asc)
        .all(conn)
        .await?;

    let mut summaries: HashMap<String, ThreadSummary> = HashMap::new();
    for reply in replies {
        let Some(parent) = reply.thread_ts.clone() else {
            continue;
        };
        let summary = summaries.entry(parent).or_insert_with(|| ThreadSummary {
            reply_count: 0,
            latest_reply: String::new(),
            reply_users: Vec::new(),
        });
        summary.reply_count += 1;
        summary.latest_reply = reply.ts();
        if !summary.reply_users.contains(&reply.user) {
            summary.reply_users.push(reply.user);
        }
    }
    Ok(summaries)
}

/// Insert a message whose `ts_micros` is `max(now, newest + 1)` in one statement
async fn insert_message<C: ConnectionTrait>(
    conn: &C,
    new: NewMessage,
    file_id: Option<i32>,
) -> StorageResult<Message> {
    let now = Utc::now().timestamp_micros();

    let row = conn
        .query_one(Statement::from_sql_and_values(
            DbBackend::Sqlite,
            "INSERT INTO messages (ts_micros, channel_id, user, text, thread_ts, file_id) \
             VALUES (max(?, COALESCE((SELECT MAX(ts_micros) FROM messages), 0) + 1), ?, ?, ?, ?, ?) \
             RETURNING id",
            [
                now.into(),
                new.channel_id.into(),
                new.user.into(),
                new.text.into(),
                new.thread_ts.into(),
                file_id.into(),
            ],
        ))
        .await?
        .ok_or(DbErr::RecordNotInserted)?;
    let id: i32 = row.try_get("", "id")?;

    Messages::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| StorageError::not_found("message", id))
}
