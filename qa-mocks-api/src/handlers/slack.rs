//! Slack Web API endpoints
//!
//! Every success body carries `"ok": true`; failures use the Slack error
//! envelope from [`crate::errors::SlackShape`].

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
        Multipart, Query, State,
    },
    Json,
};
use qa_mocks_storage::slack::ts::{format_ts, parse_ts};
use qa_mocks_storage::slack::{HistoryWindow, NewFile, NewMessage, FILE_UPLOADER};
use qa_mocks_web::{openapi::BearerSecurity, FieldError, PageWindow, WebError};
use tracing::info;
use utoipa::{OpenApi, ToSchema};

use crate::{
    app::SLACK_SERVICE,
    context::SlackContext,
    errors::SlackResult,
    models::slack::{
        decode_cursor, flag, infer_filetype, ChannelQuery, ChannelResponse, ChannelView, ChannelsResponse,
        FileQuery, FileResponse, FileView, HistoryQuery, ListQuery, MessageView, MessagesResponse,
        PostMessageRequest, PostMessageResponse, RepliesQuery, ResponseMetadata, SlackResetResponse,
        DEFAULT_USERNAME, HISTORY_DEFAULT_LIMIT, HISTORY_MAX_LIMIT,
    },
};

/// `files.upload` form
#[derive(Debug, ToSchema)]
pub struct FileUploadForm {
    /// Comma-separated channel ids or names
    pub channels: Option<String>,
    pub title: Option<String>,
    pub initial_comment: Option<String>,
    pub filename: Option<String>,
    pub filetype: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub file: Option<Vec<u8>>,
    /// Text content instead of a file part
    pub content: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Slack Mock",
        description = "Slack Web API subset: messages, threads, channels and file uploads"
    ),
    paths(
        crate::handlers::health::health_check,
        post_message,
        conversation_history,
        conversation_replies,
        list_conversations,
        conversation_info,
        upload_file,
        file_info,
    ),
    components(schemas(
        PostMessageRequest,
        PostMessageResponse,
        MessagesResponse,
        ChannelsResponse,
        ChannelResponse,
        FileResponse,
        FileUploadForm,
        SlackResetResponse
    )),
    modifiers(&BearerSecurity),
    tags(
        (name = "chat", description = "Posting messages"),
        (name = "conversations", description = "Channels, history and threads"),
        (name = "files", description = "File metadata"),
        (name = "health", description = "Liveness")
    )
)]
pub struct SlackApiDoc;

#[utoipa::path(
    post,
    path = "/api/chat.postMessage",
    request_body = PostMessageRequest,
    responses(
        (status = 200, description = "Message posted", body = PostMessageResponse),
        (status = 400, description = "Missing channel or text"),
        (status = 404, description = "Unknown channel")
    ),
    security(("bearer_auth" = [])),
    tag = "chat"
)]
pub async fn post_message(
    State(ctx): State<SlackContext>,
    payload: Result<Json<PostMessageRequest>, JsonRejection>,
) -> SlackResult<Json<PostMessageResponse>> {
    let Json(request) = payload?;

    let mut errors = Vec::new();
    let channel = non_empty(request.channel.as_deref());
    if channel.is_none() {
        errors.push(FieldError::required("channel"));
    }
    let text = non_empty(request.text.as_deref());
    if text.is_none() {
        errors.push(FieldError::required("text"));
    }
    let (Some(channel), Some(text)) = (channel, text) else {
        return Err(WebError::validation(errors).into());
    };
    // Back-reference only; the parent is not looked up
    let thread_ts = non_empty(request.thread_ts.as_deref())
        .map(|raw| parse_ts(raw).map(format_ts).unwrap_or_else(|| raw.to_string()));

    let channel = ctx.store.get_channel(channel).await?;

    let message = ctx
        .store
        .post_message(NewMessage {
            channel_id: channel.id.clone(),
            user: non_empty(request.username.as_deref())
                .unwrap_or(DEFAULT_USERNAME)
                .to_string(),
            text: text.to_string(),
            thread_ts,
        })
        .await?;
    info!(channel = %channel.id, ts = %message.ts(), "Message posted");

    Ok(Json(PostMessageResponse {
        ok: true,
        channel: channel.id,
        ts: message.ts(),
        message: MessageView::new(message, &Default::default()),
    }))
}

#[utoipa::path(
    get,
    path = "/api/conversations.history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Top-level messages, newest first", body = MessagesResponse),
        (status = 404, description = "Unknown channel")
    ),
    security(("bearer_auth" = [])),
    tag = "conversations"
)]
pub async fn conversation_history(
    State(ctx): State<SlackContext>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> SlackResult<Json<MessagesResponse>> {
    let Query(query) = query?;
    let channel = required(query.channel.as_deref(), "channel")?;
    let window = PageWindow::from_limit_offset(
        query.limit,
        decode_cursor(query.cursor.as_deref())?,
        HISTORY_DEFAULT_LIMIT,
        HISTORY_MAX_LIMIT,
    )?;
    let bounds = HistoryWindow {
        oldest: ts_param(query.oldest.as_deref(), "oldest")?,
        latest: ts_param(query.latest.as_deref(), "latest")?,
        inclusive: flag(query.inclusive.as_deref()),
    };

    let history = ctx.store.history(channel, bounds).await?;

    let next = window.next_offset(history.messages.len());
    let page = window
        .slice(history.messages)
        .into_iter()
        .map(|m| MessageView::new(m, &history.threads))
        .collect();

    Ok(Json(MessagesResponse {
        ok: true,
        messages: page,
        has_more: next.is_some(),
        pin_count: Some(0),
        response_metadata: ResponseMetadata::new(next),
    }))
}

#[utoipa::path(
    get,
    path = "/api/conversations.replies",
    params(RepliesQuery),
    responses(
        (status = 200, description = "Thread parent followed by replies", body = MessagesResponse),
        (status = 404, description = "Unknown channel or thread")
    ),
    security(("bearer_auth" = [])),
    tag = "conversations"
)]
pub async fn conversation_replies(
    State(ctx): State<SlackContext>,
    query: Result<Query<RepliesQuery>, QueryRejection>,
) -> SlackResult<Json<MessagesResponse>> {
    let Query(query) = query?;
    let channel = required(query.channel.as_deref(), "channel")?;
    let thread = ts_param(Some(required(query.ts.as_deref(), "ts")?), "ts")?.unwrap_or_default();
    let window = PageWindow::from_limit_offset(
        query.limit,
        decode_cursor(query.cursor.as_deref())?,
        HISTORY_MAX_LIMIT,
        HISTORY_MAX_LIMIT,
    )?;

    let thread = ctx.store.replies(channel, thread).await?;

    let next = window.next_offset(thread.messages.len());
    let page = window
        .slice(thread.messages)
        .into_iter()
        .map(|m| MessageView::new(m, &thread.threads))
        .collect();

    Ok(Json(MessagesResponse {
        ok: true,
        messages: page,
        has_more: next.is_some(),
        pin_count: None,
        response_metadata: ResponseMetadata::new(next),
    }))
}

#[utoipa::path(
    get,
    path = "/api/conversations.list",
    params(ListQuery),
    responses((status = 200, description = "Channels by name", body = ChannelsResponse)),
    security(("bearer_auth" = [])),
    tag = "conversations"
)]
pub async fn list_conversations(
    State(ctx): State<SlackContext>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> SlackResult<Json<ChannelsResponse>> {
    let Query(query) = query?;
    let window = PageWindow::from_limit_offset(
        query.limit,
        decode_cursor(query.cursor.as_deref())?,
        HISTORY_DEFAULT_LIMIT,
        HISTORY_MAX_LIMIT,
    )?;

    let channels = ctx.store.list_channels().await?;
    let next = window.next_offset(channels.len());

    Ok(Json(ChannelsResponse {
        ok: true,
        channels: window.slice(channels).into_iter().map(ChannelView::from).collect(),
        response_metadata: ResponseMetadata::new(next),
    }))
}

#[utoipa::path(
    get,
    path = "/api/conversations.info",
    params(ChannelQuery),
    responses(
        (status = 200, description = "One channel", body = ChannelResponse),
        (status = 404, description = "Unknown channel")
    ),
    security(("bearer_auth" = [])),
    tag = "conversations"
)]
pub async fn conversation_info(
    State(ctx): State<SlackContext>,
    query: Result<Query<ChannelQuery>, QueryRejection>,
) -> SlackResult<Json<ChannelResponse>> {
    let Query(query) = query?;
    let channel = ctx
        .store
        .get_channel(required(query.channel.as_deref(), "channel")?)
        .await?;

    Ok(Json(ChannelResponse {
        ok: true,
        channel: channel.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/files.upload",
    request_body(content = FileUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File metadata recorded", body = FileResponse),
        (status = 400, description = "Neither file nor content given"),
        (status = 404, description = "Unknown channel")
    ),
    security(("bearer_auth" = [])),
    tag = "files"
)]
pub async fn upload_file(
    State(ctx): State<SlackContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> SlackResult<Json<FileResponse>> {
    let mut multipart = multipart?;
    let mut form = FileUploadForm {
        channels: None,
        title: None,
        initial_comment: None,
        filename: None,
        filetype: None,
        file: None,
        content: None,
    };
    let mut part_name = None;
    let mut part_type = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                part_name = field.file_name().map(str::to_string);
                part_type = field.content_type().map(str::to_string);
                form.file = Some(field.bytes().await?.to_vec());
            }
            "channels" => form.channels = Some(field.text().await?),
            "title" => form.title = Some(field.text().await?),
            "initial_comment" => form.initial_comment = Some(field.text().await?),
            "filename" => form.filename = Some(field.text().await?),
            "filetype" => form.filetype = Some(field.text().await?),
            "content" => form.content = Some(field.text().await?),
            _ => {}
        }
    }

    let (bytes, default_mime) = match (form.file, form.content) {
        (Some(bytes), _) => (bytes, "application/octet-stream"),
        (None, Some(content)) => (content.into_bytes(), "text/plain"),
        (None, None) => {
            return Err(WebError::validation(vec![FieldError::new(
                "file",
                "Either a file part or content is required",
                "REQUIRED",
            )])
            .into())
        }
    };

    let name = non_empty(form.filename.as_deref())
        .or(part_name.as_deref())
        .unwrap_or("file")
        .to_string();

    let requested: Vec<&str> = form
        .channels
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();
    let requested = if requested.is_empty() {
        vec![ctx.settings.default_channel.as_str()]
    } else {
        requested
    };
    let mut channels = Vec::with_capacity(requested.len());
    for key in requested {
        let id = ctx.store.get_channel(key).await?.id;
        if !channels.contains(&id) {
            channels.push(id);
        }
    }

    let (file, posted) = ctx
        .store
        .upload_file(NewFile {
            title: non_empty(form.title.as_deref()).unwrap_or(&name).to_string(),
            mimetype: part_type.unwrap_or_else(|| default_mime.to_string()),
            filetype: infer_filetype(form.filetype.as_deref(), &name),
            size: bytes.len() as i64,
            user: FILE_UPLOADER.to_string(),
            channels,
            initial_comment: form.initial_comment,
            name,
        })
        .await?;
    info!(file = %file.public_id(), notices = posted.len(), "File uploaded");

    Ok(Json(FileResponse {
        ok: true,
        file: FileView::from(file),
    }))
}

#[utoipa::path(
    get,
    path = "/api/files.info",
    params(FileQuery),
    responses(
        (status = 200, description = "File metadata", body = FileResponse),
        (status = 404, description = "Unknown file")
    ),
    security(("bearer_auth" = [])),
    tag = "files"
)]
pub async fn file_info(
    State(ctx): State<SlackContext>,
    query: Result<Query<FileQuery>, QueryRejection>,
) -> SlackResult<Json<FileResponse>> {
    let Query(query) = query?;
    let file = ctx.store.get_file(required(query.file.as_deref(), "file")?).await?;

    Ok(Json(FileResponse {
        ok: true,
        file: file.into(),
    }))
}

pub async fn reset(State(ctx): State<SlackContext>) -> SlackResult<Json<SlackResetResponse>> {
    ctx.seed.reset().await?;
    info!("Slack store reset to seed data");
    Ok(Json(SlackResetResponse {
        ok: true,
        status: "reset".to_string(),
        service: SLACK_SERVICE.to_string(),
    }))
}

pub async fn openapi_document() -> Json<utoipa::openapi::OpenApi> {
    Json(SlackApiDoc::openapi())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, WebError> {
    non_empty(value).ok_or_else(|| WebError::validation(vec![FieldError::required(field)]))
}

fn ts_param(value: Option<&str>, field: &str) -> Result<Option<i64>, WebError> {
    non_empty(value)
        .map(|raw| {
            parse_ts(raw).ok_or_else(|| {
                WebError::validation_single(field, format!("'{}' is not a valid ts", raw), "INVALID")
            })
        })
        .transpose()
}
