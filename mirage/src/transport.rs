use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use common::output_stream::OutputStream;

use crate::messages::CANCEL_KEYWORD;

/// Conversation identity of one user on the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        UserId::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Remote URL, `file://` URL or plain local path.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub user: UserId,
    pub text: String,
    pub attachments: Vec<Attachment>,
}

impl IncomingMessage {
    pub fn text(user: impl Into<UserId>, text: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn image(user: impl Into<UserId>, url: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            text: String::new(),
            attachments: vec![Attachment { url: url.into() }],
        }
    }

    pub fn is_cancel(&self) -> bool {
        self.text == CANCEL_KEYWORD
    }

    /// The attachment, when the message carries exactly one.
    pub fn single_image(&self) -> Option<&Attachment> {
        match self.attachments.as_slice() {
            [attachment] => Some(attachment),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// PNG-encoded image.
    Image(Bytes),
}

impl Reply {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(text) => Some(text),
            Reply::Image(_) => None,
        }
    }
}

impl From<&str> for Reply {
    fn from(value: &str) -> Self {
        Reply::Text(value.to_string())
    }
}

impl From<String> for Reply {
    fn from(value: String) -> Self {
        Reply::Text(value)
    }
}

/// Outgoing side of the chat platform.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, user: &UserId, reply: Reply) -> anyhow::Result<()>;
}

/// Keeps every reply in memory, in send order.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    replies: OutputStream<(UserId, Reply)>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains everything recorded so far.
    pub fn take(&self) -> Vec<(UserId, Reply)> {
        self.replies.take()
    }

    pub fn snapshot(&self) -> Vec<(UserId, Reply)> {
        self.replies.snapshot()
    }

    /// Text replies sent to `user`, without draining.
    pub fn texts_for(&self, user: &UserId) -> Vec<String> {
        self.replies
            .snapshot()
            .into_iter()
            .filter(|(to, _)| to == user)
            .filter_map(|(_, reply)| reply.as_text().map(str::to_string))
            .collect()
    }

    /// Image replies sent to `user`, without draining.
    pub fn images_for(&self, user: &UserId) -> Vec<Bytes> {
        self.replies
            .snapshot()
            .into_iter()
            .filter(|(to, _)| to == user)
            .filter_map(|(_, reply)| match reply {
                Reply::Image(png) => Some(png),
                Reply::Text(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, user: &UserId, reply: Reply) -> anyhow::Result<()> {
        self.replies.write((user.clone(), reply));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_image_requires_exactly_one() {
        let user = UserId::new("u");
        let none = IncomingMessage::text(user.clone(), "hi");
        assert!(none.single_image().is_none());

        let one = IncomingMessage::image(user.clone(), "a.png");
        assert_eq!(one.single_image().unwrap().url, "a.png");

        let mut two = one.clone();
        two.attachments.push(Attachment {
            url: "b.png".to_string(),
        });
        assert!(two.single_image().is_none());
    }

    #[test]
    fn cancel_must_match_exactly() {
        assert!(IncomingMessage::text("u", "取消").is_cancel());
        assert!(!IncomingMessage::text("u", "取消 ").is_cancel());
        assert!(!IncomingMessage::text("u", "/取消").is_cancel());
    }

    #[tokio::test]
    async fn recording_transport_filters_by_user() {
        let transport = RecordingTransport::new();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        transport.send(&alice, "hello".into()).await.unwrap();
        transport.send(&bob, "other".into()).await.unwrap();
        transport
            .send(&alice, Reply::Image(Bytes::from_static(b"png")))
            .await
            .unwrap();

        assert_eq!(transport.texts_for(&alice), ["hello"]);
        assert_eq!(transport.images_for(&alice).len(), 1);
        assert_eq!(transport.take().len(), 3);
        assert!(transport.snapshot().is_empty());
    }
}
