//! Console stand-in for a chat platform: stdin lines in, stdout text and PNG files out.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use common::file_utils::unique_file_path;

use crate::transport::{Attachment, IncomingMessage, Reply, Transport, UserId};

const IMAGE_PREFIX: &str = "image";

/// Turns one input line into a message from `user`.
///
/// `image <location> [<location>...]` attaches images; anything else is plain text.
pub fn parse_line(user: &UserId, line: &str) -> IncomingMessage {
    let line = line.trim_end_matches(['\r', '\n']);

    let mut words = line.split_whitespace();
    if words.next() == Some(IMAGE_PREFIX) {
        let attachments: Vec<Attachment> = words
            .map(|url| Attachment {
                url: url.to_string(),
            })
            .collect();
        if !attachments.is_empty() {
            return IncomingMessage {
                user: user.clone(),
                text: String::new(),
                attachments,
            };
        }
    }

    IncomingMessage::text(user.clone(), line)
}

/// Prints text replies and writes image replies as PNG files into `output_dir`.
#[derive(Debug, Clone)]
pub struct ConsoleTransport {
    output_dir: PathBuf,
}

impl ConsoleTransport {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn send(&self, user: &UserId, reply: Reply) -> anyhow::Result<()> {
        match reply {
            Reply::Text(text) => println!("[{user}] {text}"),
            Reply::Image(png) => {
                tokio::fs::create_dir_all(&self.output_dir).await?;
                let path = unique_file_path(&self.output_dir, "mirage", user.as_str(), "png");
                tokio::fs::write(&path, &png).await?;
                println!("[{user}] <image: {}>", path.display());
            }
        }
        Ok(())
    }
}
