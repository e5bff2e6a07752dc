//
//  graph-login
//  cli/publish.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Write commands: posts, comments, likes, photos and deletes.
//!
//! Each command maps onto one [`GraphApi`](crate::api::GraphApi) operation
//! and requires an access token (`--token` or a stored session).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use serde_json::Value;

use crate::api::{Attachment, FilePart, GraphResponse, DEFAULT_ALBUM_PATH};
use crate::output::OutputWriter;

use super::{GlobalOptions, Runtime};

/// Write a wall post
#[derive(Args, Debug)]
pub struct PostCommand {
    /// Post text
    pub message: String,

    /// Link to attach
    #[arg(long)]
    pub link: Option<String>,

    /// Link name
    #[arg(long)]
    pub name: Option<String>,

    /// Link caption
    #[arg(long)]
    pub caption: Option<String>,

    /// Link description
    #[arg(long)]
    pub description: Option<String>,

    /// Preview image URL
    #[arg(long)]
    pub picture: Option<String>,

    /// Profile or page to post to
    #[arg(long, default_value = "me")]
    pub profile: String,
}

/// Comment on an object
#[derive(Args, Debug)]
pub struct CommentCommand {
    /// Object id (post, photo, ...)
    pub object_id: String,

    /// Comment text
    pub message: String,
}

/// Like an object
#[derive(Args, Debug)]
pub struct LikeCommand {
    /// Object id
    pub object_id: String,
}

/// Delete an object
#[derive(Args, Debug)]
pub struct DeleteCommand {
    /// Object id
    pub id: String,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Delete an app request sent to a user
#[derive(Args, Debug)]
pub struct DeleteRequestCommand {
    /// Request id
    pub request_id: String,

    /// Recipient user id
    pub user_id: String,
}

/// Upload a photo
#[derive(Args, Debug)]
pub struct PhotoCommand {
    /// Image file to upload
    pub file: PathBuf,

    /// Album path to upload to
    #[arg(long, default_value = DEFAULT_ALBUM_PATH)]
    pub album: String,

    /// Photo caption
    #[arg(long, short = 'm')]
    pub message: Option<String>,
}

impl PostCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let runtime = Runtime::load(global)?;
        let attachment = Attachment {
            name: self.name.clone(),
            link: self.link.clone(),
            caption: self.caption.clone(),
            description: self.description.clone(),
            picture: self.picture.clone(),
        };

        let response = runtime
            .api(global)?
            .put_wall_post(&self.message, attachment, &self.profile)
            .await?;
        report(global, &response, "Posted")
    }
}

impl CommentCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let runtime = Runtime::load(global)?;
        let response = runtime
            .api(global)?
            .put_comment(&self.object_id, &self.message)
            .await?;
        report(global, &response, "Commented")
    }
}

impl LikeCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let runtime = Runtime::load(global)?;
        let response = runtime.api(global)?.put_like(&self.object_id).await?;
        report(global, &response, &format!("Liked {}", self.object_id))
    }
}

impl DeleteCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let runtime = Runtime::load(global)?;
        let api = runtime.api(global)?;

        if !self.yes && !global.no_prompt {
            use dialoguer::Confirm;
            let confirmed = Confirm::new()
                .with_prompt(format!("Delete object '{}'?", self.id))
                .default(false)
                .interact()?;

            if !confirmed {
                println!("{} Cancelled.", style("!").yellow());
                return Ok(());
            }
        }

        let response = api.delete_object(&self.id).await?;
        report(global, &response, &format!("Deleted {}", self.id))
    }
}

impl DeleteRequestCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let runtime = Runtime::load(global)?;
        let response = runtime
            .api(global)?
            .delete_request(&self.user_id, &self.request_id)
            .await?;
        report(global, &response, &format!("Deleted request {}", self.request_id))
    }
}

impl PhotoCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let runtime = Runtime::load(global)?;
        let api = runtime.api(global)?;

        let bytes = tokio::fs::read(&self.file)
            .await
            .with_context(|| format!("Failed to read {}", self.file.display()))?;
        let file_name = self
            .file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        let image = FilePart::new("source", file_name, bytes).with_mime_type(image_mime_type(&self.file));

        let args: Vec<(String, String)> = self
            .message
            .iter()
            .map(|message| ("message".to_string(), message.clone()))
            .collect();

        let response = api.put_photo(image, &self.album, args).await?;
        report(global, &response, "Uploaded photo")
    }
}

/// Media type from the file extension; `application/octet-stream` otherwise.
fn image_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Prints a write result: the raw response with `--json`, else a one-liner
/// with the created id when there is one.
fn report(global: &GlobalOptions, response: &GraphResponse, action: &str) -> Result<()> {
    let value = response.to_value();
    let writer = OutputWriter::from_flag(global.json);
    if writer.is_json() {
        return writer.write_value(&value);
    }

    match value.get("id").or_else(|| value.get("post_id")).and_then(Value::as_str) {
        Some(id) => writer.write_success(&format!("{} ({})", action, style(id).cyan())),
        None => writer.write_success(action),
    }
    Ok(())
}
