//
//  graph-login
//  cli/fetch.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Bulk media fetch.
//!
//! Runs the same paginated reads the login flow schedules for new users and
//! prints the collected items.

use anyhow::Result;
use clap::{Args, ValueEnum};

use crate::output::OutputWriter;

use super::{spinner, GlobalOptions, Runtime};

/// Columns shown in table mode for every media kind.
const COLUMNS: &[&str] = &["id", "name", "likes.summary.total_count", "picture"];

/// Fetch all of your photos, videos or posts
#[derive(Args, Debug)]
pub struct FetchCommand {
    /// What to fetch
    #[arg(value_enum)]
    pub kind: MediaKind,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Photos,
    Videos,
    Posts,
}

impl MediaKind {
    fn label(self) -> &'static str {
        match self {
            Self::Photos => "photos",
            Self::Videos => "videos",
            Self::Posts => "posts",
        }
    }
}

impl FetchCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let runtime = Runtime::load(global)?;
        let api = runtime.api(global)?;

        let pb = spinner(global, &format!("Fetching {}...", self.kind.label()));
        let fetched = match self.kind {
            MediaKind::Photos => api.get_user_photos().await,
            MediaKind::Videos => api.get_user_videos().await,
            MediaKind::Posts => api.get_user_posts().await,
        };
        pb.finish_and_clear();
        let items = fetched?;

        let writer = OutputWriter::from_flag(global.json);
        writer.write_items(&items, COLUMNS)?;
        if !writer.is_json() && !items.is_empty() {
            writer.write_success(&format!("Fetched {} {}", items.len(), self.kind.label()));
        }
        Ok(())
    }
}
