//
//  graph-login
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Graph API Client
//!
//! Layered from the wire upwards:
//!
//! | Layer | Type | Role |
//! |-------|------|------|
//! | Descriptor | [`GraphRequest`] | What to call |
//! | Adapter | [`GraphClient`] | One HTTP round trip, normalized |
//! | Pagination | [`GraphClient::get_all`] | Follow `paging.next` |
//! | Facade | [`GraphApi`] | Named operations bound to a token |

/// Request/response adapter.
///
/// Provides the [`GraphClient`] struct which handles:
/// - URL normalization against the API base and version
/// - Access token injection
/// - Form and multipart bodies
/// - Response classification and audit logging
pub mod client;

/// Error types shared by every API layer.
pub mod error;

/// Named Graph API operations.
pub mod graph;

/// Cursor pagination.
pub mod pagination;

/// Request descriptors.
pub mod request;

/// Normalized response shapes.
pub mod response;

pub use client::{GraphClient, DEFAULT_BASE_URL};
pub use error::{ApiError, GraphError};
pub use graph::{Attachment, GraphApi, BULK_FIELDS, BULK_LIMIT, DEFAULT_ALBUM_PATH};
pub use request::{FilePart, GraphRequest, DEFAULT_TIMEOUT_SECS};
pub use response::GraphResponse;
