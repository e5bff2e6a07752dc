//
//  graph-login
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! OAuth token operations and the web-session login flow.
//!
//! ## Submodules
//!
//! - [`oauth`]: Login URL, code exchange, token extension and validation
//! - [`login`]: The [`LoginHandler`] state machine
//! - [`store`]: User record storage ([`UserStore`], [`FileUserStore`])
//! - [`tasks`]: Background work for new users ([`TaskDispatcher`])
//! - [`keyring`]: Session persistence for the CLI ([`KeyringStore`])

mod keyring;
mod login;
mod oauth;
mod store;
mod tasks;

pub use keyring::*;
pub use login::*;
pub use oauth::*;
pub use store::*;
pub use tasks::*;
