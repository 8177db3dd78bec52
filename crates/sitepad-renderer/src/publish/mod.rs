//! Publishing to the hosting service.
//!
//! Sign-in is a browser redirect: the user opens an auth page for a random
//! session id while the client polls that session until the host hands out a
//! bearer token. Everything after that is plain JSON over HTTP.

mod client;
mod error;
mod prompt;
mod types;

pub use client::{PollSchedule, Publisher, new_session_id, prepare_files};
pub use error::PublishError;
pub use prompt::{AuthWindow, LoggedAuthWindow, PublishPrompt};
pub use types::{Site, SiteChoice, UploadFile};
