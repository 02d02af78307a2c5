//! Backend for SkyGram - turns photos of clouds into cloud art
//!
//! An uploaded cloud photo is shown to a vision model, which names what the
//! cloud resembles. A text-to-image model then renders that object made of
//! clouds, and both images are served back over HTTP.

pub mod ai;
pub mod captions;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod server;
pub mod storage;

pub use error::{Error, Result};
