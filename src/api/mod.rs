//! Generation-service boundary.
//!
//! Everything that talks HTTP to the hosted model lives here. The rest
//! of the program only sees [`GenerationClient::generate`] handing back
//! an opaque text payload for the batch parser, plus the models listing
//! used by `bitebot status`.

mod client;
mod types;

pub use client::{read_image, GenerationClient};
pub use types::{InlineData, ModelInfo};
