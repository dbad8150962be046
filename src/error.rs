//! Error taxonomy for the recipe pipeline.
//!
//! Every error here is recoverable within a session: the previous recipe
//! batch and the cart stay valid and the user may simply retry. A toggle
//! aimed at a name that is not in the cart is deliberately *not* an error
//! value — it is a benign race with a concurrent regeneration and is
//! handled as a logged no-op (see `Cart::toggle`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The generation service returned data that does not conform to the
    /// expected structural shape (invalid JSON, top level not an array,
    /// or an element missing a required field).
    #[error("malformed generation response: {0}")]
    MalformedResponse(String),

    /// The call to the generation service itself failed (network, quota,
    /// auth).
    #[error("generation service failure: {0:#}")]
    GenerationService(anyhow::Error),
}
