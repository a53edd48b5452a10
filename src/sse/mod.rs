//! Chat event-stream decoding.
//!
//! Three stages, each usable on its own:
//! - [`FrameDecoder`]: raw chunks to complete lines
//! - [`classify_line`]: one line to an [`SseLine`]
//! - [`ReplyAccumulator`]: lines to the growing reply text

pub mod accumulator;
pub mod decoder;
pub mod events;
pub mod payloads;

pub use accumulator::{LineAction, ReplyAccumulator};
pub use decoder::{DecodeError, FrameDecoder};
pub use events::{classify_line, SseLine, DATA_PREFIX, DONE_SENTINEL};
pub use payloads::{parse_chunk, ChatChunk, ChunkChoice, ChunkDelta, PayloadError};
