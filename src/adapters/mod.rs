//! Implementations of the generation service port.
//!
//! - `live/`: calls the Gemini and Imagen REST APIs
//! - `recording/`: wraps a live service and writes a cassette
//! - `replaying/`: serves a cassette instead of the network

pub mod live;
pub mod recording;
pub mod replaying;
