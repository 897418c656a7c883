//! Sixel graphics decoding, independent of any terminal state.
//!
//! The escape layer strips the `DCS q` envelope and feeds the raw
//! payload to a [`SixelDecoder`]; pixels come back out as packed RGBA
//! via [`SixelDecoder::to_pixel_data`].

mod band;
pub mod color;
mod decoder;

pub use color::{DEFAULT_BACKGROUND, Rgba, rgba};
pub use decoder::{Blit, SixelDecoder, SixelError};
