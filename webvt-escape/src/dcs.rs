use log::debug;
use webvt_sixel::{DEFAULT_BACKGROUND, SixelDecoder, rgba};

use crate::Actor;

/// Hard cap on a collected DECRQSS payload; the request strings are a
/// few bytes, anything larger is a runaway stream.
const MAX_STATUS_BYTES: usize = 1024 * 1024;

/// Active device control string, selected by the hook sequence and fed
/// until the string terminator.
pub(crate) enum DcsHandler {
    /// `DCS ... q`, a sixel image.
    Sixel(SixelDecoder),
    /// `DCS $ q`, DECRQSS status string request.
    StatusString(Vec<u8>),
    /// Recognized introducer with no implementation behind it.
    Ignored,
}

impl DcsHandler {
    pub(crate) fn hook(
        params: &[i64],
        intermediates: &[u8],
        byte: u8,
    ) -> Self {
        match (byte, intermediates) {
            (b'q', []) => {
                // P2 = 1 leaves unpainted pixels transparent instead of
                // the device background.
                let fill = if params.get(1) == Some(&1) {
                    rgba(0, 0, 0, 0)
                } else {
                    DEFAULT_BACKGROUND
                };
                Self::Sixel(SixelDecoder::with_fill_color(fill))
            },
            (b'q', [b'$']) => Self::StatusString(Vec::new()),
            _ => {
                debug!(
                    "[unexpected dcs] hook: {:02X} params: {:?} \
                     intermediates: {:?}",
                    byte, params, intermediates
                );
                Self::Ignored
            },
        }
    }

    pub(crate) fn put(&mut self, byte: u8) {
        match self {
            Self::Sixel(decoder) => decoder.decode(&[byte]),
            Self::StatusString(payload) => {
                if payload.len() < MAX_STATUS_BYTES {
                    payload.push(byte);
                }
            },
            Self::Ignored => {},
        }
    }

    pub(crate) fn unhook<A: Actor>(self, actor: &mut A) {
        match self {
            Self::Sixel(decoder) => actor.sixel_graphic(decoder),
            Self::StatusString(payload) => {
                actor.request_status_string(&payload)
            },
            Self::Ignored => {},
        }
    }
}
