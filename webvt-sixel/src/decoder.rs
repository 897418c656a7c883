use log::debug;
use thiserror::Error;

use crate::band::SixelBand;
use crate::color::{self, Rgba, DEFAULT_BACKGROUND};

const DEFAULT_PALETTE_LIMIT: usize = 65536;
const MAX_SIXEL_PARAMS: usize = 32;

/// Upper bound on the image extent in either axis. Repeat runs and
/// raster attributes asking for more are clipped, never an error.
const MAX_GEOMETRY: usize = 4096;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SixelError {
    #[error("target buffer holds {actual} pixels, expected {expected}")]
    TargetGeometry { expected: usize, actual: usize },
}

/// Decoder states. `Data` is the ground state; the other three are
/// entered by `!` (repeat count), `"` (raster attributes) and `#`
/// (color command) and scan numeric parameters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum State {
    #[default]
    Data,
    Repeat,
    Attributes,
    Color,
}

/// Numeric parameters of the in-flight `!`/`"`/`#` command.
/// There is always at least one (implicitly zero) entry.
#[derive(Debug)]
struct Params {
    values: Vec<u32>,
}

impl Default for Params {
    fn default() -> Self {
        Self { values: vec![0] }
    }
}

impl Params {
    fn reset(&mut self) {
        self.values.clear();
        self.values.push(0);
    }

    fn add_param(&mut self) {
        if self.values.len() < MAX_SIXEL_PARAMS {
            self.values.push(0);
        }
    }

    fn add_digit(&mut self, digit: u32) {
        if let Some(last) = self.values.last_mut() {
            *last = last.saturating_mul(10).saturating_add(digit);
        }
    }
}

/// Region selection for [`SixelDecoder::blit`].
///
/// `(sx, sy)` select the image region, `(dx, dy)` place it in the
/// target. `None` for the extent fields means "the whole image"; a
/// `None` fill color uses the decoder's own.
#[derive(Debug, Default, Clone, Copy)]
pub struct Blit {
    pub dx: usize,
    pub dy: usize,
    pub sx: usize,
    pub sy: usize,
    pub swidth: Option<usize>,
    pub sheight: Option<usize>,
    pub fill_color: Option<Rgba>,
}

/// Streaming sixel image decoder.
///
/// Feed payload bytes with [`decode`](SixelDecoder::decode) in chunks
/// of any size; the decoder carries its state across calls. Pixels
/// accumulate in six-row bands and can be blitted out at any point.
pub struct SixelDecoder {
    fill_color: Rgba,
    palette: Vec<Rgba>,
    palette_limit: usize,
    bands: Vec<SixelBand>,
    raster_ratio_numerator: u32,
    raster_ratio_denominator: u32,
    raster_width: usize,
    raster_height: usize,
    state: State,
    params: Params,
    color: Rgba,
}

impl Default for SixelDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SixelDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(
            DEFAULT_BACKGROUND,
            color::vt340_palette(),
            DEFAULT_PALETTE_LIMIT,
        )
    }

    /// A decoder with the default palette but a caller-chosen fill
    /// color, e.g. fully transparent for `DCS 0;1 q`.
    #[must_use]
    pub fn with_fill_color(fill_color: Rgba) -> Self {
        Self::with_options(
            fill_color,
            color::vt340_palette(),
            DEFAULT_PALETTE_LIMIT,
        )
    }

    #[must_use]
    pub fn with_options(
        fill_color: Rgba,
        palette: Vec<Rgba>,
        palette_limit: usize,
    ) -> Self {
        let color = palette.first().copied().unwrap_or(0);
        Self {
            fill_color,
            palette,
            palette_limit: palette_limit.max(1),
            bands: vec![SixelBand::new(4)],
            raster_ratio_numerator: 0,
            raster_ratio_denominator: 0,
            raster_width: 0,
            raster_height: 0,
            state: State::default(),
            params: Params::default(),
            color,
        }
    }

    /// Image width: the raster-attribute width if one was declared,
    /// otherwise the widest band.
    #[must_use]
    pub fn width(&self) -> usize {
        if self.raster_width > 0 {
            self.raster_width
        } else {
            self.real_width()
        }
    }

    /// Image height: the raster-attribute height if one was declared,
    /// otherwise the painted height.
    #[must_use]
    pub fn height(&self) -> usize {
        if self.raster_height > 0 {
            self.raster_height
        } else {
            self.real_height()
        }
    }

    /// Widest band, ignoring any raster attributes.
    #[must_use]
    pub fn real_width(&self) -> usize {
        self.bands.iter().map(|band| band.width).max().unwrap_or(0)
    }

    /// Painted height, ignoring any raster attributes. Every band but
    /// the last counts its full six rows.
    #[must_use]
    pub fn real_height(&self) -> usize {
        let last = self.bands.last().map_or(0, SixelBand::height);
        if self.bands.len() == 1 && last == 0 {
            return 0;
        }
        (self.bands.len() - 1) * 6 + last
    }

    /// Declared pixel aspect ratio, if raster attributes carried one.
    #[must_use]
    pub fn raster_ratio(&self) -> (u32, u32) {
        (self.raster_ratio_numerator, self.raster_ratio_denominator)
    }

    /// Process a chunk of sixel payload.
    pub fn decode(&mut self, data: &[u8]) {
        for &raw in data {
            let code = raw & 0x7F;
            match self.state {
                State::Data => match code {
                    0x3F..=0x7E => self.put(code, 1),
                    b'!' => self.state = State::Repeat,
                    b'"' => self.state = State::Attributes,
                    b'#' => self.state = State::Color,
                    b'$' => {
                        if let Some(band) = self.bands.last_mut() {
                            band.cursor = 0;
                        }
                    }
                    b'-' => {
                        if self.bands.len() < MAX_GEOMETRY / 6 {
                            let columns = self.width().max(4);
                            self.bands.push(SixelBand::new(columns));
                        }
                    }
                    _ => {}
                },

                State::Repeat => match code {
                    b'0'..=b'9' => self.params.add_digit(u32::from(code - b'0')),
                    b'!' => self.params.add_param(),
                    0x3F..=0x7E => {
                        let repeat: usize = self
                            .params
                            .values
                            .iter()
                            .map(|&v| (v.max(1)) as usize)
                            .sum();
                        self.put(code, repeat);
                        self.params.reset();
                        self.state = State::Data;
                    }
                    _ => {}
                },

                State::Attributes => match code {
                    b'0'..=b'9' => self.params.add_digit(u32::from(code - b'0')),
                    b';' => self.params.add_param(),
                    0x3F..=0x7E => {
                        self.apply_raster_attributes();
                        self.params.reset();
                        self.put(code, 1);
                        self.state = State::Data;
                    }
                    b'!' | b'"' | b'#' | b'$' | b'-' => {
                        self.apply_raster_attributes();
                        self.params.reset();
                        self.state = Self::command_state(code);
                    }
                    _ => {}
                },

                State::Color => match code {
                    b'0'..=b'9' => self.params.add_digit(u32::from(code - b'0')),
                    b';' => self.params.add_param(),
                    0x3F..=0x7E => {
                        self.apply_color_command();
                        self.params.reset();
                        self.put(code, 1);
                        self.state = State::Data;
                    }
                    b'!' | b'"' | b'#' | b'$' | b'-' => {
                        self.apply_color_command();
                        self.params.reset();
                        self.state = Self::command_state(code);
                    }
                    _ => {}
                },
            }
        }
    }

    /// Paint the image into an RGBA pixel buffer of `width * height`
    /// pixels, image origin at the target origin.
    pub fn to_pixel_data(
        &self,
        target: &mut [Rgba],
        width: usize,
        height: usize,
    ) -> Result<(), SixelError> {
        self.blit(target, width, height, Blit::default())
    }

    /// Paint a region of the image into an RGBA pixel buffer.
    ///
    /// Pixels the image never touched get the fill color, or stay
    /// untouched when the fill color is 0 (fully transparent).
    pub fn blit(
        &self,
        target: &mut [Rgba],
        width: usize,
        height: usize,
        spec: Blit,
    ) -> Result<(), SixelError> {
        let expected = width * height;
        if target.len() != expected {
            return Err(SixelError::TargetGeometry {
                expected,
                actual: target.len(),
            });
        }

        let image_width = self.width();
        let image_height = self.height();
        if spec.dx >= width || spec.dy >= height {
            return Ok(());
        }
        if spec.sx >= image_width || spec.sy >= image_height {
            return Ok(());
        }

        let swidth = spec
            .swidth
            .unwrap_or(image_width)
            .min(width - spec.dx)
            .min(image_width);
        let sheight = spec
            .sheight
            .unwrap_or(image_height)
            .min(height - spec.dy)
            .min(image_height);
        if swidth == 0 || sheight == 0 {
            return Ok(());
        }

        let fill = spec.fill_color.unwrap_or(self.fill_color);
        let mut row_in_band = spec.sy % 6;
        let mut band_idx = spec.sy / 6;
        let mut i = 0;

        while band_idx < self.bands.len() && i < sheight {
            let offset = (spec.dy + i) * width + spec.dx;
            if fill != 0 {
                target[offset..offset + swidth].fill(fill);
            }
            self.bands[band_idx].copy_pixel_row(
                target,
                offset,
                row_in_band,
                spec.sx,
                swidth,
            );
            row_in_band += 1;
            i += 1;
            if row_in_band == 6 {
                band_idx += 1;
                row_in_band = 0;
            }
        }

        if fill != 0 {
            while i < sheight {
                let offset = (spec.dy + i) * width + spec.dx;
                target[offset..offset + swidth].fill(fill);
                i += 1;
            }
        }

        Ok(())
    }

    fn command_state(code: u8) -> State {
        match code {
            b'!' => State::Repeat,
            b'"' => State::Attributes,
            b'#' => State::Color,
            _ => State::Data,
        }
    }

    fn put(&mut self, code: u8, repeat: usize) {
        let color = self.color;
        if let Some(band) = self.bands.last_mut() {
            let repeat = repeat.min(MAX_GEOMETRY.saturating_sub(band.cursor));
            if repeat > 0 {
                band.put(code - 0x3F, color, repeat);
            }
        }
    }

    /// Raster attributes (`" Pan ; Pad ; Ph ; Pv`) are only honored
    /// while the image is still empty; afterwards they are ignored,
    /// the way hardware terminals treat them.
    fn apply_raster_attributes(&mut self) {
        let at_origin =
            self.bands.len() == 1 && self.bands[0].cursor == 0;
        if !at_origin {
            debug!("sixel raster attributes after drawing started, ignored");
            return;
        }
        if let [num, den, width, height] = self.params.values[..] {
            self.raster_ratio_numerator = num;
            self.raster_ratio_denominator = den;
            self.raster_width = (width as usize).min(MAX_GEOMETRY);
            self.raster_height = (height as usize).min(MAX_GEOMETRY);
        }
    }

    /// Color commands: `# Pc` selects register Pc; `# Pc ; Pu ; Px ;
    /// Py ; Pz` defines it first (Pu 1 = HLS, 2 = RGB, 0 = select).
    /// Register numbers wrap modulo the palette limit.
    fn apply_color_command(&mut self) {
        match self.params.values[..] {
            [register] => {
                self.color = self.lookup(register);
            }
            [register, space, x, y, z] => {
                let idx = register as usize % self.palette_limit;
                match space {
                    2 if x <= 100 && y <= 100 && z <= 100 => {
                        let c = color::normalize_rgb(x as u16, y as u16, z as u16);
                        self.define(idx, c);
                    }
                    1 if x <= 360 && y <= 100 && z <= 100 => {
                        let c = color::normalize_hls(x as u16, y as u16, z as u16);
                        self.define(idx, c);
                    }
                    0 => self.color = self.lookup(register),
                    _ => debug!(
                        "ignoring sixel color definition {register};{space};{x};{y};{z}"
                    ),
                }
            }
            ref other => {
                debug!("ignoring sixel color command with {} parameters", other.len());
            }
        }
    }

    fn lookup(&self, register: u32) -> Rgba {
        let idx = register as usize % self.palette_limit;
        self.palette.get(idx).copied().unwrap_or(0)
    }

    fn define(&mut self, idx: usize, color: Rgba) {
        if idx >= self.palette.len() {
            self.palette.resize(idx + 1, 0);
        }
        self.palette[idx] = color;
        self.color = color;
    }
}
