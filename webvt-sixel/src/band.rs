use crate::color::Rgba;

/// One six-pixel-high strip of the image.
///
/// Storage is column-major in groups of six: pixel `(x, y)` of the
/// band lives at `data[x * 6 + y]`. A zero pixel has never been
/// written and stays transparent.
#[derive(Debug)]
pub(crate) struct SixelBand {
    data: Vec<Rgba>,
    /// Current output column; a carriage return resets it to 0 without
    /// shrinking `width`.
    pub(crate) cursor: usize,
    /// High-water mark of the cursor.
    pub(crate) width: usize,
}

impl SixelBand {
    pub(crate) fn new(columns: usize) -> Self {
        Self {
            data: vec![0; columns.max(4) * 6],
            cursor: 0,
            width: 0,
        }
    }

    /// Rows actually covered by non-transparent pixels, 0-6.
    pub(crate) fn height(&self) -> usize {
        for row in (0..6).rev() {
            let mut pos = row;
            let end = self.width * 6 + row;
            while pos < end {
                if self.data[pos] != 0 {
                    return row + 1;
                }
                pos += 6;
            }
        }
        0
    }

    /// Paint one sixel pattern `repeat` times at the cursor.
    ///
    /// `code` is the data byte minus 0x3F: bit N set paints row N.
    /// A zero code still advances the cursor (and the width high-water
    /// mark), which is how transparent runs take up space.
    pub(crate) fn put(&mut self, code: u8, color: Rgba, repeat: usize) {
        let mut pos = self.cursor * 6;
        let needed = pos + repeat * 6;
        if needed > self.data.len() {
            let mut len = self.data.len().max(6);
            while needed > len {
                len *= 2;
            }
            self.data.resize(len, 0);
        }

        self.cursor += repeat;
        self.width = self.width.max(self.cursor);

        if code != 0 {
            for _ in 0..repeat {
                for row in 0..6 {
                    if code & (1 << row) != 0 {
                        self.data[pos + row] = color;
                    }
                }
                pos += 6;
            }
        }
    }

    /// Copy one pixel row of the band into `target`, skipping
    /// transparent pixels. Copies `length` pixels starting at band
    /// column `src_start` to `target[dest_start..]`.
    pub(crate) fn copy_pixel_row(
        &self,
        target: &mut [Rgba],
        dest_start: usize,
        row: usize,
        src_start: usize,
        length: usize,
    ) {
        let end = self.width.min(src_start + length);
        for (i, col) in (src_start..end).enumerate() {
            let pixel = self.data[col * 6 + row];
            if pixel != 0 {
                target[dest_start + i] = pixel;
            }
        }
    }
}
