//! Frame and line accounting for DMA driven captures.

use core::convert::TryFrom;

use super::config::{CaptureRequest, DmaGranularity};
use crate::error::Error;

/// Byte sizes derived from a `CaptureRequest`. Recomputed by `init` and `capture_frame_dma`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ByteCounts {
    /// One full frame, odd and even lines interleaved.
    pub frame: u32,

    pub odd_line: u32,

    pub even_line: u32,

    /// Size of the line currently being transferred.
    pub line: u32,
}

impl ByteCounts {
    /// Compute the byte counts for `req`, with the current line preset to the even line size.
    pub fn from_request(req: &CaptureRequest) -> Result<Self, Error> {
        let ppl = u64::from(req.pixels_per_line);
        let lpf = u64::from(req.lines_per_frame);
        let odd = u64::from(req.bits_per_pixel_odd);
        let even = u64::from(req.bits_per_pixel_even);

        let frame = ((odd + even) * ppl * lpf) >> 4;
        let odd_line = (odd * ppl) >> 3;
        let even_line = (even * ppl) >> 3;

        let frame = u32::try_from(frame).map_err(|_| Error::BadParameter)?;
        let odd_line = u32::try_from(odd_line).map_err(|_| Error::BadParameter)?;
        let even_line = u32::try_from(even_line).map_err(|_| Error::BadParameter)?;

        Ok(ByteCounts {
            frame,
            odd_line,
            even_line,
            line: even_line,
        })
    }

    /// Size of the next line transfer given the number of lines already done.
    pub fn line_for(&self, line: u32) -> u32 {
        match line & 1 {
            0 => self.even_line,
            _ => self.odd_line,
        }
    }

    /// Size of one DMA transfer for `granularity`.
    pub fn transfer(&self, granularity: DmaGranularity) -> u32 {
        match granularity {
            DmaGranularity::WholeFrame => self.frame,
            DmaGranularity::PerLine => self.line,
        }
    }
}

/// Counts lines and frame ends as DMA transfers complete.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LineCounter {
    /// Lines received in the current frame. Only the DMA completion path moves it.
    line: u32,

    /// Frames finished since the last reset. Increases forever.
    frame_end: u32,
}

impl LineCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.line = 0;
        self.frame_end = 0;
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn frame_end(&self) -> u32 {
        self.frame_end
    }

    /// One line transfer completed. Wraps at `lines_per_frame` and counts the frame end.
    pub fn line_done(&mut self, lines_per_frame: u32) {
        self.line = self.line.wrapping_add(1);
        if self.line >= lines_per_frame {
            self.line -= lines_per_frame;
            self.frame_end = self.frame_end.wrapping_add(1);
        }
    }

    /// One whole frame transfer completed. The line count is not wrapped.
    pub fn frame_done(&mut self, lines_per_frame: u32) {
        self.line = self.line.wrapping_add(lines_per_frame);
        self.frame_end = self.frame_end.wrapping_add(1);
    }

    /// Frame end reported by the VFIFO status flags.
    pub fn frame_end_seen(&mut self) {
        self.frame_end = self.frame_end.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vga() -> CaptureRequest {
        CaptureRequest {
            img_addr: 0x2000_0000,
            pixels_per_line: 640,
            lines_per_frame: 480,
            bits_per_pixel_odd: 8,
            bits_per_pixel_even: 8,
            ..CaptureRequest::default()
        }
    }

    #[test]
    fn vga_raw8_byte_counts() {
        let counts = ByteCounts::from_request(&vga()).unwrap();
        assert_eq!(counts.frame, 307_200);
        assert_eq!(counts.odd_line, 640);
        assert_eq!(counts.even_line, 640);
        assert_eq!(counts.line, 640);
    }

    #[test]
    fn frame_bytes_equal_the_sum_of_line_bytes() {
        let req = CaptureRequest {
            pixels_per_line: 320,
            lines_per_frame: 240,
            bits_per_pixel_odd: 8,
            bits_per_pixel_even: 16,
            ..CaptureRequest::default()
        };
        let counts = ByteCounts::from_request(&req).unwrap();
        let sum: u32 = (0..req.lines_per_frame).map(|l| counts.line_for(l)).sum();
        assert_eq!(counts.frame, sum);
    }

    #[test]
    fn oversized_frames_are_rejected() {
        let req = CaptureRequest {
            pixels_per_line: 0x10_0000,
            lines_per_frame: 0x10_0000,
            bits_per_pixel_odd: 24,
            bits_per_pixel_even: 24,
            ..CaptureRequest::default()
        };
        assert_eq!(ByteCounts::from_request(&req), Err(Error::BadParameter));
    }

    #[test]
    fn transfer_size_follows_granularity() {
        let mut counts = ByteCounts::from_request(&vga()).unwrap();
        counts.line = counts.odd_line;
        assert_eq!(counts.transfer(DmaGranularity::WholeFrame), 307_200);
        assert_eq!(counts.transfer(DmaGranularity::PerLine), 640);
    }

    #[test]
    fn line_counter_wraps_once_per_frame() {
        let mut counter = LineCounter::new();
        for _ in 0..(3 * 4 + 2) {
            counter.line_done(4);
            assert!(counter.line() < 4);
        }
        assert_eq!(counter.frame_end(), 3);
        assert_eq!(counter.line(), 2);
    }

    #[test]
    fn whole_frame_completion_always_counts_a_frame() {
        let mut counter = LineCounter::new();
        counter.frame_done(480);
        counter.frame_done(480);
        assert_eq!(counter.frame_end(), 2);
        assert_eq!(counter.line(), 960);

        counter.reset();
        assert_eq!(counter, LineCounter::new());
    }
}
