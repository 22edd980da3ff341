// Stand-ins for the physical strand. Anything implementing `SmartLedsWrite<Color = RGB8>`
// (e.g. a ws2812/ws2801 SPI driver) can be used in their place.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use smart_leds::{RGB8, brightness};
use smart_leds_trait::SmartLedsWrite;

pub const BLACK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };
pub const RED: RGB8 = RGB8 { r: 255, g: 0, b: 0 };
pub const GREEN: RGB8 = RGB8 { r: 0, g: 255, b: 0 };
pub const BLUE: RGB8 = RGB8 { r: 0, g: 0, b: 255 };

/// Draws the strand as one line of 24-bit ANSI coloured blocks, redrawn in place.
pub struct TerminalStrand<W: Write> {
    out: W,
    brightness: u8,
    line: Vec<u8>,
}

impl<W: Write> TerminalStrand<W> {
    pub fn new(out: W, brightness: u8) -> Self {
        Self {
            out,
            brightness,
            line: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SmartLedsWrite for TerminalStrand<W> {
    type Error = io::Error;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        self.line.clear();
        self.line.push(b'\r');
        for c in brightness(iterator.into_iter().map(Into::<RGB8>::into), self.brightness) {
            write!(self.line, "\x1b[38;2;{};{};{}m\u{2588}", c.r, c.g, c.b)?;
        }
        self.line.extend_from_slice(b"\x1b[0m");
        self.out.write_all(&self.line)?;
        self.out.flush()
    }
}

/// Writes `r g b` bytes per pixel, one frame after another, for an external driver process.
pub struct RawStrand<W: Write> {
    out: W,
    frame: Vec<u8>,
}

impl<W: Write> RawStrand<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            frame: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SmartLedsWrite for RawStrand<W> {
    type Error = io::Error;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        self.frame.clear();
        for pixel in iterator {
            let c: RGB8 = pixel.into();
            self.frame.extend_from_slice(&[c.r, c.g, c.b]);
        }
        self.out.write_all(&self.frame)?;
        self.out.flush()
    }
}

pub fn fill<S>(strand: &mut S, num_pixels: usize, color: RGB8) -> Result<(), S::Error>
where
    S: SmartLedsWrite<Color = RGB8>,
{
    strand.write(std::iter::repeat_n(color, num_pixels))
}

pub fn clear<S>(strand: &mut S, num_pixels: usize) -> Result<(), S::Error>
where
    S: SmartLedsWrite<Color = RGB8>,
{
    fill(strand, num_pixels, BLACK)
}

/// Start-up check: the whole strand red, green, blue, then a single red pixel running
/// from the first to the last LED. Ends dark.
pub fn self_test<S>(strand: &mut S, num_pixels: usize, step: Duration) -> Result<(), S::Error>
where
    S: SmartLedsWrite<Color = RGB8>,
{
    for color in [RED, GREEN, BLUE] {
        fill(strand, num_pixels, color)?;
        thread::sleep(step * 10);
    }

    let mut pixels = vec![BLACK; num_pixels];
    for i in 0..num_pixels {
        pixels[i] = RED;
        if i > 0 {
            pixels[i - 1] = BLACK;
        }
        strand.write(pixels.iter().copied())?;
        thread::sleep(step);
    }

    clear(strand, num_pixels)
}
