pub mod error;
#[cfg(feature = "hardware")]
pub mod mcp3008;

use gauge_traits::{Diagnostics, FuelDisplay, FuelSensor};
use std::error::Error;
use std::io::{self, Write};

// Stock direct calibration, inverted to turn simulated gallons back into
// the raw code the real divider would produce.
const SIM_INTERCEPT_G: f32 = 26.3;
const SIM_SLOPE_G_PER_COUNT: f32 = -0.0637;
const ADC_MAX: u16 = 1023;

// Deterministic tiny PRNG (xorshift32)
#[derive(Debug, Clone)]
struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

/// Simulated fuel sender: a slowly draining tank with slosh jitter.
///
/// Each read drains a little fuel, maps the level through the inverse of
/// the stock direct calibration, and adds a few counts of deterministic
/// noise so the filtered variant has something to smooth.
pub struct SimulatedSender {
    level_g: f32,
    drain_g_per_read: f32,
    noise_counts: u16,
    rng: XorShift32,
}

impl SimulatedSender {
    pub fn new(start_gallons: f32) -> Self {
        Self {
            level_g: start_gallons.clamp(0.0, SIM_INTERCEPT_G),
            drain_g_per_read: 0.002,
            noise_counts: 6,
            rng: XorShift32::new(0x9E37_79B9),
        }
    }

    pub fn with_drain(mut self, gallons_per_read: f32) -> Self {
        self.drain_g_per_read = gallons_per_read.max(0.0);
        self
    }

    pub fn with_noise(mut self, counts: u16) -> Self {
        self.noise_counts = counts;
        self
    }

    pub fn level_gallons(&self) -> f32 {
        self.level_g
    }
}

impl FuelSensor for SimulatedSender {
    fn read_raw(&mut self) -> Result<u16, Box<dyn Error + Send + Sync>> {
        self.level_g = (self.level_g - self.drain_g_per_read).max(0.0);
        let ideal = (self.level_g - SIM_INTERCEPT_G) / SIM_SLOPE_G_PER_COUNT;
        let span = i32::from(self.noise_counts) * 2 + 1;
        let jitter = (self.rng.next_u32() % span as u32) as i32 - i32::from(self.noise_counts);
        let raw = (ideal as i32 + jitter).clamp(0, i32::from(ADC_MAX)) as u16;
        tracing::trace!(raw, level_g = self.level_g, "simulated sender read");
        Ok(raw)
    }
}

/// Right-align `value` in a `width`-character field with `decimals`
/// digits after the point. The cluster's stats line is fixed-width, so
/// fields never shift as values change magnitude.
pub fn fixed_decimal(value: f32, width: usize, decimals: usize) -> String {
    format!("{value:>width$.decimals$}")
}

/// Character-cell display rendered to any writer (stdout on the bench).
///
/// Draws the bar as `[####........]` with one cell per segment, then the
/// stats line with fixed-width right-aligned fields.
pub struct ConsoleDisplay<W: Write> {
    out: W,
    cells: u8,
    stats_width: usize,
    stats_decimals: usize,
}

impl ConsoleDisplay<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            cells: 16,
            stats_width: 6,
            stats_decimals: 1,
        }
    }

    pub fn with_cells(mut self, cells: u8) -> Self {
        self.cells = cells.max(1);
        self
    }

    pub fn with_stats_format(mut self, width: usize, decimals: usize) -> Self {
        self.stats_width = width.max(1);
        self.stats_decimals = decimals;
        self
    }

    /// Consume the display and hand back the writer (tests read it back).
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FuelDisplay for ConsoleDisplay<W> {
    fn render_meter(&mut self, segments: u8) -> Result<(), Box<dyn Error + Send + Sync>> {
        let filled = segments.min(self.cells) as usize;
        let empty = self.cells as usize - filled;
        writeln!(self.out, "[{}{}]", "#".repeat(filled), ".".repeat(empty))
            .map_err(error::HwError::Io)?;
        Ok(())
    }

    fn render_stats(&mut self, raw: u16, gallons: f32) -> Result<(), Box<dyn Error + Send + Sync>> {
        let raw_field = fixed_decimal(f32::from(raw), self.stats_width, 0);
        let gal_field = fixed_decimal(gallons, self.stats_width, self.stats_decimals);
        writeln!(self.out, "raw{raw_field} gal{gal_field}").map_err(error::HwError::Io)?;
        Ok(())
    }
}

/// Line-oriented diagnostics over any writer; write failures are dropped
/// on the floor because the sink is purely observational.
pub struct LineDiagnostics<W: Write> {
    out: W,
}

impl LineDiagnostics<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> LineDiagnostics<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Diagnostics for LineDiagnostics<W> {
    fn line(&mut self, msg: &str) {
        let _ = writeln!(self.out, "{msg}");
    }
}
