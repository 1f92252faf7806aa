use serde::{Deserialize, Serialize};

/// How the channels of a composite are combined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositeMode {
    /// Overlay all channels, each through its own look-up table.
    #[default]
    Composite,
    /// Show the active channel through its look-up table.
    Color,
    /// Show the active channel in shades of gray.
    Grayscale,
}

/// Maps raw sample values to display colors.
///
/// Values are first scaled from the display range `min..=max` onto 256 table entries.
#[derive(Clone, Debug, PartialEq)]
pub struct Lut {
    table: Vec<[u8; 3]>,
    min: f64,
    max: f64,
}

impl Lut {
    pub const ENTRIES: usize = 256;

    /// A linear ramp from black to the given color.
    pub fn tinted(color: [u8; 3]) -> Self {
        let table = (0..Self::ENTRIES)
            .map(|idx| color.map(|c| (usize::from(c) * idx / (Self::ENTRIES - 1)) as u8))
            .collect();

        Lut {
            table,
            min: 0.0,
            max: 255.0,
        }
    }

    /// A linear ramp from black to white.
    pub fn grays() -> Self {
        Self::tinted([0xff; 3])
    }

    /// The default look-up table of a channel.
    ///
    /// Cycles through red, green, blue, gray, cyan, magenta and yellow.
    pub fn for_channel(channel: usize) -> Self {
        const COLORS: [[u8; 3]; 7] = [
            [0xff, 0, 0],
            [0, 0xff, 0],
            [0, 0, 0xff],
            [0xff, 0xff, 0xff],
            [0, 0xff, 0xff],
            [0xff, 0, 0xff],
            [0xff, 0xff, 0],
        ];

        Self::tinted(COLORS[channel % COLORS.len()])
    }

    pub fn with_display_range(self, min: f64, max: f64) -> Self {
        Lut { min, max, ..self }
    }

    pub fn display_range(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// The brightest color of the table.
    pub fn color(&self) -> [u8; 3] {
        self.table[Self::ENTRIES - 1]
    }

    /// Look up the display color of a raw value.
    pub fn map(&self, value: f64) -> [u8; 3] {
        self.table[self.index(value)]
    }

    fn index(&self, value: f64) -> usize {
        let last = Self::ENTRIES - 1;
        if self.max <= self.min {
            return if value > self.min { last } else { 0 };
        }

        let scaled = (value - self.min) / (self.max - self.min) * Self::ENTRIES as f64;
        if scaled.is_nan() || scaled < 0.0 {
            0
        } else {
            (scaled as usize).min(last)
        }
    }
}

impl Default for Lut {
    fn default() -> Self {
        Lut::grays()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_endpoints() {
        let red = Lut::tinted([0xff, 0, 0]);
        assert_eq!(red.map(0.0), [0, 0, 0]);
        assert_eq!(red.map(255.0), [0xff, 0, 0]);
        assert_eq!(red.color(), [0xff, 0, 0]);
    }

    #[test]
    fn display_range_clamps() {
        let lut = Lut::grays().with_display_range(100.0, 4195.0);
        assert_eq!(lut.map(50.0), [0; 3]);
        assert_eq!(lut.map(100.0), [0; 3]);
        assert_eq!(lut.map(4195.0), [0xff; 3]);
        assert_eq!(lut.map(65535.0), [0xff; 3]);
        assert_eq!(lut.map(f64::NAN), [0; 3]);
    }

    #[test]
    fn degenerate_range_thresholds() {
        let lut = Lut::grays().with_display_range(10.0, 10.0);
        assert_eq!(lut.map(10.0), [0; 3]);
        assert_eq!(lut.map(11.0), [0xff; 3]);
    }

    #[test]
    fn channel_colors_cycle() {
        assert_eq!(Lut::for_channel(0).color(), [0xff, 0, 0]);
        assert_eq!(Lut::for_channel(1).color(), [0, 0xff, 0]);
        assert_eq!(Lut::for_channel(7), Lut::for_channel(0));
    }
}
