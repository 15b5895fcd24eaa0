use crate::grammar::WRAP_WIDTH;

/// Default bound on splitter rounds while settling the part total.
pub const DEFAULT_MAX_ROUNDS: usize = 5;

/// Default upper bound on the part total a decoder accepts.
pub const DEFAULT_MAX_PARTS: usize = 65_536;

/// QR error-correction tier the parts will be rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCorrection {
    /// ~7% recovery.
    Low,
    /// ~15% recovery.
    Medium,
    /// ~25% recovery.
    Quartile,
    /// ~30% recovery.
    High,
}

impl ErrorCorrection {
    /// Single-letter name used on the command line and in documents.
    pub fn letter(self) -> char {
        match self {
            ErrorCorrection::Low => 'L',
            ErrorCorrection::Medium => 'M',
            ErrorCorrection::Quartile => 'Q',
            ErrorCorrection::High => 'H',
        }
    }
}

/// Characters a rendered part may hold at each error-correction tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityTable {
    pub low: usize,
    pub medium: usize,
    pub quartile: usize,
    pub high: usize,
}

impl CapacityTable {
    pub fn capacity(&self, level: ErrorCorrection) -> usize {
        match level {
            ErrorCorrection::Low => self.low,
            ErrorCorrection::Medium => self.medium,
            ErrorCorrection::Quartile => self.quartile,
            ErrorCorrection::High => self.high,
        }
    }
}

impl Default for CapacityTable {
    /// Byte-mode capacities of a version 21 QR code, with headroom.
    fn default() -> Self {
        Self {
            low: 635,
            medium: 627,
            quartile: 455,
            high: 369,
        }
    }
}

/// Controls how a file is split into parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Maximum characters per rendered part.
    pub capacity: usize,
    /// Splitter rounds allowed before giving up on a stable part total.
    pub max_rounds: usize,
    /// Soft wrap column for payload text.
    pub wrap_width: usize,
}

impl EncoderConfig {
    /// Configuration for an explicit capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Configuration for a tier of the default capacity table.
    pub fn for_level(level: ErrorCorrection) -> Self {
        Self::for_level_in(level, &CapacityTable::default())
    }

    /// Configuration for a tier of a caller-supplied capacity table.
    pub fn for_level_in(level: ErrorCorrection, table: &CapacityTable) -> Self {
        Self::with_capacity(table.capacity(level))
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            capacity: CapacityTable::default().medium,
            max_rounds: DEFAULT_MAX_ROUNDS,
            wrap_width: WRAP_WIDTH,
        }
    }
}

/// Limits applied while decoding untrusted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Largest part total a header may declare.
    pub max_parts: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_parts: DEFAULT_MAX_PARTS,
        }
    }
}
