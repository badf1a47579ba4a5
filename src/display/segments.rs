//! Glyphs and common-anode segment encoding.
//!
//! Bit layout per digit, active low (0 = segment lit):
//!
//! ```text
//! Bit:   7    6    5    4    3    2    1    0
//!       [DP] [G]  [F]  [E]  [D]  [C]  [B]  [A]
//! ```

/// Everything the display can show on one digit.
///
/// The discriminant indexes [`SEGMENT_MAP`], so the variant order is part
/// of the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Glyph {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    L,
    O,
    P,
    S,
    U,
    Y,
    /// Lowercase r, used as the "remote" prefix.
    R,
    Zero,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Minus,
    Blank,
    /// Lowercase h, the humidity unit suffix.
    LowerH,
}

/// Active-low segment patterns, indexed by `Glyph` discriminant.
pub const SEGMENT_MAP: [u8; 30] = [
    0b1000_1000, // A: ABCEFG
    0b1000_0011, // b: CDEFG
    0b1100_0110, // C: ADEF
    0b1010_0001, // d: BCDEG
    0b1000_0110, // E: ADEFG
    0b1000_1110, // F: AEFG
    0b1000_0010, // G: ACDEFG
    0b1000_1001, // H: BCEFG
    0b1111_1001, // I: BC
    0b1111_0001, // J: BCD
    0b1100_0111, // L: DEF
    0b1100_0000, // O: ABCDEF
    0b1000_1100, // P: ABEFG
    0b1001_0010, // S: ACDFG
    0b1100_0001, // U: BCDEF
    0b1001_0001, // Y: BCDFG
    0b1010_1111, // r: EG
    0b1100_0000, // 0: ABCDEF
    0b1111_1001, // 1: BC
    0b1010_0100, // 2: ABDEG
    0b1011_0000, // 3: ABCDG
    0b1001_1001, // 4: BCFG
    0b1001_0010, // 5: ACDFG
    0b1000_0010, // 6: ACDEFG
    0b1111_1000, // 7: ABC
    0b1000_0000, // 8: ABCDEFG
    0b1001_0000, // 9: ABCDFG
    0b1011_1111, // -: G
    0b1111_1111, // blank
    0b1000_1011, // h: CEFG
];

const DIGIT_GLYPHS: [Glyph; 10] = [
    Glyph::Zero,
    Glyph::One,
    Glyph::Two,
    Glyph::Three,
    Glyph::Four,
    Glyph::Five,
    Glyph::Six,
    Glyph::Seven,
    Glyph::Eight,
    Glyph::Nine,
];

impl Glyph {
    /// Glyph for a decimal digit. Values above 9 render blank rather than
    /// panicking or lighting garbage segments.
    pub fn digit(d: u8) -> Self {
        DIGIT_GLYPHS.get(d as usize).copied().unwrap_or(Glyph::Blank)
    }
}

/// Encode a glyph into its shift-register byte. Enabling the decimal point
/// clears bit 7 (active low).
pub fn encode(glyph: Glyph, dp: bool) -> u8 {
    let pattern = SEGMENT_MAP[glyph as usize];
    if dp { pattern & 0x7F } else { pattern }
}
