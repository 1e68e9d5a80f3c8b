// --- File: hud.rs ---
// In-window status text drawn with a 5x7 bitmap font, one lit square per glyph pixel.
use glam::Vec2;

const GLYPH_WIDTH: usize = 5;
const GLYPH_HEIGHT: usize = 7;
// Gaps between glyphs and between lines, in font pixels
const GLYPH_SPACING: usize = 1;
const LINE_SPACING: usize = 2;

// Rows top to bottom, bit 4 is the leftmost column. Unknown characters draw blank.
fn glyph(c: char) -> [u8; GLYPH_HEIGHT] {
    match c.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b11111],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b10000, 0b11110, 0b00001, 0b00001, 0b11110],
        '6' => [0b01110, 0b10000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00001, 0b01110],
        ':' => [0b00000, 0b00100, 0b00100, 0b00000, 0b00100, 0b00100, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00100, 0b00100],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '[' => [0b01110, 0b01000, 0b01000, 0b01000, 0b01000, 0b01000, 0b01110],
        ']' => [0b01110, 0b00010, 0b00010, 0b00010, 0b00010, 0b00010, 0b01110],
        _ => [0; GLYPH_HEIGHT],
    }
}

/// Top-left corner, in window pixels, of every lit font pixel of `text`
/// drawn from `origin` with each font pixel `scale` window pixels wide.
/// `\n` starts a new line.
pub fn text_pixels(text: &str, origin: Vec2, scale: f32) -> Vec<Vec2> {
    let advance = ((GLYPH_WIDTH + GLYPH_SPACING) as f32) * scale;
    let line_height = ((GLYPH_HEIGHT + LINE_SPACING) as f32) * scale;

    let mut pixels = Vec::new();
    for (line_index, line) in text.lines().enumerate() {
        let line_origin = origin + Vec2::new(0.0, line_index as f32 * line_height);
        for (char_index, ch) in line.chars().enumerate() {
            let glyph_origin = line_origin + Vec2::new(char_index as f32 * advance, 0.0);
            for (row, bits) in glyph(ch).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 1 {
                        pixels.push(glyph_origin + Vec2::new(col as f32, row as f32) * scale);
                    }
                }
            }
        }
    }
    pixels
}

/// Width in window pixels of the longest line of `text`.
pub fn text_width(text: &str, scale: f32) -> f32 {
    let longest = text.lines().map(|line| line.chars().count()).max().unwrap_or(0);
    if longest == 0 {
        return 0.0;
    }
    // No trailing gap after the last glyph
    ((longest * (GLYPH_WIDTH + GLYPH_SPACING) - GLYPH_SPACING) as f32) * scale
}

/// Height in window pixels of all lines of `text`.
pub fn text_height(text: &str, scale: f32) -> f32 {
    let lines = text.lines().count();
    if lines == 0 {
        return 0.0;
    }
    ((lines * (GLYPH_HEIGHT + LINE_SPACING) - LINE_SPACING) as f32) * scale
}
