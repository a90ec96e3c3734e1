// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Built-in 5x7 bitmap font, the last resort when no TrueType font can be
// loaded. Covers digits, basic punctuation, Latin letters and the Cyrillic
// letters used in scale captions; anything else renders as a hollow box.
// Letters are drawn in capital form regardless of case.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
/// Horizontal advance including one column of spacing.
const ADVANCE: u32 = GLYPH_WIDTH + 1;

type Glyph = [u8; GLYPH_HEIGHT as usize];

const A: Glyph = [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001];
const B: Glyph = [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110];
const C: Glyph = [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110];
const D: Glyph = [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110];
const E: Glyph = [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111];
const F: Glyph = [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000];
const G: Glyph = [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111];
const H: Glyph = [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001];
const I: Glyph = [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110];
const J: Glyph = [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100];
const K: Glyph = [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001];
const L: Glyph = [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111];
const M: Glyph = [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001];
const N: Glyph = [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001];
const O: Glyph = [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110];
const P: Glyph = [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000];
const Q: Glyph = [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101];
const R: Glyph = [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001];
const S: Glyph = [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110];
const T: Glyph = [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100];
const U: Glyph = [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110];
const V: Glyph = [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100];
const W: Glyph = [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010];
const X: Glyph = [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001];
const Y: Glyph = [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100];
const Z: Glyph = [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111];

// Cyrillic shapes without a Latin twin.
const BE: Glyph = [0b11111, 0b10000, 0b10000, 0b11110, 0b10001, 0b10001, 0b11110];
const GHE: Glyph = [0b11111, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000];
const DE: Glyph = [0b00110, 0b01010, 0b01010, 0b01010, 0b01010, 0b11111, 0b10001];
const I_CYR: Glyph = [0b10001, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b10001];
const SHORT_I: Glyph = [0b01010, 0b00100, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001];
const EL: Glyph = [0b00111, 0b01001, 0b01001, 0b01001, 0b01001, 0b01001, 0b10001];
const PE: Glyph = [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001];
const U_CYR: Glyph = [0b10001, 0b10001, 0b10001, 0b01111, 0b00001, 0b00001, 0b01110];
const SHA: Glyph = [0b10101, 0b10101, 0b10101, 0b10101, 0b10101, 0b10101, 0b11111];

const DIGITS: [Glyph; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
];

const SPACE: Glyph = [0; 7];
const COLON: Glyph = [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000];
const PERIOD: Glyph = [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100];
const HYPHEN: Glyph = [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000];
const UNDERSCORE: Glyph = [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111];
const LEFT_PAREN: Glyph = [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010];
const RIGHT_PAREN: Glyph = [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000];
const UNKNOWN: Glyph = [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111];

fn glyph(ch: char) -> Glyph {
    let lower = ch.to_lowercase().next().unwrap_or(ch);
    match lower {
        '0'..='9' => DIGITS[lower as usize - '0' as usize],
        ' ' => SPACE,
        ':' => COLON,
        '.' | ',' => PERIOD,
        '-' => HYPHEN,
        '_' => UNDERSCORE,
        '(' => LEFT_PAREN,
        ')' => RIGHT_PAREN,
        'a' | 'а' => A,
        'b' | 'в' => B,
        'c' | 'с' => C,
        'd' => D,
        'e' | 'е' | 'ё' => E,
        'f' => F,
        'g' => G,
        'h' | 'н' => H,
        'i' => I,
        'j' => J,
        'k' | 'к' => K,
        'l' => L,
        'm' | 'м' => M,
        'n' => N,
        'o' | 'о' => O,
        'p' | 'р' => P,
        'q' => Q,
        'r' => R,
        's' => S,
        't' | 'т' => T,
        'u' => U,
        'v' => V,
        'w' => W,
        'x' | 'х' => X,
        'y' => Y,
        'z' => Z,
        'б' => BE,
        'г' => GHE,
        'д' => DE,
        'и' => I_CYR,
        'й' => SHORT_I,
        'л' => EL,
        'п' => PE,
        'у' => U_CYR,
        'ш' => SHA,
        _ => UNKNOWN,
    }
}

/// Pixel size of one font dot for a requested glyph height.
fn dot_size(font_size: u32) -> u32 {
    (font_size / (GLYPH_HEIGHT + 1)).max(1)
}

/// Rendered size of `text` at `font_size`.
pub fn text_size(text: &str, font_size: u32) -> (u32, u32) {
    let dot = dot_size(font_size);
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return (0, 0);
    }
    (
        (chars * ADVANCE - 1) * dot,
        GLYPH_HEIGHT * dot,
    )
}

/// Draw `text` with its centre at (`center_x`, `center_y`). Pixels falling
/// outside `canvas` are clipped.
pub fn draw_text_centered(
    canvas: &mut RgbImage,
    center_x: i32,
    center_y: i32,
    font_size: u32,
    text: &str,
    color: Rgb<u8>,
) {
    let dot = dot_size(font_size);
    let (width, height) = text_size(text, font_size);
    let left = center_x - (width / 2) as i32;
    let top = center_y - (height / 2) as i32;

    for (index, ch) in text.chars().enumerate() {
        let origin_x = left + (index as u32 * ADVANCE * dot) as i32;
        for (row, bits) in glyph(ch).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let x = origin_x + (col * dot) as i32;
                let y = top + (row as u32 * dot) as i32;
                draw_filled_rect_mut(canvas, Rect::at(x, y).of_size(dot, dot), color);
            }
        }
    }
}
