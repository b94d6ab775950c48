//! Standard font metrics and WinAnsi text encoding
//!
//! Standard fonts are not embedded, so text must be measured from the
//! published AFM widths and encoded with the font's single-byte encoding.

use super::codec::StandardFont;

/// Helvetica glyph widths for chars 32-126, in 1/1000ths of the em square
const HELVETICA_ASCII_WIDTHS: [u16; 95] = [
    278, // 32 space
    278, // 33 !
    355, // 34 "
    556, // 35 #
    556, // 36 $
    889, // 37 %
    667, // 38 &
    191, // 39 '
    333, // 40 (
    333, // 41 )
    389, // 42 *
    584, // 43 +
    278, // 44 ,
    333, // 45 -
    278, // 46 .
    278, // 47 /
    556, // 48 0
    556, // 49 1
    556, // 50 2
    556, // 51 3
    556, // 52 4
    556, // 53 5
    556, // 54 6
    556, // 55 7
    556, // 56 8
    556, // 57 9
    278, // 58 :
    278, // 59 ;
    584, // 60 <
    584, // 61 =
    584, // 62 >
    556, // 63 ?
    1015, // 64 @
    667, // 65 A
    667, // 66 B
    722, // 67 C
    722, // 68 D
    667, // 69 E
    611, // 70 F
    778, // 71 G
    722, // 72 H
    278, // 73 I
    500, // 74 J
    667, // 75 K
    556, // 76 L
    833, // 77 M
    722, // 78 N
    778, // 79 O
    667, // 80 P
    778, // 81 Q
    722, // 82 R
    667, // 83 S
    611, // 84 T
    722, // 85 U
    667, // 86 V
    944, // 87 W
    667, // 88 X
    667, // 89 Y
    611, // 90 Z
    278, // 91 [
    278, // 92 \
    278, // 93 ]
    469, // 94 ^
    556, // 95 _
    333, // 96 `
    556, // 97 a
    556, // 98 b
    500, // 99 c
    556, // 100 d
    556, // 101 e
    278, // 102 f
    556, // 103 g
    556, // 104 h
    222, // 105 i
    222, // 106 j
    500, // 107 k
    222, // 108 l
    833, // 109 m
    556, // 110 n
    556, // 111 o
    556, // 112 p
    556, // 113 q
    333, // 114 r
    500, // 115 s
    278, // 116 t
    556, // 117 u
    500, // 118 v
    722, // 119 w
    500, // 120 x
    500, // 121 y
    500, // 122 z
    334, // 123 {
    260, // 124 |
    334, // 125 }
    584, // 126 ~
];

/// Width used for WinAnsi codes outside the ASCII table
const HELVETICA_DEFAULT_WIDTH: u16 = 556;

/// Byte substituted for characters WinAnsiEncoding cannot represent
const REPLACEMENT: u8 = b'?';

impl StandardFont {
    /// Glyph width of one encoded byte, in 1/1000ths of the em square
    pub fn glyph_width(&self, code: u8) -> u16 {
        match self {
            StandardFont::Helvetica => match code {
                32..=126 => HELVETICA_ASCII_WIDTHS[(code - 32) as usize],
                0x95 => 350,          // bullet
                0x96 => 556,          // en dash
                0x97 => 1000,         // em dash
                0x99 => 1000,         // trademark
                0xA0 => 278,          // non-breaking space
                _ => HELVETICA_DEFAULT_WIDTH,
            },
        }
    }

    /// Advance width of `text` at `size` points
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let (encoded, _) = encode_win_ansi(text);
        let units: u32 = encoded.iter().map(|&b| self.glyph_width(b) as u32).sum();
        units as f32 * size / 1000.0
    }
}

/// Encode text with WinAnsiEncoding
///
/// Returns the encoded bytes and whether any character had to be replaced.
pub fn encode_win_ansi(text: &str) -> (Vec<u8>, bool) {
    let mut replaced = false;
    let bytes = text
        .chars()
        .map(|c| {
            win_ansi_code(c).unwrap_or_else(|| {
                replaced = true;
                REPLACEMENT
            })
        })
        .collect();
    (bytes, replaced)
}

fn win_ansi_code(c: char) -> Option<u8> {
    let code = match c {
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(code)
}
