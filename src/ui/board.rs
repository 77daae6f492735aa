//! Text board renderer
//!
//! Rank 8 is drawn at the top. Squares of the last move are highlighted with
//! the palette's `last_move` colour, or bracketed (`[P]`) when the palette is
//! plain.

use crate::core::palette::Palette;
use crate::game::position::ChessPosition;

const FILES: &str = "    a  b  c  d  e  f  g  h";

/// Zero-based (file, rank) of both squares of a coordinate move
fn move_squares(uci: &str) -> Option<[(u32, u32); 2]> {
    let bytes = uci.as_bytes();
    if bytes.len() < 4 {
        return None;
    }
    let square = |f: u8, r: u8| -> Option<(u32, u32)> {
        let file = f.checked_sub(b'a').filter(|f| *f < 8)?;
        let rank = r.checked_sub(b'1').filter(|r| *r < 8)?;
        Some((u32::from(file), u32::from(rank)))
    };
    Some([square(bytes[0], bytes[1])?, square(bytes[2], bytes[3])?])
}

/// Draw `position`, marking the squares of `last_move` (coordinate notation)
pub fn render(position: &ChessPosition, last_move: Option<&str>, palette: &Palette) -> String {
    let marked = last_move.and_then(move_squares);
    let is_marked = |file: u32, rank: u32| {
        marked.is_some_and(|squares| squares.contains(&(file, rank)))
    };

    let mut out = String::new();
    out.push_str(FILES);
    out.push('\n');
    for rank in (0..8).rev() {
        out.push_str(&format!(" {} ", rank + 1));
        for file in 0..8 {
            let piece = position.piece_char_at(file, rank).unwrap_or('.');
            let highlighted = is_marked(file, rank);
            if palette.is_plain() {
                if highlighted {
                    out.push_str(&format!("[{piece}]"));
                } else {
                    out.push_str(&format!(" {piece} "));
                }
            } else {
                let background = if highlighted {
                    palette.last_move
                } else if (file + rank) % 2 == 0 {
                    palette.dark_square
                } else {
                    palette.light_square
                };
                out.push_str(&format!("{background} {piece} {}", palette.reset));
            }
        }
        out.push_str(&format!(" {}\n", rank + 1));
    }
    out.push_str(FILES);
    out
}
