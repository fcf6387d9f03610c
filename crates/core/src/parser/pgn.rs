//! PGN import: SAN moves plus the position after every half-move

use pgn_reader::{RawTag, SanPlus, Skip, Visitor};
use shakmaty::{fen::Fen, Chess, EnPassantMode, Position};
use std::fs;
use std::io::Cursor;
use std::ops::ControlFlow;
use std::path::Path;

use crate::error::{Error, Result};

/// A game replayed move by move.
#[derive(Debug, Clone)]
pub struct PgnGame {
    pub event: Option<String>,
    pub site: Option<String>,
    pub date: Option<String>,
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>,
    /// SAN with check and mate suffixes, one per half-move.
    pub moves: Vec<String>,
    /// FEN after each half-move; `positions[i]` follows `moves[i]`.
    pub positions: Vec<String>,
}

impl PgnGame {
    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn summary(&self) -> String {
        let white = self.white.as_deref().unwrap_or("Unknown");
        let black = self.black.as_deref().unwrap_or("Unknown");
        let result = self.result.as_deref().unwrap_or("*");
        format!("{} vs {} - {}", white, black, result)
    }
}

#[derive(Default)]
struct GameTags {
    event: Option<String>,
    site: Option<String>,
    date: Option<String>,
    white: Option<String>,
    black: Option<String>,
    result: Option<String>,
}

struct GameMoves {
    tags: GameTags,
    moves: Vec<String>,
    positions: Vec<String>,
    current_position: Chess,
    success: bool,
}

struct GameParser;

impl Visitor for GameParser {
    type Tags = GameTags;
    type Movetext = GameMoves;
    type Output = Option<PgnGame>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(GameTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let name_str = String::from_utf8_lossy(name);
        let value_str = value.decode_utf8_lossy().to_string();

        match name_str.as_ref() {
            "Event" => tags.event = Some(value_str),
            "Site" => tags.site = Some(value_str),
            "Date" => tags.date = Some(value_str),
            "White" => tags.white = Some(value_str),
            "Black" => tags.black = Some(value_str),
            "Result" => tags.result = Some(value_str),
            _ => {}
        }

        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(GameMoves {
            tags,
            moves: Vec::new(),
            positions: Vec::new(),
            current_position: Chess::default(),
            success: true,
        })
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        if !movetext.success {
            return ControlFlow::Continue(());
        }

        let played = san
            .san
            .to_move(&movetext.current_position)
            .ok()
            .and_then(|m| movetext.current_position.clone().play(m).ok());

        match played {
            Some(new_pos) => {
                movetext.moves.push(san.to_string());
                movetext
                    .positions
                    .push(Fen::from_position(&new_pos, EnPassantMode::Legal).to_string());
                movetext.current_position = new_pos;
            }
            None => {
                tracing::warn!(san = %san, ply = movetext.moves.len(), "illegal move in PGN");
                movetext.success = false;
            }
        }

        ControlFlow::Continue(())
    }

    fn begin_variation(
        &mut self,
        _movetext: &mut Self::Movetext,
    ) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        if movetext.success {
            Some(PgnGame {
                event: movetext.tags.event,
                site: movetext.tags.site,
                date: movetext.tags.date,
                white: movetext.tags.white,
                black: movetext.tags.black,
                result: movetext.tags.result,
                moves: movetext.moves,
                positions: movetext.positions,
            })
        } else {
            None
        }
    }
}

pub fn parse_pgn_file<P: AsRef<Path>>(path: P) -> Result<Vec<PgnGame>> {
    let contents = fs::read_to_string(path)?;
    parse_pgn_string(&contents)
}

/// Parses every game in `pgn`. Games containing an illegal move are skipped;
/// finding no valid game at all is an error.
pub fn parse_pgn_string(pgn: &str) -> Result<Vec<PgnGame>> {
    let mut parser = GameParser;
    let mut games: Vec<PgnGame> = Vec::new();

    let cursor = Cursor::new(pgn.as_bytes());
    let mut reader = pgn_reader::Reader::new(cursor);

    loop {
        match reader.read_game(&mut parser) {
            Ok(Some(maybe_game)) => {
                if let Some(game) = maybe_game {
                    games.push(game);
                }
            }
            Ok(None) => break,
            Err(e) => return Err(Error::Pgn(e.to_string())),
        }
    }

    if games.is_empty() {
        Err(Error::Pgn("no valid games found in PGN".to_string()))
    } else {
        Ok(games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::BoardPosition;
    use shakmaty::Color;

    const SAMPLE_PGN: &str = r#"[Event "Test"]
[White "Alice"]
[Black "Bob"]
[Result "1-0"]

1. e4 e5 2. Nf3 Nc6 3. Bb5 1-0
"#;

    #[test]
    fn test_parse_pgn_string() {
        let games = parse_pgn_string(SAMPLE_PGN).unwrap();
        assert_eq!(games.len(), 1);

        let game = &games[0];
        assert_eq!(game.white.as_deref(), Some("Alice"));
        assert_eq!(game.black.as_deref(), Some("Bob"));
        assert_eq!(game.result.as_deref(), Some("1-0"));
        assert_eq!(game.move_count(), 5);
        assert_eq!(game.positions.len(), 5);
    }

    #[test]
    fn test_parse_pgn_file() {
        let path = std::env::temp_dir().join(format!("strategist_{}.pgn", std::process::id()));
        fs::write(&path, SAMPLE_PGN).unwrap();

        let games = parse_pgn_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(games[0].move_count(), 5);

        assert!(matches!(parse_pgn_file(&path), Err(Error::Io(_))));
    }

    #[test]
    fn test_game_summary() {
        let games = parse_pgn_string(SAMPLE_PGN).unwrap();
        let summary = games[0].summary();
        assert_eq!(summary, "Alice vs Bob - 1-0");
    }

    #[test]
    fn test_positions_follow_moves() {
        let games = parse_pgn_string(SAMPLE_PGN).unwrap();
        let game = &games[0];

        assert_eq!(
            game.positions[0],
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );

        let last = BoardPosition::from_fen(game.positions.last().unwrap()).unwrap();
        assert_eq!(last.turn(), Color::Black);
        assert_eq!(last.pieces().count(), 32);
    }

    #[test]
    fn test_check_suffix_is_kept() {
        let games = parse_pgn_string("1. e4 f6 2. d4 g5 3. Qh5# 1-0\n").unwrap();
        assert_eq!(games[0].moves.last().map(String::as_str), Some("Qh5#"));
    }

    #[test]
    fn test_illegal_game_is_rejected() {
        assert!(matches!(
            parse_pgn_string("1. e4 e5 2. Ke3 Ke6 3. Qxf7 *\n"),
            Err(Error::Pgn(_))
        ));
    }
}
