use cozy_chess::{Board as CozyBoard, Color, Move, Piece};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PositionError {
    #[error("invalid FEN: {0}")]
    InvalidFen(String),
    #[error("illegal move: {0}")]
    IllegalMove(String),
}

/// A board with make/unmake history. cozy-chess is copy-make, so the history
/// is a stack of pre-move boards; `unmake` pops the stack. This gives the
/// strict LIFO apply/undo discipline the search relies on, plus repetition
/// detection over the stored hashes.
#[derive(Clone, Debug)]
pub struct Position {
    board: CozyBoard,
    history: Vec<CozyBoard>,
}

impl Position {
    pub fn startpos() -> Self {
        Self { board: CozyBoard::default(), history: Vec::new() }
    }

    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        CozyBoard::from_fen(fen, false)
            .map(|b| Self { board: b, history: Vec::new() })
            .map_err(|e| PositionError::InvalidFen(format!("{e:?}")))
    }

    pub fn board(&self) -> &CozyBoard { &self.board }

    /// Apply a legal move. Must be balanced by a later `unmake`.
    pub fn make(&mut self, mv: Move) {
        self.history.push(self.board.clone());
        self.board.play(mv);
    }

    /// Undo the most recent `make`. No-op on an empty history.
    pub fn unmake(&mut self) {
        if let Some(prev) = self.history.pop() {
            self.board = prev;
        }
    }

    /// Plies applied since construction.
    pub fn ply(&self) -> usize { self.history.len() }

    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        self.board.generate_moves(|ml| {
            for m in ml { moves.push(m); }
            false
        });
        moves
    }

    pub fn side_to_move(&self) -> Color { self.board.side_to_move() }

    pub fn halfmove_clock(&self) -> u32 { self.board.halfmove_clock() as u32 }

    pub fn hash(&self) -> u64 { self.board.hash() }

    pub fn in_check(&self) -> bool { !self.board.checkers().is_empty() }

    pub fn piece_count(&self) -> u32 {
        self.board.occupied().into_iter().count() as u32
    }

    pub fn king_missing(&self, color: Color) -> bool {
        (self.board.pieces(Piece::King) & self.board.colors(color)).is_empty()
    }

    /// Threefold repetition of the current position. Only positions since the
    /// last irreversible move can repeat, so the scan is bounded by the
    /// halfmove clock.
    pub fn is_repetition(&self) -> bool {
        let h = self.board.hash();
        let window = self.board.halfmove_clock() as usize;
        let mut seen = 1;
        for prev in self.history.iter().rev().take(window) {
            if prev.hash() == h {
                seen += 1;
                if seen >= 3 {
                    return true;
                }
            }
        }
        false
    }

    /// Adjudicated over: a king is gone (defensive; legal movegen should make
    /// this unreachable), threefold repetition, or the fifty-move rule.
    pub fn is_game_over(&self) -> bool {
        self.king_missing(Color::White)
            || self.king_missing(Color::Black)
            || self.is_repetition()
            || self.halfmove_clock() >= 100
    }

    pub fn make_move_uci(&mut self, mv_uci: &str) -> Result<(), PositionError> {
        let mut found = None;
        self.board.generate_moves(|moves| {
            for m in moves {
                if format!("{}", m) == mv_uci { found = Some(m); break; }
            }
            found.is_some()
        });
        match found {
            Some(m) => { self.make(m); Ok(()) }
            None => Err(PositionError::IllegalMove(mv_uci.to_string())),
        }
    }

    pub fn set_from_start_and_moves(moves: &[String]) -> Result<Self, PositionError> {
        let mut pos = Self::startpos();
        for m in moves { pos.make_move_uci(m)?; }
        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_unmake_restores_board() {
        let mut pos = Position::startpos();
        let before = format!("{}", pos.board());
        let hash = pos.hash();
        let mv = pos.legal_moves()[0];
        pos.make(mv);
        assert_ne!(pos.hash(), hash);
        pos.unmake();
        assert_eq!(pos.hash(), hash);
        assert_eq!(format!("{}", pos.board()), before);
    }

    #[test]
    fn repetition_detected_after_knight_shuffle() {
        let mut pos = Position::startpos();
        // Ng1f3 Ng8f6 Nf3g1 Nf6g8, twice, returns to startpos for the third time.
        let cycle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        for _ in 0..2 {
            for m in cycle {
                pos.make_move_uci(m).unwrap();
            }
        }
        assert!(pos.is_repetition());
        assert!(pos.is_game_over());
    }

    #[test]
    fn fifty_move_rule_from_fen_clock() {
        let pos = Position::from_fen("k7/8/8/8/8/8/8/K7 w - - 100 80").unwrap();
        assert!(pos.halfmove_clock() >= 100);
        assert!(pos.is_game_over());
    }
}
