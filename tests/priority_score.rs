use cozy_chess::Move;
use montebot::board::cozy::Position;
use montebot::search::priority::{score_move, KING_MOVE_FACTOR};
use pretty_assertions::assert_eq;

fn find(pos: &Position, uci: &str) -> Move {
    pos.legal_moves()
        .into_iter()
        .find(|m| format!("{}", m) == uci)
        .unwrap_or_else(|| panic!("{uci} not legal here"))
}

#[test]
fn scoring_is_idempotent() {
    let pos = Position::startpos();
    for mv in pos.legal_moves() {
        let a = score_move(pos.board(), mv);
        let b = score_move(pos.board(), mv);
        assert_eq!(a.to_bits(), b.to_bits(), "score of {mv} not bit-identical");
    }
}

#[test]
fn captures_outscore_quiet_moves() {
    let pos = Position::from_fen("k7/8/8/3p4/4P3/8/8/K7 w - - 0 1").unwrap();
    let capture = score_move(pos.board(), find(&pos, "e4d5"));
    let push = score_move(pos.board(), find(&pos, "e4e5"));
    assert!(capture > push, "capture {capture} <= push {push}");
}

#[test]
fn queen_capture_outscores_pawn_capture() {
    // Rook on a5 can take a queen on a8 or a pawn on e5.
    let pos = Position::from_fen("q6k/8/8/R3p3/8/8/8/6K1 w - - 0 1").unwrap();
    let queen = score_move(pos.board(), find(&pos, "a5a8"));
    let pawn = score_move(pos.board(), find(&pos, "a5e5"));
    assert!(queen > pawn);
}

#[test]
fn promotion_and_last_rank_push_are_rewarded() {
    let pos = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
    let promote = score_move(pos.board(), find(&pos, "a7a8q"));
    let king = score_move(pos.board(), find(&pos, "a1b1"));
    assert!(promote > 2.0, "promotion underscored: {promote}");
    assert!(promote > king);
}

#[test]
fn central_squares_attract_minor_pieces() {
    let pos = Position::startpos();
    let central = score_move(pos.board(), find(&pos, "g1f3"));
    let rim = score_move(pos.board(), find(&pos, "g1h3"));
    assert!(central > rim);
}

#[test]
fn king_walks_are_dampened_outside_the_endgame() {
    // After 1. e4 e5 the white king may step to e2; the board is still full.
    let pos = Position::set_from_start_and_moves(&[
        "e2e4".to_string(),
        "e7e5".to_string(),
    ])
    .unwrap();
    let king = score_move(pos.board(), find(&pos, "e1e2"));
    let quiet = score_move(pos.board(), find(&pos, "a2a3"));
    assert!(king < quiet);
    assert!((king - KING_MOVE_FACTOR).abs() < 1e-12);
}

#[test]
fn king_moves_not_dampened_in_the_endgame() {
    let pos = Position::from_fen("k7/8/8/8/8/8/P7/K7 w - - 0 1").unwrap();
    let king = score_move(pos.board(), find(&pos, "a1b1"));
    assert_eq!(king.to_bits(), 1.0f64.to_bits());
}
