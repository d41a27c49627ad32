use montebot::board::cozy::Position;

#[test]
fn nested_make_unmake_is_lifo() {
    let mut pos = Position::startpos();
    let fen0 = format!("{}", pos.board());
    let m1 = pos.legal_moves()[0];
    pos.make(m1);
    let fen1 = format!("{}", pos.board());
    let m2 = pos.legal_moves()[0];
    pos.make(m2);
    assert_eq!(pos.ply(), 2);
    pos.unmake();
    assert_eq!(format!("{}", pos.board()), fen1);
    pos.unmake();
    assert_eq!(format!("{}", pos.board()), fen0);
    assert_eq!(pos.ply(), 0);
}

#[test]
fn uci_move_application_matches_known_line() {
    let moves: Vec<String> = ["e2e4", "c7c5", "g1f3"].iter().map(|s| s.to_string()).collect();
    let pos = Position::set_from_start_and_moves(&moves).unwrap();
    assert_eq!(
        format!("{}", pos.board()),
        "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
    );
}

#[test]
fn illegal_uci_move_is_rejected() {
    let mut pos = Position::startpos();
    assert!(pos.make_move_uci("e2e5").is_err());
    assert!(pos.make_move_uci("e2e4").is_ok());
}

#[test]
fn game_over_checks() {
    assert!(!Position::startpos().is_game_over());
    // Only kings but clock far from fifty moves: not adjudicated here.
    let pos = Position::from_fen("k7/8/8/8/8/8/8/K7 w - - 10 40").unwrap();
    assert!(!pos.is_game_over());
}
