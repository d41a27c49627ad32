pub mod eval;
pub mod mcts;
pub mod priority;
pub mod timeman;
