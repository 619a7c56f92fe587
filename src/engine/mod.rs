//! Core engine: the executor, the turn state machine and the session loop.

pub mod accountant;
pub mod executor;
pub mod session;
pub mod turn;
