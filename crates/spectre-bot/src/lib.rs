//! Protocol front end for the SPECTRE arena bot.
//!
//! Owns the stdin/stdout game protocol and the replay mode; all decision
//! making lives in `spectre-ai`.

pub mod protocol;
