//! The turn-based text protocol.
//!
//! Header: busters-per-player, ghost count, team id. Per turn: an entity
//! count followed by `id x y type state value` records — type is `-1` for
//! a ghost, otherwise the owning team; buster state is 0 idle, 1 carrying
//! (value = ghost id), 2 stunned (value = remaining turns), 3 busting;
//! ghost state is its stamina and value the number of busters working it.
//! Output: one action line per buster, optionally with a trailing note.
//!
//! The protocol never transmits our own stun cooldowns; [`StunTracker`]
//! reconstructs them from the turns we emitted a stun on.

use std::collections::{HashMap, VecDeque};
use std::io::BufRead;

use thiserror::Error;

use spectre_core::action::Action;
use spectre_core::entities::{Buster, BusterId, Ghost, TurnObservation};
use spectre_core::geometry::Point;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("malformed token `{0}`")]
    Malformed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Whitespace-delimited token reader; accepts both live stdin and
/// captured replay dumps.
pub struct Tokenizer<R> {
    reader: R,
    tokens: VecDeque<String>,
}

impl<R: BufRead> Tokenizer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            tokens: VecDeque::new(),
        }
    }

    pub fn next_i64(&mut self) -> Result<i64, ProtocolError> {
        while self.tokens.is_empty() {
            self.refill()?;
        }
        let token = self.tokens.pop_front().expect("refill produced a token");
        token.parse().map_err(|_| ProtocolError::Malformed(token))
    }

    pub fn next_i32(&mut self) -> Result<i32, ProtocolError> {
        let v = self.next_i64()?;
        i32::try_from(v).map_err(|_| ProtocolError::Malformed(v.to_string()))
    }

    pub fn next_u32(&mut self) -> Result<u32, ProtocolError> {
        let v = self.next_i64()?;
        u32::try_from(v).map_err(|_| ProtocolError::Malformed(v.to_string()))
    }

    fn refill(&mut self) -> Result<(), ProtocolError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(ProtocolError::UnexpectedEof);
        }
        self.tokens
            .extend(line.split_whitespace().map(str::to_owned));
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GameHeader {
    pub busters_per_player: u32,
    pub ghost_count: u32,
    pub my_team_id: u32,
}

pub fn read_header<R: BufRead>(tokens: &mut Tokenizer<R>) -> Result<GameHeader, ProtocolError> {
    Ok(GameHeader {
        busters_per_player: tokens.next_u32()?,
        ghost_count: tokens.next_u32()?,
        my_team_id: tokens.next_u32()?,
    })
}

/// Reconstructs our busters' stun cooldowns from emitted actions.
pub struct StunTracker {
    cooldown: u32,
    last_used: HashMap<BusterId, u32>,
}

impl StunTracker {
    pub fn new(cooldown: u32) -> Self {
        Self {
            cooldown,
            last_used: HashMap::new(),
        }
    }

    pub fn record(&mut self, buster: BusterId, turn: u32) {
        self.last_used.insert(buster, turn);
    }

    pub fn remaining(&self, buster: BusterId, turn: u32) -> u32 {
        match self.last_used.get(&buster) {
            Some(used) => (used + self.cooldown).saturating_sub(turn),
            None => 0,
        }
    }
}

pub fn read_turn<R: BufRead>(
    tokens: &mut Tokenizer<R>,
    header: &GameHeader,
    stuns: &StunTracker,
    turn: u32,
) -> Result<TurnObservation, ProtocolError> {
    let entity_count = tokens.next_u32()?;
    let mut observation = TurnObservation {
        turn,
        ..Default::default()
    };

    for _ in 0..entity_count {
        let id = tokens.next_u32()?;
        let x = tokens.next_i32()?;
        let y = tokens.next_i32()?;
        let entity_type = tokens.next_i64()?;
        let state = tokens.next_u32()?;
        let value = tokens.next_i64()?;

        if entity_type == -1 {
            observation.ghosts.push(Ghost {
                id,
                pos: Point::new(x, y),
                stamina: state,
                bust_cnt: value.max(0) as u32,
            });
            continue;
        }

        let mut buster = Buster {
            id,
            pos: Point::new(x, y),
            carrying: None,
            stun_duration: 0,
            stun_cooldown: 0,
            last_seen: turn,
        };
        match state {
            1 => buster.carrying = Some(value.max(0) as u32),
            2 => buster.stun_duration = value.max(0) as u32,
            _ => {}
        }
        if entity_type as u32 == header.my_team_id {
            buster.stun_cooldown = stuns.remaining(id, turn);
            observation.allies.push(buster);
        } else {
            observation.enemies.push(buster);
        }
    }
    Ok(observation)
}

pub fn encode_action(action: &Action, note: &str) -> String {
    let body = match action {
        Action::Move { to } => format!("MOVE {} {}", to.x, to.y),
        Action::Bust { ghost } => format!("BUST {ghost}"),
        Action::Stun { enemy } => format!("STUN {enemy}"),
        Action::Release => "RELEASE".to_owned(),
    };
    if note.is_empty() {
        body
    } else {
        format!("{body} {note}")
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn tokenizer(input: &str) -> Tokenizer<Cursor<&str>> {
        Tokenizer::new(Cursor::new(input))
    }

    #[test]
    fn test_reads_header_and_turn() {
        let input = "2 4 0\n3\n0 2000 1000 0 0 -1\n4 5000 4000 1 2 7\n9 6000 3000 -1 15 1\n";
        let mut tokens = tokenizer(input);
        let header = read_header(&mut tokens).unwrap();
        assert_eq!(header.busters_per_player, 2);
        assert_eq!(header.ghost_count, 4);
        assert_eq!(header.my_team_id, 0);

        let stuns = StunTracker::new(20);
        let observation = read_turn(&mut tokens, &header, &stuns, 0).unwrap();
        assert_eq!(observation.allies.len(), 1);
        assert_eq!(observation.allies[0].pos, Point::new(2000, 1000));
        assert_eq!(observation.enemies.len(), 1);
        assert_eq!(observation.enemies[0].carrying, Some(7));
        assert_eq!(observation.ghosts.len(), 1);
        assert_eq!(observation.ghosts[0].stamina, 15);
        assert_eq!(observation.ghosts[0].bust_cnt, 1);
    }

    #[test]
    fn test_stunned_record_parses_duration() {
        let input = "1\n3 100 200 1 2 8\n";
        let mut tokens = tokenizer(input);
        let header = GameHeader {
            busters_per_player: 1,
            ghost_count: 1,
            my_team_id: 1,
        };
        let observation = read_turn(&mut tokens, &header, &StunTracker::new(20), 5).unwrap();
        assert_eq!(observation.allies[0].stun_duration, 8);
    }

    #[test]
    fn test_cooldown_reconstruction() {
        let mut stuns = StunTracker::new(20);
        assert_eq!(stuns.remaining(0, 4), 0);
        stuns.record(0, 4);
        assert_eq!(stuns.remaining(0, 5), 19);
        assert_eq!(stuns.remaining(0, 24), 0);
        assert_eq!(stuns.remaining(1, 5), 0);
    }

    #[test]
    fn test_eof_is_distinguished() {
        let mut tokens = tokenizer("1 2\n");
        assert_eq!(tokens.next_i64().unwrap(), 1);
        assert_eq!(tokens.next_i64().unwrap(), 2);
        assert!(matches!(
            tokens.next_i64(),
            Err(ProtocolError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_malformed_token_is_reported() {
        let mut tokens = tokenizer("banana\n");
        assert!(matches!(
            tokens.next_i64(),
            Err(ProtocolError::Malformed(t)) if t == "banana"
        ));
    }

    #[test]
    fn test_action_encoding() {
        assert_eq!(
            encode_action(&Action::move_to(Point::new(8000, 4500)), ""),
            "MOVE 8000 4500"
        );
        assert_eq!(encode_action(&Action::Bust { ghost: 3 }, ""), "BUST 3");
        assert_eq!(encode_action(&Action::Stun { enemy: 7 }, ""), "STUN 7");
        assert_eq!(encode_action(&Action::Release, "home"), "RELEASE home");
    }
}
