//! Display name assignment
//!
//! The pool holds exactly as many names as a game has participants, so every
//! game uses each name once. Names are assigned positionally to
//! (first human, second human, bot).

use rand::seq::SliceRandom;

/// Shuffle the name pool and return it
pub fn assign_names(pool: &[&'static str; 3]) -> [String; 3] {
    let mut names = *pool;
    names.shuffle(&mut rand::rng());
    names.map(String::from)
}

/// Shuffle the seating order so the bot's position reveals nothing
pub fn shuffle_seating<T>(players: &mut [T]) {
    players.shuffle(&mut rand::rng());
}
