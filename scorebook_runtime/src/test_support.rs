//! Shared setup for the runtime's unit tests.

use scorebook_engine::domain::{Player, Position};
use scorebook_engine::factory::{new_game, GameSetup, TeamSetup};
use scorebook_engine::Game;

pub fn lineup(prefix: &str, name: &str) -> TeamSetup {
    let mut players: Vec<Player> = (1..=9)
        .map(|i| Player {
            id: format!("{}{}", prefix, i),
            name: format!("{} #{}", name, i),
            number: i,
            position: Position::Dh,
        })
        .collect();
    for (suffix, number) in [("p", 18), ("r", 21)] {
        players.push(Player {
            id: format!("{}-{}", prefix, suffix),
            name: format!("{} {}", name, suffix),
            number,
            position: Position::Pitcher,
        });
    }
    TeamSetup {
        name: name.to_string(),
        batting_order: (1..=9).map(|i| format!("{}{}", prefix, i)).collect(),
        starting_pitcher: format!("{}-p", prefix),
        players,
    }
}

pub fn setup(innings: u32) -> GameSetup {
    let mut setup = GameSetup::new(lineup("h", "Hawks"), lineup("a", "Owls"));
    setup.innings = innings;
    setup.date = Some("2026-04-12".into());
    setup
}

/// A valid, empty nine-inning game with a fixed id.
pub fn sample_game(id: &str) -> Game {
    let mut game = new_game(setup(9)).expect("valid setup");
    game.id = id.to_string();
    game
}
