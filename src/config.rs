use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::command::parse_draw;
use crate::game::Settings;
use crate::gesture::DragPolicy;
use crate::service::NewGame;

/// Which wire protocol the server speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum Protocol {
    /// Session-cookie JSON API under `/api/game`.
    Api,
    /// Older id-threaded endpoints (`/new_game`, `/move_card`, ...).
    Legacy,
}

#[derive(Debug, Parser)]
#[command(name = "klondike")]
#[command(about = "Play Klondike against a remote rules service", version)]
pub struct Args {
    /// Base URL of the game server
    #[arg(long, env = "KLONDIKE_SERVER", default_value = "http://127.0.0.1:8000")]
    pub server: String,

    /// Wire protocol the server speaks
    #[arg(long, env = "KLONDIKE_PROTOCOL", value_enum, default_value = "api")]
    pub protocol: Protocol,

    /// Game mode for new deals
    #[arg(long, default_value = "standard")]
    pub mode: String,

    /// Cards turned per draw (1 or 3)
    #[arg(short, long, default_value = "1", value_parser = parse_draw)]
    pub draw: u8,

    /// Deal seed (for reproducible games)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Name finished games are recorded under on the scoreboard
    #[arg(long, env = "KLONDIKE_PLAYER")]
    pub player: Option<String>,

    /// Which face-up tableau cards can start a drag
    #[arg(long, value_enum, default_value = "any-face-up")]
    pub drag_policy: DragPolicy,

    /// Move cap for server autoplay
    #[arg(long, default_value = "200")]
    pub autoplay_limit: u32,

    /// Ignore any remembered session and deal a new game
    #[arg(long)]
    pub fresh: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn settings(&self) -> Settings {
        Settings {
            new_game: NewGame {
                mode: self.mode.clone(),
                draw: self.draw,
                seed: self.seed,
                player_name: self.player.clone(),
            },
            autoplay_limit: self.autoplay_limit,
            drag_policy: self.drag_policy,
        }
    }
}
