use crate::card::Suit;
use crate::view::{Key, ZoneId};

/// A card the player points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The top waste card.
    Waste,
    /// A tableau card; `index: None` means the pile's top card.
    Tableau { col: usize, index: Option<usize> },
}

/// All commands a player can issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Click the stock.
    Draw,
    /// Press a key while the stock has focus.
    Press(Key),
    /// Drag `from` and drop it on `to`.
    Drag { from: Source, to: ZoneId },
    /// Double-click a card.
    DoubleClick(Source),
    Undo,
    Redo,
    Hint,
    Autoplay { limit: Option<u32> },
    /// Toggle how many waste cards are shown.
    Peek,
    NewGame { draw: Option<u8> },
    Refresh,
    Save { name: String },
    Load { name: String },
    ListSaves,
    /// Set the name finished games are recorded under.
    Player { name: String },
    Scoreboard,
    Leaderboard,
    /// Abandon a drag in progress.
    Cancel,
    Quit,
    Help,
}

/// Parse a single line of text input into a `Command`.
///
/// Syntax reference (case-insensitive):
/// ```text
/// draw | d                    -- Click the stock
/// enter | space               -- Key press on the stock
/// mv <src> <dst>              -- Drag src, drop on dst
/// dbl <src>                   -- Double-click src
/// undo | u, redo | r          -- History
/// hint                        -- Ask for a hint
/// auto [limit]                -- Server autoplay
/// peek | p                    -- Toggle waste peek
/// new [1|3]                   -- New game
/// refresh                     -- Re-fetch state
/// save <name> | load <name>   -- Named saves
/// saves                       -- List saves
/// player <name>               -- Name on the scoreboard
/// scores | leaders            -- Scoreboard / leaderboard
/// cancel                      -- Drop a pending drag
/// quit | q                    -- Quit
/// help | h | ?                -- Help
///
/// src: w | t<col> | t<col>:<index>
/// dst: t<col> | f | f<h|d|c|s>
/// ```
pub fn parse_command(input: &str) -> Result<Command, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Empty input".to_string());
    }

    let tokens: Vec<&str> = input.split_whitespace().collect();
    let cmd = tokens[0].to_lowercase();

    match cmd.as_str() {
        "draw" | "d" | "stock" => Ok(Command::Draw),
        "enter" => Ok(Command::Press(Key::Enter)),
        "space" => Ok(Command::Press(Key::Space)),
        "mv" | "move" | "drag" => {
            if tokens.len() < 3 {
                return Err("Usage: mv <src> <dst>".to_string());
            }
            Ok(Command::Drag {
                from: parse_source(tokens[1])?,
                to: parse_target(tokens[2])?,
            })
        }
        "dbl" | "dc" => {
            if tokens.len() < 2 {
                return Err("Usage: dbl <src>".to_string());
            }
            Ok(Command::DoubleClick(parse_source(tokens[1])?))
        }
        "auto" | "autoplay" => {
            let limit = match tokens.get(1) {
                Some(t) => Some(t.parse().map_err(|_| format!("'{}' is not a valid limit", t))?),
                None => None,
            };
            Ok(Command::Autoplay { limit })
        }
        "new" | "n" => {
            let draw = match tokens.get(1) {
                Some(t) => Some(parse_draw(t)?),
                None => None,
            };
            Ok(Command::NewGame { draw })
        }
        "save" | "load" => {
            let Some(name) = tokens.get(1) else {
                return Err(format!("Usage: {} <name>", cmd));
            };
            let name = name.to_string();
            Ok(if cmd == "save" { Command::Save { name } } else { Command::Load { name } })
        }
        "saves" => Ok(Command::ListSaves),
        "player" => {
            if tokens.len() < 2 {
                return Err("Usage: player <name>".to_string());
            }
            Ok(Command::Player { name: tokens[1..].join(" ") })
        }
        "scores" | "scoreboard" => Ok(Command::Scoreboard),
        "leaders" | "leaderboard" => Ok(Command::Leaderboard),
        "undo" | "u" => Ok(Command::Undo),
        "redo" | "r" => Ok(Command::Redo),
        "hint" => Ok(Command::Hint),
        "peek" | "p" => Ok(Command::Peek),
        "refresh" => Ok(Command::Refresh),
        "cancel" => Ok(Command::Cancel),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        "help" | "h" | "?" => Ok(Command::Help),
        _ => Err(format!("Unknown command '{}'. Type 'help' for help.", tokens[0])),
    }
}

fn parse_source(s: &str) -> Result<Source, String> {
    let s = s.to_lowercase();
    if s == "w" || s == "waste" {
        return Ok(Source::Waste);
    }
    let Some(rest) = s.strip_prefix('t') else {
        return Err(format!("'{}' is not a card. Use w, t<col> or t<col>:<index>", s));
    };
    // "t3:2" means column 3, card 2 counted from the bottom of the pile.
    if let Some((col_part, index_part)) = rest.split_once(':') {
        let index = index_part
            .parse()
            .map_err(|_| format!("'{}' is not a valid card index", index_part))?;
        Ok(Source::Tableau { col: parse_col_idx(col_part)?, index: Some(index) })
    } else {
        Ok(Source::Tableau { col: parse_col_idx(rest)?, index: None })
    }
}

fn parse_target(s: &str) -> Result<ZoneId, String> {
    let s = s.to_lowercase();
    if let Some(rest) = s.strip_prefix('f') {
        if rest.is_empty() {
            return Ok(ZoneId::Foundation(Suit::Hearts));
        }
        return Suit::from_letter(rest)
            .map(ZoneId::Foundation)
            .ok_or_else(|| format!("'{}' is not a valid suit. Use h, d, c or s.", rest));
    }
    if let Some(rest) = s.strip_prefix('t') {
        return Ok(ZoneId::Tableau(parse_col_idx(rest)?));
    }
    Err(format!("'{}' is not a drop target. Use t<col> or f[h|d|c|s]", s))
}

fn parse_col_idx(s: &str) -> Result<usize, String> {
    s.parse()
        .map_err(|_| format!("'{}' is not a valid column index", s))
}

/// Cards turned per draw: the service deals draw-one or draw-three only.
pub fn parse_draw(s: &str) -> Result<u8, String> {
    match s.trim().parse::<u8>() {
        Ok(n @ (1 | 3)) => Ok(n),
        _ => Err(format!("'{}' is not a valid draw count (1 or 3)", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_drags() {
        assert_eq!(
            parse_command("mv t4:2 t6"),
            Ok(Command::Drag {
                from: Source::Tableau { col: 4, index: Some(2) },
                to: ZoneId::Tableau(6)
            })
        );
        assert_eq!(
            parse_command("MV w fs"),
            Ok(Command::Drag { from: Source::Waste, to: ZoneId::Foundation(Suit::Spades) })
        );
        assert_eq!(
            parse_command("mv t1 f"),
            Ok(Command::Drag {
                from: Source::Tableau { col: 1, index: None },
                to: ZoneId::Foundation(Suit::Hearts)
            })
        );
    }

    #[test]
    fn parses_simple_commands() {
        assert_eq!(parse_command("d"), Ok(Command::Draw));
        assert_eq!(parse_command("space"), Ok(Command::Press(Key::Space)));
        assert_eq!(parse_command("dbl t2"), Ok(Command::DoubleClick(Source::Tableau { col: 2, index: None })));
        assert_eq!(parse_command("auto 50"), Ok(Command::Autoplay { limit: Some(50) }));
        assert_eq!(parse_command("auto"), Ok(Command::Autoplay { limit: None }));
        assert_eq!(parse_command("new 3"), Ok(Command::NewGame { draw: Some(3) }));
        assert_eq!(parse_command("new 1"), Ok(Command::NewGame { draw: Some(1) }));
        assert_eq!(parse_command("save slot1"), Ok(Command::Save { name: "slot1".into() }));
        assert_eq!(parse_command("player Ada Lovelace"), Ok(Command::Player { name: "Ada Lovelace".into() }));
        assert_eq!(parse_command("scores"), Ok(Command::Scoreboard));
        assert_eq!(parse_command("LEADERS"), Ok(Command::Leaderboard));
        assert_eq!(parse_command("  q "), Ok(Command::Quit));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_command("").is_err());
        assert!(parse_command("mv w").is_err());
        assert!(parse_command("mv x t1").is_err());
        assert!(parse_command("mv w fz").is_err());
        assert!(parse_command("mv t1:a t2").is_err());
        assert!(parse_command("new 7").is_err());
        assert!(parse_command("new 2").is_err());
        assert!(parse_command("new 0").is_err());
        assert!(parse_command("player").is_err());
        assert!(parse_command("load").is_err());
        assert!(parse_command("fly").is_err());
    }
}
