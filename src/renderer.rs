use std::io::{self, Write};

use crossterm::style::Stylize;
use tokio::time::Instant;

use crate::card::{Card, Suit};
use crate::overlay::{Flag, Overlay};
use crate::view::{CardNode, Face, Marker, View, ZoneId};

/// Everything a surface needs to paint one frame.
pub struct Frame<'a> {
    /// `None` until the first snapshot arrives.
    pub view: Option<&'a View>,
    pub overlay: &'a Overlay,
    pub notices: &'a [String],
    pub loading: bool,
    pub now: Instant,
}

/// Trait that abstracts the rendering surface.
///
/// The game loop only ever hands over a pure [`View`] plus transient
/// overlay state, so a surface never sees a face-down card's identity.
pub trait Renderer {
    /// Paint a full frame.
    fn render(&mut self, frame: &Frame<'_>);
    /// Display an informational message.
    fn info(&mut self, msg: &str);
    /// Display an error message.
    fn error(&mut self, msg: &str);
    /// Display the help text.
    fn help(&mut self);
    /// Display the win screen.
    fn win(&mut self);
}

// ---------------------------------------------------------------------------
// CLI Renderer
// ---------------------------------------------------------------------------

/// A line-oriented, coloured terminal renderer.
#[derive(Default)]
pub struct CliRenderer;

impl CliRenderer {
    pub fn new() -> Self {
        CliRenderer
    }

    fn card_str(card: Card) -> String {
        let label = format!("{:>3}", card.label());
        if card.suit.is_red() {
            label.red().to_string()
        } else {
            label.white().to_string()
        }
    }

    fn node_str(node: &CardNode) -> String {
        match node.face {
            Face::Up(card) => format!("[{}]", Self::card_str(card)),
            Face::Hidden => format!("[{}]", "###".dark_grey()),
        }
    }

    fn marker_str(marker: Marker) -> String {
        match marker {
            Marker::FaceDown => format!("[{}]", "###".dark_grey()),
            Marker::Empty => "[   ]".to_string(),
            Marker::EmptySuit(suit) => format!("[ {} ]", suit.symbol()),
        }
    }

    /// A zone label decorated with whatever transient flags it carries.
    fn label(text: &str, flags: &[Flag]) -> String {
        let mut out = text.to_string();
        for flag in flags {
            out = match flag {
                Flag::DropTarget => format!("{}", format!("»{out}").cyan()),
                Flag::Invalid => format!("{}", format!("{out}✗").red().bold()),
                Flag::Hint => format!("{}", format!("*{out}*").yellow().reverse()),
            };
        }
        out
    }

    fn zone_str(view: &View, zone: ZoneId) -> String {
        let Some(z) = view.zone(zone) else {
            return String::new();
        };
        if z.cards.is_empty() {
            return z.marker.map(Self::marker_str).unwrap_or_default();
        }
        z.cards.iter().map(Self::node_str).collect::<Vec<_>>().join("")
    }

    /// Build the frame as text. Separate from printing so it can be inspected.
    pub fn paint(&self, frame: &Frame<'_>) -> String {
        let mut out = String::new();
        out.push('\n');

        let Some(view) = frame.view else {
            out.push_str("  Connecting to the game server…\n");
            return out;
        };
        let flags = |zone| frame.overlay.flags(zone, frame.now);

        // ---- HUD ----
        let hud = view.hud;
        out.push_str(&format!(
            "  SCORE {:<6} MOVES {:<5} TIME {}:{:02}   DRAW {}",
            hud.score,
            hud.moves,
            hud.seconds / 60,
            hud.seconds % 60,
            hud.draw_count
        ));
        if frame.loading {
            out.push_str(&format!("   {}", "[loading…]".yellow()));
        }
        out.push('\n');
        for notice in frame.notices {
            out.push_str(&format!("  {} {}\n", "[NOTE]".yellow(), notice));
        }
        out.push('\n');

        // ---- Top row: stock | waste | foundations ----
        out.push_str(&format!(
            "  {}: {}   {}: {}   {}:",
            Self::label("STOCK", &flags(ZoneId::Stock)),
            Self::zone_str(view, ZoneId::Stock),
            Self::label("WASTE", &flags(ZoneId::Waste)),
            Self::zone_str(view, ZoneId::Waste),
            "FOUND",
        ));
        for suit in Suit::ALL {
            let zone = ZoneId::Foundation(suit);
            out.push_str(&format!(
                " {}{}",
                Self::label(suit.symbol(), &flags(zone)),
                Self::zone_str(view, zone)
            ));
        }
        out.push('\n');

        // ---- Column indices header ----
        out.push('\n');
        out.push_str("  COL:  ");
        let columns = view.tableau_columns();
        for col in 0..columns {
            let label = Self::label(&format!("{col:^5}"), &flags(ZoneId::Tableau(col)));
            out.push_str(&format!(" {label} "));
        }
        out.push('\n');

        // ---- Tableau ----
        let piles: Vec<_> = (0..columns)
            .filter_map(|col| view.zone(ZoneId::Tableau(col)))
            .collect();
        let max_len = piles.iter().map(|p| p.cards.len()).max().unwrap_or(0);
        for row in 0..max_len {
            out.push_str(&format!("  {row:>3}: "));
            for pile in &piles {
                match pile.cards.get(row) {
                    Some(node) => out.push_str(&format!(" {} ", Self::node_str(node))),
                    None => out.push_str("   ..  "),
                }
            }
            out.push('\n');
        }
        if max_len == 0 {
            out.push_str("  (all columns empty)\n");
        }

        if hud.won {
            out.push_str(&format!("\n  {}\n", "★ SOLVED ★".yellow().bold()));
        }
        out
    }
}

impl Renderer for CliRenderer {
    fn render(&mut self, frame: &Frame<'_>) {
        print!("{}", self.paint(frame));
        print!("\n> ");
        let _ = io::stdout().flush();
    }

    fn info(&mut self, msg: &str) {
        println!("{} {}", "[INFO]".cyan(), msg);
    }

    fn error(&mut self, msg: &str) {
        println!("{} {}", "[ERR ]".red(), msg);
    }

    fn help(&mut self) {
        println!(
            r#"
╔══════════════════════════════════════════════════════════════╗
║          Klondike – terminal client help                     ║
╠══════════════════════════════════════════════════════════════╣
║  The server owns the rules. Every gesture below is sent as   ║
║  a move request; illegal moves come back as a notice.        ║
╠══════════════════════════════════════════════════════════════╣
║  SOURCES:  w          top waste card                         ║
║            t<c>       top card of column c                   ║
║            t<c>:<i>   card i of column c (drags the run)     ║
║  TARGETS:  t<c>       column c                               ║
║            f | f<s>   foundation (s = h, d, c, s)            ║
╠══════════════════════════════════════════════════════════════╣
║  draw | d              Click the stock                       ║
║  enter | space         Press a key on the stock              ║
║  mv  <src> <dst>       Drag a card (or run) and drop it      ║
║  dbl <src>             Double-click: send top card home      ║
║  undo | u / redo | r   Step through history                  ║
║  hint                  Flash the zone of a suggested move    ║
║  auto [limit]          Let the server play safe moves        ║
║  peek | p              Toggle showing up to 3 waste cards    ║
║  new [1|3]             Deal a new game                       ║
║  refresh               Re-fetch the current state            ║
║  save | load <name>    Named saves (legacy servers)          ║
║  saves                 List saved games                      ║
║  player <name>         Name recorded on the scoreboard       ║
║  scores / leaders      Show scoreboard / leaderboard         ║
║  cancel                Drop a half-finished drag             ║
║  help | h | ?          Show this help                        ║
║  quit | q              Exit                                  ║
╠══════════════════════════════════════════════════════════════╣
║  Example: mv t4:2 t6  →  move column 4 from card 2 onto 6   ║
╚══════════════════════════════════════════════════════════════╝
"#
        );
    }

    fn win(&mut self) {
        println!(
            "\n{}\n  Congratulations! You solved it!  Type 'new' for another game.\n",
            "  ★ ★ ★  YOU WIN  ★ ★ ★".yellow().bold()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Rank;
    use crate::snapshot::{Snapshot, Stock};
    use crate::view::{ViewOptions, render};

    fn snapshot() -> Snapshot {
        Snapshot {
            score: 12,
            seconds: 75,
            stock: Stock::Count(3),
            waste: vec![Card::new(Suit::Hearts, Rank::new(10).unwrap(), true)],
            tableau: vec![vec![
                Card::new(Suit::Spades, Rank::new(12).unwrap(), false),
                Card::new(Suit::Clubs, Rank::new(4).unwrap(), true),
            ]],
            ..Snapshot::default()
        }
    }

    fn frame<'a>(view: &'a View, overlay: &'a Overlay, now: Instant) -> Frame<'a> {
        Frame { view: Some(view), overlay, notices: &[], loading: false, now }
    }

    #[test]
    fn paint_never_shows_face_down_identity() {
        let view = render(&snapshot(), &ViewOptions::default());
        let overlay = Overlay::new();
        let text = CliRenderer::new().paint(&frame(&view, &overlay, Instant::now()));
        assert!(!text.contains("Q♠"));
        assert!(text.contains("4♣"));
        assert!(text.contains("10♥"));
        assert!(text.contains("TIME 1:15"));
    }

    #[test]
    fn paint_is_stable_for_the_same_view() {
        let view = render(&snapshot(), &ViewOptions::default());
        let overlay = Overlay::new();
        let now = Instant::now();
        let renderer = CliRenderer::new();
        assert_eq!(
            renderer.paint(&frame(&view, &overlay, now)),
            renderer.paint(&frame(&view, &overlay, now))
        );
    }

    #[test]
    fn paint_before_first_snapshot() {
        let overlay = Overlay::new();
        let frame = Frame { view: None, overlay: &overlay, notices: &[], loading: true, now: Instant::now() };
        assert!(CliRenderer::new().paint(&frame).contains("Connecting"));
    }

    #[test]
    fn notices_and_loading_are_shown() {
        let view = render(&snapshot(), &ViewOptions::default());
        let overlay = Overlay::new();
        let notices = vec!["Movimiento ilegal".to_string()];
        let frame = Frame {
            view: Some(&view),
            overlay: &overlay,
            notices: &notices,
            loading: true,
            now: Instant::now(),
        };
        let text = CliRenderer::new().paint(&frame);
        assert!(text.contains("Movimiento ilegal"));
        assert!(text.contains("loading"));
    }
}
