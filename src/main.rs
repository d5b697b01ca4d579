use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use tracing::{error, info};

use klondike_client::config::{Args, Protocol};
use klondike_client::dispatcher::ActionDispatcher;
use klondike_client::error::ClientError;
use klondike_client::game::{Game, Settings, spawn_input};
use klondike_client::profile::Profile;
use klondike_client::renderer::CliRenderer;
use klondike_client::service::GameService;
use klondike_client::service::api::ApiClient;
use klondike_client::service::legacy::LegacyClient;
use klondike_client::store::snapshot_store;
use klondike_client::telemetry::init_tracing;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    println!(
        r#"
┌─────────────────────────────────────────┐
│   Klondike Solitaire (CLI Edition)      │
│   Type 'help' or '?' for commands.      │
└─────────────────────────────────────────┘
"#
    );

    let mut profile = Profile::load();
    let session = if args.fresh { None } else { profile.token_for(&args.server, args.protocol) };
    info!(server = %args.server, protocol = ?args.protocol, resuming = session.is_some(), "starting");

    let token = match connect(&args, session).await {
        Ok(token) => token,
        Err(err) => {
            error!(error = %err, "could not start");
            eprintln!("klondike: {err}");
            return ExitCode::FAILURE;
        }
    };

    profile.remember(&args.server, args.protocol, token);
    profile.save();
    ExitCode::SUCCESS
}

/// Play a session and return the token to resume it with next time.
async fn connect(args: &Args, session: Option<&str>) -> Result<Option<String>, ClientError> {
    let settings = args.settings();
    let token = match args.protocol {
        Protocol::Api => play(ApiClient::new(&args.server, session)?, settings).await,
        Protocol::Legacy => play(LegacyClient::new(&args.server, session)?, settings).await,
    };
    Ok(token)
}

async fn play<S: GameService + 'static>(service: S, settings: Settings) -> Option<String> {
    let (_store, writer) = snapshot_store();
    let dispatcher = Rc::new(ActionDispatcher::new(service, writer));
    let mut game = Game::new(Rc::clone(&dispatcher), CliRenderer::new(), settings);
    game.run(spawn_input()).await;
    dispatcher.service().session_token()
}
