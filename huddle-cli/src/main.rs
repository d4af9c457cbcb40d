use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::*;
use dialoguer::Input;
use huddle::client::{
    ConnectorConfig, ConnectorEvent, LocalMedia, MediaTrack, RtcLocalTrack, SignalingConnector,
};
use huddle::model::DEFAULT_RECONNECT_MS;
use huddle::{RoomIdentity, UserUpdate};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "huddle")]
#[command(about = "Join a huddle room from the terminal")]
struct Cli {
    /// Signaling server WebSocket url
    #[arg(long, default_value = "ws://localhost:8080")]
    url: String,

    #[arg(short, long)]
    room: String,

    /// Prompted for when omitted
    #[arg(short, long)]
    name: Option<String>,

    /// Reuse a uid from an earlier session
    #[arg(long)]
    uid: Option<String>,

    /// STUN/TURN url, repeatable. Defaults to a public STUN server.
    #[arg(long = "ice")]
    ice_servers: Vec<String>,

    #[arg(long, default_value_t = DEFAULT_RECONNECT_MS)]
    reconnect_ms: u64,

    #[arg(long)]
    muted: bool,
}

enum UserCommand {
    Mute(bool),
    Rename(String),
    Peers,
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("huddle=info")),
        )
        .init();

    let cli = Cli::parse();

    let name = match cli.name {
        Some(name) => name,
        None => Input::<String>::new()
            .with_prompt("Your name")
            .interact_text()
            .context("Failed to read user name")?,
    };
    if name.trim().is_empty() {
        bail!("User name must not be empty");
    }

    let mut config =
        ConnectorConfig::new(cli.url).with_reconnect_delay(Duration::from_millis(cli.reconnect_ms));
    if !cli.ice_servers.is_empty() {
        config = config.with_ice_servers(cli.ice_servers);
    }

    let mic = Arc::new(RtcLocalTrack::audio_opus("mic", "huddle-local"));
    mic.set_enabled(!cli.muted);
    let local_media = LocalMedia::new("huddle-local").with_track(mic.clone());

    let mut identity = RoomIdentity::new(name, cli.room);
    if let Some(uid) = cli.uid {
        identity = identity.with_uid(uid);
    }

    let (connector, mut events) = SignalingConnector::with_webrtc(config);
    connector.connect().context("Connector stopped before connecting")?;

    println!("{}", "📡 Connecting to signaling server...".cyan());
    println!(
        "{}",
        "   Commands: /mute, /unmute, /name <new name>, /peers, /quit".dimmed()
    );

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            evt = events.recv() => {
                let Some(evt) = evt else { break };
                match &evt {
                    // Rejoin on every (re)open, keeping the uid the server gave us.
                    ConnectorEvent::SignalingOpened => {
                        connector.join_room(identity.clone(), local_media.clone())?;
                    }
                    ConnectorEvent::UserJoined { user, .. } => {
                        identity.uid = Some(user.uid.clone());
                    }
                    _ => {}
                }
                print_event(&evt);
            }

            line = stdin.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else { break };
                match parse_input(&line) {
                    Some(UserCommand::Mute(mute)) => {
                        mic.set_enabled(!mute);
                        connector.send_user_update(UserUpdate::mute(mute))?;
                    }
                    Some(UserCommand::Rename(new_name)) => {
                        identity.user_name = new_name.clone();
                        connector.send_user_update(UserUpdate::rename(new_name))?;
                    }
                    Some(UserCommand::Peers) => print_peers(&connector).await?,
                    Some(UserCommand::Quit) => break,
                    None => {
                        if !line.trim().is_empty() {
                            println!("{}", format!("Unknown command: {}", line.trim()).yellow());
                        }
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => break,
        }
    }

    println!("{}", "👋 Leaving room".cyan());
    connector.close().await.context("Connector already stopped")?;
    Ok(())
}

fn parse_input(line: &str) -> Option<UserCommand> {
    let line = line.trim();
    match line {
        "/mute" => Some(UserCommand::Mute(true)),
        "/unmute" => Some(UserCommand::Mute(false)),
        "/peers" => Some(UserCommand::Peers),
        "/quit" => Some(UserCommand::Quit),
        _ => {
            let name = line.strip_prefix("/name ")?.trim();
            (!name.is_empty()).then(|| UserCommand::Rename(name.to_string()))
        }
    }
}

async fn print_peers(connector: &SignalingConnector) -> Result<()> {
    let snapshot = connector.snapshot().await?;
    if snapshot.peers.is_empty() {
        println!("{}", "   nobody else is here".dimmed());
    }
    for peer in snapshot.peers {
        println!(
            "   {} {} [{}]{}",
            peer.user.user_name.bold(),
            format!("({})", peer.user.uid).dimmed(),
            peer.connectivity,
            if peer.user.mute { " 🔇" } else { "" }
        );
    }
    Ok(())
}

fn print_event(evt: &ConnectorEvent) {
    match evt {
        ConnectorEvent::SignalingOpened => println!("{}", "✅ Signaling connected".green()),
        ConnectorEvent::SignalingClosed => {
            println!("{}", "⚠️  Signaling lost, reconnecting...".yellow())
        }
        ConnectorEvent::UserJoined { user, .. } => println!(
            "{} {} as {} {}",
            "🎧 Joined".green().bold(),
            user.room_name.as_deref().unwrap_or("room").bold(),
            user.user_name,
            format!("({})", user.uid).dimmed()
        ),
        ConnectorEvent::PeerJoined(user) => {
            println!("{} {}", "➕".green(), user.user_name.bold())
        }
        ConnectorEvent::PeerInfoUpdated(user) => println!(
            "{} {}{}",
            "✏️ ".cyan(),
            user.user_name.bold(),
            if user.mute { " muted" } else { " unmuted" }
        ),
        ConnectorEvent::PeerLeft(user) => println!("{} {}", "➖".red(), user.user_name),
        ConnectorEvent::PeerConnectionStateChanged { uid, state } => {
            println!("   {} {} → {}", "🔗".blue(), uid, state)
        }
        ConnectorEvent::PeerStreamReceived { uid, stream } => println!(
            "   {} {} stream {}",
            "🔊".blue(),
            uid,
            stream.stream_id()
        ),
    }
}
