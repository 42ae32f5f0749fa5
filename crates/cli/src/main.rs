//! CLI for operating a live crease player auction.
//!
//! This binary provides commands for:
//! - Admin round control (start, assign turn, close, timer, queue)
//! - Team actions (bid, pass)
//! - Roster management (teams, players, owners)
//! - Querying live round state and records

use anyhow::Result;
use clap::{Parser, Subcommand};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::http_client::HttpClientBuilder;
use jsonrpsee::rpc_params;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "auction-cli")]
#[command(about = "CLI for the crease player auction")]
struct Cli {
    /// Auction server RPC endpoint
    #[arg(long, default_value = "http://127.0.0.1:9850")]
    rpc: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a round for the next queued player
    StartRound,

    /// Assign the first bidder
    AssignTurn {
        /// Team id; omit to pick uniformly at random
        #[arg(long)]
        team: Option<String>,
    },

    /// Place a bid for a team
    Bid {
        /// Team id
        #[arg(long)]
        team: String,

        /// Raise over the current floor; 0 opens at the base price
        #[arg(long, default_value = "0")]
        increment: u64,
    },

    /// Pass the current turn for a team
    Pass {
        /// Team id
        #[arg(long)]
        team: String,
    },

    /// Force the round closed (settles with the highest bidder)
    CloseBidding,

    /// Retry a settlement whose store write failed
    RetrySettlement,

    /// Reconfigure the per-turn countdown
    ConfigureTimer {
        /// Countdown seconds per turn
        #[arg(long)]
        duration: u32,

        /// Disable the countdown
        #[arg(long)]
        disabled: bool,
    },

    /// Admit players to the auction queue
    Enqueue {
        /// Player ids
        #[arg(long, value_delimiter = ',')]
        players: Vec<String>,
    },

    /// Re-auction players from the final-unsold pool
    RequeueUnsold {
        /// Player ids
        #[arg(long, value_delimiter = ',')]
        players: Vec<String>,
    },

    /// Show the live round state
    Status,

    /// List all teams
    Teams,

    /// List the player catalog
    Players,

    /// Show bid history for a player
    Bids {
        /// Player id
        #[arg(long)]
        player: String,
    },

    /// List owners
    Owners,

    /// Add a team
    AddTeam {
        #[arg(long)]
        name: String,

        /// Starting budget in coins
        #[arg(long)]
        coins: u64,
    },

    /// Add a player to the catalog
    AddPlayer {
        #[arg(long)]
        name: String,

        #[arg(long)]
        nationality: String,

        /// batsman, bowler, all-rounder, or wicketkeeper
        #[arg(long)]
        position: String,

        #[arg(long)]
        base_price: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = HttpClientBuilder::default().build(&cli.rpc)?;

    match cli.command {
        Commands::StartRound => {
            let snapshot: Value = client.request("admin_startRound", rpc_params![]).await?;
            println!("Round opened:");
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }

        Commands::AssignTurn { team } => {
            let assigned: String = client
                .request("admin_assignTurn", rpc_params![json!({ "team": team })])
                .await?;
            println!("Turn assigned to {assigned}");
        }

        Commands::Bid { team, increment } => {
            let outcome: Value = client
                .request(
                    "auction_placeBid",
                    rpc_params![json!({ "team": team, "increment": increment })],
                )
                .await?;
            let success = outcome["success"].as_bool().unwrap_or(false);
            let message = outcome["message"].as_str().unwrap_or("");
            if success {
                println!("OK: {message}");
            } else {
                println!("Rejected: {message}");
            }
        }

        Commands::Pass { team } => {
            let _: bool = client.request("auction_pass", rpc_params![team]).await?;
            println!("Pass submitted");
        }

        Commands::CloseBidding => {
            let snapshot: Value = client.request("admin_closeBidding", rpc_params![]).await?;
            match snapshot["winning_team"].as_str() {
                Some(team) => println!("Bidding closed. Sold to {team}"),
                None => println!("Bidding closed. Player unsold"),
            }
        }

        Commands::RetrySettlement => {
            let snapshot: Value = client
                .request("admin_retrySettlement", rpc_params![])
                .await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }

        Commands::ConfigureTimer { duration, disabled } => {
            let _: bool = client
                .request(
                    "admin_configureTimer",
                    rpc_params![json!({ "duration_secs": duration, "enabled": !disabled })],
                )
                .await?;
            println!("Timer configured: {duration}s, enabled: {}", !disabled);
        }

        Commands::Enqueue { players } => {
            let admitted: usize = client
                .request("admin_enqueue", rpc_params![json!({ "player_ids": players })])
                .await?;
            println!("{admitted} player(s) admitted to the queue");
        }

        Commands::RequeueUnsold { players } => {
            let moved: usize = client
                .request(
                    "admin_requeueUnsold",
                    rpc_params![json!({ "player_ids": players })],
                )
                .await?;
            println!("{moved} player(s) requeued for re-auction");
        }

        Commands::Status => {
            let snapshot: Value = client.request("query_roundState", rpc_params![]).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }

        Commands::Teams => {
            let teams: Vec<Value> = client.request("query_teams", rpc_params![]).await?;
            for team in &teams {
                println!(
                    "{}  {}  coins={}  roster={}",
                    team["id"].as_str().unwrap_or("?"),
                    team["name"].as_str().unwrap_or("?"),
                    team["coins"],
                    team["players"].as_array().map(Vec::len).unwrap_or(0),
                );
            }
            println!("{} team(s)", teams.len());
        }

        Commands::Players => {
            let players: Vec<Value> = client.request("query_players", rpc_params![]).await?;
            for player in &players {
                println!(
                    "{}  {}  {:?}  base={}",
                    player["id"].as_str().unwrap_or("?"),
                    player["name"].as_str().unwrap_or("?"),
                    player["position"],
                    player["base_price"],
                );
            }
            println!("{} player(s)", players.len());
        }

        Commands::Bids { player } => {
            let bids: Vec<Value> = client
                .request("query_playerBids", rpc_params![player])
                .await?;
            for bid in &bids {
                println!(
                    "{}  team={}  amount={}  at={}",
                    bid["id"].as_str().unwrap_or("?"),
                    bid["team_id"].as_str().unwrap_or("?"),
                    bid["amount"],
                    bid["timestamp"],
                );
            }
            println!("{} bid(s)", bids.len());
        }

        Commands::Owners => {
            let owners: Vec<Value> = client.request("query_owners", rpc_params![]).await?;
            println!("{}", serde_json::to_string_pretty(&owners)?);
        }

        Commands::AddTeam { name, coins } => {
            let id: String = client
                .request(
                    "roster_addTeam",
                    rpc_params![json!({ "name": name, "coins": coins })],
                )
                .await?;
            println!("Team added: {id}");
        }

        Commands::AddPlayer {
            name,
            nationality,
            position,
            base_price,
        } => {
            let id: String = client
                .request(
                    "roster_addPlayer",
                    rpc_params![json!({
                        "name": name,
                        "nationality": nationality,
                        "position": position,
                        "base_price": base_price,
                    })],
                )
                .await?;
            println!("Player added: {id}");
        }
    }

    Ok(())
}
