//! Auction server for the crease player auction.
//!
//! Hosts the auction engine behind a JSON-RPC surface: admin round
//! control, team bid/pass actions, roster CRUD, and live-round queries.
//! A background task drives the engine's one-second tick; settled rounds
//! are held on display for a configurable delay before the queue advances.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use jsonrpsee::core::async_trait;
use jsonrpsee::proc_macros::rpc;
use jsonrpsee::server::Server;
use jsonrpsee::types::ErrorObjectOwned;
use parking_lot::RwLock;
use tracing::{error, info, warn};

use crease_engine::{AuctionEngine, BidOutcome, EngineConfig, EnginePhase, RoundSnapshot, TurnChoice};
use crease_store::{MemoryRosterStore, RosterStore};
use crease_types::{Bid, Owner, Player, PlayerId, Team, TeamId};

mod types;
use types::*;

#[derive(Parser)]
#[command(name = "auction-server")]
#[command(about = "Live cricket player auction server")]
struct Cli {
    /// Listen address for the JSON-RPC server
    #[arg(long, default_value = "127.0.0.1:9850")]
    listen: SocketAddr,

    /// Per-turn countdown duration in seconds
    #[arg(long, default_value = "60")]
    timer_duration: u32,

    /// Start with the countdown disabled
    #[arg(long)]
    timer_disabled: bool,

    /// Seconds a settled outcome stays on display before the next player
    #[arg(long, default_value = "3")]
    settlement_hold: u64,
}

/// RPC API for the auction.
#[rpc(server)]
pub trait AuctionApi {
    // ============ Admin Methods ============

    /// Open a round for the player at the head of the queue.
    #[method(name = "admin_startRound")]
    async fn admin_start_round(&self) -> Result<RoundSnapshot, ErrorObjectOwned>;

    /// Assign the first bidder (explicit team, or random when omitted).
    #[method(name = "admin_assignTurn")]
    async fn admin_assign_turn(&self, params: AssignTurnParams) -> Result<TeamId, ErrorObjectOwned>;

    /// Force the round closed, settling with the current highest bidder.
    #[method(name = "admin_closeBidding")]
    async fn admin_close_bidding(&self) -> Result<RoundSnapshot, ErrorObjectOwned>;

    /// Retry a settlement whose store write failed.
    #[method(name = "admin_retrySettlement")]
    async fn admin_retry_settlement(&self) -> Result<RoundSnapshot, ErrorObjectOwned>;

    /// Reconfigure the per-turn countdown.
    #[method(name = "admin_configureTimer")]
    async fn admin_configure_timer(
        &self,
        params: ConfigureTimerParams,
    ) -> Result<bool, ErrorObjectOwned>;

    /// Admit players to the auction queue.
    #[method(name = "admin_enqueue")]
    async fn admin_enqueue(&self, params: PlayerIdsParams) -> Result<usize, ErrorObjectOwned>;

    /// Move players from the final-unsold pool back onto the queue.
    #[method(name = "admin_requeueUnsold")]
    async fn admin_requeue_unsold(
        &self,
        params: PlayerIdsParams,
    ) -> Result<usize, ErrorObjectOwned>;

    // ============ Team Actions ============

    /// Place a bid. Ordinary rejections come back in the outcome, not as
    /// RPC errors.
    #[method(name = "auction_placeBid")]
    async fn auction_place_bid(&self, params: PlaceBidParams)
        -> Result<BidOutcome, ErrorObjectOwned>;

    /// Pass the current turn. Silent no-op for a team not holding it.
    #[method(name = "auction_pass")]
    async fn auction_pass(&self, team: TeamId) -> Result<bool, ErrorObjectOwned>;

    // ============ Roster CRUD ============

    #[method(name = "roster_addTeam")]
    async fn roster_add_team(&self, params: AddTeamParams) -> Result<TeamId, ErrorObjectOwned>;

    #[method(name = "roster_updateTeam")]
    async fn roster_update_team(&self, params: UpdateTeamParams) -> Result<bool, ErrorObjectOwned>;

    #[method(name = "roster_deleteTeam")]
    async fn roster_delete_team(&self, id: TeamId) -> Result<bool, ErrorObjectOwned>;

    #[method(name = "roster_addPlayer")]
    async fn roster_add_player(&self, params: AddPlayerParams)
        -> Result<PlayerId, ErrorObjectOwned>;

    #[method(name = "roster_deletePlayer")]
    async fn roster_delete_player(&self, id: PlayerId) -> Result<bool, ErrorObjectOwned>;

    #[method(name = "roster_addOwner")]
    async fn roster_add_owner(&self, params: AddOwnerParams) -> Result<String, ErrorObjectOwned>;

    #[method(name = "roster_deleteOwner")]
    async fn roster_delete_owner(&self, id: String) -> Result<bool, ErrorObjectOwned>;

    // ============ Query Methods ============

    /// Live round state: player, bid, turn holder, timer, outcome.
    #[method(name = "query_roundState")]
    async fn query_round_state(&self) -> Result<RoundSnapshot, ErrorObjectOwned>;

    #[method(name = "query_teams")]
    async fn query_teams(&self) -> Result<Vec<Team>, ErrorObjectOwned>;

    #[method(name = "query_players")]
    async fn query_players(&self) -> Result<Vec<Player>, ErrorObjectOwned>;

    /// Bid history recorded for one player, in append order.
    #[method(name = "query_playerBids")]
    async fn query_player_bids(&self, player: PlayerId) -> Result<Vec<Bid>, ErrorObjectOwned>;

    #[method(name = "query_owners")]
    async fn query_owners(&self) -> Result<Vec<Owner>, ErrorObjectOwned>;
}

/// Shared server state.
struct AuctionServer {
    engine: Arc<RwLock<AuctionEngine>>,
    store: Arc<MemoryRosterStore>,
    settlement_hold: Duration,
    /// Guards against scheduling the post-settlement advance twice for
    /// one round.
    finish_pending: Arc<AtomicBool>,
}

impl AuctionServer {
    fn new(store: Arc<MemoryRosterStore>, config: EngineConfig) -> Self {
        let settlement_hold = Duration::from_secs(config.settlement_hold_secs);
        let engine = AuctionEngine::new(store.clone() as Arc<dyn RosterStore>, config);
        Self {
            engine: Arc::new(RwLock::new(engine)),
            store,
            settlement_hold,
            finish_pending: Arc::new(AtomicBool::new(false)),
        }
    }

    fn rpc_error(msg: &str) -> ErrorObjectOwned {
        ErrorObjectOwned::owned(-32000, msg.to_string(), None::<()>)
    }

    /// After any call that can settle the round: once the round is
    /// settled, schedule exactly one delayed queue advance.
    fn maybe_schedule_finish(&self) {
        {
            let engine = self.engine.read();
            if engine.phase() != EnginePhase::Settling || !engine.is_settled() {
                return;
            }
        }
        if self.finish_pending.swap(true, Ordering::SeqCst) {
            return;
        }

        let engine = self.engine.clone();
        let finish_pending = self.finish_pending.clone();
        let hold = self.settlement_hold;
        tokio::spawn(async move {
            tokio::time::sleep(hold).await;
            let result = engine.write().finish_round();
            finish_pending.store(false, Ordering::SeqCst);
            match result {
                Ok(()) => info!("round finished; queue advanced"),
                // The round can only leave Settling through this task, so
                // a phase error here means an admin reset raced us.
                Err(err) => warn!(error = %err, "delayed round finish skipped"),
            }
        });
    }
}

#[async_trait]
impl AuctionApiServer for AuctionServer {
    async fn admin_start_round(&self) -> Result<RoundSnapshot, ErrorObjectOwned> {
        let mut engine = self.engine.write();
        engine
            .start_round()
            .map_err(|e| Self::rpc_error(&format!("Failed to start round: {e}")))?;
        Ok(engine.snapshot())
    }

    async fn admin_assign_turn(&self, params: AssignTurnParams) -> Result<TeamId, ErrorObjectOwned> {
        let choice = match params.team {
            Some(team) => TurnChoice::Team(team),
            None => TurnChoice::Random,
        };
        let mut engine = self.engine.write();
        engine
            .assign_turn(choice)
            .map_err(|e| Self::rpc_error(&format!("Failed to assign turn: {e}")))
    }

    async fn admin_close_bidding(&self) -> Result<RoundSnapshot, ErrorObjectOwned> {
        let snapshot = {
            let mut engine = self.engine.write();
            engine
                .close_bidding()
                .map_err(|e| Self::rpc_error(&format!("Failed to close bidding: {e}")))?;
            engine.snapshot()
        };
        self.maybe_schedule_finish();
        Ok(snapshot)
    }

    async fn admin_retry_settlement(&self) -> Result<RoundSnapshot, ErrorObjectOwned> {
        let snapshot = {
            let mut engine = self.engine.write();
            engine
                .retry_settlement()
                .map_err(|e| Self::rpc_error(&format!("Settlement retry failed: {e}")))?;
            engine.snapshot()
        };
        self.maybe_schedule_finish();
        Ok(snapshot)
    }

    async fn admin_configure_timer(
        &self,
        params: ConfigureTimerParams,
    ) -> Result<bool, ErrorObjectOwned> {
        self.engine
            .write()
            .configure_timer(params.duration_secs, params.enabled)
            .map_err(|e| Self::rpc_error(&format!("Failed to configure timer: {e}")))?;
        info!(
            duration = params.duration_secs,
            enabled = params.enabled,
            "timer reconfigured"
        );
        Ok(true)
    }

    async fn admin_enqueue(&self, params: PlayerIdsParams) -> Result<usize, ErrorObjectOwned> {
        self.engine
            .write()
            .enqueue_players(&params.player_ids)
            .map_err(|e| Self::rpc_error(&format!("Failed to enqueue players: {e}")))
    }

    async fn admin_requeue_unsold(
        &self,
        params: PlayerIdsParams,
    ) -> Result<usize, ErrorObjectOwned> {
        self.engine
            .write()
            .requeue_from_unsold(&params.player_ids)
            .map_err(|e| Self::rpc_error(&format!("Failed to requeue players: {e}")))
    }

    async fn auction_place_bid(
        &self,
        params: PlaceBidParams,
    ) -> Result<BidOutcome, ErrorObjectOwned> {
        let outcome = {
            let mut engine = self.engine.write();
            engine
                .place_bid(&params.team, params.increment)
                .map_err(|e| Self::rpc_error(&format!("Bid failed: {e}")))?
        };
        self.maybe_schedule_finish();
        Ok(outcome)
    }

    async fn auction_pass(&self, team: TeamId) -> Result<bool, ErrorObjectOwned> {
        {
            let mut engine = self.engine.write();
            engine
                .pass(&team)
                .map_err(|e| Self::rpc_error(&format!("Pass failed: {e}")))?;
        }
        self.maybe_schedule_finish();
        Ok(true)
    }

    async fn roster_add_team(&self, params: AddTeamParams) -> Result<TeamId, ErrorObjectOwned> {
        let id = params.id.unwrap_or_else(|| slugify(&params.name));
        self.store
            .put_team(Team::new(id.clone(), params.name, params.coins))
            .map_err(|e| Self::rpc_error(&format!("Failed to add team: {e}")))?;
        info!(team = %id, "team added");
        Ok(id)
    }

    async fn roster_update_team(&self, params: UpdateTeamParams) -> Result<bool, ErrorObjectOwned> {
        self.store
            .transact_team(&params.id, &mut |team| {
                if let Some(name) = &params.name {
                    team.name = name.clone();
                }
                if let Some(coins) = params.coins {
                    team.coins = coins;
                }
                Ok(())
            })
            .map_err(|e| Self::rpc_error(&format!("Failed to update team: {e}")))?;
        Ok(true)
    }

    async fn roster_delete_team(&self, id: TeamId) -> Result<bool, ErrorObjectOwned> {
        self.store
            .delete_team(&id)
            .map_err(|e| Self::rpc_error(&format!("Failed to delete team: {e}")))?;
        Ok(true)
    }

    async fn roster_add_player(
        &self,
        params: AddPlayerParams,
    ) -> Result<PlayerId, ErrorObjectOwned> {
        let position = parse_position(&params.position)
            .ok_or_else(|| Self::rpc_error("Invalid position"))?;
        let id = params.id.unwrap_or_else(|| slugify(&params.name));
        let player = Player {
            id: id.clone(),
            name: params.name,
            nationality: params.nationality,
            position,
            base_price: params.base_price,
            stats: params.stats,
        };
        self.store
            .put_player(player)
            .map_err(|e| Self::rpc_error(&format!("Failed to add player: {e}")))?;
        info!(player = %id, "player added");
        Ok(id)
    }

    async fn roster_delete_player(&self, id: PlayerId) -> Result<bool, ErrorObjectOwned> {
        self.store
            .delete_player(&id)
            .map_err(|e| Self::rpc_error(&format!("Failed to delete player: {e}")))?;
        Ok(true)
    }

    async fn roster_add_owner(&self, params: AddOwnerParams) -> Result<String, ErrorObjectOwned> {
        let id = params.id.unwrap_or_else(|| slugify(&params.name));
        self.store
            .put_owner(Owner {
                id: id.clone(),
                name: params.name,
                role: params.role,
            })
            .map_err(|e| Self::rpc_error(&format!("Failed to add owner: {e}")))?;
        Ok(id)
    }

    async fn roster_delete_owner(&self, id: String) -> Result<bool, ErrorObjectOwned> {
        self.store
            .delete_owner(&id)
            .map_err(|e| Self::rpc_error(&format!("Failed to delete owner: {e}")))?;
        Ok(true)
    }

    async fn query_round_state(&self) -> Result<RoundSnapshot, ErrorObjectOwned> {
        Ok(self.engine.read().snapshot())
    }

    async fn query_teams(&self) -> Result<Vec<Team>, ErrorObjectOwned> {
        self.store
            .teams()
            .map_err(|e| Self::rpc_error(&format!("Query failed: {e}")))
    }

    async fn query_players(&self) -> Result<Vec<Player>, ErrorObjectOwned> {
        self.store
            .players()
            .map_err(|e| Self::rpc_error(&format!("Query failed: {e}")))
    }

    async fn query_player_bids(&self, player: PlayerId) -> Result<Vec<Bid>, ErrorObjectOwned> {
        self.store
            .bids_for_player(&player)
            .map_err(|e| Self::rpc_error(&format!("Query failed: {e}")))
    }

    async fn query_owners(&self) -> Result<Vec<Owner>, ErrorObjectOwned> {
        self.store
            .owners()
            .map_err(|e| Self::rpc_error(&format!("Query failed: {e}")))
    }
}

/// Drive the engine's countdown once per second.
fn spawn_tick_loop(server: Arc<AuctionServer>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let result = server.engine.write().tick();
            if let Err(err) = result {
                // Settlement write failed on a forced close; the round is
                // held for admin_retrySettlement.
                error!(error = %err, "tick-driven settlement failed");
            }
            server.maybe_schedule_finish();
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("auction_server=info".parse()?)
                .add_directive("crease_engine=info".parse()?)
                .add_directive("jsonrpsee=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = EngineConfig {
        timer_duration_secs: cli.timer_duration,
        timer_enabled: !cli.timer_disabled,
        settlement_hold_secs: cli.settlement_hold,
    };
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    let store = Arc::new(MemoryRosterStore::new());
    let state = Arc::new(AuctionServer::new(store, config));

    info!("Starting auction server on {}", cli.listen);

    let server = Server::builder().build(cli.listen).await?;
    let handle = server.start(
        AuctionServer {
            engine: state.engine.clone(),
            store: state.store.clone(),
            settlement_hold: state.settlement_hold,
            finish_pending: state.finish_pending.clone(),
        }
        .into_rpc(),
    );

    spawn_tick_loop(state);

    info!("Auction server running. Press Ctrl+C to stop.");

    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    handle.stop()?;
    handle.stopped().await;

    Ok(())
}
