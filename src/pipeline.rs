//! Turns one stats request into one delivered record.
//!
//! A cycle fetches the player's best heroes first, then the profile. The
//! profile response produces the record; heroes that arrived earlier are
//! merged into it. Each cycle owns its intermediate data in a
//! [`RequestContext`], and only the most recently started cycle may deliver.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::{GraphQlFetcher, GraphQlRequest};
use crate::config::{ApiConfig, ConfigProvider, ServiceConfig};
use crate::delivery::DeliveryChannel;
use crate::endpoints::player::{
    best_heroes_request, parse_best_heroes, parse_player_info, player_info_request,
};
use crate::error::StratzError;
use crate::models::hero::{sort_by_matches, HeroSummary};
use crate::models::record::AggregatedPlayerRecord;

#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    /// Cap on hero groupings requested from the API.
    pub hero_take: u32,
    pub game_version_id: u16,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { hero_take: 50_000, game_version_id: 169 }
    }
}

impl From<&ServiceConfig> for PipelineSettings {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            hero_take: config.hero_take,
            game_version_id: config.game_version_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    HeroesPending,
    HeroesReady,
    HeroesFailed,
    ProfileRequested,
    ProfileFailed,
    /// Record built, waiting for delivery.
    Ready,
    Delivered,
    Undelivered,
    Superseded,
}

/// Everything one request cycle accumulates.
#[derive(Debug)]
pub struct RequestContext {
    pub request_id: u64,
    pub player_id: u64,
    config: ApiConfig,
    state: CycleState,
    pending_heroes: Option<Vec<HeroSummary>>,
}

impl RequestContext {
    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn pending_heroes(&self) -> Option<&[HeroSummary]> {
        self.pending_heroes.as_deref()
    }
}

pub struct AggregationPipeline {
    config: Arc<dyn ConfigProvider>,
    fetcher: Arc<dyn GraphQlFetcher>,
    delivery: Arc<dyn DeliveryChannel>,
    settings: PipelineSettings,
    latest_request: AtomicU64,
}

impl AggregationPipeline {
    pub fn new(
        config: Arc<dyn ConfigProvider>,
        fetcher: Arc<dyn GraphQlFetcher>,
        delivery: Arc<dyn DeliveryChannel>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            config,
            fetcher,
            delivery,
            settings,
            latest_request: AtomicU64::new(0),
        }
    }

    /// Id of the cycle currently allowed to deliver; 0 before the first request.
    pub fn latest_request_id(&self) -> u64 {
        self.latest_request.load(Ordering::SeqCst)
    }

    /// Runs a full cycle for `player_id`. A best-heroes failure only drops
    /// the heroes; every other failure ends the cycle without delivery.
    pub async fn run(&self, player_id: u64) -> Result<AggregatedPlayerRecord, StratzError> {
        let mut ctx = self.begin(player_id).await?;

        if let Err(e) = self.request_best_heroes(&mut ctx).await {
            warn!(request_id = ctx.request_id, error = %e, "best heroes unavailable, continuing without");
        }
        let record = self.request_profile(&mut ctx).await?;
        self.deliver(&mut ctx, &record).await?;
        Ok(record)
    }

    /// Starts a cycle: refreshes config, then takes the next request id. A
    /// request without config neither fetches nor supersedes older cycles.
    pub async fn begin(&self, player_id: u64) -> Result<RequestContext, StratzError> {
        let config = self.config.load().await?;
        let request_id = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        info!(request_id, player_id, "stats request received");

        Ok(RequestContext {
            request_id,
            player_id,
            config,
            state: CycleState::Idle,
            pending_heroes: None,
        })
    }

    pub async fn request_best_heroes(&self, ctx: &mut RequestContext) -> Result<(), StratzError> {
        ctx.state = CycleState::HeroesPending;
        let request = best_heroes_request(
            ctx.player_id,
            self.settings.hero_take,
            self.settings.game_version_id,
        );

        let mut heroes = match self.fetch(ctx, &request).await.and_then(|body| parse_best_heroes(&body)) {
            Ok(heroes) => heroes,
            Err(e) => {
                ctx.state = CycleState::HeroesFailed;
                return Err(e);
            }
        };
        sort_by_matches(&mut heroes);
        debug!(request_id = ctx.request_id, count = heroes.len(), "best heroes pending");
        ctx.pending_heroes = Some(heroes);
        ctx.state = CycleState::HeroesReady;
        Ok(())
    }

    /// Fetches the profile and builds the finished record, merging any
    /// pending heroes.
    pub async fn request_profile(
        &self,
        ctx: &mut RequestContext,
    ) -> Result<AggregatedPlayerRecord, StratzError> {
        ctx.state = CycleState::ProfileRequested;
        let request = player_info_request(ctx.player_id);

        let profile = match self.fetch(ctx, &request).await.and_then(|body| parse_player_info(&body)) {
            Ok(profile) => profile,
            Err(e) => {
                ctx.state = CycleState::ProfileFailed;
                return Err(e);
            }
        };

        let mut record = AggregatedPlayerRecord::from_profile(&profile);
        if let Some(heroes) = ctx.pending_heroes.take() {
            record.merge_best_heroes(&heroes);
        }
        debug!(
            request_id = ctx.request_id,
            player = %record.player_name,
            heroes = record.best_heroes.as_ref().map_or(0, |h| h.len()),
            "record ready"
        );
        ctx.state = CycleState::Ready;
        Ok(record)
    }

    /// Hands the record to the tab if this cycle is still current and the
    /// content script answers.
    pub async fn deliver(
        &self,
        ctx: &mut RequestContext,
        record: &AggregatedPlayerRecord,
    ) -> Result<(), StratzError> {
        if self.latest_request_id() != ctx.request_id {
            ctx.state = CycleState::Superseded;
            return Err(StratzError::Superseded(ctx.request_id));
        }
        if !self.delivery.ping().await {
            ctx.state = CycleState::Undelivered;
            return Err(StratzError::DeliveryUnreachable);
        }
        if let Err(e) = self.delivery.deliver(record).await {
            ctx.state = CycleState::Undelivered;
            return Err(e);
        }
        ctx.state = CycleState::Delivered;
        info!(request_id = ctx.request_id, player_id = ctx.player_id, "stats delivered");
        Ok(())
    }

    async fn fetch(
        &self,
        ctx: &RequestContext,
        request: &GraphQlRequest,
    ) -> Result<serde_json::Value, StratzError> {
        let body = self.fetcher.execute(&ctx.config, request).await?;
        self.delivery.forward_diagnostic(&body).await;
        Ok(body)
    }
}
