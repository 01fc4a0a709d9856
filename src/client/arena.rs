use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::api::VoteApi;
use crate::catalog::{CatalogAnime, CatalogService};
use crate::config::Config;
use crate::vote::{MatchupDetails, RecordVoteRequest};

/// Refill threshold of the matchup pool
pub const POOL_LOW_WATER: usize = 5;

/// Catalog pages the pool draws from (25 anime per page)
pub const POOL_PAGE_RANGE: std::ops::RangeInclusive<u32> = 1..=20;

/// Two anime facing each other
#[derive(Debug, Clone, PartialEq)]
pub struct Matchup {
    pub left: CatalogAnime,
    pub right: CatalogAnime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Matchup {
    /// Vote payload for `winner`; the other side is the loser
    pub fn vote_request(&self, user_id: &str, winner: Side) -> RecordVoteRequest {
        let (winner, loser) = match winner {
            Side::Left => (&self.left, &self.right),
            Side::Right => (&self.right, &self.left),
        };

        RecordVoteRequest {
            winner_id: winner.mal_id,
            loser_id: loser.mal_id,
            user_id: user_id.to_string(),
            anime_details: MatchupDetails {
                winner: winner.vote_details(),
                loser: loser.vote_details(),
            },
        }
    }
}

/// Queue of popular anime consumed two at a time
pub struct MatchupPool {
    catalog: Arc<dyn CatalogService>,
    pool: VecDeque<CatalogAnime>,
    rng: StdRng,
}

impl MatchupPool {
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        Self::with_rng(catalog, StdRng::from_os_rng())
    }

    /// Pool backed by the catalog at `CATALOG_BASE_URL`
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(Arc::new(config.catalog()?)))
    }

    pub fn with_rng(catalog: Arc<dyn CatalogService>, rng: StdRng) -> Self {
        Self {
            catalog,
            pool: VecDeque::new(),
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Pulls a random popular page into the pool, skipping anime already queued
    pub async fn refill(&mut self) -> usize {
        let page = self.rng.random_range(POOL_PAGE_RANGE);
        let mut batch = self.catalog.popular_batch(page).await;
        batch.shuffle(&mut self.rng);

        let mut queued: HashSet<i64> = self.pool.iter().map(|a| a.mal_id).collect();
        let before = self.pool.len();
        self.pool
            .extend(batch.into_iter().filter(|anime| queued.insert(anime.mal_id)));

        let added = self.pool.len() - before;
        debug!(page = page, added = added, "Matchup pool refilled");
        added
    }

    /// Next pair, refilling first when the pool runs low.
    /// `None` when the catalog cannot supply two anime.
    pub async fn next_matchup(&mut self) -> Option<Matchup> {
        if self.pool.len() < POOL_LOW_WATER {
            self.refill().await;
        }
        if self.pool.len() < 2 {
            return None;
        }

        let left = self.pool.pop_front()?;
        let right = self.pool.pop_front()?;
        Some(Matchup { left, right })
    }
}

/// A vote that never reached the server
#[derive(Debug, Clone)]
pub struct VoteFailure {
    pub request: RecordVoteRequest,
    pub error: String,
}

/// Sends votes in the background so the next matchup shows immediately
#[derive(Clone)]
pub struct VoteDispatcher {
    api: Arc<dyn VoteApi>,
    failures: Option<mpsc::UnboundedSender<VoteFailure>>,
}

impl VoteDispatcher {
    pub fn new(api: Arc<dyn VoteApi>) -> Self {
        Self {
            api,
            failures: None,
        }
    }

    /// Failed votes are also forwarded to `failures`
    pub fn with_failure_channel(mut self, failures: mpsc::UnboundedSender<VoteFailure>) -> Self {
        self.failures = Some(failures);
        self
    }

    pub fn dispatch(&self, request: RecordVoteRequest) -> JoinHandle<()> {
        let api = Arc::clone(&self.api);
        let failures = self.failures.clone();

        tokio::spawn(async move {
            match api.record_vote(&request).await {
                Ok(vote) => info!(vote_id = %vote.id, "Vote delivered"),
                Err(e) => {
                    error!(
                        user_id = %request.user_id,
                        winner_id = request.winner_id,
                        loser_id = request.loser_id,
                        error = %e,
                        "Vote delivery failed"
                    );
                    if let Some(failures) = failures {
                        let _ = failures.send(VoteFailure {
                            request,
                            error: e.to_string(),
                        });
                    }
                }
            }
        })
    }
}
