use std::sync::Arc;

use shared::protocol::ClientRanking;
use tracing::warn;

use crate::{cache::QueryKey, ClientContext};

#[derive(Debug, Clone, PartialEq)]
pub enum RankingView {
    Loading,
    Failed(String),
    Empty,
    Loaded(Vec<ClientRanking>),
}

pub struct ClientRankingController {
    ctx: ClientContext,
    view: RankingView,
}

impl ClientRankingController {
    pub fn new(ctx: ClientContext) -> Self {
        Self {
            ctx,
            view: RankingView::Loading,
        }
    }

    pub fn view(&self) -> &RankingView {
        &self.view
    }

    /// Rankings ordered by rank, best first.
    pub async fn load(&mut self) -> &RankingView {
        let gateway = Arc::clone(&self.ctx.gateway);
        let loaded = self
            .ctx
            .cache
            .get_or_fetch(QueryKey::ClientRankings, || async move {
                gateway.client_rankings().await
            })
            .await;

        self.view = match loaded {
            Ok(rankings) if rankings.is_empty() => RankingView::Empty,
            Ok(rankings) => {
                let mut rankings = rankings.to_vec();
                rankings.sort_by_key(|ranking| ranking.rank);
                RankingView::Loaded(rankings)
            }
            Err(err) => {
                warn!(error = %err, "client ranking: load failed");
                let message = err.user_message();
                self.ctx
                    .notifier
                    .error("고객 순위를 불러오지 못했습니다.", message.clone());
                RankingView::Failed(message)
            }
        };
        &self.view
    }
}

#[cfg(test)]
#[path = "../tests/ranking_tests.rs"]
mod tests;
