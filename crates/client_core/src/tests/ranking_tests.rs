use super::*;

use shared::domain::{ClientId, Grade};

use crate::{
    gateway::GatewayOp,
    notify::NoticeLevel,
    test_support::{context_for, drain, seeded_gateway},
    GatewayError, InMemoryGateway,
};

fn ranking(client: i64, rank: i64) -> ClientRanking {
    ClientRanking {
        client_id: ClientId(client),
        client_name: format!("client-{client}"),
        average_score: 100.0 - rank as f64,
        grade: Grade::new("B"),
        rank,
    }
}

#[tokio::test]
async fn rankings_are_sorted_best_first() {
    let rankings = vec![ranking(503, 3), ranking(501, 1), ranking(502, 2)];
    let gateway = Arc::new(InMemoryGateway::new().with_rankings(rankings));
    let mut controller = ClientRankingController::new(context_for(gateway));

    match controller.load().await {
        RankingView::Loaded(rows) => {
            let order: Vec<i64> = rows.iter().map(|row| row.client_id.0).collect();
            assert_eq!(order, vec![501, 502, 503]);
        }
        other => panic!("expected rankings, got {other:?}"),
    }
}

#[tokio::test]
async fn no_rankings_is_an_empty_view() {
    let gateway = Arc::new(seeded_gateway());
    let mut controller = ClientRankingController::new(context_for(gateway));
    assert_eq!(controller.load().await, &RankingView::Empty);
}

#[tokio::test]
async fn load_failure_is_shown_in_place() {
    let gateway = Arc::new(InMemoryGateway::new().with_rankings(vec![ranking(501, 1)]));
    gateway
        .fail_next(
            GatewayOp::ClientRankings,
            GatewayError::status("GET /api/client-evaluations/ranking", 500, "집계 실패"),
        )
        .await;
    let ctx = context_for(Arc::clone(&gateway));
    let mut notices = ctx.notifier.subscribe();
    let mut controller = ClientRankingController::new(ctx);

    assert_eq!(
        controller.load().await,
        &RankingView::Failed("집계 실패".to_string())
    );
    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].title, "고객 순위를 불러오지 못했습니다.");
    assert_eq!(notices[0].description.as_deref(), Some("집계 실패"));
    assert!(matches!(controller.load().await, RankingView::Loaded(rows) if rows.len() == 1));
    assert_eq!(gateway.call_count(GatewayOp::ClientRankings).await, 2);
}
