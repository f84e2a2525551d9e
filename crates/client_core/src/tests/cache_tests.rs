use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

use shared::domain::{EvalStatus, ItemCode};

use crate::test_support::{items, project, EVALUATOR};

fn counting_fetch<T>(
    counter: &Arc<AtomicUsize>,
    value: T,
) -> impl FnOnce() -> std::future::Ready<GatewayResult<T>> {
    let counter = Arc::clone(counter);
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Ok(value))
    }
}

#[tokio::test]
async fn second_read_is_served_from_cache() {
    let cache = QueryCache::new(Duration::from_secs(60));
    let fetches = Arc::new(AtomicUsize::new(0));

    let first: Arc<Vec<EvaluationItem>> = cache
        .get_or_fetch(QueryKey::EvaluationItems, counting_fetch(&fetches, items()))
        .await
        .expect("first read");
    let second: Arc<Vec<EvaluationItem>> = cache
        .get_or_fetch(
            QueryKey::EvaluationItems,
            counting_fetch(&fetches, Vec::new()),
        )
        .await
        .expect("second read");

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);
    assert_eq!(second[0].client_item_code, ItemCode(101));
}

#[tokio::test]
async fn failures_are_returned_and_not_cached() {
    let cache = QueryCache::new(Duration::from_secs(60));
    let key = QueryKey::CompletedProjects(EVALUATOR);

    let err = cache
        .get_or_fetch::<Vec<ProjectWithClientEvalStatus>, _, _>(key.clone(), || async {
            Err(GatewayError::status("GET /api/client-evaluations/projects", 500, "boom"))
        })
        .await
        .expect_err("fetch failure surfaces");
    assert_eq!(err.user_message(), "boom");

    let projects: Arc<Vec<ProjectWithClientEvalStatus>> = cache
        .get_or_fetch(key, || async {
            Ok(vec![project(5, 502, EvalStatus::Pending)])
        })
        .await
        .expect("retry fetches again");
    assert_eq!(projects.len(), 1);
}

#[tokio::test]
async fn invalidate_forces_a_refetch() {
    let cache = QueryCache::new(Duration::from_secs(60));
    let key = QueryKey::CompletedProjects(EVALUATOR);

    let _: Arc<Vec<ProjectWithClientEvalStatus>> = cache
        .get_or_fetch(key.clone(), || async {
            Ok(vec![project(5, 502, EvalStatus::Pending)])
        })
        .await
        .expect("initial read");
    cache.invalidate(&key).await;
    let cached = cache.peek::<Vec<ProjectWithClientEvalStatus>>(&key).await;
    assert!(cached.is_none());

    let refreshed: Arc<Vec<ProjectWithClientEvalStatus>> = cache
        .get_or_fetch(key, || async {
            Ok(vec![project(5, 502, EvalStatus::Completed)])
        })
        .await
        .expect("refetch");
    assert_eq!(refreshed[0].eval_status, EvalStatus::Completed);
}

#[tokio::test]
async fn invalidate_where_only_drops_matching_keys() {
    let cache = QueryCache::new(Duration::from_secs(60));
    let search = QueryKey::DeveloperSearch(vec!["React".into()]);

    let _: Arc<Vec<StaffMember>> = cache
        .get_or_fetch(QueryKey::Employees, || async { Ok(Vec::new()) })
        .await
        .expect("employees");
    let _: Arc<Vec<StaffMember>> = cache
        .get_or_fetch(search.clone(), || async { Ok(Vec::new()) })
        .await
        .expect("search");
    let _: Arc<Vec<Skill>> = cache
        .get_or_fetch(QueryKey::Skills, || async { Ok(Vec::new()) })
        .await
        .expect("skills");

    cache.invalidate_where(QueryKey::is_roster).await;

    let employees = cache.peek::<Vec<StaffMember>>(&QueryKey::Employees).await;
    assert!(employees.is_none());
    assert!(cache.peek::<Vec<StaffMember>>(&search).await.is_none());
    assert!(cache.peek::<Vec<Skill>>(&QueryKey::Skills).await.is_some());
}

#[tokio::test]
async fn concurrent_readers_share_one_fetch() {
    let cache = QueryCache::new(Duration::from_secs(60));
    let fetches = Arc::new(AtomicUsize::new(0));

    let slow_fetch = |counter: Arc<AtomicUsize>| {
        move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, GatewayError>(items())
        }
    };

    let (a, b) = tokio::join!(
        cache.get_or_fetch::<Vec<EvaluationItem>, _, _>(
            QueryKey::EvaluationItems,
            slow_fetch(Arc::clone(&fetches))
        ),
        cache.get_or_fetch::<Vec<EvaluationItem>, _, _>(
            QueryKey::EvaluationItems,
            slow_fetch(Arc::clone(&fetches))
        ),
    );

    assert_eq!(a.expect("first reader").len(), 4);
    assert_eq!(b.expect("second reader").len(), 4);
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reading_a_key_as_the_wrong_type_is_a_decode_error() {
    let cache = QueryCache::new(Duration::from_secs(60));
    let _: Arc<Vec<Skill>> = cache
        .get_or_fetch(QueryKey::Skills, || async { Ok(Vec::new()) })
        .await
        .expect("skills");

    let err = cache
        .get_or_fetch::<Vec<EvaluationItem>, _, _>(QueryKey::Skills, || async { Ok(items()) })
        .await
        .expect_err("type mismatch");
    assert!(matches!(err, GatewayError::Decode { .. }));
}

#[test]
fn query_keys_render_stable_labels() {
    assert_eq!(
        QueryKey::CompletedProjects(EVALUATOR).to_string(),
        "completed_projects/10002"
    );
    let search = QueryKey::DeveloperSearch(vec!["React".into(), "Rust".into()]);
    assert_eq!(search.to_string(), "developer_search/React,Rust");
    assert!(QueryKey::Employees.is_roster());
    assert!(!QueryKey::Skills.is_roster());
}

#[tokio::test]
async fn invalidate_all_empties_the_cache() {
    let cache = QueryCache::new(Duration::from_secs(60));
    let _: Arc<Vec<Skill>> = cache
        .get_or_fetch(QueryKey::Skills, || async { Ok(Vec::new()) })
        .await
        .expect("skills");

    cache.invalidate_all();
    assert!(cache.peek::<Vec<Skill>>(&QueryKey::Skills).await.is_none());
}
