//! ImpactStore, GamificationStore, ContentStore and SupportStore contract
//! tests.

use chrono::Duration;
use reman_portal::models::{
    AchievementInput, AchievementMetric, CaseStudyInput, MilestoneInput, NewImpact,
    NewSupportTicket, TicketPriority, TicketStatus, TicketUpdate, WaterProjectInput,
    WaterProjectStatus,
};
use reman_portal::storage::helpers::now;
use reman_portal::storage::{Storage, StorageError};

use super::{make_order, make_user, unique};

fn impact(user_id: i64, order_id: Option<i64>, carbon_kg: f64, families: i64) -> NewImpact {
    NewImpact {
        user_id,
        order_id,
        carbon_kg,
        water_liters: 250.0,
        minerals_kg: 0.5,
        families_helped: families,
        recorded_at: now(),
    }
}

fn achievement(code: String, metric: AchievementMetric, threshold: f64) -> AchievementInput {
    AchievementInput {
        code,
        name: "Carbon Cutter".to_string(),
        description: "Save some carbon".to_string(),
        metric,
        threshold,
        points: 10,
    }
}

fn case_study(slug: &str, published: bool) -> CaseStudyInput {
    CaseStudyInput {
        title: "Refurbished fleet".to_string(),
        slug: slug.to_string(),
        summary: "Summary".to_string(),
        body: "Body".to_string(),
        image_url: None,
        published,
    }
}

// =============================================================================
// ImpactStore
// =============================================================================

pub async fn test_impact_sum_and_listing<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let other = make_user(store).await;
    let order = make_order(store, user.id).await;

    let older = store
        .add_impact(NewImpact {
            recorded_at: now() - Duration::days(3),
            ..impact(user.id, Some(order.id), 1.5, 1)
        })
        .await
        .unwrap();
    let newer = store.add_impact(impact(user.id, None, 2.25, 2)).await.unwrap();
    store.add_impact(impact(other.id, None, 100.0, 50)).await.unwrap();

    let ids: Vec<i64> = store
        .list_impact_for_user(user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![newer.id, older.id]);
    assert_eq!(older.order_id, Some(order.id));

    let totals = store.sum_impact(user.id).await.unwrap();
    assert_eq!(totals.carbon_kg, 3.75);
    assert_eq!(totals.water_liters, 500.0);
    assert_eq!(totals.minerals_kg, 1.0);
    assert_eq!(totals.families_helped, 3);
}

pub async fn test_impact_sum_empty_is_zero<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let totals = store.sum_impact(user.id).await.unwrap();
    assert_eq!(totals.carbon_kg, 0.0);
    assert_eq!(totals.water_liters, 0.0);
    assert_eq!(totals.minerals_kg, 0.0);
    assert_eq!(totals.families_helped, 0);
}

pub async fn test_delete_impact<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let kept = store.add_impact(impact(user.id, None, 1.0, 1)).await.unwrap();
    let dropped = store.add_impact(impact(user.id, None, 4.0, 4)).await.unwrap();

    store.delete_impact(dropped.id).await.unwrap();
    let rows = store.list_impact_for_user(user.id).await.unwrap();
    assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![kept.id]);
    assert_eq!(store.sum_impact(user.id).await.unwrap().families_helped, 1);

    assert!(matches!(
        store.delete_impact(dropped.id).await,
        Err(StorageError::NotFound)
    ));
}

// =============================================================================
// GamificationStore
// =============================================================================

pub async fn test_achievement_crud<S: Storage>(store: &S) {
    let code = unique("code");
    let created = store
        .create_achievement(achievement(code.clone(), AchievementMetric::Carbon, 10.0))
        .await
        .unwrap();
    assert_eq!(created.metric, AchievementMetric::Carbon);

    assert!(matches!(
        store
            .create_achievement(achievement(code.clone(), AchievementMetric::Water, 1.0))
            .await,
        Err(StorageError::Conflict(_))
    ));

    let updated = store
        .update_achievement(
            created.id,
            achievement(code, AchievementMetric::EsgScore, 250.0),
        )
        .await
        .unwrap();
    assert_eq!(updated.metric, AchievementMetric::EsgScore);
    assert_eq!(updated.threshold, 250.0);
    assert!(store
        .list_achievements()
        .await
        .unwrap()
        .contains(&updated));

    store.delete_achievement(created.id).await.unwrap();
    assert!(matches!(
        store.delete_achievement(created.id).await,
        Err(StorageError::NotFound)
    ));
}

pub async fn test_milestones_sorted<S: Storage>(store: &S) {
    let name = unique("milestone");
    let milestone = |target_score: i64, sort_order: i32| MilestoneInput {
        name: name.clone(),
        description: String::new(),
        target_score,
        reward: Some("badge".to_string()),
        sort_order,
    };
    let late = store.create_milestone(milestone(500, 2)).await.unwrap();
    let early = store.create_milestone(milestone(900, 1)).await.unwrap();

    let ids: Vec<i64> = store
        .list_milestones()
        .await
        .unwrap()
        .into_iter()
        .filter(|m| m.name == name)
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec![early.id, late.id]);

    let moved = store.update_milestone(late.id, milestone(100, 0)).await.unwrap();
    assert_eq!(moved.target_score, 100);
    store.delete_milestone(early.id).await.unwrap();
    store.delete_milestone(late.id).await.unwrap();
    assert!(matches!(
        store.delete_milestone(late.id).await,
        Err(StorageError::NotFound)
    ));
}

pub async fn test_progress_upsert<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let a = store
        .create_achievement(achievement(unique("code"), AchievementMetric::Carbon, 5.0))
        .await
        .unwrap();

    let first = store.upsert_progress(user.id, a.id, 2.0, None).await.unwrap();
    assert!(!first.completed);

    let done_at = now();
    let second = store
        .upsert_progress(user.id, a.id, 6.0, Some(done_at))
        .await
        .unwrap();
    assert_eq!(second.id, first.id, "upsert keeps the row");
    assert!(second.completed);
    assert_eq!(second.completed_at, Some(done_at));
    assert_eq!(second.progress, 6.0);

    let rows = store.list_progress(user.id).await.unwrap();
    assert_eq!(rows, vec![second]);

    store.delete_achievement(a.id).await.unwrap();
    assert!(store.list_progress(user.id).await.unwrap().is_empty());
}

// =============================================================================
// ContentStore
// =============================================================================

pub async fn test_case_study_publication<S: Storage>(store: &S) {
    let live_slug = unique("live");
    let draft_slug = unique("draft");
    let live = store.create_case_study(case_study(&live_slug, true)).await.unwrap();
    let draft = store.create_case_study(case_study(&draft_slug, false)).await.unwrap();

    let published = store.list_case_studies(true).await.unwrap();
    assert!(published.iter().any(|c| c.id == live.id));
    assert!(!published.iter().any(|c| c.id == draft.id));
    let all = store.list_case_studies(false).await.unwrap();
    assert!(all.iter().any(|c| c.id == draft.id));

    assert_eq!(
        store.find_case_study_by_slug(&draft_slug).await.unwrap(),
        Some(draft.clone())
    );
    assert!(matches!(
        store.create_case_study(case_study(&live_slug, false)).await,
        Err(StorageError::Conflict(_))
    ));

    let promoted = store
        .update_case_study(draft.id, case_study(&draft_slug, true))
        .await
        .unwrap();
    assert!(promoted.published);

    store.delete_case_study(live.id).await.unwrap();
    assert!(store.get_case_study(live.id).await.unwrap().is_none());
}

pub async fn test_water_project_crud<S: Storage>(store: &S) {
    let input = |status: WaterProjectStatus, liters: i64| WaterProjectInput {
        name: unique("well"),
        location: "Kisumu".to_string(),
        description: "Borehole".to_string(),
        liters_provided: liters,
        families_helped: 40,
        status,
        image_url: None,
    };
    let project = store
        .create_water_project(input(WaterProjectStatus::Planned, 0))
        .await
        .unwrap();
    assert_eq!(
        store.get_water_project(project.id).await.unwrap(),
        Some(project.clone())
    );

    let done = store
        .update_water_project(project.id, input(WaterProjectStatus::Completed, 1_000_000))
        .await
        .unwrap();
    assert_eq!(done.status, WaterProjectStatus::Completed);
    assert_eq!(done.liters_provided, 1_000_000);

    store.delete_water_project(project.id).await.unwrap();
    assert!(matches!(
        store
            .update_water_project(project.id, input(WaterProjectStatus::Active, 1))
            .await,
        Err(StorageError::NotFound)
    ));
}

// =============================================================================
// SupportStore
// =============================================================================

pub async fn test_ticket_lifecycle<S: Storage>(store: &S) {
    let user = make_user(store).await;
    let ticket = store
        .create_ticket(NewSupportTicket {
            user_id: user.id,
            subject: "Late delivery".to_string(),
            message: "Order has not arrived".to_string(),
            priority: TicketPriority::High,
        })
        .await
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::Open);
    assert_eq!(ticket.priority, TicketPriority::High);

    let updated = store
        .update_ticket(
            ticket.id,
            TicketUpdate {
                status: Some(TicketStatus::Resolved),
                priority: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, TicketStatus::Resolved);
    assert_eq!(updated.priority, TicketPriority::High);

    assert_eq!(
        store.list_tickets_for_user(user.id).await.unwrap(),
        vec![updated]
    );

    store.delete_ticket(ticket.id).await.unwrap();
    assert!(store.get_ticket(ticket.id).await.unwrap().is_none());
}

/// Run all impact, gamification, content and support contract tests.
#[macro_export]
macro_rules! run_engagement_tests {
    ($store:expr) => {
        use $crate::storage::engagement_tests::*;

        test_impact_sum_and_listing($store).await;
        println!("  test_impact_sum_and_listing: PASSED");

        test_impact_sum_empty_is_zero($store).await;
        println!("  test_impact_sum_empty_is_zero: PASSED");

        test_delete_impact($store).await;
        println!("  test_delete_impact: PASSED");

        test_achievement_crud($store).await;
        println!("  test_achievement_crud: PASSED");

        test_milestones_sorted($store).await;
        println!("  test_milestones_sorted: PASSED");

        test_progress_upsert($store).await;
        println!("  test_progress_upsert: PASSED");

        test_case_study_publication($store).await;
        println!("  test_case_study_publication: PASSED");

        test_water_project_crud($store).await;
        println!("  test_water_project_crud: PASSED");

        test_ticket_lifecycle($store).await;
        println!("  test_ticket_lifecycle: PASSED");
    };
}
