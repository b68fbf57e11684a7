use chrono::Duration;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait};
use uuid::Uuid;

use dispenser_coupons::domain::types::UnknownOriginPolicy;
use dispenser_coupons::error::CouponsServiceError;
use dispenser_coupons::infra::db::DbCouponRepository;
use dispenser_coupons::usecase::claim::{ClaimCouponInput, ClaimCouponUseCase};
use dispenser_coupons::usecase::coupon::{
    DeleteCouponUseCase, ListCouponsUseCase, SetCouponActiveUseCase,
};
use dispenser_coupons::usecase::seed::{SeedCouponsInput, SeedCouponsUseCase};
use dispenser_coupons_migration::Migrator;
use dispenser_coupons_schema::claims;
use dispenser_testing::db::migrated_sqlite;

use crate::helpers::test_claimant;

async fn repo() -> DbCouponRepository {
    DbCouponRepository {
        db: migrated_sqlite::<Migrator>().await,
    }
}

async fn seed(repo: &DbCouponRepository, codes: &[&str]) {
    SeedCouponsUseCase { repo: repo.clone() }
        .execute(SeedCouponsInput {
            codes: codes.iter().map(|c| (*c).to_owned()).collect(),
        })
        .await
        .unwrap();
}

fn claim_usecase(repo: &DbCouponRepository) -> ClaimCouponUseCase<DbCouponRepository> {
    ClaimCouponUseCase {
        repo: repo.clone(),
        unknown_origin_policy: UnknownOriginPolicy::SharedBucket,
    }
}

async fn claim(
    repo: &DbCouponRepository,
    ip: &str,
    session_id: &str,
) -> Result<String, CouponsServiceError> {
    claim_usecase(repo)
        .execute(ClaimCouponInput {
            claimant: test_claimant(ip, session_id),
        })
        .await
        .map(|issued| issued.code)
}

async fn positions(repo: &DbCouponRepository) -> Vec<(String, i64)> {
    ListCouponsUseCase { repo: repo.clone() }
        .execute()
        .await
        .unwrap()
        .into_iter()
        .map(|s| (s.coupon.code, s.coupon.position))
        .collect()
}

async fn insert_claim_at(
    db: &DatabaseConnection,
    ip: &str,
    session_id: &str,
    coupon_id: Option<Uuid>,
    ago: Duration,
) {
    claims::ActiveModel {
        id: Set(Uuid::now_v7()),
        ip: Set(ip.to_owned()),
        session_id: Set(session_id.to_owned()),
        coupon_id: Set(coupon_id),
        created_at: Set(chrono::Utc::now() - ago),
    }
    .insert(db)
    .await
    .unwrap();
}

#[tokio::test]
async fn should_rotate_through_persisted_positions() {
    let repo = repo().await;
    seed(&repo, &["A", "B"]).await;

    assert_eq!(claim(&repo, "10.0.0.1", "x").await.unwrap(), "A");
    assert_eq!(
        positions(&repo).await,
        vec![("B".to_owned(), 2), ("A".to_owned(), 3)]
    );

    assert_eq!(claim(&repo, "10.0.0.2", "y").await.unwrap(), "B");
    assert_eq!(claim(&repo, "10.0.0.3", "z").await.unwrap(), "A");
    assert_eq!(
        positions(&repo).await,
        vec![("B".to_owned(), 4), ("A".to_owned(), 5)]
    );
}

#[tokio::test]
async fn should_seed_and_list_with_claim_counts() {
    let repo = repo().await;
    seed(&repo, &["c1", "c2", "c3"]).await;
    claim(&repo, "10.0.0.1", "x").await.unwrap();

    let listed = ListCouponsUseCase { repo: repo.clone() }
        .execute()
        .await
        .unwrap();
    let view: Vec<(&str, i64, u64)> = listed
        .iter()
        .map(|s| (s.coupon.code.as_str(), s.coupon.position, s.claim_count))
        .collect();
    assert_eq!(view, vec![("c2", 2, 0), ("c3", 3, 0), ("c1", 4, 1)]);
    assert!(listed.iter().all(|s| s.coupon.is_active));
}

#[tokio::test]
async fn should_append_second_batch_after_first() {
    let repo = repo().await;
    seed(&repo, &["A", "B"]).await;
    seed(&repo, &["C"]).await;
    assert_eq!(
        positions(&repo).await,
        vec![
            ("A".to_owned(), 1),
            ("B".to_owned(), 2),
            ("C".to_owned(), 3)
        ]
    );
}

#[tokio::test]
async fn should_enforce_cooldown_from_stored_claims() {
    let repo = repo().await;
    seed(&repo, &["A", "B"]).await;
    insert_claim_at(&repo.db, "198.51.100.1", "x", None, Duration::minutes(30)).await;

    let by_session = claim(&repo, "203.0.113.1", "x").await;
    assert!(
        matches!(
            by_session,
            Err(CouponsServiceError::CooldownActive {
                remaining_secs: 1800
            })
        ),
        "expected 1800s cooldown, got {by_session:?}"
    );

    let by_ip = claim(&repo, "198.51.100.1", "y").await;
    assert!(matches!(
        by_ip,
        Err(CouponsServiceError::CooldownActive { .. })
    ));

    assert_eq!(claim(&repo, "203.0.113.2", "z").await.unwrap(), "A");
}

#[tokio::test]
async fn should_ignore_claims_older_than_cooldown() {
    let repo = repo().await;
    seed(&repo, &["A"]).await;
    insert_claim_at(&repo.db, "10.0.0.1", "x", None, Duration::minutes(61)).await;

    assert_eq!(claim(&repo, "10.0.0.1", "x").await.unwrap(), "A");
}

#[tokio::test]
async fn should_report_unavailable_for_empty_or_inactive_store() {
    let repo = repo().await;
    let empty = claim(&repo, "10.0.0.1", "x").await;
    assert!(matches!(empty, Err(CouponsServiceError::NoCouponsAvailable)));

    seed(&repo, &["A"]).await;
    let id = ListCouponsUseCase { repo: repo.clone() }
        .execute()
        .await
        .unwrap()[0]
        .coupon
        .id;
    SetCouponActiveUseCase { repo: repo.clone() }
        .execute(id, false)
        .await
        .unwrap();

    let inactive = claim(&repo, "10.0.0.1", "x").await;
    assert!(matches!(
        inactive,
        Err(CouponsServiceError::NoCouponsAvailable)
    ));
}

#[tokio::test]
async fn should_delete_oldest_claim_and_keep_newer_cooldown() {
    let repo = repo().await;
    seed(&repo, &["X", "Y"]).await;
    let x = ListCouponsUseCase { repo: repo.clone() }
        .execute()
        .await
        .unwrap()[0]
        .coupon
        .id;

    insert_claim_at(&repo.db, "10.0.0.1", "a", Some(x), Duration::hours(3)).await;
    insert_claim_at(&repo.db, "10.0.0.2", "b", Some(x), Duration::minutes(2)).await;

    let deleted = DeleteCouponUseCase { repo: repo.clone() }
        .execute(x)
        .await
        .unwrap();
    assert_eq!(deleted.code, "X");

    let remaining = claims::Entity::find().all(&repo.db).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].session_id, "b");
    assert_eq!(remaining[0].coupon_id, None);

    let again = claim(&repo, "203.0.113.1", "b").await;
    assert!(
        matches!(again, Err(CouponsServiceError::CooldownActive { .. })),
        "expected cooldown, got {again:?}"
    );
    assert_eq!(positions(&repo).await, vec![("Y".to_owned(), 2)]);

    let missing = DeleteCouponUseCase { repo: repo.clone() }.execute(x).await;
    assert!(matches!(missing, Err(CouponsServiceError::CouponNotFound)));
}

// The SQLite pool holds a single connection, so these concurrent claims queue
// on the pool rather than on the PostgreSQL table lock. They check the
// transaction boundaries of the repository, not the lock itself.

#[tokio::test]
async fn should_hand_pool_serialized_claimants_distinct_coupons() {
    let repo = repo().await;
    seed(&repo, &["A", "B", "C"]).await;

    let (a, b, c) = tokio::join!(
        claim(&repo, "10.0.0.1", "x"),
        claim(&repo, "10.0.0.2", "y"),
        claim(&repo, "10.0.0.3", "z"),
    );
    let mut codes = vec![a.unwrap(), b.unwrap(), c.unwrap()];
    codes.sort();
    assert_eq!(codes, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn should_issue_once_to_pool_serialized_claims_from_one_identity() {
    let repo = repo().await;
    seed(&repo, &["A", "B"]).await;

    let (first, second) = tokio::join!(
        claim(&repo, "10.0.0.1", "x"),
        claim(&repo, "10.0.0.1", "x"),
    );
    assert_eq!(
        [&first, &second].iter().filter(|r| r.is_ok()).count(),
        1,
        "got {first:?} and {second:?}"
    );
    assert_eq!(claims::Entity::find().all(&repo.db).await.unwrap().len(), 1);
}
