use chrono::Duration;
use uuid::Uuid;

use dispenser_coupons::domain::types::UnknownOriginPolicy;
use dispenser_coupons::error::CouponsServiceError;
use dispenser_coupons::usecase::claim::{ClaimCouponInput, ClaimCouponUseCase};
use dispenser_coupons::usecase::coupon::{
    DeleteCouponUseCase, ListCouponsUseCase, SetCouponActiveUseCase,
};

use crate::helpers::{MockCouponRepo, past_claim, test_claimant, test_coupon};

// ── DeleteCoupon ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_delete_claimed_coupon_then_report_not_found() {
    let x = test_coupon("X", 1);
    let repo = MockCouponRepo::new(
        vec![x.clone()],
        vec![past_claim("10.0.0.1", "s", x.id, Duration::minutes(5))],
    );
    let usecase = DeleteCouponUseCase { repo: repo.clone() };

    let deleted = usecase.execute(x.id).await.unwrap();
    assert_eq!(deleted.code, "X");

    let state = repo.snapshot().await;
    assert!(state.coupons.is_empty());
    assert!(state.claims.is_empty());

    let again = usecase.execute(x.id).await;
    assert!(
        matches!(again, Err(CouponsServiceError::CouponNotFound)),
        "expected CouponNotFound, got {again:?}"
    );
}

#[tokio::test]
async fn should_remove_oldest_claim_and_detach_the_rest() {
    let x = test_coupon("X", 1);
    let older = past_claim("10.0.0.1", "a", x.id, Duration::hours(3));
    let newer = past_claim("10.0.0.2", "b", x.id, Duration::minutes(2));
    let repo = MockCouponRepo::new(vec![x.clone()], vec![older, newer.clone()]);

    DeleteCouponUseCase { repo: repo.clone() }
        .execute(x.id)
        .await
        .unwrap();

    let state = repo.snapshot().await;
    assert_eq!(state.claims.len(), 1);
    assert_eq!(state.claims[0].id, newer.id);
    assert_eq!(state.claims[0].coupon_id, None);
}

#[tokio::test]
async fn should_delete_unclaimed_coupon() {
    let x = test_coupon("X", 1);
    let repo = MockCouponRepo::new(vec![x.clone(), test_coupon("Y", 2)], vec![]);

    DeleteCouponUseCase { repo: repo.clone() }
        .execute(x.id)
        .await
        .unwrap();

    let state = repo.snapshot().await;
    assert_eq!(state.coupons.len(), 1);
    assert_eq!(state.coupons[0].code, "Y");
}

#[tokio::test]
async fn should_return_not_found_for_unknown_id() {
    let repo = MockCouponRepo::new(vec![test_coupon("X", 1)], vec![]);
    let result = DeleteCouponUseCase { repo: repo.clone() }
        .execute(Uuid::now_v7())
        .await;
    assert!(matches!(result, Err(CouponsServiceError::CouponNotFound)));
    assert_eq!(repo.snapshot().await.coupons.len(), 1);
}

#[tokio::test]
async fn should_keep_cooldown_after_claimed_coupon_is_deleted() {
    let x = test_coupon("X", 1);
    let repo = MockCouponRepo::new(
        vec![x.clone(), test_coupon("Y", 2)],
        vec![
            past_claim("10.0.0.1", "a", x.id, Duration::hours(3)),
            past_claim("10.0.0.9", "b", x.id, Duration::minutes(20)),
        ],
    );
    DeleteCouponUseCase { repo: repo.clone() }
        .execute(x.id)
        .await
        .unwrap();

    // The newest claim survives with no coupon and still blocks its claimant.
    let result = ClaimCouponUseCase {
        repo: repo.clone(),
        unknown_origin_policy: UnknownOriginPolicy::default(),
    }
    .execute(ClaimCouponInput {
        claimant: test_claimant("203.0.113.1", "b"),
    })
    .await;
    assert!(
        matches!(
            result,
            Err(CouponsServiceError::CooldownActive {
                remaining_secs: 2400
            })
        ),
        "expected 2400s cooldown, got {result:?}"
    );
    assert_eq!(repo.snapshot().await.coupon("Y").position, 2);
}

// ── ListCoupons ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_in_position_order_with_claim_counts() {
    let a = test_coupon("A", 3);
    let b = test_coupon("B", 1);
    let repo = MockCouponRepo::new(
        vec![a.clone(), b.clone()],
        vec![
            past_claim("10.0.0.1", "s1", a.id, Duration::hours(3)),
            past_claim("10.0.0.2", "s2", a.id, Duration::hours(2)),
            past_claim("10.0.0.3", "s3", b.id, Duration::hours(1)),
        ],
    );

    let listed = ListCouponsUseCase { repo }.execute().await.unwrap();
    let view: Vec<(&str, u64)> = listed
        .iter()
        .map(|s| (s.coupon.code.as_str(), s.claim_count))
        .collect();
    assert_eq!(view, vec![("B", 1), ("A", 2)]);
}

#[tokio::test]
async fn should_list_nothing_for_empty_store() {
    let listed = ListCouponsUseCase {
        repo: MockCouponRepo::empty(),
    }
    .execute()
    .await
    .unwrap();
    assert!(listed.is_empty());
}

// ── SetCouponActive ──────────────────────────────────────────────────────────

#[tokio::test]
async fn should_skip_deactivated_coupon_and_resume_after_reactivation() {
    let a = test_coupon("A", 1);
    let repo = MockCouponRepo::new(vec![a.clone(), test_coupon("B", 2)], vec![]);
    let toggle = SetCouponActiveUseCase { repo: repo.clone() };
    let claim = ClaimCouponUseCase {
        repo: repo.clone(),
        unknown_origin_policy: UnknownOriginPolicy::default(),
    };

    toggle.execute(a.id, false).await.unwrap();
    let first = claim
        .execute(ClaimCouponInput {
            claimant: test_claimant("10.0.0.1", "s1"),
        })
        .await
        .unwrap();
    assert_eq!(first.code, "B");

    // A keeps its old position, so it is next once reactivated.
    toggle.execute(a.id, true).await.unwrap();
    let second = claim
        .execute(ClaimCouponInput {
            claimant: test_claimant("10.0.0.2", "s2"),
        })
        .await
        .unwrap();
    assert_eq!(second.code, "A");
}

#[tokio::test]
async fn should_return_not_found_when_toggling_unknown_id() {
    let result = SetCouponActiveUseCase {
        repo: MockCouponRepo::empty(),
    }
    .execute(Uuid::now_v7(), false)
    .await;
    assert!(matches!(result, Err(CouponsServiceError::CouponNotFound)));
}
