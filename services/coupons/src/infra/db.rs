use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbBackend, DbErr, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect, Statement, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use dispenser_coupons_schema::{claims, coupons};

use crate::domain::repository::{CouponRepository, RotationTx};
use crate::domain::types::{Claim, CooldownKey, Coupon, CouponSummary};
use crate::error::CouponsServiceError;

// ── Coupon repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCouponRepository {
    pub db: DatabaseConnection,
}

impl CouponRepository for DbCouponRepository {
    type Rotation = DbRotationTx;

    async fn begin_rotation(&self) -> Result<DbRotationTx, CouponsServiceError> {
        let txn = self.db.begin().await.context("begin rotation transaction")?;
        lock_rotation(&txn).await.context("lock coupon rotation")?;
        Ok(DbRotationTx { txn })
    }

    async fn list_with_claim_counts(&self) -> Result<Vec<CouponSummary>, CouponsServiceError> {
        #[derive(Debug, FromQueryResult)]
        struct CouponRow {
            id: Uuid,
            code: String,
            position: i64,
            is_active: bool,
            created_at: DateTime<Utc>,
            claim_count: i64,
        }

        let sql = r#"
            SELECT c.id, c.code, c.position, c.is_active, c.created_at,
                   COUNT(cl.id) AS claim_count
            FROM coupons AS c
            LEFT JOIN claims AS cl ON cl.coupon_id = c.id
            GROUP BY c.id, c.code, c.position, c.is_active, c.created_at
            ORDER BY c.position ASC, c.created_at ASC, c.id ASC
        "#;

        let rows = CouponRow::find_by_statement(Statement::from_string(
            self.db.get_database_backend(),
            sql,
        ))
        .all(&self.db)
        .await
        .context("list coupons with claim counts")?;

        Ok(rows
            .into_iter()
            .map(|row| CouponSummary {
                coupon: Coupon {
                    id: row.id,
                    code: row.code,
                    position: row.position,
                    is_active: row.is_active,
                    created_at: row.created_at,
                },
                claim_count: row.claim_count.max(0) as u64,
            })
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Coupon>, CouponsServiceError> {
        let model = coupons::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find coupon by id")?;
        Ok(model.map(coupon_from_model))
    }

    async fn delete_one_claim(&self, coupon_id: Uuid) -> Result<bool, CouponsServiceError> {
        let Some(claim) = claims::Entity::find()
            .filter(claims::Column::CouponId.eq(coupon_id))
            .order_by_asc(claims::Column::CreatedAt)
            .order_by_asc(claims::Column::Id)
            .one(&self.db)
            .await
            .context("find claim for coupon")?
        else {
            return Ok(false);
        };
        let result = claims::Entity::delete_by_id(claim.id)
            .exec(&self.db)
            .await
            .context("delete claim for coupon")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, CouponsServiceError> {
        let result = coupons::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete coupon")?;
        Ok(result.rows_affected > 0)
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<bool, CouponsServiceError> {
        let result = coupons::Entity::update_many()
            .col_expr(coupons::Column::IsActive, Expr::value(is_active))
            .filter(coupons::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("set coupon active flag")?;
        Ok(result.rows_affected > 0)
    }
}

/// Serialize rotation transactions against each other.
///
/// On PostgreSQL, SHARE ROW EXCLUSIVE conflicts with itself, so a second
/// claim or seed blocks here until the first commits, and its later reads see
/// the committed positions and claims. Plain readers are not blocked.
async fn lock_rotation(txn: &DatabaseTransaction) -> Result<(), DbErr> {
    match txn.get_database_backend() {
        DbBackend::Postgres => {
            txn.execute_unprepared("LOCK TABLE coupons IN SHARE ROW EXCLUSIVE MODE")
                .await?;
            Ok(())
        }
        // SQLite admits a single writer per database; a conflicting writer
        // fails with SQLITE_BUSY instead of reading stale positions.
        DbBackend::Sqlite => Ok(()),
        other => Err(DbErr::Custom(format!(
            "coupon rotation is not supported on {other:?}"
        ))),
    }
}

// ── Rotation transaction ─────────────────────────────────────────────────────

pub struct DbRotationTx {
    txn: DatabaseTransaction,
}

impl RotationTx for DbRotationTx {
    async fn latest_claim_since(
        &mut self,
        key: CooldownKey<'_>,
        since: DateTime<Utc>,
    ) -> Result<Option<Claim>, CouponsServiceError> {
        let mut identity = Condition::any().add(claims::Column::SessionId.eq(key.session_id));
        if let Some(ip) = key.ip {
            identity = identity.add(claims::Column::Ip.eq(ip));
        }
        let model = claims::Entity::find()
            .filter(identity)
            .filter(claims::Column::CreatedAt.gte(since))
            .order_by_desc(claims::Column::CreatedAt)
            .one(&self.txn)
            .await
            .context("find latest claim in cooldown window")?;
        Ok(model.map(claim_from_model))
    }

    async fn next_active(&mut self) -> Result<Option<Coupon>, CouponsServiceError> {
        let model = coupons::Entity::find()
            .filter(coupons::Column::IsActive.eq(true))
            .order_by_asc(coupons::Column::Position)
            .order_by_asc(coupons::Column::CreatedAt)
            .order_by_asc(coupons::Column::Id)
            .one(&self.txn)
            .await
            .context("find next active coupon")?;
        Ok(model.map(coupon_from_model))
    }

    async fn max_position(&mut self) -> Result<Option<i64>, CouponsServiceError> {
        let max = coupons::Entity::find()
            .select_only()
            .column_as(coupons::Column::Position.max(), "max_position")
            .into_tuple::<Option<i64>>()
            .one(&self.txn)
            .await
            .context("read max coupon position")?;
        Ok(max.flatten())
    }

    async fn move_to_position(
        &mut self,
        coupon_id: Uuid,
        position: i64,
    ) -> Result<(), CouponsServiceError> {
        let result = coupons::Entity::update_many()
            .col_expr(coupons::Column::Position, Expr::value(position))
            .filter(coupons::Column::Id.eq(coupon_id))
            .exec(&self.txn)
            .await
            .context("move coupon to back of rotation")?;
        if result.rows_affected == 0 {
            return Err(anyhow::anyhow!("coupon {coupon_id} vanished during claim").into());
        }
        Ok(())
    }

    async fn insert_claim(&mut self, claim: &Claim) -> Result<(), CouponsServiceError> {
        claims::ActiveModel {
            id: Set(claim.id),
            ip: Set(claim.ip.clone()),
            session_id: Set(claim.session_id.clone()),
            coupon_id: Set(claim.coupon_id),
            created_at: Set(claim.created_at),
        }
        .insert(&self.txn)
        .await
        .context("insert claim")?;
        Ok(())
    }

    async fn insert_coupon(&mut self, coupon: &Coupon) -> Result<(), CouponsServiceError> {
        coupons::ActiveModel {
            id: Set(coupon.id),
            code: Set(coupon.code.clone()),
            position: Set(coupon.position),
            is_active: Set(coupon.is_active),
            created_at: Set(coupon.created_at),
        }
        .insert(&self.txn)
        .await
        .context("insert coupon")?;
        Ok(())
    }

    async fn commit(self) -> Result<(), CouponsServiceError> {
        self.txn
            .commit()
            .await
            .context("commit rotation transaction")?;
        Ok(())
    }
}

fn coupon_from_model(model: coupons::Model) -> Coupon {
    Coupon {
        id: model.id,
        code: model.code,
        position: model.position,
        is_active: model.is_active,
        created_at: model.created_at,
    }
}

fn claim_from_model(model: claims::Model) -> Claim {
    Claim {
        id: model.id,
        ip: model.ip,
        session_id: model.session_id,
        coupon_id: model.coupon_id,
        created_at: model.created_at,
    }
}
