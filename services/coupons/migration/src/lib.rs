use sea_orm_migration::prelude::*;

mod m20261015_000001_create_coupons;
mod m20261015_000002_create_claims;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261015_000001_create_coupons::Migration),
            Box::new(m20261015_000002_create_claims::Migration),
        ]
    }
}
