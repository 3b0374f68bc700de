use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

mod custom_user;

pub async fn apply(conn: &DatabaseConnection) -> Result<(), DbErr> {
    let manager = SchemaManager::new(conn);

    custom_user::apply(&manager, conn).await?;

    Ok(())
}
