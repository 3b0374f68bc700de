use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use sea_orm_migration::prelude::*;

use crate::entities::custom_user::{PHONE_NUMBER_MAX_LEN, PHONE_NUMBER_UNIQUE_INDEX, USERNAME_MAX_LEN};

pub async fn apply(
    manager: &SchemaManager<'_>,
    conn: &DatabaseConnection,
) -> Result<(), DbErr> {
    if !manager.has_table("custom_user").await? {
        manager
            .create_table(
                Table::create()
                    .table(CustomUser::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomUser::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CustomUser::Username)
                            .string_len(USERNAME_MAX_LEN as u32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomUser::PhoneNumber)
                            .string_len(PHONE_NUMBER_MAX_LEN as u32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomUser::CreationDate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Custom("now()".into())),
                    )
                    .col(
                        ColumnDef::new(CustomUser::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CustomUser::IsStaff)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CustomUser::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;
    }

    conn.execute(Statement::from_string(
        DbBackend::Postgres,
        format!("CREATE UNIQUE INDEX IF NOT EXISTS {PHONE_NUMBER_UNIQUE_INDEX} ON custom_user (phone_number)"),
    ))
    .await?;

    Ok(())
}

#[derive(Iden)]
enum CustomUser {
    Table,
    Id,
    Username,
    PhoneNumber,
    CreationDate,
    IsActive,
    IsStaff,
    IsAdmin,
}
