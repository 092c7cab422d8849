use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Employees {
    Table,
    Id,
    FullName,
    Department,
    HireDate,
    SalaryCents,
}

const FULL_NAME_INDEX: &str = "idx_employees_full_name";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Employees::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Employees::FullName).string().null())
                    .col(ColumnDef::new(Employees::Department).string().null())
                    .col(ColumnDef::new(Employees::HireDate).date().not_null())
                    .col(
                        ColumnDef::new(Employees::SalaryCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(FULL_NAME_INDEX)
                    .table(Employees::Table)
                    .col(Employees::FullName)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Employees::Table).if_exists().to_owned())
            .await
    }
}
