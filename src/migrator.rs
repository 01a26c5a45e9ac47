use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_customers_table::Migration),
            Box::new(m20240101_000002_create_parts_table::Migration),
            Box::new(m20240101_000003_create_purchase_orders_table::Migration),
            Box::new(m20240101_000004_create_inventory_items_table::Migration),
            Box::new(m20240101_000005_create_reports_table::Migration),
        ]
    }
}

mod m20240101_000001_create_customers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    #[allow(elided_lifetimes_in_paths)]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Customers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::Code).string().not_null())
                        .col(ColumnDef::new(Customers::PoNumbers).json().not_null())
                        .col(ColumnDef::new(Customers::Status).string_len(32).not_null())
                        .col(ColumnDef::new(Customers::DeleteRequest).json())
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Customers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Customers {
        Table,
        Id,
        Name,
        Code,
        PoNumbers,
        Status,
        DeleteRequest,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_parts_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_parts_table"
        }
    }

    #[async_trait::async_trait]
    #[allow(elided_lifetimes_in_paths)]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Parts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Parts::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Parts::PartNumber).string().not_null())
                        .col(ColumnDef::new(Parts::Name).string().not_null())
                        .col(ColumnDef::new(Parts::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Parts::SupplierId).string().not_null())
                        .col(ColumnDef::new(Parts::SupplierPartNumber).string().not_null())
                        .col(ColumnDef::new(Parts::PoNumber).string())
                        .col(
                            ColumnDef::new(Parts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Parts::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Parts::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Parts {
        Table,
        Id,
        PartNumber,
        Name,
        CustomerId,
        SupplierId,
        SupplierPartNumber,
        PoNumber,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_purchase_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_purchase_orders_table"
        }
    }

    #[async_trait::async_trait]
    #[allow(elided_lifetimes_in_paths)]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::PoNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::PartId).uuid().not_null())
                        .col(ColumnDef::new(PurchaseOrders::CustomerId).uuid().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrders::TotalQuantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::DeliveredQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::Status)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum PurchaseOrders {
        Table,
        Id,
        PoNumber,
        PartId,
        CustomerId,
        TotalQuantity,
        DeliveredQuantity,
        Status,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_inventory_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_inventory_items_table"
        }
    }

    #[async_trait::async_trait]
    #[allow(elided_lifetimes_in_paths)]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::UniqueId)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(InventoryItems::Barcode).string())
                        .col(ColumnDef::new(InventoryItems::QrPayload).string())
                        .col(ColumnDef::new(InventoryItems::QrLabel).text())
                        .col(ColumnDef::new(InventoryItems::PartId).uuid().not_null())
                        .col(ColumnDef::new(InventoryItems::PoId).uuid().not_null())
                        .col(ColumnDef::new(InventoryItems::PoNumber).string().not_null())
                        .col(ColumnDef::new(InventoryItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(InventoryItems::Status)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryItems::LotId).string().not_null())
                        .col(ColumnDef::new(InventoryItems::GateId).string())
                        .col(ColumnDef::new(InventoryItems::Location).string())
                        .col(ColumnDef::new(InventoryItems::History).json().not_null())
                        .col(ColumnDef::new(InventoryItems::DeleteRequest).json())
                        .col(
                            ColumnDef::new(InventoryItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryItems::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_inventory_items_po_id")
                        .table(InventoryItems::Table)
                        .col(InventoryItems::PoId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum InventoryItems {
        Table,
        Id,
        UniqueId,
        Barcode,
        QrPayload,
        QrLabel,
        PartId,
        PoId,
        PoNumber,
        Quantity,
        Status,
        LotId,
        GateId,
        Location,
        History,
        DeleteRequest,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_reports_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_reports_table"
        }
    }

    #[async_trait::async_trait]
    #[allow(elided_lifetimes_in_paths)]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Reports::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Reports::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Reports::ReportType).string_len(32).not_null())
                        .col(ColumnDef::new(Reports::ItemId).uuid().not_null())
                        .col(ColumnDef::new(Reports::ItemUniqueId).string().not_null())
                        .col(ColumnDef::new(Reports::Quantity).integer().not_null())
                        .col(ColumnDef::new(Reports::LotId).string().not_null())
                        .col(ColumnDef::new(Reports::GateId).string())
                        .col(ColumnDef::new(Reports::Location).string())
                        .col(ColumnDef::new(Reports::CustomerName).string().not_null())
                        .col(ColumnDef::new(Reports::PartName).string().not_null())
                        .col(ColumnDef::new(Reports::PoNumber).string().not_null())
                        .col(ColumnDef::new(Reports::ActorId).uuid().not_null())
                        .col(ColumnDef::new(Reports::ActorName).string().not_null())
                        .col(ColumnDef::new(Reports::Notes).string())
                        .col(
                            ColumnDef::new(Reports::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Reports::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Reports::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Reports {
        Table,
        Id,
        ReportType,
        ItemId,
        ItemUniqueId,
        Quantity,
        LotId,
        GateId,
        Location,
        CustomerName,
        PartName,
        PoNumber,
        ActorId,
        ActorName,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}
