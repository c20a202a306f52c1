//! Key-value/document table operations backed by DynamoDB

pub mod backend;
pub mod batch;
pub mod scan;
pub mod table;
pub mod types;

pub use backend::{DynamoTableBackend, TableBackend};
pub use batch::{BatchWriter, MAX_BATCH_SIZE};
pub use scan::ScanPager;
pub use table::{
    DEMO_BATCH_SIZE, batch_put_item, create_table, delete_item, delete_table, demo_user, get_item,
    get_item_by_query, put_item, scan, scan_all, scan_pages, update_item, wait_until_active,
};
pub use types::{
    AttributeDefinition, Item, Key, KeyRole, KeySchemaEntry, ProvisionedThroughput, PutOutcome,
    ScalarType, ScanPage, TableDescription, TableSpec, TableStatus,
};
