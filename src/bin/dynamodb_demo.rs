//! Walks a table through its whole lifecycle: create, write, read, update, delete.

use anyhow::Result;
use aws_samples::core::config::AppConfig;
use aws_samples::core::resource::{ServiceHandle, ServiceName, create_aws_resource, load_sdk_config};
use aws_samples::dynamodb::{
    self, AttributeDefinition, Item, KeySchemaEntry, ProvisionedThroughput, ScalarType, TableSpec,
};
use serde_json::{Value, json};
use tracing::info;

fn object(value: Value) -> Item {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<()> {
    aws_samples::setup_logging();

    let config = AppConfig::from_env().map_err(anyhow::Error::msg)?;
    let sdk_config = load_sdk_config(&config).await;
    let ServiceHandle::Database(db) = create_aws_resource(&sdk_config, ServiceName::Dynamodb) else {
        anyhow::bail!("resource factory returned the wrong service");
    };
    let table_name = config.table_name.as_str();

    info!("-----------create table-----------");
    let spec = TableSpec {
        table_name: table_name.to_string(),
        key_schema: vec![KeySchemaEntry::hash("userId")],
        attribute_definitions: vec![AttributeDefinition::new("userId", ScalarType::String)],
        throughput: ProvisionedThroughput {
            read_capacity_units: 1,
            write_capacity_units: 1,
        },
    };
    let description = dynamodb::create_table(&db, &spec, config.table_wait_timeout).await?;
    info!(?description, "Table ready");

    info!("-----------put item-----------");
    let item = object(json!({
        "userId": "userId004",
        "firstName": "tanaka",
        "lastName": "taro",
        "age": 30,
        "account_type": "standard_user",
        "account_type1": "standard_user1",
    }));
    let outcome = dynamodb::put_item(&db, table_name, item).await?;
    info!(?outcome, "Put item");

    info!("-----------scan items-----------");
    let page = dynamodb::scan(&db, table_name).await?;
    for item in &page.items {
        info!("{}", serde_json::Value::Object(item.clone()));
    }

    info!("-----------batch put items-----------");
    let written = dynamodb::batch_put_item(&db, table_name).await?;
    info!(written, "Batch written");

    info!("-----------get item-----------");
    let key = object(json!({ "userId": "janedoeasfdsa" }));
    match dynamodb::get_item(&db, table_name, key.clone()).await? {
        Some(item) => info!("{}", serde_json::Value::Object(item)),
        None => info!("No item for key {}", serde_json::Value::Object(key.clone())),
    }

    info!("-----------query items-----------");
    let items = dynamodb::get_item_by_query(&db, table_name, "userId", json!("johndoe")).await?;
    info!(count = items.len(), "{}", json!(items));

    info!("-----------update item-----------");
    let updated = dynamodb::update_item(
        &db,
        table_name,
        key,
        "SET age = :val1",
        object(json!({ ":val1": 30 })),
    )
    .await?;
    info!(?updated, "Updated item");

    info!("-----------scan all pages-----------");
    let all = dynamodb::scan_all(&db, table_name).await?;
    info!(count = all.len(), "Items in table");

    info!("-----------delete table-----------");
    dynamodb::delete_table(&db, table_name).await?;

    Ok(())
}
