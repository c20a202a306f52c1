//! Table dispatch function: one event selects one table call

pub mod handler;
pub mod request;

pub use handler::{function_handler, handle_event, handler};
pub use request::{DispatchRequest, OperationName, PING_RESPONSE};

use serde_json::{Value, json};
use tracing::info;

use crate::dynamodb::{self, Item, ScanPager, TableBackend};
use crate::errors::AwsSampleResult;

fn attributes_response(attributes: Option<Item>) -> Value {
    attributes.map_or_else(|| json!({}), |a| json!({ "Attributes": a }))
}

/// Runs `request` against `backend`, issuing exactly one table call for table operations.
///
/// Responses follow the provider's shapes: `{"Item": ..}` for reads, `{"Items", "Count",
/// "LastEvaluatedKey"}` for lists, `{"Attributes": ..}` for writes that return attributes.
pub async fn dispatch<B: TableBackend + ?Sized>(
    backend: &B,
    request: DispatchRequest,
) -> AwsSampleResult<Value> {
    info!(
        operation = %request.operation(),
        table = request.table_name().unwrap_or(""),
        "Dispatching"
    );

    match request {
        DispatchRequest::Create { table_name, item } => {
            let outcome = dynamodb::put_item(backend, &table_name, item).await?;
            Ok(attributes_response(outcome.previous))
        }
        DispatchRequest::Read { table_name, key } => {
            let item = dynamodb::get_item(backend, &table_name, key).await?;
            Ok(item.map_or_else(|| json!({}), |i| json!({ "Item": i })))
        }
        DispatchRequest::Update {
            table_name,
            key,
            update_expression,
            expression_attribute_values,
        } => {
            let attributes = dynamodb::update_item(
                backend,
                &table_name,
                key,
                &update_expression,
                expression_attribute_values,
            )
            .await?;
            Ok(attributes_response(attributes))
        }
        DispatchRequest::Delete { table_name, key } => {
            let removed = dynamodb::delete_item(backend, &table_name, key).await?;
            Ok(attributes_response(removed))
        }
        DispatchRequest::List {
            table_name,
            exclusive_start_key,
        } => {
            let mut pager = match exclusive_start_key {
                Some(start) => ScanPager::resume(backend, table_name, start),
                None => ScanPager::new(backend, table_name),
            };
            let page = pager.next_page().await?.unwrap_or_default();

            let count = page.items.len();
            let mut response = json!({
                "Items": page.items,
                "Count": count,
            });
            if let Some(last) = page.last_evaluated_key {
                response["LastEvaluatedKey"] = Value::Object(last);
            }
            Ok(response)
        }
        DispatchRequest::Echo(payload) => Ok(payload),
        DispatchRequest::Ping => Ok(Value::String(PING_RESPONSE.to_string())),
    }
}
