pub use aws_samples::dispatch::handler;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    aws_samples::setup_logging();
    lambda_runtime::run(lambda_runtime::service_fn(handler)).await
}
