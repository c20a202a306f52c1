use thiserror::Error;

pub type AwsSampleResult<T> = Result<T, AwsSampleError>;

#[derive(Debug, Error)]
pub enum AwsSampleError {
    #[error("Failed to interact with AWS services: {0}")]
    AwsError(String),

    #[error("Failed to parse event: {0}")]
    ParseError(String),

    #[error("Unrecognized operation:{0}")]
    UnrecognizedOperation(String),

    #[error("Invalid payload for operation '{operation}': {reason}")]
    InvalidPayload { operation: String, reason: String },

    #[error("Operation '{0}' requires a tableName")]
    MissingTableName(String),

    #[error("Failed to convert item: {0}")]
    SerializationError(String),

    #[error("Local file error: {0}")]
    IoError(String),

    #[error("{0}")]
    GeneralError(String),
}

impl AwsSampleError {
    pub fn invalid_payload(operation: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        AwsSampleError::InvalidPayload {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }
}

// SdkError and BuildError are re-exported from the shared smithy runtime, so these
// cover the S3 and SQS clients as well
impl<E, R> From<aws_sdk_dynamodb::error::SdkError<E, R>> for AwsSampleError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    fn from(error: aws_sdk_dynamodb::error::SdkError<E, R>) -> Self {
        AwsSampleError::AwsError(aws_sdk_dynamodb::error::DisplayErrorContext(error).to_string())
    }
}

impl From<aws_sdk_dynamodb::error::BuildError> for AwsSampleError {
    fn from(error: aws_sdk_dynamodb::error::BuildError) -> Self {
        AwsSampleError::GeneralError(format!("request build: {error}"))
    }
}

impl From<serde_dynamo::Error> for AwsSampleError {
    fn from(error: serde_dynamo::Error) -> Self {
        AwsSampleError::SerializationError(error.to_string())
    }
}

impl From<serde_json::Error> for AwsSampleError {
    fn from(error: serde_json::Error) -> Self {
        AwsSampleError::ParseError(error.to_string())
    }
}

impl From<std::io::Error> for AwsSampleError {
    fn from(error: std::io::Error) -> Self {
        AwsSampleError::IoError(error.to_string())
    }
}

impl From<anyhow::Error> for AwsSampleError {
    fn from(error: anyhow::Error) -> Self {
        AwsSampleError::GeneralError(error.to_string())
    }
}
