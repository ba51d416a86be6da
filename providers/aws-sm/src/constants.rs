// Headers used by the Secrets Manager API.
pub const X_AMZ_CONTENT_SHA_256: &str = "x-amz-content-sha256";
pub const X_AMZ_DATE: &str = "x-amz-date";
pub const X_AMZ_TARGET: &str = "x-amz-target";

pub const CONTENT_TYPE_AMZ_JSON: &str = "application/x-amz-json-1.1";
pub const TARGET_GET_SECRET_VALUE: &str = "secretsmanager.GetSecretValue";

// Env values used for credential fallback.
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";

// Signing protocol identifiers.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const SERVICE: &str = "secretsmanager";
pub const SCOPE_TERMINATOR: &str = "aws4_request";
pub const SECRET_KEY_PREFIX: &str = "AWS4";

pub const DEFAULT_REGION: &str = "us-east-1";
