use crate::constants::*;
use crate::sign;
use crate::AwsConfig;
use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Request, StatusCode};
use log::debug;
use secref_core::key::{field_from_json, parse_key};
use secref_core::time::{format_date, format_iso8601, now, DateTime};
use secref_core::{Context, Error, Result, SecretProvider};
use serde::Deserialize;
use serde_json::json;

/// AwsSecretsManagerProvider reads secrets from AWS Secrets Manager over its
/// HTTP API, signing every request with Signature V4. No AWS SDK is involved.
///
/// The provider is read-only; `set`, `delete` and `list` keep the unsupported
/// defaults.
#[derive(Debug)]
pub struct AwsSecretsManagerProvider {
    config: AwsConfig,

    time: Option<DateTime>,
}

impl AwsSecretsManagerProvider {
    /// Create a new AwsSecretsManagerProvider.
    ///
    /// Credentials missing from `config` fall back to `AWS_ACCESS_KEY_ID` /
    /// `AWS_SECRET_ACCESS_KEY` in the context environment; construction fails
    /// when neither source yields both.
    pub fn new(ctx: &Context, mut config: AwsConfig) -> Result<Self> {
        if config.region.is_empty() {
            config.region = DEFAULT_REGION.to_string();
        }
        if config.access_key_id.is_empty() {
            config.access_key_id = ctx.env_var(AWS_ACCESS_KEY_ID).unwrap_or_default();
        }
        if config.secret_access_key.is_empty() {
            config.secret_access_key = ctx.env_var(AWS_SECRET_ACCESS_KEY).unwrap_or_default();
        }

        if config.access_key_id.is_empty() || config.secret_access_key.is_empty() {
            return Err(Error::provider_init(format!(
                "AWS credentials required (set accessKeyId/secretAccessKey or the \
                 {AWS_ACCESS_KEY_ID}/{AWS_SECRET_ACCESS_KEY} environment variables)"
            )));
        }

        Ok(Self { config, time: None })
    }

    /// The provider's configuration.
    pub fn config(&self) -> &AwsConfig {
        &self.config
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    fn host(&self) -> String {
        format!("secretsmanager.{}.amazonaws.com", self.config.region)
    }

    /// Call the GetSecretValue operation for `secret_id`.
    async fn get_secret_value(&self, ctx: &Context, secret_id: &str) -> Result<String> {
        let host = self.host();
        let payload = json!({ "SecretId": secret_id }).to_string();
        let payload_hash = secref_core::hash::hex_sha256(payload.as_bytes());

        let now = self.time.unwrap_or_else(now);
        let date = format_date(now);
        let timestamp = format_iso8601(now);

        let headers = [
            (http::header::CONTENT_TYPE.as_str(), CONTENT_TYPE_AMZ_JSON),
            (http::header::HOST.as_str(), host.as_str()),
            (X_AMZ_CONTENT_SHA_256, payload_hash.as_str()),
            (X_AMZ_DATE, timestamp.as_str()),
            (X_AMZ_TARGET, TARGET_GET_SECRET_VALUE),
        ];

        let (canonical_request, signed_headers) =
            sign::canonical_request(Method::POST.as_str(), &headers, &payload_hash);
        let scope = sign::credential_scope(&date, &self.config.region, SERVICE);
        debug!("calculated scope: {scope}");
        let string_to_sign = sign::string_to_sign(&timestamp, &scope, &canonical_request);
        let signing_key =
            sign::signing_key(&self.config.secret_access_key, &date, &self.config.region, SERVICE);
        let signature = sign::signature(&signing_key, &string_to_sign);
        let authorization = sign::authorization_header(
            &self.config.access_key_id,
            &scope,
            &signed_headers,
            &signature,
        );

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(format!("https://{host}/"));
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        let req = builder
            .header(http::header::AUTHORIZATION, authorization)
            .body(Bytes::from(payload))
            .map_err(|e| Error::unexpected("failed to build secrets manager request").with_source(e))?;

        let resp = ctx.http_send_as_string(req).await?;
        if resp.status() != StatusCode::OK {
            return Err(Error::not_found(format!(
                "secrets manager returned status {} for secret {:?}: {}",
                resp.status(),
                secret_id,
                resp.body()
            )));
        }

        let parsed: GetSecretValueResponse = serde_json::from_str(resp.body()).map_err(|e| {
            Error::unexpected("failed to parse secrets manager response").with_source(e)
        })?;

        if parsed.secret_string.is_empty() {
            return Err(Error::not_found(format!(
                "secret {secret_id:?} has no string value"
            )));
        }
        Ok(parsed.secret_string)
    }
}

#[async_trait]
impl SecretProvider for AwsSecretsManagerProvider {
    fn name(&self) -> &'static str {
        "aws-sm"
    }

    async fn get(&self, ctx: &Context, key: &str) -> Result<String> {
        if key.is_empty() {
            return Err(Error::invalid_key("empty key"));
        }

        let (secret_name, field) = parse_key(key);
        let value = self.get_secret_value(ctx, secret_name).await?;

        match field {
            Some(field) => field_from_json(&value, field, secret_name),
            None => Ok(value),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GetSecretValueResponse {
    #[serde(rename = "SecretString")]
    secret_string: String,
    #[serde(rename = "Name")]
    #[allow(dead_code)]
    name: String,
    #[serde(rename = "ARN")]
    #[allow(dead_code)]
    arn: String,
}
