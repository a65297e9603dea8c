//! # InfluxDB Client
//!
//! Writes encoded lines to an InfluxDB v1.x server over its HTTP API:
//!
//! - `GET /ping` checks the server is reachable (204 expected)
//! - `POST /query` creates the database if needed (200 expected)
//! - `POST /write?db=..&precision=ns` stores line protocol (204 expected)
//!
//! Credentials, when configured, are passed as the `u` and `p` query
//! parameters the v1 API expects.

use crate::config::Config;
use crate::constants::INFLUXDB_REQUEST_TIMEOUT_SECS;
use crate::error::P1Error;
use crate::influx::line_protocol::{encode_batch, EncodedLine};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

/// Destination for encoded measurements.
#[async_trait]
pub trait MeasurementSink: Send + Sync {
    /// Writes a batch of lines; succeeds only when the store accepted all of them.
    async fn write_lines(&self, lines: &[EncodedLine]) -> Result<(), P1Error>;
}

/// Connection settings for [`InfluxClient`].
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    pub url: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl From<&Config> for InfluxConfig {
    fn from(config: &Config) -> Self {
        InfluxConfig {
            url: config.influxdb_url.clone(),
            database: config.influxdb_database.clone(),
            username: config.influxdb_username.clone(),
            password: config.influxdb_password.clone(),
            timeout: Duration::from_secs(INFLUXDB_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// HTTP client for the InfluxDB v1.x API.
pub struct InfluxClient {
    config: InfluxConfig,
    http: reqwest::Client,
}

impl InfluxClient {
    /// Builds the client without touching the network.
    pub fn new(config: InfluxConfig) -> Result<Self, P1Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(InfluxClient { config, http })
    }

    /// Builds the client, pings the server and makes sure the database exists.
    ///
    /// Failing to create the database is only logged: the account may lack
    /// admin rights while the database already exists.
    pub async fn connect(config: InfluxConfig) -> Result<Self, P1Error> {
        let client = Self::new(config)?;
        client.ping().await?;

        if let Err(e) = client.create_database().await {
            log::warn!("Could not create database (it might already exist): {e}");
        }

        Ok(client)
    }

    pub fn database(&self) -> &str {
        &self.config.database
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.url.trim_end_matches('/'))
    }

    /// `u`/`p` parameters; empty when no username is set.
    fn auth_params(&self) -> Vec<(&'static str, String)> {
        match self.config.username.as_deref() {
            Some(user) if !user.is_empty() => vec![
                ("u", user.to_string()),
                ("p", self.config.password.clone().unwrap_or_default()),
            ],
            _ => Vec::new(),
        }
    }

    /// Tests the connection to InfluxDB.
    pub async fn ping(&self) -> Result<(), P1Error> {
        let resp = self.http.get(self.endpoint("ping")).send().await?;
        expect_status(resp.status(), StatusCode::NO_CONTENT, "ping")
    }

    /// Creates the configured database; a no-op on the server if it exists.
    pub async fn create_database(&self) -> Result<(), P1Error> {
        let statement = format!(
            "CREATE DATABASE \"{}\"",
            self.config.database.replace('"', "\\\"")
        );
        self.execute_query(&statement).await
    }

    /// Executes an InfluxQL statement.
    pub async fn execute_query(&self, statement: &str) -> Result<(), P1Error> {
        let mut form = vec![("q", statement.to_string())];
        form.extend(self.auth_params());

        let resp = self
            .http
            .post(self.endpoint("query"))
            .form(&form)
            .send()
            .await?;
        expect_status(resp.status(), StatusCode::OK, "query")
    }

    /// Posts a line protocol body with nanosecond precision.
    pub async fn write_line_protocol(&self, body: String) -> Result<(), P1Error> {
        let mut params = vec![
            ("db", self.config.database.clone()),
            ("precision", "ns".to_string()),
        ];
        params.extend(self.auth_params());

        let resp = self
            .http
            .post(self.endpoint("write"))
            .query(&params)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await?;
        expect_status(resp.status(), StatusCode::NO_CONTENT, "write")
    }
}

fn expect_status(
    status: StatusCode,
    expected: StatusCode,
    operation: &'static str,
) -> Result<(), P1Error> {
    if status == expected {
        Ok(())
    } else {
        Err(P1Error::SinkStatus {
            operation,
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl MeasurementSink for InfluxClient {
    async fn write_lines(&self, lines: &[EncodedLine]) -> Result<(), P1Error> {
        if lines.is_empty() {
            return Ok(());
        }
        self.write_line_protocol(encode_batch(lines)).await
    }
}
