//! HRRR surface forecasts from the NOAA Open Data bucket.
//!
//! Only the two 10 m wind messages are downloaded: the `.idx` inventory next
//! to each GRIB2 file gives message byte offsets, and HTTP Range requests
//! fetch just those messages.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::{header, Client, StatusCode};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use wind_common::CycleSelection;

use crate::error::{IngestionError, Result};
use crate::grib2::{GribWindDecoder, WindComponent};
use crate::source::{SourcedField, WindSource};

/// Public bucket holding HRRR output.
pub const HRRR_BASE_URL: &str = "https://noaa-hrrr-bdp-pds.s3.amazonaws.com";

/// HTTP behavior of the HRRR source.
#[derive(Debug, Clone)]
pub struct HrrrSourceConfig {
    pub base_url: String,
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial retry delay (doubles each retry)
    pub initial_retry_delay: Duration,
    /// Maximum retry delay
    pub max_retry_delay: Duration,
    /// HTTP request timeout
    pub request_timeout: Duration,
}

impl Default for HrrrSourceConfig {
    fn default() -> Self {
        Self {
            base_url: HRRR_BASE_URL.to_string(),
            max_retries: 3,
            initial_retry_delay: Duration::from_secs(2),
            max_retry_delay: Duration::from_secs(30),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl HrrrSourceConfig {
    /// Defaults overridden by `HRRR_BASE_URL` and `HRRR_MAX_RETRIES`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("HRRR_BASE_URL") {
            config.base_url = url;
        }
        if let Some(retries) = env::var("HRRR_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.max_retries = retries;
        }
        config
    }
}

/// Object key of the surface file for a selection:
/// `hrrr.{YYYYMMDD}/conus/hrrr.t{CC}z.wrfsfcf{LL}.grib2`.
pub fn grib_key(selection: &CycleSelection) -> String {
    format!(
        "hrrr.{}/conus/hrrr.t{:02}z.wrfsfcf{:02}.grib2",
        selection.cycle_date().format("%Y%m%d"),
        selection.cycle_hour(),
        selection.lead_hours
    )
}

/// One line of a GRIB2 `.idx` inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdxEntry {
    pub message: u32,
    pub offset: u64,
    pub variable: String,
    pub level: String,
}

/// Parse an inventory such as
/// `71:48903275:d=2026022614:UGRD:10 m above ground:1 hour fcst:`.
///
/// Lines that do not parse are skipped.
pub fn parse_idx(text: &str) -> Vec<IdxEntry> {
    text.lines()
        .filter_map(|line| {
            let mut fields = line.split(':');
            let message = fields.next()?.trim().parse().ok()?;
            let offset = fields.next()?.trim().parse().ok()?;
            let _date = fields.next()?;
            let variable = fields.next()?.to_string();
            let level = fields.next()?.to_string();
            Some(IdxEntry {
                message,
                offset,
                variable,
                level,
            })
        })
        .collect()
}

/// Inclusive byte range of the message labelled `variable:level`.
///
/// The last message of a file has no known end and yields `None` as end.
pub fn message_range(entries: &[IdxEntry], label: &str) -> Option<(u64, Option<u64>)> {
    let position = entries
        .iter()
        .position(|e| format!("{}:{}", e.variable, e.level) == label)?;
    let start = entries[position].offset;
    let end = entries
        .get(position + 1)
        .map(|next| next.offset.saturating_sub(1));
    Some((start, end))
}

fn range_header(range: (u64, Option<u64>)) -> String {
    match range {
        (start, Some(end)) => format!("bytes={}-{}", start, end),
        (start, None) => format!("bytes={}-", start),
    }
}

/// Downloads and decodes HRRR 10 m wind over HTTP.
pub struct HrrrHttpSource {
    client: Client,
    config: HrrrSourceConfig,
    decoder: Arc<GribWindDecoder>,
}

impl HrrrHttpSource {
    pub fn new(config: HrrrSourceConfig, decoder: Arc<GribWindDecoder>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| IngestionError::fetch(&config.base_url, e))?;

        Ok(Self {
            client,
            config,
            decoder,
        })
    }

    pub fn url_for(&self, selection: &CycleSelection) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            grib_key(selection)
        )
    }

    /// GET with exponential backoff. 404 is reported as unavailable at once.
    async fn get_with_retry(&self, url: &str, range: Option<(u64, Option<u64>)>) -> Result<Bytes> {
        let mut attempt = 0;
        let mut delay = self.config.initial_retry_delay;

        loop {
            match self.get_once(url, range).await {
                Ok(bytes) => return Ok(bytes),
                Err(e @ IngestionError::NotAvailable(_)) => return Err(e),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.config.max_retries {
                        return Err(e);
                    }

                    warn!(
                        error = %e,
                        retry = attempt,
                        max_retries = self.config.max_retries,
                        delay_secs = delay.as_secs(),
                        "Request failed, retrying"
                    );

                    tokio::time::sleep(delay).await;
                    delay = std::cmp::min(delay * 2, self.config.max_retry_delay);
                }
            }
        }
    }

    async fn get_once(&self, url: &str, range: Option<(u64, Option<u64>)>) -> Result<Bytes> {
        let mut request = self.client.get(url);
        if let Some(range) = range {
            request = request.header(header::RANGE, range_header(range));
        }

        let response = request
            .send()
            .await
            .map_err(|e| IngestionError::fetch(url, e))?;

        match response.status() {
            StatusCode::OK | StatusCode::PARTIAL_CONTENT => response
                .bytes()
                .await
                .map_err(|e| IngestionError::fetch(url, e)),
            StatusCode::NOT_FOUND => Err(IngestionError::NotAvailable(url.to_string())),
            status => Err(IngestionError::fetch(url, format!("HTTP {}", status))),
        }
    }
}

#[async_trait]
impl WindSource for HrrrHttpSource {
    fn name(&self) -> &str {
        "hrrr-aws"
    }

    #[instrument(skip(self), fields(cycle = %selection.cycle_time, lead = selection.lead_hours))]
    async fn fetch(&self, selection: &CycleSelection) -> Result<SourcedField> {
        let url = self.url_for(selection);
        let idx_url = format!("{}.idx", url);

        let inventory = self.get_with_retry(&idx_url, None).await?;
        let entries = parse_idx(&String::from_utf8_lossy(&inventory));
        debug!(messages = entries.len(), "Read inventory");

        let mut data = BytesMut::new();
        for component in [WindComponent::U, WindComponent::V] {
            let range = message_range(&entries, component.label()).ok_or_else(|| {
                IngestionError::MissingComponent(format!("{} in {}", component.label(), idx_url))
            })?;
            let bytes = self.get_with_retry(&url, Some(range)).await?;
            debug!(component = ?component, size = bytes.len(), "Downloaded message");
            data.extend_from_slice(&bytes);
        }

        info!(url = %url, size = data.len(), "Downloaded wind messages");

        let decoder = self.decoder.clone();
        let data = data.freeze();
        let field = tokio::task::spawn_blocking(move || decoder.decode(&data))
            .await
            .map_err(|e| IngestionError::Task(e.to_string()))??;

        Ok(SourcedField {
            field,
            source_id: url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const IDX: &str = "\
1:0:d=2026022614:REFC:entire atmosphere:1 hour fcst:
70:47512003:d=2026022614:TMP:2 m above ground:1 hour fcst:
71:48903275:d=2026022614:UGRD:10 m above ground:1 hour fcst:
72:50147210:d=2026022614:VGRD:10 m above ground:1 hour fcst:
73:51380001:d=2026022614:WIND:10 m above ground:0-1 hour max fcst:
";

    #[test]
    fn test_grib_key() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 26).unwrap();
        let selection = CycleSelection::from_date(date, 14, 1).unwrap();
        assert_eq!(
            grib_key(&selection),
            "hrrr.20260226/conus/hrrr.t14z.wrfsfcf01.grib2"
        );
    }

    #[test]
    fn test_parse_idx() {
        let entries = parse_idx(IDX);
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[2].message, 71);
        assert_eq!(entries[2].offset, 48903275);
        assert_eq!(entries[2].variable, "UGRD");
        assert_eq!(entries[2].level, "10 m above ground");
    }

    #[test]
    fn test_parse_idx_skips_garbage() {
        let entries = parse_idx("<Error>NoSuchKey</Error>\n\n1:0:d=1:REFC:entire atmosphere:anl:");
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_message_ranges() {
        let entries = parse_idx(IDX);
        assert_eq!(
            message_range(&entries, WindComponent::U.label()),
            Some((48903275, Some(50147209)))
        );
        assert_eq!(
            message_range(&entries, WindComponent::V.label()),
            Some((50147210, Some(51380000)))
        );
        assert_eq!(
            message_range(&entries, "WIND:10 m above ground"),
            Some((51380001, None))
        );
        assert_eq!(message_range(&entries, "UGRD:80 m above ground"), None);
    }

    #[test]
    fn test_range_header() {
        assert_eq!(range_header((10, Some(20))), "bytes=10-20");
        assert_eq!(range_header((10, None)), "bytes=10-");
    }

    #[test]
    fn test_url_for_trims_base() {
        let config = HrrrSourceConfig {
            base_url: "http://localhost:9000/".to_string(),
            ..Default::default()
        };
        let source = HrrrHttpSource::new(config, Arc::new(GribWindDecoder::hrrr())).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 2, 26).unwrap();
        let selection = CycleSelection::from_date(date, 0, 12).unwrap();
        assert_eq!(
            source.url_for(&selection),
            "http://localhost:9000/hrrr.20260226/conus/hrrr.t00z.wrfsfcf12.grib2"
        );
    }
}
