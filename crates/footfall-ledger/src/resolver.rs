use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use footfall_core::Coordinates;
use serde::Deserialize;
use std::time::Duration;
use tracing::{trace, warn};

pub const DEFAULT_IP_API_URL: &str = "http://ip-api.com";
pub const DEFAULT_RESOLVER_TIMEOUT: Duration = Duration::from_secs(3);

/// Maps a client address to approximate coordinates.
///
/// Lookups are best effort: any failure is reported as `None`.
#[async_trait]
pub trait GeoResolver: Send + Sync + 'static {
    async fn locate(&self, ip: &str) -> Option<Coordinates>;
}

#[async_trait]
impl<T: GeoResolver + ?Sized> GeoResolver for std::sync::Arc<T> {
    async fn locate(&self, ip: &str) -> Option<Coordinates> {
        (**self).locate(ip).await
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Resolver backed by the ip-api.com JSON endpoint.
#[derive(Debug, Clone)]
pub struct IpApiResolver {
    client: reqwest::Client,
    base_url: String,
}

impl IpApiResolver {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("footfall/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LedgerError::Resolver(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, ip: &str) -> std::result::Result<IpApiResponse, reqwest::Error> {
        let url = format!("{}/json/{}", self.base_url, urlencoding::encode(ip));
        trace!(%url, "Looking up client coordinates");

        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<IpApiResponse>()
            .await
    }
}

#[async_trait]
impl GeoResolver for IpApiResolver {
    async fn locate(&self, ip: &str) -> Option<Coordinates> {
        match self.fetch(ip).await {
            Ok(IpApiResponse {
                lat: Some(lat),
                lon: Some(lon),
            }) => Coordinates::resolved(lat, lon),
            Ok(_) => {
                trace!(ip, "Geolocation service has no coordinates for address");
                None
            }
            Err(e) => {
                warn!(ip, error = %e, "Geolocation lookup failed");
                None
            }
        }
    }
}

/// Resolver that always answers with the same coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedResolver(pub Option<Coordinates>);

#[async_trait]
impl GeoResolver for FixedResolver {
    async fn locate(&self, _ip: &str) -> Option<Coordinates> {
        self.0
    }
}
