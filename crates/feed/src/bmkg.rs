//! BMKG TEWS feed client.
//!
//! BMKG publishes three JSON documents: the latest automatic solution
//! (`autogempa`), the 15 most recent M5.0+ quakes (`gempaterkini`), and
//! the 15 most recent felt quakes (`gempadirasakan`). All share the
//! `Infogempa.gempa` envelope, except `gempa` is a single object in the
//! first and an array in the others. Numeric fields arrive as decorated
//! strings ("2.46 LU", "10 km").

use serde::Deserialize;
use uuid::Uuid;

use gempa_core::BmkgEarthquake;

const BMKG_BASE_URL: &str = "https://data.bmkg.go.id/DataMKG/TEWS";

/// Endpoints tried by [`BmkgClient::latest`], in order of preference.
const LATEST_ENDPOINTS: &[&str] = &["autogempa.json", "gempaterkini.json", "gempadirasakan.json"];

/// Errors from a single feed fetch. Public APIs on [`BmkgClient`] degrade
/// to empty lists instead of surfacing these; they exist for logging and
/// for the per-endpoint fetch path.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected feed shape: {0}")]
    Shape(String),
}

/// HTTP client for the BMKG feed. Cheap to clone (reqwest pools
/// connections internally).
#[derive(Debug, Clone)]
pub struct BmkgClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for BmkgClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BmkgClient {
    pub fn new() -> Self {
        Self::with_base_url(BMKG_BASE_URL.to_string())
    }

    /// Override the feed host (used by tests against a local server).
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Latest earthquakes: tries the endpoints in order of preference and
    /// returns the first non-empty parse. Never fails; an unreachable or
    /// malformed feed yields an empty list.
    pub async fn latest(&self) -> Vec<BmkgEarthquake> {
        for endpoint in LATEST_ENDPOINTS {
            match self.fetch(endpoint).await {
                Ok(quakes) if !quakes.is_empty() => {
                    tracing::debug!(endpoint, count = quakes.len(), "BMKG feed fetched");
                    return quakes;
                }
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(endpoint, error = %e, "BMKG endpoint failed, trying next");
                }
            }
        }
        tracing::warn!("No earthquake data available from BMKG");
        Vec::new()
    }

    /// Recent M5.0+ history, newest first, truncated to `limit`.
    pub async fn history(&self, limit: usize) -> Vec<BmkgEarthquake> {
        self.fetch_limited("gempaterkini.json", limit).await
    }

    /// Recent felt earthquakes, truncated to `limit`.
    pub async fn felt(&self, limit: usize) -> Vec<BmkgEarthquake> {
        self.fetch_limited("gempadirasakan.json", limit).await
    }

    async fn fetch_limited(&self, endpoint: &str, limit: usize) -> Vec<BmkgEarthquake> {
        match self.fetch(endpoint).await {
            Ok(mut quakes) => {
                quakes.truncate(limit);
                quakes
            }
            Err(e) => {
                tracing::warn!(endpoint, error = %e, "BMKG fetch failed");
                Vec::new()
            }
        }
    }

    async fn fetch(&self, endpoint: &str) -> Result<Vec<BmkgEarthquake>, FeedError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Shape(format!("{endpoint} returned {status}")));
        }

        let envelope: Envelope = response.json().await?;
        Ok(parse_envelope(envelope))
    }
}

// ── Feed wire types ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Infogempa")]
    infogempa: Option<Infogempa>,
}

#[derive(Debug, Deserialize)]
struct Infogempa {
    gempa: Option<GempaItems>,
}

/// `gempa` is a single object on `autogempa` and an array elsewhere.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GempaItems {
    Many(Vec<RawGempa>),
    One(Box<RawGempa>),
}

#[derive(Debug, Deserialize)]
struct RawGempa {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "Status", default)]
    status: Option<String>,
    #[serde(rename = "Wilayah", default)]
    wilayah: String,
    #[serde(rename = "Magnitude", default)]
    magnitude: String,
    #[serde(rename = "Kedalaman", default)]
    kedalaman: String,
    #[serde(rename = "DateTime", default)]
    datetime: String,
    #[serde(rename = "Lintang", default)]
    lintang: String,
    #[serde(rename = "Bujur", default)]
    bujur: String,
}

fn parse_envelope(envelope: Envelope) -> Vec<BmkgEarthquake> {
    let items = match envelope.infogempa.and_then(|i| i.gempa) {
        Some(GempaItems::Many(list)) => list,
        Some(GempaItems::One(one)) => vec![*one],
        None => return Vec::new(),
    };

    items.into_iter().map(to_earthquake).collect()
}

fn to_earthquake(raw: RawGempa) -> BmkgEarthquake {
    let id = raw
        .id
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("bmkg-{}", Uuid::new_v4()));

    BmkgEarthquake {
        earthquake_id: raw.id.unwrap_or_default(),
        id,
        source: "BMKG".to_string(),
        status: raw
            .status
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "confirmed".to_string()),
        region: raw.wilayah,
        magnitude: leading_f64(&raw.magnitude),
        depth: leading_f64(&raw.kedalaman),
        datetime: raw.datetime,
        latitude: leading_f64(&raw.lintang),
        longitude: leading_f64(&raw.bujur),
    }
}

/// Parse the leading decimal number of a decorated field like "2.46 LU"
/// or "10 km". Returns 0.0 when the string doesn't start with a number.
fn leading_f64(s: &str) -> f64 {
    let trimmed = s.trim_start();
    let end = trimmed
        .char_indices()
        .take_while(|&(i, c)| {
            c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))
        })
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);

    trimmed[..end].parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_number_parsing() {
        assert_eq!(leading_f64("2.46 LU"), 2.46);
        assert_eq!(leading_f64("-7.25"), -7.25);
        assert_eq!(leading_f64("10 km"), 10.0);
        assert_eq!(leading_f64("  5.6"), 5.6);
        assert_eq!(leading_f64("km 10"), 0.0);
        assert_eq!(leading_f64(""), 0.0);
    }

    #[test]
    fn parses_array_shape() {
        let body = serde_json::json!({
            "Infogempa": {
                "gempa": [
                    {
                        "Tanggal": "29 Agu 2026",
                        "Jam": "01:02:03 WIB",
                        "DateTime": "2026-08-29T01:02:03+07:00",
                        "Magnitude": "5.6",
                        "Kedalaman": "10 km",
                        "Lintang": "6.20 LS",
                        "Bujur": "106.80 BT",
                        "Wilayah": "Pusat gempa berada di darat",
                        "Potensi": "Tidak berpotensi tsunami"
                    },
                    {
                        "DateTime": "2026-08-28T22:00:00+07:00",
                        "Magnitude": "5.1",
                        "Kedalaman": "45 km",
                        "Lintang": "2.46 LU",
                        "Bujur": "128.91 BT",
                        "Wilayah": "Laut Maluku"
                    }
                ]
            }
        });

        let envelope: Envelope = serde_json::from_value(body).unwrap();
        let quakes = parse_envelope(envelope);

        assert_eq!(quakes.len(), 2);
        assert_eq!(quakes[0].magnitude, 5.6);
        assert_eq!(quakes[0].depth, 10.0);
        assert_eq!(quakes[0].latitude, 6.20);
        assert_eq!(quakes[0].longitude, 106.80);
        assert_eq!(quakes[0].source, "BMKG");
        assert_eq!(quakes[0].status, "confirmed");
        assert_eq!(quakes[1].region, "Laut Maluku");
    }

    #[test]
    fn parses_single_object_shape() {
        // autogempa returns one object, not an array.
        let body = serde_json::json!({
            "Infogempa": {
                "gempa": {
                    "DateTime": "2026-08-29T04:00:00+07:00",
                    "Magnitude": "6.1",
                    "Kedalaman": "22 km",
                    "Lintang": "7.25 LS",
                    "Bujur": "112.75 BT",
                    "Wilayah": "Jawa Timur",
                    "Status": "reviewed"
                }
            }
        });

        let envelope: Envelope = serde_json::from_value(body).unwrap();
        let quakes = parse_envelope(envelope);

        assert_eq!(quakes.len(), 1);
        assert_eq!(quakes[0].magnitude, 6.1);
        assert_eq!(quakes[0].status, "reviewed");
        assert!(quakes[0].id.starts_with("bmkg-"));
        assert!(quakes[0].earthquake_id.is_empty());
    }

    #[test]
    fn missing_envelope_yields_empty() {
        let envelope: Envelope = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(parse_envelope(envelope).is_empty());

        let envelope: Envelope =
            serde_json::from_value(serde_json::json!({"Infogempa": {}})).unwrap();
        assert!(parse_envelope(envelope).is_empty());
    }
}
