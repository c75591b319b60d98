//! Address lookup client and country flag rendering.

use crate::client::ProbeClient;
use crate::error::CollectorError;
use shared_types::{paths, GeoInfo, GeoLookupResponse};
use tracing::debug;

/// Offset from `'A'` to REGIONAL INDICATOR SYMBOL LETTER A.
const REGIONAL_INDICATOR_OFFSET: u32 = 0x1F1E6 - 'A' as u32;

/// Geolocation of a public address via the address-lookup endpoint.
pub async fn lookup_geo(client: &ProbeClient, ip: &str) -> Result<GeoInfo, CollectorError> {
    let request = client.get(paths::GEO_IP)?.query(&[("ip", ip)]);
    let body: GeoLookupResponse = client.send_json(request).await?;
    if !body.ok {
        return Err(CollectorError::Parse("lookup answered ok=false".to_string()));
    }
    debug!(ip, location = %body.geo.location_text(), "Geo lookup complete");
    Ok(body.geo)
}

/// Flag emoji for an ISO 3166-1 alpha-2 code.
///
/// The code is trimmed and upper-cased first; anything that is not then
/// exactly two ASCII letters yields an empty string.
pub fn country_code_to_flag(code: &str) -> String {
    let upper = code.trim().to_ascii_uppercase();
    if upper.len() != 2 || !upper.bytes().all(|b| b.is_ascii_uppercase()) {
        return String::new();
    }
    upper
        .chars()
        .filter_map(|c| char::from_u32(c as u32 + REGIONAL_INDICATOR_OFFSET))
        .collect()
}
