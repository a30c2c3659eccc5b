//! Watchlist screening payloads exchanged with the scraping service.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Result of screening one trade name. Passed back to the caller as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResponse {
    #[serde(alias = "Hits", alias = "HITS")]
    pub hits: i64,
    #[serde(default, alias = "Resultados", alias = "RESULTADOS")]
    pub resultados: Vec<ScreeningMatch>,
}

/// One watchlist entry matched by the scraping service. Fields the upstream
/// leaves out come back as empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningMatch {
    #[serde(rename = "Firm Name", default, deserialize_with = "null_as_empty")]
    pub firm_name: String,
    #[serde(rename = "Additional Info", default, deserialize_with = "null_as_empty")]
    pub additional_info: String,
    #[serde(rename = "Address", default, deserialize_with = "null_as_empty")]
    pub address: String,
    #[serde(rename = "Country", default, deserialize_with = "null_as_empty")]
    pub country: String,
    #[serde(rename = "From", default, deserialize_with = "null_as_empty")]
    pub from: String,
    #[serde(rename = "To", default, deserialize_with = "null_as_empty")]
    pub to: String,
    #[serde(rename = "Grounds", default, deserialize_with = "null_as_empty")]
    pub grounds: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of the scraping service's `login` response. The `token` key is
/// matched in any casing; a non-string value counts as absent.
#[derive(Debug, Clone)]
pub struct ScrapingLoginResponse {
    pub token: Option<String>,
}

impl<'de> Deserialize<'de> for ScrapingLoginResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        let token = fields
            .into_iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("token"))
            .and_then(|(_, value)| match value {
                Value::String(token) => Some(token),
                _ => None,
            });

        Ok(Self { token })
    }
}

/// Body posted to the scraping service's `login` endpoint.
#[derive(Debug, Serialize)]
pub struct ScrapingLoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub tenant_id: &'a str,
}
