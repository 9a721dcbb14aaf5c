//! Response types for `GET /shop/fulfillment-messages`.
//!
//! ## Observed shape
//!
//! ```text
//! body.content.pickupMessage
//!   .stores[]                       absent for unknown parts / unsupported storefronts
//!     .storeName                    may carry stray whitespace
//!     .partsAvailability.<PART>
//!       .pickupDisplay              "available" | "unavailable" | "ineligible" | ...
//!       .pickupSearchQuote          free text, e.g. "今天可取货"
//!       .messageTypes.regular.storePickupProductTitle
//!     .retailStore
//!       .distanceWithUnit           e.g. "1.2 km"
//!       .address.twoLineAddress     embedded "\n" between the two lines
//!       .address.daytimePhone
//! ```
//!
//! Every level is modelled as optional with `#[serde(default)]` so that any
//! JSON object parses; a missing level becomes an explicit branch in
//! [`crate::availability::evaluate`] instead of a parse failure that would
//! burn retry budget on a response that will never change. Store entries are
//! decoded one at a time: an entry that still fails to decode is logged and
//! dropped while the rest of the list is kept.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

/// Top-level response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FulfillmentResponse {
    #[serde(default)]
    pub body: Option<ResponseBody>,
}

impl FulfillmentResponse {
    /// The `body.content.pickupMessage` object, if every level is present.
    #[must_use]
    pub fn pickup_message(&self) -> Option<&PickupMessage> {
        self.body
            .as_ref()?
            .content
            .as_ref()?
            .pickup_message
            .as_ref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseBody {
    #[serde(default)]
    pub content: Option<ResponseContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseContent {
    #[serde(default, rename = "pickupMessage")]
    pub pickup_message: Option<PickupMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PickupMessage {
    /// `None` when the field is absent, `null`, or not a list.
    #[serde(default, deserialize_with = "lenient_stores")]
    pub stores: Option<Vec<Store>>,

    /// Everything else in the message (error text, location echo). Only
    /// used for debug logging when `stores` is missing.
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    #[serde(default)]
    pub store_name: Option<String>,

    /// Keyed by part number.
    #[serde(default)]
    pub parts_availability: Option<HashMap<String, PartAvailability>>,

    #[serde(default)]
    pub retail_store: Option<RetailStore>,
}

impl Store {
    /// Entry for `device_code`, if the store lists one.
    #[must_use]
    pub fn part(&self, device_code: &str) -> Option<&PartAvailability> {
        self.parts_availability.as_ref()?.get(device_code)
    }
}

fn lenient_stores<'de, D>(deserializer: D) -> Result<Option<Vec<Store>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(serde_json::Value::Array(entries)) =
        Option::<serde_json::Value>::deserialize(deserializer)?
    else {
        return Ok(None);
    };

    let stores = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<Store>(entry) {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping unreadable store entry");
                None
            }
        })
        .collect();
    Ok(Some(stores))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartAvailability {
    /// The machine-readable status. Only the exact value `"available"`
    /// means the part can be reserved for pickup.
    #[serde(default)]
    pub pickup_display: Option<String>,

    #[serde(default)]
    pub pickup_search_quote: Option<String>,

    #[serde(default)]
    pub message_types: Option<MessageTypes>,
}

impl PartAvailability {
    #[must_use]
    pub fn product_title(&self) -> Option<&str> {
        self.message_types
            .as_ref()?
            .regular
            .as_ref()?
            .store_pickup_product_title
            .as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageTypes {
    #[serde(default)]
    pub regular: Option<RegularMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegularMessage {
    #[serde(default)]
    pub store_pickup_product_title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetailStore {
    #[serde(default)]
    pub distance_with_unit: Option<String>,

    #[serde(default)]
    pub address: Option<StoreAddress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreAddress {
    #[serde(default)]
    pub two_line_address: Option<String>,

    #[serde(default)]
    pub daytime_phone: Option<String>,
}
