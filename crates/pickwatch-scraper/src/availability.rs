//! Store filtering and pickup-availability evaluation.

use crate::types::{FulfillmentResponse, Store};

/// The only `pickupDisplay` value that means "can be reserved for pickup".
pub const AVAILABLE_STATUS: &str = "available";

/// Pickup details, carried only by stores where the part is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupDetail {
    pub address: Option<String>,
    pub phone: Option<String>,
    pub distance_with_unit: Option<String>,
}

/// Pickup status of one device at one store, derived from a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreAvailability {
    /// Trimmed store name.
    pub store_name: String,
    pub product_title: String,
    /// Free-text quote such as "今天可取货".
    pub pickup_quote: String,
    pub is_available: bool,
    /// `Some` exactly when `is_available` is true.
    pub pickup: Option<PickupDetail>,
}

/// What one fulfillment response says about a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// `stores` is absent. The part number is wrong for this storefront or
    /// the storefront is unsupported; the response cannot tell which.
    MissingStores,
    /// `stores` is present but empty: no store near the configured location.
    NoNearbyStores,
    /// Stores that passed the whitelist, in response order. May be empty
    /// when the whitelist excluded everything.
    Stores(Vec<StoreAvailability>),
}

impl Evaluation {
    #[must_use]
    pub fn stores(&self) -> &[StoreAvailability] {
        match self {
            Evaluation::Stores(stores) => stores,
            Evaluation::MissingStores | Evaluation::NoNearbyStores => &[],
        }
    }
}

/// Whitelist rule: an entry matches when either string contains the other,
/// which tolerates both abbreviated and suffixed store names. An empty
/// whitelist matches every store.
#[must_use]
pub fn store_matches_whitelist(whitelist: &[String], store_name: &str) -> bool {
    whitelist.is_empty()
        || whitelist
            .iter()
            .any(|entry| store_name.contains(entry.as_str()) || entry.contains(store_name))
}

/// Evaluate a parsed response for one device code.
///
/// Pure: the response is only read, so repeated calls yield identical results.
#[must_use]
pub fn evaluate(
    response: &FulfillmentResponse,
    device_code: &str,
    store_whitelist: &[String],
) -> Evaluation {
    let Some(stores) = response.pickup_message().and_then(|m| m.stores.as_ref()) else {
        return Evaluation::MissingStores;
    };

    if stores.is_empty() {
        return Evaluation::NoNearbyStores;
    }

    let evaluated = stores
        .iter()
        // A nameless store can only pass an empty whitelist.
        .filter(|store| match store.store_name.as_deref() {
            Some(name) => store_matches_whitelist(store_whitelist, name),
            None => store_whitelist.is_empty(),
        })
        .map(|store| store_availability(store, device_code))
        .collect();

    Evaluation::Stores(evaluated)
}

fn store_availability(store: &Store, device_code: &str) -> StoreAvailability {
    let part = store.part(device_code);

    let product_title = part
        .and_then(|p| p.product_title())
        .unwrap_or_default()
        .to_string();
    let pickup_quote = part
        .and_then(|p| p.pickup_search_quote.as_deref())
        .unwrap_or_default()
        .to_string();
    let is_available = part
        .and_then(|p| p.pickup_display.as_deref())
        .is_some_and(|status| status == AVAILABLE_STATUS);

    let pickup = is_available.then(|| {
        let retail = store.retail_store.as_ref();
        let address = retail.and_then(|r| r.address.as_ref());
        PickupDetail {
            address: address.and_then(|a| a.two_line_address.clone()),
            phone: address.and_then(|a| a.daytime_phone.clone()),
            distance_with_unit: retail.and_then(|r| r.distance_with_unit.clone()),
        }
    });

    StoreAvailability {
        store_name: store
            .store_name
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_string(),
        product_title,
        pickup_quote,
        is_available,
        pickup,
    }
}

#[cfg(test)]
#[path = "availability_test.rs"]
mod tests;
