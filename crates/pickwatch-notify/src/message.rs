//! Human-readable notification text.

use pickwatch_scraper::StoreAvailability;

/// Title used for every push notification.
pub const NOTIFICATION_TITLE: &str = "苹果商店监控";

const NO_ADDRESS: &str = "暂无取货地址";
const NO_PHONE: &str = "暂无联系电话";

/// One line per store, logged for every evaluated store.
#[must_use]
pub fn status_line(store: &StoreAvailability) -> String {
    format!(
        "门店:{},型号:{},状态:{}",
        store.store_name, store.product_title, store.pickup_quote
    )
}

/// The status line plus, for available stores, a pickup block with address,
/// phone, and distance from `location`.
#[must_use]
pub fn pickup_message(store: &StoreAvailability, location: &str) -> String {
    let mut message = status_line(store);

    if let Some(pickup) = &store.pickup {
        let address = non_blank(pickup.address.as_deref())
            .map_or_else(|| NO_ADDRESS.to_string(), |a| a.replace('\n', " "));
        let phone = non_blank(pickup.phone.as_deref()).unwrap_or(NO_PHONE);
        let distance = pickup.distance_with_unit.as_deref().unwrap_or_default();
        message = format!("{message}\n取货地址:{address},电话:{phone},距离{location}:{distance}");
    }

    message
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use pickwatch_scraper::PickupDetail;

    use super::*;

    fn store(pickup: Option<PickupDetail>) -> StoreAvailability {
        StoreAvailability {
            store_name: "Apple 南京东路".to_string(),
            product_title: "iPhone 17 Pro".to_string(),
            pickup_quote: "今天可取货".to_string(),
            is_available: pickup.is_some(),
            pickup,
        }
    }

    #[test]
    fn status_line_format() {
        assert_eq!(
            status_line(&store(None)),
            "门店:Apple 南京东路,型号:iPhone 17 Pro,状态:今天可取货"
        );
    }

    #[test]
    fn unavailable_store_message_is_just_the_status_line() {
        assert_eq!(pickup_message(&store(None), "上海"), status_line(&store(None)));
    }

    #[test]
    fn pickup_block_normalises_address_newlines() {
        let message = pickup_message(
            &store(Some(PickupDetail {
                address: Some("南京东路300号\n黄浦区".to_string()),
                phone: Some("400-666-8800".to_string()),
                distance_with_unit: Some("1.2 km".to_string()),
            })),
            "上海 黄浦区",
        );
        assert_eq!(
            message,
            "门店:Apple 南京东路,型号:iPhone 17 Pro,状态:今天可取货\n取货地址:南京东路300号 黄浦区,电话:400-666-8800,距离上海 黄浦区:1.2 km"
        );
    }

    #[test]
    fn blank_address_and_phone_fall_back_to_placeholders() {
        let message = pickup_message(
            &store(Some(PickupDetail {
                address: Some("  ".to_string()),
                phone: None,
                distance_with_unit: Some("3 km".to_string()),
            })),
            "Tokyo",
        );
        assert!(message.ends_with("\n取货地址:暂无取货地址,电话:暂无联系电话,距离Tokyo:3 km"));
    }
}
