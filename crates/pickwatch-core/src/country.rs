use serde::Deserialize;

/// Storefronts whose fulfillment endpoint shares the request/response shape
/// the monitor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Country {
    #[serde(rename = "CN", alias = "cn")]
    China,
    #[serde(rename = "JP", alias = "jp")]
    Japan,
}

impl Country {
    /// Storefront root, without a trailing slash.
    #[must_use]
    pub fn base_url(self) -> &'static str {
        match self {
            Country::China => "https://www.apple.com.cn",
            Country::Japan => "https://www.apple.com/jp",
        }
    }
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Country::China => write!(f, "CN"),
            Country::Japan => write!(f, "JP"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_urls_have_no_trailing_slash() {
        for country in [Country::China, Country::Japan] {
            assert!(!country.base_url().ends_with('/'), "{country}");
        }
    }

    #[test]
    fn deserializes_upper_and_lower_case_codes() {
        let upper: Country = serde_yaml::from_str("JP").unwrap();
        let lower: Country = serde_yaml::from_str("cn").unwrap();
        assert_eq!(upper, Country::Japan);
        assert_eq!(lower, Country::China);
    }

    #[test]
    fn rejects_unknown_country() {
        assert!(serde_yaml::from_str::<Country>("US").is_err());
    }
}
