//! `User-Agent` classification
//!
//! Device families follow the ua-parser conventions: `"Spider"` for crawlers,
//! the Apple device name for iOS hardware, a generic family for other phones
//! and tablets and `"Other"` when nothing is known.

use woothee::parser::Parser;

const UNKNOWN: &str = "UNKNOWN";
const OTHER: &str = "Other";

/// What a `User-Agent` header says about the client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceProfile {
    pub device: Option<String>,
    pub os: Option<String>,
    pub browser: Option<String>,
    pub is_tablet: bool,
    pub is_mobile: bool,
    pub is_pc: bool,
    pub is_bot: bool,
}

impl DeviceProfile {
    /// Classify a raw header value; an empty string yields an all-`Other` profile
    pub fn parse(user_agent: &str) -> Self {
        let parser = Parser::new();
        let Some(result) = parser.parse(user_agent) else {
            return Self::unknown();
        };

        let category: &str = &result.category;
        let os: &str = &result.os;
        let name: &str = &result.name;

        let is_bot = category == "crawler";
        let is_tablet = !is_bot
            && (os == "iPad"
                || (os == "Android" && !user_agent.contains("Mobile"))
                || user_agent.contains("Tablet"));
        let is_mobile = !is_tablet && matches!(category, "smartphone" | "mobilephone");
        let is_pc = !is_tablet && category == "pc";

        let device = if is_bot {
            "Spider"
        } else if matches!(os, "iPhone" | "iPad" | "iPod") {
            os
        } else if is_tablet {
            "Generic Tablet"
        } else if category == "smartphone" {
            "Generic Smartphone"
        } else if category == "mobilephone" {
            "Generic Feature Phone"
        } else {
            OTHER
        };

        Self {
            device: Some(device.to_string()),
            os: Some(known_or_other(os)),
            browser: Some(known_or_other(name)),
            is_tablet,
            is_mobile,
            is_pc,
            is_bot,
        }
    }

    fn unknown() -> Self {
        Self {
            device: Some(OTHER.to_string()),
            os: Some(OTHER.to_string()),
            browser: Some(OTHER.to_string()),
            ..Default::default()
        }
    }
}

fn known_or_other(value: &str) -> String {
    if value.is_empty() || value == UNKNOWN {
        OTHER.to_string()
    } else {
        value.to_string()
    }
}
