//! # Payload Formatting
//!
//! Maps a typed payload to the single-line string a QR scanner understands.
//!
//! ## Formats
//!
//! | Kind | Output |
//! |------|--------|
//! | URL | target, verbatim |
//! | Text | body, verbatim |
//! | WiFi | `WIFI:S:<ssid>;T:<WPA\|WEP\|nopass>;P:<password>;H:<true\|false>;;` |
//! | Email | `mailto:<address>?subject=<enc>&body=<enc>` |
//! | Phone | `tel:<number>` |
//!
//! Scanner apps match these byte for byte, so nothing is validated or
//! escaped beyond the email percent-encoding. Formatting is total: an empty
//! field produces an empty segment, never an error.
//!
//! ## Example
//!
//! ```
//! use qreative::payload::{self, PayloadConfig, WifiEncryption};
//!
//! let wifi = PayloadConfig::Wifi {
//!     ssid: "Home".into(),
//!     password: "secret1".into(),
//!     encryption: WifiEncryption::Wpa,
//!     hidden: false,
//! };
//! assert_eq!(payload::format(&wifi), "WIFI:S:Home;T:WPA;P:secret1;H:false;;");
//! ```

mod form;

pub use form::PayloadForm;

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Characters left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

// ============================================================================
// TYPES
// ============================================================================

/// Payload kinds, one per [`PayloadConfig`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Url,
    Text,
    Wifi,
    Email,
    Phone,
}

impl PayloadKind {
    pub const ALL: [PayloadKind; 5] = [
        PayloadKind::Url,
        PayloadKind::Text,
        PayloadKind::Wifi,
        PayloadKind::Email,
        PayloadKind::Phone,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PayloadKind::Url => "URL",
            PayloadKind::Text => "Text",
            PayloadKind::Wifi => "WiFi",
            PayloadKind::Email => "Email",
            PayloadKind::Phone => "Phone",
        }
    }
}

/// WiFi authentication, as written into the `T:` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WifiEncryption {
    /// WPA/WPA2 (default)
    #[default]
    #[serde(rename = "WPA", alias = "wpa")]
    Wpa,
    #[serde(rename = "WEP", alias = "wep")]
    Wep,
    /// Open network
    #[serde(rename = "nopass", alias = "none")]
    None,
}

impl WifiEncryption {
    pub fn token(self) -> &'static str {
        match self {
            WifiEncryption::Wpa => "WPA",
            WifiEncryption::Wep => "WEP",
            WifiEncryption::None => "nopass",
        }
    }
}

impl fmt::Display for WifiEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// What the code encodes. Exactly one kind at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PayloadConfig {
    Url {
        #[serde(default)]
        target: String,
    },
    Text {
        #[serde(default)]
        body: String,
    },
    Wifi {
        #[serde(default)]
        ssid: String,
        #[serde(default)]
        password: String,
        #[serde(default)]
        encryption: WifiEncryption,
        #[serde(default)]
        hidden: bool,
    },
    Email {
        #[serde(default)]
        address: String,
        #[serde(default)]
        subject: Option<String>,
        #[serde(default)]
        body: Option<String>,
    },
    Phone {
        #[serde(default)]
        number: String,
    },
}

impl Default for PayloadConfig {
    fn default() -> Self {
        PayloadConfig::Url {
            target: "https://example.com".to_string(),
        }
    }
}

impl PayloadConfig {
    pub fn kind(&self) -> PayloadKind {
        match self {
            PayloadConfig::Url { .. } => PayloadKind::Url,
            PayloadConfig::Text { .. } => PayloadKind::Text,
            PayloadConfig::Wifi { .. } => PayloadKind::Wifi,
            PayloadConfig::Email { .. } => PayloadKind::Email,
            PayloadConfig::Phone { .. } => PayloadKind::Phone,
        }
    }

    /// Starter value shown when a kind is first selected in an editor.
    pub fn starter(kind: PayloadKind) -> Self {
        match kind {
            PayloadKind::Url => PayloadConfig::Url {
                target: "https://".to_string(),
            },
            PayloadKind::Text => PayloadConfig::Text {
                body: String::new(),
            },
            PayloadKind::Wifi => PayloadConfig::Wifi {
                ssid: String::new(),
                password: String::new(),
                encryption: WifiEncryption::Wpa,
                hidden: false,
            },
            PayloadKind::Email => PayloadConfig::Email {
                address: String::new(),
                subject: Some(String::new()),
                body: Some(String::new()),
            },
            PayloadKind::Phone => PayloadConfig::Phone {
                number: String::new(),
            },
        }
    }
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Percent-encode like `encodeURIComponent`.
pub fn encode_uri_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

/// Format a payload into its canonical scanner string.
pub fn format(config: &PayloadConfig) -> String {
    match config {
        PayloadConfig::Url { target } => target.clone(),
        PayloadConfig::Text { body } => body.clone(),
        PayloadConfig::Wifi {
            ssid,
            password,
            encryption,
            hidden,
        } => format!("WIFI:S:{ssid};T:{encryption};P:{password};H:{hidden};;"),
        PayloadConfig::Email {
            address,
            subject,
            body,
        } => format!(
            "mailto:{}?subject={}&body={}",
            address,
            encode_uri_component(subject.as_deref().unwrap_or_default()),
            encode_uri_component(body.as_deref().unwrap_or_default()),
        ),
        PayloadConfig::Phone { number } => format!("tel:{number}"),
    }
}
