//! Randomized request bodies for the evaluation endpoints
//!
//! Every field is drawn uniformly from a fixed pool or a bounded range.
//! Generators take the RNG as a parameter so runs can be reproduced from a
//! seed; only the transaction id (a v4 UUID) stays unseeded.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

pub const CURRENCIES: &[&str] = &["USD", "GBP", "EUR", "CAD", "AUD", "JPY"];
pub const COUNTRIES: &[&str] = &["US", "GB", "CA", "DE", "FR", "AU", "JP", "IN", "BR", "MX"];
pub const MERCHANT_CATEGORIES: &[&str] = &["5411", "5999", "5734", "5812", "5541", "5942", "5912"];
pub const TRANSACTION_TYPES: &[&str] = &["PURCHASE", "REFUND", "AUTHORIZATION"];
pub const ENTRY_MODES: &[&str] = &["ECOM", "CHIP", "MAGSTRIPE", "CONTACTLESS", "MANUAL"];
pub const DECISIONS: &[&str] = &["APPROVE", "DECLINE"];

pub const VISA_BINS: &[&str] = &["411111", "400000", "450000"];
pub const MASTERCARD_BINS: &[&str] = &["555555", "520000", "540000"];
pub const AMEX_BINS: &[&str] = &["340000", "370000"];

/// Number of distinct card hashes (`card_hash_0000` ..= `card_hash_0099`)
pub const CARD_HASH_POOL_SIZE: u32 = 100;

/// Card every velocity-burst request reuses
pub const VELOCITY_CARD_HASH: &str = "velocity_test_card";

pub const AUTH_AMOUNT_RANGE: (f64, f64) = (10.0, 2000.0);
pub const MONITORING_AMOUNT_RANGE: (f64, f64) = (10.0, 500.0);
pub const VELOCITY_AMOUNT_RANGE: (f64, f64) = (50.0, 200.0);

/// Card network label sent alongside the BIN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardNetwork {
    Visa,
    Mastercard,
    Amex,
}

impl CardNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardNetwork::Visa => "VISA",
            CardNetwork::Mastercard => "MASTERCARD",
            CardNetwork::Amex => "AMEX",
        }
    }
}

impl fmt::Display for CardNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Network for a card number prefix: `4` is Visa, `5` is Mastercard, anything else Amex.
pub fn card_network_for_bin(card_bin: &str) -> CardNetwork {
    match card_bin.as_bytes().first() {
        Some(b'4') => CardNetwork::Visa,
        Some(b'5') => CardNetwork::Mastercard,
        _ => CardNetwork::Amex,
    }
}

/// Body for `POST /v1/evaluate/auth`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthRequest {
    pub transaction_id: String,
    pub card_hash: String,
    pub amount: f64,
    pub currency: String,
    pub country_code: String,
    pub merchant_id: String,
    pub merchant_name: String,
    pub merchant_category: String,
    pub merchant_category_code: String,
    pub card_present: bool,
    pub transaction_type: String,
    pub entry_mode: String,
    pub ip_address: String,
    pub device_id: String,
    pub card_network: CardNetwork,
    pub card_bin: String,
}

/// Body for `POST /v1/evaluate/monitoring`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringRequest {
    pub transaction_id: String,
    pub card_hash: String,
    pub amount: f64,
    pub currency: String,
    pub country_code: String,
    pub merchant_id: String,
    pub merchant_category_code: String,
    pub decision: String,
}

/// Which generator a task uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Auth,
    Monitoring,
    VelocityBurst,
}

impl PayloadKind {
    /// Generate a request body of this kind as JSON
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> JsonValue {
        let value = match self {
            PayloadKind::Auth => serde_json::to_value(generate_auth_request(rng)),
            PayloadKind::Monitoring => serde_json::to_value(generate_monitoring_request(rng)),
            PayloadKind::VelocityBurst => {
                serde_json::to_value(generate_velocity_burst_request(rng))
            }
        };
        // Plain structs of strings, numbers and bools always serialize.
        value.unwrap_or(JsonValue::Null)
    }
}

/// `txn-` followed by 16 lowercase hex characters
pub fn generate_transaction_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("txn-{}", &hex[..16])
}

/// A BIN drawn uniformly from the Visa, Mastercard and Amex pools combined
pub fn generate_card_bin<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    let total = VISA_BINS.len() + MASTERCARD_BINS.len() + AMEX_BINS.len();
    let idx = rng.gen_range(0..total);
    VISA_BINS
        .iter()
        .chain(MASTERCARD_BINS)
        .chain(AMEX_BINS)
        .nth(idx)
        .copied()
        .unwrap_or(VISA_BINS[0])
}

/// Uniform amount in `[min, max]`, rounded to cents
pub fn random_amount<R: Rng + ?Sized>(rng: &mut R, (min, max): (f64, f64)) -> f64 {
    let amount: f64 = rng.gen_range(min..=max);
    ((amount * 100.0).round() / 100.0).clamp(min, max)
}

fn pick<R: Rng + ?Sized>(rng: &mut R, pool: &[&'static str]) -> String {
    pool.choose(rng).copied().unwrap_or_default().to_string()
}

fn card_hash<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("card_hash_{:04}", rng.gen_range(0..CARD_HASH_POOL_SIZE))
}

fn merchant_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("merch_{}", rng.gen_range(1000..=9999))
}

pub fn generate_auth_request<R: Rng + ?Sized>(rng: &mut R) -> AuthRequest {
    let card_bin = generate_card_bin(rng);

    AuthRequest {
        transaction_id: generate_transaction_id(),
        card_hash: card_hash(rng),
        amount: random_amount(rng, AUTH_AMOUNT_RANGE),
        currency: pick(rng, CURRENCIES),
        country_code: pick(rng, COUNTRIES),
        merchant_id: merchant_id(rng),
        merchant_name: format!("Test Merchant {}", rng.gen_range(1..=100)),
        // Drawn independently; the engine treats them as separate fields.
        merchant_category: pick(rng, MERCHANT_CATEGORIES),
        merchant_category_code: pick(rng, MERCHANT_CATEGORIES),
        card_present: rng.gen_bool(0.5),
        transaction_type: pick(rng, TRANSACTION_TYPES),
        entry_mode: pick(rng, ENTRY_MODES),
        ip_address: format!(
            "192.168.{}.{}",
            rng.gen_range(0..=255),
            rng.gen_range(0..=255)
        ),
        device_id: format!("device_{}", rng.gen_range(1000..=9999)),
        card_network: card_network_for_bin(card_bin),
        card_bin: card_bin.to_string(),
    }
}

pub fn generate_monitoring_request<R: Rng + ?Sized>(rng: &mut R) -> MonitoringRequest {
    MonitoringRequest {
        transaction_id: generate_transaction_id(),
        card_hash: card_hash(rng),
        amount: random_amount(rng, MONITORING_AMOUNT_RANGE),
        currency: pick(rng, CURRENCIES),
        country_code: pick(rng, COUNTRIES),
        merchant_id: merchant_id(rng),
        merchant_category_code: pick(rng, MERCHANT_CATEGORIES),
        decision: pick(rng, DECISIONS),
    }
}

/// AUTH request pinned to one card with a narrower amount band, to trip
/// velocity rules on the engine.
pub fn generate_velocity_burst_request<R: Rng + ?Sized>(rng: &mut R) -> AuthRequest {
    AuthRequest {
        card_hash: VELOCITY_CARD_HASH.to_string(),
        amount: random_amount(rng, VELOCITY_AMOUNT_RANGE),
        ..generate_auth_request(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const SAMPLES: usize = 2_000;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    fn is_cents(amount: f64) -> bool {
        ((amount * 100.0).round() - amount * 100.0).abs() < 1e-6
    }

    #[test]
    fn test_card_network_for_bin() {
        assert_eq!(card_network_for_bin("411111"), CardNetwork::Visa);
        assert_eq!(card_network_for_bin("555555"), CardNetwork::Mastercard);
        assert_eq!(card_network_for_bin("370000"), CardNetwork::Amex);
        assert_eq!(card_network_for_bin("6011"), CardNetwork::Amex);
        assert_eq!(card_network_for_bin(""), CardNetwork::Amex);
    }

    #[test]
    fn test_auth_network_matches_bin_prefix() {
        let mut rng = rng();
        for _ in 0..SAMPLES {
            let req = generate_auth_request(&mut rng);
            let expected = match req.card_bin.chars().next() {
                Some('4') => CardNetwork::Visa,
                Some('5') => CardNetwork::Mastercard,
                _ => CardNetwork::Amex,
            };
            assert_eq!(req.card_network, expected, "bin {}", req.card_bin);
        }
    }

    #[test]
    fn test_auth_fields_come_from_their_pools() {
        let mut rng = rng();
        for _ in 0..SAMPLES {
            let req = generate_auth_request(&mut rng);
            assert!(req.transaction_id.starts_with("txn-"));
            assert_eq!(req.transaction_id.len(), 20);
            assert!(req.transaction_id[4..].chars().all(|c| c.is_ascii_hexdigit()));

            let idx: u32 = req.card_hash["card_hash_".len()..].parse().unwrap();
            assert!(idx < CARD_HASH_POOL_SIZE);
            assert_eq!(req.card_hash.len(), "card_hash_0000".len());

            assert!((10.0..=2000.0).contains(&req.amount));
            assert!(is_cents(req.amount));
            assert!(CURRENCIES.contains(&req.currency.as_str()));
            assert!(COUNTRIES.contains(&req.country_code.as_str()));
            assert!(MERCHANT_CATEGORIES.contains(&req.merchant_category.as_str()));
            assert!(MERCHANT_CATEGORIES.contains(&req.merchant_category_code.as_str()));
            assert!(TRANSACTION_TYPES.contains(&req.transaction_type.as_str()));
            assert!(ENTRY_MODES.contains(&req.entry_mode.as_str()));

            let merchant: u32 = req.merchant_id["merch_".len()..].parse().unwrap();
            assert!((1000..=9999).contains(&merchant));
            let name: u32 = req.merchant_name["Test Merchant ".len()..].parse().unwrap();
            assert!((1..=100).contains(&name));
            let device: u32 = req.device_id["device_".len()..].parse().unwrap();
            assert!((1000..=9999).contains(&device));

            let octets: Vec<u32> = req.ip_address.split('.').map(|o| o.parse().unwrap()).collect();
            assert_eq!(&octets[..2], &[192, 168]);
            assert!(octets[2] <= 255 && octets[3] <= 255);

            let all_bins: Vec<&str> = VISA_BINS
                .iter()
                .chain(MASTERCARD_BINS)
                .chain(AMEX_BINS)
                .copied()
                .collect();
            assert!(all_bins.contains(&req.card_bin.as_str()));
        }
    }

    #[test]
    fn test_every_bin_is_reachable() {
        let mut rng = rng();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..SAMPLES {
            seen.insert(generate_card_bin(&mut rng));
        }
        assert_eq!(seen.len(), VISA_BINS.len() + MASTERCARD_BINS.len() + AMEX_BINS.len());
    }

    #[test]
    fn test_monitoring_fields() {
        let mut rng = rng();
        for _ in 0..SAMPLES {
            let req = generate_monitoring_request(&mut rng);
            assert!((10.0..=500.0).contains(&req.amount));
            assert!(is_cents(req.amount));
            assert!(DECISIONS.contains(&req.decision.as_str()));
            assert!(MERCHANT_CATEGORIES.contains(&req.merchant_category_code.as_str()));
            assert!(req.card_hash.starts_with("card_hash_"));
        }
    }

    #[test]
    fn test_velocity_burst_pins_card_and_amount() {
        let mut rng = rng();
        for _ in 0..SAMPLES {
            let req = generate_velocity_burst_request(&mut rng);
            assert_eq!(req.card_hash, VELOCITY_CARD_HASH);
            assert!((50.0..=200.0).contains(&req.amount));
            assert!(is_cents(req.amount));
            assert_eq!(req.card_network, card_network_for_bin(&req.card_bin));
        }
    }

    #[test]
    fn test_generated_json_shape() {
        let mut rng = rng();

        let auth = PayloadKind::Auth.generate(&mut rng);
        assert!(auth["card_network"].is_string());
        assert!(auth["card_present"].is_boolean());
        assert_eq!(auth.as_object().unwrap().len(), 16);

        let monitoring = PayloadKind::Monitoring.generate(&mut rng);
        assert_eq!(monitoring.as_object().unwrap().len(), 8);
        assert!(monitoring.get("card_network").is_none());

        let burst = PayloadKind::VelocityBurst.generate(&mut rng);
        assert_eq!(burst["card_hash"], VELOCITY_CARD_HASH);
    }
}
