//! Input validators applied before any backend call.
//!
//! Every validator is total: malformed input yields [`Invalid`], never a
//! panic. Callers attach the offending parameter name through
//! [`ValidationErrors::check`] so one response can report every bad field.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Fiat symbols quoted when the caller names none.
pub const DEFAULT_FIAT: &str = "USD,EUR,GBP";

/// Largest integer a JSON (IEEE-754 double) client can represent exactly.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

const ADDRESS_HEX_LEN: usize = 40;

/// Marker for a missing or malformed input value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid input")]
pub struct Invalid;

/// Canonical `0x`-prefixed, 40-hex-digit account or contract address.
///
/// The digits keep the caller's case so checksummed addresses survive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Returns the canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strictly positive chain identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ChainId(u64);

impl ChainId {
    /// Wraps `value` if it is in `1..=MAX_SAFE_INTEGER`.
    #[must_use]
    pub const fn new(value: u64) -> Option<Self> {
        if value == 0 || value > MAX_SAFE_INTEGER {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Returns the numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `0x`-prefixed, even-length contract call data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HexPayload(String);

impl HexPayload {
    /// Returns the canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for HexPayload {
    fn default() -> Self {
        Self("0x".to_owned())
    }
}

/// Comma-separated list of upper-case fiat symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiatList(String);

impl FiatList {
    /// Returns the list as sent to the price backend, e.g. `USD,EUR`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FiatList {
    fn default() -> Self {
        Self(DEFAULT_FIAT.to_owned())
    }
}

fn strip_hex_prefix(raw: &str) -> &str {
    raw.strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw)
}

/// Trims `raw` and accepts exactly 40 hex digits with an optional `0x` prefix.
///
/// # Errors
///
/// Returns [`Invalid`] for absent, empty, wrong-length, or non-hex input.
pub fn sanitize_address(raw: Option<&str>) -> Result<Address, Invalid> {
    let digits = strip_hex_prefix(raw.ok_or(Invalid)?.trim());
    if digits.len() != ADDRESS_HEX_LEN || hex::decode(digits).is_err() {
        return Err(Invalid);
    }
    Ok(Address(format!("0x{digits}")))
}

/// Parses a decimal chain id, tolerating surrounding whitespace.
///
/// # Errors
///
/// Returns [`Invalid`] unless the trimmed input is all ASCII digits and the
/// value lies in `1..=MAX_SAFE_INTEGER`.
pub fn parse_chain_id(raw: Option<&str>) -> Result<ChainId, Invalid> {
    let digits = raw.ok_or(Invalid)?.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Invalid);
    }
    let value: u64 = digits.parse().map_err(|_| Invalid)?;
    ChainId::new(value).ok_or(Invalid)
}

/// Normalises optional call data, defaulting to `0x`.
///
/// Odd-length input is left-padded with a single `0`.
///
/// # Errors
///
/// Returns [`Invalid`] if a present value contains non-hex characters.
pub fn sanitize_hex_payload(raw: Option<&str>) -> Result<HexPayload, Invalid> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(HexPayload::default());
    };
    let digits = strip_hex_prefix(raw);
    let digits = if digits.len() % 2 == 1 {
        format!("0{digits}")
    } else {
        digits.to_owned()
    };
    hex::decode(&digits).map_err(|_| Invalid)?;
    Ok(HexPayload(format!("0x{digits}")))
}

/// Parses an optional comma-separated fiat list, defaulting to [`DEFAULT_FIAT`].
///
/// # Errors
///
/// Returns [`Invalid`] if any symbol is empty or not ASCII alphanumeric.
pub fn parse_fiat_list(raw: Option<&str>) -> Result<FiatList, Invalid> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(FiatList::default());
    };
    let symbols = raw
        .split(',')
        .map(str::trim)
        .map(|symbol| {
            if !symbol.is_empty() && symbol.bytes().all(|b| b.is_ascii_alphanumeric()) {
                Ok(symbol.to_ascii_uppercase())
            } else {
                Err(Invalid)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(FiatList(symbols.join(",")))
}

/// Ordered set of request parameters that failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<&'static str>);

impl ValidationErrors {
    /// A single failed parameter.
    #[must_use]
    pub fn single(param: &'static str) -> Self {
        Self(vec![param])
    }

    /// Records `param` as failed if `outcome` is an error.
    pub fn check<T>(&mut self, param: &'static str, outcome: Result<T, Invalid>) -> Option<T> {
        if outcome.is_err() {
            self.0.push(param);
        }
        outcome.ok()
    }

    /// Names of the failed parameters, in the order they were checked.
    #[must_use]
    pub fn params(&self) -> &[&'static str] {
        &self.0
    }

    /// Whether no parameter has failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, param) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "Missing or invalid {param} parameter")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const ADDRESS: &str = "0xABCDEF0123456789ABCDEF0123456789ABCDEF01";

    #[test]
    fn address_keeps_case_and_normalises_prefix() {
        let bare = sanitize_address(Some("ABCDEF0123456789ABCDEF0123456789ABCDEF01")).unwrap();
        let upper_prefix =
            sanitize_address(Some("0XABCDEF0123456789ABCDEF0123456789ABCDEF01")).unwrap();
        let padded = sanitize_address(Some(&format!("  {ADDRESS}\n"))).unwrap();
        assert_eq!(bare.as_str(), ADDRESS);
        assert_eq!(upper_prefix.as_str(), ADDRESS);
        assert_eq!(padded.as_str(), ADDRESS);
    }

    #[test]
    fn address_rejects_garbage() {
        for raw in [
            "",
            "0x",
            "not-hex",
            "0xABCDEF0123456789ABCDEF0123456789ABCDEF0",
            "0xABCDEF0123456789ABCDEF0123456789ABCDEF012",
            "0xGBCDEF0123456789ABCDEF0123456789ABCDEF01",
            "0x0xABCDEF0123456789ABCDEF0123456789ABCDEF",
        ] {
            assert_eq!(sanitize_address(Some(raw)), Err(Invalid), "{raw:?}");
        }
        assert_eq!(sanitize_address(None), Err(Invalid));
    }

    #[test]
    fn chain_id_accepts_positive_integers() {
        assert_eq!(parse_chain_id(Some("1")).unwrap().get(), 1);
        assert_eq!(parse_chain_id(Some(" 100 ")).unwrap().get(), 100);
        assert_eq!(parse_chain_id(Some("007")).unwrap().get(), 7);
        assert_eq!(
            parse_chain_id(Some("9007199254740991")).unwrap().get(),
            MAX_SAFE_INTEGER
        );
    }

    #[test]
    fn chain_id_rejects_everything_else() {
        for raw in [
            "", "   ", "0", "-1", "+1", "1.0", "1e3", "abc", "0x1", "1 2",
            "9007199254740992", "99999999999999999999999",
        ] {
            assert_eq!(parse_chain_id(Some(raw)), Err(Invalid), "{raw:?}");
        }
        assert_eq!(parse_chain_id(None), Err(Invalid));
    }

    #[test]
    fn hex_payload_defaults_and_pads() {
        assert_eq!(sanitize_hex_payload(None).unwrap().as_str(), "0x");
        assert_eq!(sanitize_hex_payload(Some("")).unwrap().as_str(), "0x");
        assert_eq!(sanitize_hex_payload(Some("0x")).unwrap().as_str(), "0x");
        assert_eq!(sanitize_hex_payload(Some("abc")).unwrap().as_str(), "0x0abc");
        assert_eq!(
            sanitize_hex_payload(Some("0x70a08231")).unwrap().as_str(),
            "0x70a08231"
        );
        assert_eq!(sanitize_hex_payload(Some("0xzz")), Err(Invalid));
    }

    #[test]
    fn fiat_list_defaults_and_normalises() {
        assert_eq!(parse_fiat_list(None).unwrap().as_str(), DEFAULT_FIAT);
        assert_eq!(parse_fiat_list(Some("  ")).unwrap().as_str(), DEFAULT_FIAT);
        assert_eq!(parse_fiat_list(Some("usd, jpy")).unwrap().as_str(), "USD,JPY");
        assert_eq!(parse_fiat_list(Some("USD,,EUR")), Err(Invalid));
        assert_eq!(parse_fiat_list(Some("USD&x=1")), Err(Invalid));
    }

    #[test]
    fn validation_errors_report_every_field_in_order() {
        let mut errors = ValidationErrors::default();
        assert_eq!(errors.check("address", sanitize_address(Some("nope"))), None);
        assert_eq!(errors.check("chainId", parse_chain_id(Some("5"))).map(ChainId::get), Some(5));
        assert_eq!(errors.check("chainId", parse_chain_id(Some("0"))), None);
        assert_eq!(errors.params(), &["address", "chainId"]);
        assert_eq!(
            errors.to_string(),
            "Missing or invalid address parameter; Missing or invalid chainId parameter"
        );
    }

    proptest! {
        #[test]
        fn address_is_prefix_insensitive_and_idempotent(digits in "[0-9a-fA-F]{40}") {
            let bare = sanitize_address(Some(&digits)).unwrap();
            let prefixed = sanitize_address(Some(&format!("0x{digits}"))).unwrap();
            prop_assert_eq!(&bare, &prefixed);
            prop_assert_eq!(sanitize_address(Some(bare.as_str())).unwrap(), bare.clone());
            prop_assert_eq!(bare.as_str().len(), 42);
        }

        #[test]
        fn address_rejects_wrong_lengths(digits in "[0-9a-f]{0,80}") {
            prop_assume!(digits.len() != 40);
            prop_assert_eq!(sanitize_address(Some(&digits)), Err(Invalid));
            prop_assert_eq!(sanitize_address(Some(&format!("0x{digits}"))), Err(Invalid));
        }

        #[test]
        fn address_rejects_non_hex(prefix in "[0-9a-f]{0,39}", bad in "[g-zG-Z_ -]") {
            let mut raw = prefix.clone();
            raw.push_str(&bad);
            while raw.len() < 40 {
                raw.push('a');
            }
            prop_assert_eq!(sanitize_address(Some(&raw)), Err(Invalid));
        }

        #[test]
        fn chain_id_round_trips_positive_integers(value in 1..=MAX_SAFE_INTEGER) {
            prop_assert_eq!(parse_chain_id(Some(&value.to_string())).unwrap().get(), value);
        }

        #[test]
        fn chain_id_rejects_non_positive(value in i64::MIN..=0) {
            prop_assert_eq!(parse_chain_id(Some(&value.to_string())), Err(Invalid));
        }

        #[test]
        fn chain_id_rejects_non_numeric(raw in "[a-zA-Z.,_-]{1,12}") {
            prop_assert_eq!(parse_chain_id(Some(&raw)), Err(Invalid));
        }
    }
}
