use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO currency code of an account.
///
/// Balances are stored as an `i64` number of **minor units**; `minor_units()`
/// tells how many decimal digits separate major from minor units
/// (e.g. `10.50 USD` ⇄ `1050`). Transfers never convert between currencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Cad,
    Eur,
    Gbp,
    Usd,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Cad, Currency::Eur, Currency::Gbp, Currency::Usd];

    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Cad => "CAD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Usd => "USD",
        }
    }

    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Cad | Currency::Eur | Currency::Gbp | Currency::Usd => 2,
        }
    }

    /// Render an amount of minor units in major units, e.g. `-1050` as
    /// `-10.50 USD`.
    #[must_use]
    pub fn format_amount(self, minor: i64) -> String {
        let digits = usize::from(self.minor_units());
        let sign = if minor < 0 { "-" } else { "" };
        let abs = minor.unsigned_abs();
        if digits == 0 {
            return format!("{sign}{abs} {self}");
        }
        let scale = 10u64.pow(u32::from(self.minor_units()));
        format!(
            "{sign}{}.{:0digits$} {self}",
            abs / scale,
            abs % scale
        )
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CAD" => Ok(Currency::Cad),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "USD" => Ok(Currency::Usd),
            other => Err(EngineError::InvalidInput(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_codes_case_insensitively() {
        assert_eq!(Currency::try_from("usd").unwrap(), Currency::Usd);
        assert_eq!(Currency::try_from(" GBP ").unwrap(), Currency::Gbp);
        for currency in Currency::ALL {
            assert_eq!(Currency::try_from(currency.code()).unwrap(), currency);
        }
    }

    #[test]
    fn formats_minor_units_as_major() {
        assert_eq!(Currency::Usd.format_amount(1050), "10.50 USD");
        assert_eq!(Currency::Eur.format_amount(-7), "-0.07 EUR");
        assert_eq!(Currency::Gbp.format_amount(0), "0.00 GBP");
        assert_eq!(Currency::Cad.format_amount(i64::MIN), "-92233720368547758.08 CAD");
    }

    #[test]
    fn rejects_unsupported_code() {
        assert_eq!(
            Currency::try_from("PHP").unwrap_err(),
            EngineError::InvalidInput("unsupported currency: PHP".to_string())
        );
    }
}
