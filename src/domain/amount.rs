//! Amount conversions and display formatting.

use rust_decimal::Decimal;

/// Satoshis per XEC.
pub const SATS_PER_XEC: u64 = 100;

/// Highest scale a `Decimal` can carry.
const MAX_SCALE: u32 = 28;

/// Convert satoshis to XEC.
#[must_use]
pub fn sats_to_xec(sats: u64) -> Decimal {
    Decimal::from_i128_with_scale(i128::from(sats), 2)
}

/// Format an XEC amount compactly: `12.34`, `5.5k`, `1.25M`, `2B`.
#[must_use]
pub fn format_xec(sats: u64) -> String {
    let xec = sats_to_xec(sats);
    let thousand = Decimal::from(1_000);
    let million = Decimal::from(1_000_000);
    let billion = Decimal::from(1_000_000_000);

    let (value, suffix) = if xec < thousand {
        (xec, "")
    } else if xec < million {
        (xec / thousand, "k")
    } else if xec < billion {
        (xec / million, "M")
    } else {
        (xec / billion, "B")
    };
    format!("{}{suffix}", value.round_dp(2).normalize())
}

/// Token amount in display units for a token with `decimals` decimal places.
#[must_use]
pub fn token_amount(atoms: u64, decimals: u8) -> Decimal {
    let scale = u32::from(decimals).min(MAX_SCALE);
    Decimal::from_i128_with_scale(i128::from(atoms), scale).normalize()
}

/// Token amount with thousands separators.
#[must_use]
pub fn format_token_amount(atoms: u64, decimals: u8) -> String {
    group_thousands(&token_amount(atoms, decimals).to_string())
}

/// Format a USD price: cents above $1, four significant digits below.
#[must_use]
pub fn format_usd(value: Decimal) -> String {
    if value.abs() >= Decimal::ONE {
        return format!("${}", group_thousands(&format!("{:.2}", value.round_dp(2))));
    }
    let rounded = value.round_sf(4).unwrap_or(value).normalize();
    format!("${rounded}")
}

/// USD value of an XEC amount.
#[must_use]
pub fn sats_to_usd(sats: u64, xec_usd: Decimal) -> Decimal {
    sats_to_xec(sats) * xec_usd
}

/// Insert `,` separators into the integer part of a decimal string.
#[must_use]
pub fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = number
        .strip_prefix('-')
        .map_or(("", number), |rest| ("-", rest));
    let (int_part, frac_part) = unsigned
        .split_once('.')
        .map_or((unsigned, None), |(i, f)| (i, Some(f)));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}
