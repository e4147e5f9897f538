//! Immutable currency code → symbol lookup.

const SYMBOLS: &[(&str, &str)] = &[
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("UAH", "₴"),
    ("PLN", "zł"),
    ("CZK", "Kč"),
    ("CHF", "Fr"),
    ("JPY", "¥"),
    ("CNY", "¥"),
    ("CAD", "C$"),
    ("AUD", "A$"),
    ("NZD", "NZ$"),
    ("SEK", "kr"),
    ("NOK", "kr"),
    ("DKK", "kr"),
    ("INR", "₹"),
    ("BRL", "R$"),
    ("MXN", "$"),
    ("ZAR", "R"),
    ("KRW", "₩"),
    ("SGD", "S$"),
    ("HKD", "HK$"),
    ("TRY", "₺"),
    ("ILS", "₪"),
    ("THB", "฿"),
    ("PHP", "₱"),
    ("IDR", "Rp"),
    ("MYR", "RM"),
    ("VND", "₫"),
    ("BTC", "₿"),
    ("ETH", "Ξ"),
];

/// Symbol for an ISO currency code. Unknown codes render as the code itself.
pub fn symbol(code: &str) -> &str {
    SYMBOLS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, s)| *s)
        .unwrap_or(code)
}

pub fn is_supported(code: &str) -> bool {
    SYMBOLS.iter().any(|(c, _)| c.eq_ignore_ascii_case(code))
}
