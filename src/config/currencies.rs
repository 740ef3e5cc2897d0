/// Currencies the processor accepts for card payments.
pub const SUPPORTED_CURRENCIES: &[&str] = &[
    "AED", "ARS", "AUD", "AZN", "BAM", "BGN", "BRL", "BYR", "CAD", "CHF", "CLP", "CNY", "CZK",
    "DKK", "DOP", "EGP", "EUR", "GBP", "HKD", "HRK", "HUF", "ILS", "INR", "ISK", "JPY", "LTL",
    "MAD", "MXN", "MYR", "NOK", "NZD", "PHP", "PLN", "RON", "RSD", "RUB", "SAR", "SEK", "SGD",
    "THB", "TND", "TRY", "TWD", "UAH", "USD", "VND", "ZAR",
];

pub fn is_supported(currency: &str) -> bool {
    SUPPORTED_CURRENCIES
        .iter()
        .any(|code| code.eq_ignore_ascii_case(currency))
}
