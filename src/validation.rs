use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

pub const PHONE_FORMAT_HINT: &str = "Use +1234567890 or 123-456-7890.";

/// `+` and 7-15 digits, or `NNN-NNN-NNNN`.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+\d{7,15}|\d{3}-\d{3}-\d{4})$").expect("phone regex compiles"));

static EMAIL_LOCAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*$")
        .expect("email local-part regex compiles")
});

static EMAIL_DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$")
        .expect("email domain regex compiles")
});

const EMAIL_MAX_LEN: usize = 254;
const EMAIL_LOCAL_MAX_LEN: usize = 64;

pub const PRICE_SCALE: u32 = 2;

/// Smallest storable price, one cent.
pub fn min_price() -> Decimal {
    Decimal::new(1, PRICE_SCALE)
}

pub fn is_valid_email(email: &str) -> bool {
    if email.len() > EMAIL_MAX_LEN {
        return false;
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    local.len() <= EMAIL_LOCAL_MAX_LEN && EMAIL_LOCAL_RE.is_match(local) && EMAIL_DOMAIN_RE.is_match(domain)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Converts a client-supplied float to a two-place decimal.
///
/// Returns `None` for NaN, infinities and magnitudes a `Decimal` cannot hold.
pub fn price_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::try_from(value).ok().map(|d| d.round_dp(PRICE_SCALE))
}

pub fn is_valid_price(price: Decimal) -> bool {
    price >= min_price()
}
