//! Pure numeric helpers: float classification, plural categories and
//! octal-digit decoding.

/// True when `n` is neither infinite nor NaN.
pub fn finite(n: f64) -> bool {
    n.is_finite()
}

/// Plural-form category of `abs(n)` for Russian nouns.
///
/// * `0`: last digit 0 or 5-9, or last two digits 5-19 ("томатов")
/// * `1`: last digit 1 ("томат")
/// * `2`: everything else, i.e. last digit 2-4 outside 12-14 ("томата")
pub fn intcase(n: i64) -> u8 {
    let num = n.unsigned_abs();
    let mod10 = num % 10;
    let mod100 = num % 100;

    if mod10 == 0 || (5..=9).contains(&mod10) || (5..=19).contains(&mod100) {
        0
    } else if mod10 == 1 {
        1
    } else {
        2
    }
}

/// Reinterpret the decimal digits of `octal` as octal digits.
///
/// `755` becomes `0o755` (493). Digits are consumed least significant first
/// with place value `8^i`; no validation is done, so digits 8 and 9 simply
/// contribute `8 * 8^i` and `9 * 8^i`. Negative input yields the negated
/// result of its absolute value.
pub fn oct2dec(octal: i64) -> i64 {
    let mut octal = octal;
    let mut decimal = 0i64;
    let mut place = 1i64;

    while octal != 0 {
        decimal += (octal % 10) * place;
        octal /= 10;
        place = place.saturating_mul(8);
    }

    decimal
}
