// 🔤 Number-to-Words (montos en letras)
// "PESOS UN MIL DOSCIENTOS TREINTA Y CUATRO CON 56/100", as written in
// court resolutions.
//
// NOTE: tens 21-29 are joined with "I" ("VEINTEIUN", "VEINTEICINCO"), not the
// dictionary "VEINTIUNO". Legal documents already issued use this phrasing;
// keep it until the registry confirms a change.

const UNITS: [&str; 10] = [
    "", "UN", "DOS", "TRES", "CUATRO", "CINCO", "SEIS", "SIETE", "OCHO", "NUEVE",
];

const TEENS: [&str; 10] = [
    "DIEZ", "ONCE", "DOCE", "TRECE", "CATORCE",
    "QUINCE", "DIECISÉIS", "DIECISIETE", "DIECIOCHO", "DIECINUEVE",
];

const TENS: [&str; 10] = [
    "", "", "VEINTE", "TREINTA", "CUARENTA",
    "CINCUENTA", "SESENTA", "SETENTA", "OCHENTA", "NOVENTA",
];

const HUNDREDS: [&str; 10] = [
    "", "CIENTO", "DOSCIENTOS", "TRESCIENTOS", "CUATROCIENTOS",
    "QUINIENTOS", "SEISCIENTOS", "SETECIENTOS", "OCHOCIENTOS", "NOVECIENTOS",
];

const THOUSAND: u64 = 1_000;
const MILLION: u64 = 1_000_000;
const THOUSAND_MILLION: u64 = 1_000_000_000;

/// Amount in Spanish legal wording.
///
/// Zero is the only value without the cents suffix ("CERO PESOS").
/// Cents are the fractional part times 100, rounded half-to-even; negative
/// amounts are written by magnitude.
///
/// # Examples:
/// ```
/// use tribunal_admin::amount_to_words;
///
/// assert_eq!(amount_to_words(0.0), "CERO PESOS");
/// assert_eq!(amount_to_words(1_000_000.0), "PESOS UN MILLÓN CON 00/100");
/// ```
pub fn amount_to_words(value: f64) -> String {
    if value == 0.0 {
        return "CERO PESOS".to_string();
    }

    let magnitude = value.abs();
    let whole = magnitude.trunc();
    let mut integer = whole as u64;
    let mut cents = ((magnitude - whole) * 100.0).round_ties_even() as u64;
    if cents >= 100 {
        // 0.999 → one more peso, not "CON 100/100"
        integer += 1;
        cents -= 100;
    }

    format!("PESOS {} CON {:02}/100", integer_to_words(integer), cents)
}

/// Whole number in words, grouped by powers of a thousand
pub fn integer_to_words(n: u64) -> String {
    if n == 0 {
        return "CERO".to_string();
    }

    let thousand_millions = n / THOUSAND_MILLION;
    let millions = (n / MILLION) % THOUSAND;
    let thousands = (n / THOUSAND) % THOUSAND;
    let rest = n % THOUSAND;

    let mut parts: Vec<String> = Vec::new();

    if thousand_millions > 0 {
        // "<grupo> MIL" followed by the millions of that scale
        parts.push(format!("{} MIL", integer_to_words(thousand_millions)));
        if millions == 0 {
            parts.push("MILLONES".to_string());
        }
    }
    match millions {
        0 => {}
        1 => parts.push("UN MILLÓN".to_string()),
        _ => parts.push(format!("{} MILLONES", group_to_words(millions))),
    }

    if thousands > 0 {
        parts.push(format!("{} MIL", group_to_words(thousands)));
    }
    if rest > 0 {
        parts.push(group_to_words(rest));
    }

    parts.join(" ")
}

/// 0..=999 in words; 0 is the empty string
fn group_to_words(n: u64) -> String {
    let n = (n % THOUSAND) as usize;

    match n {
        0 => String::new(),
        100 => "CIEN".to_string(),
        1..=9 => UNITS[n].to_string(),
        10..=19 => TEENS[n - 10].to_string(),
        20..=99 => {
            let (tens, units) = (n / 10, n % 10);
            if units == 0 {
                TENS[tens].to_string()
            } else {
                let joiner = if tens > 2 { " Y " } else { "I" };
                format!("{}{}{}", TENS[tens], joiner, UNITS[units])
            }
        }
        _ => {
            let (hundreds, rest) = (n / 100, n % 100);
            if rest == 0 {
                HUNDREDS[hundreds].to_string()
            } else {
                format!("{} {}", HUNDREDS[hundreds], group_to_words(rest as u64))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_has_no_cents_suffix() {
        assert_eq!(amount_to_words(0.0), "CERO PESOS");
        assert_eq!(amount_to_words(-0.0), "CERO PESOS");
    }

    #[test]
    fn test_documented_examples() {
        assert_eq!(
            amount_to_words(1234.56),
            "PESOS UN MIL DOSCIENTOS TREINTA Y CUATRO CON 56/100"
        );
        assert_eq!(amount_to_words(1_000_000.0), "PESOS UN MILLÓN CON 00/100");

        let words = amount_to_words(1234.56);
        assert!(words.starts_with("PESOS "));
        assert!(words.ends_with("CON 56/100"));
    }

    #[test]
    fn test_hundreds() {
        assert_eq!(integer_to_words(100), "CIEN");
        assert_eq!(integer_to_words(101), "CIENTO UN");
        assert_eq!(integer_to_words(199), "CIENTO NOVENTA Y NUEVE");
        assert_eq!(integer_to_words(500), "QUINIENTOS");
        assert_eq!(integer_to_words(999), "NOVECIENTOS NOVENTA Y NUEVE");
    }

    #[test]
    fn test_tens_connectors() {
        assert_eq!(integer_to_words(15), "QUINCE");
        assert_eq!(integer_to_words(16), "DIECISÉIS");
        assert_eq!(integer_to_words(20), "VEINTE");
        assert_eq!(integer_to_words(21), "VEINTEIUN");
        assert_eq!(integer_to_words(25), "VEINTEICINCO");
        assert_eq!(integer_to_words(31), "TREINTA Y UN");
        assert_eq!(integer_to_words(90), "NOVENTA");
    }

    #[test]
    fn test_millions() {
        assert_eq!(integer_to_words(2_500_000), "DOS MILLONES QUINIENTOS MIL");
        assert_eq!(integer_to_words(1_000_001), "UN MILLÓN UN");
        assert_eq!(
            integer_to_words(12_345_678),
            "DOCE MILLONES TRESCIENTOS CUARENTA Y CINCO MIL SEISCIENTOS SETENTA Y OCHO"
        );
    }

    #[test]
    fn test_thousand_millions() {
        assert_eq!(integer_to_words(1_000_000_000), "UN MIL MILLONES");
        assert_eq!(integer_to_words(2_300_000_000), "DOS MIL TRESCIENTOS MILLONES");
        assert_eq!(
            integer_to_words(1_000_500_000),
            "UN MIL MILLONES QUINIENTOS MIL"
        );
    }

    #[test]
    fn test_thousand_millions_with_millions_group() {
        assert_eq!(
            amount_to_words(1_001_000_000.0),
            "PESOS UN MIL UN MILLÓN CON 00/100"
        );
        assert_eq!(
            integer_to_words(2_001_500_000),
            "DOS MIL UN MILLÓN QUINIENTOS MIL"
        );
        assert_eq!(
            integer_to_words(5_250_000_001),
            "CINCO MIL DOSCIENTOS CINCUENTA MILLONES UN"
        );
    }

    #[test]
    fn test_cents() {
        assert_eq!(amount_to_words(10.05), "PESOS DIEZ CON 05/100");
        assert_eq!(amount_to_words(0.5), "PESOS CERO CON 50/100");
        assert_eq!(amount_to_words(0.999), "PESOS UN CON 00/100");
    }

    #[test]
    fn test_negative_amounts_use_magnitude() {
        assert_eq!(amount_to_words(-1234.56), amount_to_words(1234.56));
    }
}
