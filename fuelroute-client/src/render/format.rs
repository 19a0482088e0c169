///! Display formatting for money, distance and fuel quantities

/// US dollar amount with thousands separators, e.g. `$1,234.56`.
pub fn format_usd(amount: f64) -> String {
    let cents = format!("{:.2}", amount.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((&cents, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac)
}

pub fn format_miles(miles: f64) -> String {
    format!("{:.1} mi", miles)
}

pub fn format_gallons(gallons: f64) -> String {
    format!("{:.1} gal", gallons)
}

/// Per-gallon station price, e.g. `$3.100/gal`.
pub fn format_price_per_gallon(price: f64) -> String {
    format!("${:.3}/gal", price)
}
