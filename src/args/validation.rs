/// # Errors
///
/// Will return `Err` if the value is not a month number
pub fn check_month(value: &str) -> Result<u32, String> {
    match value.trim().parse::<u32>() {
        Ok(month) if (1..=12).contains(&month) => Ok(month),
        _ => Err(format!("'{value}' is not a month between 1 and 12.")),
    }
}

/// # Errors
///
/// Will return `Err` if the value does not parse as an absolute url
pub fn check_url(value: &str) -> Result<String, String> {
    match reqwest::Url::parse(value.trim()) {
        Ok(url) if url.has_host() => Ok(value.trim().to_string()),
        Ok(_) => Err(format!("'{value}' has no host.")),
        Err(e) => Err(format!("'{value}' is not a valid url: {e}")),
    }
}
