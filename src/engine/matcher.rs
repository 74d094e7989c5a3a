/// Returns the sentinel matched by the first resolved address that equals one.
///
/// Comparison is exact string equality, no CIDR or address normalization.
pub fn match_sentinel<'a>(addresses: &[String], sentinels: &'a [String]) -> Option<&'a str> {
    addresses.iter().find_map(|addr| {
        sentinels
            .iter()
            .find(|sentinel| *sentinel == addr)
            .map(String::as_str)
    })
}
