//! Draft presets carried in a shared link's query string.

/// Key/value pairs in the order they appear in the link.
pub type QueryMap = Vec<(String, String)>;

/// Fields a shared link may preset. `None` means the key was absent, which is
/// different from `Some("")`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPreset {
    pub to: Option<String>,
    pub data: Option<String>,
    pub unit: Option<String>,
    pub value: Option<String>,
    pub gas_limit: Option<String>,
    pub read_only: bool,
}

impl QueryPreset {
    /// True when no recognised key was present.
    pub fn is_empty(&self) -> bool {
        self.to.is_none()
            && self.data.is_none()
            && self.unit.is_none()
            && self.value.is_none()
            && self.gas_limit.is_none()
            && !self.read_only
    }
}

/// Case-insensitive key lookup. The first matching key in query order wins.
pub fn get_param<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v.as_str())
}

pub fn parse(query: &[(String, String)]) -> QueryPreset {
    let owned = |key: &str| get_param(query, key).map(str::to_string);

    QueryPreset {
        to: owned("to"),
        data: owned("data"),
        unit: owned("tokenSymbol"),
        value: owned("value"),
        gas_limit: owned("gas").or_else(|| owned("limit")),
        read_only: get_param(query, "readOnly").is_some(),
    }
}

/// Parses `?a=1&b=2` (leading `?` optional) with form-urlencoded decoding.
/// Pairs keep their order, duplicates included.
pub fn parse_query_string(query: &str) -> QueryMap {
    let query = query.strip_prefix('?').unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> QueryMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let preset = parse(&query(&[
            ("TO", "0xabc"),
            ("TokenSymbol", "DAI"),
            ("VALUE", "2"),
        ]));
        assert_eq!(preset.to.as_deref(), Some("0xabc"));
        assert_eq!(preset.unit.as_deref(), Some("DAI"));
        assert_eq!(preset.value.as_deref(), Some("2"));
    }

    #[test]
    fn test_gas_falls_back_to_limit() {
        let preset = parse(&query(&[("limit", "60000")]));
        assert_eq!(preset.gas_limit.as_deref(), Some("60000"));

        let preset = parse(&query(&[("gas", "50000"), ("limit", "60000")]));
        assert_eq!(preset.gas_limit.as_deref(), Some("50000"));
    }

    #[test]
    fn test_read_only_is_presence_only() {
        assert!(parse(&query(&[("readOnly", "")])).read_only);
        assert!(parse(&query(&[("readonly", "false")])).read_only);
        assert!(!parse(&query(&[("to", "0xabc")])).read_only);
    }

    #[test]
    fn test_absent_keys_are_omitted() {
        let preset = parse(&query(&[("data", ""), ("unrelated", "x")]));
        assert_eq!(preset.data.as_deref(), Some(""));
        assert_eq!(preset.to, None);
        assert_eq!(preset.value, None);
        assert!(!preset.is_empty());

        assert!(parse(&query(&[("unrelated", "x")])).is_empty());
    }

    #[test]
    fn test_parse_query_string_decodes_values() {
        let map = parse_query_string("?to=0xabc&value=1.5&tokenSymbol=ether&note=a%20b");
        assert_eq!(get_param(&map, "to"), Some("0xabc"));
        assert_eq!(get_param(&map, "value"), Some("1.5"));
        assert_eq!(get_param(&map, "note"), Some("a b"));
        assert_eq!(parse_query_string("").len(), 0);
    }

    #[test]
    fn test_first_key_in_query_order_wins() {
        let map = parse_query_string("to=0xaaa&TO=0xbbb&To=0xccc");
        assert_eq!(map.len(), 3);
        assert_eq!(parse(&map).to.as_deref(), Some("0xaaa"));

        let map = parse_query_string("TO=0xbbb&to=0xaaa");
        assert_eq!(parse(&map).to.as_deref(), Some("0xbbb"));
    }
}
