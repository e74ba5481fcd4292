//! Fragment parsing: the navigation surface is a string of the form
//! `name?key=value&key=value`, mirroring a location hash.

/// The route every empty or missing fragment normalizes to.
pub const HOME: &str = "home";

/// Ordered query parameters parsed from a fragment.
///
/// Keys are not required to be unique; lookups resolve last-wins, matching
/// how repeated query keys behave in a URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Look up a parameter value. The last occurrence of a repeated key wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn push(&mut self, key: String, value: String) {
        self.0.push((key, value));
    }
}

/// A parsed route: non-empty name plus query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub name: String,
    pub params: Params,
}

/// Parse a fragment into a route.
///
/// A leading `#` is tolerated. An empty fragment resolves to the home route.
/// Unknown route names still parse; the render step owns the "not found"
/// outcome.
pub fn resolve(fragment: &str) -> Route {
    let fragment = fragment.trim().trim_start_matches('#');

    let (name, query) = match fragment.split_once('?') {
        Some((name, query)) => (name, Some(query)),
        None => (fragment, None),
    };

    let name = if name.is_empty() {
        String::from(HOME)
    } else {
        name.to_string()
    };

    let mut params = Params::new();
    if let Some(query) = query {
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params.push(decode(key), decode(value));
        }
    }

    Route { name, params }
}

/// Build a fragment string from a route name and parameter pairs.
pub fn fragment(name: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return name.to_string();
    }

    let query: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect();

    format!("{}?{}", name, query.join("&"))
}

/// Rebuild a fragment with one parameter set to a new value.
///
/// An existing occurrence is replaced in place; otherwise the pair is
/// appended. Used by views that express form state as route parameters.
pub fn with_param(fragment_str: &str, key: &str, value: &str) -> String {
    let route = resolve(fragment_str);

    let mut pairs: Vec<(String, String)> = route
        .params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    match pairs.iter_mut().find(|(k, _)| k == key) {
        Some(pair) => pair.1 = value.to_string(),
        None => pairs.push((key.to_string(), value.to_string())),
    }

    let borrowed: Vec<(&str, &str)> = pairs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    fragment(&route.name, &borrowed)
}

fn decode(text: &str) -> String {
    match urlencoding::decode(text) {
        Ok(decoded) => decoded.into_owned(),
        // Invalid percent sequences fall back to the raw text.
        Err(_) => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fragment_is_home() {
        assert_eq!(resolve("").name, HOME);
        assert_eq!(resolve("#").name, HOME);
        assert!(resolve("").params.is_empty());
    }

    #[test]
    fn test_name_is_never_empty() {
        for fragment in ["", "#", "?a=1", "songs", "#songs?x=y"] {
            assert!(!resolve(fragment).name.is_empty(), "fragment: {fragment:?}");
        }
    }

    #[test]
    fn test_plain_route() {
        let route = resolve("songs");
        assert_eq!(route.name, "songs");
        assert!(route.params.is_empty());
    }

    #[test]
    fn test_params_parse() {
        let route = resolve("view?a=1&b=2");
        assert_eq!(route.params.get("a"), Some("1"));
        assert_eq!(route.params.get("b"), Some("2"));
        assert_eq!(route.params.get("c"), None);
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let route = resolve("view?a=1&a=2");
        assert_eq!(route.params.get("a"), Some("2"));
    }

    #[test]
    fn test_sermon_player_scenario() {
        let route = resolve("#sermon-player?slug=abc&title=Grace");
        assert_eq!(route.name, "sermon-player");
        assert_eq!(route.params.get("slug"), Some("abc"));
        assert_eq!(route.params.get("title"), Some("Grace"));
    }

    #[test]
    fn test_percent_decoding() {
        let route = resolve("song-player?title=Amazing%20Grace");
        assert_eq!(route.params.get("title"), Some("Amazing Grace"));
    }

    #[test]
    fn test_fragment_round_trip() {
        let built = fragment("song-player", &[("title", "It Is Well & More")]);
        let route = resolve(&built);
        assert_eq!(route.name, "song-player");
        assert_eq!(route.params.get("title"), Some("It Is Well & More"));
    }

    #[test]
    fn test_with_param_replaces() {
        let updated = with_param("find-sermons?title=grace", "title", "hope");
        assert_eq!(resolve(&updated).params.get("title"), Some("hope"));
    }

    #[test]
    fn test_with_param_appends() {
        let updated = with_param("find-sermons?title=grace", "speaker", "J Smith");
        let route = resolve(&updated);
        assert_eq!(route.params.get("title"), Some("grace"));
        assert_eq!(route.params.get("speaker"), Some("J Smith"));
    }

    #[test]
    fn test_unknown_route_still_parses() {
        let route = resolve("no-such-view?x=1");
        assert_eq!(route.name, "no-such-view");
        assert_eq!(route.params.get("x"), Some("1"));
    }
}
