/// Ordered query parameters of one AWIS call.
///
/// The order given here is kept when the query is handed to the signer;
/// the signer sorts its own copy for the canonical request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    /// Start a query for `action`, e.g. `UrlInfo`.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            params: vec![("Action".to_string(), action.into())],
        }
    }

    /// Append a parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// `UrlInfo` for `url` with the given response groups, e.g. `Rank,LinksInCount`.
    pub fn url_info(url: &str, response_group: &str) -> Self {
        Self::new("UrlInfo")
            .param("ResponseGroup", response_group)
            .param("Url", url)
    }

    /// `TrafficHistory` for `url`; `range` is the number of days and `start`
    /// is `YYYYMMDD`.
    pub fn traffic_history(url: &str, range: u32, start: &str) -> Self {
        Self::new("TrafficHistory")
            .param("Range", range.to_string())
            .param("ResponseGroup", "History")
            .param("Start", start)
            .param("Url", url)
    }

    /// `CategoryBrowse` for a category path such as `Top/Computers/Software`.
    pub fn category_browse(path: &str, response_group: &str) -> Self {
        Self::new("CategoryBrowse")
            .param("Descriptions", "True")
            .param("Path", path)
            .param("ResponseGroup", response_group)
    }

    /// `CategoryListings` for a category path.
    pub fn category_listings(path: &str) -> Self {
        Self::new("CategoryListings")
            .param("Path", path)
            .param("ResponseGroup", "Listings")
    }

    /// `SitesLinkingIn` for `url`, returning `count` sites from offset `start`.
    pub fn sites_linking_in(url: &str, count: u32, start: u32) -> Self {
        Self::new("SitesLinkingIn")
            .param("Count", count.to_string())
            .param("ResponseGroup", "SitesLinkingIn")
            .param("Start", start.to_string())
            .param("Url", url)
    }

    /// Parameters in insertion order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Value of the first parameter named `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl<K, V> FromIterator<(K, V)> for Query
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<Vec<(String, String)>> for Query {
    fn from(params: Vec<(String, String)>) -> Self {
        Self { params }
    }
}
