//! IPFS URI rewriting.

/// Public gateway used when none is configured.
pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io";

const IPFS_SCHEME: &str = "ipfs://";

/// Rewrite `ipfs://<path>` to `<gateway>/ipfs/<path>`.
///
/// Any other URI (including already-rewritten ones) is returned unchanged,
/// so applying this twice is the same as applying it once.
pub fn resolve_ipfs_uri(uri: &str, gateway: &str) -> String {
    match uri.strip_prefix(IPFS_SCHEME) {
        Some(path) => {
            let path = path.strip_prefix("ipfs/").unwrap_or(path);
            format!("{}/ipfs/{}", gateway.trim_end_matches('/'), path)
        }
        None => uri.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rewrite_ipfs() {
        assert_eq!(
            resolve_ipfs_uri("ipfs://QmHash/1.json", DEFAULT_IPFS_GATEWAY),
            "https://ipfs.io/ipfs/QmHash/1.json"
        );
    }

    #[test]
    fn test_rewrite_with_trailing_slash_gateway() {
        assert_eq!(
            resolve_ipfs_uri("ipfs://cid", "https://gw.example/"),
            "https://gw.example/ipfs/cid"
        );
    }

    #[test]
    fn test_rewrite_strips_redundant_ipfs_segment() {
        assert_eq!(
            resolve_ipfs_uri("ipfs://ipfs/cid/2.png", DEFAULT_IPFS_GATEWAY),
            "https://ipfs.io/ipfs/cid/2.png"
        );
    }

    #[test]
    fn test_http_is_untouched() {
        let url = "https://example.com/meta/1.json";
        assert_eq!(resolve_ipfs_uri(url, DEFAULT_IPFS_GATEWAY), url);
        assert_eq!(resolve_ipfs_uri("", DEFAULT_IPFS_GATEWAY), "");
    }

    proptest! {
        #[test]
        fn prop_rewrite_idempotent(cid in "[A-Za-z0-9]{1,46}", file in "[a-z0-9]{0,8}(\\.json)?") {
            let uri = format!("ipfs://{cid}/{file}");
            let once = resolve_ipfs_uri(&uri, DEFAULT_IPFS_GATEWAY);
            let twice = resolve_ipfs_uri(&once, DEFAULT_IPFS_GATEWAY);
            prop_assert_eq!(&once, &twice);
            prop_assert!(!once.starts_with(IPFS_SCHEME));
        }
    }
}
