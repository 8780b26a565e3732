/// Hypermedia `_links` objects attached to responses
use cadence_core::Page;
use serde_json::{json, Map, Value};

/// Mount point of every API route
pub const API_PREFIX: &str = "/api/v1";

/// Absolute path of an API resource, e.g. `resource("/artists/1")`
pub fn resource(path: &str) -> String {
    format!("{API_PREFIX}{path}")
}

/// `{"self": ...}` plus any named relations
pub fn links(self_path: &str, related: &[(&str, String)]) -> Value {
    let mut map = Map::new();
    map.insert("self".to_string(), Value::String(resource(self_path)));
    for (rel, path) in related {
        map.insert((*rel).to_string(), Value::String(resource(path)));
    }
    Value::Object(map)
}

/// `self`/`next`/`prev` for a page of a list endpoint. Absent neighbours are
/// `null`. `filters` are carried over into every link.
pub fn page_links<T>(path: &str, page: &Page<T>, filters: &[(&str, Option<&str>)]) -> Value {
    let link = |number: u32| {
        let mut query = format!("page={number}&limit={}", page.limit);
        for (name, value) in filters {
            if let Some(value) = value {
                query.push('&');
                query.push_str(name);
                query.push('=');
                query.push_str(&encode_component(value));
            }
        }
        format!("{}?{query}", resource(path))
    };

    json!({
        "self": link(page.page),
        "next": page.has_next().then(|| link(page.page + 1)),
        "prev": page.has_prev().then(|| link(page.page - 1)),
    })
}

/// Percent-encode everything outside the RFC 3986 unreserved set
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{paginate, PageParams};

    #[test]
    fn middle_page_has_both_neighbours() {
        let page = paginate((1..=30).collect::<Vec<_>>(), PageParams::new(2, 10).unwrap());
        let links = page_links("/artists", &page, &[]);

        assert_eq!(links["self"], "/api/v1/artists?page=2&limit=10");
        assert_eq!(links["next"], "/api/v1/artists?page=3&limit=10");
        assert_eq!(links["prev"], "/api/v1/artists?page=1&limit=10");
    }

    #[test]
    fn edges_are_null() {
        let page = paginate(vec![1, 2], PageParams::default());
        let links = page_links("/news", &page, &[]);
        assert!(links["next"].is_null());
        assert!(links["prev"].is_null());
    }

    #[test]
    fn filters_are_encoded_into_links() {
        let page = paginate(vec![1], PageParams::default());
        let links = page_links(
            "/music",
            &page,
            &[("genre", Some("Hip-Hop")), ("artist", Some("Sigur Rós")), ("album", None)],
        );
        assert_eq!(
            links["self"],
            "/api/v1/music?page=1&limit=10&genre=Hip-Hop&artist=Sigur%20R%C3%B3s"
        );
    }

    #[test]
    fn entity_links() {
        let links = links("/artists/a1", &[("albums", "/albums".to_string())]);
        assert_eq!(links["self"], "/api/v1/artists/a1");
        assert_eq!(links["albums"], "/api/v1/albums");
    }
}
