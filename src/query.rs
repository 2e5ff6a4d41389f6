use serde_json::json;

use crate::types::Repository;

/// The first page (100 threads, newest first) with title, body, and the
/// accepted answer's body. Owner and name are passed as GraphQL variables so
/// they never need escaping into the document itself.
const DISCUSSIONS_QUERY: &str = r#"
query($owner: String!, $name: String!) {
    repository(owner: $owner, name: $name) {
        discussions(first: 100, orderBy: {field: CREATED_AT, direction: DESC}) {
            nodes {
                title
                bodyText
                answer {
                    bodyText
                }
            }
        }
    }
}"#;

pub fn request_body(repo: &Repository) -> serde_json::Value {
    json!({
        "query": DISCUSSIONS_QUERY,
        "variables": {
            "owner": repo.owner,
            "name": repo.name,
        }
    })
}
