//! Remote Item Repository
//!
//! Items live in one hosted table exposed through a PostgREST-style REST
//! endpoint (`<base_url>/rest/v1/<table>`). Every request carries an
//! `owner_id=eq.<user>` filter so a session only ever sees its own rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::traits::ItemRepository;
use crate::domain::{Category, DomainError, DomainResult, ItemId, Session, ShoppingItem, UserId};

/// Connection settings for the hosted table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTable {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Public (anon) API key
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_table() -> String {
    "shopping_items".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

/// One row of the items table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ItemRow {
    id: ItemId,
    owner_id: UserId,
    name: String,
    #[serde(default)]
    quantity: Option<u32>,
    #[serde(default)]
    category: Category,
    #[serde(default)]
    completed: bool,
    created_at: DateTime<Utc>,
}

impl ItemRow {
    fn from_item(owner: &UserId, item: &ShoppingItem) -> Self {
        Self {
            id: item.id.clone(),
            owner_id: owner.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            category: item.category,
            completed: item.completed,
            created_at: item.created_at,
        }
    }

    fn into_item(self) -> ShoppingItem {
        ShoppingItem {
            id: self.id,
            name: self.name,
            quantity: self.quantity,
            completed: self.completed,
            category: self.category,
            created_at: self.created_at,
        }
    }
}

/// Mutable columns sent on update
#[derive(Debug, Serialize)]
struct ItemPatch<'a> {
    name: &'a str,
    quantity: Option<u32>,
    category: Category,
    completed: bool,
}

/// Hosted-table implementation of `ItemRepository`
pub struct RemoteItemRepository {
    client: Client,
    table: RemoteTable,
}

impl RemoteItemRepository {
    pub fn new(table: RemoteTable) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(table.timeout_secs))
            .build()
            .map_err(|e| DomainError::Storage(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(table, client))
    }

    pub fn with_client(table: RemoteTable, client: Client) -> Self {
        Self { client, table }
    }

    fn table_url(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.table.url.trim_end_matches('/'),
            self.table.table
        )
    }

    /// Session token when present, else the anon key
    fn authorize(&self, builder: RequestBuilder, session: &Session) -> RequestBuilder {
        let bearer = session
            .access_token
            .as_deref()
            .unwrap_or(&self.table.api_key);

        builder
            .header("apikey", &self.table.api_key)
            .bearer_auth(bearer)
    }

    /// Request against the table, authorized for `session` and scoped to its user
    fn request(&self, method: Method, session: &Session) -> RequestBuilder {
        self.authorize(self.client.request(method, self.table_url()), session)
            .query(&[("owner_id", eq(session.user_id.as_str()))])
    }

    async fn send(&self, request: RequestBuilder) -> DomainResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| DomainError::Storage(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(DomainError::Storage(format!("{} {}", status, body)))
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// `in.("a","b")` filter for a set of ids
fn in_list(ids: &[ItemId]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("\"{}\"", id.as_str().replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

#[async_trait]
impl ItemRepository for RemoteItemRepository {
    async fn list(&self, session: &Session) -> DomainResult<Vec<ShoppingItem>> {
        let request = self
            .request(Method::GET, session)
            .query(&[("select", "*"), ("order", "created_at.desc")]);

        let rows: Vec<ItemRow> = self
            .send(request)
            .await?
            .json()
            .await
            .map_err(|e| DomainError::Serialization(e.to_string()))?;

        let total = rows.len();
        let items: Vec<ShoppingItem> = rows
            .into_iter()
            .filter(|row| row.owner_id == session.user_id)
            .map(ItemRow::into_item)
            .collect();
        if items.len() != total {
            log::warn!("Ignored {} row(s) owned by other users", total - items.len());
        }
        Ok(items)
    }

    async fn create(&self, session: &Session, item: &ShoppingItem) -> DomainResult<()> {
        let row = ItemRow::from_item(&session.user_id, item);
        let request = self
            .authorize(self.client.post(self.table_url()), session)
            .header("Prefer", "return=minimal")
            .json(&row);
        self.send(request).await?;
        Ok(())
    }

    async fn update(&self, session: &Session, item: &ShoppingItem) -> DomainResult<()> {
        let patch = ItemPatch {
            name: &item.name,
            quantity: item.quantity,
            category: item.category,
            completed: item.completed,
        };
        let request = self
            .request(Method::PATCH, session)
            .query(&[("id", eq(item.id.as_str()))])
            .header("Prefer", "return=minimal")
            .json(&patch);
        self.send(request).await?;
        Ok(())
    }

    async fn delete(&self, session: &Session, id: &ItemId) -> DomainResult<()> {
        let request = self
            .request(Method::DELETE, session)
            .query(&[("id", eq(id.as_str()))]);
        self.send(request).await?;
        Ok(())
    }

    async fn delete_many(&self, session: &Session, ids: &[ItemId]) -> DomainResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let request = self
            .request(Method::DELETE, session)
            .query(&[("id", in_list(ids))]);
        self.send(request).await?;
        Ok(())
    }

    async fn delete_all(&self, session: &Session) -> DomainResult<()> {
        self.send(self.request(Method::DELETE, session)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RemoteItemRepository {
        RemoteItemRepository::new(RemoteTable {
            url: "https://example.supabase.co/".to_string(),
            api_key: "anon-key".to_string(),
            table: default_table(),
            timeout_secs: default_timeout_secs(),
        })
        .unwrap()
    }

    fn query_pairs(request: &reqwest::Request) -> Vec<(String, String)> {
        request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_requests_are_owner_scoped() {
        let repo = repo();
        let session = Session::new(UserId::new("user-1")).with_token("jwt");

        let request = repo
            .request(Method::DELETE, &session)
            .query(&[("id", eq("abc"))])
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::DELETE);
        assert_eq!(request.url().path(), "/rest/v1/shopping_items");
        let pairs = query_pairs(&request);
        assert!(pairs.contains(&("owner_id".to_string(), "eq.user-1".to_string())));
        assert!(pairs.contains(&("id".to_string(), "eq.abc".to_string())));
        assert_eq!(request.headers()["apikey"], "anon-key");
        assert_eq!(request.headers()["authorization"], "Bearer jwt");
    }

    #[test]
    fn test_bearer_falls_back_to_api_key() {
        let repo = repo();
        let session = Session::new(UserId::new("user-1"));
        let request = repo.request(Method::GET, &session).build().unwrap();
        assert_eq!(request.headers()["authorization"], "Bearer anon-key");
    }

    #[test]
    fn test_in_list_filter() {
        let ids = vec![ItemId::from("a"), ItemId::from("b")];
        assert_eq!(in_list(&ids), "in.(\"a\",\"b\")");
    }

    #[test]
    fn test_in_list_escapes_quotes_and_backslashes() {
        let ids = vec![ItemId::from(r#"a"b"#), ItemId::from(r"c\d")];
        assert_eq!(in_list(&ids), r#"in.("a\"b","c\\d")"#);
    }

    #[test]
    fn test_row_mapping() {
        let owner = UserId::new("user-1");
        let item = ShoppingItem::new("Yogurt", Some(3), Some(Category::Dairy)).unwrap();
        let row = ItemRow::from_item(&owner, &item);

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["owner_id"], "user-1");
        assert_eq!(value["category"], "dairy");

        let back: ItemRow = serde_json::from_value(value).unwrap();
        assert_eq!(back.into_item(), item);
    }

    #[test]
    fn test_row_defaults() {
        let json = r#"{"id":"1","owner_id":"u","name":"Tea","created_at":"2024-05-01T10:00:00Z"}"#;
        let row: ItemRow = serde_json::from_str(json).unwrap();
        let item = row.into_item();
        assert_eq!(item.category, Category::Other);
        assert!(!item.completed);
        assert_eq!(item.quantity, None);
    }

    mod endpoint {
        use super::*;
        use axum::extract::State;
        use axum::http::{HeaderMap, StatusCode, Uri};
        use axum::Router;
        use std::sync::{Arc, Mutex};
        use tokio::net::TcpListener;

        #[derive(Debug, Clone)]
        struct Recorded {
            method: Method,
            uri: Uri,
            headers: HeaderMap,
            body: String,
        }

        impl Recorded {
            fn query_pairs(&self) -> Vec<(String, String)> {
                let url = reqwest::Url::parse(&format!("http://table{}", self.uri)).unwrap();
                url.query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            }

            fn has_pair(&self, key: &str, value: &str) -> bool {
                self.query_pairs()
                    .contains(&(key.to_string(), value.to_string()))
            }
        }

        /// Table endpoint that records every request and answers with a fixed reply
        struct FakeTable {
            reply: (StatusCode, String),
            requests: Mutex<Vec<Recorded>>,
        }

        impl FakeTable {
            fn requests(&self) -> Vec<Recorded> {
                self.requests.lock().unwrap().clone()
            }
        }

        async fn record(
            State(table): State<Arc<FakeTable>>,
            method: Method,
            uri: Uri,
            headers: HeaderMap,
            body: String,
        ) -> (StatusCode, String) {
            table.requests.lock().unwrap().push(Recorded { method, uri, headers, body });
            table.reply.clone()
        }

        async fn serve(status: StatusCode, body: &str) -> (RemoteItemRepository, Arc<FakeTable>) {
            let table = Arc::new(FakeTable {
                reply: (status, body.to_string()),
                requests: Mutex::new(Vec::new()),
            });
            let app = Router::new().fallback(record).with_state(table.clone());

            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.ok();
            });

            let repo = RemoteItemRepository::with_client(
                RemoteTable {
                    url: format!("http://{}", addr),
                    api_key: "anon-key".to_string(),
                    table: default_table(),
                    timeout_secs: 5,
                },
                Client::builder().no_proxy().build().unwrap(),
            );
            (repo, table)
        }

        fn session() -> Session {
            Session::new(UserId::new("user-1")).with_token("jwt")
        }

        #[tokio::test]
        async fn test_error_status_becomes_storage_error() {
            let (repo, _) = serve(StatusCode::UNAUTHORIZED, r#"{"message":"JWT expired"}"#).await;

            let err = repo.delete(&session(), &ItemId::from("a")).await.unwrap_err();
            match err {
                DomainError::Storage(msg) => {
                    assert!(msg.contains("401"), "{}", msg);
                    assert!(msg.contains("JWT expired"), "{}", msg);
                }
                other => panic!("unexpected error {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_list_drops_rows_of_other_users() {
            let rows = r#"[
                {"id":"1","owner_id":"user-1","name":"Milk","quantity":2,"category":"dairy","completed":false,"created_at":"2024-05-02T10:00:00Z"},
                {"id":"2","owner_id":"user-2","name":"Beer","category":"beverages","completed":false,"created_at":"2024-05-01T10:00:00Z"}
            ]"#;
            let (repo, table) = serve(StatusCode::OK, rows).await;

            let items = repo.list(&session()).await.unwrap();
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].name, "Milk");
            assert_eq!(items[0].quantity, Some(2));

            let requests = table.requests();
            assert_eq!(requests.len(), 1);
            let request = &requests[0];
            assert_eq!(request.method, Method::GET);
            assert_eq!(request.uri.path(), "/rest/v1/shopping_items");
            assert!(request.has_pair("owner_id", "eq.user-1"));
            assert!(request.has_pair("order", "created_at.desc"));
            assert_eq!(request.headers["authorization"], "Bearer jwt");
            assert_eq!(request.headers["apikey"], "anon-key");
        }

        #[tokio::test]
        async fn test_delete_many_sends_owner_scoped_in_filter() {
            let (repo, table) = serve(StatusCode::NO_CONTENT, "").await;

            repo.delete_many(&session(), &[ItemId::from("a"), ItemId::from("b")])
                .await
                .unwrap();
            repo.delete_many(&session(), &[]).await.unwrap();

            let requests = table.requests();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].method, Method::DELETE);
            assert!(requests[0].has_pair("id", r#"in.("a","b")"#));
            assert!(requests[0].has_pair("owner_id", "eq.user-1"));
        }

        #[tokio::test]
        async fn test_create_posts_row_with_owner() {
            let (repo, table) = serve(StatusCode::CREATED, "").await;
            let item = ShoppingItem::new("Bread", None, Some(Category::Bakery)).unwrap();

            repo.create(&session(), &item).await.unwrap();

            let requests = table.requests();
            assert_eq!(requests[0].method, Method::POST);
            assert_eq!(requests[0].headers["prefer"], "return=minimal");
            let row: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
            assert_eq!(row["owner_id"], "user-1");
            assert_eq!(row["name"], "Bread");
            assert_eq!(row["category"], "bakery");
        }

        #[tokio::test]
        async fn test_update_patches_by_id() {
            let (repo, table) = serve(StatusCode::NO_CONTENT, "").await;
            let mut item = ShoppingItem::new("Tea", Some(1), None).unwrap();
            item.completed = true;

            repo.update(&session(), &item).await.unwrap();

            let requests = table.requests();
            assert_eq!(requests[0].method, Method::PATCH);
            assert!(requests[0].has_pair("id", &format!("eq.{}", item.id)));
            assert!(requests[0].has_pair("owner_id", "eq.user-1"));
            let patch: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
            assert_eq!(patch["completed"], true);
        }
    }
}
