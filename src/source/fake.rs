// In-memory media server for tests

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use uuid::Uuid;

use super::JellyfinSource;
use crate::{
    error::ApiError,
    jellyfin_client::{
        Attachment, ClientFactory, ItemsQuery, ItemsResponse, MediaServerApi, RemoteItem,
        SystemInfo, User,
    },
    session::Session,
    storage::{MemorySettingsStore, SettingsStore, USER_ID_KEY},
};

pub const FAKE_BASE_URL: &str = "http://media.lan";

type ItemsResponder = Box<dyn Fn(&ItemsQuery) -> Vec<RemoteItem> + Send + Sync>;

#[derive(Default)]
struct State {
    calls: HashMap<&'static str, usize>,
    failures: HashMap<&'static str, u16>,
    users: Vec<User>,
    items: HashMap<String, RemoteItem>,
    items_responder: Option<ItemsResponder>,
    item_queries: Vec<ItemsQuery>,
    views: Vec<RemoteItem>,
    attachments: HashMap<String, Vec<Attachment>>,
    page_counts: HashMap<String, u32>,
    probed: Vec<u32>,
}

pub struct FakeServer {
    state: Mutex<State>,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        let server = Arc::new(Self {
            state: Mutex::new(State::default()),
        });
        server.set_users(&["u1"]);
        server
    }

    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    fn record(&self, op: &'static str) -> Result<(), ApiError> {
        self.with(|s| {
            *s.calls.entry(op).or_default() += 1;
            match s.failures.get(op) {
                Some(status) => Err(ApiError::status(*status, format!("{op} failed"))),
                None => Ok(()),
            }
        })
    }

    pub fn set_users(&self, ids: &[&str]) {
        self.with(|s| {
            s.users = ids
                .iter()
                .map(|id| User {
                    id: id.to_string(),
                    name: format!("user {id}"),
                })
                .collect()
        });
    }

    /// Make every call of `op` answer with `status`.
    pub fn fail(&self, op: &'static str, status: u16) {
        self.with(|s| s.failures.insert(op, status));
    }

    pub fn add_item(&self, item: RemoteItem) {
        self.with(|s| s.items.insert(item.id.clone(), item));
    }

    pub fn on_items(&self, f: impl Fn(&ItemsQuery) -> Vec<RemoteItem> + Send + Sync + 'static) {
        self.with(|s| s.items_responder = Some(Box::new(f)));
    }

    pub fn set_views(&self, views: Vec<RemoteItem>) {
        self.with(|s| s.views = views);
    }

    pub fn set_attachments(&self, item_id: &str, attachments: Vec<Attachment>) {
        self.with(|s| s.attachments.insert(item_id.to_string(), attachments));
    }

    /// Page images 0..count exist for the item.
    pub fn set_page_count(&self, item_id: &str, count: u32) {
        self.with(|s| s.page_counts.insert(item_id.to_string(), count));
    }

    pub fn calls(&self, op: &str) -> usize {
        self.with(|s| s.calls.get(op).copied().unwrap_or(0))
    }

    pub fn total_calls(&self) -> usize {
        self.with(|s| s.calls.values().sum())
    }

    pub fn item_queries(&self) -> Vec<ItemsQuery> {
        self.with(|s| s.item_queries.clone())
    }

    pub fn probed(&self) -> Vec<u32> {
        self.with(|s| s.probed.clone())
    }
}

#[async_trait]
impl MediaServerApi for FakeServer {
    fn base_url(&self) -> &str {
        FAKE_BASE_URL
    }

    async fn system_info(&self) -> Result<SystemInfo, ApiError> {
        self.record("system_info")?;
        Ok(SystemInfo {
            server_name: Some("fake".into()),
            version: Some("10.9.0".into()),
            id: None,
        })
    }

    async fn users(&self) -> Result<Vec<User>, ApiError> {
        self.record("users")?;
        Ok(self.with(|s| s.users.clone()))
    }

    async fn user_items(
        &self,
        _user_id: &str,
        query: &ItemsQuery,
    ) -> Result<ItemsResponse, ApiError> {
        self.record("user_items")?;
        let items = self.with(|s| {
            s.item_queries.push(query.clone());
            s.items_responder
                .as_ref()
                .map(|f| f(query))
                .unwrap_or_default()
        });
        Ok(ItemsResponse {
            total_record_count: Some(items.len() as i64),
            items,
            start_index: query.start_index.map(i64::from),
        })
    }

    async fn user_views(&self, _user_id: &str) -> Result<ItemsResponse, ApiError> {
        self.record("user_views")?;
        Ok(ItemsResponse {
            items: self.with(|s| s.views.clone()),
            ..Default::default()
        })
    }

    async fn item(&self, item_id: &str) -> Result<RemoteItem, ApiError> {
        self.record("item")?;
        self.with(|s| s.items.get(item_id).cloned())
            .ok_or_else(|| ApiError::status(404, "Item not found"))
    }

    async fn attachments(&self, item_id: &str) -> Result<Vec<Attachment>, ApiError> {
        self.record("attachments")?;
        Ok(self.with(|s| s.attachments.get(item_id).cloned().unwrap_or_default()))
    }

    async fn page_image_exists(&self, item_id: &str, index: u32) -> Result<bool, ApiError> {
        self.record("page_image")?;
        Ok(self.with(|s| {
            s.probed.push(index);
            index < s.page_counts.get(item_id).copied().unwrap_or(0)
        }))
    }
}

pub struct FakeFactory {
    server: Arc<FakeServer>,
    connects: AtomicUsize,
}

impl FakeFactory {
    pub fn new(server: Arc<FakeServer>) -> Self {
        Self {
            server,
            connects: AtomicUsize::new(0),
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl ClientFactory for FakeFactory {
    fn connect(&self, _server_url: &str, _api_key: &str) -> Arc<dyn MediaServerApi> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.server.clone()
    }
}

/// A source with server url, api key and user id already stored.
pub async fn signed_in_source(server: Arc<FakeServer>) -> JellyfinSource {
    let store = Arc::new(MemorySettingsStore::new());
    let session = Session::new(store.clone(), Uuid::new_v4());
    session.set_server_url("media.lan").await.unwrap();
    session.set_api_key("k").await.unwrap();
    store
        .set(session.source_id(), USER_ID_KEY, "u1")
        .await
        .unwrap();
    JellyfinSource::new(session, Arc::new(FakeFactory::new(server)))
}

pub fn remote_item(id: &str, name: &str, item_type: Option<&str>) -> RemoteItem {
    RemoteItem {
        id: id.to_string(),
        name: name.to_string(),
        item_type: item_type.map(str::to_string),
        ..Default::default()
    }
}
