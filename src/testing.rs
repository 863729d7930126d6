//! In-memory port implementations shared by the unit tests.

use async_trait::async_trait;
use sea_orm::DbErr;
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::db::entities::{login_ip, node};
use crate::db::enums::NodeSort;
use crate::db::repository::{
    LoginIpRepository, NewLoginRecord, NodeRepository, RepositoryError, UserContactDirectory,
};
use crate::dns::{DnsSync, SyncError};
use crate::nodes::address::{HostResolver, ResolveError};
use crate::notifications::{NotificationError, Notifier};

fn write_failure() -> RepositoryError {
    RepositoryError::Database(DbErr::Custom("storage unavailable".to_string()))
}

/// Host table standing in for the system resolver.
pub struct StaticResolver {
    entries: HashMap<String, Vec<IpAddr>>,
}

impl StaticResolver {
    pub fn new(entries: &[(&str, &[&str])]) -> Self {
        let entries = entries
            .iter()
            .map(|(host, addrs)| {
                let addrs = addrs.iter().map(|a| a.parse().unwrap()).collect();
                (host.to_string(), addrs)
            })
            .collect();
        Self { entries }
    }
}

#[async_trait]
impl HostResolver for StaticResolver {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, ResolveError> {
        self.entries
            .get(host)
            .cloned()
            .ok_or_else(|| ResolveError::Lookup {
                host: host.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "unknown host"),
            })
    }
}

#[derive(Default)]
pub struct StaticUserDirectory {
    chats: HashMap<i32, Option<i64>>,
}

impl StaticUserDirectory {
    pub fn with(users: &[(i32, Option<i64>)]) -> Self {
        Self {
            chats: users.iter().copied().collect(),
        }
    }
}

#[async_trait]
impl UserContactDirectory for StaticUserDirectory {
    async fn telegram_chat_id(&self, user_id: i32) -> Result<Option<i64>, RepositoryError> {
        self.chats
            .get(&user_id)
            .copied()
            .ok_or(RepositoryError::NotFound(user_id))
    }
}

#[derive(Default)]
pub struct InMemoryNodeRepository {
    rows: Mutex<BTreeMap<i32, node::Model>>,
    fail_writes: AtomicBool,
}

impl InMemoryNodeRepository {
    pub fn failing() -> Self {
        let repo = Self::default();
        repo.fail_writes.store(true, Ordering::SeqCst);
        repo
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn get(&self, id: i32) -> Option<node::Model> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Inserts a row directly, bypassing the failure toggle.
    pub fn seed(&self, node: node::Model) -> node::Model {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.keys().next_back().copied().unwrap_or(0) + 1;
        let stored = node::Model { id, ..node };
        rows.insert(id, stored.clone());
        stored
    }

    fn check_writes(&self) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(write_failure());
        }
        Ok(())
    }
}

#[async_trait]
impl NodeRepository for InMemoryNodeRepository {
    async fn find(&self, id: i32) -> Result<Option<node::Model>, RepositoryError> {
        Ok(self.get(id))
    }

    async fn insert(&self, node: node::Model) -> Result<node::Model, RepositoryError> {
        self.check_writes()?;
        Ok(self.seed(node))
    }

    async fn update(&self, node: node::Model) -> Result<node::Model, RepositoryError> {
        self.check_writes()?;
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&node.id) {
            Some(row) => {
                *row = node.clone();
                Ok(node)
            }
            None => Err(RepositoryError::NotFound(node.id)),
        }
    }

    async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        self.check_writes()?;
        Ok(self.rows.lock().unwrap().remove(&id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryLoginIpRepository {
    rows: Mutex<Vec<login_ip::Model>>,
    fail_writes: AtomicBool,
    fail_lookups: AtomicBool,
}

impl InMemoryLoginIpRepository {
    pub fn failing() -> Self {
        let repo = Self::default();
        repo.fail_writes.store(true, Ordering::SeqCst);
        repo
    }

    /// History reads fail while appends still succeed.
    pub fn with_failing_lookups() -> Self {
        let repo = Self::default();
        repo.fail_lookups.store(true, Ordering::SeqCst);
        repo
    }

    pub fn records(&self) -> Vec<login_ip::Model> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl LoginIpRepository for InMemoryLoginIpRepository {
    async fn has_login(&self, user_id: i32, ip: &str) -> Result<bool, RepositoryError> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(DbErr::Custom("history unavailable".to_string())));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.user_id == user_id && r.ip == ip))
    }

    async fn append(&self, record: NewLoginRecord) -> Result<login_ip::Model, RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(write_failure());
        }
        let mut rows = self.rows.lock().unwrap();
        let row = login_ip::Model {
            id: rows.len() as i32 + 1,
            ip: record.ip,
            user_id: record.user_id,
            datetime: record.datetime,
            outcome: record.outcome,
        };
        rows.push(row.clone());
        Ok(row)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub user_id: i32,
    pub title: String,
    pub body: String,
}

#[derive(Default)]
pub struct RecordingNotifier {
    admin: Mutex<Vec<String>>,
    users: Mutex<Vec<UserMessage>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.fail.store(true, Ordering::SeqCst);
        notifier
    }

    pub fn admin_messages(&self) -> Vec<String> {
        self.admin.lock().unwrap().clone()
    }

    pub fn user_messages(&self) -> Vec<UserMessage> {
        self.users.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_admin(&self, message: &str) -> Result<(), NotificationError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotificationError::NoChannel);
        }
        self.admin.lock().unwrap().push(message.to_string());
        Ok(())
    }

    async fn notify_user(&self, user_id: i32, title: &str, body: &str) -> Result<(), NotificationError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotificationError::UserUnreachable(user_id));
        }
        self.users.lock().unwrap().push(UserMessage {
            user_id,
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingDnsSync {
    records: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl RecordingDnsSync {
    pub fn failing() -> Self {
        let sync = Self::default();
        sync.fail.store(true, Ordering::SeqCst);
        sync
    }

    pub fn records(&self) -> Vec<(String, String)> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl DnsSync for RecordingDnsSync {
    async fn upsert_record(&self, label: &str, address: &str) -> Result<(), SyncError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SyncError::Api("zone is locked".to_string()));
        }
        self.records
            .lock()
            .unwrap()
            .push((label.to_string(), address.to_string()));
        Ok(())
    }
}

/// A fully populated node row for seeding repositories.
pub fn sample_node(name: &str) -> node::Model {
    node::Model {
        id: 0,
        name: name.to_string(),
        info: "Hong Kong relay".to_string(),
        sort: NodeSort::Trojan,
        node_class: 1,
        node_group: 2,
        server: "hk-01.example.com".to_string(),
        node_ip: "203.0.113.10".to_string(),
        password: "a".repeat(32),
        traffic_rate: 1.5,
        is_dynamic_rate: true,
        dynamic_rate_config: serde_json::json!({
            "max_rate": 2.0,
            "max_rate_time": 20,
            "min_rate": 0.5,
            "min_rate_time": 4
        }),
        node_bandwidth: 5 * crate::nodes::quantity::BYTES_PER_GB,
        node_bandwidth_limit: 100 * crate::nodes::quantity::BYTES_PER_GB,
        bandwidthlimit_resetday: 1,
        node_speedlimit: 100.0,
        custom_config: serde_json::json!({"offset_port_node": 443}),
        is_enabled: true,
    }
}
