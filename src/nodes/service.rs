use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use super::address::{AddressResolver, ResolveError};
use super::credential::generate_node_password;
use super::custom_config::CustomConfig;
use super::models::{small_int, NodeEditView, NodeForm};
use super::outcome::{Degradation, MutationOutcome};
use super::rate_policy;
use crate::db::entities::node;
use crate::db::repository::{NodeRepository, RepositoryError};
use crate::dns::{subdomain_label, DnsSync, SyncError};
use crate::notifications::{render_node_template, Notifier};
use crate::server::config::{EventNotification, NotificationConfig};

/// Appended to the name of a replicated node.
pub const COPY_MARKER: &str = " (copy)";

const DEFAULT_ADDED_TEMPLATE: &str = "Node %node_name% was added";
const DEFAULT_UPDATED_TEMPLATE: &str = "Node %node_name% was updated";
const DEFAULT_DELETED_TEMPLATE: &str = "Node %node_name% was deleted";

#[derive(Error, Debug)]
pub enum NodeServiceError {
    /// Nothing was persisted.
    #[error("Could not resolve the node address: {0}")]
    AddressResolution(#[from] ResolveError),
    /// The node write stands; only the DNS record is stale.
    #[error("Node {node_id} was saved but DNS sync failed: {source}")]
    DnsSync {
        node_id: i32,
        #[source]
        source: SyncError,
    },
}

/// DNS zone that node records are published under.
#[derive(Clone)]
pub struct DnsTarget {
    pub base_domain: String,
    pub sync: Arc<dyn DnsSync>,
}

#[derive(Debug, Clone, Default)]
pub struct NodeEventSettings {
    pub added: EventNotification,
    pub updated: EventNotification,
    pub deleted: EventNotification,
}

impl From<&NotificationConfig> for NodeEventSettings {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            added: config.node_added.clone(),
            updated: config.node_updated.clone(),
            deleted: config.node_deleted.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeEvent {
    Added,
    Updated,
    Deleted,
}

pub struct NodeMutationService {
    nodes: Arc<dyn NodeRepository>,
    addresses: AddressResolver,
    dns: Option<DnsTarget>,
    notifier: Arc<dyn Notifier>,
    events: NodeEventSettings,
}

impl NodeMutationService {
    pub fn new(
        nodes: Arc<dyn NodeRepository>,
        addresses: AddressResolver,
        dns: Option<DnsTarget>,
        notifier: Arc<dyn Notifier>,
        events: NodeEventSettings,
    ) -> Self {
        Self {
            nodes,
            addresses,
            dns,
            notifier,
            events,
        }
    }

    pub async fn create(&self, form: &NodeForm) -> Result<MutationOutcome, NodeServiceError> {
        let server = form.server.trim();
        let node_ip = self.addresses.resolve(server, form.node_ip.as_deref()).await?;

        let mut node = node::Model {
            id: 0,
            server: server.to_string(),
            node_ip,
            password: generate_node_password(),
            node_bandwidth: 0,
            ..empty_node()
        };
        apply_form(&mut node, form);

        let saved = match self.nodes.insert(node).await {
            Ok(saved) => saved,
            Err(e) => {
                error!(error = %e, name = %form.name, "Failed to create node.");
                return Ok(MutationOutcome::failed());
            }
        };
        info!(node_id = saved.id, name = %saved.name, "Node created.");

        self.sync_dns(&saved).await?;
        Ok(self
            .notify_event(NodeEvent::Added, &saved.name, MutationOutcome::created(saved.id))
            .await)
    }

    /// Replaces every operator-editable field. The credential and the consumed
    /// bandwidth counter are kept.
    pub async fn update(&self, id: i32, form: &NodeForm) -> Result<MutationOutcome, NodeServiceError> {
        let mut node = match self.nodes.find(id).await {
            Ok(Some(node)) => node,
            Ok(None) => {
                warn!(node_id = id, "Update requested for a missing node.");
                return Ok(MutationOutcome::failed());
            }
            Err(e) => {
                error!(node_id = id, error = %e, "Failed to load node for update.");
                return Ok(MutationOutcome::failed());
            }
        };

        node.server = form.server.trim().to_string();
        node.node_ip = self
            .addresses
            .resolve(&node.server, form.node_ip.as_deref())
            .await?;
        apply_form(&mut node, form);

        let saved = match self.nodes.update(node).await {
            Ok(saved) => saved,
            Err(e) => {
                error!(node_id = id, error = %e, "Failed to update node.");
                return Ok(MutationOutcome::failed());
            }
        };
        info!(node_id = id, name = %saved.name, "Node updated.");

        self.sync_dns(&saved).await?;
        Ok(self
            .notify_event(NodeEvent::Updated, &saved.name, MutationOutcome::succeeded())
            .await)
    }

    pub async fn delete(&self, id: i32) -> MutationOutcome {
        let name = match self.nodes.find(id).await {
            Ok(Some(node)) => node.name,
            Ok(None) => {
                warn!(node_id = id, "Delete requested for a missing node.");
                return MutationOutcome::failed();
            }
            Err(e) => {
                error!(node_id = id, error = %e, "Failed to load node for delete.");
                return MutationOutcome::failed();
            }
        };

        match self.nodes.delete(id).await {
            Ok(true) => {}
            Ok(false) => return MutationOutcome::failed(),
            Err(e) => {
                error!(node_id = id, error = %e, "Failed to delete node.");
                return MutationOutcome::failed();
            }
        }
        info!(node_id = id, name = %name, "Node deleted.");

        self.notify_event(NodeEvent::Deleted, &name, MutationOutcome::succeeded())
            .await
    }

    /// Rotates the node credential. Every call yields a new secret.
    pub async fn reset_credential(&self, id: i32) -> MutationOutcome {
        let mut node = match self.nodes.find(id).await {
            Ok(Some(node)) => node,
            Ok(None) => return MutationOutcome::failed(),
            Err(e) => {
                error!(node_id = id, error = %e, "Failed to load node for credential reset.");
                return MutationOutcome::failed();
            }
        };
        node.password = generate_node_password();

        match self.nodes.update(node).await {
            Ok(_) => {
                info!(node_id = id, "Node credential rotated.");
                MutationOutcome::succeeded()
            }
            Err(e) => {
                error!(node_id = id, error = %e, "Failed to persist rotated credential.");
                MutationOutcome::failed()
            }
        }
    }

    /// Persists a copy of node `id` under a new identity with the bandwidth counter
    /// cleared. The copy keeps the source credential.
    pub async fn replicate(&self, id: i32) -> MutationOutcome {
        let source = match self.nodes.find(id).await {
            Ok(Some(node)) => node,
            Ok(None) => return MutationOutcome::failed_with(format!("Node {id} not found")),
            Err(e) => return MutationOutcome::failed_with(e.to_string()),
        };

        match self.nodes.insert(replica_of(source)).await {
            Ok(copy) => {
                info!(source_id = id, node_id = copy.id, "Node replicated.");
                MutationOutcome::created(copy.id)
            }
            Err(e) => {
                error!(source_id = id, error = %e, "Failed to replicate node.");
                MutationOutcome::failed_with(e.to_string())
            }
        }
    }

    pub async fn load_for_edit(&self, id: i32) -> Result<Option<NodeEditView>, RepositoryError> {
        Ok(self.nodes.find(id).await?.map(NodeEditView::from))
    }

    async fn sync_dns(&self, node: &node::Model) -> Result<(), NodeServiceError> {
        let Some(target) = &self.dns else {
            return Ok(());
        };
        let label = subdomain_label(&node.server, &target.base_domain);
        target
            .sync
            .upsert_record(label, &node.node_ip)
            .await
            .map_err(|source| {
                error!(node_id = node.id, label, error = %source, "DNS sync failed.");
                NodeServiceError::DnsSync {
                    node_id: node.id,
                    source,
                }
            })
    }

    async fn notify_event(&self, event: NodeEvent, node_name: &str, outcome: MutationOutcome) -> MutationOutcome {
        let (settings, default_template) = match event {
            NodeEvent::Added => (&self.events.added, DEFAULT_ADDED_TEMPLATE),
            NodeEvent::Updated => (&self.events.updated, DEFAULT_UPDATED_TEMPLATE),
            NodeEvent::Deleted => (&self.events.deleted, DEFAULT_DELETED_TEMPLATE),
        };
        if !settings.enabled {
            return outcome;
        }

        let template = settings.template.as_deref().unwrap_or(default_template);
        let message = render_node_template(template, node_name);
        match self.notifier.notify_admin(&message).await {
            Ok(()) => outcome,
            Err(e) => {
                warn!(?event, node_name, error = %e, "Node saved but the notification failed.");
                outcome.degrade(Degradation::Notify)
            }
        }
    }
}

fn empty_node() -> node::Model {
    node::Model {
        id: 0,
        name: String::new(),
        info: String::new(),
        sort: Default::default(),
        node_class: 0,
        node_group: 0,
        server: String::new(),
        node_ip: String::new(),
        password: String::new(),
        traffic_rate: 1.0,
        is_dynamic_rate: false,
        dynamic_rate_config: rate_policy::encode(&Default::default()),
        node_bandwidth: 0,
        node_bandwidth_limit: 0,
        bandwidthlimit_resetday: 0,
        node_speedlimit: 0.0,
        custom_config: CustomConfig::default().to_value(),
        is_enabled: false,
    }
}

/// Writes the form fields shared by create and update. The rate policy is
/// re-encoded from scratch rather than merged with the stored one.
fn apply_form(node: &mut node::Model, form: &NodeForm) {
    node.name = form.name.clone();
    node.info = form.info.clone();
    node.sort = form.node_sort();
    node.node_class = small_int(form.node_class);
    node.node_group = small_int(form.node_group);
    node.traffic_rate = form.traffic_rate();
    node.is_dynamic_rate = form.is_dynamic_rate;
    node.dynamic_rate_config = rate_policy::encode(&form.rate_policy());
    node.custom_config = CustomConfig::from_input(form.custom_config.as_ref()).to_value();
    node.node_speedlimit = form.speed_limit();
    node.node_bandwidth_limit = form.bandwidth_limit_bytes();
    node.bandwidthlimit_resetday = form.reset_day();
    node.is_enabled = form.is_enabled;
}

fn replica_of(source: node::Model) -> node::Model {
    node::Model {
        id: 0,
        name: format!("{}{COPY_MARKER}", source.name),
        node_bandwidth: 0,
        ..source
    }
}
