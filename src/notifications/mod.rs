pub mod models;
pub mod senders;
pub mod service;

pub use models::ChannelConfig;
pub use service::{NotificationError, NotificationService, Notifier};

pub const NODE_NAME_PLACEHOLDER: &str = "%node_name%";

/// Substitutes every `%node_name%` in an operator-configured message template.
pub fn render_node_template(template: &str, node_name: &str) -> String {
    template.replace(NODE_NAME_PLACEHOLDER, node_name)
}
