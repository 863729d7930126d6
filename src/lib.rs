pub mod server;

pub mod db;
pub mod dns;
pub mod login;
pub mod nodes;
pub mod notifications;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;
