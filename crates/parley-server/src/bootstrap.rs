//! Startup seeding of users and clients.
//!
//! Seeding is idempotent: entries that already exist are left untouched.

use parley_auth::ScopeSet;
use parley_auth::storage::ClientStorage;
use parley_auth::types::Client;
use parley_auth_memory::MemoryStores;
use tracing::{info, warn};

use crate::config::BootstrapConfig;

/// What a bootstrap run created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapStats {
    pub users_created: usize,
    pub clients_created: usize,
    pub skipped: usize,
}

/// Creates the configured users and clients.
///
/// # Errors
///
/// Returns an error if a store fails for a reason other than the entry
/// already existing.
pub async fn seed(stores: &MemoryStores, config: &BootstrapConfig) -> anyhow::Result<BootstrapStats> {
    let mut stats = BootstrapStats::default();

    for user in &config.users {
        match stores.users.add_user(&user.name, &user.password) {
            Ok(created) => {
                info!(username = %created.name, user_id = %created.id, "Bootstrap user created");
                stats.users_created += 1;
            }
            Err(e) if e.is_conflict() => {
                stats.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    for entry in &config.clients {
        let name = if entry.name.is_empty() {
            entry.id.clone()
        } else {
            entry.name.clone()
        };
        let mut client = Client::new(name, entry.creator.as_deref().unwrap_or("system"))
            .with_id(entry.id.clone())
            .with_description(entry.description.clone())
            .confidential(entry.confidential)
            .with_scopes(ScopeSet::parse(&entry.scopes));
        if let Some(secret) = &entry.secret {
            client = client.with_secret(secret.clone());
        }
        if let Some(redirect_uri) = &entry.redirect_uri {
            client = client.with_redirect_uri(redirect_uri.clone());
        }
        if client.scopes.is_empty() {
            warn!(client_id = %client.id, "Bootstrap client has no known scopes");
        }

        match stores.clients.create(&client).await {
            Ok(created) => {
                info!(
                    client_id = %created.id,
                    confidential = created.confidential,
                    scopes = %created.scopes,
                    "Bootstrap client registered"
                );
                stats.clients_created += 1;
            }
            Err(e) if e.is_conflict() => {
                stats.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(stats)
}
