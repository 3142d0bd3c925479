use anyhow::{Context, Result, bail};

use crate::model::{MatchRecord, TRIALS_ACTIVITY_MODE};
use crate::services::{IdentityResolver, MatchHistoryService};

/// Resolve `handle` and gather the latest `count` Trials matches of every
/// character on the account.
///
/// This is the only step that can end a run: without an account and at least
/// one character there is nothing to evaluate. A single character whose
/// history cannot be fetched is logged and skipped.
pub fn collect_matches(
    identity: &dyn IdentityResolver,
    history: &dyn MatchHistoryService,
    handle: &str,
    membership_type: i32,
    count: u32,
) -> Result<Vec<MatchRecord>> {
    let account_id = identity
        .resolve_handle(handle, membership_type)
        .with_context(|| format!("resolve account for {handle}"))?;
    let characters = identity
        .list_characters(membership_type, &account_id)
        .with_context(|| format!("list characters for account {account_id}"))?;
    if characters.is_empty() {
        bail!("account {account_id} has no characters");
    }
    tracing::info!(%account_id, characters = characters.len(), "resolved account");

    let mut matches = Vec::new();
    for character_id in &characters {
        match history.fetch_matches(
            membership_type,
            &account_id,
            character_id,
            count,
            TRIALS_ACTIVITY_MODE,
        ) {
            Ok(rows) => {
                tracing::debug!(%character_id, matches = rows.len(), "fetched history");
                matches.extend(rows);
            }
            Err(err) => {
                tracing::warn!(%character_id, error = %err, "history fetch failed; skipping character");
            }
        }
    }
    Ok(matches)
}
