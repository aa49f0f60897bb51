//! Translation of a received batch into the entries of the follow-up calls.
//!
//! Nothing here talks to a queue or fails. Every function preserves the order
//! of the batch it is given.

use sqs_mover_runtime::{DeleteEntry, ReceivedMessage, SendEntry};

#[cfg(test)]
#[path = "transfer_tests.rs"]
mod tests;

/// Build one send entry per message.
///
/// Body and user attributes are forwarded unchanged and the message id becomes
/// the entry id. `MessageGroupId` and `MessageDeduplicationId` are copied only
/// when the source delivered them.
pub fn build_send_entries(batch: &[ReceivedMessage]) -> Vec<SendEntry> {
    batch
        .iter()
        .map(|message| SendEntry {
            id: message.message_id.to_string(),
            body: message.body.clone(),
            message_attributes: message.message_attributes.clone(),
            message_group_id: message.message_group_id().map(str::to_string),
            message_deduplication_id: message.message_deduplication_id().map(str::to_string),
        })
        .collect()
}

/// Build one delete entry per message, pairing its id with its receipt handle.
pub fn build_delete_entries(batch: &[ReceivedMessage]) -> Vec<DeleteEntry> {
    batch
        .iter()
        .map(|message| DeleteEntry {
            id: message.message_id.to_string(),
            receipt_handle: message.receipt_handle.clone(),
        })
        .collect()
}

/// Keep only as many messages as are still needed to reach `target`.
///
/// Dropped messages are left leased in the source and become visible again
/// when their visibility timeout expires.
pub fn clip_batch(
    mut batch: Vec<ReceivedMessage>,
    moved: u64,
    target: u64,
) -> Vec<ReceivedMessage> {
    let remaining = usize::try_from(target.saturating_sub(moved)).unwrap_or(usize::MAX);
    batch.truncate(remaining);
    batch
}
