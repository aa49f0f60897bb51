//! Tests for batch transfer translation

use super::*;
use sqs_mover_runtime::{
    MessageAttributeValue, MESSAGE_DEDUPLICATION_ID_ATTRIBUTE, MESSAGE_GROUP_ID_ATTRIBUTE,
};
use std::collections::HashMap;

fn message(index: usize) -> ReceivedMessage {
    ReceivedMessage {
        message_id: format!("msg-{}", index).parse().unwrap(),
        receipt_handle: format!("rh-{}", index).parse().unwrap(),
        body: format!("body-{}", index),
        attributes: HashMap::new(),
        message_attributes: HashMap::new(),
    }
}

fn batch(count: usize) -> Vec<ReceivedMessage> {
    (0..count).map(message).collect()
}

fn ids(batch: &[ReceivedMessage]) -> Vec<String> {
    batch.iter().map(|m| m.message_id.to_string()).collect()
}

// ============================================================================
// Send Entry Tests
// ============================================================================

#[test]
fn test_send_entries_preserve_length_and_order() {
    let batch = batch(7);

    let entries = build_send_entries(&batch);

    assert_eq!(entries.len(), 7);
    let entry_ids: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();
    assert_eq!(entry_ids, ids(&batch));
    assert_eq!(entries[3].body, "body-3");
}

#[test]
fn test_send_entries_without_fifo_attributes_have_none() {
    let entries = build_send_entries(&batch(2));

    for entry in &entries {
        assert_eq!(entry.message_group_id, None);
        assert_eq!(entry.message_deduplication_id, None);
    }
}

#[test]
fn test_send_entries_copy_fifo_attributes_verbatim() {
    let mut grouped = message(0);
    grouped
        .attributes
        .insert(MESSAGE_GROUP_ID_ATTRIBUTE.to_string(), "tenant-42".to_string());
    grouped.attributes.insert(
        MESSAGE_DEDUPLICATION_ID_ATTRIBUTE.to_string(),
        "order-1001".to_string(),
    );
    let mut group_only = message(1);
    group_only
        .attributes
        .insert(MESSAGE_GROUP_ID_ATTRIBUTE.to_string(), "tenant-7".to_string());

    let entries = build_send_entries(&[grouped, group_only]);

    assert_eq!(entries[0].message_group_id.as_deref(), Some("tenant-42"));
    assert_eq!(
        entries[0].message_deduplication_id.as_deref(),
        Some("order-1001")
    );
    assert_eq!(entries[1].message_group_id.as_deref(), Some("tenant-7"));
    assert_eq!(entries[1].message_deduplication_id, None);
}

#[test]
fn test_send_entries_forward_user_attributes() {
    let mut message = message(0);
    message
        .message_attributes
        .insert("retries".to_string(), MessageAttributeValue::number("3"));
    message.message_attributes.insert(
        "payload".to_string(),
        MessageAttributeValue::binary(vec![0xde, 0xad]),
    );

    let entries = build_send_entries(std::slice::from_ref(&message));

    assert_eq!(entries[0].message_attributes, message.message_attributes);
}

#[test]
fn test_system_attributes_are_not_forwarded_as_user_attributes() {
    let mut message = message(0);
    message
        .attributes
        .insert("ApproximateReceiveCount".to_string(), "4".to_string());

    let entries = build_send_entries(&[message]);

    assert!(entries[0].message_attributes.is_empty());
}

// ============================================================================
// Delete Entry Tests
// ============================================================================

#[test]
fn test_delete_entries_pair_ids_with_receipt_handles() {
    let batch = batch(4);

    let entries = build_delete_entries(&batch);

    assert_eq!(entries.len(), 4);
    for (entry, message) in entries.iter().zip(&batch) {
        assert_eq!(entry.id, message.message_id.to_string());
        assert_eq!(entry.receipt_handle, message.receipt_handle);
    }
}

#[test]
fn test_empty_batch_builds_no_entries() {
    assert!(build_send_entries(&[]).is_empty());
    assert!(build_delete_entries(&[]).is_empty());
}

// ============================================================================
// Clipping Tests
// ============================================================================

#[test]
fn test_clip_truncates_to_remaining_prefix() {
    let clipped = clip_batch(batch(10), 20, 25);

    assert_eq!(ids(&clipped), ids(&batch(5)));
}

#[test]
fn test_clip_is_noop_when_batch_fits() {
    assert_eq!(clip_batch(batch(10), 0, 10).len(), 10);
    assert_eq!(clip_batch(batch(3), 5, 100), batch(3));
}

#[test]
fn test_clip_saturates_when_already_over_target() {
    assert!(clip_batch(batch(10), 30, 25).is_empty());
    assert!(clip_batch(batch(10), 25, 25).is_empty());
}

#[test]
fn test_clip_never_exceeds_remaining() {
    for target in 0..=25u64 {
        for moved in 0..=target {
            for size in 0..=10usize {
                let clipped = clip_batch(batch(size), moved, target);
                assert!(clipped.len() as u64 <= target - moved);
                assert!(clipped.len() <= size);
            }
        }
    }
}
