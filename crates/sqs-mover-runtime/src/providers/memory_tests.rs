//! Tests for in-memory queue provider.

use super::*;

fn queue_name(name: &str) -> QueueName {
    QueueName::new(name.to_string()).unwrap()
}

fn send_entry(id: &str, body: &str) -> SendEntry {
    SendEntry {
        id: id.to_string(),
        body: body.to_string(),
        message_attributes: HashMap::new(),
        message_group_id: None,
        message_deduplication_id: None,
    }
}

fn receive_options(max_messages: u32, visibility_timeout_secs: u32) -> ReceiveOptions {
    ReceiveOptions {
        max_messages,
        visibility_timeout_secs,
        wait_time_secs: 0,
    }
}

async fn seeded_queue(provider: &InMemoryProvider, name: &str, count: usize) -> QueueUrl {
    let url = provider.create_queue(&queue_name(name)).unwrap();
    let entries: Vec<SendEntry> = (0..count)
        .map(|i| send_entry(&i.to_string(), &format!("body-{}", i)))
        .collect();
    for chunk in entries.chunks(10) {
        provider.send_message_batch(&url, chunk).await.unwrap();
    }
    url
}

// ============================================================================
// Queue Management Tests
// ============================================================================

mod queue_management {
    use super::*;

    #[tokio::test]
    async fn test_resolve_existing_queue() {
        let provider = InMemoryProvider::new();
        let created = provider.create_queue(&queue_name("orders")).unwrap();

        let resolved = provider
            .resolve_queue_url(&queue_name("orders"))
            .await
            .unwrap();

        assert_eq!(created, resolved);
        assert_eq!(resolved.queue_name(), "orders");
    }

    #[tokio::test]
    async fn test_resolve_missing_queue_fails() {
        let provider = InMemoryProvider::new();

        let result = provider.resolve_queue_url(&queue_name("missing")).await;

        assert!(matches!(result, Err(QueueError::QueueNotFound { .. })));
    }

    #[test]
    fn test_create_queue_is_idempotent() {
        let provider = InMemoryProvider::new();
        let first = provider.create_queue(&queue_name("orders")).unwrap();
        let second = provider.create_queue(&queue_name("orders")).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let provider = InMemoryProvider::new();
        let clone = provider.clone();
        provider.create_queue(&queue_name("shared")).unwrap();

        assert!(clone.resolve_queue_url(&queue_name("shared")).await.is_ok());
    }
}

// ============================================================================
// Receive Tests
// ============================================================================

mod receive {
    use super::*;

    #[tokio::test]
    async fn test_receive_respects_max_messages_and_order() {
        let provider = InMemoryProvider::new();
        let url = seeded_queue(&provider, "source", 15).await;

        let batch = provider
            .receive_messages(&url, &receive_options(10, 30))
            .await
            .unwrap();

        assert_eq!(batch.len(), 10);
        let bodies: Vec<&str> = batch.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies[0], "body-0");
        assert_eq!(bodies[9], "body-9");
        assert_eq!(provider.in_flight_count(&url).unwrap(), 10);
        assert_eq!(provider.approximate_message_count(&url).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_receive_from_empty_queue_returns_empty_batch() {
        let provider = InMemoryProvider::new();
        let url = provider.create_queue(&queue_name("empty")).unwrap();

        let batch = provider
            .receive_messages(&url, &receive_options(10, 30))
            .await
            .unwrap();

        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_expired_lease_returns_message_to_front() {
        let provider = InMemoryProvider::new();
        let url = seeded_queue(&provider, "source", 3).await;

        let first = provider
            .receive_messages(&url, &receive_options(1, 0))
            .await
            .unwrap();
        assert_eq!(first[0].body, "body-0");

        let second = provider
            .receive_messages(&url, &receive_options(3, 30))
            .await
            .unwrap();

        let bodies: Vec<&str> = second.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["body-0", "body-1", "body-2"]);
        assert_eq!(second[0].attributes.get("ApproximateReceiveCount").unwrap(), "2");
        assert_ne!(first[0].receipt_handle, second[0].receipt_handle);
    }

    #[tokio::test]
    async fn test_receive_exposes_fifo_attributes() {
        let provider = InMemoryProvider::new();
        let url = provider.create_queue(&queue_name("orders.fifo")).unwrap();
        let mut entry = send_entry("1", "payload");
        entry.message_group_id = Some("group-a".to_string());
        entry.message_deduplication_id = Some("dedup-1".to_string());
        entry
            .message_attributes
            .insert("trace".to_string(), MessageAttributeValue::string("abc"));
        provider.send_message_batch(&url, &[entry]).await.unwrap();

        let batch = provider
            .receive_messages(&url, &receive_options(10, 30))
            .await
            .unwrap();

        assert_eq!(batch[0].message_group_id(), Some("group-a"));
        assert_eq!(batch[0].message_deduplication_id(), Some("dedup-1"));
        assert_eq!(
            batch[0].message_attributes.get("trace"),
            Some(&MessageAttributeValue::string("abc"))
        );
    }
}

// ============================================================================
// Batch Send/Delete Tests
// ============================================================================

mod batches {
    use super::*;

    #[tokio::test]
    async fn test_send_batch_over_limit_rejected() {
        let provider = InMemoryProvider::new();
        let url = provider.create_queue(&queue_name("dest")).unwrap();
        let entries: Vec<SendEntry> = (0..11).map(|i| send_entry(&i.to_string(), "x")).collect();

        let result = provider.send_message_batch(&url, &entries).await;

        assert!(matches!(
            result,
            Err(QueueError::BatchTooLarge {
                size: 11,
                max_size: 10
            })
        ));
    }

    #[tokio::test]
    async fn test_send_batch_with_duplicate_ids_rejected() {
        let provider = InMemoryProvider::new();
        let url = provider.create_queue(&queue_name("dest")).unwrap();
        let entries = vec![send_entry("1", "a"), send_entry("1", "b")];

        let result = provider.send_message_batch(&url, &entries).await;

        assert!(matches!(result, Err(QueueError::ValidationError(_))));
        assert!(provider.visible_messages(&url).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fifo_queue_rejects_entries_without_group() {
        let provider = InMemoryProvider::new();
        let url = provider.create_queue(&queue_name("dest.fifo")).unwrap();
        let mut grouped = send_entry("1", "a");
        grouped.message_group_id = Some("g".to_string());
        let ungrouped = send_entry("2", "b");

        let result = provider
            .send_message_batch(&url, &[grouped, ungrouped])
            .await
            .unwrap();

        assert_eq!(result.successful, vec!["1".to_string()]);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].id, "2");
        assert_eq!(result.failed[0].code, "MissingParameter");
        assert!(result.failed[0].sender_fault);
    }

    #[tokio::test]
    async fn test_delete_removes_leased_messages() {
        let provider = InMemoryProvider::new();
        let url = seeded_queue(&provider, "source", 2).await;
        let batch = provider
            .receive_messages(&url, &receive_options(10, 30))
            .await
            .unwrap();
        let entries: Vec<DeleteEntry> = batch
            .iter()
            .map(|m| DeleteEntry {
                id: m.message_id.to_string(),
                receipt_handle: m.receipt_handle.clone(),
            })
            .collect();

        let result = provider.delete_message_batch(&url, &entries).await.unwrap();

        assert_eq!(result.successful.len(), 2);
        assert!(result.failed.is_empty());
        assert_eq!(provider.in_flight_count(&url).unwrap(), 0);
        assert_eq!(provider.approximate_message_count(&url).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_with_unknown_receipt_reports_failed_entry() {
        let provider = InMemoryProvider::new();
        let url = provider.create_queue(&queue_name("source")).unwrap();
        let entry = DeleteEntry {
            id: "1".to_string(),
            receipt_handle: "bogus".parse().unwrap(),
        };

        let result = provider.delete_message_batch(&url, &[entry]).await.unwrap();

        assert!(result.successful.is_empty());
        assert_eq!(result.failed[0].code, "ReceiptHandleIsInvalid");
    }

    #[tokio::test]
    async fn test_operations_on_unknown_queue_fail() {
        let provider = InMemoryProvider::new();
        let url = QueueUrl::new("memory://local/ghost".to_string()).unwrap();

        let result = provider.send_message_batch(&url, &[send_entry("1", "a")]).await;

        assert!(matches!(result, Err(QueueError::QueueNotFound { .. })));
    }
}
