//! Tests for message types.

use super::*;

// ============================================================================
// QueueName Tests
// ============================================================================

mod queue_name_tests {
    use super::*;

    #[test]
    fn test_valid_standard_queue_name() {
        let name = QueueName::new("orders-dlq_1".to_string()).unwrap();
        assert_eq!(name.as_str(), "orders-dlq_1");
        assert!(!name.is_fifo());
    }

    #[test]
    fn test_valid_fifo_queue_name() {
        let name: QueueName = "orders.fifo".parse().unwrap();
        assert!(name.is_fifo());
    }

    #[test]
    fn test_empty_queue_name_rejected() {
        let result = QueueName::new(String::new());
        assert!(matches!(result, Err(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn test_overlong_queue_name_rejected() {
        let result = QueueName::new("a".repeat(81));
        assert!(matches!(result, Err(ValidationError::OutOfRange { .. })));

        assert!(QueueName::new("a".repeat(80)).is_ok());
    }

    #[test]
    fn test_invalid_characters_rejected() {
        for name in ["orders dlq", "orders.dlq", "orders/dlq", "ördersdlq"] {
            let result = QueueName::new(name.to_string());
            assert!(
                matches!(result, Err(ValidationError::InvalidFormat { .. })),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_bare_fifo_suffix_rejected() {
        let result = QueueName::new(".fifo".to_string());
        assert!(matches!(result, Err(ValidationError::InvalidFormat { .. })));
    }
}

// ============================================================================
// QueueUrl Tests
// ============================================================================

mod queue_url_tests {
    use super::*;

    #[test]
    fn test_queue_url_exposes_queue_name() {
        let url = QueueUrl::new(
            "https://sqs.us-east-1.amazonaws.com/123456789012/orders-dlq".to_string(),
        )
        .unwrap();

        assert_eq!(url.queue_name(), "orders-dlq");
    }

    #[test]
    fn test_relative_queue_url_rejected() {
        let result = QueueUrl::new("123456789012/orders-dlq".to_string());
        assert!(matches!(result, Err(ValidationError::InvalidFormat { .. })));
    }
}

// ============================================================================
// ReceivedMessage Tests
// ============================================================================

mod received_message_tests {
    use super::*;

    fn message_with_attributes(attributes: &[(&str, &str)]) -> ReceivedMessage {
        ReceivedMessage {
            message_id: "m-1".parse().unwrap(),
            receipt_handle: "r-1".parse().unwrap(),
            body: "{}".to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            message_attributes: HashMap::new(),
        }
    }

    #[test]
    fn test_fifo_attributes_are_exposed() {
        let message = message_with_attributes(&[
            (MESSAGE_GROUP_ID_ATTRIBUTE, "group-a"),
            (MESSAGE_DEDUPLICATION_ID_ATTRIBUTE, "dedup-1"),
        ]);

        assert_eq!(message.message_group_id(), Some("group-a"));
        assert_eq!(message.message_deduplication_id(), Some("dedup-1"));
    }

    #[test]
    fn test_missing_fifo_attributes_are_none() {
        let message = message_with_attributes(&[("ApproximateReceiveCount", "3")]);

        assert_eq!(message.message_group_id(), None);
        assert_eq!(message.message_deduplication_id(), None);
    }
}

#[test]
fn test_empty_identifiers_rejected() {
    assert!("".parse::<MessageId>().is_err());
    assert!("".parse::<ReceiptHandle>().is_err());
}

#[test]
fn test_receive_options_defaults() {
    let options = ReceiveOptions::default();
    assert_eq!(options.max_messages, 10);
    assert_eq!(options.visibility_timeout_secs, 2);
    assert_eq!(options.wait_time_secs, 0);
}

#[test]
fn test_failed_entry_display() {
    let entry = FailedEntry {
        id: "3".to_string(),
        code: "InternalError".to_string(),
        message: Some("try again".to_string()),
        sender_fault: false,
    };
    assert_eq!(entry.to_string(), "3: InternalError (try again)");
}
