//! Tests for attachment gathering and retrieval.

use proptest::prelude::*;

use crate::attachments::{DEFAULT_ATTACHMENT_NAME, gather};
use crate::cards::{Card, ContentItem};

/// Generate plausible attachment source URLs.
fn url_strategy() -> impl Strategy<Value = String> {
    "https://[a-z0-9]{3,12}\\.example\\.com/[a-z0-9]{1,16}\\.png"
}

/// Generate optional attachment file names.
fn name_strategy() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[a-z0-9]{1,12}\\.png")
}

proptest! {
    /// Message attachments always shadow prior cards, keep their order,
    /// and unnamed ones get the default name.
    #[test]
    fn message_items_shadow_prior_cards(
        sources in prop::collection::vec((url_strategy(), name_strategy()), 1..4)
    ) {
        let items: Vec<ContentItem> = sources
            .iter()
            .map(|(url, name)| ContentItem::image_file(url.clone(), name.clone()))
            .collect();
        let prior = vec![Card::image("data:image/png;base64,aGVsbG8=", "earlier output")];

        let gathered = gather(&items, &prior);

        prop_assert_eq!(gathered.len(), sources.len());
        for (attachment, (url, name)) in gathered.iter().zip(&sources) {
            prop_assert_eq!(&attachment.url, url);
            let expected = name
                .clone()
                .unwrap_or_else(|| DEFAULT_ATTACHMENT_NAME.to_string());
            prop_assert_eq!(&attachment.name, &expected);
        }
    }
}

#[cfg(test)]
mod gather_tests {
    use super::*;
    use crate::attachments::PRIOR_OUTPUT_NAME;
    use crate::cards::{FileMetadata, IMAGE_FILE_TYPE, ImagePayload, SyncInfo};

    fn text_item() -> ContentItem {
        ContentItem {
            item_type: "text".to_string(),
            sync: None,
            metadata: None,
        }
    }

    #[test]
    fn message_image_wins_over_prior_cards() {
        let items = vec![ContentItem::image_file(
            "https://files.example.com/cat.png",
            Some("cat.png".to_string()),
        )];
        let prior = vec![Card::image("data:image/png;base64,aGVsbG8=", "earlier")];

        let gathered = gather(&items, &prior);

        assert_eq!(gathered.len(), 1);
        assert_eq!(gathered[0].url, "https://files.example.com/cat.png");
        assert_eq!(gathered[0].name, "cat.png");
    }

    #[test]
    fn falls_back_to_prior_cards_without_message_images() {
        let items = vec![text_item()];
        let prior = vec![Card::image("data:image/png;base64,aGVsbG8=", "earlier")];

        let gathered = gather(&items, &prior);

        assert_eq!(gathered.len(), 1);
        assert_eq!(gathered[0].url, "data:image/png;base64,aGVsbG8=");
        assert_eq!(gathered[0].name, PRIOR_OUTPUT_NAME);
    }

    #[test]
    fn fallback_skips_non_image_cards() {
        let prior = vec![
            Card {
                card_type: "poll".to_string(),
                image: ImagePayload {
                    url: "ignored".to_string(),
                    alt: None,
                    sync: None,
                },
            },
            Card::image("data:image/png;base64,aGVsbG8=", "earlier"),
        ];

        let gathered = gather(&[], &prior);

        assert_eq!(gathered.len(), 1);
        assert_eq!(gathered[0].url, "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn unresolvable_image_item_is_skipped() {
        let items = vec![ContentItem {
            item_type: IMAGE_FILE_TYPE.to_string(),
            sync: None,
            metadata: Some(FileMetadata {
                name: Some("ghost.png".to_string()),
                base64: None,
            }),
        }];

        assert!(gather(&items, &[]).is_empty());
    }

    #[test]
    fn skipped_items_still_allow_fallback() {
        let items = vec![ContentItem {
            item_type: IMAGE_FILE_TYPE.to_string(),
            sync: None,
            metadata: None,
        }];
        let prior = vec![Card::image("data:image/png;base64,aGVsbG8=", "earlier")];

        let gathered = gather(&items, &prior);

        assert_eq!(gathered.len(), 1);
        assert_eq!(gathered[0].name, PRIOR_OUTPUT_NAME);
    }

    #[test]
    fn inline_copy_is_used_when_no_synced_url() {
        let items = vec![ContentItem {
            item_type: IMAGE_FILE_TYPE.to_string(),
            sync: None,
            metadata: Some(FileMetadata {
                name: Some("inline.png".to_string()),
                base64: Some("data:image/png;base64,aGVsbG8=".to_string()),
            }),
        }];

        let gathered = gather(&items, &[]);

        assert_eq!(gathered.len(), 1);
        assert_eq!(gathered[0].url, "data:image/png;base64,aGVsbG8=");
        assert_eq!(gathered[0].name, "inline.png");
    }

    #[test]
    fn synced_url_wins_over_inline_copy() {
        let items = vec![ContentItem {
            item_type: IMAGE_FILE_TYPE.to_string(),
            sync: Some(SyncInfo {
                url: Some("https://files.example.com/synced.png".to_string()),
            }),
            metadata: Some(FileMetadata {
                name: Some("synced.png".to_string()),
                base64: Some("data:image/png;base64,aGVsbG8=".to_string()),
            }),
        }];

        let gathered = gather(&items, &[]);

        assert_eq!(gathered[0].url, "https://files.example.com/synced.png");
    }

    #[test]
    fn empty_everything_yields_no_attachments() {
        assert!(gather(&[], &[]).is_empty());
    }
}

#[cfg(test)]
mod fetch_tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::attachments::{ImageAttachment, fetch_all};
    use crate::error::Error;

    fn client() -> reqwest::Client {
        reqwest::Client::new()
    }

    fn attachment(url: impl Into<String>, name: &str) -> ImageAttachment {
        ImageAttachment {
            url: url.into(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn fetches_remote_image_with_mime() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/images/cat.png"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"png bytes".to_vec(), "image/png"))
            .mount(&mock_server)
            .await;

        let attachments = vec![attachment(
            format!("{}/images/cat.png", mock_server.uri()),
            "cat.png",
        )];

        let fetched = fetch_all(&client(), &attachments).await.unwrap();

        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].bytes, b"png bytes");
        assert_eq!(fetched[0].name, "cat.png");
        assert_eq!(fetched[0].mime.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn fetch_failure_names_the_attachment() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/images/missing.png"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
            .mount(&mock_server)
            .await;

        let attachments = vec![attachment(
            format!("{}/images/missing.png", mock_server.uri()),
            "missing.png",
        )];

        let err = fetch_all(&client(), &attachments).await.unwrap_err();

        assert!(matches!(err, Error::Attachment { .. }));
        let msg = err.to_string();
        assert!(
            msg.contains("missing.png") && msg.contains("404"),
            "Error should name the attachment and status: {}",
            msg
        );
    }

    #[tokio::test]
    async fn fetch_preserves_attachment_order() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/a.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"alpha".to_vec()))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/b.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"bravo".to_vec()))
            .mount(&mock_server)
            .await;

        let attachments = vec![
            attachment(format!("{}/b.png", mock_server.uri()), "b.png"),
            attachment(format!("{}/a.png", mock_server.uri()), "a.png"),
        ];

        let fetched = fetch_all(&client(), &attachments).await.unwrap();

        assert_eq!(fetched[0].bytes, b"bravo");
        assert_eq!(fetched[1].bytes, b"alpha");
    }

    #[tokio::test]
    async fn data_uri_is_decoded_locally() {
        let attachments = vec![attachment("data:image/png;base64,aGVsbG8=", "inline.png")];

        let fetched = fetch_all(&client(), &attachments).await.unwrap();

        assert_eq!(fetched[0].bytes, b"hello");
        assert_eq!(fetched[0].name, "inline.png");
        assert_eq!(fetched[0].mime.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn malformed_data_uri_is_rejected() {
        let attachments = vec![attachment("data:image/png,rawbytes", "bad.png")];

        let err = fetch_all(&client(), &attachments).await.unwrap_err();

        assert!(err.to_string().contains("Malformed data URI"));
    }

    #[tokio::test]
    async fn invalid_base64_is_rejected() {
        let attachments = vec![attachment("data:image/png;base64,@@@", "bad.png")];

        let err = fetch_all(&client(), &attachments).await.unwrap_err();

        assert!(err.to_string().contains("Invalid base64 data"));
    }

    #[tokio::test]
    async fn mixes_remote_and_inline_sources() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/remote.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"remote".to_vec()))
            .mount(&mock_server)
            .await;

        let attachments = vec![
            attachment(format!("{}/remote.png", mock_server.uri()), "remote.png"),
            attachment("data:image/png;base64,aGVsbG8=", "inline.png"),
        ];

        let fetched = fetch_all(&client(), &attachments).await.unwrap();

        assert_eq!(fetched[0].bytes, b"remote");
        assert_eq!(fetched[1].bytes, b"hello");
    }
}
