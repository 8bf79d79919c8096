//! Object tagging tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::error::ProvideErrorMetadata;
    use aws_sdk_s3::types::{Tag, Tagging};

    use crate::TestServer;

    fn tagging(pairs: &[(&str, &str)]) -> Tagging {
        pairs
            .iter()
            .fold(Tagging::builder(), |builder, (key, value)| {
                builder.tag_set(
                    Tag::builder()
                        .key(*key)
                        .value(*value)
                        .build()
                        .expect("tag"),
                )
            })
            .build()
            .expect("tagging")
    }

    async fn stored_tags(srv: &TestServer, bucket: &str, key: &str) -> Vec<(String, String)> {
        srv.s3
            .get_object_tagging()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .expect("get_object_tagging")
            .tag_set()
            .iter()
            .map(|t| (t.key().to_owned(), t.value().to_owned()))
            .collect()
    }

    #[tokio::test]
    async fn test_should_replace_read_and_clear_tags() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("tags").await;
        srv.put_object(&bucket, "doc.txt", b"tagged").await;

        // Setting the same tags twice leaves the same state.
        for _ in 0..2 {
            srv.s3
                .put_object_tagging()
                .bucket(&bucket)
                .key("doc.txt")
                .tagging(tagging(&[("team", "storage"), ("env", "prod")]))
                .send()
                .await
                .expect("put_object_tagging");
        }

        assert_eq!(
            stored_tags(&srv, &bucket, "doc.txt").await,
            [
                ("env".to_owned(), "prod".to_owned()),
                ("team".to_owned(), "storage".to_owned()),
            ]
        );

        srv.s3
            .delete_object_tagging()
            .bucket(&bucket)
            .key("doc.txt")
            .send()
            .await
            .expect("delete_object_tagging");
        assert!(stored_tags(&srv, &bucket, "doc.txt").await.is_empty());

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_reject_invalid_tag_sets() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("badtags").await;
        srv.put_object(&bucket, "doc.txt", b"tagged").await;
        srv.s3
            .put_object_tagging()
            .bucket(&bucket)
            .key("doc.txt")
            .tagging(tagging(&[("env", "prod")]))
            .send()
            .await
            .expect("put_object_tagging");

        let long_key = "k".repeat(129);
        let long_value = "v".repeat(257);
        let many_keys: Vec<String> = (0..11).map(|i| format!("k{i}")).collect();
        let many = many_keys.iter().map(|k| (k.as_str(), "")).collect();
        let cases: [(&str, Vec<(&str, &str)>); 5] = [
            ("duplicate key", vec![("a", "1"), ("a", "2")]),
            ("empty key", vec![("", "1")]),
            ("long key", vec![(long_key.as_str(), "1")]),
            ("long value", vec![("a", long_value.as_str())]),
            ("too many tags", many),
        ];

        for (name, pairs) in cases {
            let err = srv
                .s3
                .put_object_tagging()
                .bucket(&bucket)
                .key("doc.txt")
                .tagging(tagging(&pairs))
                .send()
                .await
                .expect_err(name);
            assert_eq!(
                err.raw_response().map(|r| r.status().as_u16()),
                Some(400),
                "{name}"
            );
            assert_eq!(
                err.into_service_error().code(),
                Some("InvalidRequest"),
                "{name}"
            );
        }

        assert_eq!(
            stored_tags(&srv, &bucket, "doc.txt").await,
            [("env".to_owned(), "prod".to_owned())]
        );

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_report_missing_object_for_tagging() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("notags").await;

        let err = srv
            .s3
            .get_object_tagging()
            .bucket(&bucket)
            .key("missing")
            .send()
            .await
            .expect_err("tags of missing object should fail");
        assert_eq!(
            err.raw_response().map(|r| r.status().as_u16()),
            Some(404)
        );
        assert_eq!(err.into_service_error().code(), Some("NoSuchKey"));

        srv.shutdown().await;
    }
}
