//! Object put/get/head/delete and listing tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::error::ProvideErrorMetadata;
    use aws_sdk_s3::primitives::ByteStream;
    use reqwest::StatusCode;

    use crate::TestServer;

    #[tokio::test]
    async fn test_should_put_get_and_head_object() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("object").await;
        let put_etag = srv.put_object(&bucket, "hello.txt", b"Hello, s3mem!").await;

        let resp = srv
            .s3
            .get_object()
            .bucket(&bucket)
            .key("hello.txt")
            .send()
            .await
            .expect("get object");
        assert_eq!(resp.e_tag(), Some(put_etag.as_str()));
        assert!(resp.last_modified().is_some());
        let body = resp.body.collect().await.expect("read body").into_bytes();
        assert_eq!(body.as_ref(), b"Hello, s3mem!");

        let head = srv
            .s3
            .head_object()
            .bucket(&bucket)
            .key("hello.txt")
            .send()
            .await
            .expect("head object");
        assert_eq!(head.e_tag(), Some(put_etag.as_str()));
        assert_eq!(head.content_length(), Some(13));

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_overwrite_with_fresh_etag() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("overwrite").await;
        let first = srv.put_object(&bucket, "k", b"data1").await;
        let second = srv.put_object(&bucket, "k", b"data2").await;
        assert_ne!(first, second);
        assert_eq!(srv.get_bytes(&bucket, "k").await, b"data2");

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_round_trip_streamed_body() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("stream").await;
        let data: Vec<u8> = (0..=u8::MAX).cycle().take(256 * 1024).collect();

        srv.s3
            .put_object()
            .bucket(&bucket)
            .key("large.bin")
            .body(ByteStream::from(data.clone()))
            .send()
            .await
            .expect("put large object");

        let stored = srv
            .engine
            .get_object(&bucket, "large.bin")
            .expect("stored object");
        assert_eq!(stored.size, data.len() as u64);
        assert_eq!(srv.get_bytes(&bucket, "large.bin").await, data);

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_delete_object_and_report_no_such_key() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("delete").await;
        srv.put_object(&bucket, "gone.txt", b"bye").await;

        srv.s3
            .delete_object()
            .bucket(&bucket)
            .key("gone.txt")
            .send()
            .await
            .expect("delete object");

        let err = srv
            .s3
            .get_object()
            .bucket(&bucket)
            .key("gone.txt")
            .send()
            .await
            .expect_err("get of deleted object should fail");
        assert_eq!(
            err.raw_response().map(|r| r.status().as_u16()),
            Some(404)
        );
        assert!(err.into_service_error().is_no_such_key());

        let err = srv
            .s3
            .head_object()
            .bucket(&bucket)
            .key("gone.txt")
            .send()
            .await
            .expect_err("head of deleted object should fail");
        assert!(err.into_service_error().is_not_found());

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_report_no_such_bucket_for_object_calls() {
        let srv = TestServer::start().await;
        let err = srv
            .s3
            .put_object()
            .bucket("missing-bucket")
            .key("k")
            .body(ByteStream::from_static(b"x"))
            .send()
            .await
            .expect_err("put into missing bucket should fail");
        assert_eq!(err.into_service_error().code(), Some("NoSuchBucket"));

        let err = srv
            .s3
            .list_objects_v2()
            .bucket("missing-bucket")
            .send()
            .await
            .expect_err("list of missing bucket should fail");
        assert!(err.into_service_error().is_no_such_bucket());

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_handle_nested_keys_with_spaces() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("nested").await;
        srv.put_object(&bucket, "a/b/file name.txt", b"nested").await;

        let obj = srv
            .engine
            .get_object(&bucket, "a/b/file name.txt")
            .expect("stored key");
        assert_eq!(obj.data.as_deref(), Some(b"nested".as_slice()));
        assert_eq!(srv.get_bytes(&bucket, "a/b/file name.txt").await, b"nested");

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_store_decoded_signed_chunked_payload() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("chunked").await;

        // Signed streaming uploads frame each chunk with its signature.
        let resp = srv
            .http
            .put(srv.url(&format!("/{bucket}/chunked.bin")))
            .header("x-amz-content-sha256", "STREAMING-AWS4-HMAC-SHA256-PAYLOAD")
            .body("4;chunk-signature=aa\r\nabcd\r\n2;chunk-signature=bb\r\nef\r\n0;chunk-signature=cc\r\n\r\n")
            .send()
            .await
            .expect("put");
        assert_eq!(resp.status(), StatusCode::OK);

        let obj = srv
            .engine
            .get_object(&bucket, "chunked.bin")
            .expect("stored object");
        assert_eq!(obj.data.as_deref(), Some(b"abcdef".as_slice()));
        assert_eq!(obj.size, 6);

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_list_objects_by_prefix() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("listing").await;
        for key in ["logs/2024/b.log", "logs/2024/a.log", "images/cat.png"] {
            srv.put_object(&bucket, key, b"x").await;
        }

        let resp = srv
            .s3
            .list_objects_v2()
            .bucket(&bucket)
            .prefix("logs/")
            .send()
            .await
            .expect("list with prefix");
        assert_eq!(resp.key_count(), Some(2));
        let keys: Vec<&str> = resp.contents().iter().filter_map(|o| o.key()).collect();
        assert_eq!(keys, ["logs/2024/a.log", "logs/2024/b.log"]);
        assert!(resp.contents().iter().all(|o| o.size() == Some(1)));

        let resp = srv
            .s3
            .list_objects_v2()
            .bucket(&bucket)
            .send()
            .await
            .expect("list all");
        assert_eq!(resp.key_count(), Some(3));

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_keep_object_when_part_upload_lacks_upload_id() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("halfpart").await;
        srv.put_object(&bucket, "k", b"original").await;

        // The SDK always pairs these parameters, so send the request by hand.
        let resp = srv
            .http
            .put(srv.url(&format!("/{bucket}/k?partNumber=1")))
            .body("clobber")
            .send()
            .await
            .expect("put");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = resp.text().await.expect("body");
        assert!(body.contains("<Code>InvalidRequest</Code>"));

        let resp = srv
            .http
            .put(srv.url(&format!("/{bucket}/k?retention")))
            .body("<Retention><Mode>GOVERNANCE</Mode></Retention>")
            .send()
            .await
            .expect("put retention");
        assert_eq!(resp.status(), StatusCode::OK);

        assert_eq!(srv.get_bytes(&bucket, "k").await, b"original");

        srv.shutdown().await;
    }
}
