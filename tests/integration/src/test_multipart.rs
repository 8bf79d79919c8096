//! Multipart upload tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::error::ProvideErrorMetadata;
    use aws_sdk_s3::primitives::ByteStream;
    use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
    use reqwest::StatusCode;

    use crate::TestServer;

    async fn initiate(srv: &TestServer, bucket: &str, key: &str) -> String {
        srv.s3
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .expect("create_multipart_upload")
            .upload_id()
            .expect("upload_id")
            .to_owned()
    }

    async fn upload_part(
        srv: &TestServer,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: i32,
        data: &'static [u8],
    ) -> String {
        srv.s3
            .upload_part()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .part_number(part_number)
            .body(ByteStream::from_static(data))
            .send()
            .await
            .expect("upload part")
            .e_tag()
            .expect("part etag")
            .to_owned()
    }

    fn completed(parts: &[(i32, &str)]) -> CompletedMultipartUpload {
        parts
            .iter()
            .fold(CompletedMultipartUpload::builder(), |builder, (n, etag)| {
                builder.parts(CompletedPart::builder().part_number(*n).e_tag(*etag).build())
            })
            .build()
    }

    #[tokio::test]
    async fn test_should_assemble_parts_in_order() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("mpu").await;
        let upload_id = initiate(&srv, &bucket, "big.bin").await;

        // Parts arrive out of order.
        let e3 = upload_part(&srv, &bucket, "big.bin", &upload_id, 3, b"CD").await;
        let e1 = upload_part(&srv, &bucket, "big.bin", &upload_id, 1, b"A").await;
        let e2 = upload_part(&srv, &bucket, "big.bin", &upload_id, 2, b"B").await;

        let err = srv
            .s3
            .head_object()
            .bucket(&bucket)
            .key("big.bin")
            .send()
            .await
            .expect_err("open upload should not be readable");
        assert!(err.into_service_error().is_not_found());

        let complete = srv
            .s3
            .complete_multipart_upload()
            .bucket(&bucket)
            .key("big.bin")
            .upload_id(&upload_id)
            .multipart_upload(completed(&[(1, &e1), (2, &e2), (3, &e3)]))
            .send()
            .await
            .expect("complete_multipart_upload");
        assert_eq!(complete.key(), Some("big.bin"));
        let final_etag = complete.e_tag().expect("completed etag").to_owned();

        let resp = srv
            .s3
            .get_object()
            .bucket(&bucket)
            .key("big.bin")
            .send()
            .await
            .expect("get assembled object");
        assert_eq!(resp.e_tag(), Some(final_etag.as_str()));
        let data = resp.body.collect().await.expect("read body").into_bytes();
        assert_eq!(data.as_ref(), b"ABCD");

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_return_same_etag_on_repeated_complete() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("idem").await;
        let upload_id = initiate(&srv, &bucket, "k").await;
        let e1 = upload_part(&srv, &bucket, "k", &upload_id, 1, b"xyz").await;

        let mut etags = Vec::new();
        for _ in 0..2 {
            let complete = srv
                .s3
                .complete_multipart_upload()
                .bucket(&bucket)
                .key("k")
                .upload_id(&upload_id)
                .multipart_upload(completed(&[(1, &e1)]))
                .send()
                .await
                .expect("complete_multipart_upload");
            etags.push(complete.e_tag().map(ToOwned::to_owned));
        }
        assert!(etags[0].is_some());
        assert_eq!(etags[0], etags[1]);

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_reject_mismatched_part_etag() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("mismatch").await;
        let upload_id = initiate(&srv, &bucket, "k").await;
        upload_part(&srv, &bucket, "k", &upload_id, 1, b"one").await;

        let err = srv
            .s3
            .complete_multipart_upload()
            .bucket(&bucket)
            .key("k")
            .upload_id(&upload_id)
            .multipart_upload(completed(&[(1, "\"not-the-etag\"")]))
            .send()
            .await
            .expect_err("mismatched etag should fail");
        assert_eq!(
            err.raw_response().map(|r| r.status().as_u16()),
            Some(400)
        );
        assert_eq!(err.into_service_error().code(), Some("InvalidPart"));

        let err = srv
            .s3
            .get_object()
            .bucket(&bucket)
            .key("k")
            .send()
            .await
            .expect_err("failed upload should not be readable");
        assert!(err.into_service_error().is_no_such_key());

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_reject_unknown_part_and_upload() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("unknown").await;
        let upload_id = initiate(&srv, &bucket, "k").await;
        let e1 = upload_part(&srv, &bucket, "k", &upload_id, 1, b"one").await;

        let err = srv
            .s3
            .complete_multipart_upload()
            .bucket(&bucket)
            .key("k")
            .upload_id(&upload_id)
            .multipart_upload(completed(&[(1, &e1), (2, &e1)]))
            .send()
            .await
            .expect_err("unknown part should fail");
        assert_eq!(err.into_service_error().code(), Some("InvalidPart"));

        let err = srv
            .s3
            .complete_multipart_upload()
            .bucket(&bucket)
            .key("k")
            .upload_id("wrong-upload-id")
            .multipart_upload(completed(&[(1, &e1)]))
            .send()
            .await
            .expect_err("unknown upload should fail");
        assert_eq!(
            err.raw_response().map(|r| r.status().as_u16()),
            Some(404)
        );
        assert_eq!(err.into_service_error().code(), Some("NoSuchUpload"));

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_reject_malformed_complete_body() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("malformed").await;
        let upload_id = initiate(&srv, &bucket, "k").await;

        // The SDK only emits well-formed documents.
        let resp = srv
            .http
            .post(srv.url(&format!("/{bucket}/k?uploadId={upload_id}")))
            .body("<CompleteMultipartUpload><Part>")
            .send()
            .await
            .expect("complete");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = resp.text().await.expect("body");
        assert!(body.contains("<Code>MalformedXML</Code>"));

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_abort_upload() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("abort").await;
        let upload_id = initiate(&srv, &bucket, "k").await;
        upload_part(&srv, &bucket, "k", &upload_id, 1, b"one").await;

        srv.s3
            .abort_multipart_upload()
            .bucket(&bucket)
            .key("k")
            .upload_id(&upload_id)
            .send()
            .await
            .expect("abort_multipart_upload");
        assert!(srv.engine.get_object(&bucket, "k").is_err());

        let err = srv
            .s3
            .upload_part()
            .bucket(&bucket)
            .key("k")
            .upload_id(&upload_id)
            .part_number(2)
            .body(ByteStream::from_static(b"two"))
            .send()
            .await
            .expect_err("upload to aborted upload should fail");
        assert_eq!(
            err.raw_response().map(|r| r.status().as_u16()),
            Some(404)
        );

        srv.shutdown().await;
    }
}
