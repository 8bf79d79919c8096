//! Bucket lifecycle, policy, and location tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::error::ProvideErrorMetadata;
    use reqwest::StatusCode;
    use s3mem_core::S3MemConfig;

    use crate::{TestServer, test_bucket_name};

    #[tokio::test]
    async fn test_should_create_head_and_list_buckets() {
        let srv = TestServer::start().await;
        let b1 = srv.create_test_bucket("list1").await;
        let b2 = srv.create_test_bucket("list2").await;

        srv.s3
            .head_bucket()
            .bucket(&b1)
            .send()
            .await
            .expect("head bucket");

        let resp = srv.s3.list_buckets().send().await.expect("list buckets");
        let names: Vec<&str> = resp.buckets().iter().filter_map(|b| b.name()).collect();
        assert!(names.contains(&b1.as_str()));
        assert!(names.contains(&b2.as_str()));
        assert!(resp.buckets().iter().all(|b| b.creation_date().is_some()));
        assert_eq!(
            resp.owner().and_then(|o| o.id()),
            Some("minioadmin"),
            "owner is the configured access key"
        );

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_bucket_without_touching_it() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("dup").await;
        let created = srv.engine.list_buckets()[0].created;

        let err = srv
            .s3
            .create_bucket()
            .bucket(&bucket)
            .send()
            .await
            .expect_err("duplicate create should fail");
        assert_eq!(
            err.raw_response().map(|r| r.status().as_u16()),
            Some(409)
        );
        assert!(err.into_service_error().is_bucket_already_owned_by_you());
        assert_eq!(srv.engine.list_buckets()[0].created, created);

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_answer_not_found_for_missing_bucket_head() {
        let srv = TestServer::start().await;
        let err = srv
            .s3
            .head_bucket()
            .bucket(test_bucket_name("ghost"))
            .send()
            .await
            .expect_err("head of missing bucket should fail");
        assert_eq!(
            err.raw_response().map(|r| r.status().as_u16()),
            Some(404)
        );
        assert!(err.into_service_error().is_not_found());

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_guard_non_empty_bucket_delete() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("nonempty").await;
        srv.put_object(&bucket, "keep.txt", b"data").await;

        let err = srv
            .s3
            .delete_bucket()
            .bucket(&bucket)
            .send()
            .await
            .expect_err("delete of non-empty bucket should fail");
        assert_eq!(err.into_service_error().code(), Some("BucketNotEmpty"));
        assert!(srv.engine.get_object(&bucket, "keep.txt").is_ok());

        // The force-delete header is a MinIO extension the SDK has no field for.
        let bucket_url = srv.url(&format!("/{bucket}"));
        let resp = srv
            .http
            .delete(&bucket_url)
            .header("x-minio-force-delete", "yes-please")
            .send()
            .await
            .expect("delete");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = resp.text().await.expect("body");
        assert!(body.contains("<Code>InvalidRequest</Code>"));
        assert!(srv.engine.bucket_exists(&bucket));

        let resp = srv
            .http
            .delete(&bucket_url)
            .header("x-minio-force-delete", "true")
            .send()
            .await
            .expect("delete");
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(!srv.engine.bucket_exists(&bucket));

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_delete_empty_bucket() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("empty").await;

        srv.s3
            .delete_bucket()
            .bucket(&bucket)
            .send()
            .await
            .expect("delete bucket");

        let err = srv
            .s3
            .head_bucket()
            .bucket(&bucket)
            .send()
            .await
            .expect_err("deleted bucket should be gone");
        assert!(err.into_service_error().is_not_found());

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_store_and_clear_bucket_policy() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("policy").await;
        let policy = r#"{"Version":"2012-10-17","Statement":[]}"#;

        srv.s3
            .put_bucket_policy()
            .bucket(&bucket)
            .policy(policy)
            .send()
            .await
            .expect("put policy");

        let resp = srv
            .s3
            .get_bucket_policy()
            .bucket(&bucket)
            .send()
            .await
            .expect("get policy");
        assert_eq!(resp.policy(), Some(policy));

        srv.s3
            .delete_bucket_policy()
            .bucket(&bucket)
            .send()
            .await
            .expect("delete policy");
        assert_eq!(srv.engine.get_bucket_policy(&bucket).as_deref(), Some(""));

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_report_configured_region_as_location() {
        let config = S3MemConfig::builder()
            .listen("127.0.0.1:0".to_owned())
            .region("eu-central-1".to_owned())
            .build();
        let srv = TestServer::start_with(config).await;
        let bucket = srv.create_test_bucket("location").await;

        let resp = srv
            .s3
            .get_bucket_location()
            .bucket(&bucket)
            .send()
            .await
            .expect("get location");
        assert_eq!(
            resp.location_constraint().map(|c| c.as_str()),
            Some("eu-central-1")
        );

        let err = srv
            .s3
            .get_bucket_location()
            .bucket(test_bucket_name("nowhere"))
            .send()
            .await
            .expect_err("location of missing bucket should fail");
        assert_eq!(err.into_service_error().code(), Some("NoSuchBucket"));

        srv.shutdown().await;
    }

    #[tokio::test]
    async fn test_should_set_common_headers_and_serve_health() {
        let srv = TestServer::start().await;
        let resp = srv
            .http
            .get(srv.url("/minio/health/live"))
            .send()
            .await
            .expect("health");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("server").and_then(|v| v.to_str().ok()),
            Some("s3mem")
        );
        assert!(resp.headers().contains_key("x-amz-request-id"));

        let resp = srv.http.post(srv.url("/")).send().await.expect("post");
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        srv.shutdown().await;
    }
}
