//! Concurrent access tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;
    use tokio::task::JoinSet;

    use crate::TestServer;

    const WRITERS: usize = 32;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_should_keep_every_concurrent_put() {
        let srv = TestServer::start().await;
        let bucket = srv.create_test_bucket("concurrent").await;

        let mut tasks = JoinSet::new();
        for i in 0..WRITERS {
            let client = srv.s3.clone();
            let bucket = bucket.clone();
            tasks.spawn(async move {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(format!("obj-{i:03}"))
                    .body(ByteStream::from(format!("payload-{i}").into_bytes()))
                    .send()
                    .await
                    .map(|_| ())
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.expect("task").expect("concurrent put");
        }

        let listed = srv
            .s3
            .list_objects_v2()
            .bucket(&bucket)
            .prefix("obj-")
            .send()
            .await
            .expect("list");
        assert_eq!(listed.contents().len(), WRITERS);

        for i in 0..WRITERS {
            let body = srv.get_bytes(&bucket, &format!("obj-{i:03}")).await;
            assert_eq!(body, format!("payload-{i}").into_bytes());
        }

        srv.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_should_serialize_concurrent_bucket_creation() {
        let srv = TestServer::start().await;
        let name = crate::test_bucket_name("race");

        let mut tasks = JoinSet::new();
        for _ in 0..8 {
            let client = srv.s3.clone();
            let name = name.clone();
            tasks.spawn(async move { client.create_bucket().bucket(name).send().await });
        }

        let mut created = 0;
        while let Some(result) = tasks.join_next().await {
            match result.expect("task") {
                Ok(_) => created += 1,
                Err(err) => assert!(
                    err.into_service_error().is_bucket_already_owned_by_you(),
                    "losers see BucketAlreadyOwnedByYou"
                ),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(srv.engine.list_buckets().len(), 1);

        srv.shutdown().await;
    }
}
