use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use signpost::server;

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn root_redirects_to_site() {
    let resp = server::router().oneshot(get("/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "https://roadsign.pictures"
    );
}

#[tokio::test]
async fn other_paths_are_not_found() {
    let resp = server::router().oneshot(get("/sign/abc")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_to_root_is_rejected() {
    let req = Request::builder()
        .method("POST")
        .uri("/")
        .body(Body::empty())
        .unwrap();
    let resp = server::router().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn serves_redirect_over_tcp() {
    let (addr, listener) = server::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let task = tokio::spawn(server::serve(listener, async move {
        let _ = stop_rx.await;
    }));

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    let resp = client.get(format!("http://{addr}/")).send().await.unwrap();

    assert_eq!(resp.status().as_u16(), 302);
    assert_eq!(
        resp.headers().get("location").unwrap(),
        "https://roadsign.pictures"
    );

    stop_tx.send(()).unwrap();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn serve_alongside_returns_when_server_stops() {
    let (_, listener) = server::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let run = tokio::spawn(server::serve_alongside(
        listener,
        async move {
            let _ = stop_rx.await;
        },
        std::future::pending::<()>(),
    ));

    stop_tx.send(()).unwrap();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), run)
        .await
        .expect("background work kept the service alive after the server stopped");
    result.unwrap().unwrap();
}

#[tokio::test]
async fn serve_alongside_keeps_serving_after_background_ends() {
    let (addr, listener) = server::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let run = tokio::spawn(server::serve_alongside(
        listener,
        async move {
            let _ = stop_rx.await;
        },
        async {},
    ));

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    let resp = client.get(format!("http://{addr}/")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 302);

    stop_tx.send(()).unwrap();
    run.await.unwrap().unwrap();
}
