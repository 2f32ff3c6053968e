//! The QQ flow over real HTTP against a mock server.

use futures_util::future::FutureExt;
use socialite_oauth2::{DriverOptions, HttpClient, HttpRequest, QqDriver, ReqwestHttpClient, SocialiteDriver};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Sandboxes without loopback sockets make `MockServer::start` panic.
async fn try_start_mock() -> Option<MockServer> {
    let fut = std::panic::AssertUnwindSafe(MockServer::start());
    fut.catch_unwind().await.ok()
}

#[tokio::test]
async fn reqwest_client_sends_query_and_headers() {
    let Some(server) = try_start_mock().await else {
        eprintln!("skipping reqwest_client_sends_query_and_headers: mock server unavailable");
        return;
    };
    Mock::given(method("GET"))
        .and(path("/echo"))
        .and(query_param("a", "1"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReqwestHttpClient::new().unwrap();
    let response = client
        .get(
            HttpRequest::get(format!("{}/echo", server.uri()))
                .query("a", "1")
                .header("Accept", "application/json"),
        )
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn non_success_status_is_returned_not_raised() {
    let Some(server) = try_start_mock().await else {
        eprintln!("skipping non_success_status_is_returned_not_raised: mock server unavailable");
        return;
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let client = ReqwestHttpClient::new().unwrap();
    let response = client
        .get(HttpRequest::get(format!("{}/anything", server.uri())))
        .await
        .unwrap();
    assert_eq!(response.status, 502);
}

#[tokio::test]
async fn qq_login_over_http() {
    let Some(server) = try_start_mock().await else {
        eprintln!("skipping qq_login_over_http: mock server unavailable");
        return;
    };

    Mock::given(method("GET"))
        .and(path("/oauth2.0/token"))
        .and(query_param("code", "c1"))
        .and(query_param("grant_type", "authorization_code"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("access_token=T1&refresh_token=R1&expires_in=7776000"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/oauth2.0/me"))
        .and(query_param("access_token", "T1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("callback( {\"client_id\":\"101234\",\"openid\":\"O1\"} );\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/get_user_info"))
        .and(query_param("openid", "O1"))
        .and(query_param("oauth_consumer_key", "101234"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"ret":0,"msg":"","nickname":"Bob","figureurl_qq_2":"u"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let options = DriverOptions::new("101234", "s3cr3t", "https://example.com/callback/qq")
        .with_base_url(server.uri());
    let mut driver = QqDriver::new(options).unwrap().with_code("c1");

    let profile = driver.get_user_info(None).await.unwrap();
    assert_eq!(profile.uid, "O1");
    assert_eq!(profile.display_name, "Bob");
    assert_eq!(profile.avatar_url, "u");
    assert_eq!(profile.email, "");

    // Memoized: no further requests reach the server.
    driver.get_user_info(None).await.unwrap();
}
