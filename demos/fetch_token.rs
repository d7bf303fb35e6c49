//! Demonstrates acquiring, caching, and attaching a bearer token with the default reqwest
//! transport against a mock authentication server.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
// self
use bearer_broker::{
	config::AuthCredentials,
	ext::BearerSigner,
	flows::ReqwestTokenBroker,
	reqwest::Client,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"token\":\"demo-token\",\"refreshToken\":\"demo-refresh\",\"expiresIn\":900,\"refreshTokenExpiresIn\":86400,\"userId\":\"6650f1c2\",\"username\":\"orders-service\"}",
			);
		})
		.await;
	let orders_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/orders").header("authorization", "Bearer demo-token");
			then.status(200).header("content-type", "application/json").body("[]");
		})
		.await;
	let credentials = AuthCredentials::builder()
		.username("orders-service")
		.password("hunter2")
		.token_endpoint(Url::parse(&server.url("/api/v1/auth/token"))?)
		.refresh_endpoint(Url::parse(&server.url("/api/v1/auth/refresh-token"))?)
		.build()?;
	let broker = ReqwestTokenBroker::new(credentials);
	let token = broker.get_token().await?;

	println!("Acquired token {} (fingerprint {}).", token, token.fingerprint());

	let client = Client::new();

	for _ in 0..3 {
		let response =
			broker.authorize(&BearerSigner, client.get(server.url("/api/v1/orders"))).await?.send().await?;

		println!("GET /api/v1/orders -> {}.", response.status());
	}

	token_mock.assert_async().await;
	orders_mock.assert_calls_async(3).await;

	println!(
		"Authentications: {}, cache hits: {}.",
		broker.metrics.authentications(),
		broker.metrics.cache_hits()
	);

	Ok(())
}
