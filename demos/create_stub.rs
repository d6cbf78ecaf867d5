//! Builds an authenticated gRPC channel the way a generated client would receive it, using an
//! `authorized_user` credential file whose token endpoint is served by a local mock.

// std
use std::{env, fs, sync::Arc};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use grpc_stub_auth::{
	adc::{AdcEnvironment, ApplicationDefaultProvider},
	auth::ScopeSet,
	create_stub,
	credentials::ChannelCredentials,
	reqwest::Client,
	stub::StubOptions,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"Bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let path = env::temp_dir().join("grpc-stub-auth-demo-adc.json");

	fs::write(
		&path,
		json!({
			"type": "authorized_user",
			"client_id": "demo-client",
			"client_secret": "demo-secret",
			"refresh_token": "demo-refresh",
			"token_uri": server.url("/token"),
		})
		.to_string(),
	)?;

	let provider = ApplicationDefaultProvider::new(
		AdcEnvironment::default().with_credentials_path(&path),
		Client::default(),
	);
	let options = StubOptions::default()
		.with_identity_provider(Arc::new(provider))
		.with_scopes(ScopeSet::new(["https://www.googleapis.com/auth/cloud-platform"])?);
	let (address, channel) = create_stub(
		"pubsub.googleapis.com",
		443,
		|address: String, credentials: ChannelCredentials| {
			let channel = credentials.connect_lazy(&address)?;

			Ok((address, channel))
		},
		&options,
	)
	.await?;

	println!("Stub channel ready for {address}: {channel:?}.");

	let header = create_stub(
		"pubsub.googleapis.com",
		443,
		|_: String, credentials: ChannelCredentials| Ok(credentials),
		&options,
	)
	.await?
	.call
	.authorization_header()
	.await?;

	println!("Outgoing requests carry a {}-byte authorization header.", header.len());

	token_mock.assert_async().await;
	fs::remove_file(path)?;

	Ok(())
}
