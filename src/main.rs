// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PII masker HTTP server binary

use pii_masker::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    pii_masker::server::start_server(config).await?;

    Ok(())
}
