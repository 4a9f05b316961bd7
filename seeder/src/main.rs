use clap::Parser;
use dbseed::{Args, Seeder, SeederConfig, SecretsManagerResolver};
use dbseed_common::tracing::setup_tracing;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::trace;

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_tracing("dbseed");

    let args = Args::parse();
    trace!(args = ?args, "parsed args");

    let resolver = SecretsManagerResolver::from_env().await;
    let seeder = Seeder::new(SeederConfig::from(args), resolver);
    let seeder = &seeder;

    run(service_fn(move |event: LambdaEvent<Value>| async move {
        Ok::<_, Error>(seeder.handle(event).await)
    }))
    .await
}
