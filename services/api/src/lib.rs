mod cli;
mod infra;
mod report;
mod routes;
mod server;

use nexgen_dispatch::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
