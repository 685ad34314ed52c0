mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use short_check::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
