use anyhow::Result;
use laser_gcode_tools::cli::run;

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}
