use anyhow::Result;
use quickshow::cli::{actions, actions::Action, start};

#[tokio::main]
async fn main() -> Result<()> {
    let action = start()?;

    match action {
        Action::Server { .. } => actions::server::handle(action).await?,
        Action::AdminBootstrap { .. } => actions::admin::handle(action).await?,
    }

    Ok(())
}
