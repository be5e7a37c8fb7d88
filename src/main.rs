//! `linepilot` 바이너리 진입점.

use linepilot::interface::cli::{AppComposition, Cli, CliAction};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let action = match Cli::parse_action() {
        Ok(action) => action,
        Err(msg) => {
            eprintln!("error: {msg}");
            std::process::exit(2);
        }
    };

    let composition = AppComposition::default();

    let result = match action {
        CliAction::InspectConfig => composition
            .inspect_config_usecase()
            .execute()
            .map(|json| println!("{json}")),
        CliAction::MapPatch {
            source,
            changed_only,
        } => source
            .read()
            .await
            .and_then(|patch| composition.map_patch_usecase().execute(&patch, changed_only))
            .map(|json| println!("{json}")),
        CliAction::Review(options) => composition
            .review_usecase()
            .execute(options)
            .await
            .map(|_| ()),
        CliAction::Summarize(options) => composition
            .summarize_usecase()
            .execute(options)
            .await
            .map(|_| ()),
        CliAction::Reply(options) => composition
            .reply_usecase()
            .execute(options)
            .await
            .map(|_| ()),
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
