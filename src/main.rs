use academy_admin::{app::App, config::Config};
use anyhow::Result;
use clap::{crate_version, App as Cli, Arg};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Cli::new("academy-admin")
        .version(crate_version!())
        .about("Terminal admin dashboard for the academy platform")
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("DIR")
                .help("Directory holding config.yml and session.yml")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("api-url")
                .long("api-url")
                .value_name("URL")
                .help("Base URL of the platform API")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("One of error, warn, info, debug, trace")
                .takes_value(true),
        )
        .get_matches();

    let mut config = Config::new();
    config.load(matches.value_of("config"))?;
    if let Some(url) = matches.value_of("api-url") {
        config.api_base_url = url.to_owned();
    }
    if let Some(level) = matches.value_of("log-level") {
        config.log_level = level.to_owned();
    }

    App::start(config).await
}
