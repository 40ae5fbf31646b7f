use presence_heatmap::config;
use presence_heatmap::events::file::FileEventSource;
use presence_heatmap::pipeline;
use time::{Date, OffsetDateTime};

fn init_tracing(level: tracing::Level) {
    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn local_today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_default()?;
    init_tracing(config.log_level());
    tracing::info!(
        config_path = config::DEFAULT_CONFIG_PATH,
        app = %config.app.name,
        "presence-heatmap starting"
    );

    let settings = config.run_settings()?;
    let mut source = FileEventSource::new(&config.source.path, settings.query.clone());
    let today = local_today();

    match pipeline::run(&settings, &mut source, today) {
        Ok(summary) => {
            tracing::info!(
                events = summary.events,
                intervals = summary.intervals,
                first_day = %summary.first_day,
                last_day = %summary.last_day,
                output = %summary.output.display(),
                "Run complete"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            Err(e.into())
        }
    }
}
