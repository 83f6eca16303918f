/// Initialize env-filterable logging for hosts embedding the engine.
/// Library code only emits through the `log` facade; calling this is
/// optional and repeat calls are harmless.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "beatrun=debug,warn"
    } else {
        "beatrun=info,warn"
    };

    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter),
    )
    .try_init();
}
