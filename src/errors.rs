use color_eyre::Result;

/// Installs the color-eyre report hooks and a panic hook that logs the panic before exiting.
///
/// Release builds write a human-panic crash report, debug builds print a full backtrace.
pub fn init_errors() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .display_location_section(cfg!(debug_assertions))
        .into_hooks();
    eyre_hook.install()?;

    std::panic::set_hook(Box::new(move |panic_info| {
        #[cfg(not(debug_assertions))]
        {
            use human_panic::{
                handle_dump,
                print_msg,
                Metadata,
            };
            let metadata = Metadata::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            let file_path = handle_dump(&metadata, panic_info);
            // Nothing sensible left to do if the console is gone too.
            let _ = print_msg(file_path, &metadata);
        }

        let msg = format!("{}", panic_hook.panic_report(panic_info));
        error!("Error: {}", strip_ansi_escapes::strip_str(msg));

        #[cfg(debug_assertions)]
        {
            better_panic::Settings::auto()
                .most_recent_first(false)
                .lineno_suffix(true)
                .verbosity(better_panic::Verbosity::Full)
                .create_panic_handler()(panic_info);
        }

        std::process::exit(libc::EXIT_FAILURE);
    }));

    Ok(())
}
