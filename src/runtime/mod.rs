use std::env;
use std::io;
use std::path::PathBuf;

use ludex::providers;

mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = settings::load_settings();
    startup::init_logger(&settings);
    settings::apply_legacy(&mut settings);

    let dirs: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();
    if !dirs.is_empty() {
        settings.library.directories = dirs;
    } else if settings.library.directories.is_empty() {
        settings.library.directories.push(env::current_dir()?);
    }

    let ctx = providers::search(&settings);
    startup::write_summary(&ctx, &mut io::stdout().lock())?;
    Ok(())
}
