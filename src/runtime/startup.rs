use std::io::{self, Write};

use ludex::config::Settings;
use ludex::search::SearchContext;

/// `info` by default, `warn` in silent mode; `RUST_LOG` overrides both.
pub fn init_logger(settings: &Settings) {
    let default = if settings.general.silent { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

/// One line per collection (sorted by name), then the totals.
pub fn write_summary(ctx: &SearchContext, out: &mut impl Write) -> io::Result<()> {
    let mut names: Vec<&String> = ctx.collections().keys().collect();
    names.sort();

    for name in &names {
        writeln!(out, "{name}: {} games", ctx.collection_children(name).len())?;
    }
    let virtual_games = ctx.games().iter().filter(|g| g.is_virtual()).count();
    writeln!(
        out,
        "{} games ({virtual_games} without files) in {} collections",
        ctx.games().len(),
        names.len()
    )
}
