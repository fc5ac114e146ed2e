mod cli;
mod file_utils;
mod logger;
mod m4a;
mod sanitize;
mod store;

use clap::Parser;

use crate::cli::{Cli, LogConfig};
use crate::logger::Logger;
use crate::m4a::{M4aFile, RenameOutcome};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let logger = Logger::new(LogConfig::from_cli(&cli));

    let files = if let Some(basedir) = &cli.basedir {
        file_utils::find_m4a_files(basedir)?
    } else if let Some(filename) = &cli.filename {
        vec![filename.clone()]
    } else {
        // clap's arg group enforces one of the two
        anyhow::bail!("--basedir or --filename is required");
    };

    let mut renamed = 0usize;
    let mut failed = 0usize;

    for file in &files {
        let mut m4a = M4aFile::open(file, logger.clone());

        if let Some(artist) = &cli.artist {
            m4a.set_artist(artist);
        }
        if let Some(album) = &cli.album {
            m4a.set_album(album);
        }
        if let Some(genre) = &cli.genre {
            m4a.set_genre(genre);
        }
        if cli.sanitize {
            m4a.sanitize_tags();
        }
        if cli.rename {
            match m4a.rename() {
                Ok(RenameOutcome::Moved(_)) => renamed += 1,
                Ok(RenameOutcome::Unchanged(_)) => {}
                Ok(RenameOutcome::Failed(_)) => failed += 1,
                Err(err) => {
                    failed += 1;
                    logger.warn(&err.to_string());
                }
            }
        }
    }

    if cli.rename {
        logger.info(&format!(
            "processed {} file(s), renamed {}, {} failed",
            files.len(),
            renamed,
            failed
        ));
    } else {
        logger.info(&format!("processed {} file(s)", files.len()));
    }

    Ok(())
}
