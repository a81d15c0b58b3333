//! `packrig library`: resolve a single-entry Node library configuration.

use std::process::ExitCode;

use packrig_config::{LibraryParameters, build_library_config};

use crate::cli::LibraryArgs;
use crate::commands::utils;
use crate::error::Result;

/// Execute the library command.
pub async fn execute(args: LibraryArgs) -> Result<ExitCode> {
    let root = utils::resolve_project_root(args.cwd.as_deref())?;

    let params = LibraryParameters::builder()
        .working_dir(root.clone())
        .entry(args.entry)
        .maybe_transform_options_path(args.swcrc.map(|path| utils::resolve_path(&path, &root)))
        .build();

    let config = build_library_config(&params)?;

    let out = args.out.map(|path| utils::resolve_path(&path, &root));
    utils::write_json(&config, out.as_deref())?;
    Ok(ExitCode::SUCCESS)
}
