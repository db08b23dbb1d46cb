use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{debug, info};
use savepatcher_core::{CoreError, SaveFile};
use savepatcher_render::{
    EditRecord, EditReport, FieldSelection, render_edits_text, render_json_full,
    render_json_selected, render_selected_pairs, render_text,
};
use serde_json::Value as JsonValue;

const EXIT_FAILURE: i32 = 1;
const EXIT_USAGE: i32 = 2;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "ER0000.sl2")]
    path: PathBuf,
    /// Replace the embedded Steam ID (implies a checksum recalculation).
    #[arg(long = "steam-id", value_name = "ID")]
    steam_id: Option<u64>,
    /// Recalculate the save header checksum.
    #[arg(long = "fix-checksum")]
    fix_checksum: bool,
    /// Where to write the patched save.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Report whether the stored checksum is correct.
    #[arg(
        long,
        conflicts_with_all = ["steam_id", "fix_checksum", "output"]
    )]
    check: bool,
    #[arg(long)]
    json: bool,
    #[arg(long)]
    name: bool,
    #[arg(long)]
    level: bool,
    #[arg(long = "time-played")]
    time_played: bool,
    #[arg(long)]
    slot: bool,
    #[arg(long)]
    steam: bool,
    #[arg(long)]
    checksum: bool,
}

impl Cli {
    fn field_selection(&self) -> FieldSelection {
        FieldSelection {
            name: self.name,
            level: self.level,
            time_played: self.time_played,
            active_slot: self.slot,
            steam_id: self.steam,
            checksum: self.checksum,
        }
    }

    fn has_edits(&self) -> bool {
        self.steam_id.is_some() || self.fix_checksum
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let fields = cli.field_selection();
    let has_edits = cli.has_edits();

    if has_edits && cli.output.is_none() {
        eprintln!("--steam-id and --fix-checksum require --output <PATH>");
        process::exit(EXIT_USAGE);
    }
    if !has_edits && cli.output.is_some() {
        eprintln!("--output requires --steam-id or --fix-checksum");
        process::exit(EXIT_USAGE);
    }

    let mut save = SaveFile::open(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error loading save file: {}", cli.path.display());
        eprintln!("  {e}");
        process::exit(EXIT_FAILURE);
    });
    debug!("active slot {}", save.active_slot());

    if cli.check {
        let valid = save.checksum_is_valid();
        println!("checksum={}", if valid { "valid" } else { "invalid" });
        if !valid {
            process::exit(EXIT_FAILURE);
        }
        return;
    }

    let edits = if has_edits {
        apply_edits(&mut save, cli.steam_id).unwrap_or_else(|e| {
            eprintln!("Error patching save file: {e}");
            process::exit(EXIT_FAILURE);
        })
    } else {
        Vec::new()
    };

    if let Some(out_path) = cli.output.as_ref() {
        save.write(out_path).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", out_path.display());
            process::exit(EXIT_FAILURE);
        });
        info!("wrote patched save to {}", out_path.display());
    }

    let summary = save.summary();
    let report = EditReport::from_save(&save, edits);
    debug!("save state {:?}", report.state);

    if cli.json {
        let json = if fields.is_any_selected() {
            render_json_selected(&summary, &fields)
        } else {
            render_json_full(&summary, &report)
        };
        print_json(&json);
        return;
    }

    if fields.is_any_selected() {
        for (key, value) in render_selected_pairs(&summary, &fields) {
            println!("{key}={value}");
        }
        return;
    }

    print!("{}", render_text(&summary));
    if let Some(out_path) = cli.output.as_ref() {
        print!("{}", render_edits_text(&report));
        println!("Wrote patched save to {}", out_path.display());
    }
}

/// Apply the requested mutations, recalculating the checksum last.
fn apply_edits(save: &mut SaveFile, steam_id: Option<u64>) -> Result<Vec<EditRecord>, CoreError> {
    let mut edits = Vec::new();

    if let Some(new_id) = steam_id {
        let old_id = save.steam_id();
        save.replace_steam_id(new_id)?;
        edits.push(EditRecord::new(
            "steam_id",
            old_id.to_string(),
            new_id.to_string(),
        ));
    }

    let old_checksum = save.checksum();
    let new_checksum = save.recalculate_checksum()?;
    edits.push(EditRecord::new("checksum", old_checksum, new_checksum));

    Ok(edits)
}

fn print_json(json: &JsonValue) {
    let rendered = serde_json::to_string_pretty(json).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(EXIT_FAILURE);
    });
    println!("{rendered}");
}
