use crate::board::{Board, BoardEdit, LoadOptions, Selection};
use crate::config::{ConfigError, ConfigManager, KEYS};
use crate::models::{BoardError, StorageError};
use crate::storage::StorageType;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Navigate and edit a two-level AAC pictogram board
#[derive(Debug, Parser)]
#[command(name = "aacboard", version)]
pub struct Cli {
    /// Config file to use instead of ~/.config/aacboard/config.json
    #[arg(long, global = true, env = "AACBOARD_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Board file to use instead of the configured one
    #[arg(short, long, global = true, value_name = "FILE")]
    pub board: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the pictograms at home, or inside one category
    Show {
        /// Category pictogram to open first
        category: Option<String>,
    },
    /// Press pictograms in order, starting from home
    Select {
        #[arg(required = true)]
        images: Vec<String>,
    },
    /// Add a category to the board
    AddCategory {
        image: String,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Add an item to an existing category
    AddItem {
        category: String,
        image: String,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Rewrite a board in the format implied by OUTPUT's extension
    Convert { input: PathBuf, output: PathBuf },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    Get { key: String },
    Set { key: String, value: String },
    Unset { key: String },
    List,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("{0}")]
    Message(String),
}

pub fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ConfigManager::new(cli.config.as_deref())?;
    let board_path = match cli.board {
        Some(path) => path,
        None => config.board_path()?,
    };
    let options = config.load_options();

    match cli.command {
        Command::Show { category } => {
            let mut board = Board::from_file(&board_path, options);
            if let Some(category) = category {
                if !board.select(&category).is_navigation() {
                    return Err(BoardError::UnknownCategory(category).into());
                }
            }
            for (image_id, text) in board.items() {
                println!("{}\t{}", image_id, text);
            }
        }
        Command::Select { images } => {
            let mut board = Board::from_file(&board_path, options);
            for image_id in images {
                match board.select(&image_id) {
                    Selection::Navigated { name } => println!("navigate: {}", name),
                    Selection::Spoken(text) => println!("speak: {}", text),
                    Selection::NoMatch => println!("no match"),
                }
            }
        }
        Command::AddCategory { image, name } => {
            let mut board = load_for_edit(&board_path, options)?;
            board.apply(BoardEdit::RegisterCategory {
                image_id: image,
                name: name.join(" "),
            })?;
            board.write_to_file_as(&board_path, storage_type_for(&board_path, options))?;
        }
        Command::AddItem {
            category,
            image,
            text,
        } => {
            let mut board = load_for_edit(&board_path, options)?;
            board.add_item_to(&category, image, text.join(" "))?;
            board.write_to_file_as(&board_path, storage_type_for(&board_path, options))?;
        }
        Command::Convert { input, output } => {
            let board = Board::try_load(
                &input,
                LoadOptions {
                    storage_type: None,
                    ..options
                },
            )?;
            board.write_to_file(&output)?;
        }
        Command::Config { command } => match command {
            ConfigCommand::Get { key } => match config.get(&key) {
                Some(value) => println!("{}", value),
                None => {
                    if !KEYS.contains(&key.as_str()) {
                        return Err(ConfigError::InvalidKey(key).into());
                    }
                    println!("null");
                }
            },
            ConfigCommand::Set { key, value } => {
                config.set(&key, &value)?;
                println!("Set {} = {}", key, value);
            }
            ConfigCommand::Unset { key } => {
                config.unset(&key)?;
                println!("Unset {}", key);
            }
            ConfigCommand::List => {
                for (key, value, is_default) in config.list() {
                    if is_default {
                        println!("{} = {} (default)", key, value);
                    } else {
                        println!("{} = {}", key, value);
                    }
                }
            }
        },
    }

    Ok(())
}

fn storage_type_for(path: &Path, options: LoadOptions) -> StorageType {
    options
        .storage_type
        .unwrap_or_else(|| StorageType::from_path(path))
}

/// Loads a board that is about to be rewritten. A missing file starts a new
/// board, but a broken one is never silently replaced.
fn load_for_edit(path: &Path, options: LoadOptions) -> Result<Board, CliError> {
    if !path.exists() {
        return Ok(Board::new());
    }
    Board::try_load(path, options).map_err(|e| {
        CliError::Message(format!(
            "refusing to edit {}: {}",
            path.display(),
            e
        ))
    })
}
