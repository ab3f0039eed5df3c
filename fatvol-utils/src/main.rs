#[macro_use]
extern crate log;

mod cat;
mod error;
mod info;
mod list;
mod put;
mod remove;
mod status;

use clap::Parser;
use fatvol::io::std::FileIO;

use error::{CommandError, Result};
use status::Status;

pub(crate) type Volume = fatvol::Volume<FileIO>;

#[derive(Debug, clap::Args)]
struct Format {
    /// Volume size in bytes
    size: u64,
}

#[derive(Debug, clap::Args)]
struct List {
    /// Specify path to list, default to current directory
    #[clap(default_value = ".")]
    path: String,
}

#[derive(Debug, clap::Args)]
struct Target {
    /// Path inside the volume
    path: String,
}

#[derive(Debug, clap::Args)]
struct Transfer {
    source: String,
    dest: String,
}

#[derive(Debug, clap::Args)]
struct Dump {
    /// Cluster index
    cluster: u32,
}

#[derive(Debug, clap::Subcommand)]
enum Action {
    /// Create a volume file and format it
    Format(Format),
    /// List file and directory in specified path
    #[clap(name = "ls")]
    List(List),
    /// Create a directory
    Mkdir(Target),
    /// Remove an empty directory
    Rmdir(Target),
    /// Remove file
    #[clap(name = "rm")]
    Remove(Target),
    /// Copy a file inside the volume
    #[clap(name = "cp")]
    Copy(Transfer),
    /// Move or rename a file or directory
    #[clap(name = "mv")]
    Move(Transfer),
    /// Concatenate file and print on the standard output
    Cat(Target),
    /// Show an entry and its cluster chain
    Info(Target),
    /// Print the current directory
    Pwd,
    /// Copy a host file into the volume
    Incp(Transfer),
    /// Copy a volume file out to the host
    Outcp(Transfer),
    /// Mark the first cluster of an entry bad
    Bug(Target),
    /// Report bad clusters and table copy mismatches
    Check,
    /// Print both allocation table copies
    Fat,
    /// Hex dump of a cluster
    Dump(Dump),
    /// Print volume geometry
    Stat,
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(short, long)]
    quiet: bool,
    #[clap(short, action = clap::ArgAction::Count)]
    verbosity: u8,
    /// Volume file
    #[clap(short, long)]
    device: String,
    /// Current directory inside the volume
    #[clap(short = 'C', long, default_value = "/")]
    directory: String,
    #[clap(subcommand)]
    action: Action,
}

fn run(args: Args) -> Result<Option<Status>> {
    let action = match args.action {
        Action::Format(format) => {
            let io = FileIO::create(&args.device).map_err(CommandError::host(&args.device))?;
            Volume::format(io, format.size)?;
            return Ok(Some(Status::Ok));
        }
        action => action,
    };

    let io = FileIO::open(&args.device).map_err(CommandError::host(&args.device))?;
    let mut volume = Volume::open(io)?;
    let mut cursor = volume.session();
    volume.change_directory(&mut cursor, &args.directory)?;
    let volume = &mut volume;
    let cursor = &cursor;

    match action {
        Action::Format(_) => (),
        Action::List(args) => list::list(volume, cursor, &args.path)?,
        Action::Mkdir(args) => {
            volume.create_directory(cursor, &args.path)?;
            return Ok(Some(Status::Ok));
        }
        Action::Rmdir(args) => {
            remove::remove_directory(volume, cursor, &args.path)?;
            return Ok(Some(Status::Ok));
        }
        Action::Remove(args) => {
            remove::remove(volume, cursor, &args.path)?;
            return Ok(Some(Status::Ok));
        }
        Action::Copy(args) => {
            volume.copy_file(cursor, &args.source, &args.dest)?;
            return Ok(Some(Status::Ok));
        }
        Action::Move(args) => {
            volume.move_entry(cursor, &args.source, &args.dest)?;
            return Ok(Some(Status::Ok));
        }
        Action::Cat(args) => cat::cat(volume, cursor, &args.path)?,
        Action::Info(args) => info::info(volume, cursor, &args.path)?,
        Action::Pwd => println!("{}", cursor.path()),
        Action::Incp(args) => {
            put::incp(volume, cursor, &args.source, &args.dest)?;
            return Ok(Some(Status::Ok));
        }
        Action::Outcp(args) => {
            cat::outcp(volume, cursor, &args.source, &args.dest)?;
            return Ok(Some(Status::Ok));
        }
        Action::Bug(args) => {
            let cluster_id = volume.mark_bad(cursor, &args.path)?;
            info!("Cluster {} marked bad", cluster_id);
            return Ok(Some(Status::Ok));
        }
        Action::Check => info::check(volume)?,
        Action::Fat => info::fat(volume)?,
        Action::Dump(args) => info::dump(volume, args.cluster)?,
        Action::Stat => info::geometry(volume)?,
    }
    Ok(None)
}

fn main() {
    let args = Args::parse();
    let level = match (args.quiet, args.verbosity) {
        (true, _) => log::LevelFilter::Off,
        (_, 0) => log::LevelFilter::Info,
        (_, 1) => log::LevelFilter::Debug,
        (_, _) => log::LevelFilter::Trace,
    };
    log::set_max_level(level);
    env_logger::builder().filter(None, level).target(env_logger::Target::Stdout).init();

    match run(args) {
        Ok(Some(status)) => println!("{}", status),
        Ok(None) => (),
        Err(error) => {
            match &error {
                CommandError::Volume(e) => match Status::of(e) {
                    Some(status) => println!("{}", status),
                    None => eprintln!("{}", error),
                },
                CommandError::Host { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                    println!("{}", Status::FileNotFound)
                }
                CommandError::Host { .. } => eprintln!("{}", error),
            }
            std::process::exit(1);
        }
    }
}
