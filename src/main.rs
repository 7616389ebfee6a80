use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use twig::areas::repository::Repository;

#[derive(Parser)]
#[command(
    name = "twig",
    version = "0.1.0",
    about = "A minimal content-addressed version control tool",
    long_about = "twig stores snapshots of a working tree as git-compatible loose objects: \
    blobs, flat trees and commits, with a staging index and a single current branch.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path. \
        Running it on an existing repository only rewrites HEAD."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
        #[arg(short = 'b', long, help = "Name of the branch HEAD points at")]
        initial_branch: Option<String>,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the raw body of an object in the repository. \
        The object may be named by its full id, an abbreviation of at least 7 characters, or HEAD."
    )]
    CatFile {
        #[arg(short = 'p', long, help = "The object SHA to print")]
        sha: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file as a blob and optionally write it to the object database"
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object database")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
    #[command(
        name = "ls-tree",
        about = "List the contents of a tree object",
        long_about = "This command lists the entries of a tree object. \
        A commit lists the tree it records."
    )]
    LsTree {
        #[arg(long, help = "List only paths")]
        name_only: bool,
        #[arg(index = 1, help = "The tree or commit SHA")]
        sha: String,
    },
    #[command(
        name = "write-tree",
        about = "Create a tree object from the working tree or the index"
    )]
    WriteTree {
        #[arg(long, help = "Build the tree from the staged entries instead of the working tree")]
        from_index: bool,
    },
    #[command(
        name = "add",
        about = "Add file contents to the index",
        long_about = "This command stages files for the next commit. \
        Directories are expanded to every file below them."
    )]
    Add {
        #[arg(index = 1, required = true, help = "The files or directories to stage")]
        paths: Vec<String>,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command records the staged snapshot as a new commit on the current branch \
        and empties the index."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
}

fn open_repository() -> Result<Repository> {
    let pwd = std::env::current_dir()?;
    Repository::new(&pwd.to_string_lossy(), Box::new(std::io::stdout()))
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Init {
            path,
            initial_branch,
        } => {
            let mut repository = match path {
                Some(path) => Repository::new(path, Box::new(std::io::stdout()))?,
                None => open_repository()?,
            };

            repository.init(initial_branch.as_deref())?;
        }
        Commands::CatFile { sha } => {
            open_repository()?.cat_file(sha)?;
        }
        Commands::HashObject { write, file } => {
            open_repository()?.hash_object(file, *write)?;
        }
        Commands::LsTree { name_only, sha } => {
            open_repository()?.ls_tree(sha, *name_only)?;
        }
        Commands::WriteTree { from_index } => {
            let mut repository = open_repository()?;

            if *from_index {
                repository.write_tree_from_index().await?;
            } else {
                repository.write_tree()?;
            }
        }
        Commands::Add { paths } => {
            open_repository()?.add(paths).await?;
        }
        Commands::Commit { message } => {
            open_repository()?.commit(message.as_str()).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}
