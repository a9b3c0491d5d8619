use std::{io::Write, path::Path};

use agora_client::{
    api::{AttachedMaterial, Comment, CommentId},
    materials_by_comment, CommentNode, Forest, ThreadConfig,
};
use anyhow::{anyhow, Context};

#[derive(structopt::StructOpt)]
struct Opt {
    /// Deepest reply level, defaults to $AGORA_MAX_DEPTH or 2
    #[structopt(long)]
    max_depth: Option<usize>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Print the discussion tree built from a comment dump
    Tree {
        /// JSON array of comments, as the backend lists them
        #[structopt(long)]
        comments: String,

        /// JSON array of `{ commentId, material }` entries
        #[structopt(long)]
        materials: Option<String>,

        /// Print the forest as JSON instead of indented text
        #[structopt(long)]
        json: bool,
    },

    /// Print the number of comments
    Count {
        #[structopt(long)]
        comments: String,
    },

    /// Print the comments leading from a root to the given one
    Path {
        #[structopt(long)]
        comments: String,

        #[structopt(long)]
        id: String,
    },
}

/// `--max-depth` wins over `env`, the value of $AGORA_MAX_DEPTH
fn thread_config(
    max_depth: Option<usize>,
    env: Result<String, std::env::VarError>,
) -> anyhow::Result<ThreadConfig> {
    if let Some(d) = max_depth {
        return Ok(ThreadConfig::with_max_depth(d));
    }
    match env {
        Err(std::env::VarError::NotPresent) => Ok(ThreadConfig::default()),
        v => {
            let v = v.context("retrieving AGORA_MAX_DEPTH environment variable")?;
            let d = v
                .parse()
                .with_context(|| format!("parsing AGORA_MAX_DEPTH {v:?} as a depth"))?;
            Ok(ThreadConfig::with_max_depth(d))
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let data = std::fs::read(Path::new(path)).with_context(|| format!("reading {path}"))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing {path}"))
}

fn load(path: &str, config: &ThreadConfig) -> anyhow::Result<Forest> {
    let comments: Vec<Comment> = read_json(path)?;
    tracing::info!(comments = comments.len(), max_depth = config.max_depth, "building forest");
    Ok(Forest::build(comments, config.max_depth))
}

fn describe(n: &CommentNode) -> String {
    let mut res = format!(
        "[{}] {}: {} (+{} -{})",
        n.id,
        n.author.display_name,
        n.content.lines().next().unwrap_or(""),
        n.reactions.positive,
        n.reactions.negative,
    );
    for m in &n.materials {
        res.push_str(&format!(" <{}>", m.title));
    }
    res
}

fn print_tree(out: &mut impl Write, forest: &Forest) -> anyhow::Result<()> {
    let mut stack = forest
        .roots()
        .iter()
        .rev()
        .map(|n| (0, n))
        .collect::<Vec<_>>();
    while let Some((level, n)) = stack.pop() {
        writeln!(out, "{}{}", "  ".repeat(level), describe(n))?;
        stack.extend(n.children.iter().rev().map(|c| (level + 1, c)));
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let opt = <Opt as structopt::StructOpt>::from_args();
    let config = thread_config(opt.max_depth, std::env::var("AGORA_MAX_DEPTH"))?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match opt.cmd {
        Command::Tree {
            comments,
            materials,
            json,
        } => {
            let mut forest = load(&comments, &config)?;
            if let Some(materials) = materials {
                let listing: Vec<AttachedMaterial> = read_json(&materials)?;
                forest = forest.attach_materials(&materials_by_comment(listing));
            }
            match json {
                true => {
                    serde_json::to_writer_pretty(&mut out, &forest)
                        .context("serializing forest")?;
                    writeln!(out)?;
                }
                false => print_tree(&mut out, &forest)?,
            }
        }
        Command::Count { comments } => {
            writeln!(out, "{}", load(&comments, &config)?.count_all())?;
        }
        Command::Path { comments, id } => {
            let forest = load(&comments, &config)?;
            let path = forest
                .path_from_root(&CommentId(id.clone()))
                .ok_or_else(|| anyhow!("comment {id} is not in the discussion"))?;
            for n in path {
                writeln!(out, "{}", describe(n))?;
            }
        }
    }

    Ok(())
}
