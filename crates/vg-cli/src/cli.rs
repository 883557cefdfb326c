use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "videogate",
    about = "videogate: authenticated chunked video transfer",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// RPC address of the server
    #[arg(long, global = true, env = "VIDEOGATE_SERVER", default_value = "127.0.0.1:50051")]
    pub server: String,

    /// Bearer token for authenticated commands
    #[arg(long, global = true, env = "VIDEOGATE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the server
    Serve(ServeArgs),
    /// Create an account
    Signup(CredentialArgs),
    /// Sign in and print a bearer token
    Signin(CredentialArgs),
    /// Show the signed-in user
    Profile,
    /// Upload a video file
    Upload(UploadArgs),
    /// Download a video to a file
    Download(DownloadArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Override the RPC listen address
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Override the HTTP gateway address
    #[arg(long, conflicts_with = "no_gateway")]
    pub gateway: Option<SocketAddr>,
    /// Do not start the HTTP gateway
    #[arg(long)]
    pub no_gateway: bool,
}

#[derive(Args)]
pub struct CredentialArgs {
    #[arg(short, long)]
    pub username: String,
    #[arg(short, long)]
    pub password: String,
}

#[derive(Args)]
pub struct UploadArgs {
    #[arg(short, long)]
    pub file: PathBuf,
    /// Video id to store the file under
    #[arg(long)]
    pub id: String,
    #[arg(long, default_value_t = vg_sdk::DEFAULT_UPLOAD_CHUNK_SIZE)]
    pub chunk_size: usize,
}

#[derive(Args)]
pub struct DownloadArgs {
    #[arg(long)]
    pub id: String,
    #[arg(short, long)]
    pub output: PathBuf,
}
