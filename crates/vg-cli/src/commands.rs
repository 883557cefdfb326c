use anyhow::Context;
use colored::Colorize;
use vg_sdk::VideoClient;
use vg_server::ServerConfig;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let client = match cli.token {
        Some(token) => VideoClient::new(cli.server).with_token(token),
        None => VideoClient::new(cli.server),
    };
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Signup(args) => cmd_signup(&client, args).await,
        Command::Signin(args) => cmd_signin(client, args).await,
        Command::Profile => cmd_profile(&client).await,
        Command::Upload(args) => cmd_upload(&client, args).await,
        Command::Download(args) => cmd_download(&client, args).await,
    }
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(gateway) = args.gateway {
        config.gateway_addr = Some(gateway);
    }
    if args.no_gateway {
        config.gateway_addr = None;
    }

    println!("{} videogate RPC on {}", "▶".green().bold(), config.bind_addr.to_string().bold());
    if let Some(gateway) = config.gateway_addr {
        println!("  HTTP gateway on {}", gateway.to_string().bold());
    }
    vg_server::run(config).await?;
    Ok(())
}

async fn cmd_signup(client: &VideoClient, args: CredentialArgs) -> anyhow::Result<()> {
    let user_id = client.sign_up(&args.username, &args.password).await?;
    println!("{} Created user {} ({})", "✓".green().bold(), args.username.bold(), user_id.cyan());
    Ok(())
}

async fn cmd_signin(mut client: VideoClient, args: CredentialArgs) -> anyhow::Result<()> {
    let token = client.sign_in(&args.username, &args.password).await?;
    println!("{} Signed in as {}", "✓".green().bold(), args.username.bold());
    println!("{token}");
    println!("  {}", "export VIDEOGATE_TOKEN=<token> to use it for later commands".dimmed());
    Ok(())
}

async fn cmd_profile(client: &VideoClient) -> anyhow::Result<()> {
    let profile = client.get_user_profile().await?;
    println!("User: {}", profile.username.bold());
    println!("  Id: {}", profile.user_id.cyan());
    Ok(())
}

async fn cmd_upload(client: &VideoClient, args: UploadArgs) -> anyhow::Result<()> {
    let data = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;
    let response = client.upload_video(&args.id, &data, args.chunk_size).await?;
    println!(
        "{} Uploaded {} ({} bytes)",
        "✓".green().bold(),
        response.video_id.yellow(),
        response.total_bytes
    );
    println!("  Owner: {} ({})", response.metadata.uploader_name, response.metadata.uploader_id.cyan());
    Ok(())
}

async fn cmd_download(client: &VideoClient, args: DownloadArgs) -> anyhow::Result<()> {
    let video = client.download_video(&args.id).await?;
    tokio::fs::write(&args.output, &video.data)
        .await
        .with_context(|| format!("writing {}", args.output.display()))?;
    println!(
        "{} Downloaded {} to {} ({} bytes, {} chunks)",
        "✓".green().bold(),
        args.id.yellow(),
        args.output.display(),
        video.data.len(),
        video.chunks
    );
    println!(
        "  Uploaded by {} ({}) at {}",
        video.metadata.uploader_name,
        video.metadata.uploader_id.cyan(),
        video.metadata.upload_timestamp
    );
    Ok(())
}
