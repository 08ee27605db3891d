use anyhow::Result;
use casfs_core::types::{MountHandle, MountOptions};
use casfs_core::VfsPath;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "casfs")]
#[command(about = "Mount a content-addressed network store as a filesystem")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount a store container
    Mount {
        /// Container address in the network store
        #[arg(short, long)]
        container: String,

        /// Mount point for the filesystem
        #[arg(short, long)]
        mount: String,

        /// Mount read-only
        #[arg(long)]
        read_only: bool,
    },

    /// Unmount a mounted container
    Unmount {
        /// Mount point to unmount
        mount: String,
    },

    /// Show status of mounted containers
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "casfs=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Mount {
            container,
            mount,
            read_only,
        } => {
            info!("Mounting {} at {}", container, mount);
            mount_container(&container, &mount, read_only).await?;
        }
        Commands::Unmount { mount } => {
            info!("Unmounting {}", mount);
            unmount_container(&mount).await?;
        }
        Commands::Status => {
            show_status().await?;
        }
    }

    Ok(())
}

async fn mount_container(container: &str, mount: &str, read_only: bool) -> Result<()> {
    let options = MountOptions::builder().read_only(read_only).build();
    let handle = MountHandle::new(VfsPath::from(mount));
    info!(
        "Prepared mount session {} for container {} (read_only: {})",
        handle.id(),
        container,
        options.read_only
    );

    // The kernel-interface adapter and a live network session are what turn
    // this session into a mounted filesystem; neither ships in this binary.
    anyhow::bail!("no network session configured; cannot mount {container}");
}

async fn unmount_container(mount: &str) -> Result<()> {
    anyhow::bail!("no mounted container at {mount}");
}

async fn show_status() -> Result<()> {
    println!("No containers currently mounted");
    Ok(())
}
