use clap::Parser;
use tracing_subscriber::EnvFilter;

use mensa_card::pcsc::{HostPlatform, PcscSession};
use mensa_card::session::SessionError;
use mensa_card::{CardReader, ReadError};

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error("Error occurred on the NFC session: {0}")]
    Session(#[from] SessionError),

    #[error("Reading the card failed: {0}")]
    Read(#[from] ReadError),

    #[error("Error occurred while serializing the result: {0}")]
    Serialize(#[from] serde_json::Error),
}

type Result<T> = std::result::Result<T, Error>;

/// Reads the balance and the last transaction from a campus meal card.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Prints the result as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let session = PcscSession::try_new()?;
    let reader = CardReader::new(session, HostPlatform);
    let info = reader.read()?;

    match args.json {
        true => println!("{}", serde_json::to_string_pretty(&info)?),
        false => {
            println!("Balance: {}", info.current_balance);
            println!("Last transaction: {}", info.last_transaction);
            println!("Read at: {}", info.read_time.to_rfc3339());
        }
    }

    Ok(())
}
