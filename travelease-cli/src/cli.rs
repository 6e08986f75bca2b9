use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use travelease_shared::{EntityId, ItemType};

/// Sign in, fill a cart with flights and hotels, and book them
#[derive(Parser, Debug)]
#[command(name = "travelease", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show or change who is signed in
    #[command(subcommand)]
    Session(SessionCommand),

    /// Inspect or change the cart
    #[command(subcommand)]
    Cart(CartCommand),

    /// Pay for everything in the cart
    Checkout(CheckoutArgs),
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    Show,
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    SignUp {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    SignOut,
}

#[derive(Args, Debug, Clone)]
pub struct LineArgs {
    /// Flight or hotel id from the catalog
    #[arg(long)]
    pub id: EntityId,

    /// `flight` or `hotel`
    #[arg(long = "type")]
    pub kind: ItemType,
}

#[derive(Subcommand, Debug)]
pub enum CartCommand {
    Show,
    /// Add one unit of a flight or hotel
    Add {
        #[command(flatten)]
        line: LineArgs,

        /// Unit price (per person or per night)
        #[arg(long)]
        price: u64,

        /// Extra descriptive field, `name=value`; repeatable
        #[arg(long = "detail", value_parser = parse_detail)]
        details: Vec<(String, Value)>,
    },
    /// Add an item given as a catalog JSON object
    AddJson { json: String },
    Remove {
        #[command(flatten)]
        line: LineArgs,
    },
    SetQuantity {
        #[command(flatten)]
        line: LineArgs,

        /// Zero or less removes the line
        #[arg(long, allow_negative_numbers = true)]
        quantity: i64,
    },
    Clear,
}

#[derive(Args, Debug)]
pub struct CheckoutArgs {
    #[arg(long)]
    pub cardholder: String,

    #[arg(long)]
    pub card_number: String,

    /// MM/YY
    #[arg(long)]
    pub expiry: String,

    #[arg(long)]
    pub cvv: String,

    /// Override the configured payment delay
    #[arg(long)]
    pub payment_delay_ms: Option<u64>,
}

/// `name=value`; the value is read as JSON when it parses, else as a string.
pub fn parse_detail(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in '{}'", raw));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}
