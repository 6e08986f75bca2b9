use anyhow::{anyhow, Context};
use std::sync::Arc;
use std::time::Duration;
use travelease_cart::CartStore;
use travelease_checkout::{
    BookingConfirmation, CheckoutService, OrderSummary, PaymentDetails, SimulatedPaymentGateway,
};
use travelease_core::MockIdentityProvider;
use travelease_session::{SessionState, SessionStore};
use travelease_shared::{BookableItem, LineKey, Masked};
use travelease_store::{open_repository, Config};

use crate::cli::{CartCommand, CheckoutArgs, Command, LineArgs, SessionCommand};

/// Both stores, opened and restored for the lifetime of one command.
pub struct App {
    config: Config,
    session: SessionStore,
    cart: CartStore,
}

impl App {
    pub async fn open(config: Config) -> anyhow::Result<Self> {
        let repo = open_repository(&config.storage).context("Failed to open storage")?;

        let mut session = SessionStore::new(
            repo.clone(),
            Arc::new(MockIdentityProvider),
            config.storage.session_key.clone(),
        );
        let mut cart = CartStore::new(repo, config.storage.cart_key.clone());
        session.initialize().await;
        cart.initialize().await;

        Ok(Self { config, session, cart })
    }

    /// Run one command and return what to print.
    pub async fn run(&mut self, command: Command) -> anyhow::Result<String> {
        match command {
            Command::Session(cmd) => self.session_command(cmd).await,
            Command::Cart(cmd) => self.cart_command(cmd),
            Command::Checkout(args) => self.checkout(args).await,
        }
    }

    /// Flush both stores before the process exits.
    pub async fn close(self) {
        self.session.teardown().await;
        self.cart.teardown().await;
    }

    async fn session_command(&mut self, cmd: SessionCommand) -> anyhow::Result<String> {
        match cmd {
            SessionCommand::Show => {}
            SessionCommand::SignIn { email, password } => {
                self.session
                    .sign_in(&email, password)
                    .await
                    .map_err(|rejection| anyhow!("{}", rejection))?;
            }
            SessionCommand::SignUp { name, email, password } => {
                self.session
                    .sign_up(&name, &email, password)
                    .await
                    .map_err(|rejection| anyhow!("{}", rejection))?;
            }
            SessionCommand::SignOut => self.session.sign_out().await,
        }
        Ok(render_session(self.session.state()))
    }

    fn cart_command(&mut self, cmd: CartCommand) -> anyhow::Result<String> {
        match cmd {
            CartCommand::Show => {}
            CartCommand::Add { line, price, details } => {
                let item = details
                    .into_iter()
                    .fold(BookableItem::new(line.id, line.kind, price), |item, (name, value)| {
                        item.with_detail(name, value)
                    });
                self.cart.add_item(item);
            }
            CartCommand::AddJson { json } => {
                let value = serde_json::from_str(&json).context("Item is not valid JSON")?;
                let item = BookableItem::from_json(value).context("Item is not a bookable flight or hotel")?;
                self.cart.add_item(item);
            }
            CartCommand::Remove { line } => self.cart.remove_item(&key(line)),
            CartCommand::SetQuantity { line, quantity } => self.cart.set_quantity(&key(line), quantity),
            CartCommand::Clear => self.cart.clear(),
        }
        Ok(render_summary(&self.summary()))
    }

    async fn checkout(&mut self, args: CheckoutArgs) -> anyhow::Result<String> {
        let delay = args
            .payment_delay_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.config.checkout.payment_delay());
        let service = CheckoutService::from_config(
            Arc::new(SimulatedPaymentGateway::new(delay)),
            &self.config.checkout,
        );

        let payment = PaymentDetails {
            cardholder_name: args.cardholder,
            card_number: Masked::new(args.card_number),
            expiry_date: args.expiry,
            cvv: Masked::new(args.cvv),
        };

        let confirmation = service.checkout(&self.session, &mut self.cart, &payment).await?;
        Ok(render_confirmation(&confirmation))
    }

    fn summary(&self) -> OrderSummary {
        OrderSummary::from_lines(
            self.cart.lines(),
            self.config.checkout.tax_rate,
            &self.config.checkout.currency,
        )
    }
}

fn key(line: LineArgs) -> LineKey {
    LineKey::new(line.id, line.kind)
}

pub fn render_session(state: &SessionState) -> String {
    match state {
        SessionState::Loading => "Session: loading".to_string(),
        SessionState::SignedOut => "Not signed in".to_string(),
        SessionState::SignedIn(record) => {
            format!("Signed in as {} <{}> (id {})", record.name, record.email, record.id)
        }
    }
}

pub fn render_summary(summary: &OrderSummary) -> String {
    if summary.is_empty() {
        return "Your cart is empty".to_string();
    }

    let mut rows: Vec<String> = summary
        .lines
        .iter()
        .map(|line| {
            format!(
                "{:<8} {:<24} {} x {} = {}",
                line.kind,
                line.label(),
                line.price,
                line.quantity,
                line.line_total()
            )
        })
        .collect();
    rows.push(format!("Items:          {}", summary.item_count));
    rows.push(format!("Subtotal:       {} {}", summary.subtotal, summary.currency));
    rows.push(format!("Taxes & Fees:   {} {}", summary.taxes_and_fees, summary.currency));
    rows.push(format!("Total:          {} {}", summary.total, summary.currency));
    rows.join("\n")
}

pub fn render_confirmation(confirmation: &BookingConfirmation) -> String {
    format!(
        "{}\nReference: {}\nPayment:   {}\nCharged:   {} {}",
        confirmation.message,
        confirmation.reference,
        confirmation.payment_reference,
        confirmation.summary.total,
        confirmation.summary.currency
    )
}
