//! Currency CLI commands

use clap::Subcommand;
use tabled::Tabled;

use crate::config::settings::Settings;
use crate::display::render_table;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Currency, Money, SymbolPosition};
use crate::preferences::PreferenceStore;

/// Currency subcommands
#[derive(Subcommand)]
pub enum CurrencyCommands {
    /// List supported currencies
    List,
    /// Show the active currency
    Show,
    /// Select a currency by ISO code
    Set {
        /// Currency code, e.g. EUR
        code: String,
    },
    /// Put the symbol before or after amounts
    Position {
        /// prefix or suffix
        position: String,
    },
}

#[derive(Tabled)]
struct CurrencyRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "")]
    active: String,
}

fn sample(currency: &Currency) -> String {
    currency.format(Money::from_cents(123_450))
}

/// Handle a currency command
pub fn handle_currency_command(
    prefs: &PreferenceStore,
    settings: &Settings,
    cmd: CurrencyCommands,
) -> ExpenseResult<()> {
    match cmd {
        CurrencyCommands::List => {
            let active = prefs.currency(settings)?;
            let rows = Currency::all()
                .into_iter()
                .map(|c| CurrencyRow {
                    active: if c.code == active.code { "*".into() } else { String::new() },
                    code: c.code,
                    symbol: c.symbol,
                    name: c.name,
                })
                .collect();
            print!("{}", render_table::<CurrencyRow>(rows));
        }

        CurrencyCommands::Show => {
            let currency = prefs.currency(settings)?;
            println!("{} ({}), e.g. {}", currency.name, currency.code, sample(&currency));
        }

        CurrencyCommands::Set { code } => {
            prefs.set_currency(&code)?;
            let currency = prefs.currency(settings)?;
            println!("Currency set to {} ({}), e.g. {}", currency.name, currency.code, sample(&currency));
        }

        CurrencyCommands::Position { position } => {
            let position = match position.to_lowercase().as_str() {
                "prefix" | "before" => SymbolPosition::Prefix,
                "suffix" | "after" => SymbolPosition::Suffix,
                _ => {
                    return Err(ExpenseError::Validation(format!(
                        "Invalid position '{}'. Use prefix or suffix",
                        position
                    )))
                }
            };
            prefs.set_symbol_position(position)?;
            println!("Amounts now look like {}", sample(&prefs.currency(settings)?));
        }
    }

    Ok(())
}
