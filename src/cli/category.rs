//! Category CLI commands
//!
//! Implements CLI commands for income and expense categories.

use clap::Subcommand;

use crate::display::category::format_category_list;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::CategoryType;
use crate::preferences::PreferenceStore;
use crate::services::{CategoryService, CategoryUpdate};
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Create a new category
    Create {
        /// Category name
        name: String,
        /// Category type (income, expense)
        #[arg(short = 't', long, default_value = "expense")]
        category_type: String,
    },
    /// List categories
    List {
        /// Only one type (income, expense)
        #[arg(short = 't', long)]
        category_type: Option<String>,
    },
    /// Edit a category
    Edit {
        /// Category name or ID
        category: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New icon
        #[arg(long)]
        icon: Option<String>,
        /// New colour, e.g. "#F44336"
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a category that nothing references
    Delete {
        /// Category name or ID
        category: String,
    },
    /// Set or clear the default category for a type
    Default {
        /// Category type (income, expense)
        category_type: String,
        /// Category name or ID; omit to clear
        category: Option<String>,
    },
    /// Reorder the categories of one type
    Reorder {
        /// Category type (income, expense)
        category_type: String,
        /// Category names or IDs in the new order
        #[arg(required = true)]
        categories: Vec<String>,
    },
}

pub(crate) fn parse_category_type(input: &str) -> ExpenseResult<CategoryType> {
    CategoryType::parse(input).ok_or_else(|| {
        ExpenseError::Validation(format!(
            "Invalid category type: '{}'. Valid types: income, expense",
            input
        ))
    })
}

/// Handle a category command
pub fn handle_category_command(
    storage: &Storage,
    prefs: &PreferenceStore,
    cmd: CategoryCommands,
) -> ExpenseResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::Create {
            name,
            category_type,
        } => {
            let category_type = parse_category_type(&category_type)?;
            let category = service.create(&name, category_type)?;
            println!("Created {} category: {}", category.category_type, category.name);
            println!("  ID: {}", category.id);
        }

        CategoryCommands::List { category_type } => {
            let filter = category_type
                .as_deref()
                .map(parse_category_type)
                .transpose()?;
            let categories = service.list(filter)?;
            print!("{}", format_category_list(&categories));
        }

        CategoryCommands::Edit {
            category,
            name,
            icon,
            color,
        } => {
            let found = service.resolve(&category)?;

            if name.is_none() && icon.is_none() && color.is_none() {
                println!("No changes specified. Use --name, --icon or --color.");
                return Ok(());
            }

            let updated = service.update(found.id, CategoryUpdate { name, icon, color })?;
            println!("Updated category: {}", updated.name);
        }

        CategoryCommands::Delete { category } => {
            let found = service.resolve(&category)?;
            let deleted = service.delete(found.id)?;

            if prefs.default_category(deleted.category_type)? == Some(deleted.id) {
                prefs.set_default_category(deleted.category_type, None)?;
            }
            println!("Deleted category: {}", deleted.name);
        }

        CategoryCommands::Default {
            category_type,
            category,
        } => {
            let category_type = parse_category_type(&category_type)?;
            match category {
                Some(category) => {
                    let found = service.resolve(&category)?;
                    if found.category_type != category_type {
                        return Err(ExpenseError::Validation(format!(
                            "'{}' is an {} category",
                            found.name, found.category_type
                        )));
                    }
                    prefs.set_default_category(category_type, Some(found.id))?;
                    println!("Default {} category: {}", category_type, found.name);
                }
                None => {
                    prefs.set_default_category(category_type, None)?;
                    println!("Default {} category cleared.", category_type);
                }
            }
        }

        CategoryCommands::Reorder {
            category_type,
            categories,
        } => {
            let category_type = parse_category_type(&category_type)?;
            let order = categories
                .iter()
                .map(|c| service.resolve(c).map(|found| found.id))
                .collect::<ExpenseResult<Vec<_>>>()?;
            service.reorder(category_type, &order)?;
            print!("{}", format_category_list(&service.list(Some(category_type))?));
        }
    }

    Ok(())
}
